//! Request and response types for the REST API.

pub mod health;
pub mod links;
pub mod users;
