//! Core business data structures.

pub mod link;
pub mod user;

pub use link::Link;
pub use user::User;
