//! REST API handlers.

pub mod health;
pub mod links;
pub mod redirect;
pub mod users;

pub use health::health_handler;
pub use links::{
    create_link_handler, delete_link_handler, link_details_handler, list_links_handler,
};
pub use redirect::{home_handler, redirect_handler};
pub use users::{
    create_user_handler, delete_user_handler, list_users_handler, update_user_handler,
    user_details_handler,
};
