pub mod auth_handlers;
pub mod comment_handlers;
pub mod post_handlers;
pub mod upload_handlers;
