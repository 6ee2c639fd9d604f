pub mod comment;
pub mod pkce;
pub mod post;
pub mod profile;
pub mod session;
pub mod user;
