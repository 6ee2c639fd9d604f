//! Consumer side of the service: what the web UI does through its hooks,
//! minus rendering. Talks to this service's HTTP API for posts and comments
//! and to the identity backend for sessions.

pub mod api;
pub mod auth;
pub mod comments;
pub mod feed;
pub mod posts;
pub mod state;

pub use api::{ApiClient, FetchError, Fetched};
