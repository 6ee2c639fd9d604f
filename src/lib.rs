pub mod client;
pub mod config;
pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod services;

use std::sync::Arc;

use actix_web::error::JsonPayloadError;
use actix_web::web;

use crate::config::Config;
use crate::errors::ApiError;
use crate::handlers::auth_handlers::{auth_callback, auth_login};
use crate::handlers::comment_handlers::{create_comment, list_comments};
use crate::handlers::post_handlers::{create_post, list_posts};
use crate::handlers::upload_handlers::upload_image;
use crate::repositories::{
    CommentRepository, IdentityRepository, ObjectStorage, PostRepository, ProfileRepository,
};
use crate::services::comment_service::CommentService;
use crate::services::post_service::PostService;
use crate::services::profile_service::ProfileService;
use crate::services::storage_service::{StorageService, FILE_TOO_LARGE_ERROR};

/// Base64 image bodies for a 5 MiB file need some headroom.
const JSON_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub posts: PostService,
    pub comments: CommentService,
    pub profiles: ProfileService,
    pub storage: StorageService,
    pub identity: Arc<dyn IdentityRepository>,
    pub site_url: String,
    pub oauth_provider: String,
    pub oauth_redirect_url: String,
}

impl AppState {
    /// Wires every service to the same backend client.
    pub fn with_backend<B>(backend: Arc<B>, config: &Config) -> Self
    where
        B: PostRepository
            + CommentRepository
            + ProfileRepository
            + ObjectStorage
            + IdentityRepository
            + 'static,
    {
        Self {
            posts: PostService::new(backend.clone()),
            comments: CommentService::new(backend.clone()),
            profiles: ProfileService::new(backend.clone()),
            storage: StorageService::new(
                backend.clone(),
                &config.post_images_bucket,
                &config.comment_images_bucket,
            ),
            identity: backend,
            site_url: config.site_url.clone(),
            oauth_provider: config.oauth_provider.clone(),
            oauth_redirect_url: config.oauth_redirect_url(),
        }
    }
}

/// Oversized upload bodies report the image size limit rather than the
/// raw payload error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, req| {
            let too_large = matches!(
                err,
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. }
            );
            let message = if too_large && req.path().ends_with("/uploads") {
                FILE_TOO_LARGE_ERROR.to_string()
            } else {
                err.to_string()
            };
            ApiError::BadRequest(message).into()
        })
}

/// All HTTP routes. `AppState` must be registered as app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::scope("/api")
                .service(list_posts)       // GET /api/posts
                .service(create_post)      // POST /api/posts
                .service(list_comments)    // GET /api/posts/{post_id}/comments
                .service(create_comment)   // POST /api/posts/{post_id}/comments
                .service(upload_image),    // POST /api/uploads
        )
        .service(
            web::scope("/auth")
                .service(auth_login)       // GET /auth/login
                .service(auth_callback),   // GET /auth/callback
        );
}

#[cfg(test)]
pub(crate) const TEST_SITE_URL: &str = "http://app.test";

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "SUPABASE_URL" => Some("https://backend.test".to_string()),
        "SUPABASE_ANON_KEY" => Some("anon-key".to_string()),
        "SITE_URL" => Some(TEST_SITE_URL.to_string()),
        _ => None,
    })
    .expect("test config")
}

#[cfg(test)]
pub(crate) fn test_state(
    backend: Arc<crate::repositories::memory::MemoryBackend>,
) -> web::Data<AppState> {
    web::Data::new(AppState::with_backend(backend, &test_config()))
}
