use async_trait::async_trait;
use thiserror::Error;

use crate::models::comment::{Comment, NewComment};
use crate::models::post::{NewPost, Post};
use crate::models::profile::{NewProfile, Profile};
use crate::models::session::Session;
use crate::models::user::BackendUser;

pub mod supabase;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Non-2xx answer from the backend, carrying its message.
    #[error("{0}")]
    Supabase(String),
    #[error("empty response from {0}")]
    EmptyResponse(&'static str),
}

/// `posts` table.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Newest first, joined with the author's profile.
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError>;
    async fn insert_post(&self, post: &NewPost) -> Result<Post, RepoError>;
}

/// `comments` table.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Oldest first, joined with the author's profile.
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, RepoError>;
    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, RepoError>;
}

/// `profiles` table.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert-or-update keyed by `id`.
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<Profile, RepoError>;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` at `bucket/path` without overwriting. Returns the stored path.
    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RepoError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// OAuth identity backend.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Provider sign-in URL for the PKCE flow; the code comes back to `redirect_to`.
    fn authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String;

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, RepoError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, RepoError>;

    async fn get_user(&self, access_token: &str) -> Result<BackendUser, RepoError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), RepoError>;
}
