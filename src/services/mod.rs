use thiserror::Error;

use crate::repositories::RepoError;

pub mod comment_service;
pub mod post_service;
pub mod profile_service;
pub mod storage_service;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected before any backend call.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}
