use std::sync::Arc;

use log::{error, info};

use crate::models::post::{NewPost, Post};
use crate::repositories::PostRepository;
use crate::services::ServiceError;

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// All posts, newest first, with the author projection.
    pub async fn list(&self) -> Result<Vec<Post>, ServiceError> {
        self.repo.list_posts().await.map_err(|e| {
            error!("Supabase GET /posts error: {}", e);
            ServiceError::from(e)
        })
    }

    pub async fn create(
        &self,
        content: Option<&str>,
        image_url: Option<&str>,
        user_id: &str,
    ) -> Result<Post, ServiceError> {
        let new_post = NewPost::new(content, image_url, user_id).map_err(ServiceError::Validation)?;

        let post = self.repo.insert_post(&new_post).await.map_err(|e| {
            error!("Supabase POST /posts error: {}", e);
            ServiceError::from(e)
        })?;

        info!("post {} created by {}", post.id, post.author_id);
        Ok(post)
    }
}
