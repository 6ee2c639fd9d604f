use std::sync::Arc;

use log::{error, info};

use crate::models::comment::{Comment, NewComment};
use crate::repositories::CommentRepository;
use crate::services::ServiceError;

#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    /// Comments of one post, oldest first.
    pub async fn list_by_post(&self, post_id: &str) -> Result<Vec<Comment>, ServiceError> {
        if post_id.trim().is_empty() {
            return Err(ServiceError::Validation("postId is required".to_string()));
        }
        self.repo.list_comments(post_id).await.map_err(|e| {
            error!("Supabase GET /comments error: {}", e);
            ServiceError::from(e)
        })
    }

    pub async fn create(
        &self,
        content: Option<&str>,
        image_url: Option<&str>,
        user_id: &str,
        post_id: &str,
    ) -> Result<Comment, ServiceError> {
        let new_comment =
            NewComment::new(content, image_url, user_id, post_id).map_err(ServiceError::Validation)?;

        let comment = self.repo.insert_comment(&new_comment).await.map_err(|e| {
            error!("Supabase POST /comments error: {}", e);
            ServiceError::from(e)
        })?;

        info!("comment {} added to post {}", comment.id, comment.post_id);
        Ok(comment)
    }
}
