use urlencoding::encode;

use crate::client::api::{ApiClient, FetchError, Fetched};
use crate::dtos::comment_dtos::CreateCommentIn;
use crate::models::comment::{Comment, COMMENT_EMPTY_ERROR};
use crate::models::post::non_blank;

fn api_base(post_id: &str) -> String {
    format!("/api/posts/{}/comments", encode(post_id))
}

#[derive(Clone)]
pub struct CommentsClient {
    api: ApiClient,
}

impl CommentsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_by_post(&self, post_id: &str) -> Fetched<Comment> {
        Fetched::from_result(self.api.get_json(&api_base(post_id), "fetch comments").await)
    }

    /// Text is required; an image alone is not enough for a comment.
    pub async fn create(
        &self,
        post_id: &str,
        content: &str,
        image_url: Option<&str>,
        user_id: &str,
    ) -> Result<Comment, FetchError> {
        if content.trim().is_empty() {
            return Err(FetchError::Validation(COMMENT_EMPTY_ERROR.to_string()));
        }

        let body = CreateCommentIn {
            content: Some(content.to_string()),
            image_url: non_blank(image_url),
            user_id: Some(user_id.to_string()),
        };
        self.api.post_json(&api_base(post_id), &body, "create comment").await
    }
}
