use crate::client::api::{ApiClient, FetchError, Fetched};
use crate::dtos::post_dtos::CreatePostIn;
use crate::models::post::{non_blank, Post};

const API_BASE: &str = "/api/posts";

#[derive(Clone)]
pub struct PostsClient {
    api: ApiClient,
}

impl PostsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Fetched<Post> {
        Fetched::from_result(self.api.get_json(API_BASE, "fetch posts").await)
    }

    /// Rejects a post with neither text nor image without touching the network.
    pub async fn create(
        &self,
        content: Option<&str>,
        image_url: Option<&str>,
        user_id: &str,
    ) -> Result<Post, FetchError> {
        let content = non_blank(content);
        let image_url = non_blank(image_url);
        if content.is_none() && image_url.is_none() {
            return Err(FetchError::Validation(
                "Post must contain either text or an image".to_string(),
            ));
        }

        let body = CreatePostIn {
            content,
            image_url,
            user_id: Some(user_id.to_string()),
        };
        self.api.post_json(API_BASE, &body, "create post").await
    }
}
