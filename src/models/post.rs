use serde::{Deserialize, Serialize};

pub const POST_EMPTY_ERROR: &str = "Either content or imageUrl is required";

/// Author fields embedded in a post (`profiles(username, avatar_url)`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PostAuthor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<PostAuthor>,
}

/// Insert payload. Only constructible through [`NewPost::new`], so at least
/// one of `content`/`image_url` is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    content: Option<String>,
    image_url: Option<String>,
    author_id: String,
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

impl NewPost {
    pub fn new(
        content: Option<&str>,
        image_url: Option<&str>,
        author_id: &str,
    ) -> Result<Self, String> {
        let content = non_blank(content);
        let image_url = non_blank(image_url);

        if content.is_none() && image_url.is_none() {
            return Err(POST_EMPTY_ERROR.to_string());
        }
        if author_id.trim().is_empty() {
            return Err("userId is required".to_string());
        }

        Ok(NewPost {
            content,
            image_url,
            author_id: author_id.to_string(),
        })
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_when_both_fields_blank() {
        assert_eq!(NewPost::new(Some("   "), Some(""), "u1").unwrap_err(), POST_EMPTY_ERROR);
        assert_eq!(NewPost::new(None, None, "u1").unwrap_err(), POST_EMPTY_ERROR);
    }

    #[test]
    fn text_only_post_nulls_the_image() {
        let post = NewPost::new(Some("hello"), Some("  "), "u1").unwrap();
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({ "content": "hello", "image_url": null, "author_id": "u1" })
        );
    }

    #[test]
    fn image_only_post_is_allowed() {
        let post = NewPost::new(None, Some("https://cdn/x.png"), "u1").unwrap();
        assert_eq!(post.content(), None);
        assert_eq!(post.image_url(), Some("https://cdn/x.png"));
    }

    #[test]
    fn content_is_stored_untrimmed() {
        let post = NewPost::new(Some("  hi  "), None, "u1").unwrap();
        assert_eq!(post.content(), Some("  hi  "));
    }

    #[test]
    fn author_is_required() {
        assert!(NewPost::new(Some("hello"), None, " ").is_err());
    }

    #[test]
    fn decodes_joined_row() {
        let post: Post = serde_json::from_value(json!({
            "id": "p1",
            "content": null,
            "image_url": "https://cdn/x.png",
            "created_at": "2024-01-01T00:00:00+00:00",
            "author_id": "u1",
            "profiles": { "username": "octocat", "avatar_url": null }
        }))
        .unwrap();
        assert_eq!(post.profiles.unwrap().username.as_deref(), Some("octocat"));
    }
}
