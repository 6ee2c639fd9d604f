use serde::{Deserialize, Serialize};

use crate::models::post::non_blank;

pub const COMMENT_EMPTY_ERROR: &str = "Comment content is required";

/// `author:profiles(id, username, avatar_url)`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub post_id: String,
    pub author_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<CommentAuthor>,
}

/// Insert payload. Text is mandatory; an image can only accompany it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComment {
    post_id: String,
    author_id: String,
    content: String,
    image_url: Option<String>,
}

impl NewComment {
    pub fn new(
        content: Option<&str>,
        image_url: Option<&str>,
        author_id: &str,
        post_id: &str,
    ) -> Result<Self, String> {
        let content = non_blank(content).ok_or_else(|| COMMENT_EMPTY_ERROR.to_string())?;
        if author_id.trim().is_empty() {
            return Err("userId is required".to_string());
        }
        if post_id.trim().is_empty() {
            return Err("postId is required".to_string());
        }

        Ok(NewComment {
            post_id: post_id.to_string(),
            author_id: author_id.to_string(),
            content,
            image_url: non_blank(image_url),
        })
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_content_is_rejected() {
        assert_eq!(NewComment::new(Some(" \n"), None, "u1", "p1").unwrap_err(), COMMENT_EMPTY_ERROR);
        assert_eq!(NewComment::new(None, None, "u1", "p1").unwrap_err(), COMMENT_EMPTY_ERROR);
    }

    #[test]
    fn image_only_comment_is_rejected() {
        let err = NewComment::new(Some(""), Some("https://cdn/c.png"), "u1", "p1").unwrap_err();
        assert_eq!(err, COMMENT_EMPTY_ERROR);
    }

    #[test]
    fn blank_image_becomes_null() {
        let c = NewComment::new(Some("nice"), Some(" "), "u1", "p1").unwrap();
        assert_eq!(c.image_url(), None);
        assert_eq!(c.content(), "nice");
        assert_eq!(c.post_id(), "p1");
    }

    #[test]
    fn post_and_author_are_required() {
        assert!(NewComment::new(Some("x"), None, "", "p1").is_err());
        assert!(NewComment::new(Some("x"), None, "u1", "").is_err());
    }
}
