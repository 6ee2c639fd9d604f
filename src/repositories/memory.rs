//! In-memory backend used by tests. Mirrors the joins and orderings the
//! real backend applies.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::models::comment::{Comment, CommentAuthor, NewComment};
use crate::models::post::{NewPost, Post, PostAuthor};
use crate::models::profile::{NewProfile, Profile};
use crate::models::session::Session;
use crate::models::user::BackendUser;
use crate::repositories::{
    CommentRepository, IdentityRepository, ObjectStorage, PostRepository, ProfileRepository,
    RepoError,
};

pub const PUBLIC_BASE: &str = "https://storage.test/public";

#[derive(Default)]
pub struct MemoryBackend {
    posts: Mutex<Vec<Post>>,
    comments: Mutex<Vec<Comment>>,
    profiles: Mutex<HashMap<String, Profile>>,
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
    codes: Mutex<HashMap<String, BackendUser>>,
    tokens: Mutex<HashMap<String, BackendUser>>,
    last_verifier: Mutex<Option<String>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    clock: AtomicI64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every backend call fails while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn profiles(&self) -> Vec<Profile> {
        self.profiles.lock().unwrap().values().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Makes `code` exchangeable for a session of `user`.
    pub fn register_code(&self, code: &str, user: BackendUser) {
        self.codes.lock().unwrap().insert(code.to_string(), user);
    }

    /// Verifier sent with the most recent code exchange.
    pub fn last_verifier(&self) -> Option<String> {
        self.last_verifier.lock().unwrap().clone()
    }

    pub fn user(id: &str, email: Option<&str>, user_name: Option<&str>) -> BackendUser {
        let mut user_metadata = serde_json::Map::new();
        if let Some(name) = user_name {
            user_metadata.insert("user_name".into(), name.into());
            user_metadata.insert(
                "avatar_url".into(),
                format!("https://avatars.test/{}.png", name).into(),
            );
        }
        BackendUser {
            id: id.to_string(),
            email: email.map(str::to_string),
            user_metadata,
        }
    }

    fn enter(&self) -> Result<(), RepoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::Supabase("backend unavailable".to_string()));
        }
        Ok(())
    }

    fn now(&self) -> String {
        let tick = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(1_700_000_000 + tick, 0)
            .single()
            .unwrap_or_else(Utc::now)
            .to_rfc3339()
    }

    fn next_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn post_author(&self, author_id: &str) -> Option<PostAuthor> {
        self.profiles.lock().unwrap().get(author_id).map(|p| PostAuthor {
            username: Some(p.username.clone()),
            avatar_url: p.avatar_url.clone(),
        })
    }

    fn comment_author(&self, author_id: &str) -> Option<CommentAuthor> {
        self.profiles.lock().unwrap().get(author_id).map(|p| CommentAuthor {
            id: p.id.clone(),
            username: Some(p.username.clone()),
            avatar_url: p.avatar_url.clone(),
        })
    }

    fn issue_session(&self, user: BackendUser) -> Session {
        let token = format!("token-{}-{}", user.id, Self::next_id());
        self.tokens.lock().unwrap().insert(token.clone(), user.clone());
        Session {
            access_token: token,
            refresh_token: Some(format!("refresh-{}", user.id)),
            expires_in: Some(3600),
            expires_at: None,
            token_type: Some("bearer".to_string()),
            user,
        }
    }
}

#[async_trait]
impl PostRepository for MemoryBackend {
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        self.enter()?;
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        for post in posts.iter_mut() {
            post.profiles = self.post_author(&post.author_id);
        }
        Ok(posts)
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post, RepoError> {
        self.enter()?;
        let row = Post {
            id: Self::next_id(),
            content: post.content().map(str::to_string),
            image_url: post.image_url().map(str::to_string),
            created_at: self.now(),
            author_id: post.author_id().to_string(),
            profiles: None,
        };
        self.posts.lock().unwrap().push(row.clone());
        Ok(Post {
            profiles: self.post_author(&row.author_id),
            ..row
        })
    }
}

#[async_trait]
impl CommentRepository for MemoryBackend {
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, RepoError> {
        self.enter()?;
        let mut comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        for comment in comments.iter_mut() {
            comment.author = self.comment_author(&comment.author_id);
        }
        Ok(comments)
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, RepoError> {
        self.enter()?;
        let row = Comment {
            id: Self::next_id(),
            content: comment.content().to_string(),
            image_url: comment.image_url().map(str::to_string),
            created_at: self.now(),
            post_id: comment.post_id().to_string(),
            author_id: comment.author_id().to_string(),
            author: None,
        };
        self.comments.lock().unwrap().push(row.clone());
        Ok(Comment {
            author: self.comment_author(&row.author_id),
            ..row
        })
    }
}

#[async_trait]
impl ProfileRepository for MemoryBackend {
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<Profile, RepoError> {
        self.enter()?;
        let now = self.now();
        let mut profiles = self.profiles.lock().unwrap();
        let created_at = profiles
            .get(&profile.id)
            .and_then(|p| p.created_at.clone())
            .unwrap_or_else(|| now.clone());
        let row = Profile {
            id: profile.id.clone(),
            username: profile.username.clone(),
            avatar_url: profile.avatar_url.clone(),
            created_at: Some(created_at),
            updated_at: Some(now),
        };
        profiles.insert(row.id.clone(), row.clone());
        Ok(row)
    }
}

#[async_trait]
impl ObjectStorage for MemoryBackend {
    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RepoError> {
        self.enter()?;
        let key = format!("{}/{}", bucket, path);
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(RepoError::Supabase("The resource already exists".to_string()));
        }
        objects.insert(key, (content_type.to_string(), bytes));
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", PUBLIC_BASE, bucket, path)
    }
}

#[async_trait]
impl IdentityRepository for MemoryBackend {
    fn authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String {
        format!(
            "https://auth.test/authorize?provider={}&redirect_to={}&code_challenge={}&code_challenge_method=s256",
            provider, redirect_to, code_challenge
        )
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, RepoError> {
        self.enter()?;
        *self.last_verifier.lock().unwrap() = code_verifier.map(str::to_string);
        let user = self
            .codes
            .lock()
            .unwrap()
            .remove(code)
            .ok_or_else(|| RepoError::Supabase("invalid flow state, no valid flow state found".to_string()))?;
        Ok(self.issue_session(user))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, RepoError> {
        self.enter()?;
        let user = self
            .tokens
            .lock()
            .unwrap()
            .values()
            .find(|u| format!("refresh-{}", u.id) == refresh_token)
            .cloned()
            .ok_or_else(|| RepoError::Supabase("Invalid Refresh Token".to_string()))?;
        Ok(self.issue_session(user))
    }

    async fn get_user(&self, access_token: &str) -> Result<BackendUser, RepoError> {
        self.enter()?;
        self.tokens
            .lock()
            .unwrap()
            .get(access_token)
            .cloned()
            .ok_or_else(|| RepoError::Supabase("invalid JWT".to_string()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), RepoError> {
        self.enter()?;
        self.tokens.lock().unwrap().remove(access_token);
        Ok(())
    }
}
