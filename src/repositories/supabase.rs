// src/repositories/supabase.rs - Supabase REST / Auth / Storage over plain HTTP

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use urlencoding::encode;

use crate::config::Config;
use crate::models::comment::{Comment, NewComment};
use crate::models::pkce::CHALLENGE_METHOD;
use crate::models::post::{NewPost, Post};
use crate::models::profile::{NewProfile, Profile};
use crate::models::session::Session;
use crate::models::user::BackendUser;
use crate::repositories::{
    CommentRepository, IdentityRepository, ObjectStorage, PostRepository, ProfileRepository,
    RepoError,
};

pub const POST_SELECT: &str =
    "id,content,image_url,created_at,author_id,profiles(username,avatar_url)";
pub const COMMENT_SELECT: &str =
    "id,content,image_url,created_at,post_id,author_id,author:profiles(id,username,avatar_url)";

#[derive(Clone)]
pub struct SupabaseClient {
    client: Client,
    supabase_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            supabase_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    /// Service role key when configured (server-only), anon key otherwise.
    fn rest_key(&self) -> &str {
        self.service_role_key.as_deref().unwrap_or(&self.anon_key)
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.supabase_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.supabase_url, path)
    }

    fn object_path(bucket: &str, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| encode(segment).into_owned())
            .collect();
        format!("{}/{}", encode(bucket), encoded.join("/"))
    }

    fn with_rest_auth(&self, rb: RequestBuilder) -> RequestBuilder {
        let key = self.rest_key();
        rb.header("apikey", key)
            .header("Authorization", format!("Bearer {}", key))
    }

    fn with_user_auth(&self, rb: RequestBuilder, access_token: &str) -> RequestBuilder {
        rb.header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
    }

    async fn insert_returning<T, P>(
        &self,
        table: &'static str,
        select: &str,
        payload: &P,
    ) -> Result<T, RepoError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = format!("{}?select={}", self.rest_url(table), select);
        let resp = self
            .with_rest_auth(self.client.post(&url))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(payload)
            .send()
            .await?;

        let rows: Vec<T> = read_json(resp).await?;
        rows.into_iter().next().ok_or(RepoError::EmptyResponse(table))
    }
}

/// Pulls the human-readable message out of a PostgREST / GoTrue / Storage error body.
fn backend_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| format!("{} -> {}", status.as_u16(), body))
}

async fn read_text(resp: Response) -> Result<String, RepoError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        debug!("supabase responded {}: {}", status, text);
        return Err(RepoError::Supabase(backend_message(status, &text)));
    }
    Ok(text)
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, RepoError> {
    let text = read_text(resp).await?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl PostRepository for SupabaseClient {
    async fn list_posts(&self) -> Result<Vec<Post>, RepoError> {
        let url = format!(
            "{}?select={}&order=created_at.desc",
            self.rest_url("posts"),
            POST_SELECT
        );
        let resp = self.with_rest_auth(self.client.get(&url)).send().await?;
        read_json(resp).await
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post, RepoError> {
        self.insert_returning("posts", POST_SELECT, post).await
    }
}

#[async_trait]
impl CommentRepository for SupabaseClient {
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, RepoError> {
        let url = format!(
            "{}?post_id=eq.{}&select={}&order=created_at.asc",
            self.rest_url("comments"),
            encode(post_id),
            COMMENT_SELECT
        );
        let resp = self.with_rest_auth(self.client.get(&url)).send().await?;
        read_json(resp).await
    }

    async fn insert_comment(&self, comment: &NewComment) -> Result<Comment, RepoError> {
        self.insert_returning("comments", COMMENT_SELECT, comment).await
    }
}

#[async_trait]
impl ProfileRepository for SupabaseClient {
    async fn upsert_profile(&self, profile: &NewProfile) -> Result<Profile, RepoError> {
        let payload = json!({
            "id": profile.id,
            "username": profile.username,
            "avatar_url": profile.avatar_url,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });

        let url = format!("{}?on_conflict=id", self.rest_url("profiles"));
        let resp = self
            .with_rest_auth(self.client.post(&url))
            .header("Content-Type", "application/json")
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&payload)
            .send()
            .await?;

        let rows: Vec<Profile> = read_json(resp).await?;
        rows.into_iter()
            .next()
            .ok_or(RepoError::EmptyResponse("profiles"))
    }
}

#[async_trait]
impl ObjectStorage for SupabaseClient {
    async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RepoError> {
        let url = format!(
            "{}/storage/v1/object/{}",
            self.supabase_url,
            Self::object_path(bucket, path)
        );
        let resp = self
            .with_rest_auth(self.client.post(&url))
            .header("Content-Type", content_type)
            .header("cache-control", "3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        read_text(resp).await?;
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}",
            self.supabase_url,
            Self::object_path(bucket, path)
        )
    }
}

#[async_trait]
impl IdentityRepository for SupabaseClient {
    fn authorize_url(&self, provider: &str, redirect_to: &str, code_challenge: &str) -> String {
        format!(
            "{}?provider={}&redirect_to={}&code_challenge={}&code_challenge_method={}",
            self.auth_url("authorize"),
            encode(provider),
            encode(redirect_to),
            encode(code_challenge),
            CHALLENGE_METHOD
        )
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<Session, RepoError> {
        let url = format!("{}?grant_type=pkce", self.auth_url("token"));
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "auth_code": code, "code_verifier": code_verifier }))
            .send()
            .await?;
        read_json(resp).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, RepoError> {
        let url = format!("{}?grant_type=refresh_token", self.auth_url("token"));
        let resp = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        read_json(resp).await
    }

    async fn get_user(&self, access_token: &str) -> Result<BackendUser, RepoError> {
        let resp = self
            .with_user_auth(self.client.get(self.auth_url("user")), access_token)
            .send()
            .await?;
        read_json(resp).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), RepoError> {
        let resp = self
            .with_user_auth(self.client.post(self.auth_url("logout")), access_token)
            .send()
            .await?;
        read_text(resp).await?;
        Ok(())
    }
}
