use std::env;
use anyhow::{Context, Result};

pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: Option<String>,
    /// Public origin of the web app; OAuth returns to `{site_url}/auth/callback`.
    pub site_url: String,
    pub oauth_provider: String,
    pub post_images_bucket: String,
    pub comment_images_bucket: String,
    pub allowed_origins: Vec<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let supabase_url = get("SUPABASE_URL")
            .context("SUPABASE_URL not set")?
            .trim_end_matches('/')
            .to_string();
        let supabase_anon_key = get("SUPABASE_ANON_KEY").context("SUPABASE_ANON_KEY not set")?;

        let port = match get("PORT") {
            Some(p) => p
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {}", p))?,
            None => 8080,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            supabase_service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            site_url: get("SITE_URL")
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            oauth_provider: get("OAUTH_PROVIDER").unwrap_or_else(|| "github".to_string()),
            post_images_bucket: get("POST_IMAGES_BUCKET").unwrap_or_else(|| "post-images".to_string()),
            comment_images_bucket: get("COMMENT_IMAGES_BUCKET")
                .unwrap_or_else(|| "comment-images".to_string()),
            allowed_origins,
            port,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Fixed return URL handed to the identity provider.
    pub fn oauth_redirect_url(&self) -> String {
        format!("{}/auth/callback", self.site_url)
    }
}

pub fn mask_key(k: &str) -> String {
    if k.len() <= 8 { "[REDACTED]".to_string() }
    else { format!("{}***{}", &k[..4], &k[k.len()-4..]) }
}
