use log::warn;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Rejected locally; no request was sent.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{message}")]
    Api { status: u16, message: String },
}

/// A list together with the error that cut it short, if any. Lists never
/// fail outright; on error `items` is empty.
#[derive(Debug, Default)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub error: Option<FetchError>,
}

impl<T> Fetched<T> {
    pub fn from_result(res: Result<Vec<T>, FetchError>) -> Self {
        match res {
            Ok(items) => Fetched { items, error: None },
            Err(e) => {
                warn!("list request failed: {}", e);
                Fetched { items: Vec::new(), error: Some(e) }
            }
        }
    }
}

#[derive(Deserialize)]
struct ErrBody {
    error: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `what` names the action for the fallback message, e.g. "fetch posts".
    async fn read<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, FetchError> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("Failed to {} (status {})", what, status.as_u16()));
            return Err(FetchError::Api { status: status.as_u16(), message });
        }
        Ok(resp.json::<T>().await?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T, FetchError> {
        let resp = self.http.get(self.url(path)).send().await?;
        Self::read(resp, what).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B, what: &str) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        Self::read(resp, what).await
    }
}
