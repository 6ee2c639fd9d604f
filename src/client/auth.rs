use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::Utc;
use log::{info, warn};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::models::pkce::Pkce;
use crate::models::session::Session;
use crate::models::user::{transform_user, BackendUser, User};
use crate::repositories::{IdentityRepository, RepoError};

/// Sessions this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

type Listener = Arc<dyn Fn(AuthEvent, Option<User>) + Send + Sync>;
type Listeners = Mutex<Vec<(u64, Listener)>>;

/// Handle returned by [`AuthService::on_auth_state_change`].
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// Where to send the browser, plus the verifier that must accompany the
/// code when it comes back.
#[derive(Debug, Clone)]
pub struct SignInRedirect {
    pub url: String,
    pub code_verifier: String,
}

/// Session holder over the identity backend, one per signed-in client.
pub struct AuthService {
    identity: Arc<dyn IdentityRepository>,
    provider: String,
    redirect_url: String,
    session: RwLock<Option<Session>>,
    pending_verifier: Mutex<Option<String>>,
    listeners: Arc<Listeners>,
    next_id: AtomicU64,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityRepository>, provider: &str, redirect_url: &str) -> Self {
        Self {
            identity,
            provider: provider.to_string(),
            redirect_url: redirect_url.to_string(),
            session: RwLock::new(None),
            pending_verifier: Mutex::new(None),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Provider and return URL come from the service configuration.
    pub fn from_config(identity: Arc<dyn IdentityRepository>, config: &Config) -> Self {
        Self::new(identity, &config.oauth_provider, &config.oauth_redirect_url())
    }

    pub fn transform_user(raw: Option<&BackendUser>) -> Option<User> {
        transform_user(raw)
    }

    /// Starts a PKCE sign-in. The code comes back to the fixed callback URL;
    /// the verifier is kept for [`AuthService::exchange_code`].
    pub fn sign_in_with_provider(&self) -> SignInRedirect {
        let pkce = Pkce::generate();
        *self
            .pending_verifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(pkce.verifier.clone());
        SignInRedirect {
            url: self
                .identity
                .authorize_url(&self.provider, &self.redirect_url, &pkce.challenge),
            code_verifier: pkce.verifier,
        }
    }

    /// Uses `code_verifier` when given, else the one kept by the last
    /// sign-in. A kept verifier is used at most once.
    pub async fn exchange_code(&self, code: &str, code_verifier: Option<&str>) -> Result<Option<User>, RepoError> {
        let pending = self
            .pending_verifier
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let verifier = code_verifier.map(str::to_string).or(pending);
        let session = self
            .identity
            .exchange_code_for_session(code, verifier.as_deref())
            .await?;
        Ok(self.set_session(session).await)
    }

    /// Adopts an existing session, e.g. one restored from storage.
    pub async fn set_session(&self, session: Session) -> Option<User> {
        let user = transform_user(Some(&session.user));
        *self.session.write().await = Some(session);
        self.emit(AuthEvent::SignedIn, user.clone());
        user
    }

    /// Local state is cleared even if the backend call fails.
    pub async fn sign_out(&self) -> Result<(), RepoError> {
        let previous = self.session.write().await.take();
        let res = match previous {
            Some(session) => self.identity.sign_out(&session.access_token).await,
            None => Ok(()),
        };
        if let Err(ref e) = res {
            warn!("backend sign-out failed: {}", e);
        }
        self.emit(AuthEvent::SignedOut, None);
        res
    }

    /// Cached session, refreshed first when it is about to expire.
    pub async fn get_session(&self) -> Result<Option<Session>, RepoError> {
        let expired = match self.session.read().await.as_ref() {
            Some(session) => session.is_expired(Utc::now().timestamp() + EXPIRY_MARGIN_SECS),
            None => return Ok(None),
        };
        if expired {
            info!("session expired, refreshing");
            self.refresh_session().await?;
        }
        Ok(self.session.read().await.clone())
    }

    /// Asks the backend who the cached session belongs to.
    pub async fn get_current_user(&self) -> Result<Option<User>, RepoError> {
        let token = match self.get_session().await? {
            Some(session) => session.access_token,
            None => return Ok(None),
        };
        let raw = self.identity.get_user(&token).await?;
        Ok(transform_user(Some(&raw)))
    }

    pub async fn refresh_session(&self) -> Result<Option<User>, RepoError> {
        let refresh_token = match self.session.read().await.as_ref() {
            Some(Session { refresh_token: Some(t), .. }) => t.clone(),
            _ => return Ok(None),
        };
        let session = self.identity.refresh_session(&refresh_token).await?;
        let user = transform_user(Some(&session.user));
        *self.session.write().await = Some(session);
        self.emit(AuthEvent::TokenRefreshed, user.clone());
        Ok(user)
    }

    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(AuthEvent, Option<User>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    fn emit(&self, event: AuthEvent, user: Option<User>) {
        info!("auth event {:?}", event);
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event, user.clone());
        }
    }
}
