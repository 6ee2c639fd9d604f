// src/handlers/auth_handlers.rs - OAuth login and callback
use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::http::header::LOCATION;
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::{error, info, warn};
use serde::Deserialize;

use crate::models::pkce::Pkce;
use crate::AppState;

pub const CODE_VERIFIER_COOKIE: &str = "sb-code-verifier";
const CODE_VERIFIER_TTL_MINUTES: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

fn verifier_cookie(value: String) -> Cookie<'static> {
    Cookie::build(CODE_VERIFIER_COOKIE, value)
        .path("/auth")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(CODE_VERIFIER_TTL_MINUTES))
        .finish()
}

/// Sends the browser on and drops the verifier, which is single use.
fn redirect(location: String) -> HttpResponse {
    let mut spent = verifier_cookie(String::new());
    spent.make_removal();
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .cookie(spent)
        .finish()
}

/// GET /auth/login
/// Starts the provider sign-in. The PKCE verifier rides in a short-lived
/// cookie until the callback.
#[get("/login")]
pub async fn auth_login(app_state: web::Data<AppState>) -> impl Responder {
    let pkce = Pkce::generate();
    let url = app_state.identity.authorize_url(
        &app_state.oauth_provider,
        &app_state.oauth_redirect_url,
        &pkce.challenge,
    );
    HttpResponse::Found()
        .insert_header((LOCATION, url))
        .cookie(verifier_cookie(pkce.verifier))
        .finish()
}

/// GET /auth/callback?code=...
/// Exchanges the provider code for a session, syncs the profile and sends
/// the browser home. Profile sync failures never fail the login.
#[get("/callback")]
pub async fn auth_callback(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    query: web::Query<CallbackQuery>,
) -> impl Responder {
    let home = format!("{}/", app_state.site_url);

    let code = match query.code.as_deref().filter(|c| !c.is_empty()) {
        Some(code) => code,
        None => return redirect(home),
    };

    let verifier = req.cookie(CODE_VERIFIER_COOKIE).map(|c| c.value().to_string());

    match app_state
        .identity
        .exchange_code_for_session(code, verifier.as_deref())
        .await
    {
        Ok(session) => {
            info!("user {} signed in", session.user.id);
            if let Err(e) = app_state.profiles.ensure_profile(&session.user).await {
                warn!("profile sync failed for {}, continuing: {}", session.user.id, e);
            }
            redirect(home)
        }
        Err(e) => {
            error!("Error exchanging code for session: {}", e);
            redirect(format!("{}?error=auth_failed", home))
        }
    }
}
