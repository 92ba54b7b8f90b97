//! OAuth callback endpoint
//!
//! `GET /auth/callback?code=..` exchanges the authorization code for a session
//! and hands the access token to the browser as a cookie. The user lands on
//! the dashboard whether or not the exchange worked; a failed exchange simply
//! bounces off the dashboard guard back to the login page.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;

use crate::core::auth::{
    AuthClient, CALLBACK_PATH, CODE_VERIFIER_COOKIE, GoTrueClient, IdentityBackend, Session,
    access_token_cookie,
};
use crate::core::config::Config;

/// Where the callback always sends the user
pub const AFTER_CALLBACK_PATH: &str = "/dashboard";

#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

/// Router serving [`CALLBACK_PATH`]
pub fn callback_router(config: Config) -> Router {
    Router::new()
        .route(CALLBACK_PATH, get(oauth_callback))
        .with_state(Arc::new(config))
}

/// Exchange `code` for a session. Failures are logged and yield `None`.
pub async fn complete_oauth_sign_in<B: IdentityBackend>(
    client: &AuthClient<B>,
    code: &str,
    code_verifier: Option<&str>,
) -> Option<Session> {
    match client.exchange_code_for_session(code, code_verifier).await {
        Ok(session) => {
            tracing::info!(user_id = %session.user.id, "OAuth sign-in completed");
            Some(session)
        }
        Err(error) => {
            tracing::warn!(error = %error, "OAuth code exchange failed");
            None
        }
    }
}

async fn oauth_callback(
    State(config): State<Arc<Config>>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Response {
    let redirect = Redirect::to(AFTER_CALLBACK_PATH);

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        tracing::debug!("OAuth callback without code");
        return redirect.into_response();
    };

    let (Some(url), Some(key)) = (
        config.supabase_url.as_deref(),
        config.supabase_anon_key.as_deref(),
    ) else {
        tracing::error!("OAuth callback hit but the identity backend is not configured");
        return redirect.into_response();
    };

    // One client per request; nothing is kept between callbacks
    let client = AuthClient::new(GoTrueClient::new(url, key), config.site_url());
    let verifier = jar
        .get(CODE_VERIFIER_COOKIE)
        .map(|cookie| cookie.value().to_string());

    let session = complete_oauth_sign_in(&client, &code, verifier.as_deref()).await;
    let cookie = session
        .as_ref()
        .and_then(|session| Cookie::parse(access_token_cookie(Some(session))).ok());

    match cookie {
        Some(cookie) => {
            let jar = jar
                .remove(Cookie::build(CODE_VERIFIER_COOKIE).path("/"))
                .add(cookie);
            (jar, redirect).into_response()
        }
        None => redirect.into_response(),
    }
}
