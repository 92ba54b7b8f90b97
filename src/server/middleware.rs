//! Edge route protection
//!
//! Requests for the private sections of the app are sent to the login page
//! unless they carry the access token cookie. Only the cookie's presence is
//! checked; the token itself is validated by the identity backend when the
//! page talks to it.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::core::auth::ACCESS_TOKEN_COOKIE;
use crate::core::guard::DEFAULT_LOGIN_PATH;

/// Path prefixes that need a session cookie
pub const PROTECTED_PREFIXES: &[&str] = &[
    "/dashboard",
    "/invoices",
    "/clients",
    "/expenses",
    "/time-tracking",
    "/reports",
    "/settings",
];

/// Whether `path` is one of [`PROTECTED_PREFIXES`] or lies below one.
/// `/dashboardx` is not below `/dashboard`.
pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Axum middleware, installed with `axum::middleware::from_fn`
pub async fn require_session_cookie(jar: CookieJar, request: Request, next: Next) -> Response {
    let has_session = jar
        .get(ACCESS_TOKEN_COOKIE)
        .is_some_and(|cookie| !cookie.value().is_empty());

    if !has_session && is_protected(request.uri().path()) {
        tracing::debug!(path = request.uri().path(), "no session cookie, redirecting to login");
        return Redirect::to(DEFAULT_LOGIN_PATH).into_response();
    }

    next.run(request).await
}
