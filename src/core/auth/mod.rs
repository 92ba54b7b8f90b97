//! Authentication against the hosted identity service
//!
//! This module provides:
//! - The `IdentityBackend` seam and its session/user wire types
//! - A GoTrue REST implementation of that seam
//! - The `AuthClient` wrapper with one call per auth operation
//! - The `AuthError` taxonomy shown to users

pub mod backend;
pub mod client;
pub mod error;
pub mod gotrue;
#[cfg(test)]
pub(crate) mod testing;

pub use backend::{
    AuthChangeEvent, AuthListener, AuthListeners, AuthResponse, BackendUser, IdentityBackend,
    Session, Subscription, UserAttributes, listener,
};
pub use client::{
    ACCESS_TOKEN_COOKIE, AuthClient, CALLBACK_PATH, CODE_VERIFIER_COOKIE, OAUTH_PROVIDERS,
    OAuthProvider, OAuthRedirect, ProfileUpdate, RESET_PASSWORD_PATH, access_token_cookie,
    find_provider,
};
pub use error::{AuthError, AuthErrorKind, AuthResult};
pub use gotrue::GoTrueClient;
