//! Identity backend seam
//!
//! [`IdentityBackend`] is the set of calls the app makes against the hosted
//! identity service. The production implementation is
//! [`GoTrueClient`](super::gotrue::GoTrueClient); tests use an in-memory fake.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthResult;

/// User record as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl BackendUser {
    /// String entry of `user_metadata`, if present
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata.get(key).and_then(|v| v.as_str())
    }
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Access/refresh token pair issued by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: BackendUser,
}

/// Result of sign-up and sign-in calls. Sign-up yields no session while the
/// email address awaits confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthResponse {
    pub user: Option<BackendUser>,
    pub session: Option<Session>,
}

/// Body of a user update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Merged into `user_metadata`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Session change notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
}

pub type AuthListener = Arc<dyn Fn(AuthChangeEvent, Option<&Session>) + Send + Sync>;

/// Wrap a closure as an [`AuthListener`]
pub fn listener<F>(callback: F) -> AuthListener
where
    F: Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static,
{
    Arc::new(callback)
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    listeners: HashMap<u64, AuthListener>,
}

/// Registry of auth change listeners
#[derive(Clone, Default)]
pub struct AuthListeners {
    table: Arc<Mutex<ListenerTable>>,
}

impl AuthListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: AuthListener) -> Subscription {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let id = table.next_id;
        table.next_id += 1;
        table.listeners.insert(id, listener);

        Subscription {
            id,
            table: Arc::downgrade(&self.table),
        }
    }

    /// Calls every listener. Listeners run outside the registry lock so they
    /// may subscribe or unsubscribe.
    pub fn notify(&self, event: AuthChangeEvent, session: Option<&Session>) {
        let listeners: Vec<AuthListener> = {
            let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.listeners.values().cloned().collect()
        };

        tracing::debug!(?event, listeners = listeners.len(), "auth state changed");
        for listener in listeners {
            listener(event, session);
        }
    }

    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to a registered listener; dropping it unsubscribes
pub struct Subscription {
    id: u64,
    table: Weak<Mutex<ListenerTable>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Operations offered by the hosted identity service.
///
/// Implementations translate every backend failure into an
/// [`AuthError`](super::error::AuthError) and keep track of the current
/// session themselves.
#[allow(async_fn_in_trait)]
pub trait IdentityBackend {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthResponse>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> AuthResult<AuthResponse>;

    /// URL of the provider consent page. Building it does not contact the
    /// backend.
    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        scopes: Option<&str>,
    ) -> AuthResult<String>;

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AuthResult<()>;

    async fn update_user(&self, attributes: &UserAttributes) -> AuthResult<BackendUser>;

    /// Session currently held, without a network round trip
    async fn get_session(&self) -> AuthResult<Option<Session>>;

    /// User behind the current session, fetched from the backend
    async fn get_user(&self) -> AuthResult<Option<BackendUser>>;

    async fn sign_out(&self) -> AuthResult<()>;

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> AuthResult<Session>;

    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription;
}
