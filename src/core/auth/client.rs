//! Auth client wrapper
//!
//! One method per auth operation, each returning [`AuthResult`]. Failures are
//! logged here before they are handed back, so callers only decide what to show.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::backend::{
    AuthListener, AuthResponse, BackendUser, IdentityBackend, Session, Subscription,
    UserAttributes,
};
use super::error::{AuthError, AuthResult};

/// Path the identity backend sends users back to after OAuth consent
pub const CALLBACK_PATH: &str = "/auth/callback";

/// Path linked from password reset emails
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

/// Cookie carrying the access token; its presence is what the server checks
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Cookie holding a PKCE code verifier for the OAuth callback, if any
pub const CODE_VERIFIER_COOKIE: &str = "sb-code-verifier";

/// Cookie lifetime when the backend did not say how long the token lives
const DEFAULT_COOKIE_MAX_AGE: i64 = 3600;

/// `Set-Cookie` value for the access token cookie. `None` expires it.
pub fn access_token_cookie(session: Option<&Session>) -> String {
    match session {
        Some(session) => format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            ACCESS_TOKEN_COOKIE,
            session.access_token,
            session.expires_in.unwrap_or(DEFAULT_COOKIE_MAX_AGE)
        ),
        None => format!("{}=; Path=/; Max-Age=0; SameSite=Lax", ACCESS_TOKEN_COOKIE),
    }
}

/// A social sign-in provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OAuthProvider {
    /// Identifier understood by the backend
    pub name: &'static str,
    /// Button label
    pub label: &'static str,
    pub scopes: Option<&'static str>,
}

/// Providers offered on the login and registration pages
pub const OAUTH_PROVIDERS: &[OAuthProvider] = &[
    OAuthProvider {
        name: "google",
        label: "Google",
        scopes: Some("profile email"),
    },
    OAuthProvider {
        name: "facebook",
        label: "Facebook",
        scopes: None,
    },
    OAuthProvider {
        name: "linkedin",
        label: "LinkedIn",
        scopes: None,
    },
];

pub fn find_provider(name: &str) -> Option<&'static OAuthProvider> {
    OAUTH_PROVIDERS.iter().find(|provider| provider.name == name)
}

/// Where to send the browser to start an OAuth sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthRedirect {
    pub provider: String,
    pub url: String,
}

/// Profile fields a signed-in user may change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    fn into_metadata(self) -> Value {
        let mut data = Map::new();
        if let Some(name) = self.name {
            data.insert("name".to_string(), Value::String(name));
        }
        if let Some(avatar_url) = self.avatar_url {
            data.insert("avatar_url".to_string(), Value::String(avatar_url));
        }
        Value::Object(data)
    }
}

fn logged<T>(operation: &str, result: AuthResult<T>) -> AuthResult<T> {
    if let Err(error) = &result {
        tracing::warn!(operation, error = %error, "auth operation failed");
    }
    result
}

/// Auth operations against an [`IdentityBackend`]
#[derive(Debug, Clone)]
pub struct AuthClient<B> {
    backend: B,
    site_url: String,
}

impl<B: IdentityBackend> AuthClient<B> {
    /// `site_url` is this app's public origin, used to build redirect targets
    pub fn new(backend: B, site_url: impl Into<String>) -> Self {
        let site_url = site_url.into().trim_end_matches('/').to_string();
        Self { backend, site_url }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn callback_url(&self) -> String {
        format!("{}{}", self.site_url, CALLBACK_PATH)
    }

    pub fn reset_password_url(&self) -> String {
        format!("{}{}", self.site_url, RESET_PASSWORD_PATH)
    }

    pub async fn sign_up_with_email(&self, email: &str, password: &str) -> AuthResult<AuthResponse> {
        logged("sign_up", self.backend.sign_up(email, password).await)
    }

    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> AuthResult<Session> {
        let result = self
            .backend
            .sign_in_with_password(email, password)
            .await
            .and_then(|response| {
                response
                    .session
                    .ok_or_else(|| AuthError::Unexpected("Authentication failed".to_string()))
            });
        logged("sign_in", result)
    }

    /// Resolve a provider name and build its consent URL. Unknown providers
    /// never reach the backend.
    pub fn sign_in_with_provider(&self, provider: &str) -> AuthResult<OAuthRedirect> {
        let result = match find_provider(provider) {
            Some(entry) => self
                .backend
                .authorize_url(entry.name, &self.callback_url(), entry.scopes)
                .map(|url| OAuthRedirect {
                    provider: entry.name.to_string(),
                    url,
                }),
            None => Err(AuthError::UnsupportedProvider(provider.to_string())),
        };
        logged("sign_in_with_provider", result)
    }

    pub async fn reset_password(&self, email: &str) -> AuthResult<()> {
        let result = self
            .backend
            .reset_password_for_email(email, &self.reset_password_url())
            .await;
        logged("reset_password", result)
    }

    /// Set a new password for the signed-in user
    pub async fn update_password(&self, password: &str) -> AuthResult<BackendUser> {
        let result = match self.backend.get_session().await {
            Ok(Some(_)) => {
                let attributes = UserAttributes {
                    password: Some(password.to_string()),
                    ..Default::default()
                };
                self.backend.update_user(&attributes).await
            }
            Ok(None) => Err(AuthError::NoActiveSession),
            Err(error) => Err(error),
        };
        logged("update_password", result)
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> AuthResult<BackendUser> {
        let attributes = UserAttributes {
            data: Some(update.into_metadata()),
            ..Default::default()
        };
        logged("update_profile", self.backend.update_user(&attributes).await)
    }

    pub async fn get_session(&self) -> AuthResult<Option<Session>> {
        logged("get_session", self.backend.get_session().await)
    }

    pub async fn get_user(&self) -> AuthResult<Option<BackendUser>> {
        logged("get_user", self.backend.get_user().await)
    }

    pub async fn sign_out(&self) -> AuthResult<()> {
        logged("sign_out", self.backend.sign_out().await)
    }

    pub async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> AuthResult<Session> {
        logged(
            "exchange_code_for_session",
            self.backend
                .exchange_code_for_session(code, code_verifier)
                .await,
        )
    }

    pub fn subscribe(&self, listener: AuthListener) -> Subscription {
        self.backend.on_auth_state_change(listener)
    }
}
