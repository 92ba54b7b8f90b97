//! GoTrue REST client
//!
//! Talks to the hosted identity service under `{project_url}/auth/v1`. Every
//! request carries the project's anon key in the `apikey` header; calls made
//! on behalf of a user add `Authorization: Bearer <access token>`.
//!
//! The client owns the current [`Session`] and notifies its listeners whenever
//! it changes. Error bodies are normalized here and nowhere else.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::backend::{
    AuthChangeEvent, AuthListener, AuthListeners, AuthResponse, BackendUser, IdentityBackend,
    Session, Subscription, UserAttributes,
};
use super::error::{AuthError, AuthResult};

/// Path of the auth API below the project URL
pub const AUTH_API_PATH: &str = "/auth/v1";

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::Unexpected(format!("Unreadable response from auth server: {err}"))
        } else {
            AuthError::Network(format!("network error: {err}"))
        }
    }
}

/// The error shapes GoTrue uses across versions
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
    code: Option<serde_json::Value>,
}

impl ErrorBody {
    fn into_error(self, status: StatusCode) -> AuthError {
        let message = self
            .error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or_default();
        let code = self.error_code.or_else(|| {
            self.code
                .and_then(|code| code.as_str().map(str::to_string))
        });
        AuthError::backend(message, code, Some(status.as_u16()))
    }
}

#[derive(Clone)]
pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session: Arc<RwLock<Option<Session>>>,
    listeners: AuthListeners,
}

impl std::fmt::Debug for GoTrueClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoTrueClient")
            .field("base_url", &self.base_url)
            .field("has_session", &self.current_session().is_some())
            .finish()
    }
}

impl GoTrueClient {
    /// Create a client for a project URL such as `https://xyz.supabase.co`
    pub fn new(project_url: &str, api_key: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), project_url, api_key)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        project_url: &str,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: format!("{}{}", project_url.trim_end_matches('/'), AUTH_API_PATH),
            api_key: api_key.into(),
            session: Arc::new(RwLock::new(None)),
            listeners: AuthListeners::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Adopt a session obtained elsewhere, e.g. restored from browser storage
    pub fn set_session(&self, session: Session) {
        self.store_session(Some(session), AuthChangeEvent::SignedIn);
    }

    /// Forget the session locally without contacting the backend
    pub fn clear_session(&self) {
        self.store_session(None, AuthChangeEvent::SignedOut);
    }

    /// Completes an implicit-flow redirect.
    ///
    /// `fragment` is the URL fragment (without `#`) the backend appended to
    /// the callback URL. Returns `Ok(None)` when it carries no tokens.
    pub async fn session_from_url_fragment(&self, fragment: &str) -> AuthResult<Option<Session>> {
        let Some(tokens) = FragmentTokens::parse(fragment) else {
            return Ok(None);
        };

        let user: BackendUser = self
            .send(
                self.request(Method::GET, "/user")
                    .bearer_auth(&tokens.access_token),
            )
            .await?;

        let session = Session {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
            expires_at: tokens.expires_at,
            user,
        };

        let event = if tokens.recovery {
            AuthChangeEvent::PasswordRecovery
        } else {
            AuthChangeEvent::SignedIn
        };
        self.store_session(Some(session.clone()), event);
        Ok(Some(session))
    }

    fn store_session(&self, session: Option<Session>, event: AuthChangeEvent) {
        {
            let mut current = self.session.write().unwrap_or_else(PoisonError::into_inner);
            *current = session.clone();
        }
        self.listeners.notify(event, session.as_ref());
    }

    fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .header("apikey", &self.api_key)
    }

    fn authed(&self, method: Method, path: &str) -> AuthResult<RequestBuilder> {
        let token = self.access_token().ok_or(AuthError::NoActiveSession)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AuthResult<T> {
        let response = Self::checked(request).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> AuthResult<()> {
        Self::checked(request).await?;
        Ok(())
    }

    async fn checked(request: RequestBuilder) -> AuthResult<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = serde_json::from_str::<ErrorBody>(&body)
            .unwrap_or_default()
            .into_error(status);
        tracing::debug!(status = status.as_u16(), error = %error, "auth request rejected");
        Err(error)
    }
}

impl IdentityBackend for GoTrueClient {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthResponse> {
        let body: serde_json::Value = self
            .send(
                self.request(Method::POST, "/signup")
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;

        // With email confirmation enabled the backend returns the bare user
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)
                .map_err(|e| AuthError::Unexpected(e.to_string()))?;
            self.store_session(Some(session.clone()), AuthChangeEvent::SignedIn);
            Ok(AuthResponse {
                user: Some(session.user.clone()),
                session: Some(session),
            })
        } else {
            let user: BackendUser =
                serde_json::from_value(body).map_err(|e| AuthError::Unexpected(e.to_string()))?;
            Ok(AuthResponse {
                user: Some(user),
                session: None,
            })
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<AuthResponse> {
        let session: Session = self
            .send(
                self.request(Method::POST, "/token?grant_type=password")
                    .json(&json!({ "email": email, "password": password })),
            )
            .await?;

        self.store_session(Some(session.clone()), AuthChangeEvent::SignedIn);
        Ok(AuthResponse {
            user: Some(session.user.clone()),
            session: Some(session),
        })
    }

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        scopes: Option<&str>,
    ) -> AuthResult<String> {
        let mut url = Url::parse(&self.endpoint("/authorize"))
            .map_err(|e| AuthError::Unexpected(format!("invalid auth URL: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", provider);
            query.append_pair("redirect_to", redirect_to);
            if let Some(scopes) = scopes {
                query.append_pair("scopes", scopes);
            }
        }
        Ok(url.into())
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AuthResult<()> {
        self.send_empty(
            self.request(Method::POST, "/recover")
                .query(&[("redirect_to", redirect_to)])
                .json(&json!({ "email": email })),
        )
        .await
    }

    async fn update_user(&self, attributes: &UserAttributes) -> AuthResult<BackendUser> {
        let user: BackendUser = self
            .send(self.authed(Method::PUT, "/user")?.json(attributes))
            .await?;

        let updated = {
            let mut current = self.session.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(session) = current.as_mut() {
                session.user = user.clone();
            }
            current.clone()
        };
        self.listeners
            .notify(AuthChangeEvent::UserUpdated, updated.as_ref());

        Ok(user)
    }

    async fn get_session(&self) -> AuthResult<Option<Session>> {
        Ok(self.current_session())
    }

    async fn get_user(&self) -> AuthResult<Option<BackendUser>> {
        let Some(token) = self.access_token() else {
            return Ok(None);
        };

        let user = self
            .send(self.request(Method::GET, "/user").bearer_auth(token))
            .await?;
        Ok(Some(user))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let Some(token) = self.access_token() else {
            self.clear_session();
            return Ok(());
        };

        let result = self
            .send_empty(self.request(Method::POST, "/logout").bearer_auth(token))
            .await;
        // The local session goes away even if the backend already forgot it
        self.clear_session();

        match result {
            Err(AuthError::Backend {
                status: Some(401 | 403 | 404),
                ..
            }) => Ok(()),
            other => other,
        }
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> AuthResult<Session> {
        let session: Session = self
            .send(
                self.request(Method::POST, "/token?grant_type=pkce")
                    .json(&json!({ "auth_code": code, "code_verifier": code_verifier })),
            )
            .await?;

        self.store_session(Some(session.clone()), AuthChangeEvent::SignedIn);
        Ok(session)
    }

    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

/// Tokens carried in an implicit-flow redirect fragment
#[derive(Debug, Clone, PartialEq)]
struct FragmentTokens {
    access_token: String,
    refresh_token: String,
    token_type: String,
    expires_in: Option<i64>,
    expires_at: Option<i64>,
    recovery: bool,
}

impl FragmentTokens {
    fn parse(fragment: &str) -> Option<Self> {
        let fragment = fragment.trim_start_matches('#');
        let url = Url::parse(&format!("http://localhost/?{fragment}")).ok()?;

        let mut access_token = None;
        let mut refresh_token = None;
        let mut token_type = None;
        let mut expires_in = None;
        let mut expires_at = None;
        let mut recovery = false;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "access_token" => access_token = Some(value.into_owned()),
                "refresh_token" => refresh_token = Some(value.into_owned()),
                "token_type" => token_type = Some(value.into_owned()),
                "expires_in" => expires_in = value.parse().ok(),
                "expires_at" => expires_at = value.parse().ok(),
                "type" => recovery = value == "recovery",
                _ => {}
            }
        }

        Some(Self {
            access_token: access_token.filter(|t| !t.is_empty())?,
            refresh_token: refresh_token.unwrap_or_default(),
            token_type: token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_in,
            expires_at,
            recovery,
        })
    }
}
