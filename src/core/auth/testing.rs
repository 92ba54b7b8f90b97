//! In-memory identity backend used by unit tests

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::Notify;

use super::backend::{
    AuthChangeEvent, AuthListener, AuthListeners, AuthResponse, BackendUser, IdentityBackend,
    Session, Subscription, UserAttributes,
};
use super::error::{AuthError, AuthResult};

struct Account {
    password: String,
    user: BackendUser,
}

#[derive(Default)]
struct MockState {
    accounts: Mutex<BTreeMap<String, Account>>,
    session: Mutex<Option<Session>>,
    calls: Mutex<Vec<String>>,
    fail_next: Mutex<Option<AuthError>>,
    gate: Mutex<Option<Arc<Notify>>>,
    confirm_email: Mutex<bool>,
    listeners: AuthListeners,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<MockState>,
}

impl MockBackend {
    /// The only authorization code [`IdentityBackend::exchange_code_for_session`] accepts
    pub const VALID_CODE: &'static str = "valid-code";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, email: &str, password: &str, name: Option<&str>) -> Self {
        let id = format!("user-{}", self.state.accounts.lock().unwrap().len() + 1);
        let metadata = match name {
            Some(name) => json!({ "name": name }),
            None => json!({}),
        };
        let user = BackendUser {
            id,
            email: Some(email.to_string()),
            user_metadata: metadata,
            created_at: Some(Utc::now()),
            last_sign_in_at: None,
        };
        self.state.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user,
            },
        );
        self
    }

    /// Sign-ups return the new user without a session, as GoTrue does while
    /// the email address awaits confirmation
    pub fn requiring_email_confirmation(self) -> Self {
        *self.state.confirm_email.lock().unwrap() = true;
        self
    }

    /// Start with a live session for an existing account
    pub fn signed_in_as(self, email: &str) -> Self {
        let session = self.session_for(email);
        *self.state.session.lock().unwrap() = session;
        self
    }

    pub fn session_for(&self, email: &str) -> Option<Session> {
        let accounts = self.state.accounts.lock().unwrap();
        accounts.get(email).map(|account| Session {
            access_token: format!("token-{}", account.user.id),
            refresh_token: format!("refresh-{}", account.user.id),
            token_type: "bearer".to_string(),
            expires_in: Some(3600),
            expires_at: None,
            user: account.user.clone(),
        })
    }

    /// Make the next operation fail with `error`
    pub fn fail_next(&self, error: AuthError) {
        *self.state.fail_next.lock().unwrap() = Some(error);
    }

    /// Hold the next password sign-in until the returned handle is notified
    pub fn gate_next_sign_in(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.state.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    /// Mutating calls seen so far
    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn listener_count(&self) -> usize {
        self.state.listeners.len()
    }

    /// Deliver an auth change notification as the backend would
    pub fn emit(&self, event: AuthChangeEvent, session: Option<Session>) {
        self.state.listeners.notify(event, session.as_ref());
    }

    fn record(&self, call: impl Into<String>) {
        self.state.calls.lock().unwrap().push(call.into());
    }

    fn take_failure(&self) -> AuthResult<()> {
        match self.state.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn start_session(&self, email: &str, event: AuthChangeEvent) -> Option<Session> {
        let session = self.session_for(email);
        *self.state.session.lock().unwrap() = session.clone();
        self.state.listeners.notify(event, session.as_ref());
        session
    }
}

impl IdentityBackend for MockBackend {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<AuthResponse> {
        self.record(format!("sign_up:{email}:{password}"));
        self.take_failure()?;

        if self.state.accounts.lock().unwrap().contains_key(email) {
            return Err(AuthError::backend(
                "User already registered",
                Some("user_already_exists".to_string()),
                Some(422),
            ));
        }

        let backend = self.clone().with_user(email, password, None);
        if *self.state.confirm_email.lock().unwrap() {
            let user = backend.session_for(email).map(|session| session.user);
            return Ok(AuthResponse {
                user,
                session: None,
            });
        }
        let session = backend.start_session(email, AuthChangeEvent::SignedIn);
        Ok(AuthResponse {
            user: session.as_ref().map(|s| s.user.clone()),
            session,
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AuthResult<AuthResponse> {
        self.record(format!("sign_in:{email}"));
        let gate = self.state.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.take_failure()?;

        let valid = self
            .state
            .accounts
            .lock()
            .unwrap()
            .get(email)
            .is_some_and(|account| account.password == password);
        if !valid {
            return Err(AuthError::backend(
                "Invalid login credentials",
                None,
                Some(400),
            ));
        }

        let session = self.start_session(email, AuthChangeEvent::SignedIn);
        Ok(AuthResponse {
            user: session.as_ref().map(|s| s.user.clone()),
            session,
        })
    }

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        scopes: Option<&str>,
    ) -> AuthResult<String> {
        self.record(format!("authorize:{provider}"));
        self.take_failure()?;

        let mut url =
            format!("https://mock.test/authorize?provider={provider}&redirect_to={redirect_to}");
        if let Some(scopes) = scopes {
            url.push_str(&format!("&scopes={scopes}"));
        }
        Ok(url)
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> AuthResult<()> {
        self.record(format!("reset_password:{email}:{redirect_to}"));
        self.take_failure()
    }

    async fn update_user(&self, attributes: &UserAttributes) -> AuthResult<BackendUser> {
        let mut fields = Vec::new();
        if attributes.email.is_some() {
            fields.push("email");
        }
        if attributes.password.is_some() {
            fields.push("password");
        }
        if attributes.data.is_some() {
            fields.push("data");
        }
        self.record(format!("update_user:{}", fields.join(",")));
        self.take_failure()?;

        let email = self
            .state
            .session
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|s| s.user.email.clone())
            .ok_or_else(|| AuthError::backend("Auth session missing!", None, Some(401)))?;

        let user = {
            let mut accounts = self.state.accounts.lock().unwrap();
            let account = accounts
                .get_mut(&email)
                .ok_or_else(|| AuthError::backend("User not found", None, Some(404)))?;
            if let Some(password) = &attributes.password {
                account.password = password.clone();
            }
            if let Some(Value::Object(data)) = &attributes.data {
                if !account.user.user_metadata.is_object() {
                    account.user.user_metadata = json!({});
                }
                if let Some(metadata) = account.user.user_metadata.as_object_mut() {
                    for (key, value) in data {
                        metadata.insert(key.clone(), value.clone());
                    }
                }
            }
            account.user.clone()
        };

        let session = self.start_session(&email, AuthChangeEvent::UserUpdated);
        debug_assert!(session.is_some());
        Ok(user)
    }

    async fn get_session(&self) -> AuthResult<Option<Session>> {
        self.take_failure()?;
        Ok(self.state.session.lock().unwrap().clone())
    }

    async fn get_user(&self) -> AuthResult<Option<BackendUser>> {
        self.take_failure()?;
        Ok(self
            .state
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.user.clone()))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.record("sign_out");
        self.take_failure()?;

        *self.state.session.lock().unwrap() = None;
        self.state.listeners.notify(AuthChangeEvent::SignedOut, None);
        Ok(())
    }

    async fn exchange_code_for_session(
        &self,
        code: &str,
        _code_verifier: Option<&str>,
    ) -> AuthResult<Session> {
        self.record(format!("exchange:{code}"));
        self.take_failure()?;

        let first = self.state.accounts.lock().unwrap().keys().next().cloned();
        match (code, first) {
            (Self::VALID_CODE, Some(email)) => self
                .start_session(&email, AuthChangeEvent::SignedIn)
                .ok_or_else(|| AuthError::Unexpected("account vanished".to_string())),
            _ => Err(AuthError::backend(
                "invalid flow state, no valid flow state found",
                Some("flow_state_not_found".to_string()),
                Some(400),
            )),
        }
    }

    fn on_auth_state_change(&self, listener: AuthListener) -> Subscription {
        self.state.listeners.subscribe(listener)
    }
}
