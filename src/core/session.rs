//! Session store
//!
//! Holds who is signed in for the running app. The store is built explicitly
//! around an [`AuthClient`] and a [`SessionObserver`] that hears about every
//! state change; the UI layer provides one instance through context.
//!
//! Lifecycle: [`SessionStore::mount`] subscribes to backend notifications and
//! restores any existing session. [`SessionStore::teardown`] releases the
//! subscription; results of operations still in flight are dropped after that.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::auth::{
    AuthChangeEvent, AuthClient, AuthError, AuthResult, BackendUser, IdentityBackend,
    OAuthRedirect, ProfileUpdate, Session, Subscription, listener,
};
use crate::core::validation::{email_problem, password_problems};

/// Where the app goes after signing out
pub const SIGNED_OUT_REDIRECT: &str = "/auth/login";

/// The signed-in user as the app sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
}

impl AuthUser {
    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

impl From<&BackendUser> for AuthUser {
    fn from(user: &BackendUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone().unwrap_or_default(),
            name: user.metadata_str("name").map(str::to_string),
            avatar_url: user.metadata_str("avatar_url").map(str::to_string),
            created_at: user.created_at,
            last_login: user.last_sign_in_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user: Option<AuthUser>,
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Receives store output. Implementations must not call back into the store.
pub trait SessionObserver: Send + Sync {
    fn state_changed(&self, state: &SessionState);

    /// The store wants the app to navigate to `path`
    fn redirect(&self, path: &str);
}

/// Observer that ignores everything, for server-side use
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn state_changed(&self, _state: &SessionState) {}

    fn redirect(&self, _path: &str) {}
}

struct Shared {
    state: RwLock<SessionState>,
    observer: Arc<dyn SessionObserver>,
    alive: AtomicBool,
}

impl Shared {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Applies `change` unless the store was torn down
    fn update(&self, change: impl FnOnce(&mut SessionState)) {
        if !self.is_alive() {
            return;
        }

        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            change(&mut state);
            state.clone()
        };
        self.observer.state_changed(&snapshot);
    }

    fn apply_event(&self, event: AuthChangeEvent, session: Option<&Session>) {
        tracing::debug!(?event, has_session = session.is_some(), "session notification");
        let user = session.map(|session| AuthUser::from(&session.user));
        self.update(|state| {
            state.user = user;
            state.is_loading = false;
        });
    }

    fn redirect(&self, path: &str) {
        if self.is_alive() {
            self.observer.redirect(path);
        }
    }
}

pub struct SessionStore<B> {
    client: AuthClient<B>,
    shared: Arc<Shared>,
    subscription: Mutex<Option<Subscription>>,
}

impl<B: IdentityBackend> SessionStore<B> {
    pub fn new(client: AuthClient<B>, observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            client,
            shared: Arc::new(Shared {
                state: RwLock::new(SessionState::default()),
                observer,
                alive: AtomicBool::new(true),
            }),
            subscription: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &AuthClient<B> {
        &self.client
    }

    pub fn state(&self) -> SessionState {
        self.shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.state().user
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Subscribe to session notifications and restore the current session.
    ///
    /// Never fails: a session that cannot be restored leaves the user signed
    /// out. Mounting again replaces the previous subscription.
    pub async fn mount(&self) {
        self.shared.alive.store(true, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let subscription = self
            .client
            .subscribe(listener(move |event, session| shared.apply_event(event, session)));
        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(subscription);
        drop(previous);

        let user = match self.restore().await {
            Ok(user) => user,
            Err(error) => {
                tracing::warn!(error = %error, "failed to restore session");
                None
            }
        };

        tracing::info!(signed_in = user.is_some(), "session store mounted");
        self.shared.update(|state| {
            state.user = user;
            state.is_loading = false;
        });
    }

    async fn restore(&self) -> AuthResult<Option<AuthUser>> {
        if self.client.get_session().await?.is_none() {
            return Ok(None);
        }
        let user = self.client.get_user().await?;
        Ok(user.as_ref().map(AuthUser::from))
    }

    /// Release the subscription. Later results are discarded.
    pub fn teardown(&self) {
        self.shared.alive.store(false, Ordering::SeqCst);
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(subscription);
        tracing::debug!("session store torn down");
    }

    fn begin(&self) {
        self.shared.update(|state| state.is_loading = true);
    }

    /// Logs a failure, applies a success, and always clears the loading flag
    fn settle<T>(
        &self,
        operation: &str,
        result: AuthResult<T>,
        apply: impl FnOnce(&mut SessionState, &T),
    ) -> AuthResult<T> {
        match &result {
            Ok(value) => self.shared.update(|state| {
                apply(state, value);
                state.is_loading = false;
            }),
            Err(error) => {
                tracing::error!(operation, error = %error, "session operation failed");
                self.shared.update(|state| state.is_loading = false);
            }
        }
        result
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthUser> {
        self.begin();
        let result = self
            .client
            .sign_in_with_email(email, password)
            .await
            .map(|session| AuthUser::from(&session.user));
        self.settle("sign_in", result, |state, user| {
            state.user = Some(user.clone())
        })
    }

    /// Register a new account. The password strength check runs before
    /// anything is sent.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> AuthResult<AuthUser> {
        self.begin();
        let result = self.register(email, password, name).await;
        self.settle("sign_up", result, |state, (user, has_session)| {
            // A pending email confirmation creates the account but not a session
            if *has_session {
                state.user = Some(user.clone());
            }
        })
        .map(|(user, _)| user)
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> AuthResult<(AuthUser, bool)> {
        if let Some(problem) = password_problems(password) {
            return Err(AuthError::Validation(problem));
        }

        let response = self.client.sign_up_with_email(email, password).await?;
        let created = response.user.ok_or_else(|| {
            AuthError::Unexpected("Registration failed: No user data returned".to_string())
        })?;
        let mut user = AuthUser::from(&created);

        if let Some(name) = name.filter(|name| !name.trim().is_empty()) {
            // Without a session (email confirmation pending) the name cannot be stored yet
            if response.session.is_some() {
                let update = ProfileUpdate {
                    name: Some(name.to_string()),
                    avatar_url: None,
                };
                if let Err(error) = self.client.update_profile(update).await {
                    tracing::warn!(error = %error, "failed to store display name");
                }
            }
            user.name = Some(name.to_string());
        }

        Ok((user, response.session.is_some()))
    }

    /// Returns the provider consent URL; the user is set once the callback
    /// completes
    pub fn sign_in_with_provider(&self, provider: &str) -> AuthResult<OAuthRedirect> {
        self.begin();
        let result = self.client.sign_in_with_provider(provider);
        self.settle("sign_in_with_provider", result, |_, _| {})
    }

    pub async fn sign_out(&self) -> AuthResult<()> {
        self.begin();
        let result = self.client.sign_out().await;
        let result = self.settle("sign_out", result, |state, _| state.user = None);
        if result.is_ok() {
            self.shared.redirect(SIGNED_OUT_REDIRECT);
        }
        result
    }

    pub async fn reset_password(&self, email: &str) -> AuthResult<()> {
        self.begin();
        let result = match email_problem(email) {
            Some(problem) => Err(AuthError::Validation(problem)),
            None => self.client.reset_password(email).await,
        };
        self.settle("reset_password", result, |_, _| {})
    }

    /// Set a new password for the signed-in user, e.g. from a recovery link
    pub async fn update_password(&self, password: &str) -> AuthResult<()> {
        self.begin();
        let result = match password_problems(password) {
            Some(problem) => Err(AuthError::Validation(problem)),
            None => self.client.update_password(password).await.map(|_| ()),
        };
        self.settle("update_password", result, |_, _| {})
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> AuthResult<AuthUser> {
        self.begin();
        let result = match self.user() {
            Some(current) => self
                .client
                .update_profile(update.clone())
                .await
                .map(|_| AuthUser {
                    name: update.name.or(current.name.clone()),
                    avatar_url: update.avatar_url.or(current.avatar_url.clone()),
                    ..current
                }),
            None => Err(AuthError::NotSignedIn),
        };
        self.settle("update_profile", result, |state, user| {
            state.user = Some(user.clone())
        })
    }
}

impl<B> Drop for SessionStore<B> {
    fn drop(&mut self) {
        self.shared.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::testing::MockBackend;

    #[derive(Default)]
    struct RecordingObserver {
        states: Mutex<Vec<SessionState>>,
        redirects: Mutex<Vec<String>>,
    }

    impl RecordingObserver {
        fn state_count(&self) -> usize {
            self.states.lock().unwrap().len()
        }

        fn last_state(&self) -> Option<SessionState> {
            self.states.lock().unwrap().last().cloned()
        }

        fn redirects(&self) -> Vec<String> {
            self.redirects.lock().unwrap().clone()
        }
    }

    impl SessionObserver for RecordingObserver {
        fn state_changed(&self, state: &SessionState) {
            self.states.lock().unwrap().push(state.clone());
        }

        fn redirect(&self, path: &str) {
            self.redirects.lock().unwrap().push(path.to_string());
        }
    }

    fn store(backend: &MockBackend) -> (SessionStore<MockBackend>, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let client = AuthClient::new(backend.clone(), "http://localhost:3000");
        (SessionStore::new(client, observer.clone()), observer)
    }

    #[test]
    fn test_initial_state_is_loading() {
        let (store, observer) = store(&MockBackend::new());
        assert_eq!(store.state(), SessionState::default());
        assert!(store.state().is_loading);
        assert!(!store.is_mounted());
        assert_eq!(observer.state_count(), 0);
    }

    #[test]
    fn test_user_projection() {
        let backend = MockBackend::new().with_user("ann@example.com", "Passw0rd", Some("Ann"));
        let session = backend.session_for("ann@example.com").unwrap();

        let user = AuthUser::from(&session.user);

        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.name.as_deref(), Some("Ann"));
        assert_eq!(user.display_name(), "Ann");
        assert_eq!(user.avatar_url, None);
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let user = AuthUser {
            id: "u1".to_string(),
            email: "bob@example.com".to_string(),
            name: Some(" ".to_string()),
            avatar_url: None,
            created_at: None,
            last_login: None,
        };
        assert_eq!(user.display_name(), "bob@example.com");
    }

    #[tokio::test]
    async fn test_mount_without_session() {
        let backend = MockBackend::new();
        let (store, observer) = store(&backend);

        store.mount().await;

        assert_eq!(
            store.state(),
            SessionState {
                user: None,
                is_loading: false
            }
        );
        assert!(store.is_mounted());
        assert_eq!(backend.listener_count(), 1);
        assert_eq!(observer.last_state(), Some(store.state()));
    }

    #[tokio::test]
    async fn test_mount_restores_session() {
        let backend = MockBackend::new()
            .with_user("ann@example.com", "Passw0rd", Some("Ann"))
            .signed_in_as("ann@example.com");
        let (store, _) = store(&backend);

        store.mount().await;

        let user = store.user().unwrap();
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.name.as_deref(), Some("Ann"));
        assert!(!store.state().is_loading);
    }

    #[tokio::test]
    async fn test_mount_swallows_restore_failure() {
        let backend = MockBackend::new();
        backend.fail_next(AuthError::Network("connection reset".to_string()));
        let (store, _) = store(&backend);

        store.mount().await;

        assert_eq!(store.user(), None);
        assert!(!store.state().is_loading);
    }

    /// Collects `log` records, which is where `tracing` events go when no
    /// subscriber is installed
    struct CapturedLog(Mutex<Vec<String>>);

    impl log::Log for CapturedLog {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            self.0.lock().unwrap().push(format!("{} {}", record.level(), record.args()));
        }

        fn flush(&self) {}
    }

    static CAPTURED_LOG: CapturedLog = CapturedLog(Mutex::new(Vec::new()));

    #[tokio::test]
    async fn test_restore_failure_reaches_log_without_subscriber() {
        let _ = log::set_logger(&CAPTURED_LOG);
        log::set_max_level(log::LevelFilter::Trace);

        let backend = MockBackend::new();
        backend.fail_next(AuthError::Network("socket closed early".to_string()));
        let (store, _) = store(&backend);
        store.mount().await;

        let lines = CAPTURED_LOG.0.lock().unwrap().clone();
        assert!(
            lines.iter().any(|line| line.starts_with("WARN")
                && line.contains("failed to restore session")
                && line.contains("socket closed early")),
            "{lines:?}"
        );
    }

    #[tokio::test]
    async fn test_remount_keeps_single_subscription() {
        let backend = MockBackend::new();
        let (store, _) = store(&backend);

        store.mount().await;
        store.mount().await;

        assert_eq!(backend.listener_count(), 1);
    }

    #[tokio::test]
    async fn test_notifications_replace_user() {
        let backend = MockBackend::new().with_user("ann@example.com", "Passw0rd", None);
        let (store, _) = store(&backend);
        store.mount().await;

        backend.emit(
            AuthChangeEvent::SignedIn,
            backend.session_for("ann@example.com"),
        );
        assert_eq!(store.user().unwrap().email, "ann@example.com");

        backend.emit(AuthChangeEvent::SignedOut, None);
        assert_eq!(store.user(), None);
        assert!(!store.state().is_loading);
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let backend = MockBackend::new().with_user("ann@example.com", "Passw0rd", None);
        let (store, observer) = store(&backend);

        let user = store.sign_in("ann@example.com", "Passw0rd").await.unwrap();

        assert_eq!(user.email, "ann@example.com");
        assert_eq!(store.user(), Some(user));
        assert!(!store.state().is_loading);
        // The loading flag was raised while the call was in flight
        assert!(observer.states.lock().unwrap()[0].is_loading);
    }

    #[tokio::test]
    async fn test_sign_in_failure_returns_original_error() {
        let backend = MockBackend::new().with_user("ann@example.com", "Passw0rd", None);
        let (store, _) = store(&backend);

        let error = store.sign_in("ann@example.com", "nope").await.unwrap_err();

        assert_eq!(error.message(), "Invalid login credentials");
        assert_eq!(store.user(), None);
        assert!(!store.state().is_loading);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_weak_password_locally() {
        let backend = MockBackend::new();
        let (store, _) = store(&backend);

        let error = store.sign_up("new@x.com", "abc", None).await.unwrap_err();

        assert!(matches!(error, AuthError::Validation(_)));
        assert!(error.message().starts_with("Password must contain"));
        assert_eq!(backend.calls_starting_with("sign_up"), 0);
        assert!(!store.state().is_loading);
    }

    #[tokio::test]
    async fn test_sign_up_stores_name() {
        let backend = MockBackend::new();
        let (store, _) = store(&backend);

        let user = store
            .sign_up("new@x.com", "Passw0rd", Some("Nia"))
            .await
            .unwrap();

        assert_eq!(user.name.as_deref(), Some("Nia"));
        assert_eq!(store.user().unwrap().name.as_deref(), Some("Nia"));
        assert_eq!(
            backend.calls(),
            vec!["sign_up:new@x.com:Passw0rd", "update_user:data"]
        );
    }

    #[tokio::test]
    async fn test_sign_up_awaiting_confirmation_stays_signed_out() {
        let backend = MockBackend::new().requiring_email_confirmation();
        let (store, _) = store(&backend);
        store.mount().await;

        let user = store
            .sign_up("new@x.com", "Passw0rd", Some("Nia"))
            .await
            .unwrap();

        assert_eq!(user.email, "new@x.com");
        assert_eq!(user.name.as_deref(), Some("Nia"));
        assert_eq!(store.user(), None);
        assert!(!store.state().is_authenticated());
        assert!(!store.state().is_loading);
        // No session to store the name with
        assert_eq!(backend.calls(), vec!["sign_up:new@x.com:Passw0rd"]);
    }

    #[tokio::test]
    async fn test_sign_up_existing_account() {
        let backend = MockBackend::new().with_user("ann@example.com", "Passw0rd", None);
        let (store, _) = store(&backend);

        let error = store
            .sign_up("ann@example.com", "Passw0rd", None)
            .await
            .unwrap_err();

        assert_eq!(error.message(), "User already registered");
        assert_eq!(error.code(), Some("user_already_exists"));
    }

    #[tokio::test]
    async fn test_reset_password_validates_email_first() {
        let backend = MockBackend::new();
        let (store, _) = store(&backend);

        let error = store.reset_password("not-an-email").await.unwrap_err();
        assert_eq!(error.message(), "Please enter a valid email address");
        assert_eq!(backend.calls_starting_with("reset_password"), 0);

        store.reset_password("ann@example.com").await.unwrap();
        assert_eq!(backend.calls_starting_with("reset_password"), 1);
    }

    #[tokio::test]
    async fn test_update_password() {
        let backend = MockBackend::new()
            .with_user("ann@example.com", "Passw0rd", None)
            .signed_in_as("ann@example.com");
        let (store, _) = store(&backend);

        let error = store.update_password("short").await.unwrap_err();
        assert!(matches!(error, AuthError::Validation(_)));

        store.update_password("Str0nger-pass").await.unwrap();
        assert_eq!(backend.calls(), vec!["update_user:password"]);
    }

    #[tokio::test]
    async fn test_update_profile_requires_user() {
        let backend = MockBackend::new();
        let (store, _) = store(&backend);

        let error = store
            .update_profile(ProfileUpdate {
                name: Some("Ann".to_string()),
                avatar_url: None,
            })
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Cannot update profile: No user is currently logged in"
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_profile_merges_fields() {
        let backend = MockBackend::new()
            .with_user("ann@example.com", "Passw0rd", Some("Ann"))
            .signed_in_as("ann@example.com");
        let (store, _) = store(&backend);
        store.mount().await;

        let user = store
            .update_profile(ProfileUpdate {
                name: None,
                avatar_url: Some("https://cdn/a.png".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(user.name.as_deref(), Some("Ann"));
        assert_eq!(user.avatar_url.as_deref(), Some("https://cdn/a.png"));
        assert_eq!(store.user(), Some(user));
    }

    #[tokio::test]
    async fn test_sign_out_clears_user_and_redirects() {
        let backend = MockBackend::new()
            .with_user("ann@example.com", "Passw0rd", None)
            .signed_in_as("ann@example.com");
        let (store, observer) = store(&backend);
        store.mount().await;
        assert!(store.state().is_authenticated());

        store.sign_out().await.unwrap();

        assert_eq!(store.user(), None);
        assert_eq!(observer.redirects(), vec!["/auth/login"]);
    }

    #[tokio::test]
    async fn test_failed_sign_out_does_not_redirect() {
        let backend = MockBackend::new();
        backend.fail_next(AuthError::Network("offline".to_string()));
        let (store, observer) = store(&backend);

        assert!(store.sign_out().await.is_err());
        assert!(observer.redirects().is_empty());
    }

    #[test]
    fn test_unsupported_provider() {
        let backend = MockBackend::new();
        let (store, _) = store(&backend);

        let error = store.sign_in_with_provider("github").unwrap_err();

        assert_eq!(error, AuthError::UnsupportedProvider("github".to_string()));
        assert!(!store.state().is_loading);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_supported_provider_leaves_user_alone() {
        let backend = MockBackend::new();
        let (store, _) = store(&backend);

        let redirect = store.sign_in_with_provider("google").unwrap();

        assert_eq!(redirect.provider, "google");
        assert_eq!(store.user(), None);
    }

    #[tokio::test]
    async fn test_teardown_drops_late_results() {
        let backend = MockBackend::new().with_user("ann@example.com", "Passw0rd", None);
        let (store, observer) = store(&backend);
        store.mount().await;
        let gate = backend.gate_next_sign_in();

        let (result, seen_at_teardown) = tokio::join!(
            store.sign_in("ann@example.com", "Passw0rd"),
            async {
                store.teardown();
                let seen = observer.state_count();
                gate.notify_one();
                seen
            }
        );

        // The backend call itself went through
        assert!(result.is_ok());
        assert_eq!(backend.listener_count(), 0);
        assert!(!store.is_mounted());
        // but nothing reached the store or the observer afterwards
        assert_eq!(store.user(), None);
        assert_eq!(observer.state_count(), seen_at_teardown);
    }
}
