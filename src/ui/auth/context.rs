//! Auth context for the component tree
//!
//! This module provides a reactive wrapper around the [`SessionStore`]:
//! - Mirrors the store state (`user`, `is_loading`) into a signal
//! - Restores the session from localStorage or from the URL fragment the
//!   identity backend appends after an OAuth or recovery redirect
//! - Persists the session to localStorage and the `sb-access-token` cookie
//! - Navigates when the store asks for a redirect
//!
//! The store only exists in the browser. During server rendering the state
//! stays loading so the hydrated page starts from the same view.

use std::sync::Arc;

use leptos::prelude::*;
#[cfg(not(feature = "ssr"))]
use leptos::task::spawn_local;
use leptos_router::hooks::use_navigate;

#[cfg(not(feature = "ssr"))]
use crate::core::auth::access_token_cookie;
use crate::core::auth::{
    AuthError, AuthResult, GoTrueClient, OAuthRedirect, ProfileUpdate, Session, Subscription,
};
use crate::core::session::{AuthUser, SessionObserver, SessionState, SessionStore};

type Store = SessionStore<GoTrueClient>;

#[cfg_attr(feature = "ssr", allow(dead_code))]
const STORAGE_KEY_SESSION: &str = "solosphere.auth.session";

/// Browser-side auth machinery owned by the context
#[cfg_attr(feature = "ssr", allow(dead_code))]
struct ClientAuth {
    store: Arc<Store>,
    /// Keeps localStorage and the cookie in sync with the session
    _persistence: Subscription,
}

/// Forwards store output into the context signals
#[cfg_attr(feature = "ssr", allow(dead_code))]
struct SignalObserver {
    state: RwSignal<SessionState>,
    redirect: RwSignal<Option<String>>,
}

impl SessionObserver for SignalObserver {
    fn state_changed(&self, state: &SessionState) {
        let _ = self.state.try_set(state.clone());
    }

    fn redirect(&self, path: &str) {
        let _ = self.redirect.try_set(Some(path.to_string()));
    }
}

/// Auth context providing session state and auth operations
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// Current session state
    pub state: RwSignal<SessionState>,
    /// Path the store asked to navigate to
    redirect: RwSignal<Option<String>>,
    client: StoredValue<Option<ClientAuth>, LocalStorage>,
}

impl AuthContext {
    /// Current user (if authenticated)
    pub fn user(&self) -> Option<AuthUser> {
        self.state.with(|state| state.user.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|state| state.is_loading)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with(SessionState::is_authenticated)
    }

    fn store(&self) -> AuthResult<Arc<Store>> {
        self.client
            .try_with_value(|client| client.as_ref().map(|client| Arc::clone(&client.store)))
            .flatten()
            .ok_or_else(|| AuthError::Unexpected("Authentication is not available".to_string()))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthUser> {
        self.store()?.sign_in(email, password).await
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> AuthResult<AuthUser> {
        self.store()?.sign_up(email, password, name).await
    }

    pub fn sign_in_with_provider(&self, provider: &str) -> AuthResult<OAuthRedirect> {
        self.store()?.sign_in_with_provider(provider)
    }

    /// Sign out; the store then redirects to the login page
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.store()?.sign_out().await
    }

    pub async fn reset_password(&self, email: &str) -> AuthResult<()> {
        self.store()?.reset_password(email).await
    }

    pub async fn update_password(&self, password: &str) -> AuthResult<()> {
        self.store()?.update_password(password).await
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> AuthResult<AuthUser> {
        self.store()?.update_profile(update).await
    }
}

/// Provide auth context to the component tree. Must be called inside the
/// `<Router>`.
pub fn provide_auth_context() -> AuthContext {
    let state = RwSignal::new(SessionState::default());
    let redirect = RwSignal::new(None::<String>);
    let client = StoredValue::new_local(connect(state, redirect));

    let ctx = AuthContext {
        state,
        redirect,
        client,
    };

    let navigate = use_navigate();
    Effect::new(move |_| {
        if let Some(path) = ctx.redirect.get() {
            ctx.redirect.set(None);
            navigate(&path, Default::default());
        }
    });

    // Restore the session after hydration (client-side only)
    #[cfg(not(feature = "ssr"))]
    {
        Effect::new(move |_| {
            if let Ok(store) = ctx.store() {
                spawn_local(restore(store));
            }
        });
    }

    on_cleanup(move || {
        client.try_with_value(|client| {
            if let Some(client) = client {
                client.store.teardown();
            }
        });
    });

    provide_context(ctx);
    ctx
}

/// Get auth context from the component tree
pub fn use_auth_context() -> AuthContext {
    expect_context::<AuthContext>()
}

/// Build the store from `window.ENV` and adopt any session saved earlier
#[cfg(not(feature = "ssr"))]
fn connect(
    state: RwSignal<SessionState>,
    redirect: RwSignal<Option<String>>,
) -> Option<ClientAuth> {
    use crate::core::auth::{AuthClient, IdentityBackend, listener};
    use crate::core::config::PublicConfig;

    let config = match PublicConfig::from_window() {
        Ok(config) => config,
        Err(error) => {
            leptos::logging::warn!("Authentication disabled: {}", error);
            return None;
        }
    };

    let backend = GoTrueClient::new(&config.supabase_url, config.supabase_anon_key);
    let persistence = backend.on_auth_state_change(listener(|_, session| match session {
        Some(session) => save_to_storage(session),
        None => clear_storage(),
    }));

    if let Some(session) = load_from_storage() {
        backend.set_session(session);
    }

    let observer = Arc::new(SignalObserver { state, redirect });
    let store = SessionStore::new(AuthClient::new(backend, config.site_url), observer);

    Some(ClientAuth {
        store: Arc::new(store),
        _persistence: persistence,
    })
}

#[cfg(feature = "ssr")]
fn connect(
    _state: RwSignal<SessionState>,
    _redirect: RwSignal<Option<String>>,
) -> Option<ClientAuth> {
    None
}

#[cfg(not(feature = "ssr"))]
async fn restore(store: Arc<Store>) {
    let backend = store.client().backend();

    if let Some(fragment) = url_fragment() {
        match backend.session_from_url_fragment(&fragment).await {
            Ok(Some(_)) => clear_url_fragment(),
            Ok(None) => {}
            Err(error) => leptos::logging::warn!("Failed to read session from URL: {}", error),
        }
    }

    store.mount().await;

    // The backend no longer accepts the stored session
    if store.user().is_none() && backend.current_session().is_some() {
        backend.clear_session();
    }
}

/// Whether a stored session is still usable at `now` (unix seconds), with a
/// one minute buffer
#[cfg_attr(feature = "ssr", allow(dead_code))]
fn is_fresh(session: &Session, now: i64) -> bool {
    session.expires_at.is_none_or(|expires_at| expires_at > now + 60)
}

#[cfg(not(feature = "ssr"))]
fn url_fragment() -> Option<String> {
    let hash = web_sys::window()?.location().hash().ok()?;
    let fragment = hash.trim_start_matches('#');
    fragment
        .contains("access_token=")
        .then(|| fragment.to_string())
}

#[cfg(not(feature = "ssr"))]
fn clear_url_fragment() {
    if let Some(window) = web_sys::window() {
        let location = window.location();
        if let (Ok(history), Ok(path), Ok(search)) =
            (window.history(), location.pathname(), location.search())
        {
            let url = format!("{}{}", path, search);
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&url));
        }
    }
}

#[cfg(not(feature = "ssr"))]
fn load_from_storage() -> Option<Session> {
    let storage = web_sys::window()?.local_storage().ok()??;
    let json = storage.get_item(STORAGE_KEY_SESSION).ok()??;
    let session = serde_json::from_str::<Session>(&json).ok()?;

    let now = js_sys::Date::now() as i64 / 1000;
    if is_fresh(&session, now) {
        Some(session)
    } else {
        clear_storage();
        None
    }
}

/// Save the session to localStorage and the access token cookie
#[cfg(not(feature = "ssr"))]
fn save_to_storage(session: &Session) {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.set_item(
                STORAGE_KEY_SESSION,
                &serde_json::to_string(session).unwrap_or_default(),
            );
        }
    }
    set_cookie(&access_token_cookie(Some(session)));
}

/// Clear the session from localStorage and expire the cookie
#[cfg(not(feature = "ssr"))]
fn clear_storage() {
    if let Some(window) = web_sys::window() {
        if let Ok(Some(storage)) = window.local_storage() {
            let _ = storage.remove_item(STORAGE_KEY_SESSION);
        }
    }
    set_cookie(&access_token_cookie(None));
}

#[cfg(not(feature = "ssr"))]
fn set_cookie(cookie: &str) {
    use wasm_bindgen::JsCast;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.dyn_into::<web_sys::HtmlDocument>().ok());
    if let Some(document) = document {
        let _ = document.set_cookie(cookie);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::BackendUser;

    fn session(expires_in: Option<i64>, expires_at: Option<i64>) -> Session {
        Session {
            access_token: "token-123".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_in,
            expires_at,
            user: BackendUser {
                id: "u1".to_string(),
                email: Some("ann@example.com".to_string()),
                user_metadata: serde_json::Value::Null,
                created_at: None,
                last_sign_in_at: None,
            },
        }
    }

    #[test]
    fn test_stored_session_freshness() {
        let now = 1_700_000_000;
        assert!(is_fresh(&session(None, None), now));
        assert!(is_fresh(&session(None, Some(now + 3600)), now));
        assert!(!is_fresh(&session(None, Some(now + 30)), now));
        assert!(!is_fresh(&session(None, Some(now - 10)), now));
    }

    #[test]
    fn test_observer_forwards_to_signals() {
        let owner = Owner::new();
        owner.with(|| {
            let state = RwSignal::new(SessionState::default());
            let redirect = RwSignal::new(None::<String>);
            let observer = SignalObserver { state, redirect };

            observer.state_changed(&SessionState {
                user: None,
                is_loading: false,
            });
            observer.redirect("/auth/login");

            assert!(!state.get_untracked().is_loading);
            assert_eq!(redirect.get_untracked().as_deref(), Some("/auth/login"));
        });
    }
}
