//! Render-time route protection
//!
//! [`RouteGuard`] decides what a protected page shows for the current session
//! state. It remembers whether it already asked for a redirect so the app
//! navigates once per visit instead of on every re-render.

use crate::core::session::SessionState;

/// Default destination for visitors without a session
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Unauthenticated,
    Authenticated,
}

impl From<&SessionState> for GuardState {
    fn from(state: &SessionState) -> Self {
        if state.is_loading {
            GuardState::Loading
        } else if state.user.is_some() {
            GuardState::Authenticated
        } else {
            GuardState::Unauthenticated
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    /// Session still resolving; show the loading placeholder
    ShowLoading,
    /// Navigate away to the given path
    Navigate(String),
    /// Redirect already requested; render nothing
    RenderNothing,
    RenderChildren,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    redirect_to: String,
    navigated: bool,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PATH)
    }
}

impl RouteGuard {
    pub fn new(redirect_to: impl Into<String>) -> Self {
        Self {
            redirect_to: redirect_to.into(),
            navigated: false,
        }
    }

    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    /// Decide what to render for `state`
    pub fn evaluate(&mut self, state: GuardState) -> GuardAction {
        match state {
            GuardState::Loading => GuardAction::ShowLoading,
            GuardState::Authenticated => {
                self.navigated = false;
                GuardAction::RenderChildren
            }
            GuardState::Unauthenticated if self.navigated => GuardAction::RenderNothing,
            GuardState::Unauthenticated => {
                self.navigated = true;
                GuardAction::Navigate(self.redirect_to.clone())
            }
        }
    }
}
