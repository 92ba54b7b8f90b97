//! Render-time guard for pages that need a signed-in user

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use super::context::use_auth_context;
use crate::core::guard::{DEFAULT_LOGIN_PATH, GuardAction, GuardState, RouteGuard};
use crate::ui::common::LoadingScreen;

/// Renders `children` only for a signed-in user.
///
/// Shows `fallback` (or a "Loading..." screen) while the session resolves and
/// replaces the current history entry with `redirect_to` once it is clear
/// nobody is signed in.
#[component]
pub fn ProtectedRoute(
    #[prop(default = DEFAULT_LOGIN_PATH)]
    redirect_to: &'static str,
    /// Placeholder while the session is loading
    #[prop(optional, into)]
    fallback: Option<ViewFn>,
    children: ChildrenFn,
) -> impl IntoView {
    let auth = use_auth_context();
    let navigate = use_navigate();

    let state = Memo::new(move |_| auth.state.with(|state| GuardState::from(state)));
    let action = RwSignal::new(GuardAction::ShowLoading);

    let mut guard = RouteGuard::new(redirect_to);
    Effect::new(move |_| {
        let next = guard.evaluate(state.get());
        if let GuardAction::Navigate(path) = &next {
            navigate(
                path,
                NavigateOptions {
                    replace: true,
                    ..Default::default()
                },
            );
        }
        action.set(next);
    });

    move || match action.get() {
        GuardAction::ShowLoading => match fallback.as_ref() {
            Some(fallback) => fallback.run(),
            None => view! { <LoadingScreen /> }.into_any(),
        },
        GuardAction::RenderChildren => children().into_any(),
        GuardAction::Navigate(_) | GuardAction::RenderNothing => ().into_any(),
    }
}
