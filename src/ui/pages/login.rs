//! Login page component
//!
//! A standalone page for user login, redirects to the dashboard on success.

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use super::auth_layout::{AuthLayout, redirect_when_signed_in};
use crate::ui::auth::{LoginForm, use_auth_context};
use crate::ui::common::SuccessMessage;

/// Login page component
#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth_context();
    let query = use_query_map();

    redirect_when_signed_in(auth, "/dashboard");

    // Set after registration
    let registered = Signal::derive(move || {
        let registered = query.with(|query| query.get("registered").as_deref() == Some("true"));
        registered.then(|| {
            "Account created. Check your email to confirm your address, then log in.".to_string()
        })
    });

    view! {
        <AuthLayout title="Welcome back" subtitle="Log in to your SoloSphere account">
            <SuccessMessage message=registered />
            <LoginForm />
        </AuthLayout>
    }
}
