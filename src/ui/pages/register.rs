//! Register page component

use leptos::prelude::*;

use super::auth_layout::{AuthLayout, redirect_when_signed_in};
use crate::ui::auth::{RegisterForm, use_auth_context};

#[component]
pub fn RegisterPage() -> impl IntoView {
    redirect_when_signed_in(use_auth_context(), "/dashboard");

    view! {
        <AuthLayout
            title="Create an account"
            subtitle="Sign up to start managing your freelance business"
        >
            <RegisterForm />
        </AuthLayout>
    }
}
