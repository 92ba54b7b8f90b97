use leptos::prelude::*;

use super::auth_layout::AuthLayout;
use crate::ui::auth::ForgotPasswordForm;

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    view! {
        <AuthLayout
            title="Reset your password"
            subtitle="Enter your email address and we'll send you a link to reset your password."
        >
            <ForgotPasswordForm />
        </AuthLayout>
    }
}
