use leptos::prelude::*;

use super::auth_layout::AuthLayout;
use crate::ui::auth::ResetPasswordForm;

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    view! {
        <AuthLayout title="Choose a new password" subtitle="Enter and confirm your new password.">
            <ResetPasswordForm />
        </AuthLayout>
    }
}
