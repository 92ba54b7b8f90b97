//! Reset-password form
//!
//! Reached from the recovery email. The recovery link signs the user in, so
//! the new password is set on the current session.

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use super::context::use_auth_context;
use super::register_form::check_confirmation;
use crate::core::validation::{
    FormValidator, FormValues, compose_validators, create_form_validator, password, required,
};
use crate::ui::common::{ErrorMessage, InfoMessage, PasswordField, SubmitButton, use_form};

fn reset_password_validator() -> FormValidator {
    create_form_validator([
        ("password", compose_validators(vec![required(), password()])),
        ("confirm_password", required()),
    ])
}

#[component]
pub fn ResetPasswordForm(
    /// Where to go once the password is changed
    #[prop(default = "/dashboard")]
    redirect_to: &'static str,
) -> impl IntoView {
    let auth = use_auth_context();
    let navigate = use_navigate();
    let form = use_form(
        FormValues::new()
            .with("password", "")
            .with("confirm_password", ""),
        reset_password_validator(),
    );

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let navigate = navigate.clone();
        form.submit(move |values| async move {
            check_confirmation(&values)?;
            auth.update_password(values.text("password"))
                .await
                .map_err(|error| error.user_message())?;
            navigate(redirect_to, Default::default());
            Ok(())
        });
    };

    let link_missing = Signal::derive(move || {
        (!auth.is_loading() && !auth.is_authenticated()).then(|| {
            "This reset link is invalid or has expired. Request a new one below.".to_string()
        })
    });

    view! {
        <div class="w-full space-y-6">
            <InfoMessage message=link_missing />

            <form on:submit=on_submit class="space-y-6" novalidate=true>
                <PasswordField
                    form=form
                    name="password"
                    label="New password"
                    placeholder="Create a new password"
                    autocomplete="new-password"
                />
                <PasswordField
                    form=form
                    name="confirm_password"
                    label="Confirm new password"
                    placeholder="Confirm your new password"
                    autocomplete="new-password"
                />
                <ErrorMessage error=Signal::derive(move || form.form_error()) />
                <SubmitButton
                    text="Update password"
                    loading_text="Updating..."
                    loading=Signal::derive(move || form.is_submitting())
                />
            </form>

            <div class="text-center">
                <A href="/auth/forgot-password" attr:class="text-sm font-medium text-indigo-600 hover:text-indigo-500">
                    "Request a new link"
                </A>
            </div>
        </div>
    }
}
