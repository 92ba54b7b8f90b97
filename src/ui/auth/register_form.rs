//! Registration form component
//!
//! Creates an account with email and password. The confirmation is compared
//! before anything is sent; on success the user is sent to the login page
//! with a notice to confirm their email.

use std::future::Future;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use super::context::use_auth_context;
use super::social_login::SocialLogin;
use crate::core::auth::AuthResult;
use crate::core::session::AuthUser;
use crate::core::validation::{
    FormValidator, FormValues, compose_validators, create_form_validator, email, password,
    required,
};
use crate::ui::common::{ErrorMessage, FormField, PasswordField, SubmitButton, use_form};

/// Login page URL after a successful registration
pub const REGISTERED_REDIRECT: &str = "/auth/login?registered=true";

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

fn register_values() -> FormValues {
    FormValues::new()
        .with("email", "")
        .with("password", "")
        .with("confirm_password", "")
}

fn register_validator() -> FormValidator {
    create_form_validator([
        ("email", compose_validators(vec![required(), email()])),
        ("password", compose_validators(vec![required(), password()])),
        ("confirm_password", required()),
    ])
}

/// `password` and `confirm_password` must be equal
pub(super) fn check_confirmation(values: &FormValues) -> Result<(), String> {
    if values.text("password") == values.text("confirm_password") {
        Ok(())
    } else {
        Err(PASSWORDS_DO_NOT_MATCH.to_string())
    }
}

/// Compare the confirmation, then sign up. Returns where to go next.
async fn register<F, Fut>(values: FormValues, sign_up: F) -> Result<&'static str, String>
where
    F: FnOnce(String, String) -> Fut,
    Fut: Future<Output = AuthResult<AuthUser>>,
{
    check_confirmation(&values)?;

    let email = values.text("email").to_string();
    let password = values.text("password").to_string();
    sign_up(email, password)
        .await
        .map_err(|error| error.user_message())?;
    Ok(REGISTERED_REDIRECT)
}

/// Registration form component
#[component]
pub fn RegisterForm() -> impl IntoView {
    let auth = use_auth_context();
    let navigate = use_navigate();
    let form = use_form(register_values(), register_validator());

    let on_social_error = Callback::new(move |message: String| form.set_form_error(Some(message)));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let navigate = navigate.clone();
        form.submit(move |values| async move {
            let next = register(values, |email, password| async move {
                auth.sign_up(&email, &password, None).await
            })
            .await?;
            navigate(next, Default::default());
            Ok(())
        });
    };

    view! {
        <div class="w-full space-y-6">
            <form on:submit=on_submit class="flex flex-col space-y-4" novalidate=true>
                <FormField
                    form=form
                    name="email"
                    label="Email"
                    input_type="email"
                    placeholder="Enter your email address"
                    autocomplete="email"
                    required=true
                />

                <PasswordField
                    form=form
                    name="password"
                    label="Password"
                    placeholder="Create a password"
                    autocomplete="new-password"
                />

                <PasswordField
                    form=form
                    name="confirm_password"
                    label="Confirm Password"
                    placeholder="Confirm your password"
                    autocomplete="new-password"
                />

                <ErrorMessage error=Signal::derive(move || form.form_error()) />

                <SubmitButton
                    text="Create Account"
                    loading_text="Creating account..."
                    loading=Signal::derive(move || form.is_submitting())
                />
            </form>

            <div class="relative py-2">
                <div class="absolute inset-0 flex items-center">
                    <div class="w-full border-t border-gray-200"></div>
                </div>
                <div class="relative flex justify-center text-sm">
                    <span class="bg-white px-2 text-gray-500">"Or continue with"</span>
                </div>
            </div>

            <SocialLogin on_error=on_social_error />

            <div class="text-center text-sm text-gray-500">
                "Already have an account? "
                <A href="/auth/login" attr:class="font-medium text-indigo-600 hover:text-indigo-500">
                    "Log in"
                </A>
            </div>
        </div>
    }
}
