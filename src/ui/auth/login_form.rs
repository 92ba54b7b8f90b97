//! Login form component
//!
//! Email and password sign-in with remember-me, a forgot-password link and
//! the social sign-in buttons.

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use super::context::use_auth_context;
use super::social_login::SocialLogin;
use crate::core::validation::{
    FormValidator, FormValues, compose_validators, create_form_validator, email, required,
};
use crate::ui::common::{
    CheckboxField, ErrorMessage, FormField, PasswordField, SubmitButton, use_form,
};

fn login_values() -> FormValues {
    FormValues::new()
        .with("email", "")
        .with("password", "")
        .with("remember_me", false)
}

fn login_validator() -> FormValidator {
    create_form_validator([
        ("email", compose_validators(vec![required(), email()])),
        ("password", required()),
    ])
}

/// Login form component
#[component]
pub fn LoginForm(
    /// Where to go after signing in
    #[prop(default = "/dashboard")]
    redirect_to: &'static str,
) -> impl IntoView {
    let auth = use_auth_context();
    let navigate = use_navigate();
    let form = use_form(login_values(), login_validator());

    let on_social_error = Callback::new(move |message: String| form.set_form_error(Some(message)));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let navigate = navigate.clone();
        form.submit(move |values| async move {
            auth.sign_in(values.text("email"), values.text("password"))
                .await
                .map_err(|error| error.user_message())?;
            navigate(redirect_to, Default::default());
            Ok(())
        });
    };

    view! {
        <div class="w-full space-y-6">
            <ErrorMessage error=Signal::derive(move || form.form_error()) />

            <form on:submit=on_submit class="space-y-6" novalidate=true>
                <FormField
                    form=form
                    name="email"
                    label="Email"
                    input_type="email"
                    placeholder="your@email.com"
                    autocomplete="email"
                    required=true
                />

                <PasswordField
                    form=form
                    name="password"
                    label="Password"
                    placeholder="Enter your password"
                    autocomplete="current-password"
                />

                <div class="flex items-center justify-between">
                    <CheckboxField form=form name="remember_me" label="Remember me" />
                    <div class="text-sm">
                        <A href="/auth/forgot-password" attr:class="font-medium text-indigo-600 hover:text-indigo-500">
                            "Forgot your password?"
                        </A>
                    </div>
                </div>

                <SubmitButton
                    text="Log in"
                    loading_text="Logging in..."
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
                "Don't have an account? "
                <A href="/auth/register" attr:class="font-medium text-indigo-600 hover:text-indigo-500">
                    "Sign up"
                </A>
            </div>
        </div>
    }
}
