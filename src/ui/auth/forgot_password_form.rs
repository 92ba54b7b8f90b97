//! Forgot-password form: requests a reset link by email

use leptos::prelude::*;
use leptos_router::components::A;

use super::context::use_auth_context;
use crate::core::validation::{
    FormValidator, FormValues, compose_validators, create_form_validator, email, required,
};
use crate::ui::common::{Button, ButtonVariant, ErrorMessage, FormField, SubmitButton, use_form};
use crate::ui::icon::{Icon, icons};

fn forgot_password_validator() -> FormValidator {
    create_form_validator([("email", compose_validators(vec![required(), email()]))])
}

#[component]
pub fn ForgotPasswordForm() -> impl IntoView {
    let auth = use_auth_context();
    let form = use_form(
        FormValues::new().with("email", ""),
        forgot_password_validator(),
    );
    let submitted = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        form.submit(move |values| async move {
            auth.reset_password(values.text("email"))
                .await
                .map_err(|error| error.user_message())?;
            let _ = submitted.try_set(true);
            Ok(())
        });
    };

    let try_again = Callback::new(move |_: ()| {
        form.reset();
        submitted.set(false);
    });

    view! {
        <Show
            when=move || submitted.get()
            fallback=move || view! {
                <div class="mt-8">
                    <form on:submit=on_submit class="space-y-6" novalidate=true>
                        <FormField
                            form=form
                            name="email"
                            label="Email address"
                            input_type="email"
                            placeholder="Enter your email address"
                            autocomplete="email"
                            required=true
                        />
                        <ErrorMessage error=Signal::derive(move || form.form_error()) />
                        <SubmitButton
                            text="Send reset link"
                            loading_text="Sending..."
                            loading=Signal::derive(move || form.is_submitting())
                        />
                    </form>
                    <div class="mt-4 text-center">
                        <A href="/auth/login" attr:class="text-sm font-medium text-indigo-600 hover:text-indigo-500">
                            "Back to login"
                        </A>
                    </div>
                </div>
            }
        >
            <div class="text-center">
                <Icon name=icons::MAIL class="mx-auto mb-4 h-10 w-10" />
                <h1 class="mb-4 text-2xl font-bold">"Check your email"</h1>
                <p class="mb-6 text-gray-600">
                    "We've sent you an email with a link to reset your password. "
                    "Please check your inbox and follow the instructions."
                </p>
                <Button variant=ButtonVariant::Outline full_width=true on_click=try_again>
                    "Try again"
                </Button>
                <div class="mt-4">
                    <A href="/auth/login" attr:class="text-sm font-medium text-indigo-600 hover:text-indigo-500">
                        "Return to login"
                    </A>
                </div>
            </div>
        </Show>
    }
}
