//! Display name editor for the signed-in user

use leptos::prelude::*;

use super::context::use_auth_context;
use crate::core::auth::ProfileUpdate;
use crate::core::validation::{FormValidator, FormValues, create_form_validator, required};
use crate::ui::common::{ErrorMessage, FormField, SubmitButton, SuccessMessage, use_form};

fn profile_validator() -> FormValidator {
    create_form_validator([("name", required())])
}

fn profile_update(values: &FormValues) -> ProfileUpdate {
    ProfileUpdate {
        name: Some(values.text("name").trim().to_string()),
        avatar_url: None,
    }
}

#[component]
pub fn ProfileForm() -> impl IntoView {
    let auth = use_auth_context();
    let initial_name = auth
        .state
        .with_untracked(|state| state.user.as_ref().and_then(|user| user.name.clone()))
        .unwrap_or_default();
    let form = use_form(
        FormValues::new().with("name", initial_name),
        profile_validator(),
    );
    let saved = RwSignal::new(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        saved.set(None);

        form.submit(move |values| async move {
            auth.update_profile(profile_update(&values))
                .await
                .map_err(|error| error.user_message())?;
            let _ = saved.try_set(Some("Profile updated".to_string()));
            Ok(())
        });
    };

    view! {
        <form on:submit=on_submit class="space-y-4" novalidate=true>
            <FormField
                form=form
                name="name"
                label="Display name"
                placeholder="How should we call you?"
                autocomplete="name"
                required=true
            />
            <ErrorMessage error=Signal::derive(move || form.form_error()) />
            <SuccessMessage message=saved />
            <SubmitButton
                text="Save"
                loading_text="Saving..."
                loading=Signal::derive(move || form.is_submitting())
            />
        </form>
    }
}
