//! Form hook and field components
//!
//! [`use_form`] keeps a [`FormController`] in a signal so fields re-render on
//! every transition. Field components read their value and visible error
//! from the handle and report `input`/`blur` back to it.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::core::form::{FormController, SubmitBlocked};
use crate::core::validation::{FieldValue, FormValidator, FormValues};
use crate::ui::icon::{Icon, icons};

/// Reactive handle to a form controller
#[derive(Clone, Copy)]
pub struct FormHandle {
    form: RwSignal<FormController>,
    /// Cleared when the owning component is cleaned up
    mounted: StoredValue<Arc<AtomicBool>>,
}

/// Create a form owned by the current component
pub fn use_form(initial: FormValues, validator: FormValidator) -> FormHandle {
    let form = RwSignal::new(FormController::new(initial).with_validator(validator));
    let mounted = Arc::new(AtomicBool::new(true));

    on_cleanup({
        let mounted = Arc::clone(&mounted);
        move || mounted.store(false, Ordering::SeqCst)
    });

    FormHandle {
        form,
        mounted: StoredValue::new(mounted),
    }
}

impl FormHandle {
    pub fn text(&self, field: &str) -> String {
        self.form.with(|form| form.text(field).to_string())
    }

    pub fn flag(&self, field: &str) -> bool {
        self.form.with(|form| form.flag(field))
    }

    /// Field error, once the field was touched or the form submitted
    pub fn error(&self, field: &str) -> Option<String> {
        self.form.with(|form| form.visible_error(field))
    }

    pub fn form_error(&self) -> Option<String> {
        self.form.with(|form| form.form_error().map(str::to_string))
    }

    pub fn is_submitting(&self) -> bool {
        self.form.with(FormController::is_submitting)
    }

    pub fn change(&self, field: &str, value: impl Into<FieldValue>) {
        self.form.update(|form| form.change(field, value));
    }

    pub fn blur(&self, field: &str) {
        self.form.update(|form| form.blur(field));
    }

    pub fn set_form_error(&self, error: Option<String>) {
        self.form.update(|form| form.set_form_error(error));
    }

    pub fn reset(&self) {
        self.form.update(FormController::reset);
    }

    /// Validate and, if valid, run `operation` with the submitted values.
    ///
    /// Returns whether the operation was started. An error returned by the
    /// operation becomes the form error. The result is dropped if the owning
    /// component is gone by the time it arrives.
    pub fn submit<F, Fut>(&self, operation: F) -> bool
    where
        F: FnOnce(FormValues) -> Fut + 'static,
        Fut: Future<Output = Result<(), String>> + 'static,
    {
        let Some(outcome) = self.form.try_update(FormController::begin_submit) else {
            return false;
        };

        match outcome {
            Ok(values) => {
                let form = self.form;
                let mounted = self.mounted.get_value();
                let pending = operation(values);
                spawn_local(async move {
                    let result = pending.await;
                    if mounted.load(Ordering::SeqCst) {
                        form.try_update(|form| form.finish_submit(result));
                    }
                });
                true
            }
            Err(SubmitBlocked::InFlight) => false,
            Err(SubmitBlocked::Invalid(errors)) => {
                leptos::logging::log!("Form not submitted: {} invalid field(s)", errors.len());
                false
            }
        }
    }
}

fn field_error(form: FormHandle, name: &'static str) -> impl IntoView {
    move || {
        form.error(name).map(|error| {
            view! {
                <div class="flex items-center gap-1 mt-1 text-sm text-red-600">
                    <Icon name=icons::ALERT_CIRCLE class="h-4 w-4" />
                    <span>{error}</span>
                </div>
            }
        })
    }
}

/// Labelled text input bound to a form field
#[component]
pub fn FormField(
    form: FormHandle,
    /// Field name in the form values
    name: &'static str,
    label: &'static str,
    /// Input type (text, email, etc.)
    #[prop(default = "text")]
    input_type: &'static str,
    #[prop(default = "")]
    placeholder: &'static str,
    #[prop(default = "off")]
    autocomplete: &'static str,
    /// Whether field is required (shows red asterisk)
    #[prop(default = false)]
    required: bool,
) -> impl IntoView {
    view! {
        <div class="space-y-1">
            <label for=name class="block text-sm font-medium text-gray-700">
                {label}
                {required.then(|| view! { <span class="text-red-500 ml-0.5">"*"</span> })}
            </label>
            <input
                type=input_type
                id=name
                name=name
                autocomplete=autocomplete
                placeholder=placeholder
                class="input-base"
                class:border-red-500=move || form.error(name).is_some()
                prop:value=move || form.text(name)
                on:input=move |ev| form.change(name, event_target_value(&ev))
                on:blur=move |_| form.blur(name)
                disabled=move || form.is_submitting()
            />
            {field_error(form, name)}
        </div>
    }
}

/// Password input with a visibility toggle
#[component]
pub fn PasswordField(
    form: FormHandle,
    name: &'static str,
    label: &'static str,
    #[prop(default = "")]
    placeholder: &'static str,
    #[prop(default = "current-password")]
    autocomplete: &'static str,
) -> impl IntoView {
    let show_password = RwSignal::new(false);

    view! {
        <div class="space-y-1">
            <label for=name class="block text-sm font-medium text-gray-700">
                {label}
            </label>
            <div class="relative">
                <input
                    type=move || if show_password.get() { "text" } else { "password" }
                    id=name
                    name=name
                    autocomplete=autocomplete
                    placeholder=placeholder
                    class="input-base pr-10"
                    class:border-red-500=move || form.error(name).is_some()
                    prop:value=move || form.text(name)
                    on:input=move |ev| form.change(name, event_target_value(&ev))
                    on:blur=move |_| form.blur(name)
                    disabled=move || form.is_submitting()
                />
                <button
                    type="button"
                    class="absolute inset-y-0 right-0 pr-3 flex items-center text-gray-400 hover:text-gray-600"
                    title=move || if show_password.get() { "Hide password" } else { "Show password" }
                    on:click=move |_| show_password.update(|v| *v = !*v)
                >
                    {move || {
                        if show_password.get() {
                            view! { <Icon name=icons::EYE_CLOSED class="h-5 w-5" /> }.into_any()
                        } else {
                            view! { <Icon name=icons::EYE class="h-5 w-5" /> }.into_any()
                        }
                    }}
                </button>
            </div>
            {field_error(form, name)}
        </div>
    }
}

/// Checkbox bound to a boolean form field
#[component]
pub fn CheckboxField(form: FormHandle, name: &'static str, label: &'static str) -> impl IntoView {
    view! {
        <div class="flex items-center gap-2">
            <input
                type="checkbox"
                id=name
                name=name
                class="h-4 w-4 rounded border-gray-300 text-indigo-600 focus:ring-indigo-500"
                prop:checked=move || form.flag(name)
                on:change=move |ev| form.change(name, event_target_checked(&ev))
            />
            <label for=name class="text-sm text-gray-700 cursor-pointer">{label}</label>
        </div>
    }
}
