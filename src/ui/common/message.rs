//! Message components for form errors and notices

use crate::ui::{Icon, icons};
use leptos::prelude::*;

/// Error message component
/// Displays an error message with an alert icon
#[component]
pub fn ErrorMessage(
    /// Error signal - shows message when Some, hidden when None
    #[prop(into)]
    error: Signal<Option<String>>,
) -> impl IntoView {
    view! {
        <Show when=move || error.get().is_some()>
            <div class="flex items-center gap-2 rounded-md bg-red-50 p-3 text-sm text-red-600" role="alert">
                <Icon name=icons::ALERT_CIRCLE class="h-4 w-4"/>
                <span>{move || error.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

/// Success message component
#[component]
pub fn SuccessMessage(
    #[prop(into)]
    message: Signal<Option<String>>,
) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div class="flex items-center gap-2 rounded-md bg-green-50 p-3 text-sm text-green-700">
                <Icon name=icons::CHECK class="h-4 w-4"/>
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

/// Info message component
#[component]
pub fn InfoMessage(
    #[prop(into)]
    message: Signal<Option<String>>,
) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div class="flex items-center gap-2 rounded-md bg-blue-50 p-3 text-sm text-blue-700">
                <Icon name=icons::INFORMATION_CIRCLE class="h-4 w-4"/>
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}
