use crate::ui::common::spinner::InlineSpinner;
use crate::ui::icon::Icon;
use leptos::prelude::*;

/// Button variant types
#[derive(Clone, Copy, PartialEq)]
pub enum ButtonVariant {
    Primary,
    Outline,
    Ghost,
}

impl ButtonVariant {
    fn class(&self) -> &'static str {
        match self {
            ButtonVariant::Primary => "btn-primary",
            ButtonVariant::Outline => "btn-outline",
            ButtonVariant::Ghost => "btn-ghost",
        }
    }
}

/// Clickable button with variants
#[component]
pub fn Button(
    #[prop(default = ButtonVariant::Primary)]
    variant: ButtonVariant,
    on_click: Callback<()>,
    /// Disables the button and shows a spinner
    #[prop(into, default = Signal::stored(false))]
    loading: Signal<bool>,
    /// Stretch to the container width
    #[prop(default = false)]
    full_width: bool,
    /// Optional icon name to show before text
    #[prop(default = None)]
    icon: Option<&'static str>,
    children: Children,
) -> impl IntoView {
    let classes = format!(
        "btn-base {}{}",
        variant.class(),
        if full_width { " w-full" } else { "" }
    );

    view! {
        <button
            type="button"
            class=classes
            on:click=move |_| {
                if !loading.get_untracked() {
                    on_click.run(())
                }
            }
            disabled=move || loading.get()
        >
            {move || if loading.get() {
                view! { <InlineSpinner /> }.into_any()
            } else if let Some(icon_name) = icon {
                view! { <Icon name=icon_name class="h-4 w-4"/> }.into_any()
            } else {
                ().into_any()
            }}
            {children()}
        </button>
    }
}

/// Form submit button that swaps its label while the form is submitting
#[component]
pub fn SubmitButton(
    /// Button text when idle
    text: &'static str,
    /// Button text while submitting
    loading_text: &'static str,
    #[prop(into)]
    loading: Signal<bool>,
) -> impl IntoView {
    view! {
        <button
            type="submit"
            class="btn-base btn-primary w-full"
            disabled=move || loading.get()
        >
            <Show
                when=move || loading.get()
                fallback=move || view! { <span class="block">{text}</span> }
            >
                <span class="flex items-center justify-center gap-2">
                    <InlineSpinner />
                    {loading_text}
                </span>
            </Show>
        </button>
    }
}
