//! Social sign-in buttons, one per registered OAuth provider

use leptos::prelude::*;

use super::context::use_auth_context;
use crate::core::auth::OAUTH_PROVIDERS;
use crate::ui::common::{Button, ButtonVariant};
use crate::ui::icon::icons;

#[component]
pub fn SocialLogin(
    /// Receives the message when a provider cannot be started
    #[prop(into)]
    on_error: Callback<String>,
) -> impl IntoView {
    let auth = use_auth_context();
    let pending = RwSignal::new(None::<&'static str>);

    let start = move |provider: &'static str| {
        pending.set(Some(provider));
        match auth.sign_in_with_provider(provider) {
            Ok(redirect) => open_consent_page(&redirect.url),
            Err(error) => {
                pending.set(None);
                on_error.run(error.user_message());
            }
        }
    };

    view! {
        <div class="flex flex-col space-y-3">
            {OAUTH_PROVIDERS
                .iter()
                .map(move |provider| {
                    let name = provider.name;
                    view! {
                        <Button
                            variant=ButtonVariant::Outline
                            full_width=true
                            icon=icons::provider(name)
                            loading=Signal::derive(move || pending.get() == Some(name))
                            on_click=Callback::new(move |_: ()| start(name))
                        >
                            <span>{format!("Continue with {}", provider.label)}</span>
                        </Button>
                    }
                })
                .collect_view()}
        </div>
    }
}

/// Leave the app for the provider's consent page
#[cfg(not(feature = "ssr"))]
fn open_consent_page(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(error) = window.location().set_href(url) {
            leptos::logging::warn!("Failed to open consent page: {:?}", error);
        }
    }
}

#[cfg(feature = "ssr")]
fn open_consent_page(_url: &str) {}
