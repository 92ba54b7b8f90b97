//! Dashboard page component
//!
//! The signed-in landing spot: account details and sign-out.

use chrono::{DateTime, Utc};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::Title;

use crate::ui::auth::{ProfileForm, ProtectedRoute, UserAvatar, use_auth_context};
use crate::ui::common::{Button, ButtonVariant, ErrorMessage};
use crate::ui::icon::icons;

/// Email line of the account card
fn email_label(email: &str) -> String {
    if email.is_empty() {
        "No email available".to_string()
    } else {
        email.to_string()
    }
}

fn format_last_sign_in(at: Option<DateTime<Utc>>) -> String {
    at.map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    view! {
        <Title text="Dashboard | SoloSphere" />
        <ProtectedRoute>
            <DashboardContent />
        </ProtectedRoute>
    }
}

#[component]
fn DashboardContent() -> impl IntoView {
    let auth = use_auth_context();
    let signing_out = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    // The store navigates to the login page once signed out
    let on_sign_out = Callback::new(move |_: ()| {
        signing_out.set(true);
        error.set(None);
        spawn_local(async move {
            if let Err(err) = auth.sign_out().await {
                leptos::logging::warn!("Sign out failed: {}", err);
                let _ = error.try_set(Some(err.user_message()));
            }
            let _ = signing_out.try_set(false);
        });
    });

    view! {
        <div class="min-h-screen bg-gray-50">
            <header class="bg-white shadow">
                <div class="mx-auto max-w-7xl px-4 py-6 sm:px-6 lg:px-8">
                    <div class="flex items-center justify-between">
                        <h1 class="text-3xl font-bold tracking-tight text-gray-900">"Dashboard"</h1>
                        <Button
                            variant=ButtonVariant::Outline
                            icon=Some(icons::LOG_OUT)
                            loading=signing_out
                            on_click=on_sign_out
                        >
                            "Sign Out"
                        </Button>
                    </div>
                </div>
            </header>

            <main class="mx-auto max-w-7xl px-4 py-6 sm:px-6 lg:px-8">
                <ErrorMessage error=error />
                <div class="bg-white p-8 shadow rounded-lg">
                    <h2 class="text-xl font-semibold mb-4">"Welcome to SoloSphere!"</h2>
                    <p class="text-gray-500 mb-6">"Your all-in-one freelance business management platform"</p>
                    {move || auth.user().map(|user| view! {
                        <div class="mb-6 flex items-center gap-4">
                            <UserAvatar user=user.clone() size=48 />
                            <div>
                                <p class="text-gray-600">"You are signed in as:"</p>
                                <p class="font-medium">{email_label(&user.email)}</p>
                            </div>
                        </div>
                        <div class="border-t border-gray-200 pt-4">
                            <h3 class="text-lg font-medium mb-2">"Account Details"</h3>
                            <div class="text-sm text-gray-600">
                                <p>"User ID: " {user.id.clone()}</p>
                                <p>"Last Sign In: " {format_last_sign_in(user.last_login)}</p>
                            </div>
                        </div>
                    })}
                </div>
                <div class="mt-6 bg-white p-8 shadow rounded-lg">
                    <h3 class="text-lg font-medium mb-4">"Profile"</h3>
                    <ProfileForm />
                </div>
            </main>
        </div>
    }
}
