//! Landing page component
//!
//! Entry point for visitors, linking to sign-up and login or straight to the
//! dashboard for a signed-in user.

use leptos::prelude::*;
use leptos_meta::{Meta, Title};
use leptos_router::components::A;

use crate::ui::auth::UserMenu;

#[component]
pub fn LandingPage() -> impl IntoView {
    view! {
        <Title text="SoloSphere - Freelance business management" />
        <Meta
            name="description"
            content="SoloSphere is the all-in-one platform for freelancers: invoices, clients, expenses and time tracking."
        />

        <div class="min-h-screen bg-white">
            <header class="border-b border-gray-200">
                <div class="max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 flex items-center justify-between h-16">
                    <A href="/" attr:class="text-xl font-bold text-indigo-600">"SoloSphere"</A>
                    <UserMenu />
                </div>
            </header>

            <main class="max-w-4xl mx-auto px-4 py-24 text-center">
                <h1 class="text-5xl font-bold tracking-tight text-gray-900 mb-6">
                    "Run your freelance business from one place"
                </h1>
                <p class="text-xl text-gray-600 mb-10">
                    "Invoices, clients, expenses and time tracking for independent professionals."
                </p>
                <div class="flex flex-col sm:flex-row items-center justify-center gap-4">
                    <A href="/auth/register" attr:class="btn-base btn-primary">"Get started"</A>
                    <A href="/auth/login" attr:class="btn-base btn-outline">"I already have an account"</A>
                </div>
            </main>
        </div>
    }
}
