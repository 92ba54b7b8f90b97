//! Two-column shell shared by the auth pages

use leptos::prelude::*;
use leptos_meta::Title;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::ui::auth::AuthContext;

/// Auth page layout: form on the left, brand panel on the right
#[component]
pub fn AuthLayout(
    title: &'static str,
    subtitle: &'static str,
    children: Children,
) -> impl IntoView {
    view! {
        <Title text=format!("{} | SoloSphere", title) />

        <div class="flex min-h-screen flex-col md:flex-row">
            <div class="flex w-full flex-col justify-center px-4 py-12 sm:px-6 md:w-1/2 lg:flex-none lg:px-20 xl:px-24">
                <div class="mx-auto w-full max-w-sm lg:w-96">
                    <div class="flex flex-col space-y-6">
                        <A href="/" attr:class="text-lg font-bold text-indigo-600">"SoloSphere"</A>
                        <div class="flex flex-col space-y-2 text-center sm:text-left">
                            <h1 class="text-2xl font-bold tracking-tight text-gray-900 sm:text-3xl">
                                {title}
                            </h1>
                            <p class="text-sm text-gray-500">{subtitle}</p>
                        </div>
                        {children()}
                    </div>
                </div>
            </div>

            <div class="relative hidden md:block md:w-1/2 bg-gradient-to-br from-indigo-600 to-purple-700">
                <div class="absolute bottom-0 left-0 right-0 p-12 text-white">
                    <h2 class="text-4xl font-bold">"SoloSphere"</h2>
                    <p class="mt-2 text-xl">"Your all-in-one freelance business management platform"</p>
                </div>
            </div>
        </div>
    }
}

/// Leave a guest-only page as soon as a user is signed in
pub fn redirect_when_signed_in(auth: AuthContext, path: &'static str) {
    let navigate = use_navigate();
    Effect::new(move |_| {
        if auth.is_authenticated() {
            navigate(path, Default::default());
        }
    });
}
