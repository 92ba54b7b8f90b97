//! User menu component
//!
//! Header widget: login/register links for visitors, the user's avatar with a
//! small dropdown (dashboard link, sign out) once signed in.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;

use super::context::use_auth_context;
use crate::core::session::AuthUser;
use crate::ui::icon::{Icon, icons};

const AVATAR_COLORS: [&str; 8] = [
    "bg-blue-500",
    "bg-green-500",
    "bg-yellow-500",
    "bg-red-500",
    "bg-purple-500",
    "bg-pink-500",
    "bg-indigo-500",
    "bg-teal-500",
];

/// First letter of the display name, uppercased
fn initials(user: &AuthUser) -> String {
    user.display_name()
        .chars()
        .next()
        .map(|first| first.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Background class derived from the user id, stable across renders
fn avatar_color(user: &AuthUser) -> &'static str {
    let hash = user
        .id
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_add(b as u32));
    AVATAR_COLORS[(hash as usize) % AVATAR_COLORS.len()]
}

/// User menu component for the header
#[component]
pub fn UserMenu() -> impl IntoView {
    let auth = use_auth_context();
    let menu_open = RwSignal::new(false);

    let handle_sign_out = move |_| {
        menu_open.set(false);
        spawn_local(async move {
            if let Err(error) = auth.sign_out().await {
                leptos::logging::warn!("Sign out failed: {}", error);
            }
        });
    };

    view! {
        <div class="relative">
            {move || {
                if auth.is_loading() {
                    return view! {
                        <div class="w-8 h-8 rounded-full bg-gray-200 animate-pulse"></div>
                    }
                    .into_any();
                }

                let Some(user) = auth.user() else {
                    return view! {
                        <div class="flex items-center gap-2">
                            <A
                                href="/auth/login"
                                attr:class="px-3 py-1.5 text-sm font-medium text-gray-700 hover:text-gray-900"
                            >
                                "Log in"
                            </A>
                            <A
                                href="/auth/register"
                                attr:class="px-3 py-1.5 text-sm font-medium text-white bg-indigo-600 hover:bg-indigo-700 rounded-lg"
                            >
                                "Sign up"
                            </A>
                        </div>
                    }
                    .into_any();
                };

                let name = user.display_name().to_string();
                let email = user.email.clone();
                view! {
                    <button
                        class="flex items-center gap-2 p-1 rounded-lg hover:bg-gray-100 transition-colors"
                        on:click=move |_| menu_open.update(|open| *open = !*open)
                    >
                        <UserAvatar user=user.clone() size=32 />
                        <span class="hidden sm:block text-sm font-medium text-gray-900 max-w-[120px] truncate">
                            {name.clone()}
                        </span>
                        <Icon name=icons::CHEVRON_DOWN class="h-4 w-4" />
                    </button>

                    <Show when=move || menu_open.get()>
                        <div class="absolute right-0 mt-2 w-56 bg-white rounded-lg shadow-lg border border-gray-200 py-1 z-50">
                            <div class="px-4 py-3 border-b border-gray-200">
                                <p class="text-sm font-medium text-gray-900 truncate">{name.clone()}</p>
                                <p class="text-xs text-gray-500 truncate">{email.clone()}</p>
                            </div>
                            <A
                                href="/dashboard"
                                attr:class="w-full px-4 py-2 text-sm text-gray-700 hover:bg-gray-100 flex items-center gap-2"
                            >
                                <Icon name=icons::USER class="h-4 w-4" />
                                "Dashboard"
                            </A>
                            <button
                                class="w-full px-4 py-2 text-sm text-left text-red-600 hover:bg-red-50 flex items-center gap-2"
                                on:click=handle_sign_out
                            >
                                <Icon name=icons::LOG_OUT class="h-4 w-4" />
                                "Sign Out"
                            </button>
                        </div>
                    </Show>
                }
                .into_any()
            }}
        </div>
    }
}

/// User avatar component
#[component]
pub fn UserAvatar(
    user: AuthUser,
    /// Avatar size in pixels
    #[prop(default = 32)]
    size: u32,
) -> impl IntoView {
    let size_style = format!(
        "width: {}px; height: {}px; min-width: {}px; min-height: {}px;",
        size, size, size, size
    );
    let font_size = if size >= 40 { "text-lg" } else { "text-sm" };

    match &user.avatar_url {
        Some(avatar_url) => view! {
            <img
                src=avatar_url.clone()
                alt=format!("{}'s avatar", user.display_name())
                class="rounded-full object-cover"
                style=size_style
            />
        }
        .into_any(),
        None => view! {
            <div
                class=format!(
                    "{} rounded-full flex items-center justify-center text-white font-medium {}",
                    avatar_color(&user),
                    font_size,
                )
                style=size_style
            >
                {initials(&user)}
            </div>
        }
        .into_any(),
    }
}
