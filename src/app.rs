use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::core::config::PublicConfig;
use crate::ui::auth::provide_auth_context;
use crate::ui::pages::{
    DashboardPage, ForgotPasswordPage, LandingPage, LoginPage, NotFoundPage, RegisterPage,
    ResetPasswordPage,
};

/// Document shell rendered by the server. When the server provided a
/// [`PublicConfig`] it is published to the browser bundle as `window.ENV`.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    let env_script = use_context::<PublicConfig>().map(|config| config.to_script());

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                {env_script.map(|script| view! { <script inner_html=script></script> })}
                <AutoReload options=options.clone() />
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    view! {
        // id=leptos means cargo-leptos will hot-reload this stylesheet
        <Stylesheet id="leptos" href="/pkg/solosphere.css"/>
        <Title text="SoloSphere"/>

        // The auth context navigates, so it lives inside the router
        <Router>
            <AuthProvider>
                <Routes fallback=|| view! { <NotFoundPage /> }>
                    <Route path=path!("") view=LandingPage />
                    <Route path=path!("auth/login") view=LoginPage />
                    <Route path=path!("auth/register") view=RegisterPage />
                    <Route path=path!("auth/forgot-password") view=ForgotPasswordPage />
                    <Route path=path!("auth/reset-password") view=ResetPasswordPage />
                    <Route path=path!("dashboard") view=DashboardPage />
                </Routes>
            </AuthProvider>
        </Router>
    }
}

#[component]
fn AuthProvider(children: Children) -> impl IntoView {
    provide_auth_context();
    children()
}
