use leptos::prelude::*;

#[component]
pub fn Icon(
    /// Icon name without the .svg extension
    name: &'static str,
    /// CSS classes for sizing and color
    #[prop(default = "w-5 h-5")]
    class: &'static str,
) -> impl IntoView {
    let icon_path = format!("/icons/{}.svg", name);

    view! {
        <img
            src=icon_path
            class=class
            alt=name
            draggable=false
        />
    }
}

/// Icons shipped under `public/icons`
pub mod icons {
    pub const EYE: &str = "eye";
    pub const EYE_CLOSED: &str = "eye-closed";
    pub const LOADER: &str = "loader";
    pub const ALERT_CIRCLE: &str = "alert-circle";
    pub const CHECK: &str = "check";
    pub const MAIL: &str = "mail";
    pub const INFORMATION_CIRCLE: &str = "information-circle";
    pub const LOG_OUT: &str = "log-out";
    pub const USER: &str = "user";
    pub const CHEVRON_DOWN: &str = "chevron-down";
    pub const GOOGLE: &str = "google";
    pub const FACEBOOK: &str = "facebook";
    pub const LINKEDIN: &str = "linkedin";

    /// Brand icon for an OAuth provider name, if one ships
    pub fn provider(name: &str) -> Option<&'static str> {
        match name {
            "google" => Some(GOOGLE),
            "facebook" => Some(FACEBOOK),
            "linkedin" => Some(LINKEDIN),
            _ => None,
        }
    }
}
