//! Application configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.
//! The browser bundle cannot read the environment; it gets the public subset
//! ([`PublicConfig`]) through `window.ENV`, which the server writes into the
//! page shell.

use serde::{Deserialize, Serialize};

/// Origin assumed when `SITE_URL` is not set
pub const DEFAULT_SITE_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Identity backend project URL
    /// Example: https://xyzcompany.supabase.co
    pub supabase_url: Option<String>,

    /// Public anon key of the identity backend project
    pub supabase_anon_key: Option<String>,

    /// Public origin of this app, used for auth redirects
    /// Example: https://app.solosphere.io
    pub site_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    /// `NEXT_PUBLIC_`-prefixed names are accepted as fallbacks.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
        };

        Self {
            supabase_url: first(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]),
            supabase_anon_key: first(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]),
            site_url: first(&["SITE_URL", "NEXT_PUBLIC_SITE_URL"]),
        }
    }

    /// Check if the identity backend is configured
    pub fn has_supabase(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }

    /// Check if site URL is configured
    pub fn has_site_url(&self) -> bool {
        self.site_url.is_some()
    }

    /// Site URL, falling back to [`DEFAULT_SITE_URL`]
    pub fn site_url(&self) -> &str {
        self.site_url.as_deref().unwrap_or(DEFAULT_SITE_URL)
    }

    /// The part of the configuration that may be shipped to browsers
    pub fn public(&self) -> Result<PublicConfig, ConfigError> {
        Ok(PublicConfig {
            supabase_url: self
                .supabase_url
                .clone()
                .ok_or(ConfigError::Missing("SUPABASE_URL"))?,
            supabase_anon_key: self
                .supabase_anon_key
                .clone()
                .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            site_url: self.site_url().to_string(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Browser-visible settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub site_url: String,
}

impl PublicConfig {
    /// JavaScript statement publishing this config as `window.ENV`
    pub fn to_script(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        // Keep a value containing "</script>" from closing the tag early
        format!("window.ENV = {};", json.replace("</", "<\\/"))
    }

    /// Read `window.ENV`. Uses the page origin as site URL when the server
    /// did not provide one.
    #[cfg(feature = "hydrate")]
    pub fn from_window() -> Result<Self, ConfigError> {
        let window = web_sys::window().ok_or(ConfigError::Missing("window"))?;
        let env = window
            .get("ENV")
            .filter(|env| !env.is_undefined() && env.is_object())
            .ok_or(ConfigError::Missing("window.ENV"))?;

        let read = |key: &'static str| {
            js_sys::Reflect::get(&env, &key.into())
                .ok()
                .and_then(|value| value.as_string())
                .filter(|value| !value.is_empty())
        };

        let site_url = read("site_url")
            .or_else(|| window.location().origin().ok())
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

        Ok(Self {
            supabase_url: read("supabase_url").ok_or(ConfigError::Missing("supabase_url"))?,
            supabase_anon_key: read("supabase_anon_key")
                .ok_or(ConfigError::Missing("supabase_anon_key"))?,
            site_url,
        })
    }
}
