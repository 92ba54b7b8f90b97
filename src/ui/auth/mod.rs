//! Authentication UI module
//!
//! This module provides the auth context and the auth-related components
//! for the SoloSphere frontend.

mod context;
mod forgot_password_form;
mod login_form;
mod profile_form;
mod protected_route;
mod register_form;
mod reset_password_form;
mod social_login;
mod user_menu;

pub use context::{AuthContext, provide_auth_context, use_auth_context};
pub use forgot_password_form::ForgotPasswordForm;
pub use login_form::LoginForm;
pub use profile_form::ProfileForm;
pub use protected_route::ProtectedRoute;
pub use register_form::{PASSWORDS_DO_NOT_MATCH, REGISTERED_REDIRECT, RegisterForm};
pub use reset_password_form::ResetPasswordForm;
pub use social_login::SocialLogin;
pub use user_menu::{UserAvatar, UserMenu};
