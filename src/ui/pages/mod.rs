//! Application pages module
//!
//! This module contains all the page components for the application:
//! - Landing page (home)
//! - Login, register, forgot-password and reset-password pages
//! - Dashboard (protected)

mod auth_layout;
mod dashboard;
mod forgot_password;
mod landing;
mod login;
mod not_found;
mod register;
mod reset_password;

pub use dashboard::DashboardPage;
pub use forgot_password::ForgotPasswordPage;
pub use landing::LandingPage;
pub use login::LoginPage;
pub use not_found::NotFoundPage;
pub use register::RegisterPage;
pub use reset_password::ResetPasswordPage;
