//! Common reusable UI components
//!
//! Buttons, form fields, messages and spinners shared by the auth views.

pub mod button;
pub mod form;
pub mod message;
pub mod spinner;

pub use button::{Button, ButtonVariant, SubmitButton};
pub use form::{CheckboxField, FormField, FormHandle, PasswordField, use_form};
pub use message::{ErrorMessage, InfoMessage, SuccessMessage};
pub use spinner::{InlineSpinner, LoadingScreen, Spinner, SpinnerSize};
