//! Form state controller
//!
//! Holds the values, errors and touched flags of one form plus its submission
//! state. The controller is plain data; components wrap it in a signal and
//! drive it with [`FormController::change`], [`FormController::blur`] and the
//! `begin_submit`/`finish_submit` pair around the async operation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::validation::{
    FieldValue, FormErrors, FormValidator, FormValues, format_error_message, has_field_error,
};

/// Where a form is in its submit cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionState {
    /// Succeeded and failed forms accept new input like idle ones
    pub fn is_settled(self) -> bool {
        matches!(self, SubmissionState::Succeeded | SubmissionState::Failed)
    }
}

/// Reason a submit attempt did not start
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitBlocked {
    #[error("A submission is already in progress")]
    InFlight,

    #[error("Form has {} invalid field(s)", .0.len())]
    Invalid(FormErrors),
}

#[derive(Clone)]
pub struct FormController {
    initial: FormValues,
    values: FormValues,
    errors: FormErrors,
    touched: BTreeMap<String, bool>,
    form_error: Option<String>,
    state: SubmissionState,
    submitted_once: bool,
    validator: Option<FormValidator>,
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("touched", &self.touched)
            .field("form_error", &self.form_error)
            .field("state", &self.state)
            .field("submitted_once", &self.submitted_once)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

impl FormController {
    pub fn new(initial: FormValues) -> Self {
        Self {
            values: initial.clone(),
            initial,
            errors: FormErrors::new(),
            touched: BTreeMap::new(),
            form_error: None,
            state: SubmissionState::Idle,
            submitted_once: false,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: FormValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// User edited a field
    pub fn change(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.values.set(field, value);
        self.errors.remove(field);
        self.form_error = None;
    }

    /// Field lost focus
    pub fn blur(&mut self, field: &str) {
        self.touched.insert(field.to_string(), true);

        if let Some(validate) = &self.validator {
            match validate(&self.values).remove(field) {
                Some(error) => {
                    self.errors.insert(field.to_string(), error);
                }
                None => {
                    self.errors.remove(field);
                }
            }
        }
    }

    /// Starts a submission.
    ///
    /// Returns a snapshot of the values to submit, or the reason the
    /// submission was refused. A refused submission never changes the
    /// submission state.
    pub fn begin_submit(&mut self) -> Result<FormValues, SubmitBlocked> {
        if self.state == SubmissionState::Submitting {
            return Err(SubmitBlocked::InFlight);
        }

        let names: Vec<String> = self.values.field_names().map(str::to_string).collect();
        for name in names {
            self.touched.insert(name, true);
        }
        self.submitted_once = true;
        self.form_error = None;

        if let Some(validate) = &self.validator {
            let errors = validate(&self.values);
            if !errors.is_empty() {
                self.errors = errors.clone();
                return Err(SubmitBlocked::Invalid(errors));
            }
        }

        self.errors.clear();
        self.state = SubmissionState::Submitting;
        Ok(self.values.clone())
    }

    /// Settles an in-flight submission. Ignored when nothing is in flight.
    pub fn finish_submit<E: fmt::Display>(&mut self, result: Result<(), E>) {
        if self.state != SubmissionState::Submitting {
            return;
        }

        match result {
            Ok(()) => {
                self.state = SubmissionState::Succeeded;
                self.form_error = None;
            }
            Err(error) => {
                self.state = SubmissionState::Failed;
                self.form_error = Some(format_error_message(&error));
            }
        }
    }

    /// Sets a value without clearing errors
    pub fn set_field_value(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.values.set(field, value);
    }

    pub fn set_field_error(&mut self, field: &str, error: Option<String>) {
        match error {
            Some(error) => {
                self.errors.insert(field.to_string(), error);
            }
            None => {
                self.errors.remove(field);
            }
        }
    }

    /// Submission-level error, shown above the fields
    pub fn set_form_error(&mut self, error: Option<String>) {
        self.form_error = error;
    }

    /// Back to the initial values with no errors or touched fields
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
        self.touched.clear();
        self.form_error = None;
        self.state = SubmissionState::Idle;
        self.submitted_once = false;
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> &str {
        self.values.text(field)
    }

    pub fn flag(&self, field: &str) -> bool {
        self.values.flag(field)
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.get(field).copied().unwrap_or(false)
    }

    /// Error to display for a field: only once the field was touched or the
    /// form was submitted
    pub fn visible_error(&self, field: &str) -> Option<String> {
        let error = self.error(field);
        let shown = self.is_touched(field) || self.submitted_once;
        has_field_error(shown, error).then(|| error.unwrap_or_default().to_string())
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn submitted_once(&self) -> bool {
        self.submitted_once
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::{
        compose_validators, create_form_validator, email, match_field, password, required,
    };

    fn login_form() -> FormController {
        FormController::new(
            FormValues::new()
                .with("email", "")
                .with("password", "")
                .with("rememberMe", false),
        )
        .with_validator(create_form_validator([
            ("email", compose_validators(vec![required(), email()])),
            ("password", required()),
        ]))
    }

    #[test]
    fn test_change_updates_value_and_clears_errors() {
        let mut form = login_form();
        form.set_field_error("email", Some("bad".to_string()));
        form.set_form_error(Some("server said no".to_string()));

        form.change("email", "a@b.co");

        assert_eq!(form.text("email"), "a@b.co");
        assert_eq!(form.error("email"), None);
        assert_eq!(form.form_error(), None);
    }

    #[test]
    fn test_changes_apply_in_order() {
        let mut form = login_form();
        form.change("email", "a");
        form.change("email", "ab");
        form.change("email", "abc");
        assert_eq!(form.text("email"), "abc");
    }

    #[test]
    fn test_blur_validates_only_that_field() {
        let mut form = login_form();
        form.change("email", "nope");
        form.blur("email");

        assert!(form.is_touched("email"));
        assert_eq!(form.error("email"), Some("Please enter a valid email address"));
        assert_eq!(form.error("password"), None);
        assert!(!form.is_touched("password"));

        form.change("email", "a@b.co");
        form.blur("email");
        assert_eq!(form.error("email"), None);
    }

    #[test]
    fn test_blur_without_validator_only_touches() {
        let mut form = FormController::new(FormValues::new().with("name", ""));
        form.blur("name");
        assert!(form.is_touched("name"));
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_invalid_submit_is_refused() {
        let mut form = login_form();

        let result = form.begin_submit();

        match result {
            Err(SubmitBlocked::Invalid(errors)) => {
                assert_eq!(errors["email"], "This field is required");
                assert_eq!(errors["password"], "This field is required");
            }
            other => panic!("expected invalid, got {other:?}"),
        }
        assert!(!form.is_submitting());
        assert_eq!(form.state(), SubmissionState::Idle);
        assert!(form.is_touched("email"));
        assert!(form.is_touched("rememberMe"));
        assert!(form.submitted_once());
    }

    #[test]
    fn test_second_submit_while_in_flight_is_refused() {
        let mut form = login_form();
        form.change("email", "a@b.co");
        form.change("password", "secret");

        let values = form.begin_submit().unwrap();
        assert_eq!(values.text("email"), "a@b.co");
        assert!(form.is_submitting());

        assert_eq!(form.begin_submit(), Err(SubmitBlocked::InFlight));
        assert!(form.is_submitting());
    }

    #[test]
    fn test_finish_submit_success_and_failure() {
        let mut form = login_form();
        form.change("email", "a@b.co");
        form.change("password", "secret");

        form.begin_submit().unwrap();
        form.finish_submit::<String>(Ok(()));
        assert_eq!(form.state(), SubmissionState::Succeeded);
        assert!(form.state().is_settled());

        form.begin_submit().unwrap();
        form.finish_submit(Err("Invalid email or password"));
        assert_eq!(form.state(), SubmissionState::Failed);
        assert_eq!(form.form_error(), Some("Invalid email or password"));
        assert!(!form.is_submitting());

        // Empty error text falls back to the generic message
        form.begin_submit().unwrap();
        form.finish_submit(Err(""));
        assert_eq!(form.form_error(), Some("An unexpected error occurred"));
    }

    #[test]
    fn test_finish_without_begin_is_ignored() {
        let mut form = login_form();
        form.finish_submit(Err("late"));
        assert_eq!(form.state(), SubmissionState::Idle);
        assert_eq!(form.form_error(), None);
    }

    #[test]
    fn test_visible_error_requires_touch_or_submit() {
        let mut form = login_form();
        form.set_field_error("email", Some("bad".to_string()));
        assert_eq!(form.visible_error("email"), None);

        form.blur("password");
        assert_eq!(form.visible_error("email"), None);

        let _ = form.begin_submit();
        assert_eq!(
            form.visible_error("email"),
            Some("This field is required".to_string())
        );
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut form = login_form();
        form.change("email", "a@b.co");
        form.change("rememberMe", true);
        let _ = form.begin_submit();

        form.reset();

        assert_eq!(form.text("email"), "");
        assert!(!form.flag("rememberMe"));
        assert!(form.errors().is_empty());
        assert!(!form.is_touched("email"));
        assert!(!form.submitted_once());
        assert_eq!(form.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_register_form_password_confirmation() {
        let mut form = FormController::new(
            FormValues::new()
                .with("password", "")
                .with("confirmPassword", ""),
        )
        .with_validator(create_form_validator([
            ("password", compose_validators(vec![required(), password()])),
            (
                "confirmPassword",
                compose_validators(vec![required(), match_field("password", "Password")]),
            ),
        ]));

        form.change("password", "Passw0rd");
        form.change("confirmPassword", "Passw0rd1");
        form.blur("confirmPassword");
        assert_eq!(form.error("confirmPassword"), Some("Must match Password"));

        form.change("confirmPassword", "Passw0rd");
        assert!(form.begin_submit().is_ok());
    }

    #[test]
    fn test_submit_blocked_display() {
        let mut errors = FormErrors::new();
        errors.insert("email".to_string(), "bad".to_string());
        assert_eq!(
            SubmitBlocked::Invalid(errors).to_string(),
            "Form has 1 invalid field(s)"
        );
        assert_eq!(
            SubmitBlocked::InFlight.to_string(),
            "A submission is already in progress"
        );
    }
}
