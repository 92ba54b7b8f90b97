//! Form field validators
//!
//! A validator maps a field value (plus the values of its sibling fields) to an
//! optional error message. `None` is the only success signal; validators never
//! panic. Validators compose with [`compose_validators`] and aggregate into a
//! whole-form check with [`create_form_validator`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Message used when an error carries no text of its own
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Minimum password length enforced by [`password`]
pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Current value of a single form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    /// Text content, or `None` for checkbox-style fields
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Flag(_) => None,
        }
    }

    /// Boolean content, or `None` for text fields
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(flag) => Some(*flag),
            FieldValue::Text(_) => None,
        }
    }

    /// Whether the value counts as "not filled in" (empty text or unchecked)
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Flag(flag) => !flag,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Field name to value mapping for one form instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for declaring initial values
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Text value of a field; missing and checkbox fields read as ""
    pub fn text(&self, name: &str) -> &str {
        self.0.get(name).and_then(FieldValue::as_text).unwrap_or("")
    }

    /// Flag value of a field; missing and text fields read as `false`
    pub fn flag(&self, name: &str) -> bool {
        self.0.get(name).and_then(FieldValue::as_flag).unwrap_or(false)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Field name to error message mapping
pub type FormErrors = BTreeMap<String, String>;

/// A single-field validator
pub type Validator = Arc<dyn Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync>;

/// A whole-form validator
pub type FormValidator = Arc<dyn Fn(&FormValues) -> FormErrors + Send + Sync>;

fn validator<F>(check: F) -> Validator
where
    F: Fn(&FieldValue, &FormValues) -> Option<String> + Send + Sync + 'static,
{
    Arc::new(check)
}

/// Fails on empty text and unchecked flags
pub fn required() -> Validator {
    validator(|value, _| value.is_blank().then(|| "This field is required".to_string()))
}

/// Checks the `local@domain.tld` shape. Empty input is valid; pair with
/// [`required`] when the field is mandatory.
pub fn email() -> Validator {
    validator(|value, _| email_problem(value.as_text()?))
}

/// Shared by [`email`] and the session store's password reset precheck
pub fn email_problem(text: &str) -> Option<String> {
    if text.is_empty() || EMAIL_PATTERN.is_match(text) {
        None
    } else {
        Some("Please enter a valid email address".to_string())
    }
}

pub fn min_length(min: usize) -> Validator {
    validator(move |value, _| {
        let text = value.as_text()?;
        if text.is_empty() || text.chars().count() >= min {
            None
        } else {
            Some(format!("Must be at least {min} characters"))
        }
    })
}

pub fn max_length(max: usize) -> Validator {
    validator(move |value, _| {
        let text = value.as_text()?;
        if text.is_empty() || text.chars().count() <= max {
            None
        } else {
            Some(format!("Must be no more than {max} characters"))
        }
    })
}

/// Password strength check.
///
/// Requires at least [`MIN_PASSWORD_LENGTH`] characters, one uppercase letter,
/// one lowercase letter and one digit. Every unmet rule is listed in a single
/// message so the user sees the full list at once.
pub fn password() -> Validator {
    validator(|value, _| {
        let text = value.as_text()?;
        password_problems(text)
    })
}

/// Shared by [`password`] and the session store's sign-up precheck
pub fn password_problems(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    let mut missing = Vec::new();
    if text.chars().count() < MIN_PASSWORD_LENGTH {
        missing.push("at least 8 characters");
    }
    if !text.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("at least one uppercase letter");
    }
    if !text.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("at least one lowercase letter");
    }
    if !text.chars().any(|c| c.is_ascii_digit()) {
        missing.push("at least one number");
    }

    if missing.is_empty() {
        None
    } else {
        Some(format!("Password must contain {}", missing.join(", ")))
    }
}

/// Requires equality with another field, e.g. password confirmation
pub fn match_field(field_name: impl Into<String>, field_label: impl Into<String>) -> Validator {
    let field_name = field_name.into();
    let field_label = field_label.into();
    validator(move |value, all| {
        if all.get(&field_name) == Some(value) {
            None
        } else {
            Some(format!("Must match {field_label}"))
        }
    })
}

/// Runs validators in order and returns the first error
pub fn compose_validators(validators: Vec<Validator>) -> Validator {
    validator(move |value, all| validators.iter().find_map(|validate| validate(value, all)))
}

/// Builds a whole-form validator from per-field validators.
///
/// Missing fields are validated as empty text. Only fields with an error
/// appear in the result.
pub fn create_form_validator<I, K>(fields: I) -> FormValidator
where
    I: IntoIterator<Item = (K, Validator)>,
    K: Into<String>,
{
    let fields: Vec<(String, Validator)> = fields
        .into_iter()
        .map(|(name, validator)| (name.into(), validator))
        .collect();
    let empty = FieldValue::Text(String::new());

    Arc::new(move |values: &FormValues| {
        fields
            .iter()
            .filter_map(|(name, validate)| {
                let value = values.get(name).unwrap_or(&empty);
                validate(value, values).map(|error| (name.clone(), error))
            })
            .collect()
    })
}

/// Turns any error into a user-facing message, falling back to
/// [`FALLBACK_ERROR_MESSAGE`] when the error renders as an empty string
pub fn format_error_message(error: &dyn fmt::Display) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE.to_string()
    } else {
        message
    }
}

/// Whether a field's error should be shown yet
pub fn has_field_error(touched: bool, error: Option<&str>) -> bool {
    touched && error.is_some_and(|e| !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(validate: &Validator, value: &str) -> Option<String> {
        validate(&FieldValue::from(value), &FormValues::new())
    }

    #[test]
    fn test_required() {
        assert_eq!(
            check(&required(), ""),
            Some("This field is required".to_string())
        );
        assert_eq!(check(&required(), "x"), None);
        assert!(required()(&FieldValue::Flag(false), &FormValues::new()).is_some());
        assert!(required()(&FieldValue::Flag(true), &FormValues::new()).is_none());
    }

    #[test]
    fn test_email() {
        assert_eq!(check(&email(), "a@b.co"), None);
        assert_eq!(check(&email(), "user.name+tag@example.co.uk"), None);
        assert!(check(&email(), "a@b").is_some());
        assert!(check(&email(), "a").is_some());
        assert!(check(&email(), "a @b.co").is_some());
        assert!(check(&email(), "a@@b.co").is_some());
        // Empty is left to `required`
        assert_eq!(check(&email(), ""), None);
    }

    #[test]
    fn test_min_and_max_length() {
        assert_eq!(
            check(&min_length(3), "ab"),
            Some("Must be at least 3 characters".to_string())
        );
        assert_eq!(check(&min_length(3), "abc"), None);
        assert_eq!(check(&min_length(3), ""), None);

        assert_eq!(
            check(&max_length(3), "abcd"),
            Some("Must be no more than 3 characters".to_string())
        );
        assert_eq!(check(&max_length(3), "abc"), None);
        // Characters, not bytes
        assert_eq!(check(&max_length(3), "äöü"), None);
    }

    #[test]
    fn test_password_reports_every_missing_rule() {
        assert_eq!(
            check(&password(), "Abc1"),
            Some("Password must contain at least 8 characters".to_string())
        );
        assert_eq!(
            check(&password(), "abc"),
            Some(
                "Password must contain at least 8 characters, at least one uppercase letter, at least one number"
                    .to_string()
            )
        );
        assert_eq!(
            check(&password(), "!!!!"),
            Some(
                "Password must contain at least 8 characters, at least one uppercase letter, at least one lowercase letter, at least one number"
                    .to_string()
            )
        );
        assert_eq!(check(&password(), "Abcdefg1"), None);
        assert_eq!(check(&password(), ""), None);
    }

    #[test]
    fn test_match_field() {
        let values = FormValues::new()
            .with("password", "Passw0rd")
            .with("confirmPassword", "Passw0rd");
        let validate = match_field("password", "Password");

        assert_eq!(validate(&FieldValue::from("Passw0rd"), &values), None);
        assert_eq!(
            validate(&FieldValue::from("other"), &values),
            Some("Must match Password".to_string())
        );
    }

    #[test]
    fn test_compose_short_circuits_in_order() {
        let validate = compose_validators(vec![required(), email()]);
        assert_eq!(
            check(&validate, ""),
            Some("This field is required".to_string())
        );
        assert_eq!(
            check(&validate, "nope"),
            Some("Please enter a valid email address".to_string())
        );
        assert_eq!(check(&validate, "a@b.co"), None);
    }

    #[test]
    fn test_create_form_validator_returns_only_failures() {
        let validate = create_form_validator([
            ("email", compose_validators(vec![required(), email()])),
            ("password", compose_validators(vec![required(), password()])),
            (
                "confirmPassword",
                compose_validators(vec![required(), match_field("password", "Password")]),
            ),
        ]);

        let values = FormValues::new()
            .with("email", "new@x.com")
            .with("password", "Passw0rd")
            .with("confirmPassword", "Passw0rd");
        assert!(validate(&values).is_empty());

        let values = FormValues::new()
            .with("email", "bad")
            .with("password", "Passw0rd")
            .with("confirmPassword", "Passw0rd1");
        let errors = validate(&values);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["email"], "Please enter a valid email address");
        assert_eq!(errors["confirmPassword"], "Must match Password");
    }

    #[test]
    fn test_missing_field_validates_as_empty() {
        let validate = create_form_validator([("email", required())]);
        let errors = validate(&FormValues::new());
        assert_eq!(errors["email"], "This field is required");
    }

    #[test]
    fn test_form_values_accessors() {
        let values = FormValues::new()
            .with("email", "a@b.co")
            .with("rememberMe", true);

        assert_eq!(values.text("email"), "a@b.co");
        assert_eq!(values.text("rememberMe"), "");
        assert_eq!(values.text("missing"), "");
        assert!(values.flag("rememberMe"));
        assert!(!values.flag("email"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_format_error_message() {
        assert_eq!(format_error_message(&"boom"), "boom");
        assert_eq!(format_error_message(&""), FALLBACK_ERROR_MESSAGE);
        let io = std::io::Error::other("disk gone");
        assert_eq!(format_error_message(&io), "disk gone");
    }

    #[test]
    fn test_has_field_error() {
        assert!(has_field_error(true, Some("bad")));
        assert!(!has_field_error(false, Some("bad")));
        assert!(!has_field_error(true, None));
        assert!(!has_field_error(true, Some("")));
    }
}
