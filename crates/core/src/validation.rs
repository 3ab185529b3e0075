//! Field validation rules and the field-error collection type.
//!
//! Static shape rules (lengths, e-mail syntax, score range, character sets)
//! are declared on request DTOs with `validator` derives. Rules that depend
//! on the clock or on reserved values live here as plain functions returning
//! `Result<(), String>`, and both kinds are merged into a [`FieldErrors`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;
use crate::roles::{is_valid_role, VALID_ROLES};

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Username reserved for the self-service profile route (`/users/me`).
pub const RESERVED_USERNAME: &str = "me";

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const SLUG_MAX_LENGTH: usize = 50;

pub const MIN_SCORE: i32 = 1;
pub const MAX_SCORE: i32 = 10;

pub const BLANK_MESSAGE: &str = "This field may not be blank.";
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Letters, digits, underscore and `.@+-`.
pub static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+\z").expect("valid regex"));

/// ASCII letters, digits, hyphen and underscore.
pub static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+\z").expect("valid regex"));

/* --------------------------------------------------------------------------
Validation functions
-------------------------------------------------------------------------- */

/// Validate a username chosen at signup or by an administrator.
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err(BLANK_MESSAGE.to_string());
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {USERNAME_MAX_LENGTH} characters."
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(
            "Username may contain only letters, digits and the characters . @ + - _".to_string(),
        );
    }
    if username == RESERVED_USERNAME {
        return Err(format!("Username '{RESERVED_USERNAME}' is reserved."));
    }
    Ok(())
}

/// Validate a category or genre slug.
pub fn validate_slug(slug: &str) -> Result<(), String> {
    if slug.is_empty() {
        return Err(BLANK_MESSAGE.to_string());
    }
    if slug.len() > SLUG_MAX_LENGTH {
        return Err(format!(
            "Ensure this field has no more than {SLUG_MAX_LENGTH} characters."
        ));
    }
    if !SLUG_RE.is_match(slug) {
        return Err("Slug may contain only latin letters, digits, hyphens and underscores.".into());
    }
    Ok(())
}

/// Validate a title's release year against the current UTC year.
pub fn validate_year(year: i32) -> Result<(), String> {
    validate_year_at(year, chrono::Utc::now().year())
}

/// Validate a release year against an explicit `current_year`.
pub fn validate_year_at(year: i32, current_year: i32) -> Result<(), String> {
    if year < 0 {
        return Err("Year must not be negative.".to_string());
    }
    if year > current_year {
        return Err(format!("Year must not be later than {current_year}."));
    }
    Ok(())
}

/// Validate a review score.
pub fn validate_score(score: i32) -> Result<(), String> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(format!(
            "Score must be between {MIN_SCORE} and {MAX_SCORE}."
        ));
    }
    Ok(())
}

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), String> {
    if is_valid_role(role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

/// Reject empty or whitespace-only text.
pub fn validate_not_blank(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(BLANK_MESSAGE.to_string())
    } else {
        Ok(())
    }
}

/* --------------------------------------------------------------------------
FieldErrors
-------------------------------------------------------------------------- */

/// Validation messages keyed by request field name.
///
/// Serializes as a plain JSON object: `{"score": ["..."], "year": ["..."]}`.
/// Errors that do not belong to a single field use the key
/// [`FieldErrors::NON_FIELD`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub const NON_FIELD: &'static str = "non_field_errors";

    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a collection holding exactly one message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Record the error of a rule result, if any.
    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    /// Record [`REQUIRED_MESSAGE`] on `field` when `value` is missing.
    pub fn require<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, REQUIRED_MESSAGE);
        }
        value
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise
    /// [`CoreError::InvalidFields`].
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::InvalidFields(self))
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Unwrap a required value, or fail with a single "required" field error.
pub fn required<T>(field: &str, value: Option<T>) -> Result<T, CoreError> {
    value.ok_or_else(|| CoreError::InvalidFields(FieldErrors::single(field, REQUIRED_MESSAGE)))
}

/// Run the derived `validator` rules of `input` and collect their messages.
pub fn validate_input<T: Validate>(input: &T) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}
