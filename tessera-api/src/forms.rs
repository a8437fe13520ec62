//! Submitted HTML forms and their validation rules.
//!
//! Each form derives `Validate`. The "required" rule carries the `required`
//! code so that, when a field is blank, its message wins over the rules
//! behind it.

use std::collections::BTreeMap;

use serde::Deserialize;
use tessera_core::timestamp::parse_event_timestamp;
use tessera_shared::models::{api::EventPayload, Event, NewEvent};
use validator::{Validate, ValidationError, ValidationErrors};

const REQUIRED: &str = "required";
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// First error message per field, ready for the template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    /// Records `message` unless the field already has one.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All messages on one line, for surfaces without per-field display.
    pub fn summary(&self) -> String {
        self.0.values().cloned().collect::<Vec<_>>().join(" ")
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FormErrors::default();
        for (field, list) in errors.field_errors() {
            let first = list
                .iter()
                .find(|e| e.code == REQUIRED)
                .or_else(|| list.first());
            if let Some(error) = first {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}.", field));
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED));
    }
    Ok(())
}

/// Runs the declared rules of a form.
pub fn check<T: Validate>(form: &T) -> Result<(), FormErrors> {
    form.validate().map_err(FormErrors::from)
}

// ============================================================================
// Account Forms
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(
        custom(function = "not_blank", code = "required", message = "Email is required."),
        length(max = 120, message = "Email must be at most 120 characters."),
        email(message = "Invalid email address.")
    )]
    pub email: String,
    #[validate(custom(function = "not_blank", code = "required", message = "Password is required."))]
    pub password: String,
    /// Checkbox: present ("on") when ticked.
    pub remember: Option<String>,
}

impl LoginForm {
    pub fn remember(&self) -> bool {
        self.remember.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupForm {
    #[validate(
        custom(function = "not_blank", code = "required", message = "Email is required."),
        length(max = 120, message = "Email must be at most 120 characters."),
        email(message = "Invalid email address.")
    )]
    pub email: String,
    #[validate(
        custom(function = "not_blank", code = "required", message = "Password is required."),
        length(min = 6, message = "Password must be at least 6 characters.")
    )]
    pub password: String,
    #[validate(
        custom(function = "not_blank", code = "required", message = "Please confirm your password."),
        must_match(other = "password", message = "Passwords must match.")
    )]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CancelForm {
    #[validate(
        custom(function = "not_blank", code = "required", message = "Email is required."),
        length(max = 120, message = "Email must be at most 120 characters."),
        email(message = "Invalid email address.")
    )]
    pub email: String,
}

// ============================================================================
// Event Form
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct EventForm {
    #[validate(
        custom(function = "not_blank", code = "required", message = "Title is required."),
        length(max = 100, message = "Title must be at most 100 characters.")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank", code = "required", message = "Start date is required."))]
    pub start_date: String,
    #[validate(custom(function = "not_blank", code = "required", message = "End date is required."))]
    pub end_date: String,
    #[validate(length(max = 200, message = "Thumbnail URL must be at most 200 characters."))]
    pub thumbnail: String,
}

impl EventForm {
    /// Pre-filled form for editing an existing event.
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            start_date: event.start_date.format(INPUT_FORMAT).to_string(),
            end_date: event.end_date.format(INPUT_FORMAT).to_string(),
            thumbnail: event.thumbnail.clone().unwrap_or_default(),
        }
    }

    /// Validates the form and converts it into typed event fields.
    pub fn into_new_event(&self) -> Result<NewEvent, FormErrors> {
        let mut errors = check(self).err().unwrap_or_default();

        let start = parse_event_timestamp("Start date", &self.start_date);
        let end = parse_event_timestamp("End date", &self.end_date);
        if let Err(e) = &start {
            errors.add("start_date", e.to_string());
        }
        if let Err(e) = &end {
            errors.add("end_date", e.to_string());
        }

        match (start, end) {
            (Ok(start_date), Ok(end_date)) if errors.is_empty() => {
                if end_date < start_date {
                    errors.add("end_date", "End date must not be before the start date.");
                    return Err(errors);
                }
                let thumbnail = self.thumbnail.trim();
                Ok(NewEvent {
                    title: self.title.trim().to_string(),
                    start_date,
                    end_date,
                    thumbnail: (!thumbnail.is_empty()).then(|| thumbnail.to_string()),
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<EventPayload> for EventForm {
    fn from(payload: EventPayload) -> Self {
        Self {
            title: payload.title,
            start_date: payload.start_date,
            end_date: payload.end_date,
            thumbnail: payload.thumbnail.unwrap_or_default(),
        }
    }
}
