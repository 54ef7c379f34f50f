//! Field rules shared by the HTTP service and the terminal client's form.

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

use crate::task::{TaskDraft, TaskFields};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required.")]
    MissingTitle,
    #[error("Due date is required.")]
    MissingDueDate,
    #[error("Due date is not a valid date.")]
    InvalidDueDate,
    #[error("Due date cannot be in the past.")]
    PastDueDate,
}

/// Per-field outcome of validating a draft.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub title: Option<ValidationError>,
    pub due_date: Option<ValidationError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.due_date.is_none()
    }

    /// The error the service reports: title problems win over date problems.
    pub fn first(&self) -> Option<ValidationError> {
        self.title.or(self.due_date)
    }
}

/// Validates a draft against the calendar date `today`.
///
/// A due date equal to `today` is accepted; only strictly earlier dates are
/// rejected.
pub fn validate(draft: &TaskDraft, today: NaiveDate) -> Result<TaskFields, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let title = match draft.title.as_deref() {
        Some(title) if !title.trim().is_empty() => Some(title.to_string()),
        _ => {
            errors.title = Some(ValidationError::MissingTitle);
            None
        }
    };

    let due_date = match parse_due_date(draft.due_date.as_deref()) {
        Ok(date) if date < today => {
            errors.due_date = Some(ValidationError::PastDueDate);
            None
        }
        Ok(date) => Some(date),
        Err(err) => {
            errors.due_date = Some(err);
            None
        }
    };

    match (title, due_date) {
        (Some(title), Some(due_date)) => Ok(TaskFields {
            title,
            description: draft.description.clone(),
            status: draft.status,
            due_date,
        }),
        _ => Err(errors),
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only its date.
pub fn parse_due_date(raw: Option<&str>) -> Result<NaiveDate, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::MissingDueDate);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| ValidationError::InvalidDueDate)
}
