//! Field constraints for request payloads.

use bookapi_http::AppError;
use serde::Serialize;

/// One failed constraint, keyed by the camelCase field name clients send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

/// Records that can be checked before they are persisted.
pub trait Validate {
    fn validate(&self) -> Vec<Violation>;
}

/// Collects violations for a single record.
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_blank(mut self, field: &'static str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.violations.push(Violation {
                field,
                message: "This value should not be blank.".to_string(),
            });
        }
        self
    }

    /// Length is counted in characters, not bytes.
    pub fn max_length(mut self, field: &'static str, value: Option<&str>, max: usize) -> Self {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.violations.push(Violation {
                    field,
                    message: format!(
                        "This value is too long. It should have {max} characters or less."
                    ),
                });
            }
        }
        self
    }

    pub fn finish(self) -> Vec<Violation> {
        self.violations
    }
}

/// Turns a non-empty violation list into a 400.
pub fn ensure_valid<T: Validate>(record: &T, what: &str) -> Result<(), AppError> {
    let violations = record.validate();
    if violations.is_empty() {
        return Ok(());
    }

    tracing::debug!(record = what, count = violations.len(), "validation failed");
    let details = violations
        .iter()
        .filter_map(|violation| serde_json::to_value(violation).ok())
        .collect();
    Err(AppError::validation(details, format!("invalid {what}")))
}
