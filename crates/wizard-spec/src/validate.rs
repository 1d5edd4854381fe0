use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::form::FormFactory;
use crate::spec::page::PageSpec;
use crate::spec::question::Constraint;

/// Validation failure attached to a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field_id: String,
    pub message: String,
    pub code: String,
}

impl FieldError {
    pub fn new(
        field_id: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Summary of one page validated against an answer payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<FieldError>,
    pub missing_required: Vec<String>,
}

/// Binds `answers` to the page's fields and reports every failure.
pub fn validate_page(page: &PageSpec, answers: &Value) -> ValidationResult {
    let mut form = FormFactory::for_page(page).bind(answers);
    form.full_clean();
    let (missing_required, errors): (Vec<FieldError>, Vec<FieldError>) = form
        .errors()
        .iter()
        .cloned()
        .partition(|error| error.code == "required");
    ValidationResult {
        valid: form.is_valid(),
        errors,
        missing_required: missing_required
            .into_iter()
            .map(|error| error.field_id)
            .collect(),
    }
}

pub(crate) fn enforce_constraint(
    field_id: &str,
    text: &str,
    constraint: &Constraint,
) -> Option<FieldError> {
    if let Some(pattern) = &constraint.pattern
        && let Ok(regex) = Regex::new(pattern)
        && !regex.is_match(text)
    {
        return Some(FieldError::new(
            field_id,
            "value does not match pattern",
            "pattern_mismatch",
        ));
    }

    let length = text.chars().count();

    if let Some(min_len) = constraint.min_len
        && length < min_len
    {
        return Some(FieldError::new(
            field_id,
            "string shorter than min length",
            "min_length",
        ));
    }

    if let Some(max_len) = constraint.max_len
        && length > max_len
    {
        return Some(FieldError::new(
            field_id,
            "string longer than max length",
            "max_length",
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_checks_pattern_then_length() {
        let constraint = Constraint {
            pattern: Some("^[a-z]+$".into()),
            min_len: Some(2),
            max_len: Some(4),
        };
        assert!(enforce_constraint("q", "abc", &constraint).is_none());
        assert_eq!(
            enforce_constraint("q", "ABC", &constraint).unwrap().code,
            "pattern_mismatch"
        );
        assert_eq!(
            enforce_constraint("q", "a", &constraint).unwrap().code,
            "min_length"
        );
        assert_eq!(
            enforce_constraint("q", "abcde", &constraint).unwrap().code,
            "max_length"
        );
    }
}
