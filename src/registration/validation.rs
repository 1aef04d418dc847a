use serde::Serialize;

use super::domain::{FormState, RequirementKey};
use super::policy::{FeeCategory, PolicyTable};
use super::requirements::resolve_type;

/// One offending field and the message to surface beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Transient validator output. The first entry is the field the consuming
/// layer should scroll to and focus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn fail(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn first_offending(&self) -> Option<&FieldError> {
        self.errors.first()
    }
}

/// NRC format: six digits, slash, two digits, slash, one digit.
pub fn is_valid_nrc(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    if bytes.len() != 11 {
        return false;
    }

    bytes.iter().enumerate().all(|(index, byte)| match index {
        6 | 9 => *byte == b'/',
        _ => byte.is_ascii_digit(),
    })
}

/// Re-group raw NRC keystrokes as `XXXXXX/XX/X`, dropping anything beyond
/// nine digits.
pub fn format_nrc_digits(raw: &str) -> String {
    let digits: Vec<char> = raw
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(9)
        .collect();

    let mut formatted = String::new();
    for (index, digit) in digits.iter().enumerate() {
        if index == 6 || index == 8 {
            formatted.push('/');
        }
        formatted.push(*digit);
    }
    formatted
}

fn structural_check(state: &FormState, table: &PolicyTable) -> Option<FieldError> {
    let Some(registration_type) = state.selected_type else {
        return Some(FieldError {
            field: "registration_type".to_string(),
            message: "Select a registration type.".to_string(),
        });
    };

    let requirements = resolve_type(table, registration_type);
    for key in &requirements.required {
        if let Some(error) = required_field_check(state, *key) {
            return Some(error);
        }
    }

    if let Some(policy) = table.lookup(registration_type) {
        let basis = match policy.category {
            Some(FeeCategory::I) => Some(("declared_value", state.declared_value)),
            Some(FeeCategory::II) => Some(("secured_amount", state.secured_amount)),
            Some(FeeCategory::III) => Some(("annual_rent", state.annual_rent)),
            None => None,
        };
        if let Some((field, value)) = basis {
            match value {
                None => {
                    return Some(FieldError {
                        field: field.to_string(),
                        message: format!("{} is required for this registration type.", label(field)),
                    })
                }
                Some(amount) if amount < 0.0 => {
                    return Some(FieldError {
                        field: field.to_string(),
                        message: format!("{} must not be negative.", label(field)),
                    })
                }
                Some(_) => {}
            }
        }
    }

    None
}

fn required_field_check(state: &FormState, key: RequirementKey) -> Option<FieldError> {
    if !key.is_document() {
        // The annual_rent slot is covered by the monetary-basis check.
        return None;
    }

    let attached = state
        .documents
        .get(&key)
        .map(|files| !files.is_empty())
        .unwrap_or(false);

    if attached {
        None
    } else {
        Some(FieldError {
            field: key.key().to_string(),
            message: "This document is required.".to_string(),
        })
    }
}

fn label(field: &str) -> &'static str {
    match field {
        "declared_value" => "Declared value",
        "secured_amount" => "Secured amount",
        "annual_rent" => "Annual rent",
        _ => "This field",
    }
}

/// Submission-time validation, short-circuiting at the first failure:
/// structural constraints on visible fields, then geometry presence, then
/// NRC format.
pub fn validate(state: &FormState, table: &PolicyTable) -> ValidationResult {
    if let Some(error) = structural_check(state, table) {
        return ValidationResult {
            is_valid: false,
            errors: vec![error],
        };
    }

    if state.geometry().is_none() {
        return ValidationResult::fail("land_geometry", "Please draw your parcel on the map");
    }

    if !is_valid_nrc(state.nrc_number.trim()) {
        return ValidationResult::fail("nrc_number", "NRC must be in format 123456/78/9");
    }

    ValidationResult::ok()
}
