use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A manifest field failed validation.
///
/// `field` names the offending field. Fields of a contained code are
/// qualified with the code's position, e.g. `codes[1].name`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Failed to validate \"{field}\": {message}")]
pub struct ValidationError {
    /// Field name (possibly qualified with a code index).
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl ValidationError {
    /// Create a new error for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Qualify the field with the index of the code it belongs to.
    pub fn in_code(self, index: usize) -> Self {
        Self {
            field: format!("codes[{index}].{}", self.field),
            message: self.message,
        }
    }

    /// The unqualified field name (`codes[1].name` → `name`).
    pub fn leaf_field(&self) -> &str {
        self.field.rsplit('.').next().unwrap_or(&self.field)
    }
}

/// An output format name did not match any known format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format \"{0}\" (expected dolphin, gct, ocarina, raw or rawtext)")]
pub struct FormatParseError(pub String);
