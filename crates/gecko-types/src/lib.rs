//! Shared types for the gecko code-list compiler.
//!
//! This crate defines the two manifest records ([`Code`], [`CodeList`]),
//! the closed set of generated output formats, and the validation error
//! shared by every later stage.

mod codelist;
mod error;
mod format;

pub use codelist::{Code, CodeList, DEFAULT_GLOBAL_SET, GAME_ID_LEN};
pub use error::{FormatParseError, ValidationError};
pub use format::OutputFormat;

/// Result type used by validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
