//! Loader error types.

use std::path::PathBuf;

use gecko_types::ValidationError;
use thiserror::Error;

/// Errors that can occur while loading a code list document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The code list file could not be read.
    #[error("failed to read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed YAML.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A node has the wrong shape or tag for its position.
    #[error("{context}: expected {expected}, found {found}")]
    UnexpectedNode {
        context: String,
        expected: &'static str,
        found: String,
    },

    /// A mapping-style record named a field the record does not have.
    #[error("{record}: unknown field \"{field}\"")]
    UnknownField { record: String, field: String },

    /// A sequence-style record supplied more values than it has fields.
    #[error("{record}: takes at most {expected} values but {found} were given")]
    TooManyValues {
        record: String,
        expected: usize,
        found: usize,
    },

    /// A required field was not supplied.
    #[error("{record}: missing required field \"{field}\"")]
    MissingField { record: String, field: &'static str },

    /// A field value has the wrong type.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Loader result type alias.
pub type ParseResult<T> = Result<T, ParseError>;
