//! Build pipeline error types.

use std::path::PathBuf;

use gecko_codegen::CodegenError;
use gecko_parser::ParseError;
use gecko_types::ValidationError;
use thiserror::Error;

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    // ── Code list ──
    /// The code list document could not be loaded.
    #[error("Failed to parse the code list \"{}\": {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The code list loaded but a field is malformed.
    #[error("Validation failed for the code list \"{}\": {source}", path.display())]
    InvalidCodeList {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// The code list does not belong to the requested author/project.
    #[error(transparent)]
    Origin(#[from] ValidationError),

    // ── Filesystem preconditions ──
    #[error("\"{}\" does not exist", .0.display())]
    Missing(PathBuf),

    #[error("\"{}\" is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("\"{}\" is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("\"{}\" already exists as a file", .0.display())]
    OccupiedByFile(PathBuf),

    #[error("\"{}\" already exists as a directory", .0.display())]
    OccupiedByDirectory(PathBuf),

    // ── Source resolution ──
    /// No `<file>.c` under the project source tree.
    #[error("\"{file}.c\" does not exist anywhere under \"{}\"", dir.display())]
    SourceNotFound { file: String, dir: PathBuf },

    /// More than one `<file>.c` under the project source tree.
    #[error(
        "Duplicate source files for \"{file}.c\": \"{}\" and \"{}\"",
        first.display(),
        second.display()
    )]
    DuplicateSource {
        file: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Fewer than two sources would be passed to the compiler.
    #[error("Some source files are missing (found {found})")]
    MissingSources { found: usize },

    // ── Compilation ──
    /// The compiler program is not on `PATH`.
    #[error("compiler \"{0}\" not found")]
    CompilerNotFound(String),

    /// The compiler could not be started.
    #[error("failed to start \"{}\": {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact is absent after the compiler ran.
    #[error("There was an error compiling, please check \"{}\"", log.display())]
    CompileFailed { artifact: PathBuf, log: PathBuf },

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("I/O error on \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Build result type alias.
pub type BuildResult<T> = Result<T, BuildError>;
