//! Codegen error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing generated C sources.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// An output directory is missing.
    #[error("\"{}\" does not exist", .0.display())]
    MissingDirectory(PathBuf),

    /// An output directory path names a file.
    #[error("\"{}\" is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// An output file path is taken by a directory.
    #[error("\"{}\" already exists as a directory", .0.display())]
    OccupiedByDirectory(PathBuf),

    /// The header directory cannot be reached from the base include directory.
    #[error("\"{}\" is not under the base include directory \"{}\"", dir.display(), base.display())]
    IncludeOutsideBase { dir: PathBuf, base: PathBuf },

    /// The payload's element count would not fit in a 32-bit count.
    #[error(
        "\"{}\" is {size} bytes; max {max_gib} GiB supported for {width_bits}-bit words",
        path.display()
    )]
    PayloadTooLarge {
        path: PathBuf,
        size: u64,
        width_bits: u32,
        max_gib: u32,
    },

    /// Word width other than 1, 2 or 4 bytes.
    #[error("unsupported word width {0} (expected 1, 2 or 4)")]
    InvalidWordWidth(u8),

    /// Reading the payload or writing an output failed.
    #[error("I/O error on \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
