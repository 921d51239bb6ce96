//! gecko compiler: orchestrates the full build of one project.
//!
//! ```text
//! codelist.yaml → Parser → validate → resolve → Header generation → cc → digests
//! ```
//!
//! Callers build a [`BuildConfig`] once and pass it to [`build`] together
//! with the [`BuildRequest`] naming the author and project.

pub mod command;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod layout;
pub mod pipeline;
pub mod process;
pub mod resolve;

pub use command::CompileCommand;
pub use config::{BuildConfig, CancelToken, TargetStyle};
pub use error::{BuildError, BuildResult};
pub use fingerprint::{DigestAlgorithm, FileDigest};
pub use layout::ProjectLayout;
pub use pipeline::{build, load_project, BuildReport, BuildRequest};
pub use resolve::{resolve_source, resolve_sources};
