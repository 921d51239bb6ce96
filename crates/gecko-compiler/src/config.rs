//! Build configuration.
//!
//! Everything the pipeline needs from its environment (workspace root,
//! compiler program, target style, handler layout, timeouts) lives in one
//! [`BuildConfig`] built once by the caller and passed by reference.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{BuildError, BuildResult};

/// Default code handler address.
pub const DEFAULT_ADDRESS: u32 = 0x8000_1800;
/// Default code handler size in bytes.
pub const DEFAULT_HANDLER_SIZE: u32 = 2880;
/// Default compiler program.
pub const DEFAULT_COMPILER: &str = "gcc";
/// Default limit on the compiler's lifetime.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Toolchain flavour of the build host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStyle {
    /// Linux and other Unix hosts.
    Unix,
    /// MinGW-style Windows hosts: `.exe` artifacts, no sanitizers.
    Windows,
}

impl TargetStyle {
    /// Style of the host this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// File name suffix of compiled executables.
    pub fn executable_suffix(self) -> &'static str {
        match self {
            Self::Unix => "",
            Self::Windows => ".exe",
        }
    }

    /// Whether the sanitizer and stack protector flags are usable.
    pub fn supports_sanitizers(self) -> bool {
        matches!(self, Self::Unix)
    }
}

/// Shared flag that asks a running child process to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Configuration for one build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Workspace root holding `projects/`, `src/`, `include/` and `bin/`.
    pub root: PathBuf,
    /// Compiler program name or path.
    pub compiler: PathBuf,
    pub target: TargetStyle,
    /// Code handler address (`__GECKO_H_CODEHANDLERADDR__`).
    pub address: u32,
    /// Code handler size, only passed in compat mode.
    pub handler_size: u32,
    /// Build for codehandler.s compatibility.
    pub compat: bool,
    /// Debug build: no optimisation, debug info, sanitizers where supported.
    pub debug: bool,
    /// Limit on the compiler's lifetime.
    pub timeout: Duration,
    pub cancel: CancelToken,
}

impl BuildConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            compiler: PathBuf::from(DEFAULT_COMPILER),
            target: TargetStyle::host(),
            address: DEFAULT_ADDRESS,
            handler_size: DEFAULT_HANDLER_SIZE,
            compat: false,
            debug: false,
            timeout: DEFAULT_TIMEOUT,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_compiler(mut self, compiler: impl Into<PathBuf>) -> Self {
        self.compiler = compiler.into();
        self
    }

    pub fn with_target(mut self, target: TargetStyle) -> Self {
        self.target = target;
        self
    }

    pub fn with_address(mut self, address: u32) -> Self {
        self.address = address;
        self
    }

    pub fn with_handler_size(mut self, size: u32) -> Self {
        self.handler_size = size;
        self
    }

    pub fn with_compat(mut self, compat: bool) -> Self {
        self.compat = compat;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolve [`Self::compiler`] to an executable path.
    ///
    /// A value with a directory component is used as given; a bare name is
    /// searched for on `PATH`.
    pub fn locate_compiler(&self) -> BuildResult<PathBuf> {
        let display = self.compiler.display().to_string();
        if self.compiler.components().count() > 1 {
            return if self.compiler.is_file() {
                Ok(self.compiler.clone())
            } else {
                Err(BuildError::CompilerNotFound(display))
            };
        }
        find_on_path(&self.compiler, self.target).ok_or(BuildError::CompilerNotFound(display))
    }
}

/// Search `PATH` for `program`.
pub fn find_on_path(program: &Path, target: TargetStyle) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    let suffix = target.executable_suffix();
    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !suffix.is_empty() {
            let mut name = program.as_os_str().to_os_string();
            name.push(suffix);
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    })
}
