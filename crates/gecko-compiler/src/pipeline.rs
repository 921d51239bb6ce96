//! The build pipeline.
//!
//! ```text
//! codelist.yaml → load → validate → resolve sources → generate headers
//!               → compile → fingerprint
//! ```
//!
//! Each step completes before the next begins. The absence of the artifact
//! after the compiler runs is what marks a failed build; the compiler's exit
//! status only goes to the log.

use std::fs;
use std::path::PathBuf;

use gecko_codegen::GeneratedHeaders;
use gecko_parser::{load_code_list, ParseError};
use gecko_types::CodeList;
use serde::{Deserialize, Serialize};

use crate::command::CompileCommand;
use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::fingerprint::{self, FileDigest};
use crate::layout::{self, ProjectLayout};
use crate::process::{self, ProcessOutput, Termination};
use crate::resolve;

/// Minimum number of sources handed to the compiler.
pub const MIN_SOURCES: usize = 2;

/// Which project to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub author: String,
    pub project: String,
}

impl BuildRequest {
    /// One pair of matching surrounding quotes is stripped from `project`.
    pub fn new(author: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            project: strip_matching_quotes(&project.into()).to_string(),
        }
    }
}

/// Outputs of a successful build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub author: String,
    pub project: String,
    pub artifact: PathBuf,
    pub log: PathBuf,
    pub declarations: PathBuf,
    pub dispatch: PathBuf,
    /// Sources passed to the compiler, in command line order.
    pub sources: Vec<PathBuf>,
    pub digests: Vec<FileDigest>,
}

impl BuildReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Pipeline
// ══════════════════════════════════════════════════════════════════════════════

/// Load and validate the code list for `request`.
pub fn load_project(layout: &ProjectLayout, request: &BuildRequest) -> BuildResult<CodeList> {
    let path = layout.code_list();
    layout::require_file(&path)?;

    let mut list = load_code_list(&path).map_err(|e| match e {
        ParseError::Validation(source) => BuildError::InvalidCodeList {
            path: path.clone(),
            source,
        },
        source => BuildError::Parse {
            path: path.clone(),
            source,
        },
    })?;
    list.validate().map_err(|source| BuildError::InvalidCodeList {
        path: path.clone(),
        source,
    })?;
    list.check_origin(&request.author, &request.project)?;
    Ok(list)
}

/// Run the whole pipeline for one project.
pub fn build(config: &BuildConfig, request: &BuildRequest) -> BuildResult<BuildReport> {
    let layout = ProjectLayout::new(&config.root, &request.author, &request.project);
    let list = load_project(&layout, request)?;

    layout::require_dir(&layout.project_dir())?;
    let project_src = layout.project_src();
    layout::require_dir(&project_src)?;
    let code_sources = resolve::resolve_sources(&list, &project_src)?;

    let gen_dir = layout.gen_dir();
    layout::ensure_dir(&gen_dir)?;
    let (declarations, dispatch) = GeneratedHeaders::generate(&list).write_to(&gen_dir)?;

    let bin_dir = layout.bin_dir();
    layout::ensure_dir(&bin_dir)?;
    let artifact = layout.artifact(config.target);
    layout::require_writable_file(&artifact)?;
    if artifact.exists() {
        fs::remove_file(&artifact).map_err(BuildError::io(&artifact))?;
    }

    let mut include_dirs = Vec::new();
    for root in [layout.shared_include(), layout.project_include()] {
        layout::require_dir(&root)?;
        include_dirs.extend(layout::include_dirs(&root)?);
    }

    let shared_src = layout.shared_src();
    layout::require_dir(&shared_src)?;
    let mut sources = layout::c_sources(&shared_src)?;
    sources.extend(code_sources);
    if sources.len() < MIN_SOURCES {
        return Err(BuildError::MissingSources {
            found: sources.len(),
        });
    }

    let log_path = layout.sidecar(config.target, "log");
    layout::require_writable_file(&log_path)?;

    log::info!("Compiling \"{}\"", artifact.display());
    let (log_text, outcome) = match config.locate_compiler() {
        Ok(compiler) => {
            let command = CompileCommand::new(config, &compiler, &artifact, &include_dirs, &sources);
            compile(config, &command)
        }
        Err(e) => (format!("{e}\n"), Err(e)),
    };
    fs::write(&log_path, log_text).map_err(BuildError::io(&log_path))?;
    outcome?;

    if !artifact.is_file() {
        return Err(BuildError::CompileFailed {
            artifact,
            log: log_path,
        });
    }

    let digests = fingerprint::write_sidecars(&artifact, |ext| layout.sidecar(config.target, ext))?;
    log::info!("Finished");

    Ok(BuildReport {
        author: request.author.clone(),
        project: request.project.clone(),
        artifact,
        log: log_path,
        declarations,
        dispatch,
        sources,
        digests,
    })
}

/// Probe the compiler version, then compile. Returns the log text along
/// with any failure to start the compiler; that failure is also logged.
fn compile(config: &BuildConfig, command: &CompileCommand) -> (String, BuildResult<()>) {
    let version_args = vec!["--version".to_string()];
    let mut log_text = format!("{} --version\n", command.program.display());

    let probe = match process::run(
        &command.program,
        &version_args,
        &config.root,
        config.timeout,
        &config.cancel,
    ) {
        Ok(probe) => probe,
        Err(e) => {
            log_text.push_str(&format!("{e}\n"));
            return (log_text, Err(e));
        }
    };
    log_text.push_str(&probe.output);
    if !probe.success() {
        report_termination(&command.program.display().to_string(), &probe);
        return (log_text, Ok(()));
    }

    log_text.push_str(&command.display_line());
    log_text.push('\n');
    match process::run(
        &command.program,
        &command.args,
        &config.root,
        config.timeout,
        &config.cancel,
    ) {
        Ok(output) => {
            log_text.push_str(&output.output);
            report_termination(&command.program.display().to_string(), &output);
            (log_text, Ok(()))
        }
        Err(e) => {
            log_text.push_str(&format!("{e}\n"));
            (log_text, Err(e))
        }
    }
}

fn report_termination(program: &str, output: &ProcessOutput) {
    match output.termination {
        Termination::Exited(status) if status.success() => {}
        Termination::Exited(status) => log::debug!("\"{program}\" exited with {status}"),
        Termination::TimedOut | Termination::Interrupted => {
            log::debug!("\"{program}\" stopped early ({:?})", output.termination)
        }
    }
}

/// Strip one pair of matching `"` or `'` around `s`.
pub fn strip_matching_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
