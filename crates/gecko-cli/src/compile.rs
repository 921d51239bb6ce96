//! `gecko-compile`: build one project's code list into a native binary.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use gecko_compiler::{build, BuildConfig, BuildRequest, CancelToken};

use crate::parse_int;

/// Compiles a code list for use with gecko.
///
/// The code list is read from <root>/projects/<author>/<project>/codelist.yaml.
#[derive(Parser, Debug)]
#[command(name = "gecko-compile", version)]
pub struct CompileArgs {
    /// The author of the project. The code list must name the same author.
    pub author: String,

    /// The project name. The code list must name the same project.
    pub project: String,

    /// Address of the code handler.
    #[arg(short, long, value_parser = parse_int, default_value = "0x80001800")]
    pub address: u32,

    /// Size of the code handler in bytes. Only used with --compat.
    #[arg(short, long, value_parser = parse_int, default_value = "2880")]
    pub size: u32,

    /// Compile for compatibility with codehandler.s (Dolphin, Nintendont, etc.).
    #[arg(short, long)]
    pub compat: bool,

    /// Compile as debug. On Unix hosts this adds sanitizers and the stack protector.
    #[arg(short, long)]
    pub debug: bool,

    /// Workspace root. Defaults to the current directory.
    #[arg(long, env = "GECKO_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// C compiler to invoke.
    #[arg(long = "cc", env = "GECKO_CC", default_value = "gcc", value_name = "PROGRAM")]
    pub compiler: PathBuf,

    /// Seconds the compiler may run before it is killed.
    #[arg(long, default_value_t = 60, value_name = "SECS")]
    pub timeout: u64,

    /// Print a JSON build report on success.
    #[arg(long)]
    pub report: bool,
}

impl CompileArgs {
    /// Build the configuration these arguments describe.
    pub fn config(&self, cancel: CancelToken) -> std::io::Result<BuildConfig> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => env::current_dir()?,
        };
        Ok(BuildConfig::new(root)
            .with_compiler(&self.compiler)
            .with_address(self.address)
            .with_handler_size(self.size)
            .with_compat(self.compat)
            .with_debug(self.debug)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_cancel(cancel))
    }

    pub fn request(&self) -> BuildRequest {
        BuildRequest::new(&self.author, &self.project)
    }
}

/// Run a build. Errors are returned as display text.
pub fn run(args: &CompileArgs) -> Result<(), String> {
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_token.cancel()) {
        log::warn!("Failed to install the interrupt handler: {e}");
    }

    let config = args
        .config(cancel)
        .map_err(|e| format!("cannot determine the workspace root: {e}"))?;
    let report = build(&config, &args.request()).map_err(|e| e.to_string())?;

    if args.report {
        let json = report.to_json().map_err(|e| e.to_string())?;
        println!("{json}");
    }
    Ok(())
}
