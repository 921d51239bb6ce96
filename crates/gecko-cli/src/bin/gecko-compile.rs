use std::process::ExitCode;

use clap::Parser;
use gecko_cli::compile::{self, CompileArgs};

fn main() -> ExitCode {
    gecko_cli::init_logging();
    let args = CompileArgs::parse();
    gecko_cli::exit_code(compile::run(&args))
}
