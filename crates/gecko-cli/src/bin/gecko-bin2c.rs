use std::process::ExitCode;

use clap::Parser;
use gecko_cli::bin2c::{self, Bin2cArgs};

fn main() -> ExitCode {
    gecko_cli::init_logging();
    let args = Bin2cArgs::parse();
    gecko_cli::exit_code(bin2c::run(&args))
}
