//! Command line front ends.
//!
//! - `gecko-compile <author> <project>` builds one project ([`compile`])
//! - `gecko-bin2c <payload>` embeds a binary payload ([`bin2c`])

pub mod bin2c;
pub mod compile;

use std::process::ExitCode;

/// Install the logger. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Parse an integer written in decimal or with a `0x`, `0o` or `0b` prefix.
pub fn parse_int(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let lower = s.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };
    u32::from_str_radix(digits, radix).map_err(|e| format!("invalid integer \"{s}\": {e}"))
}

/// Map a command result to the process exit code, logging any error.
pub fn exit_code<T, E: std::fmt::Display>(result: Result<T, E>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
