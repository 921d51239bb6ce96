//! `gecko-bin2c`: embed a binary payload as a C array.

use std::path::PathBuf;

use clap::Parser;
use gecko_codegen::{Bin2C, CodegenError, Embedded, WordWidth};

/// Encodes a binary file as a `const uintN_t <name>_data[]` C array.
#[derive(Parser, Debug)]
#[command(name = "gecko-bin2c", version)]
pub struct Bin2cArgs {
    /// Binary payload to embed.
    pub payload: PathBuf,

    /// Array element width in bytes (1, 2 or 4).
    #[arg(short, long, value_parser = parse_width, default_value = "1")]
    pub width: WordWidth,

    /// Directory receiving `<name>.c`.
    #[arg(long, value_name = "DIR")]
    pub src_dir: PathBuf,

    /// Include root the generated header is included relative to.
    #[arg(long, value_name = "DIR", requires = "include_dir")]
    pub base_include_dir: Option<PathBuf>,

    /// Directory receiving `<name>.h`. Must lie under --base-include-dir.
    #[arg(long, value_name = "DIR", requires = "base_include_dir")]
    pub include_dir: Option<PathBuf>,
}

impl Bin2cArgs {
    pub fn request(&self) -> Bin2C {
        let request = Bin2C::new(&self.payload, self.width, &self.src_dir);
        match (&self.base_include_dir, &self.include_dir) {
            (Some(base), Some(dir)) => request.with_header(base, dir),
            _ => request,
        }
    }
}

fn parse_width(s: &str) -> Result<WordWidth, String> {
    let bytes: u8 = s.parse().map_err(|e| format!("invalid width \"{s}\": {e}"))?;
    WordWidth::try_from(bytes).map_err(|e| e.to_string())
}

pub fn run(args: &Bin2cArgs) -> Result<Embedded, CodegenError> {
    let embedded = args.request().embed()?;
    log::info!(
        "Wrote {} elements for {} bytes as \"{}_data\"",
        embedded.length,
        embedded.size,
        embedded.symbol
    );
    Ok(embedded)
}
