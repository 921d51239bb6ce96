//! Binary payload to C array embedding.
//!
//! A payload is streamed in 64 KiB chunks and written as a
//! `const uintN_t <name>_data[]` array, with each word packed big-endian in
//! file order. `<name>_length` holds the element count and `<name>_size` the
//! exact byte count. When a trailing partial word remains it is kept,
//! zero-padded in its low-order bytes, so truncating the decoded words to
//! `<name>_size` bytes reproduces the payload.
//!
//! A paired header declaring the three symbols is produced only when both
//! include directories are supplied.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::{CodegenError, CodegenResult};

/// Size of each payload read.
pub const CHUNK_SIZE: usize = 64 * 1024;

const GENERATED_MARKER: &str = "// Generated by bin2c, do not modify.";
const BYTES_PER_LINE: usize = 16;
const INDENT: &str = "    ";

/// Characters replaced by `_` when deriving the symbol name.
const NAME_REPLACED: &[char] = &[':', ' ', '\\', '/', '"', '\'', '.', '%', '-'];

/// Element width of the generated array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordWidth {
    U8,
    U16,
    U32,
}

impl WordWidth {
    /// Width in bytes.
    pub fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }

    pub fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// C element type.
    pub fn c_type(self) -> &'static str {
        match self {
            Self::U8 => "uint8_t",
            Self::U16 => "uint16_t",
            Self::U32 => "uint32_t",
        }
    }

    /// Largest payload whose element count still fits in a `uint32_t`.
    pub fn max_payload(self) -> u64 {
        u64::from(u32::MAX) / self.bytes() as u64
    }

    /// [`Self::max_payload`] rounded to GiB, for messages.
    pub fn max_gib(self) -> u32 {
        4 / self.bytes() as u32
    }
}

impl TryFrom<u8> for WordWidth {
    type Error = CodegenError;

    fn try_from(bytes: u8) -> Result<Self, Self::Error> {
        match bytes {
            1 => Ok(Self::U8),
            2 => Ok(Self::U16),
            4 => Ok(Self::U32),
            other => Err(CodegenError::InvalidWordWidth(other)),
        }
    }
}

/// Include directories for the optional header.
#[derive(Debug, Clone)]
pub struct IncludeDirs {
    /// Root passed to the compiler with `-I`.
    pub base: PathBuf,
    /// Directory that receives the header. Must lie under `base`.
    pub dir: PathBuf,
}

/// One embedding request.
#[derive(Debug, Clone)]
pub struct Bin2C {
    pub payload: PathBuf,
    pub width: WordWidth,
    pub src_dir: PathBuf,
    pub include: Option<IncludeDirs>,
}

/// Result of a successful embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embedded {
    /// Sanitised symbol prefix.
    pub symbol: String,
    pub source: PathBuf,
    pub header: Option<PathBuf>,
    /// Number of array elements.
    pub length: u32,
    /// Payload size in bytes.
    pub size: u64,
}

impl Bin2C {
    pub fn new(payload: impl Into<PathBuf>, width: WordWidth, src_dir: impl Into<PathBuf>) -> Self {
        Self {
            payload: payload.into(),
            width,
            src_dir: src_dir.into(),
            include: None,
        }
    }

    /// Also generate a header in `dir`, included relative to `base`.
    pub fn with_header(mut self, base: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        self.include = Some(IncludeDirs {
            base: base.into(),
            dir: dir.into(),
        });
        self
    }

    /// Write the generated source (and header, if requested).
    pub fn embed(&self) -> CodegenResult<Embedded> {
        require_dir(&self.src_dir)?;
        if let Some(include) = &self.include {
            require_dir(&include.base)?;
            require_dir(&include.dir)?;
        }

        let size = fs::metadata(&self.payload)
            .map_err(CodegenError::io(&self.payload))?
            .len();
        check_payload_size(&self.payload, size, self.width)?;

        let file_name = self
            .payload
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let symbol = sanitize_name(&file_name);

        let source = self.src_dir.join(format!("{symbol}.c"));
        check_output(&source)?;

        let (header, include_line) = match &self.include {
            Some(include) => {
                let header = include.dir.join(format!("{symbol}.h"));
                check_output(&header)?;
                let line = format!("#include <{}>", include_path(include, &symbol)?);
                (Some(header), line)
            }
            None => (None, "#include <stdint.h>".to_string()),
        };

        log::info!(
            "Embedding \"{}\" ({size} bytes) as {}-bit words",
            self.payload.display(),
            self.width.bits()
        );

        log::info!("Generating \"{}\"", source.display());
        let (length, size) = self
            .write_source(&source, &symbol, &include_line)
            .inspect_err(|_| discard(&source))?;

        if let Some(header) = &header {
            log::info!("Generating \"{}\"", header.display());
            fs::write(header, render_header(&symbol, self.width))
                .map_err(CodegenError::io(header))
                .inspect_err(|_| {
                    discard(header);
                    discard(&source);
                })?;
        }

        Ok(Embedded {
            symbol,
            source,
            header,
            length,
            size,
        })
    }

    fn write_source(&self, path: &Path, symbol: &str, include_line: &str) -> CodegenResult<(u32, u64)> {
        let file = File::create(path).map_err(CodegenError::io(path))?;
        let mut out = BufWriter::new(file);
        let mut payload = File::open(&self.payload).map_err(CodegenError::io(&self.payload))?;

        let width = self.width;
        let mut prologue = String::new();
        let _ = writeln!(prologue, "{GENERATED_MARKER}\n");
        let _ = writeln!(prologue, "{include_line}\n");
        let _ = writeln!(prologue, "const {} {symbol}_data[] = {{", width.c_type());
        out.write_all(prologue.as_bytes())
            .map_err(CodegenError::io(path))?;

        let words_per_line = BYTES_PER_LINE / width.bytes();
        let mut encoder = WordEncoder::new(width, words_per_line);
        let mut size: u64 = 0;
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            let n = read_full(&mut payload, &mut buf).map_err(CodegenError::io(&self.payload))?;
            if n == 0 {
                break;
            }
            size += n as u64;
            check_payload_size(&self.payload, size, width)?;

            let text = encoder.encode(&buf[..n]);
            out.write_all(text.as_bytes()).map_err(CodegenError::io(path))?;
            if n < buf.len() {
                break;
            }
        }

        let mut epilogue = encoder.finish();
        let length = word_count(size, width);
        let _ = writeln!(epilogue, "}};");
        let _ = writeln!(epilogue, "const uint32_t {symbol}_length = {length};");
        let _ = writeln!(epilogue, "const uint32_t {symbol}_size = {size};");
        out.write_all(epilogue.as_bytes())
            .map_err(CodegenError::io(path))?;
        out.flush().map_err(CodegenError::io(path))?;

        // `check_payload_size` bounds both values to u32.
        Ok((u32::try_from(length).unwrap_or(u32::MAX), size))
    }
}

/// Remove a partially written output.
fn discard(path: &Path) {
    if path.is_file() {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("Failed to remove \"{}\": {e}", path.display());
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Pure helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Replace each of `: \ / " ' . % -` and space with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if NAME_REPLACED.contains(&c) { '_' } else { c })
        .collect()
}

/// Fail when `size` bytes would need more than `u32::MAX` elements.
pub fn check_payload_size(path: &Path, size: u64, width: WordWidth) -> CodegenResult<()> {
    if size > width.max_payload() {
        return Err(CodegenError::PayloadTooLarge {
            path: path.to_path_buf(),
            size,
            width_bits: width.bits(),
            max_gib: width.max_gib(),
        });
    }
    Ok(())
}

/// Number of elements for a payload of `size` bytes, counting a partial word.
pub fn word_count(size: u64, width: WordWidth) -> u64 {
    size.div_ceil(width.bytes() as u64)
}

/// Render the declaration header.
pub fn render_header(symbol: &str, width: WordWidth) -> String {
    let guard = format!("__{}_H__", symbol.to_uppercase());
    format!(
        "{GENERATED_MARKER}\n\n\
         #ifndef {guard}\n\
         #define {guard}\n\
         #include <stdint.h>\n\n\
         extern const {ty} {symbol}_data[];\n\
         extern const uint32_t {symbol}_length;\n\
         extern const uint32_t {symbol}_size;\n\
         #endif\n",
        ty = width.c_type(),
    )
}

/// Formats words and breaks lines every `words_per_line` elements.
struct WordEncoder {
    width: WordWidth,
    words_per_line: usize,
    column: usize,
    written: usize,
}

impl WordEncoder {
    fn new(width: WordWidth, words_per_line: usize) -> Self {
        Self {
            width,
            words_per_line,
            column: 0,
            written: 0,
        }
    }

    fn encode(&mut self, bytes: &[u8]) -> String {
        let digits = self.width.bytes() * 2;
        let mut text = String::with_capacity(bytes.len() * 4);
        for group in bytes.chunks(self.width.bytes()) {
            // Short final group: payload bytes keep their high-order positions.
            let word = (0..self.width.bytes()).fold(0u32, |acc, i| {
                (acc << 8) | u32::from(group.get(i).copied().unwrap_or(0))
            });
            if self.column == 0 {
                text.push_str(INDENT);
            } else {
                text.push(' ');
            }
            let _ = write!(text, "0x{word:0digits$x},");
            self.column += 1;
            self.written += 1;
            if self.column == self.words_per_line {
                text.push('\n');
                self.column = 0;
            }
        }
        text
    }

    fn finish(self) -> String {
        if self.written == 0 {
            format!("{INDENT}0\n")
        } else if self.column != 0 {
            "\n".to_string()
        } else {
            String::new()
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Filesystem helpers
// ══════════════════════════════════════════════════════════════════════════════

fn require_dir(path: &Path) -> CodegenResult<()> {
    if !path.exists() {
        return Err(CodegenError::MissingDirectory(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(CodegenError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

fn check_output(path: &Path) -> CodegenResult<()> {
    if path.is_dir() {
        return Err(CodegenError::OccupiedByDirectory(path.to_path_buf()));
    }
    Ok(())
}

/// `/`-joined path of the header relative to the base include directory.
fn include_path(include: &IncludeDirs, symbol: &str) -> CodegenResult<String> {
    let base = include
        .base
        .canonicalize()
        .map_err(CodegenError::io(&include.base))?;
    let dir = include
        .dir
        .canonicalize()
        .map_err(CodegenError::io(&include.dir))?;
    let relative = dir
        .strip_prefix(&base)
        .map_err(|_| CodegenError::IncludeOutsideBase {
            dir: dir.clone(),
            base: base.clone(),
        })?;

    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.push(format!("{symbol}.h"));
    Ok(parts.join("/"))
}

/// Fill `buf` unless the reader reaches end of file first.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_from_bytes() {
        assert_eq!(WordWidth::try_from(2).unwrap(), WordWidth::U16);
        assert!(matches!(
            WordWidth::try_from(3),
            Err(CodegenError::InvalidWordWidth(3))
        ));
    }

    #[test]
    fn test_max_gib() {
        assert_eq!(WordWidth::U8.max_gib(), 4);
        assert_eq!(WordWidth::U16.max_gib(), 2);
        assert_eq!(WordWidth::U32.max_gib(), 1);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("my-file v1.0.bin"), "my_file_v1_0_bin");
        assert_eq!(sanitize_name("a:b\\c\"d'e%f"), "a_b_c_d_e_f");
    }

    #[test]
    fn test_word_count_counts_partial_word() {
        assert_eq!(word_count(0, WordWidth::U32), 0);
        assert_eq!(word_count(4, WordWidth::U32), 1);
        assert_eq!(word_count(5, WordWidth::U32), 2);
        assert_eq!(word_count(3, WordWidth::U16), 2);
    }

    #[test]
    fn test_size_limit_boundary() {
        let path = Path::new("payload.bin");
        for width in [WordWidth::U8, WordWidth::U16, WordWidth::U32] {
            let max = width.max_payload();
            assert!(check_payload_size(path, max, width).is_ok());
            let err = check_payload_size(path, max + 1, width).unwrap_err();
            let message = err.to_string();
            assert!(message.contains(&format!("max {} GiB", width.max_gib())), "{message}");
        }
    }

    #[test]
    fn test_encoder_pads_partial_word() {
        let mut encoder = WordEncoder::new(WordWidth::U32, 4);
        let text = encoder.encode(&[0xde, 0xad, 0xbe, 0xef, 0x01, 0x02]);
        assert_eq!(text, "    0xdeadbeef, 0x01020000,");
        assert_eq!(encoder.finish(), "\n");
    }

    #[test]
    fn test_encoder_breaks_lines() {
        let mut encoder = WordEncoder::new(WordWidth::U16, 2);
        let text = encoder.encode(&[0, 1, 2, 3, 4, 5]);
        assert_eq!(text, "    0x0001, 0x0203,\n    0x0405,");
    }

    #[test]
    fn test_header_text() {
        let header = render_header("logo_bin", WordWidth::U16);
        assert!(header.contains("#ifndef __LOGO_BIN_H__\n#define __LOGO_BIN_H__\n"));
        assert!(header.contains("extern const uint16_t logo_bin_data[];\n"));
        assert!(header.contains("extern const uint32_t logo_bin_length;\n"));
        assert!(header.contains("extern const uint32_t logo_bin_size;\n"));
    }
}
