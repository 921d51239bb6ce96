//! Header pair generation.
//!
//! A validated [`CodeList`] becomes two headers:
//! 1. **Declarations unit** (`standard_defs.h`): one `void <file>(void);`
//!    prototype per code. Every code's source file includes it and defines
//!    the matching function.
//! 2. **Dispatch unit** (`standard.h`): the `CLFFmt` output format enum and
//!    `printclf`, which prints the banner for the selected format and then,
//!    per code in manifest order, its header line, its description and the
//!    call to its function.
//!
//! Output is a pure function of the input: codes are never sorted or
//! deduplicated, and the same list always yields the same bytes.

use std::fs;
use std::path::{Path, PathBuf};

use gecko_types::{Code, CodeList, OutputFormat};

use crate::error::{CodegenError, CodegenResult};
use crate::license::MIT_LICENSE;

/// Directory (under the shared include root) that receives the headers.
pub const GEN_DIR: &str = "__gen__";
/// File name of the declarations unit.
pub const DECLARATIONS_FILE: &str = "standard_defs.h";
/// File name of the dispatch unit.
pub const DISPATCH_FILE: &str = "standard.h";

const GENERATED_MARKER: &str = "// Generated code output file from gecko-compile, do not modify.";
const INDENT: &str = "    ";

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// The generated header pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedHeaders {
    /// Contents of `standard_defs.h`.
    pub declarations: String,
    /// Contents of `standard.h`.
    pub dispatch: String,
}

impl GeneratedHeaders {
    /// Generate both units for `list`.
    pub fn generate(list: &CodeList) -> Self {
        Self {
            declarations: render_declarations(list),
            dispatch: render_dispatch(list),
        }
    }

    /// Write both units into `dir`, which must already exist.
    ///
    /// Returns the paths of the declarations and dispatch units.
    pub fn write_to(&self, dir: &Path) -> CodegenResult<(PathBuf, PathBuf)> {
        if !dir.exists() {
            return Err(CodegenError::MissingDirectory(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(CodegenError::NotADirectory(dir.to_path_buf()));
        }

        let dispatch = dir.join(DISPATCH_FILE);
        write_file(&dispatch, &self.dispatch)?;
        let declarations = dir.join(DECLARATIONS_FILE);
        write_file(&declarations, &self.declarations)?;
        Ok((declarations, dispatch))
    }
}

/// Render the declarations unit.
pub fn render_declarations(list: &CodeList) -> String {
    let mut out = String::with_capacity(2048);

    out.push_str(MIT_LICENSE);
    out.push_str("\n\n");
    out.push_str(GENERATED_MARKER);
    out.push_str("\n\n#ifndef __GEN_STANDARD_DEFS_H__\n#define __GEN_STANDARD_DEFS_H__\n");
    out.push_str("#include <stdio.h>\n#include <stdint.h>\n#include <gecko.h>\n\n");

    for code in &list.codes {
        out.push_str(&format!("void {}(void);\n", code.file));
    }

    out.push_str("#endif\n");
    out
}

/// Render the dispatch unit.
pub fn render_dispatch(list: &CodeList) -> String {
    let mut out = String::with_capacity(4096);

    out.push_str(MIT_LICENSE);
    out.push_str("\n\n");
    out.push_str(GENERATED_MARKER);
    out.push_str("\n\n#ifndef __GEN_STANDARD_H__\n#define __GEN_STANDARD_H__\n");
    out.push_str(&format!("#include <{GEN_DIR}/{DECLARATIONS_FILE}>\n"));
    out.push_str("#include <stdext/cmacros.h>\n\n");

    out.push_str("#define __STANDARD_USAGE_INTRO__ \\\n");
    out.push_str(&format!(
        "{INDENT}\"{} by {}\\n\" \\\n{INDENT}\"USAGE: {}\"\n\n",
        list.title, list.author, list.project
    ));

    emit_format_enum(&mut out);

    out.push_str("INLINE void printclf(CLFFmt lfmt) {\n");

    let banners: Vec<_> = branches(|format| banner(list, format));
    emit_chain(&mut out, &banners);

    for code in &list.codes {
        out.push('\n');
        emit_chain(&mut out, &branches(|format| code_header(code, format)));
        emit_chain(&mut out, &branches(|format| code_description(code, format)));
        out.push_str(&format!("{INDENT}{}();\n", code.file));
    }

    let footers: Vec<_> = branches(footer);
    if !footers.is_empty() {
        out.push('\n');
        emit_chain(&mut out, &footers);
    }

    out.push_str("}\n#endif\n");
    out
}

// ══════════════════════════════════════════════════════════════════════════════
// Per-format emission
// ══════════════════════════════════════════════════════════════════════════════

/// Statement lines printed once, before any code.
fn banner(list: &CodeList, format: OutputFormat) -> Option<Vec<String>> {
    match format {
        OutputFormat::Dolphin => Some(vec![format!(
            "fprintf(G_OutputHandle, \"; {} by {}\\n[Gecko]\\n\");",
            list.title, list.author
        )]),
        OutputFormat::Gct => Some(vec!["G_BeginGCT();".to_string()]),
        OutputFormat::Ocarina => Some(vec![
            "fprintf(G_OutputHandle,".to_string(),
            format!("{INDENT}\"{}\\n{}\\n\\n\"", list.game_id, list.game),
            format!("{INDENT}\"{} by {}\\n\\n\"", list.title, list.author),
            ");".to_string(),
        ]),
        OutputFormat::Raw | OutputFormat::RawText | OutputFormat::None => None,
    }
}

/// Header line naming a code and its author.
fn code_header(code: &Code, format: OutputFormat) -> Option<Vec<String>> {
    match format {
        OutputFormat::Dolphin => Some(vec![format!(
            "fprintf(G_OutputHandle, \"${} [{}]\\n\");",
            code.name, code.author
        )]),
        OutputFormat::Ocarina => Some(vec![format!(
            "fprintf(G_OutputHandle, \"{} [{}]\\n\");",
            code.name, code.author
        )]),
        OutputFormat::Gct | OutputFormat::Raw | OutputFormat::RawText | OutputFormat::None => None,
    }
}

/// Description, one string literal per line.
fn code_description(code: &Code, format: OutputFormat) -> Option<Vec<String>> {
    let (prefix, trailer) = match format {
        OutputFormat::Dolphin => ("*", None),
        OutputFormat::Ocarina => ("", Some("\"\\n\"")),
        OutputFormat::Gct | OutputFormat::Raw | OutputFormat::RawText | OutputFormat::None => {
            return None
        }
    };

    let mut literals: Vec<String> = code
        .description_lines()
        .map(|line| format!("\"{prefix}{line}\\n\""))
        .collect();
    if literals.is_empty() {
        return None;
    }
    literals.extend(trailer.map(str::to_string));

    let mut lines = Vec::with_capacity(literals.len() + 2);
    lines.push("fprintf(G_OutputHandle, (".to_string());
    lines.extend(literals.into_iter().map(|l| format!("{INDENT}{l}")));
    lines.push("));".to_string());
    Some(lines)
}

/// Statement lines printed once, after every code.
fn footer(format: OutputFormat) -> Option<Vec<String>> {
    match format {
        OutputFormat::Gct => Some(vec!["G_EndGCT();".to_string()]),
        OutputFormat::Dolphin
        | OutputFormat::Ocarina
        | OutputFormat::Raw
        | OutputFormat::RawText
        | OutputFormat::None => None,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// C emission helpers
// ══════════════════════════════════════════════════════════════════════════════

fn emit_format_enum(out: &mut String) {
    out.push_str("typedef enum __CLFFmt {\n");
    let last = OutputFormat::ALL.len() - 1;
    for (i, format) in OutputFormat::ALL.into_iter().enumerate() {
        out.push_str(INDENT);
        out.push_str(format.c_name());
        if let Some(value) = format.c_value() {
            out.push_str(&format!(" = 0x{value:02X}"));
        }
        if i != last {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("} CLFFmt;\n\n");
}

/// Collect the formats that emit something, in enum order.
fn branches(
    mut body: impl FnMut(OutputFormat) -> Option<Vec<String>>,
) -> Vec<(OutputFormat, Vec<String>)> {
    OutputFormat::ALL
        .into_iter()
        .filter_map(|format| body(format).map(|lines| (format, lines)))
        .collect()
}

/// Emit an `if / else if` chain selecting on `lfmt`.
///
/// Single-statement bodies are emitted without braces.
fn emit_chain(out: &mut String, branches: &[(OutputFormat, Vec<String>)]) {
    let braced = branches.iter().any(|(_, lines)| lines.len() > 1);

    for (i, (format, lines)) in branches.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "else if" };
        if braced {
            if i == 0 {
                out.push_str(INDENT);
            } else {
                out.push(' ');
            }
            out.push_str(&format!("{keyword} (lfmt == {}) {{\n", format.c_name()));
            for line in lines {
                out.push_str(&format!("{INDENT}{INDENT}{line}\n"));
            }
            out.push_str(&format!("{INDENT}}}"));
        } else {
            out.push_str(&format!("{INDENT}{keyword} (lfmt == {})\n", format.c_name()));
            for line in lines {
                out.push_str(&format!("{INDENT}{INDENT}{line}\n"));
            }
        }
    }
    if braced && !branches.is_empty() {
        out.push('\n');
    }
}

fn write_file(path: &Path, contents: &str) -> CodegenResult<()> {
    if path.is_dir() {
        return Err(CodegenError::OccupiedByDirectory(path.to_path_buf()));
    }
    log::info!("Generating \"{}\"", path.display());
    fs::write(path, contents).map_err(CodegenError::io(path))
}
