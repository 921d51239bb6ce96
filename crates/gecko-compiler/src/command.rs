//! Compiler command line assembly.

use std::path::{Path, PathBuf};

use crate::config::BuildConfig;

/// Flags passed on every build.
const ALWAYS_WARNINGS: [&str; 4] = [
    "-Wno-unused-but-set-variable",
    "-Wno-unused-variable",
    "-Werror=vla",
    "-Werror=missing-prototypes",
];

const DEBUG_FLAGS: [&str; 3] = ["-O0", "-g3", "-ggdb"];
const SANITIZER_FLAGS: [&str; 4] = [
    "-fsanitize=address",
    "-fsanitize=undefined",
    "-fno-sanitize-recover",
    "-fstack-protector-strong",
];
const DEBUG_WARNINGS: [&str; 2] = ["-Wall", "-Wno-unused-function"];

/// A fully assembled compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CompileCommand {
    /// Assemble the invocation.
    ///
    /// `include_dirs` and `sources` are passed in the given order.
    pub fn new(
        config: &BuildConfig,
        program: &Path,
        artifact: &Path,
        include_dirs: &[PathBuf],
        sources: &[PathBuf],
    ) -> Self {
        let mut args = vec!["-std=gnu99".to_string(), "-o".to_string(), path_arg(artifact)];

        if config.debug {
            args.extend(DEBUG_FLAGS.map(String::from));
            if config.target.supports_sanitizers() {
                args.extend(SANITIZER_FLAGS.map(String::from));
            }
        } else {
            args.push("-O1".to_string());
        }

        if config.debug {
            args.extend(DEBUG_WARNINGS.map(String::from));
        }
        args.extend(ALWAYS_WARNINGS.map(String::from));

        args.extend(defines(config).into_iter().map(|d| format!("-D{d}")));
        args.extend(include_dirs.iter().map(|dir| format!("-I{}", path_arg(dir))));
        args.extend(sources.iter().map(|src| path_arg(src)));

        Self {
            program: program.to_path_buf(),
            args,
        }
    }

    /// The command as one shell-like line, for the build log.
    pub fn display_line(&self) -> String {
        std::iter::once(path_arg(&self.program))
            .chain(self.args.iter().cloned())
            .map(|arg| quote(&arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Preprocessor definitions, without the `-D` prefix.
pub fn defines(config: &BuildConfig) -> Vec<String> {
    let mut defines = vec![
        format!("__GECKO_H_CODEHANDLERADDR__=0x{:08X}", config.address),
        "__STDEXT_CMACROS_H_DEPDEFS__".to_string(),
    ];
    if config.compat {
        defines.push(format!("__GECKO_H_CODEHANDLERSIZE__={}", config.handler_size));
        defines.push("__GECKO_H_CODEHANDLERSCOMPAT__".to_string());
    }
    if config.debug {
        defines.push("__STDEXT_INCLERRSTRGS__".to_string());
    }
    defines
}

/// Compilers on every target accept forward slashes.
fn path_arg(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn quote(arg: &str) -> String {
    if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}
