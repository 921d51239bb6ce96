//! Source file resolution.
//!
//! Each code's `file` must name exactly one `<file>.c` somewhere under the
//! project source tree. Zero or several matches are fatal; the first match
//! is never picked silently.

use std::path::{Path, PathBuf};

use gecko_types::CodeList;

use crate::error::{BuildError, BuildResult};
use crate::layout;

/// Resolve every code of `list`, in manifest order.
pub fn resolve_sources(list: &CodeList, src_dir: &Path) -> BuildResult<Vec<PathBuf>> {
    let tree = layout::walk(src_dir)?;
    list.codes
        .iter()
        .map(|code| {
            log::info!("Code list specified source file name: \"{}\"", code.file);
            let found = resolve_in(&tree, &code.file, src_dir)?;
            log::info!("Found source file for code list: \"{}\"", found.display());
            Ok(found)
        })
        .collect()
}

/// Resolve one `<file>.c` under `src_dir`.
pub fn resolve_source(file: &str, src_dir: &Path) -> BuildResult<PathBuf> {
    resolve_in(&layout::walk(src_dir)?, file, src_dir)
}

fn resolve_in(tree: &[PathBuf], file: &str, src_dir: &Path) -> BuildResult<PathBuf> {
    let wanted = format!("{file}.c");
    let mut matches = tree
        .iter()
        .filter(|path| path.file_name().is_some_and(|name| name == wanted.as_str()));

    let first = matches.next().ok_or_else(|| BuildError::SourceNotFound {
        file: file.to_string(),
        dir: src_dir.to_path_buf(),
    })?;
    if let Some(second) = matches.next() {
        return Err(BuildError::DuplicateSource {
            file: file.to_string(),
            first: first.clone(),
            second: second.clone(),
        });
    }
    if !first.is_file() {
        return Err(BuildError::NotAFile(first.clone()));
    }
    Ok(first.clone())
}
