//! Workspace directory layout.
//!
//! ```text
//! <root>/
//!   projects/<author>/<project>/codelist.yaml
//!   projects/<author>/<project>/{src,include}/
//!   src/                 shared sources, every *.c is compiled
//!   include/             shared headers
//!   include/__gen__/     generated header pair
//!   bin/<author>/        artifact, log and digest sidecars
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use gecko_codegen::GEN_DIR;

use crate::config::TargetStyle;
use crate::error::{BuildError, BuildResult};

/// File name of a project's code list.
pub const CODE_LIST_FILE: &str = "codelist.yaml";

/// Paths of one project inside a workspace.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    author: String,
    project: String,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>, author: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            author: author.into(),
            project: project.into(),
        }
    }

    pub fn project_dir(&self) -> PathBuf {
        self.root
            .join("projects")
            .join(&self.author)
            .join(&self.project)
    }

    pub fn code_list(&self) -> PathBuf {
        self.project_dir().join(CODE_LIST_FILE)
    }

    pub fn project_src(&self) -> PathBuf {
        self.project_dir().join("src")
    }

    pub fn project_include(&self) -> PathBuf {
        self.project_dir().join("include")
    }

    pub fn shared_src(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn shared_include(&self) -> PathBuf {
        self.root.join("include")
    }

    /// Directory receiving the generated header pair.
    pub fn gen_dir(&self) -> PathBuf {
        self.shared_include().join(GEN_DIR)
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin").join(&self.author)
    }

    /// File name of the compiled artifact.
    pub fn artifact_name(&self, target: TargetStyle) -> String {
        format!("{}{}", self.project, target.executable_suffix())
    }

    pub fn artifact(&self, target: TargetStyle) -> PathBuf {
        self.bin_dir().join(self.artifact_name(target))
    }

    /// `<artifact>.<extension>`, used for the log and digest sidecars.
    pub fn sidecar(&self, target: TargetStyle, extension: &str) -> PathBuf {
        self.bin_dir()
            .join(format!("{}.{extension}", self.artifact_name(target)))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Filesystem checks
// ══════════════════════════════════════════════════════════════════════════════

/// Fail unless `path` is an existing file.
pub fn require_file(path: &Path) -> BuildResult<()> {
    if !path.exists() {
        return Err(BuildError::Missing(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(BuildError::NotAFile(path.to_path_buf()));
    }
    Ok(())
}

/// Fail unless `path` is an existing directory.
pub fn require_dir(path: &Path) -> BuildResult<()> {
    if !path.exists() {
        return Err(BuildError::Missing(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(BuildError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Create `path` (and parents) unless it already is a directory.
pub fn ensure_dir(path: &Path) -> BuildResult<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(BuildError::OccupiedByFile(path.to_path_buf()));
        }
        return Ok(());
    }
    log::info!("Creating \"{}\"", path.display());
    fs::create_dir_all(path).map_err(BuildError::io(path))
}

/// Fail if a file destination is taken by a directory.
pub fn require_writable_file(path: &Path) -> BuildResult<()> {
    if path.exists() && !path.is_file() {
        return Err(BuildError::OccupiedByDirectory(path.to_path_buf()));
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════════
// Tree walking
// ══════════════════════════════════════════════════════════════════════════════

/// Every entry below `root` (not including `root`), sorted by path.
pub fn walk(root: &Path) -> BuildResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk_into(root, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk_into(dir: &Path, found: &mut Vec<PathBuf>) -> BuildResult<()> {
    let entries = fs::read_dir(dir).map_err(BuildError::io(dir))?;
    for entry in entries {
        let entry = entry.map_err(BuildError::io(dir))?;
        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map_err(BuildError::io(&path))?
            .is_dir();
        found.push(path.clone());
        if is_dir {
            walk_into(&path, found)?;
        }
    }
    Ok(())
}

/// `root` followed by every directory below it, sorted.
pub fn include_dirs(root: &Path) -> BuildResult<Vec<PathBuf>> {
    let mut dirs = vec![root.to_path_buf()];
    dirs.extend(walk(root)?.into_iter().filter(|p| p.is_dir()));
    Ok(dirs)
}

/// Every regular `*.c` file below `root`, sorted.
pub fn c_sources(root: &Path) -> BuildResult<Vec<PathBuf>> {
    Ok(walk(root)?
        .into_iter()
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "c"))
        .collect())
}
