//! Code list records and their validation.
//!
//! A [`CodeList`] is loaded once, validated immediately and then only read.
//! Validation trims every string in place and otherwise never alters data:
//! anything malformed is rejected with a field-tagged [`ValidationError`].

use serde::{Deserialize, Serialize};

use crate::{Result, ValidationError};

/// Value substituted for an absent `global_set`.
pub const DEFAULT_GLOBAL_SET: &str = "none";

/// Required length of `game_id` in characters.
pub const GAME_ID_LEN: usize = 6;

/// Characters rejected in every single-line scalar field.
const FORBIDDEN: &[char] = &[':', '\\', '/', '"', '\'', '.', '%'];
/// Characters rejected in a description.
const FORBIDDEN_DESCRIPTION: &[char] = &['\\', '"', '\'', '%'];
/// Characters rejected in an assembly identifier.
const FORBIDDEN_ASSEMBLY: &[char] = &[':', ' ', '\\', '/', '"', '\'', '.', '%', '-'];

const MSG_SINGLE_LINE: &str = "Expected non-empty single line str";
const MSG_FORBIDDEN: &str = "Invalid characters: :, \\, /, \", ', ., and/or %";
const MSG_FORBIDDEN_DESCRIPTION: &str = "Invalid characters: \\, \", ', and/or %";
const MSG_FORBIDDEN_ASSEMBLY: &str = "Invalid characters: :,  , \\, /, \", ', ., %, and/or -";

// ══════════════════════════════════════════════════════════════════════════════
// Code
// ══════════════════════════════════════════════════════════════════════════════

/// One patch entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    /// Base name of the code's `<file>.c` source; also its function name.
    pub file: String,
    pub name: String,
    pub author: String,
    /// Free text, one output line per line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Code {
    /// Create a code without a description.
    pub fn new(file: impl Into<String>, name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
            author: author.into(),
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Trim every field and check its shape.
    pub fn validate(&mut self) -> Result<()> {
        trim_in_place(&mut self.file);
        trim_in_place(&mut self.name);
        trim_in_place(&mut self.author);
        if let Some(description) = &mut self.description {
            trim_in_place(description);
            normalize_line_breaks(description);
        }

        check_line("file", &self.file)?;
        check_line("name", &self.name)?;
        check_line("author", &self.author)?;
        if let Some(description) = &self.description {
            if description.contains(FORBIDDEN_DESCRIPTION) {
                return Err(ValidationError::new("description", MSG_FORBIDDEN_DESCRIPTION));
            }
        }
        Ok(())
    }

    /// Description lines, each trimmed. Empty when there is no description.
    pub fn description_lines(&self) -> impl Iterator<Item = &str> {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .into_iter()
            .flat_map(str::lines)
            .map(str::trim)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// CodeList
// ══════════════════════════════════════════════════════════════════════════════

/// One project's manifest. `codes` order is the emission and dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeList {
    pub project: String,
    pub title: String,
    pub author: String,
    /// Display name of the game.
    pub game: String,
    pub game_id: String,
    pub codes: Vec<Code>,
    /// Reserved; not used by generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assemblies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_set: Option<String>,
}

impl CodeList {
    /// Create an empty code list.
    pub fn new(
        project: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        game: impl Into<String>,
        game_id: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            title: title.into(),
            author: author.into(),
            game: game.into(),
            game_id: game_id.into(),
            codes: Vec::new(),
            assemblies: None,
            global_set: None,
        }
    }

    /// Append a code.
    pub fn with_code(mut self, code: Code) -> Self {
        self.codes.push(code);
        self
    }

    /// Validate the whole list. The first violation aborts; a list that
    /// failed validation must not be used.
    pub fn validate(&mut self) -> Result<()> {
        trim_in_place(&mut self.project);
        trim_in_place(&mut self.title);
        trim_in_place(&mut self.author);
        trim_in_place(&mut self.game);
        trim_in_place(&mut self.game_id);
        let global_set = self
            .global_set
            .get_or_insert_with(|| DEFAULT_GLOBAL_SET.to_string());
        trim_in_place(global_set);
        if let Some(assemblies) = &mut self.assemblies {
            assemblies.iter_mut().for_each(trim_in_place);
        }

        check_line("project", &self.project)?;
        check_line("title", &self.title)?;
        check_line("author", &self.author)?;
        check_line("game", &self.game)?;

        if self.game_id.chars().count() != GAME_ID_LEN || is_multiline(&self.game_id) {
            return Err(ValidationError::new(
                "game_id",
                format!("{MSG_SINGLE_LINE} of length {GAME_ID_LEN}"),
            ));
        }
        if self.game_id.contains(FORBIDDEN) {
            return Err(ValidationError::new("game_id", MSG_FORBIDDEN));
        }

        if let Some(assemblies) = &self.assemblies {
            if assemblies.iter().any(|a| a.contains(FORBIDDEN_ASSEMBLY)) {
                return Err(ValidationError::new("assemblies", MSG_FORBIDDEN_ASSEMBLY));
            }
        }

        check_line("global_set", self.global_set())?;

        for (index, code) in self.codes.iter_mut().enumerate() {
            code.validate().map_err(|e| e.in_code(index))?;
        }
        Ok(())
    }

    /// The global set, or [`DEFAULT_GLOBAL_SET`] before validation fills it in.
    pub fn global_set(&self) -> &str {
        self.global_set.as_deref().unwrap_or(DEFAULT_GLOBAL_SET)
    }

    /// Check the manifest against the author and project the caller asked for.
    pub fn check_origin(&self, author: &str, project: &str) -> Result<()> {
        if self.author != author {
            return Err(ValidationError::new(
                "author",
                format!(
                    "Code list author \"{}\" does not match the provided author \"{author}\"",
                    self.author
                ),
            ));
        }
        if self.project != project {
            return Err(ValidationError::new(
                "project",
                format!(
                    "Code list project \"{}\" does not match the provided project \"{project}\"",
                    self.project
                ),
            ));
        }
        Ok(())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Rewrite `\r\n` and lone `\r` as `\n`.
fn normalize_line_breaks(value: &mut String) {
    if value.contains('\r') {
        *value = value.replace("\r\n", "\n").replace('\r', "\n");
    }
}

fn is_multiline(value: &str) -> bool {
    value.contains(['\n', '\r'])
}

fn check_line(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || is_multiline(value) {
        Err(ValidationError::new(field, MSG_SINGLE_LINE))
    } else if value.contains(FORBIDDEN) {
        Err(ValidationError::new(field, MSG_FORBIDDEN))
    } else {
        Ok(())
    }
}
