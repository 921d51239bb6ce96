use std::fs;
use std::path::Path;

use gecko_types::{Code, CodeList, ValidationError};
use serde_yaml::Value;

use crate::construct::{self, Bound, CODE_LIST_SCHEMA, CODE_SCHEMA};
use crate::{ParseError, ParseResult};

/// Tag of the document root.
pub const CODE_LIST_TAG: &str = "!CodeList";
/// Tag of each entry of `codes`.
pub const CODE_TAG: &str = "!Code";

const MSG_SINGLE_LINE: &str = "Expected non-empty single line str";

/// Read and parse a code list file. The result is not yet validated.
pub fn load_code_list(path: &Path) -> ParseResult<CodeList> {
    log::info!("Reading code list \"{}\"", path.display());
    let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Parser::new(&source).parse()
}

/// Code list document parser.
pub struct Parser<'src> {
    source: &'src str,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source }
    }

    /// Parse the document into an unvalidated [`CodeList`].
    pub fn parse(self) -> ParseResult<CodeList> {
        let root: Value = serde_yaml::from_str(self.source)?;
        let node = untag(root, CODE_LIST_TAG, "document root")?;
        code_list(node)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Record construction
// ══════════════════════════════════════════════════════════════════════════════

fn code_list(node: Value) -> ParseResult<CodeList> {
    let mut b = construct::bind(&CODE_LIST_SCHEMA, CODE_LIST_TAG, node)?;

    let project = required_string(&mut b, "project", MSG_SINGLE_LINE)?;
    let title = required_string(&mut b, "title", MSG_SINGLE_LINE)?;
    let author = required_string(&mut b, "author", MSG_SINGLE_LINE)?;
    let game = required_string(&mut b, "game", MSG_SINGLE_LINE)?;
    let game_id = required_string(
        &mut b,
        "game_id",
        &format!("{MSG_SINGLE_LINE} of length {}", gecko_types::GAME_ID_LEN),
    )?;

    let codes = match b.take("codes") {
        Some(Value::Sequence(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| code(index, item))
            .collect::<ParseResult<Vec<_>>>()?,
        _ => return Err(ValidationError::new("codes", "Expected type of list[Code]").into()),
    };

    let assemblies = construct::optional_strings("assemblies", b.take("assemblies"))?;
    let global_set = construct::optional_string("global_set", b.take("global_set"))?;

    Ok(CodeList {
        project,
        title,
        author,
        game,
        game_id,
        codes,
        assemblies,
        global_set,
    })
}

fn code(index: usize, node: Value) -> ParseResult<Code> {
    let context = format!("codes[{index}]");
    let node = untag(node, CODE_TAG, &context).map_err(|e| match e {
        ParseError::UnexpectedNode { .. } => {
            ValidationError::new("codes", "Expected type of list[Code]").into()
        }
        other => other,
    })?;
    let mut b = construct::bind(&CODE_SCHEMA, &context, node)?;
    code_fields(&mut b).map_err(|e| requalify(e, index))
}

fn code_fields(b: &mut Bound) -> ParseResult<Code> {
    Ok(Code {
        file: required_string(b, "file", MSG_SINGLE_LINE)?,
        name: required_string(b, "name", MSG_SINGLE_LINE)?,
        author: required_string(b, "author", MSG_SINGLE_LINE)?,
        description: construct::optional_string("description", b.take("description"))?,
    })
}

fn required_string(b: &mut Bound, field: &str, message: &str) -> ParseResult<String> {
    Ok(construct::string(field, b.take(field), message)?)
}

fn requalify(err: ParseError, index: usize) -> ParseError {
    match err {
        ParseError::Validation(e) => ParseError::Validation(e.in_code(index)),
        other => other,
    }
}

/// Strip the expected tag. An untagged mapping is accepted as well.
fn untag(node: Value, tag: &str, context: &str) -> ParseResult<Value> {
    match node {
        Value::Tagged(tagged) => {
            let found = format!("!{}", tagged.tag.to_string().trim_start_matches('!'));
            if found == tag {
                Ok(tagged.value)
            } else {
                Err(ParseError::UnexpectedNode {
                    context: context.to_string(),
                    expected: expected_for(tag),
                    found: format!("a {found} node"),
                })
            }
        }
        mapping @ Value::Mapping(_) => Ok(mapping),
        other => Err(ParseError::UnexpectedNode {
            context: context.to_string(),
            expected: expected_for(tag),
            found: construct::describe(&other),
        }),
    }
}

fn expected_for(tag: &str) -> &'static str {
    if tag == CODE_TAG {
        "a !Code node"
    } else {
        "a !CodeList node"
    }
}
