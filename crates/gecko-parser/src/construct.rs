//! Tagged-constructor binding.
//!
//! A tagged node is bound to a record's fields according to its shape:
//! a sequence supplies fields positionally, a mapping by name, and a bare
//! scalar supplies the first field only.

use gecko_types::ValidationError;
use serde_yaml::Value;

use crate::{ParseError, ParseResult};

/// Field layout of a record kind.
pub(crate) struct Schema {
    /// Field names in positional order.
    pub fields: &'static [&'static str],
    /// The leading `required` fields must be supplied.
    pub required: usize,
}

pub(crate) const CODE_LIST_SCHEMA: Schema = Schema {
    fields: &[
        "project",
        "title",
        "author",
        "game",
        "game_id",
        "codes",
        "assemblies",
        "global_set",
    ],
    required: 6,
};

pub(crate) const CODE_SCHEMA: Schema = Schema {
    fields: &["file", "name", "author", "description"],
    required: 3,
};

/// Field values bound from one node, indexed like [`Schema::fields`].
pub(crate) struct Bound {
    slots: Vec<Option<Value>>,
    fields: &'static [&'static str],
}

impl Bound {
    /// Take a field's value. Required fields are always present.
    pub fn take(&mut self, field: &str) -> Option<Value> {
        let index = self.fields.iter().position(|f| *f == field)?;
        self.slots[index].take()
    }
}

/// Bind `node` to the fields of `schema`.
pub(crate) fn bind(schema: &Schema, record: &str, node: Value) -> ParseResult<Bound> {
    let mut slots: Vec<Option<Value>> = vec![None; schema.fields.len()];

    match node {
        Value::Sequence(items) => {
            if items.len() > schema.fields.len() {
                return Err(ParseError::TooManyValues {
                    record: record.to_string(),
                    expected: schema.fields.len(),
                    found: items.len(),
                });
            }
            for (slot, item) in slots.iter_mut().zip(items) {
                *slot = Some(item);
            }
        }
        Value::Mapping(map) => {
            for (key, value) in map {
                let key = match key {
                    Value::String(key) => key,
                    other => {
                        return Err(ParseError::UnexpectedNode {
                            context: record.to_string(),
                            expected: "a string key",
                            found: describe(&other),
                        })
                    }
                };
                let index = schema
                    .fields
                    .iter()
                    .position(|f| *f == key)
                    .ok_or_else(|| ParseError::UnknownField {
                        record: record.to_string(),
                        field: key.clone(),
                    })?;
                slots[index] = Some(value);
            }
        }
        Value::Null => {}
        tagged @ Value::Tagged(_) => {
            return Err(ParseError::UnexpectedNode {
                context: record.to_string(),
                expected: "a mapping, sequence or scalar",
                found: describe(&tagged),
            })
        }
        scalar => slots[0] = Some(scalar),
    }

    for (slot, &field) in slots.iter().zip(schema.fields).take(schema.required) {
        if slot.is_none() {
            return Err(ParseError::MissingField {
                record: record.to_string(),
                field,
            });
        }
    }

    Ok(Bound {
        slots,
        fields: schema.fields,
    })
}

/// Require a string value.
pub(crate) fn string(field: &str, value: Option<Value>, message: &str) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        _ => Err(ValidationError::new(field, message)),
    }
}

/// Accept a string or nothing.
pub(crate) fn optional_string(field: &str, value: Option<Value>) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ValidationError::new(field, "Expected type of str or None")),
    }
}

/// Accept a sequence of strings or nothing.
pub(crate) fn optional_strings(field: &str, value: Option<Value>) -> Result<Option<Vec<String>>, ValidationError> {
    let invalid = || ValidationError::new(field, "Expected type of list[str] or None");
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(invalid()),
    }
}

/// Short description of a node for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Sequence(_) => "a sequence".to_string(),
        Value::Mapping(_) => "a mapping".to_string(),
        Value::Tagged(tagged) => format!("a {} node", tagged.tag),
    }
}
