//! gecko code list loader: converts a YAML document into [`CodeList`] records.
//!
//! Loading is two-phase. The document is first read into a loosely typed
//! [`serde_yaml::Value`] tree, then the `!CodeList` and `!Code` tagged
//! nodes are bound to strongly typed records. Validation is a separate,
//! explicit step ([`CodeList::validate`]).
//!
//! [`CodeList`]: gecko_types::CodeList
//! [`CodeList::validate`]: gecko_types::CodeList::validate

mod construct;
mod error;
mod parser;

pub use error::{ParseError, ParseResult};
pub use parser::{load_code_list, Parser, CODE_LIST_TAG, CODE_TAG};
