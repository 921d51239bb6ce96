use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::FormatParseError;

/// Output format selector of the generated dispatch routine.
///
/// Exactly one format is handled per dispatch call. Only [`Dolphin`] and
/// [`Ocarina`] carry textual banners and descriptions; [`Gct`] wraps the
/// code calls in begin/end markers.
///
/// [`Dolphin`]: OutputFormat::Dolphin
/// [`Ocarina`]: OutputFormat::Ocarina
/// [`Gct`]: OutputFormat::Gct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Dolphin,
    Gct,
    Ocarina,
    Raw,
    RawText,
    None,
}

impl OutputFormat {
    /// Every variant, in declaration order of the generated C enum.
    pub const ALL: [Self; 6] = [
        Self::Dolphin,
        Self::Gct,
        Self::Ocarina,
        Self::Raw,
        Self::RawText,
        Self::None,
    ];

    /// Enumerator name in the generated `CLFFmt` enum.
    pub fn c_name(self) -> &'static str {
        match self {
            Self::Dolphin => "CLF_DOLPHIN",
            Self::Gct => "CLF_GCT",
            Self::Ocarina => "CLF_OCARINA",
            Self::Raw => "CLF_RAW",
            Self::RawText => "CLF_RAWTEXT",
            Self::None => "CLF_NONE",
        }
    }

    /// Explicit enumerator value, if it is not the implicit one.
    pub fn c_value(self) -> Option<u8> {
        match self {
            Self::None => Some(0xFF),
            _ => None,
        }
    }

    /// Lower-case name as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dolphin => "dolphin",
            Self::Gct => "gct",
            Self::Ocarina => "ocarina",
            Self::Raw => "raw",
            Self::RawText => "rawtext",
            Self::None => "none",
        }
    }

    /// Whether the format prints banners, headers and descriptions.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::Dolphin | Self::Ocarina)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatParseError;

    /// Case-insensitive. `none` is not selectable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .filter(|f| *f != Self::None)
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FormatParseError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_names_unique() {
        let mut names: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.c_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 6);
    }

    #[test]
    fn test_only_none_has_explicit_value() {
        for format in OutputFormat::ALL {
            assert_eq!(format.c_value().is_some(), format == OutputFormat::None);
        }
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("Dolphin".parse::<OutputFormat>().unwrap(), OutputFormat::Dolphin);
        assert_eq!("GCT".parse::<OutputFormat>().unwrap(), OutputFormat::Gct);
        assert_eq!("rawtext".parse::<OutputFormat>().unwrap(), OutputFormat::RawText);
        assert!("none".parse::<OutputFormat>().is_err());
        assert!("ini".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_textual_formats() {
        let textual: Vec<OutputFormat> =
            OutputFormat::ALL.into_iter().filter(|f| f.is_textual()).collect();
        assert_eq!(textual, vec![OutputFormat::Dolphin, OutputFormat::Ocarina]);
    }
}
