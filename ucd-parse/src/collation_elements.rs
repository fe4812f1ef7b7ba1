use std::fmt;
use std::path::Path;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::common::{parse_codepoint_sequence, Codepoint, UcdFile};
use crate::error::Error;

/// A single row of the Default Unicode Collation Element Table
/// (`allkeys.txt`): a sequence of codepoints (a single character, or a
/// multi-codepoint contraction) mapped to one or more collation elements.
///
/// Only the primary (level 1) weight of each collation element is kept.
/// Weights of zero are dropped entirely (a level-1 weight of 0000 means the
/// codepoint contributes nothing at level 1 — typically combining marks),
/// and variable-weight elements (bracketed with `*` rather than `.`, used by
/// DUCET to flag punctuation/symbols for the variable-weighting tailoring
/// that level 1 alone does not implement) are treated exactly like
/// fixed-weight elements: their primary weight is kept the same way.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CollationElements {
    /// The codepoint sequence this row assigns weights to.
    pub key: Vec<Codepoint>,
    /// The level 1 weight of each collation element in this row's mapping,
    /// in order, with zero weights already removed.
    pub weights: Vec<u32>,
}

impl UcdFile for CollationElements {
    fn relative_file_path() -> &'static Path {
        Path::new("allkeys.txt")
    }
}

impl FromStr for CollationElements {
    type Err = Error;

    fn from_str(s: &str) -> Result<CollationElements, Error> {
        lazy_static! {
            static ref LINE: Regex =
                Regex::new(r"(?x)^([\s0-9A-Fa-f]+);\s*(.+)$").unwrap();
            static ref ELEMENT: Regex =
                Regex::new(r"[.*]([0-9A-Fa-f]{4})\.[0-9A-Fa-f]{4}\.[0-9A-Fa-f]{4}")
                    .unwrap();
        };
        let caps = LINE.captures(s.trim()).ok_or_else(|| {
            Error::parse(format!("invalid allkeys.txt line: '{}'", s))
        })?;
        let key = parse_codepoint_sequence(&caps[1])?;
        if key.is_empty() {
            return Err(Error::parse(format!(
                "invalid allkeys.txt line (empty key): '{}'",
                s
            )));
        }
        let mut weights = vec![];
        for cap in ELEMENT.captures_iter(&caps[2]) {
            let w1 = u32::from_str_radix(&cap[1], 16).map_err(|err| {
                Error::parse(format!(
                    "failed to parse collation weight '{}': {}",
                    &cap[1], err
                ))
            })?;
            if w1 != 0 {
                weights.push(w1);
            }
        }
        Ok(CollationElements { key, weights })
    }
}

impl fmt::Display for CollationElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cp in &self.key {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "{}", cp)?;
        }
        write!(f, " ;")?;
        for w in &self.weights {
            write!(f, " [.{:04X}.0000.0000]", w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::CollationElements;
    use crate::common::Codepoint;

    fn cp(n: u32) -> Codepoint {
        Codepoint::from_u32(n).unwrap()
    }

    #[test]
    fn parses_single_element() {
        let row: CollationElements =
            "0041  ; [.15A0.0020.0008] # LATIN CAPITAL LETTER A"
                .parse()
                .unwrap();
        assert_eq!(row.key, vec![cp(0x0041)]);
        assert_eq!(row.weights, vec![0x15A0]);
    }

    #[test]
    fn drops_zero_weight_elements() {
        let row: CollationElements =
            "0301 ; [.0000.0021.0002] # COMBINING ACUTE ACCENT"
                .parse()
                .unwrap();
        assert_eq!(row.key, vec![cp(0x0301)]);
        assert!(row.weights.is_empty());
    }

    #[test]
    fn treats_variable_weight_element_like_fixed() {
        let row: CollationElements =
            "0020 ; [*0209.0020.0002] # SPACE".parse().unwrap();
        assert_eq!(row.weights, vec![0x0209]);
    }

    #[test]
    fn parses_multi_codepoint_key_with_multiple_elements() {
        let row: CollationElements =
            "0041 0301 ; [.15A0.0020.0008][.0000.0043.0000] # A WITH ACUTE"
                .parse()
                .unwrap();
        assert_eq!(row.key, vec![cp(0x0041), cp(0x0301)]);
        assert_eq!(row.weights, vec![0x15A0, 0x0043]);
    }

    #[test]
    fn rejects_blank_line() {
        assert!("   ".parse::<CollationElements>().is_err());
    }
}
