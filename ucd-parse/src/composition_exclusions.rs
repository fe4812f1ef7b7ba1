use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::common::{Codepoint, UcdFile};
use crate::error::Error;

/// A single entry in `CompositionExclusions.txt`.
///
/// The file lists, one codepoint per line, every character whose canonical
/// composition is excluded from composition even though it would otherwise
/// be composable (full composition exclusions, per UAX15).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CompositionExclusion {
    /// The excluded codepoint.
    pub codepoint: Codepoint,
}

impl UcdFile for CompositionExclusion {
    fn relative_file_path() -> &'static Path {
        Path::new("CompositionExclusions.txt")
    }
}

impl FromStr for CompositionExclusion {
    type Err = Error;

    fn from_str(s: &str) -> Result<CompositionExclusion, Error> {
        let field = s.trim().split_whitespace().next().ok_or_else(|| {
            Error::parse(format!(
                "invalid CompositionExclusions.txt line: '{}'",
                s
            ))
        })?;
        Ok(CompositionExclusion { codepoint: field.parse()? })
    }
}

impl fmt::Display for CompositionExclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.codepoint)
    }
}
