/*!
A small library for parsing the handful of Unicode character database files
consumed by `ucd-tablegen`: `UnicodeData.txt`, `CompositionExclusions.txt`
and the Default Unicode Collation Element Table (`allkeys.txt`).
*/

#![deny(missing_docs)]

pub use crate::collation_elements::CollationElements;
pub use crate::common::{parse, parse_codepoint_sequence, Codepoint, UcdFile, UcdLineParser};
pub use crate::composition_exclusions::CompositionExclusion;
pub use crate::error::{Error, ErrorKind};
pub use crate::unicode_data::{
    UnicodeData, UnicodeDataDecomposition, UnicodeDataDecompositionTag,
    UnicodeDataExpander, UnicodeDataNumeric,
};

mod collation_elements;
mod common;
mod composition_exclusions;
mod error;
mod unicode_data;
