use std::fmt;
use std::iter;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::common::{Codepoint, UcdFile};
use crate::error::Error;

/// Represents a single row in the `UnicodeData.txt` file.
///
/// These fields were taken from UAX44, Table 9, as part of the
/// documentation for the `UnicodeData.txt` file:
/// <http://www.unicode.org/reports/tr44/#UnicodeData.txt>
///
/// Only `codepoint`, `canonical_combining_class`, `decomposition` and the
/// simple case mappings are consumed by the table generator; the remaining
/// fields are parsed and kept around because a faithful `UnicodeData.txt`
/// parser should expose them, even though this crate's core pipeline does
/// not read them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UnicodeData {
    /// The codepoint corresponding to this row.
    pub codepoint: Codepoint,
    /// The name of this codepoint.
    pub name: String,
    /// The "general category" of this codepoint.
    pub general_category: String,
    /// The class of this codepoint used in the Canonical Ordering
    /// Algorithm.
    pub canonical_combining_class: u8,
    /// The bidirectional class of this codepoint.
    pub bidi_class: String,
    /// The decomposition mapping for this codepoint, including its
    /// formatting tag if present.
    pub decomposition: UnicodeDataDecomposition,
    /// A decimal numeric representation of this codepoint, if it has the
    /// property `Numeric_Type=Decimal`.
    pub numeric_type_decimal: Option<u8>,
    /// A decimal numeric representation of this codepoint, if it has the
    /// property `Numeric_Type=Digit`.
    pub numeric_type_digit: Option<u8>,
    /// A decimal or rational numeric representation of this codepoint, if
    /// it has the property `Numeric_Type=Numeric`.
    pub numeric_type_numeric: Option<UnicodeDataNumeric>,
    /// Whether this codepoint is "mirrored" in bidirectional text.
    pub bidi_mirrored: bool,
    /// The "old" Unicode 1.0 or ISO 6429 name of this codepoint.
    pub unicode1_name: String,
    /// The ISO 10464 comment field. No longer used in recent UCD versions.
    pub iso_comment: String,
    /// This codepoint's simple uppercase mapping, if it exists.
    pub simple_uppercase_mapping: Option<Codepoint>,
    /// This codepoint's simple lowercase mapping, if it exists.
    pub simple_lowercase_mapping: Option<Codepoint>,
    /// This codepoint's simple titlecase mapping, if it exists.
    pub simple_titlecase_mapping: Option<Codepoint>,
}

impl UcdFile for UnicodeData {
    fn relative_file_path() -> &'static Path {
        Path::new("UnicodeData.txt")
    }
}

impl UnicodeData {
    /// Parse a single line of `UnicodeData.txt`.
    pub fn parse_line(line: &str) -> Result<UnicodeData, Error> {
        lazy_static! {
            static ref PARTS: Regex = Regex::new(
                r"(?x)
                ^
                ([A-Z0-9]+);  #  1; codepoint
                ([^;]+);      #  2; name
                ([^;]+);      #  3; general category
                ([0-9]+);     #  4; canonical combining class
                ([^;]+);      #  5; bidi class
                ([^;]*);      #  6; decomposition
                ([0-9]*);     #  7; numeric type decimal
                ([0-9]*);     #  8; numeric type digit
                ([-0-9/]*);   #  9; numeric type numeric
                ([YN]);       # 10; bidi mirrored
                ([^;]*);      # 11; unicode1 name
                ([^;]*);      # 12; ISO comment
                ([^;]*);      # 13; simple uppercase mapping
                ([^;]*);      # 14; simple lowercase mapping
                ([^;]*)       # 15; simple titlecase mapping
                $
                "
            )
            .unwrap();
        };
        let caps = match PARTS.captures(line.trim()) {
            Some(caps) => caps,
            None => {
                return Err(Error::parse(format!(
                    "invalid UnicodeData line: '{}'",
                    line
                )))
            }
        };
        let capget = |n| caps.get(n).unwrap().as_str();
        let mut data = UnicodeData::default();

        data.codepoint = capget(1).parse()?;
        data.name = capget(2).to_string();
        data.general_category = capget(3).to_string();
        data.canonical_combining_class = capget(4).parse().map_err(|err| {
            Error::parse(format!(
                "failed to parse canonical combining class '{}': {}",
                capget(4),
                err
            ))
        })?;
        data.bidi_class = capget(5).to_string();
        if !caps[6].is_empty() {
            data.decomposition = caps[6].parse()?;
        } else {
            data.decomposition.push(data.codepoint)?;
        }
        if !capget(7).is_empty() {
            data.numeric_type_decimal = Some(capget(7).parse().map_err(
                |err| {
                    Error::parse(format!(
                        "failed to parse numeric type decimal '{}': {}",
                        capget(7),
                        err
                    ))
                },
            )?);
        }
        if !capget(8).is_empty() {
            data.numeric_type_digit = Some(capget(8).parse().map_err(
                |err| {
                    Error::parse(format!(
                        "failed to parse numeric type digit '{}': {}",
                        capget(8),
                        err
                    ))
                },
            )?);
        }
        if !capget(9).is_empty() {
            data.numeric_type_numeric = Some(capget(9).parse()?);
        }
        data.bidi_mirrored = capget(10) == "Y";
        data.unicode1_name = capget(11).to_string();
        data.iso_comment = capget(12).to_string();
        if !capget(13).is_empty() {
            data.simple_uppercase_mapping = Some(capget(13).parse()?);
        }
        if !capget(14).is_empty() {
            data.simple_lowercase_mapping = Some(capget(14).parse()?);
        }
        if !capget(15).is_empty() {
            data.simple_titlecase_mapping = Some(capget(15).parse()?);
        }
        Ok(data)
    }

    /// Returns true if and only if this record corresponds to the start of
    /// a range (e.g. `<Hangul Syllable, First>`).
    pub fn is_range_start(&self) -> bool {
        self.name.starts_with('<')
            && self.name.ends_with('>')
            && self.name.contains("First")
    }

    /// Returns true if and only if this record corresponds to the end of a
    /// range.
    pub fn is_range_end(&self) -> bool {
        self.name.starts_with('<')
            && self.name.ends_with('>')
            && self.name.contains("Last")
    }
}

impl FromStr for UnicodeData {
    type Err = Error;

    fn from_str(s: &str) -> Result<UnicodeData, Error> {
        UnicodeData::parse_line(s)
    }
}

impl fmt::Display for UnicodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{};{};{};", self.codepoint, self.name,
            self.general_category, self.canonical_combining_class,
            self.bidi_class)?;
        if self.decomposition.is_canonical()
            && self.decomposition.mapping() == &[self.codepoint]
        {
            write!(f, ";")?;
        } else {
            write!(f, "{};", self.decomposition)?;
        }
        match self.numeric_type_decimal {
            Some(n) => write!(f, "{};", n)?,
            None => write!(f, ";")?,
        }
        match self.numeric_type_digit {
            Some(n) => write!(f, "{};", n)?,
            None => write!(f, ";")?,
        }
        match self.numeric_type_numeric {
            Some(n) => write!(f, "{};", n)?,
            None => write!(f, ";")?,
        }
        write!(f, "{};", if self.bidi_mirrored { "Y" } else { "N" })?;
        write!(f, "{};{};", self.unicode1_name, self.iso_comment)?;
        match self.simple_uppercase_mapping {
            Some(cp) => write!(f, "{};", cp)?,
            None => write!(f, ";")?,
        }
        match self.simple_lowercase_mapping {
            Some(cp) => write!(f, "{};", cp)?,
            None => write!(f, ";")?,
        }
        if let Some(cp) = self.simple_titlecase_mapping {
            write!(f, "{}", cp)?;
        }
        Ok(())
    }
}

/// The decomposition mapping of a single row in `UnicodeData.txt`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UnicodeDataDecomposition {
    /// The formatting tag associated with this mapping, if present. Its
    /// absence means the mapping (if any) is canonical.
    pub tag: Option<UnicodeDataDecompositionTag>,
    /// The number of codepoints in this mapping.
    pub len: usize,
    /// The codepoints in the mapping. Entries at or beyond `len` are
    /// meaningless. If no mapping was present in the source line, this
    /// holds the single codepoint of the row itself (per UAX44).
    pub mapping: [Codepoint; 18],
}

impl UnicodeDataDecomposition {
    /// Create a new decomposition mapping with the given tag and
    /// codepoints.
    pub fn new(
        tag: Option<UnicodeDataDecompositionTag>,
        mapping: &[Codepoint],
    ) -> Result<UnicodeDataDecomposition, Error> {
        let mut x = UnicodeDataDecomposition::default();
        x.tag = tag;
        for &cp in mapping {
            x.push(cp)?;
        }
        Ok(x)
    }

    /// Add a codepoint to this decomposition's mapping.
    pub fn push(&mut self, cp: Codepoint) -> Result<(), Error> {
        if self.len >= self.mapping.len() {
            return Err(Error::parse(
                "invalid decomposition mapping (too many codepoints)"
                    .to_string(),
            ));
        }
        self.mapping[self.len] = cp;
        self.len += 1;
        Ok(())
    }

    /// Return the mapping as a slice of codepoints.
    pub fn mapping(&self) -> &[Codepoint] {
        &self.mapping[..self.len]
    }

    /// Returns true if and only if this decomposition mapping is canonical
    /// (i.e. has no formatting tag).
    pub fn is_canonical(&self) -> bool {
        self.tag.is_none()
    }
}

impl FromStr for UnicodeDataDecomposition {
    type Err = Error;

    fn from_str(s: &str) -> Result<UnicodeDataDecomposition, Error> {
        lazy_static! {
            static ref WITH_TAG: Regex = Regex::new(
                r"^(?:<(?P<tag>[^>]+)>)?\s*(?P<chars>[\s0-9A-F]+)$"
            )
            .unwrap();
            static ref CHARS: Regex = Regex::new(r"[0-9A-F]+").unwrap();
        };
        if s.is_empty() {
            return Err(Error::parse(
                "expected non-empty string for UnicodeDataDecomposition \
                 value"
                    .to_string(),
            ));
        }
        let caps = match WITH_TAG.captures(s) {
            Some(caps) => caps,
            None => {
                return Err(Error::parse(format!(
                    "invalid decomposition value: '{}'",
                    s
                )))
            }
        };
        let mut decomp = UnicodeDataDecomposition::default();
        let mut codepoints = s;
        if let Some(m) = caps.name("tag") {
            decomp.tag = Some(m.as_str().parse()?);
            codepoints = &caps["chars"];
        }
        for m in CHARS.find_iter(codepoints) {
            decomp.push(m.as_str().parse()?)?;
        }
        Ok(decomp)
    }
}

impl fmt::Display for UnicodeDataDecomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref tag) = self.tag {
            write!(f, "<{}> ", tag)?;
        }
        let mut first = true;
        for cp in self.mapping() {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "{}", cp)?;
        }
        Ok(())
    }
}

/// The formatting tag on a decomposition mapping, per UAX44 Table 14.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UnicodeDataDecompositionTag {
    /// `<font>`
    Font,
    /// `<noBreak>`
    NoBreak,
    /// `<initial>`
    Initial,
    /// `<medial>`
    Medial,
    /// `<final>`
    Final,
    /// `<isolated>`
    Isolated,
    /// `<circle>`
    Circle,
    /// `<super>`
    Super,
    /// `<sub>`
    Sub,
    /// `<vertical>`
    Vertical,
    /// `<wide>`
    Wide,
    /// `<narrow>`
    Narrow,
    /// `<small>`
    Small,
    /// `<square>`
    Square,
    /// `<fraction>`
    Fraction,
    /// `<compat>`
    Compat,
}

impl FromStr for UnicodeDataDecompositionTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<UnicodeDataDecompositionTag, Error> {
        use self::UnicodeDataDecompositionTag::*;
        Ok(match s {
            "font" => Font,
            "noBreak" => NoBreak,
            "initial" => Initial,
            "medial" => Medial,
            "final" => Final,
            "isolated" => Isolated,
            "circle" => Circle,
            "super" => Super,
            "sub" => Sub,
            "vertical" => Vertical,
            "wide" => Wide,
            "narrow" => Narrow,
            "small" => Small,
            "square" => Square,
            "fraction" => Fraction,
            "compat" => Compat,
            _ => {
                return Err(Error::parse(format!(
                    "invalid decomposition formatting tag: {}",
                    s
                )))
            }
        })
    }
}

impl fmt::Display for UnicodeDataDecompositionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::UnicodeDataDecompositionTag::*;
        let s = match *self {
            Font => "font",
            NoBreak => "noBreak",
            Initial => "initial",
            Medial => "medial",
            Final => "final",
            Isolated => "isolated",
            Circle => "circle",
            Super => "super",
            Sub => "sub",
            Vertical => "vertical",
            Wide => "wide",
            Narrow => "narrow",
            Small => "small",
            Square => "square",
            Fraction => "fraction",
            Compat => "compat",
        };
        write!(f, "{}", s)
    }
}

/// A numeric value corresponding to characters with `Numeric_Type=Numeric`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnicodeDataNumeric {
    /// An integer.
    Integer(i64),
    /// A rational number: numerator then denominator.
    Rational(i64, i64),
}

impl FromStr for UnicodeDataNumeric {
    type Err = Error;

    fn from_str(s: &str) -> Result<UnicodeDataNumeric, Error> {
        if s.is_empty() {
            return Err(Error::parse(
                "expected non-empty string for UnicodeDataNumeric value"
                    .to_string(),
            ));
        }
        if let Some(pos) = s.find('/') {
            let (snum, sden) = (&s[..pos], &s[pos + 1..]);
            let num = snum.parse().map_err(|err| {
                Error::parse(format!(
                    "invalid integer numerator '{}': {}",
                    snum, err
                ))
            })?;
            let den = sden.parse().map_err(|err| {
                Error::parse(format!(
                    "invalid integer denominator '{}': {}",
                    sden, err
                ))
            })?;
            Ok(UnicodeDataNumeric::Rational(num, den))
        } else {
            let n = s.parse().map_err(|err| {
                Error::parse(format!("invalid integer '{}': {}", s, err))
            })?;
            Ok(UnicodeDataNumeric::Integer(n))
        }
    }
}

impl fmt::Display for UnicodeDataNumeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            UnicodeDataNumeric::Integer(n) => write!(f, "{}", n),
            UnicodeDataNumeric::Rational(n, d) => write!(f, "{}/{}", n, d),
        }
    }
}

/// An iterator adapter that expands `<..., First>`/`<..., Last>` row pairs
/// in `UnicodeData.txt` into the full sequence of codepoints they denote.
///
/// Several large, algorithmically-named blocks (Hangul syllables, CJK
/// ideograph blocks, private-use areas) are represented in
/// `UnicodeData.txt` by a pair of rows rather than one row per codepoint.
/// Downstream consumers that build a dense per-codepoint array need every
/// member of the range, so this expander fills them in (cloning the start
/// record's properties, with an empty name).
pub struct UnicodeDataExpander<I: Iterator> {
    it: iter::Peekable<I>,
    range: CodepointRange,
}

struct CodepointRange {
    range: Range<u32>,
    start_record: UnicodeData,
}

impl<I: Iterator<Item = UnicodeData>> UnicodeDataExpander<I> {
    /// Create a new iterator that expands range pairs. All other records
    /// are passed through unchanged.
    pub fn new<T>(it: T) -> UnicodeDataExpander<I>
    where
        T: IntoIterator<IntoIter = I, Item = I::Item>,
    {
        UnicodeDataExpander {
            it: it.into_iter().peekable(),
            range: CodepointRange {
                range: 0..0,
                start_record: UnicodeData::default(),
            },
        }
    }
}

impl<I: Iterator<Item = UnicodeData>> Iterator for UnicodeDataExpander<I> {
    type Item = UnicodeData;

    fn next(&mut self) -> Option<UnicodeData> {
        if let Some(udata) = self.range.next() {
            return Some(udata);
        }
        let row1 = self.it.next()?;
        if !row1.is_range_start()
            || !self.it.peek().map_or(false, |row2| row2.is_range_end())
        {
            return Some(row1);
        }
        let row2 = self.it.next().unwrap();
        self.range = CodepointRange {
            range: row1.codepoint.value()..(row2.codepoint.value() + 1),
            start_record: row1,
        };
        self.next()
    }
}

impl Iterator for CodepointRange {
    type Item = UnicodeData;

    fn next(&mut self) -> Option<UnicodeData> {
        let cp = self.range.next()?;
        Some(UnicodeData {
            codepoint: Codepoint::from_u32(cp).unwrap(),
            name: String::new(),
            ..self.start_record.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        UnicodeData, UnicodeDataDecomposition, UnicodeDataDecompositionTag,
        UnicodeDataNumeric,
    };
    use crate::common::Codepoint;

    fn codepoint(n: u32) -> Codepoint {
        Codepoint::from_u32(n).unwrap()
    }

    #[test]
    fn parse_compat_decomposition() {
        let line = "249D;PARENTHESIZED LATIN SMALL LETTER B;So;0;L;<compat> 0028 0062 0029;;;;N;;;;;\n";
        let data: UnicodeData = line.parse().unwrap();
        assert_eq!(data.codepoint, codepoint(0x249d));
        assert_eq!(
            data.decomposition,
            UnicodeDataDecomposition::new(
                Some(UnicodeDataDecompositionTag::Compat),
                &[codepoint(0x28), codepoint(0x62), codepoint(0x29)],
            )
            .unwrap()
        );
    }

    #[test]
    fn parse_canonical_pair() {
        let line = "00E9;LATIN SMALL LETTER E WITH ACUTE;Ll;0;L;0065 0301;;;;N;;;0049;0069;\n";
        let data: UnicodeData = line.parse().unwrap();
        assert!(data.decomposition.is_canonical());
        assert_eq!(
            data.decomposition.mapping(),
            &[codepoint(0x0065), codepoint(0x0301)],
        );
    }

    #[test]
    fn parse_rational_numeric() {
        let line = "00BC;VULGAR FRACTION ONE QUARTER;No;0;ON;<fraction> 0031 2044 0034;;;1/4;N;FRACTION ONE QUARTER;;;;\n";
        let data: UnicodeData = line.parse().unwrap();
        assert_eq!(
            data.numeric_type_numeric,
            Some(UnicodeDataNumeric::Rational(1, 4))
        );
    }

    #[test]
    fn parse_no_decomposition_defaults_to_self() {
        let line = "0041;LATIN CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0061;\n";
        let data: UnicodeData = line.parse().unwrap();
        assert_eq!(data.decomposition.mapping(), &[codepoint(0x0041)]);
        assert_eq!(
            data.simple_lowercase_mapping,
            Some(codepoint(0x0061))
        );
    }

    #[test]
    fn expander_fills_hangul_range() {
        use crate::common::UcdLineParser;
        use super::UnicodeDataExpander;

        let text = "\
ABF9;MEETEI MAYEK DIGIT NINE;Nd;0;L;;9;9;9;N;;;;;
AC00;<Hangul Syllable, First>;Lo;0;L;;;;;N;;;;;
D7A3;<Hangul Syllable, Last>;Lo;0;L;;;;;N;;;;;
D7B0;HANGUL JUNGSEONG O-YEO;Lo;0;L;;;;;N;;;;;
";
        let records: Vec<UnicodeData> = UcdLineParser::new(text.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(UnicodeDataExpander::new(records).count(), 11174);
    }
}
