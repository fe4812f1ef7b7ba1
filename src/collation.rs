//! Collation emission mode: the DUCET level-1 hash table.
//!
//! Parses `allkeys.txt` and builds a map from codepoint-sequence keys to
//! their level-1 weight sequences, then packs it with [`crate::ducet`] and
//! serializes it. This is the `UCD Loader -> DUCET Hash Table Builder ->
//! Serializer` data flow for the `collation` subcommand.

use std::collections::BTreeMap;

use ucd_parse::{CollationElements, UcdFile};

use crate::args::ArgMatches;
use crate::diagnostics;
use crate::ducet::{self, DucetTable};
use crate::error::Result;

/// Build the DUCET level-1 hash table from already-parsed `allkeys.txt`
/// rows. Split out from [`command`] so the pipeline can be exercised
/// directly in tests without going through a UCD directory on disk.
pub fn build(rows: Vec<CollationElements>) -> Result<DucetTable> {
    let mut map: BTreeMap<Vec<u32>, Vec<u32>> = BTreeMap::new();
    for row in rows {
        let key: Vec<u32> = row.key.iter().map(|cp| cp.value()).collect();
        map.insert(key, row.weights);
    }
    ducet::build(&map)
}

pub fn command(args: ArgMatches<'_>) -> Result<()> {
    let dir = args.ucd_dir()?;

    let rows: Vec<CollationElements> = CollationElements::from_dir(&dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let table = build(rows)?;

    let sizes = [
        ("ducet_data", table.data.len() as u64 * 4),
        ("ducet_bucket_indexes", table.bucket_indexes.len() as u64 * 4),
    ];

    let mut wtr = args.writer()?;
    wtr.ducet(&table)?;

    diagnostics::report(args.name(), &sizes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::build;
    use crate::ducet::lookup;

    fn row(s: &str) -> ucd_parse::CollationElements {
        s.parse().unwrap()
    }

    // S6: the DUCET entry keyed by "a" (U+0061) maps to weight [0x15A0];
    // a key not present returns none.
    #[test]
    fn ducet_lookup_matches_spec_example() {
        let rows = vec![
            row("0061 ; [.15A0.0020.0002] # LATIN SMALL LETTER A"),
            row("0062 ; [.15A4.0020.0002] # LATIN SMALL LETTER B"),
            row("0301 ; [.0000.0021.0002] # COMBINING ACUTE ACCENT"),
        ];
        let table = build(rows).unwrap();
        assert_eq!(lookup(&table, &[0x0061]), Some(vec![0x15A0]));
        assert_eq!(lookup(&table, &[0x0062]), Some(vec![0x15A4]));
        // The combining acute's only element has w1 == 0, so it's dropped
        // and the key maps to an empty (but present) weight sequence.
        assert_eq!(lookup(&table, &[0x0301]), Some(vec![]));
        assert_eq!(lookup(&table, &[0x1234]), None);
    }
}
