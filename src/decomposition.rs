//! Canonical decomposition/composition builder.
//!
//! Derives the fully expanded, canonically-reordered decomposition map `D`
//! and the composition-exclusion-filtered composition map `K`. Grounded on
//! `preprocess.py`'s `recursive_decompose` and the `decomposition_map` /
//! `composition_map` comprehensions at the bottom of that file.

use std::collections::{BTreeMap, BTreeSet};

use ucd_parse::UnicodeData;

use crate::error::{Error, Result};

/// A record's canonical decomposition is "present" only when it has an
/// explicit, non-tagged mapping of more than one codepoint, or a single
/// codepoint that differs from itself. `UnicodeData` defaults an absent
/// decomposition field to the self-mapping `[codepoint]`, which is not a
/// real decomposition and must be treated as the base case rather than
/// recursed into (recursing on it would never terminate).
fn has_canonical_decomposition(row: &UnicodeData) -> bool {
    row.decomposition.is_canonical()
        && !(row.decomposition.mapping().len() == 1
            && row.decomposition.mapping()[0].value() == row.codepoint.value())
}

/// Recursively expand the canonical decomposition of `cp`, without
/// reordering. Codepoints with no record, or no canonical decomposition,
/// expand to the singleton `(cp,)`.
fn recursive_decompose(
    by_codepoint: &BTreeMap<u32, UnicodeData>,
    cp: u32,
    depth: u32,
) -> Result<Vec<u32>> {
    if depth > 32 {
        return Err(Error::Input(format!(
            "canonical decomposition of U+{:04X} does not terminate \
             (corrupt UCD?)",
            cp
        )));
    }
    match by_codepoint.get(&cp) {
        Some(row) if has_canonical_decomposition(row) => {
            let mut out = Vec::new();
            for part in row.decomposition.mapping() {
                out.extend(recursive_decompose(
                    by_codepoint,
                    part.value(),
                    depth + 1,
                )?);
            }
            Ok(out)
        }
        _ => Ok(vec![cp]),
    }
}

/// The fully expanded, canonically-reordered decomposition map `D`, and the
/// composition map `K`, derived from a parsed `UnicodeData.txt` and
/// `CompositionExclusions.txt`.
pub struct Decompositions {
    /// `D`: codepoint -> fully expanded, CCC-reordered decomposition.
    pub decomposition_map: BTreeMap<u32, Vec<u32>>,
    /// `K`: (A, B) -> C, filtered by exclusions and starter constraints.
    pub composition_map: BTreeMap<(u32, u32), u32>,
}

/// Build `D` and `K` from the UCD records and the exclusion set.
///
/// `rows` need not be sorted; it is indexed by codepoint internally.
pub fn build(
    rows: &[UnicodeData],
    exclusions: &BTreeSet<u32>,
) -> Result<Decompositions> {
    let by_codepoint: BTreeMap<u32, UnicodeData> = rows
        .iter()
        .map(|row| (row.codepoint.value(), row.clone()))
        .collect();
    let ccc = |cp: u32| -> u8 {
        by_codepoint
            .get(&cp)
            .map(|r| r.canonical_combining_class)
            .unwrap_or(0)
    };

    let mut decomposition_map = BTreeMap::new();
    for (&cp, row) in &by_codepoint {
        if !has_canonical_decomposition(row) {
            continue;
        }
        let mut expanded = recursive_decompose(&by_codepoint, cp, 0)?;
        // Stable sort by CCC: starters (CCC 0) keep position, runs of
        // nonzero CCC sort ascending with original order preserved on ties.
        expanded.sort_by_key(|&c| ccc(c));
        decomposition_map.insert(cp, expanded);
    }

    let mut composition_map = BTreeMap::new();
    for (&cp, row) in &by_codepoint {
        if exclusions.contains(&cp) {
            continue;
        }
        if !row.decomposition.is_canonical() {
            continue;
        }
        let mapping = row.decomposition.mapping();
        if mapping.len() != 2 {
            continue;
        }
        if row.canonical_combining_class != 0 {
            continue;
        }
        let (a, b) = (mapping[0].value(), mapping[1].value());
        if ccc(a) != 0 {
            continue;
        }
        composition_map.insert((a, b), cp);
    }

    Ok(Decompositions { decomposition_map, composition_map })
}
