//! Default emission mode: the per-codepoint normalization/case tables.
//!
//! Parses `UnicodeData.txt` and `CompositionExclusions.txt`, builds the
//! decomposition/composition maps, the interesting-codepoint cross-reference
//! table and the two sequence pools, packs the per-codepoint arrays
//! (lowercase offset, combining class, decomposition start, composition
//! start) through the two-level trie packer, and serializes everything.
//! This is the `UCD Loader -> Decomposition/Composition Builder ->
//! Interesting-Codepoint Indexer -> Sequence Packers -> Trie Packer ->
//! Serializer` data flow.

use std::collections::BTreeSet;

use ucd_parse::{CompositionExclusion, UcdFile, UnicodeData, UnicodeDataExpander};

use crate::args::ArgMatches;
use crate::decomposition;
use crate::diagnostics;
use crate::error::Result;
use crate::intwidth::width_bytes;
use crate::seq::{self, CompSeq, DecompSeq};
use crate::trie::{self, Trie, TranslationTrie};
use crate::xref::{self, Xref};

/// Unicode's codepoint space, per spec §3: `[0, 0x110000)`.
const CODEPOINT_SPACE: u32 = 0x110000;

/// Every table this emission mode produces, built but not yet serialized.
/// Split out from [`command`] so the pipeline can be exercised directly in
/// tests without going through a UCD directory on disk.
pub struct Tables {
    pub xref: Xref,
    pub decomp_seq: DecompSeq,
    pub comp_seq: CompSeq,
    pub lowercase_offset: TranslationTrie,
    pub ccc: Trie,
    pub decomp_idx: Trie,
    pub comp_idx: Trie,
}

/// Build every table from already-parsed UCD rows and the composition
/// exclusion set. `rows` should already be range-expanded (see
/// `UnicodeDataExpander`).
pub fn build(rows: &[UnicodeData], exclusions: &BTreeSet<u32>) -> Result<Tables> {
    let decomp = decomposition::build(rows, exclusions)?;
    let xref = xref::build(&decomp)?;
    let decomp_seq = seq::build_decomp_seq(&decomp, &xref)?;
    let comp_seq = seq::build_comp_seq(&decomp, &xref);

    let mut lowercase_values = vec![0i64; CODEPOINT_SPACE as usize];
    let mut ccc_values = vec![0i64; CODEPOINT_SPACE as usize];
    for row in rows {
        let cp = row.codepoint.value() as usize;
        if let Some(lc) = row.simple_lowercase_mapping {
            lowercase_values[cp] = lc.value() as i64 - cp as i64;
        }
        ccc_values[cp] = row.canonical_combining_class as i64;
    }

    let mut decomp_idx_values = vec![0i64; CODEPOINT_SPACE as usize];
    for (&cp, &packed) in &decomp_seq.start {
        decomp_idx_values[cp as usize] = packed as i64;
    }

    let mut comp_idx_values = vec![0i64; CODEPOINT_SPACE as usize];
    for (&cp, &packed) in &comp_seq.start {
        comp_idx_values[cp as usize] = packed as i64;
    }

    Ok(Tables {
        xref,
        decomp_seq,
        comp_seq,
        lowercase_offset: trie::build_translation(&lowercase_values),
        ccc: trie::build(&ccc_values),
        decomp_idx: trie::build(&decomp_idx_values),
        comp_idx: trie::build(&comp_idx_values),
    })
}

pub fn command(args: ArgMatches<'_>) -> Result<()> {
    let dir = args.ucd_dir()?;

    let raw_rows: Vec<UnicodeData> = UnicodeData::from_dir(&dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let rows: Vec<UnicodeData> =
        UnicodeDataExpander::new(raw_rows).collect();

    let exclusions: BTreeSet<u32> = CompositionExclusion::from_dir(&dir)?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .map(|x| x.codepoint.value())
        .collect();

    let tables = build(&rows, &exclusions)?;

    let sizes: Vec<(&str, u64)> = vec![
        translation_trie_bytes("lowercase_offset", &tables.lowercase_offset),
        trie_bytes("ccc", &tables.ccc),
        ("xref", tables.xref.table.len() as u64 * 4),
        ("decomp_seq", tables.decomp_seq.pool.len() as u64 * 2),
        trie_bytes("decomp_idx", &tables.decomp_idx),
        ("comp_seq", tables.comp_seq.pool.len() as u64 * 2),
        trie_bytes("comp_idx", &tables.comp_idx),
    ];

    let mut wtr = args.writer()?;
    wtr.translation_trie("lowercase_offset", &tables.lowercase_offset)?;
    wtr.trie("ccc", "t2", &tables.ccc)?;
    wtr.u32_slice("XREF", &tables.xref.table)?;
    wtr.u16_slice("DECOMP_SEQ", &tables.decomp_seq.pool)?;
    wtr.trie("decomp_idx", "t2", &tables.decomp_idx)?;
    wtr.u16_slice("COMP_SEQ", &tables.comp_seq.pool)?;
    wtr.trie("comp_idx", "t2", &tables.comp_idx)?;

    diagnostics::report(args.name(), &sizes);
    Ok(())
}

fn trie_bytes(name: &'static str, t: &Trie) -> (&'static str, u64) {
    let t1_bytes: Vec<i64> = t.t1.iter().map(|&x| x as i64).collect();
    let bytes = width_bytes(&t1_bytes) as u64 * t.t1.len() as u64
        + width_bytes(&t.t2) as u64 * t.t2.len() as u64;
    (name, bytes)
}

fn translation_trie_bytes(
    name: &'static str,
    tt: &TranslationTrie,
) -> (&'static str, u64) {
    let (_, index_bytes) = trie_bytes(name, &tt.index_trie);
    (name, width_bytes(&tt.values) as u64 * tt.values.len() as u64 + index_bytes)
}

#[cfg(test)]
mod tests {
    use super::build;
    use std::collections::BTreeSet;
    use ucd_parse::{Codepoint, UnicodeData, UnicodeDataDecomposition};

    fn row(
        cp: u32,
        ccc: u8,
        lowercase: Option<u32>,
        decomp: Option<&[u32]>,
    ) -> UnicodeData {
        let codepoint = Codepoint::from_u32(cp).unwrap();
        let decomposition = match decomp {
            Some(mapping) => UnicodeDataDecomposition::new(
                None,
                &mapping
                    .iter()
                    .map(|&c| Codepoint::from_u32(c).unwrap())
                    .collect::<Vec<_>>(),
            )
            .unwrap(),
            None => {
                UnicodeDataDecomposition::new(None, &[codepoint]).unwrap()
            }
        };
        UnicodeData {
            codepoint,
            canonical_combining_class: ccc,
            decomposition,
            simple_lowercase_mapping: lowercase
                .map(|c| Codepoint::from_u32(c).unwrap()),
            ..UnicodeData::default()
        }
    }

    // S5: lowercase_offset(0x41) == 32, lowercase_offset(0x61) == 0.
    #[test]
    fn lowercase_offset_matches_spec_example() {
        let rows = vec![
            row(0x0041, 0, Some(0x0061), None),
            row(0x0042, 0, Some(0x0062), None),
            row(0x0061, 0, None, None),
        ];
        let tables = build(&rows, &BTreeSet::new()).unwrap();
        assert_eq!(tables.lowercase_offset.lookup(0x0041), 32);
        assert_eq!(tables.lowercase_offset.lookup(0x0042), 32);
        assert_eq!(tables.lowercase_offset.lookup(0x0061), 0);
    }

    // S1/S6-adjacent: decomposition-derived tables round-trip through the
    // real pipeline, not just through seq.rs's synthetic fixtures.
    #[test]
    fn decomposition_tables_round_trip_through_the_real_pipeline() {
        let rows = vec![
            row(0x0041, 0, None, None),
            row(0x0065, 0, None, None),
            row(0x0301, 230, None, None),
            row(0x00E9, 0, None, Some(&[0x0065, 0x0301])),
        ];
        let tables = build(&rows, &BTreeSet::new()).unwrap();

        let packed = tables.decomp_idx.lookup(0x00E9) as u16;
        let len = (packed >> 14) as usize + 1;
        let offset = (packed & 0x3FFF) as usize;
        let window: Vec<u32> = tables.decomp_seq.pool[offset..offset + len]
            .iter()
            .map(|&i| tables.xref.table[i as usize])
            .collect();
        assert_eq!(window, vec![0x0065, 0x0301]);

        let packed_a = tables.comp_idx.lookup(0x0065) as u16;
        let comp_offset = packed_a as usize * 2;
        let b = tables.comp_seq.pool[comp_offset] & 0x7FFF;
        let c = tables.comp_seq.pool[comp_offset + 1];
        assert_eq!(tables.xref.table[b as usize], 0x0301);
        assert_eq!(tables.xref.table[c as usize], 0x00E9);
    }
}
