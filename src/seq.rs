//! Decomposition-sequence and composition-sequence pool packers.
//!
//! Both pools flatten per-codepoint sequences of `idx(·)` values (see
//! [`crate::xref`]) into one shared array, so that a per-codepoint "start
//! offset" trie (packed by [`crate::trie`]) can locate a codepoint's
//! sequence without storing its length separately for every codepoint.
//! Grounded on `preprocess.py`'s `make_decomposition_sequence` /
//! `make_composition_sequence`.

use std::collections::BTreeMap;

use crate::decomposition::Decompositions;
use crate::error::{Error, Result};
use crate::xref::Xref;

/// Bits available for the start offset in a decomposition-start map entry
/// (the top 2 bits hold `len - 1`, per §3).
const DECOMP_START_BITS: u32 = 14;

/// The decomposition-sequence pool `DS` and its start map `DSM`.
pub struct DecompSeq {
    /// `DS`: the flat pool of `idx(·)` values. `DS[0] == 0` is a reserved
    /// sentinel, not part of any real window.
    pub pool: Vec<u16>,
    /// `DSM`: codepoint -> packed `(len - 1) << 14 | start_offset`.
    pub start: BTreeMap<u32, u16>,
}

/// Build the decomposition-sequence pool by iterating decomposable
/// codepoints in ascending order, reusing any prior window that already
/// contains the wanted subsequence (first occurrence wins, per §4.2/§9).
pub fn build_decomp_seq(
    decomp: &Decompositions,
    xref: &Xref,
) -> Result<DecompSeq> {
    let mut pool: Vec<u16> = vec![0];
    let mut start = BTreeMap::new();

    for (&cp, seq) in &decomp.decomposition_map {
        let len = seq.len();
        if len == 0 || len > 4 {
            return Err(Error::Invariant(format!(
                "decomposition of U+{:04X} has length {}, expected 1..=4",
                cp, len
            )));
        }
        let idxs: Vec<u16> = seq.iter().map(|&c| xref.idx(c)).collect();

        let offset = match find_subsequence(&pool, &idxs) {
            Some(off) => off,
            None => {
                let off = pool.len();
                pool.extend_from_slice(&idxs);
                off
            }
        };
        if offset >= (1 << DECOMP_START_BITS) {
            return Err(Error::Invariant(format!(
                "decomposition-sequence offset {} for U+{:04X} does not \
                 fit in {} bits",
                offset, cp, DECOMP_START_BITS
            )));
        }
        let packed =
            (((len - 1) as u16) << DECOMP_START_BITS) | offset as u16;
        start.insert(cp, packed);
    }

    Ok(DecompSeq { pool, start })
}

/// First-occurrence offset of `needle` as a contiguous subsequence of
/// `haystack`, or `None` if it doesn't occur. A naive O(n*m) scan, which is
/// fine given the pool holds only a few thousand entries (see spec §9).
fn find_subsequence(haystack: &[u16], needle: &[u16]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// The composition-sequence pool `CS` and its start map `CM`.
pub struct CompSeq {
    /// `CS`: `(idx(B), idx(C))` word pairs, grouped by first component `A`
    /// in ascending order. The last pair of each group has bit 15 set in
    /// its first word (end-of-list marker).
    pub pool: Vec<u16>,
    /// `CM`: codepoint `A` -> half-offset (word-offset / 2) of its group's
    /// first pair within `pool`.
    pub start: BTreeMap<u32, u16>,
}

const COMP_END_MARKER: u16 = 1 << 15;

/// Build the composition-sequence pool by grouping `K` entries by first
/// component, in ascending `(A, B)` order (so `composition_map`, a
/// `BTreeMap`, already visits them correctly).
pub fn build_comp_seq(decomp: &Decompositions, xref: &Xref) -> CompSeq {
    let mut groups: BTreeMap<u32, Vec<(u32, u32)>> = BTreeMap::new();
    for (&(a, b), &c) in &decomp.composition_map {
        groups.entry(a).or_default().push((b, c));
    }

    let mut pool = Vec::new();
    let mut start = BTreeMap::new();
    for (&a, pairs) in &groups {
        start.insert(a, (pool.len() / 2) as u16);
        let last = pairs.len() - 1;
        for (i, &(b, c)) in pairs.iter().enumerate() {
            let mut word0 = xref.idx(b);
            if i == last {
                word0 |= COMP_END_MARKER;
            }
            pool.push(word0);
            pool.push(xref.idx(c));
        }
    }

    CompSeq { pool, start }
}
