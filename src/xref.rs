//! Interesting-codepoint cross-reference table.
//!
//! Assigns dense 16-bit indices to every codepoint mentioned anywhere in the
//! decomposition map `D` or the composition map `K`, so that decomposition
//! and composition sequences can be encoded with 16-bit indices instead of
//! 21-bit codepoints. Grounded on `preprocess.py`'s `all_codepoints`
//! construction (the sorted-unique set built just before the sequence pools
//! are packed).

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::decomposition::Decompositions;
use crate::error::{Error, Result};

/// `X`: index 0 is reserved for the sentinel codepoint 0; the rest are the
/// sorted, deduplicated codepoints appearing in `D` (as key or value
/// element) or `K` (as either key component or result).
pub struct Xref {
    pub table: Vec<u32>,
    index: BTreeMap<u32, u16>,
}

impl Xref {
    /// The position of `cp` within the table, i.e. `idx(cp)`.
    ///
    /// Panics if `cp` was not part of the set this table was built from;
    /// callers only ever look up codepoints they just inserted into the
    /// maps this table was derived from.
    pub fn idx(&self, cp: u32) -> u16 {
        self.index[&cp]
    }
}

/// Build `X` from the decomposition/composition maps. Fails if more than
/// 2^15 - 1 distinct codepoints are mentioned (the decomposition/composition
/// start maps pack `idx(·)` into 15 bits).
pub fn build(decomp: &Decompositions) -> Result<Xref> {
    let mut set: BTreeSet<u32> = BTreeSet::new();
    set.insert(0);
    for (&cp, seq) in &decomp.decomposition_map {
        set.insert(cp);
        set.extend(seq.iter().copied());
    }
    for (&(a, b), &c) in &decomp.composition_map {
        set.insert(a);
        set.insert(b);
        set.insert(c);
    }

    if set.len() >= 1 << 15 {
        return Err(Error::Invariant(format!(
            "interesting-codepoint table has {} entries, which does not \
             fit in a 15-bit index",
            set.len()
        )));
    }

    // 0 must be the first element, as required by §3; since it was
    // inserted above and BTreeSet iterates in ascending order, it already
    // is unless some decomposition mentions U+0000 too, in which case it's
    // still first and just deduplicated.
    let table: Vec<u32> = set.into_iter().collect();
    let index =
        table.iter().enumerate().map(|(i, &cp)| (cp, i as u16)).collect();
    Ok(Xref { table, index })
}

#[cfg(test)]
mod tests {
    use super::build;
    use crate::decomposition::Decompositions;
    use std::collections::BTreeMap;

    fn decomp(
        d: &[(u32, &[u32])],
        k: &[((u32, u32), u32)],
    ) -> Decompositions {
        let mut decomposition_map = BTreeMap::new();
        for &(cp, seq) in d {
            decomposition_map.insert(cp, seq.to_vec());
        }
        let mut composition_map = BTreeMap::new();
        for &(pair, c) in k {
            composition_map.insert(pair, c);
        }
        Decompositions { decomposition_map, composition_map }
    }

    #[test]
    fn first_entry_is_zero_sentinel() {
        let d = decomp(&[(0x00E9, &[0x0065, 0x0301])], &[]);
        let x = build(&d).unwrap();
        assert_eq!(x.table[0], 0);
    }

    #[test]
    fn indexes_every_mentioned_codepoint() {
        let d = decomp(
            &[(0x00E9, &[0x0065, 0x0301])],
            &[((0x0065, 0x0301), 0x00E9)],
        );
        let x = build(&d).unwrap();
        for cp in [0x0065, 0x0301, 0x00E9] {
            assert!(x.table.contains(&cp));
            assert_eq!(x.table[x.idx(cp) as usize], cp);
        }
    }

    #[test]
    fn table_is_sorted_and_deduplicated() {
        let d = decomp(
            &[(0x00E9, &[0x0065, 0x0301]), (0x1E09, &[0x0043, 0x0327])],
            &[],
        );
        let x = build(&d).unwrap();
        let mut sorted = x.table.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(x.table, sorted);
    }
}
