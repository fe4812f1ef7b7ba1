//! Two-level trie packer.
//!
//! Splits a dense, codepoint-indexed array `V` into a block-index table
//! `t1` and a deduplicated block table `t2`, choosing the block size
//! `2^shift` that minimizes total serialized bytes. Grounded on
//! `preprocess.py`'s `try_split`/`split_array`, which this module follows
//! almost line for line.

use std::collections::HashMap;

use crate::intwidth::width_bytes;

/// The result of packing a dense array into a two-level trie.
#[derive(Clone, Debug)]
pub struct Trie {
    pub t1: Vec<u32>,
    pub t2: Vec<i64>,
    pub shift: u32,
    /// The length of the (possibly truncated) array this trie represents.
    /// Codepoints at or beyond this length are not covered by `t1`/`t2` and
    /// the accessor returns 0 for them unconditionally.
    pub len: usize,
}

impl Trie {
    /// Look up the value at codepoint `cp`, or 0 if it's outside the
    /// trie's retained range. This mirrors the accessor routine the
    /// serializer emits, and exists so tests can exercise the packing
    /// logic without going through generated code.
    pub fn lookup(&self, cp: u32) -> i64 {
        if cp as usize >= self.len {
            return 0;
        }
        let mask = (1u32 << self.shift) - 1;
        let block = self.t1[(cp >> self.shift) as usize];
        let idx = ((block << self.shift) | (cp & mask)) as usize;
        self.t2[idx]
    }

    fn cost(&self) -> u64 {
        width_bytes(
            &self.t1.iter().map(|&x| x as i64).collect::<Vec<i64>>(),
        ) as u64
            * self.t1.len() as u64
            + width_bytes(&self.t2) as u64 * self.t2.len() as u64
    }
}

/// Pack a dense, codepoint-indexed array into a two-level trie.
///
/// The array is first truncated at its highest nonzero index (values past
/// the cutoff are treated as zero by the runtime accessor). If the array is
/// all zero, the returned trie is empty and its accessor always returns 0.
pub fn build(values: &[i64]) -> Trie {
    let len = match values.iter().rposition(|&v| v != 0) {
        Some(i) => i + 1,
        None => 0,
    };
    if len == 0 {
        return Trie { t1: vec![], t2: vec![], shift: 0, len: 0 };
    }
    let truncated = &values[..len];
    let max_shift = crate::intwidth::bit_length(len as u64);

    let mut best = try_split(truncated, 0);
    for shift in 1..=max_shift {
        let candidate = try_split(truncated, shift);
        if candidate.cost() < best.cost() {
            best = candidate;
        }
    }
    best
}

/// A two-level trie over *indices* into a separately deduplicated value
/// table, rather than over raw values directly. Grounded on
/// `preprocess.py`'s `make_translation_map`, which packs `lowercase_offset`
/// this way (as opposed to `make_direct_map`, used for `ccc`/`decomp_idx`/
/// `comp_idx`): codepoints that share a value (overwhelmingly the "no
/// mapping" delta of 0) collapse to the same index, so `t1`/`t2` hold small
/// non-negative indices rather than the deltas themselves, and the deltas
/// live once each in `values`.
pub struct TranslationTrie {
    /// The deduplicated value table, in first-occurrence order.
    pub values: Vec<i64>,
    /// The two-level trie over `idx(·)` into `values`.
    pub index_trie: Trie,
}

impl TranslationTrie {
    /// Look up the value at codepoint `cp`, mirroring the three-step
    /// accessor the serializer emits (`t1` -> `t2` -> `values[offset_index]`).
    pub fn lookup(&self, cp: u32) -> i64 {
        let idx = self.index_trie.lookup(cp);
        self.values[idx as usize]
    }
}

/// Build a translation trie from a dense, codepoint-indexed array of
/// values: dedup the values into a value table (first occurrence wins, so
/// the overwhelmingly common value - typically 0 - lands at index 0), then
/// pack the resulting index array with the ordinary two-level trie packer.
pub fn build_translation(values: &[i64]) -> TranslationTrie {
    let mut value_table: Vec<i64> = Vec::new();
    let mut value_index: HashMap<i64, u32> = HashMap::new();
    let mut index_array: Vec<i64> = Vec::with_capacity(values.len());
    for &v in values {
        let idx = *value_index.entry(v).or_insert_with(|| {
            let id = value_table.len() as u32;
            value_table.push(v);
            id
        });
        index_array.push(idx as i64);
    }
    TranslationTrie { values: value_table, index_trie: build(&index_array) }
}

fn try_split(values: &[i64], shift: u32) -> Trie {
    let size = 1usize << shift;
    let mut t1 = Vec::with_capacity((values.len() + size - 1) / size);
    let mut t2: Vec<i64> = Vec::new();
    let mut chunks: HashMap<&[i64], u32> = HashMap::new();

    let mut i = 0;
    while i < values.len() {
        let end = (i + size).min(values.len());
        let chunk = &values[i..end];
        let block_id = *chunks.entry(chunk).or_insert_with(|| {
            let id = (t2.len() >> shift) as u32;
            t2.extend_from_slice(chunk);
            id
        });
        t1.push(block_id);
        i += size;
    }

    Trie { t1, t2, shift, len: values.len() }
}

#[cfg(test)]
mod tests {
    use super::{build, build_translation};

    #[test]
    fn all_zero_array_collapses_to_empty_trie() {
        let trie = build(&[0, 0, 0, 0]);
        assert_eq!(trie.len, 0);
        for cp in 0..8 {
            assert_eq!(trie.lookup(cp), 0);
        }
    }

    #[test]
    fn lookup_reproduces_original_array() {
        let values: Vec<i64> =
            (0..300).map(|i| if i % 7 == 0 { i } else { 0 }).collect();
        let trie = build(&values);
        for (cp, &want) in values.iter().enumerate() {
            assert_eq!(trie.lookup(cp as u32), want);
        }
        assert_eq!(trie.lookup(values.len() as u32 + 10), 0);
    }

    #[test]
    fn deduplicates_repeated_blocks() {
        // A highly repetitive array should produce a much smaller t2 than
        // t1 once a good shift is found.
        let values: Vec<i64> = (0..1024).map(|i| (i % 4) as i64).collect();
        let trie = build(&values);
        assert!(trie.t2.len() < trie.t1.len() * (1 << trie.shift));
        for (cp, &want) in values.iter().enumerate() {
            assert_eq!(trie.lookup(cp as u32), want);
        }
    }

    #[test]
    fn negative_values_round_trip() {
        let mut values = vec![0i64; 200];
        values[65] = 32;
        values[90] = -32; // e.g. an uppercase->lowercase delta
        let trie = build(&values);
        assert_eq!(trie.lookup(65), 32);
        assert_eq!(trie.lookup(90), -32);
        assert_eq!(trie.lookup(199), 0);
    }

    #[test]
    fn chooses_cost_no_worse_than_shift_zero_or_max() {
        let values: Vec<i64> =
            (0..2048).map(|i| if i % 11 == 0 { i / 11 } else { 0 }).collect();
        let trie = build(&values);
        let max_shift = crate::intwidth::bit_length(trie.len as u64);
        let shift0 = super::try_split(&values[..trie.len], 0);
        let shift_max = super::try_split(&values[..trie.len], max_shift);
        assert!(trie.cost() <= shift0.cost());
        assert!(trie.cost() <= shift_max.cost());
    }

    #[test]
    fn translation_trie_dedups_repeated_values() {
        // S5: lowercase_offset(0x41) == 32, lowercase_offset(0x42) == 32,
        // lowercase_offset(0x61) == 0.
        let mut values = vec![0i64; 0x70];
        values[0x41] = 32;
        values[0x42] = 32;
        let tt = build_translation(&values);

        // Both 'A' and 'B' share the delta 32, so they must share one
        // value-table entry rather than each getting their own.
        assert_eq!(tt.values.iter().filter(|&&v| v == 32).count(), 1);
        assert_eq!(tt.lookup(0x41), 32);
        assert_eq!(tt.lookup(0x42), 32);
        assert_eq!(tt.lookup(0x61), 0);
    }

    #[test]
    fn translation_trie_round_trips_every_value() {
        let values: Vec<i64> = (0..500)
            .map(|i| match i % 5 {
                0 => 32,
                1 => -32,
                _ => 0,
            })
            .collect();
        let tt = build_translation(&values);
        for (cp, &want) in values.iter().enumerate() {
            assert_eq!(tt.lookup(cp as u32), want);
        }
    }
}
