//! DUCET level-1 hash table builder.
//!
//! Packs a map from codepoint-sequence keys to 16-bit weight sequences into
//! one flat array of variable-length records with in-band end-of-bucket
//! markers, plus a bucket-index array. Grounded on `preprocess.py`'s
//! `make_collation_element_table`; the bit layout and hash function are
//! unchanged from it.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::intwidth::bit_length;

pub const HASH_MULTIPLIER: u64 = 1031;
pub const DATA_HIGH_BIT: u32 = 31;

/// A built DUCET level-1 hash table, ready for serialization.
pub struct DucetTable {
    pub data: Vec<u32>,
    pub bucket_indexes: Vec<u32>,
    pub buckets: u32,
    pub hash_multiplier: u64,
    pub longest_key: u32,
    pub key_bits: u32,
    pub value_bits: u32,
    pub data_high_bit: u32,
    /// Number of buckets holding exactly N records, keyed by N. Diagnostic
    /// only; the builder doesn't tune based on it.
    pub collision_histogram: BTreeMap<usize, usize>,
}

/// Hash a codepoint sequence into a bucket index, using the same function
/// the runtime must use to locate it again.
pub fn hash(key: &[u32], buckets: u32) -> u32 {
    let mut h: u64 = 0;
    for &cp in key {
        h = (h * HASH_MULTIPLIER + cp as u64) % buckets as u64;
    }
    h as u32
}

/// Build the hash table from a map of codepoint-sequence keys to level-1
/// weight sequences. `map` must be nonempty.
pub fn build(map: &BTreeMap<Vec<u32>, Vec<u32>>) -> Result<DucetTable> {
    if map.is_empty() {
        return Err(Error::Invariant(
            "DUCET map must contain at least one entry".to_string(),
        ));
    }

    let longest_key =
        map.keys().map(|k| k.len()).max().expect("map is nonempty") as u32;
    let longest_value = map
        .values()
        .map(|v| v.len())
        .max()
        .expect("map is nonempty") as u32;
    let key_bits = bit_length(longest_key as u64);
    let value_bits = bit_length(longest_value as u64);
    if key_bits + value_bits > DATA_HIGH_BIT - 21 {
        return Err(Error::Invariant(format!(
            "DUCET key/value length budget exceeded: {} + {} > {}",
            key_bits,
            value_bits,
            DATA_HIGH_BIT - 21
        )));
    }

    let buckets = map.len() as u32;

    // Bucket every key, in ascending (bucket, key) order so output is
    // deterministic: entries within a bucket are already visited in
    // ascending key order since `map` is a BTreeMap.
    let mut bucket_to_records: BTreeMap<u32, Vec<Vec<u32>>> = BTreeMap::new();
    for (key, value) in map {
        let header = ((key.len() as u32) << (DATA_HIGH_BIT - key_bits))
            | ((value.len() as u32)
                << (DATA_HIGH_BIT - key_bits - value_bits));
        let mut record = Vec::with_capacity(key.len() + value.len());
        record.push(header | key[0]);
        record.extend(key[1..].iter().copied());
        record.extend(value.iter().copied());
        bucket_to_records.entry(hash(key, buckets)).or_default().push(record);
    }

    let mut data_array_len = 0usize;
    for records in bucket_to_records.values() {
        for r in records {
            data_array_len += r.len();
        }
    }

    let mut data = Vec::with_capacity(data_array_len);
    let mut bucket_indexes = Vec::with_capacity(buckets as usize);
    let mut collision_histogram = BTreeMap::new();

    for b in 0..buckets {
        match bucket_to_records.get(&b) {
            None => {
                bucket_indexes.push(data_array_len as u32);
            }
            Some(records) => {
                bucket_indexes.push(data.len() as u32);
                *collision_histogram.entry(records.len()).or_insert(0) += 1;
                let last = records.len() - 1;
                for (i, record) in records.iter().enumerate() {
                    let mut record = record.clone();
                    if i == last {
                        record[0] |= 1 << DATA_HIGH_BIT;
                    }
                    data.extend(record);
                }
            }
        }
    }

    Ok(DucetTable {
        data,
        bucket_indexes,
        buckets,
        hash_multiplier: HASH_MULTIPLIER,
        longest_key,
        key_bits,
        value_bits,
        data_high_bit: DATA_HIGH_BIT,
        collision_histogram,
    })
}

/// Scan the bucket containing `key` in a serialized table, returning the
/// matching value if present. Used by tests to validate the builder's
/// output the same way the runtime would read it.
pub fn lookup(table: &DucetTable, key: &[u32]) -> Option<Vec<u32>> {
    let bucket = hash(key, table.buckets);
    let mut i = table.bucket_indexes[bucket as usize] as usize;
    if i >= table.data.len() {
        return None;
    }
    loop {
        let header = table.data[i];
        let end_of_bucket = header & (1 << table.data_high_bit) != 0;
        let klen = ((header >> (table.data_high_bit - table.key_bits))
            & ((1 << table.key_bits) - 1)) as usize;
        let vlen = ((header
            >> (table.data_high_bit - table.key_bits - table.value_bits))
            & ((1 << table.value_bits) - 1)) as usize;
        let first_cp = header & ((1 << 21) - 1);

        let mut record_key = vec![first_cp];
        record_key.extend(table.data[i + 1..i + klen].iter().copied());
        let value = table.data[i + klen..i + klen + vlen].to_vec();

        if record_key == key {
            return Some(value);
        }
        if end_of_bucket {
            return None;
        }
        i += klen + vlen;
    }
}

#[cfg(test)]
mod tests {
    use super::{build, lookup};
    use std::collections::BTreeMap;

    fn map(entries: &[(&[u32], &[u32])]) -> BTreeMap<Vec<u32>, Vec<u32>> {
        entries
            .iter()
            .map(|&(k, v)| (k.to_vec(), v.to_vec()))
            .collect()
    }

    #[test]
    fn round_trips_every_key() {
        let m = map(&[
            (&[0x0061], &[0x15A0]),
            (&[0x0062], &[0x15A4]),
            (&[0x0041, 0x0301], &[0x15A0, 0x0043]),
            (&[0x0021], &[]),
        ]);
        let table = build(&m).unwrap();
        for (k, v) in &m {
            assert_eq!(lookup(&table, k).as_ref(), Some(v));
        }
        assert_eq!(lookup(&table, &[0x1234]), None);
    }

    #[test]
    fn every_bucket_ends_with_exactly_one_terminator() {
        let m = map(&[
            (&[1], &[10]),
            (&[2], &[20]),
            (&[3], &[30]),
            (&[4], &[]),
            (&[5], &[50, 51]),
        ]);
        let table = build(&m).unwrap();
        assert!(table.bucket_indexes.windows(2).all(|w| w[0] <= w[1]));

        // Walk every nonempty bucket and count end-of-bucket flags.
        for b in 0..table.buckets {
            let start = table.bucket_indexes[b as usize] as usize;
            if start >= table.data.len() {
                continue;
            }
            let mut i = start;
            let mut terminators = 0;
            loop {
                let header = table.data[i];
                let klen = ((header
                    >> (table.data_high_bit - table.key_bits))
                    & ((1 << table.key_bits) - 1)) as usize;
                let vlen = ((header
                    >> (table.data_high_bit
                        - table.key_bits
                        - table.value_bits))
                    & ((1 << table.value_bits) - 1)) as usize;
                let end = header & (1 << table.data_high_bit) != 0;
                if end {
                    terminators += 1;
                    break;
                }
                i += klen + vlen;
            }
            assert_eq!(terminators, 1);
        }
    }

    #[test]
    fn rejects_empty_map() {
        assert!(build(&BTreeMap::new()).is_err());
    }
}
