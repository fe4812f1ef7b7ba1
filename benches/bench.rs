#![feature(test)]

extern crate test;

use std::collections::BTreeMap;

use test::Bencher;
use ucd_tablegen::ducet;
use ucd_tablegen::trie;

/// A combining-class-shaped array: mostly zero, nonzero only in the
/// sparse ranges combining marks actually occupy.
fn ccc_like_values() -> Vec<i64> {
    let mut values = vec![0i64; 0x110000];
    for cp in 0x0300..0x036Fu32 {
        values[cp as usize] = ((cp - 0x0300) % 240 + 1) as i64;
    }
    for cp in 0x1DC0..0x1DFFu32 {
        values[cp as usize] = ((cp - 0x1DC0) % 240 + 1) as i64;
    }
    values
}

#[bench]
fn trie_build_combining_class(b: &mut Bencher) {
    let values = ccc_like_values();
    b.iter(|| trie::build(&values));
}

#[bench]
fn trie_lookup(b: &mut Bencher) {
    let values = ccc_like_values();
    let t = trie::build(&values);
    let mut cp = 0u32;
    b.iter(|| {
        cp = (cp + 1) % 0x110000;
        t.lookup(cp)
    });
}

fn small_ducet_map() -> BTreeMap<Vec<u32>, Vec<u32>> {
    let mut map = BTreeMap::new();
    for cp in 0x0041..0x024Fu32 {
        map.insert(vec![cp], vec![0x1000 + (cp - 0x0041)]);
    }
    map.insert(vec![0x0041, 0x0301], vec![0x1000, 0x0043]);
    map
}

#[bench]
fn ducet_build(b: &mut Bencher) {
    let map = small_ducet_map();
    b.iter(|| ducet::build(&map).unwrap());
}

#[bench]
fn ducet_lookup_hit(b: &mut Bencher) {
    let map = small_ducet_map();
    let table = ducet::build(&map).unwrap();
    let mut cp = 0x0041u32;
    b.iter(|| {
        cp = 0x0041 + (cp - 0x0041 + 1) % (0x024F - 0x0041);
        ducet::lookup(&table, &[cp])
    });
}

#[bench]
fn ducet_lookup_miss(b: &mut Bencher) {
    let map = small_ducet_map();
    let table = ducet::build(&map).unwrap();
    b.iter(|| ducet::lookup(&table, &[0xFFFF]));
}
