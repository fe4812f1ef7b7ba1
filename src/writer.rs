//! Table serializer.
//!
//! Chooses the narrowest fixed-width integer type that holds every value of
//! a table (delegating to [`crate::intwidth`]), wraps long array literals at
//! a configurable column width, and emits a constant-time accessor routine
//! alongside each two-level trie. Grounded on the teacher's `Writer`/
//! `WriterBuilder`/`LineWriter`, trimmed of the FST/DFA/C emission paths
//! this generator's two output modes never use.

use std::env;
use std::io::{self, Write};

use crate::ducet::DucetTable;
use crate::error::Result;
use crate::intwidth::{bit_length, rust_type};
use crate::trie::{Trie, TranslationTrie};

#[derive(Clone, Debug)]
pub struct WriterBuilder {
    name: String,
    columns: u64,
}

impl WriterBuilder {
    /// Create a new builder. `name` is used only to label the generated
    /// header comment; table names are passed explicitly to each `Writer`
    /// method.
    pub fn new(name: &str) -> WriterBuilder {
        WriterBuilder { name: name.to_string(), columns: 79 }
    }

    pub fn from_writer<W: io::Write + 'static>(&self, wtr: W) -> Writer {
        Writer {
            wtr: LineWriter::new(Box::new(wtr), self.columns as usize),
            wrote_header: false,
            name: self.name.clone(),
        }
    }

    pub fn from_stdout(&self) -> Writer {
        self.from_writer(io::stdout())
    }
}

/// A writer of generated Rust source for the tables this generator emits.
pub struct Writer {
    wtr: LineWriter<Box<dyn io::Write + 'static>>,
    wrote_header: bool,
    name: String,
}

impl Writer {
    /// Write a plain array of `u32` values (used for `xref`, `decomp_seq`
    /// and `comp_seq`, which are narrow 16-bit pools but whose element type
    /// is picked the same way as any other table).
    pub fn u32_slice(&mut self, name: &str, values: &[u32]) -> Result<()> {
        self.header()?;
        self.separator()?;

        let as_i64: Vec<i64> = values.iter().map(|&v| v as i64).collect();
        let ty = rust_type(&as_i64);
        writeln!(self.wtr, "pub const {}: &'static [{}] = &[", name, ty)?;
        for &v in values {
            self.wtr.write_str(&format!("{}, ", v))?;
        }
        writeln!(self.wtr, "];")?;
        self.wtr.flush()?;
        Ok(())
    }

    /// Write a plain array of `u16` values.
    pub fn u16_slice(&mut self, name: &str, values: &[u16]) -> Result<()> {
        let widened: Vec<u32> = values.iter().map(|&v| v as u32).collect();
        self.u32_slice(name, &widened)
    }

    /// Write a two-level trie as `{name}_t1`/`{name}_{t2_suffix}` plus a
    /// constant-time accessor function named `name`, per spec §4.3/§4.5:
    /// the accessor encodes the retained length, the shift and the two
    /// table names, returns 0 out of range, and performs exactly two table
    /// loads plus a bounds check.
    pub fn trie(
        &mut self,
        name: &str,
        t2_suffix: &str,
        trie: &Trie,
    ) -> Result<()> {
        self.header()?;
        self.separator()?;

        let upper = name.to_ascii_uppercase();
        let t1_name = format!("{}_T1", upper);
        let t2_name = format!("{}_{}", upper, t2_suffix.to_ascii_uppercase());

        let t1_as_i64: Vec<i64> = trie.t1.iter().map(|&x| x as i64).collect();
        let t1_ty = rust_type(&t1_as_i64);
        let t2_ty = rust_type(&trie.t2);

        writeln!(self.wtr, "pub const {}: &'static [{}] = &[", t1_name, t1_ty)?;
        for &v in &trie.t1 {
            self.wtr.write_str(&format!("{}, ", v))?;
        }
        writeln!(self.wtr, "];")?;
        self.separator()?;

        writeln!(self.wtr, "pub const {}: &'static [{}] = &[", t2_name, t2_ty)?;
        for &v in &trie.t2 {
            self.wtr.write_str(&format!("{}, ", v))?;
        }
        writeln!(self.wtr, "];")?;
        self.separator()?;

        writeln!(self.wtr, "pub const {}_LEN: usize = {};", upper, trie.len)?;
        writeln!(self.wtr, "pub const {}_SHIFT: u32 = {};", upper, trie.shift)?;
        self.separator()?;

        writeln!(self.wtr, "/// Returns 0 for any codepoint at or beyond")?;
        writeln!(self.wtr, "/// `{}_LEN`.", upper)?;
        writeln!(self.wtr, "pub fn {}(cp: u32) -> {} {{", name, t2_ty)?;
        writeln!(self.wtr, "    if cp as usize >= {}_LEN {{", upper)?;
        writeln!(self.wtr, "        return 0;")?;
        writeln!(self.wtr, "    }}")?;
        writeln!(
            self.wtr,
            "    let mask: u32 = (1 << {}_SHIFT) - 1;",
            upper
        )?;
        writeln!(
            self.wtr,
            "    let block = {}[(cp >> {}_SHIFT) as usize] as u32;",
            t1_name, upper
        )?;
        writeln!(
            self.wtr,
            "    {}[((block << {}_SHIFT) | (cp & mask)) as usize]",
            t2_name, upper
        )?;
        writeln!(self.wtr, "}}")?;

        self.wtr.flush()?;
        Ok(())
    }

    /// Write a translation trie as `{name}_values`/`{name}_t1`/`{name}_t2`
    /// plus a constant-time three-step accessor function named `name`, per
    /// spec §4.5's "Negative values" note and grounded on
    /// `make_translation_map`: the accessor encodes the retained length,
    /// shift and the three table names, and resolves `t1` -> `t2` ->
    /// `values[offset_index]` rather than `t1` -> `t2` directly.
    pub fn translation_trie(
        &mut self,
        name: &str,
        tt: &TranslationTrie,
    ) -> Result<()> {
        self.header()?;
        self.separator()?;

        let upper = name.to_ascii_uppercase();
        let values_name = format!("{}_VALUES", upper);
        let t1_name = format!("{}_T1", upper);
        let t2_name = format!("{}_T2", upper);

        let values_ty = rust_type(&tt.values);
        let t1_as_i64: Vec<i64> =
            tt.index_trie.t1.iter().map(|&x| x as i64).collect();
        let t1_ty = rust_type(&t1_as_i64);
        let t2_ty = rust_type(&tt.index_trie.t2);

        writeln!(
            self.wtr,
            "pub const {}: &'static [{}] = &[",
            values_name, values_ty
        )?;
        for &v in &tt.values {
            self.wtr.write_str(&format!("{}, ", v))?;
        }
        writeln!(self.wtr, "];")?;
        self.separator()?;

        writeln!(self.wtr, "pub const {}: &'static [{}] = &[", t1_name, t1_ty)?;
        for &v in &tt.index_trie.t1 {
            self.wtr.write_str(&format!("{}, ", v))?;
        }
        writeln!(self.wtr, "];")?;
        self.separator()?;

        writeln!(self.wtr, "pub const {}: &'static [{}] = &[", t2_name, t2_ty)?;
        for &v in &tt.index_trie.t2 {
            self.wtr.write_str(&format!("{}, ", v))?;
        }
        writeln!(self.wtr, "];")?;
        self.separator()?;

        writeln!(
            self.wtr,
            "pub const {}_LEN: usize = {};",
            upper, tt.index_trie.len
        )?;
        writeln!(
            self.wtr,
            "pub const {}_SHIFT: u32 = {};",
            upper, tt.index_trie.shift
        )?;
        self.separator()?;

        writeln!(self.wtr, "/// Returns 0 for any codepoint at or beyond")?;
        writeln!(self.wtr, "/// `{}_LEN`.", upper)?;
        writeln!(self.wtr, "pub fn {}(cp: u32) -> {} {{", name, values_ty)?;
        writeln!(self.wtr, "    if cp as usize >= {}_LEN {{", upper)?;
        writeln!(self.wtr, "        return 0;")?;
        writeln!(self.wtr, "    }}")?;
        writeln!(
            self.wtr,
            "    let mask: u32 = (1 << {}_SHIFT) - 1;",
            upper
        )?;
        writeln!(
            self.wtr,
            "    let block = {}[(cp >> {}_SHIFT) as usize] as u32;",
            t1_name, upper
        )?;
        writeln!(
            self.wtr,
            "    let offset_index = {}[((block << {}_SHIFT) | (cp & mask)) \
                as usize] as usize;",
            t2_name, upper
        )?;
        writeln!(self.wtr, "    {}[offset_index]", values_name)?;
        writeln!(self.wtr, "}}")?;

        self.wtr.flush()?;
        Ok(())
    }

    /// Write the DUCET hash table (`ducet_data`, `ducet_bucket_indexes`),
    /// its compile-time constants, and a `ducet_lookup` accessor that scans
    /// a bucket the same way [`crate::ducet::lookup`] does, per spec §4.4.
    pub fn ducet(&mut self, table: &DucetTable) -> Result<()> {
        self.header()?;
        self.separator()?;

        writeln!(
            self.wtr,
            "pub const DUCET_HASH_BUCKETS: u32 = {};",
            table.buckets
        )?;
        writeln!(
            self.wtr,
            "pub const DUCET_HASH_MULTIPLIER: u64 = {};",
            table.hash_multiplier
        )?;
        writeln!(
            self.wtr,
            "pub const DUCET_LONGEST_KEY: u32 = {};",
            table.longest_key
        )?;
        writeln!(self.wtr, "pub const DUCET_KEY_BITS: u32 = {};", table.key_bits)?;
        writeln!(
            self.wtr,
            "pub const DUCET_VALUE_BITS: u32 = {};",
            table.value_bits
        )?;
        writeln!(
            self.wtr,
            "pub const DUCET_DATA_HIGH_BIT: u32 = {};",
            table.data_high_bit
        )?;
        self.separator()?;

        writeln!(
            self.wtr,
            "// bucket collision histogram (bucket size -> count of \
             buckets with that size): {:?}",
            table.collision_histogram
        )?;
        writeln!(self.wtr, "pub const DUCET_DATA: &'static [u32] = &[")?;
        for &v in &table.data {
            self.wtr.write_str(&format!("{}, ", v))?;
        }
        writeln!(self.wtr, "];")?;
        self.separator()?;

        writeln!(
            self.wtr,
            "pub const DUCET_BUCKET_INDEXES: &'static [u32] = &["
        )?;
        for &v in &table.bucket_indexes {
            self.wtr.write_str(&format!("{}, ", v))?;
        }
        writeln!(self.wtr, "];")?;
        self.separator()?;

        writeln!(self.wtr, "/// Hash a codepoint-sequence key the same way")?;
        writeln!(self.wtr, "/// the builder did when it bucketed entries.")?;
        writeln!(self.wtr, "pub fn ducet_hash(key: &[u32]) -> u32 {{")?;
        writeln!(self.wtr, "    let mut h: u64 = 0;")?;
        writeln!(self.wtr, "    for &cp in key {{")?;
        writeln!(
            self.wtr,
            "        h = (h * DUCET_HASH_MULTIPLIER + cp as u64) % \
                DUCET_HASH_BUCKETS as u64;"
        )?;
        writeln!(self.wtr, "    }}")?;
        writeln!(self.wtr, "    h as u32")?;
        writeln!(self.wtr, "}}")?;
        self.separator()?;

        writeln!(
            self.wtr,
            "/// Scan the bucket containing `key`, returning its level-1"
        )?;
        writeln!(
            self.wtr,
            "/// weights if present. Never panics: absent keys return"
        )?;
        writeln!(self.wtr, "/// `None`.")?;
        writeln!(
            self.wtr,
            "pub fn ducet_lookup(key: &[u32]) -> Option<Vec<u32>> {{"
        )?;
        writeln!(self.wtr, "    let bucket = ducet_hash(key) as usize;")?;
        writeln!(
            self.wtr,
            "    let mut i = DUCET_BUCKET_INDEXES[bucket] as usize;"
        )?;
        writeln!(self.wtr, "    if i >= DUCET_DATA.len() {{")?;
        writeln!(self.wtr, "        return None;")?;
        writeln!(self.wtr, "    }}")?;
        writeln!(self.wtr, "    loop {{")?;
        writeln!(self.wtr, "        let header = DUCET_DATA[i];")?;
        writeln!(
            self.wtr,
            "        let end = header & (1 << DUCET_DATA_HIGH_BIT) != 0;"
        )?;
        writeln!(
            self.wtr,
            "        let klen = ((header >> (DUCET_DATA_HIGH_BIT - \
                DUCET_KEY_BITS)) & ((1 << DUCET_KEY_BITS) - 1)) as usize;"
        )?;
        writeln!(
            self.wtr,
            "        let vlen = ((header >> (DUCET_DATA_HIGH_BIT - \
                DUCET_KEY_BITS - DUCET_VALUE_BITS)) \
                & ((1 << DUCET_VALUE_BITS) - 1)) as usize;"
        )?;
        writeln!(self.wtr, "        let first_cp = header & ((1 << 21) - 1);")?;
        writeln!(self.wtr, "        let mut record_key = vec![first_cp];")?;
        writeln!(
            self.wtr,
            "        record_key.extend_from_slice(&DUCET_DATA[i + 1..i + klen]);"
        )?;
        writeln!(self.wtr, "        if record_key == key {{")?;
        writeln!(
            self.wtr,
            "            return Some(DUCET_DATA[i + klen..i + klen + vlen].to_vec());"
        )?;
        writeln!(self.wtr, "        }}")?;
        writeln!(self.wtr, "        if end {{")?;
        writeln!(self.wtr, "            return None;")?;
        writeln!(self.wtr, "        }}")?;
        writeln!(self.wtr, "        i += klen + vlen;")?;
        writeln!(self.wtr, "    }}")?;
        writeln!(self.wtr, "}}")?;

        self.wtr.flush()?;
        Ok(())
    }

    fn header(&mut self) -> Result<()> {
        if self.wrote_header {
            return Ok(());
        }
        self.wrote_header = true;

        let mut argv = vec![];
        argv.push(
            env::current_exe()?
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.name.clone()),
        );
        for arg in env::args_os().skip(1) {
            let x = arg.to_string_lossy();
            if x.contains('\n') {
                argv.push("[snip (arg too long)]".to_string());
            } else {
                argv.push(x.into_owned());
            }
        }

        writeln!(
            self.wtr,
            "/* DO NOT EDIT THIS FILE. \
               IT WAS AUTOMATICALLY GENERATED BY:"
        )?;
        writeln!(self.wtr, " *")?;
        writeln!(self.wtr, " *  {}", argv.join(" "))?;
        writeln!(self.wtr, " *")?;
        writeln!(self.wtr, " * ucd-tablegen is not meant to be run by hand.")?;
        writeln!(self.wtr, " */")?;
        Ok(())
    }

    fn separator(&mut self) -> Result<()> {
        write!(self.wtr, "\n")?;
        Ok(())
    }
}

/// The number of bits a trie's shift parameter needs, exposed for callers
/// that want to sanity check a trie before serializing it.
pub fn max_shift_for_len(len: usize) -> u32 {
    bit_length(len as u64)
}

#[derive(Debug)]
struct LineWriter<W> {
    wtr: W,
    line: String,
    columns: usize,
}

impl<W: io::Write> LineWriter<W> {
    fn new(wtr: W, columns: usize) -> LineWriter<W> {
        LineWriter { wtr, line: String::new(), columns }
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        if self.line.len() + s.len() > self.columns {
            self.flush_line()?;
        }
        if self.line.is_empty() {
            self.line.push_str("    ");
        }
        self.line.push_str(s);
        Ok(())
    }

    fn flush_line(&mut self) -> io::Result<()> {
        if self.line.is_empty() {
            return Ok(());
        }
        self.wtr.write_all(self.line.trim_end().as_bytes())?;
        self.wtr.write_all(b"\n")?;
        self.line.clear();
        Ok(())
    }
}

impl<W: io::Write> io::Write for LineWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.flush_line()?;
        self.wtr.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_line()?;
        self.wtr.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::{WriterBuilder};
    use crate::ducet;
    use crate::trie::{self, Trie};
    use std::collections::BTreeMap;

    #[test]
    fn ducet_emits_collision_histogram_comment() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u32], vec![10u32]);
        map.insert(vec![2u32], vec![20u32]);
        let table = ducet::build(&map).unwrap();

        let mut buf = Vec::new();
        {
            let mut wtr = WriterBuilder::new("test").from_writer(&mut buf);
            wtr.ducet(&table).unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("bucket collision histogram"));
    }

    #[test]
    fn translation_trie_emits_values_table_and_three_step_accessor() {
        let mut buf = Vec::new();
        {
            let mut wtr = WriterBuilder::new("test").from_writer(&mut buf);
            let mut values = vec![0i64; 0x70];
            values[0x41] = 32;
            values[0x42] = 32;
            let tt = trie::build_translation(&values);
            wtr.translation_trie("lowercase_offset", &tt).unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("pub const LOWERCASE_OFFSET_VALUES"));
        assert!(out.contains("pub const LOWERCASE_OFFSET_T1"));
        assert!(out.contains("pub const LOWERCASE_OFFSET_T2"));
        assert!(out.contains("let offset_index ="));
        assert!(out.contains("LOWERCASE_OFFSET_VALUES[offset_index]"));
    }

    #[test]
    fn trie_emits_accessor_and_both_tables() {
        let mut buf = Vec::new();
        {
            let mut wtr = WriterBuilder::new("test").from_writer(&mut buf);
            let trie = Trie { t1: vec![0, 1], t2: vec![10, 20, -5, 0], shift: 1, len: 4 };
            wtr.trie("ccc", "t2", &trie).unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("pub const CCC_T1"));
        assert!(out.contains("pub const CCC_T2"));
        assert!(out.contains("pub fn ccc(cp: u32)"));
        assert!(out.contains("CCC_LEN: usize = 4"));
    }

    #[test]
    fn header_is_written_exactly_once() {
        let mut buf = Vec::new();
        {
            let mut wtr = WriterBuilder::new("test").from_writer(&mut buf);
            wtr.u32_slice("A", &[1, 2, 3]).unwrap();
            wtr.u32_slice("B", &[4, 5, 6]).unwrap();
        }
        let out = String::from_utf8(buf).unwrap();
        assert_eq!(out.matches("DO NOT EDIT").count(), 1);
    }
}
