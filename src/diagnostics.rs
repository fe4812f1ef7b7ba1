//! Table-size diagnostics, written to stderr only.
//!
//! Grounded on the teacher's `eprintln!`-based progress reporting (no
//! `log`/`tracing` dependency is pulled in for this, matching the teacher's
//! own choice not to depend on a logging crate for a one-shot CLI tool).

/// Print one `"{name}: {bytes} bytes"` line per table, then a
/// `"{name}: total: {bytes} bytes"` line.
pub fn report(name: &str, sizes: &[(&str, u64)]) {
    let mut total = 0u64;
    for &(table, bytes) in sizes {
        eprintln!("{}: {}: {} bytes", name, table, bytes);
        total += bytes;
    }
    eprintln!("{}: total: {} bytes", name, total);
}
