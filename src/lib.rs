//! The pipeline stages behind the `ucd-tablegen` binary, exposed as a
//! library mainly so benchmarks can exercise the trie and DUCET packers
//! directly instead of shelling out to the binary.

pub mod app;
pub mod args;
pub mod collation;
pub mod decomposition;
pub mod diagnostics;
pub mod ducet;
pub mod error;
pub mod intwidth;
pub mod seq;
pub mod tables;
pub mod trie;
pub mod writer;
pub mod xref;
