//! # MSX - Matching Statistics over a Run-Length FM-Index
//!
//! MSX computes matching statistics (MS) and pseudo-matching lengths (PML)
//! for query sequences against a fixed reference collection, using an
//! r-index (run-length compressed FM-index) augmented with one threshold
//! per BWT run. Index artifacts are produced by an external build
//! pipeline; MSX assembles them, persists a self-contained archive, and
//! answers queries from it.
//!
//! ## Architecture
//!
//! - [`index`] - The run-length BWT, F-table, samples, thresholds,
//!   document array, random-access text, and archive serialization
//! - [`query`] - The MS/PML backward-search engine
//! - [`output`] - Per-read result files
//! - [`utils`] - Bit-packed vectors and little-endian codecs
//!
//! ## Quick Start
//!
//! ```ignore
//! use msx::index::{load_index, load_text, Mode};
//! use msx::query::QueryEngine;
//! use std::path::Path;
//!
//! let prefix = Path::new("/data/refs/chr21");
//! let index = load_index(prefix, Mode::Ms)?;
//! let text = load_text(prefix)?;
//!
//! let engine = QueryEngine::new(&index);
//! let out = engine.matching_statistics(b"GATTACA", &text);
//! println!("{:?} {:?}", out.lengths, out.pointers);
//! ```
//!
//! ## Query model
//!
//! A loaded index is immutable and `Sync`: queries across reads are
//! embarrassingly parallel, and each query is one pass of the
//! backward-search loop costing at most two rank/select calls plus one
//! threshold lookup per mismatching character. The engines themselves
//! never fail; all error handling lives at the load boundary.

pub mod index;
pub mod output;
pub mod query;
pub mod utils;
