//! Index structures and their persistence.
//!
//! This module provides the loaded form of the query index:
//!
//! - [`rlbwt`] - Run-length BWT with rank/select support
//! - [`f_table`] - F-table construction and the LF mapping
//! - [`samples`] - Suffix-array samples at run boundaries (MS only)
//! - [`thresholds`] - Per-run thresholds for mismatch snapping
//! - [`doc_array`] - Optional per-run document ids
//! - [`text`] - Random access to the reference text
//! - [`types`] - The assembled [`Index`] and its serialization
//! - [`writer`] - Assembly from builder artifacts, archive writing
//! - [`reader`] - Archive loading
//!
//! ## File layout
//!
//! Consumed builder artifacts, relative to a reference prefix:
//!
//! ```text
//! <ref>.bwt            # plain BWT stream, or:
//! <ref>.bwt.heads      # one byte per run
//! <ref>.bwt.len        # 5-byte LE length per run
//! <ref>.ssa, <ref>.esa # suffix-array samples, 5-byte LE pairs
//! <ref>.thrbv          # thresholds, 5-byte LE per run
//! <ref>.slp            # grammar-compressed text (MS queries)
//! <ref>.doc            # document array (optional)
//! ```
//!
//! Produced: `<ref>.thrbv.ms` / `<ref>.thrbv.pml` (the archive) and a
//! sibling `.meta.json`.

pub mod doc_array;
pub mod f_table;
pub mod reader;
pub mod rlbwt;
pub mod samples;
pub mod text;
pub mod thresholds;
pub mod types;
pub mod writer;

// Re-exports for the public API
pub use doc_array::DocumentArray;
pub use reader::{load_document_array, load_index, load_meta, load_text};
pub use rlbwt::RunLengthBwt;
pub use samples::SampleArray;
pub use text::{CharAccess, SlpText};
pub use thresholds::Thresholds;
pub use types::{Index, IndexMeta, Mode, TERMINATOR};
pub use writer::{build_index, with_suffix, write_archive};
