//! Archive loading.
//!
//! The serialized index is read back in the same fixed order it was
//! written, after which the run count and all derived tables come from the
//! BWT itself. The document array and the random-access text live in
//! separate files and are pulled in on demand.

use crate::index::doc_array::DocumentArray;
use crate::index::text::SlpText;
use crate::index::types::{Index, IndexMeta, Mode};
use crate::index::writer::{archive_path, meta_path, with_suffix};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load the serialized archive for a reference and mode.
pub fn load_index(ref_prefix: &Path, mode: Mode) -> Result<Index> {
    let path = archive_path(ref_prefix, mode);
    let file = File::open(&path)
        .with_context(|| format!("failed to open index archive {}", path.display()))?;
    Index::deserialize(&mut BufReader::with_capacity(65536, file), mode)
        .with_context(|| format!("failed to load index archive {}", path.display()))
}

/// Load `<ref>.doc`, validated against the index's run count.
pub fn load_document_array(ref_prefix: &Path, index: &Index) -> Result<DocumentArray> {
    DocumentArray::load_file(&with_suffix(ref_prefix, ".doc"), index.num_runs())
}

/// Load `<ref>.slp`, the grammar-compressed reference text.
pub fn load_text(ref_prefix: &Path) -> Result<SlpText> {
    SlpText::load_file(&with_suffix(ref_prefix, ".slp"))
}

/// Read the JSON metadata written next to an archive.
pub fn load_meta(ref_prefix: &Path, mode: Mode) -> Result<IndexMeta> {
    let path = meta_path(ref_prefix, mode);
    let file = File::open(&path)
        .with_context(|| format!("failed to open index metadata {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse index metadata {}", path.display()))
}
