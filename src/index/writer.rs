//! Index construction from builder artifacts and archive writing.
//!
//! The heavy lifting (BWT, suffix-array samples, thresholds, grammar) is
//! done by an external pipeline; this module only assembles its output
//! files into an [`Index`] and persists the self-contained archive.

use crate::index::samples::SampleArray;
use crate::index::thresholds::{Thresholds, THRESHOLDS_EXT};
use crate::index::types::{Index, Mode};
use crate::index::rlbwt::RunLengthBwt;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append a suffix to a reference prefix path (`/data/ref` + `.ssa`).
pub fn with_suffix(ref_prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(ref_prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Path of the serialized archive for a reference and mode.
pub fn archive_path(ref_prefix: &Path, mode: Mode) -> PathBuf {
    with_suffix(ref_prefix, &mode.archive_extension())
}

/// Path of the JSON metadata written next to the archive.
pub fn meta_path(ref_prefix: &Path, mode: Mode) -> PathBuf {
    let mut path = archive_path(ref_prefix, mode);
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".meta.json");
    path.set_file_name(name);
    path
}

/// Load the BWT for a reference, preferring the run files over the plain
/// stream. Both paths yield the same transform and F-table.
fn load_bwt(ref_prefix: &Path) -> Result<RunLengthBwt> {
    let heads_path = with_suffix(ref_prefix, ".bwt.heads");
    let lens_path = with_suffix(ref_prefix, ".bwt.len");
    if heads_path.exists() && lens_path.exists() {
        RunLengthBwt::load_run_files(&heads_path, &lens_path)
    } else {
        RunLengthBwt::load_plain(&with_suffix(ref_prefix, ".bwt"))
    }
}

/// Assemble an index from the builder artifacts under `<ref_prefix>`.
pub fn build_index(ref_prefix: &Path, mode: Mode) -> Result<Index> {
    let bwt = load_bwt(ref_prefix)?;
    let r = bwt.number_of_runs();
    let n = bwt.size();

    let thresholds =
        Thresholds::load_artifact(&with_suffix(ref_prefix, THRESHOLDS_EXT), r, n)?;

    let (samples_start, samples_last) = match mode {
        Mode::Ms => {
            let start =
                SampleArray::load_boundary_file(&with_suffix(ref_prefix, ".ssa"), r, n)?;
            let last =
                SampleArray::load_boundary_file(&with_suffix(ref_prefix, ".esa"), r, n)?;
            (Some(start), Some(last))
        }
        Mode::Pml => (None, None),
    };

    Index::from_parts(mode, bwt, thresholds, samples_start, samples_last)
}

/// Serialize an index to its archive and write the sibling metadata file.
///
/// Returns the archive path.
pub fn write_archive(index: &Index, ref_prefix: &Path) -> Result<PathBuf> {
    let path = archive_path(ref_prefix, index.mode());
    let mut writer = BufWriter::with_capacity(
        65536,
        File::create(&path)
            .with_context(|| format!("failed to create index archive {}", path.display()))?,
    );
    index.serialize(&mut writer)?;
    writer.flush()?;

    let meta_file = File::create(meta_path(ref_prefix, index.mode()))?;
    serde_json::to_writer_pretty(meta_file, &index.meta())?;
    Ok(path)
}
