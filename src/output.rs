//! Result files.
//!
//! Each query contributes a `>read_<k>` header line followed by its values,
//! space-separated, to one file per output sequence: `.lengths` and
//! `.pointers` for matching statistics, `.pseudo_lengths` for
//! pseudo-matching lengths, and `.doc_numbers` when a document array is
//! loaded.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Streaming writer for one output sequence file.
pub struct SequenceWriter {
    writer: BufWriter<File>,
}

impl SequenceWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create output file {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::with_capacity(65536, file),
        })
    }

    /// Append one record: a header line and its space-separated values.
    pub fn write_record(&mut self, name: &str, values: &[u64]) -> Result<()> {
        writeln!(self.writer, ">{}", name)?;
        for &value in values {
            write!(self.writer, "{} ", value)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
