//! Document array over BWT runs.
//!
//! When the reference is a collection, the builder records for every run
//! the document id of the text position sampled at its first and last BWT
//! position. The query engines thread the current document id through the
//! backward walk and emit it alongside lengths and pointers.

use crate::utils::encoding::{read_u32_le, read_u64_le, write_u32_le, write_u64_le};
use crate::utils::int_vec::IntVector;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic number for document array files ("MSXD" in little-endian)
pub const DOC_MAGIC: u32 = 0x4458_534D;

/// Current version of the document array format
pub const DOC_VERSION: u32 = 1;

/// Per-run document ids at run boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentArray {
    num_docs: u64,
    start_runs_doc: IntVector,
    end_runs_doc: IntVector,
}

impl DocumentArray {
    /// Build from explicit per-run ids (used by the builder pipeline).
    pub fn from_values(start: &[u64], end: &[u64], num_docs: u64) -> Self {
        let max_id = num_docs.saturating_sub(1);
        Self {
            num_docs,
            start_runs_doc: IntVector::from_values(start, max_id),
            end_runs_doc: IntVector::from_values(end, max_id),
        }
    }

    /// Document id at the first BWT position of run `k`.
    #[inline]
    pub fn start_doc(&self, k: u64) -> u64 {
        self.start_runs_doc.get(k as usize)
    }

    /// Document id at the last BWT position of run `k`.
    #[inline]
    pub fn end_doc(&self, k: u64) -> u64 {
        self.end_runs_doc.get(k as usize)
    }

    pub fn num_docs(&self) -> u64 {
        self.num_docs
    }

    pub fn len(&self) -> u64 {
        self.start_runs_doc.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.start_runs_doc.is_empty()
    }

    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_u32_le(writer, DOC_MAGIC)?;
        write_u32_le(writer, DOC_VERSION)?;
        write_u64_le(writer, self.len())?;
        write_u64_le(writer, self.num_docs)?;
        self.start_runs_doc.serialize(writer)?;
        self.end_runs_doc.serialize(writer)?;
        Ok(())
    }

    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = read_u32_le(reader)?;
        if magic != DOC_MAGIC {
            bail!("document array has bad magic number {:#010x}", magic);
        }
        let version = read_u32_le(reader)?;
        if version != DOC_VERSION {
            bail!("unsupported document array version {}", version);
        }
        let len = read_u64_le(reader)?;
        let num_docs = read_u64_le(reader)?;

        let start_runs_doc = IntVector::load(reader)?;
        let end_runs_doc = IntVector::load(reader)?;
        if start_runs_doc.len() as u64 != len || end_runs_doc.len() as u64 != len {
            bail!(
                "document array header promises {} runs but vectors hold {} and {}",
                len,
                start_runs_doc.len(),
                end_runs_doc.len()
            );
        }
        Ok(Self {
            num_docs,
            start_runs_doc,
            end_runs_doc,
        })
    }

    /// Load `<ref>.doc` and check it against the run count of the index.
    pub fn load_file(path: &Path, r: u64) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open document array {}", path.display()))?;
        let arr = Self::load(&mut BufReader::new(file))
            .with_context(|| format!("failed to parse document array {}", path.display()))?;
        if arr.len() != r {
            bail!(
                "document array {} covers {} runs but the BWT has {}",
                path.display(),
                arr.len(),
                r
            );
        }
        Ok(arr)
    }

    /// Write `<ref>.doc`.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.serialize(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
