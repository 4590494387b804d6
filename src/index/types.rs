//! Core index types.
//!
//! An [`Index`] is the self-contained structure backward search runs over:
//! the run-length BWT, the F-table, the terminator position, the per-run
//! thresholds and, for matching statistics, the two suffix-array sample
//! arrays. It is assembled once (from builder artifacts or a serialized
//! archive), validated, and then serves queries read-only.

use crate::index::f_table::{build_f, validate_f, FTable};
use crate::index::rlbwt::RunLengthBwt;
use crate::index::samples::SampleArray;
use crate::index::thresholds::{Thresholds, THRESHOLDS_EXT};
use crate::utils::encoding::{read_u64_le, write_u64_le, CountingWriter};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// The reserved terminator byte: the smallest symbol, unique in the text.
/// Every byte at or below it is treated as the terminator.
pub const TERMINATOR: u8 = 1;

/// Which statistic an index supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Matching statistics: lengths plus reference pointers. Needs the
    /// suffix-array samples and the random-access text.
    Ms,
    /// Pseudo-matching lengths: lengths only.
    Pml,
}

impl Mode {
    /// Extension appended after the threshold extension to name the archive.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Mode::Ms => ".ms",
            Mode::Pml => ".pml",
        }
    }

    /// Full archive extension, e.g. `.thrbv.ms`.
    pub fn archive_extension(&self) -> String {
        format!("{}{}", THRESHOLDS_EXT, self.file_extension())
    }
}

/// Metadata written next to the archive as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMeta {
    pub version: u32,
    pub mode: Mode,
    pub text_len: u64,
    pub num_runs: u64,
}

/// A loaded, immutable query index.
#[derive(Debug, Clone)]
pub struct Index {
    mode: Mode,
    terminator_position: u64,
    f: FTable,
    bwt: RunLengthBwt,
    thresholds: Thresholds,
    samples_start: Option<SampleArray>,
    samples_last: Option<SampleArray>,
}

impl Index {
    /// Assemble and validate an index from its components.
    ///
    /// MS-mode indexes must carry both sample arrays; PML-mode indexes must
    /// carry neither.
    pub fn new(
        mode: Mode,
        terminator_position: u64,
        f: FTable,
        bwt: RunLengthBwt,
        thresholds: Thresholds,
        samples_start: Option<SampleArray>,
        samples_last: Option<SampleArray>,
    ) -> Result<Self> {
        match mode {
            Mode::Ms => {
                if samples_start.is_none() || samples_last.is_none() {
                    bail!("matching-statistics index is missing its suffix-array samples");
                }
            }
            Mode::Pml => {
                if samples_start.is_some() || samples_last.is_some() {
                    bail!("pseudo-matching-length index must not carry suffix-array samples");
                }
            }
        }

        let index = Self {
            mode,
            terminator_position,
            f,
            bwt,
            thresholds,
            samples_start,
            samples_last,
        };
        index.validate()?;
        Ok(index)
    }

    /// Assemble from a freshly loaded BWT and thresholds, building the
    /// F-table in the process.
    pub fn from_parts(
        mode: Mode,
        bwt: RunLengthBwt,
        thresholds: Thresholds,
        samples_start: Option<SampleArray>,
        samples_last: Option<SampleArray>,
    ) -> Result<Self> {
        let (f, terminator_position) = build_f(&bwt);
        Self::new(
            mode,
            terminator_position,
            f,
            bwt,
            thresholds,
            samples_start,
            samples_last,
        )
    }

    fn validate(&self) -> Result<()> {
        validate_f(&self.f, &self.bwt, self.terminator_position)?;
        self.thresholds.validate(&self.bwt)?;

        let r = self.bwt.number_of_runs();
        for samples in [&self.samples_start, &self.samples_last].into_iter().flatten() {
            if samples.len() != r {
                bail!(
                    "corrupt index: {} suffix-array samples for {} BWT runs",
                    samples.len(),
                    r
                );
            }
        }
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn bwt(&self) -> &RunLengthBwt {
        &self.bwt
    }

    pub fn f(&self) -> &FTable {
        &self.f
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn terminator_position(&self) -> u64 {
        self.terminator_position
    }

    pub fn text_len(&self) -> u64 {
        self.bwt.size()
    }

    pub fn num_runs(&self) -> u64 {
        self.bwt.number_of_runs()
    }

    /// Sample array at run starts. MS mode only.
    pub fn samples_start(&self) -> &SampleArray {
        self.samples_start
            .as_ref()
            .expect("suffix-array samples are only present in MS mode")
    }

    /// Sample array at run ends. MS mode only.
    pub fn samples_last(&self) -> &SampleArray {
        self.samples_last
            .as_ref()
            .expect("suffix-array samples are only present in MS mode")
    }

    /// Initial pointer for the backward walk: the text position following
    /// the sample of the last BWT position, wrapped at n.
    pub fn last_run_sample(&self) -> u64 {
        let last = self.samples_last().at(self.num_runs() - 1);
        (last + 1) % self.text_len()
    }

    pub fn meta(&self) -> IndexMeta {
        IndexMeta {
            version: 1,
            mode: self.mode,
            text_len: self.text_len(),
            num_runs: self.num_runs(),
        }
    }

    /// Serialize the archive stream: terminator position, F, BWT, then
    /// (MS only) last samples, thresholds, and (MS only) start samples.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_u64_le(writer, self.terminator_position)?;
        write_u64_le(writer, self.f.len() as u64)?;
        for &count in self.f.iter() {
            write_u64_le(writer, count)?;
        }
        self.bwt.serialize(writer)?;
        if let Some(samples) = &self.samples_last {
            samples.serialize(writer)?;
        }
        self.thresholds.serialize(writer)?;
        if let Some(samples) = &self.samples_start {
            samples.serialize(writer)?;
        }
        Ok(())
    }

    /// Load an archive stream written by [`Index::serialize`].
    pub fn deserialize<R: Read>(reader: &mut R, mode: Mode) -> Result<Self> {
        let terminator_position = read_u64_le(reader)?;
        let f_len = read_u64_le(reader)? as usize;
        if f_len != 256 {
            bail!("index archive holds an F-table with {} entries", f_len);
        }
        let mut f = [0u64; 256];
        for entry in f.iter_mut() {
            *entry = read_u64_le(reader)?;
        }
        let bwt = RunLengthBwt::load(reader)?;
        let samples_last = match mode {
            Mode::Ms => Some(SampleArray::load(reader)?),
            Mode::Pml => None,
        };
        let thresholds = Thresholds::load(reader)?;
        let samples_start = match mode {
            Mode::Ms => Some(SampleArray::load(reader)?),
            Mode::Pml => None,
        };
        Self::new(
            mode,
            terminator_position,
            f,
            bwt,
            thresholds,
            samples_start,
            samples_last,
        )
    }

    /// Serialized size of each component, for the stats report.
    pub fn component_sizes(&self) -> Vec<(&'static str, u64)> {
        fn measure(f: impl FnOnce(&mut CountingWriter)) -> u64 {
            let mut w = CountingWriter::new();
            f(&mut w);
            w.bytes_written()
        }

        let mut sizes = vec![
            ("terminator_position", 8),
            ("F", 8 + 256 * 8),
            (
                "bwt",
                measure(|w| {
                    self.bwt.serialize(w).unwrap();
                }),
            ),
        ];
        if let Some(samples) = &self.samples_last {
            sizes.push((
                "samples_last",
                measure(|w| {
                    samples.serialize(w).unwrap();
                }),
            ));
        }
        sizes.push((
            "thresholds",
            measure(|w| {
                self.thresholds.serialize(w).unwrap();
            }),
        ));
        if let Some(samples) = &self.samples_start {
            sizes.push((
                "samples_start",
                measure(|w| {
                    samples.serialize(w).unwrap();
                }),
            ));
        }
        sizes
    }
}
