//! Per-run thresholds.
//!
//! One position per BWT run. For the k-th run of a character c, the
//! threshold is the BWT position at which the longest common suffix with
//! the text switches from the previous c-run to this one; backward search
//! compares the current position against it to decide which adjacent c-run
//! to snap to on a mismatch. The first run of every character carries
//! threshold zero.

use crate::index::rlbwt::RunLengthBwt;
use crate::utils::encoding::{iter_u40_le, U40_BYTES};
use crate::utils::int_vec::{bits_for, IntVector};
use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Filename extension of the threshold artifact consumed at build time.
pub const THRESHOLDS_EXT: &str = ".thrbv";

/// Threshold vector, indexed by run id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thresholds {
    values: IntVector,
}

impl Thresholds {
    /// Load the builder's threshold artifact: `r` positions, 5-byte
    /// little-endian each.
    pub fn load_artifact(path: &Path, r: u64, n: u64) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open threshold file {}", path.display()))?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() % U40_BYTES != 0 {
            bail!(
                "threshold file {} has size {} which is not a multiple of {} bytes",
                path.display(),
                mmap.len(),
                U40_BYTES
            );
        }
        if (mmap.len() / U40_BYTES) as u64 != r {
            bail!(
                "threshold file {} holds {} values but the BWT has {} runs",
                path.display(),
                mmap.len() / U40_BYTES,
                r
            );
        }

        // Thresholds may equal n (one past the last position).
        let mut values = IntVector::new(bits_for(n));
        for value in iter_u40_le(&mmap) {
            if value > n {
                bail!(
                    "threshold file {} holds value {} beyond the text length {}",
                    path.display(),
                    value,
                    n
                );
            }
            values.push(value);
        }
        Ok(Self { values })
    }

    /// Build directly from threshold values (one per run).
    pub fn from_values(values: &[u64], n: u64) -> Self {
        Self {
            values: IntVector::from_values(values, n),
        }
    }

    /// Threshold for run `k`.
    #[inline]
    pub fn at(&self, k: u64) -> u64 {
        self.values.get(k as usize)
    }

    pub fn len(&self) -> u64 {
        self.values.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check consistency against the transform: one value per run, and the
    /// first run of every character must carry threshold zero (backward
    /// search relies on it to never step above the first run).
    pub fn validate(&self, bwt: &RunLengthBwt) -> Result<()> {
        if self.len() != bwt.number_of_runs() {
            bail!(
                "corrupt index: {} thresholds for {} BWT runs",
                self.len(),
                bwt.number_of_runs()
            );
        }
        let mut seen = [false; 256];
        for k in 0..bwt.number_of_runs() {
            let c = bwt.run_head(k) as usize;
            if !seen[c] {
                seen[c] = true;
                if self.at(k) != 0 {
                    bail!(
                        "corrupt index: first run of byte {} has non-zero threshold {}",
                        c,
                        self.at(k)
                    );
                }
            }
        }
        Ok(())
    }

    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<u64> {
        self.values.serialize(writer)
    }

    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            values: IntVector::load(reader)?,
        })
    }
}
