//! Suffix-array samples at run boundaries.
//!
//! The builder emits two sample files per reference: `<ref>.ssa` with the
//! suffix-array value at the first position of every run and `<ref>.esa`
//! with the value at the last position. Each file is a stream of
//! (left, right) pairs of 5-byte little-endian integers; only the right
//! value is kept, shifted to the preceding text position (`right - 1`, or
//! `n - 1` when right is zero).

use crate::utils::encoding::{iter_u40_le, U40_BYTES};
use crate::utils::int_vec::{bits_for, IntVector};
use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// One suffix-array sample per BWT run, bit-packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleArray {
    values: IntVector,
}

impl SampleArray {
    /// Load a boundary-sample file written by the builder.
    ///
    /// The file must hold exactly `r` pairs of 5-byte integers; every
    /// stored sample must be a valid text position.
    pub fn load_boundary_file(path: &Path, r: u64, n: u64) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open sample file {}", path.display()))?;
        let mmap = unsafe { Mmap::map(&file)? };

        let pair_bytes = 2 * U40_BYTES;
        if mmap.len() % pair_bytes != 0 {
            bail!(
                "sample file {} has size {} which is not a multiple of {} bytes",
                path.display(),
                mmap.len(),
                pair_bytes
            );
        }
        let pairs = (mmap.len() / pair_bytes) as u64;
        if pairs != r {
            bail!(
                "sample file {} holds {} samples but the BWT has {} runs",
                path.display(),
                pairs,
                r
            );
        }

        let mut values = IntVector::new(bits_for(n.saturating_sub(1)));
        let mut raw = iter_u40_le(&mmap);
        while let (Some(_left), Some(right)) = (raw.next(), raw.next()) {
            let value = if right == 0 { n - 1 } else { right - 1 };
            if value >= n {
                bail!(
                    "sample file {} holds position {} beyond the text length {}",
                    path.display(),
                    value,
                    n
                );
            }
            values.push(value);
        }
        Ok(Self { values })
    }

    /// Build directly from sample values (one per run).
    pub fn from_values(values: &[u64], n: u64) -> Self {
        Self {
            values: IntVector::from_values(values, n.saturating_sub(1)),
        }
    }

    /// Sample for run `k`.
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

    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<u64> {
        self.values.serialize(writer)
    }

    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Self {
            values: IntVector::load(reader)?,
        })
    }
}
