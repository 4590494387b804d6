//! Run-length compressed Burrows-Wheeler transform.
//!
//! The BWT is kept as its run decomposition: one head byte and one length
//! per maximal equal-letter run. Rank, select and run lookups are binary
//! searches over per-character run tables, so every operation the query
//! engine performs is O(log r) with no per-call mutable state, and a loaded
//! transform can be shared freely across threads.

use crate::utils::encoding::{iter_u40_le, read_u64_le, write_u64_le, U40_BYTES};
use crate::utils::int_vec::{bits_for, IntVector};
use anyhow::{bail, Context, Result};
use memmap2::Mmap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Per-character view of the run decomposition.
///
/// `starts[j]` is the BWT position of the j-th run of this character and
/// `cum[j]` the number of its occurrences in runs `0..j`, so `cum` has one
/// trailing entry holding the total count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CharRuns {
    starts: Vec<u64>,
    cum: Vec<u64>,
}

/// Run-length BWT with rank/select support.
#[derive(Debug, Clone)]
pub struct RunLengthBwt {
    n: u64,
    heads: Vec<u8>,
    run_lens: IntVector,
    run_starts: Vec<u64>,
    chars: Vec<CharRuns>,
}

impl RunLengthBwt {
    /// Build from an explicit run decomposition.
    pub fn from_runs(heads: Vec<u8>, lens: &[u64]) -> Result<Self> {
        if heads.is_empty() {
            bail!("BWT has no runs");
        }
        if heads.len() != lens.len() {
            bail!(
                "run head count {} does not match run length count {}",
                heads.len(),
                lens.len()
            );
        }
        if let Some(k) = lens.iter().position(|&l| l == 0) {
            bail!("BWT run {} has length zero", k);
        }

        let max_len = lens.iter().copied().max().unwrap_or(1);
        let mut run_lens = IntVector::new(bits_for(max_len));
        for &len in lens {
            run_lens.push(len);
        }

        let mut bwt = Self {
            n: 0,
            heads,
            run_lens,
            run_starts: Vec::new(),
            chars: Vec::new(),
        };
        bwt.build_tables();
        Ok(bwt)
    }

    /// Build from a plain BWT byte stream, discovering the runs by scanning.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            bail!("BWT stream is empty");
        }
        let mut heads = Vec::new();
        let mut lens = Vec::new();
        let mut prev = data[0];
        let mut len = 0u64;
        for &b in data {
            if b == prev {
                len += 1;
            } else {
                heads.push(prev);
                lens.push(len);
                prev = b;
                len = 1;
            }
        }
        heads.push(prev);
        lens.push(len);
        Self::from_runs(heads, &lens)
    }

    /// Load from the builder's run files: `<ref>.bwt.heads` holds one byte
    /// per run and `<ref>.bwt.len` one 5-byte little-endian length per run.
    pub fn load_run_files(heads_path: &Path, lens_path: &Path) -> Result<Self> {
        let heads = std::fs::read(heads_path)
            .with_context(|| format!("failed to read BWT run heads {}", heads_path.display()))?;
        let lens_file = File::open(lens_path)
            .with_context(|| format!("failed to open BWT run lengths {}", lens_path.display()))?;
        let lens_mmap = unsafe { Mmap::map(&lens_file)? };

        if lens_mmap.len() % U40_BYTES != 0 {
            bail!(
                "BWT run length file {} has size {} which is not a multiple of {} bytes",
                lens_path.display(),
                lens_mmap.len(),
                U40_BYTES
            );
        }
        if lens_mmap.len() / U40_BYTES != heads.len() {
            bail!(
                "BWT run files disagree: {} heads but {} lengths",
                heads.len(),
                lens_mmap.len() / U40_BYTES
            );
        }

        let lens: Vec<u64> = iter_u40_le(&lens_mmap).collect();
        Self::from_runs(heads, &lens)
    }

    /// Load from a single concatenated BWT stream (`<ref>.bwt`).
    pub fn load_plain(bwt_path: &Path) -> Result<Self> {
        let file = File::open(bwt_path)
            .with_context(|| format!("failed to open BWT stream {}", bwt_path.display()))?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_bytes(&mmap)
    }

    fn build_tables(&mut self) {
        let r = self.heads.len();
        self.run_starts = Vec::with_capacity(r);
        self.chars = vec![CharRuns::default(); 256];

        let mut pos = 0u64;
        for k in 0..r {
            let c = self.heads[k] as usize;
            let len = self.run_lens.get(k);
            self.run_starts.push(pos);

            let cr = &mut self.chars[c];
            if cr.cum.is_empty() {
                cr.cum.push(0);
            }
            let total = *cr.cum.last().unwrap();
            cr.starts.push(pos);
            cr.cum.push(total + len);

            pos += len;
        }
        self.n = pos;
    }

    /// Total BWT length n.
    #[inline]
    pub fn size(&self) -> u64 {
        self.n
    }

    /// Number of equal-letter runs r.
    #[inline]
    pub fn number_of_runs(&self) -> u64 {
        self.heads.len() as u64
    }

    /// Total occurrences of `c`.
    #[inline]
    pub fn number_of_letter(&self, c: u8) -> u64 {
        self.chars[c as usize].cum.last().copied().unwrap_or(0)
    }

    /// The character at BWT position `i`.
    #[inline]
    pub fn access(&self, i: u64) -> u8 {
        self.heads[self.run_of_position(i) as usize]
    }

    /// Id of the run containing position `i`.
    #[inline]
    pub fn run_of_position(&self, i: u64) -> u64 {
        debug_assert!(i < self.n);
        (self.run_starts.partition_point(|&s| s <= i) - 1) as u64
    }

    /// Number of occurrences of `c` in `BWT[0..i)`. `i` may equal n.
    pub fn rank(&self, i: u64, c: u8) -> u64 {
        let cr = &self.chars[c as usize];
        let k = cr.starts.partition_point(|&s| s < i);
        if k == 0 {
            return 0;
        }
        let start = cr.starts[k - 1];
        let len = cr.cum[k] - cr.cum[k - 1];
        cr.cum[k - 1] + (i - start).min(len)
    }

    /// Position of the (k+1)-th occurrence of `c` (0-indexed).
    ///
    /// Requires `k < number_of_letter(c)`.
    pub fn select(&self, k: u64, c: u8) -> u64 {
        let cr = &self.chars[c as usize];
        debug_assert!(k < self.number_of_letter(c));
        let j = cr.cum.partition_point(|&x| x <= k) - 1;
        cr.starts[j] + (k - cr.cum[j])
    }

    /// Head character of run `k`.
    #[inline]
    pub fn run_head(&self, k: u64) -> u8 {
        self.heads[k as usize]
    }

    /// Length of run `k`.
    #[inline]
    pub fn run_len(&self, k: u64) -> u64 {
        self.run_lens.get(k as usize)
    }

    /// Start position of run `k`.
    #[inline]
    pub fn run_start(&self, k: u64) -> u64 {
        self.run_starts[k as usize]
    }

    /// Serialize the run decomposition; derived tables are rebuilt on load.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<u64> {
        write_u64_le(writer, self.heads.len() as u64)?;
        writer.write_all(&self.heads)?;
        let vec_bytes = self.run_lens.serialize(writer)?;
        Ok(8 + self.heads.len() as u64 + vec_bytes)
    }

    /// Load a transform serialized by [`RunLengthBwt::serialize`].
    pub fn load<R: Read>(reader: &mut R) -> Result<Self> {
        let r = read_u64_le(reader)? as usize;
        if r == 0 {
            bail!("serialized BWT has no runs");
        }
        let mut heads = vec![0u8; r];
        reader.read_exact(&mut heads)?;
        let run_lens = IntVector::load(reader)?;
        if run_lens.len() != r {
            bail!(
                "serialized BWT has {} heads but {} run lengths",
                r,
                run_lens.len()
            );
        }

        let mut bwt = Self {
            n: 0,
            heads,
            run_lens,
            run_starts: Vec::new(),
            chars: Vec::new(),
        };
        bwt.build_tables();
        Ok(bwt)
    }
}
