//! F-table construction and the LF mapping.
//!
//! The F-table is a 256-entry exclusive prefix sum over character counts:
//! `F[c]` is the index of the first BWT row whose first character is `c`.
//! Every byte at or below [`TERMINATOR`] is folded into the terminator
//! bucket, and the single terminator position is recorded while counting.

use crate::index::rlbwt::RunLengthBwt;
use crate::index::types::TERMINATOR;
use anyhow::{bail, Result};

/// Cumulative character counts, one entry per byte value.
pub type FTable = [u64; 256];

/// Build the F-table from the run decomposition in one pass.
///
/// Returns the table together with the BWT position of the terminator.
pub fn build_f(bwt: &RunLengthBwt) -> (FTable, u64) {
    let mut counts = [0u64; 256];
    let mut terminator_position = 0u64;

    for k in 0..bwt.number_of_runs() {
        let c = bwt.run_head(k);
        let len = bwt.run_len(k);
        if c > TERMINATOR {
            counts[c as usize] += len;
        } else {
            counts[TERMINATOR as usize] += len;
            terminator_position = bwt.run_start(k);
        }
    }

    let mut f = [0u64; 256];
    let mut sum = 0u64;
    for c in 0..256 {
        f[c] = sum;
        sum += counts[c];
    }
    (f, terminator_position)
}

/// One backward step: the row whose first character is `c` and which the
/// current row `i` maps to.
#[inline]
pub fn lf(f: &FTable, bwt: &RunLengthBwt, i: u64, c: u8) -> u64 {
    f[c as usize] + bwt.rank(i, c)
}

/// Check the F-table invariants against the transform it was built from.
///
/// A failure means the serialized index is corrupt.
pub fn validate_f(f: &FTable, bwt: &RunLengthBwt, terminator_position: u64) -> Result<()> {
    let n = bwt.size();

    if f[TERMINATOR as usize] != 0 {
        bail!("corrupt index: F does not start the terminator bucket at zero");
    }
    for c in 0..255usize {
        if f[c] > f[c + 1] {
            bail!("corrupt index: F is not monotone at byte {}", c);
        }
    }
    for c in (TERMINATOR as usize + 1)..255 {
        if f[c + 1] - f[c] != bwt.number_of_letter(c as u8) {
            bail!(
                "corrupt index: F bucket for byte {} disagrees with the BWT",
                c
            );
        }
    }
    if f[255] + bwt.number_of_letter(255) != n {
        bail!("corrupt index: F buckets do not sum to the text length");
    }

    let terminator_count: u64 = (0..=TERMINATOR).map(|c| bwt.number_of_letter(c)).sum();
    if terminator_count != 1 {
        bail!(
            "corrupt index: expected exactly one terminator, found {}",
            terminator_count
        );
    }
    if terminator_position >= n || bwt.access(terminator_position) > TERMINATOR {
        bail!("corrupt index: recorded terminator position does not hold the terminator");
    }
    Ok(())
}
