//! The MS/PML backward-search state machine.
//!
//! Both statistics run the same loop: starting from the last BWT row, each
//! pattern character (right to left) either extends the current match via
//! one LF step, or snaps to an adjacent run of the wanted character. The
//! per-run threshold decides whether the run above or below preserves the
//! longer common suffix, so a mismatching step costs at most two
//! rank/select calls plus one threshold lookup.
//!
//! Pseudo-matching lengths reset to zero at every snap; they are a cheap
//! lower bound on the true matching statistics. The matching-statistics
//! walk instead carries a reference position taken from the suffix-array
//! samples, and a forward sweep over the emitted pointers recovers the
//! exact lengths by comparing against the random-access text.

use crate::index::doc_array::DocumentArray;
use crate::index::f_table::lf;
use crate::index::text::CharAccess;
use crate::index::types::{Index, Mode};

/// Pseudo-matching lengths for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmlOutput {
    pub lengths: Vec<u64>,
    /// Present when the engine holds a document array.
    pub doc_ids: Option<Vec<u64>>,
}

/// Matching statistics for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsOutput {
    pub lengths: Vec<u64>,
    pub pointers: Vec<u64>,
    /// Present when the engine holds a document array.
    pub doc_ids: Option<Vec<u64>>,
}

/// Read-only query engine over a loaded index.
///
/// The engine never fails: for any byte string it emits exactly one value
/// per pattern position. Characters absent from the reference fall through
/// the empty-class branch and contribute zeros.
pub struct QueryEngine<'a> {
    index: &'a Index,
    doc_array: Option<&'a DocumentArray>,
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self {
            index,
            doc_array: None,
        }
    }

    /// Engine that also reports document ids alongside each output value.
    pub fn with_documents(index: &'a Index, doc_array: &'a DocumentArray) -> Self {
        Self {
            index,
            doc_array: Some(doc_array),
        }
    }

    /// Compute pseudo-matching lengths for `pattern`.
    pub fn pseudo_matching_lengths(&self, pattern: &[u8]) -> PmlOutput {
        let bwt = self.index.bwt();
        let thresholds = self.index.thresholds();
        let n = bwt.size();
        let m = pattern.len();

        let mut lengths = vec![0u64; m];
        let mut doc_ids = self.doc_array.map(|_| vec![0u64; m]);

        let mut pos = n - 1;
        let mut length = 0u64;
        let mut curr_doc = self
            .doc_array
            .map(|d| d.end_doc(bwt.number_of_runs() - 1))
            .unwrap_or(0);

        for i in 0..m {
            let c = pattern[m - 1 - i];

            if bwt.number_of_letter(c) == 0 {
                length = 0;
            } else if pos < n && bwt.access(pos) == c {
                length += 1;
            } else {
                // pos may sit one past the last row after an LF step on a
                // character above the whole alphabet.
                let mut rnk = bwt.rank(pos, c);
                let mut thr = n + 1;
                let mut next_pos = pos;

                if rnk < bwt.number_of_letter(c) {
                    // First position of the next c-run below.
                    let j = bwt.select(rnk, c);
                    let run_of_j = bwt.run_of_position(j);
                    thr = thresholds.at(run_of_j);
                    if let Some(d) = self.doc_array {
                        curr_doc = d.start_doc(run_of_j);
                    }
                    length = 0;
                    next_pos = j;
                }

                if pos < thr {
                    // The run above preserves the longer common suffix.
                    rnk -= 1;
                    let j = bwt.select(rnk, c);
                    let run_of_j = bwt.run_of_position(j);
                    if let Some(d) = self.doc_array {
                        curr_doc = d.end_doc(run_of_j);
                    }
                    length = 0;
                    next_pos = j;
                }
                pos = next_pos;
            }

            lengths[m - 1 - i] = length;
            if let Some(out) = doc_ids.as_mut() {
                out[m - 1 - i] = curr_doc;
            }

            pos = lf(self.index.f(), bwt, pos, c);
        }

        PmlOutput { lengths, doc_ids }
    }

    /// Compute matching statistics for `pattern`, reconstructing exact
    /// lengths against the random-access reference text.
    ///
    /// Requires an MS-mode index.
    pub fn matching_statistics<T: CharAccess + ?Sized>(
        &self,
        pattern: &[u8],
        text: &T,
    ) -> MsOutput {
        let (pointers, doc_ids) = self.matching_pointers(pattern);
        let lengths = extend_pointer_matches(pattern, &pointers, text);
        MsOutput {
            lengths,
            pointers,
            doc_ids,
        }
    }

    /// The backward pass alone: one reference pointer per pattern position.
    pub fn matching_pointers(&self, pattern: &[u8]) -> (Vec<u64>, Option<Vec<u64>>) {
        assert!(
            self.index.mode() == Mode::Ms,
            "matching statistics require an MS-mode index"
        );
        let bwt = self.index.bwt();
        let thresholds = self.index.thresholds();
        let samples_start = self.index.samples_start();
        let samples_last = self.index.samples_last();
        let n = bwt.size();
        let m = pattern.len();

        let mut pointers = vec![0u64; m];
        let mut doc_ids = self.doc_array.map(|_| vec![0u64; m]);

        let mut pos = n - 1;
        let mut sample = self.index.last_run_sample();
        let mut curr_doc = self
            .doc_array
            .map(|d| d.end_doc(bwt.number_of_runs() - 1))
            .unwrap_or(0);

        for i in 0..m {
            let c = pattern[m - 1 - i];

            if bwt.number_of_letter(c) == 0 {
                sample = 0;
                if let Some(d) = self.doc_array {
                    curr_doc = d.start_doc(bwt.run_of_position(sample));
                }
            } else if pos < n && bwt.access(pos) == c {
                // The extended match starts one position earlier in the
                // text. sample can only be zero here after the empty-class
                // branch ran; the wrapped pointer fails the sweep's bounds
                // check and contributes length zero.
                sample = sample.wrapping_sub(1);
            } else {
                let mut rnk = bwt.rank(pos, c);
                let mut thr = n + 1;
                let mut next_pos = pos;

                if rnk < bwt.number_of_letter(c) {
                    let j = bwt.select(rnk, c);
                    let run_of_j = bwt.run_of_position(j);
                    thr = thresholds.at(run_of_j);
                    sample = samples_start.at(run_of_j);
                    if let Some(d) = self.doc_array {
                        curr_doc = d.start_doc(run_of_j);
                    }
                    next_pos = j;
                }

                if pos < thr {
                    rnk -= 1;
                    let j = bwt.select(rnk, c);
                    let run_of_j = bwt.run_of_position(j);
                    sample = samples_last.at(run_of_j);
                    if let Some(d) = self.doc_array {
                        curr_doc = d.end_doc(run_of_j);
                    }
                    next_pos = j;
                }
                pos = next_pos;
            }

            pointers[m - 1 - i] = sample;
            if let Some(out) = doc_ids.as_mut() {
                out[m - 1 - i] = curr_doc;
            }

            pos = lf(self.index.f(), bwt, pos, c);
        }

        (pointers, doc_ids)
    }
}

/// Grow the matched length at each pointer by character comparison.
///
/// When consecutive pointers are consecutive text positions the previous
/// match carried over and the length can only shrink by one, so the
/// comparison is skipped; with nothing carried (`l == 0`) the scan always
/// starts fresh, which also covers pointers emitted after a character
/// absent from the reference.
fn extend_pointer_matches<T: CharAccess + ?Sized>(
    pattern: &[u8],
    pointers: &[u64],
    text: &T,
) -> Vec<u64> {
    let n = text.text_len();
    let m = pattern.len();
    let mut lengths = vec![0u64; m];
    let mut l = 0usize;

    for i in 0..m {
        let p = pointers[i];
        if i == 0 || l == 0 || p != pointers[i - 1].wrapping_add(1) {
            while i + l < m
                && p.saturating_add(l as u64) < n
                && pattern[i + l] == text.char_at(p + l as u64)
            {
                l += 1;
            }
        }
        lengths[i] = l as u64;
        l = l.saturating_sub(1);
    }
    lengths
}
