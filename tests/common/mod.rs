//! Shared test fixtures.
//!
//! The production index is assembled from artifacts written by an external
//! pipeline. For tests we stand in for that pipeline: everything (BWT run
//! files, suffix-array samples, thresholds, grammar text, document array)
//! is derived from a plain text with naive algorithms and written in the
//! builder's file formats, so tests exercise the real load path end to end.

#![allow(dead_code)]

use msx::index::doc_array::DocumentArray;
use msx::index::text::build_balanced_grammar;
use msx::index::{with_suffix, TERMINATOR};
use msx::utils::encoding::encode_u40_le;
use std::path::{Path, PathBuf};

/// A reference text with its naively computed index structures.
pub struct NaiveRef {
    /// Text including the trailing terminator.
    pub text: Vec<u8>,
    pub sa: Vec<usize>,
    pub bwt: Vec<u8>,
    pub run_heads: Vec<u8>,
    pub run_starts: Vec<usize>,
    pub run_lens: Vec<usize>,
    /// Adjacent-suffix common prefix lengths; `lcp[0]` is unused.
    pub lcp: Vec<usize>,
    pub thresholds: Vec<u64>,
    /// Stored suffix-array samples at run starts/ends (value minus one,
    /// wrapped at n).
    pub samples_start: Vec<u64>,
    pub samples_last: Vec<u64>,
    pub f: [u64; 256],
}

impl NaiveRef {
    pub fn new(text_without_terminator: &[u8]) -> Self {
        assert!(
            text_without_terminator.iter().all(|&b| b > TERMINATOR),
            "reference bytes must sit above the terminator"
        );
        let mut text = text_without_terminator.to_vec();
        text.push(TERMINATOR);
        let n = text.len();

        let mut sa: Vec<usize> = (0..n).collect();
        sa.sort_unstable_by(|&a, &b| text[a..].cmp(&text[b..]));

        let bwt: Vec<u8> = sa.iter().map(|&p| text[(p + n - 1) % n]).collect();

        let mut run_heads = Vec::new();
        let mut run_starts = Vec::new();
        let mut run_lens = Vec::new();
        for (i, &c) in bwt.iter().enumerate() {
            if run_heads.last() == Some(&c) {
                *run_lens.last_mut().unwrap() += 1;
            } else {
                run_heads.push(c);
                run_starts.push(i);
                run_lens.push(1);
            }
        }

        let mut lcp = vec![0usize; n];
        for i in 1..n {
            lcp[i] = common_prefix(&text[sa[i - 1]..], &text[sa[i]..]);
        }

        let thresholds = compute_thresholds(&run_heads, &run_starts, &run_lens, &lcp);

        let stored = |p: usize| ((sa[p] + n - 1) % n) as u64;
        let samples_start: Vec<u64> = run_starts.iter().map(|&s| stored(s)).collect();
        let samples_last: Vec<u64> = run_starts
            .iter()
            .zip(&run_lens)
            .map(|(&s, &l)| stored(s + l - 1))
            .collect();

        let mut counts = [0u64; 256];
        for &c in &bwt {
            if c > TERMINATOR {
                counts[c as usize] += 1;
            } else {
                counts[TERMINATOR as usize] += 1;
            }
        }
        let mut f = [0u64; 256];
        let mut sum = 0;
        for c in 0..256 {
            f[c] = sum;
            sum += counts[c];
        }

        Self {
            text,
            sa,
            bwt,
            run_heads,
            run_starts,
            run_lens,
            lcp,
            thresholds,
            samples_start,
            samples_last,
            f,
        }
    }

    pub fn n(&self) -> usize {
        self.text.len()
    }

    pub fn r(&self) -> usize {
        self.run_heads.len()
    }

    fn count(&self, c: u8) -> u64 {
        self.bwt.iter().filter(|&&b| b == c).count() as u64
    }

    fn rank(&self, i: usize, c: u8) -> u64 {
        self.bwt[..i].iter().filter(|&&b| b == c).count() as u64
    }

    fn select(&self, k: u64, c: u8) -> usize {
        self.bwt
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == c)
            .nth(k as usize)
            .map(|(i, _)| i)
            .expect("select out of range")
    }

    fn run_of(&self, i: usize) -> usize {
        self.run_starts.partition_point(|&s| s <= i) - 1
    }

    fn lf(&self, i: usize, c: u8) -> usize {
        (self.f[c as usize] + self.rank(i, c)) as usize
    }

    /// Pseudo-matching lengths computed with plain arrays and linear
    /// scans; an independent check of the bit-packed machinery.
    pub fn pml(&self, pattern: &[u8]) -> Vec<u64> {
        let n = self.n();
        let m = pattern.len();
        let mut lengths = vec![0u64; m];
        let mut pos = n - 1;
        let mut length = 0u64;

        for i in 0..m {
            let c = pattern[m - 1 - i];
            if self.count(c) == 0 {
                length = 0;
            } else if pos < n && self.bwt[pos] == c {
                length += 1;
            } else {
                let mut rnk = self.rank(pos, c);
                let mut thr = (n + 1) as u64;
                let mut next_pos = pos;
                if rnk < self.count(c) {
                    let j = self.select(rnk, c);
                    thr = self.thresholds[self.run_of(j)];
                    length = 0;
                    next_pos = j;
                }
                if (pos as u64) < thr {
                    rnk -= 1;
                    next_pos = self.select(rnk, c);
                    length = 0;
                }
                pos = next_pos;
            }
            lengths[m - 1 - i] = length;
            pos = self.lf(pos, c);
        }
        lengths
    }

    /// Matching-statistics pointers computed the same way.
    pub fn ms_pointers(&self, pattern: &[u8]) -> Vec<u64> {
        let n = self.n();
        let m = pattern.len();
        let mut pointers = vec![0u64; m];
        let mut pos = n - 1;
        let mut sample = (self.samples_last[self.r() - 1] + 1) % n as u64;

        for i in 0..m {
            let c = pattern[m - 1 - i];
            if self.count(c) == 0 {
                sample = 0;
            } else if pos < n && self.bwt[pos] == c {
                sample = sample.wrapping_sub(1);
            } else {
                let mut rnk = self.rank(pos, c);
                let mut thr = (n + 1) as u64;
                let mut next_pos = pos;
                if rnk < self.count(c) {
                    let j = self.select(rnk, c);
                    let run_of_j = self.run_of(j);
                    thr = self.thresholds[run_of_j];
                    sample = self.samples_start[run_of_j];
                    next_pos = j;
                }
                if (pos as u64) < thr {
                    rnk -= 1;
                    let j = self.select(rnk, c);
                    sample = self.samples_last[self.run_of(j)];
                    next_pos = j;
                }
                pos = next_pos;
            }
            pointers[m - 1 - i] = sample;
            pos = self.lf(pos, c);
        }
        pointers
    }

    /// True matching statistics by brute-force substring search.
    pub fn longest_matches(&self, pattern: &[u8]) -> Vec<u64> {
        let m = pattern.len();
        (0..m)
            .map(|i| {
                let mut best = 0u64;
                for start in 0..self.n() {
                    let len = common_prefix(&pattern[i..], &self.text[start..]);
                    best = best.max(len as u64);
                }
                best
            })
            .collect()
    }

    /// Write every builder artifact under `dir`, returning the reference
    /// prefix.
    pub fn write_artifacts(&self, dir: &Path, name: &str) -> PathBuf {
        let prefix = dir.join(name);

        std::fs::write(with_suffix(&prefix, ".bwt"), &self.bwt).unwrap();
        std::fs::write(with_suffix(&prefix, ".bwt.heads"), &self.run_heads).unwrap();

        let mut lens = Vec::new();
        for &len in &self.run_lens {
            lens.extend_from_slice(&encode_u40_le(len as u64));
        }
        std::fs::write(with_suffix(&prefix, ".bwt.len"), lens).unwrap();

        // Sample files hold (position, suffix-array value) pairs; the
        // loader keeps right - 1 (or n - 1 when right is zero).
        let pair = |p: usize| {
            let mut buf = Vec::new();
            buf.extend_from_slice(&encode_u40_le(p as u64));
            buf.extend_from_slice(&encode_u40_le(self.sa[p] as u64));
            buf
        };
        let mut ssa = Vec::new();
        let mut esa = Vec::new();
        for (&start, &len) in self.run_starts.iter().zip(&self.run_lens) {
            ssa.extend_from_slice(&pair(start));
            esa.extend_from_slice(&pair(start + len - 1));
        }
        std::fs::write(with_suffix(&prefix, ".ssa"), ssa).unwrap();
        std::fs::write(with_suffix(&prefix, ".esa"), esa).unwrap();

        let mut thr = Vec::new();
        for &value in &self.thresholds {
            thr.extend_from_slice(&encode_u40_le(value));
        }
        std::fs::write(with_suffix(&prefix, ".thrbv"), thr).unwrap();

        let slp = build_balanced_grammar(&self.text).unwrap();
        slp.write_file(&with_suffix(&prefix, ".slp")).unwrap();

        prefix
    }

    /// Write `<ref>.doc` for a document decomposition given by boundary
    /// start positions (`bounds[d]` is where document d begins).
    pub fn write_doc_array(&self, prefix: &Path, bounds: &[usize]) {
        let doc_of = |p: u64| bounds.partition_point(|&b| b as u64 <= p) as u64 - 1;
        let start: Vec<u64> = self.samples_start.iter().map(|&s| doc_of(s)).collect();
        let end: Vec<u64> = self.samples_last.iter().map(|&s| doc_of(s)).collect();
        let arr = DocumentArray::from_values(&start, &end, bounds.len() as u64);
        arr.write_file(&with_suffix(prefix, ".doc")).unwrap();
    }
}

fn common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Threshold for the k-th run of a character: the position of the smallest
/// adjacent-suffix LCP between the previous run of that character and this
/// one. First runs carry zero.
fn compute_thresholds(
    heads: &[u8],
    starts: &[usize],
    lens: &[usize],
    lcp: &[usize],
) -> Vec<u64> {
    let mut prev_end: [Option<usize>; 256] = [None; 256];
    let mut thresholds = Vec::with_capacity(heads.len());

    for k in 0..heads.len() {
        let c = heads[k] as usize;
        let threshold = match prev_end[c] {
            None => 0,
            Some(e) => {
                let s = starts[k];
                let mut best = e + 1;
                for i in (e + 1)..=s {
                    if lcp[i] < lcp[best] {
                        best = i;
                    }
                }
                best as u64
            }
        };
        thresholds.push(threshold);
        prev_end[c] = Some(starts[k] + lens[k] - 1);
    }
    thresholds
}
