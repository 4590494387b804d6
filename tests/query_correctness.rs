//! End-to-end query correctness.
//!
//! Every test goes through the real artifact load path: a naive builder
//! writes the BWT run files, samples, thresholds and grammar text to disk,
//! the index is assembled from them, and queries run against the loaded
//! structures. Matching statistics are checked against brute-force
//! substring search; the backward walks are additionally cross-checked
//! against a plain-array re-execution.

mod common;

use common::NaiveRef;
use msx::index::{build_index, load_document_array, load_text, Mode, SlpText};
use msx::index::{Index, TERMINATOR};
use msx::query::QueryEngine;
use tempfile::tempdir;

/// Build both index variants plus the grammar text for a reference.
fn load_fixture(text: &[u8]) -> (NaiveRef, Index, Index, SlpText) {
    let naive = NaiveRef::new(text);
    let dir = tempdir().unwrap();
    let prefix = naive.write_artifacts(dir.path(), "ref");

    let ms = build_index(&prefix, Mode::Ms).unwrap();
    let pml = build_index(&prefix, Mode::Pml).unwrap();
    let slp = load_text(&prefix).unwrap();
    (naive, ms, pml, slp)
}

fn patterns_for(text: &[u8]) -> Vec<Vec<u8>> {
    let m = text.len();
    let mut patterns = vec![
        text.to_vec(),
        text[..m / 2].to_vec(),
        text[m / 2..].to_vec(),
        text.iter().rev().copied().collect(),
        b"ZZZ".to_vec(),
        text[..1].to_vec(),
    ];
    // A present prefix interrupted by an absent byte.
    let mut broken = text[..m.min(3)].to_vec();
    broken.push(b'Z');
    broken.extend_from_slice(&text[..m.min(2)]);
    patterns.push(broken);
    patterns
}

const TEXTS: &[&[u8]] = &[
    b"BANANA",
    b"MISSISSIPPI",
    b"ABAB",
    b"AAAAA",
    b"GATTACAGATTACA",
    b"ACGTACGTTAGCACGT",
];

#[test]
fn ms_scenario_values() {
    let (_, ms, _, slp) = load_fixture(b"BANANA");
    let engine = QueryEngine::new(&ms);
    assert_eq!(engine.matching_statistics(b"ANA", &slp).lengths, vec![3, 2, 1]);
    assert_eq!(
        engine.matching_statistics(b"XANAX", &slp).lengths,
        vec![0, 3, 2, 1, 0]
    );

    let (_, ms, _, slp) = load_fixture(b"MISSISSIPPI");
    let engine = QueryEngine::new(&ms);
    assert_eq!(
        engine.matching_statistics(b"ISSI", &slp).lengths,
        vec![4, 3, 2, 1]
    );

    let (_, ms, _, slp) = load_fixture(b"AAAAA");
    let engine = QueryEngine::new(&ms);
    assert_eq!(engine.matching_statistics(b"AAA", &slp).lengths, vec![3, 2, 1]);

    let (_, ms, _, slp) = load_fixture(b"AAAA");
    let engine = QueryEngine::new(&ms);
    assert_eq!(engine.matching_statistics(b"B", &slp).lengths, vec![0]);
}

#[test]
fn ms_lengths_match_brute_force() {
    for &text in TEXTS {
        let (naive, ms, _, slp) = load_fixture(text);
        let engine = QueryEngine::new(&ms);
        for pattern in patterns_for(text) {
            let out = engine.matching_statistics(&pattern, &slp);
            assert_eq!(
                out.lengths,
                naive.longest_matches(&pattern),
                "text {:?} pattern {:?}",
                String::from_utf8_lossy(text),
                String::from_utf8_lossy(&pattern)
            );
        }
    }
}

#[test]
fn ms_pointers_agree_with_lengths() {
    for &text in TEXTS {
        let (naive, ms, _, slp) = load_fixture(text);
        let engine = QueryEngine::new(&ms);
        for pattern in patterns_for(text) {
            let out = engine.matching_statistics(&pattern, &slp);
            for (i, (&p, &len)) in out.pointers.iter().zip(&out.lengths).enumerate() {
                assert!(
                    len == 0 || (p < naive.n() as u64 && p + len <= naive.n() as u64),
                    "pointer past the text end"
                );
                for k in 0..len as usize {
                    assert_eq!(
                        naive.text[p as usize + k],
                        pattern[i + k],
                        "pointer {} does not witness the match at {}",
                        p,
                        i
                    );
                }
            }
        }
    }
}

#[test]
fn ms_lengths_decrease_by_at_most_one() {
    for &text in TEXTS {
        let (_, ms, _, slp) = load_fixture(text);
        let engine = QueryEngine::new(&ms);
        for pattern in patterns_for(text) {
            let lengths = engine.matching_statistics(&pattern, &slp).lengths;
            for i in 0..lengths.len().saturating_sub(1) {
                assert!(lengths[i] <= lengths[i + 1] + 1);
            }
        }
    }
}

#[test]
fn ms_pointers_match_plain_array_walk() {
    for &text in TEXTS {
        let (naive, ms, _, _) = load_fixture(text);
        let engine = QueryEngine::new(&ms);
        for pattern in patterns_for(text) {
            let (pointers, _) = engine.matching_pointers(&pattern);
            assert_eq!(
                pointers,
                naive.ms_pointers(&pattern),
                "text {:?} pattern {:?}",
                String::from_utf8_lossy(text),
                String::from_utf8_lossy(&pattern)
            );
        }
    }
}

#[test]
fn pml_matches_plain_array_walk() {
    for &text in TEXTS {
        let (naive, _, pml, _) = load_fixture(text);
        let engine = QueryEngine::new(&pml);
        for pattern in patterns_for(text) {
            let out = engine.pseudo_matching_lengths(&pattern);
            assert_eq!(
                out.lengths,
                naive.pml(&pattern),
                "text {:?} pattern {:?}",
                String::from_utf8_lossy(text),
                String::from_utf8_lossy(&pattern)
            );
        }
    }
}

#[test]
fn pml_never_exceeds_true_matching_statistics() {
    for &text in TEXTS {
        let (naive, _, pml, _) = load_fixture(text);
        let engine = QueryEngine::new(&pml);
        for pattern in patterns_for(text) {
            let pml_lengths = engine.pseudo_matching_lengths(&pattern).lengths;
            let true_lengths = naive.longest_matches(&pattern);
            for (p, t) in pml_lengths.iter().zip(&true_lengths) {
                assert!(p <= t, "pseudo length {} above true length {}", p, t);
            }
        }
    }
}

#[test]
fn pml_absent_alphabet() {
    let (_, _, pml, _) = load_fixture(b"AAAA");
    let engine = QueryEngine::new(&pml);
    assert_eq!(engine.pseudo_matching_lengths(b"B").lengths, vec![0]);
}

#[test]
fn empty_pattern_yields_empty_outputs() {
    let (_, ms, pml, slp) = load_fixture(b"BANANA");
    let engine = QueryEngine::new(&ms);
    let out = engine.matching_statistics(b"", &slp);
    assert!(out.lengths.is_empty());
    assert!(out.pointers.is_empty());

    let engine = QueryEngine::new(&pml);
    assert!(engine.pseudo_matching_lengths(b"").lengths.is_empty());
}

#[test]
fn plain_bwt_stream_builds_the_same_index() {
    let naive = NaiveRef::new(b"MISSISSIPPI");
    let dir = tempdir().unwrap();
    let prefix = naive.write_artifacts(dir.path(), "ref");

    let from_runs = build_index(&prefix, Mode::Ms).unwrap();

    // Remove the run files so assembly falls back to the plain stream.
    std::fs::remove_file(dir.path().join("ref.bwt.heads")).unwrap();
    std::fs::remove_file(dir.path().join("ref.bwt.len")).unwrap();
    let from_plain = build_index(&prefix, Mode::Ms).unwrap();

    assert_eq!(from_runs.f(), from_plain.f());
    assert_eq!(from_runs.terminator_position(), from_plain.terminator_position());

    let slp = load_text(&prefix).unwrap();
    for pattern in patterns_for(b"MISSISSIPPI") {
        let a = QueryEngine::new(&from_runs).matching_statistics(&pattern, &slp);
        let b = QueryEngine::new(&from_plain).matching_statistics(&pattern, &slp);
        assert_eq!(a, b);
    }
}

#[test]
fn document_ids_follow_the_pointed_document() {
    // Two documents over disjoint alphabets, so no match spans both.
    let naive = NaiveRef::new(b"AAAACCCC");
    let dir = tempdir().unwrap();
    let prefix = naive.write_artifacts(dir.path(), "ref");
    let bounds = [0usize, 4];
    naive.write_doc_array(&prefix, &bounds);

    let ms = build_index(&prefix, Mode::Ms).unwrap();
    let docs = load_document_array(&prefix, &ms).unwrap();
    let slp = load_text(&prefix).unwrap();
    let engine = QueryEngine::with_documents(&ms, &docs);

    for pattern in [b"CC".as_slice(), b"AA", b"AACC", b"CCAA"] {
        let out = engine.matching_statistics(pattern, &slp);
        let doc_ids = out.doc_ids.expect("document ids requested");
        assert_eq!(doc_ids.len(), pattern.len());
        let doc_of = |p: u64| bounds.partition_point(|&b| b as u64 <= p) as u64 - 1;
        for i in 0..pattern.len() {
            assert!(doc_ids[i] < 2);
            if out.lengths[i] > 0 {
                assert_eq!(
                    doc_ids[i],
                    doc_of(out.pointers[i]),
                    "pattern {:?} position {}",
                    String::from_utf8_lossy(pattern),
                    i
                );
            }
        }
    }

    // PML variant carries ids as well.
    let pml = build_index(&prefix, Mode::Pml).unwrap();
    let engine = QueryEngine::with_documents(&pml, &docs);
    let out = engine.pseudo_matching_lengths(b"CCAA");
    let doc_ids = out.doc_ids.expect("document ids requested");
    assert!(doc_ids.iter().all(|&d| d < 2));
}

#[test]
fn full_text_query_decreases_stepwise() {
    let text = b"GATTACAGATTACA";
    let (_, ms, _, slp) = load_fixture(text);
    let engine = QueryEngine::new(&ms);
    let lengths = engine.matching_statistics(text, &slp).lengths;
    // The whole pattern occurs, so every suffix matches to the text end.
    let expected: Vec<u64> = (0..text.len()).map(|i| (text.len() - i) as u64).collect();
    assert_eq!(lengths, expected);
}

#[test]
fn terminator_is_unique_in_fixture_bwt() {
    for &text in TEXTS {
        let naive = NaiveRef::new(text);
        let terminators = naive.bwt.iter().filter(|&&b| b <= TERMINATOR).count();
        assert_eq!(terminators, 1);
    }
}
