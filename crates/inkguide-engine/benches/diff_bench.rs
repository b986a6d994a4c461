// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for word diffing and JIIX tokenizing in the
// inkguide-engine crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use inkguide_core::Word;
use inkguide_engine::{diff, jiix};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A paragraph of `n` words separated by blank tokens, the way the engine
/// splits recognised text.
fn paragraph(n: usize, seed: usize) -> Vec<Word> {
    let vocabulary = ["the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog"];
    let mut words = Vec::with_capacity(n * 2);
    for i in 0..n {
        words.push(Word::new(vocabulary[(i * 7 + seed) % vocabulary.len()]));
        words.push(Word::new(" "));
    }
    words
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Diff a 200-token paragraph against itself with one word rewritten, the
/// common case while writing.
fn bench_diff_single_edit(c: &mut Criterion) {
    let previous = paragraph(100, 0);
    let mut edited = previous.clone();
    edited[100] = Word::new("cat");

    c.bench_function("diff_words (200 tokens, 1 edit)", |b| {
        b.iter(|| {
            let mut current = edited.clone();
            diff::diff_words(black_box(&previous), &mut current);
            black_box(current);
        });
    });
}

/// Diff two unrelated paragraphs, where every step of the walk is a
/// substitution.
fn bench_diff_rewrite(c: &mut Criterion) {
    let previous = paragraph(100, 0);
    let rewritten = paragraph(100, 3);

    c.bench_function("diff_words (200 tokens, rewritten)", |b| {
        b.iter(|| {
            let mut current = rewritten.clone();
            diff::diff_words(black_box(&previous), &mut current);
            black_box(current);
        });
    });
}

/// Tokenize a JIIX export of a 200-token paragraph with candidates.
fn bench_tokenize(c: &mut Criterion) {
    let words: Vec<serde_json::Value> = paragraph(100, 1)
        .iter()
        .map(|w| serde_json::json!({ "label": w.label, "candidates": [w.label, "x", "y"] }))
        .collect();
    let payload = serde_json::json!({ "type": "Text", "words": words }).to_string();

    c.bench_function("jiix::tokenize (200 tokens)", |b| {
        b.iter(|| {
            let words = jiix::tokenize(black_box(&payload)).unwrap();
            black_box(words);
        });
    });
}

criterion_group!(benches, bench_diff_single_edit, bench_diff_rewrite, bench_tokenize);
criterion_main!(benches);
