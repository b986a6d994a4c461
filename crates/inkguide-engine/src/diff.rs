// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word-level Levenshtein diff.
//
// The table is built over whole words rather than characters. A backward
// walk from the bottom-right corner then aligns words, preferring the
// diagonal, then "up" (a word only in the previous list), then "left" (a
// word only in the current list). Aligned words are changed only when their
// labels differ; words reached by insertion stay marked as changed.

use inkguide_core::Word;

/// `(len(previous) + 1) x (len(current) + 1)` edit distance table.
pub struct DistanceTable {
    width: usize,
    cells: Vec<usize>,
}

impl DistanceTable {
    pub fn build(previous: &[Word], current: &[Word]) -> Self {
        let rows = previous.len() + 1;
        let width = current.len() + 1;
        let mut cells = vec![0usize; rows * width];

        for i in 1..rows {
            cells[i * width] = i;
        }
        for j in 1..width {
            cells[j] = j;
        }

        for i in 1..rows {
            for j in 1..width {
                let substitution = usize::from(previous[i - 1].label != current[j - 1].label);
                let deletion = cells[(i - 1) * width + j] + 1;
                let insertion = cells[i * width + j - 1] + 1;
                let diagonal = cells[(i - 1) * width + j - 1] + substitution;
                cells[i * width + j] = deletion.min(insertion).min(diagonal);
            }
        }

        Self { width, cells }
    }

    pub fn get(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.width + j]
    }

    /// Minimum number of word edits between the two lists.
    pub fn distance(&self) -> usize {
        self.cells[self.cells.len() - 1]
    }
}

/// Word-level edit distance between two lists.
pub fn edit_distance(previous: &[Word], current: &[Word]) -> usize {
    DistanceTable::build(previous, current).distance()
}

/// Set every word's changed flag.
pub fn mark_all(words: &mut [Word], changed: bool) {
    for word in words {
        word.changed = changed;
    }
}

/// Flag the words of `current` that differ from `previous`.
///
/// Every word starts out changed. When `previous` is empty nothing can be
/// aligned and the whole list stays changed.
pub fn diff_words(previous: &[Word], current: &mut [Word]) {
    mark_all(current, true);
    if previous.is_empty() || current.is_empty() {
        return;
    }

    let table = DistanceTable::build(previous, current);
    let mut i = previous.len();
    let mut j = current.len();

    while j > 0 {
        let left = table.get(i, j - 1);
        let (diagonal, up) = if i > 0 {
            (Some(table.get(i - 1, j - 1)), Some(table.get(i - 1, j)))
        } else {
            (None, None)
        };

        match (diagonal, up) {
            (Some(d), Some(u)) if d <= u && d <= left => {
                i -= 1;
                j -= 1;
                current[j].changed = previous[i].label != current[j].label;
            }
            (_, Some(u)) if u <= left => i -= 1,
            _ => j -= 1,
        }
    }
}
