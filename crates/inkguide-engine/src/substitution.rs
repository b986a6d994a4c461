// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate menus and word substitution.
//
// Substitution always re-exports the block instead of patching a cached
// payload: the engine may have moved on since the strip was drawn.

use inkguide_bridge::{BlockExport, BlockImport};
use inkguide_core::error::Result;
use inkguide_core::{BlockRef, ExportOptions, Word};
use tracing::{debug, info};

use crate::jiix;

/// One line of a candidate menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub label: String,
    /// The engine's current choice for the word.
    pub current: bool,
    /// Whether picking the entry does anything.
    pub enabled: bool,
}

/// Alternatives offered for one word of the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMenu {
    pub word_index: usize,
    pub entries: Vec<CandidateEntry>,
}

impl CandidateMenu {
    /// Menu for `word`, or `None` for blank tokens.
    ///
    /// A word without candidates still gets a single, disabled entry
    /// showing its label.
    pub fn for_word(word_index: usize, word: &Word) -> Option<Self> {
        if word.is_blank() {
            return None;
        }

        let mut entries: Vec<CandidateEntry> = word
            .candidates
            .iter()
            .map(|candidate| CandidateEntry {
                label: candidate.clone(),
                current: *candidate == word.label,
                enabled: *candidate != word.label,
            })
            .collect();

        if entries.is_empty() {
            entries.push(CandidateEntry {
                label: word.label.clone(),
                current: true,
                enabled: false,
            });
        }

        Some(Self { word_index, entries })
    }
}

/// Rewrite the label of word `index` of `block` through export and import.
pub fn substitute_word<E>(
    editor: &E,
    block: &BlockRef,
    options: &ExportOptions,
    index: usize,
    label: &str,
) -> Result<()>
where
    E: BlockExport + BlockImport,
{
    let payload = editor.export_jiix(block, options)?;
    let rewritten = jiix::replace_label(&payload, index, label)?;
    debug!(block_id = block.id(), index, "importing substituted word");
    editor.import_jiix(&rewritten, block)?;
    info!(block_id = block.id(), index, label, "word substituted");
    Ok(())
}
