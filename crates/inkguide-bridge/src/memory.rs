// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory editor for desktop builds, tests, and scenario replay.
//
// Blocks hold a JIIX document built from a word list. Removing a block
// invalidates every handle onto it; adding a block under the same id again
// creates a new engine instance that handles must be re-resolved to.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use inkguide_core::error::{GuideError, Result};
use inkguide_core::{BlockKind, BlockRecord, BlockRef, ExportOptions, Rect, ViewTransform, Word};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::traits::*;

struct BlockEntry {
    record: Arc<BlockRecord>,
    jiix: Value,
}

#[derive(Default)]
struct EditorState {
    blocks: BTreeMap<String, BlockEntry>,
    busy: HashSet<String>,
    reject_imports: bool,
    imports: Vec<(String, String)>,
    numbers: HashMap<String, f64>,
    transform: ViewTransform,
}

/// Editor double backed by plain data.
///
/// Cloning yields another view onto the same state, so a test can keep a
/// clone while the guide owns the original.
#[derive(Clone, Default)]
pub struct MemoryEditor {
    state: Arc<Mutex<EditorState>>,
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add (or replace) a block. Replacing invalidates handles onto the old one.
    pub fn add_block(&self, id: &str, kind: BlockKind, bounds: Rect, attributes: &str) {
        let record = Arc::new(BlockRecord::new(id, kind, bounds, attributes));
        let entry = BlockEntry {
            record,
            jiix: jiix_document(id, &[]),
        };
        if let Some(old) = self.state().blocks.insert(id.to_string(), entry) {
            old.record.invalidate();
        }
        debug!(block_id = id, "block added");
    }

    /// Add a text block holding the given words.
    pub fn add_text_block(&self, id: &str, words: &[Word]) {
        self.add_block(id, BlockKind::Text, Rect::new(0.0, 0.0, 100.0, 10.0), "");
        self.set_words(id, words);
    }

    /// Replace the recognised words of a block.
    pub fn set_words(&self, id: &str, words: &[Word]) {
        let mut state = self.state();
        match state.blocks.get_mut(id) {
            Some(entry) => entry.jiix = jiix_document(id, words),
            None => warn!(block_id = id, "set_words on unknown block"),
        }
    }

    /// Store a raw JIIX document for a block, bypassing the word builder.
    pub fn set_raw_jiix(&self, id: &str, jiix: Value) {
        if let Some(entry) = self.state().blocks.get_mut(id) {
            entry.jiix = jiix;
        }
    }

    /// Remove a block and invalidate every outstanding handle onto it.
    pub fn remove_block(&self, id: &str) {
        if let Some(entry) = self.state().blocks.remove(id) {
            entry.record.invalidate();
            debug!(block_id = id, "block removed");
        }
    }

    /// While busy, exports of the block fail as if recognition were running.
    pub fn set_busy(&self, id: &str, busy: bool) {
        let mut state = self.state();
        if busy {
            state.busy.insert(id.to_string());
        } else {
            state.busy.remove(id);
        }
    }

    pub fn reject_imports(&self, reject: bool) {
        self.state().reject_imports = reject;
    }

    pub fn set_view_transform(&self, transform: ViewTransform) {
        self.state().transform = transform;
    }

    pub fn set_number(&self, key: &str, value: f64) {
        self.state().numbers.insert(key.to_string(), value);
    }

    /// Every accepted import as `(block_id, payload)`, oldest first.
    pub fn imports(&self) -> Vec<(String, String)> {
        self.state().imports.clone()
    }

    /// Current JIIX document of a block.
    pub fn jiix(&self, id: &str) -> Option<Value> {
        self.state().blocks.get(id).map(|entry| entry.jiix.clone())
    }

    /// Handles onto the block held outside the editor.
    pub fn outstanding_handles(&self, id: &str) -> usize {
        self.state()
            .blocks
            .get(id)
            .map(|entry| Arc::strong_count(&entry.record) - 1)
            .unwrap_or(0)
    }

    /// Look up the live entry a handle points at.
    fn check_handle<'a>(state: &'a EditorState, block: &BlockRef) -> Result<&'a BlockEntry> {
        let entry = state
            .blocks
            .get(block.id())
            .filter(|_| block.is_valid())
            .ok_or_else(|| GuideError::StaleBlockReference(block.id().to_string()))?;
        Ok(entry)
    }
}

impl EditorBridge for MemoryEditor {
    fn name(&self) -> &str {
        "memory"
    }
}

impl BlockExport for MemoryEditor {
    fn export_jiix(&self, block: &BlockRef, options: &ExportOptions) -> Result<String> {
        let state = self.state();
        let entry = Self::check_handle(&state, block)?;
        if state.busy.contains(block.id()) {
            return Err(GuideError::ExportUnavailable(format!(
                "block {} is being recognised",
                block.id()
            )));
        }
        if *options != ExportOptions::words_only() {
            debug!(block_id = block.id(), "memory editor only exports words");
        }
        Ok(serde_json::to_string(&entry.jiix)?)
    }
}

impl BlockImport for MemoryEditor {
    fn import_jiix(&self, payload: &str, block: &BlockRef) -> Result<()> {
        let mut state = self.state();
        Self::check_handle(&state, block)?;

        if state.reject_imports {
            warn!(block_id = block.id(), "import refused");
            return Err(GuideError::ImportRejected("editor refused the import".into()));
        }

        let document: Value = serde_json::from_str(payload)
            .map_err(|e| GuideError::ImportRejected(format!("invalid JSON: {e}")))?;
        let words_ok = document
            .get("words")
            .and_then(Value::as_array)
            .is_some_and(|words| words.iter().all(|w| w.get("label").is_some_and(Value::is_string)));
        if !words_ok {
            warn!(block_id = block.id(), "import payload has no valid word list");
            return Err(GuideError::ImportRejected("payload has no valid word list".into()));
        }

        let id = block.id().to_string();
        if let Some(entry) = state.blocks.get_mut(&id) {
            entry.jiix = document;
        }
        state.imports.push((id, payload.to_string()));
        debug!(block_id = block.id(), "import accepted");
        Ok(())
    }
}

impl BlockLookup for MemoryEditor {
    fn block_by_id(&self, id: &str) -> Option<BlockRef> {
        self.state()
            .blocks
            .get(id)
            .map(|entry| BlockRef::new(Arc::clone(&entry.record)))
    }
}

impl ViewSource for MemoryEditor {
    fn view_transform(&self) -> ViewTransform {
        self.state().transform
    }
}

impl EngineConfiguration for MemoryEditor {
    fn number(&self, key: &str, default: f64) -> f64 {
        self.state().numbers.get(key).copied().unwrap_or(default)
    }
}

/// Build a JIIX text document the way the engine lays one out.
fn jiix_document(id: &str, words: &[Word]) -> Value {
    let label: String = words.iter().map(|w| w.label.as_str()).collect();
    let words: Vec<Value> = words
        .iter()
        .map(|word| {
            if word.candidates.is_empty() {
                json!({ "label": word.label })
            } else {
                json!({ "label": word.label, "candidates": word.candidates })
            }
        })
        .collect();

    json!({
        "type": "Text",
        "id": id,
        "label": label,
        "words": words,
        "version": "3",
    })
}
