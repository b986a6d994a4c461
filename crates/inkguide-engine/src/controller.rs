// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Smart guide controller.
//
// Tracks the active, selected, and displayed blocks, re-exports whichever is
// authoritative on every relevant notification, diffs its words against the
// last ones shown, and runs the auto-hide and un-highlight timers.
//
// Handlers never fail. Errors from the editor are logged and turned into
// `DisplayCommand::Unchanged` so a busy block never blanks the strip.

use std::time::{Duration, Instant};

use inkguide_bridge::EditorBridge;
use inkguide_core::error::{GuideError, Result};
use inkguide_core::{BlockRef, ExportOptions, GuideConfig, UpdateCause, WordSequence};
use tracing::{debug, info, warn};

use crate::diff;
use crate::geometry::{self, StripGeometry};
use crate::jiix;
use crate::substitution::{self, CandidateMenu};
use crate::timer::{Clock, SingleShotTimer};

/// Whether and how the strip is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    /// Visible with the auto-hide timer running.
    PendingHide,
    /// Visible with no auto-hide (a zero fade-out delay, or a menu is open).
    Pinned,
}

/// A word as drawn in the strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayWord {
    /// Label with newlines flattened to spaces.
    pub text: String,
    /// Drawn highlighted.
    pub changed: bool,
}

/// Full redraw of the strip.
#[derive(Debug, Clone, PartialEq)]
pub struct StripUpdate {
    pub block_id: String,
    pub words: Vec<DisplayWord>,
    pub geometry: StripGeometry,
    /// Index of the last highlighted word, to scroll into view.
    pub scroll_to: Option<usize>,
}

/// What the display surface should do after a notification or timer.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    Show(StripUpdate),
    /// Move or resize the strip without touching its words.
    Reposition(StripGeometry),
    Hide,
    Unchanged,
}

/// The smart guide state machine.
pub struct GuideController<E> {
    editor: E,
    config: GuideConfig,
    clock: Box<dyn Clock>,
    export_options: ExportOptions,
    enabled: bool,

    active: Option<BlockRef>,
    selected: Option<BlockRef>,
    current: Option<BlockRef>,
    previous: Option<BlockRef>,
    current_words: WordSequence,
    previous_words: WordSequence,

    visibility: Visibility,
    hide_timer: SingleShotTimer,
    highlight_timer: SingleShotTimer,
}

impl<E: EditorBridge> GuideController<E> {
    /// Controller with delays read from the editor's engine configuration.
    ///
    /// `clock` must follow whatever drives `poll_timers`: `TokioClock` under
    /// the dispatcher, `SystemClock` for a plain event loop.
    pub fn new(editor: E, clock: Box<dyn Clock>) -> Self {
        let config = GuideConfig::from_lookup(|key, default| editor.number(key, default));
        Self::with_config(editor, config, clock)
    }

    pub fn with_config(editor: E, config: GuideConfig, clock: Box<dyn Clock>) -> Self {
        info!(editor = editor.name(), ?config, "smart guide attached");
        let enabled = config.enabled;
        Self {
            editor,
            config,
            clock,
            export_options: ExportOptions::words_only(),
            enabled,
            active: None,
            selected: None,
            current: None,
            previous: None,
            current_words: Vec::new(),
            previous_words: Vec::new(),
            visibility: Visibility::Hidden,
            hide_timer: SingleShotTimer::new("auto-hide"),
            highlight_timer: SingleShotTimer::new("un-highlight"),
        }
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn config(&self) -> &GuideConfig {
        &self.config
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Id of the block shown in the strip.
    pub fn current_block_id(&self) -> Option<&str> {
        self.current.as_ref().map(BlockRef::id)
    }

    pub fn active_block_id(&self) -> Option<&str> {
        self.active.as_ref().map(BlockRef::id)
    }

    pub fn selected_block_id(&self) -> Option<&str> {
        self.selected.as_ref().map(BlockRef::id)
    }

    pub fn words(&self) -> &WordSequence {
        &self.current_words
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.hide_timer.deadline(), self.highlight_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_timer.deadline()
    }

    pub fn highlight_deadline(&self) -> Option<Instant> {
        self.highlight_timer.deadline()
    }

    /// Turn the guide on or off. Disabling hides the strip.
    pub fn set_enabled(&mut self, enabled: bool) -> DisplayCommand {
        if self.enabled == enabled {
            return DisplayCommand::Unchanged;
        }
        self.enabled = enabled;
        info!(enabled, "smart guide toggled");
        if enabled {
            DisplayCommand::Unchanged
        } else {
            self.hide_strip()
        }
    }

    // -- Notifications --------------------------------------------------------

    /// The edited part was replaced. Every handle is released.
    pub fn on_part_changed(&mut self) -> DisplayCommand {
        for block in [
            self.previous.take(),
            self.current.take(),
            self.active.take(),
            self.selected.take(),
        ]
        .into_iter()
        .flatten()
        {
            block.release();
        }
        self.current_words.clear();
        self.previous_words.clear();
        self.hide_timer.stop();
        self.highlight_timer.stop();
        self.visibility = Visibility::Hidden;
        debug!("part changed, smart guide reset");
        DisplayCommand::Hide
    }

    /// Content of the given blocks changed.
    pub fn on_content_changed(&mut self, block_ids: &[String]) -> DisplayCommand {
        if !self.enabled {
            return DisplayCommand::Unchanged;
        }

        // A tracked block may have been removed and added again: the old
        // handle is dead but the id can be resolved to the new instance.
        if let Some(command) = self.reresolve_selected() {
            return command;
        }
        if let Some(command) = self.reresolve_active() {
            return command;
        }

        let Some(active) = self.active.as_ref() else {
            return DisplayCommand::Unchanged;
        };
        if !block_ids.iter().any(|id| id == active.id()) {
            return DisplayCommand::Unchanged;
        }

        let block = active.shallow_copy();
        self.show_block(block, UpdateCause::Edit)
    }

    /// The selection now intersects the given blocks.
    pub fn on_selection_changed(&mut self, block_ids: &[String]) -> DisplayCommand {
        if !self.enabled {
            return DisplayCommand::Unchanged;
        }

        if let Some(old) = self.selected.take() {
            old.release();
        }
        self.selected = block_ids.iter().find_map(|id| {
            let block = self.editor.block_by_id(id)?;
            if block.kind().is_text() {
                Some(block)
            } else {
                block.release();
                None
            }
        });

        let changed = match (&self.selected, &self.current) {
            (Some(selected), Some(current)) => selected.id() != current.id(),
            (None, None) => false,
            _ => true,
        };
        if !changed {
            return DisplayCommand::Unchanged;
        }

        match &self.selected {
            Some(selected) => {
                let block = selected.shallow_copy();
                self.show_block(block, UpdateCause::Selection)
            }
            None => self.hide_strip(),
        }
    }

    /// The block receiving input changed.
    pub fn on_active_block_changed(&mut self, block_id: &str) -> DisplayCommand {
        if !self.enabled {
            return DisplayCommand::Unchanged;
        }

        if let Some(old) = self.active.take() {
            old.release();
        }
        self.active = self.editor.block_by_id(block_id);

        let Some(active) = self.active.as_ref() else {
            debug!(block_id, "active block does not resolve");
            return self.hide_strip();
        };
        if self.current_block_id() == Some(active.id()) {
            // Already on screen through the selection.
            return DisplayCommand::Unchanged;
        }

        let block = active.shallow_copy();
        self.show_block(block, UpdateCause::ActiveBlock)
    }

    /// Scroll or zoom changed. Only the strip position follows.
    pub fn on_transform_changed(&mut self) -> DisplayCommand {
        if !self.enabled {
            return DisplayCommand::Unchanged;
        }
        match &self.current {
            Some(current) if !current.is_valid() => {
                debug!(block_id = current.id(), "displayed block is gone, hiding strip");
                self.hide_strip()
            }
            Some(current) => DisplayCommand::Reposition(self.geometry_for(current)),
            None => DisplayCommand::Unchanged,
        }
    }

    // -- Timers ---------------------------------------------------------------

    /// Fire due timers and return what the surface should do.
    pub fn poll_timers(&mut self) -> Vec<DisplayCommand> {
        let now = self.clock.now();
        let mut commands = Vec::new();

        if self.hide_timer.fire_if_due(now) {
            debug!("auto-hide timer expired");
            commands.push(self.hide_strip());
        }

        if self.highlight_timer.fire_if_due(now) {
            let had_highlight = self.current_words.iter().any(|w| w.changed);
            diff::mark_all(&mut self.current_words, false);
            if had_highlight {
                if let Some(update) = self.strip_update(None) {
                    commands.push(DisplayCommand::Show(update));
                }
            }
        }

        commands
    }

    // -- Candidates -----------------------------------------------------------

    /// The user tapped word `index`. Keeps the strip up while a menu is open.
    pub fn candidate_menu(&mut self, index: usize) -> Option<CandidateMenu> {
        self.current.as_ref()?;
        self.hide_timer.stop();
        if self.visibility == Visibility::PendingHide {
            self.visibility = Visibility::Pinned;
        }
        let word = self.current_words.get(index)?;
        CandidateMenu::for_word(index, word)
    }

    /// Current strip contents without touching timers or highlight state.
    pub fn redraw(&self) -> DisplayCommand {
        if self.visibility == Visibility::Hidden {
            return DisplayCommand::Unchanged;
        }
        self.strip_update(None)
            .map_or(DisplayCommand::Unchanged, DisplayCommand::Show)
    }

    /// Replace word `index` with one of its candidates.
    ///
    /// The displayed label only changes once the editor accepted the import.
    pub fn substitute(&mut self, index: usize, label: &str) -> Result<()> {
        let block = self.current.as_ref().ok_or(GuideError::NoCurrentBlock)?;
        let word = self
            .current_words
            .get(index)
            .ok_or(GuideError::WordIndexOutOfRange {
                index,
                len: self.current_words.len(),
            })?;

        if word.is_blank() || !word.candidates.iter().any(|c| c == label) {
            return Err(GuideError::CandidateNotOffered {
                index,
                label: label.to_string(),
            });
        }
        if word.label == label {
            debug!(index, "candidate already chosen");
            return Ok(());
        }

        if let Err(e) =
            substitution::substitute_word(&self.editor, block, &self.export_options, index, label)
        {
            warn!(block_id = block.id(), index, error = %e, "substitution failed");
            return Err(e);
        }

        if let Some(word) = self.current_words.get_mut(index) {
            word.label = label.to_string();
        }
        Ok(())
    }

    // -- Internals ------------------------------------------------------------

    /// Replace a dead active handle. Returns a command when the strip had to
    /// be hidden because the block is gone.
    fn reresolve_active(&mut self) -> Option<DisplayCommand> {
        let stale = self.active.as_ref().filter(|block| !block.is_valid())?;
        let id = stale.id().to_string();

        if let Some(old) = self.active.take() {
            old.release();
        }
        self.active = self.editor.block_by_id(&id);
        if self.active.is_some() {
            debug!(block_id = %id, "active block re-resolved");
            return None;
        }

        let err = GuideError::StaleBlockReference(id.clone());
        debug!(error = %err, "active block is gone");
        if self.current_block_id() == Some(id.as_str()) {
            return Some(self.hide_strip());
        }
        Some(DisplayCommand::Unchanged)
    }

    /// Replace a dead selected handle. Returns a command when the displayed
    /// block was the selected one: it is redrawn from the new instance, or,
    /// if the id is gone, the strip falls back to the active block or hides.
    fn reresolve_selected(&mut self) -> Option<DisplayCommand> {
        let stale = self.selected.as_ref().filter(|block| !block.is_valid())?;
        let id = stale.id().to_string();

        if let Some(old) = self.selected.take() {
            old.release();
        }
        self.selected = self.editor.block_by_id(&id);
        let displayed = self.current_block_id() == Some(id.as_str());

        if let Some(selected) = &self.selected {
            debug!(block_id = %id, "selected block re-resolved");
            if !displayed {
                return None;
            }
            let block = selected.shallow_copy();
            return Some(self.show_block(block, UpdateCause::Selection));
        }

        let err = GuideError::StaleBlockReference(id.clone());
        debug!(error = %err, "selected block is gone");
        if !displayed {
            return None;
        }
        let fallback = self
            .active
            .as_ref()
            .filter(|active| active.is_valid() && active.id() != id)
            .map(BlockRef::shallow_copy);
        let command = match fallback {
            Some(block) => self.show_block(block, UpdateCause::ActiveBlock),
            None => DisplayCommand::Unchanged,
        };
        if command == DisplayCommand::Unchanged {
            return Some(self.hide_strip());
        }
        Some(command)
    }

    /// Export `block`, make it the displayed block, and refresh. On export
    /// failure the current display is left exactly as it was.
    fn show_block(&mut self, block: BlockRef, cause: UpdateCause) -> DisplayCommand {
        let words = match jiix::fetch_words(&self.editor, &block, &self.export_options) {
            Ok(words) => words,
            Err(e) => {
                if e.is_transient() {
                    debug!(block_id = block.id(), error = %e, "export not ready, keeping strip");
                } else {
                    warn!(block_id = block.id(), error = %e, "export failed, keeping strip");
                }
                block.release();
                return DisplayCommand::Unchanged;
            }
        };

        self.replace_current(block, words);
        self.refresh(cause)
    }

    /// Swap in a new displayed block and flag its changed words.
    fn replace_current(&mut self, block: BlockRef, words: WordSequence) {
        if let Some(old) = self.current.take() {
            if let Some(prev) = self.previous.replace(old) {
                prev.release();
            }
            self.previous_words = std::mem::take(&mut self.current_words);
        }

        let same_block = self
            .previous
            .as_ref()
            .is_some_and(|prev| prev.id() == block.id());

        self.current_words = words;
        if same_block {
            diff::diff_words(&self.previous_words, &mut self.current_words);
        } else {
            diff::mark_all(&mut self.current_words, true);
        }
        self.current = Some(block);
    }

    fn refresh(&mut self, cause: UpdateCause) -> DisplayCommand {
        let scroll_to = self.current_words.iter().rposition(|w| w.changed);
        let Some(update) = self.strip_update(scroll_to) else {
            return self.hide_strip();
        };

        let delay = self.fade_out_delay(cause, &update.block_id);
        let now = self.clock.now();
        if cause != UpdateCause::View {
            self.hide_timer.stop();
            if delay.is_zero() {
                self.visibility = Visibility::Pinned;
            } else {
                self.hide_timer.start(now, delay);
                self.visibility = Visibility::PendingHide;
            }
        }
        if scroll_to.is_some() {
            self.highlight_timer.start(now, self.config.highlight_removal());
        }

        debug!(
            block_id = %update.block_id,
            words = update.words.len(),
            delay_ms = delay.as_millis() as u64,
            ?cause,
            "strip refreshed"
        );
        DisplayCommand::Show(update)
    }

    fn fade_out_delay(&self, cause: UpdateCause, block_id: &str) -> Duration {
        let ms = match cause {
            UpdateCause::Edit if self.config.is_diagram_block(block_id) => {
                self.config.fade_out_write_in_diagram_ms
            }
            UpdateCause::Edit => self.config.fade_out_write_ms,
            _ => self.config.fade_out_other_ms,
        };
        Duration::from_millis(ms)
    }

    fn strip_update(&self, scroll_to: Option<usize>) -> Option<StripUpdate> {
        let current = self.current.as_ref()?;
        Some(StripUpdate {
            block_id: current.id().to_string(),
            words: self
                .current_words
                .iter()
                .map(|word| DisplayWord {
                    text: word.label.replace('\n', " "),
                    changed: word.changed,
                })
                .collect(),
            geometry: self.geometry_for(current),
            scroll_to,
        })
    }

    fn geometry_for(&self, block: &BlockRef) -> StripGeometry {
        geometry::strip_geometry(
            block.bounds(),
            block.attributes(),
            &self.editor.view_transform(),
        )
    }

    /// Take the strip down. The displayed block becomes the diff baseline
    /// for the next time it is shown.
    fn hide_strip(&mut self) -> DisplayCommand {
        self.hide_timer.stop();
        self.highlight_timer.stop();
        if let Some(old) = self.current.take() {
            if let Some(prev) = self.previous.replace(old) {
                prev.release();
            }
            self.previous_words = std::mem::take(&mut self.current_words);
            diff::mark_all(&mut self.previous_words, false);
        }
        self.visibility = Visibility::Hidden;
        DisplayCommand::Hide
    }
}
