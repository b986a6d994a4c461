// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scenario files: a set of blocks and a timed list of editor mutations and
// notifications, replayed against the in-memory editor.

use std::path::Path;
use std::time::Duration;

use inkguide_bridge::MemoryEditor;
use inkguide_core::error::Result;
use inkguide_core::{BlockKind, ListenerVersion, Rect, ViewTransform, Word};
use inkguide_engine::{EditorEvent, EventSender};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct Scenario {
    #[serde(default = "latest_listener")]
    pub listener_version: ListenerVersion,
    #[serde(default)]
    pub blocks: Vec<ScenarioBlock>,
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Time to keep running after the last step so pending timers fire.
    #[serde(default)]
    pub settle_ms: u64,
}

fn latest_listener() -> ListenerVersion {
    ListenerVersion::V2
}

#[derive(Debug, Deserialize)]
pub struct ScenarioBlock {
    pub id: String,
    #[serde(default = "text_kind")]
    pub kind: String,
    #[serde(default = "default_bounds")]
    pub bounds: Rect,
    #[serde(default)]
    pub attributes: String,
    #[serde(default)]
    pub words: Vec<Word>,
}

fn text_kind() -> String {
    "Text".into()
}

fn default_bounds() -> Rect {
    Rect::new(0.0, 40.0, 200.0, 20.0)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Step {
    pub wait_ms: u64,
    pub set_words: Option<SetWords>,
    pub busy: Option<SetBusy>,
    pub remove_block: Option<String>,
    pub add_block: Option<ScenarioBlock>,
    pub reject_imports: Option<bool>,
    pub event: Option<StepEvent>,
}

#[derive(Debug, Deserialize)]
pub struct SetWords {
    pub block: String,
    pub words: Vec<Word>,
}

#[derive(Debug, Deserialize)]
pub struct SetBusy {
    pub block: String,
    pub busy: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepEvent {
    PartChanged,
    ContentChanged {
        blocks: Vec<String>,
    },
    SelectionChanged {
        #[serde(default)]
        blocks: Vec<String>,
    },
    ActiveBlockChanged {
        block: String,
    },
    TransformChanged {
        #[serde(default = "unit_scale")]
        scale: f32,
        #[serde(default)]
        tx: f32,
        #[serde(default)]
        ty: f32,
    },
    Substitute {
        index: usize,
        label: String,
    },
    Enable {
        enabled: bool,
    },
    Error {
        #[serde(default)]
        block: String,
        message: String,
    },
}

fn unit_scale() -> f32 {
    1.0
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let scenario: Self = serde_json::from_str(&data)?;
        info!(
            path = %path.as_ref().display(),
            blocks = scenario.blocks.len(),
            steps = scenario.steps.len(),
            "scenario loaded"
        );
        Ok(scenario)
    }

    /// Create the scenario's blocks in `editor`.
    pub fn populate(&self, editor: &MemoryEditor) {
        for block in &self.blocks {
            add_block(editor, block);
        }
    }
}

fn add_block(editor: &MemoryEditor, block: &ScenarioBlock) {
    editor.add_block(
        &block.id,
        BlockKind::from_engine(&block.kind),
        block.bounds,
        &block.attributes,
    );
    editor.set_words(&block.id, &block.words);
}

impl Step {
    /// Apply the step's editor mutations, then return the notification to send.
    fn apply(self, editor: &MemoryEditor) -> Option<Inbound> {
        if let Some(block) = &self.add_block {
            add_block(editor, block);
        }
        if let Some(SetWords { block, words }) = &self.set_words {
            editor.set_words(block, words);
        }
        if let Some(SetBusy { block, busy }) = &self.busy {
            editor.set_busy(block, *busy);
        }
        if let Some(id) = &self.remove_block {
            editor.remove_block(id);
        }
        if let Some(reject) = self.reject_imports {
            editor.reject_imports(reject);
        }

        let event = match self.event? {
            StepEvent::PartChanged => EditorEvent::PartChanged,
            StepEvent::ContentChanged { blocks } => EditorEvent::ContentChanged(blocks),
            StepEvent::SelectionChanged { blocks } => EditorEvent::SelectionChanged(blocks),
            StepEvent::ActiveBlockChanged { block } => EditorEvent::ActiveBlockChanged(block),
            StepEvent::TransformChanged { scale, tx, ty } => {
                editor.set_view_transform(ViewTransform::scale_translate(scale, tx, ty));
                EditorEvent::TransformChanged
            }
            StepEvent::Error { block, message } => EditorEvent::Error {
                block_id: block,
                message,
            },
            StepEvent::Substitute { index, label } => return Some(Inbound::Substitute { index, label }),
            StepEvent::Enable { enabled } => return Some(Inbound::Enable(enabled)),
        };
        Some(Inbound::Editor(event))
    }
}

enum Inbound {
    Editor(EditorEvent),
    Substitute { index: usize, label: String },
    Enable(bool),
}

/// Replay `steps` in order. The sender is dropped on return, which ends the
/// dispatcher.
pub async fn play(
    steps: Vec<Step>,
    settle: Duration,
    editor: MemoryEditor,
    sender: EventSender,
) -> Result<()> {
    for (n, step) in steps.into_iter().enumerate() {
        if step.wait_ms > 0 {
            tokio::time::sleep(Duration::from_millis(step.wait_ms)).await;
        }
        let Some(inbound) = step.apply(&editor) else {
            continue;
        };
        debug!(step = n, "sending scenario step");
        match inbound {
            Inbound::Editor(event) => sender.send(event)?,
            Inbound::Substitute { index, label } => sender.substitute(index, label)?,
            Inbound::Enable(enabled) => sender.set_enabled(enabled)?,
        }
        // Let the dispatcher handle the notification before the next
        // mutation lands.
        tokio::task::yield_now().await;
    }
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
    Ok(())
}
