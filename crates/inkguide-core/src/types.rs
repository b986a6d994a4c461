// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the smart guide.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// One recognised token of a block, as shown in the smart guide strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Currently recognised text. May contain spaces or a newline.
    pub label: String,
    /// Display-only flag, recomputed on every diff pass.
    #[serde(skip)]
    pub changed: bool,
    /// Alternate recognitions offered by the engine.
    #[serde(default)]
    pub candidates: Vec<String>,
}

impl Word {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            changed: false,
            candidates: Vec::new(),
        }
    }

    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    /// Layout spaces and other blank tokens take part in diffing but never
    /// open a candidate menu.
    pub fn is_blank(&self) -> bool {
        self.label.trim().is_empty()
    }
}

/// Words of one block in left-to-right reading order.
pub type WordSequence = Vec<Word>;

/// Content block kinds reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Text,
    Diagram,
    Math,
    Drawing,
    Container,
    Other(String),
}

impl BlockKind {
    /// Parse the engine's type string ("Text", "Diagram", ...).
    pub fn from_engine(name: &str) -> Self {
        match name {
            "Text" => Self::Text,
            "Diagram" => Self::Diagram,
            "Math" => Self::Math,
            "Drawing" => Self::Drawing,
            "Container" => Self::Container,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Axis-aligned rectangle in document (millimetre) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// 2D affine transform from document to view (pixel) coordinates.
///
/// Maps `(x, y)` to `(xx*x + xy*y + tx, yx*x + yy*y + ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub xx: f32,
    pub yx: f32,
    pub xy: f32,
    pub yy: f32,
    pub tx: f32,
    pub ty: f32,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        xx: 1.0,
        yx: 0.0,
        xy: 0.0,
        yy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn scale_translate(scale: f32, tx: f32, ty: f32) -> Self {
        Self {
            xx: scale,
            yy: scale,
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.xx * x + self.xy * y + self.tx,
            self.yx * x + self.yy * y + self.ty,
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// JIIX export switches. The smart guide only wants labels and candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub strokes: bool,
    pub bounding_box: bool,
    pub glyphs: bool,
    pub primitives: bool,
    pub chars: bool,
}

impl ExportOptions {
    pub fn words_only() -> Self {
        Self {
            strokes: false,
            bounding_box: false,
            glyphs: false,
            primitives: false,
            chars: false,
        }
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            strokes: true,
            bounding_box: true,
            glyphs: true,
            primitives: true,
            chars: true,
        }
    }
}

/// Why the strip is being refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateCause {
    /// Writing or an editing gesture changed the block content.
    Edit,
    /// The selection changed.
    Selection,
    /// The active block changed without a content edit.
    ActiveBlock,
    /// Scroll or zoom changed the view.
    View,
}

/// Editor listener interface revisions.
///
/// `V1` only carries part, content, transform, and error notifications;
/// `V2` adds selection and active-block notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ListenerVersion {
    V1,
    V2,
}

/// Engine-side state of one content block.
///
/// Shared between the editor and every [`BlockRef`] handed out for it.
#[derive(Debug)]
pub struct BlockRecord {
    id: String,
    kind: BlockKind,
    bounds: Rect,
    attributes: String,
    valid: AtomicBool,
}

impl BlockRecord {
    pub fn new(id: impl Into<String>, kind: BlockKind, bounds: Rect, attributes: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            bounds,
            attributes: attributes.into(),
            valid: AtomicBool::new(true),
        }
    }

    /// Mark the record as removed from the engine. Outstanding handles
    /// become invalid and must be re-resolved by id.
    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }
}

/// Owning handle onto an engine content block.
///
/// Handles are not `Clone`: duplicating one is an explicit
/// [`shallow_copy`](Self::shallow_copy), and giving one up is an explicit
/// [`release`](Self::release).
#[derive(Debug)]
pub struct BlockRef {
    record: Arc<BlockRecord>,
}

impl BlockRef {
    pub fn new(record: Arc<BlockRecord>) -> Self {
        Self { record }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn kind(&self) -> &BlockKind {
        &self.record.kind
    }

    pub fn bounds(&self) -> Rect {
        self.record.bounds
    }

    /// Engine attributes JSON (padding, style). Empty when the block has none.
    pub fn attributes(&self) -> &str {
        &self.record.attributes
    }

    pub fn is_valid(&self) -> bool {
        self.record.valid.load(Ordering::Acquire)
    }

    /// A second handle onto the same engine block.
    pub fn shallow_copy(&self) -> Self {
        Self {
            record: Arc::clone(&self.record),
        }
    }

    /// Give the handle back to the engine.
    pub fn release(self) {
        drop(self);
    }

    /// Number of live handles onto this block, including this one.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.record)
    }

    /// Whether both handles point at the same engine instance.
    pub fn same_instance(&self, other: &BlockRef) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> Arc<BlockRecord> {
        Arc::new(BlockRecord::new(id, BlockKind::Text, Rect::default(), ""))
    }

    #[test]
    fn shallow_copy_shares_record() {
        let rec = record("text/0");
        let a = BlockRef::new(Arc::clone(&rec));
        let b = a.shallow_copy();
        assert!(a.same_instance(&b));
        assert_eq!(Arc::strong_count(&rec), 3);

        b.release();
        assert_eq!(Arc::strong_count(&rec), 2);
        a.release();
        assert_eq!(Arc::strong_count(&rec), 1);
    }

    #[test]
    fn invalidation_is_visible_through_handles() {
        let rec = record("text/0");
        let handle = BlockRef::new(Arc::clone(&rec));
        assert!(handle.is_valid());
        rec.invalidate();
        assert!(!handle.is_valid());
    }

    #[test]
    fn transform_maps_points() {
        let t = ViewTransform::scale_translate(2.0, 10.0, -5.0);
        assert_eq!(t.apply(3.0, 4.0), (16.0, 3.0));
        assert_eq!(ViewTransform::IDENTITY.apply(3.0, 4.0), (3.0, 4.0));
    }

    #[test]
    fn blank_words() {
        assert!(Word::new(" ").is_blank());
        assert!(Word::new("\n").is_blank());
        assert!(!Word::new("cat").is_blank());
    }

    #[test]
    fn engine_kind_names() {
        assert!(BlockKind::from_engine("Text").is_text());
        assert_eq!(BlockKind::from_engine("Raw Content"), BlockKind::Other("Raw Content".into()));
    }
}
