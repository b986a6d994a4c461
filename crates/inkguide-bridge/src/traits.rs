// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor capability traits consumed by the smart guide.
//
// Each concern is its own trait. `EditorBridge` groups them so the guide can
// be generic over a single type parameter.

use inkguide_core::error::Result;
use inkguide_core::{BlockRef, ExportOptions, ViewTransform};

/// Everything the smart guide needs from an editor.
pub trait EditorBridge:
    BlockExport + BlockImport + BlockLookup + ViewSource + EngineConfiguration
{
    /// Human-readable name of the backing editor (e.g. "iink 2.1", "memory").
    fn name(&self) -> &str;
}

/// Synchronous structured-text export.
pub trait BlockExport {
    /// Export `block` as a JIIX document.
    ///
    /// Fails with `ExportUnavailable` while the block is being recognised
    /// and with `StaleBlockReference` when the handle no longer resolves.
    fn export_jiix(&self, block: &BlockRef, options: &ExportOptions) -> Result<String>;
}

/// Synchronous structured-text import.
pub trait BlockImport {
    /// Replace the content of `block` with the given JIIX document.
    fn import_jiix(&self, payload: &str, block: &BlockRef) -> Result<()>;
}

/// Block resolution by identifier.
pub trait BlockLookup {
    /// Resolve `id` to a fresh handle, or `None` if no such block exists.
    fn block_by_id(&self, id: &str) -> Option<BlockRef>;
}

/// Current document-to-view mapping of the renderer.
pub trait ViewSource {
    fn view_transform(&self) -> ViewTransform;
}

/// Numeric engine configuration.
pub trait EngineConfiguration {
    /// Value stored under `key`, or `default` when unset.
    fn number(&self, key: &str, default: f64) -> f64;
}
