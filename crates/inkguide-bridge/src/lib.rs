// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! inkguide bridge: editor abstractions.
//!
//! The recognition engine is an opaque native SDK. This crate describes the
//! handful of editor capabilities the smart guide needs as traits, so the
//! guide itself never links against the SDK or a UI toolkit.

pub mod memory;
pub mod traits;

pub use memory::MemoryEditor;
pub use traits::{
    BlockExport, BlockImport, BlockLookup, EditorBridge, EngineConfiguration, ViewSource,
};
