// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Smart guide configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GuideError, Result};

/// Engine configuration key: fade-out delay after writing inside a diagram.
pub const KEY_FADE_OUT_WRITE_IN_DIAGRAM: &str = "smart-guide.fade-out-delay.write-in-diagram";
/// Engine configuration key: fade-out delay after writing elsewhere.
pub const KEY_FADE_OUT_WRITE: &str = "smart-guide.fade-out-delay.write";
/// Engine configuration key: fade-out delay for every other cause.
pub const KEY_FADE_OUT_OTHER: &str = "smart-guide.fade-out-delay.other";
/// Engine configuration key: delay before highlighted words revert.
pub const KEY_HIGHLIGHT_REMOVAL: &str = "smart-guide.highlight-removal-delay";

const DEFAULT_FADE_OUT_WRITE_IN_DIAGRAM_MS: u64 = 3000;
const DEFAULT_FADE_OUT_WRITE_MS: u64 = 0;
const DEFAULT_FADE_OUT_OTHER_MS: u64 = 0;
const DEFAULT_HIGHLIGHT_REMOVAL_MS: u64 = 2000;

/// Timing and behaviour settings for the smart guide.
///
/// A fade-out delay of zero means the strip never hides on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Hide delay after writing inside a diagram block.
    pub fade_out_write_in_diagram_ms: u64,
    /// Hide delay after writing in any other block.
    pub fade_out_write_ms: u64,
    /// Hide delay after selection or active-block changes.
    pub fade_out_other_ms: u64,
    /// How long changed words stay highlighted.
    pub highlight_removal_ms: u64,
    /// Whether the smart guide reacts to notifications at all.
    pub enabled: bool,
    /// Block id prefix identifying diagram containers.
    pub diagram_prefix: String,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            fade_out_write_in_diagram_ms: DEFAULT_FADE_OUT_WRITE_IN_DIAGRAM_MS,
            fade_out_write_ms: DEFAULT_FADE_OUT_WRITE_MS,
            fade_out_other_ms: DEFAULT_FADE_OUT_OTHER_MS,
            highlight_removal_ms: DEFAULT_HIGHLIGHT_REMOVAL_MS,
            enabled: true,
            diagram_prefix: "diagram/".into(),
        }
    }
}

impl GuideConfig {
    /// Resolve every delay through an engine-style numeric lookup.
    ///
    /// `lookup(key, default)` mirrors the engine's `GetNumber`. Negative or
    /// non-finite answers clamp to zero.
    pub fn from_lookup(lookup: impl Fn(&str, f64) -> f64) -> Self {
        let number = |key: &str, default: u64| to_millis(lookup(key, default as f64));

        Self {
            fade_out_write_in_diagram_ms: number(
                KEY_FADE_OUT_WRITE_IN_DIAGRAM,
                DEFAULT_FADE_OUT_WRITE_IN_DIAGRAM_MS,
            ),
            fade_out_write_ms: number(KEY_FADE_OUT_WRITE, DEFAULT_FADE_OUT_WRITE_MS),
            fade_out_other_ms: number(KEY_FADE_OUT_OTHER, DEFAULT_FADE_OUT_OTHER_MS),
            highlight_removal_ms: number(KEY_HIGHLIGHT_REMOVAL, DEFAULT_HIGHLIGHT_REMOVAL_MS),
            ..Self::default()
        }
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        if config.diagram_prefix.is_empty() {
            return Err(GuideError::Config("diagram_prefix must not be empty".into()));
        }
        Ok(config)
    }

    /// Write settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Whether a block id denotes a diagram container.
    pub fn is_diagram_block(&self, block_id: &str) -> bool {
        block_id.starts_with(&self.diagram_prefix)
    }

    pub fn highlight_removal(&self) -> Duration {
        Duration::from_millis(self.highlight_removal_ms)
    }
}

fn to_millis(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}
