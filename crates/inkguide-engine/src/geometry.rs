// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Strip placement.
//
// The strip spans the block's top edge between its left and right padding
// and sits one strip height above it, in view coordinates.

use inkguide_core::{Rect, ViewTransform};
use serde::Deserialize;
use tracing::debug;

/// Height of the strip in view pixels.
pub const STRIP_HEIGHT: f32 = 32.0;

/// Position and width of the strip in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StripGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

#[derive(Debug, Default, Deserialize)]
struct BlockAttributes {
    padding: Option<Padding>,
}

#[derive(Debug, Default, Deserialize)]
struct Padding {
    #[serde(default)]
    left: f32,
    #[serde(default)]
    right: f32,
}

/// Left and right padding from a block's attributes JSON.
pub fn block_padding(attributes: &str) -> (f32, f32) {
    if attributes.trim().is_empty() {
        return (0.0, 0.0);
    }
    match serde_json::from_str::<BlockAttributes>(attributes) {
        Ok(BlockAttributes {
            padding: Some(padding),
        }) => (padding.left, padding.right),
        Ok(_) => (0.0, 0.0),
        Err(e) => {
            debug!(error = %e, "unreadable block attributes, assuming no padding");
            (0.0, 0.0)
        }
    }
}

/// Place the strip above `bounds`.
pub fn strip_geometry(bounds: Rect, attributes: &str, transform: &ViewTransform) -> StripGeometry {
    let (left, right) = block_padding(attributes);
    let (x, y) = transform.apply(bounds.x + left, bounds.y);
    let (right_x, _) = transform.apply(bounds.x + bounds.width - right, bounds.y);

    StripGeometry {
        x,
        y: y - STRIP_HEIGHT,
        width: right_x - x,
    }
}
