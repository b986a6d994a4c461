// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// inkguide engine: the smart guide proper. Turns editor notifications into
// strip updates: export the block as JIIX, tokenize, diff against the last
// word list, and schedule the hide and un-highlight timers.

pub mod controller;
pub mod diff;
pub mod dispatch;
pub mod geometry;
pub mod jiix;
pub mod substitution;
pub mod timer;

pub use controller::{DisplayCommand, DisplayWord, GuideController, StripUpdate, Visibility};
pub use dispatch::{Dispatcher, EditorEvent, EventSender, GuideSurface};
pub use substitution::{CandidateEntry, CandidateMenu};
pub use timer::{Clock, ManualClock, SingleShotTimer, SystemClock, TokioClock};
