// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text rendering of the smart guide strip.

use inkguide_core::notice::{Notice, Severity};
use inkguide_engine::{DisplayCommand, DisplayWord, GuideSurface};
use tokio::time::Instant;

/// Prints strip updates to stdout and notices to stderr, stamped with the
/// time since the surface was created.
pub struct ConsoleSurface {
    start: Instant,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    fn stamp(&self) -> String {
        format!("{:>7.3}s", self.start.elapsed().as_secs_f64())
    }
}

impl Default for ConsoleSurface {
    fn default() -> Self {
        Self::new()
    }
}

/// Render words with highlighted ones in brackets.
pub fn render_words(words: &[DisplayWord]) -> String {
    words
        .iter()
        .map(|word| {
            if word.changed && !word.text.trim().is_empty() {
                format!("[{}]", word.text)
            } else {
                word.text.clone()
            }
        })
        .collect()
}

impl GuideSurface for ConsoleSurface {
    fn apply(&mut self, command: &DisplayCommand) {
        match command {
            DisplayCommand::Show(update) => println!(
                "{} {:<16} {}",
                self.stamp(),
                update.block_id,
                render_words(&update.words)
            ),
            DisplayCommand::Reposition(geometry) => println!(
                "{} strip moved to ({:.1}, {:.1}) width {:.1}",
                self.stamp(),
                geometry.x,
                geometry.y,
                geometry.width
            ),
            DisplayCommand::Hide => println!("{} strip hidden", self.stamp()),
            DisplayCommand::Unchanged => {}
        }
    }

    fn notify(&mut self, notice: &Notice) {
        let level = match notice.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        eprintln!("{} {level}: {} {}", self.stamp(), notice.message, notice.suggestion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, changed: bool) -> DisplayWord {
        DisplayWord {
            text: text.into(),
            changed,
        }
    }

    #[test]
    fn changed_words_are_bracketed() {
        let words = [word("The", false), word(" ", true), word("dog", true), word(" ", false)];
        assert_eq!(render_words(&words), "The [dog] ");
    }

    #[test]
    fn empty_strip_renders_empty() {
        assert_eq!(render_words(&[]), "");
    }
}
