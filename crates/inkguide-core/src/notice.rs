// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// User-facing notices for smart guide failures.
//
// Transient recognition states stay silent. Anything the user triggered and
// that did not happen (a candidate substitution) gets a short dismissible
// notice.

use crate::error::GuideError;

/// How prominently a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A short, dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// One-line summary.
    pub message: String,
    /// What the user can do about it.
    pub suggestion: String,
    pub severity: Severity,
    pub dismissible: bool,
}

impl Notice {
    fn warning(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
            severity: Severity::Warning,
            dismissible: true,
        }
    }

    /// Wrap an error reported by the editor itself.
    pub fn from_editor_error(block_id: &str, message: &str) -> Self {
        let suggestion = if block_id.is_empty() {
            "The editor reported a problem.".to_string()
        } else {
            format!("The editor reported a problem in block {block_id}.")
        };
        Self {
            message: message.to_string(),
            suggestion,
            severity: Severity::Error,
            dismissible: true,
        }
    }
}

/// Convert an error into a notice, or `None` when it should stay silent.
pub fn notice_for(err: &GuideError) -> Option<Notice> {
    match err {
        GuideError::ExportUnavailable(_) => None,

        GuideError::ImportRejected(_) => Some(Notice::warning(
            "The word could not be replaced.",
            "The editor refused the change. Try again once recognition has finished.",
        )),

        GuideError::MalformedPayload(_) => Some(Notice::warning(
            "The word could not be replaced.",
            "The recognition result changed while the menu was open. Pick the word again.",
        )),

        GuideError::CandidateNotOffered { label, .. } => Some(Notice::warning(
            format!("\"{label}\" is no longer offered for this word."),
            "Open the word again to see the current alternatives.",
        )),

        GuideError::WordIndexOutOfRange { .. } | GuideError::StaleBlockReference(_) => {
            Some(Notice::warning(
                "That word is no longer on screen.",
                "The text changed in the meantime. Pick the word again.",
            ))
        }

        GuideError::NoCurrentBlock => None,

        GuideError::Config(detail) => Some(Notice {
            message: "The smart guide settings could not be read.".into(),
            suggestion: format!("Default settings are used instead. ({detail})"),
            severity: Severity::Info,
            dismissible: true,
        }),

        GuideError::Io(_) | GuideError::Serialization(_) | GuideError::DispatchClosed => {
            Some(Notice {
                message: "Something went wrong in the smart guide.".into(),
                suggestion: err.to_string(),
                severity: Severity::Error,
                dismissible: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_failures_are_silent() {
        let err = GuideError::ExportUnavailable("recognition in progress".into());
        assert!(err.is_transient());
        assert!(notice_for(&err).is_none());
    }

    #[test]
    fn rejected_import_is_dismissible_warning() {
        let notice = notice_for(&GuideError::ImportRejected("bad jiix".into())).unwrap();
        assert_eq!(notice.severity, Severity::Warning);
        assert!(notice.dismissible);
    }

    #[test]
    fn candidate_notice_names_label() {
        let err = GuideError::CandidateNotOffered {
            index: 1,
            label: "dog".into(),
        };
        assert!(notice_for(&err).unwrap().message.contains("dog"));
    }

    #[test]
    fn editor_error_mentions_block() {
        let notice = Notice::from_editor_error("text/2", "conversion failed");
        assert_eq!(notice.message, "conversion failed");
        assert!(notice.suggestion.contains("text/2"));
        assert_eq!(notice.severity, Severity::Error);
    }
}
