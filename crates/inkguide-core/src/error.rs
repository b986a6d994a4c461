// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for inkguide.

use thiserror::Error;

/// Top-level error type for all smart guide operations.
#[derive(Debug, Error)]
pub enum GuideError {
    // -- Editor boundary --
    #[error("block export unavailable: {0}")]
    ExportUnavailable(String),

    #[error("block import rejected: {0}")]
    ImportRejected(String),

    #[error("block reference is stale: {0}")]
    StaleBlockReference(String),

    #[error("malformed JIIX payload: {0}")]
    MalformedPayload(String),

    // -- Candidate substitution --
    #[error("word index {index} out of range (strip holds {len} words)")]
    WordIndexOutOfRange { index: usize, len: usize },

    #[error("\"{label}\" is not a candidate for word {index}")]
    CandidateNotOffered { index: usize, label: String },

    #[error("no block is currently displayed")]
    NoCurrentBlock,

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Dispatch --
    #[error("notification channel closed")]
    DispatchClosed,
}

impl GuideError {
    /// Whether the error is an expected state during active recognition.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ExportUnavailable(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GuideError>;
