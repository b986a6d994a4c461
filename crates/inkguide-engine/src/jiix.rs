// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JIIX word tokenizer.
//
// Only the top-level `words` array matters here: each entry carries the
// chosen `label` and an optional `candidates` list. Everything else in the
// document is ignored on read and left untouched on rewrite.

use inkguide_bridge::BlockExport;
use inkguide_core::error::{GuideError, Result};
use inkguide_core::{BlockRef, ExportOptions, Word, WordSequence};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct JiixExport {
    #[serde(default)]
    words: Option<Vec<JiixWord>>,
}

#[derive(Debug, Deserialize)]
struct JiixWord {
    label: String,
    #[serde(default)]
    candidates: Option<Vec<String>>,
}

/// Parse a JIIX export into words, in payload order.
///
/// A document without `words` is an empty block. Entries without
/// `candidates` get an empty list.
pub fn tokenize(payload: &str) -> Result<WordSequence> {
    let export: JiixExport = serde_json::from_str(payload)
        .map_err(|e| GuideError::MalformedPayload(format!("words: {e}")))?;

    Ok(export
        .words
        .unwrap_or_default()
        .into_iter()
        .map(|word| Word {
            label: word.label,
            changed: false,
            candidates: word.candidates.unwrap_or_default(),
        })
        .collect())
}

/// Export `block` and tokenize the result.
///
/// Export failures pass through unchanged, so a busy block surfaces as
/// `ExportUnavailable`.
pub fn fetch_words(
    editor: &impl BlockExport,
    block: &BlockRef,
    options: &ExportOptions,
) -> Result<WordSequence> {
    let payload = editor.export_jiix(block, options)?;
    let words = tokenize(&payload)?;
    debug!(block_id = block.id(), words = words.len(), "block tokenized");
    Ok(words)
}

/// Overwrite the label of word `index` and re-serialize the document.
pub fn replace_label(payload: &str, index: usize, label: &str) -> Result<String> {
    let mut document: Value = serde_json::from_str(payload)
        .map_err(|e| GuideError::MalformedPayload(format!("document: {e}")))?;

    let words = document
        .get_mut("words")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| GuideError::MalformedPayload("document has no words array".into()))?;
    let len = words.len();
    let word = words
        .get_mut(index)
        .and_then(Value::as_object_mut)
        .ok_or(GuideError::WordIndexOutOfRange { index, len })?;
    word.insert("label".into(), Value::String(label.to_string()));

    Ok(document.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "Text",
        "label": "The cat",
        "words": [
            { "label": "The", "candidates": ["The", "the", "Tho"] },
            { "label": " " },
            { "label": "cat", "candidates": ["cat", "cot"], "reflow-label": "cat" }
        ],
        "version": "3"
    }"#;

    #[test]
    fn tokenize_keeps_order_and_candidates() {
        let words = tokenize(SAMPLE).unwrap();
        let labels: Vec<_> = words.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, ["The", " ", "cat"]);
        assert_eq!(words[0].candidates, ["The", "the", "Tho"]);
        assert!(words[1].candidates.is_empty());
        assert!(words.iter().all(|w| !w.changed));
    }

    #[test]
    fn missing_words_is_empty_block() {
        assert!(tokenize(r#"{ "type": "Text", "label": "" }"#).unwrap().is_empty());
        assert!(tokenize(r#"{ "words": null }"#).unwrap().is_empty());
    }

    #[test]
    fn null_candidates_become_empty() {
        let words = tokenize(r#"{ "words": [{ "label": "a", "candidates": null }] }"#).unwrap();
        assert!(words[0].candidates.is_empty());
    }

    #[test]
    fn word_without_label_is_malformed() {
        let err = tokenize(r#"{ "words": [{ "candidates": ["a"] }] }"#).unwrap_err();
        assert!(matches!(err, GuideError::MalformedPayload(_)));
        assert!(matches!(tokenize("not json"), Err(GuideError::MalformedPayload(_))));
    }

    #[test]
    fn replace_label_preserves_other_fields() {
        let rewritten = replace_label(SAMPLE, 2, "cot").unwrap();
        let value: Value = serde_json::from_str(&rewritten).unwrap();
        assert_eq!(value["words"][2]["label"], "cot");
        assert_eq!(value["words"][2]["reflow-label"], "cat");
        assert_eq!(value["words"][2]["candidates"][1], "cot");
        assert_eq!(value["words"][0]["label"], "The");
        assert_eq!(value["version"], "3");
    }

    #[test]
    fn replace_label_out_of_range() {
        assert!(matches!(
            replace_label(SAMPLE, 3, "x"),
            Err(GuideError::WordIndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            replace_label(r#"{ "label": "" }"#, 0, "x"),
            Err(GuideError::MalformedPayload(_))
        ));
    }
}
