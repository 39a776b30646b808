//! Seam to the external inference engine
//!
//! The engine itself (weights download, compilation, tokenization,
//! generation) lives outside this crate. The session only needs two
//! operations: construct a handle, and stream a chat completion.

use crate::chat::ChatMessage;
use crate::error::Result;
use futures::future::LocalBoxFuture;
use futures::stream::LocalBoxStream;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Lazy sequence of incremental completion chunks
pub type ChunkStream<'a> = LocalBoxStream<'a, Result<CompletionChunk>>;

/// Invoked repeatedly while the engine downloads and compiles the model
pub type ProgressCallback = Rc<dyn Fn(&InitProgressReport)>;

/// Options passed to the engine constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Keep downloaded weights in persistent browser storage
    pub persistent_cache: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { persistent_cache: true }
    }
}

/// Progress report emitted during engine initialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitProgressReport {
    #[serde(default)]
    pub progress: f64,
    #[serde(default, rename = "timeElapsed")]
    pub time_elapsed: f64,
    pub text: String,
}

impl InitProgressReport {
    pub fn new(text: impl Into<String>) -> Self {
        Self { progress: 0.0, time_elapsed: 0.0, text: text.into() }
    }
}

/// One streamed completion chunk (OpenAI-compatible shape)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<ChunkDelta>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionChunk {
    /// Chunk carrying `text` as the first choice's delta
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            choices: vec![ChunkChoice {
                delta: Some(ChunkDelta { content: Some(text.into()) }),
            }],
        }
    }

    /// New characters carried by this chunk, empty when there are none
    pub fn delta_text(&self) -> &str {
        self.choices
            .first()
            .and_then(|c| c.delta.as_ref())
            .and_then(|d| d.content.as_deref())
            .unwrap_or("")
    }
}

/// A ready-to-use inference session
pub trait ChatEngine {
    /// Request a streaming completion over the full ordered history
    fn stream_chat<'a>(
        &'a self,
        messages: &'a [ChatMessage],
    ) -> LocalBoxFuture<'a, Result<ChunkStream<'a>>>;
}

/// Constructs engine handles
pub trait EngineLoader {
    type Engine: ChatEngine;

    fn load<'a>(
        &'a self,
        model_id: &'a str,
        options: EngineOptions,
        on_progress: ProgressCallback,
    ) -> LocalBoxFuture<'a, Result<Self::Engine>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_text() {
        let chunk: CompletionChunk =
            serde_json::from_str(r#"{"id":"x","choices":[{"index":0,"delta":{"content":"Hel"}}]}"#)
                .unwrap();
        assert_eq!(chunk.delta_text(), "Hel");
    }

    #[test]
    fn test_delta_text_missing_parts() {
        let usage_only: CompletionChunk =
            serde_json::from_str(r#"{"choices":[],"usage":{"total_tokens":3}}"#).unwrap();
        assert_eq!(usage_only.delta_text(), "");

        let role_only: CompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(role_only.delta_text(), "");
    }

    #[test]
    fn test_progress_report_from_engine_json() {
        let report: InitProgressReport = serde_json::from_str(
            r#"{"progress":0.5,"timeElapsed":12,"text":"Fetching param cache[3/20]"}"#,
        )
        .unwrap();
        assert_eq!(report.text, "Fetching param cache[3/20]");
        assert_eq!(report.time_elapsed, 12.0);
    }
}
