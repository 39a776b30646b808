//! Core orchestration for the in-browser LLM chat widget
//!
//! This crate holds everything that does not touch the browser directly:
//! - Configuration parsing (`config.json`)
//! - Conversation history and message types
//! - The engine session (readiness gate, streamed turns, in-flight guard)
//! - The model-weight cache controller
//! - Bootstrap sequencing
//!
//! The browser side implements the collaborator traits in [`engine`],
//! [`cache`], [`config`] and [`view`].

pub mod bootstrap;
pub mod cache;
pub mod chat;
pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod view;

pub use bootstrap::bootstrap;
pub use cache::{CacheController, CacheStore, ClearOutcome};
pub use chat::{ChatMessage, ChatRole, Conversation};
pub use config::{load_config, AppConfig, ConfigSource, FetchedText, CONFIG_PATH};
pub use engine::{
    ChatEngine, ChunkStream, CompletionChunk, EngineLoader, EngineOptions, InitProgressReport,
    ProgressCallback,
};
pub use error::{Error, Result};
pub use session::{ChatSession, TurnOutcome};
pub use view::{auto_size, ChatView, GrowableInput, StatusSink, UserPrompt};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
