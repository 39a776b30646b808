use thiserror::Error;

/// Error types for the chat widget
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error! status: {0}")]
    ConfigStatus(u16),

    #[error("Invalid config JSON: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Engine initialization failed: {0}")]
    EngineInit(String),

    #[error("Chat completion failed: {0}")]
    Completion(String),

    #[error("Cache storage error: {0}")]
    Cache(String),

    #[error("DOM error: {0}")]
    Dom(String),
}

pub type Result<T> = std::result::Result<T, Error>;
