//! Widget configuration loaded from `config.json` at startup

use crate::error::{Error, Result};
use crate::view::StatusSink;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Deserializer, Serialize};

/// Relative path of the configuration document
pub const CONFIG_PATH: &str = "./config.json";

/// Widget configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(rename = "MODEL_ID")]
    pub model_id: String,
    /// Cache Storage entry holding the downloaded weights; empty means unset
    #[serde(rename = "CACHE_NAME", default, deserialize_with = "non_empty")]
    pub cache_name: Option<String>,
    #[serde(rename = "SYSTEM_PROMPT")]
    pub system_prompt: String,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Body and status of a completed fetch
#[derive(Debug, Clone)]
pub struct FetchedText {
    pub status: u16,
    pub body: String,
}

impl FetchedText {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of the configuration document (browser `fetch` in production)
pub trait ConfigSource {
    fn fetch_text<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<FetchedText>>;
}

/// Fetch and parse the configuration, reporting progress on `status`.
///
/// Any failure is terminal for startup: there is no retry.
pub async fn load_config<S>(source: &S, status: &dyn StatusSink) -> Result<AppConfig>
where
    S: ConfigSource + ?Sized,
{
    status.set_status("Loading configuration...");

    match fetch_config(source).await {
        Ok(config) => {
            status.set_status("Configuration loaded.");
            Ok(config)
        }
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            status.set_status("Error loading configuration. See console for details.");
            Err(e)
        }
    }
}

async fn fetch_config<S>(source: &S) -> Result<AppConfig>
where
    S: ConfigSource + ?Sized,
{
    let response = source.fetch_text(CONFIG_PATH).await?;
    if !response.is_ok() {
        return Err(Error::ConfigStatus(response.status));
    }
    AppConfig::from_json(&response.body)
}
