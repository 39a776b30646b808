//! Model-weight cache controller over the browser's named cache store

use crate::error::Result;
use crate::session::ChatSession;
use crate::view::{StatusSink, UserPrompt};
use futures::future::LocalBoxFuture;

/// Asked before any user-initiated deletion
pub const CLEAR_CONFIRMATION: &str =
    "Are you sure you want to clear the model cache? This will require re-downloading it next time.";

/// Named-entry persistent storage holding downloaded model weights
pub trait CacheStore {
    /// Delete the entry named `name`; `Ok(false)` when no such entry exists
    fn delete<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<bool>>;
}

/// Result of a cache clear attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// User declined the confirmation prompt
    Declined,
    /// Entry deleted; the engine handle was invalidated
    Cleared,
    /// Cache name unset or no matching entry
    NotFound,
    /// The store reported an error
    Failed,
}

/// Cache controller
pub struct CacheController<S: CacheStore> {
    store: S,
}

impl<S: CacheStore> CacheController<S> {
    /// Create a new controller over the given store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn delete_named(&self, cache_name: Option<&str>) -> Result<bool> {
        match cache_name {
            Some(name) => self.store.delete(name).await,
            None => Ok(false),
        }
    }

    /// User-initiated clear: confirm, delete, and invalidate the engine on success
    pub async fn clear<E>(
        &self,
        session: &ChatSession<E>,
        prompt: &dyn UserPrompt,
        status: &dyn StatusSink,
    ) -> ClearOutcome {
        if !prompt.confirm(CLEAR_CONFIRMATION) {
            return ClearOutcome::Declined;
        }

        status.set_status("Clearing model cache...");
        match self.delete_named(session.cache_name()).await {
            Ok(true) => {
                status.set_status(
                    "Model cache cleared from Cache Storage. Reload the page to re-initialize if needed.",
                );
                log::info!("Model cache manually cleared from Cache Storage.");
                session.invalidate_engine();
                ClearOutcome::Cleared
            }
            Ok(false) => {
                let message =
                    "Model cache not found or could not be cleared (check if CACHE_NAME is set).";
                status.set_status(message);
                log::info!("{}", message);
                ClearOutcome::NotFound
            }
            Err(e) => {
                log::error!("Error clearing model cache: {}", e);
                status.set_status("Error clearing cache. See console for details.");
                ClearOutcome::Failed
            }
        }
    }

    /// Best-effort deletion on page unload. Never prompts, only logs.
    pub async fn clear_on_unload(&self, cache_name: Option<&str>) -> ClearOutcome {
        log::info!("Attempting to delete model cache from Cache Storage on unload...");
        match self.delete_named(cache_name).await {
            Ok(true) => {
                log::info!("Model cache successfully deleted from Cache Storage on unload.");
                ClearOutcome::Cleared
            }
            Ok(false) => {
                log::info!(
                    "Model cache not found or could not be deleted from Cache Storage on unload (check if CACHE_NAME is set)."
                );
                ClearOutcome::NotFound
            }
            Err(e) => {
                log::warn!("Unload cache deletion failed: {}", e);
                ClearOutcome::Failed
            }
        }
    }
}
