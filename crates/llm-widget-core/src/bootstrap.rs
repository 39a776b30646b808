//! Startup sequence: configuration, then engine

use crate::config::{load_config, ConfigSource};
use crate::engine::{ChatEngine, EngineLoader, EngineOptions};
use crate::error::Result;
use crate::session::ChatSession;
use crate::view::StatusSink;
use std::rc::Rc;

/// Load the configuration into `session`, then initialize its engine.
///
/// The first failure aborts the sequence and leaves a failure message on
/// `status`. The session stays in its not-ready state; nothing is retried.
pub async fn bootstrap<E, S, L>(
    session: &ChatSession<E>,
    source: &S,
    loader: &L,
    status: Rc<dyn StatusSink>,
) -> Result<()>
where
    E: ChatEngine,
    S: ConfigSource + ?Sized,
    L: EngineLoader<Engine = E> + ?Sized,
{
    let result = async {
        let config = load_config(source, status.as_ref()).await?;
        let model_id = config.model_id.clone();
        session.apply_config(config);
        session.initialize(loader, &model_id, EngineOptions::default(), status.clone()).await
    }
    .await;

    if let Err(e) = &result {
        log::error!("Application initialization failed: {}", e);
        status.set_status("Application failed to initialize. See console for details.");
    }
    result
}
