//! Engine session: conversation history, readiness gate and streamed turns

use crate::chat::{ChatMessage, ChatRole, Conversation};
use crate::config::AppConfig;
use crate::engine::{ChatEngine, EngineLoader, EngineOptions, InitProgressReport};
use crate::error::Result;
use crate::view::{ChatView, StatusSink};
use futures::StreamExt;
use std::cell::{Cell, OnceCell, RefCell};
use std::rc::Rc;

/// Shown instead of a reply when a message is sent before the model is ready
pub const NOT_READY_NOTICE: &str =
    "Model not ready. Please wait for the required ~880MB download and initialization to complete.";

/// Placeholder shown until the first chunk stream opens
pub const THINKING_PLACEHOLDER: &str = "Thinking...";

/// Replaces the reply when the completion request or stream fails
pub const ERROR_NOTICE: &str = "Error generating response.";

/// Result of a single `send_turn` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Input was empty after trimming
    Ignored,
    /// Another turn is still streaming
    Busy,
    /// No engine handle; the not-ready notice was rendered
    NotReady,
    /// Reply streamed in full and recorded in history
    Completed(String),
    /// Request or stream failed; the error notice was rendered
    Failed,
}

/// Clears the in-flight flag however the turn ends
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Single explicit session object shared by the UI event handlers.
///
/// All mutation happens on the UI thread; borrows are never held across
/// an await point.
pub struct ChatSession<E> {
    config: OnceCell<AppConfig>,
    history: RefCell<Conversation>,
    engine: RefCell<Option<Rc<E>>>,
    in_flight: Cell<bool>,
}

impl<E> Default for ChatSession<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ChatSession<E> {
    pub fn new() -> Self {
        Self {
            config: OnceCell::new(),
            history: RefCell::new(Conversation::default()),
            engine: RefCell::new(None),
            in_flight: Cell::new(false),
        }
    }

    /// Record the loaded configuration and seed the history with its system prompt.
    ///
    /// Configuration is immutable once applied; later calls are ignored.
    pub fn apply_config(&self, config: AppConfig) {
        if self.config.get().is_some() {
            log::warn!("Configuration already applied; ignoring reload");
            return;
        }
        *self.history.borrow_mut() = Conversation::seeded(config.system_prompt.clone());
        let _ = self.config.set(config);
    }

    pub fn config(&self) -> Option<&AppConfig> {
        self.config.get()
    }

    pub fn cache_name(&self) -> Option<&str> {
        self.config.get().and_then(|c| c.cache_name.as_deref())
    }

    /// Snapshot of the conversation history
    pub fn history(&self) -> Conversation {
        self.history.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.engine.borrow().is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    pub fn install_engine(&self, engine: E) {
        *self.engine.borrow_mut() = Some(Rc::new(engine));
    }

    /// Drop the engine handle; chat is refused until re-initialization
    pub fn invalidate_engine(&self) {
        self.engine.borrow_mut().take();
    }

    fn engine(&self) -> Option<Rc<E>> {
        self.engine.borrow().clone()
    }
}

impl<E: ChatEngine> ChatSession<E> {
    /// Construct the engine handle for `model_id`.
    ///
    /// Progress reports are logged and mirrored to `status`. On failure the
    /// handle stays unset.
    pub async fn initialize<L>(
        &self,
        loader: &L,
        model_id: &str,
        options: EngineOptions,
        status: Rc<dyn StatusSink>,
    ) -> Result<()>
    where
        L: EngineLoader<Engine = E> + ?Sized,
    {
        status.set_status("Starting engine initialization...");

        let progress_status = status.clone();
        let on_progress = Rc::new(move |report: &InitProgressReport| {
            log::info!("{}", report.text);
            progress_status.set_status(&report.text);
        });

        match loader.load(model_id, options, on_progress).await {
            Ok(engine) => {
                self.install_engine(engine);
                status.set_status("Model ready! Ask me anything...");
                log::info!("Engine initialized successfully.");
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to initialize engine: {}", e);
                status.set_status("Error initializing model. See console for details.");
                Err(e)
            }
        }
    }

    /// Submit one user message and stream the assistant reply into `view`.
    ///
    /// `on_accepted` runs once the message is committed to history, before
    /// the completion is requested. Only DOM failures are returned as
    /// errors; engine failures are rendered in place and reported as
    /// [`TurnOutcome::Failed`].
    pub async fn send_turn<V, F>(&self, text: &str, view: &V, on_accepted: F) -> Result<TurnOutcome>
    where
        V: ChatView + ?Sized,
        F: FnOnce(),
    {
        let text = text.trim();
        if text.is_empty() {
            return Ok(TurnOutcome::Ignored);
        }

        let Some(engine) = self.engine() else {
            view.append(ChatRole::Assistant, NOT_READY_NOTICE)?;
            return Ok(TurnOutcome::NotReady);
        };

        if self.in_flight.get() {
            log::warn!("Ignoring submission while a reply is still streaming");
            return Ok(TurnOutcome::Busy);
        }
        let _guard = InFlight::enter(&self.in_flight);

        view.append(ChatRole::User, text)?;
        self.history.borrow_mut().push(ChatMessage::user(text));
        on_accepted();

        let node = view.append(ChatRole::Assistant, THINKING_PLACEHOLDER)?;
        let messages = self.history.borrow().messages().to_vec();

        match stream_reply(&*engine, &messages, view, &node).await {
            Ok(reply) => {
                self.history.borrow_mut().push(ChatMessage::assistant(reply.clone()));
                Ok(TurnOutcome::Completed(reply))
            }
            Err(e) => {
                log::error!("Chat error: {}", e);
                view.set_text(&node, ERROR_NOTICE);
                Ok(TurnOutcome::Failed)
            }
        }
    }
}

async fn stream_reply<E, V>(
    engine: &E,
    messages: &[ChatMessage],
    view: &V,
    node: &V::Node,
) -> Result<String>
where
    E: ChatEngine + ?Sized,
    V: ChatView + ?Sized,
{
    let mut chunks = engine.stream_chat(messages).await?;
    view.set_text(node, "");

    let mut reply = String::new();
    while let Some(chunk) = chunks.next().await {
        reply.push_str(chunk?.delta_text());
        view.set_text(node, &reply);
        view.scroll_to_latest();
    }
    Ok(reply)
}
