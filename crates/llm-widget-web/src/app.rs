//! Page wiring: builds the session and attaches behavior to the hosting page

use crate::dom::{element_by_id, BrowserPrompt, DomChatLog, StatusBar, TextareaInput};
use crate::engine::{WebLlmEngine, WebLlmLoader};
use crate::fetch::FetchConfigSource;
use crate::storage::BrowserCacheStorage;
use llm_widget_core::{auto_size, bootstrap, CacheController, ChatSession, StatusSink};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Event, EventTarget, KeyboardEvent, Window};

/// Everything the event handlers share
struct Widget {
    session: ChatSession<WebLlmEngine>,
    chat_log: DomChatLog,
    input: TextareaInput,
    status: Rc<StatusBar>,
    prompt: BrowserPrompt,
    cache: CacheController<BrowserCacheStorage>,
}

impl Widget {
    fn from_page(window: &Window, document: &Document) -> llm_widget_core::Result<Self> {
        Ok(Self {
            session: ChatSession::new(),
            chat_log: DomChatLog::new(document.clone(), element_by_id(document, "chat-output")?),
            input: TextareaInput::new(element_by_id(document, "user-input")?),
            status: Rc::new(StatusBar::new(element_by_id(document, "status")?)),
            prompt: BrowserPrompt::new(window.clone()),
            cache: CacheController::new(BrowserCacheStorage::new(window.clone())),
        })
    }

    fn submit(self: &Rc<Self>) {
        let text = self.input.value();
        let widget = self.clone();
        spawn_local(async move {
            let turn = widget.session.send_turn(&text, &widget.chat_log, || widget.input.clear());
            if let Err(e) = turn.await {
                log::error!("Chat error: {}", e);
            }
        });
    }

    fn clear_cache(self: &Rc<Self>) {
        let widget = self.clone();
        spawn_local(async move {
            let outcome =
                widget.cache.clear(&widget.session, &widget.prompt, widget.status.as_ref()).await;
            log::debug!("Cache clear finished: {:?}", outcome);
        });
    }

    /// Fire-and-forget; the page does not wait for it
    fn clear_cache_on_unload(self: &Rc<Self>) {
        let widget = self.clone();
        spawn_local(async move {
            widget.cache.clear_on_unload(widget.session.cache_name()).await;
        });
    }
}

/// Attach `handler` for the page's lifetime
fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn into_js(error: llm_widget_core::Error) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Build the widget, wire its events and start the bootstrap sequence
pub fn mount() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let widget = Rc::new(Widget::from_page(&window, &document).map_err(into_js)?);

    let input: &EventTarget = widget.input.element();
    for event in ["input", "focus", "blur"] {
        let widget = widget.clone();
        listen(input, event, move |_| auto_size(&widget.input))?;
    }

    {
        let widget = widget.clone();
        listen(input, "keydown", move |event| {
            let Some(key) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            // Shift+Enter keeps the newline
            if key.key() == "Enter" && !key.shift_key() {
                event.prevent_default();
                widget.submit();
            }
        })?;
    }

    let send_button: EventTarget = element_by_id(&document, "send-btn").map_err(into_js)?;
    {
        let widget = widget.clone();
        listen(&send_button, "click", move |_| widget.submit())?;
    }

    let clear_button: EventTarget = element_by_id(&document, "clear-cache-btn").map_err(into_js)?;
    {
        let widget = widget.clone();
        listen(&clear_button, "click", move |_| widget.clear_cache())?;
    }

    {
        let widget = widget.clone();
        listen(&window, "beforeunload", move |_| widget.clear_cache_on_unload())?;
    }

    spawn_local(async move {
        let source = FetchConfigSource::new(window);
        let status: Rc<dyn StatusSink> = widget.status.clone();
        // failures are already logged and shown on the status line
        let _ = bootstrap(&widget.session, &source, &WebLlmLoader, status).await;
    });

    Ok(())
}
