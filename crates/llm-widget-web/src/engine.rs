//! web-llm engine binding
//!
//! The hosting page imports `@mlc-ai/web-llm` and exposes it as the global
//! `webllm`; this module only calls `CreateMLCEngine` and
//! `engine.chat.completions.create`.

use crate::js_error;
use futures::future::LocalBoxFuture;
use futures::{FutureExt, StreamExt};
use js_sys::{AsyncIterator, Function, IteratorNext, Object, Promise, Reflect, Symbol, JSON};
use llm_widget_core::{
    ChatEngine, ChatMessage, ChunkStream, CompletionChunk, EngineLoader, EngineOptions, Error,
    InitProgressReport, ProgressCallback, Result,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = webllm, js_name = CreateMLCEngine)]
    fn create_mlc_engine(model_id: &str, engine_config: &Object) -> Promise;

    /// web-llm `MLCEngine`
    pub type MlcEngine;

    #[wasm_bindgen(method, getter)]
    fn chat(this: &MlcEngine) -> Chat;

    type Chat;

    #[wasm_bindgen(method, getter)]
    fn completions(this: &Chat) -> Completions;

    type Completions;

    #[wasm_bindgen(method, catch)]
    fn create(this: &Completions, request: &JsValue) -> std::result::Result<Promise, JsValue>;
}

/// Request body for `chat.completions.create`
#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    stream: bool,
}

fn completion_error(value: JsValue) -> Error {
    Error::Completion(js_error(&value))
}

fn init_error(value: JsValue) -> Error {
    Error::EngineInit(js_error(&value))
}

/// Round-trip a JS object through JSON into a serde type
fn from_js<T: serde::de::DeserializeOwned>(value: &JsValue) -> std::result::Result<T, String> {
    let json = JSON::stringify(value).map_err(|e| js_error(&e))?;
    serde_json::from_str(&String::from(json)).map_err(|e| e.to_string())
}

/// Loads models through `CreateMLCEngine`
#[derive(Debug, Default, Clone, Copy)]
pub struct WebLlmLoader;

impl EngineLoader for WebLlmLoader {
    type Engine = WebLlmEngine;

    fn load<'a>(
        &'a self,
        model_id: &'a str,
        options: EngineOptions,
        on_progress: ProgressCallback,
    ) -> LocalBoxFuture<'a, Result<WebLlmEngine>> {
        async move {
            let progress = Closure::<dyn FnMut(JsValue)>::new(move |report: JsValue| {
                match from_js::<InitProgressReport>(&report) {
                    Ok(report) => on_progress(&report),
                    Err(e) => log::warn!("Unreadable progress report: {}", e),
                }
            });

            let engine_config = Object::new();
            Reflect::set(&engine_config, &"initProgressCallback".into(), progress.as_ref())
                .map_err(init_error)?;
            Reflect::set(
                &engine_config,
                &"useIndexedDBCache".into(),
                &JsValue::from_bool(options.persistent_cache),
            )
            .map_err(init_error)?;

            let handle =
                JsFuture::from(create_mlc_engine(model_id, &engine_config)).await.map_err(init_error)?;

            Ok(WebLlmEngine { inner: handle.unchecked_into(), _progress: progress })
        }
        .boxed_local()
    }
}

/// A loaded web-llm engine
pub struct WebLlmEngine {
    inner: MlcEngine,
    // web-llm keeps calling back during reloads; the closure must outlive it
    _progress: Closure<dyn FnMut(JsValue)>,
}

impl ChatEngine for WebLlmEngine {
    fn stream_chat<'a>(
        &'a self,
        messages: &'a [ChatMessage],
    ) -> LocalBoxFuture<'a, Result<ChunkStream<'a>>> {
        async move {
            let body = serde_json::to_string(&CompletionRequest { messages, stream: true })
                .map_err(|e| Error::Completion(e.to_string()))?;
            let request = JSON::parse(&body).map_err(completion_error)?;

            let pending = self.inner.chat().completions().create(&request).map_err(completion_error)?;
            let iterable = JsFuture::from(pending).await.map_err(completion_error)?;

            Ok(chunk_stream(async_iterator(&iterable)?))
        }
        .boxed_local()
    }
}

/// Obtain `iterable[Symbol.asyncIterator]()`
fn async_iterator(iterable: &JsValue) -> Result<AsyncIterator> {
    let method = Reflect::get(iterable, &Symbol::async_iterator()).map_err(completion_error)?;
    let method: Function = method
        .dyn_into()
        .map_err(|_| Error::Completion("completion result is not async iterable".to_string()))?;
    let iterator = method.call0(iterable).map_err(completion_error)?;
    Ok(iterator.unchecked_into())
}

/// Adapt a JS async iterator of chunks into a stream that ends after the first error
fn chunk_stream(iterator: AsyncIterator) -> ChunkStream<'static> {
    futures::stream::unfold(Some(iterator), |state| async move {
        let Some(iterator) = state else {
            return None;
        };
        match next_chunk(&iterator).await {
            Ok(Some(chunk)) => Some((Ok(chunk), Some(iterator))),
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    })
    .boxed_local()
}

async fn next_chunk(iterator: &AsyncIterator) -> Result<Option<CompletionChunk>> {
    let pending = iterator.next().map_err(completion_error)?;
    let step: IteratorNext = JsFuture::from(pending).await.map_err(completion_error)?.unchecked_into();
    if step.done() {
        return Ok(None);
    }
    from_js(&step.value()).map(Some).map_err(Error::Completion)
}
