//! In-memory collaborators shared by the integration tests
#![allow(dead_code)]

use futures::future::LocalBoxFuture;
use futures::{FutureExt, StreamExt};
use llm_widget_core::{
    AppConfig, CacheStore, ChatEngine, ChatMessage, ChatRole, ChatSession, ChatView, ChunkStream,
    CompletionChunk, ConfigSource, EngineLoader, EngineOptions, Error, FetchedText,
    InitProgressReport, ProgressCallback, Result, StatusSink, UserPrompt,
};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Append(ChatRole, String),
    SetText(usize, String),
}

/// Chat view that records every call
#[derive(Default)]
pub struct RecordingView {
    pub events: RefCell<Vec<ViewEvent>>,
    pub nodes: RefCell<Vec<String>>,
    pub scrolls: Cell<usize>,
}

impl RecordingView {
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn node_text(&self, index: usize) -> String {
        self.nodes.borrow()[index].clone()
    }

    /// Every text a node displayed, in order
    pub fn transitions(&self, index: usize) -> Vec<String> {
        let mut seen = Vec::new();
        let mut appended = 0;
        for event in self.events.borrow().iter() {
            match event {
                ViewEvent::Append(_, text) => {
                    if appended == index {
                        seen.push(text.clone());
                    }
                    appended += 1;
                }
                ViewEvent::SetText(i, text) if *i == index => seen.push(text.clone()),
                ViewEvent::SetText(..) => {}
            }
        }
        seen
    }
}

impl ChatView for RecordingView {
    type Node = usize;

    fn append(&self, role: ChatRole, text: &str) -> Result<usize> {
        self.events.borrow_mut().push(ViewEvent::Append(role, text.to_string()));
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(text.to_string());
        Ok(nodes.len() - 1)
    }

    fn set_text(&self, node: &usize, text: &str) {
        self.events.borrow_mut().push(ViewEvent::SetText(*node, text.to_string()));
        self.nodes.borrow_mut()[*node] = text.to_string();
    }

    fn scroll_to_latest(&self) {
        self.scrolls.set(self.scrolls.get() + 1);
    }
}

/// One scripted step of a streamed reply
#[derive(Debug, Clone)]
pub enum Step {
    Chunk(String),
    Fail(String),
}

/// Engine replaying a fixed script for every request
#[derive(Default)]
pub struct ScriptedEngine {
    pub script: Vec<Step>,
    pub refuse: Option<String>,
    /// Return `Pending` once before opening the stream
    pub stall_once: bool,
    /// Shared so tests can inspect requests after the session owns the engine
    pub requests: Rc<RefCell<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedEngine {
    pub fn replying(chunks: &[&str]) -> Self {
        Self {
            script: chunks.iter().map(|c| Step::Chunk(c.to_string())).collect(),
            ..Default::default()
        }
    }
}

impl ChatEngine for ScriptedEngine {
    fn stream_chat<'a>(
        &'a self,
        messages: &'a [ChatMessage],
    ) -> LocalBoxFuture<'a, Result<ChunkStream<'a>>> {
        self.requests.borrow_mut().push(messages.to_vec());
        async move {
            if self.stall_once {
                YieldOnce::default().await;
            }
            if let Some(reason) = &self.refuse {
                return Err(Error::Completion(reason.clone()));
            }
            let items: Vec<Result<CompletionChunk>> = self
                .script
                .iter()
                .map(|step| match step {
                    Step::Chunk(text) => Ok(CompletionChunk::text(text.clone())),
                    Step::Fail(reason) => Err(Error::Completion(reason.clone())),
                })
                .collect();
            Ok(futures::stream::iter(items).boxed_local())
        }
        .boxed_local()
    }
}

/// Future that is `Pending` on its first poll and ready on the second
#[derive(Default)]
pub struct YieldOnce {
    polled: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.polled {
            return Poll::Ready(());
        }
        self.polled = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Loader that emits progress reports and then succeeds or fails
pub struct FakeLoader {
    pub reports: Vec<String>,
    pub fail_with: Option<String>,
    pub loaded: RefCell<Vec<(String, EngineOptions)>>,
}

impl FakeLoader {
    pub fn ok(reports: &[&str]) -> Self {
        Self {
            reports: reports.iter().map(|r| r.to_string()).collect(),
            fail_with: None,
            loaded: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self { reports: Vec::new(), fail_with: Some(reason.to_string()), loaded: RefCell::new(Vec::new()) }
    }
}

impl EngineLoader for FakeLoader {
    type Engine = ScriptedEngine;

    fn load<'a>(
        &'a self,
        model_id: &'a str,
        options: EngineOptions,
        on_progress: ProgressCallback,
    ) -> LocalBoxFuture<'a, Result<ScriptedEngine>> {
        async move {
            self.loaded.borrow_mut().push((model_id.to_string(), options));
            for text in &self.reports {
                on_progress(&InitProgressReport::new(text.clone()));
            }
            match &self.fail_with {
                Some(reason) => Err(Error::EngineInit(reason.clone())),
                None => Ok(ScriptedEngine::replying(&["ok"])),
            }
        }
        .boxed_local()
    }
}

#[derive(Default)]
pub struct RecordingStatus {
    pub lines: RefCell<Vec<String>>,
}

impl RecordingStatus {
    pub fn last(&self) -> Option<String> {
        self.lines.borrow().last().cloned()
    }
}

impl StatusSink for RecordingStatus {
    fn set_status(&self, text: &str) {
        self.lines.borrow_mut().push(text.to_string());
    }
}

pub struct FixedPrompt {
    pub answer: bool,
    pub asked: RefCell<Vec<String>>,
}

impl FixedPrompt {
    pub fn answering(answer: bool) -> Self {
        Self { answer, asked: RefCell::new(Vec::new()) }
    }
}

impl UserPrompt for FixedPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.asked.borrow_mut().push(message.to_string());
        self.answer
    }
}

/// Named-entry store backed by a set
#[derive(Default)]
pub struct MemoryStore {
    pub entries: RefCell<HashSet<String>>,
    pub broken: bool,
    pub deletes: Cell<usize>,
}

impl MemoryStore {
    pub fn with(names: &[&str]) -> Self {
        Self { entries: RefCell::new(names.iter().map(|n| n.to_string()).collect()), ..Default::default() }
    }
}

impl CacheStore for MemoryStore {
    fn delete<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<bool>> {
        async move {
            self.deletes.set(self.deletes.get() + 1);
            if self.broken {
                return Err(Error::Cache("SecurityError".to_string()));
            }
            Ok(self.entries.borrow_mut().remove(name))
        }
        .boxed_local()
    }
}

/// Config source answering every fetch with a fixed response
pub struct StaticSource {
    pub response: std::result::Result<FetchedText, String>,
    pub paths: RefCell<Vec<String>>,
}

impl StaticSource {
    pub fn ok(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self { response: Ok(FetchedText { status, body: body.to_string() }), paths: RefCell::new(Vec::new()) }
    }

    pub fn unreachable(reason: &str) -> Self {
        Self { response: Err(reason.to_string()), paths: RefCell::new(Vec::new()) }
    }
}

impl ConfigSource for StaticSource {
    fn fetch_text<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<FetchedText>> {
        async move {
            self.paths.borrow_mut().push(path.to_string());
            self.response.clone().map_err(Error::Fetch)
        }
        .boxed_local()
    }
}

pub fn config(cache_name: Option<&str>) -> AppConfig {
    AppConfig {
        model_id: "Llama-3.2-1B-Instruct-q4f16_1-MLC".to_string(),
        cache_name: cache_name.map(str::to_string),
        system_prompt: "You are a concise assistant.".to_string(),
    }
}

/// Session with config applied and `engine` installed
pub fn ready_session(engine: ScriptedEngine, cache_name: Option<&str>) -> ChatSession<ScriptedEngine> {
    let session = ChatSession::new();
    session.apply_config(config(cache_name));
    session.install_engine(engine);
    session
}
