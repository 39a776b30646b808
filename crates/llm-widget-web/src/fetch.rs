//! `fetch`-backed configuration source

use crate::js_error;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use llm_widget_core::{ConfigSource, Error, FetchedText, Result};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, Window};

fn fetch_error(value: JsValue) -> Error {
    Error::Fetch(js_error(&value))
}

pub struct FetchConfigSource {
    window: Window,
}

impl FetchConfigSource {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl ConfigSource for FetchConfigSource {
    fn fetch_text<'a>(&'a self, path: &'a str) -> LocalBoxFuture<'a, Result<FetchedText>> {
        async move {
            let response: Response = JsFuture::from(self.window.fetch_with_str(path))
                .await
                .map_err(fetch_error)?
                .dyn_into()
                .map_err(fetch_error)?;

            let status = response.status();
            if !response.ok() {
                return Ok(FetchedText { status, body: String::new() });
            }

            let body = JsFuture::from(response.text().map_err(fetch_error)?)
                .await
                .map_err(fetch_error)?;
            Ok(FetchedText { status, body: body.as_string().unwrap_or_default() })
        }
        .boxed_local()
    }
}
