//! Cache Storage holding web-llm's downloaded weights

use crate::js_error;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use llm_widget_core::{CacheStore, Error, Result};
use wasm_bindgen_futures::JsFuture;
use web_sys::Window;

pub struct BrowserCacheStorage {
    window: Window,
}

impl BrowserCacheStorage {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl CacheStore for BrowserCacheStorage {
    fn delete<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, Result<bool>> {
        async move {
            let caches = self.window.caches().map_err(|e| Error::Cache(js_error(&e)))?;
            let found =
                JsFuture::from(caches.delete(name)).await.map_err(|e| Error::Cache(js_error(&e)))?;
            Ok(found.as_bool().unwrap_or(false))
        }
        .boxed_local()
    }
}
