//! DOM-backed implementations of the widget's view traits

use crate::js_error;
use llm_widget_core::{ChatRole, ChatView, Error, GrowableInput, Result, StatusSink, UserPrompt};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlTextAreaElement, Window};

fn dom_error(value: JsValue) -> Error {
    Error::Dom(js_error(&value))
}

/// Look up a required element of the hosting page
pub fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| Error::Dom(format!("missing element #{}", id)))?
        .dyn_into::<T>()
        .map_err(|_| Error::Dom(format!("element #{} has an unexpected type", id)))
}

/// Chat log rendered into a scrolling container
pub struct DomChatLog {
    document: Document,
    container: HtmlElement,
}

impl DomChatLog {
    pub fn new(document: Document, container: HtmlElement) -> Self {
        Self { document, container }
    }
}

impl ChatView for DomChatLog {
    /// The message's `<p>`, whose text is replaced while streaming
    type Node = Element;

    fn append(&self, role: ChatRole, text: &str) -> Result<Element> {
        let message = self.document.create_element("div").map_err(dom_error)?;
        message.set_class_name(&format!("message {}-message", role.css_class()));

        let paragraph = self.document.create_element("p").map_err(dom_error)?;
        paragraph.set_text_content(Some(text));
        message.append_child(&paragraph).map_err(dom_error)?;

        self.container.append_child(&message).map_err(dom_error)?;
        self.scroll_to_latest();
        Ok(paragraph)
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn scroll_to_latest(&self) {
        self.container.set_scroll_top(self.container.scroll_height());
    }
}

/// Status line
pub struct StatusBar {
    element: HtmlElement,
}

impl StatusBar {
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl StatusSink for StatusBar {
    fn set_status(&self, text: &str) {
        self.element.set_inner_text(text);
    }
}

/// The grow-to-fit message box
pub struct TextareaInput {
    element: HtmlTextAreaElement,
}

impl TextareaInput {
    pub fn new(element: HtmlTextAreaElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlTextAreaElement {
        &self.element
    }

    pub fn value(&self) -> String {
        self.element.value()
    }

    /// Empty the box and shrink it back
    pub fn clear(&self) {
        self.element.set_value("");
        llm_widget_core::auto_size(self);
    }

    fn set_height(&self, value: &str) {
        if let Err(e) = self.element.style().set_property("height", value) {
            log::warn!("Failed to resize input: {}", js_error(&e));
        }
    }
}

impl GrowableInput for TextareaInput {
    fn reset_height(&self) {
        self.set_height("auto");
    }

    fn scroll_height(&self) -> i32 {
        self.element.scroll_height()
    }

    fn set_height_px(&self, px: i32) {
        self.set_height(&format!("{}px", px));
    }
}

/// `window.confirm`
pub struct BrowserPrompt {
    window: Window,
}

impl BrowserPrompt {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl UserPrompt for BrowserPrompt {
    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }
}
