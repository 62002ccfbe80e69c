//! DOM-backed chat log and form controls.

use client::{Controls, LogLine, LogSurface};
use serde::{Deserialize, Serialize};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlButtonElement, HtmlElement, HtmlInputElement};

/// Element ids of the page the client is mounted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomIds {
    pub username_input: String,
    pub message_input: String,
    pub connect_button: String,
    pub disconnect_button: String,
    pub send_button: String,
    pub messages: String,
    pub map: String,
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            username_input: "username-input".to_string(),
            message_input: "message-input".to_string(),
            connect_button: "connect-button".to_string(),
            disconnect_button: "disconnect-button".to_string(),
            send_button: "send-message-button".to_string(),
            messages: "messages".to_string(),
            map: "map".to_string(),
        }
    }
}

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has the wrong element type")))
}

/// The scrollable message container.
#[derive(Debug)]
pub struct DomLog {
    document: Document,
    container: HtmlElement,
}

impl DomLog {
    pub fn new(document: &Document, ids: &DomIds) -> Result<Self, JsValue> {
        Ok(Self {
            document: document.clone(),
            container: element(document, &ids.messages)?,
        })
    }

    fn try_append(&self, line: &LogLine) -> Result<(), JsValue> {
        let div = self.document.create_element("div")?;
        div.set_class_name(line.kind.css_class());
        div.set_inner_html(line.content.html());
        self.container.append_child(&div)?;
        self.container.set_scroll_top(self.container.scroll_height());
        Ok(())
    }
}

impl LogSurface for DomLog {
    fn append_line(&mut self, line: &LogLine) {
        if let Err(err) = self.try_append(line) {
            warn!(?err, "failed to append log line");
        }
    }
}

#[derive(Debug)]
pub struct DomControls {
    connect: HtmlButtonElement,
    disconnect: HtmlButtonElement,
    send: HtmlButtonElement,
    message: HtmlInputElement,
}

impl DomControls {
    pub fn new(document: &Document, ids: &DomIds) -> Result<Self, JsValue> {
        Ok(Self {
            connect: element(document, &ids.connect_button)?,
            disconnect: element(document, &ids.disconnect_button)?,
            send: element(document, &ids.send_button)?,
            message: element(document, &ids.message_input)?,
        })
    }
}

fn set_display(button: &HtmlButtonElement, visible: bool) {
    let value = if visible { "inline-block" } else { "none" };
    if let Err(err) = button.style().set_property("display", value) {
        warn!(?err, "failed to toggle button");
    }
}

impl Controls for DomControls {
    fn set_connect_enabled(&mut self, enabled: bool) {
        self.connect.set_disabled(!enabled);
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.send.set_disabled(!enabled);
    }

    fn show_connected(&mut self, connected: bool) {
        set_display(&self.connect, !connected);
        set_display(&self.disconnect, connected);
    }

    fn clear_message_input(&mut self) {
        self.message.set_value("");
    }
}

/// Current value of an `<input>`, or empty if it is missing.
pub fn input_value(document: &Document, id: &str) -> String {
    element::<HtmlInputElement>(document, id)
        .map(|input| input.value())
        .unwrap_or_default()
}
