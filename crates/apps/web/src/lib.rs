use std::cell::RefCell;
use std::collections::VecDeque;
use std::str::FromStr;

use client::{ClientConfig, ClientEvent, Clock, Platform, Session};
use serde::{Deserialize, Serialize};
use tracing::{Level, info, warn};
use wasm_bindgen::prelude::*;

mod console;
mod dom;
mod geolocation;
mod leaflet;
mod socket;

use dom::{DomControls, DomIds, DomLog};
use geolocation::BrowserGeolocator;
use leaflet::LeafletMap;
use socket::BrowserConnector;

/// Everything the page can configure, as one JSON-shaped object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    #[serde(flatten)]
    pub client: ClientConfig,
    pub dom: DomIds,
    pub log_level: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            client: ClientConfig::default(),
            dom: DomIds::default(),
            log_level: "info".to_string(),
        }
    }
}

struct BrowserClock;

impl Clock for BrowserClock {
    fn time_of_day(&self) -> String {
        js_sys::Date::new_0()
            .to_locale_time_string("en-GB")
            .into()
    }
}

thread_local! {
    static CLIENT: RefCell<Option<Session<LeafletMap>>> = const { RefCell::new(None) };
    static PENDING: RefCell<VecDeque<ClientEvent>> = const { RefCell::new(VecDeque::new()) };
}

/// Feed an event to the session.
///
/// Events raised while the session is already handling one are queued and
/// drained by the outer call, so handlers never overlap.
pub(crate) fn dispatch(event: ClientEvent) {
    PENDING.with(|q| q.borrow_mut().push_back(event));
    CLIENT.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            return;
        };
        let Some(session) = slot.as_mut() else {
            PENDING.with(|q| q.borrow_mut().clear());
            return;
        };
        while let Some(next) = PENDING.with(|q| q.borrow_mut().pop_front()) {
            session.handle(next);
        }
    });
}

fn load_config(explicit: JsValue) -> Result<WebConfig, JsValue> {
    let source = if explicit.is_undefined() || explicit.is_null() {
        web_sys::window()
            .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str("__chatMapConfig")).ok())
            .filter(|v| !v.is_undefined() && !v.is_null())
    } else {
        Some(explicit)
    };
    let Some(source) = source else {
        return Ok(WebConfig::default());
    };
    let json: String = js_sys::JSON::stringify(&source)?.into();
    serde_json::from_str(&json)
        .map_err(|e| JsValue::from_str(&format!("invalid client config: {e}")))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    Ok(())
}

/// Mount the client on the page.
///
/// `config` may be `undefined`, in which case `window.__chatMapConfig` and
/// then built-in defaults are used.
#[wasm_bindgen]
pub fn start_client(config: JsValue) -> Result<(), JsValue> {
    let config = load_config(config)?;
    console::init(Level::from_str(&config.log_level).unwrap_or(Level::INFO));

    let document = dom::document()?;
    let map = LeafletMap::mount(&config.dom.map, &config.client.map)?;
    let platform = Platform {
        connector: Box::new(BrowserConnector),
        geolocator: Box::new(BrowserGeolocator::default()),
        clock: Box::new(BrowserClock),
        log: Box::new(DomLog::new(&document, &config.dom)?),
        controls: Box::new(DomControls::new(&document, &config.dom)?),
        map,
    };
    let session = Session::new(config.client.clone(), platform);

    let replaced = CLIENT.with(|cell| cell.borrow_mut().replace(session));
    if let Some(mut old) = replaced {
        warn!("start_client called twice; tearing down previous session");
        old.teardown();
    }
    info!(chat = %config.client.chat_url, location = %config.client.location_url, "client mounted");

    // Pick up values the browser may have restored into the form.
    dispatch(ClientEvent::UsernameEdited(dom::input_value(
        &document,
        &config.dom.username_input,
    )));
    dispatch(ClientEvent::MessageEdited(dom::input_value(
        &document,
        &config.dom.message_input,
    )));
    Ok(())
}

#[wasm_bindgen]
pub fn username_input(value: String) {
    dispatch(ClientEvent::UsernameEdited(value));
}

#[wasm_bindgen]
pub fn message_input(value: String) {
    dispatch(ClientEvent::MessageEdited(value));
}

#[wasm_bindgen]
pub fn connect() {
    dispatch(ClientEvent::ConnectClicked);
}

#[wasm_bindgen]
pub fn disconnect() {
    dispatch(ClientEvent::DisconnectClicked);
}

#[wasm_bindgen]
pub fn send_message() {
    dispatch(ClientEvent::SendClicked);
}

/// Close both sockets and clear the map; call from `pagehide`.
#[wasm_bindgen]
pub fn teardown() {
    CLIENT.with(|cell| {
        if let Ok(mut slot) = cell.try_borrow_mut()
            && let Some(session) = slot.as_mut()
        {
            session.teardown();
        }
    });
}
