//! `web_sys::WebSocket` transport.

use client::{ClientError, ClientEvent, Connector, Socket, SocketEvent};
use foundation::ConnectionId;
use protocol::Channel;
use tracing::{debug, info};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::dispatch;

fn js_err(err: JsValue) -> ClientError {
    ClientError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

struct Callbacks {
    _on_open: Closure<dyn FnMut(Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

pub struct BrowserSocket {
    ws: WebSocket,
    callbacks: Option<Callbacks>,
}

impl BrowserSocket {
    fn open(connection: ConnectionId, channel: Channel, url: &str) -> Result<Self, JsValue> {
        let ws = WebSocket::new(url)?;
        let route = move |event| dispatch(ClientEvent::socket(connection, channel, event));

        let on_open = Closure::<dyn FnMut(Event)>::new(move |_: Event| route(SocketEvent::Open));
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |e: MessageEvent| {
            match e.data().as_string() {
                Some(text) => route(SocketEvent::Text(text)),
                None => debug!(channel = channel.as_str(), "ignoring non-text frame"),
            }
        });
        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |e: CloseEvent| {
            info!(channel = channel.as_str(), code = e.code(), reason = %e.reason(), "socket closed");
            route(SocketEvent::Closed);
        });
        // Browsers expose no detail on socket errors.
        let on_error = Closure::<dyn FnMut(Event)>::new(move |e: Event| {
            route(SocketEvent::Error(format!("{} connection {}", channel.as_str(), e.type_())));
        });

        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        Ok(Self {
            ws,
            callbacks: Some(Callbacks {
                _on_open: on_open,
                _on_message: on_message,
                _on_close: on_close,
                _on_error: on_error,
            }),
        })
    }

    fn detach(&self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        self.ws.set_onerror(None);
    }
}

impl Socket for BrowserSocket {
    fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        self.ws.send_with_str(text).map_err(js_err)
    }

    fn is_open(&self) -> bool {
        self.ws.ready_state() == WebSocket::OPEN
    }

    fn close(&mut self) {
        self.detach();
        if let Err(err) = self.ws.close() {
            debug!(?err, "socket close failed");
        }
    }
}

impl Drop for BrowserSocket {
    fn drop(&mut self) {
        self.detach();
        // The socket can be dropped from inside its own onclose handler, so
        // the closures are released after the current callback returns.
        if let Some(callbacks) = self.callbacks.take() {
            spawn_local(async move { drop(callbacks) });
        }
    }
}

#[derive(Debug, Default)]
pub struct BrowserConnector;

impl Connector for BrowserConnector {
    fn open(
        &mut self,
        connection: ConnectionId,
        channel: Channel,
        url: &str,
    ) -> Result<Box<dyn Socket>, ClientError> {
        let socket = BrowserSocket::open(connection, channel, url).map_err(js_err)?;
        Ok(Box::new(socket))
    }
}
