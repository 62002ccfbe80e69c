//! The client session: both sockets, the marker store, the chat log and the
//! form, driven by one event handler.
//!
//! Frontends own a single `Session` and feed it every [`ClientEvent`]; the
//! session never blocks and never calls back into the frontend except
//! through the collaborator traits.

use foundation::{ConnectionId, LatLon, WatchId};
use protocol::{Channel, ChatKind, ChatMessage, LocationUpdate, decode_chat, decode_location};
use tracing::{debug, info, warn};

use crate::chat_log::{ChatLog, LineKind, LogSurface};
use crate::config::ClientConfig;
use crate::controller::{Controller, Controls};
use crate::error::ClientError;
use crate::event::{ClientEvent, FixSource, SocketEvent};
use crate::markers::{MapSurface, MarkerStore};
use crate::markup::Markup;
use crate::transport::{Clock, Connector, Geolocator, Socket};

pub const CONNECTED_NOTICE: &str = "Connected to the server.";
pub const DISCONNECTED_NOTICE: &str = "Disconnected from the server.";
pub const EMPTY_USERNAME: &str = "Username cannot be empty!";

/// Everything a session needs from its host platform.
pub struct Platform<M: MapSurface> {
    pub connector: Box<dyn Connector>,
    pub geolocator: Box<dyn Geolocator>,
    pub clock: Box<dyn Clock>,
    pub log: Box<dyn LogSurface>,
    pub controls: Box<dyn Controls>,
    pub map: M,
}

pub struct Session<M: MapSurface> {
    config: ClientConfig,
    connector: Box<dyn Connector>,
    geolocator: Box<dyn Geolocator>,
    clock: Box<dyn Clock>,
    markers: MarkerStore<M>,
    log: ChatLog,
    controller: Controller,

    connection: ConnectionId,
    username: String,
    chat: Option<Box<dyn Socket>>,
    location: Option<Box<dyn Socket>>,
    watch: Option<WatchId>,
}

impl<M: MapSurface> Session<M> {
    pub fn new(config: ClientConfig, platform: Platform<M>) -> Self {
        Self {
            config,
            connector: platform.connector,
            geolocator: platform.geolocator,
            clock: platform.clock,
            markers: MarkerStore::new(platform.map),
            log: ChatLog::new(platform.log),
            controller: Controller::new(platform.controls),
            connection: ConnectionId::default(),
            username: String::new(),
            chat: None,
            location: None,
            watch: None,
        }
    }

    /// Single entry point for every event.
    pub fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::UsernameEdited(raw) => self.controller.username_edited(&raw),
            ClientEvent::MessageEdited(raw) => self.controller.message_edited(&raw),
            ClientEvent::ConnectClicked => {
                let username = self.controller.username().to_string();
                self.connect(&username);
            }
            ClientEvent::DisconnectClicked => self.disconnect(),
            ClientEvent::SendClicked => self.send_message(),
            ClientEvent::Socket {
                connection,
                channel,
                event,
            } => {
                if !self.is_live(connection, channel) {
                    debug!(%connection, channel = channel.as_str(), ?event, "dropping stale socket event");
                    return;
                }
                match channel {
                    Channel::Chat => self.on_chat_event(event),
                    Channel::Location => self.on_location_event(event),
                }
            }
            ClientEvent::Position {
                connection,
                source,
                outcome,
            } => {
                if !self.is_live(connection, Channel::Location) {
                    debug!(%connection, ?source, "dropping stale position");
                    return;
                }
                self.on_position(source, outcome);
            }
        }
    }

    /// Open both sockets for `username`.
    ///
    /// A blank username renders an error line and opens nothing. Sockets
    /// from a previous connect are closed first.
    pub fn connect(&mut self, username: &str) {
        let username = username.trim();
        if username.is_empty() {
            self.log.error(EMPTY_USERNAME);
            return;
        }

        self.close_sockets();
        self.connection = self.connection.next();
        self.username = username.to_string();
        info!(connection = %self.connection, %username, "connecting");

        match self
            .connector
            .open(self.connection, Channel::Chat, &self.config.chat_url)
        {
            Ok(socket) => self.chat = Some(socket),
            Err(err) => {
                warn!(url = %self.config.chat_url, %err, "chat socket failed to open");
                self.log.error(&format!("Error: {err}"));
            }
        }
        match self
            .connector
            .open(self.connection, Channel::Location, &self.config.location_url)
        {
            Ok(socket) => self.location = Some(socket),
            Err(err) => {
                warn!(url = %self.config.location_url, %err, "location socket failed to open");
                self.log.error(&format!("Location error: {err}"));
            }
        }
    }

    /// Close the chat socket and fall back to the disconnected layout.
    ///
    /// The location socket and its watch keep running unless
    /// `close_location_on_disconnect` is set. Safe to call with nothing open;
    /// the notice is rendered either way.
    pub fn disconnect(&mut self) {
        if let Some(mut chat) = self.chat.take() {
            chat.close();
        }
        if self.config.close_location_on_disconnect {
            self.close_location();
        }
        self.log.info(DISCONNECTED_NOTICE);
        self.controller.update_button_visibility(false);
        self.controller.set_send_enabled(false);
    }

    /// Page-unload path: close everything and take every marker off the map.
    pub fn teardown(&mut self) {
        self.close_sockets();
        self.markers.clear();
        info!(connection = %self.connection, "session torn down");
    }

    /// Send the current message field as a chat line.
    ///
    /// Skipped (diagnostic only) unless the message is non-blank and the chat
    /// socket is open.
    pub fn send_message(&mut self) {
        let message = self.controller.message().to_string();
        let Some(chat) = self.chat.as_mut().filter(|s| s.is_open()) else {
            debug!("cannot send message, socket is not open");
            return;
        };
        if message.is_empty() {
            debug!("cannot send message, message is empty");
            return;
        }

        let time = self.clock.time_of_day();
        let frame = ChatMessage::text(self.username.as_str(), message.as_str(), time.as_str());
        let sent = frame
            .to_json()
            .map_err(ClientError::from)
            .and_then(|json| chat.send_text(&json));
        if let Err(err) = sent {
            warn!(%err, "chat send failed");
            self.log.error(&format!("Error: {err}"));
            return;
        }

        self.log
            .append(Markup::own_message(&message, &time), LineKind::Own);
        self.controller.clear_message();
    }

    fn on_chat_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Open => {
                info!(connection = %self.connection, "chat socket open");
                self.log.info(CONNECTED_NOTICE);
                let hello = ChatMessage::connect(self.username.as_str());
                if let Err(err) = self.send_frame(Channel::Chat, hello.to_json()) {
                    warn!(%err, "failed to send connect announcement");
                }
                self.controller.update_button_visibility(true);
                self.controller.set_send_enabled(true);
            }
            SocketEvent::Text(text) => self.on_chat_text(&text),
            SocketEvent::Closed => {
                info!(connection = %self.connection, "chat socket closed");
                self.chat = None;
                self.log.info(DISCONNECTED_NOTICE);
                self.controller.update_button_visibility(false);
                self.controller.set_send_enabled(false);
            }
            SocketEvent::Error(msg) => self.log.error(&format!("Error: {msg}")),
        }
    }

    fn on_chat_text(&mut self, text: &str) {
        let msg = match decode_chat(text) {
            Ok(m) => m,
            Err(err) => {
                warn!(%err, "undecodable chat frame");
                return;
            }
        };
        match msg.kind {
            ChatKind::Error => self.log.error(&msg.message),
            ChatKind::Announcement => self
                .log
                .append(Markup::join_notice(&msg.username), LineKind::Info),
            _ => self.log.append(
                Markup::user_message(&msg.username, &msg.message, &msg.time),
                LineKind::User,
            ),
        }
    }

    fn on_location_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Open => {
                info!(connection = %self.connection, "location socket open");
                if let Err(err) = self.geolocator.current_position(self.connection) {
                    warn!(%err, "error getting location");
                }
                match self.geolocator.watch_position(self.connection) {
                    Ok(id) => self.watch = Some(id),
                    Err(err) => warn!(%err, "error watching location"),
                }
            }
            SocketEvent::Text(text) => match decode_location(&text) {
                Ok(update) => {
                    self.markers
                        .upsert(&update.username, LatLon::new(update.lat, update.lon));
                }
                Err(err) => warn!(%err, "undecodable location frame"),
            },
            SocketEvent::Closed => {
                info!(connection = %self.connection, "location socket closed");
                self.location = None;
                self.clear_watch();
            }
            SocketEvent::Error(msg) => self.log.error(&format!("Location error: {msg}")),
        }
    }

    fn on_position(&mut self, source: FixSource, outcome: Result<LatLon, String>) {
        let at = match outcome {
            Ok(at) => at,
            Err(err) => {
                warn!(?source, %err, "error getting location");
                return;
            }
        };
        let username = self.username.clone();
        self.markers.upsert(&username, at);
        let update = LocationUpdate::new(username, at.lat, at.lon);
        if let Err(err) = self.send_frame(Channel::Location, update.to_json()) {
            warn!(?source, %err, "failed to send location");
        }
    }

    fn send_frame(
        &mut self,
        channel: Channel,
        json: Result<String, serde_json::Error>,
    ) -> Result<(), ClientError> {
        let json = json?;
        let socket = match channel {
            Channel::Chat => self.chat.as_mut(),
            Channel::Location => self.location.as_mut(),
        };
        socket
            .ok_or(ClientError::NotConnected(channel))?
            .send_text(&json)
    }

    fn is_live(&self, connection: ConnectionId, channel: Channel) -> bool {
        connection == self.connection
            && match channel {
                Channel::Chat => self.chat.is_some(),
                Channel::Location => self.location.is_some(),
            }
    }

    fn close_sockets(&mut self) {
        if let Some(mut chat) = self.chat.take() {
            chat.close();
        }
        self.close_location();
    }

    fn close_location(&mut self) {
        if let Some(mut location) = self.location.take() {
            location.close();
        }
        self.clear_watch();
    }

    fn clear_watch(&mut self) {
        if let Some(id) = self.watch.take() {
            self.geolocator.clear_watch(id);
        }
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// True while the chat socket exists (opening or open).
    pub fn is_connected(&self) -> bool {
        self.chat.is_some()
    }

    #[cfg(test)]
    fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn markers(&self) -> &MarkerStore<M> {
        &self.markers
    }
}
