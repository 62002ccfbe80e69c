//! Recording collaborators shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use foundation::{ConnectionId, WatchId};
use protocol::Channel;

use crate::chat_log::{LogLine, LogSurface};
use crate::controller::Controls;
use crate::error::ClientError;
use crate::transport::{Clock, Connector, Geolocator, Socket};

#[derive(Clone, Default)]
pub struct RecordingLog(Rc<RefCell<Vec<LogLine>>>);

impl RecordingLog {
    pub fn lines(&self) -> Vec<LogLine> {
        self.0.borrow().clone()
    }
}

impl LogSurface for RecordingLog {
    fn append_line(&mut self, line: &LogLine) {
        self.0.borrow_mut().push(line.clone());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlsState {
    pub connect_enabled: bool,
    pub send_enabled: bool,
    pub disconnect_visible: bool,
    pub message_cleared: usize,
}

#[derive(Clone, Default)]
pub struct RecordingControls(Rc<RefCell<ControlsState>>);

impl RecordingControls {
    pub fn state(&self) -> ControlsState {
        self.0.borrow().clone()
    }
}

impl Controls for RecordingControls {
    fn set_connect_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().connect_enabled = enabled;
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        self.0.borrow_mut().send_enabled = enabled;
    }

    fn show_connected(&mut self, connected: bool) {
        self.0.borrow_mut().disconnect_visible = connected;
    }

    fn clear_message_input(&mut self) {
        self.0.borrow_mut().message_cleared += 1;
    }
}

#[derive(Debug, Default)]
pub struct FakeSocketState {
    pub channel: Option<Channel>,
    pub url: String,
    pub connection: ConnectionId,
    pub open: bool,
    pub closed: bool,
    pub sent: Vec<String>,
}

pub type SocketRef = Rc<RefCell<FakeSocketState>>;

struct FakeSocket(SocketRef);

impl Socket for FakeSocket {
    fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        let mut s = self.0.borrow_mut();
        if !s.open {
            return Err(ClientError::Transport("socket not open".to_string()));
        }
        s.sent.push(text.to_string());
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.0.borrow().open
    }

    fn close(&mut self) {
        let mut s = self.0.borrow_mut();
        s.open = false;
        s.closed = true;
    }
}

/// Connector handing out fake sockets; they start closed until the test
/// marks them open.
#[derive(Clone, Default)]
pub struct FakeConnector {
    pub sockets: Rc<RefCell<Vec<SocketRef>>>,
    pub fail: Rc<RefCell<Option<Channel>>>,
}

impl FakeConnector {
    pub fn opened(&self) -> Vec<SocketRef> {
        self.sockets.borrow().clone()
    }

    /// Most recent socket for `channel`.
    pub fn last(&self, channel: Channel) -> Option<SocketRef> {
        self.sockets
            .borrow()
            .iter()
            .rev()
            .find(|s| s.borrow().channel == Some(channel))
            .cloned()
    }
}

impl Connector for FakeConnector {
    fn open(
        &mut self,
        connection: ConnectionId,
        channel: Channel,
        url: &str,
    ) -> Result<Box<dyn Socket>, ClientError> {
        if *self.fail.borrow() == Some(channel) {
            return Err(ClientError::Transport(format!("cannot reach {url}")));
        }
        let state = Rc::new(RefCell::new(FakeSocketState {
            channel: Some(channel),
            url: url.to_string(),
            connection,
            ..FakeSocketState::default()
        }));
        self.sockets.borrow_mut().push(state.clone());
        Ok(Box::new(FakeSocket(state)))
    }
}

#[derive(Debug, Default)]
pub struct GeoState {
    pub current_requests: Vec<ConnectionId>,
    pub watches: Vec<(ConnectionId, WatchId)>,
    pub cleared: Vec<WatchId>,
    pub unavailable: bool,
}

#[derive(Clone, Default)]
pub struct FakeGeolocator(pub Rc<RefCell<GeoState>>);

impl Geolocator for FakeGeolocator {
    fn current_position(&mut self, connection: ConnectionId) -> Result<(), ClientError> {
        let mut s = self.0.borrow_mut();
        if s.unavailable {
            return Err(ClientError::GeolocationUnavailable);
        }
        s.current_requests.push(connection);
        Ok(())
    }

    fn watch_position(&mut self, connection: ConnectionId) -> Result<WatchId, ClientError> {
        let mut s = self.0.borrow_mut();
        if s.unavailable {
            return Err(ClientError::GeolocationUnavailable);
        }
        let id = WatchId(s.watches.len() as i32 + 1);
        s.watches.push((connection, id));
        Ok(id)
    }

    fn clear_watch(&mut self, watch: WatchId) {
        self.0.borrow_mut().cleared.push(watch);
    }
}

pub struct FixedClock(pub &'static str);

impl Clock for FixedClock {
    fn time_of_day(&self) -> String {
        self.0.to_string()
    }
}
