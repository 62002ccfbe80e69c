//! `tokio-tungstenite` transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use client::{ClientError, ClientEvent, Connector, Socket, SocketEvent};
use foundation::ConnectionId;
use futures_util::{SinkExt, StreamExt};
use protocol::Channel;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

pub type Events = UnboundedSender<ClientEvent>;

/// Session-side half of a socket task.
pub struct WsSocket {
    outbound: UnboundedSender<Message>,
    open: Arc<AtomicBool>,
}

impl Socket for WsSocket {
    fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        self.outbound
            .send(Message::Text(text.to_string()))
            .map_err(|_| ClientError::Transport("socket task has exited".to_string()))
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn close(&mut self) {
        self.open.store(false, Ordering::SeqCst);
        // The task may already be gone.
        let _ = self.outbound.send(Message::Close(None));
    }
}

/// Spawns one task per socket on the current runtime.
#[derive(Debug, Clone)]
pub struct WsConnector {
    events: Events,
}

impl WsConnector {
    pub fn new(events: Events) -> Self {
        Self { events }
    }
}

impl Connector for WsConnector {
    fn open(
        &mut self,
        connection: ConnectionId,
        channel: Channel,
        url: &str,
    ) -> Result<Box<dyn Socket>, ClientError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let open = Arc::new(AtomicBool::new(false));
        let link = Link {
            connection,
            channel,
            events: self.events.clone(),
        };
        handle.spawn(run_socket(url.to_string(), link, outbound_rx, open.clone()));
        Ok(Box::new(WsSocket { outbound, open }))
    }
}

struct Link {
    connection: ConnectionId,
    channel: Channel,
    events: Events,
}

impl Link {
    fn route(&self, event: SocketEvent) {
        // A closed receiver means the client loop has exited.
        let _ = self
            .events
            .send(ClientEvent::socket(self.connection, self.channel, event));
    }
}

async fn run_socket(
    url: String,
    link: Link,
    mut outbound: UnboundedReceiver<Message>,
    open: Arc<AtomicBool>,
) {
    let channel = link.channel.as_str();
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => stream,
        Err(e) => {
            link.route(SocketEvent::Error(e.to_string()));
            link.route(SocketEvent::Closed);
            return;
        }
    };
    info!(channel, %url, "socket open");
    open.store(true, Ordering::SeqCst);
    link.route(SocketEvent::Open);

    let (mut ws_tx, mut ws_rx) = stream.split();
    loop {
        tokio::select! {
            out = outbound.recv() => {
                let Some(msg) = out else { break };
                if let Err(e) = ws_tx.send(msg).await {
                    warn!(channel, "failed to send frame: {e}");
                    link.route(SocketEvent::Error(e.to_string()));
                    break;
                }
            }
            incoming = ws_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => link.route(SocketEvent::Text(text)),
                Some(Ok(Message::Close(frame))) => {
                    info!(channel, ?frame, "socket closed by server");
                    break;
                }
                Some(Ok(_)) => debug!(channel, "ignoring non-text frame"),
                Some(Err(e)) => {
                    link.route(SocketEvent::Error(e.to_string()));
                    break;
                }
                None => break,
            },
        }
    }
    open.store(false, Ordering::SeqCst);
    link.route(SocketEvent::Closed);
}
