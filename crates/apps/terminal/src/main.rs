use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use client::{ClientConfig, ClientEvent, Platform, Session};
use foundation::LatLon;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod geolocation;
mod socket;
mod surfaces;

use geolocation::FixedGeolocator;
use socket::{Events, WsConnector};
use surfaces::{LocalClock, PrintedMap, StdoutLog, TracedControls};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal client for the chat and location servers")]
struct Args {
    /// Connect immediately as this user
    #[arg(long)]
    username: Option<String>,

    /// JSON client config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chat server URL (default: ws://127.0.0.1:8080)
    #[arg(long)]
    chat_url: Option<String>,

    /// Location server URL (default: ws://127.0.0.1:8081)
    #[arg(long)]
    location_url: Option<String>,

    /// Latitude to report; location sharing is off without --lat and --lon
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Stop sharing location on /disconnect as well
    #[arg(long)]
    close_location_on_disconnect: bool,

    /// Seconds between repeated position reports
    #[arg(long, default_value_t = 10)]
    watch_interval_secs: u64,
}

impl Args {
    async fn client_config(&self) -> Result<ClientConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_json(&tokio::fs::read_to_string(path).await?)?,
            None => ClientConfig::default(),
        };
        if let Some(url) = &self.chat_url {
            config.chat_url = url.clone();
        }
        if let Some(url) = &self.location_url {
            config.location_url = url.clone();
        }
        if self.close_location_on_disconnect {
            config.close_location_on_disconnect = true;
        }
        Ok(config)
    }

    fn position(&self) -> Option<LatLon> {
        Some(LatLon::new(self.lat?, self.lon?))
    }
}

/// What a line typed on stdin asks for.
#[derive(Debug, PartialEq)]
enum Input {
    Events(Vec<ClientEvent>),
    Quit,
}

fn parse_line(line: &str) -> Input {
    let line = line.trim();
    match line.split_once(' ').unwrap_or((line, "")) {
        ("/quit", _) => Input::Quit,
        ("/disconnect", _) => Input::Events(vec![ClientEvent::DisconnectClicked]),
        ("/connect", "") => Input::Events(vec![ClientEvent::ConnectClicked]),
        ("/connect", name) => Input::Events(vec![
            ClientEvent::UsernameEdited(name.to_string()),
            ClientEvent::ConnectClicked,
        ]),
        _ if line.is_empty() => Input::Events(Vec::new()),
        _ => Input::Events(vec![
            ClientEvent::MessageEdited(line.to_string()),
            ClientEvent::SendClicked,
        ]),
    }
}

async fn read_stdin(events: Events, quit: oneshot::Sender<()>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("stdin read failed: {e}");
                break;
            }
        };
        match parse_line(&line) {
            Input::Quit => break,
            Input::Events(batch) => {
                for event in batch {
                    if events.send(event).is_err() {
                        return;
                    }
                }
            }
        }
    }
    let _ = quit.send(());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.client_config().await?;
    info!(chat = %config.chat_url, location = %config.location_url, "starting");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let platform = Platform {
        connector: Box::new(WsConnector::new(tx.clone())),
        geolocator: Box::new(FixedGeolocator::new(
            args.position(),
            Duration::from_secs(args.watch_interval_secs.max(1)),
            tx.clone(),
        )),
        clock: Box::new(LocalClock),
        log: Box::new(StdoutLog::new(std::io::stdout())),
        controls: Box::new(TracedControls),
        map: PrintedMap::default(),
    };
    let mut session = Session::new(config, platform);

    if let Some(name) = &args.username {
        session.handle(ClientEvent::UsernameEdited(name.clone()));
        session.handle(ClientEvent::ConnectClicked);
    }

    let (quit_tx, mut quit_rx) = oneshot::channel();
    tokio::spawn(read_stdin(tx, quit_tx));

    loop {
        tokio::select! {
            Some(event) = rx.recv() => session.handle(event),
            _ = &mut quit_rx => break,
        }
    }

    session.teardown();
    info!("bye");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_lines_are_sent_as_messages() {
        assert_eq!(
            parse_line("hello there\n"),
            Input::Events(vec![
                ClientEvent::MessageEdited("hello there".to_string()),
                ClientEvent::SendClicked,
            ])
        );
        assert_eq!(parse_line("   "), Input::Events(Vec::new()));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_line("/quit"), Input::Quit);
        assert_eq!(
            parse_line("/disconnect"),
            Input::Events(vec![ClientEvent::DisconnectClicked])
        );
        assert_eq!(
            parse_line("/connect"),
            Input::Events(vec![ClientEvent::ConnectClicked])
        );
        assert_eq!(
            parse_line("/connect alice"),
            Input::Events(vec![
                ClientEvent::UsernameEdited("alice".to_string()),
                ClientEvent::ConnectClicked,
            ])
        );
    }

    #[test]
    fn lat_and_lon_must_come_together() {
        assert!(Args::try_parse_from(["chatmap", "--lat", "-6.9"]).is_err());
        let args =
            Args::try_parse_from(["chatmap", "--lat", "-6.9", "--lon", "107.6"]).unwrap();
        assert_eq!(args.position(), Some(LatLon::new(-6.9, 107.6)));
        assert_eq!(args.watch_interval_secs, 10);
    }
}
