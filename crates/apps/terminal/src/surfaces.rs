//! Plain-text stand-ins for the page: the chat log goes to stdout, marker
//! changes are printed, and button state is only traced.

use std::io::Write;

use client::{Clock, Controls, LineKind, LogLine, LogSurface, MapSurface, Markup};
use foundation::{GeoBounds, LatLon};
use tracing::{debug, warn};

pub struct StdoutLog<W: Write> {
    out: W,
}

impl<W: Write> StdoutLog<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

pub fn render_line(line: &LogLine) -> String {
    let tag = match line.kind {
        LineKind::Info => "--",
        LineKind::Error => "!!",
        LineKind::User => "<<",
        LineKind::Own => ">>",
    };
    format!("{tag} {}", line.content.plain())
}

impl<W: Write> LogSurface for StdoutLog<W> {
    fn append_line(&mut self, line: &LogLine) {
        if let Err(e) = writeln!(self.out, "{}", render_line(line)) {
            warn!("failed to write log line: {e}");
        }
    }
}

#[derive(Debug, Default)]
pub struct TracedControls;

impl Controls for TracedControls {
    fn set_connect_enabled(&mut self, enabled: bool) {
        debug!(enabled, "connect control");
    }

    fn set_send_enabled(&mut self, enabled: bool) {
        debug!(enabled, "send control");
    }

    fn show_connected(&mut self, connected: bool) {
        debug!(connected, "connection controls");
    }

    fn clear_message_input(&mut self) {}
}

/// Prints every marker placement and the resulting view.
#[derive(Debug, Default)]
pub struct PrintedMap {
    next: u64,
}

impl MapSurface for PrintedMap {
    type Handle = u64;

    fn add_marker(&mut self, at: LatLon, popup: &Markup) -> u64 {
        self.next += 1;
        println!("@@ {} at {:.6}, {:.6}", popup.plain(), at.lat, at.lon);
        self.next
    }

    fn remove_marker(&mut self, handle: u64) {
        debug!(handle, "marker removed");
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        debug!(
            south = bounds.south_west.lat,
            west = bounds.south_west.lon,
            north = bounds.north_east.lat,
            east = bounds.north_east.lon,
            "view fitted"
        );
    }
}

#[derive(Debug, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn time_of_day(&self) -> String {
        chrono::Local::now().format("%H:%M:%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lines_are_tagged_by_kind_and_printed_as_plain_text() {
        let mut log = StdoutLog::new(Vec::new());
        log.append_line(&LogLine {
            kind: LineKind::User,
            content: Markup::user_message("bob", "<b>hi</b>", "10:00:00"),
        });
        log.append_line(&LogLine {
            kind: LineKind::Error,
            content: Markup::text("boom"),
        });

        let printed = String::from_utf8(log.out).unwrap();
        assert_eq!(printed, "<< bob <b>hi</b> 10:00:00\n!! boom\n");
    }

    #[test]
    fn clock_prints_24h_time() {
        let now = LocalClock.time_of_day();
        assert_eq!(now.len(), 8);
        assert_eq!(now.matches(':').count(), 2);
    }
}
