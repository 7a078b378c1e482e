//! Translates Hyprland window events into winzo [`Command`]s.
//!
//! Hyprland emits events over its IPC event socket (`socket2`) in the
//! `EVENT>>DATA\n` format.  The only event relevant to managed windows is
//!
//! | Event         | Payload     | Meaning            |
//! |---------------|-------------|--------------------|
//! | `closewindow` | `<address>` | A window was closed |
//!
//! [`HyprlandEventSource`] forwards it as [`Command::WindowClosed`] when, and
//! only when, the shared [`SubscriptionTable`] holds a
//! [`Closed`](Notification::Closed) subscription for that window.
//!
//! Hyprland has no event for frame geometry changes or for the end of an
//! interactive move/resize; those notifications reach the daemon through
//! the Unix socket instead (see [`ipc`](crate::ipc)).

use super::wm::SubscriptionTable;
use crate::command::{Command, WindowId};
use crate::traits::{CommandSource, Notification};
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::sync::mpsc;

/// Error from the Hyprland event source.
#[derive(Debug, thiserror::Error)]
#[error("hyprland event error: {0}")]
pub struct HyprlandEventError(String);

/// A [`CommandSource`] that listens to Hyprland's event socket and emits
/// close notifications for subscribed windows.
pub struct HyprlandEventSource {
    subscriptions: SubscriptionTable,
}

impl HyprlandEventSource {
    /// Create a source filtering events through `subscriptions`, usually
    /// obtained from [`HyprlandEnv::subscriptions`](super::wm::HyprlandEnv::subscriptions).
    pub fn new(subscriptions: SubscriptionTable) -> Self {
        Self { subscriptions }
    }
}

/// Parse a single event line from socket2.
///
/// Lines have the form `EVENT>>DATA\n`.
fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    let sep = line.find(">>")?;
    Some((&line[..sep], &line[sep + 2..]))
}

/// Translate one event into a command, if anyone subscribed to it.
fn translate_event(event: &str, data: &str, subscriptions: &SubscriptionTable) -> Option<Command> {
    match event {
        "closewindow" => {
            let window = WindowId::new(super::normalise_address(data));
            if subscriptions.contains(&window, Notification::Closed) {
                Some(Command::WindowClosed(window))
            } else {
                None
            }
        }
        _ => None,
    }
}

impl CommandSource for HyprlandEventSource {
    type Error = HyprlandEventError;

    /// Connect to Hyprland's event socket and start listening.
    ///
    /// This method **blocks** forever (until the socket is closed or an
    /// error occurs).  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let path = super::socket_path(".socket2.sock").map_err(HyprlandEventError)?;
        let stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandEventError(format!("connect to {}: {}", path.display(), e)))?;
        info!("event source connected to {}", path.display());
        let reader = BufReader::new(stream);

        for line in reader.lines() {
            match line {
                Ok(line) if line.is_empty() => continue,
                Ok(line) => {
                    let Some((event, data)) = parse_event_line(&line) else {
                        continue;
                    };
                    if let Some(cmd) = translate_event(event, data, &self.subscriptions) {
                        debug!("forwarding {:?}", cmd);
                        if sink.send(cmd).is_err() {
                            info!("sink closed, shutting down");
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    error!("socket2 read error: {}", e);
                    return Err(HyprlandEventError(format!("read error: {}", e)));
                }
            }
        }

        warn!("socket2 stream ended");
        Ok(())
    }
}

//  Tests
