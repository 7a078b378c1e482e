//! Unix-socket [`CommandSource`] implementation.
//!
//! Binds a Unix stream socket and accepts one connection at a time.
//! Each line received is parsed as a JSON-encoded [`Command`].
//!
//! # Wire format
//!
//! Every message is a single line of JSON followed by `\n`:
//!
//! ```json
//! {"Toggle":"almost_maximize"}
//! {"GeometryChanged":{"window":"0x5f1","geometry":{"x":0,"y":0,"width":800,"height":600}}}
//! {"MoveResizeChanged":{"window":"0x5f1","active":false}}
//! {"WindowClosed":"0x5f1"}
//! ```

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// Each accepted connection can send multiple newline-delimited JSON
/// commands.  When the connection closes, the listener waits for the
/// next one.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether the listener should keep accepting connections.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    SinkClosed,
}

/// Removes the socket file when the listener stops.
struct SocketFile<'a>(&'a Path);

impl Drop for SocketFile<'_> {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(self.0);
    }
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is called
    /// and removed when it returns.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse every line from one client and forward valid commands.
///
/// Malformed lines are logged and skipped; a read error ends the
/// connection but not the listener.
fn forward_lines<R: BufRead>(reader: R, sink: &mpsc::Sender<Command>) -> Flow {
    for line in reader.lines() {
        let text = match line {
            Ok(text) => text,
            Err(e) => {
                warn!("read error: {}", e);
                break;
            }
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match serde_json::from_str::<Command>(text) {
            Ok(cmd) => {
                debug!("received {:?}", cmd);
                if sink.send(cmd).is_err() {
                    return Flow::SinkClosed;
                }
            }
            Err(e) => error!("bad command {:?}: {}", text, e),
        }
    }
    Flow::Continue
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** until the sink is dropped.  Run it on a
    /// dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        let _cleanup = SocketFile(&self.path);
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    if forward_lines(BufReader::new(stream), &sink) == Flow::SinkClosed {
                        info!("sink closed, shutting down");
                        return Ok(());
                    }
                    debug!("client disconnected");
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

//  Tests
