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
//! "Activate"
//! {"Narrow":5}
//! {"NarrowSequence":"3 5 7"}
//! {"SelectScreen":2}
//! "GoBack"
//! "PlaceOnActiveWindow"
//! "Close"
//! ```
//!
//! Numeric payloads are also accepted as strings (`{"Narrow":"5"}`), so
//! frontends that deal in recognized speech can forward tokens verbatim.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info};
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// A [`CommandSource`] that listens on a Unix stream socket for
/// JSON-encoded commands.
///
/// A connection may send any number of newline-delimited commands; when
/// it closes, the listener waits for the next one.  Malformed lines are
/// logged and skipped, never fatal.
pub struct UnixSocketListener {
    path: PathBuf,
}

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UnixSocketListener {
    /// Create a new listener bound to `path`.
    ///
    /// The socket file is created when [`run`](CommandSource::run) is
    /// called; a stale file from a previous run is removed first.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drain one client connection into the sink.
    ///
    /// Returns `false` once the sink is gone and the listener should
    /// shut down.
    fn handle_client(stream: UnixStream, sink: &mpsc::Sender<Command>) -> bool {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    error!("read error: {}", e);
                    return true;
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Command>(&text) {
                Ok(cmd) => {
                    debug!("received {:?}", cmd);
                    if sink.send(cmd).is_err() {
                        return false;
                    }
                }
                Err(e) => {
                    error!("bad command {:?}: {}", text, e);
                }
            }
        }
        true
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Bind the socket and start accepting connections.
    ///
    /// This method **blocks** indefinitely.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        // Remove stale socket if present.
        let _ = std::fs::remove_file(&self.path);

        let listener = UnixListener::bind(&self.path)?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    debug!("client connected");
                    if !Self::handle_client(stream, &sink) {
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
