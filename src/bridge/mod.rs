//! [`Desktop`] implementation backed by a host bridge process.
//!
//! The daemon itself never touches the screen.  A companion process on
//! the host side (the overlay renderer and input injector) listens on a
//! Unix socket; every [`Desktop`] call here opens a short-lived
//! connection, writes one JSON-encoded [`HostRequest`] line, and reads
//! one [`HostResponse`] line back.
//!
//! Screenshots never cross the socket.  [`Capture`](HostRequest::Capture)
//! returns a [`CapturedImage`] handle naming a bitmap the host retains,
//! and [`Present`](HostRequest::Present) refers back to it by id.

use crate::command::{ScreenInfo, WindowInfo};
use crate::overlay::DrawOp;
use crate::region::Region;
use crate::traits::{AssistKind, CapturedImage, Desktop};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// One request line on the bridge socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostRequest {
    ListScreens,
    ActiveWindow,
    CursorPosition,
    MoveCursor { x: i32, y: i32 },
    Capture { region: Region },
    AssistEnabled { kind: AssistKind },
    SetAssistEnabled { kind: AssistKind, enabled: bool },
    Present { ops: Vec<DrawOp> },
    ClearOverlay,
}

/// One response line on the bridge socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostResponse {
    Screens(Vec<ScreenInfo>),
    Window(Option<WindowInfo>),
    Position { x: i32, y: i32 },
    Image(CapturedImage),
    Flag(bool),
    Ok,
    Err(String),
}

/// Errors that can occur when talking to the host bridge.
#[derive(Debug, thiserror::Error)]
#[error("host bridge error: {0}")]
pub struct BridgeError(String);

/// Bridge-backed host environment.
///
/// Holds only the socket path; each method call opens a short-lived
/// connection.
pub struct BridgeDesktop {
    path: PathBuf,
}

impl BridgeDesktop {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Perform one request/response exchange.
    fn request(&self, req: &HostRequest) -> Result<HostResponse, BridgeError> {
        let mut stream = UnixStream::connect(&self.path)
            .map_err(|e| BridgeError(format!("connect to {}: {}", self.path.display(), e)))?;

        let mut line = serde_json::to_string(req)
            .map_err(|e| BridgeError(format!("encode request: {}", e)))?;
        line.push('\n');
        stream
            .write_all(line.as_bytes())
            .map_err(|e| BridgeError(format!("write: {}", e)))?;
        stream
            .shutdown(std::net::Shutdown::Write)
            .map_err(|e| BridgeError(format!("shutdown: {}", e)))?;

        let mut response = String::new();
        BufReader::new(stream)
            .read_line(&mut response)
            .map_err(|e| BridgeError(format!("read: {}", e)))?;

        let response: HostResponse = serde_json::from_str(response.trim())
            .map_err(|e| BridgeError(format!("parse response: {}", e)))?;
        match response {
            HostResponse::Err(msg) => Err(BridgeError(format!("host: {}", msg))),
            other => Ok(other),
        }
    }
}

impl Desktop for BridgeDesktop {
    type Error = BridgeError;

    fn screens(&self) -> Result<Vec<ScreenInfo>, BridgeError> {
        match self.request(&HostRequest::ListScreens)? {
            HostResponse::Screens(screens) => Ok(screens),
            other => Err(BridgeError(format!("unexpected response {:?}", other))),
        }
    }

    fn active_window(&self) -> Result<Option<WindowInfo>, BridgeError> {
        match self.request(&HostRequest::ActiveWindow)? {
            HostResponse::Window(win) => Ok(win),
            other => Err(BridgeError(format!("unexpected response {:?}", other))),
        }
    }

    fn cursor_position(&self) -> Result<(i32, i32), BridgeError> {
        match self.request(&HostRequest::CursorPosition)? {
            HostResponse::Position { x, y } => Ok((x, y)),
            other => Err(BridgeError(format!("unexpected response {:?}", other))),
        }
    }

    fn move_cursor(&self, x: i32, y: i32) -> Result<(), BridgeError> {
        match self.request(&HostRequest::MoveCursor { x, y })? {
            HostResponse::Ok => Ok(()),
            other => Err(BridgeError(format!("unexpected response {:?}", other))),
        }
    }

    fn capture(&self, region: Region) -> Result<CapturedImage, BridgeError> {
        match self.request(&HostRequest::Capture { region })? {
            HostResponse::Image(image) => Ok(image),
            other => Err(BridgeError(format!("unexpected response {:?}", other))),
        }
    }

    fn assist_enabled(&self, kind: AssistKind) -> Result<bool, BridgeError> {
        match self.request(&HostRequest::AssistEnabled { kind })? {
            HostResponse::Flag(enabled) => Ok(enabled),
            other => Err(BridgeError(format!("unexpected response {:?}", other))),
        }
    }

    fn set_assist_enabled(&self, kind: AssistKind, enabled: bool) -> Result<(), BridgeError> {
        match self.request(&HostRequest::SetAssistEnabled { kind, enabled })? {
            HostResponse::Ok => Ok(()),
            other => Err(BridgeError(format!("unexpected response {:?}", other))),
        }
    }

    fn present(&self, ops: &[DrawOp]) -> Result<(), BridgeError> {
        match self.request(&HostRequest::Present { ops: ops.to_vec() })? {
            HostResponse::Ok => Ok(()),
            other => Err(BridgeError(format!("unexpected response {:?}", other))),
        }
    }

    fn clear_overlay(&self) -> Result<(), BridgeError> {
        match self.request(&HostRequest::ClearOverlay)? {
            HostResponse::Ok => Ok(()),
            other => Err(BridgeError(format!("unexpected response {:?}", other))),
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixListener;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc;

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("snapnine-host-{}-{}.sock", std::process::id(), id))
    }

    /// Fake host: answers `n` connections with a canned reply per request
    /// variant, and reports every request it saw on a channel.
    fn spawn_host(path: PathBuf, connections: usize) -> mpsc::Receiver<HostRequest> {
        let (tx, rx) = mpsc::channel();
        let listener = UnixListener::bind(&path).expect("bind");
        std::thread::spawn(move || {
            for _ in 0..connections {
                let stream = match listener.accept() {
                    Ok((stream, _)) => stream,
                    Err(_) => return,
                };
                let mut line = String::new();
                let mut reader = BufReader::new(&stream);
                reader.read_line(&mut line).unwrap();
                let req: HostRequest = serde_json::from_str(line.trim()).unwrap();

                let reply = match &req {
                    HostRequest::ListScreens => HostResponse::Screens(vec![ScreenInfo {
                        index: 0,
                        x: 0,
                        y: 0,
                        width: 1920,
                        height: 1080,
                    }]),
                    HostRequest::ActiveWindow => HostResponse::Window(Some(WindowInfo {
                        title: "terminal".into(),
                        x: 10,
                        y: 20,
                        width: 800,
                        height: 600,
                    })),
                    HostRequest::CursorPosition => HostResponse::Position { x: 111, y: 222 },
                    HostRequest::Capture { region } => HostResponse::Image(CapturedImage {
                        id: 7,
                        width: region.width,
                        height: region.height,
                    }),
                    HostRequest::AssistEnabled { .. } => HostResponse::Flag(true),
                    _ => HostResponse::Ok,
                };
                tx.send(req).unwrap();

                let mut out = serde_json::to_string(&reply).unwrap();
                out.push('\n');
                (&stream).write_all(out.as_bytes()).unwrap();
            }
        });
        rx
    }

    #[test]
    fn queries_round_trip_through_the_host() {
        let path = tmp_socket_path();
        let seen = spawn_host(path.clone(), 3);
        let desktop = BridgeDesktop::new(&path);

        let screens = desktop.screens().unwrap();
        assert_eq!(screens.len(), 1);
        assert_eq!(screens[0].bounds(), Region::new(0, 0, 1920, 1080));

        assert_eq!(desktop.cursor_position().unwrap(), (111, 222));

        let win = desktop.active_window().unwrap().unwrap();
        assert_eq!(win.title, "terminal");

        let reqs: Vec<HostRequest> = seen.try_iter().collect();
        assert_eq!(
            reqs,
            vec![
                HostRequest::ListScreens,
                HostRequest::CursorPosition,
                HostRequest::ActiveWindow,
            ]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn capture_returns_a_handle_sized_to_the_region() {
        let path = tmp_socket_path();
        let _seen = spawn_host(path.clone(), 1);
        let desktop = BridgeDesktop::new(&path);

        let image = desktop.capture(Region::new(853, 480, 213, 120)).unwrap();
        assert_eq!((image.id, image.width, image.height), (7, 213, 120));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn commands_carry_their_payload_on_the_wire() {
        let path = tmp_socket_path();
        let seen = spawn_host(path.clone(), 3);
        let desktop = BridgeDesktop::new(&path);

        desktop.move_cursor(5, 6).unwrap();
        desktop
            .set_assist_enabled(AssistKind::ControlMouse, false)
            .unwrap();
        desktop
            .present(&[DrawOp::Cross { x: 1, y: 2, arm: 10 }])
            .unwrap();

        let reqs: Vec<HostRequest> = seen.try_iter().collect();
        assert_eq!(reqs[0], HostRequest::MoveCursor { x: 5, y: 6 });
        assert_eq!(
            reqs[1],
            HostRequest::SetAssistEnabled {
                kind: AssistKind::ControlMouse,
                enabled: false,
            }
        );
        assert_eq!(
            reqs[2],
            HostRequest::Present {
                ops: vec![DrawOp::Cross { x: 1, y: 2, arm: 10 }],
            }
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn host_error_response_surfaces_as_an_error() {
        let path = tmp_socket_path();
        let listener = UnixListener::bind(&path).expect("bind");
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut line = String::new();
            BufReader::new(&stream).read_line(&mut line).unwrap();
            let reply = serde_json::to_string(&HostResponse::Err("no permission".into())).unwrap();
            (&stream).write_all(format!("{}\n", reply).as_bytes()).unwrap();
        });

        let desktop = BridgeDesktop::new(&path);
        let err = desktop.clear_overlay().unwrap_err();
        assert!(err.to_string().contains("no permission"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn mismatched_response_variant_is_a_protocol_error() {
        let path = tmp_socket_path();
        let listener = UnixListener::bind(&path).expect("bind");
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut line = String::new();
            BufReader::new(&stream).read_line(&mut line).unwrap();
            let reply = serde_json::to_string(&HostResponse::Flag(true)).unwrap();
            (&stream).write_all(format!("{}\n", reply).as_bytes()).unwrap();
        });

        let desktop = BridgeDesktop::new(&path);
        assert!(desktop.cursor_position().is_err());
        let _ = std::fs::remove_file(&path);
    }
}
