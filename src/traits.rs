//! Core traits that decouple snapnine from any specific host environment
//! or transport mechanism.
//!
//! Every concrete backend (the Unix-socket host bridge, a test double, …)
//! implements one of these traits.  The
//! [`GridSession`](crate::session::GridSession) only depends on these
//! abstractions.

use crate::command::{Command, ScreenInfo, WindowInfo};
use crate::magnifier::CapturePhase;
use crate::overlay::DrawOp;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;

/// The two assistive-input services suspended while the grid is in use.
///
/// Both are independent boolean toggles owned by the host (driven by an
/// eye tracker or similar); the grid only records their state on start
/// and restores it on stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssistKind {
    /// Continuous eye-driven pointer control.
    ControlMouse,
    /// Gaze-triggered zoom targeting.
    ZoomMouse,
}

/// An opaque handle to a bitmap the host has captured and retained.
///
/// The state machine never sees pixel data; the host keeps the pixels and
/// is handed this handle back inside [`DrawOp::Image`] when compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedImage {
    /// Host-assigned identifier for the retained bitmap.
    pub id: u64,
    /// Bitmap width in pixels.
    pub width: i32,
    /// Bitmap height in pixels.
    pub height: i32,
}

/// Abstraction over the host environment: screens, cursor, screenshots,
/// assistive toggles and the overlay surface.
///
/// An implementation might forward everything over a Unix socket to the
/// process that owns the real desktop, or it might be a scripted stub
/// used in tests.
pub trait Desktop {
    /// The error type produced by this host backend.
    type Error: std::error::Error + Send + 'static;

    /// Return the host's screens, primary first.
    fn screens(&self) -> Result<Vec<ScreenInfo>, Self::Error>;

    /// Return information about the currently focused window, or `None`
    /// if no window is focused.
    fn active_window(&self) -> Result<Option<WindowInfo>, Self::Error>;

    /// Current pointer position in absolute pixels.
    fn cursor_position(&self) -> Result<(i32, i32), Self::Error>;

    /// Warp the pointer to `(x, y)`.
    fn move_cursor(&self, x: i32, y: i32) -> Result<(), Self::Error>;

    /// Take a screenshot of `region` and retain it host-side.
    ///
    /// Assumed always to succeed once it returns; there is no timeout or
    /// retry path.  The returned handle stays valid until the next
    /// capture or [`clear_overlay`](Desktop::clear_overlay).
    fn capture(&self, region: Region) -> Result<CapturedImage, Self::Error>;

    /// Whether the given assistive service is currently enabled.
    fn assist_enabled(&self, kind: AssistKind) -> Result<bool, Self::Error>;

    /// Enable or disable the given assistive service.
    fn set_assist_enabled(&self, kind: AssistKind, enabled: bool) -> Result<(), Self::Error>;

    /// Replace the overlay contents with the given draw list.
    ///
    /// An empty list blanks the overlay (used during the capture
    /// handshake so the screenshot does not contain the grid).
    fn present(&self, ops: &[DrawOp]) -> Result<(), Self::Error>;

    /// Hide the overlay surface entirely and release retained bitmaps.
    fn clear_overlay(&self) -> Result<(), Self::Error>;
}

//  Render events

/// A snapshot of everything the frame planner needs in order to render.
#[derive(Debug, Clone)]
pub struct FrameState {
    /// The active subdivision target.
    pub region: Region,
    /// Bounds of the screen the overlay is attached to (the magnified
    /// view is centered within these).
    pub screen: Region,
    /// Narrowing steps since the last reset; gates magnifier mode.
    pub depth: u32,
    /// Whether the grid currently accepts input.
    pub active: bool,
    /// Frozen backdrop screenshot, if one has been captured.
    pub image: Option<CapturedImage>,
    /// Where the capture handshake stands.
    pub phase: CapturePhase,
}

/// Events sent from the [`GridSession`](crate::session::GridSession) to
/// the render driver over an [`mpsc`](std::sync::mpsc) channel.
///
/// The session holds an `Option<mpsc::Sender<RenderEvent>>`.  The driver
/// — the daemon main loop, a debug logger, a test harness — drains the
/// channel and reacts; the session never blocks on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    /// The grid state changed; a frame should be rendered (the driver
    /// calls [`GridSession::render_frame`](crate::session::GridSession::render_frame)).
    Refresh,
    /// The overlay should be hidden (session stopped).
    Hide,
}

/// What a single [`render_frame`](crate::session::GridSession::render_frame)
/// call did.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Nothing was drawn (inactive, or the capture machine suppressed
    /// drawing).
    Skipped,
    /// The backdrop screenshot was (re)taken; nothing was drawn and a
    /// follow-up frame was requested.
    Captured,
    /// A frame was planned and presented.
    Drawn(Vec<DrawOp>),
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport — a Unix socket, a voice
/// binding shim, an in-memory channel, … — and forward parsed commands
/// into the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted
///   or an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated
///   thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
