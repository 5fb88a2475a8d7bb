//! The main orchestrator that ties the grid state, the magnifier, and the
//! host environment together.
//!
//! [`GridSession`] owns the [`GridState`] and reacts to [`Command`]s by
//! updating it and issuing calls through the [`Desktop`] trait: moving the
//! cursor after a narrow, suspending and restoring assistive-input modes
//! around the overlay session, and driving the magnifier capture
//! handshake across render frames.
//!
//! One session exists per overlay lifetime; there is no global state.
//! Whoever hosts command dispatch owns the session and hands commands to
//! [`GridSession::handle`].

use crate::command::{screen_containing, Command, Digit, DigitList, ScreenIndex, ScreenInfo};
use crate::config::Config;
use crate::grid::GridState;
use crate::magnifier::Magnifier;
use crate::overlay::{self, MAGNIFIER_DEPTH};
use crate::traits::{AssistKind, Desktop, FrameOutcome, FrameState, RenderEvent};
use log::{debug, info, warn};
use std::sync::mpsc;
use std::time::Duration;

/// Possible errors from the session.
///
/// All of these are local and non-fatal: the daemon logs them and keeps
/// serving commands.  User-visible failures manifest as "nothing
/// happened", never as a crash.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The host backend returned an error.
    #[error("desktop error: {0}")]
    Desktop(String),
    /// An explicit screen selection pointed past the end of the list.
    #[error("screen {index} out of range (have {count})")]
    ScreenOutOfRange { index: usize, count: usize },
    /// The host reported no screens at all.
    #[error("no screens reported by the host")]
    NoScreens,
}

/// Snapshot of the assistive-input toggles taken when the grid comes up,
/// restored when it goes away.
#[derive(Debug, Default, Clone, Copy)]
struct SuspendedAssist {
    control_mouse_was_on: bool,
    zoom_mouse_was_on: bool,
}

/// Orchestrates grid narrowing and host calls.
///
/// The session is generic over any [`Desktop`] implementation, making it
/// completely independent of the concrete host environment.
///
/// # Typical usage
///
/// ```ignore
/// let desktop = BridgeDesktop::new(host_socket_path());
/// let mut session = GridSession::new(desktop, Config::default())?;
/// session.handle(Command::Activate)?;
/// session.handle(Command::Narrow(Digit(5)))?;
/// ```
pub struct GridSession<D: Desktop> {
    desktop: D,
    config: Config,
    grid: GridState,
    magnifier: Magnifier,
    /// The screen the overlay surface is attached to.
    screen: ScreenInfo,
    assist: SuspendedAssist,
    /// Whether the grid accepts input.
    active: bool,
    /// The binding-layer "showing" tag.  Set only by a successful
    /// `Activate`, cleared only by `Close`; `SelectScreen` starts the
    /// grid without tagging it.
    showing: bool,
    render_tx: Option<mpsc::Sender<RenderEvent>>,
}

impl<D: Desktop> GridSession<D> {
    /// Create a session targeting the primary screen.
    pub fn new(desktop: D, config: Config) -> Result<Self, SessionError> {
        let screens = desktop
            .screens()
            .map_err(|e| SessionError::Desktop(e.to_string()))?;
        let screen = *screens.first().ok_or(SessionError::NoScreens)?;
        Ok(Self {
            desktop,
            config,
            grid: GridState::new(screen.bounds()),
            magnifier: Magnifier::default(),
            screen,
            assist: SuspendedAssist::default(),
            active: false,
            showing: false,
            render_tx: None,
        })
    }

    /// Attach a render event channel.
    ///
    /// The session will send [`RenderEvent::Refresh`] whenever the grid
    /// state changed and a frame should be rendered, and
    /// [`RenderEvent::Hide`] when the overlay should disappear.  The
    /// receiver end is owned by the render driver (the daemon main loop,
    /// a test harness, …), which reacts by calling
    /// [`render_frame`](GridSession::render_frame).
    pub fn set_render_channel(&mut self, tx: mpsc::Sender<RenderEvent>) {
        self.render_tx = Some(tx);
    }

    //  Accessors

    /// Shared reference to the underlying grid state.
    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Whether the grid currently accepts input.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the binding layer currently tags the grid as showing.
    pub fn is_showing(&self) -> bool {
        self.showing
    }

    /// Everything the frame planner needs for the current state.
    pub fn frame_state(&self) -> FrameState {
        FrameState {
            region: self.grid.current(),
            screen: self.screen.bounds(),
            depth: self.grid.depth(),
            active: self.active,
            image: self.magnifier.image().copied(),
            phase: self.magnifier.phase(),
        }
    }

    //  Command dispatch

    /// Process a single [`Command`].
    pub fn handle(&mut self, cmd: Command) -> Result<(), SessionError> {
        match cmd {
            Command::Activate => {
                info!("activate grid");
                if self.start()? {
                    self.showing = true;
                }
            }

            Command::PlaceOnActiveWindow => {
                info!("place grid on active window");
                self.reset_to_current_window()?;
            }

            Command::ResetGrid => {
                info!("reset grid");
                self.reset(None)?;
            }

            Command::SelectScreen(ScreenIndex(n)) => {
                info!("select screen {}", n);
                // 1-based on the wire.
                self.reset(Some(n.saturating_sub(1)))?;
                self.start()?;
            }

            Command::Narrow(Digit(d)) => {
                info!("narrow {}", d);
                self.narrow(d, true)?;
            }

            Command::NarrowSequence(DigitList(digits)) => {
                info!("narrow sequence {:?}", digits);
                for d in digits {
                    self.narrow(d, true)?;
                }
            }

            Command::GoBack => {
                info!("go back");
                self.go_back();
            }

            Command::Close => {
                info!("close grid");
                self.close()?;
            }

            Command::Redraw => {
                debug!("redraw requested");
                self.request_frame();
            }
        }
        Ok(())
    }

    //  Session lifecycle

    /// Bring the grid up.
    ///
    /// Suspends any enabled assistive modes (recording their prior state
    /// for restoration), marks the grid active and requests a frame.
    /// Returns `Ok(false)` — logged, no state change — if already active.
    pub fn start(&mut self) -> Result<bool, SessionError> {
        if self.active {
            warn!("grid already active - won't start");
            return Ok(false);
        }
        if self
            .desktop
            .assist_enabled(AssistKind::ZoomMouse)
            .map_err(|e| SessionError::Desktop(e.to_string()))?
        {
            self.assist.zoom_mouse_was_on = true;
            self.desktop
                .set_assist_enabled(AssistKind::ZoomMouse, false)
                .map_err(|e| SessionError::Desktop(e.to_string()))?;
        }
        if self
            .desktop
            .assist_enabled(AssistKind::ControlMouse)
            .map_err(|e| SessionError::Desktop(e.to_string()))?
        {
            self.assist.control_mouse_was_on = true;
            self.desktop
                .set_assist_enabled(AssistKind::ControlMouse, false)
                .map_err(|e| SessionError::Desktop(e.to_string()))?;
        }
        info!("grid activating");
        self.active = true;
        self.request_frame();
        Ok(true)
    }

    /// Tear the grid down.
    ///
    /// Hides the overlay, restores any assistive modes that were
    /// suspended on start and are still off, clears the suspension record
    /// and discards the magnifier image.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.active = false;
        self.send(RenderEvent::Hide);
        self.desktop
            .clear_overlay()
            .map_err(|e| SessionError::Desktop(e.to_string()))?;

        if self.assist.control_mouse_was_on
            && !self
                .desktop
                .assist_enabled(AssistKind::ControlMouse)
                .map_err(|e| SessionError::Desktop(e.to_string()))?
        {
            self.desktop
                .set_assist_enabled(AssistKind::ControlMouse, true)
                .map_err(|e| SessionError::Desktop(e.to_string()))?;
        }
        if self.assist.zoom_mouse_was_on
            && !self
                .desktop
                .assist_enabled(AssistKind::ZoomMouse)
                .map_err(|e| SessionError::Desktop(e.to_string()))?
        {
            self.desktop
                .set_assist_enabled(AssistKind::ZoomMouse, true)
                .map_err(|e| SessionError::Desktop(e.to_string()))?;
        }
        self.assist = SuspendedAssist::default();
        self.magnifier.clear();
        Ok(())
    }

    /// Close: reset to the full screen, then stop.  A no-op unless the
    /// grid is tagged showing or active.
    fn close(&mut self) -> Result<(), SessionError> {
        if !self.showing && !self.active {
            debug!("close ignored (grid not showing)");
            return Ok(());
        }
        self.showing = false;
        self.reset(None)?;
        self.stop()
    }

    //  Narrowing

    /// Narrow into cell `which`, optionally moving the cursor to the new
    /// region's center.  Out-of-range indices do nothing.
    pub fn narrow(&mut self, which: u8, move_cursor: bool) -> Result<bool, SessionError> {
        let Some(region) = self.grid.narrow(which, &self.config.grid) else {
            debug!("narrow {} ignored (out of range)", which);
            return Ok(false);
        };
        if move_cursor {
            let (cx, cy) = region.center();
            self.desktop
                .move_cursor(cx, cy)
                .map_err(|e| SessionError::Desktop(e.to_string()))?;
        }
        if self.grid.depth() >= MAGNIFIER_DEPTH {
            // The backdrop must be refreshed on every narrow from here on.
            self.magnifier.arm();
        }
        self.request_frame();
        Ok(true)
    }

    /// Narrow toward the cell containing an absolute point, without
    /// moving the cursor.  Used to re-center the grid after an
    /// assistive-input handoff; not moving the cursor avoids a feedback
    /// loop with the very mode that parked it there.
    pub fn narrow_to_pos(&mut self, x: i32, y: i32) -> Result<bool, SessionError> {
        let current = self.grid.current();
        let Some(which) = current.cell_containing(x, y, self.config.grid.one_bottom_left) else {
            debug!("point ({}, {}) outside the grid", x, y);
            return Ok(false);
        };
        self.narrow(which, false)
    }

    /// Undo the last narrowing or reset step.
    pub fn go_back(&mut self) -> bool {
        let undone = self.grid.go_back();
        if undone {
            self.request_frame();
        } else {
            debug!("nothing to undo");
        }
        undone
    }

    //  Resets

    /// Reset the grid to a screen's full bounds.
    ///
    /// With `screen_index = None` the screen containing the pointer is
    /// chosen (primary if the pointer sits in a gap).  If the control
    /// mouse assist was on — or still is — and the chosen screen is the
    /// primary one, two narrowing steps toward the pointer are performed,
    /// re-centering the grid near where assistive control left it.
    pub fn reset(&mut self, screen_index: Option<usize>) -> Result<(), SessionError> {
        let (cx, cy) = self
            .desktop
            .cursor_position()
            .map_err(|e| SessionError::Desktop(e.to_string()))?;
        let screens = self
            .desktop
            .screens()
            .map_err(|e| SessionError::Desktop(e.to_string()))?;
        if screens.is_empty() {
            return Err(SessionError::NoScreens);
        }
        let screen = match screen_index {
            Some(index) => *screens.get(index).ok_or(SessionError::ScreenOutOfRange {
                index,
                count: screens.len(),
            })?,
            None => *screen_containing(&screens, cx, cy).unwrap_or(&screens[0]),
        };

        self.grid.reset_region(screen.bounds());
        self.magnifier.clear();
        self.screen = screen;

        if self
            .desktop
            .assist_enabled(AssistKind::ControlMouse)
            .map_err(|e| SessionError::Desktop(e.to_string()))?
        {
            self.assist.control_mouse_was_on = true;
            self.desktop
                .set_assist_enabled(AssistKind::ControlMouse, false)
                .map_err(|e| SessionError::Desktop(e.to_string()))?;
        }
        if self.assist.control_mouse_was_on && screen.index == 0 {
            self.narrow_to_pos(cx, cy)?;
            self.narrow_to_pos(cx, cy)?;
        }
        self.request_frame();
        Ok(())
    }

    /// Reset the grid to the bounds of the focused window.
    ///
    /// Pushes to history like every other region replacement, so a
    /// subsequent undo restores the pre-window region.  No focused window
    /// (or a degenerate zero-sized one) is a logged no-op.
    pub fn reset_to_current_window(&mut self) -> Result<(), SessionError> {
        let window = self
            .desktop
            .active_window()
            .map_err(|e| SessionError::Desktop(e.to_string()))?;
        let Some(win) = window else {
            warn!("no focused window to place the grid on");
            return Ok(());
        };
        if win.width <= 0 || win.height <= 0 {
            warn!("focused window {:?} has no usable bounds", win.title);
            return Ok(());
        }
        info!("placing grid on window {:?}", win.title);
        self.grid.reset_region(win.bounds());
        self.magnifier.clear();
        self.request_frame();
        Ok(())
    }

    //  Rendering

    /// Render one frame.
    ///
    /// Called by the render driver in response to
    /// [`RenderEvent::Refresh`].  When a capture is armed, this frame
    /// blanks the overlay, waits out the configured capture delay (the
    /// yield-point that lets the blanked frame finish compositing), takes
    /// the screenshot of the current region, and requests a follow-up
    /// frame — nothing is drawn.  Otherwise the frame is planned and
    /// presented.
    pub fn render_frame(&mut self) -> Result<FrameOutcome, SessionError> {
        if !self.active {
            return Ok(FrameOutcome::Skipped);
        }

        if self.magnifier.take_capture_request() {
            let region = self.grid.current();
            // Blank the overlay so the screenshot cannot contain it.
            self.desktop
                .present(&[])
                .map_err(|e| SessionError::Desktop(e.to_string()))?;
            let delay = self.config.overlay.capture_delay_ms;
            if delay > 0 {
                std::thread::sleep(Duration::from_millis(delay));
            }
            debug!("capturing area {:?}", region);
            let image = self
                .desktop
                .capture(region)
                .map_err(|e| SessionError::Desktop(e.to_string()))?;
            self.magnifier.store(image);
            self.request_frame();
            return Ok(FrameOutcome::Captured);
        }

        if self.magnifier.suppresses_drawing() {
            return Ok(FrameOutcome::Skipped);
        }

        let frame = self.frame_state();
        let ops = overlay::plan(&frame, &self.config.grid, &self.config.overlay);
        self.desktop
            .present(&ops)
            .map_err(|e| SessionError::Desktop(e.to_string()))?;
        self.magnifier.settle();
        Ok(FrameOutcome::Drawn(ops))
    }

    /// Ask the render driver for a frame.
    fn request_frame(&self) {
        self.send(RenderEvent::Refresh);
    }

    fn send(&self, event: RenderEvent) {
        if let Some(tx) = &self.render_tx {
            let _ = tx.send(event);
        }
    }
}

//  Tests
