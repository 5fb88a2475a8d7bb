//! Magnifier capture handshake.
//!
//! Once the grid has narrowed twice, screen content under the region is
//! too small to read, so a frozen screenshot of it is composited —
//! scaled up — behind the grid.  Taking that screenshot must not capture
//! the overlay itself, so capture is sequenced across render frames:
//!
//! ```text
//! Idle ──arm()──▶ Armed ──take_capture_request()──▶ Captured
//!                                                      │ store(image)
//!  ▲──────────settle()────────── Settled ◀─────────────┘
//! ```
//!
//! While the phase is `Armed` or `Captured` the renderer draws nothing
//! at all (no grid lines, no labels), which both avoids self-capture and
//! avoids flicker.  `Settled` lasts exactly one drawn frame and marks
//! capture eligibility being restored.
//!
//! The handshake is re-entered on every narrow while the depth stays ≥ 2,
//! because the backdrop must be refreshed each step.  A narrow that lands
//! while a capture is still in flight does not race it: [`Magnifier::arm`]
//! latches a re-arm instead, and [`Magnifier::store`] honours the latch by
//! going straight back to `Armed`.

use crate::traits::CapturedImage;

/// Where the capture handshake currently stands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    /// No capture pending; normal drawing.
    #[default]
    Idle,
    /// A capture has been requested; drawing is suspended.
    Armed,
    /// The screenshot is being taken; drawing is still suspended.
    Captured,
    /// The screenshot landed; the next frame draws with the fresh backdrop.
    Settled,
}

/// The magnifier-mode image cache and its capture phase machine.
#[derive(Debug, Default)]
pub struct Magnifier {
    phase: CapturePhase,
    /// Frozen screenshot of the current region, if one has been taken.
    image: Option<CapturedImage>,
    /// Set when `arm` fires mid-capture; consumed by `store`.
    rearm: bool,
}

impl Magnifier {
    /// Current phase.
    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    /// The cached backdrop, if any.  Stays valid across re-arms; a missed
    /// capture leaves the prior image displayed (stale but safe).
    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    /// Request a fresh backdrop capture.
    ///
    /// From `Idle` or `Settled` this enters `Armed`.  While already
    /// `Armed` it is a no-op (the pending capture will pick up the
    /// current region anyway).  While `Captured` — a screenshot in
    /// flight — it latches a re-arm so the handshake restarts as soon as
    /// the stale capture lands, rather than racing it.
    pub fn arm(&mut self) {
        match self.phase {
            CapturePhase::Idle | CapturePhase::Settled => self.phase = CapturePhase::Armed,
            CapturePhase::Armed => {}
            CapturePhase::Captured => self.rearm = true,
        }
    }

    /// Whether the renderer must skip drawing this frame entirely.
    pub fn suppresses_drawing(&self) -> bool {
        matches!(self.phase, CapturePhase::Armed | CapturePhase::Captured)
    }

    /// Consume the pending capture request, if one is armed.
    ///
    /// Called once per render frame.  Returns `true` exactly when the
    /// caller should take the screenshot now; the phase advances to
    /// `Captured` until [`store`](Magnifier::store) delivers the image.
    pub fn take_capture_request(&mut self) -> bool {
        if self.phase == CapturePhase::Armed {
            self.phase = CapturePhase::Captured;
            true
        } else {
            false
        }
    }

    /// Deliver a completed screenshot.
    ///
    /// Normally advances `Captured → Settled`.  If a re-arm was latched
    /// mid-flight the image is kept (better stale than blank) but the
    /// phase returns straight to `Armed` so the next frame refreshes it.
    pub fn store(&mut self, image: CapturedImage) {
        self.image = Some(image);
        if self.rearm {
            self.rearm = false;
            self.phase = CapturePhase::Armed;
        } else {
            self.phase = CapturePhase::Settled;
        }
    }

    /// Mark a drawn frame complete, closing the handshake.
    ///
    /// `Settled → Idle`; every other phase is untouched.
    pub fn settle(&mut self) {
        if self.phase == CapturePhase::Settled {
            self.phase = CapturePhase::Idle;
        }
    }

    /// Discard the cached image and return to `Idle`.
    ///
    /// Used on reset and on session teardown.
    pub fn clear(&mut self) {
        self.image = None;
        self.phase = CapturePhase::Idle;
        self.rearm = false;
    }
}

//  Tests
