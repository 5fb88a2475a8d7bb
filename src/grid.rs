//! Grid narrowing state.
//!
//! [`GridState`] owns the current target [`Region`], the history stack of
//! prior regions, and the narrowing-depth counter.  It is pure state: no
//! I/O, no cursor, no screenshots.  The [`session`](crate::session) layer
//! drives it and talks to the outside world.
//!
//! Two invariants are maintained at all times:
//!
//! * `history` is never empty — the initial full-screen/window region is
//!   the bottom element and cannot be popped.
//! * `depth` never underflows — undo past the bottom clamps at zero.

use crate::config::GridConfig;
use crate::region::Region;

/// The grid-narrowing state machine.
///
/// Every mutating operation except [`go_back`](GridState::go_back) pushes
/// the *previous* region onto the history stack, so a single rule covers
/// undo: pop restores exactly what the last mutation replaced.
#[derive(Debug, Clone)]
pub struct GridState {
    /// The active subdivision target.
    current: Region,
    /// Prior regions, oldest first.  Never empty.
    history: Vec<Region>,
    /// Narrowing steps since the last reset.
    depth: u32,
}

impl GridState {
    /// Create a grid targeting `initial` (typically a screen's bounds).
    pub fn new(initial: Region) -> Self {
        Self {
            current: initial,
            history: vec![initial],
            depth: 0,
        }
    }

    //  Accessors

    /// The active region.
    pub fn current(&self) -> Region {
        self.current
    }

    /// Narrowing steps since the last reset.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of history entries (≥ 1).
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    //  Mutations

    /// Narrow into cell `which` (1–9).
    ///
    /// Pushes the previous region, replaces the current one with the
    /// computed sub-cell, and increments the depth.  An out-of-range index
    /// is a silent no-op: no state mutation, `None` returned.
    pub fn narrow(&mut self, which: u8, config: &GridConfig) -> Option<Region> {
        let next = self
            .current
            .cell(which, config.narrow_expansion, config.one_bottom_left)?;
        self.history.push(self.current);
        self.current = next;
        self.depth += 1;
        Some(next)
    }

    /// Undo the most recent mutation.
    ///
    /// Pops the top history entry into the current region and decrements
    /// the depth (clamped at zero).  The initial region at the bottom of
    /// the stack is non-poppable; once only it remains, `go_back` is a
    /// no-op returning `false`.
    pub fn go_back(&mut self) -> bool {
        if self.history.len() <= 1 {
            return false;
        }
        // len > 1 checked above, so the pop cannot fail.
        if let Some(prev) = self.history.pop() {
            self.current = prev;
        }
        self.depth = self.depth.saturating_sub(1);
        true
    }

    /// Replace the current region with `bounds` and reset the depth.
    ///
    /// Used by both the screen reset and the place-on-window operation.
    /// The previous region is pushed, so the replacement is undoable like
    /// any other mutation.
    pub fn reset_region(&mut self, bounds: Region) {
        self.history.push(self.current);
        self.current = bounds;
        self.depth = 0;
    }
}

//  Tests
