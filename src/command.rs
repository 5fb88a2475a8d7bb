//! Commands and types used throughout snapnine.
//!
//! This module defines the vocabulary that all components share:
//! [`Command`] describes every action the grid session can perform, and
//! [`ScreenInfo`] / [`WindowInfo`] provide the supporting data types.
//!
//! The binding layer (a voice-command shim, a hotkey daemon, a test
//! harness) forwards raw arguments; the daemon parses them.  Digits
//! arrive as numbers or strings, digit sequences as arrays or strings
//! ("3 5 7" or "357"), and screen selectors as numbers or strings.

use crate::region::Region;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A single grid cell selector, `1..=9` on the wire.
///
/// Out-of-range values are accepted here and rejected (silently, as a
/// no-op) by the grid itself, matching the "nothing happened" error
/// surface of the command layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Digit(pub u8);

impl<'de> Deserialize<'de> for Digit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = Digit;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "digit as number or string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<Digit, E>
            where
                E: DeError,
            {
                u8::try_from(n)
                    .map(Digit)
                    .map_err(|_| DeError::custom("Narrow: digit does not fit in u8"))
            }
            fn visit_str<E>(self, s: &str) -> Result<Digit, E>
            where
                E: DeError,
            {
                let n: u8 = s
                    .trim()
                    .parse()
                    .map_err(|_| DeError::custom("Narrow: expected a digit"))?;
                Ok(Digit(n))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// A sequence of cell selectors for multi-step narrowing.
///
/// Accepts a JSON array of digits (`[3, 5, 7]`, numbers or strings) or a
/// single string of digits with optional whitespace (`"3 5 7"`, `"357"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigitList(pub Vec<u8>);

impl<'de> Deserialize<'de> for DigitList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = DigitList;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "array of digits or digit string")
            }
            fn visit_seq<A>(self, mut seq: A) -> Result<DigitList, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut digits = Vec::new();
                while let Some(d) = seq.next_element::<Digit>()? {
                    digits.push(d.0);
                }
                Ok(DigitList(digits))
            }
            fn visit_str<E>(self, s: &str) -> Result<DigitList, E>
            where
                E: DeError,
            {
                let digits: Vec<u8> = s
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| {
                        c.to_digit(10)
                            .map(|d| d as u8)
                            .ok_or_else(|| DeError::custom(format!("NarrowSequence: {c:?} is not a digit")))
                    })
                    .collect::<Result<_, E>>()?;
                Ok(DigitList(digits))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Wire format for screen selection: 1-based index, number or string.
///
/// The voice grammar counts screens from one ("grid screen two"), so the
/// wire keeps that convention; the session subtracts one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScreenIndex(pub usize);

impl<'de> Deserialize<'de> for ScreenIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = ScreenIndex;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "positive integer or string")
            }
            fn visit_u64<E>(self, n: u64) -> Result<ScreenIndex, E> {
                Ok(ScreenIndex(n as usize))
            }
            fn visit_str<E>(self, s: &str) -> Result<ScreenIndex, E>
            where
                E: DeError,
            {
                let n: usize = s
                    .trim()
                    .parse()
                    .map_err(|_| DeError::custom("SelectScreen: expected a positive integer"))?;
                Ok(ScreenIndex(n))
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Every action the grid session can perform.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by
/// [`GridSession`](crate::session::GridSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Bring up the grid on its current screen and tag it as showing.
    ///
    /// A no-op (logged) if the grid is already active.
    Activate,

    /// Place the grid on the currently focused window instead of a screen.
    PlaceOnActiveWindow,

    /// Reset the grid to fill the screen containing the pointer.
    ResetGrid,

    /// Reset the grid to the screen at the given **1-based** index and
    /// bring it up.
    SelectScreen(ScreenIndex),

    /// Narrow the grid into one of its nine cells and move the cursor to
    /// the new center.  Out-of-range digits do nothing.
    Narrow(Digit),

    /// Narrow several times in a row, one digit per step.
    NarrowSequence(DigitList),

    /// Undo the last narrowing / reset step.
    GoBack,

    /// Close the grid: restore assistive modes and tear down the overlay.
    ///
    /// A no-op unless the grid is currently tagged showing or active.
    Close,

    /// Ask for a repaint, e.g. after the host overlay surface was
    /// reconfigured.  Sent by the host, not by users.
    Redraw,
}

/// Static information about a screen known to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenInfo {
    /// Position in the host's screen list (0-based; 0 is the primary).
    pub index: usize,
    /// X position on the virtual desktop (pixels).
    pub x: i32,
    /// Y position on the virtual desktop (pixels).
    pub y: i32,
    /// Horizontal resolution in pixels.
    pub width: i32,
    /// Vertical resolution in pixels.
    pub height: i32,
}

impl ScreenInfo {
    /// The screen's bounds as a [`Region`].
    pub fn bounds(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }
}

/// Minimal information about the currently focused window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    /// Human-readable title.
    pub title: String,
    /// Left edge (absolute pixels).
    pub x: i32,
    /// Top edge (absolute pixels).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl WindowInfo {
    /// The window's bounds as a [`Region`].
    pub fn bounds(&self) -> Region {
        Region::new(self.x, self.y, self.width, self.height)
    }
}

/// Find the screen whose bounds contain `(x, y)`.
///
/// Returns `None` when the point falls in a gap between screens or the
/// list is empty; callers typically fall back to the primary screen.
pub fn screen_containing(screens: &[ScreenInfo], x: i32, y: i32) -> Option<&ScreenInfo> {
    screens.iter().find(|s| s.bounds().contains(x, y))
}
