//! **snapnine** — a recursive 3×3 mouse-grid overlay.
//!
//! The grid subdivides a screen (or window) region into nine numbered
//! cells.  Selecting a digit narrows the region to that cell; after two
//! narrowing steps the region is small enough that a frozen screenshot of
//! it is composited behind the grid ("magnifier mode") and narrowing
//! continues against the magnified view.  Every step can be undone, and
//! the cursor follows the center of the current region.
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::Desktop`] — abstracts screen enumeration, cursor control,
//!   screenshot capture, assistive-input toggles and overlay presentation,
//!   so the grid logic is not coupled to any specific host environment.
//! * [`traits::CommandSource`] — abstracts the transport that delivers
//!   user intent (a Unix socket, a voice-binding shim, a test harness, …)
//!   so the main loop is not coupled to any specific IPC mechanism.
//!
//! The pure state lives in [`region`], [`grid`] and [`magnifier`];
//! [`session::GridSession`] orchestrates them against a [`traits::Desktop`]
//! backend.  Concrete backends live in [`ipc`] (Unix-socket command
//! listener) and [`bridge`] (Unix-socket host bridge).

pub mod bridge;
pub mod command;
pub mod config;
pub mod grid;
pub mod ipc;
pub mod magnifier;
pub mod overlay;
pub mod region;
pub mod session;
pub mod traits;
