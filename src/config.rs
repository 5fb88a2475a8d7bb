//! Application configuration.
//!
//! The configuration is loaded from a JSON file
//! (`$XDG_CONFIG_HOME/snapnine/config.json`).  The top-level schema uses
//! section keys so the file can grow without breaking backward
//! compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "grid": {
//!     "narrow_expansion": 4,
//!     "one_bottom_left": false
//!   },
//!   "overlay": {
//!     "capture_delay_ms": 5,
//!     "cross_arm_px": 10
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
///
/// Every field is optional — a minimal `{}` file is valid and all
/// sections fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Grid subdivision settings.
    #[serde(default)]
    pub grid: GridConfig,

    /// Overlay rendering and capture-timing settings.
    #[serde(default)]
    pub overlay: OverlayConfig,
}

/// Grid subdivision settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// After narrowing, grow the new region by this many pixels in every
    /// direction.  Makes targets sitting exactly on cell edges easier to
    /// hit, and lets a minimal grid still be nudged around.
    pub narrow_expansion: i32,
    /// Label the *bottom*-left cell `1` (numeric-keypad order) instead of
    /// the top-left one (reading order).
    pub one_bottom_left: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            narrow_expansion: 0,
            one_bottom_left: false,
        }
    }
}

/// Overlay rendering and capture-timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Pause before taking the magnifier screenshot (ms).  Acts purely as
    /// a yield-point so the host finishes compositing the blanked frame
    /// before the screen is read back.
    pub capture_delay_ms: u64,
    /// Arm length of the cell-center cross markers (px).
    pub cross_arm_px: i32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            capture_delay_ms: 5,
            cross_arm_px: 10,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
