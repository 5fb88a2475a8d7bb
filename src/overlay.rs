//! Pure frame planning for the grid overlay.
//!
//! [`plan`] turns a [`FrameState`] into a flat list of [`DrawOp`]
//! primitives.  The host executes them in order on its overlay surface;
//! colors, stroke widths and fonts are host styling and never appear
//! here.  Keeping the planner pure makes every drawing rule a unit test
//! instead of a screenshot comparison.
//!
//! Planning rules:
//!
//! * While the capture handshake is in `Armed` or `Captured`, the plan is
//!   **empty** — the overlay must not appear in its own screenshot.
//! * Below depth 2 the grid is drawn in place over the target region,
//!   with a center cross in every cell as a pre-narrowing preview.
//! * From depth 2 the frozen backdrop (if captured) is composited scaled
//!   into an aspect-preserving rectangle centered on the screen, and the
//!   grid is drawn over *that* instead of the (tiny) real region.

use crate::config::{GridConfig, OverlayConfig};
use crate::magnifier::CapturePhase;
use crate::region::Region;
use crate::traits::{CapturedImage, FrameState};
use serde::{Deserialize, Serialize};

/// Narrowing depth at which the magnified backdrop takes over.
pub const MAGNIFIER_DEPTH: u32 = 2;

/// One drawing primitive for the host overlay surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawOp {
    /// A straight line between two absolute points.
    Line { x1: i32, y1: i32, x2: i32, y2: i32 },
    /// A small `+` marker centered at `(x, y)` with the given arm length.
    Cross { x: i32, y: i32, arm: i32 },
    /// A numbered cell label centered at `(x, y)`.
    ///
    /// The host measures the text and backs it with a translucent chip
    /// sized to the measurement.
    Label { text: String, x: i32, y: i32 },
    /// The retained bitmap `image`, scaled to fill `dst`.
    Image { image: CapturedImage, dst: Region },
}

/// Plan one frame.
pub fn plan(frame: &FrameState, grid: &GridConfig, overlay: &OverlayConfig) -> Vec<DrawOp> {
    if matches!(frame.phase, CapturePhase::Armed | CapturePhase::Captured) {
        return Vec::new();
    }

    let mut ops = Vec::new();
    if frame.depth >= MAGNIFIER_DEPTH {
        let dst = magnified_rect(frame.region, frame.screen);
        if let Some(image) = frame.image {
            ops.push(DrawOp::Image { image, dst });
        }
        push_grid_lines(&mut ops, dst);
        push_labels(&mut ops, dst, grid.one_bottom_left);
    } else {
        push_crosses(&mut ops, frame.region, grid, overlay.cross_arm_px);
        push_grid_lines(&mut ops, frame.region);
        push_labels(&mut ops, frame.region, grid.one_bottom_left);
    }
    ops
}

/// Where the magnified backdrop is drawn: an aspect-preserving rectangle,
/// one third of the screen along its longer axis, centered on the screen.
pub fn magnified_rect(region: Region, screen: Region) -> Region {
    let aspect = region.width as f64 / region.height as f64;
    let (w, h) = if aspect >= 1.0 {
        let w = screen.width as f64 / 3.0;
        (w, w / aspect)
    } else {
        let h = screen.height as f64 / 3.0;
        (h * aspect, h)
    };
    Region::new(
        screen.x + ((screen.width as f64 - w) / 2.0) as i32,
        screen.y + ((screen.height as f64 - h) / 2.0) as i32,
        w as i32,
        h as i32,
    )
}

/// Two vertical and two horizontal lines splitting `r` into thirds.
fn push_grid_lines(ops: &mut Vec<DrawOp>, r: Region) {
    let x1 = r.x + r.width / 3;
    let x2 = r.x + 2 * r.width / 3;
    let y1 = r.y + r.height / 3;
    let y2 = r.y + 2 * r.height / 3;
    ops.push(DrawOp::Line {
        x1,
        y1: r.y,
        x2: x1,
        y2: r.y + r.height,
    });
    ops.push(DrawOp::Line {
        x1: x2,
        y1: r.y,
        x2,
        y2: r.y + r.height,
    });
    ops.push(DrawOp::Line {
        x1: r.x,
        y1,
        x2: r.x + r.width,
        y2: y1,
    });
    ops.push(DrawOp::Line {
        x1: r.x,
        y1: y2,
        x2: r.x + r.width,
        y2,
    });
}

/// One center cross per prospective sub-cell, previewing where the next
/// narrowing step would land (expansion margin included).
fn push_crosses(ops: &mut Vec<DrawOp>, r: Region, grid: &GridConfig, arm: i32) {
    for which in 1..=9u8 {
        if let Some(sub) = r.cell(which, grid.narrow_expansion, grid.one_bottom_left) {
            let (x, y) = sub.center();
            ops.push(DrawOp::Cross { x, y, arm });
        }
    }
}

/// Nine numbered labels at the cell centers, row order flipped under the
/// bottom-left-origin option.
fn push_labels(ops: &mut Vec<DrawOp>, r: Region, one_bottom_left: bool) {
    for row in 0..3 {
        for col in 0..3 {
            let n = if one_bottom_left {
                (2 - row) * 3 + col + 1
            } else {
                row * 3 + col + 1
            };
            ops.push(DrawOp::Label {
                text: n.to_string(),
                x: r.x + r.width / 6 + col * (r.width / 3),
                y: r.y + r.height / 6 + row * (r.height / 3),
            });
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(depth: u32, phase: CapturePhase, image: Option<CapturedImage>) -> FrameState {
        FrameState {
            region: Region::new(640, 360, 640, 360),
            screen: Region::new(0, 0, 1920, 1080),
            depth,
            active: true,
            image,
            phase,
        }
    }

    fn img() -> CapturedImage {
        CapturedImage {
            id: 1,
            width: 640,
            height: 360,
        }
    }

    #[test]
    fn no_primitives_while_armed_or_captured() {
        assert!(plan(
            &frame(2, CapturePhase::Armed, None),
            &GridConfig::default(),
            &OverlayConfig::default()
        )
        .is_empty());
        assert!(plan(
            &frame(2, CapturePhase::Captured, Some(img())),
            &GridConfig::default(),
            &OverlayConfig::default()
        )
        .is_empty());
    }

    #[test]
    fn shallow_frame_draws_lines_crosses_and_labels_in_place() {
        let ops = plan(
            &frame(0, CapturePhase::Idle, None),
            &GridConfig::default(),
            &OverlayConfig::default(),
        );
        let crosses = ops.iter().filter(|o| matches!(o, DrawOp::Cross { .. })).count();
        let lines = ops.iter().filter(|o| matches!(o, DrawOp::Line { .. })).count();
        let labels = ops.iter().filter(|o| matches!(o, DrawOp::Label { .. })).count();
        assert_eq!((crosses, lines, labels), (9, 4, 9));
        assert!(!ops.iter().any(|o| matches!(o, DrawOp::Image { .. })));
    }

    #[test]
    fn grid_lines_split_the_region_into_thirds() {
        let ops = plan(
            &frame(0, CapturePhase::Idle, None),
            &GridConfig::default(),
            &OverlayConfig::default(),
        );
        // Region is (640, 360, 640, 360): verticals at 853 and 1066,
        // horizontals at 480 and 600.
        assert!(ops.contains(&DrawOp::Line {
            x1: 853,
            y1: 360,
            x2: 853,
            y2: 720
        }));
        assert!(ops.contains(&DrawOp::Line {
            x1: 1066,
            y1: 360,
            x2: 1066,
            y2: 720
        }));
        assert!(ops.contains(&DrawOp::Line {
            x1: 640,
            y1: 480,
            x2: 1280,
            y2: 480
        }));
        assert!(ops.contains(&DrawOp::Line {
            x1: 640,
            y1: 600,
            x2: 1280,
            y2: 600
        }));
    }

    #[test]
    fn labels_read_one_through_nine_top_left_by_default() {
        let ops = plan(
            &frame(0, CapturePhase::Idle, None),
            &GridConfig::default(),
            &OverlayConfig::default(),
        );
        let labels: Vec<&str> = ops
            .iter()
            .filter_map(|o| match o {
                DrawOp::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["1", "2", "3", "4", "5", "6", "7", "8", "9"]);
    }

    #[test]
    fn labels_flip_rows_with_bottom_left_origin() {
        let cfg = GridConfig {
            one_bottom_left: true,
            ..GridConfig::default()
        };
        let ops = plan(
            &frame(0, CapturePhase::Idle, None),
            &cfg,
            &OverlayConfig::default(),
        );
        let labels: Vec<&str> = ops
            .iter()
            .filter_map(|o| match o {
                DrawOp::Label { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        // Top visual row reads 7 8 9, bottom row reads 1 2 3.
        assert_eq!(labels, ["7", "8", "9", "1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn deep_frame_composites_the_backdrop_first() {
        let ops = plan(
            &frame(2, CapturePhase::Idle, Some(img())),
            &GridConfig::default(),
            &OverlayConfig::default(),
        );
        assert!(matches!(ops[0], DrawOp::Image { .. }));
        // No crosses in magnifier mode.
        assert!(!ops.iter().any(|o| matches!(o, DrawOp::Cross { .. })));
        // Grid and labels are drawn over the magnified rect, not the
        // real region.
        let dst = magnified_rect(Region::new(640, 360, 640, 360), Region::new(0, 0, 1920, 1080));
        match &ops[0] {
            DrawOp::Image { dst: d, .. } => assert_eq!(*d, dst),
            other => panic!("expected image first, got {other:?}"),
        }
    }

    #[test]
    fn deep_frame_without_image_still_draws_the_grid() {
        // A missed capture leaves the previous (or no) backdrop; the grid
        // itself must stay usable.
        let ops = plan(
            &frame(3, CapturePhase::Idle, None),
            &GridConfig::default(),
            &OverlayConfig::default(),
        );
        assert!(!ops.iter().any(|o| matches!(o, DrawOp::Image { .. })));
        let lines = ops.iter().filter(|o| matches!(o, DrawOp::Line { .. })).count();
        assert_eq!(lines, 4);
    }

    #[test]
    fn magnified_rect_preserves_aspect_and_centers() {
        let screen = Region::new(0, 0, 1920, 1080);
        // Wide region: width pinned to a third of the screen.
        let dst = magnified_rect(Region::new(853, 480, 213, 120), screen);
        assert_eq!(dst.width, 640);
        // 640 / (213/120) ≈ 360.6
        assert_eq!(dst.height, 360);
        assert_eq!(dst.x, 640);
        // Centered vertically (truncation may shave a pixel).
        let centered = (1080 - dst.height) / 2;
        assert!((dst.y - centered).abs() <= 1, "y {} vs {}", dst.y, centered);

        // Tall region: height pinned instead.
        let dst = magnified_rect(Region::new(0, 0, 120, 213), screen);
        assert_eq!(dst.height, 360);
        assert_eq!(dst.width, (360.0 * 120.0 / 213.0) as i32);
    }

    #[test]
    fn magnified_rect_respects_screen_offset() {
        let screen = Region::new(1920, 100, 1920, 1080);
        let dst = magnified_rect(Region::new(2000, 500, 300, 300), screen);
        assert_eq!(dst.x, 1920 + (1920 - dst.width) / 2);
        assert_eq!(dst.y, 100 + (1080 - dst.height) / 2);
    }
}
