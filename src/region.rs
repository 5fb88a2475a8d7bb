//! Rectangle arithmetic for the 3×3 grid.
//!
//! [`Region`] is the rectangle currently targeted by the grid, in absolute
//! screen-pixel coordinates.  All subdivision math lives here: computing
//! the sub-region for a numbered cell, the region center the cursor is
//! moved to, and the reverse mapping from a point back to the cell that
//! contains it.
//!
//! Cell indices run 1–9 in reading order (1 top-left, 9 bottom-right).
//! When the *bottom-left origin* option is set, the rows are flipped so
//! that 1 labels the bottom-left cell instead — the same convention some
//! numeric keypads use.
//!
//! All division is floor division.  Widths and heights are positive while
//! a grid is active, so plain `i32` division is exact floor division; the
//! boundary placement must not be "improved" with rounding, because the
//! overlay and the narrowing math have to agree about it pixel for pixel.

use serde::{Deserialize, Serialize};

/// A rectangle in absolute screen-pixel coordinates.
///
/// Invariant while a grid is active: `width > 0` and `height > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge (absolute pixels).
    pub x: i32,
    /// Top edge (absolute pixels).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Region {
    /// Create a region from its left/top corner and size.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point, using the same integer division the cursor move uses.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Whether `(px, py)` lies inside this region.
    ///
    /// The right and bottom edges are exclusive, matching how the nine
    /// cells tile the region.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }

    /// Compute the sub-region for cell `which` (1–9).
    ///
    /// The cell occupies one ninth of the region (floor division by 3 per
    /// axis), then grows by `expansion` pixels in every direction so edge
    /// targets stay reachable and a minimal grid can still be nudged
    /// around.  With `one_bottom_left` set, the row order is flipped
    /// vertically (cell 1 becomes the bottom-left cell).
    ///
    /// Returns `None` when `which` is outside `1..=9`.
    pub fn cell(&self, which: u8, expansion: i32, one_bottom_left: bool) -> Option<Region> {
        if !(1..=9).contains(&which) {
            return None;
        }
        let idx = i32::from(which - 1);
        let mut row = idx / 3;
        let col = idx % 3;
        if one_bottom_left {
            row = 2 - row;
        }
        Some(Region {
            x: self.x + col * (self.width / 3) - expansion,
            y: self.y + row * (self.height / 3) - expansion,
            width: self.width / 3 + 2 * expansion,
            height: self.height / 3 + 2 * expansion,
        })
    }

    /// Map an absolute point back to the cell index (1–9) that contains it.
    ///
    /// Floor-divides the offset-relative coordinate by the cell size.  The
    /// truncation-remainder pixels along the right and bottom edges belong
    /// to the last column/row, so column and row are clamped to `0..=2`.
    /// The returned index is adjusted for `one_bottom_left` so that
    /// [`cell`](Region::cell) with the same flag yields a sub-region that
    /// geometrically contains `(px, py)`.
    ///
    /// Returns `None` when the point lies outside the region.
    pub fn cell_containing(&self, px: i32, py: i32, one_bottom_left: bool) -> Option<u8> {
        if !self.contains(px, py) {
            return None;
        }
        let col_size = self.width / 3;
        let row_size = self.height / 3;
        if col_size == 0 || row_size == 0 {
            // Degenerate: thinner than three pixels.  Everything is cell 1.
            return Some(1);
        }
        let col = ((px - self.x) / col_size).min(2);
        let mut row = ((py - self.y) / row_size).min(2);
        if one_bottom_left {
            row = 2 - row;
        }
        Some((1 + col + 3 * row) as u8)
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;

    fn full_hd() -> Region {
        Region::new(0, 0, 1920, 1080)
    }

    #[test]
    fn center_cell_of_full_hd() {
        let r = full_hd().cell(5, 0, false).unwrap();
        assert_eq!(r, Region::new(640, 360, 640, 360));
    }

    #[test]
    fn center_cell_twice_matches_floor_division() {
        let r = full_hd().cell(5, 0, false).unwrap();
        let r2 = r.cell(5, 0, false).unwrap();
        assert_eq!(r2, Region::new(853, 480, 213, 120));
    }

    #[test]
    fn reading_order_top_left_is_one() {
        let r = full_hd().cell(1, 0, false).unwrap();
        assert_eq!((r.x, r.y), (0, 0));
        let r = full_hd().cell(3, 0, false).unwrap();
        assert_eq!((r.x, r.y), (1280, 0));
        let r = full_hd().cell(7, 0, false).unwrap();
        assert_eq!((r.x, r.y), (0, 720));
    }

    #[test]
    fn bottom_left_origin_flips_rows() {
        // With the flag set, cell 1 is the *bottom*-left cell.
        let r = full_hd().cell(1, 0, true).unwrap();
        assert_eq!((r.x, r.y), (0, 720));
        // ...and 7 is the top-left one.
        let r = full_hd().cell(7, 0, true).unwrap();
        assert_eq!((r.x, r.y), (0, 0));
        // Columns are unaffected.
        let r = full_hd().cell(3, 0, true).unwrap();
        assert_eq!((r.x, r.y), (1280, 720));
    }

    #[test]
    fn expansion_grows_cell_in_every_direction() {
        let r = full_hd().cell(5, 10, false).unwrap();
        assert_eq!(r, Region::new(630, 350, 660, 380));
    }

    #[test]
    fn out_of_range_cell_is_none() {
        assert!(full_hd().cell(0, 0, false).is_none());
        assert!(full_hd().cell(10, 0, false).is_none());
    }

    #[test]
    fn nine_cells_tile_without_gaps() {
        // With no expansion, the 9 sub-regions exactly tile the region up
        // to the floor-division remainder at the right/bottom edge.
        let r = Region::new(13, 7, 1000, 700);
        let cw = r.width / 3;
        let ch = r.height / 3;
        for which in 1..=9u8 {
            let c = r.cell(which, 0, false).unwrap();
            assert_eq!(c.width, cw);
            assert_eq!(c.height, ch);
            let idx = i32::from(which - 1);
            assert_eq!(c.x, r.x + (idx % 3) * cw);
            assert_eq!(c.y, r.y + (idx / 3) * ch);
        }
        // Remainder strip is at most 2px per axis.
        assert!(r.width - 3 * cw < 3);
        assert!(r.height - 3 * ch < 3);
    }

    #[test]
    fn center_uses_integer_division() {
        assert_eq!(Region::new(0, 0, 7, 5).center(), (3, 2));
        assert_eq!(Region::new(-10, -10, 5, 5).center(), (-8, -8));
    }

    #[test]
    fn contains_is_half_open() {
        let r = Region::new(10, 10, 30, 30);
        assert!(r.contains(10, 10));
        assert!(r.contains(39, 39));
        assert!(!r.contains(40, 10));
        assert!(!r.contains(10, 40));
        assert!(!r.contains(9, 10));
    }

    #[test]
    fn cell_containing_round_trips_through_cell() {
        let r = Region::new(100, 50, 900, 600);
        for (px, py) in [(100, 50), (550, 350), (999, 649), (400, 649)] {
            let which = r.cell_containing(px, py, false).unwrap();
            let sub = r.cell(which, 0, false).unwrap();
            assert!(
                sub.contains(px, py),
                "cell {which} {sub:?} must contain ({px}, {py})"
            );
        }
    }

    #[test]
    fn cell_containing_round_trips_when_flipped() {
        // The index is flip-compensated, so the chosen sub-region still
        // geometrically contains the point.
        let r = Region::new(0, 0, 1920, 1080);
        for (px, py) in [(0, 0), (960, 540), (1919, 1079), (10, 1000)] {
            let which = r.cell_containing(px, py, true).unwrap();
            let sub = r.cell(which, 0, true).unwrap();
            assert!(sub.contains(px, py));
        }
    }

    #[test]
    fn cell_containing_clamps_remainder_pixels() {
        // 10/3 == 3, so x offsets 9 fall past col*3 for col 2; they
        // belong to the last column, not a phantom fourth one.
        let r = Region::new(0, 0, 10, 10);
        assert_eq!(r.cell_containing(9, 9, false), Some(9));
        assert_eq!(r.cell_containing(0, 9, false), Some(7));
    }

    #[test]
    fn cell_containing_outside_is_none() {
        let r = Region::new(0, 0, 90, 90);
        assert_eq!(r.cell_containing(90, 0, false), None);
        assert_eq!(r.cell_containing(-1, 50, false), None);
    }
}
