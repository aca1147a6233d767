//! Occupancy bitmap and line-of-sight queries.

use bevy::prelude::*;
use fixedbitset::FixedBitSet;

use super::types::{OCCUPANCY_COLS, OCCUPANCY_ROWS};
use crate::game::arena::ArenaBounds;
use crate::game::math::Segment;

/// One bit per cell; a cell is solid when some wall touches it.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyGrid {
    cols: usize,
    rows: usize,
    cell_size: Vec2,
    solid: FixedBitSet,
}

impl OccupancyGrid {
    pub fn empty(bounds: &ArenaBounds) -> Self {
        let cols = OCCUPANCY_COLS;
        let rows = OCCUPANCY_ROWS;
        Self {
            cols,
            rows,
            cell_size: Vec2::new(bounds.width() / cols as f32, bounds.height() / rows as f32),
            solid: FixedBitSet::with_capacity(cols * rows),
        }
    }

    /// Rasterize `walls`. Only cells inside each wall's bounding box are tested.
    pub(super) fn rasterize(bounds: &ArenaBounds, walls: &[Segment]) -> Self {
        let mut grid = Self::empty(bounds);
        for wall in walls {
            let bbox = wall.bounds();
            let (min_col, min_row) = grid.cell_coords(bbox.min);
            let (max_col, max_row) = grid.cell_coords(bbox.max);
            for row in min_row..=max_row {
                for col in min_col..=max_col {
                    let rect = grid.cell_rect(col, row);
                    let touches = rect.contains(wall.start)
                        || rect.contains(wall.end)
                        || wall.raycast_rect(rect) != wall.end;
                    if touches {
                        grid.solid.insert(grid.bit(col, row));
                    }
                }
            }
        }
        grid
    }

    pub(super) fn from_words(bounds: &ArenaBounds, words: &[u32]) -> Self {
        let mut grid = Self::empty(bounds);
        for i in 0..grid.cols * grid.rows {
            if words[i / 32] & (1 << (i % 32)) != 0 {
                grid.solid.insert(i);
            }
        }
        grid
    }

    /// Number of `u32` words the bitmap packs into.
    pub fn word_count() -> usize {
        (OCCUPANCY_COLS * OCCUPANCY_ROWS).div_ceil(32)
    }

    /// Bit `i` of the bitmap is bit `i % 32` of word `i / 32`.
    pub fn to_words(&self) -> Vec<u32> {
        let mut words = vec![0u32; Self::word_count()];
        for i in self.solid.ones() {
            words[i / 32] |= 1 << (i % 32);
        }
        words
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_solid(&self, col: usize, row: usize) -> bool {
        self.solid.contains(self.bit(col, row))
    }

    pub fn solid_count(&self) -> usize {
        self.solid.count_ones(..)
    }

    pub fn cell_rect(&self, col: usize, row: usize) -> Rect {
        let min = Vec2::new(col as f32, row as f32) * self.cell_size;
        Rect::from_corners(min, min + self.cell_size)
    }

    /// Cell holding `point`, clamped into the grid.
    pub fn cell_coords(&self, point: Vec2) -> (usize, usize) {
        let col = ((point.x / self.cell_size.x).floor() as isize).clamp(0, self.cols as isize - 1);
        let row = ((point.y / self.cell_size.y).floor() as isize).clamp(0, self.rows as isize - 1);
        (col as usize, row as usize)
    }

    fn bit(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    /// Line of sight along the toroidally shortest path.
    ///
    /// The endpoints are put in a fixed order first so the answer does not
    /// depend on which end asks. The starting cell never blocks.
    pub fn is_visible(&self, bounds: &ArenaBounds, from: Vec2, to: Vec2) -> bool {
        let (a, b) = canonical_order(bounds.wrap(from), bounds.wrap(to));
        if a == b {
            return true;
        }

        let path = bounds.shortest_path(a, b);
        path.segments()
            .iter()
            .enumerate()
            .all(|(i, piece)| self.walk(piece, i > 0))
    }

    /// Step cell by cell from `piece.start` to `piece.end`, crossing whichever
    /// cell boundary comes first. Exactly one step per column or row changed.
    fn walk(&self, piece: &Segment, check_start: bool) -> bool {
        let (mut col, mut row) = self.cell_coords(piece.start);
        let (end_col, end_row) = self.cell_coords(piece.end);

        if check_start && self.is_solid(col, row) {
            return false;
        }

        let d = piece.delta();
        let step_col: isize = if end_col > col { 1 } else { -1 };
        let step_row: isize = if end_row > row { 1 } else { -1 };

        let (mut t_col, dt_col) = boundary_params(piece.start.x, d.x, col, self.cell_size.x);
        let (mut t_row, dt_row) = boundary_params(piece.start.y, d.y, row, self.cell_size.y);

        let steps = col.abs_diff(end_col) + row.abs_diff(end_row);
        for _ in 0..steps {
            let advance_col = if col == end_col {
                false
            } else if row == end_row {
                true
            } else {
                t_col <= t_row
            };

            if advance_col {
                col = col.wrapping_add_signed(step_col);
                t_col += dt_col;
            } else {
                row = row.wrapping_add_signed(step_row);
                t_row += dt_row;
            }

            if self.is_solid(col, row) {
                return false;
            }
        }

        true
    }
}

/// Parameter of the first boundary crossing along one axis, and the parameter
/// spacing between successive crossings.
fn boundary_params(origin: f32, delta: f32, cell: usize, size: f32) -> (f32, f32) {
    if delta > 0.0 {
        (((cell + 1) as f32 * size - origin) / delta, size / delta)
    } else if delta < 0.0 {
        ((cell as f32 * size - origin) / delta, size / -delta)
    } else {
        (f32::INFINITY, f32::INFINITY)
    }
}

fn canonical_order(a: Vec2, b: Vec2) -> (Vec2, Vec2) {
    if (a.x, a.y) <= (b.x, b.y) {
        (a, b)
    } else {
        (b, a)
    }
}
