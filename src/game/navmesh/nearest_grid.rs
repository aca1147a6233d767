//! Bucketed cache for "which navpoint is closest to P".
//!
//! Each cell stores the navpoints that were nearest to a set of probe points
//! inside it: the four corners, the centre, then `probes_per_cell` random
//! points. Lookups only scan the candidates of the query's cell, so the answer
//! is approximate for points far from every probe.

use bevy::prelude::*;
use rand::Rng;
use rustc_hash::FxHashSet;

use super::types::{NodeId, NEAREST_GRID_COLS, NEAREST_GRID_ROWS};
use crate::game::arena::ArenaBounds;
use crate::game::collections::CompressedRows;

#[derive(Clone, Debug, PartialEq)]
pub struct NearestGrid {
    cols: usize,
    rows: usize,
    cell_size: Vec2,
    candidates: CompressedRows<NodeId>,
}

impl NearestGrid {
    pub(super) fn build(
        bounds: &ArenaBounds,
        positions: &[Vec2],
        probes_per_cell: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let cols = NEAREST_GRID_COLS;
        let rows = NEAREST_GRID_ROWS;
        let cell_size = cell_size(bounds, cols, rows);

        let mut cells = Vec::with_capacity(cols * rows);
        let mut seen = FxHashSet::default();

        for row in 0..rows {
            for col in 0..cols {
                let min = Vec2::new(col as f32, row as f32) * cell_size;
                let max = min + cell_size;

                let mut probes = vec![
                    min,
                    Vec2::new(max.x, min.y),
                    max,
                    Vec2::new(min.x, max.y),
                    (min + max) * 0.5,
                ];
                probes.extend((0..probes_per_cell).map(|_| {
                    Vec2::new(
                        rng.random_range(min.x..max.x),
                        rng.random_range(min.y..max.y),
                    )
                }));

                seen.clear();
                let mut cell = Vec::new();
                for probe in probes {
                    if let Some(node) = nearest_exact(bounds, positions, probe) {
                        if seen.insert(node) {
                            cell.push(node);
                        }
                    }
                }
                cells.push(cell);
            }
        }

        Self {
            cols,
            rows,
            cell_size,
            candidates: CompressedRows::from_rows(cells),
        }
    }

    pub(super) fn from_candidates(bounds: &ArenaBounds, candidates: CompressedRows<NodeId>) -> Self {
        Self {
            cols: NEAREST_GRID_COLS,
            rows: NEAREST_GRID_ROWS,
            cell_size: cell_size(bounds, NEAREST_GRID_COLS, NEAREST_GRID_ROWS),
            candidates,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Row-major cell index of an in-arena point.
    pub fn cell_of(&self, point: Vec2) -> usize {
        let col = ((point.x / self.cell_size.x).floor() as isize).clamp(0, self.cols as isize - 1);
        let row = ((point.y / self.cell_size.y).floor() as isize).clamp(0, self.rows as isize - 1);
        row as usize * self.cols + col as usize
    }

    pub fn candidates(&self, cell: usize) -> &[NodeId] {
        self.candidates.row(cell)
    }

    pub(super) fn rows(&self) -> &CompressedRows<NodeId> {
        &self.candidates
    }
}

fn cell_size(bounds: &ArenaBounds, cols: usize, rows: usize) -> Vec2 {
    Vec2::new(bounds.width() / cols as f32, bounds.height() / rows as f32)
}

/// Brute-force toroidal nearest point. Ties go to the lower index.
pub fn nearest_exact(bounds: &ArenaBounds, positions: &[Vec2], point: Vec2) -> Option<NodeId> {
    let mut best: Option<(NodeId, f32)> = None;
    for (i, &p) in positions.iter().enumerate() {
        let d = bounds.distance_squared(point, p);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((NodeId(i as u32), d));
        }
    }
    best.map(|(node, _)| node)
}
