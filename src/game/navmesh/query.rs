//! Runtime queries against a built [`NavMesh`].

use bevy::prelude::*;

use super::mesh::NavMesh;
use super::types::NodeId;

impl NavMesh {
    /// Closest node to `point` among the candidates cached for its grid cell.
    pub fn nearest_navpoint(&self, point: Vec2) -> NodeId {
        let point = self.bounds.wrap(point);
        let cell = self.nearest.cell_of(point);

        let mut best: Option<(NodeId, f32)> = None;
        for &node in self.nearest.candidates(cell) {
            let d = self.bounds.distance_squared(point, self.position(node));
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((node, d));
            }
        }

        match best {
            Some((node, _)) => node,
            None => self.nearest_navpoint_exact(point),
        }
    }

    /// Estimated travel distance: walk to the nearest node, follow the graph,
    /// walk from the last node. `f32::INFINITY` when the graph leg is unreachable.
    pub fn navmesh_distance(&self, from: Vec2, to: Vec2) -> f32 {
        let a = self.nearest_navpoint(from);
        let b = self.nearest_navpoint(to);
        self.bounds.distance(from, self.position(a))
            + self.distance(a, b)
            + self.bounds.distance(self.position(b), to)
    }

    /// Neighbor of `current` closest to `destination` by graph distance.
    ///
    /// Returns `current` when already there, `destination` when it sits at the
    /// same spot, and `None` when it is unreachable. Every other returned hop
    /// strictly reduces the remaining distance.
    pub fn next_hop(&self, current: NodeId, destination: NodeId) -> Option<NodeId> {
        if current == destination {
            return Some(current);
        }

        let remaining = self.distance(current, destination);
        if !remaining.is_finite() {
            return None;
        }
        // Coincident nodes (duplicate or wrapped seeds) are joined by zero-length edges
        if remaining <= 0.0 {
            return Some(destination);
        }

        let best = self
            .neighbors(current)
            .iter()
            .copied()
            .min_by(|&a, &b| {
                self.distance(a, destination)
                    .total_cmp(&self.distance(b, destination))
            });

        match best {
            Some(next) if self.distance(next, destination) < remaining => Some(next),
            _ => {
                error!(
                    "[NAVMESH] No neighbor of node {} improves on distance {} to node {}",
                    current.0, remaining, destination.0
                );
                debug_assert!(false, "next_hop found no improving neighbor");
                None
            }
        }
    }

    /// Line of sight between two arena points.
    pub fn is_visible(&self, from: Vec2, to: Vec2) -> bool {
        self.occupancy.is_visible(&self.bounds, from, to)
    }
}
