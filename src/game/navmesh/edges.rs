//! Visibility-graph edges between navpoints.

use bevy::prelude::*;

use super::sampler::wall_clearance;
use super::types::NodeId;
use crate::game::arena::ArenaBounds;
use crate::game::config::NavmeshConfig;
use crate::game::math::Segment;

/// Undirected edge. `length` is the toroidally shortest connecting distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub length: f32,
}

/// Whether the shortest path between `from` and `to` may become an edge.
pub fn edge_admissible(
    bounds: &ArenaBounds,
    walls: &[Segment],
    config: &NavmeshConfig,
    from: Vec2,
    to: Vec2,
) -> Option<f32> {
    let path = bounds.shortest_path(from, to);
    let max_sq = config.max_edge_length * config.max_edge_length;
    if path.length_squared() > max_sq {
        return None;
    }

    for piece in path.segments() {
        if walls.iter().any(|wall| piece.intersects(wall)) {
            return None;
        }
        if wall_clearance(bounds, walls, piece.midpoint()) < config.min_wall_clearance {
            return None;
        }
    }

    Some(path.length())
}

/// Test every unordered pair of points.
pub(super) fn build_edges(
    bounds: &ArenaBounds,
    walls: &[Segment],
    points: &[Vec2],
    config: &NavmeshConfig,
) -> Vec<Edge> {
    let mut edges = Vec::new();
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            if let Some(length) = edge_admissible(bounds, walls, config, points[i], points[j]) {
                edges.push(Edge {
                    a: NodeId(i as u32),
                    b: NodeId(j as u32),
                    length,
                });
            }
        }
    }
    edges
}
