use bevy::prelude::*;

use super::distance::{count_components, DistanceTable};
use super::nearest_grid::{nearest_exact, NearestGrid};
use super::types::NodeId;
use super::visibility::OccupancyGrid;
use crate::game::arena::ArenaBounds;
use crate::game::collections::CompressedRows;

/// Navigation graph for one arena.
///
/// Immutable once built. Node ids are only meaningful for the mesh that
/// produced them; replacing the resource invalidates every id handed out.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct NavMesh {
    pub(super) bounds: ArenaBounds,
    pub(super) positions: Vec<Vec2>,
    pub(super) clearance: Vec<f32>,
    pub(super) neighbors: CompressedRows<NodeId>,
    pub(super) distances: DistanceTable,
    pub(super) nearest: NearestGrid,
    pub(super) occupancy: OccupancyGrid,
}

impl NavMesh {
    pub fn bounds(&self) -> &ArenaBounds {
        &self.bounds
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.positions.len() as u32).map(NodeId)
    }

    pub fn position(&self, node: NodeId) -> Vec2 {
        self.positions[node.index()]
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Distance from the node to the nearest wall.
    pub fn clearance(&self, node: NodeId) -> f32 {
        self.clearance[node.index()]
    }

    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.neighbors.row(node.index())
    }

    /// Shortest graph distance between two nodes, `f32::INFINITY` when unreachable.
    pub fn distance(&self, a: NodeId, b: NodeId) -> f32 {
        self.distances.get(a, b)
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.items().len() / 2
    }

    /// Undirected edges, each reported once with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes().flat_map(move |a| {
            self.neighbors(a)
                .iter()
                .filter(move |&&b| a < b)
                .map(move |&b| (a, b))
        })
    }

    pub fn connected_components(&self) -> usize {
        count_components(&self.neighbors)
    }

    pub fn is_fully_connected(&self) -> bool {
        self.connected_components() == 1
    }

    /// Brute-force nearest node. Reference for the cached lookup.
    pub fn nearest_navpoint_exact(&self, point: Vec2) -> NodeId {
        nearest_exact(&self.bounds, &self.positions, point).unwrap_or(NodeId(0))
    }

    pub fn nearest_grid(&self) -> &NearestGrid {
        &self.nearest
    }

    pub fn occupancy(&self) -> &OccupancyGrid {
        &self.occupancy
    }
}
