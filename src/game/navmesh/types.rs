use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::game::arena::ArenaBounds;
use crate::game::collections::RowsError;
use crate::game::math::Segment;

/// Node counts must lie strictly between these bounds.
pub const MIN_NODES: usize = 3;
pub const MAX_NODES: usize = 1024;

/// Nearest-navpoint grid resolution.
pub const NEAREST_GRID_COLS: usize = 15;
pub const NEAREST_GRID_ROWS: usize = 10;

/// Occupancy bitmap resolution.
pub const OCCUPANCY_COLS: usize = 96;
pub const OCCUPANCY_ROWS: usize = 64;

/// Index of a node within the [`NavMesh`](super::NavMesh) that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Static arena geometry a navmesh is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaDescription {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub walls: Vec<Segment>,
    /// Points of interest (platforms) that always become nodes.
    #[serde(default)]
    pub seeds: Vec<Vec2>,
}

impl ArenaDescription {
    pub fn bounds(&self) -> ArenaBounds {
        ArenaBounds::new(self.width, self.height)
    }
}

#[derive(Debug, Error)]
pub enum NavmeshError {
    #[error("navmesh has {count} nodes, expected more than {} and fewer than {}", MIN_NODES, MAX_NODES)]
    NodeCount { count: usize },

    #[error("navmesh file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("{what} index {index} out of range (limit {limit})")]
    IndexOutOfRange { what: &'static str, index: u32, limit: usize },

    #[error("navmesh {what} counts do not match: {source}")]
    Layout {
        what: &'static str,
        #[source]
        source: RowsError,
    },

    #[error("arena of {width}x{height} cannot hold a navmesh")]
    DegenerateArena { width: f32, height: f32 },
}

pub(crate) fn check_node_count(count: usize) -> Result<(), NavmeshError> {
    if count > MIN_NODES && count < MAX_NODES {
        Ok(())
    } else {
        Err(NavmeshError::NodeCount { count })
    }
}
