//! Navigation mesh over a toroidal arena.
//!
//! Built offline (or at level load) from wall segments and seed points:
//!
//! 1. `sampler` rejection-samples navpoints with wall clearance and spacing.
//! 2. `edges` connects points whose shortest toroidal path clears every wall.
//! 3. `distance` folds edges into adjacency rows and runs Floyd–Warshall.
//! 4. `nearest_grid` caches nearest-node candidates per coarse cell.
//! 5. `visibility` rasterizes walls for line-of-sight walks.
//!
//! The result is immutable and can be saved to / loaded from a binary file
//! with [`save_navmesh`] / [`load_navmesh`].

mod build;
pub mod debug;
mod distance;
mod edges;
mod mesh;
mod nearest_grid;
mod persistence;
mod query;
mod sampler;
mod systems;
mod types;
mod visibility;


// ============================================================================
// PUBLIC API
// ============================================================================

pub use build::{build_navmesh, load_or_build_navmesh};
pub use distance::DistanceTable;
pub use edges::{edge_admissible, Edge};
pub use mesh::NavMesh;
pub use nearest_grid::NearestGrid;
pub use persistence::{load_navmesh, load_navmesh_file, save_navmesh, save_navmesh_file};
pub use sampler::wall_clearance;
pub use systems::LoadArena;
pub use types::{
    ArenaDescription, NavmeshError, NodeId, MAX_NODES, MIN_NODES, NEAREST_GRID_COLS,
    NEAREST_GRID_ROWS, OCCUPANCY_COLS, OCCUPANCY_ROWS,
};
pub use visibility::OccupancyGrid;

use bevy::prelude::*;

/// Builds or loads the [`NavMesh`] resource on [`LoadArena`] requests.
pub struct NavmeshPlugin;

impl Plugin for NavmeshPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<LoadArena>()
            .add_systems(PreUpdate, systems::handle_load_arena);
    }
}
