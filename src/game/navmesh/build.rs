//! Offline navmesh construction.

use bevy::prelude::*;
use std::path::Path;
use std::time::Instant;
use torusnav_macros::profile;

use super::distance::{adjacency, floyd_warshall};
use super::edges::build_edges;
use super::mesh::NavMesh;
use super::nearest_grid::NearestGrid;
use super::persistence::{load_navmesh_file, save_navmesh_file};
use super::sampler::{sample_navpoints, wall_clearance};
use super::types::{check_node_count, ArenaDescription, NavmeshError};
use super::visibility::OccupancyGrid;
use crate::game::arena::ArenaBounds;
use crate::game::config::NavmeshConfig;
use crate::game::math::Segment;

/// Sample nodes, connect them, and precompute every runtime lookup table.
#[profile(20)]
pub fn build_navmesh(
    walls: &[Segment],
    seeds: &[Vec2],
    bounds: ArenaBounds,
    config: &NavmeshConfig,
) -> Result<NavMesh, NavmeshError> {
    if !bounds.is_valid() {
        return Err(NavmeshError::DegenerateArena {
            width: bounds.width(),
            height: bounds.height(),
        });
    }

    let mut rng = config.rng();
    let started = Instant::now();

    let positions = sample_navpoints(&bounds, walls, seeds, config, &mut rng);
    check_node_count(positions.len())?;
    info!(
        "[NAVMESH] Sampled {} navpoints ({} seeds) in {:?}",
        positions.len(),
        seeds.len(),
        started.elapsed()
    );

    let clearance: Vec<f32> = positions
        .iter()
        .map(|&p| wall_clearance(&bounds, walls, p))
        .collect();

    let phase = Instant::now();
    let edges = build_edges(&bounds, walls, &positions, config);
    info!("[NAVMESH] Accepted {} edges in {:?}", edges.len(), phase.elapsed());

    let phase = Instant::now();
    let (neighbors, mut distances) = adjacency(positions.len(), &edges);
    floyd_warshall(&mut distances);
    info!("[NAVMESH] All-pairs distances in {:?}", phase.elapsed());

    let phase = Instant::now();
    let nearest = NearestGrid::build(&bounds, &positions, config.probes_per_cell, &mut rng);
    let occupancy = OccupancyGrid::rasterize(&bounds, walls);
    info!(
        "[NAVMESH] Lookup grids in {:?} ({} solid cells)",
        phase.elapsed(),
        occupancy.solid_count()
    );

    let mesh = NavMesh {
        bounds,
        positions,
        clearance,
        neighbors,
        distances,
        nearest,
        occupancy,
    };

    let components = mesh.connected_components();
    if components > 1 {
        warn!("[NAVMESH] Graph has {} disconnected components", components);
    }
    info!(
        "[NAVMESH] Built navmesh: {} nodes, {} edges in {:?}",
        mesh.node_count(),
        mesh.edge_count(),
        started.elapsed()
    );

    Ok(mesh)
}

impl ArenaDescription {
    pub fn build_navmesh(&self, config: &NavmeshConfig) -> Result<NavMesh, NavmeshError> {
        build_navmesh(&self.walls, &self.seeds, self.bounds(), config)
    }
}

/// Reuse the mesh baked at `path`, or build one and try to write it there.
///
/// A file that exists but cannot be read is an error. Failing to write a fresh
/// bake is only logged.
pub fn load_or_build_navmesh(
    path: &Path,
    arena: &ArenaDescription,
    config: &NavmeshConfig,
) -> Result<NavMesh, NavmeshError> {
    if path.exists() {
        let mesh = load_navmesh_file(path, arena.bounds())?;
        info!("[NAVMESH] Loaded cached navmesh from {}", path.display());
        return Ok(mesh);
    }

    let mesh = arena.build_navmesh(config)?;
    match save_navmesh_file(&mesh, path) {
        Ok(()) => info!("[NAVMESH] Cached navmesh to {}", path.display()),
        Err(e) => warn!("[NAVMESH] Failed to cache navmesh to {}: {}", path.display(), e),
    }
    Ok(mesh)
}
