//! Rejection sampling of navpoints.

use bevy::prelude::*;
use rand::Rng;

use super::types::MAX_NODES;
use crate::game::arena::ArenaBounds;
use crate::game::config::NavmeshConfig;
use crate::game::math::Segment;

/// Toroidal distance from `point` to the nearest wall, capped at the larger
/// arena dimension so wall-free arenas still report a finite value.
pub fn wall_clearance(bounds: &ArenaBounds, walls: &[Segment], point: Vec2) -> f32 {
    let cap = bounds.width().max(bounds.height());
    walls
        .iter()
        .map(|wall| bounds.distance_to_segment(point, wall))
        .fold(cap, f32::min)
}

/// Draw navpoints until `max_consecutive_misses` draws in a row are rejected.
///
/// Seeds are inserted first and never rejected. The result never holds more
/// than `MAX_NODES - 1` points, which keeps every bake loadable.
pub(super) fn sample_navpoints(
    bounds: &ArenaBounds,
    walls: &[Segment],
    seeds: &[Vec2],
    config: &NavmeshConfig,
    rng: &mut impl Rng,
) -> Vec<Vec2> {
    let cap = MAX_NODES - 1;
    if seeds.len() > cap {
        warn!("[NAVMESH] {} seed points exceed the node cap, keeping {}", seeds.len(), cap);
    }
    let mut points: Vec<Vec2> = seeds.iter().take(cap).map(|&s| bounds.wrap(s)).collect();

    let min_sep_sq = config.min_separation * config.min_separation;
    let mut misses = 0u32;
    let mut draws = 0u64;

    while misses < config.max_consecutive_misses && points.len() < cap {
        draws += 1;
        let candidate = Vec2::new(
            rng.random_range(0.0..bounds.width()),
            rng.random_range(0.0..bounds.height()),
        );

        let clear = wall_clearance(bounds, walls, candidate) >= config.min_wall_clearance;
        let spaced = clear
            && points
                .iter()
                .all(|&p| bounds.distance_squared(p, candidate) >= min_sep_sq);

        if spaced {
            points.push(candidate);
            misses = 0;
        } else {
            misses += 1;
        }
    }

    if points.len() >= cap {
        warn!("[NAVMESH] Sampler hit the {} node cap after {} draws", cap, draws);
    } else {
        debug!("[NAVMESH] Sampler accepted {} points in {} draws", points.len(), draws);
    }

    points
}
