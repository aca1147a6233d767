//! Movement and firing decisions.

use bevy::prelude::*;
use std::time::Duration;

use super::personality::AgentPersonality;
use super::pool::Agent;
use super::snapshot::{ArenaSnapshot, ShipSnapshot};
use crate::game::arena::ArenaBounds;
use crate::game::math::{heading_of, wrap_angle};
use crate::game::navmesh::NavMesh;

/// Heading and throttle request for one ship.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteerCommand {
    pub heading: f32,
    pub accelerate: bool,
    pub boost: bool,
}

/// Outward calls to whatever flies the ships.
pub trait ShipControl {
    fn request_heading(&mut self, entity: Entity, command: SteerCommand);
    fn request_shoot(&mut self, entity: Entity);
}

/// Tunables shared by every agent's steer step.
#[derive(Debug, Clone, Copy)]
pub struct SteerLimits {
    pub target_timeout: Duration,
    pub max_hops: usize,
}

/// Move the steer target along the graph, recover it if lost, and turn it
/// into a flight command.
pub fn steer(
    agent: &mut Agent,
    ship: &ShipSnapshot,
    personality: &AgentPersonality,
    mesh: &NavMesh,
    limits: &SteerLimits,
    now: Duration,
) -> SteerCommand {
    let pos = ship.position;
    let mut target = match agent.steer_target {
        Some(target) => target,
        None => {
            agent.target_seen_at = Some(now);
            mesh.nearest_navpoint(pos)
        }
    };

    if let Some(destination) = agent.plan.destination {
        for _ in 0..limits.max_hops {
            let Some(next) = mesh.next_hop(target, destination) else {
                break;
            };
            if next == target || !mesh.is_visible(pos, mesh.position(next)) {
                break;
            }
            target = next;
            agent.target_seen_at = Some(now);
        }
    }

    let target_pos = mesh.position(target);
    if mesh.is_visible(pos, target_pos) {
        agent.target_seen_at = Some(now);
    } else {
        let too_far = mesh.bounds().distance(pos, target_pos) > personality.max_blind_distance;
        let stale = agent
            .target_seen_at
            .is_none_or(|seen| now.saturating_sub(seen) > limits.target_timeout);
        if too_far || stale {
            target = mesh.nearest_navpoint(pos);
            agent.target_seen_at = Some(now);
        }
    }

    agent.steer_target = Some(target);
    steer_towards(ship, mesh.position(target), personality, mesh.bounds())
}

/// Steering law towards a point.
///
/// Inside `no_steer_distance` the heading is left alone and throttle is off.
/// Further out the heading error is amplified by the oversteer bias, which
/// grows as the target gets closer. Stall prevention overrides throttle.
pub fn steer_towards(
    ship: &ShipSnapshot,
    target: Vec2,
    personality: &AgentPersonality,
    bounds: &ArenaBounds,
) -> SteerCommand {
    let delta = bounds.delta(ship.position, target);
    let distance = delta.length();

    let mut command = SteerCommand {
        heading: ship.heading,
        accelerate: false,
        boost: false,
    };

    if distance > personality.no_steer_distance {
        let error = wrap_angle(heading_of(delta) - ship.heading);
        let closeness = if personality.oversteer_range > 0.0 {
            (1.0 - distance / personality.oversteer_range).clamp(0.0, 1.0)
        } else {
            0.0
        };

        command.heading = wrap_angle(ship.heading + error * (1.0 + personality.oversteer * closeness));
        command.accelerate = error.abs() < personality.steer_tolerance && distance > personality.coast_distance;
        command.boost = command.accelerate && distance > personality.aggressive_distance;
    }

    if ship.velocity.length() < personality.stall_speed {
        command.accelerate = true;
    }

    command
}

/// Some other ship is within range and inside the firing cone.
pub fn should_shoot(
    ship: &ShipSnapshot,
    snapshot: &ArenaSnapshot,
    personality: &AgentPersonality,
    bounds: &ArenaBounds,
) -> bool {
    snapshot.ships().iter().any(|other| {
        if other.entity == ship.entity {
            return false;
        }
        let delta = bounds.delta(ship.position, other.position);
        let distance = delta.length();
        if distance > personality.shoot_range || distance <= f32::EPSILON {
            return false;
        }
        wrap_angle(heading_of(delta) - ship.heading).abs() <= personality.shoot_half_angle
    })
}
