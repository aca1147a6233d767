//! Tactical state machine.
//!
//! [`think`] maps the previous [`Plan`] and the current situation to the next
//! plan. It has no side effects apart from drawing from the RNG, so every
//! transition can be exercised directly.

use bevy::prelude::*;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::personality::AgentPersonality;
use super::snapshot::{ArenaSnapshot, PlatformSnapshot, ShipSnapshot, Standings};
use super::types::{AgentState, Plan};
use crate::game::navmesh::NavMesh;

/// Everything a think step may look at.
pub struct ThinkContext<'a> {
    pub me: Entity,
    pub position: Vec2,
    pub personality: &'a AgentPersonality,
    pub mesh: &'a NavMesh,
    pub snapshot: &'a ArenaSnapshot,
    pub standings: &'a Standings,
}

impl ThinkContext<'_> {
    fn platform_plan(&self, state: AgentState, platform: &PlatformSnapshot, leader: Option<Entity>) -> Plan {
        Plan {
            state,
            destination: Some(self.mesh.nearest_navpoint(platform.position)),
            platform: Some(platform.entity),
            leader,
        }
    }

    fn travel_distance(&self, to: Vec2) -> f32 {
        self.mesh.navmesh_distance(self.position, to)
    }
}

/// Next plan for an agent.
///
/// An agent holding as many platforms as anyone captures until it holds its
/// target fraction and defends after that; everyone else attacks the leader.
/// A plan in the wanted state is kept while it still makes sense.
pub fn think(prev: &Plan, ctx: &ThinkContext, rng: &mut impl Rng) -> Plan {
    let me = ctx.me;
    let wanted = if ctx.standings.is_leading(me) {
        if ctx.standings.fraction(me) < ctx.personality.target_hold_fraction {
            AgentState::Capture
        } else {
            AgentState::Defend
        }
    } else {
        AgentState::Attack
    };

    if prev.state != wanted {
        return enter(wanted, ctx, rng);
    }

    match wanted {
        AgentState::Capture => match prev.platform.and_then(|p| ctx.snapshot.platform(p)) {
            Some(platform) if platform.owner == Some(me) => enter(AgentState::Defend, ctx, rng),
            Some(platform) if platform.owner.is_none() => *prev,
            _ => enter(AgentState::Capture, ctx, rng),
        },
        AgentState::Defend => match prev.platform.and_then(|p| ctx.snapshot.platform(p)) {
            Some(platform)
                if platform.owner == Some(me)
                    && ctx.mesh.bounds().distance(ctx.position, platform.position)
                        > ctx.personality.patrol_radius =>
            {
                *prev
            }
            _ => enter(AgentState::Defend, ctx, rng),
        },
        AgentState::Attack => {
            let leader = attack_leader(ctx);
            match prev.platform.and_then(|p| ctx.snapshot.platform(p)) {
                Some(platform)
                    if prev.leader == leader
                        && platform.owner.is_some_and(|owner| owner != me) =>
                {
                    *prev
                }
                _ => enter(AgentState::Attack, ctx, rng),
            }
        }
    }
}

fn enter(state: AgentState, ctx: &ThinkContext, rng: &mut impl Rng) -> Plan {
    match state {
        AgentState::Capture => enter_capture(ctx, rng),
        AgentState::Defend => enter_defend(ctx, rng),
        AgentState::Attack => enter_attack(ctx, rng),
    }
}

/// Nearest reachable free platform.
fn enter_capture(ctx: &ThinkContext, rng: &mut impl Rng) -> Plan {
    let nearest = ctx
        .snapshot
        .platforms()
        .iter()
        .filter(|p| p.owner.is_none())
        .map(|p| (p, ctx.travel_distance(p.position)))
        .filter(|(_, d)| d.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match nearest {
        Some((platform, _)) => ctx.platform_plan(AgentState::Capture, platform, None),
        None => enter_attack(ctx, rng),
    }
}

/// Threatened platform the agent can reach in time, else any owned platform.
fn enter_defend(ctx: &ThinkContext, rng: &mut impl Rng) -> Plan {
    let owned: Vec<&PlatformSnapshot> = ctx
        .snapshot
        .platforms()
        .iter()
        .filter(|p| p.owner == Some(ctx.me))
        .collect();

    let speed = ctx.personality.assumed_speed.max(f32::EPSILON);
    let urgent = owned
        .iter()
        .filter_map(|p| p.time_to_neutral.map(|t| (*p, t)))
        .filter(|(p, t)| ctx.travel_distance(p.position) / speed < *t)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((platform, _)) = urgent {
        return ctx.platform_plan(AgentState::Defend, platform, None);
    }

    match owned.choose(rng) {
        Some(platform) => ctx.platform_plan(AgentState::Defend, platform, None),
        None => enter_attack(ctx, rng),
    }
}

/// Who an attack is aimed at: the leader, unless that is this agent.
fn attack_leader(ctx: &ThinkContext) -> Option<Entity> {
    ctx.standings.leader().filter(|&leader| leader != ctx.me)
}

/// Leader platform closest to falling, else a random one, else a ship to chase.
fn enter_attack(ctx: &ThinkContext, rng: &mut impl Rng) -> Plan {
    let leader = attack_leader(ctx);
    let targets: Vec<&PlatformSnapshot> = ctx
        .snapshot
        .platforms()
        .iter()
        .filter(|p| match (leader, p.owner) {
            (Some(leader), Some(owner)) => owner == leader,
            (None, Some(owner)) => owner != ctx.me,
            (_, None) => false,
        })
        .collect();

    let soonest = targets
        .iter()
        .filter_map(|p| p.time_to_neutral.map(|t| (*p, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(p, _)| p);

    if let Some(platform) = soonest.or_else(|| targets.choose(rng).copied()) {
        return ctx.platform_plan(AgentState::Attack, platform, leader);
    }

    let prey = hunt_target(ctx, leader);
    Plan {
        state: AgentState::Attack,
        destination: prey.map(|ship| ctx.mesh.nearest_navpoint(ship.position)),
        platform: None,
        leader: prey.map(|ship| ship.entity),
    }
}

/// The leader's ship when it is flying, else the closest other ship.
fn hunt_target<'a>(ctx: &ThinkContext<'a>, leader: Option<Entity>) -> Option<&'a ShipSnapshot> {
    if let Some(ship) = leader.and_then(|l| ctx.snapshot.ship(l)) {
        return Some(ship);
    }
    let bounds = ctx.mesh.bounds();
    ctx.snapshot
        .ships()
        .iter()
        .filter(|s| s.entity != ctx.me)
        .min_by(|a, b| {
            bounds
                .distance_squared(ctx.position, a.position)
                .total_cmp(&bounds.distance_squared(ctx.position, b.position))
        })
}
