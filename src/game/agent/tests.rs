use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f32::consts::{FRAC_PI_2, PI};
use std::time::Duration;

use super::*;
use crate::game::arena::ArenaBounds;
use crate::game::config::{AgentConfig, NavmeshConfig};
use crate::game::debug::tests::RecordingCanvas;
use crate::game::math::Segment;
use crate::game::navmesh::{build_navmesh, NavMesh, NodeId};

const PLATFORMS: [Vec2; 3] = [
    Vec2::new(60.0, 60.0),
    Vec2::new(420.0, 60.0),
    Vec2::new(240.0, 260.0),
];

fn mesh_config() -> NavmeshConfig {
    NavmeshConfig {
        min_wall_clearance: 10.0,
        min_separation: 40.0,
        max_consecutive_misses: 300,
        max_edge_length: 120.0,
        probes_per_cell: 8,
        seed: Some(3),
    }
}

fn open_mesh() -> NavMesh {
    build_navmesh(&[], &PLATFORMS, ArenaBounds::new(480.0, 320.0), &mesh_config()).unwrap()
}

fn walled_mesh() -> NavMesh {
    let wall = Segment::new(Vec2::new(240.0, 40.0), Vec2::new(240.0, 280.0));
    build_navmesh(&[wall], &PLATFORMS[..2], ArenaBounds::new(480.0, 320.0), &mesh_config()).unwrap()
}

fn entity(n: u64) -> Entity {
    Entity::from_bits(n)
}

fn ship(n: u64, position: Vec2, heading: f32, velocity: Vec2) -> ShipSnapshot {
    ShipSnapshot {
        entity: entity(n),
        position,
        heading,
        velocity,
    }
}

/// Platform entities are 100, 101, 102 for PLATFORMS[0..3].
fn platforms(owners: [Option<u64>; 3], ttn: [Option<f32>; 3]) -> Vec<PlatformSnapshot> {
    (0..3)
        .map(|i| PlatformSnapshot {
            entity: entity(100 + i as u64),
            position: PLATFORMS[i],
            owner: owners[i].map(entity),
            time_to_neutral: ttn[i],
        })
        .collect()
}

fn think_once(
    prev: &Plan,
    me: u64,
    position: Vec2,
    personality: &AgentPersonality,
    mesh: &NavMesh,
    snapshot: &ArenaSnapshot,
) -> Plan {
    let standings = Standings::from_snapshot(snapshot);
    let ctx = ThinkContext {
        me: entity(me),
        position,
        personality,
        mesh,
        snapshot,
        standings: &standings,
    };
    think(prev, &ctx, &mut StdRng::seed_from_u64(9))
}

#[derive(Default)]
struct RecordingControl {
    headings: Vec<(Entity, SteerCommand)>,
    shots: Vec<Entity>,
}

impl ShipControl for RecordingControl {
    fn request_heading(&mut self, entity: Entity, command: SteerCommand) {
        self.headings.push((entity, command));
    }

    fn request_shoot(&mut self, entity: Entity) {
        self.shots.push(entity);
    }
}

// ============================================================================
// Pool
// ============================================================================

#[test]
fn test_pool_spawn_and_release() {
    let mut pool = AgentPool::with_capacity(2);
    let a = pool.spawn(entity(1), PersonalityId(0)).unwrap();
    let b = pool.spawn(entity(2), PersonalityId(0)).unwrap();
    assert_eq!(pool.live_count(), 2);
    assert_eq!(pool.get(a).map(|agent| agent.entity), Some(entity(1)));

    assert_eq!(
        pool.spawn(entity(3), PersonalityId(0)),
        Err(AgentError::PoolExhausted { capacity: 2 })
    );
    assert_eq!(
        pool.spawn(entity(2), PersonalityId(0)),
        Err(AgentError::AlreadyControlled(entity(2)))
    );

    assert!(pool.despawn(entity(1)).is_some());
    assert!(pool.despawn(entity(1)).is_none());
    assert!(pool.get(a).is_none(), "stale handle must not resolve");

    // The freed slot is reused under a new generation
    let c = pool.spawn(entity(3), PersonalityId(0)).unwrap();
    assert_eq!(c.slot(), a.slot());
    assert_ne!(c, a);
    assert_eq!(pool.get(c).map(|agent| agent.entity), Some(entity(3)));
    assert_eq!(pool.get(b).map(|agent| agent.entity), Some(entity(2)));

    let order: Vec<Entity> = pool.iter().map(|(_, agent)| agent.entity).collect();
    assert_eq!(order, vec![entity(3), entity(2)]);
}

#[test]
fn test_controller_rejects_unknown_personality() {
    let mut controller = AgentController::new(AgentConfig::default(), PersonalityTable::default());
    assert_eq!(
        controller.spawn_agent(entity(1), PersonalityId(99)),
        Err(AgentError::UnknownPersonality(PersonalityId(99)))
    );
    assert_eq!(controller.live_count(), 0);

    let handle = controller.spawn_agent(entity(1), PersonalityId(2)).unwrap();
    assert_eq!(controller.agent(handle).map(|a| a.personality), Some(PersonalityId(2)));
    assert!(controller.despawn_agent(entity(1)));
    assert!(controller.agent_for(entity(1)).is_none());
    assert!(controller.agent(handle).is_none());
}

#[test]
fn test_personality_table_lookup() {
    let table = PersonalityTable::default();
    assert_eq!(table.len(), 3);
    assert_eq!(table.id_of("turtle"), Some(PersonalityId(2)));
    assert!(table.get(PersonalityId(3)).is_none());
    assert_eq!(PersonalityTable::new(Vec::new()), table);
}

// ============================================================================
// Standings and FSM
// ============================================================================

#[test]
fn test_standings_pick_lowest_entity_on_tie() {
    let snapshot = ArenaSnapshot::new(Vec::new(), platforms([Some(7), Some(5), None], [None; 3]));
    let standings = Standings::from_snapshot(&snapshot);
    assert_eq!(standings.leader(), Some(entity(5)));
    assert!(standings.is_leading(entity(7)));
    assert!(!standings.is_leading(entity(1)));
    assert!((standings.fraction(entity(7)) - 1.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_trailing_agent_attacks_leader_platform() {
    let mesh = open_mesh();
    let snapshot = ArenaSnapshot::new(
        vec![
            ship(1, Vec2::new(100.0, 200.0), 0.0, Vec2::ZERO),
            ship(2, Vec2::new(300.0, 100.0), 0.0, Vec2::ZERO),
        ],
        platforms([Some(2), Some(2), None], [None; 3]),
    );

    let plan = think_once(&Plan::default(), 1, Vec2::new(100.0, 200.0), &AgentPersonality::balanced(), &mesh, &snapshot);

    assert_eq!(plan.state, AgentState::Attack);
    assert_eq!(plan.leader, Some(entity(2)));
    let platform = plan.platform.and_then(|p| snapshot.platform(p)).expect("attack target");
    assert_eq!(platform.owner, Some(entity(2)));
    assert_eq!(plan.destination, Some(mesh.nearest_navpoint(platform.position)));
}

#[test]
fn test_attack_prefers_platform_closest_to_falling() {
    let mesh = open_mesh();
    let snapshot = ArenaSnapshot::new(
        Vec::new(),
        platforms([Some(2), Some(2), None], [Some(8.0), Some(3.0), None]),
    );
    let plan = think_once(&Plan::default(), 1, Vec2::new(100.0, 200.0), &AgentPersonality::balanced(), &mesh, &snapshot);
    assert_eq!(plan.platform, Some(entity(101)));
    assert_eq!(plan.destination, Some(NodeId(1)));
}

#[test]
fn test_leading_agent_captures_nearest_free_platform() {
    let mesh = open_mesh();
    let snapshot = ArenaSnapshot::new(Vec::new(), platforms([None, None, None], [None; 3]));

    let plan = think_once(&Plan::default(), 1, Vec2::new(230.0, 240.0), &AgentPersonality::balanced(), &mesh, &snapshot);

    assert_eq!(plan.state, AgentState::Capture);
    assert_eq!(plan.platform, Some(entity(102)));
    assert_eq!(plan.destination, Some(NodeId(2)));
}

#[test]
fn test_capture_turns_to_defend_once_owned() {
    let mesh = open_mesh();
    let personality = AgentPersonality {
        target_hold_fraction: 1.0,
        ..AgentPersonality::balanced()
    };
    let prev = Plan {
        state: AgentState::Capture,
        destination: Some(NodeId(2)),
        platform: Some(entity(102)),
        leader: None,
    };

    // Still free: the plan is kept
    let free = ArenaSnapshot::new(Vec::new(), platforms([None, None, None], [None; 3]));
    assert_eq!(think_once(&prev, 1, Vec2::new(100.0, 200.0), &personality, &mesh, &free), prev);

    // Now ours: defend
    let owned = ArenaSnapshot::new(Vec::new(), platforms([None, None, Some(1)], [None; 3]));
    let plan = think_once(&prev, 1, Vec2::new(100.0, 200.0), &personality, &mesh, &owned);
    assert_eq!(plan.state, AgentState::Defend);
    assert_eq!(plan.platform, Some(entity(102)));
}

#[test]
fn test_defend_goes_to_threatened_platform_in_reach() {
    let mesh = open_mesh();
    let personality = AgentPersonality::turtle();
    let me = 1;
    let position = Vec2::new(240.0, 220.0);

    // Holding all three is above any target fraction
    let threatened = ArenaSnapshot::new(
        Vec::new(),
        platforms([Some(me), Some(me), Some(me)], [Some(0.1), None, Some(30.0)]),
    );
    let plan = think_once(&Plan::default(), me, position, &personality, &mesh, &threatened);
    assert_eq!(plan.state, AgentState::Defend);
    // Platform 0 falls sooner but cannot be reached in 0.1 s
    assert_eq!(plan.platform, Some(entity(102)));
}

#[test]
fn test_defender_repicks_when_at_patrol_point() {
    let mesh = open_mesh();
    let personality = AgentPersonality::turtle();
    let snapshot = ArenaSnapshot::new(Vec::new(), platforms([Some(1), Some(1), Some(1)], [None; 3]));
    let prev = Plan {
        state: AgentState::Defend,
        destination: Some(NodeId(2)),
        platform: Some(entity(102)),
        leader: None,
    };

    let far = think_once(&prev, 1, Vec2::new(60.0, 200.0), &personality, &mesh, &snapshot);
    assert_eq!(far, prev);

    let plan = think_once(&prev, 1, PLATFORMS[2], &personality, &mesh, &snapshot);
    assert_eq!(plan.state, AgentState::Defend);
    assert!(plan.platform.is_some());
}

#[test]
fn test_attack_without_opponent_platforms_hunts_nearest_ship() {
    let mesh = open_mesh();
    // Everything is ours yet the target fraction is out of reach: nothing to
    // capture, nobody else's platform to attack, so chase the closest ship.
    let personality = AgentPersonality {
        target_hold_fraction: 2.0,
        ..AgentPersonality::balanced()
    };
    let near = Vec2::new(150.0, 120.0);
    let snapshot = ArenaSnapshot::new(
        vec![
            ship(1, Vec2::new(100.0, 100.0), 0.0, Vec2::ZERO),
            ship(2, near, 0.0, Vec2::ZERO),
            ship(3, Vec2::new(330.0, 220.0), 0.0, Vec2::ZERO),
        ],
        platforms([Some(1), Some(1), Some(1)], [None; 3]),
    );

    let plan = think_once(&Plan::default(), 1, Vec2::new(100.0, 100.0), &personality, &mesh, &snapshot);
    assert_eq!(plan.state, AgentState::Attack);
    assert_eq!(plan.platform, None);
    assert_eq!(plan.leader, Some(entity(2)));
    assert_eq!(plan.destination, Some(mesh.nearest_navpoint(near)));
}

#[test]
fn test_nothing_to_do_yields_no_destination() {
    let mesh = open_mesh();
    let snapshot = ArenaSnapshot::new(Vec::new(), platforms([Some(1), Some(1), Some(1)], [None; 3]));
    let personality = AgentPersonality {
        target_hold_fraction: 2.0,
        ..AgentPersonality::balanced()
    };
    let plan = think_once(&Plan::default(), 1, Vec2::new(100.0, 100.0), &personality, &mesh, &snapshot);
    assert_eq!(plan.state, AgentState::Attack);
    assert_eq!(plan.destination, None);
    assert_eq!(plan.leader, None);
}

// ============================================================================
// Steering and shooting
// ============================================================================

#[test]
fn test_no_steer_zone_keeps_heading_and_coasts() {
    let bounds = ArenaBounds::new(480.0, 320.0);
    let personality = AgentPersonality::balanced();
    let moving = ship(1, Vec2::new(100.0, 100.0), 0.3, Vec2::new(20.0, 0.0));
    let ahead = Vec2::new(100.0, 100.0) + Vec2::from_angle(0.3) * 5.0;

    let command = steer_towards(&moving, ahead, &personality, &bounds);
    assert_eq!(command.heading, 0.3);
    assert!(!command.accelerate);
    assert!(!command.boost);

    // Stall prevention still throttles a stationary ship
    let stopped = ShipSnapshot { velocity: Vec2::ZERO, ..moving };
    let command = steer_towards(&stopped, ahead, &personality, &bounds);
    assert_eq!(command.heading, 0.3);
    assert!(command.accelerate);
}

#[test]
fn test_aligned_far_target_boosts() {
    let bounds = ArenaBounds::new(480.0, 320.0);
    let personality = AgentPersonality::balanced();
    let s = ship(1, Vec2::new(100.0, 100.0), 0.0, Vec2::new(20.0, 0.0));

    let command = steer_towards(&s, Vec2::new(300.0, 100.0), &personality, &bounds);
    assert!(command.heading.abs() < 1e-6);
    assert!(command.accelerate);
    assert!(command.boost);

    // Past the coast threshold but short of the boost one
    let command = steer_towards(&s, Vec2::new(150.0, 100.0), &personality, &bounds);
    assert!(command.accelerate);
    assert!(!command.boost);
}

#[test]
fn test_misaligned_target_oversteers_without_throttle() {
    let bounds = ArenaBounds::new(480.0, 320.0);
    let personality = AgentPersonality::balanced();
    let s = ship(1, Vec2::new(100.0, 100.0), 0.0, Vec2::new(20.0, 0.0));

    let command = steer_towards(&s, Vec2::new(100.0, 150.0), &personality, &bounds);
    assert!(!command.accelerate);
    let closeness = 1.0 - 50.0 / personality.oversteer_range;
    let expected = FRAC_PI_2 * (1.0 + personality.oversteer * closeness);
    assert!((command.heading - expected).abs() < 1e-4);
}

#[test]
fn test_steering_follows_wraparound() {
    let bounds = ArenaBounds::new(480.0, 320.0);
    let personality = AgentPersonality::balanced();
    // Target is 40 units to the right through the edge, not 440 to the left
    let s = ship(1, Vec2::new(460.0, 100.0), 0.0, Vec2::new(20.0, 0.0));
    let command = steer_towards(&s, Vec2::new(20.0, 100.0), &personality, &bounds);
    assert!(command.heading.abs() < 1e-6);
    assert!(command.accelerate);
}

#[test]
fn test_shoot_requires_range_and_cone() {
    let bounds = ArenaBounds::new(480.0, 320.0);
    let personality = AgentPersonality::balanced();

    let a = ship(1, Vec2::new(100.0, 100.0), 0.0, Vec2::ZERO);
    let b = ship(2, Vec2::new(200.0, 100.0), PI, Vec2::ZERO);
    let facing = ArenaSnapshot::new(vec![a, b], Vec::new());
    assert!(should_shoot(&a, &facing, &personality, &bounds));
    assert!(should_shoot(&b, &facing, &personality, &bounds));

    let far = ship(2, Vec2::new(100.0 + personality.shoot_range + 1.0, 100.0), PI, Vec2::ZERO);
    let out_of_range = ArenaSnapshot::new(vec![a, far], Vec::new());
    assert!(!should_shoot(&a, &out_of_range, &personality, &bounds));
    assert!(!should_shoot(&far, &out_of_range, &personality, &bounds));

    let beside = ship(2, Vec2::new(100.0, 150.0), 0.0, Vec2::ZERO);
    let off_cone = ArenaSnapshot::new(vec![a, beside], Vec::new());
    assert!(!should_shoot(&a, &off_cone, &personality, &bounds));

    // Across the right edge
    let edge_a = ship(1, Vec2::new(470.0, 100.0), 0.0, Vec2::ZERO);
    let edge_b = ship(2, Vec2::new(20.0, 100.0), 0.0, Vec2::ZERO);
    let wrapped = ArenaSnapshot::new(vec![edge_a, edge_b], Vec::new());
    assert!(should_shoot(&edge_a, &wrapped, &personality, &bounds));
}

fn test_agent(personality: PersonalityId) -> Agent {
    let mut pool = AgentPool::with_capacity(1);
    let handle = pool.spawn(entity(1), personality).unwrap();
    pool.get(handle).cloned().unwrap()
}

#[test]
fn test_steer_target_advances_toward_destination() {
    let mesh = open_mesh();
    let personality = AgentPersonality::balanced();
    let limits = SteerLimits {
        target_timeout: Duration::from_secs(1),
        max_hops: 8,
    };
    let mut agent = test_agent(PersonalityId(0));
    let destination = NodeId(2);
    agent.plan.destination = Some(destination);

    let s = ship(1, PLATFORMS[0], 0.0, Vec2::ZERO);
    steer(&mut agent, &s, &personality, &mesh, &limits, Duration::ZERO);

    let target = agent.steer_target.expect("steer target");
    assert!(mesh.distance(target, destination) < mesh.distance(NodeId(0), destination));
    assert!(mesh.is_visible(s.position, mesh.position(target)));
    assert_eq!(agent.target_seen_at, Some(Duration::ZERO));
}

#[test]
fn test_lost_steer_target_is_reset() {
    let mesh = walled_mesh();
    let limits = SteerLimits {
        target_timeout: Duration::from_secs(1),
        max_hops: 8,
    };
    let position = Vec2::new(200.0, 160.0);
    let s = ship(1, position, 0.0, Vec2::ZERO);
    let hidden = mesh.nearest_navpoint_exact(Vec2::new(300.0, 160.0));
    assert!(!mesh.is_visible(position, mesh.position(hidden)));

    // Not seen for longer than the timeout
    let mut agent = test_agent(PersonalityId(0));
    agent.steer_target = Some(hidden);
    agent.target_seen_at = Some(Duration::ZERO);
    steer(&mut agent, &s, &AgentPersonality::balanced(), &mesh, &limits, Duration::from_secs(5));
    assert_eq!(agent.steer_target, Some(mesh.nearest_navpoint(position)));

    // Seen just now, but farther than the blind limit
    let short_sighted = AgentPersonality {
        max_blind_distance: 20.0,
        ..AgentPersonality::balanced()
    };
    let mut agent = test_agent(PersonalityId(0));
    agent.steer_target = Some(hidden);
    agent.target_seen_at = Some(Duration::from_secs(5));
    steer(&mut agent, &s, &short_sighted, &mesh, &limits, Duration::from_secs(5));
    assert_eq!(agent.steer_target, Some(mesh.nearest_navpoint(position)));

    // Seen just now and within the blind limit: kept
    let patient = AgentPersonality {
        max_blind_distance: 1000.0,
        ..AgentPersonality::balanced()
    };
    let mut agent = test_agent(PersonalityId(0));
    agent.steer_target = Some(hidden);
    agent.target_seen_at = Some(Duration::from_secs(5));
    steer(&mut agent, &s, &patient, &mesh, &limits, Duration::from_secs(5));
    assert_eq!(agent.steer_target, Some(hidden));
}

// ============================================================================
// Controller
// ============================================================================

#[test]
fn test_controller_respects_think_and_steer_rates() {
    let mesh = open_mesh();
    let config = AgentConfig {
        seed: Some(1),
        ..AgentConfig::default()
    };
    let mut controller = AgentController::new(config, PersonalityTable::default());
    let handle = controller.spawn_agent(entity(1), PersonalityId(0)).unwrap();
    controller.spawn_agent(entity(9), PersonalityId(0)).unwrap();

    // Entity 9 has no ship this frame and is skipped
    let snapshot = ArenaSnapshot::new(
        vec![ship(1, Vec2::new(100.0, 100.0), 0.0, Vec2::ZERO)],
        platforms([None, None, None], [None; 3]),
    );
    let mut control = RecordingControl::default();

    controller.update_agents(Duration::ZERO, &mesh, &snapshot, &mut control);
    assert_eq!(control.headings.len(), 1);
    assert_eq!(control.headings[0].0, entity(1));
    let agent = controller.agent(handle).unwrap();
    assert_eq!(agent.last_think, Some(Duration::ZERO));
    assert_eq!(agent.plan.state, AgentState::Capture);
    assert!(agent.plan.destination.is_some());

    controller.update_agents(Duration::from_millis(10), &mesh, &snapshot, &mut control);
    assert_eq!(control.headings.len(), 1);

    controller.update_agents(Duration::from_millis(40), &mesh, &snapshot, &mut control);
    assert_eq!(control.headings.len(), 2);
    assert_eq!(controller.agent(handle).unwrap().last_think, Some(Duration::ZERO));

    controller.update_agents(Duration::from_millis(250), &mesh, &snapshot, &mut control);
    assert_eq!(
        controller.agent(handle).unwrap().last_think,
        Some(Duration::from_millis(250))
    );
    assert!(control.shots.is_empty());
}

#[test]
fn test_controller_shoots_every_frame() {
    let mesh = open_mesh();
    let mut controller = AgentController::new(AgentConfig::default(), PersonalityTable::default());
    controller.spawn_agent(entity(1), PersonalityId(0)).unwrap();

    let snapshot = ArenaSnapshot::new(
        vec![
            ship(1, Vec2::new(100.0, 100.0), 0.0, Vec2::ZERO),
            ship(2, Vec2::new(150.0, 100.0), 0.0, Vec2::ZERO),
        ],
        Vec::new(),
    );
    let mut control = RecordingControl::default();
    for ms in [0, 5, 10] {
        controller.update_agents(Duration::from_millis(ms), &mesh, &snapshot, &mut control);
    }
    assert_eq!(control.shots, vec![entity(1); 3]);
    assert!(controller.agent_for(entity(1)).unwrap().flags.shoot);
}

#[test]
fn test_reset_navigation_clears_plans() {
    let mesh = open_mesh();
    let mut controller = AgentController::new(AgentConfig::default(), PersonalityTable::default());
    controller.spawn_agent(entity(1), PersonalityId(0)).unwrap();
    let snapshot = ArenaSnapshot::new(
        vec![ship(1, Vec2::new(100.0, 100.0), 0.0, Vec2::ZERO)],
        platforms([None, None, None], [None; 3]),
    );
    controller.update_agents(Duration::ZERO, &mesh, &snapshot, &mut RecordingControl::default());
    assert!(controller.agent_for(entity(1)).unwrap().steer_target.is_some());

    controller.reset_navigation();
    let agent = controller.agent_for(entity(1)).unwrap();
    assert_eq!(agent.steer_target, None);
    assert_eq!(agent.plan, Plan::default());
    assert_eq!(agent.last_think, None);
}

#[test]
fn test_debug_draw_marks_agents() {
    let mesh = open_mesh();
    let mut controller = AgentController::new(AgentConfig::default(), PersonalityTable::default());
    controller.spawn_agent(entity(1), PersonalityId(0)).unwrap();
    let snapshot = ArenaSnapshot::new(
        vec![ship(1, Vec2::new(100.0, 100.0), 0.0, Vec2::ZERO)],
        platforms([None, None, None], [None; 3]),
    );
    controller.update_agents(Duration::ZERO, &mesh, &snapshot, &mut RecordingControl::default());

    let mut canvas = RecordingCanvas::default();
    debug::draw_agents(&controller, &mesh, &mut canvas, 3.0);
    assert!(!canvas.lines.is_empty());
    assert_eq!(canvas.circles.len(), 1);
}
