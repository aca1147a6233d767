use bevy::prelude::*;
use thiserror::Error;

use super::personality::PersonalityId;
use crate::game::navmesh::NodeId;

// ============================================================================
// Components
// ============================================================================

/// Ship motion state, written by the physics layer.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipKinematics {
    pub position: Vec2,
    /// Radians, counter-clockwise from +x.
    pub heading: f32,
    pub velocity: Vec2,
}

/// Capturable platform, written by the capture rules.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub position: Vec2,
    pub owner: Option<Entity>,
    /// Seconds until the current owner loses the platform, when it is contested.
    pub time_to_neutral: Option<f32>,
}

/// Flight and weapon requests, read by physics and combat.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipOrders {
    pub heading: f32,
    pub accelerate: bool,
    pub boost: bool,
    pub shoot: bool,
}

/// Places a ship under AI control while present.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiPilot {
    pub personality: PersonalityId,
}

// ============================================================================
// Agent state
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AgentState {
    #[default]
    Capture,
    Defend,
    Attack,
}

/// Tactical decision produced by a think step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Plan {
    pub state: AgentState,
    /// Node the agent is travelling to.
    pub destination: Option<NodeId>,
    /// Platform being captured, defended or attacked.
    pub platform: Option<Entity>,
    /// Participant being attacked.
    pub leader: Option<Entity>,
}

/// Per-frame output flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFlags {
    pub accelerate: bool,
    pub boost: bool,
    pub shoot: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("agent pool exhausted ({capacity} slots)")]
    PoolExhausted { capacity: usize },

    #[error("entity {0:?} is already AI controlled")]
    AlreadyControlled(Entity),

    #[error("unknown personality {0:?}")]
    UnknownPersonality(PersonalityId),
}
