//! AI pilots: a tactical state machine on a slow think timer and a steering
//! loop on a fast one, both reading the [`NavMesh`](crate::game::navmesh::NavMesh).

mod controller;
pub mod debug;
mod fsm;
mod personality;
mod pool;
mod snapshot;
mod steering;
mod systems;
mod types;

#[cfg(test)]
mod tests;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use controller::AgentController;
pub use fsm::{think, ThinkContext};
pub use personality::{AgentPersonality, PersonalityId, PersonalityTable};
pub use pool::{Agent, AgentHandle, AgentPool};
pub use snapshot::{ArenaSnapshot, PlatformSnapshot, ShipSnapshot, Standings};
pub use steering::{should_shoot, steer, steer_towards, ShipControl, SteerCommand, SteerLimits};
pub use systems::OrderBuffer;
pub use types::{
    AgentError, AgentState, AiPilot, FrameFlags, Plan, Platform, ShipKinematics, ShipOrders,
};

use bevy::prelude::*;

use crate::game::config::NavConfig;

/// Runs [`AgentController`] every `Update`. Reads [`NavConfig`] if already inserted.
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<NavConfig>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(AgentController::new(
            config.agents,
            PersonalityTable::new(config.personalities),
        ))
        .add_systems(Update, (systems::sync_pilots, systems::update_agents).chain());
    }
}
