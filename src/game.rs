use bevy::prelude::*;

pub mod agent;
pub mod arena;
pub mod collections;
pub mod config;
pub mod debug;
pub mod math;
pub mod navmesh;

use agent::AgentPlugin;
use config::NavConfigPlugin;
use navmesh::NavmeshPlugin;

/// Config, navmesh loading and AI pilots. Runs headless; add
/// [`debug::NavDebugPlugin`] on top for gizmo overlays.
pub struct TorusNavPlugin;

impl Plugin for TorusNavPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(NavConfigPlugin::default())
            .add_plugins(NavmeshPlugin)
            .add_plugins(AgentPlugin);
    }
}
