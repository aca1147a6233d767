//! Debug overlays for the navmesh and agents.

use bevy::prelude::*;

use super::agent::{debug::draw_agents, AgentController};
use super::config::{NavDebugConfig, NavDebugConfigHandle, NavDebugConfigPlugin};
use super::navmesh::{debug as navmesh_debug, NavMesh};

/// Drawing surface for overlays. Implemented for [`Gizmos`]; tests record calls instead.
pub trait DebugCanvas {
    fn line(&mut self, from: Vec2, to: Vec2, color: Color);
    fn circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn rect(&mut self, rect: Rect, color: Color);
}

impl DebugCanvas for Gizmos<'_, '_> {
    fn line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.line_2d(from, to, color);
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.circle_2d(Isometry2d::from_translation(center), radius, color);
    }

    fn rect(&mut self, rect: Rect, color: Color) {
        self.rect_2d(Isometry2d::from_translation(rect.center()), rect.size(), color);
    }
}

/// Which overlays are on.
#[derive(Resource, Debug, Clone, Default)]
pub struct NavDebugState {
    pub show_graph: bool,
    pub show_occupancy: bool,
    pub show_agents: bool,
}

/// Gizmo overlays toggled from the keys in [`NavDebugConfig`]. Needs `DefaultPlugins`.
pub struct NavDebugPlugin;

impl Plugin for NavDebugPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(NavDebugConfigPlugin)
            .init_resource::<NavDebugState>()
            .add_systems(Update, (toggle_overlays, draw_overlays).chain());
    }
}

fn toggle_overlays(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    config_handle: Option<Res<NavDebugConfigHandle>>,
    configs: Res<Assets<NavDebugConfig>>,
    mut state: ResMut<NavDebugState>,
) {
    let Some(keys) = keys else { return };
    let fallback = NavDebugConfig::default();
    let config = config_handle
        .and_then(|handle| configs.get(&handle.0))
        .unwrap_or(&fallback);

    if keys.just_pressed(config.key_toggle_graph) {
        state.show_graph = !state.show_graph;
        info!("[NAVMESH] Graph overlay: {}", state.show_graph);
    }
    if keys.just_pressed(config.key_toggle_occupancy) {
        state.show_occupancy = !state.show_occupancy;
        info!("[NAVMESH] Occupancy overlay: {}", state.show_occupancy);
    }
    if keys.just_pressed(config.key_toggle_agents) {
        state.show_agents = !state.show_agents;
        info!("[AGENTS] Agent overlay: {}", state.show_agents);
    }
}

fn draw_overlays(
    state: Res<NavDebugState>,
    mesh: Option<Res<NavMesh>>,
    controller: Option<Res<AgentController>>,
    config_handle: Option<Res<NavDebugConfigHandle>>,
    configs: Res<Assets<NavDebugConfig>>,
    mut gizmos: Gizmos,
) {
    let Some(mesh) = mesh else { return };
    let fallback = NavDebugConfig::default();
    let config = config_handle
        .and_then(|handle| configs.get(&handle.0))
        .unwrap_or(&fallback);

    if state.show_graph {
        let center = mesh.bounds().size() * 0.5;
        navmesh_debug::draw_graph(&mesh, &mut gizmos, center, config.view_radius, config.node_radius);
    }
    if state.show_occupancy {
        navmesh_debug::draw_occupancy(&mesh, &mut gizmos);
    }
    if state.show_agents {
        if let Some(controller) = controller {
            draw_agents(&controller, &mesh, &mut gizmos, config.node_radius);
        }
    }
}
