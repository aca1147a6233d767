use bevy::prelude::*;

use super::controller::AgentController;
use crate::game::debug::DebugCanvas;
use crate::game::navmesh::NavMesh;

const STEER_COLOR: Color = Color::srgb(1.0, 0.9, 0.2);
const DESTINATION_COLOR: Color = Color::srgb(0.3, 1.0, 0.4);

/// Line from each agent to its steer target and a marker on its destination.
pub fn draw_agents(controller: &AgentController, mesh: &NavMesh, canvas: &mut impl DebugCanvas, marker_radius: f32) {
    let bounds = mesh.bounds();
    for (_, agent) in controller.agents() {
        if let Some(target) = agent.steer_target {
            let path = bounds.shortest_path(agent.last_position, mesh.position(target));
            for piece in path.segments() {
                canvas.line(piece.start, piece.end, STEER_COLOR);
            }
        }
        if let Some(destination) = agent.plan.destination {
            canvas.circle(mesh.position(destination), marker_radius * 2.0, DESTINATION_COLOR);
        }
    }
}
