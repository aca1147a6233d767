use bevy::prelude::*;

use super::mesh::NavMesh;
use crate::game::debug::DebugCanvas;

const NODE_COLOR: Color = Color::srgb(0.2, 0.8, 1.0);
const CLEARANCE_COLOR: Color = Color::srgba(0.2, 0.8, 1.0, 0.15);
const EDGE_COLOR: Color = Color::srgba(0.9, 0.9, 0.9, 0.4);
const SOLID_COLOR: Color = Color::srgb(1.0, 0.3, 0.2);

/// Nodes, clearance circles and edges. Edges that wrap are drawn as two pieces.
///
/// With a positive `view_radius` only nodes that close to `view_center` are drawn.
pub fn draw_graph(
    mesh: &NavMesh,
    canvas: &mut impl DebugCanvas,
    view_center: Vec2,
    view_radius: f32,
    node_radius: f32,
) {
    let bounds = mesh.bounds();
    let in_view = |p: Vec2| view_radius <= 0.0 || bounds.distance(view_center, p) <= view_radius;

    for node in mesh.nodes() {
        let pos = mesh.position(node);
        if !in_view(pos) {
            continue;
        }
        canvas.circle(pos, node_radius, NODE_COLOR);
        canvas.circle(pos, mesh.clearance(node), CLEARANCE_COLOR);
    }

    for (a, b) in mesh.edges() {
        let (pa, pb) = (mesh.position(a), mesh.position(b));
        if !in_view(pa) && !in_view(pb) {
            continue;
        }
        for piece in bounds.shortest_path(pa, pb).segments() {
            canvas.line(piece.start, piece.end, EDGE_COLOR);
        }
    }
}

/// Outline every solid occupancy cell.
pub fn draw_occupancy(mesh: &NavMesh, canvas: &mut impl DebugCanvas) {
    let grid = mesh.occupancy();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            if grid.is_solid(col, row) {
                canvas.rect(grid.cell_rect(col, row), SOLID_COLOR);
            }
        }
    }
}
