use bevy::prelude::*;
use std::path::PathBuf;

use super::build::load_or_build_navmesh;
use super::types::ArenaDescription;
use crate::game::config::{NavConfig, NavmeshConfig};

/// Request to (re)build the navmesh for a new arena.
///
/// With a `cache_path` a previously baked file is reused when present and a
/// fresh bake is written there otherwise.
#[derive(Message, Debug, Clone)]
pub struct LoadArena {
    pub arena: ArenaDescription,
    pub cache_path: Option<PathBuf>,
}

/// Replace the [`NavMesh`](super::NavMesh) resource for the latest request of the frame.
/// A mesh that cannot be produced is fatal for the level, so the app exits with an error.
pub(super) fn handle_load_arena(
    mut commands: Commands,
    mut requests: MessageReader<LoadArena>,
    config: Option<Res<NavConfig>>,
    mut exit: MessageWriter<AppExit>,
) {
    let Some(request) = requests.read().last() else {
        return;
    };

    let fallback = NavmeshConfig::default();
    let navmesh_config = config.as_ref().map(|c| &c.navmesh).unwrap_or(&fallback);

    let result = match &request.cache_path {
        Some(path) => load_or_build_navmesh(path, &request.arena, navmesh_config),
        None => request.arena.build_navmesh(navmesh_config),
    };

    match result {
        Ok(mesh) => {
            info!(
                "[NAVMESH] Navmesh ready for {}x{} arena",
                request.arena.width, request.arena.height
            );
            commands.insert_resource(mesh);
        }
        Err(e) => {
            error!("[NAVMESH] Failed to prepare navmesh: {}", e);
            exit.write(AppExit::error());
        }
    }
}
