use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::agent::AgentPersonality;

pub const NAV_CONFIG_PATH: &str = "assets/nav_config.ron";

/// Static navigation configuration loaded once at startup. A navmesh built
/// under one set of values is only valid for those values, so nothing here is
/// hot-reloaded.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, Default)]
#[serde(default)]
pub struct NavConfig {
    pub navmesh: NavmeshConfig,
    pub agents: AgentConfig,
    pub personalities: Vec<AgentPersonality>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavmeshConfig {
    pub min_wall_clearance: f32,
    pub min_separation: f32,
    pub max_consecutive_misses: u32,
    pub max_edge_length: f32,
    pub probes_per_cell: usize,
    /// Fixed RNG seed for reproducible bakes. `None` seeds from entropy.
    pub seed: Option<u64>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub think_hz: f32,
    pub steer_hz: f32,
    pub pool_capacity: usize,
    pub steer_target_timeout_secs: f32,
    /// Upper bound on next-hop advances in one steer step.
    pub max_hops_per_steer: usize,
    pub seed: Option<u64>,
}

/// Debug overlay settings. Hot-reloadable.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
pub struct NavDebugConfig {
    pub key_toggle_graph: KeyCode,
    pub key_toggle_occupancy: KeyCode,
    pub key_toggle_agents: KeyCode,
    /// Only nodes within this distance of the arena centre are drawn. Zero draws everything.
    pub view_radius: f32,
    pub node_radius: f32,
}

#[derive(Resource)]
pub struct NavDebugConfigHandle(pub Handle<NavDebugConfig>);

impl Default for NavmeshConfig {
    fn default() -> Self {
        Self {
            min_wall_clearance: 12.0,
            min_separation: 28.0,
            max_consecutive_misses: 1200,
            max_edge_length: 96.0,
            probes_per_cell: 24,
            seed: None,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            think_hz: 5.0,
            steer_hz: 30.0,
            pool_capacity: 32,
            steer_target_timeout_secs: 1.0,
            max_hops_per_steer: 8,
            seed: None,
        }
    }
}

impl Default for NavDebugConfig {
    fn default() -> Self {
        Self {
            key_toggle_graph: KeyCode::F1,
            key_toggle_occupancy: KeyCode::F2,
            key_toggle_agents: KeyCode::F3,
            view_radius: 0.0,
            node_radius: 3.0,
        }
    }
}

impl NavmeshConfig {
    pub fn rng(&self) -> StdRng {
        rng_from_seed(self.seed)
    }
}

impl AgentConfig {
    pub fn rng(&self) -> StdRng {
        rng_from_seed(self.seed)
    }
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

impl NavConfig {
    /// Read `path`, logging and falling back to defaults on any failure.
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match ron::from_str::<NavConfig>(&contents) {
                Ok(config) => {
                    info!("Loaded nav config from {}", path);
                    config
                }
                Err(e) => {
                    error!("Failed to parse nav config: {}", e);
                    error!("Using default NavConfig");
                    NavConfig::default()
                }
            },
            Err(e) => {
                error!("Failed to read {}: {}", path, e);
                error!("Using default NavConfig");
                NavConfig::default()
            }
        }
    }
}

/// Inserts [`NavConfig`] while the app is being built, so later plugins can read it.
pub struct NavConfigPlugin {
    pub path: String,
}

impl Default for NavConfigPlugin {
    fn default() -> Self {
        Self { path: NAV_CONFIG_PATH.to_string() }
    }
}

impl Plugin for NavConfigPlugin {
    fn build(&self, app: &mut App) {
        if app.world().contains_resource::<NavConfig>() {
            return;
        }
        app.insert_resource(NavConfig::load_or_default(&self.path));
    }
}

/// Registers the hot-reloadable [`NavDebugConfig`] asset. Needs `AssetPlugin`.
pub struct NavDebugConfigPlugin;

impl Plugin for NavDebugConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<NavDebugConfig>::new(&["nav_debug.ron"]))
            .add_systems(Startup, setup_debug_config)
            .add_systems(Update, log_debug_config_reloads);
    }
}

fn setup_debug_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("nav_debug.ron");
    commands.insert_resource(NavDebugConfigHandle(handle));
}

fn log_debug_config_reloads(mut events: MessageReader<AssetEvent<NavDebugConfig>>) {
    for event in events.read() {
        match event {
            AssetEvent::LoadedWithDependencies { .. } => info!("[NAVMESH] Debug config loaded"),
            AssetEvent::Modified { .. } => info!("[NAVMESH] Debug config reloaded"),
            _ => {}
        }
    }
}
