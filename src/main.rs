//! Offline navmesh baker: `torusnav <arena.ron> <out.navmesh>`.

use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use thiserror::Error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use torusnav::game::config::{NavConfig, NAV_CONFIG_PATH};
use torusnav::game::navmesh::{load_navmesh_file, save_navmesh_file, ArenaDescription, NavmeshError};

const LOG_PREFIX: &str = "torusnav";
const KEEP_LOGS: usize = 25;

#[derive(Debug, Error)]
enum BakeError {
    #[error("cannot read arena description: {0}")]
    Read(#[from] std::io::Error),

    #[error("cannot parse arena description: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error(transparent)]
    Navmesh(#[from] NavmeshError),
}

fn setup_file_logging() -> std::io::Result<PathBuf> {
    let log_dir = PathBuf::from("logs");
    fs::create_dir_all(&log_dir)?;

    cleanup_old_logs(&log_dir, KEEP_LOGS);

    let now = chrono::Local::now();
    let log_filename = format!("{}_{}.log", LOG_PREFIX, now.format("%Y%m%d_%H%M%S"));
    let log_path = log_dir.join(&log_filename);

    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);
    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("torusnav=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_path)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|s| s.starts_with(LOG_PREFIX) && s.ends_with(".log"))
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            let _ = fs::remove_file(file.path());
        }
    }
}

fn bake(arena_path: &Path, out_path: &Path) -> Result<(), BakeError> {
    let config = NavConfig::load_or_default(NAV_CONFIG_PATH);
    let arena: ArenaDescription = ron::from_str(&fs::read_to_string(arena_path)?)?;
    info!(
        "[NAVMESH] Baking {} ({}x{}, {} walls, {} seeds)",
        arena_path.display(),
        arena.width,
        arena.height,
        arena.walls.len(),
        arena.seeds.len()
    );

    let started = Instant::now();
    let mesh = arena.build_navmesh(&config.navmesh)?;
    save_navmesh_file(&mesh, out_path)?;

    let reloaded = load_navmesh_file(out_path, arena.bounds())?;
    if reloaded != mesh {
        warn!("[NAVMESH] {} does not reload to the mesh that was written", out_path.display());
    }

    let bytes = fs::metadata(out_path).map(|m| m.len()).unwrap_or(0);
    info!(
        "[NAVMESH] Wrote {} in {:?}: {} nodes, {} edges, {} component(s), {} solid cells, {} bytes",
        out_path.display(),
        started.elapsed(),
        mesh.node_count(),
        mesh.edge_count(),
        mesh.connected_components(),
        mesh.occupancy().solid_count(),
        bytes
    );
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: {} <arena.ron> <out.navmesh>", LOG_PREFIX);
        return ExitCode::from(2);
    }

    match setup_file_logging() {
        Ok(log_file) => println!("Logging to {}", log_file.display()),
        Err(e) => eprintln!("File logging disabled: {}", e),
    }

    match bake(Path::new(&args[1]), Path::new(&args[2])) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("[NAVMESH] Bake failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
