use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use chunkland::config::config_manager::{ConfigurationManager, DEFAULT_CONFIG_PATH};
use chunkland::core::event_bus::{ChunkFinalizedEvent, EventBus};
use chunkland::terrain::{ChunkScheduler, GenerationRequest, SchedulerState, SchedulingPolicy};
use log::{debug, error, info, warn};

/// Cell centers visited by the simulated agent: a serpentine sweep over every
/// third row so each 3x3 neighborhood band touches the whole map.
fn sweep_waypoints(cells_per_row: u32, chunk_size: u32) -> Vec<[f32; 2]> {
    let n = cells_per_row as i32;
    let mut rows: Vec<i32> = (0..n).filter(|row| row % 3 == 1).collect();
    if rows.last().is_none_or(|&last| last + 1 < n - 1) {
        rows.push(n - 1);
    }

    let center = |cell: i32| (cell as f32 + 0.5) * chunk_size as f32;
    let mut waypoints = Vec::with_capacity(rows.len() * n as usize);
    for (i, row) in rows.into_iter().enumerate() {
        let columns: Vec<i32> = if i % 2 == 0 { (0..n).collect() } else { (0..n).rev().collect() };
        for column in columns {
            waypoints.push([center(column), center(row)]);
        }
    }
    waypoints
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let manager = ConfigurationManager::load_or_default(&config_path);
    if let Err(e) = manager.validate() {
        error!("chunkland: invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }
    let config = manager.get_config().clone();

    let event_bus = Arc::new(EventBus::new());
    event_bus.subscribe(|event: &ChunkFinalizedEvent| {
        debug!(
            "chunkland: chunk {} at {:?} ready after {}ms",
            event.chunk_id, event.world_position, event.build_ms
        );
    });

    let mut scheduler = ChunkScheduler::new(config.clone()).with_event_bus(event_bus);
    let request = GenerationRequest::from_config(&config);
    if let Err(e) = scheduler.start_run(request) {
        error!("chunkland: run refused: {}", e);
        return ExitCode::FAILURE;
    }

    let cells_per_row = config.map.map_size / config.map.chunk_size;
    let waypoints = sweep_waypoints(cells_per_row, config.map.chunk_size);
    let mut visited = 0usize;
    let mut vertices = 0usize;
    let mut ticks = 0usize;

    while scheduler.state() == SchedulerState::Streaming {
        ticks += 1;
        let agent = match config.map.policy {
            SchedulingPolicy::Eager => None,
            SchedulingPolicy::OnDemand => {
                // move on once everything around the current waypoint is out
                if scheduler.pending_raw() == 0 && scheduler.pending_finalized() == 0 {
                    visited += 1;
                }
                match visited.checked_sub(1).and_then(|i| waypoints.get(i)) {
                    Some(position) => Some(*position),
                    None => {
                        warn!("chunkland: agent sweep ended before the map was complete");
                        break;
                    }
                }
            }
        };

        if let Some(chunk) = scheduler.on_tick(agent) {
            // stands in for mesh instantiation
            vertices += chunk.vertex_count();
        }
    }

    info!("chunkland: {} vertices delivered over {} ticks", vertices, ticks);

    let Some(report) = scheduler.last_report() else {
        error!("chunkland: run did not complete");
        return ExitCode::FAILURE;
    };
    match serde_json::to_string_pretty(report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("chunkland: failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}
