use std::collections::HashSet;

use chunkland::terrain::border::SEABED_HEIGHT;
use chunkland::terrain::falloff::{FalloffConfig, FalloffShape};
use chunkland::terrain::noise::SeedSetting;
use chunkland::terrain::{ChunkScheduler, GenerationRequest, SchedulerState, SchedulingPolicy, TerrainConfig};

fn island_config() -> TerrainConfig {
    let mut config = TerrainConfig::default();
    config.map.map_size = 400;
    config.map.chunk_size = 200;
    config.map.policy = SchedulingPolicy::Eager;
    config.falloff = FalloffConfig { shape: FalloffShape::Circle, param_a: 3.0, param_b: 2.2 };
    config
}

#[test]
fn eager_island_run() {
    let config = island_config();
    let mut scheduler = ChunkScheduler::new(config.clone());
    let request = GenerationRequest { map_size: 400, chunk_size: 200, seed: SeedSetting::Fixed(1337) };
    let run_id = scheduler.start_run(request).unwrap();

    let border_radius = 200.0 - config.map.border_margin;
    let max_height_scale = config
        .noise_layers
        .iter()
        .map(|layer| layer.height_scale)
        .fold(f32::MIN, f32::max);

    let mut chunks = Vec::new();
    while let Some(chunk) = scheduler.on_tick(None) {
        chunks.push(chunk);
    }

    assert_eq!(chunks.len(), 4);
    let positions: HashSet<[i32; 2]> = chunks.iter().map(|c| c.world_position).collect();
    assert_eq!(positions.len(), 4);
    assert!(positions.contains(&[200, 200]));

    for chunk in &chunks {
        assert_eq!(chunk.run_id, run_id);
        assert_eq!(chunk.vertices.len(), 40401);
        assert_eq!(chunk.uvs.len(), 40401);
        assert_eq!(chunk.triangle_indices.len(), 240000);
        for vertex in &chunk.vertices {
            assert!(
                vertex[1] >= SEABED_HEIGHT - border_radius && vertex[1] <= max_height_scale,
                "height {} out of range",
                vertex[1]
            );
        }
    }

    // the map corners lie far outside the border
    let origin = chunks.iter().find(|c| c.world_position == [0, 0]).unwrap();
    assert_eq!(origin.vertices[0][1], SEABED_HEIGHT);

    assert_eq!(scheduler.state(), SchedulerState::Idle);
    let report = scheduler.last_report().unwrap();
    assert_eq!(report.chunks, 4);
    assert_eq!(report.seed, 1337);
    assert!(scheduler.grid().unwrap().is_complete());

    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["policy"], "eager");
    assert_eq!(json["map_size"], 400);
}

#[test]
fn random_seed_runs_stay_in_range() {
    let mut config = island_config();
    config.map.map_size = 200;
    config.map.chunk_size = 100;
    let mut scheduler = ChunkScheduler::new(config.clone());

    for _ in 0..3 {
        let request = GenerationRequest { seed: SeedSetting::Random, ..GenerationRequest::from_config(&config) };
        scheduler.start_run(request).unwrap();
        assert!(scheduler.current_seed().unwrap() < 100_000);
        while scheduler.on_tick(None).is_some() {}
        assert_eq!(scheduler.last_report().unwrap().chunks, 4);
    }
}
