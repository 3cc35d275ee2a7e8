// src/terrain/chunk_scheduler.rs
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::core::event_bus::{
    ChunkFinalizedEvent, EventBus, GenerationCompletedEvent, GenerationStartedEvent,
};
use crate::error::Result;
use crate::terrain::border::BorderShaper;
use crate::terrain::curve::HeightCurve;
use crate::terrain::falloff::FalloffField;
use crate::terrain::generation_grid::{GenerationStateGrid, MarkOutcome};
use crate::terrain::generation_timing::{GenerationTiming, PreparationStage};
use crate::terrain::generation_utils::MeshTemplates;
use crate::terrain::mesh_builder::{ChunkDescriptor, ChunkMeshBuilder, ChunkMeshData};
use crate::terrain::noise::{NoiseManager, SeedSetting};
use crate::terrain::terrain_config::{MapLayout, SchedulingPolicy, TerrainConfig};
use crate::threading::ThreadPool;
use crate::utils::error_logger::{ErrorLogger, ErrorSeverity};

// Self, 4-neighbors, then diagonals
const NEIGHBORHOOD: [(i32, i32); 9] = [
    (0, 0),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, -1),
    (1, 1),
    (-1, -1),
    (-1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Idle,
    Preparing,
    Streaming,
}

/// The "start new generation run" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub map_size: u32,
    pub chunk_size: u32,
    pub seed: SeedSetting,
}

impl GenerationRequest {
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self {
            map_size: config.map.map_size,
            chunk_size: config.map.chunk_size,
            seed: config.seed_setting(),
        }
    }
}

/// Diagnostics for a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub run_id: Uuid,
    pub seed: u32,
    pub map_size: u32,
    pub chunk_size: u32,
    pub policy: SchedulingPolicy,
    pub chunks: usize,
    pub elapsed_ms: u128,
    pub min_height: f32,
    pub max_height: f32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

struct GenerationRun {
    id: Uuid,
    seed: u32,
    layout: MapLayout,
    grid: GenerationStateGrid,
    builder: ChunkMeshBuilder,
    raw_queue: VecDeque<ChunkDescriptor>,
    finalized_queue: VecDeque<ChunkMeshData>,
    eager_enumerated: bool,
    started: Instant,
    started_at: DateTime<Utc>,
    chunks_built: usize,
    chunks_delivered: usize,
    min_height: f32,
    max_height: f32,
}

impl GenerationRun {
    fn enqueue_cell(&mut self, cx: i32, cz: i32) -> bool {
        match self.grid.try_mark(cx, cz) {
            MarkOutcome::Marked => {
                self.raw_queue.push_back(ChunkDescriptor::for_cell(
                    cx,
                    cz,
                    self.layout.cells_per_row,
                    self.layout.chunk_size,
                ));
                true
            }
            MarkOutcome::AlreadyMarked | MarkOutcome::OutOfRange => false,
        }
    }

    fn enqueue_all(&mut self) -> usize {
        if self.eager_enumerated {
            return 0;
        }
        self.eager_enumerated = true;

        let n = self.layout.cells_per_row as i32;
        let mut queued = 0;
        for cz in 0..n {
            for cx in 0..n {
                if self.enqueue_cell(cx, cz) {
                    queued += 1;
                }
            }
        }
        queued
    }

    fn enqueue_neighborhood(&mut self, agent_position: [f32; 2]) -> usize {
        let [x, z] = agent_position;
        if !x.is_finite() || !z.is_finite() {
            return 0;
        }
        let chunk_size = self.layout.chunk_size as f32;
        let agent_cx = (x / chunk_size).floor() as i32;
        let agent_cz = (z / chunk_size).floor() as i32;

        let mut queued = 0;
        for (dx, dz) in NEIGHBORHOOD {
            if self.enqueue_cell(agent_cx.saturating_add(dx), agent_cz.saturating_add(dz)) {
                queued += 1;
            }
        }
        queued
    }

    fn report(&self, policy: SchedulingPolicy) -> GenerationReport {
        let (min_height, max_height) = if self.chunks_built == 0 {
            (0.0, 0.0)
        } else {
            (self.min_height, self.max_height)
        };
        GenerationReport {
            run_id: self.id,
            seed: self.seed,
            map_size: self.layout.map_size,
            chunk_size: self.layout.chunk_size,
            policy,
            chunks: self.chunks_delivered,
            elapsed_ms: self.started.elapsed().as_millis(),
            min_height,
            max_height,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Drives generation runs: validates requests, prepares per-run data and feeds
/// one build plus one delivery through per tick.
pub struct ChunkScheduler {
    config: TerrainConfig,
    state: SchedulerState,
    thread_pool: Option<Arc<ThreadPool>>,
    event_bus: Option<Arc<EventBus>>,
    error_log: Arc<ErrorLogger>,
    run: Option<GenerationRun>,
    last_report: Option<GenerationReport>,
}

impl ChunkScheduler {
    pub fn new(config: TerrainConfig) -> Self {
        let error_log = Arc::new(ErrorLogger::new(config.runtime.error_history));

        let thread_pool = match ThreadPool::new(config.runtime.max_threads) {
            Ok(pool) => Some(Arc::new(pool)),
            Err(e) => {
                error_log.log_error(
                    ErrorSeverity::Error,
                    "ChunkScheduler",
                    &format!("thread pool unavailable, using rayon's global pool: {}", e),
                );
                None
            }
        };

        Self {
            config,
            state: SchedulerState::Idle,
            thread_pool,
            event_bus: None,
            error_log,
            run: None,
            last_report: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn with_thread_pool(mut self, thread_pool: Arc<ThreadPool>) -> Self {
        self.thread_pool = Some(thread_pool);
        self
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Replace the configuration used by the next run. The current run keeps the
    /// data it was prepared with, except for the scheduling policy which is read
    /// every tick.
    pub fn set_config(&mut self, config: TerrainConfig) {
        self.config = config;
    }

    pub fn set_policy(&mut self, policy: SchedulingPolicy) {
        self.config.map.policy = policy;
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run.as_ref().map(|run| run.id)
    }

    pub fn current_seed(&self) -> Option<u32> {
        self.run.as_ref().map(|run| run.seed)
    }

    pub fn grid(&self) -> Option<&GenerationStateGrid> {
        self.run.as_ref().map(|run| &run.grid)
    }

    pub fn pending_raw(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.raw_queue.len())
    }

    pub fn pending_finalized(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.finalized_queue.len())
    }

    pub fn chunks_built(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.chunks_built)
    }

    pub fn chunks_delivered(&self) -> usize {
        self.run.as_ref().map_or(0, |run| run.chunks_delivered)
    }

    /// Run-wide pre-border height range so far, if any chunk has been built.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        self.run
            .as_ref()
            .filter(|run| run.chunks_built > 0)
            .map(|run| (run.min_height, run.max_height))
    }

    pub fn last_report(&self) -> Option<&GenerationReport> {
        self.last_report.as_ref()
    }

    pub fn error_log(&self) -> &ErrorLogger {
        &self.error_log
    }

    /// Start a new run, discarding everything queued by the previous one.
    /// A rejected request leaves the scheduler exactly as it was.
    pub fn start_run(&mut self, request: GenerationRequest) -> Result<Uuid> {
        // the run clock covers preparation as well as streaming
        let started_at = Utc::now();
        let mut timing = GenerationTiming::new();
        let layout = MapLayout::new(request.map_size, request.chunk_size, self.config.map.border_margin)?;
        self.config.validate_generation()?;
        timing.update_stage(PreparationStage::Validated);

        let previous_state = self.state;
        self.state = SchedulerState::Preparing;

        let seed = request.seed.resolve();
        match self.prepare_run(layout, seed, started_at, &mut timing) {
            Ok(run) => {
                let run_id = run.id;
                info!(
                    "ChunkScheduler: run {} streaming {}x{} chunks of size {} (seed {}, {:?})",
                    run_id,
                    layout.cells_per_row,
                    layout.cells_per_row,
                    layout.chunk_size,
                    seed,
                    self.config.map.policy
                );
                self.run = Some(run);
                self.state = SchedulerState::Streaming;

                if let Some(bus) = &self.event_bus {
                    bus.publish(GenerationStartedEvent {
                        run_id,
                        seed,
                        map_size: layout.map_size,
                        chunk_size: layout.chunk_size,
                        policy: self.config.map.policy,
                    });
                }
                Ok(run_id)
            }
            Err(e) => {
                self.state = previous_state;
                Err(e)
            }
        }
    }

    fn prepare_run(
        &self,
        layout: MapLayout,
        seed: u32,
        started_at: DateTime<Utc>,
        timing: &mut GenerationTiming,
    ) -> Result<GenerationRun> {
        let run_id = Uuid::new_v4();
        let field_size = layout.falloff_size();
        let falloff_config = self.config.falloff;

        let falloff = self.in_pool(|| FalloffField::build(field_size, field_size, &falloff_config));
        timing.update_stage(PreparationStage::FalloffBuilt);

        let templates = MeshTemplates::new(layout.chunk_size);
        timing.update_stage(PreparationStage::TemplatesBuilt);

        let noise = NoiseManager::new(&self.config.noise_layers, seed, self.config.noise.normalization)?;
        let curve = HeightCurve::new(self.config.curve.clone())?;
        timing.update_stage(PreparationStage::NoiseReady);

        let builder = ChunkMeshBuilder::new(
            run_id,
            noise.into_layers(),
            Arc::new(falloff),
            curve,
            BorderShaper::for_map(layout.map_size, layout.border_margin),
            templates,
        )?
        .with_sharpen_pass(self.config.map.sharpen_pass);

        // a fresh grid per run is the reset
        let grid = GenerationStateGrid::new(layout.cells_per_row);
        timing.update_stage(PreparationStage::Ready);

        Ok(GenerationRun {
            id: run_id,
            seed,
            layout,
            grid,
            builder,
            raw_queue: VecDeque::new(),
            finalized_queue: VecDeque::new(),
            eager_enumerated: false,
            started: timing.start_time,
            started_at,
            chunks_built: 0,
            chunks_delivered: 0,
            min_height: f32::INFINITY,
            max_height: f32::NEG_INFINITY,
        })
    }

    fn in_pool<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.thread_pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    /// One scheduling step: enqueue by policy, build at most one chunk, hand out
    /// at most one finished chunk.
    pub fn on_tick(&mut self, agent_position: Option<[f32; 2]>) -> Option<ChunkMeshData> {
        if self.state != SchedulerState::Streaming {
            return None;
        }
        let policy = self.config.map.policy;
        let warn_after = Duration::from_millis(self.config.runtime.slow_build_warn_ms);
        let thread_pool = self.thread_pool.clone();
        let run = self.run.as_mut()?;

        let queued = match policy {
            SchedulingPolicy::Eager => run.enqueue_all(),
            SchedulingPolicy::OnDemand => agent_position.map_or(0, |pos| run.enqueue_neighborhood(pos)),
        };
        if queued > 0 {
            debug!("ChunkScheduler: queued {} chunks ({} pending)", queued, run.raw_queue.len());
        }

        if let Some(descriptor) = run.raw_queue.pop_front() {
            let build_start = Instant::now();
            let builder = &run.builder;
            let mesh = match &thread_pool {
                Some(pool) => pool.install(|| builder.build_chunk(&descriptor)),
                None => builder.build_chunk(&descriptor),
            };
            let build_time = build_start.elapsed();

            run.chunks_built += 1;
            run.min_height = run.min_height.min(mesh.min_height);
            run.max_height = run.max_height.max(mesh.max_height);
            debug!(
                "ChunkScheduler: built chunk {} at {:?} in {}ms",
                descriptor.chunk_id,
                descriptor.world_position,
                build_time.as_millis()
            );

            if !warn_after.is_zero() && build_time > warn_after {
                warn!("ChunkScheduler: slow build detected");
                self.error_log.log_error(
                    ErrorSeverity::Warning,
                    "ChunkScheduler",
                    &format!(
                        "chunk {} took {}ms (limit {}ms)",
                        descriptor.chunk_id,
                        build_time.as_millis(),
                        warn_after.as_millis()
                    ),
                );
            }

            if let Some(bus) = &self.event_bus {
                bus.publish(ChunkFinalizedEvent {
                    run_id: run.id,
                    chunk_id: descriptor.chunk_id,
                    world_position: descriptor.world_position,
                    build_ms: build_time.as_millis(),
                });
            }
            run.finalized_queue.push_back(mesh);
        }

        let delivered = run.finalized_queue.pop_front()?;
        run.chunks_delivered += 1;

        if run.chunks_delivered == run.layout.total_cells() {
            let report = run.report(policy);
            info!(
                "ChunkScheduler: run {} complete, {} chunks in {}ms, height range [{:.3}, {:.3}]",
                report.run_id, report.chunks, report.elapsed_ms, report.min_height, report.max_height
            );
            if let Some(bus) = &self.event_bus {
                bus.publish(GenerationCompletedEvent { report: report.clone() });
            }
            self.last_report = Some(report);
            self.state = SchedulerState::Idle;
        }

        Some(delivered)
    }
}
