// src/terrain/generation_timing.rs
use std::time::{Duration, Instant};

use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreparationStage {
    Validated,
    FalloffBuilt,
    TemplatesBuilt,
    NoiseReady,
    Ready,
}

impl PreparationStage {
    fn label(self) -> &'static str {
        match self {
            PreparationStage::Validated => "Request validation",
            PreparationStage::FalloffBuilt => "Falloff field",
            PreparationStage::TemplatesBuilt => "Mesh templates",
            PreparationStage::NoiseReady => "Noise layers",
            PreparationStage::Ready => "Final preparation",
        }
    }
}

// Tracks timing data for the preparation stages of one run
#[derive(Debug, Clone)]
pub struct GenerationTiming {
    pub start_time: Instant,
    stages: Vec<(PreparationStage, Instant)>,
}

impl Default for GenerationTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationTiming {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            stages: Vec::with_capacity(5),
        }
    }

    pub fn current_stage(&self) -> Option<PreparationStage> {
        self.stages.last().map(|(stage, _)| *stage)
    }

    fn last_mark(&self) -> Instant {
        self.stages.last().map_or(self.start_time, |(_, at)| *at)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn update_stage(&mut self, stage: PreparationStage) {
        let now = Instant::now();
        let since_last = now.duration_since(self.last_mark());
        self.stages.push((stage, now));

        if stage != PreparationStage::Ready {
            debug!("GenerationTiming: {} done in {}ms", stage.label(), since_last.as_millis());
            return;
        }

        let total = now.duration_since(self.start_time);
        info!("GenerationTiming: run prepared in {}ms", total.as_millis());

        // micros keep the percentages meaningful on fast machines
        let total_us = total.as_micros().max(1);
        let mut previous = self.start_time;
        for (stage, at) in &self.stages {
            let span = at.duration_since(previous);
            debug!(
                "GenerationTiming: - {}: {}ms ({}%)",
                stage.label(),
                span.as_millis(),
                span.as_micros() * 100 / total_us
            );
            previous = *at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_recorded_in_order() {
        let mut timing = GenerationTiming::new();
        assert_eq!(timing.current_stage(), None);
        timing.update_stage(PreparationStage::Validated);
        timing.update_stage(PreparationStage::FalloffBuilt);
        timing.update_stage(PreparationStage::Ready);
        assert_eq!(timing.current_stage(), Some(PreparationStage::Ready));
        assert!(timing.elapsed() >= Duration::ZERO);
    }
}
