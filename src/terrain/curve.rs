// src/terrain/curve.rs
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

pub fn linear_keys() -> Vec<Keyframe> {
    vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 1.0)]
}

/// Piecewise-linear height remap. Evaluation clamps to the first and last key.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightCurve {
    keys: Vec<Keyframe>,
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self { keys: linear_keys() }
    }
}

impl HeightCurve {
    pub fn new(keys: Vec<Keyframe>) -> Result<Self> {
        validate_keys(&keys)?;
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // first key with time > t; always in 1..len here
        let upper = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let s = (t - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * s
    }
}

pub fn validate_keys(keys: &[Keyframe]) -> Result<()> {
    if keys.is_empty() {
        return Err(TerrainError::InvalidCurve("curve needs at least one keyframe".to_string()));
    }
    for key in keys {
        if !key.time.is_finite() || !key.value.is_finite() {
            return Err(TerrainError::InvalidCurve(format!(
                "keyframe ({}, {}) is not finite",
                key.time, key.value
            )));
        }
    }
    for pair in keys.windows(2) {
        if pair[1].time <= pair[0].time {
            return Err(TerrainError::InvalidCurve(format!(
                "keyframe times must increase, {} follows {}",
                pair[1].time, pair[0].time
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_between_and_beyond_keys() {
        let curve = HeightCurve::new(vec![
            Keyframe::new(0.0, 0.0),
            Keyframe::new(0.5, 0.1),
            Keyframe::new(1.0, 1.0),
        ])
        .unwrap();

        assert_eq!(curve.evaluate(-3.0), 0.0);
        assert!((curve.evaluate(0.25) - 0.05).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 0.55).abs() < 1e-6);
        assert_eq!(curve.evaluate(0.5), 0.1);
        assert_eq!(curve.evaluate(7.0), 1.0);
    }

    #[test]
    fn single_key_is_constant() {
        let curve = HeightCurve::new(vec![Keyframe::new(0.3, 0.8)]).unwrap();
        assert_eq!(curve.evaluate(0.0), 0.8);
        assert_eq!(curve.evaluate(1.0), 0.8);
    }

    #[test]
    fn rejects_unsorted_or_empty_keys() {
        assert!(HeightCurve::new(Vec::new()).is_err());
        let unsorted = vec![Keyframe::new(0.5, 0.0), Keyframe::new(0.5, 1.0)];
        assert!(matches!(HeightCurve::new(unsorted), Err(TerrainError::InvalidCurve(_))));
    }
}
