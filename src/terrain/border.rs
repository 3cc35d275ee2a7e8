// src/terrain/border.rs
//! Island border: keeps inland vertices, lifts a rim, drops a cliff and pulls the
//! seabed band inward so the outer skirt slopes under the map.

/// Width of the raised rim just outside the radius.
pub const RIM_WIDTH: f32 = 2.0;
/// Distance past the radius where the flat seabed starts.
pub const SEABED_START: f32 = 3.5;
/// Rim plateau height.
pub const RIM_HEIGHT: f32 = 1.0;
/// Seabed height before the inward pull.
pub const SEABED_HEIGHT: f32 = -3.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderBand {
    Inland,
    Rim,
    Cliff,
    Seabed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderShaper {
    center: [f32; 2],
    radius: f32,
}

impl BorderShaper {
    pub fn new(center: [f32; 2], radius: f32) -> Self {
        Self { center, radius }
    }

    /// Shaper for a square map: centered on the map, reaching `margin` short of the edge.
    pub fn for_map(map_size: u32, margin: f32) -> Self {
        let half = (map_size / 2) as f32;
        Self::new([half, half], half - margin)
    }

    pub fn center(&self) -> [f32; 2] {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn distance(&self, world: [f32; 2]) -> f32 {
        let dx = world[0] - self.center[0];
        let dz = world[1] - self.center[1];
        (dx * dx + dz * dz).sqrt()
    }

    pub fn band(&self, distance: f32) -> BorderBand {
        if distance <= self.radius {
            BorderBand::Inland
        } else if distance < self.radius + RIM_WIDTH {
            BorderBand::Rim
        } else if distance < self.radius + SEABED_START {
            BorderBand::Cliff
        } else {
            BorderBand::Seabed
        }
    }

    /// Final chunk-local vertex for a world position, its chunk-local position and the
    /// pre-border height.
    pub fn shape(&self, world: [f32; 2], local: [f32; 2], height: f32) -> [f32; 3] {
        let [x, z] = local;
        let distance = self.distance(world);

        match self.band(distance) {
            BorderBand::Inland => [x, height, z],
            BorderBand::Rim => [x, RIM_HEIGHT, z],
            BorderBand::Cliff => [x, -(distance - self.radius), z],
            BorderBand::Seabed => {
                // distance > 0 here since radius is positive
                let overshoot = distance - self.radius;
                let dir_x = (self.center[0] - world[0]) / distance;
                let dir_z = (self.center[1] - world[1]) / distance;
                [x + dir_x * overshoot, SEABED_HEIGHT, z + dir_z * overshoot]
            }
        }
    }
}

pub fn shape_height(radius: f32, center: [f32; 2], world: [f32; 2], local: [f32; 2], height: f32) -> [f32; 3] {
    BorderShaper::new(center, radius).shape(world, local, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shaper() -> BorderShaper {
        BorderShaper::new([100.0, 100.0], 50.0)
    }

    #[test]
    fn inland_keeps_height_up_to_the_radius() {
        let out = shaper().shape([120.0, 100.0], [20.0, 0.0], 6.25);
        assert_eq!(out, [20.0, 6.25, 0.0]);
        // exactly on the radius still counts as inland
        let edge = shaper().shape([150.0, 100.0], [50.0, 0.0], 2.0);
        assert_eq!(edge[1], 2.0);
    }

    #[test]
    fn rim_and_cliff_heights() {
        let rim = shaper().shape([151.0, 100.0], [1.0, 0.0], 9.0);
        assert_eq!(rim, [1.0, RIM_HEIGHT, 0.0]);
        let cliff = shaper().shape([152.5, 100.0], [2.5, 0.0], 9.0);
        assert_eq!(cliff, [2.5, -2.5, 0.0]);
        // the rim ends where the cliff starts
        assert_eq!(shaper().band(52.0), BorderBand::Cliff);
        assert_eq!(shaper().band(53.5), BorderBand::Seabed);
    }

    #[test]
    fn seabed_is_pulled_toward_the_center() {
        let out = shaper().shape([160.0, 100.0], [10.0, 4.0], 9.0);
        // overshoot 10 along -x
        assert!((out[0] - 0.0).abs() < 1e-5);
        assert_eq!(out[1], SEABED_HEIGHT);
        assert!((out[2] - 4.0).abs() < 1e-5);
    }

    #[test]
    fn free_function_matches_shaper() {
        let s = shaper();
        let world = [30.0, 30.0];
        assert_eq!(shape_height(50.0, [100.0, 100.0], world, [3.0, 3.0], 1.5), s.shape(world, [3.0, 3.0], 1.5));
    }

    #[test]
    fn for_map_uses_half_size_minus_margin() {
        let s = BorderShaper::for_map(400, 4.0);
        assert_eq!(s.center(), [200.0, 200.0]);
        assert_eq!(s.radius(), 196.0);
    }
}
