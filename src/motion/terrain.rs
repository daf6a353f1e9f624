//! Terrain height correction and slope validation
//!
//! Raw pathfinder output is snapped onto the ground and then checked segment
//! by segment. A single bad segment discards the whole path.

use glam::{Vec2, Vec3};

use crate::core::{MotionTuning, SwimPolicy};
use crate::unit::Unit;

use super::path::PathRejection;

/// Depth below the water surface kept by swimming units.
pub const SWIM_DEPTH: f32 = 0.5;

/// Terrain height and water queries.
pub trait TerrainQuery {
    /// Ground height under (x, y), searched from height `z`
    fn ground_height(&self, x: f32, y: f32, z: f32) -> f32;

    /// Water surface height at (x, y), if there is water
    fn water_level(&self, x: f32, y: f32, z: f32) -> Option<f32>;
}

/// Corrects path heights and rejects paths a walking unit cannot follow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainCorrector {
    /// Treatment of swimming units
    pub swim_policy: SwimPolicy,
    /// Horizontal length under which a segment counts as a step
    pub step_length: f32,
    /// Maximum height of a step
    pub step_tolerance: f32,
    /// Maximum vertical/horizontal ratio
    pub max_slope_ratio: f32,
}

impl TerrainCorrector {
    /// Build a corrector from variant tuning
    #[must_use]
    pub fn new(tuning: &MotionTuning, swim_policy: SwimPolicy) -> Self {
        Self {
            swim_policy,
            step_length: tuning.slope_step_length,
            step_tolerance: tuning.slope_step_tolerance,
            max_slope_ratio: tuning.slope_max_ratio,
        }
    }

    /// Whether `unit` is treated as swimming under the current policy
    #[must_use]
    pub fn swim_exempt(&self, unit: &dyn Unit) -> bool {
        self.swim_policy == SwimPolicy::ExemptSwimming && unit.is_in_water()
    }

    /// Snap heights and validate slopes for `unit`.
    ///
    /// # Errors
    ///
    /// Returns the first slope or step violation, if any.
    pub fn apply(&self, unit: &dyn Unit, path: &mut [Vec3]) -> Result<(), PathRejection> {
        let swimming = self.swim_exempt(unit);
        self.correct_heights(unit.terrain(), swimming, path);

        if unit.can_fly() || swimming {
            return Ok(());
        }
        self.validate_slopes(path)
    }

    /// Correct every point's height.
    ///
    /// Swimming units stay [`SWIM_DEPTH`] under the surface when a point is
    /// below it, and keep their height otherwise.
    pub fn correct_heights(&self, terrain: &dyn TerrainQuery, swimming: bool, path: &mut [Vec3]) {
        for point in path.iter_mut() {
            if swimming {
                if let Some(surface) = terrain.water_level(point.x, point.y, point.z)
                    && point.z < surface
                {
                    point.z = surface - SWIM_DEPTH;
                }
            } else {
                point.z = terrain.ground_height(point.x, point.y, point.z);
            }
        }
    }

    /// Check every consecutive segment against the step and slope limits.
    ///
    /// # Errors
    ///
    /// Returns [`PathRejection::StepTooHigh`] or
    /// [`PathRejection::SlopeTooSteep`] for the first offending segment.
    pub fn validate_slopes(&self, path: &[Vec3]) -> Result<(), PathRejection> {
        for (segment, pair) in path.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            let horizontal = from.truncate().distance(to.truncate());
            let rise = (to.z - from.z).abs();

            if horizontal < self.step_length {
                if rise > self.step_tolerance {
                    return Err(PathRejection::StepTooHigh { segment, rise });
                }
            } else if rise / horizontal > self.max_slope_ratio {
                return Err(PathRejection::SlopeTooSteep {
                    segment,
                    ratio: rise / horizontal,
                });
            }
        }
        Ok(())
    }
}

/// Height map over a regular grid with an optional flat water surface.
#[derive(Debug, Clone)]
pub struct HeightField {
    /// World position of cell (0, 0)
    pub origin: Vec2,
    /// Cell size in world units
    pub cell_size: f32,
    width: usize,
    height: usize,
    heights: Vec<f32>,
    water_level: Option<f32>,
}

impl HeightField {
    /// Flat ground at height `z` everywhere
    #[must_use]
    pub fn flat(z: f32) -> Self {
        Self {
            origin: Vec2::ZERO,
            cell_size: 1.0,
            width: 1,
            height: 1,
            heights: vec![z],
            water_level: None,
        }
    }

    /// Sample `f(x, y)` at every cell centre
    #[must_use]
    pub fn from_fn(
        width: usize,
        height: usize,
        cell_size: f32,
        f: impl Fn(f32, f32) -> f32,
    ) -> Self {
        let mut heights = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let cx = (x as f32 + 0.5) * cell_size;
                let cy = (y as f32 + 0.5) * cell_size;
                heights.push(f(cx, cy));
            }
        }
        Self {
            origin: Vec2::ZERO,
            cell_size,
            width,
            height,
            heights,
            water_level: None,
        }
    }

    /// Flood everything below `level`
    #[must_use]
    pub fn with_water_level(mut self, level: f32) -> Self {
        self.water_level = Some(level);
        self
    }

    /// Height of the cell containing (x, y), clamped to the field's edge.
    ///
    /// An empty field is flat ground at height 0.
    fn sample(&self, x: f32, y: f32) -> f32 {
        let local = (Vec2::new(x, y) - self.origin) / self.cell_size;
        let cx = (local.x.max(0.0) as usize).min(self.width.saturating_sub(1));
        let cy = (local.y.max(0.0) as usize).min(self.height.saturating_sub(1));
        self.heights.get(cy * self.width + cx).copied().unwrap_or(0.0)
    }
}

impl TerrainQuery for HeightField {
    fn ground_height(&self, x: f32, y: f32, _z: f32) -> f32 {
        self.sample(x, y)
    }

    fn water_level(&self, x: f32, y: f32, _z: f32) -> Option<f32> {
        self.water_level.filter(|&level| level > self.sample(x, y))
    }
}
