//! Path requests
//!
//! Wraps the pathfinding engine behind a small request/response contract and
//! turns its answer into either a polyline or a rejection.

use bitflags::bitflags;
use glam::Vec3;
use rand::RngCore;

bitflags! {
    /// Classification of the last computed path.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PathType: u32 {
        /// Full path to the destination
        const NORMAL         = 1 << 0;
        /// Straight line, no navigation data used
        const SHORTCUT       = 1 << 1;
        /// Path ends before the destination
        const INCOMPLETE     = 1 << 2;
        /// No path could be built
        const NOPATH         = 1 << 3;
        /// Path was truncated by the length limit
        const SHORT          = 1 << 4;
    }
}

/// Pathfinding engine consulted for random destinations.
pub trait PathFinder {
    /// Limit the length of subsequent paths (0 disables the limit)
    fn set_path_length_limit(&mut self, limit: f32);

    /// Build a path from `start` to a random reachable point within
    /// `radius` of `center`.
    fn compute_path_to_random_point(
        &mut self,
        start: Vec3,
        center: Vec3,
        radius: f32,
        rng: &mut dyn RngCore,
    );

    /// Waypoints of the last computed path
    fn path(&self) -> &[Vec3];

    /// Classification of the last computed path
    fn path_type(&self) -> PathType;
}

/// Why a candidate path was thrown away.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PathRejection {
    /// The pathfinder found no path
    #[error("no path found")]
    NoPath,
    /// The path has fewer than two points
    #[error("path has {0} points")]
    Degenerate(usize),
    /// A near-vertical segment climbs more than a step allows
    #[error("step too high at segment {segment}: {rise:.2}")]
    StepTooHigh {
        /// Index of the segment's first point
        segment: usize,
        /// Vertical distance of the segment
        rise: f32,
    },
    /// A segment is steeper than allowed
    #[error("slope too steep at segment {segment}: {ratio:.2}")]
    SlopeTooSteep {
        /// Index of the segment's first point
        segment: usize,
        /// Vertical over horizontal distance
        ratio: f32,
    },
}

impl PathRejection {
    /// Whether the path was rejected by slope or step validation
    #[must_use]
    pub const fn is_terrain(&self) -> bool {
        matches!(self, Self::StepTooHigh { .. } | Self::SlopeTooSteep { .. })
    }
}

/// A request for a random destination around an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathRequest {
    /// Where the unit stands
    pub start: Vec3,
    /// Anchor of the search
    pub center: Vec3,
    /// Search radius around the anchor
    pub radius: f32,
    /// Path length limit (0 = unlimited)
    pub length_cap: f32,
}

impl PathRequest {
    /// Ask `finder` for a path and copy out its waypoints.
    ///
    /// # Errors
    ///
    /// Returns [`PathRejection::NoPath`] when the engine flags the result as
    /// no path, or [`PathRejection::Degenerate`] for paths with fewer than
    /// two points.
    pub fn execute(
        &self,
        finder: &mut dyn PathFinder,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vec3>, PathRejection> {
        if self.length_cap != 0.0 {
            finder.set_path_length_limit(self.length_cap);
        }

        finder.compute_path_to_random_point(self.start, self.center, self.radius, rng);

        if finder.path_type().contains(PathType::NOPATH) {
            return Err(PathRejection::NoPath);
        }

        let path = finder.path();
        if path.len() < 2 {
            return Err(PathRejection::Degenerate(path.len()));
        }

        Ok(path.to_vec())
    }
}
