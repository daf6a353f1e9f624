//! Motion module
//!
//! Random movement generators and their collaborators: path requests, terrain
//! correction, playback dispatch and the single-slot scheduler.

mod dispatch;
mod generator;
mod grid;
mod path;
mod policy;
mod slot;
mod spline;
mod terrain;

pub use dispatch::{MotionDispatcher, combat_slow_multiplier};
pub use generator::{MovementGenerator, RandomMovementGenerator};
pub use grid::{Grid, GridPathFinder};
pub use path::{PathFinder, PathRejection, PathRequest, PathType};
pub use policy::{
    MAX_QUIET_DISTANCE, MIN_QUIET_DISTANCE, MovementGeneratorType, MovementKind,
    RandomMovementPolicy, flee_radius,
};
pub use slot::MotionSlot;
pub use spline::{
    MoveMode, MoveSpline, PlaybackState, SOFT_STOP_MS, SplineCommand, SplinePlayer, path_length,
};
pub use terrain::{HeightField, SWIM_DEPTH, TerrainCorrector, TerrainQuery};
