//! Core module
//!
//! Timers, tuning configuration and replanning statistics shared by every
//! motion generator.

mod config;
mod stats;
mod timer;

pub use config::{
    ConfigError, DEFAULT_MAX_SLOPE_RATIO, DEFAULT_STEP_LENGTH, DEFAULT_STEP_TOLERANCE,
    MotionConfig, MotionTuning, SwimPolicy,
};
pub use stats::MotionStats;
pub use timer::CountdownTimer;
