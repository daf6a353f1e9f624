//! Random movement generators for server-side creatures
//!
//! This crate provides:
//! - Confused, wander, timed wander, fleeing and panic movement
//! - Path requests with length caps and terrain slope validation
//! - Spline playback with hard stops and soft interrupts
//! - A single-slot scheduler driving generator lifecycles

pub mod core;
pub mod motion;
pub mod unit;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{CountdownTimer, MotionConfig, MotionStats, MotionTuning, SwimPolicy};
    pub use crate::motion::{
        Grid, HeightField, MotionSlot, MovementGenerator, MovementGeneratorType, MovementKind,
        RandomMovementGenerator,
    };
    pub use crate::unit::{Creature, RespawnPoint, Unit, UnitFlags, UnitState};
    pub use glam::{Vec2, Vec3};
}
