//! Unit module
//!
//! The entity model motion generators operate on, its state bitsets and a
//! reference creature implementation.

mod creature;
mod model;
mod state;

pub use creature::{
    Creature, CreatureAi, DEFAULT_FLY_SPEED, DEFAULT_RUN_SPEED, DEFAULT_WALK_SPEED, Speeds,
};
pub use model::{RespawnPoint, Unit, UnitAi};
pub use state::{UnitFlags, UnitState};
