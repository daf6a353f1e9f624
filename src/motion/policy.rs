//! Movement variants
//!
//! Each variant only differs from the shared replanning loop in how it picks
//! the search radius and in the side effects of entering and leaving the
//! mode. Variants are a closed set, so they are an enum carrying their own
//! data, and the loop talks to them through [`RandomMovementPolicy`].

use glam::Vec3;
use rand::{Rng, RngCore};

use crate::core::CountdownTimer;
use crate::unit::{Unit, UnitFlags, UnitState};

/// Distance from the threat under which a fleeing unit keeps running away.
pub const MIN_QUIET_DISTANCE: f32 = 28.0;
/// Distance from the threat beyond which a fleeing unit only drifts.
pub const MAX_QUIET_DISTANCE: f32 = 43.0;

/// Kind of a movement generator, as reported to schedulers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementGeneratorType {
    /// Random steps around the activation point
    Confused,
    /// Roaming around a spawn point
    Random,
    /// Running away from a threat
    Fleeing,
}

/// Variant-specific behaviour of a random movement generator.
pub trait RandomMovementPolicy {
    /// Name for logging
    fn name(&self) -> &'static str;

    /// Kind reported to schedulers
    fn generator_type(&self) -> MovementGeneratorType;

    /// State bit marking the generator as active
    fn active_state(&self) -> UnitState;

    /// State bit marking a path in flight
    fn motion_state(&self) -> UnitState;

    /// Search radius for the next destination
    fn select_radius(
        &self,
        unit: &dyn Unit,
        anchor: Vec3,
        radius: f32,
        rng: &mut dyn RngCore,
    ) -> f32;

    /// Advance variant timers. Returns false once the variant has expired.
    fn tick(&mut self, _diff: u32) -> bool {
        true
    }

    /// Runs before the shared initialization
    fn on_enter(&mut self, _unit: &mut dyn Unit) {}

    /// Runs after the shared finalization
    fn on_exit(&mut self, _unit: &mut dyn Unit) {}

    /// Runs after the shared interruption
    fn on_interrupt(&mut self, _unit: &mut dyn Unit) {}
}

/// The movement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum MovementKind {
    /// Short random steps around a fixed point
    Confused,
    /// Roaming around a spawn point
    Wander,
    /// Roaming that ends after a fixed duration
    TimedWander {
        /// Remaining roaming time
        duration: CountdownTimer,
    },
    /// Running away from a threat
    Fleeing,
    /// Fleeing that ends after a fixed duration
    Panic {
        /// Remaining fleeing time
        fleeing: CountdownTimer,
    },
}

impl MovementKind {
    /// Whether this is one of the wander variants
    #[must_use]
    pub const fn is_wander(&self) -> bool {
        matches!(self, Self::Wander | Self::TimedWander { .. })
    }

    /// Whether this is one of the flee variants
    #[must_use]
    pub const fn is_flee(&self) -> bool {
        matches!(self, Self::Fleeing | Self::Panic { .. })
    }
}

/// Random radius for a fleeing unit standing `distance` from its threat.
#[must_use]
pub fn flee_radius(distance: f32, rng: &mut dyn RngCore) -> f32 {
    let band = MAX_QUIET_DISTANCE - MIN_QUIET_DISTANCE;
    if distance < MIN_QUIET_DISTANCE {
        rng.gen_range(0.4f32..=1.3) * (MIN_QUIET_DISTANCE - distance)
    } else if distance > MAX_QUIET_DISTANCE {
        rng.gen_range(0.4f32..=1.0) * band
    } else {
        rng.gen_range(0.6f32..=1.2) * band
    }
}

/// Put a creature back into its preferred gait.
fn restore_gait(unit: &mut dyn Unit) {
    if unit.is_creature() {
        let walk = !unit.has_state(UnitState::RUNNING);
        unit.set_walk(walk);
    }
}

fn notify_fleeing_ended(unit: &mut dyn Unit) {
    if let Some(ai) = unit.ai_mut() {
        ai.timed_fleeing_ended();
    }
}

impl RandomMovementPolicy for MovementKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Confused => "Confused",
            Self::Wander => "Wander",
            Self::TimedWander { .. } => "TimedWander",
            Self::Fleeing => "Fleeing",
            Self::Panic { .. } => "Panic",
        }
    }

    fn generator_type(&self) -> MovementGeneratorType {
        match self {
            Self::Confused => MovementGeneratorType::Confused,
            Self::Wander | Self::TimedWander { .. } => MovementGeneratorType::Random,
            Self::Fleeing | Self::Panic { .. } => MovementGeneratorType::Fleeing,
        }
    }

    fn active_state(&self) -> UnitState {
        match self.generator_type() {
            MovementGeneratorType::Confused => UnitState::CONFUSED,
            MovementGeneratorType::Random => UnitState::ROAMING,
            MovementGeneratorType::Fleeing => UnitState::FLEEING,
        }
    }

    fn motion_state(&self) -> UnitState {
        match self.generator_type() {
            MovementGeneratorType::Confused => UnitState::CONFUSED_MOVE,
            MovementGeneratorType::Random => UnitState::ROAMING_MOVE,
            MovementGeneratorType::Fleeing => UnitState::FLEEING_MOVE,
        }
    }

    fn select_radius(
        &self,
        unit: &dyn Unit,
        anchor: Vec3,
        radius: f32,
        rng: &mut dyn RngCore,
    ) -> f32 {
        if self.is_flee() {
            flee_radius(unit.distance_to(anchor), rng)
        } else {
            radius
        }
    }

    fn tick(&mut self, diff: u32) -> bool {
        match self {
            Self::TimedWander { duration: timer } | Self::Panic { fleeing: timer } => {
                timer.update(diff);
                !timer.passed()
            }
            _ => true,
        }
    }

    fn on_enter(&mut self, unit: &mut dyn Unit) {
        if let Self::Panic { .. } = self {
            unit.add_state(UnitState::PANIC);
        }
    }

    fn on_exit(&mut self, unit: &mut dyn Unit) {
        match self {
            Self::Wander | Self::TimedWander { .. } => restore_gait(unit),
            Self::Panic { .. } => {
                unit.clear_state(UnitState::PANIC);
                // Flee variants are mutually exclusive, so nobody else clears this
                unit.remove_flag(UnitFlags::FLEEING);
                notify_fleeing_ended(unit);
            }
            Self::Confused | Self::Fleeing => {}
        }
    }

    fn on_interrupt(&mut self, unit: &mut dyn Unit) {
        match self {
            Self::Wander | Self::TimedWander { .. } => restore_gait(unit),
            Self::Panic { .. } => notify_fleeing_ended(unit),
            Self::Confused | Self::Fleeing => {}
        }
    }
}
