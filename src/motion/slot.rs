//! Single-slot movement scheduler
//!
//! Owns at most one [`MovementGenerator`] for a unit and drives its
//! lifecycle: initialize on start, update every tick, interrupt and reset
//! around suspensions, finalize on removal.
//!
//! # Example
//!
//! ```ignore
//! let mut slot = MotionSlot::new();
//! slot.start(&mut unit, RandomMovementGenerator::fleeing(threat, &config));
//! while slot.update(&mut unit, diff) {
//!     unit.tick(diff);
//! }
//! ```

use std::fmt;

use log::debug;

use crate::unit::Unit;

use super::generator::MovementGenerator;
use super::policy::MovementGeneratorType;

// ============================================================================
// Motion Slot
// ============================================================================

/// Holds the active movement generator of one unit.
#[derive(Default)]
pub struct MotionSlot {
    /// Active generator
    current: Option<Box<dyn MovementGenerator>>,
    /// Whether the active generator is suspended
    suspended: bool,
}

impl MotionSlot {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active generator.
    ///
    /// The previous generator, if any, is finalized before the new one is
    /// initialized.
    pub fn start<G: MovementGenerator + 'static>(&mut self, unit: &mut dyn Unit, generator: G) {
        self.start_boxed(unit, Box::new(generator));
    }

    /// Replace the active generator with an already boxed one
    pub fn start_boxed(&mut self, unit: &mut dyn Unit, mut generator: Box<dyn MovementGenerator>) {
        self.clear(unit);

        debug!("motion slot: starting {}", generator.name());
        generator.initialize(unit);
        self.current = Some(generator);
        self.suspended = false;
    }

    /// Drive the active generator.
    ///
    /// A generator that asks for removal is finalized and dropped. Returns
    /// whether a generator is still held.
    pub fn update(&mut self, unit: &mut dyn Unit, diff: u32) -> bool {
        let Some(generator) = self.current.as_mut() else {
            return false;
        };
        if self.suspended {
            return true;
        }

        if !generator.update(unit, diff) {
            debug!("motion slot: {} finished", generator.name());
            self.clear(unit);
            return false;
        }
        true
    }

    /// Suspend the active generator
    pub fn interrupt(&mut self, unit: &mut dyn Unit) {
        if self.suspended {
            return;
        }
        if let Some(generator) = self.current.as_mut() {
            generator.interrupt(unit);
            self.suspended = true;
        }
    }

    /// Resume a suspended generator
    pub fn resume(&mut self, unit: &mut dyn Unit) {
        if !self.suspended {
            return;
        }
        if let Some(generator) = self.current.as_mut() {
            generator.reset(unit);
        }
        self.suspended = false;
    }

    /// Finalize and drop the active generator
    pub fn clear(&mut self, unit: &mut dyn Unit) {
        if let Some(mut generator) = self.current.take() {
            generator.finalize(unit);
        }
        self.suspended = false;
    }

    /// Kind of the active generator
    #[must_use]
    pub fn current_type(&self) -> Option<MovementGeneratorType> {
        self.current.as_ref().map(|g| g.generator_type())
    }

    /// Name of the active generator
    #[must_use]
    pub fn current_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(|g| g.name())
    }

    /// Check if a generator is held
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Check if the held generator is suspended
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        self.suspended
    }
}

impl fmt::Debug for MotionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionSlot")
            .field("current", &self.current_name())
            .field("suspended", &self.suspended)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
