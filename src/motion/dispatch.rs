//! Turns a validated path into a playback command and launches it

use glam::Vec3;

use crate::core::SwimPolicy;
use crate::unit::Unit;

use super::spline::SplineCommand;

/// Health percentage at and above which combat slowdown has no effect.
const COMBAT_SLOW_HEALTH: f32 = 30.0;
/// Slowdown per missing health percent below [`COMBAT_SLOW_HEALTH`].
const COMBAT_SLOW_RATE: f32 = 1.67;

/// Speed multiplier for a unit slowed in combat, clamped to `[floor, 1]`.
///
/// The raw curve is `1 - (30 - min(hp, 30)) * 1.67`: exactly 1 at 30% health
/// and above, falling below zero once health drops under roughly 29.4%.
#[must_use]
pub fn combat_slow_multiplier(health_percent: f32, floor: f32) -> f32 {
    let missing = COMBAT_SLOW_HEALTH - health_percent.min(COMBAT_SLOW_HEALTH);
    let raw = 1.0 - missing * COMBAT_SLOW_RATE;
    let clamped = raw.clamp(floor, 1.0);
    if clamped != raw {
        log::warn!("combat slow multiplier {raw:.3} at {health_percent:.1}% health clamped to {clamped:.3}");
    }
    clamped
}

/// Builds and launches playback commands for one generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionDispatcher {
    /// Walk (true) or run (false)
    pub walk: bool,
    /// Treatment of swimming units
    pub swim_policy: SwimPolicy,
    /// Lowest combat slowdown multiplier
    pub combat_slow_floor: f32,
}

impl MotionDispatcher {
    /// Build the playback command for `path`
    #[must_use]
    pub fn build(&self, unit: &dyn Unit, path: Vec<Vec3>) -> SplineCommand {
        let mut command = SplineCommand::by_path(path);

        command = if self.swim_policy == SwimPolicy::ExemptSwimming && unit.is_in_water() {
            command.with_fly()
        } else {
            command.with_walk(self.walk)
        };

        if unit.is_slowed_in_combat() {
            command = command.with_combat_slowed(combat_slow_multiplier(
                unit.health_percent(),
                self.combat_slow_floor,
            ));
        }

        command.velocity = unit.speed(command.mode);
        command
    }

    /// Launch `path` on the unit's spline. Returns the playback duration.
    pub fn launch(&self, unit: &mut dyn Unit, path: Vec<Vec3>) -> u32 {
        let command = self.build(unit, path);
        unit.move_spline_mut().launch(command)
    }
}
