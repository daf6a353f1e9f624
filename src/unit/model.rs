//! The unit model consumed by motion generators
//!
//! Generators never own a unit. They query it and flip a small set of state
//! bits through this trait during each lifecycle call. Coordinates are z-up.

use glam::Vec3;

use super::state::{UnitFlags, UnitState};
use crate::motion::{MoveMode, MoveSpline, PathFinder, TerrainQuery};

/// Where a creature returns to and how far it may roam from there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RespawnPoint {
    /// Respawn coordinate
    pub position: Vec3,
    /// Roaming radius around the respawn coordinate
    pub wander_radius: f32,
}

/// AI hooks a motion generator may notify.
pub trait UnitAi {
    /// A timed flee (panic) ended, by expiry or interruption.
    fn timed_fleeing_ended(&mut self);
}

/// Entity model driven by motion generators.
pub trait Unit {
    /// Whether the unit is alive
    fn is_alive(&self) -> bool;

    /// Current transient states
    fn states(&self) -> UnitState;

    /// Set state bits
    fn add_state(&mut self, state: UnitState);

    /// Clear state bits
    fn clear_state(&mut self, state: UnitState);

    /// Whether any of the given state bits is set
    fn has_state(&self, state: UnitState) -> bool {
        self.states().intersects(state)
    }

    /// Current persistent flags
    fn flags(&self) -> UnitFlags;

    /// Clear persistent flags
    fn remove_flag(&mut self, flag: UnitFlags);

    /// Whether all of the given flags are set
    fn has_flag(&self, flag: UnitFlags) -> bool {
        self.flags().contains(flag)
    }

    /// Whether a client currently drives this unit's movement
    fn is_client_controlled(&self) -> bool;

    /// Whether a client owns this unit and can be granted or denied control
    fn has_controlling_client(&self) -> bool;

    /// Grant or revoke movement control to the owning client
    fn set_client_control(&mut self, enabled: bool);

    /// Whether the unit runs autonomous decision logic
    fn has_ai(&self) -> bool;

    /// AI hooks, if the unit has AI
    fn ai_mut(&mut self) -> Option<&mut dyn UnitAi>;

    /// Drop the current target
    fn clear_target(&mut self);

    /// Stop any melee engagement
    fn melee_attack_stop(&mut self);

    /// Current position
    fn position(&self) -> Vec3;

    /// Distance from the unit to a point
    fn distance_to(&self, point: Vec3) -> f32 {
        self.position().distance(point)
    }

    /// Health in percent (0..=100)
    fn health_percent(&self) -> f32;

    /// Whether low health slows this unit while in combat
    fn is_slowed_in_combat(&self) -> bool;

    /// Whether the unit can fly
    fn can_fly(&self) -> bool;

    /// Whether the unit is swimming
    fn is_in_water(&self) -> bool;

    /// Movement speed in units per second for a playback mode
    fn speed(&self, mode: MoveMode) -> f32;

    /// Whether this unit is a creature (walk state is restorable)
    fn is_creature(&self) -> bool;

    /// Switch a creature between walking and running
    fn set_walk(&mut self, walk: bool);

    /// Respawn data for creatures
    fn respawn_point(&self) -> Option<RespawnPoint> {
        None
    }

    /// Terrain the unit stands on
    fn terrain(&self) -> &dyn TerrainQuery;

    /// The unit's spline playback
    fn move_spline(&self) -> &dyn MoveSpline;

    /// The unit's spline playback, mutably
    fn move_spline_mut(&mut self) -> &mut dyn MoveSpline;

    /// Build a pathfinder bound to this unit
    fn create_path_finder(&self) -> Box<dyn PathFinder>;
}
