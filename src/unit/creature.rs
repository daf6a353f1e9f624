//! Reference unit backed by a height field, a navigation grid and a spline
//! player

use std::fmt;
use std::rc::Rc;

use glam::Vec3;

use super::model::{RespawnPoint, Unit, UnitAi};
use super::state::{UnitFlags, UnitState};
use crate::motion::{
    Grid, GridPathFinder, MoveMode, MoveSpline, PathFinder, SplinePlayer, TerrainQuery,
};

/// Default walking speed (units per second)
pub const DEFAULT_WALK_SPEED: f32 = 2.5;
/// Default running speed (units per second)
pub const DEFAULT_RUN_SPEED: f32 = 7.0;
/// Default flying and swimming speed (units per second)
pub const DEFAULT_FLY_SPEED: f32 = 4.7;

/// Counts the AI notifications a creature received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreatureAi {
    /// Number of timed flee endings reported
    pub fleeing_ended: u32,
}

impl UnitAi for CreatureAi {
    fn timed_fleeing_ended(&mut self) {
        self.fleeing_ended += 1;
    }
}

/// Movement speeds per mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speeds {
    /// Walking speed
    pub walk: f32,
    /// Running speed
    pub run: f32,
    /// Flying and swimming speed
    pub fly: f32,
}

impl Default for Speeds {
    fn default() -> Self {
        Self {
            walk: DEFAULT_WALK_SPEED,
            run: DEFAULT_RUN_SPEED,
            fly: DEFAULT_FLY_SPEED,
        }
    }
}

/// A simple creature living on a height field.
pub struct Creature {
    /// Display name
    pub name: String,
    position: Vec3,
    alive: bool,
    states: UnitState,
    flags: UnitFlags,
    health_percent: f32,
    slowed_in_combat: bool,
    can_fly: bool,
    in_water: bool,
    speeds: Speeds,
    walking: bool,
    /// `Some(enabled)` when a client owns this unit
    client: Option<bool>,
    ai: Option<CreatureAi>,
    target: Option<u64>,
    in_melee: bool,
    respawn: Option<RespawnPoint>,
    spline: SplinePlayer,
    terrain: Rc<dyn TerrainQuery>,
    grid: Rc<Grid>,
}

impl Creature {
    /// Create a living creature at `position`
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        position: Vec3,
        terrain: Rc<dyn TerrainQuery>,
        grid: Rc<Grid>,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            alive: true,
            states: UnitState::empty(),
            flags: UnitFlags::empty(),
            health_percent: 100.0,
            slowed_in_combat: false,
            can_fly: false,
            in_water: false,
            speeds: Speeds::default(),
            walking: true,
            client: None,
            ai: None,
            target: None,
            in_melee: false,
            respawn: None,
            spline: SplinePlayer::new(),
            terrain,
            grid,
        }
    }

    /// Give the creature AI
    #[must_use]
    pub fn with_ai(mut self) -> Self {
        self.ai = Some(CreatureAi::default());
        self
    }

    /// Hand the creature to a controlling client
    #[must_use]
    pub fn with_client(mut self) -> Self {
        self.client = Some(true);
        self.flags |= UnitFlags::PLAYER_CONTROLLED;
        self
    }

    /// Set respawn data
    #[must_use]
    pub fn with_respawn(mut self, respawn: RespawnPoint) -> Self {
        self.respawn = Some(respawn);
        self
    }

    /// Allow or forbid flying
    #[must_use]
    pub fn with_can_fly(mut self, can_fly: bool) -> Self {
        self.can_fly = can_fly;
        self
    }

    /// Put the creature in water
    #[must_use]
    pub fn with_in_water(mut self, in_water: bool) -> Self {
        self.in_water = in_water;
        self
    }

    /// Override movement speeds
    #[must_use]
    pub fn with_speeds(mut self, speeds: Speeds) -> Self {
        self.speeds = speeds;
        self
    }

    /// Advance spline playback and follow it
    pub fn tick(&mut self, diff: u32) {
        if self.spline.is_finalized() {
            return;
        }
        self.spline.update(diff);
        if let Some(position) = self.spline.position() {
            self.position = position;
        }
    }

    /// Teleport the creature
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Kill or revive the creature
    pub fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
        if alive {
            self.states.remove(UnitState::DIED);
        } else {
            self.states.insert(UnitState::DIED);
        }
    }

    /// Set health in percent
    pub fn set_health_percent(&mut self, health: f32) {
        self.health_percent = health.clamp(0.0, 100.0);
    }

    /// Toggle combat slowdown
    pub fn set_slowed_in_combat(&mut self, slowed: bool) {
        self.slowed_in_combat = slowed;
    }

    /// Set persistent flags
    pub fn add_flag(&mut self, flag: UnitFlags) {
        self.flags |= flag;
    }

    /// Pick a target
    pub fn set_target(&mut self, target: Option<u64>) {
        self.target = target;
    }

    /// Engage in melee
    pub fn start_melee(&mut self) {
        self.in_melee = true;
    }

    /// Current target
    #[must_use]
    pub const fn target(&self) -> Option<u64> {
        self.target
    }

    /// Whether the creature is fighting in melee
    #[must_use]
    pub const fn in_melee(&self) -> bool {
        self.in_melee
    }

    /// Whether the creature walks rather than runs
    #[must_use]
    pub const fn is_walking(&self) -> bool {
        self.walking
    }

    /// Client control state, `None` without a client
    #[must_use]
    pub const fn client_control(&self) -> Option<bool> {
        self.client
    }

    /// AI notification counters
    #[must_use]
    pub const fn ai(&self) -> Option<&CreatureAi> {
        self.ai.as_ref()
    }

    /// Spline playback
    #[must_use]
    pub const fn spline(&self) -> &SplinePlayer {
        &self.spline
    }
}

impl Unit for Creature {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn states(&self) -> UnitState {
        self.states
    }

    fn add_state(&mut self, state: UnitState) {
        self.states.insert(state);
    }

    fn clear_state(&mut self, state: UnitState) {
        self.states.remove(state);
    }

    fn flags(&self) -> UnitFlags {
        self.flags
    }

    fn remove_flag(&mut self, flag: UnitFlags) {
        self.flags.remove(flag);
    }

    fn is_client_controlled(&self) -> bool {
        self.client == Some(true)
    }

    fn has_controlling_client(&self) -> bool {
        self.client.is_some()
    }

    fn set_client_control(&mut self, enabled: bool) {
        if let Some(control) = self.client.as_mut() {
            *control = enabled;
        }
    }

    fn has_ai(&self) -> bool {
        self.ai.is_some()
    }

    fn ai_mut(&mut self) -> Option<&mut dyn UnitAi> {
        self.ai.as_mut().map(|ai| ai as &mut dyn UnitAi)
    }

    fn clear_target(&mut self) {
        self.target = None;
    }

    fn melee_attack_stop(&mut self) {
        self.in_melee = false;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn health_percent(&self) -> f32 {
        self.health_percent
    }

    fn is_slowed_in_combat(&self) -> bool {
        self.slowed_in_combat
    }

    fn can_fly(&self) -> bool {
        self.can_fly
    }

    fn is_in_water(&self) -> bool {
        self.in_water
    }

    fn speed(&self, mode: MoveMode) -> f32 {
        match mode {
            MoveMode::Walk => self.speeds.walk,
            MoveMode::Run => self.speeds.run,
            MoveMode::Fly => self.speeds.fly,
        }
    }

    fn is_creature(&self) -> bool {
        true
    }

    fn set_walk(&mut self, walk: bool) {
        self.walking = walk;
    }

    fn respawn_point(&self) -> Option<RespawnPoint> {
        self.respawn
    }

    fn terrain(&self) -> &dyn TerrainQuery {
        self.terrain.as_ref()
    }

    fn move_spline(&self) -> &dyn MoveSpline {
        &self.spline
    }

    fn move_spline_mut(&mut self) -> &mut dyn MoveSpline {
        &mut self.spline
    }

    fn create_path_finder(&self) -> Box<dyn PathFinder> {
        Box::new(GridPathFinder::new(Rc::clone(&self.grid)))
    }
}

impl fmt::Debug for Creature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Creature")
            .field("name", &self.name)
            .field("position", &self.position)
            .field("alive", &self.alive)
            .field("states", &self.states)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
