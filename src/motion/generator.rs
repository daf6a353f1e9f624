//! Timer-gated random replanning
//!
//! [`RandomMovementGenerator`] runs the loop shared by every variant: wait for
//! the current path to finish, count down the replan timer, then ask the
//! pathfinder for a random destination, correct it against the terrain and
//! launch it. Variant behaviour comes from [`MovementKind`].
//!
//! # Example
//!
//! ```ignore
//! let mut wander = RandomMovementGenerator::wander(spawn, 8.0, &config);
//! wander.initialize(&mut creature);
//! while wander.update(&mut creature, diff) {
//!     creature.tick(diff);
//! }
//! wander.finalize(&mut creature);
//! ```

use std::fmt;

use glam::Vec3;
use log::{debug, trace};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::{CountdownTimer, MotionConfig, MotionStats, MotionTuning, SwimPolicy};
use crate::unit::{Unit, UnitFlags, UnitState};

use super::dispatch::MotionDispatcher;
use super::path::{PathFinder, PathRejection, PathRequest};
use super::policy::{MovementGeneratorType, MovementKind, RandomMovementPolicy};
use super::terrain::TerrainCorrector;

/// A movement mode driven by the scheduler once per tick.
///
/// The lifecycle is:
///
/// 1. `initialize()` - once, when the mode becomes active
/// 2. `update()` - every tick; returning false asks for removal
/// 3. `interrupt()` / `reset()` - suspension and resumption
/// 4. `finalize()` - once, when the mode is removed for good
pub trait MovementGenerator: fmt::Debug {
    /// Name for debugging and logging
    fn name(&self) -> &'static str;

    /// Kind reported to schedulers
    fn generator_type(&self) -> MovementGeneratorType;

    /// Take over the unit's movement
    fn initialize(&mut self, unit: &mut dyn Unit);

    /// Release the unit's movement permanently
    fn finalize(&mut self, unit: &mut dyn Unit);

    /// Halt movement but keep state for a later resume
    fn interrupt(&mut self, unit: &mut dyn Unit);

    /// Resume after a suspension
    fn reset(&mut self, unit: &mut dyn Unit);

    /// Advance by `diff` milliseconds. Returns false to request removal.
    fn update(&mut self, unit: &mut dyn Unit, diff: u32) -> bool;
}

/// Random destination picking around an anchor.
pub struct RandomMovementGenerator {
    kind: MovementKind,
    /// Reference position destinations are searched around
    anchor: Vec3,
    /// Current search radius
    radius: f32,
    tuning: MotionTuning,
    next_move_timer: CountdownTimer,
    /// Moves left in the current burst
    next_move_count: u32,
    /// Created on initialize, dropped on finalize
    path_finder: Option<Box<dyn PathFinder>>,
    corrector: TerrainCorrector,
    dispatcher: MotionDispatcher,
    rng: Box<dyn RngCore>,
    stats: MotionStats,
}

impl RandomMovementGenerator {
    /// Create a generator of any kind around `anchor`
    #[must_use]
    pub fn new(kind: MovementKind, anchor: Vec3, tuning: MotionTuning, config: &MotionConfig) -> Self {
        Self {
            kind,
            anchor,
            radius: tuning.anchor_radius,
            corrector: TerrainCorrector::new(&tuning, config.swim_policy),
            dispatcher: MotionDispatcher {
                walk: tuning.walk,
                swim_policy: config.swim_policy,
                combat_slow_floor: config.combat_slow_floor,
            },
            tuning,
            next_move_timer: CountdownTimer::default(),
            next_move_count: 1,
            path_finder: None,
            rng: Box::new(ChaCha8Rng::seed_from_u64(config.rng_seed)),
            stats: MotionStats::new(),
        }
    }

    /// Confused steps around `position`
    #[must_use]
    pub fn confused(position: Vec3, config: &MotionConfig) -> Self {
        Self::new(MovementKind::Confused, position, config.confused.clone(), config)
    }

    /// Confused steps around the unit's current position
    #[must_use]
    pub fn confused_for(unit: &dyn Unit, config: &MotionConfig) -> Self {
        Self::confused(unit.position(), config)
    }

    /// Roaming within `radius` of `anchor`
    #[must_use]
    pub fn wander(anchor: Vec3, radius: f32, config: &MotionConfig) -> Self {
        let tuning = config.wander.clone().with_radius(radius);
        Self::new(MovementKind::Wander, anchor, tuning, config)
    }

    /// Roaming around the unit's respawn point.
    ///
    /// Units without respawn data roam around their current position with
    /// the configured radius.
    #[must_use]
    pub fn wander_from_respawn(unit: &dyn Unit, config: &MotionConfig) -> Self {
        match unit.respawn_point() {
            Some(respawn) => Self::wander(respawn.position, respawn.wander_radius, config),
            None => Self::wander(unit.position(), config.wander.anchor_radius, config),
        }
    }

    /// Roaming around the unit's current position for `duration` ms
    #[must_use]
    pub fn timed_wander(unit: &dyn Unit, duration: u32, radius: f32, config: &MotionConfig) -> Self {
        let tuning = config.wander.clone().with_radius(radius);
        let kind = MovementKind::TimedWander {
            duration: CountdownTimer::new(clamp_ms(duration)),
        };
        Self::new(kind, unit.position(), tuning, config)
    }

    /// Running away from a threat at `threat`
    #[must_use]
    pub fn fleeing(threat: Vec3, config: &MotionConfig) -> Self {
        Self::new(MovementKind::Fleeing, threat, config.fleeing.clone(), config)
    }

    /// Running away from `threat` for `duration` ms
    #[must_use]
    pub fn panic(threat: Vec3, duration: u32, config: &MotionConfig) -> Self {
        let kind = MovementKind::Panic {
            fleeing: CountdownTimer::new(clamp_ms(duration)),
        };
        Self::new(kind, threat, config.fleeing.clone(), config)
    }

    /// Draw from `rng` instead of the configured seed
    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Reseed the random source
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Override the swim policy
    #[must_use]
    pub fn with_swim_policy(mut self, policy: SwimPolicy) -> Self {
        self.corrector.swim_policy = policy;
        self.dispatcher.swim_policy = policy;
        self
    }

    /// Variant of this generator
    #[must_use]
    pub const fn kind(&self) -> &MovementKind {
        &self.kind
    }

    /// Anchor of the destination search
    #[must_use]
    pub const fn anchor(&self) -> Vec3 {
        self.anchor
    }

    /// Search radius used by the last replan
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Replan timer
    #[must_use]
    pub const fn next_move_timer(&self) -> &CountdownTimer {
        &self.next_move_timer
    }

    /// Moves left in the current burst
    #[must_use]
    pub const fn next_move_count(&self) -> u32 {
        self.next_move_count
    }

    /// Replanning statistics
    #[must_use]
    pub const fn stats(&self) -> &MotionStats {
        &self.stats
    }

    /// Whether a pathfinder is currently allocated
    #[must_use]
    pub fn has_path_finder(&self) -> bool {
        self.path_finder.is_some()
    }

    /// Lengthen or replace the pause before the next roaming move.
    ///
    /// With `force` the timer is reset to `delta`. Otherwise an unexpired
    /// timer is extended by `delta` but never below 1 ms, so the next
    /// decision still happens on a later tick. Returns false for variants
    /// that do not roam.
    pub fn add_to_random_pause_time(&mut self, delta: i32, force: bool) -> bool {
        if !self.kind.is_wander() {
            return false;
        }

        if force {
            self.next_move_timer.reset(delta);
        } else if !self.next_move_timer.passed() {
            let extended = self.next_move_timer.expiry().saturating_add(delta);
            self.next_move_timer.reset(extended.max(1));
        }
        true
    }

    /// Pick and launch the next destination.
    ///
    /// Returns the playback duration in milliseconds, 0 when no acceptable
    /// path was found.
    pub fn set_location(&mut self, unit: &mut dyn Unit) -> u32 {
        self.radius = self
            .kind
            .select_radius(unit, self.anchor, self.radius, &mut *self.rng);
        self.stats.record_attempt();

        let path = match self.plan_path(unit) {
            Ok(path) => path,
            Err(rejection) => {
                if rejection.is_terrain() {
                    debug!("{}: path rejected: {rejection}", self.kind.name());
                    self.stats.record_bad_slope();
                } else {
                    trace!("{}: {rejection}", self.kind.name());
                    self.stats.record_no_path();
                }
                return 0;
            }
        };

        let duration = self.dispatcher.launch(unit, path);
        if duration > 0 {
            unit.add_state(self.kind.motion_state());
            self.stats.record_success(duration);
        } else {
            self.stats.record_empty_launch();
        }
        trace!("{}: launched path for {duration}ms", self.kind.name());
        duration
    }

    fn plan_path(&mut self, unit: &dyn Unit) -> Result<Vec<Vec3>, PathRejection> {
        let request = PathRequest {
            start: unit.position(),
            center: self.anchor,
            radius: self.radius,
            length_cap: self.tuning.path_length_cap,
        };

        let finder = self
            .path_finder
            .get_or_insert_with(|| unit.create_path_finder());
        let mut path = request.execute(finder.as_mut(), &mut *self.rng)?;

        self.corrector.apply(unit, &mut path)?;
        Ok(path)
    }

    /// Start the next burst: draw its length and the pause before it.
    fn start_burst(&mut self) {
        let (min, max) = (self.tuning.replan_delay_min, self.tuning.replan_delay_max);
        self.next_move_count = self.rng.gen_range(1..=self.tuning.burst_count.max(1));
        let delay = self.rng.gen_range(min.min(max)..=max.max(min));
        self.next_move_timer.reset(clamp_ms(delay));
        self.stats.record_delay_drawn();
    }

    fn retry_delay(&self, unit: &dyn Unit) -> u32 {
        if unit.has_flag(UnitFlags::PLAYER_CONTROLLED) {
            self.tuning.retry_delay_player
        } else {
            self.tuning.retry_delay_npc
        }
    }

    /// Stop whatever the unit is playing, hard if a client drives it
    fn halt_playback(unit: &mut dyn Unit, client_controlled: bool) {
        if unit.move_spline().is_finalized() {
            return;
        }
        if client_controlled {
            unit.move_spline_mut().stop();
        } else {
            unit.move_spline_mut().interrupt();
        }
    }
}

impl MovementGenerator for RandomMovementGenerator {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn generator_type(&self) -> MovementGeneratorType {
        self.kind.generator_type()
    }

    fn initialize(&mut self, unit: &mut dyn Unit) {
        debug!("{}: initialize at {:?} radius {}", self.name(), self.anchor, self.radius);
        self.kind.on_enter(unit);
        unit.add_state(self.kind.active_state());

        self.path_finder = Some(unit.create_path_finder());

        // Sampled before control is revoked below
        let client_controlled = unit.is_client_controlled();
        if unit.has_controlling_client() {
            unit.set_client_control(false);
        } else if unit.has_ai() {
            unit.clear_target();
            unit.melee_attack_stop();
        }

        Self::halt_playback(unit, client_controlled);
    }

    fn finalize(&mut self, unit: &mut dyn Unit) {
        debug!("{}: finalize ({})", self.name(), self.stats.format_stats());
        unit.clear_state(self.kind.active_state() | self.kind.motion_state());

        if unit.has_controlling_client() {
            unit.set_client_control(true);
        }

        let client_controlled = unit.is_client_controlled();
        Self::halt_playback(unit, client_controlled);
        self.path_finder = None;

        self.kind.on_exit(unit);
    }

    fn interrupt(&mut self, unit: &mut dyn Unit) {
        debug!("{}: interrupt", self.name());
        unit.move_spline_mut().interrupt();
        unit.clear_state(self.kind.motion_state());

        self.kind.on_interrupt(unit);
    }

    fn reset(&mut self, unit: &mut dyn Unit) {
        debug!("{}: reset", self.name());
        self.next_move_timer.reset(0);
        self.initialize(unit);
    }

    fn update(&mut self, unit: &mut dyn Unit, diff: u32) -> bool {
        if !self.kind.tick(diff) {
            debug!("{}: duration elapsed", self.name());
            return false;
        }

        if !unit.is_alive() {
            return false;
        }

        let motion = self.kind.motion_state();
        let blockers = UnitState::NO_FREE_MOVE.difference(self.kind.active_state());
        if unit.has_state(blockers) {
            self.next_move_timer.update(diff);
            unit.clear_state(motion);
            return true;
        }

        if unit.move_spline().is_finalized() {
            unit.clear_state(motion);
            self.next_move_timer.update(diff);

            if self.next_move_timer.passed() {
                if self.set_location(unit) > 0 {
                    if self.next_move_count > 1 {
                        self.next_move_count -= 1;
                    } else {
                        self.start_burst();
                    }
                } else {
                    let retry = self.retry_delay(unit);
                    self.next_move_timer.reset(clamp_ms(retry));
                }
            }
        }

        true
    }
}

impl fmt::Debug for RandomMovementGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomMovementGenerator")
            .field("kind", &self.kind)
            .field("anchor", &self.anchor)
            .field("radius", &self.radius)
            .field("next_move_timer", &self.next_move_timer)
            .field("next_move_count", &self.next_move_count)
            .field("has_path_finder", &self.path_finder.is_some())
            .finish_non_exhaustive()
    }
}

fn clamp_ms(ms: u32) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SwimPolicy;
    use crate::motion::{Grid, HeightField, MoveSpline, SplineCommand};
    use crate::unit::{Creature, RespawnPoint};
    use std::rc::Rc;

    const TICK: u32 = 100;

    fn flat_creature(position: Vec3) -> Creature {
        Creature::new(
            "test",
            position,
            Rc::new(HeightField::flat(0.0)),
            Rc::new(Grid::new(100, 100, 1.0)),
        )
        .with_ai()
    }

    fn center() -> Vec3 {
        Vec3::new(50.0, 50.0, 0.0)
    }

    /// Run `update` until the unit has a path in flight
    fn run_until_moving(generator: &mut RandomMovementGenerator, unit: &mut Creature) {
        for _ in 0..200 {
            assert!(generator.update(unit, TICK));
            if !unit.move_spline().is_finalized() {
                return;
            }
            unit.tick(TICK);
        }
        panic!("generator never launched a path");
    }

    /// Let the current path finish playing
    fn finish_path(unit: &mut Creature) {
        while !unit.move_spline().is_finalized() {
            unit.tick(TICK);
        }
    }

    #[test]
    fn test_initialize_takes_over_ai_unit() {
        let mut unit = flat_creature(center());
        unit.set_target(Some(7));
        unit.start_melee();
        let mut generator = RandomMovementGenerator::confused_for(&unit, &MotionConfig::default());

        generator.initialize(&mut unit);

        assert!(unit.has_state(UnitState::CONFUSED));
        assert_eq!(unit.target(), None);
        assert!(!unit.in_melee());
        assert!(generator.has_path_finder());
    }

    #[test]
    fn test_initialize_revokes_client_control_and_finalize_restores() {
        let mut unit = flat_creature(center()).with_client();
        let mut generator = RandomMovementGenerator::confused_for(&unit, &MotionConfig::default());

        generator.initialize(&mut unit);
        assert_eq!(unit.client_control(), Some(false));

        generator.finalize(&mut unit);
        assert_eq!(unit.client_control(), Some(true));
        assert!(!generator.has_path_finder());
    }

    #[test]
    fn test_initialize_halts_previous_path_softly() {
        let mut unit = flat_creature(center());
        let mut command = SplineCommand::by_path(vec![center(), center() + Vec3::X * 10.0]);
        command.velocity = 1.0;
        unit.move_spline_mut().launch(command);

        let mut generator = RandomMovementGenerator::confused_for(&unit, &MotionConfig::default());
        generator.initialize(&mut unit);

        assert!(!unit.move_spline().is_finalized(), "soft interrupt decelerates");
        unit.tick(crate::motion::SOFT_STOP_MS);
        assert!(unit.move_spline().is_finalized());
    }

    #[test]
    fn test_client_controlled_unit_is_hard_stopped() {
        let mut unit = flat_creature(center()).with_client();
        let mut command = SplineCommand::by_path(vec![center(), center() + Vec3::X * 10.0]);
        command.velocity = 1.0;
        unit.move_spline_mut().launch(command);

        let mut generator = RandomMovementGenerator::wander(center(), 5.0, &MotionConfig::default());
        generator.finalize(&mut unit);

        assert!(unit.move_spline().is_finalized());
    }

    #[test]
    fn test_initialize_hard_stops_client_controlled_unit() {
        let mut unit = flat_creature(center()).with_client();
        let mut command = SplineCommand::by_path(vec![center(), center() + Vec3::X * 10.0]);
        command.velocity = 1.0;
        unit.move_spline_mut().launch(command);

        let mut generator = RandomMovementGenerator::confused_for(&unit, &MotionConfig::default());
        generator.initialize(&mut unit);

        assert!(unit.move_spline().is_finalized());
        assert_eq!(unit.client_control(), Some(false));
    }

    #[test]
    fn test_first_update_launches_and_sets_motion_bit() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        generator.initialize(&mut unit);

        assert!(generator.update(&mut unit, TICK));

        assert!(!unit.move_spline().is_finalized());
        assert!(unit.has_state(UnitState::ROAMING_MOVE));
        assert_eq!(generator.stats().successes(), 1);
    }

    #[test]
    fn test_motion_bit_cleared_when_path_finishes() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        generator.initialize(&mut unit);
        run_until_moving(&mut generator, &mut unit);

        unit.move_spline_mut().stop();
        assert!(generator.update(&mut unit, 1));

        assert!(!generator.next_move_timer().passed());
        assert!(!unit.has_state(UnitState::ROAMING_MOVE));
        assert!(unit.has_state(UnitState::ROAMING));
    }

    #[test]
    fn test_dead_unit_requests_removal() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        generator.initialize(&mut unit);

        unit.set_alive(false);
        assert!(!generator.update(&mut unit, TICK));
    }

    #[test]
    fn test_blocked_unit_never_replans() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        generator.initialize(&mut unit);
        unit.add_state(UnitState::ROOT | UnitState::ROAMING_MOVE);

        for _ in 0..100 {
            assert!(generator.update(&mut unit, TICK));
            assert!(!unit.has_state(UnitState::ROAMING_MOVE));
        }

        assert_eq!(generator.stats().attempts(), 0);
        assert!(unit.move_spline().is_finalized());
        assert!(generator.next_move_timer().passed());
    }

    #[test]
    fn test_own_active_bit_does_not_block() {
        // CONFUSED is a no-free-move state, but it is this generator's own marker
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::confused_for(&unit, &MotionConfig::default());
        generator.initialize(&mut unit);

        generator.update(&mut unit, TICK);

        assert_eq!(generator.stats().attempts(), 1);
    }

    #[test]
    fn test_confused_stays_near_activation_point() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::confused_for(&unit, &MotionConfig::default());
        generator.initialize(&mut unit);

        for _ in 0..20 {
            run_until_moving(&mut generator, &mut unit);
            let end = *unit.spline().path().last().unwrap();
            assert!(end.truncate().distance(center().truncate()) <= 2.5 + 1e-4);
            finish_path(&mut unit);
        }
        assert_eq!(generator.anchor(), center());
    }

    #[test]
    fn test_failed_replan_retries_quickly() {
        let mut blocked = Grid::new(100, 100, 1.0);
        for y in 0..100 {
            for x in 0..100 {
                blocked.set_walkable(x, y, false);
            }
        }
        let mut unit = Creature::new(
            "stuck",
            center(),
            Rc::new(HeightField::flat(0.0)),
            Rc::new(blocked),
        );
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        generator.initialize(&mut unit);

        generator.update(&mut unit, TICK);
        assert_eq!(generator.stats().no_path(), 1);
        assert_eq!(generator.next_move_timer().expiry(), 500);

        unit.add_flag(UnitFlags::PLAYER_CONTROLLED);
        generator.update(&mut unit, 500);
        assert_eq!(generator.next_move_timer().expiry(), 100);
        assert_eq!(generator.stats().attempts(), 2);
    }

    #[test]
    fn test_one_attempt_per_expired_update() {
        let mut blocked = Grid::new(10, 10, 1.0);
        blocked.set_walkable(5, 5, false);
        let mut unit = Creature::new(
            "walled",
            Vec3::new(5.5, 5.5, 0.0),
            Rc::new(HeightField::flat(0.0)),
            Rc::new(blocked),
        );
        let mut generator =
            RandomMovementGenerator::wander(unit.position(), 3.0, &MotionConfig::default());
        generator.initialize(&mut unit);

        for expected in 1..=5 {
            generator.update(&mut unit, 500);
            assert_eq!(generator.stats().attempts(), expected);
        }
    }

    #[test]
    fn test_steep_terrain_rejected_unless_flying() {
        let cliff = Rc::new(HeightField::from_fn(100, 100, 1.0, |x, _| x * 5.0));
        let grid = Rc::new(Grid::new(100, 100, 1.0));
        let start = Vec3::new(50.5, 50.5, 252.5);

        let mut walker = Creature::new("walker", start, cliff.clone(), grid.clone());
        let mut generator = RandomMovementGenerator::wander(start, 10.0, &MotionConfig::default());
        generator.initialize(&mut walker);
        for _ in 0..20 {
            generator.set_location(&mut walker);
        }
        assert_eq!(generator.stats().successes(), generator.stats().attempts() - generator.stats().bad_slope());
        assert!(generator.stats().bad_slope() > 0);

        let mut flyer = Creature::new("flyer", start, cliff, grid).with_can_fly(true);
        let mut generator = RandomMovementGenerator::wander(start, 10.0, &MotionConfig::default());
        generator.initialize(&mut flyer);
        for _ in 0..20 {
            generator.set_location(&mut flyer);
        }
        assert_eq!(generator.stats().bad_slope(), 0);
    }

    #[test]
    fn test_launched_paths_respect_slope_rules() {
        let hills = Rc::new(HeightField::from_fn(100, 100, 1.0, |x, y| {
            ((x * 0.7).sin() + (y * 0.3).cos()) * 1.2
        }));
        let grid = Rc::new(Grid::new(100, 100, 1.0));
        let mut unit = Creature::new("hiker", center(), hills, grid);
        let mut generator = RandomMovementGenerator::wander(center(), 12.0, &MotionConfig::default());
        generator.initialize(&mut unit);
        let corrector = TerrainCorrector::new(&MotionTuning::wander(), SwimPolicy::AlwaysGroundSnap);

        for _ in 0..50 {
            if generator.set_location(&mut unit) > 0 {
                assert!(corrector.validate_slopes(unit.spline().path()).is_ok());
                finish_path(&mut unit);
            }
        }
        assert!(generator.stats().successes() > 0);
    }

    #[test]
    fn test_burst_draws_delay_at_most_every_count_max() {
        let mut unit = flat_creature(center());
        let config = MotionConfig::default();
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &config);
        generator.initialize(&mut unit);

        let mut since_last_draw = 0;
        let mut draws = generator.stats().delays_drawn();
        for _ in 0..30 {
            run_until_moving(&mut generator, &mut unit);
            since_last_draw += 1;
            if generator.stats().delays_drawn() > draws {
                assert_eq!(generator.stats().delays_drawn(), draws + 1);
                assert!(since_last_draw <= config.wander.burst_count);
                draws = generator.stats().delays_drawn();
                since_last_draw = 0;
                let expiry = generator.next_move_timer().expiry();
                assert!((3000..=10000).contains(&expiry));
            }
            finish_path(&mut unit);
        }
        assert!(draws >= 30 / u64::from(config.wander.burst_count));
    }

    #[test]
    fn test_single_burst_draws_every_success() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::confused_for(&unit, &MotionConfig::default());
        generator.initialize(&mut unit);

        for _ in 0..10 {
            run_until_moving(&mut generator, &mut unit);
            finish_path(&mut unit);
        }
        assert_eq!(generator.stats().delays_drawn(), generator.stats().successes());
    }

    #[test]
    fn test_interrupt_keeps_active_bit_and_resumes() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        generator.initialize(&mut unit);
        run_until_moving(&mut generator, &mut unit);

        generator.interrupt(&mut unit);
        assert!(unit.has_state(UnitState::ROAMING));
        assert!(!unit.has_state(UnitState::ROAMING_MOVE));

        finish_path(&mut unit);
        let successes = generator.stats().successes();
        run_until_moving(&mut generator, &mut unit);
        assert_eq!(generator.stats().successes(), successes + 1);
        assert!(unit.has_state(UnitState::ROAMING_MOVE));
    }

    #[test]
    fn test_reset_forces_immediate_replan() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::confused_for(&unit, &MotionConfig::default());
        generator.initialize(&mut unit);
        run_until_moving(&mut generator, &mut unit);
        generator.interrupt(&mut unit);
        finish_path(&mut unit);
        assert!(!generator.next_move_timer().passed());

        generator.reset(&mut unit);
        assert!(generator.next_move_timer().passed());
        assert!(unit.has_state(UnitState::CONFUSED));

        let attempts = generator.stats().attempts();
        generator.update(&mut unit, 1);
        assert_eq!(generator.stats().attempts(), attempts + 1);
    }

    #[test]
    fn test_finalize_clears_both_bits() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        generator.initialize(&mut unit);
        run_until_moving(&mut generator, &mut unit);

        generator.finalize(&mut unit);

        assert!(!unit.has_state(UnitState::ROAMING | UnitState::ROAMING_MOVE));
    }

    #[test]
    fn test_wander_restores_gait() {
        let mut unit = flat_creature(center());
        unit.set_walk(false);
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        generator.initialize(&mut unit);

        generator.interrupt(&mut unit);
        assert!(unit.is_walking(), "no running preference means walk");

        unit.add_state(UnitState::RUNNING);
        generator.finalize(&mut unit);
        assert!(!unit.is_walking());
    }

    #[test]
    fn test_wander_from_respawn_uses_respawn_data() {
        let respawn = RespawnPoint {
            position: Vec3::new(40.0, 40.0, 0.0),
            wander_radius: 6.0,
        };
        let unit = flat_creature(center()).with_respawn(respawn);

        let generator = RandomMovementGenerator::wander_from_respawn(&unit, &MotionConfig::default());

        assert_eq!(generator.anchor(), respawn.position);
        assert_eq!(generator.radius(), 6.0);
    }

    #[test]
    fn test_pause_time_never_expires_unforced() {
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        generator.next_move_timer.reset(400);

        assert!(generator.add_to_random_pause_time(-1_000_000, false));
        assert_eq!(generator.next_move_timer().expiry(), 1);
        assert!(!generator.next_move_timer().passed());

        assert!(generator.add_to_random_pause_time(i32::MIN, false));
        assert_eq!(generator.next_move_timer().expiry(), 1);

        assert!(generator.add_to_random_pause_time(250, false));
        assert_eq!(generator.next_move_timer().expiry(), 251);
    }

    #[test]
    fn test_pause_time_ignored_once_expired_unless_forced() {
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &MotionConfig::default());
        assert!(generator.next_move_timer().passed());

        generator.add_to_random_pause_time(5000, false);
        assert!(generator.next_move_timer().passed());

        generator.add_to_random_pause_time(5000, true);
        assert_eq!(generator.next_move_timer().expiry(), 5000);
    }

    #[test]
    fn test_pause_time_only_for_wander() {
        let mut generator = RandomMovementGenerator::fleeing(center(), &MotionConfig::default());
        assert!(!generator.add_to_random_pause_time(100, true));
        assert!(generator.next_move_timer().passed());
    }

    #[test]
    fn test_timed_wander_ends_mid_burst() {
        let mut unit = flat_creature(center());
        let mut generator =
            RandomMovementGenerator::timed_wander(&unit, 1000, 8.0, &MotionConfig::default());
        generator.initialize(&mut unit);

        assert!(generator.update(&mut unit, 600));
        assert!(!unit.move_spline().is_finalized());

        assert!(!generator.update(&mut unit, 400));
    }

    #[test]
    fn test_fleeing_runs_capped_paths() {
        let threat = center();
        let mut unit = flat_creature(center() + Vec3::new(2.0, 0.0, 0.0));
        let config = MotionConfig::default();
        let mut generator = RandomMovementGenerator::fleeing(threat, &config);
        generator.initialize(&mut unit);

        run_until_moving(&mut generator, &mut unit);

        let path = unit.spline().path();
        assert!(crate::motion::path_length(path) <= 30.0 + 1e-3);
        assert!(generator.radius() >= 0.4 * 26.0 - 1e-3 && generator.radius() <= 1.3 * 26.0 + 1e-3);
        assert!(unit.has_state(UnitState::FLEEING | UnitState::FLEEING_MOVE));
    }

    #[test]
    fn test_panic_finalize_clears_flag_and_notifies_once() {
        let mut unit = flat_creature(center());
        unit.add_flag(UnitFlags::FLEEING);
        let mut generator = RandomMovementGenerator::panic(center(), 5000, &MotionConfig::default());

        generator.initialize(&mut unit);
        assert!(unit.has_state(UnitState::PANIC | UnitState::FLEEING));

        generator.finalize(&mut unit);

        assert!(!unit.has_flag(UnitFlags::FLEEING));
        assert!(!unit.has_state(UnitState::PANIC));
        assert!(!unit.has_state(UnitState::FLEEING));
        assert_eq!(unit.ai().unwrap().fleeing_ended, 1);
    }

    #[test]
    fn test_panic_interrupt_notifies_ai() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::panic(center(), 5000, &MotionConfig::default());
        generator.initialize(&mut unit);

        generator.interrupt(&mut unit);

        assert_eq!(unit.ai().unwrap().fleeing_ended, 1);
        assert!(unit.has_state(UnitState::PANIC));
    }

    #[test]
    fn test_panic_expires() {
        let mut unit = flat_creature(center());
        let mut generator = RandomMovementGenerator::panic(center(), 300, &MotionConfig::default());
        generator.initialize(&mut unit);

        assert!(generator.update(&mut unit, 200));
        assert!(!generator.update(&mut unit, 100));
    }

    #[test]
    fn test_combat_slowed_unit_moves_slower() {
        let config = MotionConfig::default();

        let mut healthy = flat_creature(center());
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &config).with_seed(3);
        generator.initialize(&mut healthy);
        let normal = generator.set_location(&mut healthy);

        let mut hurt = flat_creature(center());
        hurt.set_health_percent(10.0);
        hurt.set_slowed_in_combat(true);
        let mut generator = RandomMovementGenerator::wander(center(), 8.0, &config).with_seed(3);
        generator.initialize(&mut hurt);
        let slowed = generator.set_location(&mut hurt);

        assert!(normal > 0);
        assert_eq!(healthy.spline().path(), hurt.spline().path());
        assert!(slowed > normal * 9, "{slowed} vs {normal}");
    }

    #[test]
    fn test_swim_policy_exempts_swimmers() {
        let lake = Rc::new(HeightField::flat(-20.0).with_water_level(0.0));
        let grid = Rc::new(Grid::new(100, 100, 1.0));
        let start = Vec3::new(50.0, 50.0, -3.0);

        let mut snapped = Creature::new("fish", start, lake.clone(), grid.clone()).with_in_water(true);
        let mut generator = RandomMovementGenerator::wander(start, 6.0, &MotionConfig::default());
        generator.initialize(&mut snapped);
        assert!(generator.set_location(&mut snapped) > 0);
        assert!(snapped.spline().path().iter().all(|p| p.z == -20.0));

        let mut swimmer = Creature::new("fish", start, lake, grid).with_in_water(true);
        let mut generator = RandomMovementGenerator::wander(start, 6.0, &MotionConfig::default())
            .with_swim_policy(SwimPolicy::ExemptSwimming);
        generator.initialize(&mut swimmer);
        assert!(generator.set_location(&mut swimmer) > 0);
        assert!(swimmer.spline().path().iter().all(|p| p.z == -0.5));
        assert_eq!(swimmer.spline().mode(), crate::motion::MoveMode::Fly);
    }

    #[test]
    fn test_same_seed_same_paths() {
        let run = |seed: u64| {
            let mut unit = flat_creature(center());
            let mut generator = RandomMovementGenerator::wander(center(), 10.0, &MotionConfig::default())
                .with_seed(seed);
            generator.initialize(&mut unit);
            let mut ends = Vec::new();
            for _ in 0..10 {
                run_until_moving(&mut generator, &mut unit);
                ends.push(*unit.spline().path().last().unwrap());
                finish_path(&mut unit);
            }
            ends
        };

        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }
}
