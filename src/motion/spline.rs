//! Spline playback
//!
//! A launched path is played back over time until it finishes or is halted.
//! Halting comes in two flavours: a hard stop ends playback on the spot, a
//! soft interrupt lets the unit decelerate along the path for a short window.

use glam::Vec3;

/// Length of the deceleration window after a soft interrupt (ms).
pub const SOFT_STOP_MS: u32 = 200;

/// Locomotion mode of a playback command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveMode {
    /// Walking pace
    #[default]
    Walk,
    /// Running pace
    Run,
    /// Flying or swimming
    Fly,
}

/// A path ready to be launched.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineCommand {
    /// Waypoints, the first being the unit's position
    pub path: Vec<Vec3>,
    /// Locomotion mode
    pub mode: MoveMode,
    /// Speed multiplier applied on top of the mode's speed
    pub speed_multiplier: f32,
    /// Speed in units per second, filled in by the dispatcher
    pub velocity: f32,
}

impl SplineCommand {
    /// Create a walking command along `path`
    #[must_use]
    pub fn by_path(path: Vec<Vec3>) -> Self {
        Self {
            path,
            mode: MoveMode::Walk,
            speed_multiplier: 1.0,
            velocity: 0.0,
        }
    }

    /// Walk (true) or run (false)
    #[must_use]
    pub fn with_walk(mut self, walk: bool) -> Self {
        self.mode = if walk { MoveMode::Walk } else { MoveMode::Run };
        self
    }

    /// Play in fly mode
    #[must_use]
    pub fn with_fly(mut self) -> Self {
        self.mode = MoveMode::Fly;
        self
    }

    /// Slow the command down
    #[must_use]
    pub fn with_combat_slowed(mut self, multiplier: f32) -> Self {
        self.speed_multiplier = multiplier;
        self
    }

    /// Total length of the path
    #[must_use]
    pub fn length(&self) -> f32 {
        path_length(&self.path)
    }
}

/// Playback subsystem of a unit.
pub trait MoveSpline {
    /// Start playing `command`. Returns the playback duration in
    /// milliseconds; 0 means nothing will play.
    fn launch(&mut self, command: SplineCommand) -> u32;

    /// Whether all queued motion has finished
    fn is_finalized(&self) -> bool;

    /// Halt immediately
    fn stop(&mut self);

    /// Halt gracefully
    fn interrupt(&mut self);
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// A path is playing
    Moving,
    /// Decelerating after a soft interrupt
    Stopping,
    /// Nothing is playing
    #[default]
    Finalized,
}

/// Time-based spline player.
#[derive(Debug, Clone, Default)]
pub struct SplinePlayer {
    /// Path being played
    path: Vec<Vec3>,
    /// Cumulative length at each waypoint
    distances: Vec<f32>,
    /// Playback speed in units per millisecond
    speed: f32,
    /// Elapsed playback time (ms)
    elapsed: u32,
    /// Time at which playback ends (ms)
    duration: u32,
    /// Position where playback stopped last
    rest_position: Option<Vec3>,
    /// Mode of the last launched command
    mode: MoveMode,
    state: PlaybackState,
    launches: u32,
}

impl SplinePlayer {
    /// Create an idle player
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance playback (call each tick)
    pub fn update(&mut self, diff: u32) {
        if self.state == PlaybackState::Finalized {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(diff).min(self.duration);
        if self.elapsed >= self.duration {
            self.rest_position = Some(self.sample(self.elapsed));
            self.state = PlaybackState::Finalized;
        }
    }

    /// Current position along the path, if a path was ever played
    #[must_use]
    pub fn position(&self) -> Option<Vec3> {
        match self.state {
            PlaybackState::Finalized => self.rest_position,
            _ => Some(self.sample(self.elapsed)),
        }
    }

    /// Get playback state
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Elapsed time of the current path (ms)
    #[must_use]
    pub const fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Duration of the current path (ms)
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.duration
    }

    /// Locomotion mode of the last launched command
    #[must_use]
    pub const fn mode(&self) -> MoveMode {
        self.mode
    }

    /// Number of commands that started playing
    #[must_use]
    pub const fn launches(&self) -> u32 {
        self.launches
    }

    /// Last path handed to the player
    #[must_use]
    pub fn path(&self) -> &[Vec3] {
        &self.path
    }

    /// Get the normalized playback time (0.0 to 1.0)
    #[must_use]
    pub fn normalized_time(&self) -> f32 {
        if self.duration > 0 {
            return self.elapsed as f32 / self.duration as f32;
        }
        0.0
    }

    fn sample(&self, time: u32) -> Vec3 {
        let Some(&first) = self.path.first() else {
            return Vec3::ZERO;
        };
        let travelled = self.speed * time as f32;

        for (i, pair) in self.path.windows(2).enumerate() {
            let (start, end) = (self.distances[i], self.distances[i + 1]);
            if travelled <= end {
                let span = end - start;
                let t = if span > 0.0 { (travelled - start) / span } else { 1.0 };
                return pair[0].lerp(pair[1], t.clamp(0.0, 1.0));
            }
        }
        self.path.last().copied().unwrap_or(first)
    }
}

impl MoveSpline for SplinePlayer {
    fn launch(&mut self, command: SplineCommand) -> u32 {
        let length = command.length();
        let speed = command.velocity * command.speed_multiplier / 1000.0;

        if !(length > 0.0 && speed > 0.0) {
            self.stop();
            return 0;
        }

        self.distances = cumulative_lengths(&command.path);
        self.path = command.path;
        self.mode = command.mode;
        self.speed = speed;
        self.elapsed = 0;
        self.duration = ((length / speed).round() as u32).max(1);
        self.state = PlaybackState::Moving;
        self.launches += 1;
        self.duration
    }

    fn is_finalized(&self) -> bool {
        self.state == PlaybackState::Finalized
    }

    fn stop(&mut self) {
        if self.state != PlaybackState::Finalized {
            self.rest_position = Some(self.sample(self.elapsed));
            self.duration = self.elapsed;
            self.state = PlaybackState::Finalized;
        }
    }

    fn interrupt(&mut self) {
        if self.state == PlaybackState::Moving {
            self.duration = self.duration.min(self.elapsed.saturating_add(SOFT_STOP_MS));
            self.state = PlaybackState::Stopping;
        }
    }
}

/// Total length of a polyline
#[must_use]
pub fn path_length(path: &[Vec3]) -> f32 {
    path.windows(2).map(|pair| pair[0].distance(pair[1])).sum()
}

fn cumulative_lengths(path: &[Vec3]) -> Vec<f32> {
    let mut total = 0.0;
    let mut lengths = Vec::with_capacity(path.len());
    lengths.push(0.0);
    for pair in path.windows(2) {
        total += pair[0].distance(pair[1]);
        lengths.push(total);
    }
    lengths
}
