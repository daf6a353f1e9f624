//! Tuning for random motion generators
//!
//! Every magic number used by the replanning loop lives here so variants can
//! be tuned per server. Configuration can be loaded from RON or JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default horizontal distance below which a segment is treated as a step.
pub const DEFAULT_STEP_LENGTH: f32 = 0.5;
/// Default maximum height of a single step.
pub const DEFAULT_STEP_TOLERANCE: f32 = 2.0;
/// Default maximum vertical/horizontal ratio (45 degrees).
pub const DEFAULT_MAX_SLOPE_RATIO: f32 = 1.0;

/// How swimming units are treated when correcting path heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwimPolicy {
    /// Ground-snap every point and never special-case swimming units.
    #[default]
    AlwaysGroundSnap,
    /// Keep swimming units below the water surface, skip slope checks and
    /// play their path in fly mode.
    ExemptSwimming,
}

/// Tuning for one movement variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionTuning {
    /// Radius around the anchor in which destinations are searched
    pub anchor_radius: f32,
    /// Lower bound of the delay between bursts (ms)
    pub replan_delay_min: u32,
    /// Upper bound of the delay between bursts (ms)
    pub replan_delay_max: u32,
    /// Maximum number of consecutive moves sharing one delay
    pub burst_count: u32,
    /// Path length limit handed to the pathfinder (0 = unlimited)
    pub path_length_cap: f32,
    /// Horizontal length under which a segment counts as a step
    pub slope_step_length: f32,
    /// Maximum height of a step
    pub slope_step_tolerance: f32,
    /// Maximum vertical/horizontal ratio of a segment
    pub slope_max_ratio: f32,
    /// Walk instead of run
    pub walk: bool,
    /// Retry delay after a failed replan for player-controlled units (ms)
    pub retry_delay_player: u32,
    /// Retry delay after a failed replan for other units (ms)
    pub retry_delay_npc: u32,
}

impl MotionTuning {
    /// Tuning for confused units.
    #[must_use]
    pub fn confused() -> Self {
        Self {
            anchor_radius: 2.5,
            replan_delay_min: 500,
            replan_delay_max: 1500,
            burst_count: 1,
            ..Self::base()
        }
    }

    /// Tuning for wandering creatures.
    #[must_use]
    pub fn wander() -> Self {
        Self {
            anchor_radius: 5.0,
            replan_delay_min: 3000,
            replan_delay_max: 10000,
            burst_count: 3,
            ..Self::base()
        }
    }

    /// Tuning for fleeing and panicking units. The radius is drawn per
    /// replan from the distance to the threat.
    #[must_use]
    pub fn fleeing() -> Self {
        Self {
            anchor_radius: 0.0,
            replan_delay_min: 500,
            replan_delay_max: 1500,
            burst_count: 1,
            path_length_cap: 30.0,
            walk: false,
            ..Self::base()
        }
    }

    fn base() -> Self {
        Self {
            anchor_radius: 0.0,
            replan_delay_min: 0,
            replan_delay_max: 0,
            burst_count: 1,
            path_length_cap: 0.0,
            slope_step_length: DEFAULT_STEP_LENGTH,
            slope_step_tolerance: DEFAULT_STEP_TOLERANCE,
            slope_max_ratio: DEFAULT_MAX_SLOPE_RATIO,
            walk: true,
            retry_delay_player: 100,
            retry_delay_npc: 500,
        }
    }

    /// Set the search radius
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.anchor_radius = radius;
        self
    }

    /// Set the delay bounds between bursts
    #[must_use]
    pub fn with_delays(mut self, min: u32, max: u32) -> Self {
        self.replan_delay_min = min;
        self.replan_delay_max = max;
        self
    }

    /// Set the maximum burst length
    #[must_use]
    pub fn with_burst_count(mut self, count: u32) -> Self {
        self.burst_count = count;
        self
    }

    /// Set the path length limit
    #[must_use]
    pub fn with_path_length_cap(mut self, cap: f32) -> Self {
        self.path_length_cap = cap;
        self
    }

    /// Walk (true) or run (false)
    #[must_use]
    pub fn with_walk(mut self, walk: bool) -> Self {
        self.walk = walk;
        self
    }

    /// Check the tuning for values the replanning loop cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self, variant: &'static str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid { variant, reason };

        if self.replan_delay_min > self.replan_delay_max {
            return Err(invalid(format!(
                "replan_delay_min {} exceeds replan_delay_max {}",
                self.replan_delay_min, self.replan_delay_max
            )));
        }
        if self.burst_count == 0 {
            return Err(invalid("burst_count must be at least 1".into()));
        }
        if !(self.anchor_radius >= 0.0) {
            return Err(invalid(format!("anchor_radius {} is negative", self.anchor_radius)));
        }
        if !(self.path_length_cap >= 0.0) {
            return Err(invalid(format!(
                "path_length_cap {} is negative",
                self.path_length_cap
            )));
        }
        if !(self.slope_step_length > 0.0
            && self.slope_step_tolerance > 0.0
            && self.slope_max_ratio > 0.0)
        {
            return Err(invalid("slope limits must be positive".into()));
        }
        Ok(())
    }
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self::wander()
    }
}

/// Configuration shared by all generators of a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Confused variant
    pub confused: MotionTuning,
    /// Wander and timed wander variants
    pub wander: MotionTuning,
    /// Fleeing and panic variants
    pub fleeing: MotionTuning,
    /// Treatment of swimming units
    pub swim_policy: SwimPolicy,
    /// Seed for generators created without an explicit random source
    pub rng_seed: u64,
    /// Lowest speed multiplier applied to units slowed in combat
    pub combat_slow_floor: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            confused: MotionTuning::confused(),
            wander: MotionTuning::wander(),
            fleeing: MotionTuning::fleeing(),
            swim_policy: SwimPolicy::default(),
            rng_seed: 0x5EED,
            combat_slow_floor: 0.1,
        }
    }
}

impl MotionConfig {
    /// Set the swim policy
    #[must_use]
    pub fn with_swim_policy(mut self, policy: SwimPolicy) -> Self {
        self.swim_policy = policy;
        self
    }

    /// Set the random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Validate every variant.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.confused.validate("confused")?;
        self.wander.validate("wander")?;
        self.fleeing.validate("fleeing")?;
        if !(self.combat_slow_floor > 0.0 && self.combat_slow_floor <= 1.0) {
            return Err(ConfigError::Invalid {
                variant: "global",
                reason: format!(
                    "combat_slow_floor {} must be in (0, 1]",
                    self.combat_slow_floor
                ),
            });
        }
        Ok(())
    }

    /// Parse and validate a RON document.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Serialize the configuration as pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    /// A value the generators cannot run with
    #[error("invalid {variant} tuning: {reason}")]
    Invalid {
        /// Variant the value belongs to
        variant: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_defaults() {
        let confused = MotionTuning::confused();
        assert_eq!(confused.anchor_radius, 2.5);
        assert_eq!((confused.replan_delay_min, confused.replan_delay_max), (500, 1500));

        let wander = MotionTuning::wander();
        assert_eq!((wander.replan_delay_min, wander.replan_delay_max), (3000, 10000));
        assert_eq!(wander.burst_count, 3);

        let fleeing = MotionTuning::fleeing();
        assert_eq!(fleeing.path_length_cap, 30.0);
        assert!(!fleeing.walk);
    }

    #[test]
    fn test_ron_roundtrip_keeps_policy() {
        let config = MotionConfig::default()
            .with_swim_policy(SwimPolicy::ExemptSwimming)
            .with_seed(7);

        let ron_str = config.to_ron_string().unwrap();
        let loaded = MotionConfig::from_ron_str(&ron_str).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_roundtrip_keeps_policy() {
        let config = MotionConfig::default()
            .with_swim_policy(SwimPolicy::ExemptSwimming)
            .with_seed(11);

        let json_str = config.to_json_string().unwrap();
        let loaded = MotionConfig::from_json_str(&json_str).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = MotionConfig::default().with_seed(21);

        let ron_path = dir.path().join("motion.ron");
        fs::write(&ron_path, config.to_ron_string().unwrap()).unwrap();
        assert_eq!(MotionConfig::load_ron(&ron_path).unwrap(), config);

        let json_path = dir.path().join("motion.json");
        fs::write(&json_path, config.to_json_string().unwrap()).unwrap();
        assert_eq!(MotionConfig::load_json(&json_path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.ron");

        assert!(matches!(MotionConfig::load_ron(&missing), Err(ConfigError::Io(_))));
        assert!(matches!(MotionConfig::load_json(&missing), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_json_values_rejected() {
        let err = MotionConfig::from_json_str(r#"{"combat_slow_floor": 0.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { variant: "global", .. }));
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let loaded = MotionConfig::from_ron_str("(rng_seed: 99)").unwrap();
        assert_eq!(loaded.rng_seed, 99);
        assert_eq!(loaded.wander, MotionTuning::wander());
    }

    #[test]
    fn test_inverted_delays_rejected() {
        let mut config = MotionConfig::default();
        config.wander = config.wander.with_delays(5000, 100);

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { variant: "wander", .. }));
    }

    #[test]
    fn test_zero_burst_rejected() {
        let tuning = MotionTuning::confused().with_burst_count(0);
        assert!(tuning.validate("confused").is_err());
    }

    #[test]
    fn test_garbage_ron_is_deserialize_error() {
        let err = MotionConfig::from_ron_str("not ron at all {").unwrap_err();
        assert!(matches!(err, ConfigError::Deserialize(_)));
    }
}
