//! Motion controller configuration
//!
//! A `MotionConfig` is always valid: every constructor, including TOML
//! deserialization, goes through the same checks.
//!
//! ```toml
//! speed = 2.0
//! pause_duration = 0.5
//! policy = "jittered"
//! jitter_degrees = 20.0
//! max_turn_degrees = 150.0
//! seed = 42
//! ```

use crate::error::{RoombaError, RoombaResult};
use crate::policy::BouncePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which bounce policy a config document selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Reflect,
    Jittered,
}

/// On-disk shape of the motion table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct MotionConfigFile {
    speed: f32,
    pause_duration: f32,
    policy: PolicyKind,
    jitter_degrees: f32,
    max_turn_degrees: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

impl Default for MotionConfigFile {
    fn default() -> Self {
        Self {
            speed: MotionConfig::DEFAULT_SPEED,
            pause_duration: MotionConfig::DEFAULT_PAUSE_DURATION,
            policy: PolicyKind::Reflect,
            jitter_degrees: BouncePolicy::DEFAULT_JITTER_DEGREES,
            max_turn_degrees: BouncePolicy::DEFAULT_MAX_TURN_DEGREES,
            seed: None,
        }
    }
}

/// Validated controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MotionConfigFile", into = "MotionConfigFile")]
pub struct MotionConfig {
    speed: f32,
    pause_duration: f32,
    policy: BouncePolicy,
    seed: Option<u64>,
}

impl MotionConfig {
    /// Linear speed in units per second
    pub const DEFAULT_SPEED: f32 = 2.0;
    /// Pause-and-turn time in seconds
    pub const DEFAULT_PAUSE_DURATION: f32 = 0.5;

    /// Build a config with the default (reflect) policy.
    ///
    /// `speed` must be positive; `pause_duration` may be 0 for an instant turn.
    pub fn new(speed: f32, pause_duration: f32) -> RoombaResult<Self> {
        validate_speed(speed)?;
        validate_pause(pause_duration)?;
        Ok(Self {
            speed,
            pause_duration,
            policy: BouncePolicy::Reflect,
            seed: None,
        })
    }

    pub fn with_policy(mut self, policy: BouncePolicy) -> RoombaResult<Self> {
        validate_policy(&policy)?;
        self.policy = policy;
        Ok(self)
    }

    /// Fix the RNG seed so spawn heading and jitter replay identically
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn pause_duration(&self) -> f32 {
        self.pause_duration
    }

    pub fn policy(&self) -> BouncePolicy {
        self.policy
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Parse a motion table from TOML text
    pub fn from_toml_str(content: &str) -> RoombaResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a motion table from a TOML file
    pub fn load(path: impl AsRef<Path>) -> RoombaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RoombaError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            speed: Self::DEFAULT_SPEED,
            pause_duration: Self::DEFAULT_PAUSE_DURATION,
            policy: BouncePolicy::Reflect,
            seed: None,
        }
    }
}

impl TryFrom<MotionConfigFile> for MotionConfig {
    type Error = RoombaError;

    fn try_from(file: MotionConfigFile) -> Result<Self, Self::Error> {
        let policy = match file.policy {
            PolicyKind::Reflect => BouncePolicy::Reflect,
            PolicyKind::Jittered => BouncePolicy::Jittered {
                jitter_degrees: file.jitter_degrees,
                max_turn_degrees: file.max_turn_degrees,
            },
        };
        let config = MotionConfig::new(file.speed, file.pause_duration)?.with_policy(policy)?;
        Ok(match file.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        })
    }
}

impl From<MotionConfig> for MotionConfigFile {
    fn from(config: MotionConfig) -> Self {
        let (policy, jitter_degrees, max_turn_degrees) = match config.policy {
            BouncePolicy::Reflect => (
                PolicyKind::Reflect,
                BouncePolicy::DEFAULT_JITTER_DEGREES,
                BouncePolicy::DEFAULT_MAX_TURN_DEGREES,
            ),
            BouncePolicy::Jittered {
                jitter_degrees,
                max_turn_degrees,
            } => (PolicyKind::Jittered, jitter_degrees, max_turn_degrees),
        };
        Self {
            speed: config.speed,
            pause_duration: config.pause_duration,
            policy,
            jitter_degrees,
            max_turn_degrees,
            seed: config.seed,
        }
    }
}

fn validate_speed(speed: f32) -> RoombaResult<()> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(RoombaError::invalid(
            "speed",
            format!("must be a positive finite number, got {}", speed),
        ));
    }
    Ok(())
}

fn validate_pause(pause_duration: f32) -> RoombaResult<()> {
    if !pause_duration.is_finite() || pause_duration < 0.0 {
        return Err(RoombaError::invalid(
            "pause_duration",
            format!("must be a finite number >= 0, got {}", pause_duration),
        ));
    }
    Ok(())
}

fn validate_policy(policy: &BouncePolicy) -> RoombaResult<()> {
    if let BouncePolicy::Jittered {
        jitter_degrees,
        max_turn_degrees,
    } = *policy
    {
        if !jitter_degrees.is_finite() || jitter_degrees < 0.0 {
            return Err(RoombaError::invalid(
                "jitter_degrees",
                format!("must be a finite number >= 0, got {}", jitter_degrees),
            ));
        }
        if !max_turn_degrees.is_finite() || !(0.0..=180.0).contains(&max_turn_degrees) {
            return Err(RoombaError::invalid(
                "max_turn_degrees",
                format!("must be within [0, 180], got {}", max_turn_degrees),
            ));
        }
    }
    Ok(())
}
