//! Simulation configuration
//!
//! One TOML document with four optional tables:
//!
//! ```toml
//! [motion]
//! speed = 2.0
//! pause_duration = 0.5
//! policy = "reflect"
//!
//! [robot]
//! radius = 0.17
//! start = [0.0, 0.0]
//!
//! [world]
//! width = 10.0
//! height = 8.0
//! obstacles = [{ pos = [2.0, 1.5], size = [1.0, 1.0] }]
//!
//! [clock]
//! physics_hz = 50.0
//! render_hz = 60.0
//! ```

use anyhow::{ensure, Context, Result};
use roomba_core::MotionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on the physics rate; beyond it a tick is too short to make progress
pub const MAX_PHYSICS_HZ: f32 = 10_000.0;

/// Agent body configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub name: String,
    /// Body radius in meters
    pub radius: f32,
    /// Spawn position [x, y] in meters
    pub start: [f32; 2],
    /// Fixed spawn heading in degrees; random when absent
    pub initial_heading: Option<f32>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            name: "roomba".to_string(),
            radius: 0.17, // 34cm vacuum robot
            start: [0.0, 0.0],
            initial_heading: None,
        }
    }
}

/// Box arena with axis-aligned obstacles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub wall_thickness: f32,
    pub obstacles: Vec<Obstacle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Center [x, y]
    pub pos: [f32; 2],
    /// Full extents [width, height]
    pub size: [f32; 2],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 10.0,
            height: 8.0,
            wall_thickness: 0.2,
            obstacles: vec![
                Obstacle {
                    pos: [2.5, 1.5],
                    size: [1.0, 1.0],
                },
                Obstacle {
                    pos: [-2.0, -2.0],
                    size: [1.5, 0.5],
                },
                Obstacle {
                    pos: [-2.5, 2.0],
                    size: [0.5, 1.5],
                },
            ],
        }
    }
}

/// Host loop timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Fixed physics tick rate
    pub physics_hz: f32,
    /// Nominal render frame rate
    pub render_hz: f32,
    /// Random frame-time variation as a fraction of the nominal frame time, [0, 1)
    pub render_jitter: f32,
    /// Catch-up limit; excess time is dropped
    pub max_ticks_per_frame: u32,
    /// Default run length in seconds
    pub duration: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            physics_hz: 50.0,
            render_hz: 60.0,
            render_jitter: 0.25,
            max_ticks_per_frame: 8,
            duration: 30.0,
        }
    }
}

impl ClockConfig {
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.physics_hz
    }

    pub fn render_dt(&self) -> f32 {
        1.0 / self.render_hz
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub motion: MotionConfig,
    pub robot: RobotConfig,
    pub world: WorldConfig,
    pub clock: ClockConfig,
}

impl SimConfig {
    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config in {:?}", path))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        ensure!(
            world.width > 0.0 && world.height > 0.0,
            "world size must be positive, got {}x{}",
            world.width,
            world.height
        );
        ensure!(
            world.wall_thickness > 0.0,
            "wall_thickness must be positive"
        );
        for (i, obstacle) in world.obstacles.iter().enumerate() {
            ensure!(
                obstacle.size[0] > 0.0 && obstacle.size[1] > 0.0,
                "obstacle {} has non-positive size {:?}",
                i,
                obstacle.size
            );
        }

        let robot = &self.robot;
        ensure!(robot.radius > 0.0, "robot radius must be positive");
        let [x, y] = robot.start;
        ensure!(
            x.abs() + robot.radius < world.width / 2.0
                && y.abs() + robot.radius < world.height / 2.0,
            "robot start {:?} (radius {}) is outside the {}x{} world",
            robot.start,
            robot.radius,
            world.width,
            world.height
        );
        if let Some(heading) = robot.initial_heading {
            ensure!(heading.is_finite(), "initial_heading must be finite");
        }

        let clock = &self.clock;
        ensure!(
            clock.physics_hz.is_finite() && clock.physics_hz > 0.0,
            "physics_hz must be positive and finite, got {}",
            clock.physics_hz
        );
        ensure!(
            clock.physics_hz <= MAX_PHYSICS_HZ,
            "physics_hz must be at most {}, got {}",
            MAX_PHYSICS_HZ,
            clock.physics_hz
        );
        ensure!(
            clock.render_hz.is_finite() && clock.render_hz > 0.0,
            "render_hz must be positive and finite, got {}",
            clock.render_hz
        );
        ensure!(
            (0.0..1.0).contains(&clock.render_jitter),
            "render_jitter must be within [0, 1), got {}",
            clock.render_jitter
        );
        ensure!(
            clock.max_ticks_per_frame > 0,
            "max_ticks_per_frame must be at least 1"
        );
        ensure!(
            clock.duration.is_finite() && clock.duration >= 0.0,
            "duration must be finite and not negative, got {}",
            clock.duration
        );

        Ok(())
    }
}
