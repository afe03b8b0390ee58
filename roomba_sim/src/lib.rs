//! # roomba_sim - headless host for the roomba motion controller
//!
//! Runs one agent in a rapier2d arena: fixed-rate physics ticks driven from
//! variable-rate render frames, contacts forwarded to the controller, trajectory recorded.
//!
//! ## Binary Usage
//! ```bash
//! roomba_sim --config arena.toml --duration 60 --record run.json
//! ```
//!
//! ## Library Usage
//! ```rust,no_run
//! use roomba_sim::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(SimConfig::default(), false).unwrap();
//! let summary = sim.run_for(10.0);
//! println!("{}", summary);
//! ```

pub mod clock;
pub mod config;
pub mod recorder;
pub mod sim;
pub mod world;

pub use clock::FixedStepClock;
pub use config::{ClockConfig, Obstacle, RobotConfig, SimConfig, WorldConfig};
pub use recorder::{Recorder, Recording, RecordingMetadata, RunSummary, SampleState, TrajectorySample};
pub use sim::Simulation;
pub use world::PhysicsWorld;
