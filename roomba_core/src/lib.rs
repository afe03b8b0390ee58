//! # Roomba Core
//!
//! Motion controller for a single autonomous 2D agent that drives straight, bounces off
//! whatever it hits and smoothly turns toward its new heading before driving again.
//!
//! - **Controller**: the two-state (moving / turning) collision-response state machine
//! - **Policy**: how a contact normal becomes a target heading (mirror or jittered mirror)
//! - **Actuator**: the seam to the physics engine that owns the agent's body
//! - **Heading**: angle helpers shared by all of the above
//!
//! The physics engine and the host loop are collaborators: the host calls
//! [`MotionController::on_physics_tick`] at its fixed simulation rate and forwards
//! collision contacts to [`MotionController::on_collision`].
//!
//! ## Quick Start
//!
//! ```rust
//! use nalgebra::Vector2;
//! use roomba_core::{CommandBuffer, MotionConfig, MotionController};
//!
//! let config = MotionConfig::new(2.0, 0.5).unwrap().with_seed(7);
//! let mut controller = MotionController::spawn(CommandBuffer::new(), config);
//!
//! let command = controller.on_physics_tick(0.02);
//! assert!((command.linear.norm() - 2.0).abs() < 1e-4);
//!
//! controller.on_contact_normal(Vector2::new(0.0, 1.0));
//! assert!(controller.is_turning());
//! ```

pub mod actuator;
pub mod config;
pub mod controller;
pub mod error;
pub mod heading;
pub mod policy;

pub use actuator::{CommandBuffer, Contact, PhysicsActuator, VelocityCommand};
pub use config::{MotionConfig, PolicyKind};
pub use controller::{MotionController, MotionState, Turn};
pub use error::{RoombaError, RoombaResult};
pub use policy::BouncePolicy;
