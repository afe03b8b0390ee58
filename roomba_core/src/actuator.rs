//! Seam between the controller and the physics engine that owns the agent's body.

use nalgebra::{Point2, Vector2};

/// Actuation interface of the agent's rigid body.
///
/// The controller drives rotation by writing orientation directly; it never applies
/// torque, so angular velocity commands are always zero.
pub trait PhysicsActuator {
    /// Current body orientation as a heading in degrees
    fn orientation(&self) -> f32;

    fn set_orientation(&mut self, heading: f32);

    fn set_linear_velocity(&mut self, velocity: Vector2<f32>);

    fn set_angular_velocity(&mut self, angular_velocity: f32);
}

impl<A: PhysicsActuator + ?Sized> PhysicsActuator for &mut A {
    fn orientation(&self) -> f32 {
        (**self).orientation()
    }

    fn set_orientation(&mut self, heading: f32) {
        (**self).set_orientation(heading)
    }

    fn set_linear_velocity(&mut self, velocity: Vector2<f32>) {
        (**self).set_linear_velocity(velocity)
    }

    fn set_angular_velocity(&mut self, angular_velocity: f32) {
        (**self).set_angular_velocity(angular_velocity)
    }
}

/// Commands emitted by one physics tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityCommand {
    pub linear: Vector2<f32>,
    pub angular: f32,
}

impl VelocityCommand {
    pub fn zero() -> Self {
        Self {
            linear: Vector2::zeros(),
            angular: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.linear == Vector2::zeros() && self.angular == 0.0
    }
}

impl Default for VelocityCommand {
    fn default() -> Self {
        Self::zero()
    }
}

/// One contact point reported by the physics engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// World-space contact position
    pub point: Point2<f32>,
    /// Surface normal pointing away from the obstacle, toward the agent
    pub normal: Vector2<f32>,
}

impl Contact {
    pub fn new(point: Point2<f32>, normal: Vector2<f32>) -> Self {
        Self { point, normal }
    }
}

/// Mailbox actuator.
///
/// Stores the latest commands so a host can copy them onto its physics body after the
/// controller has ticked. Hosts whose body cannot be borrowed by the controller (ECS
/// resources, rapier body sets) use this instead of a live handle.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    orientation: f32,
    linear_velocity: Vector2<f32>,
    angular_velocity: f32,
    orientation_dirty: bool,
    writes: u64,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn linear_velocity(&self) -> Vector2<f32> {
        self.linear_velocity
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    /// Orientation written since the last call, if any
    pub fn take_orientation(&mut self) -> Option<f32> {
        if self.orientation_dirty {
            self.orientation_dirty = false;
            Some(self.orientation)
        } else {
            None
        }
    }

    /// Number of commands written so far
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl PhysicsActuator for CommandBuffer {
    fn orientation(&self) -> f32 {
        self.orientation
    }

    fn set_orientation(&mut self, heading: f32) {
        self.orientation = heading;
        self.orientation_dirty = true;
        self.writes += 1;
    }

    fn set_linear_velocity(&mut self, velocity: Vector2<f32>) {
        self.linear_velocity = velocity;
        self.writes += 1;
    }

    fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.angular_velocity = angular_velocity;
        self.writes += 1;
    }
}
