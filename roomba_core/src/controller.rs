//! Collision-response motion controller
//!
//! The agent drives straight along its heading. A collision stops it, picks a new
//! heading from the contact normal, rotates toward it over `pause_duration` seconds and
//! then drives again. The pause is plain state advanced once per physics tick, so the
//! host loop never blocks.
//!
//! ```text
//! Moving --(collision)--> Turning --(elapsed >= pause_duration)--> Moving
//! Turning --(collision)--> ignored
//! ```

use crate::actuator::{Contact, PhysicsActuator, VelocityCommand};
use crate::config::MotionConfig;
use crate::heading::{forward, interpolate, normalize_degrees};
use crate::policy::BouncePolicy;
use nalgebra::Vector2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use tracing::{debug, info, warn};

/// Normals shorter than this are treated as missing
const MIN_NORMAL_LENGTH: f32 = 1e-6;

/// Relative slack when deciding a turn's timer has run out
const TURN_END_TOLERANCE: f32 = 1e-5;

/// An in-progress turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Turn {
    /// Heading when the collision was accepted
    pub start_heading: f32,
    /// Heading the agent is rotating toward
    pub target_heading: f32,
    /// Seconds since the turn began, never more than the pause duration
    pub elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionState {
    Moving,
    Turning(Turn),
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionState::Moving => write!(f, "Moving"),
            MotionState::Turning(_) => write!(f, "Turning"),
        }
    }
}

/// Per-agent motion state machine.
///
/// Owns its actuator and its random generator. `R` defaults to a ChaCha8 generator so
/// that a seeded run replays the same spawn heading and jitter.
pub struct MotionController<A, R = ChaCha8Rng> {
    actuator: A,
    rng: R,
    config: MotionConfig,
    heading: f32,
    state: MotionState,
}

impl<A: PhysicsActuator> MotionController<A, ChaCha8Rng> {
    /// Spawn with a random heading.
    ///
    /// Seeds from `config.seed()` when present, otherwise from OS entropy.
    pub fn spawn(actuator: A, config: MotionConfig) -> Self {
        let rng = match config.seed() {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::spawn_with_rng(actuator, config, rng)
    }
}

impl<A: PhysicsActuator, R: Rng> MotionController<A, R> {
    /// Spawn with a heading drawn uniformly from `[0, 360)` using `rng`
    pub fn spawn_with_rng(actuator: A, config: MotionConfig, mut rng: R) -> Self {
        let heading = rng.gen_range(0.0..360.0);
        Self::spawn_facing(actuator, config, rng, heading)
    }

    /// Spawn facing a known heading instead of a random one
    pub fn spawn_facing(mut actuator: A, config: MotionConfig, rng: R, heading: f32) -> Self {
        let heading = normalize_degrees(heading);
        actuator.set_orientation(heading);

        info!(
            heading,
            speed = config.speed(),
            pause_duration = config.pause_duration(),
            policy = %config.policy(),
            "motion controller spawned"
        );

        Self {
            actuator,
            rng,
            config,
            heading,
            state: MotionState::Moving,
        }
    }

    /// Advance one fixed physics step and emit the velocity command for it.
    ///
    /// Negative or non-finite `dt` is treated as zero. A zero-length step never advances
    /// or completes a turn.
    pub fn on_physics_tick(&mut self, dt: f32) -> VelocityCommand {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(dt, "invalid physics tick delta, treating as 0");
            0.0
        };

        match self.state {
            MotionState::Moving => {
                let command = VelocityCommand {
                    linear: forward(self.heading) * self.config.speed(),
                    angular: 0.0,
                };
                self.emit(&command);
                command
            }
            MotionState::Turning(mut turn) => {
                let command = VelocityCommand::zero();
                self.emit(&command);

                if dt > 0.0 {
                    let pause = self.config.pause_duration();
                    turn.elapsed = (turn.elapsed + dt).min(pause);

                    // Summed f32 steps land a few ulps short of an exact partition
                    if turn.elapsed >= pause - pause * TURN_END_TOLERANCE {
                        self.heading = turn.target_heading;
                        self.state = MotionState::Moving;
                        debug!(heading = self.heading, "turn complete, resuming");
                    } else {
                        self.heading = interpolate(
                            turn.start_heading,
                            turn.target_heading,
                            turn.elapsed / pause,
                        );
                        self.state = MotionState::Turning(turn);
                    }
                    self.actuator.set_orientation(self.heading);
                }

                command
            }
        }
    }

    /// React to a collision.
    ///
    /// Only the first contact is used. Returns `true` when the collision started a turn;
    /// collisions while turning and contacts without a usable normal are ignored.
    pub fn on_collision(&mut self, contacts: &[Contact]) -> bool {
        match contacts.first() {
            Some(contact) => self.on_contact_normal(contact.normal),
            None => {
                debug!("collision without contacts ignored");
                false
            }
        }
    }

    /// React to a collision given only its surface normal
    pub fn on_contact_normal(&mut self, normal: Vector2<f32>) -> bool {
        if let MotionState::Turning(turn) = self.state {
            debug!(
                target_heading = turn.target_heading,
                "collision during turn ignored"
            );
            return false;
        }

        let Some(normal) = unit_normal(normal) else {
            debug!(?normal, "collision with unusable normal ignored");
            return false;
        };

        let target_heading =
            self.config
                .policy()
                .target_heading(self.heading, &normal, &mut self.rng);

        self.state = MotionState::Turning(Turn {
            start_heading: self.heading,
            target_heading,
            elapsed: 0.0,
        });

        debug!(
            start_heading = self.heading,
            target_heading,
            normal_x = normal.x,
            normal_y = normal.y,
            "collision accepted, turning"
        );
        true
    }

    fn emit(&mut self, command: &VelocityCommand) {
        self.actuator.set_linear_velocity(command.linear);
        self.actuator.set_angular_velocity(command.angular);
    }
}

impl<A, R> MotionController<A, R> {
    /// Current heading in degrees, `[0, 360)`
    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, MotionState::Moving)
    }

    pub fn is_turning(&self) -> bool {
        matches!(self.state, MotionState::Turning(_))
    }

    pub fn target_heading(&self) -> Option<f32> {
        self.turn().map(|turn| turn.target_heading)
    }

    pub fn start_heading(&self) -> Option<f32> {
        self.turn().map(|turn| turn.start_heading)
    }

    /// Seconds into the current turn
    pub fn elapsed(&self) -> Option<f32> {
        self.turn().map(|turn| turn.elapsed)
    }

    /// Fraction of the current turn completed, in `[0, 1]`
    pub fn turn_progress(&self) -> Option<f32> {
        let pause = self.config.pause_duration();
        self.turn().map(|turn| {
            if pause > 0.0 {
                (turn.elapsed / pause).clamp(0.0, 1.0)
            } else {
                1.0
            }
        })
    }

    pub fn speed(&self) -> f32 {
        self.config.speed()
    }

    pub fn pause_duration(&self) -> f32 {
        self.config.pause_duration()
    }

    pub fn policy(&self) -> BouncePolicy {
        self.config.policy()
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }

    fn turn(&self) -> Option<&Turn> {
        match &self.state {
            MotionState::Turning(turn) => Some(turn),
            MotionState::Moving => None,
        }
    }
}

fn unit_normal(normal: Vector2<f32>) -> Option<Vector2<f32>> {
    if !normal.iter().all(|c| c.is_finite()) {
        return None;
    }
    normal.try_normalize(MIN_NORMAL_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::CommandBuffer;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn controller(pause: f32, heading: f32) -> MotionController<CommandBuffer> {
        let config = MotionConfig::new(2.0, pause).unwrap();
        MotionController::spawn_facing(
            CommandBuffer::new(),
            config,
            ChaCha8Rng::seed_from_u64(3),
            heading,
        )
    }

    #[test]
    fn test_spawn_heading_in_range_and_moving() {
        for seed in 0..50 {
            let config = MotionConfig::default().with_seed(seed);
            let c = MotionController::spawn(CommandBuffer::new(), config);
            assert!((0.0..360.0).contains(&c.heading()));
            assert!(c.is_moving());
            assert_eq!(c.actuator().orientation(), c.heading());
        }
    }

    #[test]
    fn test_seeded_spawn_is_reproducible() {
        let config = MotionConfig::default().with_seed(1234);
        let a = MotionController::spawn(CommandBuffer::new(), config.clone());
        let b = MotionController::spawn(CommandBuffer::new(), config);
        assert_eq!(a.heading(), b.heading());
    }

    #[test]
    fn test_moving_tick_drives_forward() {
        let mut c = controller(0.5, 90.0);
        let command = c.on_physics_tick(0.02);
        assert_relative_eq!(command.linear.x, -2.0, epsilon = 1e-5);
        assert_relative_eq!(command.linear.y, 0.0, epsilon = 1e-5);
        assert_eq!(command.angular, 0.0);
        assert_eq!(c.actuator().linear_velocity(), command.linear);
        assert_eq!(c.heading(), 90.0);
    }

    #[test]
    fn test_collision_starts_turn() {
        let mut c = controller(0.5, 0.0);
        assert!(c.on_contact_normal(Vector2::new(0.0, -1.0)));
        assert!(c.is_turning());
        assert_eq!(c.start_heading(), Some(0.0));
        assert_eq!(c.elapsed(), Some(0.0));
        assert_relative_eq!(c.target_heading().unwrap(), 180.0, epsilon = 1e-4);
        // Nothing moves until the next tick
        assert_eq!(c.heading(), 0.0);
    }

    #[test]
    fn test_turn_interpolates_then_snaps() {
        let mut c = controller(0.5, 0.0);
        c.on_contact_normal(Vector2::new(1.0, -1.0));
        let target = c.target_heading().unwrap();

        let command = c.on_physics_tick(0.25);
        assert!(command.is_zero());
        assert!(c.is_turning());
        assert_relative_eq!(c.turn_progress().unwrap(), 0.5, epsilon = 1e-6);
        assert_relative_eq!(c.heading(), interpolate(0.0, target, 0.5), epsilon = 1e-4);

        c.on_physics_tick(0.25);
        assert!(c.is_moving());
        assert_eq!(c.heading(), target);
        assert_eq!(c.actuator().orientation(), target);
    }

    #[test]
    fn test_elapsed_never_exceeds_pause() {
        let mut c = controller(0.5, 10.0);
        c.on_contact_normal(Vector2::new(0.0, -1.0));
        c.on_physics_tick(0.3);
        assert_eq!(c.elapsed(), Some(0.3));
        c.on_physics_tick(10.0);
        assert!(c.is_moving());
        assert_eq!(c.elapsed(), None);
    }

    #[test]
    fn test_malformed_collisions_ignored() {
        let mut c = controller(0.5, 45.0);
        assert!(!c.on_collision(&[]));
        assert!(!c.on_contact_normal(Vector2::zeros()));
        assert!(!c.on_contact_normal(Vector2::new(f32::NAN, 1.0)));
        assert!(!c.on_contact_normal(Vector2::new(f32::INFINITY, 0.0)));
        assert!(c.is_moving());
        assert_eq!(c.heading(), 45.0);
    }

    #[test]
    fn test_only_first_contact_used() {
        let mut c = controller(0.5, 0.0);
        let contacts = [
            Contact::new(Point2::new(0.0, 1.0), Vector2::new(0.0, -1.0)),
            Contact::new(Point2::new(1.0, 0.0), Vector2::new(-1.0, 0.0)),
        ];
        assert!(c.on_collision(&contacts));
        assert_relative_eq!(c.target_heading().unwrap(), 180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_non_unit_normal_is_normalized() {
        let mut c = controller(0.5, 0.0);
        assert!(c.on_contact_normal(Vector2::new(0.0, -5.0)));
        assert_relative_eq!(c.target_heading().unwrap(), 180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut c = controller(0.5, 0.0);
        c.on_contact_normal(Vector2::new(0.0, -1.0));
        c.on_physics_tick(-1.0);
        c.on_physics_tick(f32::NAN);
        assert_eq!(c.elapsed(), Some(0.0));
        assert_eq!(c.heading(), 0.0);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(MotionState::Moving.to_string(), "Moving");
        let turning = MotionState::Turning(Turn {
            start_heading: 0.0,
            target_heading: 90.0,
            elapsed: 0.0,
        });
        assert_eq!(turning.to_string(), "Turning");
    }
}
