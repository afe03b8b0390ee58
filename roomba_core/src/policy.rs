//! Bounce policies: how a contact normal becomes a new target heading.

use crate::heading::{forward, heading_of, normalize_degrees, reflect, shortest_delta};
use nalgebra::Vector2;
use rand::Rng;
use std::fmt;

/// Rule used to pick the heading after a collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BouncePolicy {
    /// Exact mirror bounce off the surface
    Reflect,
    /// Mirror bounce plus random jitter, with the turn clamped to `max_turn_degrees`.
    ///
    /// The jitter breaks the back-and-forth loop an exact reflection can fall into
    /// between two parallel walls or inside a corner.
    Jittered {
        jitter_degrees: f32,
        max_turn_degrees: f32,
    },
}

impl BouncePolicy {
    pub const DEFAULT_JITTER_DEGREES: f32 = 20.0;
    pub const DEFAULT_MAX_TURN_DEGREES: f32 = 150.0;

    /// Jittered policy with the stock ±20° jitter and ±150° turn limit
    pub fn jittered() -> Self {
        Self::Jittered {
            jitter_degrees: Self::DEFAULT_JITTER_DEGREES,
            max_turn_degrees: Self::DEFAULT_MAX_TURN_DEGREES,
        }
    }

    /// Compute the heading to turn toward.
    ///
    /// `normal` must be a unit vector pointing away from the obstacle.
    pub fn target_heading<R: Rng + ?Sized>(
        &self,
        heading: f32,
        normal: &Vector2<f32>,
        rng: &mut R,
    ) -> f32 {
        let reflected = heading_of(&reflect(&forward(heading), normal));

        match *self {
            BouncePolicy::Reflect => reflected,
            BouncePolicy::Jittered {
                jitter_degrees,
                max_turn_degrees,
            } => {
                let jitter = if jitter_degrees > 0.0 {
                    rng.gen_range(-jitter_degrees..=jitter_degrees)
                } else {
                    0.0
                };
                let delta = shortest_delta(heading, reflected + jitter)
                    .clamp(-max_turn_degrees, max_turn_degrees);
                normalize_degrees(heading + delta)
            }
        }
    }
}

impl Default for BouncePolicy {
    fn default() -> Self {
        Self::Reflect
    }
}

impl fmt::Display for BouncePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BouncePolicy::Reflect => write!(f, "reflect"),
            BouncePolicy::Jittered {
                jitter_degrees,
                max_turn_degrees,
            } => write!(
                f,
                "jittered(±{}°, max turn {}°)",
                jitter_degrees, max_turn_degrees
            ),
        }
    }
}
