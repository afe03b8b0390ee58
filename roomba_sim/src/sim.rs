//! Host loop tying the controller to the physics world
//!
//! Per render frame: the clock decides how many fixed ticks to run; each tick runs
//! controller → apply commands → physics step → dispatch new contacts, in that order.
//! The recorder samples once per frame.

use crate::clock::FixedStepClock;
use crate::config::SimConfig;
use crate::recorder::{Recorder, RecordingMetadata, Recording, RunSummary, TrajectorySample};
use crate::world::PhysicsWorld;
use anyhow::Result;
use nalgebra::Point2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roomba_core::{CommandBuffer, MotionController};
use tracing::{debug, info, warn};

pub struct Simulation {
    config: SimConfig,
    world: PhysicsWorld,
    controller: MotionController<CommandBuffer>,
    clock: FixedStepClock,
    recorder: Recorder,
    frame_rng: ChaCha8Rng,
    frame: u64,
    last_position: Point2<f32>,
}

impl Simulation {
    /// Build a simulation; `record` keeps per-frame samples in memory
    pub fn new(config: SimConfig, record: bool) -> Result<Self> {
        config.validate()?;

        let motion = config.motion.clone();
        let mut controller = match config.robot.initial_heading {
            Some(heading) => {
                let rng = match motion.seed() {
                    Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                    None => ChaCha8Rng::from_entropy(),
                };
                MotionController::spawn_facing(CommandBuffer::new(), motion, rng, heading)
            }
            None => MotionController::spawn(CommandBuffer::new(), motion),
        };

        let clock = FixedStepClock::new(
            config.clock.fixed_dt(),
            config.clock.max_ticks_per_frame,
        )?;
        let mut world = PhysicsWorld::new(
            &config.world,
            &config.robot,
            clock.fixed_dt(),
            controller.heading(),
        );
        world.apply_commands(controller.actuator_mut());

        // Frame timing gets its own stream so jitter never shifts the controller's draws
        let frame_rng = match config.motion.seed() {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            None => ChaCha8Rng::from_entropy(),
        };

        let metadata = RecordingMetadata::new(
            config.robot.name.clone(),
            config.motion.policy().to_string(),
            config.motion.seed(),
            config.clock.physics_hz,
            config.clock.render_hz,
        );
        let recorder = if record {
            Recorder::new(metadata)
        } else {
            Recorder::disabled(metadata)
        };

        let last_position = world.agent_position();

        Ok(Self {
            config,
            world,
            controller,
            clock,
            recorder,
            frame_rng,
            frame: 0,
            last_position,
        })
    }

    /// Run one render frame of `render_dt` seconds; returns the physics ticks run
    pub fn frame(&mut self, render_dt: f32) -> u32 {
        let ticks = self.clock.advance(render_dt);
        for _ in 0..ticks {
            self.physics_tick();
        }

        let position = self.world.agent_position();
        let velocity = self.world.agent_velocity();
        self.recorder.record(TrajectorySample {
            frame: self.frame,
            time: self.clock.sim_time(),
            position: [position.x, position.y],
            heading: self.controller.heading(),
            state: self.controller.state().into(),
            velocity: [velocity.x, velocity.y],
            turn_progress: self.controller.turn_progress(),
        });

        let summary = self.recorder.summary_mut();
        summary.ticks = self.clock.total_ticks();
        summary.sim_time = self.clock.sim_time();
        summary.dropped_time = self.clock.dropped_time();

        self.frame += 1;
        ticks
    }

    fn physics_tick(&mut self) {
        let was_turning = self.controller.is_turning();
        self.controller.on_physics_tick(self.clock.fixed_dt());
        if was_turning && self.controller.is_moving() {
            self.recorder.summary_mut().turns_completed += 1;
        }

        self.world.apply_commands(self.controller.actuator_mut());

        for contacts in self.world.step() {
            let accepted = self.controller.on_collision(&contacts);
            let summary = self.recorder.summary_mut();
            summary.collisions_seen += 1;
            if accepted {
                summary.collisions_accepted += 1;
            }
        }

        let position = self.world.agent_position();
        self.recorder.summary_mut().distance_travelled += (position - self.last_position).norm();
        self.last_position = position;
    }

    /// Nominal render frame time with the configured random variation
    pub fn next_frame_dt(&mut self) -> f32 {
        let nominal = self.config.clock.render_dt();
        let jitter = self.config.clock.render_jitter;
        if jitter > 0.0 {
            nominal * (1.0 + self.frame_rng.gen_range(-jitter..=jitter))
        } else {
            nominal
        }
    }

    /// Drive variable-length frames until `seconds` of simulated time have passed
    pub fn run_for(&mut self, seconds: f32) -> &RunSummary {
        if !seconds.is_finite() {
            warn!(seconds, "run length must be finite, nothing simulated");
            return self.recorder.summary();
        }

        info!(
            seconds,
            policy = %self.controller.policy(),
            heading = self.controller.heading(),
            "simulation started"
        );

        let target = seconds.max(0.0) as f64;
        while self.clock.sim_time() + 1e-9 < target {
            let dt = self.next_frame_dt();
            let ticks = self.frame(dt);
            debug!(
                frame = self.frame,
                dt,
                ticks,
                alpha = self.clock.alpha(),
                "frame"
            );
        }

        let summary = self.recorder.summary();
        info!(
            sim_time = summary.sim_time,
            collisions = summary.collisions_seen,
            turns = summary.turns_completed,
            distance = summary.distance_travelled,
            "simulation finished"
        );
        summary
    }

    pub fn controller(&self) -> &MotionController<CommandBuffer> {
        &self.controller
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn clock(&self) -> &FixedStepClock {
        &self.clock
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn summary(&self) -> &RunSummary {
        self.recorder.summary()
    }

    pub fn into_recording(self) -> Recording {
        self.recorder.finish()
    }
}
