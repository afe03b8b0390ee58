//! rapier2d world hosting the agent
//!
//! Builds the arena (boundary walls + obstacles) and the agent body, applies the
//! controller's commands before each step and reports newly started contacts after it.
//! Contacts are enter-only: a collider that stays in contact through a turn does not
//! report again until it separates and touches anew.

use crate::config::{RobotConfig, WorldConfig};
use nalgebra::{Point2, Vector2};
use rapier2d::math::Rotation;
use rapier2d::prelude::*;
use roomba_core::heading::normalize_degrees;
use roomba_core::{CommandBuffer, Contact};
use std::collections::HashSet;
use tracing::{debug, info};

/// Physics world
pub struct PhysicsWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    gravity: Vector<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    physics_hooks: (),
    event_handler: (),

    agent_body: RigidBodyHandle,
    agent_collider: ColliderHandle,
    agent_radius: f32,
    /// Colliders touching the agent after the previous step
    touching: HashSet<ColliderHandle>,
    obstacle_count: usize,
}

impl PhysicsWorld {
    /// Build the arena and spawn the agent body at `robot.start`, facing `heading`
    pub fn new(world: &WorldConfig, robot: &RobotConfig, fixed_dt: f32, heading: f32) -> Self {
        let mut rigid_body_set = RigidBodySet::new();
        let mut collider_set = ColliderSet::new();

        let half_w = world.width / 2.0;
        let half_h = world.height / 2.0;
        let t = world.wall_thickness;

        // Bottom, top, left, right; inner faces sit exactly on the world bounds
        let walls = [
            (vector![0.0, -half_h - t / 2.0], vector![world.width + 2.0 * t, t]),
            (vector![0.0, half_h + t / 2.0], vector![world.width + 2.0 * t, t]),
            (vector![-half_w - t / 2.0, 0.0], vector![t, world.height + 2.0 * t]),
            (vector![half_w + t / 2.0, 0.0], vector![t, world.height + 2.0 * t]),
        ];
        let obstacles = world
            .obstacles
            .iter()
            .map(|o| (vector![o.pos[0], o.pos[1]], vector![o.size[0], o.size[1]]));

        for (pos, size) in walls.into_iter().chain(obstacles) {
            let body = RigidBodyBuilder::fixed().translation(pos).build();
            let collider = ColliderBuilder::cuboid(size.x / 2.0, size.y / 2.0)
                .friction(0.0)
                .restitution(0.0)
                .build();
            let handle = rigid_body_set.insert(body);
            collider_set.insert_with_parent(collider, handle, &mut rigid_body_set);
        }

        // Orientation is owned by the controller, so contacts must not spin the body
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![robot.start[0], robot.start[1]])
            .rotation(heading.to_radians())
            .lock_rotations()
            .linear_damping(0.0)
            .ccd_enabled(true)
            .build();
        let collider = ColliderBuilder::ball(robot.radius)
            .friction(0.0)
            .restitution(0.0)
            .build();
        let agent_body = rigid_body_set.insert(body);
        let agent_collider = collider_set.insert_with_parent(collider, agent_body, &mut rigid_body_set);

        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = fixed_dt;

        info!(
            width = world.width,
            height = world.height,
            obstacles = world.obstacles.len(),
            robot = %robot.name,
            "physics world ready"
        );

        Self {
            rigid_body_set,
            collider_set,
            gravity: vector![0.0, 0.0], // Top-down view
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            physics_hooks: (),
            event_handler: (),
            agent_body,
            agent_collider,
            agent_radius: robot.radius,
            touching: HashSet::new(),
            obstacle_count: world.obstacles.len(),
        }
    }

    /// Copy the controller's latest commands onto the agent body
    pub fn apply_commands(&mut self, commands: &mut CommandBuffer) {
        if let Some(body) = self.rigid_body_set.get_mut(self.agent_body) {
            if let Some(heading) = commands.take_orientation() {
                body.set_rotation(Rotation::new(heading.to_radians()), true);
            }
            let v = commands.linear_velocity();
            body.set_linvel(vector![v.x, v.y], true);
            body.set_angvel(commands.angular_velocity(), true);
        }
    }

    /// Advance one fixed tick.
    ///
    /// Returns one contact list per collider the agent started touching during this
    /// step, in no particular order.
    pub fn step(&mut self) -> Vec<Vec<Contact>> {
        let PhysicsWorld {
            ref mut physics_pipeline,
            ref gravity,
            ref integration_parameters,
            ref mut island_manager,
            ref mut broad_phase,
            ref mut narrow_phase,
            ref mut rigid_body_set,
            ref mut collider_set,
            ref mut impulse_joint_set,
            ref mut multibody_joint_set,
            ref mut ccd_solver,
            ref physics_hooks,
            ref event_handler,
            ..
        } = *self;

        physics_pipeline.step(
            gravity,
            integration_parameters,
            island_manager,
            broad_phase,
            narrow_phase,
            rigid_body_set,
            collider_set,
            impulse_joint_set,
            multibody_joint_set,
            ccd_solver,
            None,
            physics_hooks,
            event_handler,
        );

        self.collect_new_contacts()
    }

    /// Edge-triggered contact detection: only colliders that were not touching the
    /// agent after the previous step produce a report.
    fn collect_new_contacts(&mut self) -> Vec<Vec<Contact>> {
        let position = self.agent_position();
        let mut now_touching = HashSet::new();
        let mut reports = Vec::new();

        for pair in self.narrow_phase.contact_pairs_with(self.agent_collider) {
            if !pair.has_any_active_contact {
                continue;
            }
            let agent_is_first = pair.collider1 == self.agent_collider;
            let other = if agent_is_first {
                pair.collider2
            } else {
                pair.collider1
            };
            now_touching.insert(other);
            if self.touching.contains(&other) {
                continue;
            }

            // Manifold normals point from collider1 to collider2; flip so they point
            // away from the obstacle
            let sign = if agent_is_first { -1.0 } else { 1.0 };
            let contacts: Vec<Contact> = pair
                .manifolds
                .iter()
                .filter(|manifold| !manifold.points.is_empty())
                .map(|manifold| {
                    let n = manifold.data.normal * sign;
                    let normal = Vector2::new(n.x, n.y);
                    Contact::new(position - normal * self.agent_radius, normal)
                })
                .collect();

            debug!(contacts = contacts.len(), "agent contact started");
            reports.push(contacts);
        }

        self.touching = now_touching;
        reports
    }

    pub fn agent_position(&self) -> Point2<f32> {
        self.rigid_body_set
            .get(self.agent_body)
            .map(|body| {
                let t = body.translation();
                Point2::new(t.x, t.y)
            })
            .unwrap_or_else(Point2::origin)
    }

    /// Body orientation as a heading in degrees
    pub fn agent_heading(&self) -> f32 {
        self.rigid_body_set
            .get(self.agent_body)
            .map(|body| normalize_degrees(body.rotation().angle().to_degrees()))
            .unwrap_or(0.0)
    }

    pub fn agent_velocity(&self) -> Vector2<f32> {
        self.rigid_body_set
            .get(self.agent_body)
            .map(|body| {
                let v = body.linvel();
                Vector2::new(v.x, v.y)
            })
            .unwrap_or_else(Vector2::zeros)
    }

    pub fn agent_radius(&self) -> f32 {
        self.agent_radius
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacle_count
    }

    pub fn fixed_dt(&self) -> f32 {
        self.integration_parameters.dt
    }
}
