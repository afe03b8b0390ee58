// End-to-end runs of the controller inside the rapier2d arena
use approx::assert_relative_eq;
use roomba_core::heading::shortest_delta;
use roomba_core::BouncePolicy;
use roomba_sim::{SampleState, SimConfig, Simulation, WorldConfig};

fn seeded_config(seed: u64, policy: BouncePolicy) -> SimConfig {
    let mut config = SimConfig::default();
    config.motion = config
        .motion
        .with_policy(policy)
        .unwrap()
        .with_seed(seed);
    config
}

#[test]
fn test_default_arena_config_file_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/arena.toml");
    let config = SimConfig::load(path).unwrap();
    assert_eq!(config.motion.policy(), BouncePolicy::jittered());
    assert_eq!(config.world.obstacles.len(), 3);
}

#[test]
fn test_agent_keeps_bouncing_inside_the_box() {
    for policy in [BouncePolicy::Reflect, BouncePolicy::jittered()] {
        let mut sim = Simulation::new(seeded_config(42, policy), true).unwrap();
        let summary = sim.run_for(20.0).clone();

        assert!(summary.collisions_seen > 0, "{policy}: no collisions");
        assert!(summary.collisions_accepted > 0);
        assert!(summary.turns_completed > 0);
        assert!(summary.collisions_accepted <= summary.collisions_seen);
        assert!(summary.distance_travelled > 5.0);

        let world = &sim.config().world;
        let radius = sim.config().robot.radius;
        let half_w = world.width / 2.0;
        let half_h = world.height / 2.0;
        for sample in sim.recorder().samples() {
            let [x, y] = sample.position;
            assert!(x.abs() <= half_w - radius + 0.05, "left the box: {:?}", sample);
            assert!(y.abs() <= half_h - radius + 0.05, "left the box: {:?}", sample);
            assert!((0.0..360.0).contains(&sample.heading));
        }
    }
}

#[test]
fn test_turning_samples_report_progress() {
    let mut sim = Simulation::new(seeded_config(3, BouncePolicy::Reflect), true).unwrap();
    sim.run_for(15.0);

    let turning: Vec<_> = sim
        .recorder()
        .samples()
        .iter()
        .filter(|s| s.state == SampleState::Turning)
        .collect();
    assert!(!turning.is_empty());
    for sample in turning {
        let progress = sample.turn_progress.unwrap();
        assert!((0.0..=1.0).contains(&progress));
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = |seed| {
        let mut sim = Simulation::new(seeded_config(seed, BouncePolicy::jittered()), false).unwrap();
        sim.run_for(8.0);
        (
            sim.summary().clone(),
            sim.controller().heading(),
            sim.world().agent_position(),
        )
    };

    let (summary_a, heading_a, position_a) = run(9);
    let (summary_b, heading_b, position_b) = run(9);
    assert_eq!(summary_a.collisions_seen, summary_b.collisions_seen);
    assert_eq!(summary_a.ticks, summary_b.ticks);
    assert_eq!(heading_a, heading_b);
    assert_eq!(position_a, position_b);
}

#[test]
fn test_head_on_wall_turns_around() {
    let mut config = SimConfig::default();
    config.world = WorldConfig {
        width: 4.0,
        height: 4.0,
        wall_thickness: 0.2,
        obstacles: Vec::new(),
    };
    config.robot.initial_heading = Some(0.0);
    config.clock.render_jitter = 0.0;
    config.motion = config.motion.with_seed(1);

    let mut sim = Simulation::new(config, true).unwrap();
    assert!(sim.recorder().is_enabled());
    let mut frames = 0;
    while sim.summary().turns_completed == 0 {
        sim.frame(1.0 / 60.0);
        frames += 1;
        assert!(frames < 600, "agent never completed a turn");
    }

    // Facing +Y into the top wall mirrors straight back to 180°
    let heading = sim.controller().heading();
    assert!(shortest_delta(180.0, heading).abs() < 1.0, "heading {heading}");
    assert!(sim.controller().is_moving());

    // First collision after ~0.9s of driving plus the 0.5s pause
    assert_relative_eq!(sim.clock().sim_time(), 1.4, epsilon = 0.1);

    // Next ticks drive it back down
    for _ in 0..30 {
        sim.frame(1.0 / 60.0);
    }
    let last = sim.recorder().samples().last().unwrap();
    assert!(last.velocity[1] < -1.5, "velocity {:?}", last.velocity);
}

fn corridor_config(physics_hz: f32) -> SimConfig {
    let mut config = SimConfig::default();
    config.world = WorldConfig {
        width: 4.0,
        height: 4.0,
        wall_thickness: 0.2,
        obstacles: Vec::new(),
    };
    config.robot.initial_heading = Some(0.0);
    config.clock.physics_hz = physics_hz;
    config.clock.render_jitter = 0.0;
    config.motion = config.motion.with_seed(1);
    config
}

#[test]
fn test_turn_lasts_whole_number_of_ticks() {
    // Default 0.5s pause at 100Hz is exactly 50 ticks
    let mut sim = Simulation::new(corridor_config(100.0), false).unwrap();
    assert!(!sim.recorder().is_enabled());

    while sim.summary().collisions_accepted == 0 {
        assert_eq!(sim.frame(0.01), 1);
        assert!(sim.clock().total_ticks() < 1000, "never hit the wall");
    }
    let turn_started = sim.clock().total_ticks();

    while sim.summary().turns_completed == 0 {
        assert_eq!(sim.frame(0.01), 1);
    }
    assert_eq!(sim.clock().total_ticks() - turn_started, 50);
    assert!(sim.recorder().samples().is_empty());
}

#[test]
fn test_degenerate_clock_is_rejected() {
    for physics_hz in [f32::INFINITY, f32::NAN, 0.0] {
        assert!(Simulation::new(corridor_config(physics_hz), false).is_err());
    }
}

#[test]
fn test_infinite_run_length_simulates_nothing() {
    let mut sim = Simulation::new(corridor_config(50.0), false).unwrap();
    let summary = sim.run_for(f32::INFINITY).clone();
    assert_eq!(summary.ticks, 0);
    assert_eq!(sim.clock().sim_time(), 0.0);
}
