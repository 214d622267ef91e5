use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use marbleworks_input::{Action, InputMap, Key};
use marbleworks_kernel::World;
use marbleworks_particles::{Emitter, EmitterConfig, EmitterShape};
use marbleworks_physics::{Marble, PhysicsWorld};
use marbleworks_render::{DebugTextRenderer, OrbitCamera, ParticleBatch, Renderer};
use marbleworks_tools::WorldInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "marbleworks-cli", about = "Headless marbleworks demos and inspection")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Roll a marble across a ground plane with a dust emitter attached
    Marble {
        /// Number of physics steps to simulate
        #[arg(short, long, default_value = "240")]
        steps: usize,
        /// Direction keys held for the whole run (w, a, s, d)
        #[arg(short, long, default_value = "w")]
        keys: String,
        /// Emit the final world summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a standalone particle emitter and print its cursor state
    Particles {
        /// Ring buffer capacity
        #[arg(short, long, default_value = "100")]
        capacity: usize,
        /// Particles spawned per second
        #[arg(short, long, default_value = "5.0")]
        rate: f32,
        /// Particle lifetime in seconds
        #[arg(short, long, default_value = "2.0")]
        lifetime: f32,
        /// Spawn shape: point, cube, or sphere
        #[arg(long, default_value = "point")]
        shape: String,
        /// Number of update steps
        #[arg(long, default_value = "60")]
        steps: usize,
        /// Seconds per step
        #[arg(long, default_value = "0.1")]
        dt: f32,
        /// Load the emitter config from a JSON file instead of flags
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("marbleworks-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", marbleworks_scene::crate_info());
            println!("particles: {}", marbleworks_particles::crate_info());
            println!("physics: {}", marbleworks_physics::crate_info());
            println!("render: {}", marbleworks_render::crate_info());
            println!("input: {}", marbleworks_input::crate_info());
            println!("tools: {}", marbleworks_tools::crate_info());
        }
        Commands::Marble { steps, keys, json } => run_marble(steps, &keys, json)?,
        Commands::Particles {
            capacity,
            rate,
            lifetime,
            shape,
            steps,
            dt,
            config,
        } => run_particles(capacity, rate, lifetime, &shape, steps, dt, config)?,
    }

    Ok(())
}

fn parse_keys(keys: &str) -> anyhow::Result<Vec<Key>> {
    keys.chars()
        .map(|c| match c.to_ascii_lowercase() {
            'w' => Ok(Key::W),
            'a' => Ok(Key::A),
            's' => Ok(Key::S),
            'd' => Ok(Key::D),
            other => anyhow::bail!("unknown direction key '{other}'"),
        })
        .collect()
}

/// The full demo loop, headless: physics drives the marble, the marble's
/// node drives a dust emitter and the camera, and the debug renderer
/// prints the result.
fn run_marble(steps: usize, keys: &str, json: bool) -> anyhow::Result<()> {
    let held = parse_keys(keys)?;
    let spawn = Vec3::new(0.0, 3.0, 0.0);

    let mut world = World::new();
    let mut physics = PhysicsWorld::new();
    physics.add_ground(Vec3::new(50.0, 0.1, 50.0));

    let marble_id = world.spawn("marble");
    let marble_node = world.node_of(marble_id).context("marble node missing")?;
    let marble = Marble::new(&mut physics, marble_node, spawn);

    // Dust trails the marble: its emitter samples the marble's world pose.
    let dust_id = world.spawn_child("dust", marble_id).context("dust spawn failed")?;
    let dust_config = EmitterConfig {
        capacity: 200,
        particles_per_second: 30.0,
        lifetime: 1.5,
        shape: EmitterShape::Sphere,
        ..EmitterConfig::default()
    };
    world.attach_emitter(dust_id, dust_config, 42)?;

    let mut camera = OrbitCamera::new(world.scene_mut(), 10.0);
    camera.orbit(world.scene_mut(), 0.4, 0.0);

    let map = InputMap::new();
    let dt = physics.fixed_dt();
    for _ in 0..steps {
        for action in map.actions(&held) {
            match action {
                Action::Roll(dir) => marble.push(&mut physics, dir),
                Action::Orbit { pitch, yaw } => camera.orbit(world.scene_mut(), pitch, yaw),
                Action::ResetMarble => marble.reset(&mut physics, spawn),
                Action::Noop => {}
            }
        }

        physics.step();
        marble.clear_forces(&mut physics);
        marble.sync_scene(&physics, world.scene_mut());
        if let Some(pos) = marble.position(&physics) {
            camera.follow(world.scene_mut(), pos);
        }
        world.step(dt);
    }

    let view = camera.view(world.scene_mut());
    let renderer = DebugTextRenderer::new();
    print!("{}", renderer.render(&mut world, &view));

    if json {
        let summary = WorldInspector::summary(&world);
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if let Some(info) = WorldInspector::inspect_entity(&mut world, marble_id) {
        println!("{info}");
    }

    Ok(())
}

fn run_particles(
    capacity: usize,
    rate: f32,
    lifetime: f32,
    shape: &str,
    steps: usize,
    dt: f32,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<EmitterConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => EmitterConfig {
            capacity,
            particles_per_second: rate,
            lifetime,
            shape: shape.parse::<EmitterShape>().map_err(anyhow::Error::msg)?,
            ..EmitterConfig::default()
        },
    };

    let mut emitter = Emitter::new(config, 42)?;
    let mut sim_time = 0.0;
    for step in 0..steps {
        sim_time += dt;
        emitter.update(dt, sim_time, Vec3::ZERO, Vec3::ONE);
        if (step + 1) % 10 == 0 || step + 1 == steps {
            println!(
                "t={:>6.2}s living={:>4} first_alive={:>4} first_dead={:>4}",
                sim_time,
                emitter.living_count(),
                emitter.index_first_alive(),
                emitter.index_first_dead(),
            );
        }
    }

    let batch = ParticleBatch::from_emitter(&emitter);
    println!(
        "snapshot: {} instances, {} quad indices, {} bytes",
        batch.instance_count(),
        batch.index_count(),
        batch.instance_bytes().len()
    );

    Ok(())
}
