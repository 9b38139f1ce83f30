//! # Pose Probe
//!
//! Headless run of the presentation pipeline over a scripted scene:
//! carriers orbiting a star, mining vessels circling their carrier while
//! their holds fill, an asteroid being mined out, and short-lived
//! projectiles churning the lifecycle.
//!
//! ```text
//! pose_probe [config.toml] [--frames N] [--pause-at N] [--resume-at N]
//! ```
//!
//! Exits non-zero if any pose-history invariant is violated.

use std::path::PathBuf;
use std::process::ExitCode;

use meridian_core::{
    CargoHold, EntityId, PoseSnapshot, RenderKind, RenderTint, Renderable, ResourceDeposit,
    ResourceKind, TickContext, World,
};
use meridian_presentation::{
    FrameDriver, PresentationConfig, PresentationError, PresentationResult, RenderInstance,
};
use meridian_shared::{Quaternion, Transform, Vec3};

/// Display refresh the probe pretends to run at.
const DISPLAY_HZ: f32 = 144.0;

/// Every this many frames one frame takes far too long.
const HITCH_EVERY: u64 = 250;

const HITCH_SECONDS: f32 = 0.4;

const PROJECTILE_EVERY_TICKS: u32 = 30;
const PROJECTILE_LIFETIME_TICKS: u32 = 20;

#[derive(Debug)]
struct ProbeArgs {
    config: Option<PathBuf>,
    frames: u64,
    pause_at: Option<u64>,
    resume_at: Option<u64>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> PresentationResult<ProbeArgs> {
    let mut parsed = ProbeArgs {
        config: None,
        frames: 600,
        pause_at: None,
        resume_at: None,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--frames" => parsed.frames = number(&arg, args.next())?,
            "--pause-at" => parsed.pause_at = Some(number(&arg, args.next())?),
            "--resume-at" => parsed.resume_at = Some(number(&arg, args.next())?),
            flag if flag.starts_with("--") => {
                return Err(PresentationError::InvalidArgument(format!("unknown flag {flag}")));
            }
            _ if parsed.config.is_none() => parsed.config = Some(PathBuf::from(arg)),
            _ => {
                return Err(PresentationError::InvalidArgument(format!(
                    "unexpected argument {arg}"
                )));
            }
        }
    }
    Ok(parsed)
}

fn number(flag: &str, value: Option<String>) -> PresentationResult<u64> {
    let value =
        value.ok_or_else(|| PresentationError::InvalidArgument(format!("{flag} needs a value")))?;
    value
        .parse()
        .map_err(|_| PresentationError::InvalidArgument(format!("{flag}: {value} is not a number")))
}

// =============================================================================
// SCENE
// =============================================================================

struct Orbiter {
    id: EntityId,
    /// Orbit center; `None` orbits the origin.
    around: Option<EntityId>,
    radius: f32,
    angular_speed: f32,
    phase: f32,
}

struct Scene {
    step_seconds: f32,
    orbiters: Vec<Orbiter>,
    vessels: Vec<EntityId>,
    asteroid: EntityId,
    projectiles: Vec<(EntityId, u32)>,
}

impl Scene {
    fn build(world: &mut World, step_seconds: f32) -> Self {
        let mut orbiters = Vec::new();
        let mut vessels = Vec::new();

        let carrier_tints = [
            RenderTint::new(0.3, 0.6, 1.0, 1.0),
            RenderTint::new(1.0, 0.35, 0.3, 1.0),
            RenderTint::new(0.4, 1.0, 0.5, 1.0),
        ];
        for (i, tint) in carrier_tints.into_iter().enumerate() {
            let carrier = world.spawn();
            world.set_tint(carrier, tint);
            world.make_renderable(carrier, Renderable::new(RenderKind::Carrier, 20.0 + 20.0 * i as f32));
            orbiters.push(Orbiter {
                id: carrier,
                around: None,
                radius: 40.0 + 15.0 * i as f32,
                angular_speed: 0.2 + 0.05 * i as f32,
                phase: i as f32 * 2.1,
            });

            for j in 0..4 {
                let vessel = world.spawn();
                let capacity = 50.0 + 25.0 * j as f32;
                let resource = ResourceKind::from_u32(j).unwrap_or(ResourceKind::Ore);
                world.set_cargo_hold(vessel, CargoHold::new(capacity, resource, carrier));
                world.make_renderable(vessel, Renderable::new(RenderKind::MiningVessel, capacity));
                orbiters.push(Orbiter {
                    id: vessel,
                    around: Some(carrier),
                    radius: 3.0 + j as f32,
                    angular_speed: 1.5,
                    phase: j as f32 * std::f32::consts::FRAC_PI_2,
                });
                vessels.push(vessel);
            }
        }

        let asteroid = world.spawn_with_transform(Transform::from_position(Vec3::new(10.0, 0.0, -5.0)));
        world.set_deposit(asteroid, ResourceDeposit::full(400.0, ResourceKind::RareMetals));
        world.make_renderable(asteroid, Renderable::new(RenderKind::Asteroid, 0.0));

        Self {
            step_seconds,
            orbiters,
            vessels,
            asteroid,
            projectiles: Vec::new(),
        }
    }

    fn simulate(&mut self, world: &mut World, ctx: TickContext) {
        let t = ctx.tick as f32 * self.step_seconds;

        // Centers before satellites: carriers precede their vessels
        for orbiter in &self.orbiters {
            let center = orbiter
                .around
                .and_then(|c| world.transform(c))
                .map_or(Vec3::ZERO, |c| c.position);
            let angle = orbiter.phase + orbiter.angular_speed * t;
            let position = center + Vec3::new(angle.cos(), 0.0, angle.sin()) * orbiter.radius;
            let rotation = Quaternion::from_axis_angle(Vec3::Y, -angle);
            if let Some(pose) = world.transform_mut(orbiter.id) {
                pose.position = position;
                pose.rotation = rotation;
            }
        }

        for &vessel in &self.vessels {
            if let Some(hold) = world.cargo_hold_mut(vessel) {
                hold.amount += 0.5;
                if hold.amount > hold.capacity {
                    hold.amount = 0.0;
                }
            }
        }

        if let Some(deposit) = world.deposit_mut(self.asteroid) {
            deposit.amount = (deposit.amount - 1.0).max(0.0);
        }

        let tick = ctx.tick;
        self.projectiles.retain(|&(id, born)| {
            if tick.saturating_sub(born) >= PROJECTILE_LIFETIME_TICKS {
                world.despawn(id);
                false
            } else {
                true
            }
        });
        for &(id, born) in &self.projectiles {
            let travelled = (tick - born) as f32;
            world.set_transform(id, Transform::from_position(Vec3::new(travelled * 2.0, 1.0, 0.0)));
        }
        if tick % PROJECTILE_EVERY_TICKS == 0 {
            let id = world.spawn_with_transform(Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
            if world.make_renderable(id, Renderable::new(RenderKind::Projectile, 0.0)) {
                self.projectiles.push((id, tick));
            }
        }
    }
}

// =============================================================================
// INVARIANTS
// =============================================================================

#[derive(Default)]
struct Checker {
    violations: usize,
    frozen: Option<(Vec<(EntityId, PoseSnapshot)>, Vec<RenderInstance>)>,
}

impl Checker {
    fn check(&mut self, frame: u64, driver: &FrameDriver) {
        let tick = driver.clock().tick();
        for (entity, snap) in driver.state().snapshots().iter() {
            if snap.prev_tick() > snap.curr_tick() || snap.curr_tick() > tick {
                self.fail(frame, &format!(
                    "{entity}: ticks out of order (prev {}, curr {}, clock {tick})",
                    snap.prev_tick(),
                    snap.curr_tick()
                ));
            }
        }

        if driver.is_paused() {
            let now = capture(driver);
            match self.frozen.as_ref().map(|frozen| *frozen == now) {
                Some(true) => {}
                Some(false) => self.fail(frame, "presentation changed while paused"),
                None => self.frozen = Some(now),
            }
        } else {
            self.frozen = None;
        }
    }

    fn fail(&mut self, frame: u64, what: &str) {
        self.violations += 1;
        tracing::error!(frame, "invariant violated: {what}");
    }
}

fn capture(driver: &FrameDriver) -> (Vec<(EntityId, PoseSnapshot)>, Vec<RenderInstance>) {
    let snapshots = driver.state().snapshots().iter().map(|(id, s)| (id, *s)).collect();
    (snapshots, driver.sampler().instances().to_vec())
}

// =============================================================================
// MAIN
// =============================================================================

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("meridian=info,pose_probe=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run(args: &ProbeArgs) -> PresentationResult<usize> {
    let raw = match &args.config {
        Some(path) => PresentationConfig::load(path)?,
        None => PresentationConfig::default(),
    };
    let config = raw.bake()?;
    let step_seconds = config.timing.step_seconds;

    let mut world = World::new(1024);
    let mut scene = Scene::build(&mut world, step_seconds);
    let mut driver = FrameDriver::new(config, &mut world);
    let mut checker = Checker::default();

    let frame_seconds = 1.0 / DISPLAY_HZ;
    let mut total_steps = 0u64;
    let mut total_dropped = 0u64;

    for frame in 0..args.frames {
        if args.pause_at == Some(frame) {
            tracing::info!(frame, tick = driver.clock().tick(), "pausing");
            driver.pause();
        }
        if args.resume_at == Some(frame) {
            tracing::info!(frame, tick = driver.clock().tick(), "resuming");
            driver.resume();
        }

        let dt = if frame > 0 && frame % HITCH_EVERY == 0 {
            HITCH_SECONDS
        } else {
            frame_seconds
        };
        let stats = driver.frame(&mut world, dt, |world, ctx| scene.simulate(world, ctx));
        total_steps += u64::from(stats.steps);
        total_dropped += u64::from(stats.dropped_steps);

        checker.check(frame, &driver);

        if frame % 60 == 0 {
            tracing::info!(
                frame,
                tick = stats.tick,
                steps = stats.steps,
                alpha = stats.alpha,
                tracked = stats.tracked,
                overlays = driver.sampler().overlays().len(),
                paused = driver.is_paused(),
                "frame"
            );
        }
    }

    tracing::info!(
        frames = args.frames,
        ticks = driver.clock().tick(),
        steps = total_steps,
        dropped = total_dropped,
        violations = checker.violations,
        "probe finished"
    );
    Ok(checker.violations)
}

fn main() -> ExitCode {
    init_tracing();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Usage: pose_probe [config.toml] [--frames N] [--pause-at N] [--resume-at N]");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(violations) => {
            tracing::error!(violations, "pose history invariants violated");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> PresentationResult<ProbeArgs> {
        parse_args(list.iter().map(|s| (*s).to_owned()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["probe.toml", "--frames", "90", "--pause-at", "10", "--resume-at", "20"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("probe.toml")));
        assert_eq!(parsed.frames, 90);
        assert_eq!(parsed.pause_at, Some(10));
        assert_eq!(parsed.resume_at, Some(20));

        assert!(args(&["--frames"]).is_err());
        assert!(args(&["--frames", "many"]).is_err());
        assert!(args(&["--bogus"]).is_err());
        assert!(args(&["a.toml", "b.toml"]).is_err());
    }

    #[test]
    fn test_scripted_scene_keeps_invariants() {
        let parsed = args(&["--frames", "400", "--pause-at", "100", "--resume-at", "160"]).unwrap();
        assert_eq!(run(&parsed).unwrap(), 0);
    }
}
