use anyhow::{Context, Result};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use sim::{
    DriverConfig, DriverStats, FailurePolicy, LogObserver, RapierWorld, SceneComposer,
    Simulation, SimulationConfig, StepLoopDriver, TrackedObject,
};

use crate::assets::builtin_library;
use crate::cli::Cli;
use crate::presets::{self, SceneParams};

/// Launch the backend, compose the chosen scene and run the loop until the host stops.
pub fn run(cli: &Cli) -> Result<DriverStats> {
    info!(
        "Launching `{}` scene ({}x{} viewport{})",
        cli.preset,
        cli.width,
        cli.height,
        if cli.headless { ", headless" } else { "" }
    );

    let config = SimulationConfig::default()
        .with_dt(cli.dt)
        .with_device(cli.device.clone());
    let assets = builtin_library(&cli.asset_root).context("failed to register built-in assets")?;
    let mut world = RapierWorld::new(config, assets)
        .context("failed to launch simulation")?
        .with_step_budget(cli.step_budget());

    let scene = presets::build(
        cli.preset,
        SceneParams {
            cuboid_size: cli.size,
            num_envs: cli.num_envs,
        },
    )
    .with_context(|| format!("failed to build `{}` scene", cli.preset))?;
    world.set_camera_view(scene.camera_eye, scene.camera_target)?;

    let policy = if cli.skip_failed {
        FailurePolicy::SkipAndLog
    } else {
        FailurePolicy::Abort
    };
    let composed = SceneComposer::new(&mut world)
        .with_policy(policy)
        .compose(&scene.requests)
        .context("scene setup failed")?;

    world.reset().context("failed to start the simulation")?;
    info!(
        "Setup complete... (`{}` scene, {} dynamic objects)",
        scene.preset,
        composed.dynamic.len()
    );

    let tracked: Vec<TrackedObject> = if scene.track_dynamic {
        composed.dynamic.into_iter().map(Into::into).collect()
    } else {
        Vec::new()
    };
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let driver_config = DriverConfig {
        reset_period: cli.reset_period,
        reset_policy: scene.reset_policy,
    };

    let stats = StepLoopDriver::new(&mut world, tracked, driver_config, rng)?
        .run(&mut LogObserver::default())?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["simlab"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn rigid_object_run_resets_every_period() {
        let stats = run(&cli(&[
            "--preset",
            "rigid-object",
            "--max-steps",
            "300",
            "--reset-period",
            "100",
            "--seed",
            "1",
        ]))
        .unwrap();
        assert_eq!(stats.steps, 300);
        assert_eq!(stats.resets, 3);
    }

    #[test]
    fn every_preset_runs_headless() {
        for preset in ["empty", "cuboid", "spawn-prims", "robots"] {
            let stats = run(&cli(&[
                "--preset",
                preset,
                "--headless",
                "--max-steps",
                "20",
                "--num-envs",
                "2",
                "--seed",
                "0",
            ]))
            .unwrap();
            assert_eq!(stats.steps, 20, "{preset}");
        }
    }

    #[test]
    fn custom_asset_root_resolves_relative_paths() {
        let stats = run(&cli(&[
            "--preset",
            "spawn-prims",
            "--asset-root",
            "/mnt/nucleus",
            "--max-steps",
            "5",
        ]))
        .unwrap();
        assert_eq!(stats.steps, 5);
    }

    #[test]
    fn zero_reset_period_is_fatal() {
        let err = run(&cli(&["--reset-period", "0", "--max-steps", "5"])).unwrap_err();
        assert!(err.to_string().contains("reset period"));
    }

    #[test]
    fn non_positive_dt_fails_launch() {
        let err = run(&cli(&["--dt=0", "--max-steps", "5"])).unwrap_err();
        assert!(format!("{err:#}").contains("physics dt"));
    }
}
