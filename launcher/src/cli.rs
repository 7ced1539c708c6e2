use std::fmt;

use clap::{Parser, ValueEnum};
use sim::constants::{
    DEFAULT_DEVICE, DEFAULT_PHYSICS_DT, DEFAULT_RESET_PERIOD, DEFAULT_VIEWPORT_HEIGHT,
    DEFAULT_VIEWPORT_WIDTH,
};

use crate::assets::DEFAULT_ASSET_ROOT;

/// Which demo scene to build.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Nothing but the physics context.
    Empty,
    /// Ground, light, visual and rigid cones, a deformable cuboid and a table.
    SpawnPrims,
    /// Ground, light and a single visual cuboid of side `--size`.
    Cuboid,
    /// Four cones dropped onto the ground and re-dropped every reset period.
    RigidObject,
    /// A wheeled robot and a small arm in each environment.
    Robots,
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Empty => "empty",
            Preset::SpawnPrims => "spawn-prims",
            Preset::Cuboid => "cuboid",
            Preset::RigidObject => "rigid-object",
            Preset::Robots => "robots",
        };
        f.write_str(name)
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Compose a demo scene and run the fixed-step simulation loop", long_about = None)]
pub struct Cli {
    /// Scene to build.
    #[arg(long, value_enum, default_value_t = Preset::RigidObject)]
    pub preset: Preset,

    /// Number of environments for the robots scene.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub num_envs: u32,

    /// Side length of the cuboid in the cuboid scene (meters).
    #[arg(long, default_value_t = 1.0)]
    pub size: f32,

    /// Viewport width. Recorded only; nothing is rendered.
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH)]
    pub width: u32,

    /// Viewport height. Recorded only; nothing is rendered.
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_HEIGHT)]
    pub height: u32,

    /// Run without a viewport.
    #[arg(long, default_value_t = false)]
    pub headless: bool,

    /// Simulation device.
    #[arg(long, default_value = DEFAULT_DEVICE)]
    pub device: String,

    /// Seed for reset randomization. Omit for a random seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many steps. 0 runs until interrupted.
    #[arg(long, default_value_t = 1000)]
    pub max_steps: u64,

    /// Steps between resets of tracked objects.
    #[arg(long, default_value_t = DEFAULT_RESET_PERIOD)]
    pub reset_period: u32,

    /// Physics time step (seconds).
    #[arg(long, default_value_t = DEFAULT_PHYSICS_DT)]
    pub dt: f32,

    /// Root that asset paths are resolved against.
    #[arg(long, default_value = DEFAULT_ASSET_ROOT)]
    pub asset_root: String,

    /// Log and skip prims that fail to spawn instead of aborting.
    #[arg(long, default_value_t = false)]
    pub skip_failed: bool,
}

impl Cli {
    pub fn step_budget(&self) -> Option<u64> {
        (self.max_steps > 0).then_some(self.max_steps)
    }
}
