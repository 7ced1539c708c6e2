pub mod articulation;
pub mod asset;
pub mod composer;
pub mod constants;
pub mod driver;
pub mod error;
pub mod prim_path;
pub mod rapier;
pub mod rapier_world;
pub mod reset;
pub mod service;
pub mod sim_config;
pub mod spawn;
pub mod state;

#[cfg(test)]
mod test_support;

// Downstream crates can name rapier/nalgebra types without depending on them directly.
pub use nalgebra;
pub use rapier3d;

pub use articulation::{ActuatorCfg, ArticulationCfg, InitialState, ResolvedArticulation};
pub use asset::{AssetDescriptor, AssetLibrary};
pub use composer::{ComposedScene, FailurePolicy, SceneComposer, SpawnRequest, SpawnedObject};
pub use constants::{
    DEFAULT_LOG_EVERY, DEFAULT_PHYSICS_DT, DEFAULT_RESET_PERIOD, GRAVITY_MPS2, WORLD_ROOT,
};
pub use driver::{
    DriverConfig, DriverStats, LogObserver, StepLoopDriver, StepObserver, TrackedObject,
};
pub use error::{SceneSetupError, SimError, StateError, StepError};
pub use prim_path::{PrimPath, PrimPattern};
pub use rapier_world::{CameraView, RapierWorld};
pub use reset::{CylinderShell, ResetPolicy, compute_reset_state, sample_cylinder};
pub use service::{ObjectHandle, ObjectState, Placement, SceneGraph, Simulation};
pub use sim_config::SimulationConfig;
pub use spawn::SpawnCfg;
pub use state::{Pose, RootState, Velocity};
