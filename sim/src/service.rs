//! Boundaries to the simulation host.
//!
//! The composer and the driver never reach for a global simulation instance;
//! they are handed something implementing these traits. `RapierWorld`
//! implements all three. Tests use a recording fake.
//!
//! All calls are synchronous. `Simulation::step` blocks until the host has
//! advanced exactly one fixed delta.

use std::fmt;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};

use crate::error::{SceneSetupError, SimError, StateError, StepError};
use crate::prim_path::{PrimPath, PrimPattern};
use crate::spawn::SpawnCfg;
use crate::state::{POSE_LEN, Pose, VELOCITY_LEN};

/// Opaque reference to a realized dynamic object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectHandle(pub u32);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transform of a prim relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub translation: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }
}

impl Placement {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vector3::new(x, y, z),
            orientation: UnitQuaternion::identity(),
        }
    }

    pub fn with_orientation(mut self, orientation: UnitQuaternion<f32>) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn as_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.translation), self.orientation)
    }

    pub fn as_pose(&self) -> Pose {
        Pose {
            position: self.translation,
            orientation: self.orientation,
        }
    }
}

/// Scene-graph service: creates named prims from spawn configs.
pub trait SceneGraph {
    /// Realize `cfg` at `path`, placed relative to the path's parent.
    ///
    /// Returns a handle for dynamic entities and `None` for static decoration.
    fn create_prim(
        &mut self,
        path: &PrimPath,
        cfg: &SpawnCfg,
        placement: &Placement,
    ) -> Result<Option<ObjectHandle>, SceneSetupError>;

    /// Existing prims whose parent part matches `pattern`, joined with its name.
    fn find_prims(&self, pattern: &PrimPattern) -> Vec<PrimPath>;

    fn prim_exists(&self, path: &PrimPath) -> bool;

    /// World-space frame of an existing prim; the root is the identity.
    fn world_pose(&self, path: &PrimPath) -> Option<Isometry3<f32>>;

    fn world_translation(&self, path: &PrimPath) -> Option<Vector3<f32>> {
        self.world_pose(path).map(|iso| iso.translation.vector)
    }
}

/// Timeline control of the simulation host.
pub trait Simulation {
    /// Initialize physics handles and start the timeline. Must precede `step`.
    fn reset(&mut self) -> Result<(), SimError>;

    /// Advance by exactly one `physics_dt()`.
    fn step(&mut self) -> Result<(), StepError>;

    /// The host's "keep running" signal.
    fn is_running(&self) -> bool;

    fn physics_dt(&self) -> f32;

    fn set_camera_view(&mut self, eye: Vector3<f32>, target: Vector3<f32>)
    -> Result<(), SimError>;
}

/// Per-object root state buffers.
///
/// Writes are buffered on the object and pushed to the host by
/// `write_data_to_sim`; reads return the buffer, refreshed by `update`.
pub trait ObjectState {
    fn write_pose(&mut self, handle: ObjectHandle, pose: [f32; POSE_LEN])
    -> Result<(), StateError>;

    fn write_velocity(
        &mut self,
        handle: ObjectHandle,
        velocity: [f32; VELOCITY_LEN],
    ) -> Result<(), StateError>;

    fn read_pose(&self, handle: ObjectHandle) -> Result<[f32; POSE_LEN], StateError>;

    fn read_velocity(&self, handle: ObjectHandle) -> Result<[f32; VELOCITY_LEN], StateError>;

    /// Refresh the object's buffers from the host after a step.
    fn update(&mut self, handle: ObjectHandle, dt: f32) -> Result<(), StateError>;

    /// Push all pending buffered writes into the host.
    fn write_data_to_sim(&mut self) -> Result<(), StateError>;
}
