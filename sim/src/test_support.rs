//! Recording fake of the simulation host used by unit tests.
//!
//! It keeps prim world frames and per-handle state buffers, records
//! every boundary call in order, and never moves anything on `step`.

use std::collections::BTreeMap;

use nalgebra::{Isometry3, Vector3};

use crate::error::{SceneSetupError, SimError, StateError, StepError};
use crate::prim_path::{PrimPath, PrimPattern};
use crate::service::{ObjectHandle, ObjectState, Placement, SceneGraph, Simulation};
use crate::spawn::SpawnCfg;
use crate::state::{POSE_LEN, Pose, VELOCITY_LEN};

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreatePrim(String),
    Reset,
    Step,
    CameraView,
    WritePose(ObjectHandle),
    WriteVelocity(ObjectHandle),
    Update(ObjectHandle),
    WriteDataToSim,
}

pub struct RecordingHost {
    pub calls: Vec<Call>,
    pub dt: f32,
    pub playing: bool,
    pub steps: u64,
    pub step_budget: Option<u64>,
    prims: BTreeMap<PrimPath, Isometry3<f32>>,
    poses: BTreeMap<ObjectHandle, [f32; POSE_LEN]>,
    velocities: BTreeMap<ObjectHandle, [f32; VELOCITY_LEN]>,
    next_handle: u32,
    fail_on: Option<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            dt: 0.01,
            playing: false,
            steps: 0,
            step_budget: None,
            prims: BTreeMap::new(),
            poses: BTreeMap::new(),
            velocities: BTreeMap::new(),
            next_handle: 0,
            fail_on: None,
        }
    }

    pub fn with_budget(mut self, steps: u64) -> Self {
        self.step_budget = Some(steps);
        self
    }

    /// Make `create_prim` fail for this exact path.
    pub fn fail_on(&mut self, path: &str) {
        self.fail_on = Some(path.to_string());
    }

    pub fn created_paths(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::CreatePrim(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    /// Spawn a dynamic body directly, bypassing the composer.
    pub fn spawn_body(&mut self, position: Vector3<f32>) -> ObjectHandle {
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.poses.insert(handle, Pose::from_position(position).to_array());
        self.velocities.insert(handle, [0.0; VELOCITY_LEN]);
        handle
    }
}

impl SceneGraph for RecordingHost {
    fn create_prim(
        &mut self,
        path: &PrimPath,
        cfg: &SpawnCfg,
        placement: &Placement,
    ) -> Result<Option<ObjectHandle>, SceneSetupError> {
        self.calls.push(Call::CreatePrim(path.to_string()));
        if self.fail_on.as_deref() == Some(path.to_string().as_str()) {
            return Err(SceneSetupError::AssetNotFound(path.to_string()));
        }
        if self.prims.contains_key(path) {
            return Err(SceneSetupError::DuplicatePath(path.to_string()));
        }
        let parent = self.world_pose(&path.parent()).unwrap_or_else(Isometry3::identity);
        let world = parent * placement.as_isometry();
        self.prims.insert(path.clone(), world);

        if cfg.is_dynamic() {
            let handle = self.spawn_body(world.translation.vector);
            let pose = Pose {
                position: world.translation.vector,
                orientation: world.rotation,
            };
            self.poses.insert(handle, pose.to_array());
            Ok(Some(handle))
        } else {
            Ok(None)
        }
    }

    fn find_prims(&self, pattern: &PrimPattern) -> Vec<PrimPath> {
        pattern.expand(self.prims.keys())
    }

    fn prim_exists(&self, path: &PrimPath) -> bool {
        path.is_root() || self.prims.contains_key(path)
    }

    fn world_pose(&self, path: &PrimPath) -> Option<Isometry3<f32>> {
        if path.is_root() {
            return Some(Isometry3::identity());
        }
        self.prims.get(path).copied()
    }
}

impl Simulation for RecordingHost {
    fn reset(&mut self) -> Result<(), SimError> {
        self.calls.push(Call::Reset);
        self.playing = true;
        Ok(())
    }

    fn step(&mut self) -> Result<(), StepError> {
        if !self.playing {
            return Err(StepError::NotPlaying);
        }
        self.calls.push(Call::Step);
        self.steps += 1;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.step_budget.is_none_or(|budget| self.steps < budget)
    }

    fn physics_dt(&self) -> f32 {
        self.dt
    }

    fn set_camera_view(
        &mut self,
        _eye: Vector3<f32>,
        _target: Vector3<f32>,
    ) -> Result<(), SimError> {
        self.calls.push(Call::CameraView);
        Ok(())
    }
}

impl ObjectState for RecordingHost {
    fn write_pose(
        &mut self,
        handle: ObjectHandle,
        pose: [f32; POSE_LEN],
    ) -> Result<(), StateError> {
        self.calls.push(Call::WritePose(handle));
        let slot = self
            .poses
            .get_mut(&handle)
            .ok_or(StateError::UnknownHandle(handle))?;
        *slot = pose;
        Ok(())
    }

    fn write_velocity(
        &mut self,
        handle: ObjectHandle,
        velocity: [f32; VELOCITY_LEN],
    ) -> Result<(), StateError> {
        self.calls.push(Call::WriteVelocity(handle));
        let slot = self
            .velocities
            .get_mut(&handle)
            .ok_or(StateError::UnknownHandle(handle))?;
        *slot = velocity;
        Ok(())
    }

    fn read_pose(&self, handle: ObjectHandle) -> Result<[f32; POSE_LEN], StateError> {
        self.poses
            .get(&handle)
            .copied()
            .ok_or(StateError::UnknownHandle(handle))
    }

    fn read_velocity(&self, handle: ObjectHandle) -> Result<[f32; VELOCITY_LEN], StateError> {
        self.velocities
            .get(&handle)
            .copied()
            .ok_or(StateError::UnknownHandle(handle))
    }

    fn update(&mut self, handle: ObjectHandle, _dt: f32) -> Result<(), StateError> {
        self.calls.push(Call::Update(handle));
        if self.poses.contains_key(&handle) {
            Ok(())
        } else {
            Err(StateError::UnknownHandle(handle))
        }
    }

    fn write_data_to_sim(&mut self) -> Result<(), StateError> {
        self.calls.push(Call::WriteDataToSim);
        Ok(())
    }
}
