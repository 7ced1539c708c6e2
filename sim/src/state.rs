//! Root state of a rigid body: pose (7 values) and velocity (6 values).
//!
//! Layout
//! - Pose:     `[x, y, z, qw, qx, qy, qz]` (scalar-first quaternion).
//! - Velocity: `[vx, vy, vz, wx, wy, wz]` (linear, then angular).
//! - Root:     pose followed by velocity, 13 values.
//!
//! The array forms are what crosses the per-object state boundary; the typed
//! forms are what the reset policy and the driver compute with.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::constants::QUAT_NORM_EPS_SQ;
use crate::error::StateError;

pub const POSE_LEN: usize = 7;
pub const VELOCITY_LEN: usize = 6;
pub const ROOT_STATE_LEN: usize = POSE_LEN + VELOCITY_LEN;

/// World- or parent-space placement of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            orientation: UnitQuaternion::identity(),
        }
    }

    pub fn to_array(&self) -> [f32; POSE_LEN] {
        let q = self.orientation.quaternion();
        [
            self.position.x,
            self.position.y,
            self.position.z,
            q.w,
            q.i,
            q.j,
            q.k,
        ]
    }

    /// Parse a 7-value pose. The quaternion is normalized; a zero quaternion is rejected.
    pub fn try_from_array(values: [f32; POSE_LEN]) -> Result<Self, StateError> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(StateError::NonFinite);
        }
        let [x, y, z, qw, qx, qy, qz] = values;
        let quat = Quaternion::new(qw, qx, qy, qz);
        if quat.norm_squared() < QUAT_NORM_EPS_SQ {
            return Err(StateError::DegenerateQuaternion);
        }
        Ok(Self {
            position: Vector3::new(x, y, z),
            orientation: UnitQuaternion::from_quaternion(quat),
        })
    }
}

/// Linear and angular velocity in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vector3<f32>,
    pub angular: Vector3<f32>,
}

impl Velocity {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn to_array(&self) -> [f32; VELOCITY_LEN] {
        [
            self.linear.x,
            self.linear.y,
            self.linear.z,
            self.angular.x,
            self.angular.y,
            self.angular.z,
        ]
    }

    pub fn try_from_array(values: [f32; VELOCITY_LEN]) -> Result<Self, StateError> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(StateError::NonFinite);
        }
        let [vx, vy, vz, wx, wy, wz] = values;
        Ok(Self {
            linear: Vector3::new(vx, vy, vz),
            angular: Vector3::new(wx, wy, wz),
        })
    }
}

/// The 13-value pose + velocity of a body's root link.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RootState {
    pub pose: Pose,
    pub velocity: Velocity,
}

impl RootState {
    pub fn at_rest(pose: Pose) -> Self {
        Self {
            pose,
            velocity: Velocity::zero(),
        }
    }

    pub fn to_array(&self) -> [f32; ROOT_STATE_LEN] {
        let mut out = [0.0; ROOT_STATE_LEN];
        out[..POSE_LEN].copy_from_slice(&self.pose.to_array());
        out[POSE_LEN..].copy_from_slice(&self.velocity.to_array());
        out
    }

    pub fn try_from_array(values: [f32; ROOT_STATE_LEN]) -> Result<Self, StateError> {
        let mut pose = [0.0; POSE_LEN];
        let mut velocity = [0.0; VELOCITY_LEN];
        pose.copy_from_slice(&values[..POSE_LEN]);
        velocity.copy_from_slice(&values[POSE_LEN..]);
        Ok(Self {
            pose: Pose::try_from_array(pose)?,
            velocity: Velocity::try_from_array(velocity)?,
        })
    }
}
