//! Articulated robot configuration and actuator resolution.
//!
//! An [`ArticulationCfg`] names an asset, its initial root/joint state and a
//! set of named actuator groups. Each group claims joints through anchored
//! regular expressions over the asset's joint names (`"joint[1-2]"`, `".*"`).
//!
//! Resolution rules
//! - Every expression must match at least one joint.
//! - A joint may be claimed by at most one group.
//! - Joints claimed by no group are passive.
//! - `joint_pos` / `joint_vel` keys are expressions too and must match at least one joint.
//!
//! Actuator dynamics are the backend's business; this module only produces
//! the per-joint drive table.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::{UnitQuaternion, Vector3};
use regex::Regex;

use crate::asset::AssetDescriptor;
use crate::error::SceneSetupError;
use crate::spawn::{ArticulationRootProps, RigidBodyProps, ensure_non_negative, ensure_positive};
use crate::state::{Pose, RootState, Velocity};

/// Implicit PD actuator driving a group of joints.
#[derive(Clone, Debug, PartialEq)]
pub struct ActuatorCfg {
    pub joint_names_expr: Vec<String>,
    /// `None` keeps the value authored in the asset.
    pub stiffness: Option<f32>,
    pub damping: Option<f32>,
    pub effort_limit: Option<f32>,
    pub velocity_limit: Option<f32>,
}

impl ActuatorCfg {
    pub fn implicit(joint_names_expr: &[&str]) -> Self {
        Self {
            joint_names_expr: joint_names_expr.iter().map(|s| s.to_string()).collect(),
            stiffness: None,
            damping: None,
            effort_limit: None,
            velocity_limit: None,
        }
    }

    pub fn with_gains(mut self, stiffness: f32, damping: f32) -> Self {
        self.stiffness = Some(stiffness);
        self.damping = Some(damping);
        self
    }

    pub fn with_limits(mut self, effort_limit: f32, velocity_limit: f32) -> Self {
        self.effort_limit = Some(effort_limit);
        self.velocity_limit = Some(velocity_limit);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.joint_names_expr.is_empty() {
            return Err("actuator has no joint name expressions".into());
        }
        if let Some(v) = self.stiffness {
            ensure_non_negative("stiffness", v)?;
        }
        if let Some(v) = self.damping {
            ensure_non_negative("damping", v)?;
        }
        if let Some(v) = self.effort_limit {
            ensure_positive("effort_limit", v)?;
        }
        if let Some(v) = self.velocity_limit {
            ensure_positive("velocity_limit", v)?;
        }
        Ok(())
    }
}

/// Initial root pose/velocity (relative to the spawn placement) and joint state.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialState {
    pub pos: Vector3<f32>,
    pub rot: UnitQuaternion<f32>,
    pub lin_vel: Vector3<f32>,
    pub ang_vel: Vector3<f32>,
    pub joint_pos: BTreeMap<String, f32>,
    pub joint_vel: BTreeMap<String, f32>,
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            pos: Vector3::zeros(),
            rot: UnitQuaternion::identity(),
            lin_vel: Vector3::zeros(),
            ang_vel: Vector3::zeros(),
            joint_pos: BTreeMap::new(),
            joint_vel: BTreeMap::new(),
        }
    }
}

impl InitialState {
    pub fn root_state(&self) -> RootState {
        RootState {
            pose: Pose {
                position: self.pos,
                orientation: self.rot,
            },
            velocity: Velocity {
                linear: self.lin_vel,
                angular: self.ang_vel,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArticulationCfg {
    pub asset_path: String,
    pub rigid_body: Option<RigidBodyProps>,
    pub articulation_root: Option<ArticulationRootProps>,
    pub init_state: InitialState,
    /// Named actuator groups, e.g. `"front_joints"`, `"wheel_acts"`.
    pub actuators: BTreeMap<String, ActuatorCfg>,
}

impl ArticulationCfg {
    pub fn new(asset_path: impl Into<String>) -> Self {
        Self {
            asset_path: asset_path.into(),
            rigid_body: None,
            articulation_root: None,
            init_state: InitialState::default(),
            actuators: BTreeMap::new(),
        }
    }

    pub fn with_rigid_body(mut self, props: RigidBodyProps) -> Self {
        self.rigid_body = Some(props);
        self
    }

    pub fn with_articulation_root(mut self, props: ArticulationRootProps) -> Self {
        self.articulation_root = Some(props);
        self
    }

    pub fn with_init_state(mut self, init_state: InitialState) -> Self {
        self.init_state = init_state;
        self
    }

    pub fn with_actuator(mut self, name: impl Into<String>, actuator: ActuatorCfg) -> Self {
        self.actuators.insert(name.into(), actuator);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.asset_path.trim().is_empty() {
            return Err("asset_path is empty".into());
        }
        if let Some(props) = &self.rigid_body {
            props.validate()?;
        }
        if let Some(props) = &self.articulation_root {
            props.validate()?;
        }
        let s = &self.init_state;
        let finite = s.pos.iter().all(|v| v.is_finite())
            && s.lin_vel.iter().all(|v| v.is_finite())
            && s.ang_vel.iter().all(|v| v.is_finite())
            && s.joint_pos.values().all(|v| v.is_finite())
            && s.joint_vel.values().all(|v| v.is_finite());
        if !finite {
            return Err("initial state contains non-finite values".into());
        }
        for (name, actuator) in &self.actuators {
            actuator
                .validate()
                .map_err(|reason| format!("actuator `{name}`: {reason}"))?;
        }
        Ok(())
    }
}

/// Drive settings applied to one joint.
#[derive(Clone, Debug, PartialEq)]
pub struct JointDrive {
    pub group: String,
    pub stiffness: Option<f32>,
    pub damping: Option<f32>,
    pub effort_limit: Option<f32>,
    pub velocity_limit: Option<f32>,
}

/// Per-joint state and drives after matching a config against its asset.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedArticulation {
    pub joint_names: Vec<String>,
    pub joint_pos: Vec<f32>,
    pub joint_vel: Vec<f32>,
    /// `None` for passive joints.
    pub drives: Vec<Option<JointDrive>>,
}

impl ResolvedArticulation {
    pub fn passive_joints(&self) -> impl Iterator<Item = &str> {
        self.joint_names
            .iter()
            .zip(&self.drives)
            .filter(|(_, drive)| drive.is_none())
            .map(|(name, _)| name.as_str())
    }
}

fn compile(expr: &str) -> Result<Regex, String> {
    Regex::new(&format!("^(?:{expr})$")).map_err(|_| format!("`{expr}` is not a valid expression"))
}

fn matching_joints(expr: &str, joint_names: &[String]) -> Result<Vec<usize>, String> {
    let re = compile(expr)?;
    Ok(joint_names
        .iter()
        .enumerate()
        .filter(|(_, name)| re.is_match(name))
        .map(|(i, _)| i)
        .collect())
}

/// Match `cfg` against the joints of `asset`.
pub fn resolve_articulation(
    path: &str,
    cfg: &ArticulationCfg,
    asset: &AssetDescriptor,
) -> Result<ResolvedArticulation, SceneSetupError> {
    let actuator_err = |reason: String| SceneSetupError::Actuator {
        path: path.to_string(),
        reason,
    };
    let config_err = |reason: String| SceneSetupError::InvalidConfig {
        path: path.to_string(),
        reason,
    };

    if !asset.is_articulated() {
        return Err(config_err(format!(
            "asset `{}` has no joints",
            cfg.asset_path
        )));
    }

    let joints = &asset.joint_names;
    let mut joint_pos = asset.default_joint_pos.clone();
    let mut joint_vel = vec![0.0; joints.len()];

    for (expr, value) in &cfg.init_state.joint_pos {
        let hits = matching_joints(expr, joints).map_err(config_err)?;
        if hits.is_empty() {
            return Err(config_err(format!("joint_pos key `{expr}` matches no joint")));
        }
        hits.into_iter().for_each(|i| joint_pos[i] = *value);
    }
    for (expr, value) in &cfg.init_state.joint_vel {
        let hits = matching_joints(expr, joints).map_err(config_err)?;
        if hits.is_empty() {
            return Err(config_err(format!("joint_vel key `{expr}` matches no joint")));
        }
        hits.into_iter().for_each(|i| joint_vel[i] = *value);
    }

    let mut drives: Vec<Option<JointDrive>> = vec![None; joints.len()];
    for (group, actuator) in &cfg.actuators {
        for expr in &actuator.joint_names_expr {
            let hits = matching_joints(expr, joints).map_err(actuator_err)?;
            if hits.is_empty() {
                return Err(actuator_err(format!(
                    "group `{group}`: expression `{expr}` matches no joint"
                )));
            }
            for i in hits {
                match &drives[i] {
                    // The same group may list a joint twice through overlapping expressions.
                    Some(existing) if existing.group == *group => {}
                    Some(existing) => {
                        return Err(actuator_err(format!(
                            "joint `{}` is claimed by both `{}` and `{group}`",
                            joints[i], existing.group
                        )));
                    }
                    None => {
                        drives[i] = Some(JointDrive {
                            group: group.clone(),
                            stiffness: actuator.stiffness,
                            damping: actuator.damping,
                            effort_limit: actuator.effort_limit,
                            velocity_limit: actuator.velocity_limit,
                        });
                    }
                }
            }
        }
    }

    let resolved = ResolvedArticulation {
        joint_names: joints.clone(),
        joint_pos,
        joint_vel,
        drives,
    };
    for joint in resolved.passive_joints() {
        debug!("{path}: joint `{joint}` has no actuator and stays passive");
    }
    Ok(resolved)
}
