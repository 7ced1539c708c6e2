//! Error taxonomy for scene setup, stepping and per-object state access.
//!
//! Nothing in this crate retries. Callers decide whether an error is fatal;
//! the launcher treats every `SimError` as fatal and exits non-zero.

use thiserror::Error;

use crate::service::ObjectHandle;

/// An object configuration could not be realized in the scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneSetupError {
    #[error("invalid prim path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("prim `{0}` already exists")]
    DuplicatePath(String),

    #[error("parent prim of `{0}` does not exist")]
    MissingParent(String),

    #[error("pattern `{0}` matched no existing prims")]
    NoMatch(String),

    #[error("asset `{0}` not found in the asset library")]
    AssetNotFound(String),

    #[error("invalid configuration for `{path}`: {reason}")]
    InvalidConfig { path: String, reason: String },

    #[error("actuator setup for `{path}` failed: {reason}")]
    Actuator { path: String, reason: String },
}

/// Reading or writing a root state through a handle failed.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StateError {
    #[error("unknown object handle {0}")]
    UnknownHandle(ObjectHandle),

    #[error("orientation quaternion has zero norm")]
    DegenerateQuaternion,

    #[error("state vector contains non-finite values")]
    NonFinite,
}

/// Advancing the simulation failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    #[error("simulation is not playing; reset() must be called before step()")]
    NotPlaying,

    #[error(transparent)]
    State(#[from] StateError),
}

/// Top-level error surfaced by the backend, the composer and the driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The simulation host could not be created.
    #[error("launch failed: {0}")]
    Launch(String),

    #[error("invalid camera view: {0}")]
    InvalidCamera(&'static str),

    #[error("invalid driver configuration: {0}")]
    InvalidDriverConfig(String),

    #[error(transparent)]
    SceneSetup(#[from] SceneSetupError),

    #[error(transparent)]
    Step(#[from] StepError),
}

impl From<StateError> for SimError {
    fn from(err: StateError) -> Self {
        SimError::Step(StepError::State(err))
    }
}
