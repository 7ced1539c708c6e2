//! Scene composition: turn an ordered list of spawn requests into prims.
//!
//! Design
//! - The composer owns no scene state; it borrows a [`SceneGraph`] for the
//!   duration of `compose` and forwards one `create_prim` call per target.
//! - Requests are realized strictly in order, so a request may target prims
//!   created by earlier requests (origins first, then the pattern that fills them).
//! - Only dynamic entities come back as [`SpawnedObject`]s; handles of static
//!   decoration are dropped.
//!
//! Failure policy
//! - `Abort` (default): the first error stops composition and is returned.
//!   The partially built scene is not a validated state and must be discarded.
//! - `SkipAndLog`: the failing target is logged, recorded in
//!   [`ComposedScene::skipped`], and composition continues.

use log::{debug, info, warn};
use nalgebra::Isometry3;

use crate::error::SceneSetupError;
use crate::prim_path::{PrimPath, PrimPattern};
use crate::service::{ObjectHandle, Placement, SceneGraph};
use crate::spawn::SpawnCfg;
use crate::state::{Pose, RootState, Velocity};

#[derive(Clone, Debug)]
pub enum PrimTarget {
    Path(PrimPath),
    /// One prim under every existing parent matching the pattern.
    Pattern(PrimPattern),
}

impl std::fmt::Display for PrimTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrimTarget::Path(path) => path.fmt(f),
            PrimTarget::Pattern(pattern) => pattern.fmt(f),
        }
    }
}

/// One object configuration and where to put it.
#[derive(Clone, Debug)]
pub struct SpawnRequest {
    /// Label used for tracked objects in reports; defaults to the prim name.
    pub name: String,
    pub target: PrimTarget,
    pub cfg: SpawnCfg,
    /// Relative to the target's parent.
    pub placement: Placement,
}

impl SpawnRequest {
    pub fn at(path: &str, cfg: impl Into<SpawnCfg>) -> Result<Self, SceneSetupError> {
        let path = PrimPath::parse(path)?;
        let name = path.name().unwrap_or_default().to_string();
        Ok(Self {
            name,
            target: PrimTarget::Path(path),
            cfg: cfg.into(),
            placement: Placement::default(),
        })
    }

    pub fn pattern(pattern: &str, cfg: impl Into<SpawnCfg>) -> Result<Self, SceneSetupError> {
        let pattern = PrimPattern::parse(pattern)?;
        Ok(Self {
            name: pattern.name().to_string(),
            target: PrimTarget::Pattern(pattern),
            cfg: cfg.into(),
            placement: Placement::default(),
        })
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Root state relative to the parent right after spawning.
    ///
    /// Articulations compose their `init_state` pose onto the placement.
    pub fn default_root_state(&self) -> RootState {
        let placed = self.placement.as_pose();
        match &self.cfg {
            SpawnCfg::Articulation(cfg) => {
                let init = cfg.init_state.root_state();
                RootState {
                    pose: Pose {
                        position: placed.position + placed.orientation * init.pose.position,
                        orientation: placed.orientation * init.pose.orientation,
                    },
                    velocity: init.velocity,
                }
            }
            _ => RootState {
                pose: placed,
                velocity: Velocity::zero(),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    #[default]
    Abort,
    SkipAndLog,
}

/// A dynamic entity realized by the composer.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnedObject {
    pub name: String,
    pub path: PrimPath,
    pub handle: ObjectHandle,
    /// Parent-relative root state at spawn time.
    pub default_state: RootState,
    /// World frame of the parent prim (the scene origin of this instance).
    pub origin: Isometry3<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct ComposedScene {
    /// Number of successful `create_prim` calls.
    pub created: usize,
    pub dynamic: Vec<SpawnedObject>,
    /// Targets that failed under `FailurePolicy::SkipAndLog`.
    pub skipped: Vec<(String, SceneSetupError)>,
}

impl ComposedScene {
    pub fn handles(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.dynamic.iter().map(|o| o.handle)
    }

    pub fn objects_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SpawnedObject> {
        self.dynamic.iter().filter(move |o| o.name == name)
    }
}

pub struct SceneComposer<'a, S: SceneGraph> {
    scene: &'a mut S,
    policy: FailurePolicy,
}

impl<'a, S: SceneGraph> SceneComposer<'a, S> {
    pub fn new(scene: &'a mut S) -> Self {
        Self {
            scene,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn compose(&mut self, requests: &[SpawnRequest]) -> Result<ComposedScene, SceneSetupError> {
        let mut scene = ComposedScene::default();

        for request in requests {
            let label = request.target.to_string();
            if let Err(err) = self.realize(request, &mut scene) {
                match self.policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::SkipAndLog => {
                        warn!("skipping `{label}`: {err}");
                        scene.skipped.push((label, err));
                    }
                }
            }
        }

        info!(
            "Scene composed: {} prims created, {} dynamic, {} skipped",
            scene.created,
            scene.dynamic.len(),
            scene.skipped.len()
        );
        Ok(scene)
    }

    /// Realize one request. For patterns, an instance failure under
    /// `SkipAndLog` only skips that instance.
    fn realize(
        &mut self,
        request: &SpawnRequest,
        scene: &mut ComposedScene,
    ) -> Result<(), SceneSetupError> {
        request
            .cfg
            .validate()
            .map_err(|reason| SceneSetupError::InvalidConfig {
                path: request.target.to_string(),
                reason,
            })?;

        let paths = match &request.target {
            PrimTarget::Path(path) => vec![path.clone()],
            PrimTarget::Pattern(pattern) => {
                let paths = self.scene.find_prims(pattern);
                if paths.is_empty() {
                    return Err(SceneSetupError::NoMatch(pattern.to_string()));
                }
                paths
            }
        };

        for path in paths {
            match self.realize_at(request, &path) {
                Ok(Some(object)) => scene.dynamic.push(object),
                Ok(None) => {}
                Err(err) if self.policy == FailurePolicy::SkipAndLog => {
                    warn!("skipping `{path}`: {err}");
                    scene.skipped.push((path.to_string(), err));
                    continue;
                }
                Err(err) => return Err(err),
            }
            scene.created += 1;
        }
        Ok(())
    }

    fn realize_at(
        &mut self,
        request: &SpawnRequest,
        path: &PrimPath,
    ) -> Result<Option<SpawnedObject>, SceneSetupError> {
        let handle = self
            .scene
            .create_prim(path, &request.cfg, &request.placement)?;
        debug!("created {} at {path}", request.cfg.kind_name());

        let handle = match (handle, request.cfg.is_dynamic()) {
            (Some(handle), true) => handle,
            (None, true) => {
                warn!("{path}: dynamic {} came back without a handle", request.cfg.kind_name());
                return Ok(None);
            }
            // Static decoration: any handle is dropped.
            (_, false) => return Ok(None),
        };

        let origin = self
            .scene
            .world_pose(&path.parent())
            .unwrap_or_else(Isometry3::identity);

        Ok(Some(SpawnedObject {
            name: request.name.clone(),
            path: path.clone(),
            handle,
            default_state: request.default_root_state(),
            origin,
        }))
    }
}
