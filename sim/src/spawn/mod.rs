/*!
Declarative spawn configurations.

A [`SpawnCfg`] describes one entity to create in the scene. Configs are plain
immutable values: they are built once (usually in a preset), validated by
the composer, and handed to the scene-graph service.

- materials: visual and physics materials
- props:     rigid/mass/collision/deformable/articulation property groups
- lights:    light kinds
- shapes:    primitive geometry and the ground plane
*/

pub mod lights;
pub mod materials;
pub mod props;
pub mod shapes;

pub use lights::{LightCfg, LightKind};
pub use materials::{
    DeformableMaterial, PhysicsMaterial, Rgb, RigidMaterial, VisualMaterial,
};
pub use props::{
    ArticulationRootProps, CollisionProps, DeformableProps, MassProps, RigidBodyProps,
};
pub use shapes::{Geometry, GroundPlaneCfg, ShapeCfg};

use crate::articulation::ArticulationCfg;

/// A prop loaded from an asset file (e.g. a table).
#[derive(Clone, Debug, PartialEq)]
pub struct AssetFileCfg {
    /// Path relative to the asset library root.
    pub asset_path: String,
    pub scale: [f32; 3],
    pub rigid_body: Option<RigidBodyProps>,
    pub mass: Option<MassProps>,
}

impl AssetFileCfg {
    pub fn new(asset_path: impl Into<String>) -> Self {
        Self {
            asset_path: asset_path.into(),
            scale: [1.0, 1.0, 1.0],
            rigid_body: None,
            mass: None,
        }
    }

    pub fn with_rigid_body(mut self, props: RigidBodyProps) -> Self {
        self.rigid_body = Some(props);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.asset_path.trim().is_empty() {
            return Err("asset_path is empty".into());
        }
        for (axis, s) in ["scale.x", "scale.y", "scale.z"].iter().zip(self.scale) {
            ensure_positive(axis, s)?;
        }
        if self.mass.is_some() && self.rigid_body.is_none() {
            return Err("mass properties require rigid body properties".into());
        }
        if let Some(props) = &self.rigid_body {
            props.validate()?;
        }
        if let Some(props) = &self.mass {
            props.validate()?;
        }
        Ok(())
    }
}

/// One spawnable entity.
#[derive(Clone, Debug, PartialEq)]
pub enum SpawnCfg {
    /// Empty transform used to group children or offset a repeated pattern.
    Xform,
    GroundPlane(GroundPlaneCfg),
    Light(LightCfg),
    Shape(ShapeCfg),
    AssetFile(AssetFileCfg),
    Articulation(ArticulationCfg),
}

impl SpawnCfg {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SpawnCfg::Xform => "xform",
            SpawnCfg::GroundPlane(_) => "ground_plane",
            SpawnCfg::Light(_) => "light",
            SpawnCfg::Shape(shape) => shape.geometry.name(),
            SpawnCfg::AssetFile(_) => "asset",
            SpawnCfg::Articulation(_) => "articulation",
        }
    }

    /// Dynamic entities hand back a handle that must be kept to drive or observe them.
    pub fn is_dynamic(&self) -> bool {
        match self {
            SpawnCfg::Xform | SpawnCfg::GroundPlane(_) | SpawnCfg::Light(_) => false,
            SpawnCfg::Shape(shape) => shape.is_dynamic(),
            SpawnCfg::AssetFile(asset) => asset.rigid_body.is_some(),
            SpawnCfg::Articulation(_) => true,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            SpawnCfg::Xform => Ok(()),
            SpawnCfg::GroundPlane(cfg) => cfg.validate(),
            SpawnCfg::Light(cfg) => cfg.validate(),
            SpawnCfg::Shape(cfg) => cfg.validate(),
            SpawnCfg::AssetFile(cfg) => cfg.validate(),
            SpawnCfg::Articulation(cfg) => cfg.validate(),
        }
    }
}

impl From<ShapeCfg> for SpawnCfg {
    fn from(cfg: ShapeCfg) -> Self {
        SpawnCfg::Shape(cfg)
    }
}

impl From<LightCfg> for SpawnCfg {
    fn from(cfg: LightCfg) -> Self {
        SpawnCfg::Light(cfg)
    }
}

impl From<GroundPlaneCfg> for SpawnCfg {
    fn from(cfg: GroundPlaneCfg) -> Self {
        SpawnCfg::GroundPlane(cfg)
    }
}

impl From<AssetFileCfg> for SpawnCfg {
    fn from(cfg: AssetFileCfg) -> Self {
        SpawnCfg::AssetFile(cfg)
    }
}

impl From<ArticulationCfg> for SpawnCfg {
    fn from(cfg: ArticulationCfg) -> Self {
        SpawnCfg::Articulation(cfg)
    }
}

pub(crate) fn ensure_positive(field: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be positive and finite, got {value}"))
    }
}

pub(crate) fn ensure_non_negative(field: &str, value: f32) -> Result<(), String> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(format!("{field} must be non-negative and finite, got {value}"))
    }
}

pub(crate) fn ensure_unit_interval(field: &str, value: f32) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must lie in [0, 1], got {value}"))
    }
}

pub(crate) fn ensure_color(field: &str, color: Rgb) -> Result<(), String> {
    if color.iter().all(|c| (0.0..=1.0).contains(c)) {
        Ok(())
    } else {
        Err(format!("{field} components must lie in [0, 1], got {color:?}"))
    }
}
