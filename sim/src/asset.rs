//! Asset library: what an asset path refers to.
//!
//! Asset files are not parsed. Each known asset is registered up front with
//! the collision geometry of its root and, for articulated robots, the names
//! and default positions of its joints. Paths are looked up relative to the
//! library root; a path that already carries the root prefix is accepted too.

use std::collections::BTreeMap;

use crate::error::SceneSetupError;
use crate::spawn::Geometry;

#[derive(Clone, Debug, PartialEq)]
pub struct AssetDescriptor {
    /// Collision geometry of the root link (or of the whole prop).
    pub collision: Geometry,
    /// Root link mass (kg).
    pub mass: f32,
    /// Joint names in articulation order. Empty for props.
    pub joint_names: Vec<String>,
    /// Default joint positions, parallel to `joint_names`.
    pub default_joint_pos: Vec<f32>,
}

impl AssetDescriptor {
    pub fn prop(collision: Geometry, mass: f32) -> Self {
        Self {
            collision,
            mass,
            joint_names: Vec::new(),
            default_joint_pos: Vec::new(),
        }
    }

    pub fn robot(collision: Geometry, mass: f32, joints: &[(&str, f32)]) -> Self {
        Self {
            collision,
            mass,
            joint_names: joints.iter().map(|(name, _)| name.to_string()).collect(),
            default_joint_pos: joints.iter().map(|(_, pos)| *pos).collect(),
        }
    }

    pub fn is_articulated(&self) -> bool {
        !self.joint_names.is_empty()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.collision.validate()?;
        crate::spawn::ensure_positive("mass", self.mass)?;
        if self.joint_names.len() != self.default_joint_pos.len() {
            return Err("default_joint_pos must be parallel to joint_names".into());
        }
        let mut seen = std::collections::BTreeSet::new();
        for name in &self.joint_names {
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate joint name `{name}`"));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct AssetLibrary {
    root: String,
    assets: BTreeMap<String, AssetDescriptor>,
}

impl AssetLibrary {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into().trim_end_matches('/').to_string(),
            assets: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Full path of an asset under this library's root.
    pub fn path_of(&self, relative: &str) -> String {
        format!("{}/{}", self.root, relative.trim_start_matches('/'))
    }

    pub fn register(
        &mut self,
        relative: &str,
        descriptor: AssetDescriptor,
    ) -> Result<(), SceneSetupError> {
        descriptor
            .validate()
            .map_err(|reason| SceneSetupError::InvalidConfig {
                path: relative.to_string(),
                reason,
            })?;
        self.assets.insert(self.key(relative).to_string(), descriptor);
        Ok(())
    }

    pub fn resolve(&self, asset_path: &str) -> Result<&AssetDescriptor, SceneSetupError> {
        self.assets
            .get(self.key(asset_path))
            .ok_or_else(|| SceneSetupError::AssetNotFound(asset_path.to_string()))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Library key of `path`: the root is only stripped at a segment boundary.
    fn key<'a>(&self, path: &'a str) -> &'a str {
        let relative = path
            .strip_prefix(self.root.as_str())
            .filter(|rest| !self.root.is_empty() && rest.starts_with('/'))
            .unwrap_or(path);
        relative.trim_start_matches('/')
    }
}
