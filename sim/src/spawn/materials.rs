use super::{ensure_color, ensure_non_negative, ensure_unit_interval};

pub type Rgb = [f32; 3];

/// Preview-surface visual material. Only recorded by the rapier backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualMaterial {
    pub diffuse_color: Rgb,
    pub emissive_color: Rgb,
    pub metallic: f32,
    pub roughness: f32,
    pub opacity: f32,
}

impl Default for VisualMaterial {
    fn default() -> Self {
        Self {
            diffuse_color: [0.18, 0.18, 0.18],
            emissive_color: [0.0, 0.0, 0.0],
            metallic: 0.0,
            roughness: 0.5,
            opacity: 1.0,
        }
    }
}

impl VisualMaterial {
    pub fn preview_surface(diffuse_color: Rgb) -> Self {
        Self {
            diffuse_color,
            ..Self::default()
        }
    }

    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        ensure_color("diffuse_color", self.diffuse_color)?;
        ensure_color("emissive_color", self.emissive_color)?;
        ensure_unit_interval("metallic", self.metallic)?;
        ensure_unit_interval("roughness", self.roughness)?;
        ensure_unit_interval("opacity", self.opacity)
    }
}

/// Surface response of a rigid collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidMaterial {
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub restitution: f32,
}

impl Default for RigidMaterial {
    fn default() -> Self {
        Self {
            static_friction: 0.5,
            dynamic_friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl RigidMaterial {
    pub fn validate(&self) -> Result<(), String> {
        ensure_non_negative("static_friction", self.static_friction)?;
        ensure_non_negative("dynamic_friction", self.dynamic_friction)?;
        ensure_unit_interval("restitution", self.restitution)
    }
}

/// Elastic parameters of a deformable body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeformableMaterial {
    pub youngs_modulus: f32,
    pub poissons_ratio: f32,
    pub dynamic_friction: f32,
    pub density: Option<f32>,
}

impl Default for DeformableMaterial {
    fn default() -> Self {
        Self {
            youngs_modulus: 5.0e5,
            poissons_ratio: 0.45,
            dynamic_friction: 0.25,
            density: None,
        }
    }
}

impl DeformableMaterial {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.youngs_modulus.is_finite() && self.youngs_modulus > 0.0) {
            return Err(format!("youngs_modulus must be positive, got {}", self.youngs_modulus));
        }
        // Poisson's ratio is physically bounded by 0.5 (incompressible).
        if !(0.0..0.5).contains(&self.poissons_ratio) {
            return Err(format!(
                "poissons_ratio must lie in [0, 0.5), got {}",
                self.poissons_ratio
            ));
        }
        ensure_non_negative("dynamic_friction", self.dynamic_friction)?;
        if let Some(density) = self.density {
            ensure_non_negative("density", density)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PhysicsMaterial {
    Rigid(RigidMaterial),
    Deformable(DeformableMaterial),
}

impl PhysicsMaterial {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            PhysicsMaterial::Rigid(m) => m.validate(),
            PhysicsMaterial::Deformable(m) => m.validate(),
        }
    }
}
