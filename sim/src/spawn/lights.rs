use super::materials::Rgb;
use super::{ensure_color, ensure_non_negative, ensure_positive};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightKind {
    /// Parallel rays, like sunlight. `angle` is the apparent angular size (degrees).
    Distant { angle: f32 },
    /// Environment light surrounding the whole scene.
    Dome,
    Sphere { radius: f32 },
    Disk { radius: f32 },
    Cylinder { radius: f32, length: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightCfg {
    pub kind: LightKind,
    pub intensity: f32,
    pub color: Rgb,
}

impl LightCfg {
    pub fn distant(intensity: f32, color: Rgb) -> Self {
        Self {
            kind: LightKind::Distant { angle: 0.53 },
            intensity,
            color,
        }
    }

    pub fn dome(intensity: f32, color: Rgb) -> Self {
        Self {
            kind: LightKind::Dome,
            intensity,
            color,
        }
    }

    pub fn sphere(radius: f32, intensity: f32, color: Rgb) -> Self {
        Self {
            kind: LightKind::Sphere { radius },
            intensity,
            color,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        ensure_non_negative("intensity", self.intensity)?;
        ensure_color("color", self.color)?;
        match self.kind {
            LightKind::Distant { angle } => ensure_non_negative("angle", angle),
            LightKind::Dome => Ok(()),
            LightKind::Sphere { radius } | LightKind::Disk { radius } => {
                ensure_positive("radius", radius)
            }
            LightKind::Cylinder { radius, length } => {
                ensure_positive("radius", radius)?;
                ensure_positive("length", length)
            }
        }
    }
}
