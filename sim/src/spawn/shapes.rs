use nalgebra::Vector3;

use super::materials::{PhysicsMaterial, Rgb, RigidMaterial, VisualMaterial};
use super::props::{CollisionProps, DeformableProps, MassProps, RigidBodyProps};
use super::{ensure_color, ensure_positive};
use crate::constants::DEFAULT_GROUND_SIZE;

/// Primitive geometry. Axial shapes are aligned with +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    /// Full side lengths (meters), not half-extents.
    Cuboid { size: Vector3<f32> },
    Sphere { radius: f32 },
    Cone { radius: f32, height: f32 },
    Cylinder { radius: f32, height: f32 },
    /// `height` is the length of the cylindrical section, excluding the caps.
    Capsule { radius: f32, height: f32 },
}

impl Geometry {
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Geometry::Cuboid { size } => {
                ensure_positive("size.x", size.x)?;
                ensure_positive("size.y", size.y)?;
                ensure_positive("size.z", size.z)
            }
            Geometry::Sphere { radius } => ensure_positive("radius", radius),
            Geometry::Cone { radius, height }
            | Geometry::Cylinder { radius, height }
            | Geometry::Capsule { radius, height } => {
                ensure_positive("radius", radius)?;
                ensure_positive("height", height)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Geometry::Cuboid { .. } => "cuboid",
            Geometry::Sphere { .. } => "sphere",
            Geometry::Cone { .. } => "cone",
            Geometry::Cylinder { .. } => "cylinder",
            Geometry::Capsule { .. } => "capsule",
        }
    }
}

/// A primitive shape with optional physics.
///
/// - No physics groups: visual only.
/// - `collision` only: static collider.
/// - `rigid_body`: simulated rigid body (a handle is returned on spawn).
/// - `deformable`: simulated deformable mesh (a handle is returned on spawn).
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeCfg {
    pub geometry: Geometry,
    pub rigid_body: Option<RigidBodyProps>,
    pub mass: Option<MassProps>,
    pub collision: Option<CollisionProps>,
    pub deformable: Option<DeformableProps>,
    pub physics_material: Option<PhysicsMaterial>,
    pub visual_material: Option<VisualMaterial>,
}

impl ShapeCfg {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            rigid_body: None,
            mass: None,
            collision: None,
            deformable: None,
            physics_material: None,
            visual_material: None,
        }
    }

    pub fn cuboid(size: [f32; 3]) -> Self {
        Self::new(Geometry::Cuboid {
            size: Vector3::from(size),
        })
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(Geometry::Sphere { radius })
    }

    pub fn cone(radius: f32, height: f32) -> Self {
        Self::new(Geometry::Cone { radius, height })
    }

    pub fn cylinder(radius: f32, height: f32) -> Self {
        Self::new(Geometry::Cylinder { radius, height })
    }

    pub fn capsule(radius: f32, height: f32) -> Self {
        Self::new(Geometry::Capsule { radius, height })
    }

    pub fn with_rigid_body(mut self, props: RigidBodyProps) -> Self {
        self.rigid_body = Some(props);
        self
    }

    pub fn with_mass(mut self, props: MassProps) -> Self {
        self.mass = Some(props);
        self
    }

    pub fn with_collision(mut self, props: CollisionProps) -> Self {
        self.collision = Some(props);
        self
    }

    pub fn with_deformable(mut self, props: DeformableProps) -> Self {
        self.deformable = Some(props);
        self
    }

    pub fn with_physics_material(mut self, material: PhysicsMaterial) -> Self {
        self.physics_material = Some(material);
        self
    }

    pub fn with_visual_material(mut self, material: VisualMaterial) -> Self {
        self.visual_material = Some(material);
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.rigid_body.is_some() || self.deformable.is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.geometry.validate()?;
        if self.rigid_body.is_some() && self.deformable.is_some() {
            return Err("a shape cannot be both rigid and deformable".into());
        }
        if self.mass.is_some() && self.rigid_body.is_none() {
            return Err("mass properties require rigid body properties".into());
        }
        if self.deformable.is_some() && self.collision.is_some() {
            return Err("deformable bodies carry their own collision mesh".into());
        }
        match (&self.physics_material, self.deformable.is_some()) {
            (Some(PhysicsMaterial::Rigid(_)), true) => {
                return Err("deformable bodies need a deformable physics material".into());
            }
            (Some(PhysicsMaterial::Deformable(_)), false) => {
                return Err("deformable physics material on a non-deformable shape".into());
            }
            _ => {}
        }
        if let Some(props) = &self.rigid_body {
            props.validate()?;
        }
        if let Some(props) = &self.mass {
            props.validate()?;
        }
        if let Some(props) = &self.collision {
            props.validate()?;
        }
        if let Some(props) = &self.deformable {
            props.validate()?;
        }
        if let Some(material) = &self.physics_material {
            material.validate()?;
        }
        if let Some(material) = &self.visual_material {
            material.validate()?;
        }
        Ok(())
    }
}

/// Infinite ground plane facing +Z. `size` only affects how it would be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundPlaneCfg {
    pub size: [f32; 2],
    pub color: Option<Rgb>,
    pub physics_material: RigidMaterial,
}

impl Default for GroundPlaneCfg {
    fn default() -> Self {
        Self {
            size: [DEFAULT_GROUND_SIZE, DEFAULT_GROUND_SIZE],
            color: Some([0.0, 0.0, 0.0]),
            physics_material: RigidMaterial {
                static_friction: 1.0,
                dynamic_friction: 1.0,
                restitution: 0.0,
            },
        }
    }
}

impl GroundPlaneCfg {
    pub fn validate(&self) -> Result<(), String> {
        ensure_positive("size.x", self.size[0])?;
        ensure_positive("size.y", self.size[1])?;
        if let Some(color) = self.color {
            ensure_color("color", color)?;
        }
        self.physics_material.validate()
    }
}
