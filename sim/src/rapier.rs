//! Spawn configs → rapier builders.
//!
//! Conventions
//! - Geometry is Z-aligned (the world is Z-up). Rapier's axial shapes are
//!   Y-aligned, so cones, cylinders and capsules get a local rotation of
//!   +90° about X, which maps +Y onto +Z.
//! - Cuboid sizes are full side lengths; rapier wants half-extents.
//! - Colliders are built with their pose relative to the parent body; bodies
//!   carry the world pose of the prim.

use std::f32::consts::FRAC_PI_2;

use rapier3d::prelude::*;

use crate::constants::RAPIER_SOLVER_ITERATIONS;
use crate::spawn::{
    ArticulationRootProps, CollisionProps, Geometry, MassProps, RigidBodyProps, RigidMaterial,
};

/// Build a Z-aligned collider for `geometry`. Mass and material are left at rapier's defaults.
pub fn collider_from_geometry(geometry: &Geometry) -> ColliderBuilder {
    let y_to_z = Vector::x() * FRAC_PI_2;
    match *geometry {
        Geometry::Cuboid { size } => ColliderBuilder::cuboid(size.x / 2.0, size.y / 2.0, size.z / 2.0),

        Geometry::Sphere { radius } => ColliderBuilder::ball(radius),

        Geometry::Cone { radius, height } => {
            ColliderBuilder::cone(height / 2.0, radius).rotation(y_to_z)
        }

        Geometry::Cylinder { radius, height } => {
            ColliderBuilder::cylinder(height / 2.0, radius).rotation(y_to_z)
        }

        Geometry::Capsule { radius, height } => ColliderBuilder::capsule_z(height / 2.0, radius),
    }
}

/// Infinite ground facing +Z in the parent body's frame.
///
/// The half-space is infinite; any visual size lives on the config only.
pub fn ground_collider(material: &RigidMaterial) -> Collider {
    let halfspace = HalfSpace::new(Vector::z_axis());
    with_material(ColliderBuilder::new(SharedShape::new(halfspace)), material).build()
}

/// Rapier has a single friction coefficient; the dynamic one is used.
/// See [`unmapped_material_settings`] for what that drops.
pub fn with_material(builder: ColliderBuilder, material: &RigidMaterial) -> ColliderBuilder {
    builder
        .friction(material.dynamic_friction)
        .restitution(material.restitution)
}

/// An explicit mass wins over a density.
pub fn with_mass(builder: ColliderBuilder, mass: &MassProps) -> ColliderBuilder {
    match (mass.mass, mass.density) {
        (Some(m), _) => builder.mass(m),
        (None, Some(d)) => builder.density(d),
        (None, None) => builder,
    }
}

/// Disabled collision keeps the shape for mass computation but produces no contacts.
/// A contact offset becomes the collider's contact skin.
pub fn with_collision(builder: ColliderBuilder, collision: &CollisionProps) -> ColliderBuilder {
    let builder = builder.sensor(!collision.collision_enabled);
    match collision.contact_offset {
        Some(offset) => builder.contact_skin(offset),
        None => builder,
    }
}

/// Position iterations above the pipeline's own become per-body extra iterations.
pub fn with_root_props(builder: RigidBodyBuilder, props: &ArticulationRootProps) -> RigidBodyBuilder {
    let extra = props
        .solver_position_iteration_count
        .saturating_sub(RAPIER_SOLVER_ITERATIONS);
    builder.additional_solver_iterations(extra as usize)
}

/// Rigid body settings that have no per-body rapier counterpart and are set.
pub fn unmapped_body_settings(props: &RigidBodyProps) -> Vec<&'static str> {
    let mut unmapped = Vec::new();
    if props.max_depenetration_velocity.is_some() {
        unmapped.push("max_depenetration_velocity");
    }
    unmapped
}

pub fn unmapped_material_settings(material: &RigidMaterial) -> Vec<&'static str> {
    let mut unmapped = Vec::new();
    if material.static_friction != material.dynamic_friction {
        unmapped.push("static_friction");
    }
    unmapped
}

/// The articulation is simulated as a single root collider, so self collisions
/// and velocity iterations have nothing to act on.
pub fn unmapped_root_settings(props: &ArticulationRootProps) -> Vec<&'static str> {
    let defaults = ArticulationRootProps::default();
    let mut unmapped = Vec::new();
    if props.enabled_self_collisions != defaults.enabled_self_collisions {
        unmapped.push("enabled_self_collisions");
    }
    if props.solver_velocity_iteration_count != defaults.solver_velocity_iteration_count {
        unmapped.push("solver_velocity_iteration_count");
    }
    unmapped
}

/// Dynamic (or kinematic) body builder for the given rigid properties.
pub fn body_from_props(props: &RigidBodyProps) -> RigidBodyBuilder {
    let builder = if props.kinematic {
        RigidBodyBuilder::kinematic_position_based()
    } else {
        RigidBodyBuilder::dynamic()
    };
    builder
        .linear_damping(props.linear_damping)
        .angular_damping(props.angular_damping)
        .gravity_scale(if props.disable_gravity { 0.0 } else { 1.0 })
}

/// Scale geometry by a per-axis factor. Round shapes take the larger planar factor.
pub fn scale_geometry(geometry: &Geometry, scale: [f32; 3]) -> Geometry {
    let [sx, sy, sz] = scale;
    let planar = sx.max(sy);
    match *geometry {
        Geometry::Cuboid { size } => Geometry::Cuboid {
            size: size.component_mul(&nalgebra::Vector3::new(sx, sy, sz)),
        },
        Geometry::Sphere { radius } => Geometry::Sphere {
            radius: radius * planar.max(sz),
        },
        Geometry::Cone { radius, height } => Geometry::Cone {
            radius: radius * planar,
            height: height * sz,
        },
        Geometry::Cylinder { radius, height } => Geometry::Cylinder {
            radius: radius * planar,
            height: height * sz,
        },
        Geometry::Capsule { radius, height } => Geometry::Capsule {
            radius: radius * planar,
            height: height * sz,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_uses_half_extents() {
        let collider = collider_from_geometry(&Geometry::Cuboid {
            size: nalgebra::Vector3::new(1.0, 2.0, 4.0),
        })
        .build();
        let cuboid = collider.shape().as_cuboid().unwrap();
        assert_eq!(cuboid.half_extents, Vector::new(0.5, 1.0, 2.0));
    }

    #[test]
    fn axial_shapes_point_along_z() {
        let collider = collider_from_geometry(&Geometry::Cylinder {
            radius: 0.1,
            height: 1.0,
        })
        .build();
        // Rapier's local +Y axis ends up on world +Z.
        let axis = collider.position().rotation * Vector::y();
        assert!((axis - Vector::z()).norm() < 1.0e-6);

        let aabb = collider.compute_aabb();
        assert!((aabb.maxs.z - 0.5).abs() < 1.0e-5);
        assert!((aabb.maxs.x - 0.1).abs() < 1.0e-5);
    }

    #[test]
    fn explicit_mass_beats_density() {
        let props = MassProps {
            mass: Some(2.0),
            density: Some(1000.0),
        };
        let collider = with_mass(ColliderBuilder::ball(0.1), &props).build();
        assert!((collider.mass() - 2.0).abs() < 1.0e-5);
    }

    #[test]
    fn scaling_cuboid_is_per_axis() {
        let scaled = scale_geometry(
            &Geometry::Cuboid {
                size: nalgebra::Vector3::new(1.0, 1.0, 1.0),
            },
            [2.0, 3.0, 0.5],
        );
        assert_eq!(
            scaled,
            Geometry::Cuboid {
                size: nalgebra::Vector3::new(2.0, 3.0, 0.5)
            }
        );
    }

    #[test]
    fn contact_offset_becomes_contact_skin() {
        let collision = CollisionProps {
            collision_enabled: true,
            contact_offset: Some(0.02),
        };
        let collider = with_collision(ColliderBuilder::ball(0.1), &collision).build();
        assert!((collider.contact_skin() - 0.02).abs() < 1.0e-6);
        assert!(!collider.is_sensor());

        let plain = with_collision(ColliderBuilder::ball(0.1), &CollisionProps::default()).build();
        assert_eq!(plain.contact_skin(), 0.0);
    }

    #[test]
    fn extra_position_iterations_reach_the_body() {
        let props = ArticulationRootProps {
            solver_position_iteration_count: 8,
            ..ArticulationRootProps::default()
        };
        let body = with_root_props(RigidBodyBuilder::dynamic(), &props).build();
        assert_eq!(body.additional_solver_iterations(), 4);

        let body = with_root_props(RigidBodyBuilder::dynamic(), &ArticulationRootProps::default())
            .build();
        assert_eq!(body.additional_solver_iterations(), 0);
    }

    #[test]
    fn settings_without_counterpart_are_reported() {
        assert!(unmapped_body_settings(&RigidBodyProps::default()).is_empty());
        let props = RigidBodyProps {
            max_depenetration_velocity: Some(5.0),
            ..RigidBodyProps::default()
        };
        assert_eq!(unmapped_body_settings(&props), vec!["max_depenetration_velocity"]);

        assert!(unmapped_material_settings(&RigidMaterial::default()).is_empty());
        let material = RigidMaterial {
            static_friction: 0.8,
            ..RigidMaterial::default()
        };
        assert_eq!(unmapped_material_settings(&material), vec!["static_friction"]);

        assert!(unmapped_root_settings(&ArticulationRootProps::default()).is_empty());
        let root = ArticulationRootProps {
            enabled_self_collisions: true,
            solver_velocity_iteration_count: 1,
            ..ArticulationRootProps::default()
        };
        assert_eq!(
            unmapped_root_settings(&root),
            vec!["enabled_self_collisions", "solver_velocity_iteration_count"]
        );
    }

    #[test]
    fn kinematic_props_make_kinematic_bodies() {
        let props = RigidBodyProps {
            kinematic: true,
            ..RigidBodyProps::default()
        };
        assert!(body_from_props(&props).build().is_kinematic());
        assert!(body_from_props(&RigidBodyProps::default()).build().is_dynamic());
    }
}
