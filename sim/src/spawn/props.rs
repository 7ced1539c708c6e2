//! Physics property groups attached to spawned shapes and assets.
//!
//! Each group is optional on the owning config; its presence is what turns
//! a purely visual prim into a simulated one.

use super::{ensure_non_negative, ensure_positive};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RigidBodyProps {
    /// Pose is driven by writes only; gravity and contacts do not move it.
    pub kinematic: bool,
    pub disable_gravity: bool,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Upper bound on the speed used to push overlapping bodies apart (m/s).
    pub max_depenetration_velocity: Option<f32>,
}

impl RigidBodyProps {
    pub fn validate(&self) -> Result<(), String> {
        ensure_non_negative("linear_damping", self.linear_damping)?;
        ensure_non_negative("angular_damping", self.angular_damping)?;
        if let Some(v) = self.max_depenetration_velocity {
            ensure_positive("max_depenetration_velocity", v)?;
        }
        Ok(())
    }
}

/// Mass override. When both are set, `mass` wins.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MassProps {
    pub mass: Option<f32>,
    pub density: Option<f32>,
}

impl MassProps {
    pub fn mass(mass: f32) -> Self {
        Self {
            mass: Some(mass),
            density: None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(mass) = self.mass {
            ensure_positive("mass", mass)?;
        }
        if let Some(density) = self.density {
            ensure_positive("density", density)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionProps {
    pub collision_enabled: bool,
    pub contact_offset: Option<f32>,
}

impl Default for CollisionProps {
    fn default() -> Self {
        Self {
            collision_enabled: true,
            contact_offset: None,
        }
    }
}

impl CollisionProps {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(offset) = self.contact_offset {
            ensure_non_negative("contact_offset", offset)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeformableProps {
    pub self_collision: bool,
    pub solver_position_iteration_count: u32,
    pub vertex_velocity_damping: f32,
    pub simulation_hexahedral_resolution: u32,
}

impl Default for DeformableProps {
    fn default() -> Self {
        Self {
            self_collision: false,
            solver_position_iteration_count: 16,
            vertex_velocity_damping: 0.005,
            simulation_hexahedral_resolution: 10,
        }
    }
}

impl DeformableProps {
    pub fn validate(&self) -> Result<(), String> {
        if self.solver_position_iteration_count == 0 {
            return Err("solver_position_iteration_count must be at least 1".into());
        }
        if self.simulation_hexahedral_resolution == 0 {
            return Err("simulation_hexahedral_resolution must be at least 1".into());
        }
        ensure_non_negative("vertex_velocity_damping", self.vertex_velocity_damping)
    }
}

/// Properties of the root of an articulated asset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArticulationRootProps {
    pub enabled_self_collisions: bool,
    pub solver_position_iteration_count: u32,
    pub solver_velocity_iteration_count: u32,
    /// Weld the root link to the world.
    pub fix_root_link: bool,
}

impl Default for ArticulationRootProps {
    fn default() -> Self {
        Self {
            enabled_self_collisions: false,
            solver_position_iteration_count: 4,
            solver_velocity_iteration_count: 0,
            fix_root_link: false,
        }
    }
}

impl ArticulationRootProps {
    pub fn validate(&self) -> Result<(), String> {
        if self.solver_position_iteration_count == 0 {
            return Err("solver_position_iteration_count must be at least 1".into());
        }
        Ok(())
    }
}
