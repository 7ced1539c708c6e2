//! Episodic reset placement.
//!
//! Reset is a pure function of the object's default root state, its scene
//! origin and a random source, so it can be tested without a simulation host:
//!
//! ```text
//! state = default.clone()
//! state.pose = origin * state.pose
//! state.position += sample_cylinder(shell, rng)
//! ```
//!
//! The default pose is parent-relative and the origin is the parent's world
//! frame, so a rotated parent rotates the object back into place. The random
//! offset is drawn in world axes. The vertical axis is +Z.

use std::f32::consts::TAU;

use nalgebra::{Isometry3, Point3, Vector3};
use rand::Rng;

use crate::state::RootState;

/// Volume between two coaxial cylinders, bounded in height.
///
/// `inner_radius == outer_radius` samples the lateral surface of a cylinder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CylinderShell {
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// `(min, max)` height offset along +Z (meters).
    pub height_range: (f32, f32),
}

impl CylinderShell {
    /// Lateral surface of a cylinder of radius `radius`.
    pub fn surface(radius: f32, height_range: (f32, f32)) -> Self {
        Self {
            inner_radius: radius,
            outer_radius: radius,
            height_range,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let (lo, hi) = self.height_range;
        let finite = [self.inner_radius, self.outer_radius, lo, hi]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err("cylinder shell has non-finite bounds".into());
        }
        if self.inner_radius < 0.0 {
            return Err(format!("inner radius must be >= 0, got {}", self.inner_radius));
        }
        if self.inner_radius > self.outer_radius {
            return Err(format!(
                "inner radius {} exceeds outer radius {}",
                self.inner_radius, self.outer_radius
            ));
        }
        if lo > hi {
            return Err(format!("height range ({lo}, {hi}) is inverted"));
        }
        Ok(())
    }

    /// Does `offset` lie in the shell (with tolerance `eps`)?
    pub fn contains(&self, offset: Vector3<f32>, eps: f32) -> bool {
        let r = (offset.x * offset.x + offset.y * offset.y).sqrt();
        let (lo, hi) = self.height_range;
        r >= self.inner_radius - eps
            && r <= self.outer_radius + eps
            && offset.z >= lo - eps
            && offset.z <= hi + eps
    }
}

/// Draw a point uniformly (by area) from the shell's annulus and uniformly in height.
///
/// Assumes a validated shell.
pub fn sample_cylinder<R: Rng>(shell: &CylinderShell, rng: &mut R) -> Vector3<f32> {
    let r_in_sq = shell.inner_radius * shell.inner_radius;
    let r_out_sq = shell.outer_radius * shell.outer_radius;

    let u: f32 = rng.gen_range(0.0..=1.0);
    // Inverse-CDF for radius under a uniform area density.
    let radius = (u * (r_out_sq - r_in_sq) + r_in_sq).sqrt();
    let theta: f32 = rng.gen_range(0.0..TAU);

    let (lo, hi) = shell.height_range;
    let z = if hi > lo { rng.gen_range(lo..=hi) } else { lo };

    // Clamp so float rounding never leaves the annulus.
    let radius = radius.clamp(shell.inner_radius, shell.outer_radius);
    Vector3::new(radius * theta.cos(), radius * theta.sin(), z)
}

/// How tracked objects are placed on reset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResetPolicy {
    /// Default state plus origin, no randomization.
    Fixed,
    /// Default state plus origin plus a draw from the shell.
    Randomized(CylinderShell),
}

impl ResetPolicy {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ResetPolicy::Fixed => Ok(()),
            ResetPolicy::Randomized(shell) => shell.validate(),
        }
    }
}

/// Root state an object is reset to. Velocity is taken from the default state.
pub fn compute_reset_state<R: Rng>(
    default: &RootState,
    origin: &Isometry3<f32>,
    policy: &ResetPolicy,
    rng: &mut R,
) -> RootState {
    let mut state = *default;
    state.pose.position = (origin * Point3::from(default.pose.position)).coords;
    state.pose.orientation = origin.rotation * default.pose.orientation;
    if let ResetPolicy::Randomized(shell) = policy {
        state.pose.position += sample_cylinder(shell, rng);
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Pose, Velocity};
    use nalgebra::{Translation3, UnitQuaternion};
    use rand::SeedableRng;
    use std::f32::consts::FRAC_PI_2;
    use rand::rngs::StdRng;

    const EPS: f32 = 1.0e-5;

    #[test]
    fn samples_stay_inside_the_shell() {
        let shells = [
            CylinderShell::surface(0.1, (0.25, 0.5)),
            CylinderShell {
                inner_radius: 0.5,
                outer_radius: 2.0,
                height_range: (-1.0, 1.0),
            },
            CylinderShell {
                inner_radius: 0.0,
                outer_radius: 1.0,
                height_range: (0.3, 0.3),
            },
        ];
        let mut rng = StdRng::seed_from_u64(7);
        for shell in &shells {
            for _ in 0..2_000 {
                let p = sample_cylinder(shell, &mut rng);
                assert!(shell.contains(p, EPS), "{p:?} outside {shell:?}");
            }
        }
    }

    #[test]
    fn surface_shell_has_constant_radius() {
        let shell = CylinderShell::surface(0.1, (0.25, 0.5));
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let p = sample_cylinder(&shell, &mut rng);
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 0.1).abs() < EPS);
        }
    }

    #[test]
    fn annulus_sampling_is_area_uniform() {
        // For inner = 0 the fraction of draws with r <= R/2 should be ~1/4.
        let shell = CylinderShell {
            inner_radius: 0.0,
            outer_radius: 1.0,
            height_range: (0.0, 0.0),
        };
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let inside = (0..n)
            .map(|_| sample_cylinder(&shell, &mut rng))
            .filter(|p| p.xy().norm() <= 0.5)
            .count();
        let fraction = inside as f32 / n as f32;
        assert!((fraction - 0.25).abs() < 0.02, "fraction = {fraction}");
    }

    #[test]
    fn same_seed_gives_same_reset_states() {
        let default = RootState::at_rest(Pose::identity());
        let policy = ResetPolicy::Randomized(CylinderShell::surface(0.1, (0.25, 0.5)));
        let origin = Isometry3::translation(0.25, -0.25, 0.0);

        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(
                compute_reset_state(&default, &origin, &policy, &mut a),
                compute_reset_state(&default, &origin, &policy, &mut b)
            );
        }
    }

    #[test]
    fn reset_adds_origin_and_keeps_layout() {
        let default = RootState {
            pose: Pose::from_position(Vector3::new(0.0, 0.0, 1.0)),
            velocity: Velocity::zero(),
        };
        let origin = Isometry3::translation(-0.25, 0.25, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let fixed = compute_reset_state(&default, &origin, &ResetPolicy::Fixed, &mut rng);
        assert_eq!(fixed.pose.position, Vector3::new(-0.25, 0.25, 1.0));
        assert_eq!(fixed.pose.orientation, default.pose.orientation);
        assert_eq!(fixed.velocity, Velocity::zero());

        let shell = CylinderShell::surface(0.1, (0.25, 0.5));
        let random =
            compute_reset_state(&default, &origin, &ResetPolicy::Randomized(shell), &mut rng);
        let offset = random.pose.position - fixed.pose.position;
        assert!(shell.contains(offset, EPS));
        assert_eq!(random.to_array().len(), 13);
    }

    #[test]
    fn reset_applies_parent_rotation() {
        // Parent at (1, 0, 0) turned a quarter turn about +Z; child at local (1, 0, 0).
        let quarter = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let origin = Isometry3::from_parts(Translation3::new(1.0, 0.0, 0.0), quarter);
        let default = RootState::at_rest(Pose::from_position(Vector3::new(1.0, 0.0, 0.0)));
        let mut rng = StdRng::seed_from_u64(0);

        let fixed = compute_reset_state(&default, &origin, &ResetPolicy::Fixed, &mut rng);
        assert!((fixed.pose.position - Vector3::new(1.0, 1.0, 0.0)).norm() < EPS);
        assert!(fixed.pose.orientation.angle_to(&quarter) < EPS);
        assert_eq!(fixed.velocity, Velocity::zero());
    }

    #[test]
    fn invalid_shells_are_rejected() {
        let inverted = CylinderShell {
            inner_radius: 2.0,
            outer_radius: 1.0,
            height_range: (0.0, 1.0),
        };
        assert!(inverted.validate().is_err());
        assert!(CylinderShell::surface(0.1, (1.0, 0.0)).validate().is_err());
        assert!(CylinderShell::surface(-0.1, (0.0, 1.0)).validate().is_err());
        assert!(CylinderShell::surface(0.1, (0.25, 0.5)).validate().is_ok());
    }
}
