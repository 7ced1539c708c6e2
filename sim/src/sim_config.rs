//! Runtime configuration of the simulation backend.

use log::warn;
use nalgebra::Vector3;

use crate::constants::{DEFAULT_DEVICE, DEFAULT_PHYSICS_DT, GRAVITY_MPS2};
use crate::error::SimError;

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Fixed physics delta (seconds).
    pub dt: f32,
    /// World gravity. The vertical axis is +Z.
    pub gravity: Vector3<f32>,
    /// Compute device name. Only `cpu` is backed; anything else falls back to it.
    pub device: String,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: DEFAULT_PHYSICS_DT,
            gravity: Vector3::new(0.0, 0.0, -GRAVITY_MPS2),
            device: DEFAULT_DEVICE.to_string(),
        }
    }
}

impl SimulationConfig {
    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::Launch(format!(
                "physics dt must be positive and finite, got {}",
                self.dt
            )));
        }
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(SimError::Launch("gravity must be finite".into()));
        }
        if self.device != DEFAULT_DEVICE {
            warn!(
                "device `{}` is not available, simulating on `{DEFAULT_DEVICE}`",
                self.device
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SimulationConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.dt, 0.01);
        assert_eq!(cfg.gravity.z, -9.81);
    }

    #[test]
    fn non_positive_dt_fails_launch() {
        for dt in [0.0, -0.01, f32::NAN, f32::INFINITY] {
            let cfg = SimulationConfig::default().with_dt(dt);
            assert!(matches!(cfg.validate(), Err(SimError::Launch(_))), "dt = {dt}");
        }
    }

    #[test]
    fn unknown_device_is_not_fatal() {
        let cfg = SimulationConfig::default().with_device("cuda:0");
        assert!(cfg.validate().is_ok());
    }
}
