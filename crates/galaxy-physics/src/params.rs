//! Physics parameters for runtime tuning
//!
//! The UI/config layer owns the authoritative copy and hands it to the
//! simulation by reference on every tick. Nothing here is global.

use crate::constants::*;
use crate::error::{SimError, SimResult};
use glam::Vec3;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Softening added to the squared distance. Must be strictly positive.
    pub epsilon: f32,
    /// Strength of the dark-matter pull toward `center`. Zero disables it.
    pub dark_matter_mass: f32,
    /// Dark-energy expansion coefficient. Zero disables it.
    pub dark_energy_acceleration: f32,
    /// Integration time step.
    pub delta_time: f32,
    /// Reference point for both dark terms.
    pub center: Vec3,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            epsilon: SOFTENING,
            dark_matter_mass: DARK_MATTER_MASS,
            dark_energy_acceleration: DARK_ENERGY_ACCELERATION,
            delta_time: DELTA_TIME,
            center: Vec3::ZERO,
        }
    }
}

impl PhysicsParams {
    /// Plain mutual gravity: both dark terms disabled.
    pub fn gravity_only(epsilon: f32, delta_time: f32) -> Self {
        Self {
            epsilon,
            dark_matter_mass: 0.0,
            dark_energy_acceleration: 0.0,
            delta_time,
            center: Vec3::ZERO,
        }
    }

    /// Reject values that would turn trajectories into NaN/Inf.
    pub fn validate(&self) -> SimResult<()> {
        finite("epsilon", self.epsilon)?;
        if self.epsilon <= 0.0 {
            return Err(SimError::InvalidParameter {
                name: "epsilon",
                reason: format!("must be > 0, got {}", self.epsilon),
            });
        }

        finite("delta_time", self.delta_time)?;
        if self.delta_time <= 0.0 {
            return Err(SimError::InvalidParameter {
                name: "delta_time",
                reason: format!("must be > 0, got {}", self.delta_time),
            });
        }

        finite("dark_matter_mass", self.dark_matter_mass)?;
        if self.dark_matter_mass < 0.0 {
            return Err(SimError::InvalidParameter {
                name: "dark_matter_mass",
                reason: format!("must be >= 0, got {}", self.dark_matter_mass),
            });
        }

        finite("dark_energy_acceleration", self.dark_energy_acceleration)?;
        if self.dark_energy_acceleration < 0.0 {
            return Err(SimError::InvalidParameter {
                name: "dark_energy_acceleration",
                reason: format!("must be >= 0, got {}", self.dark_energy_acceleration),
            });
        }

        if !self.center.is_finite() {
            return Err(SimError::InvalidParameter {
                name: "center",
                reason: format!("must be finite, got {}", self.center),
            });
        }

        Ok(())
    }
}

fn finite(name: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            reason: format!("must be finite, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PhysicsParams::default().validate().is_ok());
        assert!(PhysicsParams::gravity_only(0.01, 0.001).validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_epsilon() {
        for epsilon in [0.0, -0.01] {
            let params = PhysicsParams {
                epsilon,
                ..Default::default()
            };
            match params.validate() {
                Err(SimError::InvalidParameter { name, .. }) => assert_eq!(name, "epsilon"),
                other => panic!("expected epsilon rejection, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejects_nan_and_inf() {
        let params = PhysicsParams {
            delta_time: f32::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = PhysicsParams {
            dark_energy_acceleration: f32::INFINITY,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = PhysicsParams {
            center: Vec3::new(0.0, f32::NAN, 0.0),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_dark_terms() {
        let params = PhysicsParams {
            dark_matter_mass: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let params: PhysicsParams = serde_yaml::from_str("epsilon: 0.05\ndelta_time: 0.002\n").unwrap();

        assert_eq!(params.epsilon, 0.05);
        assert_eq!(params.delta_time, 0.002);
        assert_eq!(params.dark_matter_mass, DARK_MATTER_MASS);
        assert_eq!(params.center, Vec3::ZERO);
    }
}
