//! Initial star placement

use galaxy_physics::{SimError, SimResult, SPIRAL_RADIUS, SPIRAL_THICKNESS};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

/// Rule used to seed positions at startup. Velocities always start at zero.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Star `i` sits at radius `i / N * radius` and angle `i` radians, with
    /// random height in `[-thickness, thickness]`.
    Spiral { radius: f32, thickness: f32 },
    /// Uniform area density within `radius`, random height.
    Disc { radius: f32, thickness: f32 },
    /// Uniform fill of `[-half_extent, half_extent]^3`.
    Cube { half_extent: f32 },
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Spiral {
            radius: SPIRAL_RADIUS,
            thickness: SPIRAL_THICKNESS,
        }
    }
}

impl std::str::FromStr for Placement {
    type Err = SimError;

    /// Parse a placement name, using the default dimensions for it.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spiral" => Ok(Placement::default()),
            "disc" | "disk" => Ok(Placement::Disc {
                radius: SPIRAL_RADIUS,
                thickness: SPIRAL_THICKNESS,
            }),
            "cube" => Ok(Placement::Cube { half_extent: 1.0 }),
            other => Err(SimError::InvalidConfig(format!(
                "unknown placement `{other}` (expected spiral, disc or cube)"
            ))),
        }
    }
}

impl Placement {
    pub fn validate(&self) -> SimResult<()> {
        let (name, value, allow_zero) = match *self {
            Placement::Spiral { radius, thickness } | Placement::Disc { radius, thickness } => {
                if !(thickness.is_finite() && thickness >= 0.0) {
                    return Err(SimError::InvalidConfig(format!(
                        "placement thickness must be finite and >= 0, got {thickness}"
                    )));
                }
                ("radius", radius, true)
            }
            Placement::Cube { half_extent } => ("half_extent", half_extent, false),
        };

        let ok = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
        if !ok {
            return Err(SimError::InvalidConfig(format!(
                "placement {name} must be finite and positive, got {value}"
            )));
        }
        Ok(())
    }

    /// Overwrite `positions` according to this rule. Deterministic in `seed`.
    pub fn place(&self, positions: &mut [Vec3], seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let count = positions.len();

        match *self {
            Placement::Spiral { radius, thickness } => {
                for (i, position) in positions.iter_mut().enumerate() {
                    let r = i as f32 / count as f32 * radius;
                    let angle = i as f32;
                    let z = rng.random_range(-thickness..=thickness);
                    *position = Vec3::new(r * angle.cos(), r * angle.sin(), z);
                }
            }
            Placement::Disc { radius, thickness } => {
                for position in positions.iter_mut() {
                    let r = radius * rng.random::<f32>().sqrt();
                    let theta = rng.random::<f32>() * std::f32::consts::TAU;
                    let z = rng.random_range(-thickness..=thickness);
                    *position = Vec3::new(r * theta.cos(), r * theta.sin(), z);
                }
            }
            Placement::Cube { half_extent } => {
                for position in positions.iter_mut() {
                    *position = Vec3::new(
                        rng.random_range(-half_extent..=half_extent),
                        rng.random_range(-half_extent..=half_extent),
                        rng.random_range(-half_extent..=half_extent),
                    );
                }
            }
        }
    }
}
