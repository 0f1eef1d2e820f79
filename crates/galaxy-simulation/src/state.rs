//! Particle state store
//!
//! Owns the authoritative position and velocity arrays. Both always have the
//! same length, fixed at allocation; there is no insertion or removal.

use crate::seed::Placement;
use galaxy_physics::{SimError, SimResult};
use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
}

impl ParticleState {
    /// Allocate `count` stars at the origin with zero velocity.
    pub fn allocate(count: usize) -> SimResult<Self> {
        if count == 0 {
            return Err(SimError::InvalidConfig(
                "particle state needs at least one particle".into(),
            ));
        }

        Ok(Self {
            positions: zeroed("position array", count)?,
            velocities: zeroed("velocity array", count)?,
        })
    }

    /// Allocate and seed positions with `placement`.
    pub fn seeded(count: usize, placement: &Placement, seed: u64) -> SimResult<Self> {
        let mut state = Self::allocate(count)?;
        placement.place(&mut state.positions, seed);
        Ok(state)
    }

    /// Build from explicit arrays (tests, scripted scenarios).
    pub fn from_parts(positions: Vec<Vec3>, velocities: Vec<Vec3>) -> SimResult<Self> {
        if positions.is_empty() {
            return Err(SimError::InvalidConfig(
                "particle state needs at least one particle".into(),
            ));
        }
        if positions.len() != velocities.len() {
            return Err(SimError::InvalidConfig(format!(
                "{} positions but {} velocities",
                positions.len(),
                velocities.len()
            )));
        }
        Ok(Self {
            positions,
            velocities,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Both arrays, mutably, for the duration of one tick.
    pub fn arrays_mut(&mut self) -> (&mut [Vec3], &mut [Vec3]) {
        (&mut self.positions, &mut self.velocities)
    }
}

fn zeroed(what: &'static str, count: usize) -> SimResult<Vec<Vec3>> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(count)
        .map_err(|err| SimError::Allocation {
            what,
            count,
            reason: err.to_string(),
        })?;
    values.resize(count, Vec3::ZERO);
    Ok(values)
}
