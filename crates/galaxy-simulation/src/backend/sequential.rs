//! Sequential CPU backend: the reference implementation.

use super::{check_len, Backend, BackendKind};
use crate::state::ParticleState;
use galaxy_physics::{PhysicsParams, SimError, SimResult};
use glam::Vec3;

/// Runs the kernel from `galaxy_physics::step` on the calling thread.
///
/// Used for small particle counts, machines without GPU compute, and as the
/// ground truth the GPU results are compared against.
pub struct SequentialBackend {
    accelerations: Vec<Vec3>,
}

impl SequentialBackend {
    pub fn new(particle_count: usize) -> SimResult<Self> {
        let mut accelerations = Vec::new();
        accelerations
            .try_reserve_exact(particle_count)
            .map_err(|err| SimError::Allocation {
                what: "acceleration scratch buffer",
                count: particle_count,
                reason: err.to_string(),
            })?;
        accelerations.resize(particle_count, Vec3::ZERO);

        log::info!("✓ Sequential backend ready ({particle_count} particles)");
        Ok(Self { accelerations })
    }
}

impl Backend for SequentialBackend {
    fn name(&self) -> &str {
        "sequential"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Sequential
    }

    fn particle_count(&self) -> usize {
        self.accelerations.len()
    }

    fn step(&mut self, state: &mut ParticleState, params: &PhysicsParams) -> SimResult<()> {
        check_len(self.accelerations.len(), state)?;

        let (positions, velocities) = state.arrays_mut();
        galaxy_physics::step(positions, velocities, params, &mut self.accelerations);
        Ok(())
    }
}
