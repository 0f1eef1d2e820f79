//! Execution backends
//!
//! The [`Backend`] trait is the single seam between the driver and the
//! hardware. Two strategies implement it:
//! - [`BulkParallelBackend`]: one GPU compute invocation per star (wgpu)
//! - [`SequentialBackend`]: the CPU reference, index by index
//!
//! Capability probing happens once, in [`create_backend`]. The tick loop never
//! branches on the backend kind.

mod compute;
mod readback;
mod sequential;

pub use compute::BulkParallelBackend;
pub use readback::read_mapped;
pub use sequential::SequentialBackend;

use crate::gpu::GpuContext;
use crate::state::ParticleState;
use galaxy_physics::{PhysicsParams, SimError, SimResult};
use serde::Deserialize;

/// One tick of the force/integration kernel, realized on some hardware.
pub trait Backend {
    /// Human-readable name for logs (e.g. "sequential", "wgpu (Vulkan)").
    fn name(&self) -> &str;

    /// Which strategy this is. Never `Auto`.
    fn kind(&self) -> BackendKind;

    /// Number of stars this backend was sized for.
    fn particle_count(&self) -> usize;

    /// Advance `state` by one tick using `params`.
    ///
    /// Must not keep any reference to `state` after returning. When this
    /// returns `Ok`, every position and velocity has been fully written.
    fn step(&mut self, state: &mut ParticleState, params: &PhysicsParams) -> SimResult<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// GPU compute. Fails fast when no compute-capable adapter exists.
    #[default]
    #[serde(alias = "gpu")]
    BulkParallel,
    /// Single-threaded CPU reference.
    #[serde(alias = "cpu")]
    Sequential,
    /// GPU if available, otherwise sequential with a warning.
    Auto,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::BulkParallel => "bulk-parallel",
            BackendKind::Sequential => "sequential",
            BackendKind::Auto => "auto",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bulk-parallel" | "gpu" => Ok(BackendKind::BulkParallel),
            "sequential" | "cpu" => Ok(BackendKind::Sequential),
            "auto" => Ok(BackendKind::Auto),
            other => Err(SimError::InvalidConfig(format!(
                "unknown backend `{other}` (expected gpu, cpu or auto)"
            ))),
        }
    }
}

/// Probe capabilities and build the requested backend for `particle_count` stars.
pub fn create_backend(kind: BackendKind, particle_count: usize) -> SimResult<Box<dyn Backend>> {
    match kind {
        BackendKind::Sequential => Ok(Box::new(SequentialBackend::new(particle_count)?)),
        BackendKind::BulkParallel => Ok(Box::new(create_bulk_parallel(particle_count)?)),
        BackendKind::Auto => match create_bulk_parallel(particle_count) {
            Ok(backend) => Ok(Box::new(backend)),
            Err(err @ SimError::BackendUnavailable(_)) => {
                log::warn!("GPU compute unavailable ({err}); falling back to the sequential backend");
                Ok(Box::new(SequentialBackend::new(particle_count)?))
            }
            Err(err) => Err(err),
        },
    }
}

fn create_bulk_parallel(particle_count: usize) -> SimResult<BulkParallelBackend> {
    let context = pollster::block_on(GpuContext::request())?;
    pollster::block_on(BulkParallelBackend::new(context, particle_count))
}

/// Both backends are sized once; a state of any other length is a caller bug.
pub(crate) fn check_len(expected: usize, state: &ParticleState) -> SimResult<()> {
    if state.len() == expected {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(format!(
            "backend was built for {expected} particles but the state holds {}",
            state.len()
        )))
    }
}
