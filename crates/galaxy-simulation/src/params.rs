//! Run configuration and the GPU-side parameter block

use crate::backend::BackendKind;
use crate::seed::Placement;
use bytemuck::{Pod, Zeroable};
use galaxy_physics::{PhysicsParams, SimError, SimResult, PARTICLE_COUNT};
use serde::Deserialize;

/// Everything fixed for the lifetime of one run, plus the initial physics
/// parameters. The particle count cannot change after initialization.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub particle_count: usize,
    pub placement: Placement,
    pub seed: u64,
    pub backend: BackendKind,
    pub physics: PhysicsParams,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            placement: Placement::default(),
            seed: 0,
            backend: BackendKind::default(),
            physics: PhysicsParams::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.particle_count == 0 {
            return Err(SimError::InvalidConfig(
                "particle_count must be at least 1".into(),
            ));
        }
        if u32::try_from(self.particle_count).is_err() {
            return Err(SimError::InvalidConfig(format!(
                "particle_count {} does not fit in a u32 index",
                self.particle_count
            )));
        }
        self.placement.validate()?;
        self.physics.validate()
    }
}

/// Uniform block for the compute shader (matches `Params` in nbody.wgsl)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuParams {
    pub epsilon: f32,
    pub dark_matter_mass: f32,
    pub dark_energy_acceleration: f32,
    pub delta_time: f32,

    // WGSL vec3 is 16-byte aligned; particle_count fills the last lane
    pub center: [f32; 3],
    pub particle_count: u32,
}

impl GpuParams {
    pub fn new(params: &PhysicsParams, particle_count: u32) -> Self {
        Self {
            epsilon: params.epsilon,
            dark_matter_mass: params.dark_matter_mass,
            dark_energy_acceleration: params.dark_energy_acceleration,
            delta_time: params.delta_time,
            center: params.center.to_array(),
            particle_count,
        }
    }
}

/// One vec3 as stored in a WGSL `array<vec4<f32>>` (16-byte stride)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct GpuVec3 {
    pub value: [f32; 3],
    pub _padding: f32,
}

impl From<glam::Vec3> for GpuVec3 {
    fn from(v: glam::Vec3) -> Self {
        Self {
            value: v.to_array(),
            _padding: 0.0,
        }
    }
}

impl From<GpuVec3> for glam::Vec3 {
    fn from(v: GpuVec3) -> Self {
        glam::Vec3::from_array(v.value)
    }
}
