//! # Galaxy Simulation Engine
//!
//! N-body galaxy simulation with two interchangeable execution backends: a
//! GPU compute path (wgpu) and a sequential CPU reference. The
//! [`SimulationDriver`] advances the particle state one tick per frame.

pub mod backend;
pub mod driver;
pub mod gpu;
pub mod params;
pub mod seed;
pub mod state;

pub use backend::*;
pub use driver::*;
pub use gpu::*;
pub use params::*;
pub use seed::*;
pub use state::*;
