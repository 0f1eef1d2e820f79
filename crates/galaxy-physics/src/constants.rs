//! Default constants for the galaxy simulation
//!
//! These are simulation units tuned for real-time visualization of a few
//! thousand stars, not physical SI values.

/// Softening parameter to prevent singularities at r→0
pub const SOFTENING: f32 = 0.01;

/// Mass of the dark-matter halo pulling every star toward the center
pub const DARK_MATTER_MASS: f32 = 10.0;

/// Dark-energy expansion coefficient (acceleration per unit distance from the center)
pub const DARK_ENERGY_ACCELERATION: f32 = 0.0001;

/// Integration time step
pub const DELTA_TIME: f32 = 0.0001;

/// Default number of stars
pub const PARTICLE_COUNT: usize = 10_000;

/// Outer radius of the seeded spiral
pub const SPIRAL_RADIUS: f32 = 1.2;

/// Half-thickness of the seeded spiral along z
pub const SPIRAL_THICKNESS: f32 = 0.2;
