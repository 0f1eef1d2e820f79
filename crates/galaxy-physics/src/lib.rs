//! # Galaxy Physics
//!
//! Force law and integration for the galaxy N-body simulation: softened
//! pairwise gravity, a dark-matter pull and a dark-energy expansion term,
//! advanced with semi-implicit Euler. This is the CPU reference; the GPU
//! compute path in `galaxy-simulation` mirrors it.

pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod forces;
pub mod integrate;
pub mod params;

pub use constants::*;
pub use diagnostics::*;
pub use error::*;
pub use forces::*;
pub use integrate::*;
pub use params::*;
