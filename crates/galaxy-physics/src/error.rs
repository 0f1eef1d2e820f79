//! Error types for the galaxy simulator.
//!
//! Every fallible operation in the workspace returns `SimResult<T>`. All
//! variants except `Readback` can only occur before the driver reaches
//! `Ready`; a tick itself performs no fallible work on the CPU path.

use thiserror::Error;

/// Unified error type for the galaxy simulator.
#[derive(Debug, Error)]
pub enum SimError {
    /// A physics parameter is degenerate (e.g. `epsilon <= 0`, NaN time step).
    #[error("Invalid physics parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested execution backend cannot be initialized.
    #[error("Execution backend unavailable: {0}")]
    BackendUnavailable(String),

    /// State arrays or device buffers could not be allocated.
    #[error("Cannot allocate {what} for {count} particles: {reason}")]
    Allocation {
        what: &'static str,
        count: usize,
        reason: String,
    },

    /// Reading results back from the device failed (device lost, map error).
    #[error("Readback failed: {0}")]
    Readback(String),

    /// The driver was asked to do something its current state forbids.
    #[error("Simulation is {state}, cannot {action}")]
    InvalidState {
        state: &'static str,
        action: &'static str,
    },
}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;
