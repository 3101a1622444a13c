//! Errors raised by validation and batch dispatch.

use nlay_backend::{RegistryError, SolverError};
use thiserror::Error;

/// Errors that abort a dispatch.
///
/// Shape errors are raised before any solver call. Solver errors abort the
/// batch at the failing particle; nothing computed so far is returned.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Invalid shape for {what}: {detail}")]
    InvalidShape { what: &'static str, detail: String },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Solver failure at {}: {source}", describe_particle(.particle))]
    SolverFailure {
        /// Batch row of the failing particle, `None` for a single-particle call.
        particle: Option<usize>,
        source: SolverError,
    },

    #[error(transparent)]
    BackendUnavailable(#[from] RegistryError),
}

fn describe_particle(particle: &Option<usize>) -> String {
    match particle {
        Some(i) => format!("particle {}", i),
        None => "single particle".into(),
    }
}
