//! Scattering backend trait and precision descriptors.
//!
//! The [`ScatteringSolver`] trait is the only contact point with the
//! single-particle solver. Double and extended precision builds of the solver
//! implement the same trait, so the batch layer in `nlay-core` never needs to
//! know which arithmetic it is driving.

use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Coefficients, FieldPoints, NearField, ScatteringParameters};

/// Errors reported by a scattering backend.
///
/// The batch layer never inspects these; they are surfaced to the caller as-is.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Series failed to converge after {terms} terms")]
    NonConvergence { terms: usize },

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Numeric precision a backend computes in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionMode {
    /// IEEE 754 double precision.
    #[default]
    Double,
    /// Arbitrary-precision arithmetic. Slower, but robust for very large size
    /// parameters and high index contrast.
    Extended,
}

impl fmt::Display for PrecisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double => write!(f, "double"),
            Self::Extended => write!(f, "extended"),
        }
    }
}

/// Describes a scattering backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendInfo {
    pub name: String,
    pub precision: PrecisionMode,
}

/// Single-particle multilayered-sphere solver.
///
/// Each call handles exactly one particle: `x` holds the size parameter of
/// every layer and `m` the matching relative refractive indices. `nmax` caps
/// the number of multipolar terms (`None` lets the solver choose) and
/// `pec_layer` marks a perfectly conducting layer by index (`None` for none).
/// Both are forwarded by the batch layer without interpretation.
pub trait ScatteringSolver: Send + Sync {
    /// Return information about the backend.
    fn info(&self) -> BackendInfo;

    /// Compute the scattering coefficients $a_n$, $b_n$.
    fn coefficients(
        &self,
        x: &[f64],
        m: &[Complex64],
        nmax: Option<usize>,
        pec_layer: Option<usize>,
    ) -> Result<Coefficients, SolverError>;

    /// Compute efficiencies and the amplitudes $S_1$, $S_2$ at each angle in
    /// `theta` (radians).
    fn parameters(
        &self,
        x: &[f64],
        m: &[Complex64],
        theta: &[f64],
        nmax: Option<usize>,
        pec_layer: Option<usize>,
    ) -> Result<ScatteringParameters, SolverError>;

    /// Compute the complex electric and magnetic fields at `points`.
    fn field(
        &self,
        x: &[f64],
        m: &[Complex64],
        points: FieldPoints<'_>,
        nmax: Option<usize>,
        pec_layer: Option<usize>,
    ) -> Result<NearField, SolverError>;
}
