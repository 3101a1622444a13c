//! # nlay Backend
//!
//! Boundary between the batch layer and the single-particle multilayered
//! sphere solver. This crate provides the [`ScatteringSolver`] trait that
//! solver builds implement, and a process-wide registry that selects which
//! build (double or extended precision) batch dispatches route through.
//!
//! ## Precision modes
//!
//! | Mode | Switch | Notes |
//! |------|--------|-------|
//! | Double | [`use_standard_precision`] | Default |
//! | Extended | [`use_extended_precision`] | Arbitrary precision, slower |

pub mod backend;
pub mod registry;
pub mod types;

pub use backend::{BackendInfo, PrecisionMode, ScatteringSolver, SolverError};
pub use registry::{
    active_backend, register_backend, switch_to, unregister_backend, use_extended_precision,
    use_standard_precision, BackendRegistry, RegistryError,
};
pub use types::{Coefficients, FieldPoints, NearField, ScatteringParameters};
