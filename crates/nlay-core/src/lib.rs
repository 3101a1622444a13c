//! # nlay Core
//!
//! Batch layer over a single-particle multilayered-sphere scattering solver.
//! Validates array-shaped input, calls the solver once per particle and
//! stacks the results, zero-padding coefficient rows whose term counts
//! differ between particles.
//!
//! ## Entry points
//!
//! - [`scattering_coefficients`], [`scattering_parameters`], [`near_field`]:
//!   raw array input, dispatched through the globally selected precision
//!   backend (see [`nlay_backend::use_extended_precision`]).
//! - [`BatchDispatcher`]: typed input, explicit backend.
//!
//! ## Modules
//!
//! - [`types`]: Particle inputs, options and batch results.
//! - [`shape`]: Rank checks for raw input.
//! - [`aggregate`]: Zero-padded row stacking.
//! - [`dispatch`]: The per-particle loop.
//! - [`config`]: TOML job configuration.

pub mod aggregate;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod shape;
pub mod types;

pub use dispatch::{near_field, scattering_coefficients, scattering_parameters, BatchDispatcher};
pub use error::BatchError;
pub use shape::NestedArray;
pub use types::{
    CoefficientBatch, Coordinates, DispatchOptions, Dispatched, FieldBatch, Particle,
    ParticleBatch, ParticleInput, RefractiveIndices, ScatteringBatch,
};
