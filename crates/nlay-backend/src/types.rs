//! Per-particle results returned by a scattering backend.
//!
//! Every result carries the number of multipolar terms the backend needed
//! for convergence. Coefficient results are as wide as that term count;
//! amplitude and field results are shaped by the caller's angles or
//! observation points instead.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Mie scattering coefficients $a_n$ and $b_n$ of a single particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Number of multipolar expansion terms used.
    pub terms: usize,
    /// Electric multipole coefficients, one per term.
    pub an: Array1<Complex64>,
    /// Magnetic multipole coefficients, one per term.
    pub bn: Array1<Complex64>,
}

/// Far-field scattering parameters of a single particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatteringParameters {
    /// Number of multipolar expansion terms used.
    pub terms: usize,
    /// Extinction efficiency.
    pub qext: f64,
    /// Scattering efficiency.
    pub qsca: f64,
    /// Absorption efficiency ($Q_{abs} = Q_{ext} - Q_{sca}$).
    pub qabs: f64,
    /// Backscattering efficiency.
    pub qbk: f64,
    /// Radiation pressure efficiency.
    pub qpr: f64,
    /// Asymmetry factor, $g = (Q_{ext} - Q_{pr}) / Q_{sca}$.
    pub g: f64,
    /// Single scattering albedo, $Q_{sca} / Q_{ext}$.
    pub albedo: f64,
    /// Scattering amplitude $S_1$, one value per requested angle.
    pub s1: Array1<Complex64>,
    /// Scattering amplitude $S_2$, one value per requested angle.
    pub s2: Array1<Complex64>,
}

/// Complex near fields of a single particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearField {
    /// Number of multipolar expansion terms used.
    pub terms: usize,
    /// Electric field, shape (n_points, 3).
    pub e: Array2<Complex64>,
    /// Magnetic field, shape (n_points, 3).
    pub h: Array2<Complex64>,
}

/// Observation points for a near-field evaluation, one coordinate slice per
/// Cartesian axis.
#[derive(Debug, Clone, Copy)]
pub struct FieldPoints<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub z: &'a [f64],
}

impl<'a> FieldPoints<'a> {
    pub fn new(x: &'a [f64], y: &'a [f64], z: &'a [f64]) -> Self {
        Self { x, y, z }
    }

    /// Number of observation points.
    ///
    /// Callers guarantee the three slices have equal length; the x axis is
    /// authoritative.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}
