//! Core types for batch dispatch.
//!
//! Inputs are modelled so that a validated request cannot describe an
//! impossible combination: a [`ParticleInput`] is either one particle or a
//! [`ParticleBatch`] whose refractive indices are shared or given per
//! particle. Results mirror that split through [`Dispatched`].

use ndarray::{Array1, Array2, Array3};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use nlay_backend::FieldPoints;

use crate::error::BatchError;

/// A single multilayered sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Size parameter of each layer.
    pub size_parameters: Vec<f64>,
    /// Relative refractive index of each layer.
    pub refractive_indices: Vec<Complex64>,
}

impl Particle {
    pub fn new(size_parameters: Vec<f64>, refractive_indices: Vec<Complex64>) -> Self {
        Self {
            size_parameters,
            refractive_indices,
        }
    }
}

/// Refractive indices of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RefractiveIndices {
    /// One sequence broadcast to every particle.
    Shared(Vec<Complex64>),
    /// One sequence per particle, row `i` belonging to particle `i`.
    PerParticle(Vec<Vec<Complex64>>),
}

/// An ordered batch of particles.
///
/// Construction checks that per-particle indices line up with the size
/// parameters, so a `ParticleBatch` value is always dispatchable.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleBatch {
    size_parameters: Vec<Vec<f64>>,
    indices: RefractiveIndices,
}

impl ParticleBatch {
    /// Build a batch, rejecting per-particle indices whose particle or layer
    /// counts disagree with `size_parameters`.
    ///
    /// Shared indices are not compared against each particle's layer count;
    /// they are handed to the solver as given.
    pub fn new(
        size_parameters: Vec<Vec<f64>>,
        indices: RefractiveIndices,
    ) -> Result<Self, BatchError> {
        if let RefractiveIndices::PerParticle(rows) = &indices {
            if rows.len() != size_parameters.len() {
                return Err(BatchError::DimensionMismatch(format!(
                    "{} particles in the size parameters but {} in the refractive indices",
                    size_parameters.len(),
                    rows.len()
                )));
            }
            for (i, (x, m)) in size_parameters.iter().zip(rows).enumerate() {
                if x.len() != m.len() {
                    return Err(BatchError::DimensionMismatch(format!(
                        "particle {} has {} size parameters but {} refractive indices",
                        i,
                        x.len(),
                        m.len()
                    )));
                }
            }
        }
        Ok(Self {
            size_parameters,
            indices,
        })
    }

    /// Batch where every particle shares the same refractive indices.
    pub fn shared(size_parameters: Vec<Vec<f64>>, indices: Vec<Complex64>) -> Self {
        Self {
            size_parameters,
            indices: RefractiveIndices::Shared(indices),
        }
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.size_parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size_parameters.is_empty()
    }

    pub fn indices(&self) -> &RefractiveIndices {
        &self.indices
    }

    /// Size parameters and refractive indices of particle `i`.
    ///
    /// # Panics
    /// Panics if `i >= self.len()`.
    pub fn particle(&self, i: usize) -> (&[f64], &[Complex64]) {
        let m = match &self.indices {
            RefractiveIndices::Shared(m) => m.as_slice(),
            RefractiveIndices::PerParticle(rows) => rows[i].as_slice(),
        };
        (self.size_parameters[i].as_slice(), m)
    }

    /// Iterate over `(size_parameters, refractive_indices)` in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], &[Complex64])> + '_ {
        (0..self.len()).map(move |i| self.particle(i))
    }
}

/// A validated dispatch request.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticleInput {
    /// One particle, handed straight to the solver.
    Single(Particle),
    /// Several particles, aggregated into stacked results.
    Batch(ParticleBatch),
}

/// Observation points for near-field queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl Coordinates {
    /// Build from per-axis coordinates, which must have equal lengths.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self, BatchError> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(BatchError::DimensionMismatch(format!(
                "coordinate lengths differ: x={}, y={}, z={}",
                x.len(),
                y.len(),
                z.len()
            )));
        }
        Ok(Self { x, y, z })
    }

    /// Build from a list of points.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        Self {
            x: points.iter().map(|p| p[0]).collect(),
            y: points.iter().map(|p| p[1]).collect(),
            z: points.iter().map(|p| p[2]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> FieldPoints<'_> {
        FieldPoints::new(&self.x, &self.y, &self.z)
    }
}

/// Batch-wide solver settings, forwarded unchanged to every particle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOptions {
    /// Cap on the number of multipolar terms. `None` lets the solver decide.
    #[serde(default)]
    pub nmax: Option<usize>,
    /// Index of a perfectly conducting layer, if any.
    #[serde(default)]
    pub pec_layer: Option<usize>,
}

impl DispatchOptions {
    /// Build from the sentinel form where any negative value means "unset".
    pub fn from_raw(nmax: i64, pec_layer: i64) -> Self {
        Self {
            nmax: usize::try_from(nmax).ok(),
            pec_layer: usize::try_from(pec_layer).ok(),
        }
    }

    pub fn with_nmax(mut self, nmax: usize) -> Self {
        self.nmax = Some(nmax);
        self
    }

    pub fn with_pec_layer(mut self, layer: usize) -> Self {
        self.pec_layer = Some(layer);
        self
    }
}

/// Scattering coefficients of a batch, one row per particle.
///
/// Rows are right-padded with zeros to the widest term count in the batch
/// (or the term cap, if larger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientBatch {
    /// Terms used by each particle.
    pub terms: Array1<usize>,
    /// Shape (n_particles, width).
    pub an: Array2<Complex64>,
    /// Shape (n_particles, width).
    pub bn: Array2<Complex64>,
}

/// Far-field parameters of a batch, one entry per particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatteringBatch {
    pub terms: Array1<usize>,
    pub qext: Array1<f64>,
    pub qsca: Array1<f64>,
    pub qabs: Array1<f64>,
    pub qbk: Array1<f64>,
    pub qpr: Array1<f64>,
    pub g: Array1<f64>,
    pub albedo: Array1<f64>,
    /// Shape (n_particles, n_angles).
    pub s1: Array2<Complex64>,
    /// Shape (n_particles, n_angles).
    pub s2: Array2<Complex64>,
}

/// Near fields of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBatch {
    pub terms: Array1<usize>,
    /// Shape (n_particles, n_points, 3).
    pub e: Array3<Complex64>,
    /// Shape (n_particles, n_points, 3).
    pub h: Array3<Complex64>,
}

/// Outcome of a dispatch: the solver's own result for a single particle, or
/// the aggregated stack for a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched<S, B> {
    Particle(S),
    Batch(B),
}

impl<S, B> Dispatched<S, B> {
    pub fn particle(self) -> Option<S> {
        match self {
            Self::Particle(s) => Some(s),
            Self::Batch(_) => None,
        }
    }

    pub fn batch(self) -> Option<B> {
        match self {
            Self::Particle(_) => None,
            Self::Batch(b) => Some(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_per_particle_batch_checks_particle_count() {
        let err = ParticleBatch::new(
            vec![vec![1.0], vec![2.0]],
            RefractiveIndices::PerParticle(vec![vec![c(1.5, 0.0)]]),
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::DimensionMismatch(_)));
    }

    #[test]
    fn test_per_particle_batch_checks_layer_count() {
        let err = ParticleBatch::new(
            vec![vec![1.0, 2.0], vec![1.5]],
            RefractiveIndices::PerParticle(vec![
                vec![c(1.5, 0.1), c(2.0, 0.0)],
                vec![c(1.5, 0.1), c(2.0, 0.0)],
            ]),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("particle 1"), "{}", msg);
    }

    #[test]
    fn test_shared_indices_broadcast_to_every_particle() {
        let m = vec![c(1.5, 0.1), c(2.0, 0.0)];
        let batch = ParticleBatch::new(
            vec![vec![1.0, 2.0], vec![1.5]],
            RefractiveIndices::Shared(m.clone()),
        )
        .unwrap();
        assert_eq!(batch.len(), 2);
        for (_, mi) in batch.iter() {
            assert_eq!(mi, m.as_slice());
        }
        assert_eq!(batch.particle(1).0, &[1.5]);
    }

    #[test]
    fn test_coordinates_require_equal_lengths() {
        assert!(Coordinates::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0]).is_err());
        let pts = Coordinates::from_points(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(pts.len(), 2);
        assert_eq!(pts.points().y, &[2.0, 5.0]);
    }

    #[test]
    fn test_options_from_sentinels() {
        assert_eq!(DispatchOptions::from_raw(-1, -1), DispatchOptions::default());
        let opts = DispatchOptions::from_raw(10, 0);
        assert_eq!(opts.nmax, Some(10));
        assert_eq!(opts.pec_layer, Some(0));
        assert_eq!(DispatchOptions::default().with_nmax(10).with_pec_layer(0), opts);
    }
}
