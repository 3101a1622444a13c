//! Batch dispatch over a single-particle scattering backend.
//!
//! A [`BatchDispatcher`] calls its backend once per particle, strictly in
//! input order, and stacks the per-particle results:
//!
//! - coefficients are ragged (one entry per multipolar term) and go through
//!   [`PaddedRows`];
//! - efficiencies, amplitudes and fields have a width fixed by the caller's
//!   angles or points and are written straight into their row.
//!
//! A single particle is passed through to the backend untouched. The first
//! backend error aborts the batch and nothing aggregated so far is returned.
//!
//! The free functions at the bottom validate raw array input and dispatch
//! through the process-wide precision registry.

use std::sync::Arc;

use ndarray::{Array1, Array2, Array3, Axis};
use num_complex::Complex64;

use nlay_backend::{
    BackendInfo, Coefficients, NearField, ScatteringParameters, ScatteringSolver, SolverError,
};

use crate::aggregate::PaddedRows;
use crate::error::BatchError;
use crate::shape::{validate_angles, validate_coordinates, validate_particles, NestedArray};
use crate::types::{
    CoefficientBatch, Coordinates, DispatchOptions, Dispatched, FieldBatch, Particle,
    ParticleBatch, ParticleInput, ScatteringBatch,
};

/// Dispatches particles to one backend with fixed batch-wide options.
#[derive(Clone)]
pub struct BatchDispatcher {
    backend: Arc<dyn ScatteringSolver>,
    options: DispatchOptions,
}

impl BatchDispatcher {
    /// Dispatcher bound to an explicit backend, independent of the global
    /// precision mode.
    pub fn new(backend: Arc<dyn ScatteringSolver>, options: DispatchOptions) -> Self {
        Self { backend, options }
    }

    /// Dispatcher bound to the backend currently selected in the global
    /// registry. Later mode switches do not affect it.
    pub fn current(options: DispatchOptions) -> Result<Self, BatchError> {
        Ok(Self::new(nlay_backend::active_backend()?, options))
    }

    pub fn backend_info(&self) -> BackendInfo {
        self.backend.info()
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Scattering coefficients for one particle or a batch.
    pub fn coefficients(
        &self,
        input: &ParticleInput,
    ) -> Result<Dispatched<Coefficients, CoefficientBatch>, BatchError> {
        match input {
            ParticleInput::Single(p) => self.single_coefficients(p).map(Dispatched::Particle),
            ParticleInput::Batch(b) => self.coefficient_batch(b).map(Dispatched::Batch),
        }
    }

    /// Efficiencies and amplitudes at `theta` for one particle or a batch.
    pub fn parameters(
        &self,
        input: &ParticleInput,
        theta: &[f64],
    ) -> Result<Dispatched<ScatteringParameters, ScatteringBatch>, BatchError> {
        match input {
            ParticleInput::Single(p) => self
                .backend
                .parameters(
                    &p.size_parameters,
                    &p.refractive_indices,
                    theta,
                    self.options.nmax,
                    self.options.pec_layer,
                )
                .map(Dispatched::Particle)
                .map_err(|e| solver_failure(None, e)),
            ParticleInput::Batch(b) => self.parameter_batch(b, theta).map(Dispatched::Batch),
        }
    }

    /// Near fields at `points` for one particle or a batch.
    pub fn fields(
        &self,
        input: &ParticleInput,
        points: &Coordinates,
    ) -> Result<Dispatched<NearField, FieldBatch>, BatchError> {
        match input {
            ParticleInput::Single(p) => self
                .backend
                .field(
                    &p.size_parameters,
                    &p.refractive_indices,
                    points.points(),
                    self.options.nmax,
                    self.options.pec_layer,
                )
                .map(Dispatched::Particle)
                .map_err(|e| solver_failure(None, e)),
            ParticleInput::Batch(b) => self.field_batch(b, points).map(Dispatched::Batch),
        }
    }

    fn single_coefficients(&self, p: &Particle) -> Result<Coefficients, BatchError> {
        self.backend
            .coefficients(
                &p.size_parameters,
                &p.refractive_indices,
                self.options.nmax,
                self.options.pec_layer,
            )
            .map_err(|e| solver_failure(None, e))
    }

    /// Coefficients for every particle, zero-padded to a common width.
    ///
    /// The width starts at the term cap (if any) and grows to the largest
    /// row the backend returns.
    pub fn coefficient_batch(&self, batch: &ParticleBatch) -> Result<CoefficientBatch, BatchError> {
        let start = self.options.nmax.unwrap_or(0);
        let mut terms = Array1::zeros(batch.len());
        let mut an = PaddedRows::with_width(start);
        let mut bn = PaddedRows::with_width(start);

        self.for_each_particle(
            batch,
            |x, m| self.backend.coefficients(x, m, self.options.nmax, self.options.pec_layer),
            |i, c| {
                if c.an.len() != c.bn.len() {
                    return Err(BatchError::DimensionMismatch(format!(
                        "backend returned {} a_n but {} b_n coefficients for particle {}",
                        c.an.len(),
                        c.bn.len(),
                        i
                    )));
                }
                terms[i] = c.terms;
                an.push_row(c.an.view());
                bn.push_row(c.bn.view());
                Ok(())
            },
        )?;

        Ok(CoefficientBatch {
            terms,
            an: an.into_array(),
            bn: bn.into_array(),
        })
    }

    /// Efficiencies and amplitudes for every particle.
    pub fn parameter_batch(
        &self,
        batch: &ParticleBatch,
        theta: &[f64],
    ) -> Result<ScatteringBatch, BatchError> {
        let n = batch.len();
        let mut out = ScatteringBatch {
            terms: Array1::zeros(n),
            qext: Array1::zeros(n),
            qsca: Array1::zeros(n),
            qabs: Array1::zeros(n),
            qbk: Array1::zeros(n),
            qpr: Array1::zeros(n),
            g: Array1::zeros(n),
            albedo: Array1::zeros(n),
            s1: Array2::zeros((n, theta.len())),
            s2: Array2::zeros((n, theta.len())),
        };

        self.for_each_particle(
            batch,
            |x, m| {
                self.backend
                    .parameters(x, m, theta, self.options.nmax, self.options.pec_layer)
            },
            |i, p| {
                if p.s1.len() != theta.len() || p.s2.len() != theta.len() {
                    return Err(BatchError::DimensionMismatch(format!(
                        "backend returned {}/{} amplitudes for {} angles at particle {}",
                        p.s1.len(),
                        p.s2.len(),
                        theta.len(),
                        i
                    )));
                }
                out.terms[i] = p.terms;
                out.qext[i] = p.qext;
                out.qsca[i] = p.qsca;
                out.qabs[i] = p.qabs;
                out.qbk[i] = p.qbk;
                out.qpr[i] = p.qpr;
                out.g[i] = p.g;
                out.albedo[i] = p.albedo;
                out.s1.row_mut(i).assign(&p.s1);
                out.s2.row_mut(i).assign(&p.s2);
                Ok(())
            },
        )?;

        Ok(out)
    }

    /// Near fields for every particle.
    pub fn field_batch(
        &self,
        batch: &ParticleBatch,
        points: &Coordinates,
    ) -> Result<FieldBatch, BatchError> {
        let n = batch.len();
        let shape = (n, points.len(), 3);
        let mut terms = Array1::zeros(n);
        let mut e = Array3::<Complex64>::zeros(shape);
        let mut h = Array3::<Complex64>::zeros(shape);

        self.for_each_particle(
            batch,
            |x, m| {
                self.backend
                    .field(x, m, points.points(), self.options.nmax, self.options.pec_layer)
            },
            |i, f| {
                let expected = (points.len(), 3);
                if f.e.dim() != expected || f.h.dim() != expected {
                    return Err(BatchError::DimensionMismatch(format!(
                        "backend returned fields shaped {:?}/{:?} for {} points at particle {}",
                        f.e.dim(),
                        f.h.dim(),
                        points.len(),
                        i
                    )));
                }
                terms[i] = f.terms;
                e.index_axis_mut(Axis(0), i).assign(&f.e);
                h.index_axis_mut(Axis(0), i).assign(&f.h);
                Ok(())
            },
        )?;

        Ok(FieldBatch { terms, e, h })
    }

    /// Run `call` for every particle in order and hand each result to
    /// `store` with its row index. Stops at the first error.
    fn for_each_particle<R>(
        &self,
        batch: &ParticleBatch,
        call: impl Fn(&[f64], &[Complex64]) -> Result<R, SolverError>,
        mut store: impl FnMut(usize, R) -> Result<(), BatchError>,
    ) -> Result<(), BatchError> {
        log::debug!(
            "Dispatching {} particles to '{}' (nmax={:?}, pec_layer={:?})",
            batch.len(),
            self.backend.info().name,
            self.options.nmax,
            self.options.pec_layer
        );
        for (i, (x, m)) in batch.iter().enumerate() {
            log::trace!("Particle {}: {} layers", i, x.len());
            let result = call(x, m).map_err(|e| solver_failure(Some(i), e))?;
            store(i, result)?;
        }
        log::debug!("Batch of {} particles complete", batch.len());
        Ok(())
    }
}

fn solver_failure(particle: Option<usize>, source: SolverError) -> BatchError {
    let err = BatchError::SolverFailure { particle, source };
    log::error!("{}", err);
    err
}

/// Scattering coefficients for raw size parameters `x` and refractive
/// indices `m`, using the globally selected backend.
///
/// Rank-1 `x` returns the backend's result for that particle unchanged.
/// Rank-2 `x` returns one zero-padded row per particle.
pub fn scattering_coefficients(
    x: &NestedArray<f64>,
    m: &NestedArray<Complex64>,
    options: &DispatchOptions,
) -> Result<Dispatched<Coefficients, CoefficientBatch>, BatchError> {
    let input = validate_particles(x, m)?;
    BatchDispatcher::current(*options)?.coefficients(&input)
}

/// Efficiencies and scattering amplitudes at angles `theta` (radians), using
/// the globally selected backend.
pub fn scattering_parameters(
    x: &NestedArray<f64>,
    m: &NestedArray<Complex64>,
    theta: &NestedArray<f64>,
    options: &DispatchOptions,
) -> Result<Dispatched<ScatteringParameters, ScatteringBatch>, BatchError> {
    let input = validate_particles(x, m)?;
    let theta = validate_angles(theta)?;
    BatchDispatcher::current(*options)?.parameters(&input, &theta)
}

/// Near fields at the points `(xp[i], yp[i], zp[i])`, using the globally
/// selected backend.
pub fn near_field(
    x: &NestedArray<f64>,
    m: &NestedArray<Complex64>,
    xp: &NestedArray<f64>,
    yp: &NestedArray<f64>,
    zp: &NestedArray<f64>,
    options: &DispatchOptions,
) -> Result<Dispatched<NearField, FieldBatch>, BatchError> {
    let input = validate_particles(x, m)?;
    let points = validate_coordinates(xp, yp, zp)?;
    BatchDispatcher::current(*options)?.fields(&input, &points)
}
