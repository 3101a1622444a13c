//! Stub scattering backend shared by the integration tests.
//!
//! Results are deterministic functions of the inputs so that a particle
//! dispatched alone and inside a batch produce identical values. Term counts
//! come from a per-call script if one is given, else from the cap, else from
//! the layer count. A scripted count may exceed or fall short of the cap.

#![allow(dead_code)]

use std::sync::Mutex;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use nlay_backend::{
    BackendInfo, Coefficients, FieldPoints, NearField, PrecisionMode, ScatteringParameters,
    ScatteringSolver, SolverError,
};

/// Arguments of one backend invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub x: Vec<f64>,
    pub m: Vec<Complex64>,
    pub nmax: Option<usize>,
    pub pec_layer: Option<usize>,
}

pub struct StubSolver {
    name: &'static str,
    precision: PrecisionMode,
    terms: Vec<usize>,
    fail_at: Option<usize>,
    malformed_at: Option<usize>,
    calls: Mutex<Vec<Call>>,
}

impl StubSolver {
    pub fn new(name: &'static str, precision: PrecisionMode) -> Self {
        Self {
            name,
            precision,
            terms: Vec::new(),
            fail_at: None,
            malformed_at: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script the term count returned by the n-th call.
    pub fn with_terms(mut self, terms: &[usize]) -> Self {
        self.terms = terms.to_vec();
        self
    }

    /// Make the n-th call (0-based) fail.
    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    /// Make the n-th call (0-based) return a result of the wrong shape:
    /// `bn` one term short, one amplitude too many, or one field point too
    /// many.
    pub fn malformed_at(mut self, call: usize) -> Self {
        self.malformed_at = Some(call);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(
        &self,
        x: &[f64],
        m: &[Complex64],
        nmax: Option<usize>,
        pec_layer: Option<usize>,
    ) -> Result<(usize, bool), SolverError> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(Call {
            x: x.to_vec(),
            m: m.to_vec(),
            nmax,
            pec_layer,
        });
        if self.fail_at == Some(index) {
            return Err(SolverError::NonConvergence { terms: 99 });
        }
        let terms = self
            .terms
            .get(index)
            .copied()
            .or(nmax)
            .unwrap_or(x.len() + 2);
        Ok((terms, self.malformed_at == Some(index)))
    }
}

fn signature(x: &[f64], m: &[Complex64]) -> f64 {
    x.iter().sum::<f64>() + m.iter().map(|v| v.re).sum::<f64>()
}

impl ScatteringSolver for StubSolver {
    fn info(&self) -> BackendInfo {
        BackendInfo {
            name: self.name.into(),
            precision: self.precision,
        }
    }

    fn coefficients(
        &self,
        x: &[f64],
        m: &[Complex64],
        nmax: Option<usize>,
        pec_layer: Option<usize>,
    ) -> Result<Coefficients, SolverError> {
        let (terms, malformed) = self.record(x, m, nmax, pec_layer)?;
        let s = signature(x, m);
        let bn_terms = if malformed { terms.saturating_sub(1) } else { terms };
        Ok(Coefficients {
            terms,
            an: Array1::from_shape_fn(terms, |k| Complex64::new(s + 1.0 + k as f64, 1.0)),
            bn: Array1::from_shape_fn(bn_terms, |k| Complex64::new(-(s + 1.0), k as f64 + 1.0)),
        })
    }

    fn parameters(
        &self,
        x: &[f64],
        m: &[Complex64],
        theta: &[f64],
        nmax: Option<usize>,
        pec_layer: Option<usize>,
    ) -> Result<ScatteringParameters, SolverError> {
        let (terms, malformed) = self.record(x, m, nmax, pec_layer)?;
        let s = signature(x, m);
        let mut s1: Array1<Complex64> = theta.iter().map(|t| Complex64::new(s, *t)).collect();
        if malformed {
            s1 = s1.iter().copied().chain([Complex64::new(s, 0.0)]).collect();
        }
        let qext = 2.0 * s;
        let qsca = s;
        let qpr = 1.5 * s;
        Ok(ScatteringParameters {
            terms,
            qext,
            qsca,
            qabs: qext - qsca,
            qbk: 0.25 * s,
            qpr,
            g: (qext - qpr) / qsca,
            albedo: qsca / qext,
            s1,
            s2: theta.iter().map(|t| Complex64::new(*t, -s)).collect(),
        })
    }

    fn field(
        &self,
        x: &[f64],
        m: &[Complex64],
        points: FieldPoints<'_>,
        nmax: Option<usize>,
        pec_layer: Option<usize>,
    ) -> Result<NearField, SolverError> {
        let (terms, malformed) = self.record(x, m, nmax, pec_layer)?;
        let s = signature(x, m);
        let rows = points.len() + usize::from(malformed);
        let e = Array2::from_shape_fn((rows, 3), |(p, c)| {
            let r = if p < points.len() {
                [points.x[p], points.y[p], points.z[p]][c]
            } else {
                0.0
            };
            Complex64::new(s, r)
        });
        let h = e.mapv(|v| v * Complex64::i());
        Ok(NearField { terms, e, h })
    }
}

pub fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
