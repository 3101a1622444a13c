//! Shape validation for raw, array-like inputs.
//!
//! Callers coming from array code hand in containers of unknown rank. A
//! [`NestedArray`] captures such a container without forcing it to be
//! rectangular, since layer counts may differ between particles. The
//! `validate_*` functions check ranks and cross-container agreement and turn
//! the raw containers into typed requests. They run before any solver call
//! and have no side effects.
//!
//! | Input | Accepted ranks |
//! |-------|----------------|
//! | size parameters | 1 (single particle), 2 (batch) |
//! | refractive indices | 1 (shared), 2 (per particle) |
//! | angles, coordinates | 1 |

use ndarray::{Array1, Array2, ArrayD, ArrayViewD, Axis};
use num_complex::Complex64;

use crate::error::BatchError;
use crate::types::{Coordinates, Particle, ParticleBatch, ParticleInput, RefractiveIndices};

/// An arbitrarily nested container. Rows of one level may differ in length.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedArray<T> {
    Item(T),
    List(Vec<NestedArray<T>>),
    /// Empty container of known rank, e.g. an array with a zero-length
    /// outer axis. Its rank cannot be read off any element.
    Empty(usize),
}

impl<T> NestedArray<T> {
    /// One-dimensional container.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Self::Item).collect())
    }

    /// Two-dimensional container; rows may be ragged.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        Self::List(rows.into_iter().map(Self::from_vec).collect())
    }

    /// Nesting depth, or `None` if branches disagree in depth.
    ///
    /// A scalar has rank 0 and an empty list rank 1. Converted arrays keep
    /// their dimensionality even when an axis has length 0.
    pub fn rank(&self) -> Option<usize> {
        match self {
            Self::Item(_) => Some(0),
            Self::Empty(rank) => Some(*rank),
            Self::List(items) => {
                let mut inner = None;
                for item in items {
                    let r = item.rank()?;
                    match inner {
                        None => inner = Some(r),
                        Some(prev) if prev != r => return None,
                        Some(_) => {}
                    }
                }
                Some(inner.map_or(1, |r| r + 1))
            }
        }
    }

    /// Number of entries along the outermost axis.
    pub fn len(&self) -> usize {
        match self {
            Self::Item(_) => 1,
            Self::List(items) => items.len(),
            Self::Empty(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Item(_) => false,
            Self::List(items) => items.is_empty(),
            Self::Empty(_) => true,
        }
    }
}

impl<T: Clone> NestedArray<T> {
    fn from_view(view: ArrayViewD<'_, T>) -> Self {
        let ndim = view.ndim();
        if ndim > 0 {
            if view.len_of(Axis(0)) == 0 {
                return Self::Empty(ndim);
            }
            return Self::List(view.outer_iter().map(Self::from_view).collect());
        }
        // zero-dimensional: exactly one element
        match view.iter().next() {
            Some(v) => Self::Item(v.clone()),
            None => Self::Empty(0),
        }
    }

    // Callers check the rank first; anything deeper is skipped.
    fn leaves(&self) -> Vec<T> {
        match self {
            Self::Item(v) => vec![v.clone()],
            Self::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    Self::Item(v) => Some(v.clone()),
                    Self::List(_) | Self::Empty(_) => None,
                })
                .collect(),
            Self::Empty(_) => Vec::new(),
        }
    }

    fn rows(&self) -> Vec<Vec<T>> {
        match self {
            Self::Item(_) | Self::Empty(_) => Vec::new(),
            Self::List(items) => items.iter().map(Self::leaves).collect(),
        }
    }
}

impl<T> From<Vec<T>> for NestedArray<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Clone> From<ArrayD<T>> for NestedArray<T> {
    fn from(array: ArrayD<T>) -> Self {
        Self::from_view(array.view())
    }
}

impl<T: Clone> From<Array1<T>> for NestedArray<T> {
    fn from(array: Array1<T>) -> Self {
        Self::from(array.into_dyn())
    }
}

impl<T: Clone> From<Array2<T>> for NestedArray<T> {
    fn from(array: Array2<T>) -> Self {
        Self::from(array.into_dyn())
    }
}

fn rank_of<T>(what: &'static str, array: &NestedArray<T>) -> Result<usize, BatchError> {
    array.rank().ok_or_else(|| BatchError::InvalidShape {
        what,
        detail: "nesting depth is not uniform".into(),
    })
}

fn expect_rank_1<T: Clone>(what: &'static str, array: &NestedArray<T>) -> Result<Vec<T>, BatchError> {
    match rank_of(what, array)? {
        1 => Ok(array.leaves()),
        r => Err(BatchError::InvalidShape {
            what,
            detail: format!("expected a 1-D array, got rank {}", r),
        }),
    }
}

/// Validate size parameters `x` and refractive indices `m`.
///
/// Rank-1 `x` is a single particle and requires rank-1 `m`. Rank-2 `x` is a
/// batch; rank-2 `m` then gives one index row per particle and rank-1 `m` is
/// shared by all of them.
pub fn validate_particles(
    x: &NestedArray<f64>,
    m: &NestedArray<Complex64>,
) -> Result<ParticleInput, BatchError> {
    let m_rank = rank_of("relative refractive index (m)", m)?;
    if m_rank != 1 && m_rank != 2 {
        return Err(BatchError::InvalidShape {
            what: "relative refractive index (m)",
            detail: format!("expected a 1-D or 2-D array, got rank {}", m_rank),
        });
    }

    match rank_of("size parameter (x)", x)? {
        1 if m_rank == 1 => Ok(ParticleInput::Single(Particle::new(x.leaves(), m.leaves()))),
        1 => Err(BatchError::DimensionMismatch(
            "a 1-D size parameter (x) requires a 1-D relative refractive index (m)".into(),
        )),
        2 => {
            let indices = if m_rank == 1 {
                RefractiveIndices::Shared(m.leaves())
            } else {
                RefractiveIndices::PerParticle(m.rows())
            };
            ParticleBatch::new(x.rows(), indices).map(ParticleInput::Batch)
        }
        r => Err(BatchError::InvalidShape {
            what: "size parameter (x)",
            detail: format!("expected a 1-D or 2-D array, got rank {}", r),
        }),
    }
}

/// Validate scattering angles (radians).
pub fn validate_angles(theta: &NestedArray<f64>) -> Result<Vec<f64>, BatchError> {
    expect_rank_1("scattering angles (theta)", theta)
}

/// Validate the coordinates of near-field observation points.
pub fn validate_coordinates(
    xp: &NestedArray<f64>,
    yp: &NestedArray<f64>,
    zp: &NestedArray<f64>,
) -> Result<Coordinates, BatchError> {
    let xs = expect_rank_1("x coordinates (xp)", xp)?;
    let ys = expect_rank_1("y coordinates (yp)", yp)?;
    let zs = expect_rank_1("z coordinates (zp)", zp)?;
    Coordinates::new(xs, ys, zs)
}
