//! Ragged-to-rectangular row aggregation.
//!
//! Coefficient rows from different particles have different lengths because
//! each particle converges after its own number of multipolar terms.
//! [`PaddedRows`] keeps them in a single rectangular array whose width is the
//! longest row seen so far. When a longer row arrives, every stored row is
//! copied into a wider zero-filled array; shorter rows are right-padded on
//! insertion. The width never shrinks.

use ndarray::{Array2, ArrayView1};

/// Rectangular stack of zero-padded rows, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedRows<T> {
    data: Vec<T>,
    width: usize,
    rows: usize,
}

impl<T: Clone + Default> PaddedRows<T> {
    /// Empty stack whose rows will be at least `width` wide.
    pub fn with_width(width: usize) -> Self {
        Self {
            data: Vec::new(),
            width,
            rows: 0,
        }
    }

    /// Current row width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Widen every stored row to `width` columns. No-op if already as wide.
    pub fn widen(&mut self, width: usize) {
        let old = self.width;
        if width <= old {
            return;
        }
        log::debug!("Widening {} stored rows from {} to {} columns", self.rows, old, width);
        let mut wider = Vec::with_capacity(self.rows * width);
        for i in 0..self.rows {
            wider.extend_from_slice(&self.data[i * old..(i + 1) * old]);
            wider.resize((i + 1) * width, T::default());
        }
        self.data = wider;
        self.width = width;
    }

    /// Append `row`, widening the stack first if `row` is longer than the
    /// current width and zero-padding it if shorter.
    pub fn push_row(&mut self, row: ArrayView1<'_, T>) {
        self.widen(row.len());
        let end = self.data.len() + self.width;
        self.data.extend(row.iter().cloned());
        self.data.resize(end, T::default());
        self.rows += 1;
    }

    /// Row `i` including its padding.
    pub fn row(&self, i: usize) -> Option<&[T]> {
        if i >= self.rows {
            return None;
        }
        Some(&self.data[i * self.width..(i + 1) * self.width])
    }

    pub fn into_array(self) -> Array2<T> {
        let width = self.width;
        Array2::from_shape_fn((self.rows, width), |(i, j)| self.data[i * width + j].clone())
    }
}
