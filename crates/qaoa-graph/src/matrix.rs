use std::ops::Index;

use nalgebra::DMatrix;
use qaoa_core::errors::{ErrorInfo, QaoaError};
use serde::{Deserialize, Serialize};

/// Square coupling matrix `J`.
///
/// Entries are validated to be finite on construction and the matrix cannot be
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct CouplingMatrix {
    entries: DMatrix<f64>,
}

impl CouplingMatrix {
    /// Creates a `dim x dim` matrix filled with zeros.
    pub fn zeros(dim: usize) -> Self {
        Self {
            entries: DMatrix::zeros(dim, dim),
        }
    }

    /// Builds a matrix from `dim * dim` row-major entries.
    pub fn from_row_major(dim: usize, entries: Vec<f64>) -> Result<Self, QaoaError> {
        let expected = dim.checked_mul(dim).ok_or_else(|| {
            QaoaError::Matrix(
                ErrorInfo::new("dimension-overflow", "matrix dimension overflows usize")
                    .with_context("dim", dim.to_string()),
            )
        })?;
        if entries.len() != expected {
            return Err(QaoaError::Matrix(
                ErrorInfo::new("shape-mismatch", "entry count does not match dim * dim")
                    .with_context("dim", dim.to_string())
                    .with_context("entries", entries.len().to_string()),
            ));
        }
        if let Some(position) = entries.iter().position(|value| !value.is_finite()) {
            return Err(QaoaError::Matrix(
                ErrorInfo::new("non-finite-entry", "coupling entries must be finite")
                    .with_context("row", (position / dim).to_string())
                    .with_context("column", (position % dim).to_string()),
            ));
        }
        Ok(Self {
            entries: DMatrix::from_row_slice(dim, dim, &entries),
        })
    }

    /// Wraps a square matrix whose entries are already known to be finite.
    pub(crate) fn from_trusted(entries: DMatrix<f64>) -> Self {
        debug_assert!(entries.is_square());
        Self { entries }
    }

    /// Builds a matrix from a list of rows; every row must have one entry per row.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, QaoaError> {
        let dim = rows.len();
        let mut entries = Vec::with_capacity(dim * dim);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(QaoaError::Matrix(
                    ErrorInfo::new("ragged-matrix", "matrix rows must all have length dim")
                        .with_context("row", index.to_string())
                        .with_context("expected", dim.to_string())
                        .with_context("found", row.len().to_string()),
                ));
            }
            entries.extend(row);
        }
        Self::from_row_major(dim, entries)
    }

    /// Number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.entries.nrows()
    }

    /// Returns `true` for the 0 x 0 matrix.
    pub fn is_empty(&self) -> bool {
        self.dim() == 0
    }

    /// Returns entry `(row, column)` or `None` when out of range.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.entries.get((row, column)).copied()
    }

    /// Borrows the underlying dense matrix.
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.entries
    }

    /// Returns the first `(row, column)` with `row < column` whose mirror differs.
    pub fn first_asymmetry(&self) -> Option<(usize, usize)> {
        let dim = self.dim();
        (0..dim)
            .flat_map(|row| ((row + 1)..dim).map(move |column| (row, column)))
            .find(|&(row, column)| self.entries[(row, column)] != self.entries[(column, row)])
    }

    /// Returns `true` when `M[i][j] == M[j][i]` for every pair.
    pub fn is_symmetric(&self) -> bool {
        self.first_asymmetry().is_none()
    }

    /// Consumes the matrix and returns its rows.
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.entries
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

impl Index<(usize, usize)> for CouplingMatrix {
    type Output = f64;

    fn index(&self, (row, column): (usize, usize)) -> &f64 {
        let dim = self.dim();
        assert!(
            row < dim && column < dim,
            "index ({row}, {column}) out of range for {dim}x{dim} matrix"
        );
        &self.entries[(row, column)]
    }
}

impl TryFrom<Vec<Vec<f64>>> for CouplingMatrix {
    type Error = QaoaError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<CouplingMatrix> for Vec<Vec<f64>> {
    fn from(matrix: CouplingMatrix) -> Self {
        matrix.into_rows()
    }
}
