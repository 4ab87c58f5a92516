//! Sparse storage for the assembled contact system.
//!
//! Condition systems are scattered by equation id into a triplet (COO)
//! builder and converted to CSR once all conditions are added.

use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::coo::CooMatrix;
use nalgebra_sparse::csr::CsrMatrix as NalgebraCsr;

/// Compressed Sparse Row matrix.
pub type CsrMatrix = NalgebraCsr<f64>;

/// Builder for assembling a sparse matrix from triplets (COO format).
///
/// Accumulates (row, col, value) triplets and converts to CSR when complete.
#[derive(Debug, Clone)]
pub struct TripletMatrix {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
    values: Vec<f64>,
}

impl TripletMatrix {
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self::with_capacity(n_rows, n_cols, 0)
    }

    /// Create with estimated capacity.
    pub fn with_capacity(n_rows: usize, n_cols: usize, nnz_estimate: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            rows: Vec::with_capacity(nnz_estimate),
            cols: Vec::with_capacity(nnz_estimate),
            values: Vec::with_capacity(nnz_estimate),
        }
    }

    /// Add a value at (row, col). Duplicates are summed during conversion.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.rows.push(row);
            self.cols.push(col);
            self.values.push(value);
        }
    }

    /// Scatter a dense condition matrix at the given equation ids.
    ///
    /// Exact zeros are skipped, so inactive contact blocks add no entries.
    pub fn add_submatrix(&mut self, equation_ids: &[usize], submatrix: &DMatrix<f64>) -> Result<()> {
        let n = equation_ids.len();
        if submatrix.shape() != (n, n) {
            return Err(Error::Assembly(format!(
                "Condition matrix is {}x{} but has {} equation ids",
                submatrix.nrows(),
                submatrix.ncols(),
                n
            )));
        }
        if let Some(&id) = equation_ids.iter().find(|&&id| id >= self.n_rows || id >= self.n_cols) {
            return Err(Error::Assembly(format!(
                "Equation id {} out of range for a {}x{} system",
                id, self.n_rows, self.n_cols
            )));
        }

        for (j, &col) in equation_ids.iter().enumerate() {
            for (i, &row) in equation_ids.iter().enumerate() {
                self.add(row, col, submatrix[(i, j)]);
            }
        }
        Ok(())
    }

    /// Number of stored triplets.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Convert to CSR format, summing duplicate entries.
    pub fn to_csr(self) -> Result<CsrMatrix> {
        let coo = CooMatrix::try_from_triplets(
            self.n_rows,
            self.n_cols,
            self.rows,
            self.cols,
            self.values,
        )
        .map_err(|e| Error::Assembly(format!("Invalid triplet data: {}", e)))?;

        Ok(CsrMatrix::from(&coo))
    }
}

/// Dense accumulator for the global right-hand side.
#[derive(Debug, Clone)]
pub struct SparseVector {
    values: Vec<f64>,
}

impl SparseVector {
    /// Create a zero vector of given size.
    pub fn zeros(size: usize) -> Self {
        Self {
            values: vec![0.0; size],
        }
    }

    /// Scatter a condition vector at the given equation ids.
    pub fn add_subvector(&mut self, equation_ids: &[usize], values: &DVector<f64>) -> Result<()> {
        if equation_ids.len() != values.len() {
            return Err(Error::Assembly(format!(
                "Condition vector has {} entries but {} equation ids",
                values.len(),
                equation_ids.len()
            )));
        }
        for (&idx, &val) in equation_ids.iter().zip(values.iter()) {
            let slot = self.values.get_mut(idx).ok_or_else(|| {
                Error::Assembly(format!("Equation id {} out of range", idx))
            })?;
            *slot += val;
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Consume and return the dense vector.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duplicate_summation() {
        let mut triplet = TripletMatrix::new(2, 2);
        triplet.add(0, 0, 1.0);
        triplet.add(0, 0, 2.0);
        triplet.add(1, 0, 0.0);
        assert_eq!(triplet.nnz(), 2);

        let dense = DMatrix::from(&triplet.to_csr().unwrap());
        assert_relative_eq!(dense[(0, 0)], 3.0);
        assert_relative_eq!(dense[(1, 0)], 0.0);
    }

    #[test]
    fn test_submatrix_scatter() {
        let mut triplet = TripletMatrix::new(6, 6);
        let ids = [5, 1, 3];
        let ke = DMatrix::from_row_slice(3, 3, &[
            1.0, 0.0, -0.5,
            0.0, 2.0,  0.0,
            0.25, 0.0, 3.0,
        ]);
        triplet.add_submatrix(&ids, &ke).unwrap();
        assert_eq!(triplet.nnz(), 5);

        let dense = DMatrix::from(&triplet.to_csr().unwrap());
        assert_relative_eq!(dense[(5, 5)], 1.0);
        assert_relative_eq!(dense[(5, 3)], -0.5);
        assert_relative_eq!(dense[(3, 5)], 0.25);
        assert_relative_eq!(dense[(1, 1)], 2.0);
    }

    #[test]
    fn test_submatrix_rejects_bad_ids() {
        let mut triplet = TripletMatrix::new(2, 2);
        let ke = DMatrix::identity(2, 2);
        assert!(matches!(triplet.add_submatrix(&[0, 2], &ke), Err(Error::Assembly(_))));
        assert!(matches!(triplet.add_submatrix(&[0], &ke), Err(Error::Assembly(_))));
    }

    #[test]
    fn test_subvector_scatter() {
        let mut rhs = SparseVector::zeros(4);
        rhs.add_subvector(&[3, 0], &DVector::from_vec(vec![1.0, 2.0])).unwrap();
        rhs.add_subvector(&[3], &DVector::from_vec(vec![0.5])).unwrap();
        assert_eq!(rhs.as_slice(), &[2.0, 0.0, 0.0, 1.5]);
        assert!(rhs.add_subvector(&[4], &DVector::from_vec(vec![1.0])).is_err());
    }
}
