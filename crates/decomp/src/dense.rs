//! Owned dense solver around the [`decomp()`] and [`solve()`] kernels.
//!
use log::warn;
use nalgebra::{DMatrix, DVector, Dim, Matrix, Storage};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::{decomp, solve, Error, LSolver, Status};

/// Dense direct solver.
///
/// The factorization is kept in a row-major buffer of stride `order`, together with the pivot
/// vector and the condition estimate of the last `setup`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct Dense {
    order: usize,
    lu: Vec<f64>,
    pivots: Vec<isize>,
    cond: f64,
    /// `None` until the first `setup`
    status: Option<Status>,
}

impl Dense {
    /// Creates a new dense linear solver for systems of order `dim`.
    pub fn new_dynamic(dim: usize) -> Self {
        Dense {
            order: dim,
            lu: vec![0.0; dim * dim],
            pivots: (0..dim as isize).collect(),
            cond: 0.0,
            status: None,
        }
    }

    /// Creates a solver and factors `mat_a` with it.
    pub fn factorize<R, C, S>(mat_a: &Matrix<f64, R, C, S>) -> Result<Self, Error>
    where
        R: Dim,
        C: Dim,
        S: Storage<f64, R, C>,
    {
        let mut dense = Dense::new_dynamic(mat_a.nrows());
        dense.setup(mat_a)?;
        Ok(dense)
    }

    /// Creates a solver from a matrix given as a slice of rows, and factors it.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, Error> {
        let n = rows.len();
        if n == 0 {
            return Err(Error::EmptyMatrix);
        }
        if let Some(row) = rows.iter().find(|row| row.len() != n) {
            return Err(Error::NotSquare {
                nrows: n,
                ncols: row.len(),
            });
        }

        let mut dense = Dense::new_dynamic(n);
        for (dst, row) in dense.lu.chunks_exact_mut(n).zip(rows) {
            dst.copy_from_slice(row);
        }
        dense.factor()?;
        Ok(dense)
    }

    /// Order of the system.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Status of the last factorization, `None` if there was none.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// The pivot vector: `pivots()[k]` is the pivot row of step `k`, the last entry holds
    /// `(-1)^(number of interchanges)`.
    pub fn pivots(&self) -> &[isize] {
        &self.pivots
    }

    /// The factorization, `U` on and above the diagonal and the negated multipliers below it.
    pub fn lu(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.order, self.order, &self.lu)
    }

    /// Determinant of the factored matrix.
    pub fn determinant(&self) -> Result<f64, Error> {
        self.check_factored()?;
        let n = self.order;
        let sign = self.pivots[n - 1] as f64;
        Ok((0..n).fold(sign, |det, k| det * self.lu[k * n + k]))
    }

    /// Solves `A x = b` in place, `b` holds `x` on return.
    pub fn solve_slice(&self, b: &mut [f64]) -> Result<(), Error> {
        self.check_factored()?;
        if b.len() != self.order {
            return Err(Error::DimensionMismatch {
                expected: self.order,
                found: b.len(),
            });
        }
        solve(self.order, self.order, &self.lu, &self.pivots, b);
        Ok(())
    }

    /// Solves `A x = b` in place, `b` holds `x` on return.
    pub fn solve_in_place(&self, b: &mut DVector<f64>) -> Result<(), Error> {
        self.solve_slice(b.as_mut_slice())
    }

    /// Solves `A X = B` for every column of `B` with the same factorization.
    pub fn solve_columns(&self, mat_b: &DMatrix<f64>) -> Result<DMatrix<f64>, Error> {
        self.check_factored()?;
        if mat_b.nrows() != self.order {
            return Err(Error::DimensionMismatch {
                expected: self.order,
                found: mat_b.nrows(),
            });
        }
        let mut x = mat_b.clone();
        // DMatrix is column-major, so each chunk is one right-hand side
        for col in x.as_mut_slice().chunks_exact_mut(self.order) {
            solve(self.order, self.order, &self.lu, &self.pivots, col);
        }
        Ok(x)
    }

    /// Runs the decomposition over the (already filled) `lu` buffer.
    fn factor(&mut self) -> Result<(), Error> {
        let n = self.order;
        // steps skipped by an early singular exit keep the identity
        for (k, p) in self.pivots.iter_mut().enumerate() {
            *p = k as isize;
        }
        let status = decomp(n, n, &mut self.lu, &mut self.cond, &mut self.pivots);
        self.status = Some(status);
        if status == Status::Singular {
            warn!(
                "Matrix of order {} is singular to working precision (cond = {:.6e})",
                n, self.cond
            );
        }
        status.into_result(n, n, self.cond)
    }

    fn check_factored(&self) -> Result<(), Error> {
        match self.status {
            Some(Status::Success) => Ok(()),
            Some(Status::Singular) => Err(Error::Singular { cond: self.cond }),
            _ => Err(Error::NotFactorized),
        }
    }
}

impl LSolver for Dense {
    fn setup<R, C, S>(&mut self, mat_a: &Matrix<f64, R, C, S>) -> Result<(), Error>
    where
        R: Dim,
        C: Dim,
        S: Storage<f64, R, C>,
    {
        let (nrows, ncols) = mat_a.shape();
        if nrows == 0 || ncols == 0 {
            return Err(Error::EmptyMatrix);
        }
        if nrows != ncols {
            return Err(Error::NotSquare { nrows, ncols });
        }

        if nrows != self.order {
            *self = Dense::new_dynamic(nrows);
        }
        // copy A into the row-major buffer
        for (i, dst) in self.lu.chunks_exact_mut(nrows).enumerate() {
            for (j, a_ij) in dst.iter_mut().enumerate() {
                *a_ij = mat_a[(i, j)];
            }
        }
        self.factor()
    }

    fn solve(&self, x: &mut DVector<f64>, b: &DVector<f64>) -> Result<(), Error> {
        if x.nrows() != b.nrows() {
            return Err(Error::DimensionMismatch {
                expected: b.nrows(),
                found: x.nrows(),
            });
        }
        // copy b into x
        x.copy_from(b);
        self.solve_in_place(x)
    }

    fn cond(&self) -> f64 {
        self.cond
    }
}
