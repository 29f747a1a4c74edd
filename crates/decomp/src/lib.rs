//! Dense linear systems `A x = b` by Gaussian elimination with partial pivoting.
//!
//! The factorization follows the `decomp`/`solve` pair from G.E. Forsythe, M.A. Malcolm & C.B.
//! Moler, *Computer Methods for Mathematical Computations*: the matrix is factored in place, the
//! pivot history (and permutation parity) is recorded, and the condition number of `A` is
//! estimated with one step of inverse iteration.
//!
//! The kernels in [`decomp()`] and [`solve()`] work on row-major `f64` buffers and report through
//! [`Status`]. [`Dense`] owns the buffers and turns a [`Status`] into a `Result<_, Error>`.
//!
//! ```
//! use decomp::{Dense, LSolver};
//! use nalgebra::{dmatrix, dvector, DVector};
//!
//! let mat_a = dmatrix![
//!     4.0, 3.0, 2.0;
//!     2.0, 1.0, 1.0;
//!     1.0, 1.0, 1.0;
//! ];
//! let mut dense = Dense::new_dynamic(3);
//! dense.setup(&mat_a).unwrap();
//!
//! let b = dvector![1.0, 1.0, 1.0];
//! let mut x = DVector::zeros(3);
//! dense.solve(&mut x, &b).unwrap();
//! assert!((&mat_a * &x - &b).amax() < 1e-9);
//! ```

mod decomp;
mod dense;
mod solve;
mod traits;

pub use self::decomp::decomp;
pub use dense::Dense;
pub use solve::solve;
pub use traits::LSolver;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine epsilon used for all singularity thresholds.
pub const EPSILON: f64 = 2.2e-16;

/// Condition estimate reported when exact (or near) singularity is detected.
pub const SINGULAR_COND: f64 = 1.0e32;

/// Outcome of a call to [`decomp()`].
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    /// The workspace could not be allocated. Nothing was modified.
    AllocationFailure,
    /// `n < 1`, `ndim < n`, or a buffer too short for the requested order.
    InvalidInput,
    /// The matrix is singular to working precision.
    Singular,
}

impl Status {
    /// Integer flag as returned by the classic routine.
    pub fn code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::AllocationFailure => 1,
            Status::InvalidInput => 2,
            Status::Singular => 3,
        }
    }

    /// Translates the status of a decomposition of order `order` into a `Result`.
    pub fn into_result(self, order: usize, ndim: usize, cond: f64) -> Result<(), Error> {
        match self {
            Status::Success => Ok(()),
            Status::AllocationFailure => Err(Error::AllocationFailure { order }),
            Status::InvalidInput => Err(Error::IllegalInput { order, ndim }),
            Status::Singular => Err(Error::Singular { cond }),
        }
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum Error {
    #[error("Illegal input to the decomposition (n = {order}, ndim = {ndim})")]
    IllegalInput { order: usize, ndim: usize },

    #[error("Could not allocate a workspace of {order} elements")]
    AllocationFailure { order: usize },

    #[error("The matrix is singular to working precision (cond = {cond:e})")]
    Singular { cond: f64 },

    #[error("The matrix is empty")]
    EmptyMatrix,

    #[error("The matrix is not square ({nrows} x {ncols})")]
    NotSquare { nrows: usize, ncols: usize },

    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("No factorization available, call setup first")]
    NotFactorized,
}

/// Decomposes the square matrix given by `rows` and solves `A x = rhs`.
///
/// Unlike calling the kernels directly, this refuses to run the solve when the decomposition
/// reports a singular matrix.
pub fn solve_system(rows: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>, Error> {
    if rows.len() != rhs.len() {
        return Err(Error::DimensionMismatch {
            expected: rows.len(),
            found: rhs.len(),
        });
    }
    let dense = Dense::from_rows(rows)?;
    let mut x = rhs.to_vec();
    dense.solve_slice(&mut x)?;
    Ok(x)
}
