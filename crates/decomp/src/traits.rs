use nalgebra::{DVector, Dim, Matrix, Storage};

use crate::Error;

pub trait LSolver {
    /// Performs the solver setup needed for a new system matrix A. For a direct solver this is
    /// the factorization; it may be called once and followed by any number of `solve` calls.
    ///
    /// ## Arguments
    /// * `mat_a` the system matrix A. It is not modified.
    fn setup<R, C, S>(&mut self, mat_a: &Matrix<f64, R, C, S>) -> Result<(), Error>
    where
        R: Dim,
        C: Dim,
        S: Storage<f64, R, C>;

    /// solves a linear system Ax = b with the matrix given to the last `setup`.
    ///
    /// ## Arguments
    /// * `x` the solution to the linear system upon return.
    /// * `b` the linear system right-hand side.
    fn solve(&self, x: &mut DVector<f64>, b: &DVector<f64>) -> Result<(), Error>;

    /// should return the condition estimate of the matrix from the last `setup` call.
    fn cond(&self) -> f64;
}
