//! Gaussian elimination with partial pivoting and condition estimation.

use log::{debug, trace};

use crate::{solve, Status, EPSILON, SINGULAR_COND};

/// Elimination (or the triangular solve of the estimate) met a pivot below `anorm * EPSILON`.
#[derive(Debug)]
struct NearSingular {
    step: usize,
}

/// Decomposes a real matrix by Gaussian elimination and estimates its condition.
///
/// # Arguments
/// * `n` - order of the matrix.
/// * `ndim` - row dimension (stride) of `a` as allocated by the caller.
/// * `a` - the row-major matrix, element `(i, j)` at `a[i * ndim + j]`. On return it holds an
///     upper triangular matrix `U` and a permuted version of the lower triangular matrix `I - L`
///     so that `(permutation matrix) * A = L * U`.
/// * `cond` - an estimate of the condition of `A`. For `A x = b`, changes in `A` and `b` may
///     cause changes `cond` times as large in `x`. Set to [`SINGULAR_COND`] if exact (or near)
///     singularity is detected.
/// * `pivot` - `pivot[k]` is the index of the k-th pivot row, `pivot[n-1]` is
///     `(-1)^(number of interchanges)`.
///
/// The determinant of `A` is `pivot[n-1] * a[0][0] * a[1][1] * ... * a[n-1][n-1]`.
///
/// Returns [`Status::InvalidInput`] without touching any argument if `n < 1`, `ndim < n`, or a
/// buffer is too short. On [`Status::Singular`] the factorization must not be passed to
/// [`solve`](crate::solve()); its content from the failing step onward is meaningless.
pub fn decomp(n: usize, ndim: usize, a: &mut [f64], cond: &mut f64, pivot: &mut [isize]) -> Status {
    if n < 1 || ndim < n || pivot.len() < n {
        return Status::InvalidInput;
    }
    // last element addressed is a[(n-1) * ndim + n - 1]
    match (n - 1).checked_mul(ndim).and_then(|l| l.checked_add(n)) {
        Some(len) if a.len() >= len => {}
        _ => return Status::InvalidInput,
    }
    trace!("decomp(n={}, ndim={})", n, ndim);

    pivot[n - 1] = 1;
    if n == 1 {
        // one element only
        if a[0] == 0.0 {
            *cond = SINGULAR_COND;
            return Status::Singular;
        }
        *cond = 1.0;
        return Status::Success;
    }

    // workspace for the inverse iteration, dropped on every return below
    let mut work: Vec<f64> = Vec::new();
    if work.try_reserve_exact(n).is_err() {
        return Status::AllocationFailure;
    }
    work.resize(n, 0.0);

    let anorm = norm_1(n, ndim, a);

    let estimate = eliminate(n, ndim, a, pivot, anorm)
        .and_then(|_| estimate_cond(n, ndim, a, pivot, anorm, &mut work));

    match estimate {
        Ok(estimate) => {
            *cond = estimate;
            debug!("decomp: cond = {:.6e}", estimate);
            if estimate + 1.0 == estimate {
                Status::Singular
            } else {
                Status::Success
            }
        }
        Err(NearSingular { step }) => {
            debug!("decomp: matrix is singular to working precision at step {}", step);
            *cond = SINGULAR_COND;
            Status::Singular
        }
    }
}

/// 1-norm of the matrix: the largest column sum of absolute values.
fn norm_1(n: usize, ndim: usize, a: &[f64]) -> f64 {
    (0..n)
        .map(|j| (0..n).map(|i| a[i * ndim + j].abs()).sum::<f64>())
        .fold(0.0, |anorm, t| if t > anorm { t } else { anorm })
}

/// Gaussian elimination with partial pivoting. Multipliers are stored negated below the diagonal.
fn eliminate(
    n: usize,
    ndim: usize,
    a: &mut [f64],
    pivot: &mut [isize],
    anorm: f64,
) -> Result<(), NearSingular> {
    let tol = anorm * EPSILON;

    // k-th elimination step number
    for k in 0..(n - 1) {
        // find m = pivot row number, the largest magnitude in the lower part of column k
        let mut m = k;
        let mut pvt = a[k * ndim + k].abs();
        for i in (k + 1)..n {
            let t = a[i * ndim + k].abs();
            if t > pvt {
                m = i;
                pvt = t;
            }
        }
        pivot[k] = m as isize;
        let pvt = a[m * ndim + k];

        // interchange rows m and k for the lower partition only
        if m != k {
            pivot[n - 1] = -pivot[n - 1];
            for j in k..n {
                a.swap(m * ndim + j, k * ndim + j);
            }
        }

        if pvt.abs() < tol {
            return Err(NearSingular { step: k });
        }

        // eliminate row by row, storing the multipliers in sub-column k
        for i in (k + 1)..n {
            let t = -(a[i * ndim + k] / pvt);
            a[i * ndim + k] = t;
            // multipliers indistinguishable from zero are not propagated
            if t.abs() > tol {
                for j in (k + 1)..n {
                    a[i * ndim + j] += a[k * ndim + j] * t;
                }
            }
        }
    }

    Ok(())
}

/// `cond = (1-norm of A) * (estimate of 1-norm of A^-1)`.
///
/// The estimate comes from one step of inverse iteration for the small singular vector: solve
/// `A^T y = e` and `A z = y` where `e` is a vector of +1 or -1 chosen to cause growth in `y`, then
/// take `|z|_1 / |y|_1`.
fn estimate_cond(
    n: usize,
    ndim: usize,
    a: &[f64],
    pivot: &[isize],
    anorm: f64,
    work: &mut [f64],
) -> Result<f64, NearSingular> {
    let tol = anorm * EPSILON;

    // solve U^T w = e
    for k in 0..n {
        let t: f64 = (0..k).map(|i| a[i * ndim + k] * work[i]).sum();
        let ek = if t < 0.0 { -1.0 } else { 1.0 };
        let akk = a[k * ndim + k];
        if akk.abs() < tol {
            return Err(NearSingular { step: k });
        }
        work[k] = -(ek + t) / akk;
    }

    // apply the multipliers transposed and undo the interchanges in reverse order
    for k in (0..(n - 1)).rev() {
        let t: f64 = ((k + 1)..n).map(|i| a[i * ndim + k] * work[i]).sum();
        work[k] = t;
        let m = pivot[k] as usize;
        if m != k {
            work.swap(m, k);
        }
    }

    let ynorm: f64 = work.iter().map(|w| w.abs()).sum();

    // solve A z = y
    solve(n, ndim, a, pivot, work);

    let znorm: f64 = work.iter().map(|w| w.abs()).sum();

    let cond = anorm * znorm / ynorm;
    Ok(if cond < 1.0 { 1.0 } else { cond })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn identity(n: usize) -> Vec<f64> {
        let mut a = vec![0.0; n * n];
        for i in 0..n {
            a[i * n + i] = 1.0;
        }
        a
    }

    #[test_log::test]
    fn test_identity() {
        for n in 1..=6 {
            let mut a = identity(n);
            let mut cond = 0.0;
            let mut pivot = vec![0; n];
            assert_eq!(decomp(n, n, &mut a, &mut cond, &mut pivot), Status::Success);
            assert_eq!(cond, 1.0);
            for (k, &p) in pivot.iter().enumerate().take(n - 1) {
                assert_eq!(p, k as isize);
            }
            assert_eq!(pivot[n - 1], 1);
        }
    }

    #[test_log::test]
    fn test_singular() {
        let mut a = vec![1.0, 2.0, 2.0, 4.0];
        let mut cond = 0.0;
        let mut pivot = vec![0; 2];
        assert_eq!(decomp(2, 2, &mut a, &mut cond, &mut pivot), Status::Singular);
        assert_eq!(cond, SINGULAR_COND);
        assert_eq!(pivot, vec![1, -1]);
    }

    #[test]
    fn test_zero_column_bails_out_in_elimination() {
        let mut a = vec![
            0.0, 1.0, 2.0, //
            0.0, 3.0, 4.0, //
            0.0, 5.0, 6.0,
        ];
        let mut cond = 0.0;
        let mut pivot = vec![7; 3];
        assert_eq!(decomp(3, 3, &mut a, &mut cond, &mut pivot), Status::Singular);
        assert_eq!(cond, SINGULAR_COND);
        // the first step is recorded, the second is never reached
        assert_eq!(pivot, vec![0, 7, 1]);
    }

    #[test]
    fn test_one_by_one() {
        let mut a = vec![-4.0];
        let mut cond = 0.0;
        let mut pivot = vec![0];
        assert_eq!(decomp(1, 1, &mut a, &mut cond, &mut pivot), Status::Success);
        assert_eq!(cond, 1.0);
        assert_eq!(pivot, vec![1]);
        assert_eq!(a, vec![-4.0]);

        let mut a = vec![0.0];
        assert_eq!(decomp(1, 1, &mut a, &mut cond, &mut pivot), Status::Singular);
        assert_eq!(cond, SINGULAR_COND);
    }

    #[test]
    fn test_invalid_input() {
        let mut cond = -1.0;
        let mut pivot = vec![5, 5];
        let mut a = vec![1.0, 2.0, 3.0, 4.0];

        assert_eq!(decomp(0, 2, &mut a, &mut cond, &mut pivot), Status::InvalidInput);
        assert_eq!(decomp(2, 1, &mut a, &mut cond, &mut pivot), Status::InvalidInput);
        assert_eq!(decomp(2, 2, &mut [], &mut cond, &mut pivot), Status::InvalidInput);
        assert_eq!(decomp(2, 2, &mut a, &mut cond, &mut []), Status::InvalidInput);
        assert_eq!(decomp(2, 3, &mut a, &mut cond, &mut pivot), Status::InvalidInput);
        assert_eq!(
            decomp(2, usize::MAX, &mut a, &mut cond, &mut pivot),
            Status::InvalidInput
        );

        assert_eq!(cond, -1.0);
        assert_eq!(pivot, vec![5, 5]);
        assert_eq!(a, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_factors() {
        let mut a = vec![
            4.0, 3.0, 2.0, //
            2.0, 1.0, 1.0, //
            1.0, 1.0, 1.0,
        ];
        let mut cond = 0.0;
        let mut pivot = vec![0; 3];
        assert_eq!(decomp(3, 3, &mut a, &mut cond, &mut pivot), Status::Success);

        let expect = vec![
            4.0, 3.0, 2.0, //
            -0.5, -0.5, 0.0, //
            -0.25, 0.5, 0.5,
        ];
        assert_eq!(a, expect);
        assert_eq!(pivot, vec![0, 1, 1]);
        assert!(cond > 1.0 && cond.is_finite());

        // det = pivot[n-1] * prod(diag(U))
        let det = pivot[2] as f64 * a[0] * a[4] * a[8];
        assert_relative_eq!(det, -1.0);
    }

    #[test]
    fn test_row_dimension() {
        // a 2x2 matrix embedded in rows of length 3; the padding column must survive
        let mut a = vec![
            1.0, 2.0, 99.0, //
            3.0, 4.0,
        ];
        let mut cond = 0.0;
        let mut pivot = vec![0; 2];
        assert_eq!(decomp(2, 3, &mut a, &mut cond, &mut pivot), Status::Success);
        assert_eq!(a[2], 99.0);
        assert_eq!(pivot, vec![1, -1]);
        assert_relative_eq!(pivot[1] as f64 * a[0] * a[4], -2.0);
    }

    #[test]
    fn test_norm_1() {
        let a = vec![
            1.0, -7.0, //
            -2.0, 3.0,
        ];
        assert_eq!(norm_1(2, 2, &a), 10.0);
    }

    #[test]
    fn test_pruned_multiplier() {
        // the multiplier of row 1 is below anorm * EPSILON, so row 1 is left as-is
        let mut a = vec![
            1.0, 1.0, //
            1.0e-20, 1.0,
        ];
        let mut cond = 0.0;
        let mut pivot = vec![0; 2];
        assert_eq!(decomp(2, 2, &mut a, &mut cond, &mut pivot), Status::Success);
        assert_eq!(a[2], -1.0e-20);
        assert_eq!(a[3], 1.0);
    }
}
