/// Solves the linear system `A x = b` using the factorization computed by [`decomp`](crate::decomp()).
///
/// `a` and `pivot` are the outputs of a `decomp` call with the same `n` and `ndim`. The solution
/// `x` is returned in `b`. One factorization may be reused for any number of right-hand sides.
///
/// Do not use if `decomp` has detected singularity: this routine cannot fail, but the result is
/// meaningless (and may be non-finite) for a singular factorization.
pub fn solve(n: usize, ndim: usize, a: &[f64], pivot: &[isize], b: &mut [f64]) {
    if n == 0 {
        return;
    }
    if n == 1 {
        b[0] /= a[0];
        return;
    }

    // Forward elimination: undo the interchanges and apply the multipliers.
    for k in 0..(n - 1) {
        let m = pivot[k] as usize;
        b.swap(m, k);
        let t = b[k];
        for i in (k + 1)..n {
            b[i] += a[i * ndim + k] * t;
        }
    }

    // Back substitution.
    for k in (0..n).rev() {
        let t = ((k + 1)..n).fold(b[k], |t, j| t - a[k * ndim + j] * b[j]);
        b[k] = t / a[k * ndim + k];
    }
}
