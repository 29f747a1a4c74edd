//! Solves a small system with the dense solver and prints the factorization.
//!
//!      4 x1 + 3 x2 + 2 x3 = 1
//!      2 x1 +   x2 +   x3 = 1
//!        x1 +   x2 +   x3 = 1
//!
//! Run with `RUST_LOG=trace` to see the kernel traces.

use decomp::{Dense, LSolver};
use nalgebra::{dmatrix, dvector, DVector};

fn main() -> Result<(), decomp::Error> {
    env_logger::init();

    let mat_a = dmatrix![
        4.0, 3.0, 2.0;
        2.0, 1.0, 1.0;
        1.0, 1.0, 1.0;
    ];
    let b = dvector![1.0, 1.0, 1.0];

    let mut dense = Dense::new_dynamic(3);
    dense.setup(&mat_a)?;

    let mut x = DVector::zeros(3);
    dense.solve(&mut x, &b)?;

    println!("LU = {:.6}", dense.lu());
    println!("pivot = {:?}", dense.pivots());
    println!("cond = {:.6e}", dense.cond());
    println!("det = {:.6}", dense.determinant()?);
    println!("x = {:.6}", x);
    println!("residual = {:.3e}", (&mat_a * &x - &b).amax());

    Ok(())
}
