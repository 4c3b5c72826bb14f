use log::{error, info};
use ndarray::prelude::*;
use shenspace::bases::{BaseEval, BaseOptions, BaseSize, Family, ToOrtho, Transform, Variant};
use shenspace::{Base, Real, Result};

/// Transform u = x^3 + 0.5x + 2 with lifted Dirichlet values and
/// evaluate the expansion at the boundaries.
fn run() -> Result<()> {
    let (n, nlanes) = (12, 3);
    let options = BaseOptions::default()
        .bc(&[0.5, 3.5])
        .padding_factor(1.5);
    let mut base = Base::with_options(Family::Legendre, Variant::Dirichlet, n, &options)?;
    let x = base.coords().clone();
    let u = Array2::from_shape_fn((nlanes, base.len_phys()), |(_, j)| {
        x[j].powi(3) + 0.5 * x[j] + 2.
    });
    let mut uhat = Array2::<Real>::zeros((nlanes, n));
    base.forward(&u, &mut uhat, 1)?;
    info!("Spectral coefficients: {:?}", uhat.row(0));

    let mut back = Array2::<Real>::zeros(u.raw_dim());
    base.backward(&uhat, &mut back, 1)?;
    let err = (&back - &u).iter().fold(0., |acc: Real, v| acc.max(v.abs()));
    info!("Max roundtrip error: {:e}", err);

    let mut ortho = Array2::<Real>::zeros(uhat.raw_dim());
    base.to_ortho(&uhat, &mut ortho, 1)?;
    info!("Legendre coefficients: {:?}", ortho.row(0));

    let edges = base.eval(&array![-1., 1.], &uhat.row(0).to_owned())?;
    info!("Boundary values: {:?}", edges);
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
