//! # Quadrature
//! Gauss type quadrature points and weights of the Legendre and
//! Laguerre families.
//!
//! All rules return points in ascending order. The roots are found by
//! Newton iteration on the three-term recurrence, starting from the
//! classical asymptotic guesses.
use crate::Real;
use ndarray::Array1;
use std::f64::consts::PI;
use std::fmt;

/// Maximum number of newton steps per root
const MAX_ITER: usize = 100;
/// Convergence tolerance of newton iteration
const TOL: Real = 1e-15;

/// Quadrature rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quad {
    /// Gauss rule, tag "LG"
    Gauss,
    /// Gauss-Lobatto rule (includes end points), tag "GL"
    GaussLobatto,
}

impl Quad {
    /// Short tag of the rule
    pub fn tag(&self) -> &'static str {
        match self {
            Quad::Gauss => "LG",
            Quad::GaussLobatto => "GL",
        }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Returns (P_n(x), P_{n-1}(x)) from the Legendre recurrence
fn legendre_pair(n: usize, x: Real) -> (Real, Real) {
    let mut p1 = 1.;
    let mut p2 = 0.;
    for j in 0..n {
        let p3 = p2;
        p2 = p1;
        p1 = ((2 * j + 1) as Real * x * p2 - j as Real * p3) / (j + 1) as Real;
    }
    (p1, p2)
}

/// Returns (L_n(x), L_{n-1}(x)) from the Laguerre recurrence
fn laguerre_pair(n: usize, x: Real) -> (Real, Real) {
    let mut p1 = 1.;
    let mut p2 = 0.;
    for j in 1..=n {
        let p3 = p2;
        p2 = p1;
        p1 = ((2 * j - 1) as Real - x) * p2 / j as Real - (j - 1) as Real * p3 / j as Real;
    }
    (p1, p2)
}

/// Legendre-Gauss points and weights on [-1, 1].
///
/// Exact for polynomials up to degree 2n-1.
///
/// # Example
/// ```
/// use shenspace::quadrature::legendre_gauss;
/// let (x, w) = legendre_gauss(4);
/// assert!((w.sum() - 2.).abs() < 1e-14);
/// assert!(x[0] < x[3]);
/// ```
pub fn legendre_gauss(n: usize) -> (Array1<Real>, Array1<Real>) {
    assert!(n > 0, "Legendre-Gauss needs at least one point");
    let mut x = Array1::<Real>::zeros(n);
    let mut w = Array1::<Real>::zeros(n);
    let nf = n as Real;
    for i in 0..(n + 1) / 2 {
        let mut z = (PI * (i as Real + 0.75) / (nf + 0.5)).cos();
        for _ in 0..MAX_ITER {
            let (p1, p2) = legendre_pair(n, z);
            let pp = nf * (z * p1 - p2) / (z * z - 1.);
            let dz = p1 / pp;
            z -= dz;
            if dz.abs() < TOL {
                break;
            }
        }
        let (p1, p2) = legendre_pair(n, z);
        let pp = nf * (z * p1 - p2) / (z * z - 1.);
        let weight = 2. / ((1. - z * z) * pp * pp);
        x[i] = -z;
        x[n - 1 - i] = z;
        w[i] = weight;
        w[n - 1 - i] = weight;
    }
    (x, w)
}

/// Legendre-Gauss-Lobatto points and weights on [-1, 1].
///
/// The points are -1, 1 and the roots of P'_{n-1}.
/// Exact for polynomials up to degree 2n-3.
pub fn legendre_lobatto(n: usize) -> (Array1<Real>, Array1<Real>) {
    assert!(n > 1, "Legendre-Gauss-Lobatto needs at least two points");
    let order = n - 1;
    let mut x = Array1::<Real>::zeros(n);
    let mut w = Array1::<Real>::zeros(n);
    for (j, xj) in x.iter_mut().enumerate() {
        // chebyshev-lobatto initial guess
        let mut z = -(PI * j as Real / order as Real).cos();
        if j > 0 && j < order {
            for _ in 0..MAX_ITER {
                let (p_n, p_nm1) = legendre_pair(order, z);
                let dz = (z * p_n - p_nm1) / (n as Real * p_n);
                z -= dz;
                if dz.abs() < TOL {
                    break;
                }
            }
        }
        *xj = z;
    }
    let denom = (order * n) as Real;
    for (wj, xj) in w.iter_mut().zip(x.iter()) {
        let (p_n, _) = legendre_pair(order, *xj);
        *wj = 2. / (denom * p_n * p_n);
    }
    (x, w)
}

/// Laguerre-Gauss points and weights on [0, inf).
///
/// The weights integrate f(x) exp(-x). With `unweighted` the weights
/// are multiplied by exp(x), such that they integrate f(x) itself.
///
/// # Example
/// ```
/// use shenspace::quadrature::laguerre_gauss;
/// let (_, w) = laguerre_gauss(6, false);
/// // int exp(-x) dx = 1
/// assert!((w.sum() - 1.).abs() < 1e-12);
/// ```
pub fn laguerre_gauss(n: usize, unweighted: bool) -> (Array1<Real>, Array1<Real>) {
    assert!(n > 0, "Laguerre-Gauss needs at least one point");
    let mut x = Array1::<Real>::zeros(n);
    let mut w = Array1::<Real>::zeros(n);
    let nf = n as Real;
    let mut z: Real = 0.;
    for i in 0..n {
        z = if i == 0 {
            3. / (1. + 2.4 * nf)
        } else if i == 1 {
            z + 15. / (1. + 2.5 * nf)
        } else {
            let ai = (i - 1) as Real;
            z + ((1. + 2.55 * ai) / (1.9 * ai)) * (z - x[i - 2])
        };
        for _ in 0..MAX_ITER {
            let (p1, p2) = laguerre_pair(n, z);
            let pp = nf * (p1 - p2) / z;
            let dz = p1 / pp;
            z -= dz;
            if dz.abs() < TOL * z.max(1.) {
                break;
            }
        }
        let (p1, p2) = laguerre_pair(n, z);
        let pp = nf * (p1 - p2) / z;
        x[i] = z;
        w[i] = -1. / (pp * nf * p2);
    }
    if unweighted {
        for (wi, xi) in w.iter_mut().zip(x.iter()) {
            *wi *= xi.exp();
        }
    }
    (x, w)
}
