//! # Family
//! Primary (orthogonal) polynomial families and their evaluation.
//!
//! Legendre polynomials live on [-1, 1]. For the Laguerre family the
//! basis functions are Laguerre *functions*
//!
//! L_k = P_k * exp(-x/2)
//!
//! on [0, inf), where P_k is the Laguerre polynomial of order k.
//! The damping is part of the basis, so derivatives follow from the
//! product rule.
use crate::error::{BasisError, Result};
use crate::quadrature::{laguerre_gauss, legendre_gauss, legendre_lobatto, Quad};
use crate::Real;
use ndarray::prelude::*;
use std::fmt;

/// Orthogonal polynomial family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Legendre polynomials on [-1, 1]
    Legendre,
    /// Laguerre functions on [0, inf)
    Laguerre,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Family {
    /// Name of family
    pub fn name(&self) -> &'static str {
        match self {
            Family::Legendre => "legendre",
            Family::Laguerre => "laguerre",
        }
    }

    /// Parse quadrature tag. Legendre supports "LG" and "GL",
    /// Laguerre only "LG".
    ///
    /// # Example
    /// ```
    /// use shenspace::bases::Family;
    /// use shenspace::quadrature::Quad;
    /// assert_eq!(Family::Legendre.parse_quad("GL").unwrap(), Quad::GaussLobatto);
    /// assert!(Family::Laguerre.parse_quad("GL").is_err());
    /// ```
    pub fn parse_quad(&self, tag: &str) -> Result<Quad> {
        match (self, tag) {
            (_, "LG") => Ok(Quad::Gauss),
            (Family::Legendre, "GL") => Ok(Quad::GaussLobatto),
            _ => Err(BasisError::UnsupportedQuadratureRule {
                rule: tag.to_string(),
                family: self.name().to_string(),
            }),
        }
    }

    /// Reference domain of family
    pub fn reference_domain(&self) -> (Real, Real) {
        match self {
            Family::Legendre => (-1., 1.),
            Family::Laguerre => (0., Real::INFINITY),
        }
    }

    /// Highest derivative order supported by [`Family::function_vandermonde`]
    pub fn max_derivative(&self) -> Option<usize> {
        match self {
            Family::Legendre => None,
            Family::Laguerre => Some(2),
        }
    }

    /// Quadrature points and weights.
    ///
    /// For Laguerre, `unweighted` converts the weights from the exp(-x)
    /// kernel to the plain kernel by multiplying with exp(x). It has no
    /// effect for Legendre.
    pub fn points_and_weights(
        &self,
        n: usize,
        quad: Quad,
        unweighted: bool,
    ) -> Result<(Array1<Real>, Array1<Real>)> {
        match (self, quad) {
            (Family::Legendre, Quad::Gauss) => Ok(legendre_gauss(n)),
            (Family::Legendre, Quad::GaussLobatto) => {
                if n < 2 {
                    return Err(BasisError::invalid(
                        "n",
                        "Gauss-Lobatto quadrature needs at least 2 points",
                    ));
                }
                Ok(legendre_lobatto(n))
            }
            (Family::Laguerre, Quad::Gauss) => Ok(laguerre_gauss(n, unweighted)),
            (Family::Laguerre, Quad::GaussLobatto) => {
                Err(BasisError::UnsupportedQuadratureRule {
                    rule: quad.tag().to_string(),
                    family: self.name().to_string(),
                })
            }
        }
    }

    /// Vandermonde matrix of the raw polynomials, V[i, j] = P_j(x_i),
    /// for j = 0..=degree.
    pub fn vandermonde(&self, x: &Array1<Real>, degree: usize) -> Array2<Real> {
        let mut v = Array2::<Real>::zeros((x.len(), degree + 1));
        for (mut row, xi) in v.outer_iter_mut().zip(x.iter()) {
            row[0] = 1.;
            if degree > 0 {
                row[1] = match self {
                    Family::Legendre => *xi,
                    Family::Laguerre => 1. - xi,
                };
            }
            for j in 1..degree {
                let jf = j as Real;
                row[j + 1] = match self {
                    Family::Legendre => {
                        ((2. * jf + 1.) * xi * row[j] - jf * row[j - 1]) / (jf + 1.)
                    }
                    Family::Laguerre => {
                        ((2. * jf + 1. - xi) * row[j] - jf * row[j - 1]) / (jf + 1.)
                    }
                };
            }
        }
        v
    }

    /// k-th derivative of the raw polynomials, D[i, j] = P_j^(k)(x_i).
    ///
    /// Legendre: P^(k)_{n+1} = P^(k)_{n-1} + (2n+1) P^(k-1)_n
    ///
    /// Laguerre: P^(k)_n = P^(k)_{n-1} - P^(k-1)_{n-1}
    pub fn vandermonde_derivative(&self, x: &Array1<Real>, degree: usize, k: usize) -> Array2<Real> {
        let mut v = self.vandermonde(x, degree);
        for _ in 0..k {
            let mut d = Array2::<Real>::zeros(v.raw_dim());
            match self {
                Family::Legendre => {
                    for (mut drow, vrow) in d.outer_iter_mut().zip(v.outer_iter()) {
                        if degree > 0 {
                            drow[1] = vrow[0];
                        }
                        for n in 1..degree {
                            drow[n + 1] = drow[n - 1] + (2 * n + 1) as Real * vrow[n];
                        }
                    }
                }
                Family::Laguerre => {
                    for (mut drow, vrow) in d.outer_iter_mut().zip(v.outer_iter()) {
                        for n in 1..=degree {
                            drow[n] = drow[n - 1] - vrow[n - 1];
                        }
                    }
                }
            }
            v = d;
        }
        v
    }

    /// Vandermonde matrix of the k-th derivative of the basis functions.
    ///
    /// Identical to [`Family::vandermonde_derivative`] for Legendre. For
    /// Laguerre the damping exp(-x/2) is included:
    ///
    /// L_k'  = (P_k' - P_k/2) exp(-x/2)
    ///
    /// L_k'' = (P_k'' - P_k' + P_k/4) exp(-x/2)
    ///
    /// # Errors
    /// `UnsupportedDerivativeOrder` for Laguerre and k > 2.
    pub fn function_vandermonde(
        &self,
        x: &Array1<Real>,
        degree: usize,
        k: usize,
    ) -> Result<Array2<Real>> {
        match self {
            Family::Legendre => Ok(self.vandermonde_derivative(x, degree, k)),
            Family::Laguerre => {
                let mut v = match k {
                    0 => self.vandermonde(x, degree),
                    1 => {
                        let v0 = self.vandermonde(x, degree);
                        let v1 = self.vandermonde_derivative(x, degree, 1);
                        v1 - v0 * 0.5
                    }
                    2 => {
                        let v0 = self.vandermonde(x, degree);
                        let v1 = self.vandermonde_derivative(x, degree, 1);
                        let v2 = self.vandermonde_derivative(x, degree, 2);
                        v2 - v1 + v0 * 0.25
                    }
                    _ => {
                        return Err(BasisError::UnsupportedDerivativeOrder {
                            order: k,
                            max: 2,
                            family: self.name().to_string(),
                        })
                    }
                };
                for (mut row, xi) in v.outer_iter_mut().zip(x.iter()) {
                    row *= (-xi / 2.).exp();
                }
                Ok(v)
            }
        }
    }

    /// Evaluate basis function of order i (k-th derivative) at x.
    pub fn evaluate(&self, x: &Array1<Real>, i: usize, k: usize) -> Result<Array1<Real>> {
        Ok(self.function_vandermonde(x, i, k)?.column(i).to_owned())
    }

    /// Evaluate the series sum_j c_j phi_j(x) of the basis functions.
    pub fn eval_series(&self, x: &Array1<Real>, c: &Array1<Real>) -> Result<Array1<Real>> {
        if c.is_empty() {
            return Ok(Array1::zeros(x.len()));
        }
        Ok(self.function_vandermonde(x, c.len() - 1, 0)?.dot(c))
    }
}
