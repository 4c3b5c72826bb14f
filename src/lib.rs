#![warn(missing_docs)]
//! # shenspace: composite spectral bases with planned transforms
//!
//! This library is intended for simulation softwares which solve
//! partial differential equations using spectral Galerkin methods.
//!
//! It implements transforms from physical to spectral space
//! for the following basis functions:
//! - Legendre (Orthogonal)
//! - LegendreDirichlet, LegendreNeumann, LegendreBiharmonic (Composite)
//! - Laguerre (Orthogonal)
//! - LaguerreDirichlet (Composite)
//!
//! Composite basis combine several basis functions of its parent space to
//! satisfy the needed boundary conditions, this is often called a Galerkin method.
//! Nonhomogeneous boundary conditions are lifted with a small set of
//! boundary functions, whose coefficients occupy the trailing slots of
//! the spectral array.
//!
//! # Example
//! ```
//! use shenspace::bases::{legendre_dirichlet, BaseSize, Transform};
//! use ndarray::Array1;
//! let mut base = legendre_dirichlet(8).unwrap();
//! let x = base.coords().clone();
//! let v: Array1<f64> = x.mapv(|x| 1. - x * x);
//! let mut vhat = Array1::<f64>::zeros(base.len_spec());
//! base.forward(&v, &mut vhat, 0).unwrap();
//! ```
pub mod bases;
pub mod error;
pub mod quadrature;
pub mod solver;
pub use bases::{
    laguerre, laguerre_dirichlet, legendre, legendre_biharmonic, legendre_dirichlet,
    legendre_neumann, Base, BaseOptions,
};
pub use error::{BasisError, Result};

/// Real type
pub type Real = f64;
