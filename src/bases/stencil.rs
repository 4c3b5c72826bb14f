//! # Stencil
//! Composite basis functions as linear combination of primary ones.
//!
//! dirichlet (legendre):
//!     phi_k = P_k - P_{k+2}
//!
//! neumann (legendre):
//!     phi_k = P_k - k(k+1)/((k+2)(k+3)) P_{k+2}
//!
//! biharmonic (legendre):
//!     phi_k = P_k - 2(2k+5)/(2k+7) P_{k+2} + (2k+3)/(2k+7) P_{k+4}
//!
//! dirichlet (laguerre):
//!     phi_k = L_k - L_{k+1}
//!
//! Reference:
//! J. Shen: Efficient Spectral-Galerkin Method I.
use super::boundary::coefficient_matrix;
use super::family::Family;
use crate::error::{BasisError, Result};
use crate::Real;
use log::trace;
use ndarray::prelude::*;
use ndarray::{Data, DataMut, LinalgScalar, Zip};
use std::fmt;

/// Kind of boundary data which is lifted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Function values
    Dirichlet,
    /// First derivatives
    Neumann,
    /// Function values and first derivatives
    Biharmonic,
}

impl Boundary {
    /// Name of boundary type
    pub fn name(&self) -> &'static str {
        match self {
            Boundary::Dirichlet => "dirichlet",
            Boundary::Neumann => "neumann",
            Boundary::Biharmonic => "biharmonic",
        }
    }

    /// Number of boundary values a user supplies
    pub fn arity(&self) -> usize {
        match self {
            Boundary::Dirichlet | Boundary::Neumann => 2,
            Boundary::Biharmonic => 4,
        }
    }
}

/// Boundary condition variant of a basis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// No boundary conditions, primary polynomials
    Plain,
    /// Homogeneous function values
    Dirichlet,
    /// Homogeneous first derivatives
    Neumann,
    /// Homogeneous values and first derivatives
    Biharmonic,
    /// Lift functions of a boundary type
    BcLift(Boundary),
}

impl Variant {
    /// Boundary type of variant, `None` for Plain
    pub fn boundary(&self) -> Option<Boundary> {
        match self {
            Variant::Plain => None,
            Variant::Dirichlet => Some(Boundary::Dirichlet),
            Variant::Neumann => Some(Boundary::Neumann),
            Variant::Biharmonic => Some(Boundary::Biharmonic),
            Variant::BcLift(b) => Some(*b),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Plain => write!(f, "plain"),
            Variant::BcLift(b) => write!(f, "bc-{}", b.name()),
            other => match other.boundary() {
                Some(b) => write!(f, "{}", b.name()),
                None => write!(f, "plain"),
            },
        }
    }
}

/// Stencil of a composite basis.
///
/// Parent (p) and composite space (c) are connected by the stencil
/// matrix S, p = S c. Each interior column of S carries one to three
/// nonzero entries at fixed offsets, whose values are known in closed form.
#[derive(Debug, Clone)]
pub struct Stencil {
    family: Family,
    variant: Variant,
    scaled: bool,
    /// Number of composite functions
    n: usize,
    /// Coefficients (lift functions x primary functions), only lift stencils
    lift: Option<Array2<Real>>,
}

impl Stencil {
    /// Return stencil with `n` functions.
    ///
    /// # Errors
    /// `InvalidParameter` if the family does not support the variant,
    /// if `scaled` is requested for anything else than Legendre
    /// Dirichlet, or if `n` leaves no interior function.
    ///
    /// # Example
    ///```
    /// use shenspace::bases::{Family, Stencil, Variant};
    /// let stencil = Stencil::new(Family::Legendre, Variant::Dirichlet, false, 6).unwrap();
    /// assert_eq!(stencil.n_interior(), 4);
    ///```
    pub fn new(family: Family, variant: Variant, scaled: bool, n: usize) -> Result<Self> {
        if family == Family::Laguerre
            && matches!(variant.boundary(), Some(Boundary::Neumann | Boundary::Biharmonic))
        {
            return Err(BasisError::invalid(
                "variant",
                format!("{} is not available for laguerre", variant),
            ));
        }
        if scaled && !(family == Family::Legendre && variant == Variant::Dirichlet) {
            return Err(BasisError::invalid(
                "scaled",
                "only the legendre dirichlet basis can be scaled",
            ));
        }
        let lift = match variant {
            Variant::BcLift(b) => Some(coefficient_matrix(family, b)),
            _ => None,
        };
        let stencil = Stencil {
            family,
            variant,
            scaled,
            n,
            lift,
        };
        if let Some(c) = &stencil.lift {
            if n != c.nrows() {
                return Err(BasisError::invalid(
                    "n",
                    format!("{} has {} functions, got {}", variant, c.nrows(), n),
                ));
            }
        } else if n <= stencil.n_lift() {
            return Err(BasisError::invalid(
                "n",
                format!(
                    "{} {} basis needs more than {} functions, got {}",
                    family,
                    variant,
                    stencil.n_lift(),
                    n
                ),
            ));
        }
        Ok(stencil)
    }

    /// Family of primary functions
    pub fn family(&self) -> Family {
        self.family
    }

    /// Variant
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Scaled legendre dirichlet functions
    pub fn is_scaled(&self) -> bool {
        self.scaled
    }

    /// Number of functions (interior plus lift slots)
    pub fn len(&self) -> usize {
        self.n
    }

    /// Stencil has no functions
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Number of trailing slots reserved for lift functions
    pub fn n_lift(&self) -> usize {
        match (self.variant, self.family) {
            (Variant::Plain, _) | (Variant::BcLift(_), _) => 0,
            (Variant::Dirichlet, Family::Laguerre) => 1,
            (Variant::Dirichlet, Family::Legendre) | (Variant::Neumann, _) => 2,
            (Variant::Biharmonic, _) => 4,
        }
    }

    /// Number of interior functions
    pub fn n_interior(&self) -> usize {
        match self.variant {
            Variant::BcLift(_) => 0,
            _ => self.n - self.n_lift(),
        }
    }

    /// Offsets of the nonzero entries in each stencil column
    pub fn offsets(&self) -> &'static [usize] {
        match (self.variant, self.family) {
            (Variant::Plain, _) | (Variant::BcLift(_), _) => &[0],
            (Variant::Dirichlet, Family::Laguerre) => &[0, 1],
            (Variant::Dirichlet, Family::Legendre) | (Variant::Neumann, _) => &[0, 2],
            (Variant::Biharmonic, _) => &[0, 2, 4],
        }
    }

    /// Distance of the banded mass matrix diagonals
    pub fn stride(&self) -> usize {
        self.offsets().get(1).copied().unwrap_or(1)
    }

    /// Closed form coefficient of `term` for interior function `k`
    pub fn factor(&self, term: usize, k: usize) -> Real {
        let kf = k as Real;
        match (self.variant, term) {
            (_, 0) if !self.scaled => 1.,
            (Variant::Dirichlet, 0) => 1. / (4. * kf + 6.).sqrt(),
            (Variant::Dirichlet, 1) if self.scaled => -1. / (4. * kf + 6.).sqrt(),
            (Variant::Dirichlet, 1) => -1.,
            (Variant::Neumann, 1) => -(kf * (kf + 1.)) / ((kf + 2.) * (kf + 3.)),
            (Variant::Biharmonic, 1) => -2. * (2. * kf + 5.) / (2. * kf + 7.),
            (Variant::Biharmonic, 2) => (2. * kf + 3.) / (2. * kf + 7.),
            _ => 0.,
        }
    }

    /// Coefficient vectors of all terms over the interior functions
    pub fn factors(&self) -> Vec<Array1<Real>> {
        (0..self.offsets().len())
            .map(|t| Array1::from_shape_fn(self.n_interior(), |k| self.factor(t, k)))
            .collect()
    }

    /// Map a primary Vandermonde matrix (points x primary functions) to
    /// the composite one (points x composite functions).
    ///
    /// Lift slots of a composite stencil remain zero. A lift stencil
    /// uses only the leading primary functions it needs.
    ///
    /// # Errors
    /// `ShapeMismatch` if `v` has the wrong number of columns.
    pub fn composite_basis(&self, v: &Array2<Real>) -> Result<Array2<Real>> {
        if let Some(c) = &self.lift {
            if v.ncols() < c.ncols() {
                return Err(BasisError::ShapeMismatch {
                    axis: 1,
                    expected: c.ncols(),
                    actual: v.ncols(),
                });
            }
            return Ok(v.slice(s![.., ..c.ncols()]).dot(&c.t()));
        }
        if v.ncols() != self.n {
            return Err(BasisError::ShapeMismatch {
                axis: 1,
                expected: self.n,
                actual: v.ncols(),
            });
        }
        let mut p = Array2::<Real>::zeros((v.nrows(), self.n));
        for (t, off) in self.offsets().iter().enumerate() {
            for k in 0..self.n_interior() {
                let f = self.factor(t, k);
                let mut col = p.column_mut(k);
                col.scaled_add(f, &v.column(k + off));
            }
        }
        Ok(p)
    }

    /// Returns transform stencil as 2d ndarray
    ///
    /// Columns of the lift slots are zero.
    pub fn to_array(&self) -> Array2<Real> {
        if let Some(c) = &self.lift {
            return c.t().to_owned();
        }
        let mut mat = Array2::<Real>::zeros((self.n, self.n));
        for (t, off) in self.offsets().iter().enumerate() {
            for k in 0..self.n_interior() {
                mat[[k + off, k]] = self.factor(t, k);
            }
        }
        mat
    }

    /// Multiply stencil with composite coefficients along `axis`, the
    /// result is accumulated into `parent` which is zeroed first.
    pub fn to_parent<T, S1, S2, D>(
        &self,
        factors: &[Array1<Real>],
        composite: &ArrayBase<S1, D>,
        parent: &mut ArrayBase<S2, D>,
        axis: usize,
    ) where
        T: LinalgScalar,
        f64: Into<T>,
        S1: Data<Elem = T>,
        S2: Data<Elem = T> + DataMut,
        D: Dimension,
    {
        let offsets = self.offsets();
        parent.fill(T::zero());
        Zip::from(parent.lanes_mut(Axis(axis)))
            .and(composite.lanes(Axis(axis)))
            .for_each(|mut p, c| {
                for (f, off) in factors.iter().zip(offsets.iter()) {
                    for (k, fk) in f.iter().enumerate() {
                        p[k + off] = p[k + off] + (*fk).into() * c[k];
                    }
                }
            });
    }
}

/// Stencil coefficient vectors, memoized per array shape.
#[derive(Debug, Clone, Default)]
pub struct FactorCache {
    shape: Option<Vec<usize>>,
    factors: Vec<Array1<Real>>,
}

impl FactorCache {
    /// Return factors, recomputed if `shape` differs from the cached one.
    pub fn get(&mut self, shape: &[usize], stencil: &Stencil) -> &[Array1<Real>] {
        if self.shape.as_deref() != Some(shape) {
            trace!("Compute stencil factors for shape {:?}", shape);
            self.factors = stencil.factors();
            self.shape = Some(shape.to_vec());
        }
        &self.factors
    }

    /// Shape of the cached factors
    pub fn shape(&self) -> Option<&[usize]> {
        self.shape.as_deref()
    }
}
