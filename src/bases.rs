//! # Bases
//! Collection of basis functions which implement forward/backward transforms
//! and the mapping of composite coefficients to orthogonal ones.
//!
//! Implemented:
//! - Legendre
//! - LegendreDirichlet (optionally scaled)
//! - LegendreNeumann
//! - LegendreBiharmonic
//! - Laguerre
//! - LaguerreDirichlet
pub mod boundary;
pub mod composite;
pub mod family;
pub mod orthogonal;
pub mod plan;
pub mod stencil;
use crate::error::Result;
use crate::Real;
pub use boundary::{BcBasis, BoundaryValues};
pub use composite::Composite;
use enum_dispatch::enum_dispatch;
pub use family::Family;
use ndarray::prelude::*;
use ndarray::{Data, DataMut, LinalgScalar};
pub use orthogonal::Orthogonal;
pub use plan::{PlanState, SliceMap, TransformPlan};
pub use stencil::{Boundary, FactorCache, Stencil, Variant};

/// Options of a basis.
///
/// # Example
///```
/// use shenspace::bases::BaseOptions;
/// let options = BaseOptions::default().quad("GL").domain(0., 2.).bc(&[1., 0.]);
/// assert_eq!(options.domain, Some((0., 2.)));
///```
#[derive(Debug, Clone, PartialEq)]
pub struct BaseOptions {
    /// Quadrature tag, "LG" (Gauss) or "GL" (Gauss-Lobatto)
    pub quad: String,
    /// True domain (a, b), reference domain if `None`
    pub domain: Option<(Real, Real)>,
    /// Physical size is floor(n * padding_factor)
    pub padding_factor: Real,
    /// Zero upper third of the spectrum in the backward transform
    pub dealias_direct: bool,
    /// Scaled Legendre Dirichlet functions
    pub scaled: bool,
    /// Boundary values, homogeneous if `None`
    pub bc: Option<Vec<Real>>,
    /// Mean value of Neumann bases
    pub mean: Real,
}

impl Default for BaseOptions {
    fn default() -> Self {
        BaseOptions {
            quad: "LG".to_string(),
            domain: None,
            padding_factor: 1.,
            dealias_direct: false,
            scaled: false,
            bc: None,
            mean: 0.,
        }
    }
}

impl BaseOptions {
    /// Set quadrature tag
    pub fn quad(mut self, tag: &str) -> Self {
        self.quad = tag.to_string();
        self
    }

    /// Set true domain
    pub fn domain(mut self, a: Real, b: Real) -> Self {
        self.domain = Some((a, b));
        self
    }

    /// Set padding factor
    pub fn padding_factor(mut self, padding_factor: Real) -> Self {
        self.padding_factor = padding_factor;
        self
    }

    /// Set direct dealiasing
    pub fn dealias_direct(mut self, dealias_direct: bool) -> Self {
        self.dealias_direct = dealias_direct;
        self
    }

    /// Set scaling
    pub fn scaled(mut self, scaled: bool) -> Self {
        self.scaled = scaled;
        self
    }

    /// Set boundary values
    pub fn bc(mut self, bc: &[Real]) -> Self {
        self.bc = Some(bc.to_vec());
        self
    }

    /// Set mean value
    pub fn mean(mut self, mean: Real) -> Self {
        self.mean = mean;
        self
    }
}

/// Size and identity of a basis
#[enum_dispatch]
pub trait BaseSize {
    /// Size in physical space
    fn len_phys(&self) -> usize;
    /// Size in spectral space
    fn len_spec(&self) -> usize;
    /// Quadrature points (reference domain)
    fn coords(&self) -> &Array1<Real>;
    /// Family of primary functions
    fn family(&self) -> Family;
    /// Boundary condition variant
    fn variant(&self) -> Variant;
}

/// Evaluation of basis functions at arbitrary points
#[enum_dispatch]
pub trait BaseEval {
    /// Primary Vandermonde matrix (points x n) at reference points
    fn vandermonde(&self, x: &Array1<Real>) -> Array2<Real>;

    /// k-th derivative of all basis functions at reference points
    fn evaluate_basis_derivative_all(&self, x: &Array1<Real>, k: usize) -> Result<Array2<Real>>;

    /// k-th derivative of basis function i at reference points
    fn evaluate_basis_derivative(&self, x: &Array1<Real>, i: usize, k: usize) -> Result<Array1<Real>>;

    /// Evaluate expansion with coefficients `u` at points `x` of the true domain
    fn eval(&self, x: &Array1<Real>, u: &Array1<Real>) -> Result<Array1<Real>>;

    /// All basis functions at reference points
    fn evaluate_basis_all(&self, x: &Array1<Real>) -> Result<Array2<Real>> {
        self.evaluate_basis_derivative_all(x, 0)
    }

    /// Basis function i at reference points
    fn evaluate_basis(&self, x: &Array1<Real>, i: usize) -> Result<Array1<Real>> {
        self.evaluate_basis_derivative(x, i, 0)
    }
}

/// Defines transform from physical to spectral space and vice versa.
///
/// Physical arrays have length `len_phys` along `axis`, spectral
/// arrays length `len_spec`. Transforms are planned on first use.
pub trait Transform {
    /// Allocate work buffers for physical `shape` along `axis`
    fn plan(&mut self, shape: &[usize], axis: usize) -> Result<()>;

    /// Transform array from physical to spectral space along axis
    fn forward<S1, S2, D>(
        &mut self,
        input: &ArrayBase<S1, D>,
        output: &mut ArrayBase<S2, D>,
        axis: usize,
    ) -> Result<()>
    where
        S1: Data<Elem = Real>,
        S2: Data<Elem = Real> + DataMut,
        D: Dimension;

    /// Transform array from spectral to physical space along axis
    fn backward<S1, S2, D>(
        &mut self,
        input: &ArrayBase<S1, D>,
        output: &mut ArrayBase<S2, D>,
        axis: usize,
    ) -> Result<()>
    where
        S1: Data<Elem = Real>,
        S2: Data<Elem = Real> + DataMut,
        D: Dimension;

    /// Weighted inner products with the basis functions along axis.
    /// Output has the physical length.
    fn scalar_product<S1, S2, D>(
        &mut self,
        input: &ArrayBase<S1, D>,
        output: &mut ArrayBase<S2, D>,
        axis: usize,
    ) -> Result<()>
    where
        S1: Data<Elem = Real>,
        S2: Data<Elem = Real> + DataMut,
        D: Dimension;
}

/// Transform from composite to orthogonal coefficients
pub trait ToOrtho {
    /// Map spectral coefficients to those of the orthogonal parent
    /// basis along axis. Generic over real and complex data.
    fn to_ortho<T, S1, S2, D>(
        &mut self,
        input: &ArrayBase<S1, D>,
        output: &mut ArrayBase<S2, D>,
        axis: usize,
    ) -> Result<()>
    where
        T: LinalgScalar,
        f64: Into<T>,
        S1: Data<Elem = T>,
        S2: Data<Elem = T> + DataMut,
        D: Dimension;
}

/// Enum of all implemented basis functions.
///
/// Size and evaluation methods are derived for this enum, the
/// generic transforms are dispatched by hand.
#[enum_dispatch(BaseSize, BaseEval)]
#[derive(Debug, Clone)]
pub enum Base {
    /// Legendre polynomials or Laguerre functions
    Orthogonal(Orthogonal),
    /// Combination of orthogonal functions with boundary conditions
    Composite(Composite),
}

impl Base {
    /// Return basis of family and variant, `Variant::Plain` yields the
    /// orthogonal basis.
    ///
    /// # Example
    ///```
    /// use shenspace::bases::{Base, BaseOptions, BaseSize, Family, Variant};
    /// let options = BaseOptions::default().padding_factor(1.5);
    /// let base = Base::with_options(Family::Laguerre, Variant::Dirichlet, 8, &options).unwrap();
    /// assert_eq!(base.len_phys(), 12);
    ///```
    pub fn with_options(
        family: Family,
        variant: Variant,
        n: usize,
        options: &BaseOptions,
    ) -> Result<Self> {
        match variant {
            Variant::Plain => Ok(Base::Orthogonal(Orthogonal::with_options(family, n, options)?)),
            _ => Ok(Base::Composite(Composite::with_options(
                family, variant, n, options,
            )?)),
        }
    }
}

impl Transform for Base {
    fn plan(&mut self, shape: &[usize], axis: usize) -> Result<()> {
        match self {
            Base::Orthogonal(ref mut b) => b.plan(shape, axis),
            Base::Composite(ref mut b) => b.plan(shape, axis),
        }
    }

    fn forward<S1, S2, D>(
        &mut self,
        input: &ArrayBase<S1, D>,
        output: &mut ArrayBase<S2, D>,
        axis: usize,
    ) -> Result<()>
    where
        S1: Data<Elem = Real>,
        S2: Data<Elem = Real> + DataMut,
        D: Dimension,
    {
        match self {
            Base::Orthogonal(ref mut b) => b.forward(input, output, axis),
            Base::Composite(ref mut b) => b.forward(input, output, axis),
        }
    }

    fn backward<S1, S2, D>(
        &mut self,
        input: &ArrayBase<S1, D>,
        output: &mut ArrayBase<S2, D>,
        axis: usize,
    ) -> Result<()>
    where
        S1: Data<Elem = Real>,
        S2: Data<Elem = Real> + DataMut,
        D: Dimension,
    {
        match self {
            Base::Orthogonal(ref mut b) => b.backward(input, output, axis),
            Base::Composite(ref mut b) => b.backward(input, output, axis),
        }
    }

    fn scalar_product<S1, S2, D>(
        &mut self,
        input: &ArrayBase<S1, D>,
        output: &mut ArrayBase<S2, D>,
        axis: usize,
    ) -> Result<()>
    where
        S1: Data<Elem = Real>,
        S2: Data<Elem = Real> + DataMut,
        D: Dimension,
    {
        match self {
            Base::Orthogonal(ref mut b) => b.scalar_product(input, output, axis),
            Base::Composite(ref mut b) => b.scalar_product(input, output, axis),
        }
    }
}

impl ToOrtho for Base {
    fn to_ortho<T, S1, S2, D>(
        &mut self,
        input: &ArrayBase<S1, D>,
        output: &mut ArrayBase<S2, D>,
        axis: usize,
    ) -> Result<()>
    where
        T: LinalgScalar,
        f64: Into<T>,
        S1: Data<Elem = T>,
        S2: Data<Elem = T> + DataMut,
        D: Dimension,
    {
        match self {
            Base::Orthogonal(ref mut b) => b.to_ortho(input, output, axis),
            Base::Composite(ref mut b) => b.to_ortho(input, output, axis),
        }
    }
}

/// Function space for Legendre polynomials
/// ```text
/// P_k
/// ```
pub fn legendre(n: usize) -> Result<Base> {
    Base::with_options(Family::Legendre, Variant::Plain, n, &BaseOptions::default())
}

/// Function space with Dirichlet boundary conditions
/// ```text
/// phi_k = P_k - P_{k+2}
/// ```
///
/// # Example
///```
/// use shenspace::bases::{legendre_dirichlet, BaseEval};
/// use ndarray::prelude::*;
/// let base = legendre_dirichlet(8).unwrap();
/// let phi = base.evaluate_basis(&array![-1., 0., 1.], 0).unwrap();
/// assert!((phi[1] - 1.5).abs() < 1e-14);
/// assert!(phi[0].abs() < 1e-14 && phi[2].abs() < 1e-14);
///```
pub fn legendre_dirichlet(n: usize) -> Result<Base> {
    Base::with_options(Family::Legendre, Variant::Dirichlet, n, &BaseOptions::default())
}

/// Function space with Neumann boundary conditions
/// ```text
/// phi_k = P_k - k(k+1)/((k+2)(k+3)) P_{k+2}
/// ```
pub fn legendre_neumann(n: usize) -> Result<Base> {
    Base::with_options(Family::Legendre, Variant::Neumann, n, &BaseOptions::default())
}

/// Function space with homogeneous values and first derivatives
/// ```text
/// phi_k = P_k - 2(2k+5)/(2k+7) P_{k+2} + (2k+3)/(2k+7) P_{k+4}
/// ```
///
/// # Example
///```
/// use shenspace::bases::{legendre_biharmonic, BaseSize};
/// let base = legendre_biharmonic(10).unwrap();
/// assert_eq!(base.len_spec(), 10);
/// assert!(legendre_biharmonic(4).is_err());
///```
pub fn legendre_biharmonic(n: usize) -> Result<Base> {
    Base::with_options(Family::Legendre, Variant::Biharmonic, n, &BaseOptions::default())
}

/// Function space for Laguerre functions on (0, inf)
/// ```text
/// f_k = L_k exp(-x/2)
/// ```
pub fn laguerre(n: usize) -> Result<Base> {
    Base::with_options(Family::Laguerre, Variant::Plain, n, &BaseOptions::default())
}

/// Laguerre function space which vanishes at zero
/// ```text
/// phi_k = f_k - f_{k+1}
/// ```
///
/// # Example
///```
/// use shenspace::bases::{laguerre_dirichlet, BaseEval};
/// use ndarray::prelude::*;
/// let base = laguerre_dirichlet(6).unwrap();
/// let phi = base.evaluate_basis(&array![0.], 0).unwrap();
/// assert!(phi[0].abs() < 1e-14);
///```
pub fn laguerre_dirichlet(n: usize) -> Result<Base> {
    Base::with_options(Family::Laguerre, Variant::Dirichlet, n, &BaseOptions::default())
}
