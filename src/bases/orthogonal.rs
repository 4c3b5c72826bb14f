//! # Orthogonal
//! Plain basis of primary functions, without boundary conditions.
//!
//! Its transforms are matrix based: the forward transform projects
//! onto the basis functions with the quadrature weights and divides
//! by the (diagonal) discrete mass.
use super::family::Family;
use super::plan::{self, weighted_projection, PlanState, Sizes};
use super::stencil::Variant;
use super::{BaseEval, BaseOptions, BaseSize, ToOrtho, Transform};
use crate::error::{BasisError, Result};
use crate::quadrature::Quad;
use crate::solver::MassSolver;
use crate::Real;
use log::debug;
use ndarray::prelude::*;
use ndarray::{Data, DataMut, LinalgScalar};

/// Orthogonal basis of Legendre polynomials or Laguerre functions
#[derive(Debug, Clone)]
pub struct Orthogonal {
    /// Number of coefficients in spectral space
    pub n: usize,
    /// Number of points in physical space
    pub m: usize,
    /// Quadrature points (reference domain)
    pub x: Array1<Real>,
    /// Quadrature weights
    w: Array1<Real>,
    family: Family,
    quad: Quad,
    domain: (Real, Real),
    padding_factor: Real,
    dealias_direct: bool,
    mass: MassSolver,
    /// Basis functions at the quadrature points (points x m)
    evaluate: Array2<Real>,
    /// Weighted projection onto the basis functions (m x points)
    project: Array2<Real>,
    plan: PlanState,
}

impl Orthogonal {
    /// Return orthogonal basis with default options
    pub fn new(family: Family, n: usize) -> Result<Self> {
        Self::with_options(family, n, &BaseOptions::default())
    }

    /// Return orthogonal basis.
    ///
    /// Boundary options (`bc`, `mean`, `scaled`) are ignored.
    ///
    /// # Errors
    /// `UnsupportedQuadratureRule` for an unknown quadrature tag,
    /// `InvalidParameter` for an invalid size, padding factor or domain.
    pub fn with_options(family: Family, n: usize, options: &BaseOptions) -> Result<Self> {
        let quad = family.parse_quad(&options.quad)?;
        if n == 0 {
            return Err(BasisError::invalid("n", "basis needs at least one function"));
        }
        let padding_factor = options.padding_factor;
        if !padding_factor.is_finite() || padding_factor < 1. {
            return Err(BasisError::invalid(
                "padding_factor",
                format!("must be >= 1, got {}", padding_factor),
            ));
        }
        let domain = Self::check_domain(family, options.domain)?;
        let m = (n as Real * padding_factor).floor() as usize;
        let (x, w) = family.points_and_weights(m, quad, true)?;
        let p = family.function_vandermonde(&x, m - 1, 0)?;
        let mass = MassSolver::Diagonal((&p * &p).t().dot(&w));
        let project = weighted_projection(&p, &w);
        debug!(
            "Create {} basis with n={} m={} quad={} domain={:?}",
            family, n, m, quad, domain
        );
        Ok(Orthogonal {
            n,
            m,
            x,
            w,
            family,
            quad,
            domain,
            padding_factor,
            dealias_direct: options.dealias_direct,
            mass,
            evaluate: p,
            project,
            plan: PlanState::Unplanned,
        })
    }

    fn check_domain(family: Family, domain: Option<(Real, Real)>) -> Result<(Real, Real)> {
        let reference = family.reference_domain();
        match (family, domain) {
            (_, None) => Ok(reference),
            (Family::Legendre, Some((a, b))) => {
                if a.is_finite() && b.is_finite() && a < b {
                    Ok((a, b))
                } else {
                    Err(BasisError::invalid(
                        "domain",
                        format!("expected finite a < b, got ({}, {})", a, b),
                    ))
                }
            }
            (Family::Laguerre, Some(d)) => {
                if d == reference {
                    Ok(d)
                } else {
                    Err(BasisError::invalid(
                        "domain",
                        format!("laguerre basis lives on (0, inf), got {:?}", d),
                    ))
                }
            }
        }
    }

    /// Options which reproduce this basis
    pub fn options(&self) -> BaseOptions {
        BaseOptions::default()
            .quad(self.quad.tag())
            .domain(self.domain.0, self.domain.1)
            .padding_factor(self.padding_factor)
            .dealias_direct(self.dealias_direct)
    }

    /// Quadrature rule
    pub fn quad(&self) -> Quad {
        self.quad
    }

    /// True domain
    pub fn domain(&self) -> (Real, Real) {
        self.domain
    }

    /// Padding factor of physical space
    pub fn padding_factor(&self) -> Real {
        self.padding_factor
    }

    /// Truncate upper third of spectrum in the backward transform
    pub fn dealias_direct(&self) -> bool {
        self.dealias_direct
    }

    /// Quadrature points and weights (reference domain, padded size)
    pub fn points_and_weights(&self) -> (&Array1<Real>, &Array1<Real>) {
        (&self.x, &self.w)
    }

    /// Quadrature points in the true domain
    pub fn mesh(&self) -> Array1<Real> {
        self.map_true_domain(&self.x)
    }

    /// Ratio of true and reference domain length, (b - a) / 2
    pub fn domain_factor(&self) -> Real {
        match self.family {
            Family::Legendre => (self.domain.1 - self.domain.0) / 2.,
            Family::Laguerre => 1.,
        }
    }

    /// Map reference points to the true domain
    pub fn map_true_domain(&self, x: &Array1<Real>) -> Array1<Real> {
        match self.family {
            Family::Legendre => {
                let (a, df) = (self.domain.0, self.domain_factor());
                x.mapv(|x| a + (x + 1.) * df)
            }
            Family::Laguerre => x.clone(),
        }
    }

    /// Map true points to the reference domain
    pub fn map_reference_domain(&self, x: &Array1<Real>) -> Array1<Real> {
        match self.family {
            Family::Legendre => {
                let (a, df) = (self.domain.0, self.domain_factor());
                x.mapv(|x| (x - a) / df - 1.)
            }
            Family::Laguerre => x.clone(),
        }
    }

    /// Return basis of size `n` with otherwise identical options
    pub fn get_refined(&self, n: usize) -> Result<Self> {
        Self::with_options(self.family, n, &self.options())
    }

    /// Return basis with new dealiasing options
    pub fn get_dealiased(&self, padding_factor: Real, dealias_direct: bool) -> Result<Self> {
        let options = self
            .options()
            .padding_factor(padding_factor)
            .dealias_direct(dealias_direct);
        Self::with_options(self.family, self.n, &options)
    }

    /// Basis functions at the quadrature points (points x functions)
    pub fn function_matrix(&self) -> &Array2<Real> {
        &self.evaluate
    }

    /// Current plan state
    pub fn plan_state(&self) -> &PlanState {
        &self.plan
    }

    pub(crate) fn plan_state_mut(&mut self) -> &mut PlanState {
        &mut self.plan
    }

    pub(crate) fn sizes(&self, n_lift: usize) -> Sizes {
        Sizes {
            n: self.n,
            m: self.m,
            n_lift,
        }
    }

    pub(crate) fn weights(&self) -> &Array1<Real> {
        &self.w
    }

    /// Plan for physical `shape` along `axis`, used by composite bases
    pub(crate) fn plan_physical(&mut self, shape: &[usize], axis: usize) -> Result<()> {
        match shape.get(axis) {
            Some(&len) if len == self.m => {}
            Some(&len) => {
                return Err(BasisError::ShapeMismatch {
                    axis,
                    expected: self.m,
                    actual: len,
                })
            }
            None => {
                return Err(BasisError::invalid(
                    "axis",
                    format!("axis {} out of bounds for {} dimensions", axis, shape.len()),
                ))
            }
        }
        let n_trunc = self.sizes(0).n_trunc();
        self.plan.plan(shape, axis, n_trunc).map(|_| ())
    }
}

impl BaseSize for Orthogonal {
    fn len_phys(&self) -> usize {
        self.m
    }

    fn len_spec(&self) -> usize {
        self.n
    }

    fn coords(&self) -> &Array1<Real> {
        &self.x
    }

    fn family(&self) -> Family {
        self.family
    }

    fn variant(&self) -> Variant {
        Variant::Plain
    }
}

impl BaseEval for Orthogonal {
    fn vandermonde(&self, x: &Array1<Real>) -> Array2<Real> {
        self.family.vandermonde(x, self.n - 1)
    }

    fn evaluate_basis_derivative_all(&self, x: &Array1<Real>, k: usize) -> Result<Array2<Real>> {
        self.family.function_vandermonde(x, self.n - 1, k)
    }

    fn evaluate_basis_derivative(&self, x: &Array1<Real>, i: usize, k: usize) -> Result<Array1<Real>> {
        if i >= self.n {
            return Err(BasisError::IndexOutOfValidRange {
                index: i,
                valid: self.n,
            });
        }
        self.family.evaluate(x, i, k)
    }

    fn eval(&self, x: &Array1<Real>, u: &Array1<Real>) -> Result<Array1<Real>> {
        plan::check_len(u, 0, self.n)?;
        self.family.eval_series(&self.map_reference_domain(x), u)
    }
}

impl Transform for Orthogonal {
    fn plan(&mut self, shape: &[usize], axis: usize) -> Result<()> {
        self.plan_physical(shape, axis)
    }

    /// # Example
    /// Forward transform of P_2
    ///```
    /// use shenspace::bases::{legendre, BaseSize, Transform};
    /// use ndarray::prelude::*;
    /// let mut base = legendre(5).unwrap();
    /// let v = base.coords().mapv(|x| (3. * x * x - 1.) / 2.);
    /// let mut vhat = Array1::<f64>::zeros(5);
    /// base.forward(&v, &mut vhat, 0).unwrap();
    /// assert!((vhat[2] - 1.).abs() < 1e-12);
    ///```
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
        let sizes = self.sizes(0);
        let pw = &self.project;
        let mass = &self.mass;
        plan::forward(&mut self.plan, sizes, pw, input, output, axis, |u| {
            mass.solve_leading(u, axis);
            Ok(())
        })
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
        let sizes = self.sizes(0);
        let dealias = self.dealias_direct;
        plan::backward(&mut self.plan, sizes, dealias, &self.evaluate, input, output, axis)
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
        let sizes = self.sizes(0);
        plan::scalar_product(&mut self.plan, sizes, &self.project, input, output, axis, |_| Ok(()))
    }
}

impl ToOrtho for Orthogonal {
    /// Coefficients are already orthogonal, `input` is copied.
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
        plan::check_len(input, axis, self.n)?;
        plan::check_len(output, axis, self.n)?;
        output.assign(input);
        Ok(())
    }
}
