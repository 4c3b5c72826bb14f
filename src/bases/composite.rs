//! Composite bases are produced by a combination of basis functions from an orthogonal set.
//!
//! Parent (p) and composite space (c) are connected by a stencil
//! matrix S, p = S c. The transform to the parent space is a sparse
//! multiplication, the forward transform solves the banded mass system
//! of the composite functions.
//!
//! Boundary values are carried in the trailing slots of the spectral
//! array and enter the transform through the lift functions.
use super::boundary::{BcBasis, BoundaryValues};
use super::family::Family;
use super::orthogonal::Orthogonal;
use super::plan::{self, weighted_projection, SliceMap};
use super::stencil::{FactorCache, Stencil, Variant};
use super::{BaseEval, BaseOptions, BaseSize, ToOrtho, Transform};
use crate::error::{BasisError, Result};
use crate::solver::MassSolver;
use crate::Real;
use log::debug;
use ndarray::prelude::*;
use ndarray::{Data, DataMut, LinalgScalar};
use std::f64::consts::PI;
use std::ops::Range;

/// Composite basis which satisfies boundary conditions
#[derive(Debug, Clone)]
pub struct Composite {
    /// Number of coefficients in spectral space (interior and lift slots)
    pub n: usize,
    /// Number of points in physical space
    pub m: usize,
    variant: Variant,
    mean: Real,
    ortho: Orthogonal,
    stencil: Stencil,
    bc: BoundaryValues,
    mass: MassSolver,
    /// Weighted projection onto the interior functions (m x points)
    project: Array2<Real>,
    /// Interior and lift functions at the quadrature points (points x m)
    evaluate: Array2<Real>,
    factors: FactorCache,
}

impl Composite {
    /// Return composite basis with default options
    pub fn new(family: Family, variant: Variant, n: usize) -> Result<Self> {
        Self::with_options(family, variant, n, &BaseOptions::default())
    }

    /// Return composite basis.
    ///
    /// # Errors
    /// `InvalidParameter` for a variant without boundary conditions or
    /// unsupported by the family, `BoundaryArityMismatch` for a wrong
    /// number of boundary values and any error of [`Orthogonal::with_options`].
    ///
    /// # Example
    ///```
    /// use shenspace::bases::{BaseOptions, Composite, Family, Variant};
    /// let options = BaseOptions::default().bc(&[1., -1.]).padding_factor(1.5);
    /// let base = Composite::with_options(Family::Legendre, Variant::Dirichlet, 10, &options).unwrap();
    /// assert!(base.has_nonhomogeneous_bcs());
    /// assert_eq!(base.m, 15);
    ///```
    pub fn with_options(
        family: Family,
        variant: Variant,
        n: usize,
        options: &BaseOptions,
    ) -> Result<Self> {
        let boundary = match variant {
            Variant::Dirichlet | Variant::Neumann | Variant::Biharmonic => variant.boundary(),
            _ => None,
        }
        .ok_or_else(|| {
            BasisError::invalid("variant", format!("{} is not a composite variant", variant))
        })?;
        let stencil = Stencil::new(family, variant, options.scaled, n)?;
        let ortho = Orthogonal::with_options(family, n, options)?;
        let m = ortho.m;
        let padded = Stencil::new(family, variant, options.scaled, m)?;
        let k = padded.n_lift();

        // Interior functions at the padded quadrature points
        let v = family.function_vandermonde(&ortho.x, m - 1, 0)?;
        let mut evaluate = padded.composite_basis(&v)?;
        let p_int = evaluate.slice(s![.., ..m - k]).to_owned();
        let w = ortho.weights();
        let project = weighted_projection(&evaluate, w);
        let mut mass = (&p_int.t() * w).dot(&p_int);
        let pinned = usize::from(variant == Variant::Neumann);
        if pinned > 0 {
            mass.row_mut(0).fill(0.);
            mass.column_mut(0).fill(0.);
            mass[[0, 0]] = 1.;
        }
        let mass = MassSolver::banded(&mass, padded.stride(), padded.offsets().len() - 1);

        let bc = BoundaryValues::new(family, boundary, options.bc.as_deref(), ortho.domain_factor())?
            .coupled(&p_int, &ortho.x, w, pinned)?;
        evaluate
            .slice_mut(s![.., m - k..])
            .assign(&bc.bc_basis().composite_basis(&v)?);
        debug!(
            "Create {} {} basis with n={} m={} scaled={} nonhomogeneous={}",
            family,
            variant,
            n,
            m,
            options.scaled,
            bc.has_nonhomogeneous_bcs()
        );
        Ok(Composite {
            n,
            m,
            variant,
            mean: options.mean,
            ortho,
            stencil,
            bc,
            mass,
            project,
            evaluate,
            factors: FactorCache::default(),
        })
    }

    /// Options which reproduce this basis
    pub fn options(&self) -> BaseOptions {
        self.ortho
            .options()
            .scaled(self.stencil.is_scaled())
            .bc(self.bc.bc())
            .mean(self.mean)
    }

    /// Return basis of size `n` with otherwise identical options
    pub fn get_refined(&self, n: usize) -> Result<Self> {
        Self::with_options(self.family(), self.variant, n, &self.options())
    }

    /// Return basis with new dealiasing options
    pub fn get_dealiased(&self, padding_factor: Real, dealias_direct: bool) -> Result<Self> {
        let options = self
            .options()
            .padding_factor(padding_factor)
            .dealias_direct(dealias_direct);
        Self::with_options(self.family(), self.variant, self.n, &options)
    }

    /// Return a new orthogonal basis of the same family, size and options
    pub fn get_orthogonal(&self) -> Result<Orthogonal> {
        Orthogonal::with_options(self.family(), self.n, &self.ortho.options())
    }

    /// Nested orthogonal basis
    pub fn orthogonal(&self) -> &Orthogonal {
        &self.ortho
    }

    /// Basis of lift functions
    pub fn get_bc_basis(&self) -> &BcBasis {
        self.bc.bc_basis()
    }

    /// Boundary values
    pub fn boundary_values(&self) -> &BoundaryValues {
        &self.bc
    }

    /// Any boundary value is nonzero
    pub fn has_nonhomogeneous_bcs(&self) -> bool {
        self.bc.has_nonhomogeneous_bcs()
    }

    /// Stencil of interior functions
    pub fn stencil(&self) -> &Stencil {
        &self.stencil
    }

    /// Mean value of a Neumann basis
    pub fn mean(&self) -> Real {
        self.mean
    }

    /// Number of lift slots
    pub fn n_lift(&self) -> usize {
        self.stencil.n_lift()
    }

    /// Range of interior functions in spectral space
    pub fn slice(&self) -> Range<usize> {
        0..self.stencil.n_interior()
    }

    /// Stencil matrix S (n x n), orthogonal = S composite.
    ///
    /// Interior columns hold the stencil, the lift columns the
    /// coefficients of the lift functions.
    pub fn stencil_matrix(&self) -> Array2<Real> {
        let mut s = self.stencil.to_array();
        let c = self.bc.bc_basis().coefficients();
        let first = self.n - self.n_lift();
        for (b, row) in c.outer_iter().enumerate() {
            s.slice_mut(s![..row.len(), first + b]).assign(&row);
        }
        s
    }

    /// Map a primary Vandermonde matrix (points x n) to the composite
    /// one. With `with_lift`, the trailing columns hold the lift functions.
    ///
    /// # Errors
    /// `ShapeMismatch` if `v` does not have `n` columns.
    pub fn composite_basis(&self, v: &Array2<Real>, with_lift: bool) -> Result<Array2<Real>> {
        let mut p = self.stencil.composite_basis(v)?;
        if with_lift {
            let first = self.n - self.n_lift();
            p.slice_mut(s![.., first..])
                .assign(&self.bc.bc_basis().composite_basis(v)?);
        }
        Ok(p)
    }

    /// Interior and lift functions at the quadrature points (points x m)
    pub fn quadrature_basis(&self) -> &Array2<Real> {
        &self.evaluate
    }

    /// Slot 0 of a Neumann basis carries mean * pi
    fn neumann_mean(&self) -> Option<Real> {
        if self.variant == Variant::Neumann {
            Some(self.mean)
        } else {
            None
        }
    }
}

/// Clear lift slots of a projected right hand side
fn restrict_lifts<S, D>(u: &mut ArrayBase<S, D>, axis: usize, n_lift: usize, mean: Option<Real>)
where
    S: Data<Elem = Real> + DataMut,
    D: Dimension,
{
    let sl = SliceMap::new(axis, u.ndim());
    if n_lift > 0 {
        sl.range_mut(u, -(n_lift as isize), None).fill(0.);
    }
    if let Some(mean) = mean {
        sl.index_mut(u, 0).fill(mean * PI);
    }
}

impl BaseSize for Composite {
    fn len_phys(&self) -> usize {
        self.m
    }

    fn len_spec(&self) -> usize {
        self.n
    }

    fn coords(&self) -> &Array1<Real> {
        &self.ortho.x
    }

    fn family(&self) -> Family {
        self.stencil.family()
    }

    fn variant(&self) -> Variant {
        self.variant
    }
}

impl BaseEval for Composite {
    fn vandermonde(&self, x: &Array1<Real>) -> Array2<Real> {
        self.family().vandermonde(x, self.n - 1)
    }

    fn evaluate_basis_derivative_all(&self, x: &Array1<Real>, k: usize) -> Result<Array2<Real>> {
        let v = self.family().function_vandermonde(x, self.n - 1, k)?;
        self.stencil.composite_basis(&v)
    }

    /// Closed form evaluation of interior function i
    fn evaluate_basis_derivative(&self, x: &Array1<Real>, i: usize, k: usize) -> Result<Array1<Real>> {
        let n_int = self.stencil.n_interior();
        if i >= n_int {
            return Err(BasisError::IndexOutOfValidRange {
                index: i,
                valid: n_int,
            });
        }
        let mut out = Array1::<Real>::zeros(x.len());
        for (t, off) in self.stencil.offsets().iter().enumerate() {
            let f = self.stencil.factor(t, i);
            out.scaled_add(f, &self.family().evaluate(x, i + off, k)?);
        }
        Ok(out)
    }

    fn eval(&self, x: &Array1<Real>, u: &Array1<Real>) -> Result<Array1<Real>> {
        plan::check_len(u, 0, self.n)?;
        let mut c = Array1::<Real>::zeros(self.n);
        self.stencil.to_parent(&self.stencil.factors(), u, &mut c, 0);
        self.bc.add_to_orthogonal(&mut c, u, 0)?;
        self.family()
            .eval_series(&self.ortho.map_reference_domain(x), &c)
    }
}

impl Transform for Composite {
    fn plan(&mut self, shape: &[usize], axis: usize) -> Result<()> {
        self.ortho.plan_physical(shape, axis)
    }

    /// # Example
    /// Forward transform of phi_0 = P_0 - P_2
    ///```
    /// use shenspace::bases::{legendre_dirichlet, BaseSize, Transform};
    /// use ndarray::prelude::*;
    /// let mut base = legendre_dirichlet(6).unwrap();
    /// let v = base.coords().mapv(|x| 1.5 - 1.5 * x * x);
    /// let mut vhat = Array1::<f64>::zeros(6);
    /// base.forward(&v, &mut vhat, 0).unwrap();
    /// assert!((vhat[0] - 1.).abs() < 1e-12);
    /// assert!(vhat[4].abs() < 1e-14);
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
        let n_lift = self.n_lift();
        let sizes = self.ortho.sizes(n_lift);
        let mean = self.neumann_mean();
        let pw = &self.project;
        let bc = &self.bc;
        let mass = &self.mass;
        let state = self.ortho.plan_state_mut();
        plan::forward(state, sizes, pw, input, output, axis, |u| {
            restrict_lifts(u, axis, n_lift, mean);
            bc.add_mass_rhs(u, axis)?;
            mass.solve_leading(u, axis);
            bc.set_boundary_dofs(u, axis)
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
        let sizes = self.ortho.sizes(self.n_lift());
        let dealias = self.ortho.dealias_direct();
        let p = &self.evaluate;
        let state = self.ortho.plan_state_mut();
        plan::backward(state, sizes, dealias, p, input, output, axis)
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
        let n_lift = self.n_lift();
        let sizes = self.ortho.sizes(n_lift);
        let mean = self.neumann_mean();
        let pw = &self.project;
        let state = self.ortho.plan_state_mut();
        plan::scalar_product(state, sizes, pw, input, output, axis, |u| {
            restrict_lifts(u, axis, n_lift, mean);
            Ok(())
        })
    }
}

impl ToOrtho for Composite {
    /// # Example
    ///```
    /// use shenspace::bases::{legendre_dirichlet, ToOrtho};
    /// use ndarray::prelude::*;
    /// let mut base = legendre_dirichlet(5).unwrap();
    /// let composite = array![1., 0., 0., 0., 0.];
    /// let mut parent = Array1::<f64>::zeros(5);
    /// base.to_ortho(&composite, &mut parent, 0).unwrap();
    /// assert_eq!(parent, array![1., 0., -1., 0., 0.]);
    ///```
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
        let factors = self.factors.get(input.shape(), &self.stencil);
        self.stencil.to_parent(factors, input, output, axis);
        self.bc.add_to_orthogonal(output, input, axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use num_complex::Complex;

    fn approx_eq<S, D>(result: &ArrayBase<S, D>, expected: &ArrayBase<S, D>)
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let dif = 1e-8;
        for (a, b) in expected.iter().zip(result.iter()) {
            if (a - b).abs() > dif {
                panic!("Large difference of values, got {} expected {}.", b, a)
            }
        }
    }

    fn random_interior(base: &Composite) -> Array1<Real> {
        let mut vhat = Array1::random(base.n, Uniform::new(-1., 1.));
        let bc = base.boundary_values().values().clone();
        let first = base.n - base.n_lift();
        vhat.slice_mut(s![first..]).assign(&bc);
        if base.variant() == Variant::Neumann {
            vhat[0] = base.mean() * PI;
        }
        vhat
    }

    fn all_bases(options: &BaseOptions) -> Vec<Composite> {
        let mut bases = Vec::new();
        for (family, variant, n) in [
            (Family::Legendre, Variant::Dirichlet, 10),
            (Family::Legendre, Variant::Neumann, 10),
            (Family::Legendre, Variant::Biharmonic, 12),
            (Family::Laguerre, Variant::Dirichlet, 10),
        ]
        .iter()
        {
            bases.push(Composite::with_options(*family, *variant, *n, options).unwrap());
        }
        bases
    }

    #[test]
    fn test_roundtrip_all_variants() {
        for pf in [1., 1.5].iter() {
            let options = BaseOptions::default().padding_factor(*pf);
            for mut base in all_bases(&options) {
                let vhat = random_interior(&base);
                let mut v = Array1::<Real>::zeros(base.m);
                let mut back = Array1::<Real>::zeros(base.n);
                base.backward(&vhat, &mut v, 0).unwrap();
                base.forward(&v, &mut back, 0).unwrap();
                approx_eq(&back, &vhat);
            }
        }
    }

    #[test]
    fn test_roundtrip_nonhomogeneous() {
        for (variant, bc) in [
            (Variant::Dirichlet, vec![1., -2.]),
            (Variant::Neumann, vec![0.5, 3.]),
            (Variant::Biharmonic, vec![1., 2., -1., 0.5]),
        ]
        .iter()
        {
            let options = BaseOptions::default()
                .bc(bc)
                .padding_factor(1.5)
                .domain(0., 3.);
            let mut base = Composite::with_options(Family::Legendre, *variant, 12, &options).unwrap();
            let vhat = random_interior(&base);
            let mut v = Array2::<Real>::zeros((2, base.m));
            let mut back = Array2::<Real>::zeros((2, base.n));
            let vhat2 = Array2::from_shape_fn((2, base.n), |(_, j)| vhat[j]);
            base.backward(&vhat2, &mut v, 1).unwrap();
            base.forward(&v, &mut back, 1).unwrap();
            approx_eq(&back, &vhat2);
        }
    }

    #[test]
    fn test_dirichlet_lifted_solution() {
        // u = x^3 + 0.5x + 2 with u(-1) = 0.5, u(1) = 3.5
        let options = BaseOptions::default().bc(&[0.5, 3.5]);
        let mut base =
            Composite::with_options(Family::Legendre, Variant::Dirichlet, 8, &options).unwrap();
        let x = base.coords().clone();
        let u = x.mapv(|x| x.powi(3) + 0.5 * x + 2.);
        let mut uhat = Array1::<Real>::zeros(8);
        let mut back = Array1::<Real>::zeros(8);
        base.forward(&u, &mut uhat, 0).unwrap();
        assert_eq!(uhat.slice(s![6..]), array![0.5, 3.5]);
        base.backward(&uhat, &mut back, 0).unwrap();
        approx_eq(&back, &u);
        let edges = base.eval(&array![-1., 1.], &uhat).unwrap();
        approx_eq(&edges, &array![0.5, 3.5]);
    }

    #[test]
    fn test_biharmonic_lifted_solution_true_domain() {
        // u = x^4 + x on (0, 4)
        let u_fn = |x: Real| x.powi(4) + x;
        let du_fn = |x: Real| 4. * x.powi(3) + 1.;
        let options = BaseOptions::default()
            .domain(0., 4.)
            .bc(&[u_fn(0.), u_fn(4.), du_fn(0.), du_fn(4.)]);
        let mut base =
            Composite::with_options(Family::Legendre, Variant::Biharmonic, 10, &options).unwrap();
        let u = base.orthogonal().mesh().mapv(u_fn);
        let mut uhat = Array1::<Real>::zeros(10);
        let mut back = Array1::<Real>::zeros(10);
        base.forward(&u, &mut uhat, 0).unwrap();
        base.backward(&uhat, &mut back, 0).unwrap();
        approx_eq(&back, &u);
        let inner = base.eval(&array![1., 2.5], &uhat).unwrap();
        approx_eq(&inner, &array![u_fn(1.), u_fn(2.5)]);
    }

    #[test]
    fn test_neumann_lifted_solution() {
        // u = x^2 + 3x, u'(-1) = 1, u'(1) = 5. The constant mode of
        // u minus its lift is 1/3, which is reproduced by mean * pi.
        let options = BaseOptions::default().bc(&[1., 5.]).mean(1. / (3. * PI));
        let mut base =
            Composite::with_options(Family::Legendre, Variant::Neumann, 8, &options).unwrap();
        let u = base.coords().mapv(|x| x * x + 3. * x);
        let mut uhat = Array1::<Real>::zeros(8);
        let mut back = Array1::<Real>::zeros(8);
        base.forward(&u, &mut uhat, 0).unwrap();
        base.backward(&uhat, &mut back, 0).unwrap();
        approx_eq(&back, &u);
    }

    #[test]
    fn test_neumann_mean_mode() {
        let options = BaseOptions::default().mean(2.);
        let mut base =
            Composite::with_options(Family::Legendre, Variant::Neumann, 10, &options).unwrap();
        let v = Array1::<Real>::from_elem(10, 3.);
        let mut vhat = Array1::<Real>::zeros(10);
        base.forward(&v, &mut vhat, 0).unwrap();
        assert!((vhat[0] - 2. * PI).abs() < 1e-12);
        approx_eq(&vhat.slice(s![1..]).to_owned(), &Array1::zeros(9));
    }

    #[test]
    fn test_legendre_dirichlet_mode0() {
        let base = Composite::new(Family::Legendre, Variant::Dirichlet, 8).unwrap();
        let phi = base.evaluate_basis(&array![-1., 0., 1.], 0).unwrap();
        approx_eq(&phi, &array![0., 1.5, 0.]);
        assert!(matches!(
            base.evaluate_basis(&array![0.], 6),
            Err(BasisError::IndexOutOfValidRange { index: 6, valid: 6 })
        ));
    }

    #[test]
    fn test_laguerre_dirichlet_mode0() {
        let base = Composite::new(Family::Laguerre, Variant::Dirichlet, 6).unwrap();
        let x = array![0., 1., 20., 60.];
        let phi = base.evaluate_basis(&x, 0).unwrap();
        // phi_0 = x exp(-x/2)
        approx_eq(&phi, &x.mapv(|x| x * (-x / 2.).exp()));
        assert!(phi[0].abs() < 1e-14);
        assert!(phi[3].abs() < phi[2].abs());
    }

    #[test]
    fn test_to_ortho_unit_vectors() {
        let legendre_x = Array1::linspace(-1., 1., 7);
        let laguerre_x = Array1::linspace(0., 12., 7);
        for (family, variant, n, scaled) in [
            (Family::Legendre, Variant::Dirichlet, 8, false),
            (Family::Legendre, Variant::Dirichlet, 8, true),
            (Family::Legendre, Variant::Neumann, 8, false),
            (Family::Legendre, Variant::Biharmonic, 10, false),
            (Family::Laguerre, Variant::Dirichlet, 8, false),
        ]
        .iter()
        {
            let x = match family {
                Family::Legendre => &legendre_x,
                Family::Laguerre => &laguerre_x,
            };
            let options = BaseOptions::default().scaled(*scaled);
            let mut base = Composite::with_options(*family, *variant, *n, &options).unwrap();
            for k in base.slice() {
                let mut e = Array1::<Real>::zeros(*n);
                e[k] = 1.;
                let mut c = Array1::<Real>::zeros(*n);
                base.to_ortho(&e, &mut c, 0).unwrap();
                let direct = base.evaluate_basis(x, k).unwrap();
                let series = family.eval_series(x, &c).unwrap();
                approx_eq(&series, &direct);
                approx_eq(&c, &base.stencil_matrix().dot(&e));
            }
        }
    }

    #[test]
    fn test_laguerre_lifted_solution() {
        // u = (2 + x) exp(-x/2) = 2 psi_0 + phi_0
        let options = BaseOptions::default().bc(&[2., 0.]);
        let mut base =
            Composite::with_options(Family::Laguerre, Variant::Dirichlet, 10, &options).unwrap();
        assert!(base.has_nonhomogeneous_bcs());
        let u = base.coords().mapv(|x| (2. + x) * (-x / 2.).exp());
        let mut uhat = Array1::<Real>::zeros(10);
        let mut back = Array1::<Real>::zeros(10);
        base.forward(&u, &mut uhat, 0).unwrap();
        assert_eq!(uhat[9], 2.);
        assert!((uhat[0] - 1.).abs() < 1e-8);
        base.backward(&uhat, &mut back, 0).unwrap();
        approx_eq(&back, &u);
        let origin = base.eval(&array![0.], &uhat).unwrap();
        approx_eq(&origin, &array![2.]);
    }

    #[test]
    fn test_quadrature_basis_matches_composite_basis() {
        let options = BaseOptions::default().bc(&[1., -1.]);
        let mut base =
            Composite::with_options(Family::Legendre, Variant::Neumann, 8, &options).unwrap();
        let v = Family::Legendre
            .function_vandermonde(base.coords(), 7, 0)
            .unwrap();
        approx_eq(base.quadrature_basis(), &base.composite_basis(&v, true).unwrap());
        let ptr = base.quadrature_basis().as_ptr();
        let uhat = Array1::<Real>::ones(8);
        let mut u = Array1::<Real>::zeros(8);
        base.backward(&uhat, &mut u, 0).unwrap();
        assert_eq!(base.quadrature_basis().as_ptr(), ptr);
        assert!(matches!(
            base.composite_basis(&Family::Legendre.vandermonde(base.coords(), 5), false),
            Err(BasisError::ShapeMismatch { expected: 8, actual: 6, .. })
        ));
    }

    #[test]
    fn test_to_ortho_lift_slots() {
        let options = BaseOptions::default().bc(&[1., 2., 3., 4.]);
        let mut base =
            Composite::with_options(Family::Legendre, Variant::Biharmonic, 8, &options).unwrap();
        let u = Array1::from_shape_fn(8, |i| i as Real);
        let mut c = Array1::<Real>::zeros(8);
        base.to_ortho(&u, &mut c, 0).unwrap();
        approx_eq(&c, &base.stencil_matrix().dot(&u));
    }

    #[test]
    fn test_to_ortho_complex_axis1() {
        let mut base = Composite::new(Family::Legendre, Variant::Dirichlet, 6).unwrap();
        let input = Array2::from_shape_fn((3, 6), |(i, j)| Complex::new(i as Real, j as Real));
        let mut output = Array2::<Complex<Real>>::zeros((3, 6));
        base.to_ortho(&input, &mut output, 1).unwrap();
        // homogeneous data, lift slots do not contribute
        let s = base.stencil().to_array();
        for (inp, out) in input.outer_iter().zip(output.outer_iter()) {
            let re = s.dot(&inp.mapv(|v| v.re));
            let im = s.dot(&inp.mapv(|v| v.im));
            approx_eq(&out.mapv(|v| v.re), &re);
            approx_eq(&out.mapv(|v| v.im), &im);
        }
    }

    #[test]
    fn test_factor_cache_keyed_on_shape() {
        let mut base = Composite::new(Family::Legendre, Variant::Neumann, 6).unwrap();
        let mut out1 = Array1::<Real>::zeros(6);
        base.to_ortho(&Array1::<Real>::ones(6), &mut out1, 0).unwrap();
        assert_eq!(base.factors.shape(), Some(&[6][..]));
        let mut out2 = Array2::<Real>::zeros((6, 2));
        base.to_ortho(&Array2::<Real>::ones((6, 2)), &mut out2, 0).unwrap();
        assert_eq!(base.factors.shape(), Some(&[6, 2][..]));
        approx_eq(&out2.column(1).to_owned(), &out1);
    }

    #[test]
    fn test_homogeneous_lift_noop() {
        let mut base = Composite::new(Family::Legendre, Variant::Dirichlet, 8).unwrap();
        let mut u = Array1::<Real>::zeros(8);
        u[6] = 5.;
        u[7] = -5.;
        let mut c = Array1::<Real>::zeros(8);
        base.to_ortho(&u, &mut c, 0).unwrap();
        approx_eq(&c, &Array1::zeros(8));
    }

    #[test]
    fn test_plan_idempotent() {
        let mut base = Composite::new(Family::Legendre, Variant::Biharmonic, 8)
            .unwrap()
            .get_dealiased(1.5, false)
            .unwrap();
        base.plan(&[12, 3], 0).unwrap();
        let ptrs = |b: &Composite| {
            b.orthogonal().plan_state().planned().map(|p| {
                (
                    p.input.as_ptr(),
                    p.output.as_ptr(),
                    p.trunc.as_ref().map(|t| t.as_ptr()),
                    p.sl,
                )
            })
        };
        let before = ptrs(&base);
        base.plan(&[12, 3], 0).unwrap();
        assert_eq!(ptrs(&base), before);
        assert!(before.and_then(|p| p.2).is_some());
    }

    #[test]
    fn test_dealias_direct_keeps_lift() {
        let options = BaseOptions::default().dealias_direct(true).bc(&[1., 1.]);
        let mut base =
            Composite::with_options(Family::Legendre, Variant::Dirichlet, 12, &options).unwrap();
        let mut vhat = Array1::<Real>::ones(12);
        let mut v = Array1::<Real>::zeros(12);
        let mut back = Array1::<Real>::zeros(12);
        base.backward(&vhat, &mut v, 0).unwrap();
        base.forward(&v, &mut back, 0).unwrap();
        vhat.slice_mut(s![8..10]).fill(0.);
        approx_eq(&back, &vhat);
    }

    #[test]
    fn test_get_refined_keeps_options() {
        let options = BaseOptions::default()
            .bc(&[1., 2.])
            .domain(-2., 2.)
            .quad("GL")
            .scaled(true);
        let base = Composite::with_options(Family::Legendre, Variant::Dirichlet, 8, &options).unwrap();
        let refined = base.get_refined(16).unwrap();
        assert_eq!(refined.len_spec(), 16);
        assert_eq!(refined.options(), base.options());
        assert_eq!(base.get_orthogonal().unwrap().variant(), Variant::Plain);
        assert_eq!(base.get_bc_basis().len(), 2);
    }

    #[test]
    fn test_invalid_composites() {
        assert!(Composite::new(Family::Legendre, Variant::Plain, 8).is_err());
        assert!(Composite::new(Family::Laguerre, Variant::Biharmonic, 8).is_err());
        let options = BaseOptions::default().bc(&[1.]);
        assert!(matches!(
            Composite::with_options(Family::Legendre, Variant::Neumann, 8, &options),
            Err(BasisError::BoundaryArityMismatch { expected: 2, actual: 1, .. })
        ));
    }
}
