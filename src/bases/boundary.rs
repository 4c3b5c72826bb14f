//! # Boundary
//! Lifting of nonhomogeneous boundary conditions.
//!
//! A composite basis with boundary data reserves its trailing K slots for
//! K lift functions psi, which are low order combinations of the primary
//! functions. Their coefficients in spectral space are exactly the
//! boundary values.
//!
//! dirichlet (legendre):
//!     psi_0 = 0.5*P_0 - 0.5*P_1
//!     psi_1 = 0.5*P_0 + 0.5*P_1
//!
//! neumann (legendre):
//!     psi_0 = 0.5*P_1 - 1/6*P_2
//!     psi_1 = 0.5*P_1 + 1/6*P_2
//!
//! dirichlet (laguerre):
//!     psi_0 = L_0
use super::family::Family;
use super::plan::SliceMap;
use super::stencil::{Boundary, Stencil, Variant};
use crate::error::{BasisError, Result};
use crate::Real;
use ndarray::prelude::*;
use ndarray::{Data, DataMut, LinalgScalar, Zip};

/// Coefficient matrix C (lift functions x primary functions).
///
/// Laguerre functions support Dirichlet lifting only.
pub fn coefficient_matrix(family: Family, boundary: Boundary) -> Array2<Real> {
    match (family, boundary) {
        (Family::Laguerre, _) => array![[1.]],
        (Family::Legendre, Boundary::Dirichlet) => array![[0.5, -0.5], [0.5, 0.5]],
        (Family::Legendre, Boundary::Neumann) => {
            array![[0., 0.5, -1. / 6.], [0., 0.5, 1. / 6.]]
        }
        (Family::Legendre, Boundary::Biharmonic) => array![
            [0.5, -0.6, 0., 0.1],
            [0.5, 0.6, 0., -0.1],
            [1. / 6., -0.1, -1. / 6., 0.1],
            [-1. / 6., -0.1, 1. / 6., 0.1]
        ],
    }
}

/// Basis of lift functions
#[derive(Debug, Clone)]
pub struct BcBasis {
    family: Family,
    boundary: Boundary,
    stencil: Stencil,
}

impl BcBasis {
    /// Return lift basis of family and boundary type
    ///
    /// # Example
    ///```
    /// use shenspace::bases::{BcBasis, Boundary, Family};
    /// let bc = BcBasis::new(Family::Legendre, Boundary::Biharmonic).unwrap();
    /// assert_eq!(bc.len(), 4);
    /// assert_eq!(bc.degree(), 3);
    ///```
    pub fn new(family: Family, boundary: Boundary) -> Result<Self> {
        let n = coefficient_matrix(family, boundary).nrows();
        let stencil = Stencil::new(family, Variant::BcLift(boundary), false, n)?;
        Ok(BcBasis {
            family,
            boundary,
            stencil,
        })
    }

    /// Boundary type
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Number of lift functions
    pub fn len(&self) -> usize {
        self.stencil.len()
    }

    /// Has no lift functions
    pub fn is_empty(&self) -> bool {
        self.stencil.is_empty()
    }

    /// Highest primary function involved
    pub fn degree(&self) -> usize {
        self.coefficients().ncols() - 1
    }

    /// Coefficient matrix C (lift functions x primary functions)
    pub fn coefficients(&self) -> Array2<Real> {
        self.stencil.to_array().reversed_axes()
    }

    /// Primary Vandermonde matrix up to `degree`
    pub fn vandermonde(&self, x: &Array1<Real>) -> Array2<Real> {
        self.family.vandermonde(x, self.degree())
    }

    /// Lift functions (or their k-th derivative) at `x`, which may be
    /// computed from any Vandermonde matrix of at least `degree + 1` columns.
    pub fn composite_basis(&self, v: &Array2<Real>) -> Result<Array2<Real>> {
        self.stencil.composite_basis(v)
    }

    /// Evaluate all lift functions at `x` (reference domain)
    pub fn evaluate_basis_all(&self, x: &Array1<Real>) -> Result<Array2<Real>> {
        self.evaluate_basis_derivative_all(x, 0)
    }

    /// Evaluate k-th derivative of all lift functions at `x` (reference domain)
    pub fn evaluate_basis_derivative_all(&self, x: &Array1<Real>, k: usize) -> Result<Array2<Real>> {
        let v = self.family.function_vandermonde(x, self.degree(), k)?;
        self.composite_basis(&v)
    }

    /// Evaluate lift function i at `x`
    pub fn evaluate_basis(&self, x: &Array1<Real>, i: usize) -> Result<Array1<Real>> {
        self.evaluate_basis_derivative(x, i, 0)
    }

    /// Evaluate k-th derivative of lift function i at `x`
    pub fn evaluate_basis_derivative(&self, x: &Array1<Real>, i: usize, k: usize) -> Result<Array1<Real>> {
        if i >= self.len() {
            return Err(BasisError::IndexOutOfValidRange {
                index: i,
                valid: self.len(),
            });
        }
        Ok(self
            .evaluate_basis_derivative_all(x, k)?
            .column(i)
            .to_owned())
    }
}

/// Prescribed boundary values of a composite basis
#[derive(Debug, Clone)]
pub struct BoundaryValues {
    basis: BcBasis,
    /// As given by the user
    given: Vec<Real>,
    /// Coefficients of the lift functions
    values: Array1<Real>,
    /// Mass coupling of interior and lift functions
    addmass: Array2<Real>,
}

impl BoundaryValues {
    /// Return boundary values. `None` stands for homogeneous data.
    ///
    /// Derivative values are given with respect to the true coordinate,
    /// `domain_factor` converts them to the reference coordinate.
    ///
    /// # Errors
    /// `BoundaryArityMismatch` for the wrong number of values,
    /// `InvalidParameter` for a nonzero Laguerre value at infinity.
    pub fn new(
        family: Family,
        boundary: Boundary,
        bc: Option<&[Real]>,
        domain_factor: Real,
    ) -> Result<Self> {
        let basis = BcBasis::new(family, boundary)?;
        let given: Vec<Real> = match bc {
            Some(bc) => bc.to_vec(),
            None => vec![0.; boundary.arity()],
        };
        if given.len() != boundary.arity() {
            return Err(BasisError::BoundaryArityMismatch {
                variant: boundary.name().to_string(),
                expected: boundary.arity(),
                actual: given.len(),
            });
        }
        let values = match (family, boundary) {
            (Family::Laguerre, _) => {
                if given[1] != 0. {
                    return Err(BasisError::invalid(
                        "bc",
                        format!("laguerre functions vanish at infinity, got {}", given[1]),
                    ));
                }
                array![given[0]]
            }
            (_, Boundary::Dirichlet) => Array1::from(given.clone()),
            (_, Boundary::Neumann) => Array1::from(given.clone()) * domain_factor,
            (_, Boundary::Biharmonic) => array![
                given[0],
                given[1],
                given[2] * domain_factor,
                given[3] * domain_factor
            ],
        };
        let k = basis.len();
        Ok(BoundaryValues {
            basis,
            given,
            values,
            addmass: Array2::zeros((0, k)),
        })
    }

    /// Couple lift functions to interior functions.
    ///
    /// `interior` holds the interior functions at the quadrature points
    /// `x` with weights `w`; `skip` leading rows are left uncoupled.
    pub fn coupled(
        mut self,
        interior: &Array2<Real>,
        x: &Array1<Real>,
        w: &Array1<Real>,
        skip: usize,
    ) -> Result<Self> {
        let psi = self.basis.evaluate_basis_all(x)?;
        let weighted = &interior.t() * w;
        let mut addmass = weighted.dot(&psi);
        for mut row in addmass.outer_iter_mut().take(skip) {
            row.fill(0.);
        }
        self.addmass = addmass;
        Ok(self)
    }

    /// Lift basis
    pub fn bc_basis(&self) -> &BcBasis {
        &self.basis
    }

    /// Boundary values as given
    pub fn bc(&self) -> &[Real] {
        &self.given
    }

    /// Coefficients of the lift functions
    pub fn values(&self) -> &Array1<Real> {
        &self.values
    }

    /// Number of lift slots
    pub fn len(&self) -> usize {
        self.basis.len()
    }

    /// No lift slots
    pub fn is_empty(&self) -> bool {
        self.basis.is_empty()
    }

    /// Any boundary value is nonzero
    pub fn has_nonhomogeneous_bcs(&self) -> bool {
        self.values.iter().any(|v| *v != 0.)
    }

    fn check_len<S, D>(&self, data: &ArrayBase<S, D>, axis: usize, min: usize) -> Result<usize>
    where
        S: Data,
        D: Dimension,
    {
        if axis >= data.ndim() {
            return Err(BasisError::invalid(
                "axis",
                format!("axis {} out of bounds for {} dimensions", axis, data.ndim()),
            ));
        }
        let len = data.shape()[axis];
        if len < min {
            return Err(BasisError::ShapeMismatch {
                axis,
                expected: min,
                actual: len,
            });
        }
        Ok(len)
    }

    /// Write the boundary values into the trailing slots along `axis`.
    pub fn set_boundary_dofs<S, D>(&self, u: &mut ArrayBase<S, D>, axis: usize) -> Result<()>
    where
        S: Data<Elem = Real> + DataMut,
        D: Dimension,
    {
        self.check_len(u, axis, self.len())?;
        let sl = SliceMap::new(axis, u.ndim());
        let k = self.len() as isize;
        for (b, v) in self.values.iter().enumerate() {
            sl.index_mut(u, b as isize - k).fill(*v);
        }
        Ok(())
    }

    /// Subtract the lift contribution M_{interior,lift} bc from the
    /// projected right hand side of the mass system.
    pub fn add_mass_rhs<S, D>(&self, u: &mut ArrayBase<S, D>, axis: usize) -> Result<()>
    where
        S: Data<Elem = Real> + DataMut,
        D: Dimension,
    {
        if !self.has_nonhomogeneous_bcs() {
            return Ok(());
        }
        self.check_len(u, axis, self.addmass.nrows())?;
        let rhs = self.addmass.dot(&self.values);
        Zip::from(u.lanes_mut(Axis(axis))).for_each(|mut lane| {
            for (l, r) in lane.iter_mut().zip(rhs.iter()) {
                *l -= *r;
            }
        });
        Ok(())
    }

    /// Add the orthogonal coefficients of the lift functions, weighted
    /// by the trailing slots of `input`, to `output`.
    pub fn add_to_orthogonal<T, S1, S2, D>(
        &self,
        output: &mut ArrayBase<S2, D>,
        input: &ArrayBase<S1, D>,
        axis: usize,
    ) -> Result<()>
    where
        T: LinalgScalar,
        f64: Into<T>,
        S1: Data<Elem = T>,
        S2: Data<Elem = T> + DataMut,
        D: Dimension,
    {
        if !self.has_nonhomogeneous_bcs() {
            return Ok(());
        }
        let c = self.basis.coefficients();
        let len = self.check_len(input, axis, self.len())?;
        self.check_len(output, axis, c.ncols())?;
        let first = len - self.len();
        Zip::from(output.lanes_mut(Axis(axis)))
            .and(input.lanes(Axis(axis)))
            .for_each(|mut o, i| {
                for (b, row) in c.outer_iter().enumerate() {
                    for (j, cj) in row.iter().enumerate() {
                        o[j] = o[j] + (*cj).into() * i[first + b];
                    }
                }
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq<S, D>(result: &ArrayBase<S, D>, expected: &ArrayBase<S, D>)
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let dif = 1e-10;
        for (a, b) in expected.iter().zip(result.iter()) {
            if (a - b).abs() > dif {
                panic!("Large difference of values, got {} expected {}.", b, a)
            }
        }
    }

    #[test]
    fn test_dirichlet_lift_values() {
        let bc = BcBasis::new(Family::Legendre, Boundary::Dirichlet).unwrap();
        let psi = bc.evaluate_basis_all(&array![-1., 1.]).unwrap();
        approx_eq(&psi, &Array2::eye(2));
    }

    #[test]
    fn test_neumann_lift_derivatives() {
        let bc = BcBasis::new(Family::Legendre, Boundary::Neumann).unwrap();
        let dpsi = bc.evaluate_basis_derivative_all(&array![-1., 1.], 1).unwrap();
        approx_eq(&dpsi, &Array2::eye(2));
    }

    #[test]
    fn test_biharmonic_lift_values_and_derivatives() {
        let bc = BcBasis::new(Family::Legendre, Boundary::Biharmonic).unwrap();
        let x = array![-1., 1.];
        let psi = bc.evaluate_basis_all(&x).unwrap();
        let dpsi = bc.evaluate_basis_derivative_all(&x, 1).unwrap();
        // rows: u(-1), u(1), u'(-1), u'(1)
        let mut m = Array2::<Real>::zeros((4, 4));
        m.slice_mut(s![0..2, ..]).assign(&psi);
        m.slice_mut(s![2..4, ..]).assign(&dpsi);
        approx_eq(&m, &Array2::eye(4));
    }

    #[test]
    fn test_laguerre_lift() {
        let bc = BcBasis::new(Family::Laguerre, Boundary::Dirichlet).unwrap();
        let x = array![0., 2.];
        let psi = bc.evaluate_basis(&x, 0).unwrap();
        approx_eq(&psi, &array![1., (-1.0 as Real).exp()]);
        assert!(matches!(
            bc.evaluate_basis(&x, 1),
            Err(BasisError::IndexOutOfValidRange { index: 1, valid: 1 })
        ));
    }

    #[test]
    fn test_boundary_arity() {
        let err = BoundaryValues::new(Family::Legendre, Boundary::Biharmonic, Some(&[1., 2.]), 1.)
            .unwrap_err();
        assert_eq!(
            err,
            BasisError::BoundaryArityMismatch {
                variant: "biharmonic".to_string(),
                expected: 4,
                actual: 2
            }
        );
        let err = BoundaryValues::new(Family::Laguerre, Boundary::Dirichlet, Some(&[1., 2.]), 1.)
            .unwrap_err();
        assert!(matches!(err, BasisError::InvalidParameter { .. }));
    }

    #[test]
    fn test_derivative_values_rescaled() {
        let bv = BoundaryValues::new(
            Family::Legendre,
            Boundary::Biharmonic,
            Some(&[1., 2., 3., 4.]),
            0.5,
        )
        .unwrap();
        assert_eq!(bv.values(), &array![1., 2., 1.5, 2.]);
        assert_eq!(bv.bc(), &[1., 2., 3., 4.]);
    }

    #[test]
    fn test_homogeneous_is_noop() {
        let bv = BoundaryValues::new(Family::Legendre, Boundary::Dirichlet, None, 1.).unwrap();
        assert!(!bv.has_nonhomogeneous_bcs());
        let input = Array2::from_shape_fn((6, 3), |(i, j)| (i + j) as Real);
        let mut output = input.clone();
        bv.add_to_orthogonal(&mut output, &input, 0).unwrap();
        assert_eq!(output, input);
        let mut rhs = input.clone();
        bv.add_mass_rhs(&mut rhs, 0).unwrap();
        assert_eq!(rhs, input);
    }

    #[test]
    fn test_set_boundary_dofs_axis1() {
        let bv = BoundaryValues::new(Family::Legendre, Boundary::Dirichlet, Some(&[-1., 3.]), 1.)
            .unwrap();
        let mut u = Array2::<Real>::ones((3, 5));
        bv.set_boundary_dofs(&mut u, 1).unwrap();
        for row in u.outer_iter() {
            assert_eq!(row, array![1., 1., 1., -1., 3.]);
        }
        let mut short = Array2::<Real>::ones((3, 1));
        assert!(matches!(
            bv.set_boundary_dofs(&mut short, 1),
            Err(BasisError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_axis_out_of_bounds() {
        let bv = BoundaryValues::new(Family::Legendre, Boundary::Dirichlet, Some(&[1., 2.]), 1.)
            .unwrap()
            .coupled(&Array2::eye(3), &array![-0.5, 0., 0.5], &array![1., 1., 1.], 0)
            .unwrap();
        let mut u = Array2::<Real>::zeros((3, 5));
        assert!(matches!(
            bv.set_boundary_dofs(&mut u, 2),
            Err(BasisError::InvalidParameter { name: "axis", .. })
        ));
        assert!(matches!(
            bv.add_mass_rhs(&mut u, 2),
            Err(BasisError::InvalidParameter { name: "axis", .. })
        ));
        let input = u.clone();
        assert!(matches!(
            bv.add_to_orthogonal(&mut u, &input, 2),
            Err(BasisError::InvalidParameter { name: "axis", .. })
        ));
    }

    #[test]
    fn test_add_to_orthogonal() {
        let bv = BoundaryValues::new(Family::Legendre, Boundary::Dirichlet, Some(&[2., 4.]), 1.)
            .unwrap();
        // composite coefficients with lift slots (2, 4)
        let input = array![0., 0., 0., 2., 4.];
        let mut output = Array1::<Real>::zeros(5);
        bv.add_to_orthogonal(&mut output, &input, 0).unwrap();
        // 2 * (1-x)/2 + 4 * (1+x)/2 = 3 + x
        approx_eq(&output, &array![3., 1., 0., 0., 0.]);
    }
}
