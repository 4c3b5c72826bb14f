//! # Collection of linear algebra Solver
//!
//! Banded solvers for the mass matrices of composite bases.
pub mod pdma;
pub mod tdma;
pub mod utils;
use crate::Real;
use ndarray::prelude::*;
use ndarray::{Data, DataMut, Slice, Zip};
pub use pdma::Pdma;
pub use tdma::Tdma;
use utils::diag;

/// Combination of linear algebra traits
pub trait SolverScalar:
    ndarray::LinalgScalar
    + std::ops::SubAssign
    + std::ops::DivAssign
    + From<f64>
    + num_traits::Zero
    + num_traits::One
    + std::marker::Copy
    + std::ops::Div
    + std::ops::Sub
{
}
impl<T> SolverScalar for T where
    T: ndarray::LinalgScalar
        + std::ops::SubAssign
        + std::ops::DivAssign
        + From<f64>
        + num_traits::Zero
        + num_traits::One
        + std::marker::Copy
        + std::ops::Div
        + std::ops::Sub
{
}

/// Solve linear algebraix systems of the form: M x = b.
pub trait Solve<A, D> {
    /// Solves M x = b, returns x, which is of type A
    /// Output (x) matches input (b) in type and size.
    fn solve<S1, S2>(&self, input: &ArrayBase<S1, D>, output: &mut ArrayBase<S2, D>, axis: usize)
    where
        A: SolverScalar,
        S1: Data<Elem = A>,
        S2: Data<Elem = A> + DataMut;
}

/// Inverse of a (quadrature) mass matrix.
///
/// Orthogonal bases have a diagonal mass matrix, composite bases a banded one.
#[derive(Debug, Clone)]
pub enum MassSolver {
    /// Diagonal matrix
    Diagonal(Array1<Real>),
    /// Three diagonals with offsets -k, 0, k
    Tdma(Tdma<Real>),
    /// Five diagonals with offsets -2k, -k, 0, k, 2k
    Pdma(Pdma<Real>),
}

impl MassSolver {
    /// Diagonal solver from main diagonal of mass
    pub fn diagonal(mass: &Array2<Real>) -> Self {
        MassSolver::Diagonal(diag(mass, 0))
    }

    /// Pick banded solver from the number of nonzero neighbouring
    /// diagonals (`bands`) and their distance (`stride`).
    pub fn banded(mass: &Array2<Real>, stride: usize, bands: usize) -> Self {
        match bands {
            0 => Self::diagonal(mass),
            1 => MassSolver::Tdma(Tdma::from_matrix(mass, stride)),
            _ => MassSolver::Pdma(Pdma::from_matrix(mass, stride)),
        }
    }

    /// Size of the system
    pub fn len(&self) -> usize {
        match self {
            MassSolver::Diagonal(d) => d.len(),
            MassSolver::Tdma(s) => s.n,
            MassSolver::Pdma(s) => s.n,
        }
    }

    /// Size is zero
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Solve M x = b in-place for the leading `self.len()` entries along
    /// `axis`. Trailing entries are untouched.
    pub fn solve_leading<S, D>(&self, data: &mut ArrayBase<S, D>, axis: usize)
    where
        S: Data<Elem = Real> + DataMut,
        D: Dimension + ndarray::RemoveAxis,
    {
        let n = self.len();
        let mut lead = data.slice_axis_mut(Axis(axis), Slice::from(0..n));
        let rhs = lead.to_owned();
        match self {
            MassSolver::Diagonal(d) => {
                Zip::from(lead.lanes_mut(Axis(axis)))
                    .and(rhs.lanes(Axis(axis)))
                    .for_each(|mut out, inp| {
                        Zip::from(&mut out)
                            .and(&inp)
                            .and(d)
                            .for_each(|o, &i, &m| *o = i / m);
                    });
            }
            MassSolver::Tdma(s) => s.solve(&rhs, &mut lead, axis),
            MassSolver::Pdma(s) => s.solve(&rhs, &mut lead, axis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_solver_leading() {
        let mass = array![[2., 0., 1.], [0., 4., 0.], [1., 0., 5.]];
        let solver = MassSolver::banded(&mass, 2, 1);
        let mut data = array![[3., 4., 6., 9.], [3., 4., 6., 9.]];
        solver.solve_leading(&mut data, 1);
        for row in data.outer_iter() {
            let x = row.slice(s![..3]).to_owned();
            let b = mass.dot(&x);
            assert!((b[0] - 3.).abs() < 1e-12);
            assert!((b[1] - 4.).abs() < 1e-12);
            assert!((b[2] - 6.).abs() < 1e-12);
            assert!((row[3] - 9.).abs() < 1e-15);
        }
    }

    #[test]
    fn test_mass_solver_diagonal() {
        let mass = Array2::from_diag(&array![1., 2., 4.]);
        let solver = MassSolver::banded(&mass, 1, 0);
        let mut data = array![2., 2., 2.];
        solver.solve_leading(&mut data, 0);
        assert_eq!(data, array![2., 1., 0.5]);
        assert_eq!(solver.len(), 3);
    }
}
