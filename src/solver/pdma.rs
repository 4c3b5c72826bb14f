//! Penta-diagonal matrix solver
use super::diag;
use super::{Solve, SolverScalar};
use ndarray::prelude::*;
use ndarray::{Data, DataMut, RemoveAxis, Zip};
use std::convert::TryInto;
use std::ops::{Add, Div, Mul};

/// Solve banded system with diagonals-offsets: -2k, -k, 0, k, 2k
///
/// The Legendre biharmonic mass matrix has this structure with k = 2.
#[derive(Debug, Clone)]
pub struct Pdma<T> {
    /// Size of matrix (= size of main diagonal)
    pub n: usize,
    /// Distance of neighbouring diagonals
    pub stride: usize,
    /// Lower diagonal (-2k)
    pub low2: Array1<T>,
    /// Lower diagonal (-k)
    pub low1: Array1<T>,
    /// Main diagonal
    pub dia: Array1<T>,
    /// Upper diagonal (+k)
    pub up1: Array1<T>,
    /// Upper diagonal (+2k)
    pub up2: Array1<T>,
    /// ensure forward sweep is performed before solve
    sweeped: bool,
}

impl<T> Pdma<T>
where
    T: SolverScalar,
{
    /// Initialize Pdma from matrix.
    /// Extracts the diagonals.
    /// Precomputes the forward sweep.
    pub fn from_matrix(a: &Array2<T>, stride: usize) -> Self {
        let mut pdma = Pdma::from_matrix_raw(a, stride);
        pdma.sweep();
        pdma
    }

    /// Initialize Pdma from matrix.
    /// Extracts only diagonals; no forward sweep is performed.
    pub fn from_matrix_raw(a: &Array2<T>, stride: usize) -> Self {
        assert!(stride > 0, "Pdma: stride must be positive");
        let k: i8 = stride.try_into().unwrap_or(i8::MAX / 2);
        Pdma {
            n: a.shape()[0],
            stride,
            low2: diag(a, -2 * k),
            low1: diag(a, -k),
            dia: diag(a, 0),
            up1: diag(a, k),
            up2: diag(a, 2 * k),
            sweeped: false,
        }
    }

    /// Precompute forward sweep (banded LU decomposition without pivoting).
    /// Afterwards low1 and low2 hold the multipliers of L, while dia,
    /// up1 and up2 hold the diagonals of U.
    pub fn sweep(&mut self) {
        let k = self.stride;
        for i in 0..self.n {
            if i >= 2 * k {
                self.low2[i - 2 * k] /= self.dia[i - 2 * k];
            }
            if i >= k {
                let mut l1 = self.low1[i - k];
                if i >= 2 * k {
                    l1 -= self.low2[i - 2 * k] * self.up1[i - 2 * k];
                }
                self.low1[i - k] = l1 / self.dia[i - k];
            }
            if i >= 2 * k {
                self.dia[i] -= self.low2[i - 2 * k] * self.up2[i - 2 * k];
            }
            if i >= k {
                self.dia[i] -= self.low1[i - k] * self.up1[i - k];
                if i + k < self.n {
                    self.up1[i] -= self.low1[i - k] * self.up2[i - k];
                }
            }
        }
        self.sweeped = true;
    }

    fn solve_lane<A>(&self, input: &mut ArrayViewMut1<A>)
    where
        A: SolverScalar + Div<T, Output = A> + Mul<T, Output = A> + Add<T, Output = A>,
    {
        self.pdma(input);
    }

    /// Banded matrix solver
    ///     Ax = b
    /// where A is banded with diagonals in offsets -2k, -k, 0, k, 2k
    #[allow(clippy::assign_op_pattern)]
    pub fn pdma<A>(&self, x: &mut ArrayViewMut1<A>)
    where
        A: SolverScalar + Div<T, Output = A> + Mul<T, Output = A> + Add<T, Output = A>,
    {
        let n = self.n;
        let k = self.stride;

        for i in k..n {
            x[i] = x[i] - x[i - k] * self.low1[i - k];
            if i >= 2 * k {
                x[i] = x[i] - x[i - 2 * k] * self.low2[i - 2 * k];
            }
        }

        for i in (0..n).rev() {
            if i + k < n {
                x[i] = x[i] - x[i + k] * self.up1[i];
            }
            if i + 2 * k < n {
                x[i] = x[i] - x[i + 2 * k] * self.up2[i];
            }
            x[i] = x[i] / self.dia[i];
        }
    }
}

impl<T, A, D> Solve<A, D> for Pdma<T>
where
    T: SolverScalar,
    A: SolverScalar + Div<T, Output = A> + Mul<T, Output = A> + Add<T, Output = A> + From<T>,
    D: Dimension + RemoveAxis,
{
    /// # Example
    ///```
    /// use shenspace::solver::Pdma;
    /// use shenspace::solver::Solve;
    /// use ndarray::prelude::*;
    /// let nx =  9;
    /// let data = Array1::from_shape_fn(nx, |i| i as f64);
    /// let mut result = Array1::<f64>::zeros(nx);
    /// let mut matrix = Array2::<f64>::zeros((nx,nx));
    /// for i in 0..nx {
    ///     let j = (i+1) as f64;
    ///     matrix[[i,i]] = 10.*j;
    ///     if i>1 {
    ///         matrix[[i,i-2]] = 1.5*j;
    ///     }
    ///     if i>3 {
    ///         matrix[[i,i-4]] = 0.5*j;
    ///     }
    ///     if i+2<nx {
    ///         matrix[[i,i+2]] = 2.5*j;
    ///     }
    ///     if i+4<nx {
    ///         matrix[[i,i+4]] = 1.*j;
    ///     }
    /// }
    /// let solver = Pdma::from_matrix(&matrix, 2);
    /// solver.solve(&data, &mut result,0);
    /// let recover = matrix.dot(&result);
    /// for (a, b) in recover.iter().zip(data.iter()) {
    ///     if (a - b).abs() > 1e-8 {
    ///         panic!("Large difference of values, got {} expected {}.", b, a)
    ///     }
    /// }
    ///```
    fn solve<S1: Data<Elem = A>, S2: Data<Elem = A> + DataMut>(
        &self,
        input: &ArrayBase<S1, D>,
        output: &mut ArrayBase<S2, D>,
        axis: usize,
    ) {
        assert!(
            self.sweeped,
            "Pdma: Forward sweep must be performed for solve! Abort."
        );
        output.assign(input);
        Zip::from(output.lanes_mut(Axis(axis))).for_each(|mut out| {
            self.solve_lane(&mut out);
        });
    }
}
