//! Tri-diagonal matrix solver
use super::diag;
use super::{Solve, SolverScalar};
use ndarray::prelude::*;
use ndarray::{Data, DataMut, RemoveAxis, Zip};
use std::convert::TryInto;
use std::ops::{Add, Div, Mul};

/// Solve tridiagonal system with diagonals-offsets: -k, 0, k
///
/// Legendre mass matrices of Dirichlet and Neumann type have k = 2,
/// the Laguerre Dirichlet mass matrix has k = 1.
#[derive(Debug, Clone)]
pub struct Tdma<T> {
    /// Size of matrix (= size of main diagonal)
    pub n: usize,
    /// Distance of off-diagonals to main diagonal
    pub stride: usize,
    /// Lower diagonal (-k)
    pub low: Array1<T>,
    /// Main diagonal
    pub dia: Array1<T>,
    /// Upper diagonal (+k)
    pub upp: Array1<T>,
}

impl<T: SolverScalar> Tdma<T> {
    /// Initialize Tdma from matrix.
    /// Extracts the diagonals
    pub fn from_matrix(a: &Array2<T>, stride: usize) -> Self {
        assert!(stride > 0, "Tdma: stride must be positive");
        let k: i8 = stride.try_into().unwrap_or(i8::MAX);
        Tdma {
            n: a.shape()[0],
            stride,
            low: diag(a, -k),
            dia: diag(a, 0),
            upp: diag(a, k),
        }
    }

    fn solve_lane<A>(&self, input: &mut ArrayViewMut1<A>)
    where
        A: SolverScalar + Div<T, Output = A> + Mul<T, Output = A> + Add<T, Output = A>,
    {
        self.tdma(input);
    }

    /// Tridiagonal matrix solver
    ///     Ax = d
    /// where A is banded with diagonals in offsets -k, 0, k
    ///
    /// a: sub-diagonal (-k)
    /// b: main-diagonal (0)
    /// c: sub-diagonal (+k)
    #[allow(clippy::many_single_char_names)]
    fn tdma<A>(&self, d: &mut ArrayViewMut1<A>)
    where
        A: SolverScalar + Div<T, Output = A> + Mul<T, Output = A> + Add<T, Output = A>,
    {
        let n = d.len();
        let k = self.stride;
        let a = self.low.view();
        let b = self.dia.view();
        let c = self.upp.view();
        let mut w = vec![T::zero(); n.saturating_sub(k)];
        let mut g = vec![A::zero(); n];

        // Forward sweep
        for i in 0..n {
            if i < k {
                g[i] = d[i] / b[i];
                if i + k < n {
                    w[i] = c[i] / b[i];
                }
            } else {
                let denom = b[i] - a[i - k] * w[i - k];
                g[i] = (d[i] - g[i - k] * a[i - k]) / denom;
                if i + k < n {
                    w[i] = c[i] / denom;
                }
            }
        }

        // Back substitution
        for i in (0..n).rev() {
            if i + k < n {
                d[i] = g[i] - d[i + k] * w[i];
            } else {
                d[i] = g[i];
            }
        }
    }
}

impl<T, A, D> Solve<A, D> for Tdma<T>
where
    T: SolverScalar,
    A: SolverScalar + Div<T, Output = A> + Mul<T, Output = A> + Add<T, Output = A> + From<T>,
    D: Dimension + RemoveAxis,
{
    /// # Example
    ///```
    /// use shenspace::solver::Tdma;
    /// use shenspace::solver::Solve;
    /// use ndarray::prelude::*;
    /// let nx =  6;
    /// let mut data = Array1::<f64>::zeros(nx);
    /// let mut result = Array1::<f64>::zeros(nx);
    /// let mut matrix = Array2::<f64>::zeros((nx,nx));
    /// for (i, v) in data.iter_mut().enumerate() {
    ///     *v = i as f64;
    /// }
    /// for i in 0..nx {
    ///     let j = (i+1) as f64;
    ///     matrix[[i,i]] = 0.5*j;
    ///     if i>1 {
    ///         matrix[[i,i-2]] = 10.*j;
    ///     }
    ///     if i<nx-2 {
    ///         matrix[[i,i+2]] = 1.5*j;
    ///     }
    /// }
    /// let solver = Tdma::from_matrix(&matrix, 2);
    /// solver.solve(&data, &mut result,0);
    /// let recover = matrix.dot(&result);
    /// for (a, b) in recover.iter().zip(data.iter()) {
    ///     if (a - b).abs() > 1e-4 {
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
        output.assign(input);
        Zip::from(output.lanes_mut(Axis(axis))).for_each(|mut out| {
            self.solve_lane(&mut out);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
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

    fn approx_eq_complex<S, D>(result: &ArrayBase<S, D>, expected: &ArrayBase<S, D>)
    where
        S: Data<Elem = Complex<f64>>,
        D: Dimension,
    {
        let dif = 1e-8;
        for (a, b) in expected.iter().zip(result.iter()) {
            if (a.re - b.re).abs() > dif || (a.im - b.im).abs() > dif {
                panic!("Large difference of values, got {} expected {}.", b, a)
            }
        }
    }

    fn banded(nx: usize, k: usize) -> Array2<f64> {
        let mut matrix = Array2::<f64>::zeros((nx, nx));
        for i in 0..nx {
            let j = (i + 1) as f64;
            matrix[[i, i]] = 20. * j;
            if i >= k {
                matrix[[i, i - k]] = 1.5 * j;
            }
            if i + k < nx {
                matrix[[i, i + k]] = 2.5 * j;
            }
        }
        matrix
    }

    #[test]
    fn test_tdma_dim1() {
        let nx = 6;
        let data = Array1::from_shape_fn(nx, |i| i as f64);
        let mut result = Array1::<f64>::zeros(nx);
        let matrix = banded(nx, 2);
        let solver = Tdma::from_matrix(&matrix, 2);
        solver.solve(&data, &mut result, 0);
        let recover: Array1<f64> = matrix.dot(&result);
        approx_eq(&recover, &data);
    }

    #[test]
    fn test_tdma_stride_one() {
        let nx = 7;
        let data = Array1::from_shape_fn(nx, |i| (i as f64).sin());
        let mut result = Array1::<f64>::zeros(nx);
        let matrix = banded(nx, 1);
        let solver = Tdma::from_matrix(&matrix, 1);
        solver.solve(&data, &mut result, 0);
        let recover: Array1<f64> = matrix.dot(&result);
        approx_eq(&recover, &data);
    }

    #[test]
    fn test_tdma_small() {
        // Offdiagonals vanish if the size does not exceed the stride
        let matrix = array![[2., 0.], [0., 4.]];
        let data = array![1., 1.];
        let mut result = Array1::<f64>::zeros(2);
        Tdma::from_matrix(&matrix, 2).solve(&data, &mut result, 0);
        approx_eq(&result, &array![0.5, 0.25]);
    }

    #[test]
    fn test_tdma_dim2_axis1() {
        let (nx, ny) = (4, 8);
        let data = Array2::from_shape_fn((nx, ny), |(i, j)| (i * ny + j) as f64);
        let mut result = Array2::<f64>::zeros((nx, ny));
        let matrix = banded(ny, 2);
        let solver = Tdma::from_matrix(&matrix, 2);
        solver.solve(&data, &mut result, 1);
        for i in 0..nx {
            let recover = matrix.dot(&result.row(i));
            approx_eq(&recover, &data.row(i).to_owned());
        }
    }

    #[test]
    fn test_tdma_dim1_complex() {
        let nx = 6;
        let mut data = Array1::<Complex<f64>>::zeros(nx);
        let mut result = Array1::<Complex<f64>>::zeros(nx);
        let mut matrix = Array2::<Complex<f64>>::zeros((nx, nx));
        for (i, v) in data.iter_mut().enumerate() {
            v.re = (i + 0) as f64;
            v.im = (i + 1) as f64;
        }
        for i in 0..nx {
            let j = (i + 1) as f64;
            matrix[[i, i]].re = 0.5 * j;
            matrix[[i, i]].im = 0.5 * j;
            if i > 1 {
                matrix[[i, i - 2]].re = 10. * j;
                matrix[[i, i - 2]].im = 10. * j;
            }
            if i < nx - 2 {
                matrix[[i, i + 2]].re = 1.5 * j;
                matrix[[i, i + 2]].im = 1.5 * j;
            }
        }
        let solver = Tdma::<Complex<f64>>::from_matrix(&matrix, 2);
        solver.solve(&data, &mut result, 0);
        let recover: Array1<Complex<f64>> = matrix.dot(&result);
        approx_eq_complex(&recover, &data);
    }
}
