//! Collection of usefull algebra methods
use ndarray::LinalgScalar;
use ndarray::{Array1, Array2};

/// Return the diagonal of a two-dimensional array.
/// Parameter offset defines which diagonal is returned.
/// An offset which exceeds the size yields an empty diagonal.
///
/// ```
/// use shenspace::solver::utils::diag;
/// use ndarray::array;
/// let a = array![[1., 2., 0.], [3., 4., 5.], [0., 6., 7.]];
/// assert_eq!(diag(&a, 1), array![2., 5.]);
/// assert_eq!(diag(&a, -1), array![3., 6.]);
/// assert_eq!(diag(&a, 4).len(), 0);
/// ```
pub fn diag<T: LinalgScalar>(a: &Array2<T>, offset: i8) -> Array1<T> {
    assert!(
        a.is_square(),
        "Array for method diag() must be square, but has shape {:?}",
        a.shape()
    );
    let n: usize = a.shape()[0];
    let m = offset.unsigned_abs() as usize;
    let mut diag: Array1<T> = Array1::zeros(n.saturating_sub(m));
    if offset >= 0 {
        for (i, d) in &mut diag.iter_mut().enumerate() {
            *d = a[[i, i + m]];
        }
    } else {
        for (i, d) in &mut diag.iter_mut().enumerate() {
            *d = a[[i + m, i]];
        }
    }
    diag
}
