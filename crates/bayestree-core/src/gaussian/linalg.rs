//! Dense symmetric positive definite solves on `ndarray`.

use crate::types::BayesTreeError;
use ndarray::{Array1, Array2};

/// Lower Cholesky factor `L` with `a = L Lᵀ`.
pub(crate) fn cholesky(a: &Array2<f64>) -> Result<Array2<f64>, BayesTreeError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(BayesTreeError::NotPositiveDefinite);
    }
    let mut l = Array2::<f64>::zeros((n, n));
    for j in 0..n {
        let mut diagonal = a[[j, j]];
        for k in 0..j {
            diagonal -= l[[j, k]] * l[[j, k]];
        }
        if !diagonal.is_finite() || diagonal <= 0.0 {
            return Err(BayesTreeError::NotPositiveDefinite);
        }
        let pivot = diagonal.sqrt();
        l[[j, j]] = pivot;
        for i in (j + 1)..n {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = sum / pivot;
        }
    }
    Ok(l)
}

/// Solve `a x = b` for every column of `b`.
pub(crate) fn solve_spd(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>, BayesTreeError> {
    let l = cholesky(a)?;
    let n = l.nrows();
    let mut x = b.clone();
    for col in 0..x.ncols() {
        // Forward: L y = b
        for i in 0..n {
            let mut sum = x[[i, col]];
            for k in 0..i {
                sum -= l[[i, k]] * x[[k, col]];
            }
            x[[i, col]] = sum / l[[i, i]];
        }
        // Backward: Lᵀ x = y
        for i in (0..n).rev() {
            let mut sum = x[[i, col]];
            for k in (i + 1)..n {
                sum -= l[[k, i]] * x[[k, col]];
            }
            x[[i, col]] = sum / l[[i, i]];
        }
    }
    Ok(x)
}

/// Solve `a x = b` for a single right-hand side.
pub(crate) fn solve_spd_vector(
    a: &Array2<f64>,
    b: &Array1<f64>,
) -> Result<Array1<f64>, BayesTreeError> {
    let column = b.clone().insert_axis(ndarray::Axis(1));
    let solved = solve_spd(a, &column)?;
    Ok(solved.column(0).to_owned())
}

/// Inverse of a symmetric positive definite matrix.
pub(crate) fn inverse_spd(a: &Array2<f64>) -> Result<Array2<f64>, BayesTreeError> {
    solve_spd(a, &Array2::eye(a.nrows()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn cholesky_reconstructs_matrix() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let l = cholesky(&a).expect("cholesky");
        let back = l.dot(&l.t());
        for (x, y) in back.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_indefinite_matrix() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        assert_eq!(cholesky(&a), Err(BayesTreeError::NotPositiveDefinite));
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let a = array![[2.0, -1.0, 0.0], [-1.0, 2.0, -1.0], [0.0, -1.0, 2.0]];
        let inv = inverse_spd(&a).expect("inverse");
        let identity = a.dot(&inv);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((identity[[i, j]] - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn solves_vector_rhs() {
        let a = array![[4.0, 1.0], [1.0, 3.0]];
        let x = solve_spd_vector(&a, &array![1.0, 2.0]).expect("solve");
        let b = a.dot(&x);
        assert!((b[0] - 1.0).abs() < 1e-12);
        assert!((b[1] - 2.0).abs() < 1e-12);
    }
}
