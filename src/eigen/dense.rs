use super::{check_request, descending_order, EigenDecomposition, EigenSolver, Selection};
use crate::EigenmapError;
use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};
use nalgebra_sparse::convert::serial::convert_csr_dense;
use nalgebra_sparse::CsrMatrix;
use ndarray::Array1;
use nshare::IntoNdarray2;

/// Full symmetric eigen-decomposition of the densified matrix.
///
/// Costs `O(n^3)` time and `O(n^2)` memory regardless of how many pairs are requested.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseSolver {
    /// Iteration cap for the QR sweeps; 0 runs until convergence.
    pub max_iterations: usize,
}

impl EigenSolver for DenseSolver {
    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        selection: Selection,
        count: usize,
    ) -> anyhow::Result<EigenDecomposition> {
        check_request(matrix, count)?;
        let n = matrix.nrows();

        let dense: DMatrix<f64> = convert_csr_dense(matrix);
        let eigen = SymmetricEigen::try_new(dense, f64::EPSILON, self.max_iterations).ok_or(
            EigenmapError::NotConverged {
                requested: count,
                found: 0,
            },
        )?;

        let values: Vec<f64> = eigen.eigenvalues.iter().copied().collect();
        let mut order: Vec<usize> = (0..n).collect();
        match selection {
            Selection::SmallestMagnitude => order.sort_by(|&a, &b| {
                values[a].abs().total_cmp(&values[b].abs()).then(a.cmp(&b))
            }),
            Selection::LargestMagnitude => order.sort_by(|&a, &b| {
                values[b].abs().total_cmp(&values[a].abs()).then(a.cmp(&b))
            }),
        }
        order.truncate(count);
        let order = descending_order(&values, order);

        debug!(
            "Dense eigen-decomposition of a {}x{} matrix, kept {} pairs",
            n, n, count
        );

        let selected = DMatrix::from_fn(n, count, |i, c| eigen.eigenvectors[(i, order[c])]);
        Ok(EigenDecomposition {
            values: Array1::from_iter(order.iter().map(|&c| values[c])),
            vectors: selected.into_ndarray2().into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eigen::tests::{path_laplacian, path_spectrum};
    use approx::assert_abs_diff_eq;
    use nalgebra_sparse::CooMatrix;

    #[test]
    fn test_smallest_of_path_laplacian() {
        let n = 8;
        let matrix = path_laplacian(n);
        let result = DenseSolver::default()
            .solve(&matrix, Selection::SmallestMagnitude, 3)
            .unwrap();

        let spectrum = path_spectrum(n);
        assert_eq!(result.len(), 3);
        assert_eq!(result.vectors.dim(), (n, 3));
        // Descending: the zero eigenvalue comes last.
        assert_abs_diff_eq!(result.values[0], spectrum[2], epsilon = 1e-10);
        assert_abs_diff_eq!(result.values[1], spectrum[1], epsilon = 1e-10);
        assert_abs_diff_eq!(result.values[2], 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_eigenvectors_satisfy_definition() {
        let matrix = path_laplacian(6);
        let dense = convert_csr_dense(&matrix);
        let result = DenseSolver::default()
            .solve(&matrix, Selection::SmallestMagnitude, 4)
            .unwrap();

        for c in 0..result.len() {
            let v = nalgebra::DVector::from_iterator(6, result.vectors.column(c).iter().copied());
            let av = &dense * &v;
            let lv = &v * result.values[c];
            assert_abs_diff_eq!((av - lv).norm(), 0.0, epsilon = 1e-10);
            assert_abs_diff_eq!(v.norm(), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_largest_magnitude_with_negative_eigenvalue() {
        // diag(1, -3, 2)
        let coo = CooMatrix::try_from_triplets(
            3,
            3,
            vec![0, 1, 2],
            vec![0, 1, 2],
            vec![1.0, -3.0, 2.0],
        )
        .unwrap();
        let matrix = CsrMatrix::from(&coo);
        let result = DenseSolver::default()
            .solve(&matrix, Selection::LargestMagnitude, 2)
            .unwrap();

        assert_abs_diff_eq!(result.values[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.values[1], -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.vectors[(1, 1)].abs(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_too_many_pairs_requested() {
        let matrix = path_laplacian(3);
        let err = DenseSolver::default()
            .solve(&matrix, Selection::SmallestMagnitude, 4)
            .unwrap_err();
        assert!(err.downcast_ref::<EigenmapError>().is_some());
    }
}
