use crate::EigenmapError;
use anyhow::anyhow;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Column of the eigenvector matrix that feeds output axis `axis`.
///
/// The last column holds the trivial eigenvector and is skipped; axes walk backwards
/// from the one before it. `None` when `ncols < axis + 2`.
pub fn source_column(ncols: usize, axis: usize) -> Option<usize> {
    ncols.checked_sub(axis + 2)
}

/// Turns eigenvectors of `M = I - D W D` into embedding coordinates.
///
/// Each axis is un-normalized by the degree vector and then scaled to unit Euclidean
/// norm across all vertices.
pub fn extract(
    eigenvectors: ArrayView2<f64>,
    degrees: ArrayView1<f64>,
    d: usize,
) -> anyhow::Result<Array2<f64>> {
    let (n, ncols) = eigenvectors.dim();
    if degrees.len() != n {
        return Err(anyhow!(
            "Degree vector has {} entries but eigenvectors have {} rows",
            degrees.len(),
            n
        ));
    }
    if ncols < d + 1 {
        return Err(EigenmapError::TooFewEigenpairs {
            available: ncols,
            required: d + 1,
        }
        .into());
    }

    let mut coordinates = Array2::zeros((n, d));
    for j in (0..d).rev() {
        let c = source_column(ncols, j).ok_or(EigenmapError::TooFewEigenpairs {
            available: ncols,
            required: d + 1,
        })?;
        let mut norm = 0.0;
        for i in 0..n {
            let xi = eigenvectors[(i, c)] * degrees[i];
            coordinates[(i, j)] = xi;
            norm += xi * xi;
        }

        let norm = norm.sqrt();
        if !(norm > 0.0) {
            return Err(anyhow!("Eigenvector column {} vanishes after degree scaling", c));
        }
        coordinates.column_mut(j).mapv_inplace(|x| x / norm);
    }

    Ok(coordinates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1};

    #[test]
    fn test_source_columns_skip_trivial() {
        assert_eq!(source_column(5, 0), Some(3));
        assert_eq!(source_column(5, 1), Some(2));
        // Smallest valid decomposition for d = 2.
        assert_eq!(source_column(3, 0), Some(1));
        assert_eq!(source_column(3, 1), Some(0));
        // Axis 2 would need a fourth column.
        assert_eq!(source_column(3, 2), None);
        assert_eq!(source_column(0, 0), None);
    }

    #[test]
    fn test_extract_scales_and_normalizes() {
        let eigenvectors = array![
            [3.0, 1.0, 0.5],
            [0.0, 1.0, 0.5],
            [4.0, -2.0, 0.5],
        ];
        let degrees = array![1.0, 2.0, 0.5];

        let coordinates = extract(eigenvectors.view(), degrees.view(), 2).unwrap();
        assert_eq!(coordinates.dim(), (3, 2));

        // Axis 0 from column 1: (1, 2, -1) / sqrt(6).
        let s6 = 6.0f64.sqrt();
        assert_abs_diff_eq!(coordinates[(0, 0)], 1.0 / s6, epsilon = 1e-15);
        assert_abs_diff_eq!(coordinates[(1, 0)], 2.0 / s6, epsilon = 1e-15);
        assert_abs_diff_eq!(coordinates[(2, 0)], -1.0 / s6, epsilon = 1e-15);

        // Axis 1 from column 0: (3, 0, 2) / sqrt(13).
        let s13 = 13.0f64.sqrt();
        assert_abs_diff_eq!(coordinates[(0, 1)], 3.0 / s13, epsilon = 1e-15);
        assert_abs_diff_eq!(coordinates[(1, 1)], 0.0, epsilon = 1e-15);
        assert_abs_diff_eq!(coordinates[(2, 1)], 2.0 / s13, epsilon = 1e-15);
    }

    #[test]
    fn test_axes_have_unit_norm() {
        let eigenvectors = Array2::from_shape_fn((7, 5), |(i, j)| ((i * 5 + j) as f64).sin());
        let degrees = Array1::from_shape_fn(7, |i| 1.0 / (i as f64 + 1.0));
        let coordinates = extract(eigenvectors.view(), degrees.view(), 3).unwrap();
        for column in coordinates.columns() {
            assert_abs_diff_eq!(column.dot(&column), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_too_few_columns() {
        let eigenvectors = Array2::<f64>::ones((4, 2));
        let degrees = Array1::<f64>::ones(4);
        let err = extract(eigenvectors.view(), degrees.view(), 2).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EigenmapError>(),
            Some(&EigenmapError::TooFewEigenpairs {
                available: 2,
                required: 3
            })
        );
    }

    #[test]
    fn test_mismatched_degrees() {
        let eigenvectors = Array2::<f64>::ones((4, 3));
        let degrees = Array1::<f64>::ones(3);
        assert!(extract(eigenvectors.view(), degrees.view(), 2).is_err());
    }
}
