use nalgebra_sparse::CsrMatrix;

/// Row-wise summaries of a square sparse matrix.
pub trait MatrixRowStats {
    /// Sum of absolute values per row; its maximum bounds the spectral radius (Gershgorin).
    fn abs_sum_row(&self) -> Vec<f64>;

    /// Largest `|A[i][j] - A[j][i]|` over the stored entries.
    fn max_asymmetry(&self) -> f64;
}

impl MatrixRowStats for CsrMatrix<f64> {
    fn abs_sum_row(&self) -> Vec<f64> {
        self.row_iter()
            .map(|row| row.values().iter().map(|v| v.abs()).sum())
            .collect()
    }

    fn max_asymmetry(&self) -> f64 {
        self.triplet_iter()
            .map(|(i, j, &value)| {
                let mirrored = self
                    .get_entry(j, i)
                    .map(|entry| entry.into_value())
                    .unwrap_or(0.0);
                (value - mirrored).abs()
            })
            .fold(0.0, f64::max)
    }
}
