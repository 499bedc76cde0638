use crate::network::NeighborGraph;
use crate::sparse::{SparseRow, SparseRows};
use crate::EigenmapError;
use nalgebra_sparse::CsrMatrix;
use ndarray::Array1;
use rayon::prelude::*;

/// Heat-kernel or discrete edge weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaplacianBuilder {
    t: f64,
    gamma: f64,
}

/// Output of [`LaplacianBuilder::build`].
#[derive(Debug, Clone)]
pub struct NormalizedLaplacian {
    /// `W`: kernel weight of every graph edge, symmetric, no diagonal.
    pub weights: CsrMatrix<f64>,
    /// `D[i] = 1 / sqrt(sum_j W[i][j])`.
    pub degrees: Array1<f64>,
    /// `M = I - D W D`, unit diagonal.
    pub affinity: CsrMatrix<f64>,
}

impl LaplacianBuilder {
    pub fn new(t: f64) -> Self {
        LaplacianBuilder { t, gamma: -1.0 / t }
    }

    pub fn discrete(&self) -> bool {
        self.t <= 0.0
    }

    pub fn weight(&self, distance: f64) -> f64 {
        if self.discrete() {
            1.0
        } else {
            (self.gamma * distance * distance).exp()
        }
    }

    pub fn build(&self, graph: &NeighborGraph) -> anyhow::Result<NormalizedLaplacian> {
        let n = graph.vertex_count();

        let rows: Vec<SparseRow> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut row = SparseRow::with_capacity(graph.degree(i) + 1);
                for (j, distance) in graph.neighbors(i) {
                    row.set(j, self.weight(distance));
                }
                row
            })
            .collect();

        let mut degrees = Array1::zeros(n);
        for (i, row) in rows.iter().enumerate() {
            let total = row.sum();
            // Also catches NaN and underflowed kernels.
            if !(total > 0.0) || !total.is_finite() {
                return Err(EigenmapError::DegenerateDegree { vertex: i }.into());
            }
            degrees[i] = 1.0 / total.sqrt();
        }

        let weights = SparseRows::from_rows(n, rows)?;
        let weight_matrix = weights.to_csr()?;

        let mut normalized = weights;
        for (i, row) in normalized.rows_mut().enumerate() {
            let di = degrees[i];
            row.update(|j, w| -di * w * degrees[j]);
            row.set(i, 1.0);
        }

        Ok(NormalizedLaplacian {
            weights: weight_matrix,
            degrees,
            affinity: normalized.to_csr()?,
        })
    }
}
