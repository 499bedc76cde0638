//! # Symmetric eigen-decomposition
//!
//! The embedding pipeline only needs a handful of eigenpairs from one end of the
//! spectrum of a sparse symmetric matrix. [`EigenSolver`] is that capability;
//! [`EigenMethod`] picks one of the bundled implementations:
//!
//! - **Lanczos** ([`LanczosSolver`]): block Lanczos on the sparse matrix, for large graphs.
//! - **Dense** ([`DenseSolver`]): full decomposition of the densified matrix; exact,
//!   intended for small graphs and for cross-checking.

use crate::sparse::MatrixRowStats;
use nalgebra_sparse::CsrMatrix;
use ndarray::{Array1, Array2};

mod dense;
mod lanczos;

pub use dense::DenseSolver;
pub use lanczos::LanczosSolver;

/// Which end of the spectrum to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Eigenvalues nearest zero.
    SmallestMagnitude,
    LargestMagnitude,
}

/// Selected eigenpairs, ordered by descending eigenvalue.
///
/// `vectors` holds one eigenvector per column, rows aligned with the matrix rows.
/// With [`Selection::SmallestMagnitude`] on a positive semi-definite matrix the
/// pair closest to zero is therefore the last column.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    pub values: Array1<f64>,
    pub vectors: Array2<f64>,
}

impl EigenDecomposition {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub trait EigenSolver: Send + Sync {
    /// Returns exactly `count` eigenpairs of the symmetric `matrix`, or fails.
    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        selection: Selection,
        count: usize,
    ) -> anyhow::Result<EigenDecomposition>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EigenMethod {
    Lanczos {
        /// Largest Krylov dimension; `None` allows the matrix order.
        iterations: Option<usize>,
        /// Residual threshold for accepting a Ritz pair, relative to the
        /// Gershgorin bound of the matrix.
        kappa: f64,
    },
    Dense,
}

impl Default for EigenMethod {
    fn default() -> Self {
        Self::Lanczos {
            iterations: None,
            kappa: 1e-8,
        }
    }
}

impl EigenMethod {
    pub fn solver(&self, random_seed: u32) -> Box<dyn EigenSolver> {
        match *self {
            EigenMethod::Lanczos { iterations, kappa } => Box::new(LanczosSolver {
                iterations,
                kappa,
                random_seed,
                ..LanczosSolver::default()
            }),
            EigenMethod::Dense => Box::new(DenseSolver::default()),
        }
    }
}

/// Orders component indices by descending eigenvalue, lower index first on ties.
pub(crate) fn descending_order(values: &[f64], mut components: Vec<usize>) -> Vec<usize> {
    components.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));
    components
}

pub(crate) fn check_request(matrix: &CsrMatrix<f64>, count: usize) -> anyhow::Result<()> {
    if matrix.nrows() != matrix.ncols() {
        return Err(anyhow::anyhow!(
            "Eigen-decomposition requires a square matrix, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        ));
    }
    if count == 0 {
        return Err(anyhow::anyhow!("At least one eigenpair must be requested"));
    }
    if count > matrix.nrows() {
        return Err(crate::EigenmapError::NotConverged {
            requested: count,
            found: matrix.nrows(),
        }
        .into());
    }
    let scale = matrix.abs_sum_row().into_iter().fold(1.0, f64::max);
    let asymmetry = matrix.max_asymmetry();
    if asymmetry > 1e-10 * scale {
        return Err(anyhow::anyhow!(
            "Eigen-decomposition requires a symmetric matrix, found |A[i][j] - A[j][i]| = {:e}",
            asymmetry
        ));
    }
    Ok(())
}
