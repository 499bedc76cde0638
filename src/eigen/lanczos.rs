use super::{check_request, descending_order, EigenDecomposition, EigenSolver, Selection};
use crate::sparse::MatrixRowStats;
use crate::EigenmapError;
use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};
use nalgebra_sparse::CsrMatrix;
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Sparse symmetric eigensolver: block Lanczos with full reorthogonalization and
/// Rayleigh-Ritz extraction.
///
/// The Krylov basis starts at `2 * count + 20` vectors and doubles until every
/// selected Ritz pair satisfies `|A y - theta y| <= kappa * |A|` (Gershgorin bound),
/// or `iterations` vectors have been spent. Starting from `block_size` random vectors
/// lets eigenvalues of multiplicity up to `block_size` surface with all their copies;
/// directions that deflate are replaced by fresh random ones.
#[derive(Debug, Clone, Copy)]
pub struct LanczosSolver {
    /// Largest basis size; `None` allows the matrix order.
    pub iterations: Option<usize>,
    pub kappa: f64,
    pub block_size: usize,
    pub random_seed: u32,
}

impl Default for LanczosSolver {
    fn default() -> Self {
        Self {
            iterations: None,
            kappa: 1e-8,
            block_size: 4,
            random_seed: 42,
        }
    }
}

/// `matrix * x`, one row per task.
fn multiply(matrix: &CsrMatrix<f64>, x: &Array1<f64>) -> Array1<f64> {
    let values: Vec<f64> = (0..matrix.nrows())
        .into_par_iter()
        .map(|i| {
            let row = matrix.row(i);
            row.col_indices()
                .iter()
                .zip(row.values())
                .map(|(&j, &value)| value * x[j])
                .sum()
        })
        .collect();
    Array1::from(values)
}

/// Removes the components of `w` along every vector of `basis` and `extra`; two passes.
fn orthogonalize(w: &mut Array1<f64>, basis: &[Array1<f64>], extra: &[Array1<f64>]) {
    for _ in 0..2 {
        for q in basis.iter().chain(extra) {
            let c = w.dot(q);
            w.scaled_add(-c, q);
        }
    }
}

/// Orthonormal block Krylov basis `Q`, the images `A Q` and the projection `Q^T A Q`.
struct Krylov {
    basis: Vec<Array1<f64>>,
    images: Vec<Array1<f64>>,
    projection: Vec<Vec<f64>>,
    /// Orthonormal vectors queued for admission, orthogonal to `basis`.
    block: Vec<Array1<f64>>,
    /// First basis vector of the block whose images seed the next block.
    block_start: usize,
    exhausted: bool,
}

impl Krylov {
    fn new() -> Self {
        Krylov {
            basis: Vec::new(),
            images: Vec::new(),
            projection: Vec::new(),
            block: Vec::new(),
            block_start: 0,
            exhausted: false,
        }
    }

    fn len(&self) -> usize {
        self.basis.len()
    }

    /// Unit vector orthogonal to the basis and to `accepted`, or `None` once they
    /// span the space.
    fn fresh_direction(
        &self,
        n: usize,
        accepted: &[Array1<f64>],
        rng: &mut ChaCha8Rng,
    ) -> Option<Array1<f64>> {
        if self.basis.len() + accepted.len() >= n {
            return None;
        }
        for _ in 0..3 {
            let mut v: Array1<f64> = Array1::from_shape_fn(n, |_| rng.random_range(-1.0..1.0));
            let initial = v.dot(&v).sqrt();
            orthogonalize(&mut v, &self.basis, accepted);
            let norm = v.dot(&v).sqrt();
            if norm > 1e-8 * initial {
                v /= norm;
                return Some(v);
            }
        }
        None
    }

    /// Next block from the images of the last one, topped up with random directions.
    fn next_block(&mut self, n: usize, width: usize, breakdown: f64, rng: &mut ChaCha8Rng) {
        let mut accepted: Vec<Array1<f64>> = Vec::with_capacity(width);
        for image in &self.images[self.block_start..] {
            let mut w = image.clone();
            orthogonalize(&mut w, &self.basis, &accepted);
            let norm = w.dot(&w).sqrt();
            if norm > breakdown {
                w /= norm;
                accepted.push(w);
            }
        }
        while accepted.len() < width {
            match self.fresh_direction(n, &accepted, rng) {
                Some(v) => accepted.push(v),
                None => break,
            }
        }
        self.block_start = self.basis.len();
        self.block = accepted;
    }

    fn admit(&mut self, matrix: &CsrMatrix<f64>, v: Array1<f64>) {
        let image = multiply(matrix, &v);
        for (q, row) in self.basis.iter().zip(self.projection.iter_mut()) {
            row.push(q.dot(&image));
        }
        let mut row: Vec<f64> = self.images.iter().map(|previous| v.dot(previous)).collect();
        row.push(v.dot(&image));
        self.projection.push(row);
        self.basis.push(v);
        self.images.push(image);
    }

    fn extend(
        &mut self,
        matrix: &CsrMatrix<f64>,
        target: usize,
        width: usize,
        breakdown: f64,
        rng: &mut ChaCha8Rng,
    ) {
        let n = matrix.nrows();
        while self.basis.len() < target && !self.exhausted {
            if self.block.is_empty() {
                self.next_block(n, width, breakdown, rng);
                if self.block.is_empty() {
                    self.exhausted = true;
                    break;
                }
            }
            let v = self.block.remove(0);
            self.admit(matrix, v);
        }
    }

    fn complete(&self, n: usize) -> bool {
        self.exhausted || self.basis.len() >= n
    }

    /// `Q^T A Q`, symmetrized.
    fn projected(&self) -> DMatrix<f64> {
        let m = self.basis.len();
        DMatrix::from_fn(m, m, |i, j| {
            0.5 * (self.projection[i][j] + self.projection[j][i])
        })
    }

    /// `sum_j coefficients[j] * vectors[j]`.
    fn combine<'a>(
        vectors: &[Array1<f64>],
        coefficients: impl Iterator<Item = &'a f64>,
    ) -> Array1<f64> {
        let n = vectors.first().map_or(0, |v| v.len());
        let mut result = Array1::zeros(n);
        for (&c, q) in coefficients.zip(vectors) {
            result.scaled_add(c, q);
        }
        result
    }
}

/// Ritz value indices ordered by preference for `selection`, lower index first on ties.
fn preferred(values: &[f64], selection: Selection) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| {
        let order = match selection {
            Selection::SmallestMagnitude => values[a].abs().total_cmp(&values[b].abs()),
            Selection::LargestMagnitude => values[b].abs().total_cmp(&values[a].abs()),
        };
        order.then(a.cmp(&b))
    });
    indices
}

impl EigenSolver for LanczosSolver {
    fn solve(
        &self,
        matrix: &CsrMatrix<f64>,
        selection: Selection,
        count: usize,
    ) -> anyhow::Result<EigenDecomposition> {
        check_request(matrix, count)?;
        let n = matrix.nrows();

        let scale = matrix
            .abs_sum_row()
            .into_iter()
            .fold(0.0, f64::max)
            .max(f64::MIN_POSITIVE);
        let tolerance = self.kappa.abs() * scale;
        let width = self.block_size.clamp(1, n);
        let limit = self.iterations.unwrap_or(n).clamp(count, n);
        let mut target = (2 * count + 20).max(width).clamp(count, limit);

        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(self.random_seed));
        let mut krylov = Krylov::new();

        loop {
            krylov.extend(matrix, target, width, 1e-10 * scale, &mut rng);
            let m = krylov.len();
            if m < count {
                return Err(EigenmapError::NotConverged {
                    requested: count,
                    found: m,
                }
                .into());
            }

            let ritz = SymmetricEigen::try_new(krylov.projected(), f64::EPSILON, 0).ok_or(
                EigenmapError::NotConverged {
                    requested: count,
                    found: 0,
                },
            )?;
            let values: Vec<f64> = ritz.eigenvalues.iter().copied().collect();
            let mut selected = preferred(&values, selection);
            selected.truncate(count);

            let pairs: Vec<(Array1<f64>, f64)> = selected
                .iter()
                .map(|&c| {
                    let coefficients = ritz.eigenvectors.column(c);
                    let vector = Krylov::combine(&krylov.basis, coefficients.iter());
                    let mut residual = Krylov::combine(&krylov.images, coefficients.iter());
                    residual.scaled_add(-values[c], &vector);
                    (vector, residual.dot(&residual).sqrt())
                })
                .collect();
            let converged = pairs.iter().filter(|(_, r)| *r <= tolerance).count();
            debug!(
                "Lanczos basis of {}: {} of {} Ritz pairs converged",
                m, converged, count
            );

            if converged == count {
                let selected_values: Vec<f64> = selected.iter().map(|&c| values[c]).collect();
                let order = descending_order(&selected_values, (0..count).collect());
                let mut vectors = Array2::zeros((n, count));
                for (column, &slot) in order.iter().enumerate() {
                    let mut vector = pairs[slot].0.clone();
                    let norm = vector.dot(&vector).sqrt();
                    if norm > 0.0 {
                        vector /= norm;
                    }
                    vectors.column_mut(column).assign(&vector);
                }
                return Ok(EigenDecomposition {
                    values: Array1::from_iter(order.iter().map(|&slot| selected_values[slot])),
                    vectors,
                });
            }

            if m >= limit || krylov.complete(n) {
                return Err(EigenmapError::NotConverged {
                    requested: count,
                    found: converged,
                }
                .into());
            }
            target = (2 * m).min(limit);
        }
    }
}
