use anyhow::anyhow;
use nalgebra_sparse::CsrMatrix;

pub mod csr;

pub use csr::MatrixRowStats;

/// One row of a [`SparseRows`] matrix: `(column, value)` pairs kept sorted by column,
/// with at most one entry per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
    entries: Vec<(usize, f64)>,
}

impl SparseRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        SparseRow {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Stores `value` at `col`, replacing any previous value.
    pub fn set(&mut self, col: usize, value: f64) {
        match self.entries.binary_search_by_key(&col, |&(c, _)| c) {
            Ok(pos) => self.entries[pos].1 = value,
            Err(pos) => self.entries.insert(pos, (col, value)),
        }
    }

    /// Replaces every stored value with `f(col, value)`. The sparsity pattern is unchanged.
    pub fn update<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, f64) -> f64,
    {
        for (col, value) in self.entries.iter_mut() {
            *value = f(*col, *value);
        }
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|&(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }
}

/// Row-major sparse matrix assembled from independently built rows.
///
/// Values can be rewritten in place with [`SparseRows::rows_mut`]; convert to
/// [`CsrMatrix`] once assembly is finished.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseRows {
    ncols: usize,
    rows: Vec<SparseRow>,
}

impl SparseRows {
    pub fn from_rows(ncols: usize, rows: Vec<SparseRow>) -> anyhow::Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.iter().any(|(c, _)| c >= ncols))
        {
            return Err(anyhow!(
                "Row {} has a column index outside of 0..{} ({} entries)",
                i,
                ncols,
                row.len()
            ));
        }
        Ok(SparseRows { ncols, rows })
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SparseRow::len).sum()
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut SparseRow> {
        self.rows.iter_mut()
    }

    pub fn to_csr(&self) -> anyhow::Result<CsrMatrix<f64>> {
        let nnz = self.nnz();
        let mut row_offsets = Vec::with_capacity(self.nrows() + 1);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);

        row_offsets.push(0);
        for row in &self.rows {
            for (col, value) in row.iter() {
                col_indices.push(col);
                values.push(value);
            }
            row_offsets.push(col_indices.len());
        }

        CsrMatrix::try_from_csr_data(self.nrows(), self.ncols, row_offsets, col_indices, values)
            .map_err(|e| anyhow!("Failed to create CSR matrix: {}", e))
    }
}
