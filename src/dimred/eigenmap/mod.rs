//! # Laplacian Eigenmaps
//!
//! Using the Laplacian of the nearest-neighbor graph, Laplacian Eigenmaps compute a
//! low-dimensional representation that optimally preserves local neighborhood
//! information. The map can be read as a discrete approximation of a continuous map
//! arising from the geometry of the underlying manifold.
//!
//! The pipeline is:
//! 1. k-nearest-neighbor graph, restricted to its largest connected component
//!    ([`NeighborGraph`])
//! 2. kernel weights `W`, degrees `D` and `M = I - D W D` ([`LaplacianBuilder`])
//! 3. eigenpairs of `M` nearest zero ([`EigenSolver`](crate::eigen::EigenSolver))
//! 4. coordinates from the non-trivial eigenvectors ([`extract`])
//!
//! Reference: Mikhail Belkin and Partha Niyogi. Laplacian Eigenmaps and Spectral
//! Techniques for Embedding and Clustering. NIPS, 2001.

use crate::distance::{Distance, Euclidean};
use crate::eigen::{EigenMethod, Selection};
use crate::network::NeighborGraph;
use crate::EigenmapError;
use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView2};

pub mod extract;
pub mod laplacian;
mod options;

pub use extract::extract;
pub use laplacian::{LaplacianBuilder, NormalizedLaplacian};
pub use options::{Options, PROPERTY_D, PROPERTY_K, PROPERTY_T};

/// Eigenpairs requested per wanted axis (trivial one included).
///
/// Lanczos solvers asked for exactly `d + 1` pairs often miss some of the tightly
/// clustered smallest eigenvalues; asking for more and reading from the end of the
/// result is reliable.
pub const EIGEN_OVERSAMPLING: usize = 10;

/// Number of eigenpairs requested from the solver for an `n`-vertex graph.
pub fn eigen_count(d: usize, n: usize) -> usize {
    (EIGEN_OVERSAMPLING * (d + 1)).min(n.saturating_sub(1))
}

/// Result of a Laplacian Eigenmap.
#[derive(Debug, Clone)]
pub struct Embedding {
    coordinates: Array2<f64>,
    index: Vec<usize>,
    eigenvalues: Array1<f64>,
}

impl Embedding {
    /// `n x d` coordinates, one row per embedded point.
    pub fn coordinates(&self) -> &Array2<f64> {
        &self.coordinates
    }

    /// Input row of each embedded point. Points outside the largest connected
    /// component of the neighbor graph are not embedded.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Eigenvalue of `M` behind each output axis.
    pub fn eigenvalues(&self) -> &Array1<f64> {
        &self.eigenvalues
    }

    pub fn into_coordinates(self) -> Array2<f64> {
        self.coordinates
    }
}

/// Configured Laplacian Eigenmap. Holds no per-run state, so one instance can embed
/// many data sets, concurrently if needed.
#[derive(Debug, Clone)]
pub struct LaplacianEigenmap {
    options: Options,
    method: EigenMethod,
    random_seed: u32,
}

impl LaplacianEigenmap {
    pub fn new(options: Options) -> Self {
        LaplacianEigenmap {
            options,
            method: EigenMethod::default(),
            random_seed: 42,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn method(&self) -> EigenMethod {
        self.method
    }

    /// Embeds `points` under an arbitrary distance.
    pub fn fit<T, D>(&self, points: &[T], distance: &D) -> anyhow::Result<Embedding>
    where
        T: Sync,
        D: Distance<T> + Sync,
    {
        let graph = NeighborGraph::of(points, distance, self.options.k())?.largest();
        self.fit_graph(&graph)
    }

    /// Embeds the rows of `data` under the Euclidean distance.
    pub fn fit_euclidean(&self, data: ArrayView2<f64>) -> anyhow::Result<Embedding> {
        let rows: Vec<_> = data.rows().into_iter().collect();
        self.fit(&rows, &Euclidean)
    }

    /// Embeds a pre-built neighbor graph as is; no component restriction is applied.
    pub fn fit_graph(&self, graph: &NeighborGraph) -> anyhow::Result<Embedding> {
        let n = graph.vertex_count();
        let d = self.options.d();
        if n < d + 2 {
            return Err(EigenmapError::TooFewVertices { n, d }.into());
        }

        info!(
            "Laplacian eigenmap: {} vertices, {} edges, k = {}, d = {}, {}",
            n,
            graph.edge_count(),
            self.options.k(),
            d,
            if self.options.discrete_weights() {
                "discrete weights".to_string()
            } else {
                format!("heat kernel t = {}", self.options.t())
            }
        );

        if !graph.is_connected() {
            warn!(
                "Embedding a neighbor graph with {} connected components; the smallest \
                 eigenvalues are degenerate and the axes may separate components",
                graph.component_count()
            );
        }

        let laplacian = LaplacianBuilder::new(self.options.t()).build(graph)?;

        let count = eigen_count(d, n);
        debug!("Requesting {} eigenpairs with {:?}", count, self.method);
        let eigen = self.method.solver(self.random_seed).solve(
            &laplacian.affinity,
            Selection::SmallestMagnitude,
            count,
        )?;

        let coordinates = extract(eigen.vectors.view(), laplacian.degrees.view(), d)?;
        let ncols = eigen.vectors.ncols();
        let eigenvalues = (0..d)
            .map(|j| extract::source_column(ncols, j).map(|c| eigen.values[c]))
            .collect::<Option<Array1<f64>>>()
            .ok_or(EigenmapError::TooFewEigenpairs {
                available: ncols,
                required: d + 1,
            })?;

        Ok(Embedding {
            coordinates,
            index: graph.index(),
            eigenvalues,
        })
    }
}

/// Builder for [`LaplacianEigenmap`].
///
/// # Example Usage
/// ```ignore
/// let eigenmap = LaplacianEigenmapBuilder::new()
///     .neighbors(10)
///     .dimension(3)
///     .kernel_width(4.0)
///     .eigen_method(EigenMethod::Dense)
///     .build()?;
/// let embedding = eigenmap.fit_euclidean(data.view())?;
/// ```
#[derive(Debug, Clone)]
pub struct LaplacianEigenmapBuilder {
    k: usize,
    d: usize,
    t: f64,
    method: EigenMethod,
    random_seed: u32,
}

impl Default for LaplacianEigenmapBuilder {
    fn default() -> Self {
        let options = Options::default();
        Self {
            k: options.k(),
            d: options.d(),
            t: options.t(),
            method: EigenMethod::default(),
            random_seed: 42,
        }
    }
}

impl LaplacianEigenmapBuilder {
    /// Creates a new builder with default parameters.
    ///
    /// Default values:
    /// - `k`: 7
    /// - `d`: 2
    /// - `t`: -1 (discrete weights)
    /// - `method`: Lanczos
    /// - `random_seed`: 42
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(mut self, options: Options) -> Self {
        self.k = options.k();
        self.d = options.d();
        self.t = options.t();
        self
    }

    pub fn neighbors(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn dimension(mut self, d: usize) -> Self {
        self.d = d;
        self
    }

    /// Heat-kernel width; non-positive selects discrete weights.
    pub fn kernel_width(mut self, t: f64) -> Self {
        self.t = t;
        self
    }

    pub fn eigen_method(mut self, method: EigenMethod) -> Self {
        self.method = method;
        self
    }

    /// Seed of the Lanczos start vector.
    pub fn random_seed(mut self, seed: u32) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn build(self) -> anyhow::Result<LaplacianEigenmap> {
        Ok(LaplacianEigenmap {
            options: Options::new(self.k, self.d, self.t)?,
            method: self.method,
            random_seed: self.random_seed,
        })
    }
}

/// Laplacian Eigenmap of `points` under `distance`, using the default solver.
pub fn embed<T, D>(points: &[T], distance: &D, options: Options) -> anyhow::Result<Embedding>
where
    T: Sync,
    D: Distance<T> + Sync,
{
    LaplacianEigenmap::new(options).fit(points, distance)
}

/// Laplacian Eigenmap of the rows of `data` under the Euclidean distance.
pub fn embed_euclidean(data: ArrayView2<f64>, options: Options) -> anyhow::Result<Embedding> {
    LaplacianEigenmap::new(options).fit_euclidean(data)
}

/// Laplacian Eigenmap of a caller-supplied neighbor graph.
pub fn embed_graph(graph: &NeighborGraph, options: Options) -> anyhow::Result<Array2<f64>> {
    LaplacianEigenmap::new(options)
        .fit_graph(graph)
        .map(Embedding::into_coordinates)
}
