use std::fmt;

/// Failures specific to building a Laplacian Eigenmap.
///
/// Every public function in this crate returns `anyhow::Result`; these variants are
/// wrapped inside it and can be recovered with `err.downcast_ref::<EigenmapError>()`.
#[derive(Debug, Clone, PartialEq)]
pub enum EigenmapError {
    /// Neighborhood size below 2.
    InvalidNeighbors(usize),
    /// Embedding dimension below 2.
    InvalidDimension(usize),
    /// The (restricted) graph is too small to yield `d` non-trivial axes.
    TooFewVertices { n: usize, d: usize },
    /// The eigen-decomposition has too few columns to skip the trivial one and keep `d` axes.
    TooFewEigenpairs { available: usize, required: usize },
    /// A vertex without any positive edge weight reached the Laplacian builder.
    DegenerateDegree { vertex: usize },
    /// The eigensolver produced fewer eigenpairs than requested.
    NotConverged { requested: usize, found: usize },
    /// A persisted option could not be parsed.
    InvalidProperty { key: String, value: String },
}

impl fmt::Display for EigenmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EigenmapError::InvalidNeighbors(k) => {
                write!(f, "Invalid number of nearest neighbors: {}", k)
            }
            EigenmapError::InvalidDimension(d) => {
                write!(f, "Invalid dimension of feature space: {}", d)
            }
            EigenmapError::TooFewVertices { n, d } => write!(
                f,
                "Graph has {} vertices, at least {} are required for a {}-dimensional embedding",
                n,
                d + 2,
                d
            ),
            EigenmapError::TooFewEigenpairs {
                available,
                required,
            } => write!(
                f,
                "{} eigenpairs available, at least {} are required",
                available, required
            ),
            EigenmapError::DegenerateDegree { vertex } => {
                write!(f, "Vertex {} has zero accumulated edge weight", vertex)
            }
            EigenmapError::NotConverged { requested, found } => write!(
                f,
                "Eigensolver converged to {} of {} requested eigenpairs",
                found, requested
            ),
            EigenmapError::InvalidProperty { key, value } => {
                write!(f, "Invalid value '{}' for property {}", value, key)
            }
        }
    }
}

impl std::error::Error for EigenmapError {}
