//! # Dimensionality Reduction
//!
//! This module provides algorithms for reducing the dimensionality of high-dimensional data
//! while preserving important structural properties.
//!
//! ## Currently Available
//! - **Laplacian Eigenmaps** ([`eigenmap`]): spectral embedding of the k-nearest-neighbor
//!   graph that keeps neighboring points close together
//!
//! ## Algorithm Selection Guide
//! - Use **Laplacian Eigenmaps** when the data lies on a curved low-dimensional manifold and
//!   local neighborhoods matter more than global distances. Being built from local distances
//!   only, it does not "short-circuit" across the manifold and is fairly robust to outliers.

pub mod eigenmap;
