pub mod dimred;
pub mod distance;
pub mod eigen;
mod error;
pub mod network;
pub mod sparse;

pub use dimred::eigenmap::{
    embed, embed_euclidean, embed_graph, Embedding, LaplacianEigenmap, LaplacianEigenmapBuilder,
    Options,
};
pub use eigen::EigenMethod;
pub use error::EigenmapError;
pub use network::NeighborGraph;
