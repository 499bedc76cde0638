use crate::distance::Distance;
use anyhow::anyhow;
use log::{debug, warn};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::HashSet;

pub mod knn;

pub use knn::{nearest_neighbors, NeighborLists};

#[cfg(feature = "kdtree")]
pub use knn::nearest_neighbors_kdtree;

/// Undirected k-nearest-neighbor graph.
///
/// Vertices are numbered densely `0..n`. Each vertex remembers the row of the input
/// point set it was built from, so that a graph restricted to one component can be
/// mapped back onto the data. Edge weights are distances.
#[derive(Debug, Clone)]
pub struct NeighborGraph {
    graph: UnGraph<usize, f64>,
}

pub struct NeighborIterator<'a> {
    edge_iter: petgraph::graph::Edges<'a, f64, petgraph::Undirected>,
    home_node: usize,
}

impl<'a> Iterator for NeighborIterator<'a> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        self.edge_iter.next().map(|edge_ref| {
            let neighbor = if edge_ref.source().index() == self.home_node {
                edge_ref.target().index()
            } else {
                edge_ref.source().index()
            };
            (neighbor, *edge_ref.weight())
        })
    }
}

impl NeighborGraph {
    /// Builds the k-nearest-neighbor graph of `points` under `distance`.
    ///
    /// Each point is joined to its `k` nearest neighbors; an edge found from both
    /// ends is stored once.
    pub fn of<T, D>(points: &[T], distance: &D, k: usize) -> anyhow::Result<Self>
    where
        T: Sync,
        D: Distance<T> + Sync,
    {
        let n = points.len();
        if n < 2 {
            return Err(anyhow!(
                "At least two points are required to build a neighbor graph, got {}",
                n
            ));
        }
        if k >= n {
            warn!(
                "k = {} is not smaller than the number of points ({}), using k = {}",
                k,
                n,
                n - 1
            );
        }

        let lists = nearest_neighbors(points, distance, k);
        Self::from_neighbor_lists(&lists)
    }

    /// Euclidean k-nearest-neighbor graph over the rows of `data`, searched with a k-d tree.
    #[cfg(feature = "kdtree")]
    pub fn of_euclidean_kdtree<const K: usize>(
        data: ndarray::ArrayView2<f64>,
        k: usize,
    ) -> anyhow::Result<Self> {
        if data.nrows() < 2 {
            return Err(anyhow!(
                "At least two points are required to build a neighbor graph, got {}",
                data.nrows()
            ));
        }
        let lists = nearest_neighbors_kdtree::<K>(data, k)?;
        Self::from_neighbor_lists(&lists)
    }

    pub fn from_neighbor_lists(lists: &NeighborLists) -> anyhow::Result<Self> {
        let n = lists.len();
        Self::from_edges(
            n,
            lists
                .iter()
                .enumerate()
                .flat_map(|(i, row)| row.iter().map(move |&(j, w)| (i, j, w))),
        )
    }

    /// Builds a graph from an explicit edge list over vertices `0..n`.
    ///
    /// Duplicate pairs keep the first distance seen; self-loops are dropped. No
    /// component restriction is applied.
    pub fn from_edges<I>(n: usize, edges: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut graph = UnGraph::with_capacity(n, n);
        let mut node_indices = Vec::with_capacity(n);
        for i in 0..n {
            node_indices.push(graph.add_node(i));
        }

        let mut seen = HashSet::new();
        let mut self_loops = 0usize;
        for (i, j, w) in edges {
            if i >= n || j >= n {
                return Err(anyhow!(
                    "Edge ({}, {}) references a vertex outside of 0..{}",
                    i,
                    j,
                    n
                ));
            }
            if i == j {
                self_loops += 1;
                continue;
            }
            let key = if i < j { (i, j) } else { (j, i) };
            if seen.insert(key) {
                graph.add_edge(node_indices[i], node_indices[j], w);
            }
        }

        if self_loops > 0 {
            debug!("Dropped {} self-loops while building the neighbor graph", self_loops);
        }

        Ok(NeighborGraph { graph })
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn neighbors(&self, vertex: usize) -> NeighborIterator<'_> {
        NeighborIterator {
            edge_iter: self.graph.edges(NodeIndex::new(vertex)),
            home_node: vertex,
        }
    }

    pub fn degree(&self, vertex: usize) -> usize {
        self.graph.edges(NodeIndex::new(vertex)).count()
    }

    /// Original row of every vertex, in vertex order.
    pub fn index(&self) -> Vec<usize> {
        self.graph.node_weights().copied().collect()
    }

    /// Component label of every vertex. Labels are representatives, not dense ids.
    fn component_labels(&self) -> Vec<usize> {
        let mut components = UnionFind::<usize>::new(self.vertex_count());
        for edge in self.graph.edge_references() {
            components.union(edge.source().index(), edge.target().index());
        }
        components.into_labeling()
    }

    pub fn component_count(&self) -> usize {
        let labels: HashSet<usize> = self.component_labels().into_iter().collect();
        labels.len()
    }

    pub fn is_connected(&self) -> bool {
        self.component_count() <= 1
    }

    /// Restricts the graph to its largest connected component.
    ///
    /// Vertices are renumbered densely in their original order; ties between
    /// equally large components go to the one holding the lowest vertex.
    pub fn largest(&self) -> Self {
        let n = self.vertex_count();
        let labels = self.component_labels();

        let mut sizes = vec![0usize; n];
        for &label in &labels {
            sizes[label] += 1;
        }

        let mut best: Option<(usize, usize)> = None;
        for &label in &labels {
            match best {
                Some((_, size)) if size >= sizes[label] => {}
                _ => best = Some((label, sizes[label])),
            }
        }

        let Some((largest, size)) = best else {
            return self.clone();
        };
        if size == n {
            return self.clone();
        }

        warn!(
            "Neighbor graph has {} connected components, embedding the largest ({} of {} vertices)",
            self.component_count(),
            size,
            n
        );

        let mut subgraph = UnGraph::with_capacity(size, self.edge_count());
        let mut old_to_new = vec![None; n];
        for node_idx in self.graph.node_indices() {
            if labels[node_idx.index()] == largest {
                let new_idx = subgraph.add_node(self.graph[node_idx]);
                old_to_new[node_idx.index()] = Some(new_idx);
            }
        }

        for edge in self.graph.edge_references() {
            if let (Some(source), Some(target)) = (
                old_to_new[edge.source().index()],
                old_to_new[edge.target().index()],
            ) {
                subgraph.add_edge(source, target, *edge.weight());
            }
        }

        NeighborGraph { graph: subgraph }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;

    fn two_clusters() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
            vec![10.1, 10.1],
        ]
    }

    #[test]
    fn test_edges_are_stored_once() {
        let points = vec![vec![0.0], vec![1.0], vec![3.0]];
        let graph = NeighborGraph::of(&points, &Euclidean, 1).unwrap();

        // 0 <-> 1 is found from both ends, 2 -> 1 once.
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(1), 2);
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        let points = two_clusters();
        let graph = NeighborGraph::of(&points, &Euclidean, 2).unwrap();

        for i in 0..graph.vertex_count() {
            for (j, w) in graph.neighbors(i) {
                assert_ne!(i, j);
                let back: Vec<_> = graph.neighbors(j).filter(|&(v, _)| v == i).collect();
                assert_eq!(back.len(), 1);
                assert_eq!(back[0].1, w);
            }
        }
    }

    #[test]
    fn test_largest_component() {
        let points = two_clusters();
        let graph = NeighborGraph::of(&points, &Euclidean, 2).unwrap();
        assert_eq!(graph.component_count(), 2);
        assert!(!graph.is_connected());

        let largest = graph.largest();
        assert_eq!(largest.vertex_count(), 4);
        assert_eq!(largest.index(), vec![3, 4, 5, 6]);
        assert!(largest.is_connected());
        assert_eq!(largest.index()[0], 3);

        for i in 0..largest.vertex_count() {
            assert!(largest.degree(i) >= 1);
            for (j, _) in largest.neighbors(i) {
                assert!(j < largest.vertex_count());
            }
        }
    }

    #[test]
    fn test_largest_of_connected_graph_is_identity() {
        let points = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let graph = NeighborGraph::of(&points, &Euclidean, 2).unwrap();
        let largest = graph.largest();
        assert_eq!(largest.vertex_count(), 4);
        assert_eq!(largest.edge_count(), graph.edge_count());
        assert_eq!(largest.index(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_largest_prefers_lowest_vertex_on_tie() {
        let graph =
            NeighborGraph::from_edges(4, vec![(2, 3, 1.0), (0, 1, 1.0)]).unwrap();
        let largest = graph.largest();
        assert_eq!(largest.index(), vec![0, 1]);
    }

    #[test]
    fn test_from_edges_validation() {
        assert!(NeighborGraph::from_edges(2, vec![(0, 2, 1.0)]).is_err());

        let graph = NeighborGraph::from_edges(3, vec![(0, 0, 1.0), (0, 1, 2.0), (1, 0, 5.0)])
            .unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![(0, 2.0)]);
        assert_eq!(graph.degree(2), 0);
    }

    #[test]
    fn test_too_few_points() {
        let points = vec![vec![0.0]];
        assert!(NeighborGraph::of(&points, &Euclidean, 2).is_err());
    }
}
