use crate::distance::Distance;
use rayon::prelude::*;
use std::cmp::Ordering;

#[cfg(feature = "kdtree")]
use kiddo::{KdTree, SquaredEuclidean};
#[cfg(feature = "kdtree")]
use ndarray::ArrayView2;

/// Neighbor lists, one per point: `(neighbor index, distance)` sorted by increasing distance.
pub type NeighborLists = Vec<Vec<(usize, f64)>>;

fn by_distance(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

/// Exhaustive k-nearest-neighbor search, parallel over query points.
///
/// A point is never its own neighbor. Ties are broken by the lower index so the
/// result does not depend on scheduling. If `k` exceeds `n - 1` every other point
/// is returned.
pub fn nearest_neighbors<T, D>(points: &[T], distance: &D, k: usize) -> NeighborLists
where
    T: Sync,
    D: Distance<T> + Sync,
{
    let n = points.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            let query = &points[i];
            let mut candidates: Vec<(usize, f64)> = (0..n)
                .filter(|&j| j != i)
                .map(|j| (j, distance.distance(query, &points[j])))
                .collect();

            if k < candidates.len() {
                candidates.select_nth_unstable_by(k, by_distance);
                candidates.truncate(k);
            }
            candidates.sort_unstable_by(by_distance);
            candidates
        })
        .collect()
}

/// Euclidean k-nearest-neighbor search over the rows of `data` using a k-d tree.
///
/// `K` must equal the number of columns.
#[cfg(feature = "kdtree")]
pub fn nearest_neighbors_kdtree<const K: usize>(
    data: ArrayView2<f64>,
    k: usize,
) -> anyhow::Result<NeighborLists> {
    if data.ncols() != K {
        return Err(anyhow::anyhow!(
            "Data has {} features but the k-d tree was instantiated for {}",
            data.ncols(),
            K
        ));
    }

    let n_samples = data.nrows();
    let mut kdtree: KdTree<f64, K> = KdTree::new();

    for i in 0..n_samples {
        let mut point_array = [0.0; K];
        for j in 0..K {
            point_array[j] = data[(i, j)];
        }
        kdtree.add(&point_array, i as u64);
    }

    let mut result = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let mut query_array = [0.0; K];
        for j in 0..K {
            query_array[j] = data[(i, j)];
        }

        // One extra result since the query point finds itself.
        let neighbors = kdtree.nearest_n::<SquaredEuclidean>(&query_array, k + 1);
        let mut row: Vec<(usize, f64)> = neighbors
            .iter()
            .filter(|neighbor| neighbor.item as usize != i)
            .map(|neighbor| (neighbor.item as usize, neighbor.distance.sqrt()))
            .collect();
        row.sort_unstable_by(by_distance);
        row.truncate(k);
        result.push(row);
    }

    Ok(result)
}
