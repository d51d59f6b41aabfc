//! Undirected, unweighted simple graph over nodes `0..n`.
//!
//! Stored as sorted adjacency lists; visibility graphs of spectra are sparse,
//! so this is far smaller than the dense matrix while converting to and from
//! it losslessly.
use ndarray::Array2;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph {
    neighbors: Vec<Vec<usize>>,
    n_edges: usize,
}

impl Graph {
    /// Graph with `n` nodes and no edges.
    pub fn empty(n: usize) -> Self {
        Self { neighbors: vec![Vec::new(); n], n_edges: 0 }
    }

    /// Build from an edge list. Duplicate edges are collapsed.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Input`] on a self-loop or a node index `>= n`.
    pub fn from_edges(n: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        let mut g = Self::empty(n);
        for (u, v) in edges {
            if u >= n || v >= n {
                return Err(PipelineError::Input(format!(
                    "edge ({u}, {v}) out of range for {n} nodes"
                )));
            }
            if u == v {
                return Err(PipelineError::Input(format!("self-loop at node {u}")));
            }
            g.neighbors[u].push(v);
            g.neighbors[v].push(u);
        }
        for list in &mut g.neighbors {
            list.sort_unstable();
            list.dedup();
        }
        g.n_edges = g.neighbors.iter().map(Vec::len).sum::<usize>() / 2;
        Ok(g)
    }

    /// Build from a square adjacency matrix (non-zero = edge).
    ///
    /// # Errors
    ///
    /// [`PipelineError::Input`] if the matrix is not square, not symmetric,
    /// or has a non-zero diagonal.
    pub fn from_adjacency(adj: &Array2<u8>) -> Result<Self> {
        let (rows, cols) = adj.dim();
        if rows != cols {
            return Err(PipelineError::Input(format!(
                "adjacency matrix must be square, got {rows}×{cols}"
            )));
        }
        let mut edges = Vec::new();
        for i in 0..rows {
            if adj[[i, i]] != 0 {
                return Err(PipelineError::Input(format!("non-zero diagonal at node {i}")));
            }
            for j in i + 1..rows {
                let (a, b) = (adj[[i, j]] != 0, adj[[j, i]] != 0);
                if a != b {
                    return Err(PipelineError::Input(format!(
                        "adjacency matrix is not symmetric at ({i}, {j})"
                    )));
                }
                if a {
                    edges.push((i, j));
                }
            }
        }
        Self::from_edges(rows, edges)
    }

    /// Dense symmetric 0/1 adjacency matrix with zero diagonal.
    pub fn adjacency_matrix(&self) -> Array2<u8> {
        let n = self.n_nodes();
        let mut adj = Array2::<u8>::zeros((n, n));
        for (u, list) in self.neighbors.iter().enumerate() {
            for &v in list {
                adj[[u, v]] = 1;
            }
        }
        adj
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn n_edges(&self) -> usize {
        self.n_edges
    }

    /// Sorted neighbours of `u`.
    #[inline]
    pub fn neighbors(&self, u: usize) -> &[usize] {
        &self.neighbors[u]
    }

    #[inline]
    pub fn degree(&self, u: usize) -> usize {
        self.neighbors[u].len()
    }

    pub fn degrees(&self) -> Vec<usize> {
        self.neighbors.iter().map(Vec::len).collect()
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.neighbors[u].binary_search(&v).is_ok()
    }

    /// Iterate each undirected edge once as `(u, v)` with `u < v`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(u, list)| list.iter().filter(move |&&v| v > u).map(move |&v| (u, v)))
    }

    /// Breadth-first hop distances from `source`; `None` where unreachable.
    pub fn bfs_distances(&self, source: usize) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.n_nodes()];
        let mut queue = std::collections::VecDeque::new();
        dist[source] = Some(0);
        queue.push_back(source);
        while let Some(u) = queue.pop_front() {
            let d = dist[u].unwrap_or(0) + 1;
            for &v in &self.neighbors[u] {
                if dist[v].is_none() {
                    dist[v] = Some(d);
                    queue.push_back(v);
                }
            }
        }
        dist
    }

    /// `true` when every node reaches every other (vacuously for n ≤ 1).
    pub fn is_connected(&self) -> bool {
        self.n_nodes() <= 1 || self.bfs_distances(0).iter().all(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_round_trip() {
        let g = Graph::from_edges(4, [(0, 1), (1, 2), (0, 3), (3, 0)]).unwrap();
        assert_eq!(g.n_edges(), 3);
        let adj = g.adjacency_matrix();
        assert_eq!(adj, adj.t());
        assert_eq!(Graph::from_adjacency(&adj).unwrap(), g);
    }

    #[test]
    fn asymmetric_matrix_rejected() {
        let mut adj = Array2::<u8>::zeros((3, 3));
        adj[[0, 1]] = 1;
        assert!(Graph::from_adjacency(&adj).is_err());
    }

    #[test]
    fn self_loop_rejected() {
        assert!(Graph::from_edges(2, [(1, 1)]).is_err());
        let adj = Array2::<u8>::eye(2);
        assert!(Graph::from_adjacency(&adj).is_err());
    }

    #[test]
    fn bfs_and_connectivity() {
        let g = Graph::from_edges(4, [(0, 1), (1, 2)]).unwrap();
        assert_eq!(g.bfs_distances(0), vec![Some(0), Some(1), Some(2), None]);
        assert!(!g.is_connected());
        assert!(Graph::empty(1).is_connected());
    }

    #[test]
    fn edges_listed_once() {
        let g = Graph::from_edges(3, [(2, 0), (0, 1)]).unwrap();
        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges, vec![(0, 1), (0, 2)]);
    }
}
