//! Natural visibility graph.
//!
//! Samples `i < j` of a series `y` are linked iff every intermediate sample
//! lies strictly below the straight line between them:
//!
//! ```text
//! edge(i, j)  ⇔  ∀ k ∈ (i, j):  y_k < y_i + (y_j − y_i) · (k − i) / (j − i)
//! ```
//!
//! Seen from `i`, sample `j` is visible iff the slope to `j` exceeds the slope
//! to every sample in between. Scanning `j` rightwards while tracking the
//! sample with the steepest slope so far gives an `O(n²)` build with no inner
//! loop over `k`.
//!
//! Slopes are compared cross-multiplied, `(y_j − y_i)(m − i) > (y_m − y_i)(j − i)`,
//! without dividing. Collinear samples whose differences are exactly
//! representable (integers, dyadic steps) therefore always block. Otherwise a
//! near-tie is decided by floating-point rounding of the differences, and the
//! graph may gain or lose an edge against exact arithmetic.
use ndarray::{Array3, ArrayView1};

use crate::error::{Location, PipelineError, Result};
use crate::graph::Graph;
use crate::psd::PsdTensor;

/// Visibility graph of one series (length ≥ 2).
///
/// # Errors
///
/// [`PipelineError::Input`] for fewer than two samples or a non-finite value.
pub fn natural_visibility_graph(y: ArrayView1<'_, f64>) -> Result<Graph> {
    let n = y.len();
    if n < 2 {
        return Err(PipelineError::Input(format!(
            "visibility graph needs at least 2 samples, got {n}"
        )));
    }
    if let Some(k) = y.iter().position(|v| !v.is_finite()) {
        return Err(PipelineError::Input(format!("non-finite sample {} at position {k}", y[k])));
    }

    let mut edges = Vec::with_capacity(2 * n);
    for i in 0..n - 1 {
        let yi = y[i];
        // Neighbours always see each other.
        edges.push((i, i + 1));
        // Steepest sample seen from `i` so far.
        let mut m = i + 1;
        for j in i + 2..n {
            if (y[j] - yi) * (m - i) as f64 > (y[m] - yi) * (j - i) as f64 {
                edges.push((i, j));
                m = j;
            }
        }
    }
    Graph::from_edges(n, edges)
}

/// Build one graph per `(epoch, channel, band)` spectrum of `psd`, keeping the
/// tensor's leading axes: output shape `[E, C, B]`.
pub fn visibility_graphs(psd: &PsdTensor) -> Result<Array3<Graph>> {
    let (n_e, n_c, n_b, _) = psd.values.dim();
    let mut graphs = Vec::with_capacity(n_e * n_c * n_b);
    for e in 0..n_e {
        for c in 0..n_c {
            for (b, &band) in psd.bands.iter().enumerate() {
                let g = natural_visibility_graph(psd.spectrum(e, c, b))
                    .map_err(|err| err.at(Location::leaf(e, c, band)))?;
                graphs.push(g);
            }
        }
    }
    Array3::from_shape_vec((n_e, n_c, n_b), graphs).map_err(|e| {
        PipelineError::ShapeMismatch(format!("graph tensor: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Literal transcription of the visibility criterion.
    fn brute_force(y: &[f64]) -> Graph {
        let n = y.len();
        let mut edges = Vec::new();
        for i in 0..n {
            for j in i + 1..n {
                let visible = (i + 1..j)
                    .all(|k| (y[k] - y[i]) * ((j - i) as f64) < (y[j] - y[i]) * ((k - i) as f64));
                if visible {
                    edges.push((i, j));
                }
            }
        }
        Graph::from_edges(n, edges).unwrap()
    }

    #[test]
    fn peak_blocks_the_view() {
        let g = natural_visibility_graph(array![1.0, 3.0, 2.0].view()).unwrap();
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(1, 2));
        assert!(!g.has_edge(0, 2));
    }

    #[test]
    fn valley_is_seen_over() {
        let g = natural_visibility_graph(array![3.0, 1.0, 2.0].view()).unwrap();
        assert_eq!(g.n_edges(), 3);
    }

    #[test]
    fn collinear_samples_block() {
        // y_1 lies exactly on the line: not strictly below, so no edge (0, 2).
        let g = natural_visibility_graph(array![1.0, 2.0, 3.0].view()).unwrap();
        assert!(!g.has_edge(0, 2));
    }

    #[test]
    fn exact_arithmetic_progressions_give_a_path() {
        let steps = [1.0, 3.0, -2.0, 0.25, 0.5, 1024.0];
        for (t, &step) in steps.iter().enumerate() {
            let y: Vec<f64> = (0..40).map(|k| 7.0 + step * k as f64).collect();
            let g = natural_visibility_graph(ArrayView1::from(&y)).unwrap();
            assert_eq!(g.n_edges(), 39, "step {step}: not a path");
            assert_eq!(g, brute_force(&y), "progression {t}");
        }
    }

    #[test]
    fn plateau_blocks_beyond_the_first_neighbour() {
        let g = natural_visibility_graph(array![2.0, 2.0, 2.0, 2.0].view()).unwrap();
        assert_eq!(g.n_edges(), 3);
    }

    #[test]
    fn matches_brute_force() {
        let y: Vec<f64> = (0..60)
            .map(|i| ((i * 7919 % 97) as f64).sqrt() + (i as f64 * 0.3).sin())
            .collect();
        let fast = natural_visibility_graph(ArrayView1::from(&y)).unwrap();
        assert_eq!(fast, brute_force(&y));
    }

    #[test]
    fn too_short_is_input_error() {
        assert!(natural_visibility_graph(array![1.0].view()).is_err());
        assert!(natural_visibility_graph(array![1.0, f64::NAN].view()).is_err());
    }
}
