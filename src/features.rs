//! Graph-theoretic descriptors of a visibility graph.
//!
//! Eleven scalars per graph, in this order:
//!
//! | #  | Descriptor              | Definition                                              |
//! |----|-------------------------|---------------------------------------------------------|
//! | 0  | average degree          | mean node degree                                        |
//! | 1  | maximum degree          |                                                         |
//! | 2  | density                 | 2E / (N(N−1)), 0 for N < 2                              |
//! | 3  | maximum clique size     | 0 when the graph has no edges                           |
//! | 4  | radius                  | min eccentricity (connected graphs only)                |
//! | 5  | diameter                | max eccentricity (connected graphs only)                |
//! | 6  | independence slot       | clique number (largest clique, singletons counted)      |
//! | 7  | degree entropy          | −Σ p log₂ p over the empirical degree distribution       |
//! | 8  | degree assortativity    | Pearson r of degrees across edge endpoints              |
//! | 9  | average clustering      | mean local clustering, 0 for nodes of degree < 2        |
//! | 10 | global efficiency       | mean of 1/d(u, v) over ordered pairs, 0 if unreachable  |
use std::collections::BTreeMap;

use ndarray::{Array3, Array4};

use crate::band::Band;
use crate::error::{Location, PipelineError, Result};
use crate::graph::Graph;

/// Number of descriptors per graph.
pub const N_FEATURES: usize = 11;

/// Descriptor names in vector order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "average_degree",
    "max_degree",
    "density",
    "max_clique_size",
    "radius",
    "diameter",
    "independence_number",
    "degree_entropy",
    "degree_assortativity",
    "average_clustering",
    "global_efficiency",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphFeatures {
    pub average_degree: f64,
    pub max_degree: f64,
    pub density: f64,
    pub max_clique_size: f64,
    pub radius: f64,
    pub diameter: f64,
    pub independence_number: f64,
    pub degree_entropy: f64,
    pub degree_assortativity: f64,
    pub average_clustering: f64,
    pub global_efficiency: f64,
}

impl GraphFeatures {
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            self.average_degree,
            self.max_degree,
            self.density,
            self.max_clique_size,
            self.radius,
            self.diameter,
            self.independence_number,
            self.degree_entropy,
            self.degree_assortativity,
            self.average_clustering,
            self.global_efficiency,
        ]
    }
}

/// Compute all descriptors of `g`.
///
/// # Errors
///
/// [`PipelineError::Computation`] if `g` has no nodes, is disconnected
/// (radius and diameter undefined) or has an undefined assortativity (every
/// edge endpoint of equal degree, e.g. complete or edgeless graphs).
pub fn extract_features(g: &Graph) -> Result<GraphFeatures> {
    if g.n_nodes() == 0 {
        return Err(PipelineError::Computation("graph has no nodes".into()));
    }
    let degrees = g.degrees();
    let n = degrees.len() as f64;
    let ecc = eccentricities(g)?;
    let max_clique = max_clique_size(g);

    Ok(GraphFeatures {
        average_degree: degrees.iter().sum::<usize>() as f64 / n,
        max_degree: degrees.iter().copied().max().unwrap_or(0) as f64,
        density: density(g),
        max_clique_size: max_clique as f64,
        radius: ecc.iter().copied().min().unwrap_or(0) as f64,
        diameter: ecc.iter().copied().max().unwrap_or(0) as f64,
        // Same as `clique_number` once the graph has a node.
        independence_number: max_clique.max(1) as f64,
        degree_entropy: degree_entropy(&degrees),
        degree_assortativity: degree_assortativity(g)?,
        average_clustering: average_clustering(g),
        global_efficiency: global_efficiency(g),
    })
}

/// Descriptors of every graph of a `[E, C, B]` graph tensor: `[E, C, B, 11]`.
///
/// `bands` labels the band axis for error messages.
pub fn graph_features(graphs: &Array3<Graph>, bands: &[Band]) -> Result<Array4<f64>> {
    let (n_e, n_c, n_b) = graphs.dim();
    if bands.len() != n_b {
        return Err(PipelineError::ShapeMismatch(format!(
            "{} band labels for a band axis of length {n_b}",
            bands.len()
        )));
    }
    let mut out = Array4::<f64>::zeros((n_e, n_c, n_b, N_FEATURES));
    for ((e, c, b), g) in graphs.indexed_iter() {
        let f = extract_features(g).map_err(|err| err.at(Location::leaf(e, c, bands[b])))?;
        for (k, v) in f.to_array().into_iter().enumerate() {
            out[[e, c, b, k]] = v;
        }
    }
    Ok(out)
}

// ── Individual descriptors ────────────────────────────────────────────────

/// `2E / (N(N−1))`; 0 for fewer than two nodes.
pub fn density(g: &Graph) -> f64 {
    let n = g.n_nodes() as f64;
    if n < 2.0 {
        return 0.0;
    }
    2.0 * g.n_edges() as f64 / (n * (n - 1.0))
}

/// Eccentricity of every node.
///
/// # Errors
///
/// [`PipelineError::Computation`] if the graph is disconnected.
pub fn eccentricities(g: &Graph) -> Result<Vec<usize>> {
    (0..g.n_nodes())
        .map(|u| {
            g.bfs_distances(u)
                .into_iter()
                .try_fold(0usize, |acc, d| d.map(|d| acc.max(d)))
                .ok_or_else(|| {
                    PipelineError::Computation(
                        "graph is disconnected; radius and diameter are undefined".into(),
                    )
                })
        })
        .collect()
}

/// Size of the largest clique with at least one edge; 0 for an edgeless graph.
pub fn max_clique_size(g: &Graph) -> usize {
    if g.n_edges() == 0 {
        0
    } else {
        clique_number(g)
    }
}

/// Size of the largest clique, counting single nodes as cliques.
///
/// Bron–Kerbosch with Tomita pivoting, pruned by the best size found so far.
pub fn clique_number(g: &Graph) -> usize {
    let mut best = 0;
    let p: Vec<usize> = (0..g.n_nodes()).collect();
    bron_kerbosch(g, 0, p, Vec::new(), &mut best);
    best
}

fn bron_kerbosch(g: &Graph, r_size: usize, mut p: Vec<usize>, mut x: Vec<usize>, best: &mut usize) {
    if p.is_empty() {
        if x.is_empty() {
            *best = (*best).max(r_size);
        }
        return;
    }
    if r_size + p.len() <= *best {
        return;
    }
    let pivot = p
        .iter()
        .chain(x.iter())
        .copied()
        .max_by_key(|&u| intersection_len(&p, g.neighbors(u)))
        .unwrap_or(p[0]);
    let candidates: Vec<usize> = p
        .iter()
        .copied()
        .filter(|&v| !g.has_edge(pivot, v))
        .collect();
    for v in candidates {
        let nv = g.neighbors(v);
        bron_kerbosch(g, r_size + 1, intersect(&p, nv), intersect(&x, nv), best);
        if let Ok(pos) = p.binary_search(&v) {
            p.remove(pos);
        }
        if let Err(pos) = x.binary_search(&v) {
            x.insert(pos, v);
        }
    }
}

/// Intersection of two sorted slices.
fn intersect(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn intersection_len(a: &[usize], b: &[usize]) -> usize {
    intersect(a, b).len()
}

/// Shannon entropy (bits) of the fraction of nodes at each degree.
pub fn degree_entropy(degrees: &[usize]) -> f64 {
    if degrees.is_empty() {
        return 0.0;
    }
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &d in degrees {
        *counts.entry(d).or_default() += 1;
    }
    let n = degrees.len() as f64;
    let h: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum();
    // A single degree value gives -1·log2(1) = -0.0.
    h.max(0.0)
}

/// Pearson correlation of the degrees at either end of every edge, each
/// undirected edge counted in both directions.
///
/// # Errors
///
/// [`PipelineError::Computation`] when there are no edges or all endpoint
/// degrees are equal (zero variance).
pub fn degree_assortativity(g: &Graph) -> Result<f64> {
    let m = 2 * g.n_edges();
    if m == 0 {
        return Err(PipelineError::Computation(
            "degree assortativity is undefined for a graph without edges".into(),
        ));
    }
    let (mut sum, mut sum_sq, mut sum_prod) = (0.0, 0.0, 0.0);
    for (u, v) in g.edges() {
        let (du, dv) = (g.degree(u) as f64, g.degree(v) as f64);
        sum += du + dv;
        sum_sq += du * du + dv * dv;
        sum_prod += 2.0 * du * dv;
    }
    let m = m as f64;
    let mean = sum / m;
    let var = sum_sq / m - mean * mean;
    if var.abs() <= f64::EPSILON * sum_sq / m {
        return Err(PipelineError::Computation(
            "degree assortativity is undefined: all edge endpoints share one degree".into(),
        ));
    }
    Ok((sum_prod / m - mean * mean) / var)
}

/// Mean local clustering coefficient; nodes of degree < 2 contribute 0.
pub fn average_clustering(g: &Graph) -> f64 {
    let n = g.n_nodes();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = (0..n)
        .map(|u| {
            let nu = g.neighbors(u);
            let k = nu.len();
            if k < 2 {
                return 0.0;
            }
            let links: usize = nu
                .iter()
                .map(|&v| intersection_len(nu, g.neighbors(v)))
                .sum::<usize>()
                / 2;
            2.0 * links as f64 / (k * (k - 1)) as f64
        })
        .sum();
    total / n as f64
}

/// Mean of `1 / d(u, v)` over ordered node pairs, unreachable pairs counting 0.
pub fn global_efficiency(g: &Graph) -> f64 {
    let n = g.n_nodes();
    if n < 2 {
        return 0.0;
    }
    let total: f64 = (0..n)
        .map(|u| {
            g.bfs_distances(u)
                .into_iter()
                .flatten()
                .filter(|&d| d > 0)
                .map(|d| 1.0 / d as f64)
                .sum::<f64>()
        })
        .sum();
    total / (n * (n - 1)) as f64
}
