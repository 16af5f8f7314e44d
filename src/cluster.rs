//! # DBSCAN over cosine distance
//! Density-based grouping of document vectors. Points without enough
//! neighbors within `eps` and not reachable from a core point are noise.
//!
//! Labels: `NOISE` (-1) or a cluster id in discovery order starting at 0.
//! Traversal follows input order, so a fixed input always yields the same
//! labels.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView1};
use tracing::debug;

use crate::error::{AnalyzeError, Result};

pub const NOISE: i32 = -1;

const UNVISITED: i32 = -2;

/// `1 - cos(a, b)`, clamped to [0, 2]. Zero vectors sit at distance 1.0 from
/// everything.
pub fn cosine_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let na = a.dot(&a).sqrt();
    let nb = b.dot(&b).sqrt();
    if na == 0.0 || nb == 0.0 {
        return 1.0;
    }
    (1.0 - a.dot(&b) / (na * nb)).clamp(0.0, 2.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dbscan {
    pub eps: f64,
    pub min_samples: usize,
}

impl Dbscan {
    /// Validated constructor.
    pub fn new(eps: f64, min_samples: usize) -> Result<Self> {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(AnalyzeError::InvalidParameter(format!(
                "eps must be a positive number (got {eps})"
            )));
        }
        if min_samples < 1 {
            return Err(AnalyzeError::InvalidParameter(
                "min_samples must be at least 1".to_string(),
            ));
        }
        Ok(Self { eps, min_samples })
    }

    /// Neighborhood of every point, itself included.
    fn neighborhoods(&self, data: &Array2<f64>) -> Vec<Vec<usize>> {
        let n = data.nrows();
        let mut out = vec![Vec::new(); n];
        for i in 0..n {
            out[i].push(i);
            for j in (i + 1)..n {
                if cosine_distance(data.row(i), data.row(j)) <= self.eps {
                    out[i].push(j);
                    out[j].push(i);
                }
            }
        }
        for nb in out.iter_mut() {
            nb.sort_unstable();
        }
        out
    }

    /// One label per row of `data`.
    pub fn fit_predict(&self, data: &Array2<f64>) -> Vec<i32> {
        let n = data.nrows();
        let neighbors = self.neighborhoods(data);
        let is_core: Vec<bool> = neighbors
            .iter()
            .map(|nb| nb.len() >= self.min_samples)
            .collect();

        let mut labels = vec![UNVISITED; n];
        let mut next_id = 0;

        for seed in 0..n {
            if labels[seed] != UNVISITED || !is_core[seed] {
                continue;
            }
            let id = next_id;
            next_id += 1;
            labels[seed] = id;

            let mut queue: VecDeque<usize> = VecDeque::from([seed]);
            while let Some(p) = queue.pop_front() {
                if !is_core[p] {
                    continue;
                }
                for &q in &neighbors[p] {
                    if labels[q] == UNVISITED {
                        labels[q] = id;
                        queue.push_back(q);
                    }
                }
            }
        }

        for l in labels.iter_mut() {
            if *l == UNVISITED {
                *l = NOISE;
            }
        }

        debug!(
            target: "cluster",
            points = n,
            clusters = next_id,
            noise = labels.iter().filter(|&&l| l == NOISE).count(),
            "dbscan finished"
        );
        labels
    }
}

/// Validate parameters and cluster in one call.
pub fn cluster(data: &Array2<f64>, eps: f64, min_samples: usize) -> Result<Vec<i32>> {
    Ok(Dbscan::new(eps, min_samples)?.fit_predict(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn cosine_distance_basics() {
        let a = array![1.0, 0.0];
        let b = array![0.0, 1.0];
        let z = Array1::<f64>::zeros(2);
        assert!(cosine_distance(a.view(), a.view()).abs() < 1e-12);
        assert!((cosine_distance(a.view(), b.view()) - 1.0).abs() < 1e-12);
        assert!((cosine_distance(a.view(), a.mapv(|x| -x).view()) - 2.0).abs() < 1e-12);
        assert_eq!(cosine_distance(z.view(), a.view()), 1.0);
        assert_eq!(cosine_distance(z.view(), z.view()), 1.0);
    }

    #[test]
    fn two_groups_and_a_noise_point() {
        let data = array![
            [1.0, 0.0, 0.0],
            [0.99, 0.1, 0.0],
            [0.0, 1.0, 0.0],
            [0.05, 0.98, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let labels = cluster(&data, 0.2, 2).unwrap();
        assert_eq!(labels, vec![0, 0, 1, 1, NOISE]);
    }

    #[test]
    fn border_point_joins_chain() {
        // b is core (a, b, c within eps of b); a and c are not core with min_samples 3.
        let data = array![[1.0, 0.0], [1.0, 0.4], [1.0, 0.8]];
        let d_ab = cosine_distance(data.row(0), data.row(1));
        let d_ac = cosine_distance(data.row(0), data.row(2));
        let eps = (d_ab + d_ac) / 2.0;
        let labels = cluster(&data, eps, 3).unwrap();
        assert_eq!(labels, vec![0, 0, 0]);
    }

    #[test]
    fn zero_vectors_are_noise_unless_min_samples_is_one() {
        let data = Array2::<f64>::zeros((3, 4));
        assert_eq!(cluster(&data, 0.5, 2).unwrap(), vec![NOISE; 3]);
        assert_eq!(cluster(&data, 0.5, 1).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn rejects_bad_parameters() {
        let data = Array2::<f64>::zeros((2, 1));
        assert!(matches!(
            cluster(&data, 0.0, 2),
            Err(AnalyzeError::InvalidParameter(_))
        ));
        assert!(matches!(
            cluster(&data, f64::NAN, 2),
            Err(AnalyzeError::InvalidParameter(_))
        ));
        assert!(matches!(
            cluster(&data, 0.5, 0),
            Err(AnalyzeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn deterministic_across_runs() {
        let data = array![[1.0, 0.1], [0.9, 0.2], [0.1, 1.0], [0.2, 0.9], [0.7, 0.7]];
        let first = cluster(&data, 0.1, 2).unwrap();
        for _ in 0..5 {
            assert_eq!(cluster(&data, 0.1, 2).unwrap(), first);
        }
    }
}
