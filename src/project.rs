//! # 2-D projection (PCA)
//! Projects document vectors onto their first two principal components.
//!
//! The covariance is V × V (V = vocabulary size, bounded by `max_features`),
//! so a cyclic Jacobi eigensolver is plenty. Each component is sign-fixed so
//! that its largest-magnitude loading is positive, which makes the output
//! deterministic for a given input.

use ndarray::{Array1, Array2, Axis};
use tracing::debug;

use crate::error::{AnalyzeError, Result};

pub const COMPONENTS: usize = 2;

const MAX_SWEEPS: usize = 100;
/// Eigenvalues at or below this are treated as zero variance.
const VARIANCE_EPS: f64 = 1e-12;

/// Symmetric eigendecomposition. Returns eigenvalues and eigenvectors (as
/// columns), unsorted.
pub fn symmetric_eigen(mut a: Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut v = Array2::<f64>::eye(n);
    let total: f64 = a.iter().map(|x| x * x).sum();

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                off += 2.0 * a[[p, q]] * a[[p, q]];
            }
        }
        if off <= 1e-24 * total {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    (a.diag().to_owned(), v)
}

/// Flip `vec` so its largest-magnitude entry is positive (first one wins ties).
fn fix_sign(vec: &mut Array1<f64>) {
    let mut pivot = 0.0f64;
    for &x in vec.iter() {
        if x.abs() > pivot.abs() {
            pivot = x;
        }
    }
    if pivot < 0.0 {
        vec.mapv_inplace(|x| -x);
    }
}

/// N × 2 coordinates. Components without variance come out as zeros.
pub fn project(data: &Array2<f64>) -> Result<Array2<f64>> {
    let (n, v) = data.dim();
    let mut out = Array2::<f64>::zeros((n, COMPONENTS));
    if n == 0 || v == 0 {
        return Ok(out);
    }
    if data.iter().any(|x| !x.is_finite()) {
        return Err(AnalyzeError::computation("projection input is not finite"));
    }

    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| AnalyzeError::computation("empty projection input"))?;
    let centered = data - &mean;
    let denom = n.saturating_sub(1).max(1) as f64;
    let cov = centered.t().dot(&centered) / denom;

    let (values, vectors) = symmetric_eigen(cov);
    let mut order: Vec<usize> = (0..v).collect();
    order.sort_by(|&i, &j| values[j].total_cmp(&values[i]));

    for (k, &idx) in order.iter().take(COMPONENTS).enumerate() {
        if values[idx] <= VARIANCE_EPS {
            continue;
        }
        let mut axis = vectors.column(idx).to_owned();
        fix_sign(&mut axis);
        out.column_mut(k).assign(&centered.dot(&axis));
    }

    if out.iter().any(|x| !x.is_finite()) {
        return Err(AnalyzeError::computation("projection produced non-finite coordinates"));
    }
    debug!(
        target: "project",
        points = n,
        features = v,
        top_variance = values[order[0]],
        "pca finished"
    );
    Ok(out)
}
