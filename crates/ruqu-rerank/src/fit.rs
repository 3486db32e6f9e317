//! Offline projection fitting (PCA)
//!
//! Fits the mean, the top principal components and the per-component bounds
//! from a corpus of embeddings. Components are extracted from the sample
//! covariance by power iteration with deflation; each component's sign is
//! fixed so that its largest-magnitude entry is positive, which makes the fit
//! reproducible across runs.

use crate::error::{RerankError, Result};
use crate::projection::{FeatureProjector, Projection};
use crate::state::MAX_QUBITS;
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, info};

/// Power-iteration settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    pub max_iterations: usize,
    /// Relative change in the Rayleigh quotient that counts as converged
    pub tolerance: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-12,
        }
    }
}

/// A fitted projection together with the variance each component explains.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionFit {
    pub projection: Projection,
    /// Covariance eigenvalue per component, in extraction order
    pub eigenvalues: Vec<f64>,
}

/// Fits [`Projection`]s from training embeddings.
#[derive(Debug, Clone, Default)]
pub struct ProjectionFitter {
    config: FitConfig,
}

impl ProjectionFitter {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    /// Fit `num_components` principal components and their bounds.
    pub fn fit(&self, embeddings: &[Vec<f32>], num_components: usize) -> Result<ProjectionFit> {
        let data = to_matrix(embeddings)?;
        let (n, d) = data.dim();
        if num_components == 0 || num_components > d.min(MAX_QUBITS) {
            return Err(RerankError::invalid_argument(format!(
                "num_components must be in 1..={}, got {}",
                d.min(MAX_QUBITS),
                num_components
            )));
        }

        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| RerankError::invalid_argument("empty training set"))?;
        let centred = &data - &mean;
        let denom = (n.max(2) - 1) as f64;
        let covariance = centred.t().dot(&centred) / denom;

        let mut deflated = covariance;
        let mut components: Vec<Array1<f64>> = Vec::with_capacity(num_components);
        let mut eigenvalues = Vec::with_capacity(num_components);

        for k in 0..num_components {
            let (eval, mut evec) = self.power_iteration(&deflated, &components);
            fix_sign(&mut evec);
            debug!(component = k, eigenvalue = eval, "principal component extracted");

            // Deflate: A <- A - lambda * v * v^T
            for i in 0..d {
                for j in 0..d {
                    deflated[[i, j]] -= eval * evec[i] * evec[j];
                }
            }
            eigenvalues.push(eval);
            components.push(evec);
        }

        // Bounds come from the same arithmetic the query path uses, so every
        // training embedding lands inside [0, pi] exactly.
        let unbounded = Projection::new(
            mean.to_vec(),
            components.iter().map(|c| c.to_vec()).collect(),
            vec![0.0; num_components],
            vec![0.0; num_components],
        )?;
        let projector = FeatureProjector::new(unbounded)?;
        let mut mins = vec![f64::INFINITY; num_components];
        let mut maxs = vec![f64::NEG_INFINITY; num_components];
        for embedding in embeddings {
            let raw = projector.raw_components(embedding)?;
            for (i, v) in raw.into_iter().enumerate() {
                mins[i] = mins[i].min(v);
                maxs[i] = maxs[i].max(v);
            }
        }

        let mut projection = projector.projection().clone();
        projection.mins = mins;
        projection.maxs = maxs;
        projection.validate()?;

        info!(
            samples = n,
            input_dim = d,
            components = num_components,
            "projection fitted"
        );
        Ok(ProjectionFit {
            projection,
            eigenvalues,
        })
    }

    /// Power iteration for the dominant eigenpair of a symmetric matrix,
    /// kept orthogonal to the components already extracted.
    fn power_iteration(&self, matrix: &Array2<f64>, previous: &[Array1<f64>]) -> (f64, Array1<f64>) {
        let n = matrix.nrows();
        // Non-uniform start so symmetric data cannot leave it orthogonal to
        // the dominant direction.
        let mut v = Array1::from_iter((0..n).map(|i| 1.0 + i as f64 / n as f64));
        orthogonalize(&mut v, previous);
        normalize(&mut v);
        let mut eigenvalue = 0.0;

        for _ in 0..self.config.max_iterations {
            let mut av = matrix.dot(&v);
            orthogonalize(&mut av, previous);

            // Rayleigh quotient
            let new_eigenvalue = v.dot(&av);

            let norm = av.dot(&av).sqrt();
            if norm > 1e-300 {
                v = av / norm;
            } else {
                // Nothing left in this subspace.
                eigenvalue = 0.0;
                break;
            }

            let scale = new_eigenvalue.abs().max(1.0);
            if (new_eigenvalue - eigenvalue).abs() < self.config.tolerance * scale {
                eigenvalue = new_eigenvalue;
                break;
            }
            eigenvalue = new_eigenvalue;
        }

        (eigenvalue.max(0.0), v)
    }
}

fn to_matrix(embeddings: &[Vec<f32>]) -> Result<Array2<f64>> {
    let first = embeddings
        .first()
        .ok_or_else(|| RerankError::invalid_argument("empty training set"))?;
    let d = first.len();
    if d == 0 {
        return Err(RerankError::invalid_argument("zero-length embeddings"));
    }
    let mut data = Array2::zeros((embeddings.len(), d));
    for (row, embedding) in embeddings.iter().enumerate() {
        if embedding.len() != d {
            return Err(RerankError::dimension("training embedding", d, embedding.len()));
        }
        for (col, &x) in embedding.iter().enumerate() {
            data[[row, col]] = x as f64;
        }
    }
    Ok(data)
}

fn orthogonalize(v: &mut Array1<f64>, basis: &[Array1<f64>]) {
    for u in basis {
        let proj = v.dot(u);
        v.scaled_add(-proj, u);
    }
}

fn normalize(v: &mut Array1<f64>) {
    let norm = v.dot(v).sqrt();
    if norm > 0.0 {
        v.mapv_inplace(|x| x / norm);
    }
}

fn fix_sign(v: &mut Array1<f64>) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        v.mapv_inplace(|x| -x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// Points spread along (1, 1, 0) with a little spread along z.
    fn line_corpus() -> Vec<Vec<f32>> {
        (0..40)
            .map(|i| {
                let t = i as f32 / 10.0 - 2.0;
                let z = if i % 2 == 0 { 0.05 } else { -0.05 };
                vec![t + 1.0, t + 1.0, z]
            })
            .collect()
    }

    #[test]
    fn test_first_component_follows_the_line() {
        let fit = ProjectionFitter::default().fit(&line_corpus(), 2).unwrap();
        let c0 = &fit.projection.components[0];
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let alignment = c0[0] * s + c0[1] * s;
        assert!(alignment > 0.999, "alignment {}", alignment);
        assert!(fit.eigenvalues[0] > fit.eigenvalues[1]);
    }

    #[test]
    fn test_components_are_orthonormal() {
        let fit = ProjectionFitter::default().fit(&line_corpus(), 3).unwrap();
        let c = &fit.projection.components;
        for i in 0..3 {
            for j in 0..3 {
                let dot: f64 = c[i].iter().zip(&c[j]).map(|(a, b)| a * b).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-6, "c{}.c{} = {}", i, j, dot);
            }
        }
    }

    #[test]
    fn test_training_corpus_spans_full_angle_range() {
        let corpus = line_corpus();
        let fit = ProjectionFitter::default().fit(&corpus, 2).unwrap();
        let projector = FeatureProjector::new(fit.projection).unwrap();
        let first: Vec<f64> = corpus
            .iter()
            .map(|e| projector.project(e).unwrap().angles()[0])
            .collect();
        assert!(first.iter().all(|&a| (0.0..=PI).contains(&a)));
        assert!(first.iter().any(|&a| a == 0.0));
        assert!(first.iter().any(|&a| a == PI));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let a = ProjectionFitter::default().fit(&line_corpus(), 2).unwrap();
        let b = ProjectionFitter::default().fit(&line_corpus(), 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_input() {
        let fitter = ProjectionFitter::default();
        assert!(fitter.fit(&[], 1).is_err());
        assert!(fitter.fit(&[vec![1.0, 2.0], vec![1.0]], 1).is_err());
        assert!(fitter.fit(&line_corpus(), 0).is_err());
        assert!(fitter.fit(&line_corpus(), 4).is_err());
    }

    #[test]
    fn test_constant_corpus_has_degenerate_bounds() {
        let corpus = vec![vec![0.5_f32, 0.5]; 5];
        let fit = ProjectionFitter::default().fit(&corpus, 1).unwrap();
        assert_eq!(fit.projection.mins, fit.projection.maxs);
        assert_eq!(fit.eigenvalues[0], 0.0);
    }
}
