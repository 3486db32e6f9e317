//! Embedding → rotation-angle projection
//!
//! A [`Projection`] is the trained artifact: a mean vector, `Q` component rows
//! and the per-component bounds observed on the training corpus. The
//! [`FeatureProjector`] wraps a validated projection and turns embeddings into
//! [`FeatureVector`]s whose angles always lie in `[0, π]`.

use crate::error::{RerankError, Result};
use crate::state::MAX_QUBITS;
use crate::types::FeatureVector;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Denominator used when a component's training range is zero-width.
pub const DEGENERATE_RANGE_EPS: f64 = 1e-12;

/// Linear map from `D` embedding dimensions to `Q` features, plus bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Per-dimension mean subtracted before projecting (length `D`)
    pub mean: Vec<f64>,
    /// `Q` rows of length `D`
    pub components: Vec<Vec<f64>>,
    /// Minimum projected value per component over the training corpus
    pub mins: Vec<f64>,
    /// Maximum projected value per component over the training corpus
    pub maxs: Vec<f64>,
}

impl Projection {
    /// Build and validate a projection.
    pub fn new(
        mean: Vec<f64>,
        components: Vec<Vec<f64>>,
        mins: Vec<f64>,
        maxs: Vec<f64>,
    ) -> Result<Self> {
        let projection = Self {
            mean,
            components,
            mins,
            maxs,
        };
        projection.validate()?;
        Ok(projection)
    }

    /// Zero-mean projection whose rows are the first `num_components` rows of
    /// the `input_dim` identity matrix, with the given bounds on every
    /// component.
    pub fn truncated_identity(
        input_dim: usize,
        num_components: usize,
        min: f64,
        max: f64,
    ) -> Result<Self> {
        let components = (0..num_components)
            .map(|i| {
                let mut row = vec![0.0; input_dim];
                if i < input_dim {
                    row[i] = 1.0;
                }
                row
            })
            .collect();
        Self::new(
            vec![0.0; input_dim],
            components,
            vec![min; num_components],
            vec![max; num_components],
        )
    }

    /// Embedding dimensionality `D`.
    pub fn input_dim(&self) -> usize {
        self.mean.len()
    }

    /// Number of output features `Q` (= qubit count).
    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Check every structural invariant of the projection.
    pub fn validate(&self) -> Result<()> {
        let d = self.input_dim();
        let q = self.num_components();

        if d == 0 {
            return Err(RerankError::projection("input dimension is zero"));
        }
        if q == 0 {
            return Err(RerankError::projection("projection has no components"));
        }
        if q > MAX_QUBITS {
            return Err(RerankError::QubitLimitExceeded {
                requested: q,
                maximum: MAX_QUBITS,
            });
        }
        for row in &self.components {
            if row.len() != d {
                return Err(RerankError::dimension("projection row", d, row.len()));
            }
        }
        if self.mins.len() != q {
            return Err(RerankError::dimension("projection mins", q, self.mins.len()));
        }
        if self.maxs.len() != q {
            return Err(RerankError::dimension("projection maxs", q, self.maxs.len()));
        }

        let all_finite = self.mean.iter().all(|v| v.is_finite())
            && self.components.iter().flatten().all(|v| v.is_finite())
            && self.mins.iter().all(|v| v.is_finite())
            && self.maxs.iter().all(|v| v.is_finite());
        if !all_finite {
            return Err(RerankError::projection("non-finite value in projection"));
        }

        for (i, (lo, hi)) in self.mins.iter().zip(&self.maxs).enumerate() {
            if lo > hi {
                return Err(RerankError::projection(format!(
                    "component {} has min {} > max {}",
                    i, lo, hi
                )));
            }
        }
        Ok(())
    }
}

/// Projects embeddings onto the bounded feature space.
#[derive(Debug, Clone)]
pub struct FeatureProjector {
    projection: Projection,
}

impl FeatureProjector {
    /// Wrap a projection after validating it.
    pub fn new(projection: Projection) -> Result<Self> {
        projection.validate()?;
        Ok(Self { projection })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn input_dim(&self) -> usize {
        self.projection.input_dim()
    }

    pub fn num_features(&self) -> usize {
        self.projection.num_components()
    }

    /// Project an embedding to `Q` rotation angles in `[0, π]`.
    pub fn project(&self, embedding: &[f32]) -> Result<FeatureVector> {
        let raw = self.raw_components(embedding)?;
        Ok(self.scale(&raw))
    }

    /// Mean-centred projection onto each component row, before scaling.
    pub fn raw_components(&self, embedding: &[f32]) -> Result<Vec<f64>> {
        let d = self.input_dim();
        if embedding.len() != d {
            return Err(RerankError::dimension("embedding", d, embedding.len()));
        }

        let centred: Vec<f64> = embedding
            .iter()
            .zip(&self.projection.mean)
            .map(|(&x, &m)| x as f64 - m)
            .collect();

        Ok(self
            .projection
            .components
            .iter()
            .map(|row| row.iter().zip(&centred).map(|(w, x)| w * x).sum())
            .collect())
    }

    /// Min-max scale raw components into angles, clamping out-of-range values.
    fn scale(&self, raw: &[f64]) -> FeatureVector {
        let angles = raw
            .iter()
            .zip(self.projection.mins.iter().zip(&self.projection.maxs))
            .map(|(&x, (&lo, &hi))| {
                let mut span = hi - lo;
                if span == 0.0 {
                    span = DEGENERATE_RANGE_EPS;
                }
                let unit = ((x - lo) / span).clamp(0.0, 1.0);
                // NaN survives clamp; map it to the lower bound.
                if unit.is_nan() {
                    0.0
                } else {
                    PI * unit
                }
            })
            .collect();
        FeatureVector::from_clamped(angles)
    }
}
