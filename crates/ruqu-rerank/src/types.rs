//! Core types shared across the reranking pipeline

use crate::error::{RerankError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Opaque document identifier
pub type DocumentId = String;

/// Index of a qubit in the simulated register (bit 0 = least significant)
pub type QubitIndex = u32;

/// Rotation angles in `[0, π]`, one per qubit.
///
/// Produced by [`crate::projection::FeatureProjector`]; constructing one by
/// hand goes through [`FeatureVector::from_angles`], which enforces the range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    angles: Vec<f64>,
}

impl FeatureVector {
    /// Build a feature vector from explicit angles.
    ///
    /// Every angle must be finite and inside `[0, π]`.
    pub fn from_angles(angles: Vec<f64>) -> Result<Self> {
        if angles.is_empty() {
            return Err(RerankError::invalid_argument("feature vector is empty"));
        }
        if let Some((i, a)) = angles
            .iter()
            .enumerate()
            .find(|(_, a)| !a.is_finite() || **a < 0.0 || **a > PI)
        {
            return Err(RerankError::invalid_argument(format!(
                "feature {} = {} is outside [0, pi]",
                i, a
            )));
        }
        Ok(Self { angles })
    }

    /// Crate-internal constructor for angles already clamped by the projector.
    pub(crate) fn from_clamped(angles: Vec<f64>) -> Self {
        Self { angles }
    }

    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }
}

/// A shortlist entry handed over by the classical ANN index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: DocumentId,
    /// Similarity on whatever scale the ANN provider defines (higher is better)
    pub classical_score: f32,
}

impl Candidate {
    pub fn new(id: impl Into<DocumentId>, classical_score: f32) -> Self {
        Self {
            id: id.into(),
            classical_score,
        }
    }
}

impl<S: Into<DocumentId>> From<(S, f32)> for Candidate {
    fn from((id, classical_score): (S, f32)) -> Self {
        Candidate::new(id, classical_score)
    }
}

/// A reranked candidate with both component scores and the fused key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: DocumentId,
    pub classical_score: f32,
    /// Statevector fidelity against the query, in `[0, 1]`
    pub fidelity: f64,
    /// Fused ranking key
    pub score: f64,
    /// Position in the classical shortlist (0 = best); final tie-break key
    pub classical_rank: usize,
}
