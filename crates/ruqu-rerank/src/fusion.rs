//! Score fusion: classical similarity + statevector fidelity → ranking key

use crate::error::{RerankError, Result};
use serde::{Deserialize, Serialize};

/// Default weight on the ANN's classical score.
pub const DEFAULT_CLASSICAL_WEIGHT: f64 = 0.3;
/// Default weight on fidelity.
pub const DEFAULT_QUANTUM_WEIGHT: f64 = 0.7;

/// How the two scores combine. Every variant is a pure, monotone
/// (non-decreasing in both inputs) function of `(classical, fidelity)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FusionPolicy {
    /// `classical * w_c + fidelity * w_q`
    WeightedSum { classical: f64, quantum: f64 },
    /// Rank by fidelity alone
    QuantumOnly,
    /// Rank by the ANN score alone
    ClassicalOnly,
}

impl Default for FusionPolicy {
    fn default() -> Self {
        FusionPolicy::WeightedSum {
            classical: DEFAULT_CLASSICAL_WEIGHT,
            quantum: DEFAULT_QUANTUM_WEIGHT,
        }
    }
}

impl FusionPolicy {
    /// Fuse one candidate's scores.
    pub fn fuse(&self, classical_score: f32, fidelity: f64) -> f64 {
        match *self {
            FusionPolicy::WeightedSum { classical, quantum } => {
                classical * classical_score as f64 + quantum * fidelity
            }
            FusionPolicy::QuantumOnly => fidelity,
            FusionPolicy::ClassicalOnly => classical_score as f64,
        }
    }

    /// Weights must be finite, non-negative and not both zero.
    pub fn validate(&self) -> Result<()> {
        if let FusionPolicy::WeightedSum { classical, quantum } = *self {
            for (name, w) in [("fusion.classical", classical), ("fusion.quantum", quantum)] {
                if !w.is_finite() || w < 0.0 {
                    return Err(RerankError::config(name, "must be finite and >= 0"));
                }
            }
            if classical + quantum <= 0.0 {
                return Err(RerankError::config(
                    "fusion",
                    "weights must not both be zero",
                ));
            }
        }
        Ok(())
    }
}
