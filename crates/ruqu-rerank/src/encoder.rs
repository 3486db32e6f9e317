//! Feature vector → statevector encoding
//!
//! The feature map is fixed: one RY per qubit driven by the matching feature,
//! then a CNOT chain over adjacent pairs in ascending order. Starting from
//! |0...0> every step is orthogonal, so the output is unit-norm; a deviation
//! beyond the configured tolerance is reported, never corrected.

use crate::circuit::FeatureMapCircuit;
use crate::error::{RerankError, Result};
use crate::state::{Statevector, MAX_QUBITS};
use crate::types::FeatureVector;
use tracing::warn;

/// Default tolerance on `|norm² - 1|` after encoding.
pub const DEFAULT_NORM_TOLERANCE: f64 = 1e-6;

/// Deterministic feature-map encoder for a fixed register size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateEncoder {
    num_qubits: u32,
    norm_tolerance: f64,
}

impl StateEncoder {
    pub fn new(num_qubits: usize) -> Result<Self> {
        Self::with_tolerance(num_qubits, DEFAULT_NORM_TOLERANCE)
    }

    pub fn with_tolerance(num_qubits: usize, norm_tolerance: f64) -> Result<Self> {
        if num_qubits == 0 {
            return Err(RerankError::invalid_argument(
                "encoder needs at least one qubit",
            ));
        }
        if num_qubits > MAX_QUBITS {
            return Err(RerankError::QubitLimitExceeded {
                requested: num_qubits,
                maximum: MAX_QUBITS,
            });
        }
        if !norm_tolerance.is_finite() || norm_tolerance <= 0.0 {
            return Err(RerankError::config(
                "norm_tolerance",
                "must be finite and > 0",
            ));
        }
        Ok(Self {
            num_qubits: num_qubits as u32,
            norm_tolerance,
        })
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    pub fn norm_tolerance(&self) -> f64 {
        self.norm_tolerance
    }

    /// Build the gate sequence for `features` without running it.
    pub fn circuit(&self, features: &FeatureVector) -> Result<FeatureMapCircuit> {
        if features.len() != self.num_qubits() {
            return Err(RerankError::dimension(
                "feature vector",
                self.num_qubits(),
                features.len(),
            ));
        }
        let mut circuit = FeatureMapCircuit::new(self.num_qubits);
        for (q, &theta) in features.angles().iter().enumerate() {
            circuit.ry(q as u32, theta);
        }
        circuit.cnot_chain();
        Ok(circuit)
    }

    /// Encode `features` into a statevector.
    pub fn encode(&self, features: &FeatureVector) -> Result<Statevector> {
        let circuit = self.circuit(features)?;
        let mut state = Statevector::new(self.num_qubits)?;
        for gate in circuit.gates() {
            state.apply_gate(gate)?;
        }

        let deviation = state.norm_deviation();
        if !self.is_within_tolerance(deviation) {
            warn!(
                deviation,
                tolerance = self.norm_tolerance,
                "numerical drift: encoded statevector is not unit-norm"
            );
        }
        Ok(state)
    }

    /// `true` when a state's norm deviation is acceptable for this encoder.
    pub fn is_within_tolerance(&self, deviation: f64) -> bool {
        deviation <= self.norm_tolerance
    }
}
