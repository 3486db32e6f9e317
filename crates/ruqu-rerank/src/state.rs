//! Real-amplitude state-vector simulator
//!
//! A dense vector of 2^n real amplitudes with the two gate kernels the
//! feature map needs. Index bit `i` is the value of qubit `i`
//! (little-endian), consistent across every kernel.

use crate::error::{RerankError, Result};
use crate::gate::Gate;
use crate::types::QubitIndex;

/// Maximum number of qubits supported by the reranker's simulator.
pub const MAX_QUBITS: usize = 20;

/// Quantum state represented as 2^n real amplitudes.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    amplitudes: Vec<f64>,
    num_qubits: u32,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Statevector {
    /// Create the |00...0> state for `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> Result<Self> {
        check_qubit_count(num_qubits)?;
        let n = 1usize << num_qubits;
        let mut amplitudes = vec![0.0; n];
        amplitudes[0] = 1.0;
        Ok(Self {
            amplitudes,
            num_qubits,
        })
    }

    /// Construct a state from an explicit amplitude vector.
    ///
    /// Validates that `amps.len() == 2^num_qubits` and that every amplitude
    /// is finite. Normalisation is not enforced here; see
    /// [`Statevector::norm_deviation`].
    pub fn from_amplitudes(amps: Vec<f64>, num_qubits: u32) -> Result<Self> {
        check_qubit_count(num_qubits)?;
        let expected = 1usize << num_qubits;
        if amps.len() != expected {
            return Err(RerankError::dimension("statevector", expected, amps.len()));
        }
        if amps.iter().any(|a| !a.is_finite()) {
            return Err(RerankError::invalid_argument(
                "statevector contains a non-finite amplitude",
            ));
        }
        Ok(Self {
            amplitudes: amps,
            num_qubits,
        })
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn num_amplitudes(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn into_amplitudes(self) -> Vec<f64> {
        self.amplitudes
    }

    /// |amplitude|^2 for each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a * a).collect()
    }

    /// Sum of squared amplitudes.
    pub fn norm_sq(&self) -> f64 {
        self.amplitudes.iter().map(|a| a * a).sum()
    }

    /// `|norm_sq - 1|`: how far the state has drifted from unit norm.
    pub fn norm_deviation(&self) -> f64 {
        (self.norm_sq() - 1.0).abs()
    }

    /// Probability that `qubit` is in state |1>.
    pub fn probability_of_qubit(&self, qubit: QubitIndex) -> f64 {
        let qubit_bit = 1usize << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & qubit_bit != 0)
            .map(|(_, a)| a * a)
            .sum()
    }

    // -------------------------------------------------------------------
    // Gate dispatch
    // -------------------------------------------------------------------

    /// Apply a gate to the state.
    pub fn apply_gate(&mut self, gate: &Gate) -> Result<()> {
        for &q in gate.qubits().iter() {
            self.validate_qubit(q)?;
        }

        match gate {
            Gate::Cnot(control, target) => {
                if control == target {
                    return Err(RerankError::invalid_argument(format!(
                        "CNOT requires distinct qubits, got {} and {}",
                        control, target
                    )));
                }
                self.apply_cnot(*control, *target);
                Ok(())
            }
            single => {
                // Every non-CNOT gate in the set has a 2x2 matrix.
                if let Some(matrix) = single.matrix_1q() {
                    self.apply_single_qubit_gate(single.qubits()[0], &matrix);
                }
                Ok(())
            }
        }
    }

    // -------------------------------------------------------------------
    // Single-qubit gate kernel
    // -------------------------------------------------------------------

    /// Apply a 2x2 real matrix to the given qubit.
    ///
    /// For each pair of amplitudes where the qubit bit is 0 (index `i`)
    /// versus 1 (index `j = i + step`), we apply the matrix transformation.
    pub fn apply_single_qubit_gate(&mut self, qubit: QubitIndex, matrix: &[[f64; 2]; 2]) {
        let step = 1usize << qubit;
        let n = self.amplitudes.len();

        let mut block_start = 0;
        while block_start < n {
            for i in block_start..block_start + step {
                let j = i + step;
                let a = self.amplitudes[i]; // qubit = 0
                let b = self.amplitudes[j]; // qubit = 1
                self.amplitudes[i] = matrix[0][0] * a + matrix[0][1] * b;
                self.amplitudes[j] = matrix[1][0] * a + matrix[1][1] * b;
            }
            block_start += step << 1;
        }
    }

    // -------------------------------------------------------------------
    // CNOT kernel
    // -------------------------------------------------------------------

    /// Swap the target-bit pairs of every basis index whose control bit is 1.
    pub fn apply_cnot(&mut self, control: QubitIndex, target: QubitIndex) {
        let control_bit = 1usize << control;
        let target_bit = 1usize << target;

        for i in 0..self.amplitudes.len() {
            // Visit each pair once, from its target=0 member.
            if i & control_bit != 0 && i & target_bit == 0 {
                self.amplitudes.swap(i, i | target_bit);
            }
        }
    }

    // -------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------

    fn validate_qubit(&self, qubit: QubitIndex) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(RerankError::invalid_argument(format!(
                "invalid qubit index {} for {}-qubit system",
                qubit, self.num_qubits
            )));
        }
        Ok(())
    }
}

fn check_qubit_count(num_qubits: u32) -> Result<()> {
    if num_qubits == 0 {
        return Err(RerankError::invalid_argument(
            "cannot create a statevector with 0 qubits",
        ));
    }
    if num_qubits as usize > MAX_QUBITS {
        return Err(RerankError::QubitLimitExceeded {
            requested: num_qubits as usize,
            maximum: MAX_QUBITS,
        });
    }
    Ok(())
}
