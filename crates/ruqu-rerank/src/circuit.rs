//! Feature-map circuit: an ordered gate sequence on a fixed register

use crate::gate::Gate;
use crate::types::QubitIndex;

/// An ordered sequence of gates on a qubit register.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMapCircuit {
    gates: Vec<Gate>,
    num_qubits: u32,
}

impl FeatureMapCircuit {
    /// Create a new empty circuit for the given number of qubits.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            gates: Vec::new(),
            num_qubits,
        }
    }

    pub fn ry(&mut self, q: QubitIndex, angle: f64) -> &mut Self {
        self.gates.push(Gate::Ry(q, angle));
        self
    }

    pub fn cnot(&mut self, control: QubitIndex, target: QubitIndex) -> &mut Self {
        self.gates.push(Gate::Cnot(control, target));
        self
    }

    /// CNOT(0→1), CNOT(1→2), ... in ascending order.
    pub fn cnot_chain(&mut self) -> &mut Self {
        for q in 0..self.num_qubits.saturating_sub(1) {
            self.gates.push(Gate::Cnot(q, q + 1));
        }
        self
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Longest path through the circuit taking qubit dependencies into account.
    pub fn depth(&self) -> u32 {
        let mut qubit_depth = vec![0u32; self.num_qubits as usize];

        for gate in &self.gates {
            let qubits = gate.qubits();
            let max_d = qubits
                .iter()
                .map(|&q| qubit_depth.get(q as usize).copied().unwrap_or(0))
                .max()
                .unwrap_or(0);
            for &q in &qubits {
                if (q as usize) < qubit_depth.len() {
                    qubit_depth[q as usize] = max_d + 1;
                }
            }
        }

        qubit_depth.into_iter().max().unwrap_or(0)
    }
}
