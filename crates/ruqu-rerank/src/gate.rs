//! Gate set used by the feature map
//!
//! Only real-valued gates are needed: RY rotations and CNOTs keep every
//! amplitude real, so the simulator works on plain `f64`.

use crate::types::QubitIndex;

/// Quantum gate operations supported by the real-amplitude simulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// RY(theta) on one qubit
    Ry(QubitIndex, f64),
    /// Controlled bit flip: CNOT(control, target)
    Cnot(QubitIndex, QubitIndex),
}

impl Gate {
    /// Return the qubit indices this gate acts on.
    pub fn qubits(&self) -> Vec<QubitIndex> {
        match self {
            Gate::Ry(q, _) => vec![*q],
            Gate::Cnot(c, t) => vec![*c, *t],
        }
    }

    /// Return the 2x2 real matrix for single-qubit gates; `None` otherwise.
    pub fn matrix_1q(&self) -> Option<[[f64; 2]; 2]> {
        match self {
            // Ry(theta) = [[cos(t/2), -sin(t/2)], [sin(t/2), cos(t/2)]]
            Gate::Ry(_, theta) => {
                let half = *theta / 2.0;
                let cos_h = half.cos();
                let sin_h = half.sin();
                Some([[cos_h, -sin_h], [sin_h, cos_h]])
            }
            Gate::Cnot(_, _) => None,
        }
    }
}
