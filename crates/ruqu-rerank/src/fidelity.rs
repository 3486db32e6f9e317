//! State fidelity |<a|b>|^2 between real statevectors

use crate::error::{RerankError, Result};
use crate::state::Statevector;

/// Inner product <a|b>. Amplitudes are real, so conjugation is the identity.
pub fn inner_product(a: &Statevector, b: &Statevector) -> Result<f64> {
    if a.num_amplitudes() != b.num_amplitudes() {
        return Err(RerankError::dimension(
            "statevector comparison",
            a.num_amplitudes(),
            b.num_amplitudes(),
        ));
    }
    Ok(a.amplitudes()
        .iter()
        .zip(b.amplitudes())
        .map(|(x, y)| x * y)
        .sum())
}

/// State fidelity: |<a|b>|^2, in `[0, 1]` for unit-norm inputs.
///
/// Capped at 1.0 so rounding on `fidelity(x, x)` never reports more than a
/// perfect overlap.
pub fn fidelity(a: &Statevector, b: &Statevector) -> Result<f64> {
    let inner = inner_product(a, b)?;
    Ok((inner * inner).min(1.0))
}
