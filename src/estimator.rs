//! Pure estimation math over a register set.
//!
//! The raw harmonic-mean estimate `alpha_mm / sum(2^-register)` is biased for
//! small cardinalities, so estimates at or below `2.5 * m` are replaced by
//! linear counting over the number of still-empty registers whenever at least
//! one register is empty.

use crate::register_set::RegisterSet;

/// Estimates the number of distinct elements recorded in `registers`.
///
/// `alpha_mm` is the bias-correction constant for the register count, as
/// produced by [`alpha_mm`].
pub fn cardinality(registers: &RegisterSet, alpha_mm: f64) -> u64 {
    let mut register_sum = 0.0;
    let mut zeros = 0usize;
    for value in registers.iter() {
        register_sum += 1.0 / ((1u64 << value) as f64);
        if value == 0 {
            zeros += 1;
        }
    }

    let m = registers.count();
    let estimate = alpha_mm * (1.0 / register_sum);
    if estimate <= 2.5 * (m as f64) && zeros > 0 {
        linear_counting(m, zeros).round() as u64
    } else {
        estimate.round() as u64
    }
}

/// Bias-correction constant `alpha * m^2` for `m = 2^log2m` registers.
///
/// The closed-form expression approximates alpha poorly for very few
/// registers, so the three smallest precisions use fixed constants.
pub fn alpha_mm(log2m: u32, m: usize) -> f64 {
    let m = m as f64;
    match log2m {
        4 => 0.673 * m * m,
        5 => 0.697 * m * m,
        6 => 0.709 * m * m,
        _ => (0.7213 / (1.0 + 1.079 / m)) * m * m,
    }
}

/// Linear-counting estimate `m * ln(m / zeros)` from the number of empty
/// registers. Callers ensure `zeros > 0`.
pub fn linear_counting(m: usize, zeros: usize) -> f64 {
    (m as f64) * ((m as f64) / (zeros as f64)).ln()
}
