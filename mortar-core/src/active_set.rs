//! Active-set decision per integration point.
//!
//! A point is active when the gap interpolated from the slave nodes,
//!
//! ```text
//! g = Σ N1ᵢ gapᵢ / Σ N1ᵢ      (nodes with a valid gap only)
//! ```
//!
//! A node whose normal misses the master drops out of both sums, so it
//! neither pulls the gap toward zero nor counts as contact.
//!
//! does not exceed τ = factor × max(slave length, master length). The
//! decision depends on the current geometry only; nothing is carried over
//! between iterations.

use nalgebra::DVector;

/// Distance tolerance test of one slave/master pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveSetGate {
    tolerance: f64,
}

impl ActiveSetGate {
    /// Gate for a pair with the given characteristic lengths.
    pub fn new(factor: f64, slave_length: f64, master_length: f64) -> Self {
        let slave_tolerance = factor * slave_length;
        let master_tolerance = factor * master_length;
        Self {
            tolerance: slave_tolerance.max(master_tolerance),
        }
    }

    /// Distance tolerance τ.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Whether an interpolated gap is in contact. A missing gap never is.
    pub fn is_active(&self, gap: Option<f64>) -> bool {
        matches!(gap, Some(g) if g <= self.tolerance)
    }
}

/// Weight below which the valid nodes carry no gap information.
const MIN_GAP_WEIGHT: f64 = 1e-12;

/// Gap at an integration point, `None` when no slave node has a valid gap.
pub fn interpolated_gap(n1: &DVector<f64>, gaps: &[Option<f64>]) -> Option<f64> {
    let (weight, weighted) = n1
        .iter()
        .zip(gaps)
        .filter_map(|(&n, gap)| gap.map(|g| (n, n * g)))
        .fold((0.0_f64, 0.0_f64), |(w, s), (n, v)| (w + n, s + v));

    if weight.abs() < MIN_GAP_WEIGHT {
        None
    } else {
        Some(weighted / weight)
    }
}
