//! Gauss quadrature rules for segment integration.
//!
//! This module provides the quadrature rules used on contact segments:
//! - 1D Gauss-Legendre rules on lines
//! - Symmetric rules on the unit triangle
//! - Tensor-product rules on the reference quadrilateral
//!
//! # Usage
//!
//! ```
//! use mortar_core::geometry::gauss::{gauss_1d, gauss_tri};
//!
//! // 2-point 1D rule
//! for gp in gauss_1d(2) {
//!     // integrate at gp.xi() with weight gp.weight
//! }
//!
//! // 3-point triangle rule
//! for gp in gauss_tri(3) {
//!     // gp.xi(), gp.eta() are parametric coordinates on the unit triangle
//! }
//! ```

use super::LocalPoint;

/// A Gauss quadrature point with local coordinates and weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussPoint {
    /// Local coordinates.
    /// - For lines: [ξ, 0] with ξ in [-1, 1]
    /// - For triangles: [ξ, η] on the unit triangle (ξ = L2, η = L3)
    /// - For quadrilaterals: [ξ, η] in [-1, 1]²
    pub coords: [f64; 2],
    /// Integration weight.
    pub weight: f64,
}

impl GaussPoint {
    /// Create a new Gauss point.
    pub fn new(coords: [f64; 2], weight: f64) -> Self {
        Self { coords, weight }
    }

    /// Get ξ (first local coordinate).
    #[inline]
    pub fn xi(&self) -> f64 {
        self.coords[0]
    }

    /// Get η (second local coordinate).
    #[inline]
    pub fn eta(&self) -> f64 {
        self.coords[1]
    }

    /// Local coordinates as a vector.
    #[inline]
    pub fn local(&self) -> LocalPoint {
        LocalPoint::new(self.coords[0], self.coords[1])
    }
}

/// 1D Gauss-Legendre points and weights on [-1, 1].
///
/// # Arguments
///
/// * `n` - Number of integration points (1 to 5)
///
/// # Panics
///
/// Panics if `n` is not in 1..=5.
pub fn gauss_1d(n: usize) -> Vec<GaussPoint> {
    let pairs: Vec<(f64, f64)> = match n {
        1 => vec![(0.0, 2.0)],
        2 => {
            let p = 1.0 / 3.0_f64.sqrt();
            vec![(-p, 1.0), (p, 1.0)]
        }
        3 => {
            let p = (3.0 / 5.0_f64).sqrt();
            vec![(-p, 5.0 / 9.0), (0.0, 8.0 / 9.0), (p, 5.0 / 9.0)]
        }
        4 => {
            // Points: ±√((3 ∓ 2√(6/5))/7)
            let sqrt_6_5 = (6.0 / 5.0_f64).sqrt();
            let p1 = ((3.0 - 2.0 * sqrt_6_5) / 7.0).sqrt();
            let p2 = ((3.0 + 2.0 * sqrt_6_5) / 7.0).sqrt();
            // Weights: (18 ± √30) / 36
            let sqrt_30 = 30.0_f64.sqrt();
            let w1 = (18.0 + sqrt_30) / 36.0;
            let w2 = (18.0 - sqrt_30) / 36.0;
            vec![(-p2, w2), (-p1, w1), (p1, w1), (p2, w2)]
        }
        5 => {
            // Points: 0, ±(1/3)√(5 ∓ 2√(10/7))
            let sqrt_10_7 = (10.0 / 7.0_f64).sqrt();
            let p1 = (5.0 - 2.0 * sqrt_10_7).sqrt() / 3.0;
            let p2 = (5.0 + 2.0 * sqrt_10_7).sqrt() / 3.0;
            // Weights: 128/225, (322 ± 13√70) / 900
            let sqrt_70 = 70.0_f64.sqrt();
            let w0 = 128.0 / 225.0;
            let w1 = (322.0 + 13.0 * sqrt_70) / 900.0;
            let w2 = (322.0 - 13.0 * sqrt_70) / 900.0;
            vec![(-p2, w2), (-p1, w1), (0.0, w0), (p1, w1), (p2, w2)]
        }
        _ => panic!("gauss_1d: n must be in 1..=5, got {}", n),
    };

    pairs
        .into_iter()
        .map(|(xi, w)| GaussPoint::new([xi, 0.0], w))
        .collect()
}

/// Triangle quadrature points on the unit triangle (0,0), (1,0), (0,1).
///
/// Points are returned in parametric coordinates (ξ, η) = (L2, L3) and the
/// weights sum to 1/2 (area of the unit triangle).
///
/// # Arguments
///
/// * `n` - Number of integration points (1, 3, 4 or 6)
///
/// # Integration Order
///
/// - n=1: degree 1
/// - n=3: degree 2 (edge midpoints)
/// - n=4: degree 3
/// - n=6: degree 4
///
/// # Panics
///
/// Panics if `n` is not 1, 3, 4 or 6.
pub fn gauss_tri(n: usize) -> Vec<GaussPoint> {
    match n {
        1 => vec![GaussPoint::new([1.0 / 3.0, 1.0 / 3.0], 0.5)],
        3 => {
            let w = 1.0 / 6.0;
            vec![
                GaussPoint::new([0.5, 0.0], w),
                GaussPoint::new([0.5, 0.5], w),
                GaussPoint::new([0.0, 0.5], w),
            ]
        }
        4 => {
            let w_center = -27.0 / 96.0;
            let w_corner = 25.0 / 96.0;
            vec![
                GaussPoint::new([1.0 / 3.0, 1.0 / 3.0], w_center),
                GaussPoint::new([0.2, 0.2], w_corner),
                GaussPoint::new([0.6, 0.2], w_corner),
                GaussPoint::new([0.2, 0.6], w_corner),
            ]
        }
        6 => {
            // Dunavant degree-4 rule, two orbits of three points
            let a1 = 0.445_948_490_915_965;
            let b1 = 0.108_103_018_168_070;
            let w1 = 0.223_381_589_678_011 / 2.0;
            let a2 = 0.091_576_213_509_771;
            let b2 = 0.816_847_572_980_459;
            let w2 = 0.109_951_743_655_322 / 2.0;
            vec![
                GaussPoint::new([a1, a1], w1),
                GaussPoint::new([b1, a1], w1),
                GaussPoint::new([a1, b1], w1),
                GaussPoint::new([a2, a2], w2),
                GaussPoint::new([b2, a2], w2),
                GaussPoint::new([a2, b2], w2),
            ]
        }
        _ => panic!("gauss_tri: n must be 1, 3, 4, or 6, got {}", n),
    }
}

/// Quadrilateral Gauss points on [-1, 1]², tensor product of [`gauss_1d`].
///
/// # Arguments
///
/// * `n` - Number of points per direction (1 to 5)
///
/// Returns n² total integration points.
///
/// # Panics
///
/// Panics if `n` is not in 1..=5.
pub fn gauss_quad(n: usize) -> Vec<GaussPoint> {
    if !(1..=5).contains(&n) {
        panic!("gauss_quad: n must be in 1..=5, got {}", n);
    }

    let rule_1d = gauss_1d(n);
    let mut points = Vec::with_capacity(n * n);

    for p in &rule_1d {
        for q in &rule_1d {
            points.push(GaussPoint::new([p.xi(), q.xi()], p.weight * q.weight));
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gauss_1d_integrates_polynomials() {
        // 1-point rule integrates constants exactly
        // ∫_{-1}^{1} 3 dx = 6
        let integral: f64 = gauss_1d(1).iter().map(|gp| 3.0 * gp.weight).sum();
        assert_relative_eq!(integral, 6.0, epsilon = 1e-14);

        // 2-point rule integrates x² exactly
        let integral: f64 = gauss_1d(2)
            .iter()
            .map(|gp| gp.xi().powi(2) * gp.weight)
            .sum();
        assert_relative_eq!(integral, 2.0 / 3.0, epsilon = 1e-14);

        // 5-point rule integrates x⁸ exactly (degree 2n-1 = 9)
        let integral: f64 = gauss_1d(5)
            .iter()
            .map(|gp| gp.xi().powi(8) * gp.weight)
            .sum();
        assert_relative_eq!(integral, 2.0 / 9.0, epsilon = 1e-13);
    }

    #[test]
    fn test_gauss_1d_weights_sum() {
        // Weights should sum to 2 (length of [-1, 1])
        for n in 1..=5 {
            let sum: f64 = gauss_1d(n).iter().map(|gp| gp.weight).sum();
            assert_relative_eq!(sum, 2.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_gauss_tri_weights_sum() {
        // Weights should sum to 1/2 (area of unit triangle)
        for &n in &[1, 3, 4, 6] {
            let sum: f64 = gauss_tri(n).iter().map(|gp| gp.weight).sum();
            assert_relative_eq!(sum, 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gauss_tri_integrates_quadratic() {
        // ∫ ξ² dA over the unit triangle = 1/12
        for &n in &[3, 4, 6] {
            let integral: f64 = gauss_tri(n)
                .iter()
                .map(|gp| gp.xi().powi(2) * gp.weight)
                .sum();
            assert_relative_eq!(integral, 1.0 / 12.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gauss_quad_weights_sum() {
        // Weights should sum to 4 (area of [-1,1]²)
        for n in 1..=5 {
            let rule = gauss_quad(n);
            assert_eq!(rule.len(), n * n);
            let sum: f64 = rule.iter().map(|gp| gp.weight).sum();
            assert_relative_eq!(sum, 4.0, epsilon = 1e-13);
        }
    }

    #[test]
    #[should_panic(expected = "gauss_1d: n must be")]
    fn test_gauss_1d_invalid_n() {
        gauss_1d(6);
    }

    #[test]
    #[should_panic(expected = "gauss_tri: n must be")]
    fn test_gauss_tri_invalid_n() {
        gauss_tri(2);
    }
}
