//! 4-node quadrilateral contact face.
//!
//! # Node Numbering
//!
//! ```text
//!  3-------2
//!  |   η   |
//!  |   +-ξ |
//!  |       |
//!  0-------1
//! ```
//!
//! Bilinear shape functions Nᵢ = ¼(1 + ξᵢξ)(1 + ηᵢη) on [-1, 1]².

use super::gauss::{gauss_quad, GaussPoint};
use super::{Geometry, GeometryType, IntegrationOrder, LocalPoint};
use nalgebra::{DMatrix, DVector};

/// Natural coordinates of the corner nodes.
const CORNERS: [(f64, f64); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// 4-node bilinear quadrilateral face in 3D.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quadrilateral4;

impl Geometry for Quadrilateral4 {
    fn geometry_type(&self) -> GeometryType {
        GeometryType::Quadrilateral4
    }

    fn shape_functions(&self, local: &LocalPoint) -> DVector<f64> {
        let (xi, eta) = (local[0], local[1]);
        DVector::from_iterator(
            4,
            CORNERS
                .iter()
                .map(|&(xi_i, eta_i)| 0.25 * (1.0 + xi_i * xi) * (1.0 + eta_i * eta)),
        )
    }

    fn shape_function_gradients(&self, local: &LocalPoint) -> DMatrix<f64> {
        let (xi, eta) = (local[0], local[1]);
        let mut dn = DMatrix::zeros(4, 2);
        for (i, &(xi_i, eta_i)) in CORNERS.iter().enumerate() {
            dn[(i, 0)] = 0.25 * xi_i * (1.0 + eta_i * eta);
            dn[(i, 1)] = 0.25 * eta_i * (1.0 + xi_i * xi);
        }
        dn
    }

    fn node_local_coordinates(&self) -> Vec<LocalPoint> {
        CORNERS
            .iter()
            .map(|&(xi, eta)| LocalPoint::new(xi, eta))
            .collect()
    }

    fn center_local(&self) -> LocalPoint {
        LocalPoint::zeros()
    }

    fn integration_points(&self, order: IntegrationOrder) -> Vec<GaussPoint> {
        gauss_quad(order.get())
    }

    fn default_integration_order(&self) -> IntegrationOrder {
        IntegrationOrder(2)
    }

    fn contains_local(&self, local: &LocalPoint, tolerance: f64) -> bool {
        local[0].abs() <= 1.0 + tolerance && local[1].abs() <= 1.0 + tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn test_quad_area() {
        let quad = Quadrilateral4;
        assert_relative_eq!(quad.measure(&unit_square()), 1.0, epsilon = 1e-13);
        assert_relative_eq!(quad.length(&unit_square()), 1.0, epsilon = 1e-13);
    }

    #[test]
    fn test_quad_is_inside() {
        let quad = Quadrilateral4;
        let local = quad
            .is_inside(&unit_square(), &Point3::new(0.75, 0.5, 1.0), 1e-9)
            .unwrap();
        assert_relative_eq!(local[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(local[1], 0.0, epsilon = 1e-12);
    }
}
