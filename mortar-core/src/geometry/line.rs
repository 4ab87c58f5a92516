//! Line segments for plane contact problems.
//!
//! # Node Numbering
//!
//! ```text
//!  Line2:   0-----------1        ξ = -1, +1
//!  Line3:   0-----2-----1        ξ = -1, +1, 0
//! ```
//!
//! The quadratic line keeps its mid node last, so the first two nodes are
//! always the end points.

use super::gauss::{gauss_1d, GaussPoint};
use super::{Geometry, GeometryType, IntegrationOrder, LocalPoint};
use nalgebra::{DMatrix, DVector};

/// 2-node linear line segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Line2;

/// 3-node quadratic line segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Line3;

fn contains_line(local: &LocalPoint, tolerance: f64) -> bool {
    local[0].abs() <= 1.0 + tolerance
}

impl Geometry for Line2 {
    fn geometry_type(&self) -> GeometryType {
        GeometryType::Line2
    }

    fn shape_functions(&self, local: &LocalPoint) -> DVector<f64> {
        let xi = local[0];
        DVector::from_vec(vec![0.5 * (1.0 - xi), 0.5 * (1.0 + xi)])
    }

    fn shape_function_gradients(&self, _local: &LocalPoint) -> DMatrix<f64> {
        DMatrix::from_column_slice(2, 1, &[-0.5, 0.5])
    }

    fn node_local_coordinates(&self) -> Vec<LocalPoint> {
        vec![LocalPoint::new(-1.0, 0.0), LocalPoint::new(1.0, 0.0)]
    }

    fn center_local(&self) -> LocalPoint {
        LocalPoint::zeros()
    }

    fn integration_points(&self, order: IntegrationOrder) -> Vec<GaussPoint> {
        gauss_1d(order.get())
    }

    fn default_integration_order(&self) -> IntegrationOrder {
        IntegrationOrder(2)
    }

    fn contains_local(&self, local: &LocalPoint, tolerance: f64) -> bool {
        contains_line(local, tolerance)
    }
}

impl Geometry for Line3 {
    fn geometry_type(&self) -> GeometryType {
        GeometryType::Line3
    }

    fn shape_functions(&self, local: &LocalPoint) -> DVector<f64> {
        let xi = local[0];
        DVector::from_vec(vec![
            0.5 * xi * (xi - 1.0), // end node at ξ = -1
            0.5 * xi * (xi + 1.0), // end node at ξ = +1
            1.0 - xi * xi,         // mid node
        ])
    }

    fn shape_function_gradients(&self, local: &LocalPoint) -> DMatrix<f64> {
        let xi = local[0];
        DMatrix::from_column_slice(3, 1, &[xi - 0.5, xi + 0.5, -2.0 * xi])
    }

    fn node_local_coordinates(&self) -> Vec<LocalPoint> {
        vec![
            LocalPoint::new(-1.0, 0.0),
            LocalPoint::new(1.0, 0.0),
            LocalPoint::new(0.0, 0.0),
        ]
    }

    fn center_local(&self) -> LocalPoint {
        LocalPoint::zeros()
    }

    fn integration_points(&self, order: IntegrationOrder) -> Vec<GaussPoint> {
        gauss_1d(order.get())
    }

    fn default_integration_order(&self) -> IntegrationOrder {
        IntegrationOrder(3)
    }

    fn contains_local(&self, local: &LocalPoint, tolerance: f64) -> bool {
        contains_line(local, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point3;
    use approx::assert_relative_eq;

    #[test]
    fn test_line2_length_and_jacobian() {
        let coords = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 4.0, 0.0)];
        let line = Line2;
        assert_relative_eq!(line.length(&coords), 5.0, epsilon = 1e-13);
        // det J = L / 2 everywhere
        assert_relative_eq!(
            line.jacobian_determinant(&coords, &LocalPoint::new(0.3, 0.0)),
            2.5,
            epsilon = 1e-14
        );
        assert_relative_eq!(line.center(&coords), Point3::new(1.5, 2.0, 0.0), epsilon = 1e-14);
    }

    #[test]
    fn test_line3_straight_matches_line2() {
        let coords = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let line = Line3;
        assert_relative_eq!(line.length(&coords), 2.0, epsilon = 1e-13);
        let x = line.global_coordinates(&coords, &LocalPoint::new(0.5, 0.0));
        assert_relative_eq!(x, Point3::new(1.5, 0.0, 0.0), epsilon = 1e-14);
    }

    #[test]
    fn test_line2_is_inside() {
        let coords = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let line = Line2;

        let local = line
            .is_inside(&coords, &Point3::new(0.5, 0.0, 0.0), 1e-9)
            .unwrap();
        assert_relative_eq!(local[0], -0.5, epsilon = 1e-12);

        // Off the end of the segment
        assert!(line
            .is_inside(&coords, &Point3::new(2.5, 0.0, 0.0), 1e-9)
            .is_none());
    }

    #[test]
    fn test_line3_is_inside_curved() {
        // Parabolic arc y = 1 - x² through (-1,0), (1,0), (0,1)
        let coords = vec![
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let line = Line3;
        let target = line.global_coordinates(&coords, &LocalPoint::new(0.4, 0.0));
        let local = line.is_inside(&coords, &target, 1e-9).unwrap();
        assert_relative_eq!(local[0], 0.4, epsilon = 1e-10);
    }
}
