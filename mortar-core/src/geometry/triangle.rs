//! 3-node triangular contact face.
//!
//! # Node Numbering
//!
//! ```text
//!  η
//!  2
//!  |\
//!  | \
//!  |  \
//!  0---1  ξ
//! ```
//!
//! Shape functions on the unit triangle: N0 = 1 - ξ - η, N1 = ξ, N2 = η.

use super::gauss::{gauss_tri, GaussPoint};
use super::{Geometry, GeometryType, IntegrationOrder, LocalPoint};
use nalgebra::{DMatrix, DVector};

/// 3-node linear triangular face in 3D.
#[derive(Debug, Clone, Copy, Default)]
pub struct Triangle3;

impl Geometry for Triangle3 {
    fn geometry_type(&self) -> GeometryType {
        GeometryType::Triangle3
    }

    fn shape_functions(&self, local: &LocalPoint) -> DVector<f64> {
        let (xi, eta) = (local[0], local[1]);
        DVector::from_vec(vec![1.0 - xi - eta, xi, eta])
    }

    fn shape_function_gradients(&self, _local: &LocalPoint) -> DMatrix<f64> {
        DMatrix::from_row_slice(3, 2, &[
            -1.0, -1.0,
             1.0,  0.0,
             0.0,  1.0,
        ])
    }

    fn node_local_coordinates(&self) -> Vec<LocalPoint> {
        vec![
            LocalPoint::new(0.0, 0.0),
            LocalPoint::new(1.0, 0.0),
            LocalPoint::new(0.0, 1.0),
        ]
    }

    fn center_local(&self) -> LocalPoint {
        LocalPoint::new(1.0 / 3.0, 1.0 / 3.0)
    }

    fn integration_points(&self, order: IntegrationOrder) -> Vec<GaussPoint> {
        match order.get() {
            1 => gauss_tri(1),
            2 => gauss_tri(3),
            3 => gauss_tri(4),
            _ => gauss_tri(6),
        }
    }

    fn default_integration_order(&self) -> IntegrationOrder {
        IntegrationOrder(2)
    }

    fn contains_local(&self, local: &LocalPoint, tolerance: f64) -> bool {
        local[0] >= -tolerance && local[1] >= -tolerance && local[0] + local[1] <= 1.0 + tolerance
    }
}
