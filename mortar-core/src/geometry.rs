//! Boundary segment geometries and shape functions.
//!
//! The [`Geometry`] trait is the shape provider consumed by the contact
//! condition: shape-function values and local gradients, Jacobians, integration
//! points and the inverse mapping used by projections. Implementations are
//! stateless; nodal coordinates are passed in on every call, in the same way
//! element stiffness routines receive their coordinates.
//!
//! # Submodules
//!
//! - [`gauss`] - Gauss quadrature rules for lines, triangles and quadrilaterals
//! - [`line`] - 2- and 3-node line segments (2D)
//! - [`triangle`] - 3-node triangular faces (3D)
//! - [`quadrilateral`] - 4-node quadrilateral faces (3D)

use crate::types::{Dimension, Point3, Vec3};
use nalgebra::{DMatrix, DVector, Vector2};
use std::fmt;

pub mod gauss;
pub mod line;
pub mod quadrilateral;
pub mod triangle;

pub use gauss::{gauss_1d, gauss_quad, gauss_tri, GaussPoint};
pub use line::{Line2, Line3};
pub use quadrilateral::Quadrilateral4;
pub use triangle::Triangle3;

/// Local (natural) coordinates on a segment. Lines only use the first entry.
pub type LocalPoint = Vector2<f64>;

/// Maximum Gauss-Newton iterations of the inverse mapping.
const INVERSE_MAP_MAX_ITERATIONS: usize = 25;

/// Convergence tolerance of the inverse mapping, in local units.
const INVERSE_MAP_TOLERANCE: f64 = 1e-13;

/// Supported segment geometry types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// 2-node line in the plane (linear).
    Line2,
    /// 3-node line in the plane (quadratic), mid node last.
    Line3,
    /// 3-node triangular face in space.
    Triangle3,
    /// 4-node quadrilateral face in space.
    Quadrilateral4,
}

impl GeometryType {
    /// Number of nodes for this geometry type.
    pub fn n_nodes(self) -> usize {
        match self {
            GeometryType::Line2 => 2,
            GeometryType::Line3 => 3,
            GeometryType::Triangle3 => 3,
            GeometryType::Quadrilateral4 => 4,
        }
    }

    /// Working space dimension.
    pub fn dimension(self) -> Dimension {
        match self {
            GeometryType::Line2 | GeometryType::Line3 => Dimension::Two,
            GeometryType::Triangle3 | GeometryType::Quadrilateral4 => Dimension::Three,
        }
    }
}

/// Integration order of the extended Gauss rules (1 to 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegrationOrder(u8);

impl IntegrationOrder {
    /// Create an integration order, or `None` outside 1..=5.
    pub fn new(order: u32) -> Option<Self> {
        if (1..=5).contains(&order) {
            Some(Self(order as u8))
        } else {
            None
        }
    }

    /// Numeric order.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Segment geometry interface.
///
/// Coordinates are always 3D points; plane geometries keep z = 0.
pub trait Geometry: Send + Sync + fmt::Debug {
    /// Geometry type tag.
    fn geometry_type(&self) -> GeometryType;

    /// Number of nodes.
    fn n_nodes(&self) -> usize {
        self.geometry_type().n_nodes()
    }

    /// Working space dimension.
    fn dimension(&self) -> Dimension {
        self.geometry_type().dimension()
    }

    /// Number of local coordinates (1 for lines, 2 for faces).
    fn local_dimension(&self) -> usize {
        self.dimension().n() - 1
    }

    /// Shape function values at a local point.
    fn shape_functions(&self, local: &LocalPoint) -> DVector<f64>;

    /// Shape function local gradients, shape (n_nodes, local_dimension).
    fn shape_function_gradients(&self, local: &LocalPoint) -> DMatrix<f64>;

    /// Local coordinates of the nodes, in node order.
    fn node_local_coordinates(&self) -> Vec<LocalPoint>;

    /// Local coordinates of the segment center.
    fn center_local(&self) -> LocalPoint;

    /// Integration points of the requested order.
    fn integration_points(&self, order: IntegrationOrder) -> Vec<GaussPoint>;

    /// Default integration order when none is configured.
    fn default_integration_order(&self) -> IntegrationOrder;

    /// Whether a local point lies in the reference domain.
    fn contains_local(&self, local: &LocalPoint, tolerance: f64) -> bool;

    /// Map a local point to global coordinates: x = Σ Nᵢ xᵢ.
    fn global_coordinates(&self, coords: &[Point3], local: &LocalPoint) -> Point3 {
        let n = self.shape_functions(local);
        coords
            .iter()
            .zip(n.iter())
            .fold(Point3::zeros(), |acc, (x, &ni)| acc + x * ni)
    }

    /// Jacobian dx/dξ, shape (3, local_dimension).
    fn jacobian(&self, coords: &[Point3], local: &LocalPoint) -> DMatrix<f64> {
        let dn = self.shape_function_gradients(local);
        let mut j = DMatrix::zeros(3, self.local_dimension());
        for (i, x) in coords.iter().enumerate() {
            for r in 0..self.local_dimension() {
                for a in 0..3 {
                    j[(a, r)] += x[a] * dn[(i, r)];
                }
            }
        }
        j
    }

    /// Surface Jacobian determinant (length or area ratio).
    fn jacobian_determinant(&self, coords: &[Point3], local: &LocalPoint) -> f64 {
        let j = self.jacobian(coords, local);
        match self.local_dimension() {
            1 => j.column(0).norm(),
            _ => {
                let t1 = Vec3::new(j[(0, 0)], j[(1, 0)], j[(2, 0)]);
                let t2 = Vec3::new(j[(0, 1)], j[(1, 1)], j[(2, 1)]);
                t1.cross(&t2).norm()
            }
        }
    }

    /// Segment measure: length of a line or area of a face.
    fn measure(&self, coords: &[Point3]) -> f64 {
        let order = IntegrationOrder(5);
        self.integration_points(order)
            .iter()
            .map(|gp| gp.weight * self.jacobian_determinant(coords, &gp.local()))
            .sum()
    }

    /// Characteristic length used by the active-set tolerance.
    ///
    /// Lines return their length, faces the square root of their area.
    fn length(&self, coords: &[Point3]) -> f64 {
        match self.local_dimension() {
            1 => self.measure(coords),
            _ => self.measure(coords).sqrt(),
        }
    }

    /// Global coordinates of the segment center.
    fn center(&self, coords: &[Point3]) -> Point3 {
        self.global_coordinates(coords, &self.center_local())
    }

    /// Unit normal at a local point.
    ///
    /// Lines use (t_y, -t_x), so counter-clockwise boundary ordering gives the
    /// outward normal. Faces use t₁ × t₂. Returns `None` for degenerate segments.
    fn unit_normal(&self, coords: &[Point3], local: &LocalPoint) -> Option<Vec3> {
        let j = self.jacobian(coords, local);
        let normal = match self.local_dimension() {
            1 => Vec3::new(j[(1, 0)], -j[(0, 0)], 0.0),
            _ => {
                let t1 = Vec3::new(j[(0, 0)], j[(1, 0)], j[(2, 0)]);
                let t2 = Vec3::new(j[(0, 1)], j[(1, 1)], j[(2, 1)]);
                t1.cross(&t2)
            }
        };
        normal.try_normalize(f64::EPSILON)
    }

    /// Inverse mapping: local coordinates of the closest point on the segment.
    ///
    /// Returns `Some(local)` when the mapped point lies inside the reference
    /// domain (within `tolerance`), `None` otherwise or when the iteration
    /// breaks down. Contact conditions project along normals with
    /// [`project_direction`](crate::projection::project_direction) instead;
    /// this is for callers locating arbitrary points on a segment.
    fn is_inside(&self, coords: &[Point3], point: &Point3, tolerance: f64) -> Option<LocalPoint> {
        let ld = self.local_dimension();
        let mut local = self.center_local();

        for _ in 0..INVERSE_MAP_MAX_ITERATIONS {
            let residual = point - self.global_coordinates(coords, &local);
            let j = self.jacobian(coords, &local);
            let jt = j.transpose();
            let jtj = &jt * &j;
            let rhs = &jt * DVector::from_column_slice(residual.as_slice());
            let delta = jtj.lu().solve(&rhs)?;

            local[0] += delta[0];
            if ld > 1 {
                local[1] += delta[1];
            }
            if delta.norm() < INVERSE_MAP_TOLERANCE {
                break;
            }
        }

        if self.contains_local(&local, tolerance) {
            Some(local)
        } else {
            None
        }
    }
}

/// Create a geometry implementation from its type.
pub fn create_geometry(geometry_type: GeometryType) -> Box<dyn Geometry> {
    match geometry_type {
        GeometryType::Line2 => Box::new(Line2),
        GeometryType::Line3 => Box::new(Line3),
        GeometryType::Triangle3 => Box::new(Triangle3),
        GeometryType::Quadrilateral4 => Box::new(Quadrilateral4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL_TYPES: [GeometryType; 4] = [
        GeometryType::Line2,
        GeometryType::Line3,
        GeometryType::Triangle3,
        GeometryType::Quadrilateral4,
    ];

    #[test]
    fn test_integration_order_range() {
        assert!(IntegrationOrder::new(0).is_none());
        assert!(IntegrationOrder::new(6).is_none());
        assert_eq!(IntegrationOrder::new(3).unwrap().get(), 3);
    }

    #[test]
    fn test_partition_of_unity_everywhere() {
        for t in ALL_TYPES {
            let geom = create_geometry(t);
            for gp in geom.integration_points(IntegrationOrder::new(3).unwrap()) {
                let n = geom.shape_functions(&gp.local());
                assert_eq!(n.len(), t.n_nodes());
                assert_relative_eq!(n.sum(), 1.0, epsilon = 1e-14);

                // Gradients of a partition of unity sum to zero
                let dn = geom.shape_function_gradients(&gp.local());
                assert_eq!(dn.nrows(), t.n_nodes());
                assert_eq!(dn.ncols(), geom.local_dimension());
                for r in 0..geom.local_dimension() {
                    assert_relative_eq!(dn.column(r).sum(), 0.0, epsilon = 1e-14);
                }
            }
        }
    }

    #[test]
    fn test_kronecker_property_at_nodes() {
        for t in ALL_TYPES {
            let geom = create_geometry(t);
            for (i, xi) in geom.node_local_coordinates().iter().enumerate() {
                let n = geom.shape_functions(xi);
                for k in 0..t.n_nodes() {
                    let expected = if i == k { 1.0 } else { 0.0 };
                    assert_relative_eq!(n[k], expected, epsilon = 1e-14);
                }
            }
        }
    }

    #[test]
    fn test_line_unit_normal_orientation() {
        let geom = Line2;
        // Top edge of a body traversed right to left: outward normal is +y
        let coords = vec![Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)];
        let n = geom.unit_normal(&coords, &LocalPoint::zeros()).unwrap();
        assert_relative_eq!(n, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-14);
    }

    #[test]
    fn test_degenerate_normal_is_none() {
        let geom = Line2;
        let coords = vec![Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, 1.0, 0.0)];
        assert!(geom.unit_normal(&coords, &LocalPoint::zeros()).is_none());
    }
}
