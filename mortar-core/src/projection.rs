//! Directional projection of points onto segments.
//!
//! A point is projected along a direction (usually a slave normal) onto a
//! master segment by solving the ray/segment intersection
//!
//! ```text
//! x(ξ) = p + t·d
//! ```
//!
//! for the local coordinates ξ and the signed distance t. A projection that
//! misses the segment is not an error: it is reported as `None` and the
//! caller treats the point as not in contact.

use crate::geometry::{Geometry, LocalPoint};
use crate::types::{Point3, Vec3};
use nalgebra::{DMatrix, DVector};

/// Local tolerance when checking that the intersection lies on the segment.
pub const PROJECTION_TOLERANCE: f64 = 1e-9;

const MAX_ITERATIONS: usize = 30;
const CONVERGENCE_TOLERANCE: f64 = 1e-13;

/// Result of a successful projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Projected point on the segment (global coordinates).
    pub point: Point3,
    /// Signed distance along the unit direction. Positive means the segment
    /// lies ahead of the point.
    pub distance: f64,
    /// Local coordinates of the projected point on the segment.
    pub local: LocalPoint,
}

/// Project `origin` along `direction` onto a segment.
///
/// Returns `None` when the direction is degenerate, parallel to the segment,
/// or when the intersection falls outside the segment's local domain.
pub fn project_direction(
    geometry: &dyn Geometry,
    coords: &[Point3],
    origin: &Point3,
    direction: &Vec3,
) -> Option<Projection> {
    let d = direction.try_normalize(f64::EPSILON)?;
    let dim = geometry.dimension().n();
    let ld = geometry.local_dimension();

    // Plane estimate from the segment center
    let mut local = geometry.center_local();
    let center = geometry.center(coords);
    let center_normal = geometry.unit_normal(coords, &local)?;
    let dn = d.dot(&center_normal);
    let mut t = if dn.abs() > f64::EPSILON {
        (center - origin).dot(&center_normal) / dn
    } else {
        0.0
    };

    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        let x = geometry.global_coordinates(coords, &local);
        let residual = x - origin - d * t;
        let j = geometry.jacobian(coords, &local);

        // Square system in the working dimension: [J | -d] δ = -r
        let mut a = DMatrix::zeros(dim, dim);
        let mut rhs = DVector::zeros(dim);
        for row in 0..dim {
            for r in 0..ld {
                a[(row, r)] = j[(row, r)];
            }
            a[(row, ld)] = -d[row];
            rhs[row] = -residual[row];
        }

        let delta = a.lu().solve(&rhs)?;
        local[0] += delta[0];
        if ld > 1 {
            local[1] += delta[1];
        }
        t += delta[ld];

        if delta.norm() < CONVERGENCE_TOLERANCE {
            converged = true;
            break;
        }
    }

    if !converged || !geometry.contains_local(&local, PROJECTION_TOLERANCE) {
        return None;
    }

    Some(Projection {
        point: geometry.global_coordinates(coords, &local),
        distance: t,
        local,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Line2, Line3, Triangle3};
    use approx::assert_relative_eq;

    fn horizontal_master() -> Vec<Point3> {
        vec![Point3::new(0.0, 0.2, 0.0), Point3::new(2.0, 0.2, 0.0)]
    }

    #[test]
    fn test_projection_hits_line() {
        let p = project_direction(
            &Line2,
            &horizontal_master(),
            &Point3::new(0.5, 0.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(p.distance, 0.2, epsilon = 1e-12);
        assert_relative_eq!(p.point, Point3::new(0.5, 0.2, 0.0), epsilon = 1e-12);
        assert_relative_eq!(p.local[0], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_negative_distance_when_penetrated() {
        let p = project_direction(
            &Line2,
            &horizontal_master(),
            &Point3::new(1.0, 0.3, 0.0),
            &Vec3::new(0.0, 2.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(p.distance, -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_misses_segment() {
        let p = project_direction(
            &Line2,
            &horizontal_master(),
            &Point3::new(3.0, 0.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_projection_parallel_or_degenerate_direction() {
        let origin = Point3::new(0.5, 0.0, 0.0);
        assert!(project_direction(&Line2, &horizontal_master(), &origin, &Vec3::new(1.0, 0.0, 0.0)).is_none());
        assert!(project_direction(&Line2, &horizontal_master(), &origin, &Vec3::zeros()).is_none());
    }

    #[test]
    fn test_projection_oblique_direction() {
        // 45° ray from the origin hits y = 0.2 at x = 0.2
        let p = project_direction(
            &Line2,
            &horizontal_master(),
            &Point3::new(0.0, 0.0, 0.0),
            &Vec3::new(1.0, 1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(p.point, Point3::new(0.2, 0.2, 0.0), epsilon = 1e-12);
        assert_relative_eq!(p.distance, 0.2 * 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_projection_onto_curved_line() {
        // Parabolic arc y = 1 - x²
        let coords = vec![
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let p = project_direction(
            &Line3,
            &coords,
            &Point3::new(0.5, -1.0, 0.0),
            &Vec3::new(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(p.point[1], 0.75, epsilon = 1e-10);
        assert_relative_eq!(p.distance, 1.75, epsilon = 1e-10);
    }

    #[test]
    fn test_projection_onto_triangle() {
        let coords = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let p = project_direction(
            &Triangle3,
            &coords,
            &Point3::new(0.25, 0.25, 0.0),
            &Vec3::new(0.0, 0.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(p.distance, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.local[0], 0.25, epsilon = 1e-12);
        assert_relative_eq!(p.local[1], 0.25, epsilon = 1e-12);
    }
}
