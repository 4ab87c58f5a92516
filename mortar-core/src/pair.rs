//! Per-pair contact data and per-point kinematics.
//!
//! [`ContactData`] is built once per slave/master pair and nonlinear
//! iteration: slave normals and tangents, multipliers, one gap per slave node
//! and the master normals. [`GeneralVariables`] holds the shape functions of
//! a single integration point and is never stored.
//!
//! # Dual Lagrange multiplier basis
//!
//! The multipliers are interpolated with a basis Φ biorthogonal to the slave
//! shape functions N1:
//!
//! ```text
//! ∫ Φᵢ N1ₖ dΓ = δᵢₖ ∫ N1ₖ dΓ
//! ```
//!
//! Closed forms exist for linear and quadratic lines, linear triangles and
//! bilinear quadrilaterals.

use crate::error::{Error, Result};
use crate::geometry::{
    create_geometry, Geometry, GeometryType, LocalPoint, Line3, Quadrilateral4,
};
use crate::mesh::ContactMesh;
use crate::projection::project_direction;
use crate::types::{Dimension, Point3, SegmentId, Vec3};
use nalgebra::{DMatrix, DVector};

/// Dual basis for the Lagrange multipliers of a slave segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LagrangeBasis {
    /// 2D, 2 slave nodes.
    Line2,
    /// 2D, 3 slave nodes.
    Line3,
    /// 3D, 3 slave nodes.
    Triangle3,
    /// 3D, 4 slave nodes.
    Quadrilateral4,
}

impl LagrangeBasis {
    /// Select the basis for a slave segment.
    pub fn select(dimension: Dimension, n_slave: usize) -> Result<Self> {
        match (dimension, n_slave) {
            (Dimension::Two, 2) => Ok(LagrangeBasis::Line2),
            (Dimension::Two, 3) => Ok(LagrangeBasis::Line3),
            (Dimension::Three, 3) => Ok(LagrangeBasis::Triangle3),
            (Dimension::Three, 4) => Ok(LagrangeBasis::Quadrilateral4),
            _ => Err(Error::unsupported(dimension.n(), None, n_slave)),
        }
    }

    /// Number of basis functions.
    pub fn n_nodes(self) -> usize {
        match self {
            LagrangeBasis::Line2 => 2,
            LagrangeBasis::Line3 | LagrangeBasis::Triangle3 => 3,
            LagrangeBasis::Quadrilateral4 => 4,
        }
    }

    /// Values Φ at a local coordinate.
    pub fn values(self, local: &LocalPoint) -> DVector<f64> {
        let (xi, eta) = (local[0], local[1]);
        match self {
            LagrangeBasis::Line2 => {
                DVector::from_vec(vec![0.5 * (1.0 - 3.0 * xi), 0.5 * (1.0 + 3.0 * xi)])
            }
            LagrangeBasis::Line3 => {
                let n = Line3.shape_functions(local);
                DVector::from_vec(vec![
                    n[0] - 0.75 * n[2] + 0.5,
                    n[1] - 0.75 * n[2] + 0.5,
                    2.5 * n[2] - 1.0,
                ])
            }
            LagrangeBasis::Triangle3 => DVector::from_vec(vec![
                3.0 - 4.0 * xi - 4.0 * eta,
                4.0 * xi - 1.0,
                4.0 * eta - 1.0,
            ]),
            LagrangeBasis::Quadrilateral4 => {
                let n = Quadrilateral4.shape_functions(local);
                DVector::from_vec(quad_combination(n.as_slice()))
            }
        }
    }

    /// Local gradients dΦ/dξ, one row per basis function.
    pub fn local_gradients(self, local: &LocalPoint) -> DMatrix<f64> {
        let xi = local[0];
        match self {
            LagrangeBasis::Line2 => DMatrix::from_column_slice(2, 1, &[-1.5, 1.5]),
            LagrangeBasis::Line3 => {
                DMatrix::from_column_slice(3, 1, &[2.5 * xi - 0.5, 2.5 * xi + 0.5, -5.0 * xi])
            }
            LagrangeBasis::Triangle3 => DMatrix::from_row_slice(3, 2, &[
                -4.0, -4.0,
                 4.0,  0.0,
                 0.0,  4.0,
            ]),
            LagrangeBasis::Quadrilateral4 => {
                let dn = Quadrilateral4.shape_function_gradients(local);
                let mut dphi = DMatrix::zeros(4, 2);
                for r in 0..2 {
                    let column: Vec<f64> = dn.column(r).iter().copied().collect();
                    for (i, v) in quad_combination(&column).into_iter().enumerate() {
                        dphi[(i, r)] = v;
                    }
                }
                dphi
            }
        }
    }
}

/// Φᵢ = 4Nᵢ - 2Nᵢ₊₁ + Nᵢ₊₂ - 2Nᵢ₊₃ (indices modulo 4).
fn quad_combination(n: &[f64]) -> Vec<f64> {
    (0..4)
        .map(|i| 4.0 * n[i] - 2.0 * n[(i + 1) % 4] + n[(i + 2) % 4] - 2.0 * n[(i + 3) % 4])
        .collect()
}

/// Tangent vectors of a unit normal.
///
/// 2D: t₁ = n × e_z and t₂ = e_z, the out-of-plane axis. 3D: t₁ is orthogonal to n and to the
/// coordinate axis least aligned with n, t₂ = n × t₁.
pub fn tangents(normal: &Vec3, dimension: Dimension) -> (Vec3, Vec3) {
    match dimension {
        Dimension::Two => (normal.cross(&Vec3::z()), Vec3::z()),
        Dimension::Three => {
            let axis = normal.iamin();
            let t1 = normal
                .cross(&Vec3::ith(axis, 1.0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vec3::zeros);
            (t1, normal.cross(&t1))
        }
    }
}

/// Contact data of one slave/master pair.
#[derive(Debug, Clone)]
pub struct ContactData {
    /// Master segment of this pair.
    pub master: SegmentId,
    pub slave_type: GeometryType,
    pub master_type: GeometryType,
    /// Current slave coordinates.
    pub slave_coords: Vec<Point3>,
    /// Current master coordinates.
    pub master_coords: Vec<Point3>,
    /// Unit normals of the slave nodes.
    pub normals: Vec<Vec3>,
    /// First tangent of each slave node.
    pub tangent_xi: Vec<Vec3>,
    /// Second tangent of each slave node (e_z in 2D). Not read by the plane
    /// kernels; kept for callers post-processing the contact frame.
    pub tangent_eta: Vec<Vec3>,
    /// Lagrange multipliers of the slave nodes.
    pub multipliers: Vec<Vec3>,
    /// Signed normal gap of each slave node, `None` if its normal misses the master.
    pub gaps: Vec<Option<f64>>,
    /// Normals of the master nodes. Stored for output only.
    pub master_normals: Vec<Vec3>,
    pub slave_length: f64,
    pub master_length: f64,
}

impl ContactData {
    /// Build the contact data of a pair from the current mesh state.
    ///
    /// Slave nodes without a stored normal use the segment normal at the
    /// node.
    pub fn build(mesh: &ContactMesh, slave: SegmentId, master: SegmentId) -> Result<Self> {
        let dimension = mesh.dimension();
        let slave_segment = mesh.segment(slave)?;
        let master_segment = mesh.segment(master)?;
        let slave_geometry = slave_segment.geometry();
        let master_geometry = master_segment.geometry();
        let slave_coords = mesh.segment_coords(slave)?;
        let master_coords = mesh.segment_coords(master)?;

        let normals = slave_geometry
            .node_local_coordinates()
            .iter()
            .zip(mesh.segment_normals(slave)?)
            .map(|(local, stored)| {
                stored
                    .try_normalize(f64::EPSILON)
                    .or_else(|| slave_geometry.unit_normal(&slave_coords, local))
                    .ok_or_else(|| Error::Geometry(format!("Segment {} is degenerate", slave)))
            })
            .collect::<Result<Vec<_>>>()?;

        let (tangent_xi, tangent_eta): (Vec<_>, Vec<_>) =
            normals.iter().map(|n| tangents(n, dimension)).unzip();

        let multipliers = slave_segment
            .nodes
            .iter()
            .map(|&i| mesh.node(i).map(|n| n.lagrange_multiplier))
            .collect::<Result<Vec<_>>>()?;

        let gaps: Vec<Option<f64>> = slave_coords
            .iter()
            .zip(&normals)
            .map(|(x, n)| {
                project_direction(master_geometry.as_ref(), &master_coords, x, n)
                    .map(|p| p.distance)
            })
            .collect();

        Ok(Self {
            master,
            slave_type: slave_segment.geometry_type,
            master_type: master_segment.geometry_type,
            slave_length: slave_geometry.length(&slave_coords),
            master_length: master_geometry.length(&master_coords),
            master_normals: mesh.segment_normals(master)?,
            slave_coords,
            master_coords,
            normals,
            tangent_xi,
            tangent_eta,
            multipliers,
            gaps,
        })
    }

    /// Number of slave nodes.
    pub fn n_slave(&self) -> usize {
        self.slave_coords.len()
    }

    /// Number of master nodes.
    pub fn n_master(&self) -> usize {
        self.master_coords.len()
    }

    /// Whether the normal of slave node `k` missed the master segment.
    pub fn is_masked(&self, k: usize) -> bool {
        self.gaps[k].is_none()
    }
}

/// Shape functions and Jacobian at one slave integration point.
#[derive(Debug, Clone)]
pub struct GeneralVariables {
    /// Slave shape functions.
    pub n1: DVector<f64>,
    /// Master shape functions at the projected point (zero if it missed).
    pub n2: DVector<f64>,
    /// Dual multiplier basis.
    pub phi: DVector<f64>,
    pub dn1: DMatrix<f64>,
    /// Local gradients of `n2` and `phi`. The closed-form kernels do not
    /// need them.
    pub dn2: DMatrix<f64>,
    pub dphi: DMatrix<f64>,
    /// Slave Jacobian (3 × local dimension).
    pub jacobian: DMatrix<f64>,
    pub det_j: f64,
    /// Averaged unit normal n̄.
    pub normal: Vec3,
    /// Whether the point projected onto the master segment.
    pub projected: bool,
}

impl GeneralVariables {
    /// Evaluate the kinematics at slave local coordinate `local`.
    pub fn compute(data: &ContactData, basis: LagrangeBasis, local: &LocalPoint) -> Self {
        let slave = create_geometry(data.slave_type);
        let master = create_geometry(data.master_type);

        let n1 = slave.shape_functions(local);
        let dn1 = slave.shape_function_gradients(local);
        let jacobian = slave.jacobian(&data.slave_coords, local);
        let det_j = slave.jacobian_determinant(&data.slave_coords, local);

        let normal_sum = data
            .normals
            .iter()
            .zip(n1.iter())
            .fold(Vec3::zeros(), |acc, (n, &w)| acc + n * w);
        let normal = normal_sum.try_normalize(f64::EPSILON);

        let point = slave.global_coordinates(&data.slave_coords, local);
        let projection = normal.and_then(|n| {
            project_direction(master.as_ref(), &data.master_coords, &point, &n)
        });

        let (n2, dn2) = match projection {
            Some(p) => (
                master.shape_functions(&p.local),
                master.shape_function_gradients(&p.local),
            ),
            None => (
                DVector::zeros(data.n_master()),
                DMatrix::zeros(data.n_master(), master.local_dimension()),
            ),
        };

        Self {
            n1,
            n2,
            phi: basis.values(local),
            dn1,
            dn2,
            dphi: basis.local_gradients(local),
            jacobian,
            det_j,
            normal: normal.unwrap_or_else(Vec3::zeros),
            projected: projection.is_some(),
        }
    }

    /// Zero N1 and Φ of slave nodes whose normal missed the master, removing
    /// their rows and columns from the pair contribution.
    pub fn mask_missed_nodes(&mut self, data: &ContactData) {
        for k in 0..data.n_slave() {
            if data.is_masked(k) {
                self.n1[k] = 0.0;
                self.phi[k] = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{IntegrationOrder, Line2, Triangle3};
    use approx::assert_relative_eq;

    /// ∫ Φᵢ N1ₖ over the reference domain.
    fn mortar_matrix(basis: LagrangeBasis, geometry: &dyn Geometry) -> DMatrix<f64> {
        let n = basis.n_nodes();
        let mut m = DMatrix::zeros(n, n);
        for gp in geometry.integration_points(IntegrationOrder::new(5).unwrap()) {
            let phi = basis.values(&gp.local());
            let n1 = geometry.shape_functions(&gp.local());
            m += phi * n1.transpose() * gp.weight;
        }
        m
    }

    #[test]
    fn test_dual_basis_biorthogonality() {
        let cases: [(LagrangeBasis, &dyn Geometry); 4] = [
            (LagrangeBasis::Line2, &Line2),
            (LagrangeBasis::Line3, &Line3),
            (LagrangeBasis::Triangle3, &Triangle3),
            (LagrangeBasis::Quadrilateral4, &Quadrilateral4),
        ];
        for (basis, geometry) in cases {
            let m = mortar_matrix(basis, geometry);
            for i in 0..basis.n_nodes() {
                let integral_n: f64 = geometry
                    .integration_points(IntegrationOrder::new(5).unwrap())
                    .iter()
                    .map(|gp| geometry.shape_functions(&gp.local())[i] * gp.weight)
                    .sum();
                for k in 0..basis.n_nodes() {
                    let expected = if i == k { integral_n } else { 0.0 };
                    assert_relative_eq!(m[(i, k)], expected, epsilon = 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_dual_basis_gradients_match_finite_differences() {
        let h = 1e-6;
        let local = LocalPoint::new(0.3, 0.2);
        for basis in [
            LagrangeBasis::Line2,
            LagrangeBasis::Line3,
            LagrangeBasis::Triangle3,
            LagrangeBasis::Quadrilateral4,
        ] {
            let dphi = basis.local_gradients(&local);
            for r in 0..dphi.ncols() {
                let mut plus = local;
                let mut minus = local;
                plus[r] += h;
                minus[r] -= h;
                let fd = (basis.values(&plus) - basis.values(&minus)) / (2.0 * h);
                for i in 0..basis.n_nodes() {
                    assert_relative_eq!(dphi[(i, r)], fd[i], epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_basis_selection() {
        assert_eq!(LagrangeBasis::select(Dimension::Two, 3).unwrap(), LagrangeBasis::Line3);
        assert_eq!(
            LagrangeBasis::select(Dimension::Three, 4).unwrap(),
            LagrangeBasis::Quadrilateral4
        );

        let err = LagrangeBasis::select(Dimension::Three, 6).unwrap_err();
        match err {
            Error::UnsupportedGeometryCombination(c) => {
                assert_eq!(c.dimension, 3);
                assert_eq!(c.slave_nodes, 6);
                assert_eq!(c.master_nodes, None);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_tangents_are_orthonormal() {
        let (t1, t2) = tangents(&Vec3::new(0.0, 1.0, 0.0), Dimension::Two);
        assert_relative_eq!(t1, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-15);
        assert_relative_eq!(t2, Vec3::z());
        assert_relative_eq!(t1.dot(&t2), 0.0);

        let n = Vec3::new(1.0, 2.0, 2.0) / 3.0;
        let (t1, t2) = tangents(&n, Dimension::Three);
        assert_relative_eq!(t1.norm(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(t2.norm(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(t1.dot(&n), 0.0, epsilon = 1e-14);
        assert_relative_eq!(t2.dot(&n), 0.0, epsilon = 1e-14);
        assert_relative_eq!(t1.dot(&t2), 0.0, epsilon = 1e-14);
    }

    fn parallel_lines(master_shift: f64) -> (ContactMesh, SegmentId, SegmentId) {
        let mut mesh = ContactMesh::new(Dimension::Two);
        let s0 = mesh.add_node(Point3::new(0.0, 0.0, 0.0));
        let s1 = mesh.add_node(Point3::new(1.0, 0.0, 0.0));
        let m0 = mesh.add_node(Point3::new(master_shift, 0.1, 0.0));
        let m1 = mesh.add_node(Point3::new(master_shift + 1.0, 0.1, 0.0));
        let slave = mesh.add_segment(GeometryType::Line2, vec![s1, s0]).unwrap();
        let master = mesh.add_segment(GeometryType::Line2, vec![m0, m1]).unwrap();
        (mesh, slave, master)
    }

    #[test]
    fn test_contact_data_gaps() {
        let (mesh, slave, master) = parallel_lines(0.0);
        let data = ContactData::build(&mesh, slave, master).unwrap();

        assert_eq!(data.n_slave(), 2);
        assert_eq!(data.n_master(), 2);
        for k in 0..2 {
            assert_relative_eq!(data.normals[k], Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-14);
            assert_relative_eq!(data.gaps[k].unwrap(), 0.1, epsilon = 1e-12);
            assert_relative_eq!(data.tangent_xi[k], Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-14);
            assert_relative_eq!(data.tangent_eta[k], Vec3::z());
        }
        assert_relative_eq!(data.slave_length, 1.0, epsilon = 1e-13);
    }

    #[test]
    fn test_contact_data_masks_node_off_master() {
        // Master covers x in [0.5, 1.5]: slave node at x = 0 misses it
        let (mesh, slave, master) = parallel_lines(0.5);
        let data = ContactData::build(&mesh, slave, master).unwrap();
        // Slave nodes are ordered [s1, s0]
        assert!(data.gaps[0].is_some());
        assert!(data.is_masked(1));
    }

    #[test]
    fn test_general_variables_projection() {
        let (mesh, slave, master) = parallel_lines(0.0);
        let data = ContactData::build(&mesh, slave, master).unwrap();
        let vars = GeneralVariables::compute(&data, LagrangeBasis::Line2, &LocalPoint::new(0.5, 0.0));

        // Slave runs from x = 1 to x = 0, ξ = 0.5 lies at x = 0.25
        assert!(vars.projected);
        assert_relative_eq!(vars.n1.sum(), 1.0, epsilon = 1e-14);
        assert_relative_eq!(vars.n2[0], 0.75, epsilon = 1e-12);
        assert_relative_eq!(vars.n2[1], 0.25, epsilon = 1e-12);
        assert_relative_eq!(vars.det_j, 0.5, epsilon = 1e-14);
        assert_relative_eq!(vars.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-14);
    }

    #[test]
    fn test_general_variables_masking() {
        let (mesh, slave, master) = parallel_lines(0.5);
        let data = ContactData::build(&mesh, slave, master).unwrap();
        let mut vars =
            GeneralVariables::compute(&data, LagrangeBasis::Line2, &LocalPoint::new(-0.5, 0.0));
        vars.mask_missed_nodes(&data);
        assert_eq!(vars.n1[1], 0.0);
        assert_eq!(vars.phi[1], 0.0);
        assert!(vars.n1[0] > 0.0);
    }
}
