//! Contact mesh: nodes, boundary segments and degrees of freedom.
//!
//! Stores nodal state (reference position, displacements, normals, Lagrange
//! multipliers), segment connectivity and the equation ids of every nodal
//! unknown. Contact conditions refer to segments by [`SegmentId`] only.

use crate::error::{Error, Result};
use crate::geometry::{create_geometry, Geometry, GeometryType};
use crate::types::{Dimension, Dof, DofVariable, NodeId, Point3, SegmentId, Vec3};

/// Nodal state of a contact node.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactNode {
    /// Reference coordinates.
    pub reference: Point3,
    /// Current displacement.
    pub displacement: Vec3,
    /// Displacement at the end of the previous solution step.
    pub previous_displacement: Vec3,
    /// Outward unit normal.
    pub normal: Vec3,
    /// Vector Lagrange multiplier (slave nodes).
    pub lagrange_multiplier: Vec3,
    /// Equation ids of the displacement components, once numbered.
    pub displacement_ids: Option<[usize; 3]>,
    /// Equation ids of the multiplier components, once numbered.
    pub multiplier_ids: Option<[usize; 3]>,
    /// Whether this node carries Lagrange multiplier unknowns.
    pub has_multipliers: bool,
}

impl ContactNode {
    fn new(reference: Point3) -> Self {
        Self {
            reference,
            displacement: Vec3::zeros(),
            previous_displacement: Vec3::zeros(),
            normal: Vec3::zeros(),
            lagrange_multiplier: Vec3::zeros(),
            displacement_ids: None,
            multiplier_ids: None,
            has_multipliers: false,
        }
    }

    /// Current coordinates: reference + displacement.
    pub fn position(&self) -> Point3 {
        self.reference + self.displacement
    }
}

/// Segment connectivity.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Geometry type.
    pub geometry_type: GeometryType,
    /// Node indices (0-based).
    pub nodes: Vec<NodeId>,
}

impl Segment {
    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Geometry implementation for this segment.
    pub fn geometry(&self) -> Box<dyn Geometry> {
        create_geometry(self.geometry_type)
    }
}

/// Mesh of contact boundary segments.
#[derive(Debug, Clone)]
pub struct ContactMesh {
    dimension: Dimension,
    nodes: Vec<ContactNode>,
    segments: Vec<Segment>,
    n_dofs: usize,
}

impl ContactMesh {
    /// Create a new empty mesh of the given working dimension.
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            nodes: Vec::new(),
            segments: Vec::new(),
            n_dofs: 0,
        }
    }

    /// Working space dimension.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Add a node to the mesh, returning its index.
    pub fn add_node(&mut self, reference: Point3) -> NodeId {
        let idx = self.nodes.len();
        self.nodes.push(ContactNode::new(reference));
        idx
    }

    /// Add a segment to the mesh.
    pub fn add_segment(&mut self, geometry_type: GeometryType, nodes: Vec<NodeId>) -> Result<SegmentId> {
        if geometry_type.dimension() != self.dimension {
            return Err(Error::Mesh(format!(
                "Segment type {:?} is not a {}D boundary",
                geometry_type,
                self.dimension.n()
            )));
        }

        if nodes.len() != geometry_type.n_nodes() {
            return Err(Error::Mesh(format!(
                "Segment type {:?} requires {} nodes, got {}",
                geometry_type,
                geometry_type.n_nodes(),
                nodes.len()
            )));
        }

        for &node_idx in &nodes {
            if node_idx >= self.nodes.len() {
                return Err(Error::Mesh(format!(
                    "Node index {} out of bounds (mesh has {} nodes)",
                    node_idx,
                    self.nodes.len()
                )));
            }
        }

        let idx = self.segments.len();
        self.segments.push(Segment {
            geometry_type,
            nodes,
        });
        Ok(idx)
    }

    /// Mark the nodes of a segment as slave nodes carrying multipliers.
    ///
    /// Invalidates any previous DOF numbering.
    pub fn add_lagrange_multipliers(&mut self, segment: SegmentId) -> Result<()> {
        let nodes = self.segment(segment)?.nodes.clone();
        for node in nodes {
            self.nodes[node].has_multipliers = true;
        }
        self.clear_dof_numbering();
        Ok(())
    }

    /// Assign equation ids: all displacements first, then all multipliers.
    ///
    /// Returns the total number of equations.
    pub fn number_dofs(&mut self) -> usize {
        let dim = self.dimension.n();
        let mut next = 0;

        for node in &mut self.nodes {
            let mut ids = [usize::MAX; 3];
            for id in ids.iter_mut().take(dim) {
                *id = next;
                next += 1;
            }
            node.displacement_ids = Some(ids);
        }

        for node in self.nodes.iter_mut().filter(|n| n.has_multipliers) {
            let mut ids = [usize::MAX; 3];
            for id in ids.iter_mut().take(dim) {
                *id = next;
                next += 1;
            }
            node.multiplier_ids = Some(ids);
        }

        self.n_dofs = next;
        next
    }

    fn clear_dof_numbering(&mut self) {
        for node in &mut self.nodes {
            node.displacement_ids = None;
            node.multiplier_ids = None;
        }
        self.n_dofs = 0;
    }

    /// Number of numbered equations (0 before [`number_dofs`](Self::number_dofs)).
    pub fn n_dofs(&self) -> usize {
        self.n_dofs
    }

    /// Look up a nodal degree of freedom.
    pub fn dof(&self, node: NodeId, variable: DofVariable) -> Result<Dof> {
        let n = self.node(node)?;
        let missing = || Error::MissingDof { node, variable };

        if variable.component() >= self.dimension.n() {
            return Err(missing());
        }

        let ids = if variable.is_multiplier() {
            n.multiplier_ids
        } else {
            n.displacement_ids
        };
        let ids = ids.ok_or_else(missing)?;

        Ok(Dof {
            node,
            variable,
            equation_id: ids[variable.component()],
        })
    }

    /// Number of nodes in the mesh.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of segments in the mesh.
    pub fn n_segments(&self) -> usize {
        self.segments.len()
    }

    /// Get a specific node.
    pub fn node(&self, idx: NodeId) -> Result<&ContactNode> {
        self.nodes
            .get(idx)
            .ok_or_else(|| Error::Mesh(format!("Node index {} out of bounds", idx)))
    }

    /// Mutable access to a node.
    pub fn node_mut(&mut self, idx: NodeId) -> Result<&mut ContactNode> {
        self.nodes
            .get_mut(idx)
            .ok_or_else(|| Error::Mesh(format!("Node index {} out of bounds", idx)))
    }

    /// All nodes.
    pub fn nodes(&self) -> &[ContactNode] {
        &self.nodes
    }

    /// Get a specific segment.
    pub fn segment(&self, idx: SegmentId) -> Result<&Segment> {
        self.segments
            .get(idx)
            .ok_or_else(|| Error::Mesh(format!("Segment index {} out of bounds", idx)))
    }

    /// All segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Current coordinates of a segment's nodes.
    pub fn segment_coords(&self, idx: SegmentId) -> Result<Vec<Point3>> {
        let segment = self.segment(idx)?;
        Ok(segment
            .nodes
            .iter()
            .map(|&i| self.nodes[i].position())
            .collect())
    }

    /// Nodal normals of a segment's nodes.
    pub fn segment_normals(&self, idx: SegmentId) -> Result<Vec<Vec3>> {
        let segment = self.segment(idx)?;
        Ok(segment.nodes.iter().map(|&i| self.nodes[i].normal).collect())
    }

    /// Update the displacement of a node, shifting the current value into the
    /// previous-step slot.
    pub fn advance_displacement(&mut self, node: NodeId, displacement: Vec3) -> Result<()> {
        let n = self.node_mut(node)?;
        n.previous_displacement = n.displacement;
        n.displacement = displacement;
        Ok(())
    }

    /// Recompute nodal normals of the given segments.
    ///
    /// Each node receives the normalized sum of the unit normals of the
    /// segments it belongs to, evaluated at the node's local coordinates.
    /// Nodes outside these segments keep their normal.
    pub fn compute_nodal_normals(&mut self, segments: &[SegmentId]) -> Result<()> {
        let mut accumulated: Vec<Option<Vec3>> = vec![None; self.nodes.len()];

        for &idx in segments {
            let segment = self.segment(idx)?;
            let geometry = segment.geometry();
            let coords = self.segment_coords(idx)?;
            for (local, &node) in geometry
                .node_local_coordinates()
                .iter()
                .zip(segment.nodes.iter())
            {
                let normal = geometry.unit_normal(&coords, local).ok_or_else(|| {
                    Error::Geometry(format!("Segment {} is degenerate", idx))
                })?;
                let entry = accumulated[node].get_or_insert_with(Vec3::zeros);
                *entry += normal;
            }
        }

        for (node, sum) in self.nodes.iter_mut().zip(accumulated) {
            if let Some(sum) = sum {
                node.normal = sum.try_normalize(f64::EPSILON).unwrap_or_else(Vec3::zeros);
            }
        }

        Ok(())
    }

    /// Compute mesh bounding box of the current coordinates.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = self.nodes.first()?.position();
        let mut min = first;
        let mut max = first;

        for node in &self.nodes[1..] {
            let p = node.position();
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        Some((min, max))
    }
}
