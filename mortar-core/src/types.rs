//! Core data types for contact operations.
//!
//! This module defines fundamental types used throughout the crate:
//! - Geometric primitives (points, vectors)
//! - Working space dimension
//! - Nodal degrees of freedom

use nalgebra::Vector3;

/// A point in 3D space. 2D problems keep z = 0.
pub type Point3 = Vector3<f64>;

/// A 3D vector (displacement, normal, multiplier, etc.).
pub type Vec3 = Vector3<f64>;

/// Index of a node in a [`ContactMesh`](crate::mesh::ContactMesh).
pub type NodeId = usize;

/// Index of a segment in a [`ContactMesh`](crate::mesh::ContactMesh).
pub type SegmentId = usize;

/// Working space dimension of a contact problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Plane problems: segments are lines, 2 DOFs per node.
    Two,
    /// Solid problems: segments are surface faces, 3 DOFs per node.
    Three,
}

impl Dimension {
    /// Number of spatial components (2 or 3).
    #[inline]
    pub fn n(self) -> usize {
        match self {
            Dimension::Two => 2,
            Dimension::Three => 3,
        }
    }

    /// Displacement DOF variables in nodal order.
    pub fn displacement_variables(self) -> &'static [DofVariable] {
        match self {
            Dimension::Two => &[DofVariable::DisplacementX, DofVariable::DisplacementY],
            Dimension::Three => &[
                DofVariable::DisplacementX,
                DofVariable::DisplacementY,
                DofVariable::DisplacementZ,
            ],
        }
    }

    /// Lagrange multiplier DOF variables in nodal order.
    pub fn multiplier_variables(self) -> &'static [DofVariable] {
        match self {
            Dimension::Two => &[
                DofVariable::LagrangeMultiplierX,
                DofVariable::LagrangeMultiplierY,
            ],
            Dimension::Three => &[
                DofVariable::LagrangeMultiplierX,
                DofVariable::LagrangeMultiplierY,
                DofVariable::LagrangeMultiplierZ,
            ],
        }
    }
}

/// Scalar nodal unknowns handled by contact conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DofVariable {
    DisplacementX,
    DisplacementY,
    DisplacementZ,
    LagrangeMultiplierX,
    LagrangeMultiplierY,
    LagrangeMultiplierZ,
}

impl DofVariable {
    /// Spatial component (0, 1 or 2).
    pub fn component(self) -> usize {
        match self {
            DofVariable::DisplacementX | DofVariable::LagrangeMultiplierX => 0,
            DofVariable::DisplacementY | DofVariable::LagrangeMultiplierY => 1,
            DofVariable::DisplacementZ | DofVariable::LagrangeMultiplierZ => 2,
        }
    }

    /// True for the vector Lagrange multiplier components.
    pub fn is_multiplier(self) -> bool {
        matches!(
            self,
            DofVariable::LagrangeMultiplierX
                | DofVariable::LagrangeMultiplierY
                | DofVariable::LagrangeMultiplierZ
        )
    }
}

/// A degree of freedom of a node together with its global equation id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dof {
    pub node: NodeId,
    pub variable: DofVariable,
    pub equation_id: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_variables() {
        assert_eq!(Dimension::Two.n(), 2);
        assert_eq!(Dimension::Three.n(), 3);
        assert_eq!(Dimension::Two.displacement_variables().len(), 2);
        assert_eq!(Dimension::Three.multiplier_variables().len(), 3);
        assert!(Dimension::Three
            .multiplier_variables()
            .iter()
            .all(|v| v.is_multiplier()));
    }

    #[test]
    fn test_dof_variable_component() {
        assert_eq!(DofVariable::DisplacementY.component(), 1);
        assert_eq!(DofVariable::LagrangeMultiplierZ.component(), 2);
        assert!(!DofVariable::DisplacementX.is_multiplier());
    }
}
