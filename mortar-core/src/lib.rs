//! Mortar Core - mortar contact conditions
//!
//! Non-penetration between non-matching boundary meshes enforced with
//! Lagrange multipliers in a dual (biorthogonal) basis:
//! - Segment geometries and Gauss rules for 2D lines and 3D faces
//! - Directional projection of slave points onto master segments
//! - Per-point active set with a size-based distance tolerance
//! - Closed-form pair kernels folded into a condition-level system
//! - Parallel assembly of many conditions using Rayon
//!
//! # Architecture
//!
//! - [`ContactMesh`]: nodes, segments, nodal state and equation ids
//! - [`PairingProvider`]: master segments per slave segment
//! - [`MortarContactCondition`]: lifecycle and condition system of one slave
//!   segment
//! - [`ContactKernel`] trait: integration-point contribution of one pair,
//!   selected by [`MortarKernel`]
//! - [`assembly`]: global contact matrix and residual

pub mod types;
pub mod geometry;
pub mod mesh;
pub mod projection;
pub mod pairing;
pub mod pair;
pub mod active_set;
pub mod kernel;
pub mod condition;
pub mod config;
pub mod sparse;
pub mod assembly;
pub mod error;

pub use types::{Dimension, Dof, DofVariable, NodeId, Point3, SegmentId, Vec3};
pub use geometry::{create_geometry, Geometry, GeometryType, IntegrationOrder};
pub use mesh::ContactMesh;
pub use pairing::{ContactPairs, PairingProvider};
pub use pair::{ContactData, GeneralVariables, LagrangeBasis};
pub use active_set::ActiveSetGate;
pub use kernel::{create_kernel, ContactKernel, MortarKernel};
pub use condition::{LocalSystem, MortarContactCondition, SystemVariable};
pub use config::ContactSettings;
pub use sparse::CsrMatrix;
pub use error::{Error, Result};
