//! Mortar contact condition of one slave segment.
//!
//! The condition owns no geometry: it stores the id of its slave segment,
//! the master segment ids of the current solution step and the contact data
//! of the current nonlinear iteration.
//!
//! # Lifecycle
//!
//! ```text
//! initialize
//!   → ( initialize_solution_step
//!       → initialize_non_linear_iteration
//!       → calculate_*
//!       → finalize_non_linear_iteration )*
//! ```
//!
//! # System layout
//!
//! The condition system concatenates one block per master pair, each of size
//! `dim × (n_master + 2 × n_slave)` and ordered MASTER, SLAVE, LAMBDA.
//! [`MortarContactCondition::dof_list`] and
//! [`MortarContactCondition::equation_ids`] follow the same order.

use crate::active_set::{interpolated_gap, ActiveSetGate};
use crate::config::ContactSettings;
use crate::error::{Error, Result};
use crate::geometry::{create_geometry, GaussPoint, GeometryType, IntegrationOrder};
use crate::kernel::{create_kernel, ContactKernel, MortarKernel};
use crate::mesh::ContactMesh;
use crate::pair::{ContactData, GeneralVariables, LagrangeBasis};
use crate::pairing::PairingProvider;
use crate::types::{Dimension, Dof, DofVariable, NodeId, SegmentId, Vec3};
use log::{debug, log_enabled, trace, warn, Level};
use nalgebra::{DMatrix, DVector};
use std::borrow::Cow;
use std::fmt;

/// Name of a system component computed by the batched calculations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SystemVariable(Cow<'static, str>);

impl SystemVariable {
    /// Internal and contact operators together.
    pub const MORTAR_CONTACT_OPERATOR: SystemVariable =
        SystemVariable(Cow::Borrowed("MORTAR_CONTACT_OPERATOR"));
    /// Multiplier coupling of the displacement equations.
    pub const MORTAR_INTERNAL_OPERATOR: SystemVariable =
        SystemVariable(Cow::Borrowed("MORTAR_INTERNAL_OPERATOR"));
    /// Constraint equations of the multipliers.
    pub const MORTAR_CONSTRAINT_OPERATOR: SystemVariable =
        SystemVariable(Cow::Borrowed("MORTAR_CONSTRAINT_OPERATOR"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Full,
    Internal,
    Constraint,
}

impl Operator {
    fn from_variable(variable: &SystemVariable) -> Result<Self> {
        match variable.name() {
            "MORTAR_CONTACT_OPERATOR" => Ok(Operator::Full),
            "MORTAR_INTERNAL_OPERATOR" => Ok(Operator::Internal),
            "MORTAR_CONSTRAINT_OPERATOR" => Ok(Operator::Constraint),
            other => Err(Error::UnsupportedSystemVariable(other.to_string())),
        }
    }

    fn internal(self) -> bool {
        matches!(self, Operator::Full | Operator::Internal)
    }

    fn constraint(self) -> bool {
        matches!(self, Operator::Full | Operator::Constraint)
    }
}

/// What one pass over the pairs computes.
#[derive(Debug, Clone, Copy)]
struct CalculationRequest {
    operator: Operator,
    lhs: bool,
    rhs: bool,
}

/// Condition-level system.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSystem {
    pub lhs: DMatrix<f64>,
    pub rhs: DVector<f64>,
}

/// Mortar contact condition attached to a slave segment.
#[derive(Debug, Clone)]
pub struct MortarContactCondition {
    slave: SegmentId,
    settings: ContactSettings,
    dimension: Dimension,
    slave_type: Option<GeometryType>,
    basis: Option<LagrangeBasis>,
    integration_order: Option<IntegrationOrder>,
    masters: Vec<SegmentId>,
    pair_data: Option<Vec<ContactData>>,
}

impl MortarContactCondition {
    pub fn new(slave: SegmentId, settings: ContactSettings) -> Self {
        Self {
            slave,
            settings,
            dimension: Dimension::Two,
            slave_type: None,
            basis: None,
            integration_order: None,
            masters: Vec::new(),
            pair_data: None,
        }
    }

    /// Slave segment of this condition.
    pub fn slave(&self) -> SegmentId {
        self.slave
    }

    pub fn settings(&self) -> &ContactSettings {
        &self.settings
    }

    /// Master segments of the current solution step.
    pub fn masters(&self) -> &[SegmentId] {
        &self.masters
    }

    /// Resolved integration order, once initialized.
    pub fn integration_order(&self) -> Option<IntegrationOrder> {
        self.integration_order
    }

    /// Resolve the slave geometry, the multiplier basis and the integration
    /// order.
    pub fn initialize(&mut self, mesh: &ContactMesh) -> Result<()> {
        self.settings.validate()?;

        let segment = mesh.segment(self.slave)?;
        let geometry = segment.geometry();
        self.dimension = mesh.dimension();
        self.basis = Some(LagrangeBasis::select(self.dimension, segment.n_nodes())?);
        self.slave_type = Some(segment.geometry_type);

        let order = match self.settings.integration_order {
            None => geometry.default_integration_order(),
            Some(requested) => IntegrationOrder::new(requested).unwrap_or_else(|| {
                let fallback = geometry.default_integration_order();
                warn!(
                    "Integration order {} not available on slave segment {}, using {}",
                    requested,
                    self.slave,
                    fallback.get()
                );
                fallback
            }),
        };
        self.integration_order = Some(order);
        self.pair_data = None;
        Ok(())
    }

    /// Refresh the master list from the pairing provider.
    ///
    /// Invalidates the contact data of the previous iteration.
    pub fn initialize_solution_step(&mut self, pairs: &dyn PairingProvider) {
        self.masters = pairs.master_segments(self.slave).to_vec();
        self.pair_data = None;
        trace!(
            "Slave segment {}: {} master segments",
            self.slave,
            self.masters.len()
        );
    }

    /// Re-project every pair from the current mesh state.
    pub fn initialize_non_linear_iteration(&mut self, mesh: &ContactMesh) -> Result<()> {
        let pair_data = self
            .masters
            .iter()
            .map(|&master| ContactData::build(mesh, self.slave, master))
            .collect::<Result<Vec<_>>>()?;
        self.pair_data = Some(pair_data);
        Ok(())
    }

    pub fn finalize_non_linear_iteration(&self) -> Result<()> {
        if log_enabled!(Level::Debug) {
            let active = self.active_integration_points()?;
            let n_active: usize = active
                .iter()
                .map(|pair| pair.iter().filter(|&&a| a).count())
                .sum();
            let n_total: usize = active.iter().map(Vec::len).sum();
            debug!(
                "Slave segment {}: {} of {} integration points active",
                self.slave, n_active, n_total
            );
        }
        Ok(())
    }

    /// Left-hand side and right-hand side of all pairs.
    pub fn calculate_local_system(&self) -> Result<LocalSystem> {
        self.calculate(CalculationRequest {
            operator: Operator::Full,
            lhs: true,
            rhs: true,
        })
    }

    pub fn calculate_left_hand_side(&self) -> Result<DMatrix<f64>> {
        let system = self.calculate(CalculationRequest {
            operator: Operator::Full,
            lhs: true,
            rhs: false,
        })?;
        Ok(system.lhs)
    }

    pub fn calculate_right_hand_side(&self) -> Result<DVector<f64>> {
        let system = self.calculate(CalculationRequest {
            operator: Operator::Full,
            lhs: false,
            rhs: true,
        })?;
        Ok(system.rhs)
    }

    /// One system per requested variable, in request order.
    ///
    /// Fails before any work when a variable is not recognized.
    pub fn calculate_local_system_components(
        &self,
        variables: &[SystemVariable],
    ) -> Result<Vec<LocalSystem>> {
        self.calculate_components(variables, true, true)
    }

    pub fn calculate_left_hand_side_components(
        &self,
        variables: &[SystemVariable],
    ) -> Result<Vec<DMatrix<f64>>> {
        let systems = self.calculate_components(variables, true, false)?;
        Ok(systems.into_iter().map(|s| s.lhs).collect())
    }

    pub fn calculate_right_hand_side_components(
        &self,
        variables: &[SystemVariable],
    ) -> Result<Vec<DVector<f64>>> {
        let systems = self.calculate_components(variables, false, true)?;
        Ok(systems.into_iter().map(|s| s.rhs).collect())
    }

    /// Contact conditions carry no mass.
    pub fn calculate_mass_matrix(&self) -> DMatrix<f64> {
        DMatrix::zeros(0, 0)
    }

    /// Contact conditions carry no damping.
    pub fn calculate_damping_matrix(&self) -> DMatrix<f64> {
        DMatrix::zeros(0, 0)
    }

    /// Size of the condition system for the current master list.
    pub fn condition_size(&self, mesh: &ContactMesh) -> Result<usize> {
        Ok(self.dof_keys(mesh)?.len())
    }

    /// Degrees of freedom in system order.
    pub fn dof_list(&self, mesh: &ContactMesh) -> Result<Vec<Dof>> {
        self.dof_keys(mesh)?
            .into_iter()
            .map(|(node, variable)| mesh.dof(node, variable))
            .collect()
    }

    /// Equation ids in system order.
    pub fn equation_ids(&self, mesh: &ContactMesh) -> Result<Vec<usize>> {
        self.dof_keys(mesh)?
            .into_iter()
            .map(|(node, variable)| mesh.dof(node, variable).map(|dof| dof.equation_id))
            .collect()
    }

    /// Interpolated gap at every integration point of every pair.
    pub fn integration_point_gaps(&self) -> Result<Vec<Vec<Option<f64>>>> {
        let (pairs, points, basis) = self.ready()?;
        Ok(pairs
            .iter()
            .map(|data| {
                points
                    .iter()
                    .map(|gp| {
                        let vars = GeneralVariables::compute(data, basis, &gp.local());
                        interpolated_gap(&vars.n1, &data.gaps)
                    })
                    .collect()
            })
            .collect())
    }

    /// Active-set state of every integration point of every pair.
    pub fn active_integration_points(&self) -> Result<Vec<Vec<bool>>> {
        let gaps = self.integration_point_gaps()?;
        let (pairs, _, _) = self.ready()?;
        Ok(pairs
            .iter()
            .zip(gaps)
            .map(|(data, pair_gaps)| {
                let gate = self.gate(data);
                pair_gaps.into_iter().map(|g| gate.is_active(g)).collect()
            })
            .collect())
    }

    /// Displacement increment of the step for slave node `local_node`.
    pub fn nodal_delta_movement(&self, mesh: &ContactMesh, local_node: usize) -> Result<Vec3> {
        let segment = mesh.segment(self.slave)?;
        let node = *segment.nodes.get(local_node).ok_or_else(|| {
            Error::Condition(format!(
                "Slave segment {} has no local node {}",
                self.slave, local_node
            ))
        })?;
        let n = mesh.node(node)?;
        let mut delta = n.displacement - n.previous_displacement;
        if self.dimension == Dimension::Two {
            delta[2] = 0.0;
        }
        Ok(delta)
    }

    fn calculate_components(
        &self,
        variables: &[SystemVariable],
        lhs: bool,
        rhs: bool,
    ) -> Result<Vec<LocalSystem>> {
        let operators = variables
            .iter()
            .map(Operator::from_variable)
            .collect::<Result<Vec<_>>>()?;
        operators
            .into_iter()
            .map(|operator| self.calculate(CalculationRequest { operator, lhs, rhs }))
            .collect()
    }

    fn ready(&self) -> Result<(&[ContactData], Vec<GaussPoint>, LagrangeBasis)> {
        let initialized = (self.slave_type, self.basis, self.integration_order);
        let (slave_type, basis, order) = match initialized {
            (Some(t), Some(b), Some(o)) => (t, b, o),
            _ => {
                return Err(Error::Condition(format!(
                    "Condition of slave segment {} is not initialized",
                    self.slave
                )))
            }
        };
        let pairs = self.pair_data.as_deref().ok_or_else(|| {
            Error::Condition(format!(
                "No contact data for slave segment {}: initialize_non_linear_iteration was not called",
                self.slave
            ))
        })?;
        let points = create_geometry(slave_type).integration_points(order);
        Ok((pairs, points, basis))
    }

    fn gate(&self, data: &ContactData) -> ActiveSetGate {
        ActiveSetGate::new(
            self.settings.active_check_factor,
            data.slave_length,
            data.master_length,
        )
    }

    fn calculate(&self, request: CalculationRequest) -> Result<LocalSystem> {
        let (pairs, points, basis) = self.ready()?;

        let kernels = pairs
            .iter()
            .map(|data| {
                create_kernel(MortarKernel::select(
                    self.dimension,
                    data.n_master(),
                    data.n_slave(),
                )?)
            })
            .collect::<Result<Vec<_>>>()?;

        let size: usize = kernels.iter().map(|k| k.pair_size()).sum();
        let mut system = LocalSystem {
            lhs: if request.lhs { DMatrix::zeros(size, size) } else { DMatrix::zeros(0, 0) },
            rhs: if request.rhs { DVector::zeros(size) } else { DVector::zeros(0) },
        };

        let mut offset = 0;
        for (pair, (data, kernel)) in pairs.iter().zip(&kernels).enumerate() {
            let n = kernel.pair_size();
            let gate = self.gate(data);
            let lhs_size = if request.lhs { n } else { 0 };
            let rhs_size = if request.rhs { n } else { 0 };
            let mut pair_lhs = DMatrix::zeros(lhs_size, lhs_size);
            let mut pair_rhs = DVector::zeros(rhs_size);

            for (point, gp) in points.iter().enumerate() {
                let mut vars = GeneralVariables::compute(data, basis, &gp.local());
                let gap = interpolated_gap(&vars.n1, &data.gaps);
                if !gate.is_active(gap) {
                    trace!(
                        "Pair {} point {} inactive (gap {:?}, tolerance {})",
                        pair,
                        point,
                        gap,
                        gate.tolerance()
                    );
                    continue;
                }
                vars.mask_missed_nodes(data);
                add_point(
                    kernel.as_ref(),
                    request,
                    &mut pair_lhs,
                    &mut pair_rhs,
                    &vars,
                    data,
                    gp.weight,
                );
            }

            if request.lhs {
                let mut block = system.lhs.view_mut((offset, offset), (n, n));
                block += &pair_lhs;
            }
            if request.rhs {
                let mut block = system.rhs.rows_mut(offset, n);
                block += &pair_rhs;
            }
            offset += n;
        }

        Ok(system)
    }

    /// (node, variable) pairs in system order.
    fn dof_keys(&self, mesh: &ContactMesh) -> Result<Vec<(NodeId, DofVariable)>> {
        let dimension = mesh.dimension();
        let slave_nodes = &mesh.segment(self.slave)?.nodes;
        let mut keys = Vec::new();

        for &master in &self.masters {
            let master_nodes = &mesh.segment(master)?.nodes;
            let blocks = [
                (master_nodes, dimension.displacement_variables()),
                (slave_nodes, dimension.displacement_variables()),
                (slave_nodes, dimension.multiplier_variables()),
            ];
            for (nodes, variables) in blocks {
                for &node in nodes {
                    keys.extend(variables.iter().map(|&v| (node, v)));
                }
            }
        }

        Ok(keys)
    }
}

fn add_point(
    kernel: &dyn ContactKernel,
    request: CalculationRequest,
    lhs: &mut DMatrix<f64>,
    rhs: &mut DVector<f64>,
    vars: &GeneralVariables,
    data: &ContactData,
    weight: f64,
) {
    let operator = request.operator;
    if request.lhs {
        if operator.internal() {
            kernel.add_internal_lhs(lhs, vars, data, weight);
        }
        if operator.constraint() {
            kernel.add_contact_lhs(lhs, vars, data, weight);
        }
    }
    if request.rhs {
        if operator.internal() {
            kernel.add_internal_rhs(rhs, vars, data, weight);
        }
        if operator.constraint() {
            kernel.add_contact_rhs(rhs, vars, data, weight);
        }
    }
}
