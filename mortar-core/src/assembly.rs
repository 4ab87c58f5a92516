//! Parallel contact assembly.
//!
//! Runs the condition lifecycle over many conditions and scatters their
//! systems into the global contact matrix and residual by equation id.
//! Conditions share no mutable state, so every lifecycle stage is a
//! data-parallel loop with Rayon; the scatter into the triplet builder is
//! sequential.

use crate::condition::{LocalSystem, MortarContactCondition};
use crate::error::{Error, Result};
use crate::mesh::ContactMesh;
use crate::pairing::PairingProvider;
use crate::sparse::{CsrMatrix, SparseVector, TripletMatrix};
use log::debug;
use rayon::prelude::*;

/// Assembled contact system.
pub struct AssembledSystem {
    /// Global contact matrix.
    pub stiffness: CsrMatrix,
    /// Global contact residual.
    pub rhs: Vec<f64>,
    /// Number of equations in the system.
    pub n_dofs: usize,
}

/// Assembly options.
#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    /// Number of parallel threads (0 = Rayon's global pool).
    pub n_threads: usize,
}

/// Run `f` on the pool requested by `options`.
fn with_pool<T: Send>(options: &AssemblyOptions, f: impl FnOnce() -> T + Send) -> Result<T> {
    if options.n_threads == 0 {
        return Ok(f());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.n_threads)
        .build()
        .map_err(|e| Error::Assembly(format!("Failed to build thread pool: {}", e)))?;
    Ok(pool.install(f))
}

/// Initialize every condition.
pub fn initialize(conditions: &mut [MortarContactCondition], mesh: &ContactMesh) -> Result<()> {
    conditions
        .par_iter_mut()
        .try_for_each(|condition| condition.initialize(mesh))
}

/// Start a solution step: refresh every master list.
pub fn initialize_solution_step<P>(conditions: &mut [MortarContactCondition], pairs: &P)
where
    P: PairingProvider + Sync,
{
    conditions
        .par_iter_mut()
        .for_each(|condition| condition.initialize_solution_step(pairs));
}

/// Start a nonlinear iteration: rebuild the contact data of every condition.
pub fn initialize_non_linear_iteration(
    conditions: &mut [MortarContactCondition],
    mesh: &ContactMesh,
) -> Result<()> {
    conditions
        .par_iter_mut()
        .try_for_each(|condition| condition.initialize_non_linear_iteration(mesh))
}

/// End a nonlinear iteration.
pub fn finalize_non_linear_iteration(conditions: &[MortarContactCondition]) -> Result<()> {
    conditions
        .par_iter()
        .try_for_each(MortarContactCondition::finalize_non_linear_iteration)
}

/// Assemble the global contact matrix and residual.
///
/// The mesh DOFs must be numbered. Any condition error aborts the assembly.
///
/// # Example
///
/// ```ignore
/// use mortar_core::assembly::{self, AssemblyOptions};
///
/// assembly::initialize(&mut conditions, &mesh)?;
/// assembly::initialize_solution_step(&mut conditions, &pairs);
/// assembly::initialize_non_linear_iteration(&mut conditions, &mesh)?;
/// let system = assembly::assemble(&conditions, &mesh, &AssemblyOptions::default())?;
/// ```
pub fn assemble(
    conditions: &[MortarContactCondition],
    mesh: &ContactMesh,
    options: &AssemblyOptions,
) -> Result<AssembledSystem> {
    let n_dofs = mesh.n_dofs();
    if n_dofs == 0 && !conditions.is_empty() {
        return Err(Error::Assembly(
            "Mesh DOFs are not numbered; call number_dofs first".into(),
        ));
    }

    // Condition systems in parallel
    let contributions: Vec<(Vec<usize>, LocalSystem)> = with_pool(options, || {
        conditions
            .par_iter()
            .map(|condition| -> Result<_> {
                let ids = condition.equation_ids(mesh)?;
                let system = condition.calculate_local_system()?;
                Ok((ids, system))
            })
            .collect::<Result<Vec<_>>>()
    })??;

    let nnz_estimate = contributions.iter().map(|(ids, _)| ids.len().pow(2)).sum();
    let mut triplet = TripletMatrix::with_capacity(n_dofs, n_dofs, nnz_estimate);
    let mut rhs = SparseVector::zeros(n_dofs);

    for (ids, system) in &contributions {
        triplet.add_submatrix(ids, &system.lhs)?;
        rhs.add_subvector(ids, &system.rhs)?;
    }

    debug!(
        "Assembled {} contact conditions into {} equations ({} triplets)",
        conditions.len(),
        n_dofs,
        triplet.nnz()
    );

    Ok(AssembledSystem {
        stiffness: triplet.to_csr()?,
        rhs: rhs.into_vec(),
        n_dofs,
    })
}
