//! Closed-form mortar contact kernels.
//!
//! A kernel adds the contribution of one integration point to the pair-local
//! system of a slave/master pair. The pair block is ordered
//!
//! ```text
//! [ master displacements | slave displacements | slave multipliers ]
//! ```
//!
//! with `dim` scalar unknowns per node. Contributions are split in two
//! operators:
//!
//! - **internal**: multiplier tractions acting on the displacement equations,
//! - **contact**: the weighted normal gap constraint on the multiplier
//!   equations, with the frictionless tangential condition on λ.
//!
//! With ω = w·|J|, λ̄ = Σ Φⱼ λⱼ and g the gap interpolated over the slave
//! nodes with a valid gap
//! ([`interpolated_gap`](crate::active_set::interpolated_gap)), the right-hand sides are
//!
//! ```text
//! r_m(l) = +ω N2ₗ λ̄          r_s(k) = -ω N1ₖ λ̄
//! r_λ(j) = -ω Φⱼ (g nⱼ + (tⱼ·λ̄) tⱼ)
//! ```
//!
//! and the left-hand sides their linearizations.

use crate::active_set::interpolated_gap;
use crate::error::{Error, Result};
use crate::pair::{ContactData, GeneralVariables};
use crate::types::{Dimension, Vec3};
use nalgebra::{DMatrix, DVector};

/// Kernel selected from the exact (dimension, master nodes, slave nodes) tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MortarKernel {
    /// 2D, 2 master nodes, 2 slave nodes.
    Linear2D,
    /// 2D, 3 master nodes, 3 slave nodes.
    Quadratic2D,
    /// 3D, 3 master nodes, 3 slave nodes.
    Triangle3D,
    /// 3D, 4 master nodes, 4 slave nodes.
    Quadrilateral3D,
}

impl MortarKernel {
    pub fn select(dimension: Dimension, n_master: usize, n_slave: usize) -> Result<Self> {
        match (dimension, n_master, n_slave) {
            (Dimension::Two, 2, 2) => Ok(MortarKernel::Linear2D),
            (Dimension::Two, 3, 3) => Ok(MortarKernel::Quadratic2D),
            (Dimension::Three, 3, 3) => Ok(MortarKernel::Triangle3D),
            (Dimension::Three, 4, 4) => Ok(MortarKernel::Quadrilateral3D),
            _ => Err(Error::unsupported(dimension.n(), Some(n_master), n_slave)),
        }
    }

    /// Node counts as (dimension, master, slave).
    pub fn combination(self) -> (usize, usize, usize) {
        match self {
            MortarKernel::Linear2D => (2, 2, 2),
            MortarKernel::Quadratic2D => (2, 3, 3),
            MortarKernel::Triangle3D => (3, 3, 3),
            MortarKernel::Quadrilateral3D => (3, 4, 4),
        }
    }

    /// Fail for kernels without a closed form.
    ///
    /// The surface normal and tangent linearization needed by the 3D kernels
    /// is not available, so those report an unsupported combination.
    pub fn ensure_implemented(self) -> Result<()> {
        create_kernel(self).map(|_| ())
    }

    /// Pair block size: dim × (master + 2 × slave).
    pub fn pair_size(self) -> usize {
        let (dimension, master, slave) = self.combination();
        dimension * (master + 2 * slave)
    }
}

/// Integration-point contribution of a slave/master pair.
pub trait ContactKernel: Send + Sync {
    /// Size of the pair-local system.
    fn pair_size(&self) -> usize;

    /// Internal operator: multiplier coupling of the displacement rows.
    fn add_internal_lhs(
        &self,
        lhs: &mut DMatrix<f64>,
        vars: &GeneralVariables,
        data: &ContactData,
        weight: f64,
    );

    /// Contact operator: linearized constraint rows of the multipliers.
    fn add_contact_lhs(
        &self,
        lhs: &mut DMatrix<f64>,
        vars: &GeneralVariables,
        data: &ContactData,
        weight: f64,
    );

    fn add_internal_rhs(
        &self,
        rhs: &mut DVector<f64>,
        vars: &GeneralVariables,
        data: &ContactData,
        weight: f64,
    );

    fn add_contact_rhs(
        &self,
        rhs: &mut DVector<f64>,
        vars: &GeneralVariables,
        data: &ContactData,
        weight: f64,
    );
}

/// Create the kernel implementation of a selector.
pub fn create_kernel(kernel: MortarKernel) -> Result<Box<dyn ContactKernel>> {
    match kernel {
        MortarKernel::Linear2D => Ok(Box::new(Contact2D::<2, 2>)),
        MortarKernel::Quadratic2D => Ok(Box::new(Contact2D::<3, 3>)),
        MortarKernel::Triangle3D | MortarKernel::Quadrilateral3D => {
            let (dimension, master, slave) = kernel.combination();
            Err(Error::unsupported(dimension, Some(master), slave))
        }
    }
}

/// Plane mortar kernel for `MASTER` master and `SLAVE` slave nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Contact2D<const MASTER: usize, const SLAVE: usize>;

/// Linear lines.
pub type Contact2D2N2N = Contact2D<2, 2>;
/// Quadratic lines.
pub type Contact2D3N3N = Contact2D<3, 3>;

const DIM: usize = 2;

impl<const MASTER: usize, const SLAVE: usize> Contact2D<MASTER, SLAVE> {
    #[inline]
    fn master(l: usize) -> usize {
        DIM * l
    }

    #[inline]
    fn slave(k: usize) -> usize {
        DIM * (MASTER + k)
    }

    #[inline]
    fn lambda(j: usize) -> usize {
        DIM * (MASTER + SLAVE + j)
    }

    fn interpolated_multiplier(vars: &GeneralVariables, data: &ContactData) -> Vec3 {
        data.multipliers
            .iter()
            .zip(vars.phi.iter())
            .fold(Vec3::zeros(), |acc, (lambda, &phi)| acc + lambda * phi)
    }
}

impl<const MASTER: usize, const SLAVE: usize> ContactKernel for Contact2D<MASTER, SLAVE> {
    fn pair_size(&self) -> usize {
        DIM * (MASTER + 2 * SLAVE)
    }

    fn add_internal_lhs(
        &self,
        lhs: &mut DMatrix<f64>,
        vars: &GeneralVariables,
        _data: &ContactData,
        weight: f64,
    ) {
        let omega = weight * vars.det_j;
        for j in 0..SLAVE {
            let phi = vars.phi[j];
            for k in 0..SLAVE {
                let v = omega * vars.n1[k] * phi;
                for a in 0..DIM {
                    lhs[(Self::slave(k) + a, Self::lambda(j) + a)] += v;
                }
            }
            for l in 0..MASTER {
                let v = -omega * vars.n2[l] * phi;
                for a in 0..DIM {
                    lhs[(Self::master(l) + a, Self::lambda(j) + a)] += v;
                }
            }
        }
    }

    fn add_contact_lhs(
        &self,
        lhs: &mut DMatrix<f64>,
        vars: &GeneralVariables,
        data: &ContactData,
        weight: f64,
    ) {
        let omega = weight * vars.det_j;
        let n_bar = vars.normal;
        for j in 0..SLAVE {
            let phi_j = vars.phi[j];
            let n = data.normals[j];
            let t = data.tangent_xi[j];

            for a in 0..DIM {
                for b in 0..DIM {
                    let nn = omega * phi_j * n[a] * n_bar[b];
                    for l in 0..MASTER {
                        lhs[(Self::lambda(j) + a, Self::master(l) + b)] += nn * vars.n2[l];
                    }
                    for k in 0..SLAVE {
                        lhs[(Self::lambda(j) + a, Self::slave(k) + b)] -= nn * vars.n1[k];
                    }

                    let tt = omega * phi_j * t[a] * t[b];
                    for i in 0..SLAVE {
                        lhs[(Self::lambda(j) + a, Self::lambda(i) + b)] += tt * vars.phi[i];
                    }
                }
            }
        }
    }

    fn add_internal_rhs(
        &self,
        rhs: &mut DVector<f64>,
        vars: &GeneralVariables,
        data: &ContactData,
        weight: f64,
    ) {
        let omega = weight * vars.det_j;
        let lambda = Self::interpolated_multiplier(vars, data);
        for a in 0..DIM {
            for l in 0..MASTER {
                rhs[Self::master(l) + a] += omega * vars.n2[l] * lambda[a];
            }
            for k in 0..SLAVE {
                rhs[Self::slave(k) + a] -= omega * vars.n1[k] * lambda[a];
            }
        }
    }

    fn add_contact_rhs(
        &self,
        rhs: &mut DVector<f64>,
        vars: &GeneralVariables,
        data: &ContactData,
        weight: f64,
    ) {
        let omega = weight * vars.det_j;
        let lambda = Self::interpolated_multiplier(vars, data);
        let gap = interpolated_gap(&vars.n1, &data.gaps).unwrap_or(0.0);
        for j in 0..SLAVE {
            let n = data.normals[j];
            let t = data.tangent_xi[j];
            let constraint = n * gap + t * t.dot(&lambda);
            for a in 0..DIM {
                rhs[Self::lambda(j) + a] -= omega * vars.phi[j] * constraint[a];
            }
        }
    }
}
