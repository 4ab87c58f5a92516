//! Slave/master pairing.
//!
//! A contact condition asks a [`PairingProvider`] for the candidate master
//! segments of its slave segment at the start of every solution step. The
//! lists must be fully populated before that point.

use crate::error::{Error, Result};
use crate::mesh::ContactMesh;
use crate::types::SegmentId;
use log::debug;
use std::collections::HashMap;

/// Source of candidate master segments per slave segment.
pub trait PairingProvider {
    /// Ordered master segments paired with `slave`. Empty if there are none.
    fn master_segments(&self, slave: SegmentId) -> &[SegmentId];
}

/// Explicit slave → masters table.
#[derive(Debug, Clone, Default)]
pub struct ContactPairs {
    pairs: HashMap<SegmentId, Vec<SegmentId>>,
}

impl ContactPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a master segment to the list of `slave`. Duplicates are ignored.
    pub fn insert(&mut self, slave: SegmentId, master: SegmentId) {
        let masters = self.pairs.entry(slave).or_default();
        if !masters.contains(&master) {
            masters.push(master);
        }
    }

    /// Remove every pair.
    pub fn clear(&mut self) {
        self.pairs.clear();
    }

    /// Total number of slave/master pairs.
    pub fn n_pairs(&self) -> usize {
        self.pairs.values().map(Vec::len).sum()
    }

    /// Brute-force proximity search.
    ///
    /// Rebuilds the table so that every slave segment is paired with each
    /// master segment whose center lies within
    /// `radius_factor × max(slave length, master length)` of the slave center.
    /// Master lists keep the order of `masters`.
    pub fn search(
        &mut self,
        mesh: &ContactMesh,
        slaves: &[SegmentId],
        masters: &[SegmentId],
        radius_factor: f64,
    ) -> Result<()> {
        if radius_factor.is_nan() || radius_factor <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "search radius factor must be positive, got {}",
                radius_factor
            )));
        }

        let describe = |idx: SegmentId| -> Result<_> {
            let geometry = mesh.segment(idx)?.geometry();
            let coords = mesh.segment_coords(idx)?;
            Ok((geometry.center(&coords), geometry.length(&coords)))
        };

        let master_info = masters
            .iter()
            .map(|&m| describe(m).map(|info| (m, info)))
            .collect::<Result<Vec<_>>>()?;

        self.pairs.clear();
        for &slave in slaves {
            let (slave_center, slave_length) = describe(slave)?;
            for &(master, (master_center, master_length)) in &master_info {
                if master == slave {
                    continue;
                }
                let radius = radius_factor * slave_length.max(master_length);
                if (master_center - slave_center).norm() <= radius {
                    self.insert(slave, master);
                }
            }
        }

        debug!(
            "Pairing search: {} slave segments, {} pairs",
            slaves.len(),
            self.n_pairs()
        );
        Ok(())
    }
}

impl PairingProvider for ContactPairs {
    fn master_segments(&self, slave: SegmentId) -> &[SegmentId] {
        self.pairs.get(&slave).map(Vec::as_slice).unwrap_or(&[])
    }
}
