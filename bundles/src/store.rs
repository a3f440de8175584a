//! Persisted state of the bundle module.
//!
//! Plain data keyed by ordered maps; how the maps reach disk is the
//! surrounding runtime's concern. Ordered containers matter: iteration
//! order feeds consensus-relevant output.

use {
    crate::{
        round_robin::RoundRobinEntry,
        types::{BundleProposal, FinalizedBundle},
    },
    std::collections::BTreeMap,
};

/// All state owned by the bundle module.
///
/// One mutable proposal slot per pool, an append-only finalized-bundle
/// table keyed by `(pool_id, id)`, and one round-robin ledger per pool.
#[derive(Debug, Clone, Default)]
pub struct BundleStore {
    proposals: BTreeMap<u64, BundleProposal>,
    finalized: BTreeMap<(u64, u64), FinalizedBundle>,
    round_robin: BTreeMap<u64, Vec<RoundRobinEntry>>,
}

impl BundleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pool's current proposal, if the slot was ever written.
    pub fn proposal(&self, pool_id: u64) -> Option<&BundleProposal> {
        self.proposals.get(&pool_id)
    }

    /// The pool's current proposal, or the implicit empty slot every pool
    /// starts with.
    pub fn proposal_or_default(&self, pool_id: u64) -> BundleProposal {
        self.proposals
            .get(&pool_id)
            .cloned()
            .unwrap_or_else(|| BundleProposal::new(pool_id))
    }

    pub fn set_proposal(&mut self, proposal: BundleProposal) {
        self.proposals.insert(proposal.pool_id, proposal);
    }

    /// Number of finalized bundles of a pool; doubles as the next id.
    pub fn finalized_count(&self, pool_id: u64) -> u64 {
        self.finalized
            .range((pool_id, 0)..=(pool_id, u64::MAX))
            .count() as u64
    }

    pub fn finalized_bundle(&self, pool_id: u64, id: u64) -> Option<&FinalizedBundle> {
        self.finalized.get(&(pool_id, id))
    }

    /// All finalized bundles of a pool in id order.
    pub fn finalized_bundles(&self, pool_id: u64) -> impl Iterator<Item = &FinalizedBundle> {
        self.finalized
            .range((pool_id, 0)..=(pool_id, u64::MAX))
            .map(|(_, bundle)| bundle)
    }

    /// Append a finalized bundle under its own `(pool_id, id)` key.
    pub fn append_finalized(&mut self, bundle: FinalizedBundle) {
        self.finalized.insert((bundle.pool_id, bundle.id), bundle);
    }

    pub fn round_robin_ledger(&self, pool_id: u64) -> &[RoundRobinEntry] {
        self.round_robin
            .get(&pool_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn set_round_robin_ledger(&mut self, pool_id: u64, ledger: Vec<RoundRobinEntry>) {
        self.round_robin.insert(pool_id, ledger);
    }
}
