use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// Partition of a finalized bundle's payout.
///
/// Invariant: `treasury + uploader + delegation == total` for every value
/// returned by [`crate::calculator::split_bundle_reward`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize,
    BorshDeserialize,
)]
pub struct BundleReward {
    /// Share routed to the network treasury.
    pub treasury: u64,
    /// Share paid to the uploader as commission rewards.
    pub uploader: u64,
    /// Share accrued to the uploader's delegators pro-rata.
    pub delegation: u64,
    /// The full payout for the round (`operating_cost + storage reward`).
    pub total: u64,
}

impl BundleReward {
    /// Check the conservation invariant.
    pub fn is_conserved(&self) -> bool {
        self.treasury
            .checked_add(self.uploader)
            .and_then(|sum| sum.checked_add(self.delegation))
            == Some(self.total)
    }
}

/// Reward-relevant view of the uploader at finalization time.
///
/// Callers pass `None` when the uploader is no longer a registered
/// participant of the pool; the whole payout then goes to the treasury so
/// that funds are never orphaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploaderInfo {
    /// The uploader's commission in basis points (≤ 10_000).
    pub commission_bps: u64,
    /// Stake delegated to the uploader by third parties. Zero means the
    /// uploader keeps the whole node reward.
    pub delegation: u64,
}
