//! Collaborator seams of the bundle engine.
//!
//! The engine consumes the staking/delegation module and the pool/funding
//! module through these traits; their lifecycles (joining, delegating,
//! funding, slashing execution) live outside this crate.

use {crate::error::BundleError, solana_pubkey::Pubkey};

/// Reasons a pool is unable to produce bundles right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolHalt {
    /// Disabled by governance. Mid-flight proposals are dropped.
    Disabled,
    /// A runtime upgrade is scheduled or in progress.
    Upgrading,
    /// The funding balance is exhausted.
    OutOfFunds,
    /// Total pool stake is below the configured minimum.
    MinStakeNotReached,
    /// One participant exceeds the maximum voting-power share.
    VotingPowerTooHigh,
}

impl From<PoolHalt> for BundleError {
    fn from(halt: PoolHalt) -> Self {
        match halt {
            PoolHalt::Disabled => BundleError::PoolDisabled,
            PoolHalt::Upgrading => BundleError::PoolUpgrading,
            PoolHalt::OutOfFunds => BundleError::PoolOutOfFunds,
            PoolHalt::MinStakeNotReached => BundleError::MinStakeNotReached,
            PoolHalt::VotingPowerTooHigh => BundleError::VotingPowerTooHigh,
        }
    }
}

/// The protocol violation a slash is executed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashKind {
    /// Voted against the finalized outcome.
    Vote,
    /// Uploaded a bundle the pool rejected.
    Upload,
    /// Accumulated the maximum number of non-participation points.
    Timeout,
}

/// Staking/delegation collaborator.
///
/// Stake amounts are denominated in the chain's base stake unit. All read
/// methods reflect the *current* committed state; votes from participants
/// who left the pool tally at zero power through these reads.
pub trait StakingProvider {
    /// Total voting power of a participant (own stake plus delegation).
    fn stake_of(&self, participant: &Pubkey) -> u64;

    /// All active participants of a pool, sorted by address.
    fn participants_of(&self, pool_id: u64) -> Vec<Pubkey>;

    /// Whether `staker` is currently an active participant of the pool.
    fn is_participant(&self, pool_id: u64, staker: &Pubkey) -> bool;

    /// Whether `signer` may act for `staker` in this pool.
    fn is_authorized(&self, pool_id: u64, staker: &Pubkey, signer: &Pubkey) -> bool;

    /// The staker's configured commission, in basis points.
    fn commission_bps(&self, staker: &Pubkey) -> u64;

    /// Stake delegated to the staker by third parties.
    fn delegation_of(&self, staker: &Pubkey) -> u64;

    /// Credit commission rewards to the staker, claimable later.
    fn pay_commission(&mut self, staker: &Pubkey, amount: u64);

    /// Accrue rewards to the staker's delegators pro-rata.
    fn accrue_delegation_rewards(&mut self, staker: &Pubkey, amount: u64);

    /// Add one non-participation point; returns the new count.
    fn add_point(&mut self, pool_id: u64, staker: &Pubkey) -> u64;

    /// Reset non-participation points; returns the previous count.
    fn reset_points(&mut self, pool_id: u64, staker: &Pubkey) -> u64;

    /// Slash the staker (and its delegators) and remove it from the pool.
    fn slash_and_remove(&mut self, pool_id: u64, staker: &Pubkey, kind: SlashKind);
}

/// Pool/funding collaborator.
pub trait PoolProvider {
    /// Ids of all existing pools, in ascending order.
    fn pool_ids(&self) -> Vec<u64>;

    /// Whether the pool fulfils all requirements to produce bundles.
    fn can_run(&self, pool_id: u64) -> Result<(), PoolHalt>;

    /// Base payout per finalized round, before storage rewards.
    fn operating_cost(&self, pool_id: u64) -> u64;

    /// Index of the next record the pool expects.
    fn current_index(&self, pool_id: u64) -> u64;

    /// Minimum seconds between proposal submissions.
    fn upload_interval(&self, pool_id: u64) -> u64;

    /// Maximum records per bundle.
    fn max_bundle_size(&self, pool_id: u64) -> u64;

    /// Deduct `amount` from the pool's funding balance. Returns `false`
    /// (without deducting) when the balance cannot cover it.
    fn charge(&mut self, pool_id: u64, amount: u64) -> bool;

    /// Route an already-charged amount to the network treasury.
    fn fund_treasury(&mut self, amount: u64);

    /// Advance the pool's record index and summary after a finalization.
    fn advance_index(&mut self, pool_id: u64, new_index: u64, to_key: &str, summary: &str);
}
