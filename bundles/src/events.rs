//! Typed events emitted by the bundle engine.
//!
//! Handlers collect events into their output instead of emitting them
//! directly; the surrounding runtime decides how to publish them.

use {
    crate::types::{VoteDistribution, VoteKind},
    bundlenet_rewards::BundleReward,
    solana_pubkey::Pubkey,
};

/// An event produced by a message handler or the timeout sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleEvent {
    /// A staker claimed the vacant uploader role.
    ClaimedUploaderRole { pool_id: u64, new_uploader: Pubkey },

    /// The designated uploader passed its turn.
    SkippedUploaderRole {
        pool_id: u64,
        previous_uploader: Pubkey,
        new_uploader: Option<Pubkey>,
    },

    /// A new bundle proposal was registered and is awaiting quorum.
    BundleProposed {
        pool_id: u64,
        /// Sequential id the bundle will receive if it finalizes.
        id: u64,
        storage_id: String,
        uploader: Pubkey,
        data_size: u64,
        from_index: u64,
        bundle_size: u64,
        from_key: String,
        to_key: String,
        bundle_summary: String,
        data_hash: String,
        proposed_at: u64,
    },

    /// A vote was cast (including the uploader's implicit valid vote on its
    /// own submission).
    BundleVote {
        pool_id: u64,
        staker: Pubkey,
        storage_id: String,
        vote: VoteKind,
    },

    /// A round concluded — finalized or dropped, per `distribution.status`.
    /// Dropped rounds carry a zeroed reward.
    BundleFinalized {
        pool_id: u64,
        id: u64,
        distribution: VoteDistribution,
        reward: BundleReward,
        finalized_at: u64,
        uploader: Option<Pubkey>,
        next_uploader: Option<Pubkey>,
    },

    /// A staker earned a non-participation point.
    PointIncreased {
        pool_id: u64,
        staker: Pubkey,
        current_points: u64,
    },

    /// A staker's non-participation points were reset after proven
    /// liveness.
    PointsReset { pool_id: u64, staker: Pubkey },

    /// The pool could not cover a finalized round's payout; the round
    /// stays open.
    PoolOutOfFunds { pool_id: u64 },
}
