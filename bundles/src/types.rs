//! Core types of the bundle consensus engine.
//!
//! Defines the per-pool bundle proposal, the append-only finalized-bundle
//! record, vote bookkeeping types and the four message types participants
//! submit.

use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
};

// ---------------------------------------------------------------------------
// Block context
// ---------------------------------------------------------------------------

/// Deterministic per-block execution context. All handlers derive time from
/// here — never from the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockContext {
    /// Current block height.
    pub height: u64,
    /// Block time as unix seconds.
    pub time: u64,
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// A participant's verdict on a bundle proposal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub enum VoteKind {
    /// The proposed bundle matches the off-chain data.
    Valid,
    /// The proposed bundle does not match the off-chain data.
    Invalid,
    /// The voter could not verify the bundle (e.g. storage unreachable).
    Abstain,
}

/// Outcome classification of a vote tally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub enum BundleStatus {
    /// Neither side reached its quorum threshold yet.
    NoQuorum,
    /// Strictly more than 50 % of total power voted valid.
    Valid,
    /// At least 50 % of total power voted invalid. Ties reject: unverifiable
    /// data must not finalize.
    Invalid,
    /// The pool was disabled while the proposal was mid-flight.
    Disabled,
}

/// Stake-weighted vote totals for the current evaluation of a proposal.
///
/// `total` sums the power of *all* active participants, not just voters, so
/// silent stake keeps a proposal below quorum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct VoteDistribution {
    pub valid: u64,
    pub invalid: u64,
    pub abstain: u64,
    pub total: u64,
    pub status: BundleStatus,
}

impl VoteDistribution {
    /// The all-zero distribution used when a pool is disabled mid-round.
    pub fn disabled() -> Self {
        Self {
            valid: 0,
            invalid: 0,
            abstain: 0,
            total: 0,
            status: BundleStatus::Disabled,
        }
    }
}

impl Default for VoteDistribution {
    fn default() -> Self {
        Self {
            valid: 0,
            invalid: 0,
            abstain: 0,
            total: 0,
            status: BundleStatus::NoQuorum,
        }
    }
}

// ---------------------------------------------------------------------------
// Bundle proposal
// ---------------------------------------------------------------------------

/// The single mutable bundle proposal of a pool.
///
/// Created implicitly with the pool and never deleted — dropping a proposal
/// resets it to an empty payload (`storage_id == ""`) while the slot itself
/// survives. A participant appears in at most one of the three voter lists.
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct BundleProposal {
    /// The pool this proposal belongs to.
    pub pool_id: u64,
    /// Off-chain storage reference of the proposed data. Empty means no
    /// active proposal (initial or dropped state).
    pub storage_id: String,
    /// The participant who submitted the current proposal.
    pub uploader: Option<Pubkey>,
    /// The participant designated to submit the next proposal.
    pub next_uploader: Option<Pubkey>,
    /// Byte size of the proposed data.
    pub data_size: u64,
    /// Number of records in the proposed bundle.
    pub bundle_size: u64,
    /// Application-defined key of the first record.
    pub from_key: String,
    /// Application-defined key of the last record.
    pub to_key: String,
    /// Content digest of the bundle.
    pub bundle_summary: String,
    /// Hash of the raw bundle data.
    pub data_hash: String,
    /// Unix seconds of the last lifecycle transition; submission windows and
    /// timeouts are measured from here.
    pub updated_at: u64,
    /// Participants who voted valid, in vote order.
    pub voters_valid: Vec<Pubkey>,
    /// Participants who voted invalid, in vote order.
    pub voters_invalid: Vec<Pubkey>,
    /// Participants who abstained, in vote order.
    pub voters_abstain: Vec<Pubkey>,
}

impl BundleProposal {
    /// A fresh, empty proposal slot for a newly created pool.
    pub fn new(pool_id: u64) -> Self {
        Self {
            pool_id,
            ..Self::default()
        }
    }

    /// The dropped shape: payload and votes cleared, uploader role and clock
    /// carried forward.
    pub fn dropped(pool_id: u64, next_uploader: Option<Pubkey>, updated_at: u64) -> Self {
        Self {
            pool_id,
            next_uploader,
            updated_at,
            ..Self::default()
        }
    }

    /// Whether a proposal payload is currently awaiting quorum.
    pub fn is_active(&self) -> bool {
        !self.storage_id.is_empty()
    }

    pub fn has_voted_valid(&self, staker: &Pubkey) -> bool {
        self.voters_valid.contains(staker)
    }

    pub fn has_voted_invalid(&self, staker: &Pubkey) -> bool {
        self.voters_invalid.contains(staker)
    }

    pub fn has_voted_abstain(&self, staker: &Pubkey) -> bool {
        self.voters_abstain.contains(staker)
    }

    /// Whether `staker` appears in any voter list.
    pub fn has_voted(&self, staker: &Pubkey) -> bool {
        self.has_voted_valid(staker)
            || self.has_voted_invalid(staker)
            || self.has_voted_abstain(staker)
    }
}

// ---------------------------------------------------------------------------
// Finalized bundles
// ---------------------------------------------------------------------------

/// Block coordinates of a finalization.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize,
    BorshDeserialize,
)]
pub struct FinalizedAt {
    pub height: u64,
    pub timestamp: u64,
}

/// Stake snapshot recorded at finalization time for auditability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize,
    BorshDeserialize,
)]
pub struct StakeSecurity {
    /// Power that voted valid when the bundle finalized.
    pub valid_vote_power: u64,
    /// Total power of the pool when the bundle finalized.
    pub total_vote_power: u64,
}

/// Immutable record of a quorum-approved bundle. Append-only, keyed by
/// `(pool_id, id)` with `id` assigned sequentially per pool.
#[derive(
    Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct FinalizedBundle {
    pub pool_id: u64,
    pub id: u64,
    pub storage_id: String,
    pub uploader: Option<Pubkey>,
    /// First record index covered by this bundle (inclusive).
    pub from_index: u64,
    /// One past the last record index (half-open range).
    pub to_index: u64,
    pub from_key: String,
    pub to_key: String,
    pub bundle_summary: String,
    pub data_hash: String,
    pub finalized_at: FinalizedAt,
    pub stake_security: StakeSecurity,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Claim the vacant uploader role of a pool, first come first served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimUploaderRole {
    pub pool_id: u64,
    /// The staker claiming the role.
    pub staker: Pubkey,
    /// The address signing the message on the staker's behalf.
    pub creator: Pubkey,
}

/// Submit the next bundle proposal. Implicitly finalizes or drops the
/// previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitBundleProposal {
    pub pool_id: u64,
    pub staker: Pubkey,
    pub creator: Pubkey,
    pub storage_id: String,
    pub data_size: u64,
    pub bundle_size: u64,
    /// Must equal the pool's current index plus the previous proposal's
    /// bundle size — no gaps, no overlaps.
    pub from_index: u64,
    pub from_key: String,
    pub to_key: String,
    pub bundle_summary: String,
    pub data_hash: String,
}

/// Vote on the pool's active bundle proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteBundleProposal {
    pub pool_id: u64,
    pub staker: Pubkey,
    pub creator: Pubkey,
    /// Must match the active proposal's storage id.
    pub storage_id: String,
    pub vote: VoteKind,
}

/// Pass the uploader turn without submitting data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipUploaderRole {
    pub pool_id: u64,
    pub staker: Pubkey,
    pub creator: Pubkey,
    pub from_index: u64,
}
