use {bundlenet_rewards::RewardError, solana_pubkey::Pubkey, thiserror::Error};

/// Errors produced by the bundle consensus engine.
///
/// Every variant is a synchronous rejection of a single message or sweep
/// step; nothing is retried automatically. Precondition failures leave the
/// store untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// The pool is disabled by governance.
    #[error("pool is disabled")]
    PoolDisabled,

    /// The pool is executing a runtime upgrade.
    #[error("pool currently upgrading")]
    PoolUpgrading,

    /// The pool's funding balance is exhausted.
    #[error("pool has run out of funds")]
    PoolOutOfFunds,

    /// The pool's total stake is below its configured minimum.
    #[error("minimum stake not reached")]
    MinStakeNotReached,

    /// A single participant holds more voting power than the pool allows.
    #[error("participant exceeds maximum voting power")]
    VotingPowerTooHigh,

    /// The signer is not authorized to act for the staker in this pool.
    #[error("{staker} is not authorized for pool {pool_id}")]
    NotAuthorized { pool_id: u64, staker: Pubkey },

    /// The uploader role was already claimed for this round.
    #[error("uploader role already claimed")]
    UploaderAlreadyClaimed,

    /// The caller is not the designated next uploader.
    #[error("not designated uploader: expected {expected:?}, received {received}")]
    NotDesignatedUploader {
        expected: Option<Pubkey>,
        received: Pubkey,
    },

    /// The upload interval has not elapsed yet.
    #[error("upload interval not surpassed: ready at {ready_at}, current time {now}")]
    UploadIntervalNotElapsed { ready_at: u64, now: u64 },

    /// The submitted from-index breaks record contiguity.
    #[error("invalid from index: expected {expected}, received {received}")]
    FromIndex { expected: u64, received: u64 },

    /// A message argument failed validation.
    #[error("invalid args: {reason}")]
    InvalidArgs { reason: String },

    /// The submitted bundle exceeds the pool's record-count cap.
    #[error("max bundle size surpassed: expected at most {max}, received {received}")]
    MaxBundleSize { max: u64, received: u64 },

    /// The previous proposal has not reached quorum, or was rejected;
    /// submission must be retried once the round resolves.
    #[error("no quorum reached")]
    QuorumNotReached,

    /// The current proposal was dropped; there is nothing to vote on.
    #[error("bundle proposal is dropped")]
    BundleDropped,

    /// The vote references a storage id other than the active proposal's.
    #[error("current storage id {current} does not match provided storage id {provided}")]
    InvalidStorageId { current: String, provided: String },

    /// Valid votes are final.
    #[error("already voted valid on bundle proposal")]
    AlreadyVotedValid,

    /// Invalid votes are final.
    #[error("already voted invalid on bundle proposal")]
    AlreadyVotedInvalid,

    /// An abstain vote can only be changed to valid or invalid.
    #[error("already voted abstain on bundle proposal")]
    AlreadyVotedAbstain,

    /// Reward computation failed. A split mismatch is an invariant
    /// violation: the caller must halt the block instead of continuing.
    #[error("reward error: {0}")]
    Reward(#[from] RewardError),
}
