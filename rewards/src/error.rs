use thiserror::Error;

/// Errors produced by the reward-splitting subsystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RewardError {
    /// The configuration is invalid (e.g. a fraction above 100 %).
    #[error("invalid reward configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The uploader's commission exceeds 100 %.
    #[error("commission out of range: {bps} bps exceeds 10000 bps")]
    CommissionOutOfRange { bps: u64 },

    /// Arithmetic overflow while computing the payout.
    #[error("reward calculation overflow")]
    Overflow,

    /// The computed split does not add up to the total payout. This must
    /// never occur for valid inputs; callers treat it as fatal and halt
    /// the block rather than continue with a corrupted ledger.
    #[error(
        "reward split mismatch: treasury {treasury} + uploader {uploader} \
         + delegation {delegation} != total {total}"
    )]
    SplitMismatch {
        treasury: u64,
        uploader: u64,
        delegation: u64,
        total: u64,
    },
}
