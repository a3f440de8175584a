//! Stake-weighted vote tallying and quorum classification.

use {
    crate::{
        providers::StakingProvider,
        types::{BundleProposal, BundleStatus, VoteDistribution},
    },
    solana_pubkey::Pubkey,
};

/// Compute the stake-weighted vote distribution of a proposal.
///
/// Voting power is the voter's *current* total stake; a recorded vote from a
/// participant who has since left the pool contributes zero. The total
/// counts every active participant of the pool, voter or not, which is what
/// lets silent stake hold a proposal at [`BundleStatus::NoQuorum`].
///
/// Classification, in order:
/// 1. `total == 0` → no quorum — nothing can ever be decided.
/// 2. `valid × 2 > total` (strict majority) → valid.
/// 3. `invalid × 2 ≥ total` (majority or tie) → invalid.
/// 4. Otherwise → no quorum.
///
/// The asymmetry is deliberate: a 50/50 split rejects, because unverifiable
/// data must not finalize.
pub fn vote_distribution<S: StakingProvider>(
    staking: &S,
    proposal: &BundleProposal,
) -> VoteDistribution {
    let pool_id = proposal.pool_id;

    let voting_power = |voter: &Pubkey| -> u64 {
        if staking.is_participant(pool_id, voter) {
            staking.stake_of(voter)
        } else {
            0
        }
    };

    let mut distribution = VoteDistribution::default();

    for voter in &proposal.voters_valid {
        distribution.valid += voting_power(voter);
    }
    for voter in &proposal.voters_invalid {
        distribution.invalid += voting_power(voter);
    }
    for voter in &proposal.voters_abstain {
        distribution.abstain += voting_power(voter);
    }

    for participant in staking.participants_of(pool_id) {
        distribution.total += staking.stake_of(&participant);
    }

    distribution.status = if distribution.total == 0 {
        BundleStatus::NoQuorum
    } else if distribution.valid * 2 > distribution.total {
        BundleStatus::Valid
    } else if distribution.invalid * 2 >= distribution.total {
        BundleStatus::Invalid
    } else {
        BundleStatus::NoQuorum
    };

    distribution
}
