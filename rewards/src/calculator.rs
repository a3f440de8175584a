use crate::{
    config::{RewardConfig, BPS_DENOMINATOR, MICROS_PER_UNIT},
    error::RewardError,
    state::{BundleReward, UploaderInfo},
};

/// Calculate the storage reward for a bundle of `data_size` bytes.
///
/// ```text
/// storage_reward = trunc(storage_cost_micros_per_byte × data_size / 1e6)
/// ```
///
/// The division truncates, so the protocol never reimburses more than the
/// configured rate. Intermediate math is done in `u128` to avoid overflow.
pub fn storage_reward(config: &RewardConfig, data_size: u64) -> Result<u64, RewardError> {
    let micros = (config.storage_cost_micros_per_byte as u128)
        .checked_mul(data_size as u128)
        .ok_or(RewardError::Overflow)?;
    let units = micros / MICROS_PER_UNIT as u128;
    u64::try_from(units).map_err(|_| RewardError::Overflow)
}

/// Calculate the total payout for a finalized round.
pub fn total_payout(
    config: &RewardConfig,
    data_size: u64,
    operating_cost: u64,
) -> Result<u64, RewardError> {
    operating_cost
        .checked_add(storage_reward(config, data_size)?)
        .ok_or(RewardError::Overflow)
}

/// Split a finalized bundle's payout between treasury, uploader and
/// delegators.
///
/// # Formula
///
/// ```text
/// total    = operating_cost + trunc(storage_cost × data_size)
/// treasury = trunc(total × network_fee_bps / 10000)
/// node     = total - treasury
///
/// if uploader is gone:          treasury = total (funds are never orphaned)
/// if uploader has delegation:   delegation = trunc(node × (10000 - commission_bps) / 10000)
///                               uploader   = node - delegation
/// if uploader has no delegation: uploader  = node
/// ```
///
/// Both divisions truncate; the delegation share carries the truncation, so
/// any remainder lands in the uploader bucket. The result always satisfies
/// `treasury + uploader + delegation == total` — a violation is returned as
/// [`RewardError::SplitMismatch`] and must halt the block.
pub fn split_bundle_reward(
    config: &RewardConfig,
    data_size: u64,
    operating_cost: u64,
    uploader: Option<&UploaderInfo>,
) -> Result<BundleReward, RewardError> {
    config.validate()?;

    let total = total_payout(config, data_size, operating_cost)?;

    // The uploader left the pool mid-round: route the whole payout to the
    // treasury so no funds are orphaned.
    let Some(uploader) = uploader else {
        return checked(BundleReward {
            treasury: total,
            uploader: 0,
            delegation: 0,
            total,
        });
    };

    if uploader.commission_bps > BPS_DENOMINATOR {
        return Err(RewardError::CommissionOutOfRange {
            bps: uploader.commission_bps,
        });
    }

    let treasury = mul_bps(total, config.network_fee_bps);
    let node_reward = total - treasury;

    let (uploader_share, delegation_share) = if uploader.delegation > 0 {
        let delegation_share = mul_bps(node_reward, BPS_DENOMINATOR - uploader.commission_bps);
        (node_reward - delegation_share, delegation_share)
    } else {
        (node_reward, 0)
    };

    checked(BundleReward {
        treasury,
        uploader: uploader_share,
        delegation: delegation_share,
        total,
    })
}

/// `trunc(amount × bps / 10000)` in `u128` intermediates.
///
/// `bps ≤ 10000` is enforced by the callers, so the result fits in `u64`.
fn mul_bps(amount: u64, bps: u64) -> u64 {
    ((amount as u128) * (bps as u128) / BPS_DENOMINATOR as u128) as u64
}

fn checked(reward: BundleReward) -> Result<BundleReward, RewardError> {
    if !reward.is_conserved() {
        return Err(RewardError::SplitMismatch {
            treasury: reward.treasury,
            uploader: reward.uploader,
            delegation: reward.delegation,
            total: reward.total,
        });
    }
    Ok(reward)
}
