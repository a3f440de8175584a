//! Governance-settable parameters of the bundle engine.

use bundlenet_rewards::{RewardConfig, RewardError};

/// Module parameters. Reward fractions live in the embedded
/// [`RewardConfig`]; timing is in seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleParams {
    /// Grace period, in seconds, an uploader gets past the upload interval
    /// before being treated as silent.
    pub upload_timeout: u64,

    /// Non-participation points at which a staker is slashed and removed
    /// from the pool.
    pub max_points: u64,

    /// Reward-splitting parameters (storage cost, network fee).
    pub reward: RewardConfig,
}

impl Default for BundleParams {
    /// Production defaults: 10-minute upload timeout, removal after 24
    /// missed rounds, 0.025/byte storage cost, 1 % network fee.
    fn default() -> Self {
        Self {
            upload_timeout: 600,
            max_points: 24,
            reward: RewardConfig::default(),
        }
    }
}

impl BundleParams {
    /// Validate parameter values.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.upload_timeout == 0 {
            return Err(ParamsError::InvalidUploadTimeout);
        }
        if self.max_points == 0 {
            return Err(ParamsError::InvalidMaxPoints);
        }
        self.reward.validate()?;
        Ok(())
    }
}

/// Errors in bundle-engine parameters.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParamsError {
    #[error("upload_timeout must be > 0")]
    InvalidUploadTimeout,
    #[error("max_points must be > 0")]
    InvalidMaxPoints,
    #[error("invalid reward parameters: {0}")]
    InvalidReward(#[from] RewardError),
}
