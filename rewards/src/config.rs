use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// Scale of the fixed-point storage-cost rate: one unit = 1e-6 base units.
pub const MICROS_PER_UNIT: u64 = 1_000_000;

/// Denominator for basis-point fractions. 10_000 bps = 100 %.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Configuration for bundle reward splitting.
///
/// Fractions are fixed-scale integers so that every validating node computes
/// bit-identical payouts:
/// - The storage-cost rate is denominated in **micro base units per byte**
///   (`25_000` means 0.025 base units per byte).
/// - The network fee is denominated in **basis points** (`100` means 1 %).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct RewardConfig {
    /// Storage reward per byte of bundle data, in micro base units.
    /// The uploader is reimbursed `trunc(rate × data_size)` base units on
    /// top of the pool's operating cost.
    pub storage_cost_micros_per_byte: u64,

    /// Fraction of every total payout routed to the network treasury,
    /// in basis points. Must be ≤ 10_000.
    pub network_fee_bps: u64,
}

impl Default for RewardConfig {
    /// Production defaults: 0.025 base units per byte, 1 % network fee.
    fn default() -> Self {
        Self {
            storage_cost_micros_per_byte: 25_000,
            network_fee_bps: 100,
        }
    }
}

impl RewardConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), crate::error::RewardError> {
        if self.network_fee_bps > BPS_DENOMINATOR {
            return Err(crate::error::RewardError::InvalidConfig {
                reason: format!(
                    "network_fee_bps ({}) must be ≤ {BPS_DENOMINATOR}",
                    self.network_fee_bps
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = RewardConfig::default();
        assert_eq!(cfg.storage_cost_micros_per_byte, 25_000);
        assert_eq!(cfg.network_fee_bps, 100);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_network_fee_at_limit() {
        let cfg = RewardConfig {
            network_fee_bps: BPS_DENOMINATOR,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_network_fee_above_limit() {
        let cfg = RewardConfig {
            network_fee_bps: BPS_DENOMINATOR + 1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_borsh_roundtrip() {
        let cfg = RewardConfig::default();
        let bytes = borsh::to_vec(&cfg).unwrap();
        let decoded: RewardConfig = borsh::from_slice(&bytes).unwrap();
        assert_eq!(cfg, decoded);
    }
}
