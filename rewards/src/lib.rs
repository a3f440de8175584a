//! # BundleNet Rewards
//!
//! Reward splitting for finalized data bundles.
//!
//! Every finalized bundle earns a payout made of the pool's **operating
//! cost** plus a **storage reward** proportional to the bundle's byte size.
//! The payout is partitioned between the network **treasury**, the
//! **uploader** (commission) and the uploader's **delegators**:
//!
//! ```text
//! total    = operating_cost + trunc(storage_cost × data_size)
//! treasury = trunc(total × network_fee)
//! node     = total - treasury
//!            ├── delegation = trunc(node × (1 - commission))
//!            └── uploader   = node - delegation
//! ```
//!
//! Every division truncates toward zero and every remainder is assigned to
//! the uploader bucket, so `treasury + uploader + delegation == total`
//! holds exactly for every input. All arithmetic is integer-only; fractions
//! are fixed-scale (basis points and micro-units).
//!
//! ## Quick start
//!
//! ```rust
//! use bundlenet_rewards::{calculator, RewardConfig, UploaderInfo};
//!
//! let config = RewardConfig::default();
//! let uploader = UploaderInfo {
//!     commission_bps: 1_000, // 10 %
//!     delegation: 500,
//! };
//!
//! let reward = calculator::split_bundle_reward(&config, 4_000, 10_000, Some(&uploader)).unwrap();
//! assert_eq!(
//!     reward.treasury + reward.uploader + reward.delegation,
//!     reward.total,
//! );
//! ```

pub mod calculator;
pub mod config;
pub mod error;
pub mod state;


// Re-exports for convenience.
pub use config::RewardConfig;
pub use error::RewardError;
pub use state::{BundleReward, UploaderInfo};
