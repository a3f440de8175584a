//! # BundleNet Bundle Consensus
//!
//! The on-chain engine by which a pool of staked participants agrees on
//! batches ("bundles") of off-chain-stored data:
//!
//! 1. **Claim / rotate** — a stake-weighted round-robin scheduler hands the
//!    uploader role to one participant per round.
//! 2. **Submit** — the designated uploader proposes a bundle by reference
//!    (storage id, record range, digests).
//! 3. **Vote** — every other participant validates the data and votes
//!    valid, invalid or abstain, weighted by current stake.
//! 4. **Settle** — submitting the next bundle settles the previous round:
//!    a strict stake majority finalizes it (rewards are split between
//!    treasury, uploader and delegators), a half-or-more invalid vote drops
//!    it and slashes the wrong voters.
//!
//! A per-block sweep ([`BundleEngine::handle_upload_timeouts`]) keeps
//! stalled pools moving: unresponsive uploaders collect non-participation
//! points and are rotated out, and chronically silent stakers are removed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 BundleEngine                    │
//! │  ┌──────────┐  ┌───────────┐  ┌─────────────┐  │
//! │  │  Params  │  │  Staking  │  │    Pools    │  │
//! │  │          │  │ (provider)│  │  (provider) │  │
//! │  └──────────┘  └───────────┘  └─────────────┘  │
//! │  ┌─────────────────────────────────────────┐    │
//! │  │              BundleStore                │    │
//! │  │  proposals, finalized bundles, ledgers  │    │
//! │  └─────────────────────────────────────────┘    │
//! │  ┌──────────────┐  ┌──────────────────────┐    │
//! │  │  VoteTally   │  │  RoundRobin selector │    │
//! │  └──────────────┘  └──────────────────────┘    │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The engine is single-writer per pool and fully deterministic; time and
//! height come from [`types::BlockContext`], never from the wall clock.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod providers;
pub mod round_robin;
pub mod store;
pub mod tally;
pub mod timeout;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::BundleParams;
pub use engine::{BundleEngine, EngineOutput};
pub use error::BundleError;
pub use events::BundleEvent;
pub use providers::{PoolHalt, PoolProvider, SlashKind, StakingProvider};
pub use round_robin::{RoundRobinEntry, RoundRobinSet};
pub use store::BundleStore;
pub use types::{
    BlockContext, BundleProposal, BundleStatus, ClaimUploaderRole, FinalizedBundle,
    SkipUploaderRole, SubmitBundleProposal, VoteBundleProposal, VoteDistribution, VoteKind,
};
