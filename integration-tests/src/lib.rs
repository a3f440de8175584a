//! BundleNet Integration Tests
//!
//! End-to-end suites for the bundle consensus engine, driven through the
//! message handlers and the per-block timeout sweep against in-memory
//! staking/pool collaborators.
//!
//! # Scenarios covered
//!
//! 1. **Bundle lifecycle** — claim, submit, vote, finalize; reward routing
//!    to treasury, uploader and delegators; sequential finalized ids
//! 2. **Invalid bundles** — quorum rejection, wrong-voter slashing,
//!    mandatory resubmission
//! 3. **Dropped bundles** — no-quorum timeouts, disabled pools, recovery
//!    rounds
//! 4. **Timeouts & points** — non-participation accrual, liveness resets,
//!    removal at the point cap
//! 5. **Stakers leaving** — departed uploaders and voters mid-round
//! 6. **Zero delegation** — commission split degeneration

pub mod harness;

#[cfg(test)]
mod bundle_lifecycle_tests;

#[cfg(test)]
mod invalid_bundles_tests;

#[cfg(test)]
mod dropped_bundles_tests;
