//! The per-block upload-timeout sweep.
//!
//! Runs once at the end of every block over all pools and advances stalled
//! rounds: halted pools release their uploader, proposals stuck without a
//! quorum past the upload interval are dropped, and uploaders silent past
//! the full timeout are pointed and rotated out. The sweep never finalizes
//! a bundle — finalization only happens when the successor proposal is
//! submitted.

use {
    crate::{
        engine::{BundleEngine, EngineOutput},
        providers::{PoolHalt, PoolProvider, StakingProvider},
        types::{BlockContext, BundleStatus, VoteDistribution},
    },
    log::*,
};

impl<S: StakingProvider, P: PoolProvider> BundleEngine<S, P> {
    /// Sweep every pool once. Intended to be called from the end-block
    /// hook of the surrounding runtime.
    pub fn handle_upload_timeouts(&mut self, ctx: &BlockContext) -> EngineOutput {
        let mut output = EngineOutput::default();

        for pool_id in self.pools.pool_ids() {
            let proposal = self.store.proposal_or_default(pool_id);

            // A halted pool produces nothing and its stakers take no
            // liveness penalties. Disabling kills a mid-flight proposal;
            // any other halt only releases the uploader role.
            match self.pools.can_run(pool_id) {
                Err(PoolHalt::Disabled) if proposal.is_active() => {
                    debug!("pool {pool_id} disabled, dropping mid-flight proposal");
                    self.drop_proposal(
                        &mut output,
                        ctx,
                        pool_id,
                        &VoteDistribution::disabled(),
                        None,
                    );
                    continue;
                }
                Err(_) => {
                    if proposal.next_uploader.is_some() {
                        let mut released = proposal;
                        released.next_uploader = None;
                        self.store.set_proposal(released);
                    }
                    continue;
                }
                Ok(()) => {}
            }

            // Still within the regular submission window.
            let interval = self.pools.upload_interval(pool_id);
            if ctx.time < proposal.updated_at.saturating_add(interval) {
                continue;
            }

            // A proposal stuck without a quorum is dropped; silent stakers
            // are pointed so chronic non-voters eventually get removed.
            if proposal.is_active() {
                let distribution = self.vote_distribution(pool_id);
                if distribution.status == BundleStatus::NoQuorum {
                    self.handle_non_voters(&mut output, pool_id);
                    let next_uploader = self.choose_next_uploader(pool_id, &[]);
                    self.drop_proposal(&mut output, ctx, pool_id, &distribution, next_uploader);
                    continue;
                }
            }

            // Within the extended grace period.
            let deadline = proposal
                .updated_at
                .saturating_add(interval)
                .saturating_add(self.params.upload_timeout);
            if ctx.time < deadline {
                continue;
            }

            // The designated uploader went silent past the full timeout:
            // penalize it (if it is still around), hand the role to someone
            // else and restart the clock. Existing votes survive.
            let timed_out = proposal.next_uploader;
            let next_uploader = self.choose_next_uploader(pool_id, &[]);

            let mut rotated = self.store.proposal_or_default(pool_id);
            rotated.next_uploader = next_uploader;
            rotated.updated_at = ctx.time;
            self.store.set_proposal(rotated);

            if let Some(staker) = timed_out {
                if self.staking.is_participant(pool_id, &staker) {
                    warn!("uploader {staker} of pool {pool_id} timed out");
                    self.add_point(&mut output, pool_id, &staker);
                }
            }
        }

        output
    }
}
