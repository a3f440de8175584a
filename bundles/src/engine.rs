//! The bundle-proposal state machine.
//!
//! One proposal slot per pool moves through claim → submit → vote →
//! finalize/drop, driven by participant messages and the per-block timeout
//! sweep. The engine is deterministic: given the same message sequence and
//! collaborator state it produces identical store mutations and outputs on
//! every validating node. All I/O lives behind the provider traits; this
//! module is pure state-machine logic.
//!
//! Submitting a proposal settles the *previous* round first: the previous
//! proposal is tallied and either finalized (rewards paid, record appended)
//! or dropped, and only then is the new proposal registered. Precondition
//! failures mutate nothing.

use {
    crate::{
        config::BundleParams,
        error::BundleError,
        events::BundleEvent,
        providers::{PoolProvider, SlashKind, StakingProvider},
        round_robin::RoundRobinSet,
        store::BundleStore,
        tally,
        types::{
            BlockContext, BundleProposal, BundleStatus, ClaimUploaderRole, FinalizedAt,
            FinalizedBundle, SkipUploaderRole, StakeSecurity, SubmitBundleProposal,
            VoteBundleProposal, VoteDistribution, VoteKind,
        },
    },
    bundlenet_rewards::{calculator, BundleReward, UploaderInfo},
    log::*,
    solana_pubkey::Pubkey,
};

/// Result of processing one message or sweep.
#[derive(Debug, Default, PartialEq)]
pub struct EngineOutput {
    /// Events to publish.
    pub events: Vec<BundleEvent>,
    /// Set when this step finalized a bundle.
    pub finalized: Option<FinalizedBundle>,
}

impl EngineOutput {
    fn empty() -> Self {
        Self::default()
    }
}

/// The bundle consensus engine of all pools.
///
/// Owns the module store and drives the staking and pool collaborators.
pub struct BundleEngine<S, P> {
    pub(crate) params: BundleParams,
    pub(crate) staking: S,
    pub(crate) pools: P,
    pub(crate) store: BundleStore,
}

impl<S: StakingProvider, P: PoolProvider> BundleEngine<S, P> {
    pub fn new(params: BundleParams, staking: S, pools: P) -> Self {
        Self {
            params,
            staking,
            pools,
            store: BundleStore::new(),
        }
    }

    /// Restore an engine over previously persisted state.
    pub fn with_store(params: BundleParams, staking: S, pools: P, store: BundleStore) -> Self {
        Self {
            params,
            staking,
            pools,
            store,
        }
    }

    // -- Accessors --

    pub fn params(&self) -> &BundleParams {
        &self.params
    }

    pub fn store(&self) -> &BundleStore {
        &self.store
    }

    /// Mutable store access for genesis import and test setup.
    pub fn store_mut(&mut self) -> &mut BundleStore {
        &mut self.store
    }

    pub fn staking(&self) -> &S {
        &self.staking
    }

    pub fn staking_mut(&mut self) -> &mut S {
        &mut self.staking
    }

    pub fn pools(&self) -> &P {
        &self.pools
    }

    pub fn pools_mut(&mut self) -> &mut P {
        &mut self.pools
    }

    // -- Queries --

    /// Stake-weighted vote totals of the pool's current proposal.
    pub fn vote_distribution(&self, pool_id: u64) -> VoteDistribution {
        tally::vote_distribution(&self.staking, &self.store.proposal_or_default(pool_id))
    }

    /// Whether the pool fulfils all requirements to produce bundles.
    pub fn assert_pool_can_run(&self, pool_id: u64) -> Result<(), BundleError> {
        self.pools.can_run(pool_id)?;
        Ok(())
    }

    /// Whether `proposer` may submit (or skip) the next proposal at
    /// `from_index` right now.
    pub fn can_propose(
        &self,
        ctx: &BlockContext,
        pool_id: u64,
        staker: &Pubkey,
        proposer: &Pubkey,
        from_index: u64,
    ) -> Result<(), BundleError> {
        self.assert_pool_can_run(pool_id)?;
        self.assert_authorized(pool_id, staker, proposer)?;

        let proposal = self.store.proposal_or_default(pool_id);

        if proposal.next_uploader != Some(*staker) {
            return Err(BundleError::NotDesignatedUploader {
                expected: proposal.next_uploader,
                received: *staker,
            });
        }

        let ready_at = proposal
            .updated_at
            .saturating_add(self.pools.upload_interval(pool_id));
        if ctx.time < ready_at {
            return Err(BundleError::UploadIntervalNotElapsed {
                ready_at,
                now: ctx.time,
            });
        }

        let expected = self
            .pools
            .current_index(pool_id)
            .saturating_add(proposal.bundle_size);
        if expected != from_index {
            return Err(BundleError::FromIndex {
                expected,
                received: from_index,
            });
        }

        Ok(())
    }

    /// Whether `voter` may vote on the proposal identified by `storage_id`.
    pub fn can_vote(
        &self,
        pool_id: u64,
        staker: &Pubkey,
        voter: &Pubkey,
        storage_id: &str,
    ) -> Result<(), BundleError> {
        self.assert_pool_can_run(pool_id)?;
        self.assert_authorized(pool_id, staker, voter)?;

        let proposal = self.store.proposal_or_default(pool_id);

        if !proposal.is_active() {
            return Err(BundleError::BundleDropped);
        }

        if proposal.storage_id != storage_id {
            return Err(BundleError::InvalidStorageId {
                current: proposal.storage_id,
                provided: storage_id.to_string(),
            });
        }

        if proposal.has_voted_valid(staker) {
            return Err(BundleError::AlreadyVotedValid);
        }
        if proposal.has_voted_invalid(staker) {
            return Err(BundleError::AlreadyVotedInvalid);
        }

        Ok(())
    }

    // -- Message handlers --

    /// Claim the vacant uploader role, first come first served.
    pub fn claim_uploader_role(
        &mut self,
        ctx: &BlockContext,
        msg: &ClaimUploaderRole,
    ) -> Result<EngineOutput, BundleError> {
        self.assert_pool_can_run(msg.pool_id)?;
        self.assert_authorized(msg.pool_id, &msg.staker, &msg.creator)?;

        let mut proposal = self.store.proposal_or_default(msg.pool_id);

        if proposal.next_uploader.is_some() {
            return Err(BundleError::UploaderAlreadyClaimed);
        }

        proposal.next_uploader = Some(msg.staker);
        proposal.updated_at = ctx.time;
        self.store.set_proposal(proposal);

        let mut output = EngineOutput::empty();
        output.events.push(BundleEvent::ClaimedUploaderRole {
            pool_id: msg.pool_id,
            new_uploader: msg.staker,
        });
        Ok(output)
    }

    /// Submit the next bundle proposal, settling the previous round first.
    pub fn submit_bundle_proposal(
        &mut self,
        ctx: &BlockContext,
        msg: &SubmitBundleProposal,
    ) -> Result<EngineOutput, BundleError> {
        self.can_propose(ctx, msg.pool_id, &msg.staker, &msg.creator, msg.from_index)?;

        let proposal = self.store.proposal_or_default(msg.pool_id);
        self.validate_submit_args(msg)?;

        let mut output = EngineOutput::empty();

        // The previous proposal was dropped: nothing to settle, register
        // the new one directly.
        if !proposal.is_active() {
            self.reset_points(&mut output, msg.pool_id, &msg.staker);
            let next_uploader = self.choose_next_uploader(msg.pool_id, &[]);
            self.register_proposal(&mut output, ctx, msg, next_uploader);
            return Ok(output);
        }

        // The previous round must resolve before anything may change. A
        // pending quorum rejects the submission with no mutation at all.
        if self.vote_distribution(msg.pool_id).status == BundleStatus::NoQuorum {
            return Err(BundleError::QuorumNotReached);
        }

        self.reset_points(&mut output, msg.pool_id, &msg.staker);
        self.handle_non_voters(&mut output, msg.pool_id);

        // Re-tally after non-voter handling: participants removed for
        // exceeding max points no longer weigh in.
        let distribution = self.vote_distribution(msg.pool_id);

        match distribution.status {
            BundleStatus::Valid => {
                self.settle_valid_round(&mut output, ctx, msg, &proposal, &distribution)?;
                Ok(output)
            }
            BundleStatus::Invalid => {
                // The previous data was rejected; the new bundle builds on
                // records that never finalized and is of no use. Slash the
                // wrong voters, drop the round and make the caller
                // resubmit. The uploader role stays where it was — the
                // rejection was not the next uploader's fault.
                info!(
                    "bundle proposal {} of pool {} rejected by quorum",
                    proposal.storage_id, msg.pool_id
                );
                for voter in &proposal.voters_valid {
                    let kind = if Some(*voter) == proposal.uploader {
                        SlashKind::Upload
                    } else {
                        SlashKind::Vote
                    };
                    self.staking.slash_and_remove(msg.pool_id, voter, kind);
                }
                self.drop_proposal(&mut output, ctx, msg.pool_id, &distribution, proposal.next_uploader);
                Err(BundleError::QuorumNotReached)
            }
            BundleStatus::NoQuorum | BundleStatus::Disabled => Err(BundleError::QuorumNotReached),
        }
    }

    /// Vote on the pool's active proposal.
    pub fn vote_bundle_proposal(
        &mut self,
        _ctx: &BlockContext,
        msg: &VoteBundleProposal,
    ) -> Result<EngineOutput, BundleError> {
        self.can_vote(msg.pool_id, &msg.staker, &msg.creator, &msg.storage_id)?;

        let mut proposal = self.store.proposal_or_default(msg.pool_id);

        if proposal.has_voted_abstain(&msg.staker) {
            if msg.vote == VoteKind::Abstain {
                return Err(BundleError::AlreadyVotedAbstain);
            }
            proposal.voters_abstain.retain(|voter| voter != &msg.staker);
        }

        match msg.vote {
            VoteKind::Valid => proposal.voters_valid.push(msg.staker),
            VoteKind::Invalid => proposal.voters_invalid.push(msg.staker),
            VoteKind::Abstain => proposal.voters_abstain.push(msg.staker),
        }

        self.store.set_proposal(proposal);

        let mut output = EngineOutput::empty();
        self.reset_points(&mut output, msg.pool_id, &msg.staker);
        output.events.push(BundleEvent::BundleVote {
            pool_id: msg.pool_id,
            staker: msg.staker,
            storage_id: msg.storage_id.clone(),
            vote: msg.vote,
        });
        Ok(output)
    }

    /// Pass the uploader turn without submitting data. Proves liveness, so
    /// the caller's points reset; the proposal's votes and payload are
    /// untouched.
    pub fn skip_uploader_role(
        &mut self,
        ctx: &BlockContext,
        msg: &SkipUploaderRole,
    ) -> Result<EngineOutput, BundleError> {
        self.can_propose(ctx, msg.pool_id, &msg.staker, &msg.creator, msg.from_index)?;

        let mut output = EngineOutput::empty();
        self.reset_points(&mut output, msg.pool_id, &msg.staker);

        let next_uploader = self.choose_next_uploader(msg.pool_id, &[msg.staker]);

        let mut proposal = self.store.proposal_or_default(msg.pool_id);
        proposal.next_uploader = next_uploader;
        proposal.updated_at = ctx.time;
        self.store.set_proposal(proposal);

        output.events.push(BundleEvent::SkippedUploaderRole {
            pool_id: msg.pool_id,
            previous_uploader: msg.staker,
            new_uploader: next_uploader,
        });
        Ok(output)
    }

    // -- Internal logic --

    fn assert_authorized(
        &self,
        pool_id: u64,
        staker: &Pubkey,
        signer: &Pubkey,
    ) -> Result<(), BundleError> {
        if !self.staking.is_authorized(pool_id, staker, signer) {
            return Err(BundleError::NotAuthorized {
                pool_id,
                staker: *staker,
            });
        }
        Ok(())
    }

    fn validate_submit_args(&self, msg: &SubmitBundleProposal) -> Result<(), BundleError> {
        if msg.storage_id.is_empty() {
            return Err(BundleError::InvalidArgs {
                reason: "storage_id must not be empty".to_string(),
            });
        }

        if msg.bundle_size == 0 {
            return Err(BundleError::InvalidArgs {
                reason: "bundle_size must be > 0".to_string(),
            });
        }

        let max = self.pools.max_bundle_size(msg.pool_id);
        if msg.bundle_size > max {
            return Err(BundleError::MaxBundleSize {
                max,
                received: msg.bundle_size,
            });
        }

        if msg.from_key.is_empty() || msg.to_key.is_empty() {
            return Err(BundleError::InvalidArgs {
                reason: "from_key and to_key must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Settle a quorum-approved previous round: charge the pool, pay out,
    /// slash wrong voters, persist the finalized record and register the
    /// submitter's new proposal.
    fn settle_valid_round(
        &mut self,
        output: &mut EngineOutput,
        ctx: &BlockContext,
        msg: &SubmitBundleProposal,
        proposal: &BundleProposal,
        distribution: &VoteDistribution,
    ) -> Result<(), BundleError> {
        let pool_id = msg.pool_id;

        // The uploader may have left mid-round; its share then falls to the
        // treasury so nothing is orphaned.
        let uploader_info = proposal
            .uploader
            .filter(|uploader| self.staking.is_participant(pool_id, uploader))
            .map(|uploader| UploaderInfo {
                commission_bps: self.staking.commission_bps(&uploader),
                delegation: self.staking.delegation_of(&uploader),
            });

        let reward = calculator::split_bundle_reward(
            &self.params.reward,
            proposal.data_size,
            self.pools.operating_cost(pool_id),
            uploader_info.as_ref(),
        )?;

        if !self.pools.charge(pool_id, reward.total) {
            // The pool cannot cover the round. Keep it open and refresh the
            // clock so protocol nodes don't run into the upload timeout
            // while governance refunds the pool.
            warn!("pool {pool_id} out of funds, round stays open");
            let mut refreshed = proposal.clone();
            refreshed.updated_at = ctx.time;
            self.store.set_proposal(refreshed);
            output.events.push(BundleEvent::PoolOutOfFunds { pool_id });
            return Ok(());
        }

        self.pools.fund_treasury(reward.treasury);
        if let Some(uploader) = proposal.uploader {
            if reward.uploader > 0 {
                self.staking.pay_commission(&uploader, reward.uploader);
            }
            if reward.delegation > 0 {
                self.staking.accrue_delegation_rewards(&uploader, reward.delegation);
            }
        }

        for voter in &proposal.voters_invalid {
            self.staking
                .slash_and_remove(pool_id, voter, SlashKind::Vote);
        }

        // Reward correct voters with the better uploader odds: select the
        // successor from the still-active valid voters, falling back to the
        // whole pool if none remain.
        let active_voters: Vec<Pubkey> = proposal
            .voters_valid
            .iter()
            .filter(|voter| self.staking.is_participant(pool_id, voter))
            .copied()
            .collect();
        let next_uploader = if active_voters.is_empty() {
            self.choose_next_uploader(pool_id, &[])
        } else {
            self.choose_next_uploader_from(pool_id, &active_voters)
        };

        let finalized = self.finalize_proposal(
            output,
            ctx,
            pool_id,
            proposal,
            distribution,
            &reward,
            next_uploader,
        );
        output.finalized = Some(finalized);

        self.register_proposal(output, ctx, msg, next_uploader);
        Ok(())
    }

    /// Persist the finalized record and advance the pool.
    #[allow(clippy::too_many_arguments)]
    fn finalize_proposal(
        &mut self,
        output: &mut EngineOutput,
        ctx: &BlockContext,
        pool_id: u64,
        proposal: &BundleProposal,
        distribution: &VoteDistribution,
        reward: &BundleReward,
        next_uploader: Option<Pubkey>,
    ) -> FinalizedBundle {
        let id = self.store.finalized_count(pool_id);
        let from_index = self.pools.current_index(pool_id);
        let to_index = from_index.saturating_add(proposal.bundle_size);

        let finalized = FinalizedBundle {
            pool_id,
            id,
            storage_id: proposal.storage_id.clone(),
            uploader: proposal.uploader,
            from_index,
            to_index,
            from_key: proposal.from_key.clone(),
            to_key: proposal.to_key.clone(),
            bundle_summary: proposal.bundle_summary.clone(),
            data_hash: proposal.data_hash.clone(),
            finalized_at: FinalizedAt {
                height: ctx.height,
                timestamp: ctx.time,
            },
            stake_security: StakeSecurity {
                valid_vote_power: distribution.valid,
                total_vote_power: distribution.total,
            },
        };
        self.store.append_finalized(finalized.clone());

        info!(
            "finalized bundle {id} of pool {pool_id} covering [{from_index}, {to_index})"
        );
        output.events.push(BundleEvent::BundleFinalized {
            pool_id,
            id,
            distribution: *distribution,
            reward: *reward,
            finalized_at: ctx.time,
            uploader: proposal.uploader,
            next_uploader,
        });

        self.pools
            .advance_index(pool_id, to_index, &proposal.to_key, &proposal.bundle_summary);

        finalized
    }

    /// Reset the proposal slot to the dropped shape.
    pub(crate) fn drop_proposal(
        &mut self,
        output: &mut EngineOutput,
        ctx: &BlockContext,
        pool_id: u64,
        distribution: &VoteDistribution,
        next_uploader: Option<Pubkey>,
    ) {
        let proposal = self.store.proposal_or_default(pool_id);

        info!(
            "dropped bundle proposal {} of pool {pool_id} ({:?})",
            proposal.storage_id, distribution.status
        );
        output.events.push(BundleEvent::BundleFinalized {
            pool_id,
            id: self.store.finalized_count(pool_id),
            distribution: *distribution,
            reward: BundleReward::default(),
            finalized_at: ctx.time,
            uploader: proposal.uploader,
            next_uploader,
        });

        self.store
            .set_proposal(BundleProposal::dropped(pool_id, next_uploader, ctx.time));
    }

    /// Register the submitter's bundle as the new proposal. Submitting
    /// counts as voting valid on your own data.
    fn register_proposal(
        &mut self,
        output: &mut EngineOutput,
        ctx: &BlockContext,
        msg: &SubmitBundleProposal,
        next_uploader: Option<Pubkey>,
    ) {
        let proposal = BundleProposal {
            pool_id: msg.pool_id,
            storage_id: msg.storage_id.clone(),
            uploader: Some(msg.staker),
            next_uploader,
            data_size: msg.data_size,
            bundle_size: msg.bundle_size,
            from_key: msg.from_key.clone(),
            to_key: msg.to_key.clone(),
            bundle_summary: msg.bundle_summary.clone(),
            data_hash: msg.data_hash.clone(),
            updated_at: ctx.time,
            voters_valid: vec![msg.staker],
            voters_invalid: Vec::new(),
            voters_abstain: Vec::new(),
        };
        self.store.set_proposal(proposal);

        output.events.push(BundleEvent::BundleProposed {
            pool_id: msg.pool_id,
            id: self.store.finalized_count(msg.pool_id),
            storage_id: msg.storage_id.clone(),
            uploader: msg.staker,
            data_size: msg.data_size,
            from_index: msg.from_index,
            bundle_size: msg.bundle_size,
            from_key: msg.from_key.clone(),
            to_key: msg.to_key.clone(),
            bundle_summary: msg.bundle_summary.clone(),
            data_hash: msg.data_hash.clone(),
            proposed_at: ctx.time,
        });
        output.events.push(BundleEvent::BundleVote {
            pool_id: msg.pool_id,
            staker: msg.staker,
            storage_id: msg.storage_id.clone(),
            vote: VoteKind::Valid,
        });
    }

    /// Give every active staker who did not vote at all one
    /// non-participation point. The protocol requires everybody to stay
    /// responsive.
    pub(crate) fn handle_non_voters(&mut self, output: &mut EngineOutput, pool_id: u64) {
        let proposal = self.store.proposal_or_default(pool_id);
        for staker in self.staking.participants_of(pool_id) {
            if !proposal.has_voted(&staker) {
                self.add_point(output, pool_id, &staker);
            }
        }
    }

    /// Add one point; at `max_points` the staker is slashed and removed.
    pub(crate) fn add_point(&mut self, output: &mut EngineOutput, pool_id: u64, staker: &Pubkey) {
        let points = self.staking.add_point(pool_id, staker);
        output.events.push(BundleEvent::PointIncreased {
            pool_id,
            staker: *staker,
            current_points: points,
        });

        if points >= self.params.max_points {
            warn!("staker {staker} reached max points in pool {pool_id}, removing");
            self.staking
                .slash_and_remove(pool_id, staker, SlashKind::Timeout);
        }
    }

    /// Reset a staker's points after proven liveness.
    pub(crate) fn reset_points(&mut self, output: &mut EngineOutput, pool_id: u64, staker: &Pubkey) {
        let previous = self.staking.reset_points(pool_id, staker);
        if previous > 0 {
            output.events.push(BundleEvent::PointsReset {
                pool_id,
                staker: *staker,
            });
        }
    }

    /// Run one weighted round-robin selection over all stakers except
    /// `excluded`, persisting the updated ledger.
    pub(crate) fn choose_next_uploader(
        &mut self,
        pool_id: u64,
        excluded: &[Pubkey],
    ) -> Option<Pubkey> {
        let mut set = self.load_round_robin(pool_id);
        let winner = set.next_uploader(excluded);
        self.store.set_round_robin_ledger(pool_id, set.to_ledger());
        winner
    }

    /// Run one selection restricted to `included` stakers.
    pub(crate) fn choose_next_uploader_from(
        &mut self,
        pool_id: u64,
        included: &[Pubkey],
    ) -> Option<Pubkey> {
        let mut set = self.load_round_robin(pool_id);
        let excluded: Vec<Pubkey> = set
            .participants()
            .iter()
            .map(|participant| participant.address)
            .filter(|address| !included.contains(address))
            .collect();
        let winner = set.next_uploader(&excluded);
        self.store.set_round_robin_ledger(pool_id, set.to_ledger());
        winner
    }

    fn load_round_robin(&self, pool_id: u64) -> RoundRobinSet {
        let live: Vec<(Pubkey, u64)> = self
            .staking
            .participants_of(pool_id)
            .into_iter()
            .map(|staker| (staker, self.staking.stake_of(&staker)))
            .collect();
        RoundRobinSet::load(&live, self.store.round_robin_ledger(pool_id))
    }
}
