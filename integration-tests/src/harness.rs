//! BundleNet Test Harness
//!
//! Provides a lightweight, deterministic environment for integration-testing
//! the bundle consensus engine: in-memory staking and pool collaborators, a
//! simulated block clock and short-hand drivers for the four messages and
//! the end-block sweep.
//!
//! The harness does NOT spin up a node; the suites exercise the engine's
//! crate API directly.

use {
    bundlenet_bundles::{
        BlockContext, BundleEngine, BundleError, BundleParams, ClaimUploaderRole, EngineOutput,
        PoolHalt, PoolProvider, SkipUploaderRole, SlashKind, StakingProvider,
        SubmitBundleProposal, VoteBundleProposal, VoteKind,
    },
    solana_pubkey::Pubkey,
    std::collections::{BTreeMap, BTreeSet},
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// One full stake unit in base denomination.
pub const UNIT: u64 = 1_000_000_000;

/// Default stake for a test participant (100 units).
pub const DEFAULT_STAKE: u64 = 100 * UNIT;

/// Upload interval of the default test pool, in seconds.
pub const UPLOAD_INTERVAL: u64 = 60;

/// The pool id every harness starts with.
pub const POOL_ID: u64 = 0;

// ─── Staking collaborator ────────────────────────────────────────────────────

/// In-memory staking/delegation module.
#[derive(Debug, Default)]
pub struct TestStaking {
    pub stakes: BTreeMap<Pubkey, u64>,
    pub delegations: BTreeMap<Pubkey, u64>,
    pub commissions: BTreeMap<Pubkey, u64>,
    pub members: BTreeMap<u64, BTreeSet<Pubkey>>,
    pub points: BTreeMap<(u64, Pubkey), u64>,
    /// Commission rewards credited per staker.
    pub commission_paid: BTreeMap<Pubkey, u64>,
    /// Delegation rewards accrued per staker.
    pub delegation_rewards: BTreeMap<Pubkey, u64>,
    /// Every slash executed, in order.
    pub slashes: Vec<(u64, Pubkey, SlashKind)>,
}

impl TestStaking {
    pub fn points_of(&self, pool_id: u64, staker: &Pubkey) -> u64 {
        self.points.get(&(pool_id, *staker)).copied().unwrap_or(0)
    }

    pub fn commission_paid_to(&self, staker: &Pubkey) -> u64 {
        self.commission_paid.get(staker).copied().unwrap_or(0)
    }

    pub fn delegation_rewards_of(&self, staker: &Pubkey) -> u64 {
        self.delegation_rewards.get(staker).copied().unwrap_or(0)
    }

    pub fn was_slashed(&self, pool_id: u64, staker: &Pubkey, kind: SlashKind) -> bool {
        self.slashes
            .iter()
            .any(|(pool, slashed, slash_kind)| {
                *pool == pool_id && slashed == staker && *slash_kind == kind
            })
    }

    fn remove_member(&mut self, pool_id: u64, staker: &Pubkey) {
        if let Some(members) = self.members.get_mut(&pool_id) {
            members.remove(staker);
        }
        self.points.remove(&(pool_id, *staker));
    }
}

impl StakingProvider for TestStaking {
    fn stake_of(&self, participant: &Pubkey) -> u64 {
        self.stakes.get(participant).copied().unwrap_or(0)
    }

    fn participants_of(&self, pool_id: u64) -> Vec<Pubkey> {
        self.members
            .get(&pool_id)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    fn is_participant(&self, pool_id: u64, staker: &Pubkey) -> bool {
        self.members
            .get(&pool_id)
            .is_some_and(|members| members.contains(staker))
    }

    fn is_authorized(&self, pool_id: u64, staker: &Pubkey, signer: &Pubkey) -> bool {
        self.is_participant(pool_id, staker) && staker == signer
    }

    fn commission_bps(&self, staker: &Pubkey) -> u64 {
        self.commissions.get(staker).copied().unwrap_or(0)
    }

    fn delegation_of(&self, staker: &Pubkey) -> u64 {
        self.delegations.get(staker).copied().unwrap_or(0)
    }

    fn pay_commission(&mut self, staker: &Pubkey, amount: u64) {
        *self.commission_paid.entry(*staker).or_default() += amount;
    }

    fn accrue_delegation_rewards(&mut self, staker: &Pubkey, amount: u64) {
        *self.delegation_rewards.entry(*staker).or_default() += amount;
    }

    fn add_point(&mut self, pool_id: u64, staker: &Pubkey) -> u64 {
        let points = self.points.entry((pool_id, *staker)).or_default();
        *points += 1;
        *points
    }

    fn reset_points(&mut self, pool_id: u64, staker: &Pubkey) -> u64 {
        self.points.remove(&(pool_id, *staker)).unwrap_or(0)
    }

    fn slash_and_remove(&mut self, pool_id: u64, staker: &Pubkey, kind: SlashKind) {
        self.slashes.push((pool_id, *staker, kind));
        self.remove_member(pool_id, staker);
    }
}

// ─── Pool collaborator ───────────────────────────────────────────────────────

/// One funded data pool.
#[derive(Debug, Clone)]
pub struct TestPool {
    pub halt: Option<PoolHalt>,
    pub operating_cost: u64,
    pub current_index: u64,
    pub current_key: String,
    pub current_summary: String,
    pub upload_interval: u64,
    pub max_bundle_size: u64,
    pub funds: u64,
}

impl Default for TestPool {
    fn default() -> Self {
        Self {
            halt: None,
            operating_cost: 10_000,
            current_index: 0,
            current_key: String::new(),
            current_summary: String::new(),
            upload_interval: UPLOAD_INTERVAL,
            max_bundle_size: 100,
            funds: 1_000_000 * UNIT,
        }
    }
}

/// In-memory pool/funding module with a treasury account.
#[derive(Debug, Default)]
pub struct TestPools {
    pub pools: BTreeMap<u64, TestPool>,
    pub treasury: u64,
}

impl PoolProvider for TestPools {
    fn pool_ids(&self) -> Vec<u64> {
        self.pools.keys().copied().collect()
    }

    fn can_run(&self, pool_id: u64) -> Result<(), PoolHalt> {
        match self.pools.get(&pool_id) {
            Some(pool) => match pool.halt {
                Some(halt) => Err(halt),
                None => Ok(()),
            },
            None => Err(PoolHalt::Disabled),
        }
    }

    fn operating_cost(&self, pool_id: u64) -> u64 {
        self.pools
            .get(&pool_id)
            .map(|pool| pool.operating_cost)
            .unwrap_or(0)
    }

    fn current_index(&self, pool_id: u64) -> u64 {
        self.pools
            .get(&pool_id)
            .map(|pool| pool.current_index)
            .unwrap_or(0)
    }

    fn upload_interval(&self, pool_id: u64) -> u64 {
        self.pools
            .get(&pool_id)
            .map(|pool| pool.upload_interval)
            .unwrap_or(0)
    }

    fn max_bundle_size(&self, pool_id: u64) -> u64 {
        self.pools
            .get(&pool_id)
            .map(|pool| pool.max_bundle_size)
            .unwrap_or(0)
    }

    fn charge(&mut self, pool_id: u64, amount: u64) -> bool {
        let Some(pool) = self.pools.get_mut(&pool_id) else {
            return false;
        };
        if pool.funds < amount {
            return false;
        }
        pool.funds -= amount;
        true
    }

    fn fund_treasury(&mut self, amount: u64) {
        self.treasury += amount;
    }

    fn advance_index(&mut self, pool_id: u64, new_index: u64, to_key: &str, summary: &str) {
        if let Some(pool) = self.pools.get_mut(&pool_id) {
            pool.current_index = new_index;
            pool.current_key = to_key.to_string();
            pool.current_summary = summary.to_string();
        }
    }
}

// ─── Test network ────────────────────────────────────────────────────────────

/// A minimal network: one engine over the mock collaborators plus a
/// simulated block clock.
pub struct TestNetwork {
    pub engine: BundleEngine<TestStaking, TestPools>,
    pub height: u64,
    pub time: u64,
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl TestNetwork {
    /// Fresh network with default parameters and one empty pool.
    pub fn new() -> Self {
        Self::with_params(BundleParams::default())
    }

    pub fn with_params(params: BundleParams) -> Self {
        let staking = TestStaking::default();
        let mut pools = TestPools::default();
        pools.pools.insert(POOL_ID, TestPool::default());
        Self {
            engine: BundleEngine::new(params, staking, pools),
            height: 1,
            time: 0,
        }
    }

    pub fn ctx(&self) -> BlockContext {
        BlockContext {
            height: self.height,
            time: self.time,
        }
    }

    /// Advance the simulated clock by `seconds` and produce one block.
    pub fn commit_seconds(&mut self, seconds: u64) {
        self.time += seconds;
        self.height += 1;
    }

    /// Run the end-block sweep at the current time.
    pub fn end_block(&mut self) -> EngineOutput {
        let ctx = self.ctx();
        self.engine.handle_upload_timeouts(&ctx)
    }

    // ── Participants ──

    /// Join pool 0 with the default stake, no delegation, 10 % commission.
    pub fn join(&mut self) -> Pubkey {
        self.join_with(DEFAULT_STAKE, 0, 1_000)
    }

    pub fn join_stake(&mut self, stake: u64) -> Pubkey {
        self.join_with(stake, 0, 1_000)
    }

    pub fn join_with(&mut self, stake: u64, delegation: u64, commission_bps: u64) -> Pubkey {
        let staker = Pubkey::new_unique();
        let staking = self.engine.staking_mut();
        staking.stakes.insert(staker, stake);
        staking.delegations.insert(staker, delegation);
        staking.commissions.insert(staker, commission_bps);
        staking.members.entry(POOL_ID).or_default().insert(staker);
        staker
    }

    pub fn leave(&mut self, staker: &Pubkey) {
        self.engine.staking_mut().remove_member(POOL_ID, staker);
    }

    // ── Message drivers ──

    pub fn claim(&mut self, staker: Pubkey) -> Result<EngineOutput, BundleError> {
        let ctx = self.ctx();
        self.engine.claim_uploader_role(
            &ctx,
            &ClaimUploaderRole {
                pool_id: POOL_ID,
                staker,
                creator: staker,
            },
        )
    }

    /// Submit a bundle whose keys are derived from its record range.
    pub fn submit(
        &mut self,
        staker: Pubkey,
        storage_id: &str,
        data_size: u64,
        bundle_size: u64,
        from_index: u64,
    ) -> Result<EngineOutput, BundleError> {
        let to_key = from_index + bundle_size - 1;
        let ctx = self.ctx();
        self.engine.submit_bundle_proposal(
            &ctx,
            &SubmitBundleProposal {
                pool_id: POOL_ID,
                staker,
                creator: staker,
                storage_id: storage_id.to_string(),
                data_size,
                bundle_size,
                from_index,
                from_key: from_index.to_string(),
                to_key: to_key.to_string(),
                bundle_summary: to_key.to_string(),
                data_hash: format!("hash-{storage_id}"),
            },
        )
    }

    pub fn vote(
        &mut self,
        staker: Pubkey,
        storage_id: &str,
        vote: VoteKind,
    ) -> Result<EngineOutput, BundleError> {
        let ctx = self.ctx();
        self.engine.vote_bundle_proposal(
            &ctx,
            &VoteBundleProposal {
                pool_id: POOL_ID,
                staker,
                creator: staker,
                storage_id: storage_id.to_string(),
                vote,
            },
        )
    }

    pub fn skip(&mut self, staker: Pubkey, from_index: u64) -> Result<EngineOutput, BundleError> {
        let ctx = self.ctx();
        self.engine.skip_uploader_role(
            &ctx,
            &SkipUploaderRole {
                pool_id: POOL_ID,
                staker,
                creator: staker,
                from_index,
            },
        )
    }

    // ── Short-hands ──

    pub fn next_uploader(&self) -> Option<Pubkey> {
        self.engine.store().proposal_or_default(POOL_ID).next_uploader
    }

    pub fn current_index(&self) -> u64 {
        self.engine.pools().current_index(POOL_ID)
    }

    pub fn pool_mut(&mut self) -> &mut TestPool {
        self.engine
            .pools_mut()
            .pools
            .get_mut(&POOL_ID)
            .expect("default pool exists")
    }
}
