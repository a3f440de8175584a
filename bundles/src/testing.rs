//! In-memory collaborator mocks shared by the unit tests.

use {
    crate::providers::{PoolHalt, PoolProvider, SlashKind, StakingProvider},
    solana_pubkey::Pubkey,
    std::collections::{BTreeMap, BTreeSet},
};

// ---------------------------------------------------------------------------
// Staking mock
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub(crate) struct MockStaking {
    pub stakes: BTreeMap<Pubkey, u64>,
    pub delegations: BTreeMap<Pubkey, u64>,
    pub commissions: BTreeMap<Pubkey, u64>,
    pub members: BTreeMap<u64, BTreeSet<Pubkey>>,
    pub points: BTreeMap<(u64, Pubkey), u64>,
    pub commission_paid: BTreeMap<Pubkey, u64>,
    pub delegation_rewards: BTreeMap<Pubkey, u64>,
    pub slashes: Vec<(u64, Pubkey, SlashKind)>,
}

impl MockStaking {
    /// Join a pool with the given total voting power, no delegation and a
    /// 10 % commission.
    pub fn join(&mut self, pool_id: u64, stake: u64) -> Pubkey {
        self.join_with(pool_id, stake, 0, 1_000)
    }

    pub fn join_with(
        &mut self,
        pool_id: u64,
        stake: u64,
        delegation: u64,
        commission_bps: u64,
    ) -> Pubkey {
        let staker = Pubkey::new_unique();
        self.join_as(pool_id, staker, stake, delegation, commission_bps);
        staker
    }

    pub fn join_as(
        &mut self,
        pool_id: u64,
        staker: Pubkey,
        stake: u64,
        delegation: u64,
        commission_bps: u64,
    ) {
        self.stakes.insert(staker, stake);
        self.delegations.insert(staker, delegation);
        self.commissions.insert(staker, commission_bps);
        self.members.entry(pool_id).or_default().insert(staker);
    }

    pub fn leave(&mut self, pool_id: u64, staker: &Pubkey) {
        if let Some(members) = self.members.get_mut(&pool_id) {
            members.remove(staker);
        }
        self.points.remove(&(pool_id, *staker));
    }

    pub fn points_of(&self, pool_id: u64, staker: &Pubkey) -> u64 {
        self.points.get(&(pool_id, *staker)).copied().unwrap_or(0)
    }
}

impl StakingProvider for MockStaking {
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
        self.leave(pool_id, staker);
    }
}

// ---------------------------------------------------------------------------
// Pool mock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct MockPool {
    pub halt: Option<PoolHalt>,
    pub operating_cost: u64,
    pub current_index: u64,
    pub current_key: String,
    pub current_summary: String,
    pub upload_interval: u64,
    pub max_bundle_size: u64,
    pub funds: u64,
}

impl Default for MockPool {
    fn default() -> Self {
        Self {
            halt: None,
            operating_cost: 10_000,
            current_index: 0,
            current_key: String::new(),
            current_summary: String::new(),
            upload_interval: 60,
            max_bundle_size: 100,
            funds: 1_000_000_000,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockPools {
    pub pools: BTreeMap<u64, MockPool>,
    pub treasury: u64,
}

impl MockPools {
    pub fn add_pool(&mut self, pool_id: u64) -> &mut MockPool {
        self.pools.entry(pool_id).or_default()
    }
}

impl PoolProvider for MockPools {
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
