//! Weighted round-robin uploader selection.
//!
//! Every pool keeps a signed credit ledger over its participants. Each
//! selection adds a participant's power to its credit, picks the highest
//! credit and debits the winner by the power of the whole field it won
//! against. Over many rounds every participant wins with frequency
//! proportional to its stake, and temporary exclusions redistribute only
//! the excluded rounds.
//!
//! Everything here is integer arithmetic over deterministic inputs: stake
//! amounts and address ordering. The ledger is persisted sorted by address
//! so serialization is stable across nodes.

use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
    std::collections::{BTreeMap, BTreeSet},
};

/// One persisted row of a pool's round-robin ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct RoundRobinEntry {
    pub address: Pubkey,
    pub credit: i64,
}

/// A live participant with its current voting power.
///
/// Power is cached here because reading it from the staking module is not
/// free; the set is rebuilt from committed state on every load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantPower {
    pub address: Pubkey,
    pub power: i64,
}

/// The in-memory working set for one pool's round-robin state.
///
/// Built by [`RoundRobinSet::load`] from the live participant set and the
/// persisted ledger, consumed through [`RoundRobinSet::next_uploader`] and
/// written back via [`RoundRobinSet::to_ledger`]. Keeping selection free of
/// persistence makes the scheduling logic testable on its own.
#[derive(Debug, Clone)]
pub struct RoundRobinSet {
    /// Live participants sorted by address; the iteration order is the
    /// deterministic tie-break.
    participants: Vec<ParticipantPower>,
    credits: BTreeMap<Pubkey, i64>,
}

impl RoundRobinSet {
    /// Build the working set.
    ///
    /// Participants with zero power are dropped entirely. Ledger entries
    /// for departed participants are discarded. Participants missing from
    /// the ledger are newcomers and start at `-1.125 × total_power` — far
    /// enough below average that they cannot jump the queue, close enough
    /// that they catch up within a few rounds. The factor is computed as
    /// `-(9 × total / 8)` with truncation toward zero.
    pub fn load(live: &[(Pubkey, u64)], ledger: &[RoundRobinEntry]) -> Self {
        let mut participants: Vec<ParticipantPower> = live
            .iter()
            .filter(|(_, power)| *power > 0)
            .map(|(address, power)| ParticipantPower {
                address: *address,
                power: i64::try_from(*power).unwrap_or(i64::MAX),
            })
            .collect();
        participants.sort_by(|a, b| a.address.cmp(&b.address));

        let total: i64 = participants.iter().map(|p| p.power).sum();
        let newcomer_credit = (-(9i128 * total as i128) / 8) as i64;

        let stored: BTreeMap<Pubkey, i64> = ledger
            .iter()
            .map(|entry| (entry.address, entry.credit))
            .collect();

        let credits = participants
            .iter()
            .map(|p| {
                let credit = stored.get(&p.address).copied().unwrap_or(newcomer_credit);
                (p.address, credit)
            })
            .collect();

        let mut set = Self {
            participants,
            credits,
        };
        set.normalize();
        set
    }

    /// The live participants, sorted by address.
    pub fn participants(&self) -> &[ParticipantPower] {
        &self.participants
    }

    /// Current credit of a participant (for diagnostics and tests).
    pub fn credit_of(&self, address: &Pubkey) -> Option<i64> {
        self.credits.get(address).copied()
    }

    /// Sum of all live power.
    pub fn total_power(&self) -> i64 {
        self.participants.iter().map(|p| p.power).sum()
    }

    /// Serialize the ledger, sorted by address.
    pub fn to_ledger(&self) -> Vec<RoundRobinEntry> {
        self.participants
            .iter()
            .map(|p| RoundRobinEntry {
                address: p.address,
                credit: self.credits.get(&p.address).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Select the next uploader.
    ///
    /// Non-excluded participants gain their power as credit; the highest
    /// credit among them wins, ties resolved by address order. The winner
    /// is debited by `total_power - excluded_power`, the weight of the
    /// field it beat. If every participant is excluded, the exclusion list
    /// is void — selection must never stall. An empty set yields `None`.
    pub fn next_uploader(&mut self, excluded: &[Pubkey]) -> Option<Pubkey> {
        if self.participants.is_empty() {
            return None;
        }

        self.normalize();

        let mut excluded_set: BTreeSet<Pubkey> = excluded.iter().copied().collect();
        if self
            .participants
            .iter()
            .all(|p| excluded_set.contains(&p.address))
        {
            excluded_set.clear();
        }

        let mut excluded_power: i64 = 0;
        for participant in &self.participants {
            if excluded_set.contains(&participant.address) {
                excluded_power += participant.power;
            } else if let Some(credit) = self.credits.get_mut(&participant.address) {
                *credit += participant.power;
            }
        }

        let mut winner: Option<Pubkey> = None;
        for participant in &self.participants {
            if excluded_set.contains(&participant.address) {
                continue;
            }
            match winner {
                None => winner = Some(participant.address),
                Some(current) => {
                    if self.credits.get(&participant.address) > self.credits.get(&current) {
                        winner = Some(participant.address);
                    }
                }
            }
        }

        let winner = winner?;
        let debit = self.total_power() - excluded_power;
        if let Some(credit) = self.credits.get_mut(&winner) {
            *credit -= debit;
        }

        self.normalize();
        Some(winner)
    }

    /// Restore the ledger invariants: when the credit spread exceeds
    /// `2 × total_power`, compress it linearly back to the threshold, then
    /// re-center all credits around zero. Bounding the spread keeps a
    /// long-excluded participant from monopolizing the rounds after its
    /// exclusion ends.
    fn normalize(&mut self) {
        if self.participants.is_empty() {
            return;
        }

        let threshold = 2i128 * self.total_power() as i128;
        let (mut min, mut max) = (i64::MAX, i64::MIN);
        for participant in &self.participants {
            let credit = self.credits.get(&participant.address).copied().unwrap_or(0);
            min = min.min(credit);
            max = max.max(credit);
        }
        let diff = max as i128 - min as i128;

        if diff > threshold {
            for participant in &self.participants {
                if let Some(credit) = self.credits.get_mut(&participant.address) {
                    *credit = ((*credit as i128) * threshold / diff) as i64;
                }
            }
        }

        let sum: i128 = self
            .participants
            .iter()
            .map(|p| self.credits.get(&p.address).copied().unwrap_or(0) as i128)
            .sum();
        let avg = (sum / self.participants.len() as i128) as i64;
        for participant in &self.participants {
            if let Some(credit) = self.credits.get_mut(&participant.address) {
                *credit -= avg;
            }
        }
    }
}
