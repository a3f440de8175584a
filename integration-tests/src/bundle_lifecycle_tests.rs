//! Full lifecycle: claim → submit → vote → settle on the next submission.

use {
    crate::harness::{TestNetwork, DEFAULT_STAKE, POOL_ID, UNIT, UPLOAD_INTERVAL},
    bundlenet_bundles::{BundleEvent, BundleParams, BundleStatus, VoteKind},
    bundlenet_rewards::RewardConfig,
};

/// The canonical two-staker scenario: no fees, no costs. The first round
/// finalizes with full vote power and the uploader takes the whole (zero)
/// reward because it has no delegation.
#[test]
fn free_pool_round_trip() {
    let mut params = BundleParams::default();
    params.reward = RewardConfig {
        storage_cost_micros_per_byte: 0,
        network_fee_bps: 0,
    };
    let mut net = TestNetwork::with_params(params);
    net.pool_mut().operating_cost = 0;

    let uploader = net.join();
    let voter = net.join();

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(uploader, "ar://0", 100, 50, 0).unwrap();
    net.vote(voter, "ar://0", VoteKind::Valid).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);

    let successor = net.next_uploader().expect("successor chosen");
    let output = net.submit(successor, "ar://1", 100, 50, 50).unwrap();

    let finalized = output.finalized.expect("round 0 finalized");
    assert_eq!(finalized.id, 0);
    assert_eq!(finalized.pool_id, POOL_ID);
    assert_eq!(finalized.uploader, Some(uploader));
    assert_eq!(finalized.from_index, 0);
    assert_eq!(finalized.to_index, 50);
    assert_eq!(finalized.stake_security.valid_vote_power, 2 * DEFAULT_STAKE);
    assert_eq!(finalized.stake_security.total_vote_power, 2 * DEFAULT_STAKE);

    // The pool advanced by the bundle size.
    assert_eq!(net.current_index(), 50);

    // Zero-fee round: the uploader's share is the whole (zero) total and
    // nothing accrues to delegators.
    let reward = output
        .events
        .iter()
        .find_map(|event| match event {
            BundleEvent::BundleFinalized { reward, .. } => Some(*reward),
            _ => None,
        })
        .expect("finalized event");
    assert_eq!(reward.total, 0);
    assert_eq!(reward.uploader, reward.total);
    assert_eq!(reward.delegation, 0);
    assert_eq!(net.engine.pools().treasury, 0);
}

#[test]
fn paid_round_routes_rewards() {
    let mut net = TestNetwork::new();
    let uploader = net.join();
    let voter = net.join();
    let funds_before = net.pool_mut().funds;

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    // 4_000 bytes at 25_000 micros/byte = 100 storage reward;
    // total = 10_000 + 100, treasury = 1 % = 101, node reward = 9_999.
    net.submit(uploader, "ar://0", 4_000, 50, 0).unwrap();
    net.vote(voter, "ar://0", VoteKind::Valid).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);

    let successor = net.next_uploader().unwrap();
    let output = net.submit(successor, "ar://1", 4_000, 50, 50).unwrap();
    assert!(output.finalized.is_some());

    assert_eq!(net.engine.pools().treasury, 101);
    // Default join has no delegation: the uploader takes the whole node
    // reward despite its 10 % commission.
    assert_eq!(net.engine.staking().commission_paid_to(&uploader), 9_999);
    assert_eq!(net.engine.staking().delegation_rewards_of(&uploader), 0);
    assert_eq!(net.pool_mut().funds, funds_before - 10_100);
}

#[test]
fn finalized_ids_are_sequential_and_index_accumulates() {
    let mut net = TestNetwork::new();
    let first = net.join();
    let second = net.join();

    net.claim(first).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(first, "ar://0", 100, 50, 0).unwrap();

    for round in 0u64..3 {
        let storage_id = format!("ar://{round}");
        let other = if net
            .engine
            .store()
            .proposal_or_default(POOL_ID)
            .uploader
            == Some(first)
        {
            second
        } else {
            first
        };
        net.vote(other, &storage_id, VoteKind::Valid).unwrap();
        net.commit_seconds(UPLOAD_INTERVAL);

        let successor = net.next_uploader().unwrap();
        let from_index = (round + 1) * 50;
        let output = net
            .submit(successor, &format!("ar://{}", round + 1), 100, 50, from_index)
            .unwrap();
        let finalized = output.finalized.expect("round finalized");
        assert_eq!(finalized.id, round);
        assert_eq!(finalized.from_index, round * 50);
        assert_eq!(finalized.to_index, (round + 1) * 50);
    }

    assert_eq!(net.engine.store().finalized_count(POOL_ID), 3);
    assert_eq!(net.current_index(), 150);
}

#[test]
fn submission_before_quorum_is_rejected_without_mutation() {
    let mut net = TestNetwork::new();
    let uploader = net.join();
    let _silent_a = net.join();
    let _silent_b = net.join();

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(uploader, "ar://0", 100, 50, 0).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);

    // Only the uploader's implicit vote: 1/3 of the power.
    let successor = net.next_uploader().unwrap();
    let before = net.engine.store().proposal_or_default(POOL_ID);
    assert!(net.submit(successor, "ar://1", 100, 50, 50).is_err());
    assert_eq!(net.engine.store().proposal_or_default(POOL_ID), before);
    assert_eq!(net.engine.store().finalized_count(POOL_ID), 0);
}

#[test]
fn out_of_funds_keeps_round_open() {
    let mut net = TestNetwork::new();
    let uploader = net.join();
    let voter = net.join();
    net.pool_mut().funds = 99; // cannot cover the 10_100 payout

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(uploader, "ar://0", 4_000, 50, 0).unwrap();
    net.vote(voter, "ar://0", VoteKind::Valid).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);

    let successor = net.next_uploader().unwrap();
    let output = net.submit(successor, "ar://1", 4_000, 50, 50).unwrap();

    assert!(output.finalized.is_none());
    assert!(output
        .events
        .iter()
        .any(|event| matches!(event, BundleEvent::PoolOutOfFunds { .. })));

    // The round stayed open with a refreshed clock; nothing was paid.
    let proposal = net.engine.store().proposal_or_default(POOL_ID);
    assert_eq!(proposal.storage_id, "ar://0");
    assert_eq!(proposal.updated_at, net.time);
    assert_eq!(net.engine.pools().treasury, 0);
    assert_eq!(net.engine.staking().commission_paid_to(&uploader), 0);
    assert_eq!(net.engine.store().finalized_count(POOL_ID), 0);
}

#[test]
fn vote_status_query_tracks_progress() {
    let mut net = TestNetwork::new();
    let uploader = net.join_stake(100 * UNIT);
    let voter = net.join_stake(300 * UNIT);

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(uploader, "ar://0", 100, 50, 0).unwrap();

    let distribution = net.engine.vote_distribution(POOL_ID);
    assert_eq!(distribution.valid, 100 * UNIT);
    assert_eq!(distribution.total, 400 * UNIT);
    assert_eq!(distribution.status, BundleStatus::NoQuorum);

    net.vote(voter, "ar://0", VoteKind::Valid).unwrap();
    let distribution = net.engine.vote_distribution(POOL_ID);
    assert_eq!(distribution.valid, 400 * UNIT);
    assert_eq!(distribution.status, BundleStatus::Valid);
}
