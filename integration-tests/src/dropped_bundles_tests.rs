//! Rounds dropped by the timeout sweep and pool lifecycle changes.

use {
    crate::harness::{TestNetwork, POOL_ID, UPLOAD_INTERVAL},
    bundlenet_bundles::{BundleEvent, BundleStatus, PoolHalt, VoteKind},
};

#[test]
fn no_quorum_timeout_drops_round_and_recovery_succeeds() {
    let mut net = TestNetwork::new();
    let uploader = net.join();
    let silent_a = net.join();
    let silent_b = net.join();

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(uploader, "ar://stuck", 100, 50, 0).unwrap();

    // Nobody votes. Once the interval passes, the sweep drops the round
    // and points the silent stakers.
    net.commit_seconds(UPLOAD_INTERVAL);
    let output = net.end_block();

    let proposal = net.engine.store().proposal_or_default(POOL_ID);
    assert!(!proposal.is_active());
    assert_eq!(proposal.updated_at, net.time);
    let successor = proposal.next_uploader.expect("successor chosen");

    assert_eq!(net.engine.staking().points_of(POOL_ID, &uploader), 0);
    assert_eq!(net.engine.staking().points_of(POOL_ID, &silent_a), 1);
    assert_eq!(net.engine.staking().points_of(POOL_ID, &silent_b), 1);
    assert!(output.events.iter().any(|event| matches!(
        event,
        BundleEvent::BundleFinalized {
            distribution: bundlenet_bundles::VoteDistribution {
                status: BundleStatus::NoQuorum,
                ..
            },
            ..
        }
    )));

    // Recovery: the successor submits a fresh proposal at the original
    // index — the dropped records never made it on-chain.
    net.commit_seconds(UPLOAD_INTERVAL);
    let output = net.submit(successor, "ar://recovery", 100, 50, 0).unwrap();
    assert!(output.finalized.is_none());
    assert!(net.engine.store().proposal_or_default(POOL_ID).is_active());
    assert_eq!(net.current_index(), 0);
}

#[test]
fn disabling_a_pool_kills_the_round_without_penalties() {
    let mut net = TestNetwork::new();
    let uploader = net.join();
    let voter = net.join();

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(uploader, "ar://doomed", 100, 50, 0).unwrap();
    net.vote(voter, "ar://doomed", VoteKind::Valid).unwrap();

    net.pool_mut().halt = Some(PoolHalt::Disabled);
    net.commit_seconds(1);
    let output = net.end_block();

    let proposal = net.engine.store().proposal_or_default(POOL_ID);
    assert!(!proposal.is_active());
    assert!(proposal.next_uploader.is_none());
    assert!(output.events.iter().any(|event| matches!(
        event,
        BundleEvent::BundleFinalized {
            distribution: bundlenet_bundles::VoteDistribution {
                status: BundleStatus::Disabled,
                total: 0,
                ..
            },
            ..
        }
    )));
    // A disabled pool hands out no liveness penalties.
    assert_eq!(net.engine.staking().points_of(POOL_ID, &uploader), 0);
    assert_eq!(net.engine.staking().points_of(POOL_ID, &voter), 0);

    // Re-enabled pools start from a vacant uploader slot.
    net.pool_mut().halt = None;
    net.claim(voter).unwrap();
    assert_eq!(net.next_uploader(), Some(voter));
}

#[test]
fn temporarily_halted_pool_only_releases_the_role() {
    let mut net = TestNetwork::new();
    let uploader = net.join();
    let _other = net.join();

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(uploader, "ar://paused", 100, 50, 0).unwrap();

    net.pool_mut().halt = Some(PoolHalt::Upgrading);
    net.commit_seconds(1);
    net.end_block();

    // The payload and votes survive the upgrade window.
    let proposal = net.engine.store().proposal_or_default(POOL_ID);
    assert!(proposal.is_active());
    assert_eq!(proposal.storage_id, "ar://paused");
    assert!(proposal.next_uploader.is_none());
    assert_eq!(proposal.voters_valid, vec![uploader]);
}
