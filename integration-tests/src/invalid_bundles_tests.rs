//! Rounds rejected by quorum: slashing, dropping and mandatory
//! resubmission.

use {
    crate::harness::{TestNetwork, POOL_ID, UNIT, UPLOAD_INTERVAL},
    bundlenet_bundles::{BundleError, SlashKind, StakingProvider, VoteKind},
};

/// Stakes are chosen so the round-robin cannot hand the successor role to
/// the uploader: 100 vs 400/400 — the ledger starts even and the heavier
/// stakers always outbid the uploader in the first selection.
fn rejected_round() -> (TestNetwork, solana_pubkey::Pubkey, solana_pubkey::Pubkey) {
    let mut net = TestNetwork::new();
    let uploader = net.join_stake(100 * UNIT);
    let voter_a = net.join_stake(400 * UNIT);
    let voter_b = net.join_stake(400 * UNIT);

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(uploader, "ar://bad", 100, 50, 0).unwrap();

    // 800 of 900 voting power rejects the data.
    net.vote(voter_a, "ar://bad", VoteKind::Invalid).unwrap();
    net.vote(voter_b, "ar://bad", VoteKind::Invalid).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);

    (net, uploader, voter_a)
}

#[test]
fn invalid_quorum_drops_round_and_slashes_wrong_voters() {
    let (mut net, uploader, _voter_a) = rejected_round();

    let successor = net.next_uploader().expect("successor chosen");
    assert_ne!(successor, uploader, "heavy stakers outbid the uploader");

    let err = net.submit(successor, "ar://new", 100, 50, 50).unwrap_err();
    assert_eq!(err, BundleError::QuorumNotReached);

    // The round was dropped; the submitted replacement was NOT registered.
    let proposal = net.engine.store().proposal_or_default(POOL_ID);
    assert!(!proposal.is_active());
    // The uploader role did not move — the rejection was not the
    // successor's fault.
    assert_eq!(proposal.next_uploader, Some(successor));

    // The uploader ate the upload slash; correct voters are untouched.
    assert!(net
        .engine
        .staking()
        .was_slashed(POOL_ID, &uploader, SlashKind::Upload));
    assert!(!net.engine.staking().is_participant(POOL_ID, &uploader));
    assert_eq!(
        net.engine
            .staking()
            .slashes
            .iter()
            .filter(|(_, _, kind)| *kind == SlashKind::Vote)
            .count(),
        0
    );

    // Nothing finalized, nothing paid, nothing advanced.
    assert_eq!(net.engine.store().finalized_count(POOL_ID), 0);
    assert_eq!(net.current_index(), 0);
    assert_eq!(net.engine.pools().treasury, 0);
}

#[test]
fn dropped_round_must_be_resubmitted_from_scratch() {
    let (mut net, _uploader, _voter_a) = rejected_round();

    let successor = net.next_uploader().unwrap();
    let _ = net.submit(successor, "ar://new", 100, 50, 50).unwrap_err();

    // The drop refreshed the clock: wait out the interval, then resubmit
    // at the ORIGINAL index — the rejected records never finalized.
    net.commit_seconds(UPLOAD_INTERVAL);
    let output = net.submit(successor, "ar://retry", 100, 50, 0).unwrap();
    assert!(output.finalized.is_none());

    let proposal = net.engine.store().proposal_or_default(POOL_ID);
    assert!(proposal.is_active());
    assert_eq!(proposal.storage_id, "ar://retry");
    assert_eq!(proposal.uploader, Some(successor));
    assert_eq!(proposal.voters_valid, vec![successor]);
}

#[test]
fn tie_rejects_the_bundle() {
    let mut net = TestNetwork::new();
    let uploader = net.join_stake(100 * UNIT);
    let voter = net.join_stake(100 * UNIT);

    net.claim(uploader).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);
    net.submit(uploader, "ar://tied", 100, 50, 0).unwrap();
    net.vote(voter, "ar://tied", VoteKind::Invalid).unwrap();
    net.commit_seconds(UPLOAD_INTERVAL);

    // 100 valid vs 100 invalid of 200: invalid wins the tie.
    let successor = net.next_uploader().unwrap();
    let err = net.submit(successor, "ar://next", 100, 50, 50).unwrap_err();
    assert_eq!(err, BundleError::QuorumNotReached);
    assert!(!net.engine.store().proposal_or_default(POOL_ID).is_active());
    assert!(net
        .engine
        .staking()
        .was_slashed(POOL_ID, &uploader, SlashKind::Upload));
    assert!(net.engine.staking().is_participant(POOL_ID, &voter));
}
