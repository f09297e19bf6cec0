//! Claims against roots finalized by a real ballot round.

use std::sync::Arc;

use assert_matches::assert_matches;
use ncn_consensus::{BallotCoordinator, ConsensusOutcome};
use ncn_core::{NcnConfig, NcnError, QuorumThreshold};
use ncn_rewards::{RewardDistributor, RewardLeaf, RewardsTree};
use ncn_testkit::{account, InMemoryStakeRegistry, InMemoryTokenLedger, ManualClock};

const AUTHORITY: u8 = 100;
const RESERVE: u8 = 250;
const ALICE: u8 = 10;
const BOB: u8 = 11;

struct World {
    clock: Arc<ManualClock>,
    ledger: Arc<InMemoryTokenLedger>,
    ballot: BallotCoordinator<Arc<InMemoryStakeRegistry>, Arc<ManualClock>>,
    distributor: RewardDistributor<Arc<InMemoryTokenLedger>>,
}

impl World {
    fn new() -> Self {
        let registry = Arc::new(InMemoryStakeRegistry::new(
            account(AUTHORITY),
            [(account(1), 1000), (account(2), 2000)],
        ));
        let clock = Arc::new(ManualClock::new(0));
        let config = NcnConfig {
            authority: account(AUTHORITY),
            vote_window: 10,
            quorum_threshold: QuorumThreshold::TWO_THIRDS,
        };
        let ballot = BallotCoordinator::initialize(config, registry, clock.clone()).unwrap();

        let ledger = Arc::new(InMemoryTokenLedger::new());
        ledger.credit(account(AUTHORITY), 1_000_000_000);
        let distributor = RewardDistributor::new(ledger.clone(), account(RESERVE));

        Self {
            clock,
            ledger,
            ballot,
            distributor,
        }
    }

    /// Run one round that both operators approve.
    async fn finalize(&self, tree: &RewardsTree) {
        self.ballot
            .propose(&account(AUTHORITY), tree.root())
            .await
            .unwrap();
        self.ballot.vote(&account(1), true).await.unwrap();
        self.ballot.vote(&account(2), true).await.unwrap();
        assert_matches!(
            self.ballot.check_consensus().await.unwrap(),
            ConsensusOutcome::Finalized { .. }
        );
        self.clock.advance(1);
    }
}

fn rewards(alice: u64, bob: u64) -> RewardsTree {
    RewardsTree::build(vec![
        RewardLeaf::new(account(ALICE), alice),
        RewardLeaf::new(account(BOB), bob),
        RewardLeaf::new(account(12), 1),
    ])
    .unwrap()
}

#[tokio::test]
async fn cumulative_claims_across_rounds() {
    let w = World::new();
    w.distributor
        .fund_rewards(&account(AUTHORITY), 500_000_000)
        .await
        .unwrap();

    let first = rewards(123_456_789, 5);
    w.finalize(&first).await;
    let root = w.ballot.finalized_root().await;
    let request = first.claim_request(&account(ALICE)).unwrap();

    let plan = w
        .distributor
        .claim(&account(ALICE), &request, root)
        .await
        .unwrap();
    assert_eq!(plan.payable, 123_456_789);
    assert_eq!(w.ledger.balance_of(&account(ALICE)), 123_456_789);

    assert_matches!(
        w.distributor.claim(&account(ALICE), &request, root).await,
        Err(NcnError::NothingToClaim { .. })
    );

    let second = rewards(200_000_000, 5);
    w.finalize(&second).await;
    let root = w.ballot.finalized_root().await;
    let request = second.claim_request(&account(ALICE)).unwrap();

    let plan = w
        .distributor
        .claim(&account(ALICE), &request, root)
        .await
        .unwrap();
    assert_eq!(plan.payable, 76_543_211);
    assert_eq!(w.ledger.balance_of(&account(ALICE)), 200_000_000);
    assert_eq!(w.distributor.claimed_amount(&account(ALICE)), 200_000_000);
}

#[tokio::test]
async fn skipped_rounds_pay_full_total_once() {
    let w = World::new();
    w.distributor
        .fund_rewards(&account(AUTHORITY), 1_000)
        .await
        .unwrap();

    w.finalize(&rewards(1, 100)).await;
    w.finalize(&rewards(2, 250)).await;
    let latest = rewards(3, 400);
    w.finalize(&latest).await;

    let request = latest.claim_request(&account(BOB)).unwrap();
    let plan = w
        .distributor
        .claim(&account(BOB), &request, w.ballot.finalized_root().await)
        .await
        .unwrap();
    assert_eq!(plan.payable, 400);
}

#[tokio::test]
async fn proof_for_superseded_root_is_invalid() {
    let w = World::new();
    w.distributor
        .fund_rewards(&account(AUTHORITY), 1_000)
        .await
        .unwrap();

    let old = rewards(10, 10);
    w.finalize(&old).await;
    w.finalize(&rewards(20, 20)).await;

    let stale = old.claim_request(&account(ALICE)).unwrap();
    assert_matches!(
        w.distributor
            .claim(&account(ALICE), &stale, w.ballot.finalized_root().await)
            .await,
        Err(NcnError::ProofInvalid)
    );
    assert!(w.distributor.records().is_empty());
}

#[tokio::test]
async fn tampered_claims_are_rejected_without_payment() {
    let w = World::new();
    w.distributor
        .fund_rewards(&account(AUTHORITY), 1_000)
        .await
        .unwrap();
    let tree = rewards(100, 10);
    w.finalize(&tree).await;
    let root = w.ballot.finalized_root().await;
    let honest = tree.claim_request(&account(ALICE)).unwrap();

    let mut inflated = honest.clone();
    inflated.total_rewards = 900;
    assert_matches!(
        w.distributor.claim(&account(ALICE), &inflated, root).await,
        Err(NcnError::ProofInvalid)
    );

    let mut flipped = honest.clone();
    flipped.proof[1].0[31] ^= 1;
    assert_matches!(
        w.distributor.claim(&account(ALICE), &flipped, root).await,
        Err(NcnError::ProofInvalid)
    );

    assert_matches!(
        w.distributor.claim(&account(BOB), &honest, root).await,
        Err(NcnError::Unauthorized { .. })
    );

    assert_eq!(w.ledger.balance_of(&account(ALICE)), 0);
    assert_eq!(w.distributor.reserve_balance().await.unwrap(), 1_000);
}

#[tokio::test]
async fn claim_before_any_finalization_fails() {
    let w = World::new();
    let tree = rewards(100, 10);

    // Proposed but not finalized.
    w.ballot
        .propose(&account(AUTHORITY), tree.root())
        .await
        .unwrap();
    let request = tree.claim_request(&account(ALICE)).unwrap();
    assert_matches!(
        w.distributor
            .claim(&account(ALICE), &request, w.ballot.finalized_root().await)
            .await,
        Err(NcnError::NoFinalizedRoot)
    );
}

#[tokio::test]
async fn ledger_failure_leaves_record_unchanged_and_retry_succeeds() {
    let w = World::new();
    w.distributor
        .fund_rewards(&account(AUTHORITY), 1_000)
        .await
        .unwrap();
    let tree = rewards(100, 10);
    w.finalize(&tree).await;
    let root = w.ballot.finalized_root().await;
    let request = tree.claim_request(&account(ALICE)).unwrap();

    w.ledger.fail_next_transfers(1);
    assert_matches!(
        w.distributor.claim(&account(ALICE), &request, root).await,
        Err(NcnError::LedgerTransferFailed { .. })
    );
    assert_eq!(w.distributor.claimed_amount(&account(ALICE)), 0);
    assert_eq!(w.ledger.balance_of(&account(ALICE)), 0);

    w.ledger.block_recipient(account(ALICE));
    assert!(w.distributor.claim(&account(ALICE), &request, root).await.is_err());
    w.ledger.unblock_recipient(&account(ALICE));

    let plan = w
        .distributor
        .claim(&account(ALICE), &request, root)
        .await
        .unwrap();
    assert_eq!(plan.payable, 100);
    assert_eq!(w.distributor.claimed_amount(&account(ALICE)), 100);
}

#[tokio::test]
async fn concurrent_claims() {
    let w = World::new();
    w.distributor
        .fund_rewards(&account(AUTHORITY), 1_000)
        .await
        .unwrap();
    let tree = rewards(100, 200);
    w.finalize(&tree).await;
    let root = w.ballot.finalized_root().await;
    let alice = tree.claim_request(&account(ALICE)).unwrap();
    let bob = tree.claim_request(&account(BOB)).unwrap();

    let (alice_id, bob_id) = (account(ALICE), account(BOB));

    let (a, b, replay) = tokio::join!(
        w.distributor.claim(&alice_id, &alice, root),
        w.distributor.claim(&bob_id, &bob, root),
        w.distributor.claim(&alice_id, &alice, root),
    );
    assert_eq!(a.unwrap().payable, 100);
    assert_eq!(b.unwrap().payable, 200);
    assert_matches!(replay, Err(NcnError::NothingToClaim { .. }));

    // Exactly one payout per beneficiary reached the ledger.
    let paid: Vec<_> = w
        .ledger
        .transfers()
        .into_iter()
        .filter(|t| t.from == account(RESERVE))
        .collect();
    assert_eq!(paid.len(), 2);
    assert_eq!(w.distributor.reserve_balance().await.unwrap(), 700);
}
