//! Random command sequences against the pure core keep every invariant and
//! never let approved weight exceed the frozen total.

use ncn_consensus::core::{check_consensus, propose, vote};
use ncn_consensus::{check_invariants, BallotBox};
use ncn_core::{AccountId, Hash32, NcnConfig, QuorumThreshold, Slot, StakeSnapshot};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Command {
    Propose(u8),
    Vote { operator: u8, approve: bool },
    Check,
    Tick(u64),
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        any::<u8>().prop_map(Command::Propose),
        (0u8..6, any::<bool>()).prop_map(|(operator, approve)| Command::Vote { operator, approve }),
        Just(Command::Check),
        (0u64..8).prop_map(Command::Tick),
    ]
}

fn operator(seed: u8) -> AccountId {
    AccountId::new([seed; 32])
}

proptest! {
    #[test]
    fn invariants_hold_under_random_commands(
        weights in prop::collection::vec(0u64..10_000, 1..5),
        commands in prop::collection::vec(command(), 1..60),
    ) {
        let authority = operator(200);
        let config = NcnConfig {
            authority,
            vote_window: 5,
            quorum_threshold: QuorumThreshold::TWO_THIRDS,
        };
        let snapshot = StakeSnapshot::from_weights(
            weights.iter().enumerate().map(|(i, w)| (operator(i as u8), *w)),
        );
        let mut ballot = BallotBox::new();
        let mut now = Slot(0);
        let mut last_finalized = None;

        for cmd in commands {
            let before = ballot.clone();
            let accepted = match cmd {
                Command::Propose(seed) => propose(
                    &config, &mut ballot, &authority, Hash32::new([seed; 32]), snapshot.clone(), now,
                ).is_ok(),
                Command::Vote { operator: seed, approve } => {
                    vote(&config, &mut ballot, &operator(seed), approve, now).is_ok()
                }
                Command::Check => {
                    let outcome = check_consensus(&config, &mut ballot, now);
                    if !outcome.resolved_round() {
                        prop_assert_eq!(&ballot, &before);
                    }
                    true
                }
                Command::Tick(n) => {
                    now = now.saturating_add(n);
                    true
                }
            };

            if !accepted {
                prop_assert_eq!(&ballot, &before);
            }
            prop_assert!(check_invariants(&ballot).is_ok());
            prop_assert!(ballot.approved_weight <= ballot.total_eligible_weight);

            // The finalized root only changes on a successful evaluation.
            if ballot.finalized_root != last_finalized {
                prop_assert!(matches!(cmd, Command::Check));
                last_finalized = ballot.finalized_root;
            }
        }
    }
}
