//! Model-based property tests.
//!
//! Random fault scripts are applied to both the untimed reference model and
//! the real simulator (timeline, timers, generations). Counters, delivered
//! payload and accepted sequence bits must match exactly.
//!
//! ```text
//! proptest generates: (payload, FaultScript)
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!       ModelLink      Scenario        Compare
//!      (reference)   (virtual time)    Outcomes
//! ```

use arq_core::{FrameFate, SessionState};
use arq_harness::{FaultScript, ModelLink, Scenario};
use proptest::prelude::*;

fn frame_fate_strategy() -> impl Strategy<Value = FrameFate> {
    prop_oneof![
        4 => Just(FrameFate::Delivered),
        2 => Just(FrameFate::Lost),
        2 => Just(FrameFate::Corrupted),
    ]
}

fn script_strategy() -> impl Strategy<Value = FaultScript> {
    (
        prop::collection::vec(frame_fate_strategy(), 0..24),
        prop::collection::vec(prop::bool::weighted(0.3), 0..24),
    )
        .prop_map(|(frames, acks)| FaultScript { frames, acks })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_model_matches_real(
        payload in "[A-Z0-9]{1,6}",
        script in script_strategy(),
        seed in any::<u64>(),
    ) {
        let expected = ModelLink::new(&payload).run(&script);

        let world = Scenario::new()
            .payload(&payload)
            .seed(seed)
            .script(script.clone())
            .run()
            .expect("scripted run should settle");

        prop_assert_eq!(world.state, SessionState::Completed);
        prop_assert_eq!(world.stats, expected.stats);
        prop_assert_eq!(world.recorder.delivered_payload(), expected.delivered);

        let bits: Vec<_> = world.recorder.accepted().iter().map(|f| f.seq).collect();
        prop_assert_eq!(bits, expected.accepted_bits);
    }

    #[test]
    fn prop_model_invariants(
        payload in "[A-Z]{1,8}",
        script in script_strategy(),
    ) {
        let outcome = ModelLink::new(&payload).run(&script);
        let n = payload.chars().count() as u64;

        prop_assert_eq!(outcome.delivered, payload);
        prop_assert_eq!(outcome.stats.received, n);
        prop_assert_eq!(outcome.stats.sent, n + outcome.stats.retransmissions);
        prop_assert!(outcome.stats.retransmissions >= outcome.stats.lost);
        prop_assert!(
            outcome.stats.retransmissions
                <= outcome.stats.lost + outcome.stats.corrupted + outcome.stats.acks_lost
        );
    }
}

#[test]
fn model_basic_fault_mix() {
    let script = FaultScript {
        frames: vec![FrameFate::Lost, FrameFate::Corrupted, FrameFate::Delivered],
        acks: vec![false, true],
    };
    let expected = ModelLink::new("AB").run(&script);

    assert_eq!(expected.delivered, "AB");
    assert_eq!(expected.stats.lost, 1);
    assert_eq!(expected.stats.corrupted, 1);
    assert_eq!(expected.stats.acks_lost, 1);
    assert_eq!(expected.stats.duplicates_discarded, 1);

    let world = Scenario::new().payload("AB").script(script).run().expect("run should settle");
    assert_eq!(world.stats, expected.stats);
}
