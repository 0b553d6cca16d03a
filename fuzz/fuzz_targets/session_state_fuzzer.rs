//! Fuzz target for the [`Session`] state machine
//!
//! Feed arbitrary command sequences and raw, possibly stale events into a
//! session and check its bookkeeping never breaks.
//!
//! # Strategy
//!
//! - Commands: start/stop/reset in any order, including start while running
//! - Timeline: step the real simulator a fuzzed number of times
//! - Raw events: arrivals for unknown frame indices, ACKs with the wrong bit,
//!   events tagged with old or future generations
//!
//! # Invariants
//!
//! - `cursor <= frames.len()`, and equal once `Completed`
//! - Driven by the timeline, a completed run leaves the receiver expecting
//!   the bit after the last frame: every frame accepted exactly once
//! - Driven by the timeline, `received <= sent`
//! - NEVER panic on unexpected events

#![no_main]

use arbitrary::Arbitrary;
use arq_core::{
    Ack, AckKind, ConfigInput, SeqBit, Session, SessionConfig, SessionEvent, SessionState,
    Simulator,
};
use arq_harness::{RecordingObserver, ScriptedChannel, SimEnv};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Command {
    Start { payload: String, loss: i8, corruption: i8, ack_loss: i8, timeout_ms: i16 },
    Stop,
    Reset,
    Step { count: u8 },
}

#[derive(Debug, Clone, Arbitrary)]
enum RawEvent {
    Transmit,
    FrameArrived { index: u8, corrupted: bool },
    AckDropped { one: bool, nak: bool },
    AckArrived { one: bool, nak: bool },
}

#[derive(Debug, Clone, Arbitrary)]
struct Input {
    seed: u64,
    commands: Vec<Command>,
    raw: Vec<(i8, RawEvent)>,
}

fn ack(one: bool, nak: bool) -> Ack {
    Ack {
        bit: if one { SeqBit::One } else { SeqBit::Zero },
        kind: if nak { AckKind::Nak } else { AckKind::Ack },
    }
}

fn check(session: &Session<SimEnv, ScriptedChannel>) {
    let len = session.frames().len();
    let cursor = session.cursor();
    assert!(cursor <= len, "cursor {cursor} past {len} frames");
    if session.state() == SessionState::Completed {
        assert_eq!(cursor, len, "completed with frames left");
    }
}

fuzz_target!(|input: Input| {
    let mut sim =
        Simulator::new(SimEnv::with_seed(input.seed), ScriptedChannel::new(), RecordingObserver::new());

    for command in input.commands.iter().take(64) {
        match command {
            Command::Start { payload, loss, corruption, ack_loss, timeout_ms } => {
                let payload: String = payload.chars().take(16).collect();
                sim.start(ConfigInput {
                    payload,
                    loss_pct: Some(i64::from(*loss)),
                    corruption_pct: Some(i64::from(*corruption)),
                    ack_loss_pct: Some(i64::from(*ack_loss)),
                    timeout_ms: Some(i64::from(*timeout_ms)),
                });
            },
            Command::Stop => sim.stop(),
            Command::Reset => sim.reset(),
            Command::Step { count } => {
                for _ in 0..*count {
                    if !sim.step() {
                        break;
                    }
                }
            },
        }
        check(sim.session());

        let session = sim.session();
        let stats = session.stats();
        assert!(stats.received <= stats.sent, "received more than sent: {stats:?}");
        if session.state() == SessionState::Completed {
            assert_eq!(
                session.expected_bit(),
                SeqBit::from_index(session.frames().len()),
                "receiver out of step with sender"
            );
        }
    }

    // Raw events bypass the timeline entirely.
    let mut session = Session::new(SimEnv::with_seed(input.seed), ScriptedChannel::new());
    session.start(std::time::Duration::ZERO, SessionConfig::lossless("FUZZ"));
    let now = std::time::Duration::ZERO;

    for (offset, event) in input.raw.iter().take(256) {
        let generation = session.generation().wrapping_add_signed(i64::from(*offset % 2));
        let event = match *event {
            RawEvent::Transmit => SessionEvent::Transmit,
            RawEvent::FrameArrived { index, corrupted } => {
                SessionEvent::FrameArrived { index: usize::from(index), corrupted }
            },
            RawEvent::AckDropped { one, nak } => SessionEvent::AckDropped { ack: ack(one, nak) },
            RawEvent::AckArrived { one, nak } => SessionEvent::AckArrived { ack: ack(one, nak) },
        };
        session.handle(now, generation, event);
        check(&session);
    }
});
