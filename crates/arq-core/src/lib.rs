//! Stop-and-Wait ARQ core
//!
//! Sans-IO implementation of the alternating-bit protocol over a simulated
//! lossy link, used to teach frame transmission, acknowledgment, loss,
//! corruption, timeout and retransmission.
//!
//! # Architecture
//!
//! ```text
//!   Presentation ──start/stop/reset──▶ Simulator ──▶ Session (state machine)
//!        ▲                               │   ▲            │
//!        └────── Observer callbacks ─────┘   │            ├─ Channel (fates)
//!                                            │            ├─ Sequencer
//!                                 Timeline ◀─┘ actions    └─ Statistics
//! ```
//!
//! The session never touches a clock or a socket. It returns actions
//! (schedule, arm/cancel timeout, notify) and the [`Simulator`] executes them
//! against a discrete-event [`Timeline`]. All randomness comes from the
//! [`Environment`], so a seeded environment replays a session exactly.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod channel;
pub mod config;
pub mod env;
pub mod frame;
pub mod observer;
pub mod sequencer;
pub mod session;
pub mod simulator;
pub mod stats;
pub mod timeline;

#[cfg(test)]
mod testing;

pub use channel::{
    CORRUPTION_ALPHABET, Channel, FrameFate, ProbabilisticChannel, Probability, corrupt_symbol,
    should_drop,
};
pub use config::{ConfigError, ConfigField, ConfigInput, DEFAULT_TIMEOUT, LinkTiming, SessionConfig};
pub use env::Environment;
pub use frame::{Ack, AckKind, Frame, SeqBit};
pub use observer::{Notification, Observer, Severity};
pub use sequencer::{DEFAULT_PAYLOAD, sequence_frames};
pub use session::{Session, SessionAction, SessionEvent, SessionState, TimerToken};
pub use simulator::{Simulator, SimulatorError};
pub use stats::{StatEvent, Statistics};
pub use timeline::{FiredEvent, Timeline};
