//! Environment abstraction for deterministic simulation.
//!
//! The `Environment` trait decouples the protocol core from system resources
//! (time and randomness). Every loss, corruption and ACK-loss draw of the
//! channel model goes through it, so:
//!
//! - Deterministic Simulation: the harness supplies a seeded RNG and a virtual
//!   clock, and a given seed replays the exact same session.
//!
//! - Production Runtime: the command line simulator uses OS entropy and the
//!   Tokio timer without any change to the protocol logic.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use std::time::{Duration, Instant};

/// Abstract environment providing time, randomness, and async sleeping.
///
/// The session state machine only ever asks for random bytes. Time is owned
/// by the discrete-event timeline; `now()` and `sleep()` are used by drivers
/// that pace the timeline against a clock.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current time.
    ///
    /// # Invariants
    ///
    /// - Monotonicity: subsequent calls must return times >= previous calls.
    fn now(&self) -> Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code awaits this; the state machine never does.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Determinism during simulations: Given the same RNG seed, this produces
    ///   the same sequence of bytes
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
