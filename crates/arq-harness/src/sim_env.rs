//! Simulation environment with a seeded RNG and a virtual clock.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use arq_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

struct SimState {
    rng: ChaCha8Rng,
    elapsed: Duration,
}

/// Deterministic environment for simulations.
///
/// - Randomness comes from a ChaCha8 stream seeded at construction, so the
///   same seed replays the same channel draws.
/// - `sleep` completes immediately and advances a virtual clock; `now()` is a
///   fixed base instant plus the virtual time slept so far.
///
/// Clones share the RNG stream and the clock.
#[derive(Clone)]
pub struct SimEnv {
    seed: u64,
    base: Instant,
    state: Arc<Mutex<SimState>>,
}

impl SimEnv {
    /// Environment seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            base: Instant::now(),
            state: Arc::new(Mutex::new(SimState {
                rng: ChaCha8Rng::seed_from_u64(seed),
                elapsed: Duration::ZERO,
            })),
        }
    }

    /// Seed this environment was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Virtual time slept so far.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::with_seed(0)
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.lock().elapsed += duration;
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }
}
