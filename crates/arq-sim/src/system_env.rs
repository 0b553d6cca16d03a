//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` uses the wall clock and tokio timers. Randomness comes from
//! the OS via `getrandom`, or from a seeded ChaCha8 stream when the user asks
//! for a reproducible run.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use arq_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Production environment using system time.
///
/// - `now()` is `Instant::now()`
/// - `sleep()` is `tokio::time::sleep()`
/// - `random_bytes()` reads OS entropy, or the seeded stream if one was given
#[derive(Clone, Default)]
pub struct SystemEnv {
    seeded: Option<Arc<Mutex<ChaCha8Rng>>>,
}

impl SystemEnv {
    /// Environment backed by OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment whose channel draws replay for the same `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { seeded: Some(Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed)))) }
    }

    /// Whether draws come from a seeded stream.
    pub fn is_seeded(&self) -> bool {
        self.seeded.is_some()
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        if let Some(rng) = &self.seeded {
            rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
            return;
        }

        getrandom::fill(buffer).unwrap_or_else(|e| {
            // A zeroed draw reads as "never drop"; the run stays usable.
            tracing::error!("getrandom failed: {}", e);
            buffer.fill(0);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_advances() {
        let env = SystemEnv::new();

        let t1 = env.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = env.now();

        assert!(t2 > t1, "Time should advance");
    }

    #[test]
    fn entropy_draws_differ() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];
        env.random_bytes(&mut bytes1);
        env.random_bytes(&mut bytes2);

        assert!(!env.is_seeded());
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn seeded_draws_replay() {
        let a = SystemEnv::seeded(9);
        let b = SystemEnv::seeded(9);

        let draws_a: Vec<u64> = (0..4).map(|_| a.random_u64()).collect();
        let draws_b: Vec<u64> = (0..4).map(|_| b.random_u64()).collect();

        assert!(a.is_seeded());
        assert_eq!(draws_a, draws_b);
    }

    #[tokio::test]
    async fn sleep_waits() {
        let env = SystemEnv::new();

        let start = env.now();
        env.sleep(Duration::from_millis(50)).await;

        assert!(env.now() - start >= Duration::from_millis(50), "Sleep should wait at least 50ms");
    }
}
