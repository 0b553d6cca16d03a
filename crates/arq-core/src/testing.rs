//! Test environments with fixed random draws.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use crate::env::Environment;

/// Immediate future that completes instantly
pub struct ImmediateFuture;

impl Future for ImmediateFuture {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        Poll::Ready(())
    }
}

/// Environment whose RNG always returns the same `u64`.
///
/// A draw of 0 is below every non-zero probability; `u64::MAX` is above every
/// clamped one.
#[derive(Clone)]
pub struct FixedEnv {
    value: u64,
}

impl FixedEnv {
    /// Every non-zero probability fires.
    pub fn always_hit() -> Self {
        Self { value: 0 }
    }

    /// No probability ever fires.
    pub fn never_hit() -> Self {
        Self { value: u64::MAX }
    }
}

impl Environment for FixedEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
        ImmediateFuture
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        for (byte, value) in buffer.iter_mut().zip(self.value.to_be_bytes().iter().cycle()) {
            *byte = *value;
        }
    }
}
