//! Channel model.
//!
//! Decides, per transmission attempt, whether a data frame is lost or
//! corrupted and whether an acknowledgment is lost. Each decision is an
//! independent draw from the [`Environment`] RNG.
//!
//! # Invariants
//!
//! - Every probability is clamped to `[0, 70]` percent, so each attempt
//!   succeeds with probability at least 30% and a session always converges.
//! - Loss is drawn first; corruption is only drawn for frames that were not
//!   lost. The two are mutually exclusive per attempt.
//! - ACK/NAK loss is an independent draw on the reverse channel.

use std::fmt;

use crate::env::Environment;

/// Symbols substituted for a corrupted payload character.
pub const CORRUPTION_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%";

/// Loss or corruption probability in whole percent, clamped to `[0, 70]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Probability(u8);

impl Probability {
    /// Upper bound of every probability, in percent.
    pub const MAX_PERCENT: u8 = 70;

    /// Never drops.
    pub const ZERO: Self = Self(0);

    /// Highest allowed probability.
    pub const MAX: Self = Self(Self::MAX_PERCENT);

    /// Clamp an arbitrary percentage into `[0, 70]`.
    pub fn clamped(percent: i64) -> Self {
        let clamped = percent.clamp(0, i64::from(Self::MAX_PERCENT));
        Self(u8::try_from(clamped).unwrap_or(Self::MAX_PERCENT))
    }

    /// Value in percent.
    pub fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Outcome of a single data-frame transmission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameFate {
    /// Reaches the receiver intact.
    Delivered,
    /// Never reaches the receiver.
    Lost,
    /// Reaches the receiver but fails its integrity check.
    Corrupted,
}

/// Uniform draw in `[0, 1)` built from the top 53 bits of a random `u64`.
fn unit_draw<E: Environment>(env: &E) -> f64 {
    const SCALE: f64 = 1.0 / (1u64 << 53) as f64;
    (env.random_u64() >> 11) as f64 * SCALE
}

/// Returns `true` with probability `p`.
pub fn should_drop<E: Environment>(env: &E, p: Probability) -> bool {
    if p == Probability::ZERO {
        return false;
    }
    unit_draw(env) * 100.0 < f64::from(p.percent())
}

/// Uniformly random symbol from [`CORRUPTION_ALPHABET`].
pub fn corrupt_symbol<E: Environment>(env: &E) -> char {
    let len = CORRUPTION_ALPHABET.len() as u64;
    let index = usize::try_from(env.random_u64() % len).unwrap_or(0);
    char::from(CORRUPTION_ALPHABET[index])
}

/// Decides the fate of each transmission on the simulated link.
///
/// The session consults the channel once per frame attempt and once per
/// emitted ACK/NAK. Implementations other than [`ProbabilisticChannel`] exist
/// to force specific protocol branches in tests.
pub trait Channel {
    /// Fate of one data-frame attempt. Loss takes precedence over corruption.
    fn frame_fate<E: Environment>(
        &mut self,
        env: &E,
        loss: Probability,
        corruption: Probability,
    ) -> FrameFate;

    /// Whether one ACK/NAK is lost on the reverse channel.
    fn ack_lost<E: Environment>(&mut self, env: &E, ack_loss: Probability) -> bool;

    /// Character the receiver sees in place of a corrupted payload.
    ///
    /// Display only: corruption always produces a NAK whatever this returns.
    fn garble<E: Environment>(&mut self, env: &E, _original: char) -> char {
        corrupt_symbol(env)
    }
}

/// Channel drawing every fate from the environment RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilisticChannel;

impl Channel for ProbabilisticChannel {
    fn frame_fate<E: Environment>(
        &mut self,
        env: &E,
        loss: Probability,
        corruption: Probability,
    ) -> FrameFate {
        if should_drop(env, loss) {
            FrameFate::Lost
        } else if should_drop(env, corruption) {
            FrameFate::Corrupted
        } else {
            FrameFate::Delivered
        }
    }

    fn ack_lost<E: Environment>(&mut self, env: &E, ack_loss: Probability) -> bool {
        should_drop(env, ack_loss)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::testing::FixedEnv;

    #[test]
    fn alphabet_is_letters_digits_and_five_symbols() {
        assert_eq!(CORRUPTION_ALPHABET.len(), 41);
        assert!(CORRUPTION_ALPHABET.iter().all(|b| b.is_ascii_uppercase()
            || b.is_ascii_digit()
            || b"!@#$%".contains(b)));
    }

    #[test]
    fn zero_probability_never_drops() {
        assert!(!should_drop(&FixedEnv::always_hit(), Probability::ZERO));
    }

    #[test]
    fn low_draw_drops_high_draw_passes() {
        let p = Probability::clamped(1);
        assert!(should_drop(&FixedEnv::always_hit(), p));
        assert!(!should_drop(&FixedEnv::never_hit(), Probability::MAX));
    }

    #[test]
    fn loss_is_checked_before_corruption() {
        let mut channel = ProbabilisticChannel;
        let env = FixedEnv::always_hit();
        let fate = channel.frame_fate(&env, Probability::MAX, Probability::MAX);
        assert_eq!(fate, FrameFate::Lost);

        let fate = channel.frame_fate(&env, Probability::ZERO, Probability::MAX);
        assert_eq!(fate, FrameFate::Corrupted);

        let fate = channel.frame_fate(&env, Probability::ZERO, Probability::ZERO);
        assert_eq!(fate, FrameFate::Delivered);
    }

    #[test]
    fn corrupt_symbol_comes_from_alphabet() {
        assert_eq!(corrupt_symbol(&FixedEnv::always_hit()), 'A');
        let c = corrupt_symbol(&FixedEnv::never_hit());
        assert!(CORRUPTION_ALPHABET.contains(&(c as u8)));
    }

    proptest! {
        #[test]
        fn clamping_maps_into_zero_to_seventy(p in any::<i64>()) {
            let clamped = Probability::clamped(p);
            prop_assert_eq!(i64::from(clamped.percent()), p.clamp(0, 70));
        }
    }
}
