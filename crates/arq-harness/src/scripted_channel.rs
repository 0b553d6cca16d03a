//! Channel with scripted fates for forcing protocol branches.

use std::collections::VecDeque;

use arq_core::{Channel, Environment, FrameFate, ProbabilisticChannel, Probability};

/// Channel that replays scripted fates, then falls back to random draws.
///
/// Frame attempts consume the frame script, emitted ACK/NAKs consume the ACK
/// script. Once a script runs out the configured probabilities apply, so with
/// all probabilities at 0 an exhausted script means a clean link.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChannel {
    frames: VecDeque<FrameFate>,
    acks: VecDeque<bool>,
    frame_draws: usize,
    ack_draws: usize,
}

impl ScriptedChannel {
    /// Channel with empty scripts (pure probabilistic behavior).
    pub fn new() -> Self {
        Self::default()
    }

    /// Fates of the next data-frame attempts, in order.
    #[must_use]
    pub fn with_frames(mut self, fates: impl IntoIterator<Item = FrameFate>) -> Self {
        self.frames.extend(fates);
        self
    }

    /// Whether each of the next ACK/NAKs is lost, in order.
    #[must_use]
    pub fn with_acks(mut self, lost: impl IntoIterator<Item = bool>) -> Self {
        self.acks.extend(lost);
        self
    }

    /// Force-loss mode: lose the next `count` frame attempts.
    #[must_use]
    pub fn losing_frames(self, count: usize) -> Self {
        self.with_frames(std::iter::repeat_n(FrameFate::Lost, count))
    }

    /// Frame attempts seen so far.
    pub fn frame_draws(&self) -> usize {
        self.frame_draws
    }

    /// ACK/NAK emissions seen so far.
    pub fn ack_draws(&self) -> usize {
        self.ack_draws
    }

    /// Whether both scripts have been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty() && self.acks.is_empty()
    }
}

impl Channel for ScriptedChannel {
    fn frame_fate<E: Environment>(
        &mut self,
        env: &E,
        loss: Probability,
        corruption: Probability,
    ) -> FrameFate {
        self.frame_draws += 1;
        match self.frames.pop_front() {
            Some(fate) => fate,
            None => ProbabilisticChannel.frame_fate(env, loss, corruption),
        }
    }

    fn ack_lost<E: Environment>(&mut self, env: &E, ack_loss: Probability) -> bool {
        self.ack_draws += 1;
        match self.acks.pop_front() {
            Some(lost) => lost,
            None => ProbabilisticChannel.ack_lost(env, ack_loss),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimEnv;

    #[test]
    fn script_then_fallback() {
        let env = SimEnv::with_seed(1);
        let mut channel = ScriptedChannel::new().losing_frames(2).with_acks([true]);

        let zero = Probability::ZERO;
        assert_eq!(channel.frame_fate(&env, zero, zero), FrameFate::Lost);
        assert_eq!(channel.frame_fate(&env, zero, zero), FrameFate::Lost);
        assert_eq!(channel.frame_fate(&env, zero, zero), FrameFate::Delivered);
        assert!(channel.ack_lost(&env, zero));
        assert!(!channel.ack_lost(&env, zero));

        assert!(channel.is_exhausted());
        assert_eq!(channel.frame_draws(), 3);
        assert_eq!(channel.ack_draws(), 2);
    }
}
