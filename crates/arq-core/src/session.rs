//! Stop-and-Wait session state machine.
//!
//! The session owns the frames, the sender cursor, the receiver's expected
//! bit and the statistics. It is Sans-IO: commands and timeline events go in,
//! [`SessionAction`]s come out, and the caller schedules, cancels and renders.
//!
//! ```text
//!          start                 frame sent
//!  Idle ──────────▶ Sending ─────────────────▶ AwaitingAck
//!                     ▲   ▲                        │
//!                     │   └── ACK/NAK + pacing ────┤
//!                     └────── timeout ─────────────┘
//!                     cursor == frames ──▶ Completed
//!  Sending/AwaitingAck ── stop ──▶ Stopped
//! ```
//!
//! # Invariants
//!
//! - `cursor <= frames.len()`; the session completes exactly when they meet.
//! - The expected bit flips only on an in-order, uncorrupted delivery.
//! - At most one retransmission timeout is pending; arming cancels the old one.
//! - Only one frame is in flight. Frame `k + 1` is never sent before frame `k`
//!   is acknowledged.
//! - Every start, stop and reset moves to a new generation. Events scheduled
//!   by an older generation are ignored.

use std::time::Duration;

use crate::{
    channel::{Channel, FrameFate},
    config::SessionConfig,
    env::Environment,
    frame::{Ack, AckKind, Frame, SeqBit},
    observer::{Notification, Severity},
    sequencer::sequence_frames,
    stats::{StatEvent, Statistics},
};

/// Identifies one armed retransmission timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerToken(pub(crate) u64);

/// Lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Nothing started since creation or reset.
    #[default]
    Idle,
    /// The frame at the cursor is about to be (re)transmitted.
    Sending,
    /// A frame is on the link; waiting for its ACK/NAK or the timeout.
    AwaitingAck,
    /// Every frame was delivered and acknowledged.
    Completed,
    /// Stopped by command before completion.
    Stopped,
}

/// Delayed event fed back into the session by the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Pacing delay elapsed; transmit the frame at the cursor.
    Transmit,
    /// Frame `index` reached the receiver.
    FrameArrived {
        /// Index of the frame in the session.
        index: usize,
        /// Whether it failed its integrity check.
        corrupted: bool,
    },
    /// An ACK/NAK was lost in transit.
    AckDropped {
        /// The lost acknowledgment.
        ack: Ack,
    },
    /// An ACK/NAK reached the sender.
    AckArrived {
        /// The acknowledgment.
        ack: Ack,
    },
    /// The retransmission timeout fired.
    TimeoutFired {
        /// Timer that fired.
        token: TimerToken,
    },
}

/// Side effect requested by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    /// Deliver `event` back to the session after `delay`.
    Schedule {
        /// Generation the event belongs to.
        generation: u64,
        /// Delay from now.
        delay: Duration,
        /// Event to deliver.
        event: SessionEvent,
    },
    /// Arm the retransmission timeout.
    ArmTimeout {
        /// Generation the timer belongs to.
        generation: u64,
        /// Handle used to cancel it.
        token: TimerToken,
        /// Timeout interval.
        delay: Duration,
    },
    /// Cancel a previously armed timeout.
    CancelTimeout {
        /// Timer to cancel.
        token: TimerToken,
    },
    /// Cancel every pending event and timer.
    CancelAll,
    /// Report to the presentation layer.
    Notify(Notification),
}

/// Stop-and-Wait sender/receiver pair over a simulated channel.
///
/// # Type Parameters
///
/// - `E`: Environment providing the randomness behind every channel draw
/// - `C`: Channel deciding the fate of each transmission
pub struct Session<E: Environment, C: Channel> {
    env: E,
    channel: C,
    config: SessionConfig,
    frames: Vec<Frame>,
    /// Index of the frame being sent and awaiting acknowledgment.
    cursor: usize,
    /// Receiver side: bit of the next frame it will accept.
    expected: SeqBit,
    state: SessionState,
    generation: u64,
    pending_timeout: Option<TimerToken>,
    next_token: u64,
    started_at: Duration,
    stats: Statistics,
}

impl<E: Environment, C: Channel> Session<E, C> {
    /// Create an idle session.
    pub fn new(env: E, channel: C) -> Self {
        Self {
            env,
            channel,
            config: SessionConfig::default(),
            frames: Vec::new(),
            cursor: 0,
            expected: SeqBit::Zero,
            state: SessionState::Idle,
            generation: 0,
            pending_timeout: None,
            next_token: 0,
            started_at: Duration::ZERO,
            stats: Statistics::default(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Cumulative statistics.
    pub fn stats(&self) -> Statistics {
        self.stats
    }

    /// Index of the frame currently being sent.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bit the receiver will accept next.
    pub fn expected_bit(&self) -> SeqBit {
        self.expected
    }

    /// Frames of the current (or last) run.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at the cursor, if any remain.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.get(self.cursor)
    }

    /// Configuration of the current (or last) run.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current generation. Changes on every start, stop and reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The armed retransmission timeout, if any.
    pub fn pending_timeout(&self) -> Option<TimerToken> {
        self.pending_timeout
    }

    /// Whether a transmission is in progress.
    pub fn is_transmitting(&self) -> bool {
        matches!(self.state, SessionState::Sending | SessionState::AwaitingAck)
    }

    /// Environment used for channel draws.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Channel deciding transmission fates.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Start transmitting `config.payload` at virtual time `now`.
    ///
    /// Frames are re-sequenced and the cursor and expected bit return to 0.
    /// Statistics are kept. Ignored while a transmission is in progress.
    pub fn start(&mut self, now: Duration, config: SessionConfig) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        if self.is_transmitting() {
            tracing::warn!("start ignored, transmission already in progress");
            log(&mut actions, Severity::Error, "Transmission already in progress".to_string());
            return actions;
        }

        let before = self.stats;
        self.generation += 1;
        self.pending_timeout = None;
        actions.push(SessionAction::CancelAll);

        self.frames = sequence_frames(&config.payload);
        self.cursor = 0;
        self.expected = SeqBit::Zero;
        self.config = config;
        self.started_at = now;
        self.transition(SessionState::Sending);

        tracing::info!(
            frames = self.frames.len(),
            generation = self.generation,
            loss = %self.config.loss,
            corruption = %self.config.corruption,
            ack_loss = %self.config.ack_loss,
            "transmission started"
        );
        log(&mut actions, Severity::Success, "Transmission started".to_string());

        self.transmit(now, &mut actions);
        self.finish(before, actions)
    }

    /// Stop the transmission and cancel everything still pending.
    pub fn stop(&mut self) -> Vec<SessionAction> {
        let mut actions = vec![SessionAction::CancelAll];
        self.generation += 1;
        self.pending_timeout = None;

        if self.is_transmitting() {
            self.transition(SessionState::Stopped);
            tracing::info!(cursor = self.cursor, "transmission stopped");
            log(&mut actions, Severity::Error, "Transmission stopped".to_string());
        }

        actions
    }

    /// Stop, then clear statistics, frames, cursor and expected bit.
    pub fn reset(&mut self) -> Vec<SessionAction> {
        let mut actions = self.stop();

        self.stats = Statistics::default();
        self.frames.clear();
        self.cursor = 0;
        self.expected = SeqBit::Zero;
        self.transition(SessionState::Idle);

        actions.push(SessionAction::Notify(Notification::StatsChanged(self.stats)));
        actions.push(SessionAction::Notify(Notification::SessionReset));
        actions
    }

    /// Process a timeline event that fired at virtual time `now`.
    ///
    /// Events from another generation, and any event while no transmission
    /// is in progress, produce no actions.
    pub fn handle(
        &mut self,
        now: Duration,
        generation: u64,
        event: SessionEvent,
    ) -> Vec<SessionAction> {
        if generation != self.generation || !self.is_transmitting() {
            tracing::trace!(?event, generation, current = self.generation, "stale event ignored");
            return Vec::new();
        }

        let before = self.stats;
        let mut actions = Vec::new();

        match event {
            SessionEvent::Transmit => self.transmit(now, &mut actions),
            SessionEvent::FrameArrived { index, corrupted } => {
                self.handle_frame_arrived(index, corrupted, &mut actions);
            },
            SessionEvent::AckDropped { ack } => self.handle_ack_dropped(ack, &mut actions),
            SessionEvent::AckArrived { ack } => self.handle_ack_arrived(ack, &mut actions),
            SessionEvent::TimeoutFired { token } => self.handle_timeout(now, token, &mut actions),
        }

        self.finish(before, actions)
    }

    /// Send the frame at the cursor, or complete if none remain.
    fn transmit(&mut self, now: Duration, actions: &mut Vec<SessionAction>) {
        let Some(frame) = self.frames.get(self.cursor).copied() else {
            self.complete(now, actions);
            return;
        };

        self.stats.record(StatEvent::FrameSent);
        log(
            actions,
            Severity::Sent,
            format!("Sending Frame {} [Data: '{}']", frame.seq, frame.payload),
        );

        let fate = self.channel.frame_fate(&self.env, self.config.loss, self.config.corruption);
        tracing::debug!(index = frame.index, seq = %frame.seq, ?fate, "frame transmitted");
        actions.push(SessionAction::Notify(Notification::FrameSent {
            frame,
            lost: fate == FrameFate::Lost,
            corrupted: fate == FrameFate::Corrupted,
        }));
        self.transition(SessionState::AwaitingAck);

        match fate {
            FrameFate::Lost => {
                self.stats.record(StatEvent::FrameLost);
                log(actions, Severity::Error, format!("Frame {} lost in transmission!", frame.seq));
                self.arm_timeout(actions);
            },
            FrameFate::Corrupted => {
                self.stats.record(StatEvent::FrameCorrupted);
                self.schedule(
                    actions,
                    self.config.timing.frame_transit,
                    SessionEvent::FrameArrived { index: frame.index, corrupted: true },
                );
            },
            FrameFate::Delivered => {
                self.schedule(
                    actions,
                    self.config.timing.frame_transit,
                    SessionEvent::FrameArrived { index: frame.index, corrupted: false },
                );
            },
        }
    }

    /// Receiver side: check the frame and answer with an ACK or NAK.
    fn handle_frame_arrived(
        &mut self,
        index: usize,
        corrupted: bool,
        actions: &mut Vec<SessionAction>,
    ) {
        let Some(frame) = self.frames.get(index).copied() else {
            tracing::trace!(index, "arrival for unknown frame ignored");
            return;
        };

        if corrupted {
            let observed = self.channel.garble(&self.env, frame.payload);
            log(
                actions,
                Severity::Error,
                format!("Frame {} corrupted! Data received: '{}'", frame.seq, observed),
            );
            actions.push(SessionAction::Notify(Notification::FrameReceived {
                frame,
                observed,
                corrupted: true,
                duplicate: false,
            }));
            log(actions, Severity::Error, format!("NAK sent for Frame {}", frame.seq));
            self.emit_ack(Ack { bit: frame.seq, kind: AckKind::Nak }, actions);
        } else if frame.seq == self.expected {
            self.stats.record(StatEvent::FrameReceived);
            actions.push(SessionAction::Notify(Notification::FrameReceived {
                frame,
                observed: frame.payload,
                corrupted: false,
                duplicate: false,
            }));
            log(
                actions,
                Severity::Received,
                format!("Frame {} received successfully [Data: '{}']", frame.seq, frame.payload),
            );
            self.expected = self.expected.flip();
            self.emit_ack(Ack { bit: frame.seq, kind: AckKind::Ack }, actions);
        } else {
            // Already accepted: its ACK was lost. Re-confirm so the sender can move on.
            self.stats.record(StatEvent::DuplicateDiscarded);
            actions.push(SessionAction::Notify(Notification::FrameReceived {
                frame,
                observed: frame.payload,
                corrupted: false,
                duplicate: true,
            }));
            let bit = frame.seq.flip();
            log(
                actions,
                Severity::Error,
                format!("Duplicate Frame {} detected, discarding", frame.seq),
            );
            log(actions, Severity::Ack, format!("Sending ACK {bit} for previously received frame"));
            self.emit_ack(Ack { bit, kind: AckKind::Ack }, actions);
        }
    }

    /// Put an ACK/NAK on the reverse channel.
    fn emit_ack(&mut self, ack: Ack, actions: &mut Vec<SessionAction>) {
        let lost = self.channel.ack_lost(&self.env, self.config.ack_loss);
        tracing::debug!(%ack, lost, "acknowledgment emitted");
        actions.push(SessionAction::Notify(Notification::AckSent {
            bit: ack.bit,
            kind: ack.kind,
            lost,
        }));

        if lost {
            self.schedule(actions, self.config.timing.ack_loss_point, SessionEvent::AckDropped {
                ack,
            });
        } else {
            self.schedule(actions, self.config.timing.ack_transit, SessionEvent::AckArrived { ack });
        }
    }

    fn handle_ack_dropped(&mut self, ack: Ack, actions: &mut Vec<SessionAction>) {
        self.stats.record(StatEvent::AckLost);
        log(actions, Severity::Error, format!("{ack} lost in transmission!"));
        self.arm_timeout(actions);
    }

    /// Sender side: advance on ACK, resend on NAK.
    fn handle_ack_arrived(&mut self, ack: Ack, actions: &mut Vec<SessionAction>) {
        self.clear_timeout(actions);
        actions.push(SessionAction::Notify(Notification::AckReceived {
            bit: ack.bit,
            kind: ack.kind,
        }));

        match ack.kind {
            AckKind::Nak => {
                log(actions, Severity::Timeout, format!("{ack} received, retransmitting..."));
                self.stats.record(StatEvent::Retransmission);
            },
            AckKind::Ack => {
                log(actions, Severity::Ack, format!("{ack} received"));
                self.cursor = (self.cursor + 1).min(self.frames.len());
            },
        }

        self.transition(SessionState::Sending);
        self.schedule(actions, self.config.timing.pacing, SessionEvent::Transmit);
    }

    fn handle_timeout(&mut self, now: Duration, token: TimerToken, actions: &mut Vec<SessionAction>) {
        if self.pending_timeout != Some(token) {
            tracing::trace!(?token, "stale timeout ignored");
            return;
        }
        self.pending_timeout = None;

        let Some(frame) = self.frames.get(self.cursor).copied() else {
            return;
        };

        log(actions, Severity::Timeout, format!("Timeout! Retransmitting Frame {}", frame.seq));
        self.stats.record(StatEvent::Retransmission);
        actions.push(SessionAction::Notify(Notification::Timeout { frame }));

        self.transition(SessionState::Sending);
        self.transmit(now, actions);
    }

    fn complete(&mut self, now: Duration, actions: &mut Vec<SessionAction>) {
        self.transition(SessionState::Completed);

        let elapsed = now.saturating_sub(self.started_at);
        let frame_count = self.frames.len();
        let stats = self.stats;
        tracing::info!(frame_count, ?elapsed, ?stats, "transmission completed");

        log(
            actions,
            Severity::Success,
            format!("Transmission completed successfully! All {frame_count} frames delivered."),
        );
        log(
            actions,
            Severity::Success,
            format!(
                "Summary: {} retransmissions, {} duplicates discarded",
                stats.retransmissions, stats.duplicates_discarded
            ),
        );
        log(
            actions,
            Severity::Success,
            format!(
                "Losses: {} frames, {} ACKs, {} corrupted",
                stats.lost, stats.acks_lost, stats.corrupted
            ),
        );
        actions.push(SessionAction::Notify(Notification::SessionCompleted { elapsed, frame_count }));
    }

    /// Arm a fresh timeout, cancelling the previous one.
    fn arm_timeout(&mut self, actions: &mut Vec<SessionAction>) {
        self.clear_timeout(actions);

        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending_timeout = Some(token);

        actions.push(SessionAction::ArmTimeout {
            generation: self.generation,
            token,
            delay: self.config.timeout,
        });
    }

    fn clear_timeout(&mut self, actions: &mut Vec<SessionAction>) {
        if let Some(token) = self.pending_timeout.take() {
            actions.push(SessionAction::CancelTimeout { token });
        }
    }

    fn schedule(&self, actions: &mut Vec<SessionAction>, delay: Duration, event: SessionEvent) {
        actions.push(SessionAction::Schedule { generation: self.generation, delay, event });
    }

    fn transition(&mut self, to: SessionState) {
        if self.state != to {
            tracing::debug!(from = ?self.state, ?to, "session state");
            self.state = to;
        }
    }

    /// Append a statistics snapshot if any counter moved.
    fn finish(&self, before: Statistics, mut actions: Vec<SessionAction>) -> Vec<SessionAction> {
        if self.stats != before {
            actions.push(SessionAction::Notify(Notification::StatsChanged(self.stats)));
        }
        actions
    }
}

fn log(actions: &mut Vec<SessionAction>, severity: Severity, message: String) {
    tracing::debug!(?severity, "{message}");
    actions.push(SessionAction::Notify(Notification::Log { severity, message }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        channel::{Probability, ProbabilisticChannel},
        testing::FixedEnv,
    };

    fn session(env: FixedEnv) -> Session<FixedEnv, ProbabilisticChannel> {
        Session::new(env, ProbabilisticChannel)
    }

    fn scheduled(actions: &[SessionAction]) -> Vec<SessionEvent> {
        actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::Schedule { event, .. } => Some(*event),
                _ => None,
            })
            .collect()
    }

    fn armed(actions: &[SessionAction]) -> Vec<TimerToken> {
        actions
            .iter()
            .filter_map(|a| match a {
                SessionAction::ArmTimeout { token, .. } => Some(*token),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_sends_first_frame() {
        let mut s = session(FixedEnv::never_hit());
        let actions = s.start(Duration::ZERO, SessionConfig::lossless("HI"));

        assert_eq!(s.state(), SessionState::AwaitingAck);
        assert_eq!(s.stats().sent, 1);
        assert_eq!(scheduled(&actions), vec![SessionEvent::FrameArrived {
            index: 0,
            corrupted: false
        }]);
        assert!(actions.contains(&SessionAction::Notify(Notification::FrameSent {
            frame: Frame::new(0, 'H'),
            lost: false,
            corrupted: false,
        })));
    }

    #[test]
    fn lost_frame_arms_timeout_and_timeout_resends_same_frame() {
        let mut s = session(FixedEnv::always_hit());
        let config = SessionConfig { loss: Probability::MAX, ..SessionConfig::lossless("A") };
        let actions = s.start(Duration::ZERO, config);

        assert_eq!(s.stats().lost, 1);
        let tokens = armed(&actions);
        assert_eq!(tokens.len(), 1);
        assert_eq!(s.pending_timeout(), Some(tokens[0]));

        let g = s.generation();
        let actions =
            s.handle(Duration::from_secs(3), g, SessionEvent::TimeoutFired { token: tokens[0] });

        assert_eq!(s.stats().retransmissions, 1);
        assert_eq!(s.stats().sent, 2);
        assert_eq!(s.cursor(), 0);
        assert!(actions.contains(&SessionAction::Notify(Notification::Timeout {
            frame: Frame::new(0, 'A')
        })));
    }

    #[test]
    fn stale_timeout_token_is_ignored() {
        let mut s = session(FixedEnv::always_hit());
        let config = SessionConfig { loss: Probability::MAX, ..SessionConfig::lossless("A") };
        s.start(Duration::ZERO, config);

        let g = s.generation();
        let actions = s.handle(Duration::ZERO, g, SessionEvent::TimeoutFired {
            token: TimerToken(99),
        });

        assert!(actions.is_empty());
        assert_eq!(s.stats().retransmissions, 0);
    }

    #[test]
    fn corrupted_frame_is_nakked_and_nak_triggers_resend() {
        let mut s = session(FixedEnv::always_hit());
        let config = SessionConfig { corruption: Probability::MAX, ..SessionConfig::lossless("A") };
        s.start(Duration::ZERO, config);
        assert_eq!(s.stats().corrupted, 1);

        let g = s.generation();
        let actions =
            s.handle(Duration::ZERO, g, SessionEvent::FrameArrived { index: 0, corrupted: true });
        let nak = Ack { bit: SeqBit::Zero, kind: AckKind::Nak };
        assert_eq!(scheduled(&actions), vec![SessionEvent::AckArrived { ack: nak }]);
        assert_eq!(s.expected_bit(), SeqBit::Zero);

        let actions = s.handle(Duration::ZERO, g, SessionEvent::AckArrived { ack: nak });
        assert_eq!(s.stats().retransmissions, 1);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.state(), SessionState::Sending);
        assert_eq!(scheduled(&actions), vec![SessionEvent::Transmit]);
    }

    #[test]
    fn duplicate_is_discarded_and_reacknowledged_with_other_bit() {
        let mut s = session(FixedEnv::never_hit());
        s.start(Duration::ZERO, SessionConfig::lossless("HI"));
        let g = s.generation();

        s.handle(Duration::ZERO, g, SessionEvent::FrameArrived { index: 0, corrupted: false });
        assert_eq!(s.stats().received, 1);
        assert_eq!(s.expected_bit(), SeqBit::One);

        let actions =
            s.handle(Duration::ZERO, g, SessionEvent::FrameArrived { index: 0, corrupted: false });
        assert_eq!(s.stats().received, 1);
        assert_eq!(s.stats().duplicates_discarded, 1);
        assert_eq!(s.expected_bit(), SeqBit::One);
        assert_eq!(scheduled(&actions), vec![SessionEvent::AckArrived {
            ack: Ack { bit: SeqBit::One, kind: AckKind::Ack }
        }]);
    }

    #[test]
    fn lost_ack_arms_timeout_after_loss_point() {
        let mut s = session(FixedEnv::always_hit());
        let config = SessionConfig { ack_loss: Probability::MAX, ..SessionConfig::lossless("A") };
        s.start(Duration::ZERO, config);
        let g = s.generation();

        let actions =
            s.handle(Duration::ZERO, g, SessionEvent::FrameArrived { index: 0, corrupted: false });
        let ack = Ack { bit: SeqBit::Zero, kind: AckKind::Ack };
        assert_eq!(scheduled(&actions), vec![SessionEvent::AckDropped { ack }]);
        assert!(actions.iter().any(|a| matches!(
            a,
            SessionAction::Schedule { delay, .. } if *delay == Duration::from_millis(1000)
        )));

        let actions = s.handle(Duration::ZERO, g, SessionEvent::AckDropped { ack });
        assert_eq!(s.stats().acks_lost, 1);
        assert_eq!(armed(&actions).len(), 1);
    }

    #[test]
    fn rearming_cancels_previous_timeout() {
        let mut s = session(FixedEnv::always_hit());
        let config = SessionConfig {
            loss: Probability::MAX,
            ack_loss: Probability::MAX,
            ..SessionConfig::lossless("A")
        };
        let actions = s.start(Duration::ZERO, config);
        let first = armed(&actions)[0];

        let g = s.generation();
        let ack = Ack { bit: SeqBit::Zero, kind: AckKind::Ack };
        let actions = s.handle(Duration::ZERO, g, SessionEvent::AckDropped { ack });

        assert!(actions.contains(&SessionAction::CancelTimeout { token: first }));
        assert_eq!(armed(&actions).len(), 1);
        assert_ne!(s.pending_timeout(), Some(first));
    }

    #[test]
    fn completes_after_last_ack_and_pacing() {
        let mut s = session(FixedEnv::never_hit());
        s.start(Duration::ZERO, SessionConfig::lossless("A"));
        let g = s.generation();

        s.handle(Duration::ZERO, g, SessionEvent::FrameArrived { index: 0, corrupted: false });
        let ack = Ack { bit: SeqBit::Zero, kind: AckKind::Ack };
        s.handle(Duration::from_secs(4), g, SessionEvent::AckArrived { ack });
        assert_eq!(s.cursor(), 1);

        let actions = s.handle(Duration::from_secs(5), g, SessionEvent::Transmit);
        assert_eq!(s.state(), SessionState::Completed);
        assert!(actions.contains(&SessionAction::Notify(Notification::SessionCompleted {
            elapsed: Duration::from_secs(5),
            frame_count: 1,
        })));
    }

    #[test]
    fn stop_invalidates_pending_events() {
        let mut s = session(FixedEnv::never_hit());
        s.start(Duration::ZERO, SessionConfig::lossless("HI"));
        let old = s.generation();

        let actions = s.stop();
        assert_eq!(actions[0], SessionAction::CancelAll);
        assert_eq!(s.state(), SessionState::Stopped);

        let actions =
            s.handle(Duration::ZERO, old, SessionEvent::FrameArrived { index: 0, corrupted: false });
        assert!(actions.is_empty());
        assert_eq!(s.stats().received, 0);
    }

    #[test]
    fn restart_keeps_stats_and_resets_cursor() {
        let mut s = session(FixedEnv::never_hit());
        s.start(Duration::ZERO, SessionConfig::lossless("HI"));
        let g = s.generation();
        s.handle(Duration::ZERO, g, SessionEvent::FrameArrived { index: 0, corrupted: false });
        s.handle(Duration::ZERO, g, SessionEvent::AckArrived {
            ack: Ack { bit: SeqBit::Zero, kind: AckKind::Ack },
        });
        assert_eq!(s.cursor(), 1);
        s.stop();

        s.start(Duration::ZERO, SessionConfig::lossless("OK"));
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.expected_bit(), SeqBit::Zero);
        assert_eq!(s.stats().sent, 2);
        assert_eq!(s.stats().received, 1);
    }

    #[test]
    fn start_while_transmitting_is_ignored() {
        let mut s = session(FixedEnv::never_hit());
        s.start(Duration::ZERO, SessionConfig::lossless("HI"));
        let g = s.generation();

        let actions = s.start(Duration::ZERO, SessionConfig::lossless("OTHER"));
        assert_eq!(s.generation(), g);
        assert_eq!(s.frames().len(), 2);
        assert!(matches!(
            actions.as_slice(),
            [SessionAction::Notify(Notification::Log { severity: Severity::Error, .. })]
        ));
    }

    #[test]
    fn reset_clears_stats() {
        let mut s = session(FixedEnv::never_hit());
        s.start(Duration::ZERO, SessionConfig::lossless("HI"));

        let actions = s.reset();
        assert_eq!(s.stats(), Statistics::default());
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.frames().is_empty());
        assert_eq!(actions.last(), Some(&SessionAction::Notify(Notification::SessionReset)));
    }
}
