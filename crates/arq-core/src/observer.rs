//! Presentation-layer collaborator.
//!
//! The core never renders anything. It reports what happened as
//! [`Notification`]s, and the driver dispatches them to an [`Observer`]. An
//! observer can be dropped entirely (`()`) without affecting the protocol.

use std::time::Duration;

use crate::{
    frame::{AckKind, Frame, SeqBit},
    stats::Statistics,
};

/// Category of a log line, mirroring how the presentation styles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Session milestones (started, completed, summaries).
    Success,
    /// A frame was put on the link.
    Sent,
    /// A frame was accepted by the receiver.
    Received,
    /// An acknowledgment was handled.
    Ack,
    /// A timeout fired or a NAK forced a resend.
    Timeout,
    /// Loss, corruption, duplicates, stops and input problems.
    Error,
}

/// Event reported by the core to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A frame was transmitted; `lost`/`corrupted` give its fate.
    FrameSent {
        /// Frame transmitted.
        frame: Frame,
        /// Frame will never arrive.
        lost: bool,
        /// Frame will arrive corrupted.
        corrupted: bool,
    },
    /// The receiver emitted an ACK or NAK.
    AckSent {
        /// Bit acknowledged.
        bit: SeqBit,
        /// ACK or NAK.
        kind: AckKind,
        /// The acknowledgment will not reach the sender.
        lost: bool,
    },
    /// A frame reached the receiver.
    FrameReceived {
        /// Frame as sent.
        frame: Frame,
        /// Character the receiver actually saw.
        observed: char,
        /// Failed integrity check (a NAK follows).
        corrupted: bool,
        /// Already accepted earlier and discarded.
        duplicate: bool,
    },
    /// An ACK or NAK reached the sender.
    AckReceived {
        /// Bit acknowledged.
        bit: SeqBit,
        /// ACK or NAK.
        kind: AckKind,
    },
    /// The retransmission timeout fired for `frame`.
    Timeout {
        /// Frame about to be resent.
        frame: Frame,
    },
    /// Counters changed.
    StatsChanged(Statistics),
    /// All frames were delivered and acknowledged.
    SessionCompleted {
        /// Simulated time from start to completion.
        elapsed: Duration,
        /// Number of frames delivered.
        frame_count: usize,
    },
    /// Statistics and session were cleared.
    SessionReset,
    /// Human-readable log line.
    Log {
        /// Styling category.
        severity: Severity,
        /// Message text.
        message: String,
    },
}

impl Notification {
    /// Deliver this notification to the matching observer callback.
    pub fn dispatch<O: Observer + ?Sized>(&self, observer: &mut O) {
        match self {
            Self::FrameSent { frame, lost, corrupted } => {
                observer.on_frame_sent(frame, *lost, *corrupted);
            },
            Self::AckSent { bit, kind, lost } => observer.on_ack_sent(*bit, *kind, *lost),
            Self::FrameReceived { frame, observed, corrupted, duplicate } => {
                observer.on_frame_received(frame, *observed, *corrupted, *duplicate);
            },
            Self::AckReceived { bit, kind } => observer.on_ack_received(*bit, *kind),
            Self::Timeout { frame } => observer.on_timeout(frame),
            Self::StatsChanged(stats) => observer.on_stats_changed(stats),
            Self::SessionCompleted { elapsed, frame_count } => {
                observer.on_session_completed(*elapsed, *frame_count);
            },
            Self::SessionReset => observer.on_reset(),
            Self::Log { severity, message } => observer.on_log(message, *severity),
        }
    }
}

/// Receives core events. Every callback defaults to doing nothing.
pub trait Observer {
    /// A frame was transmitted.
    fn on_frame_sent(&mut self, _frame: &Frame, _lost: bool, _corrupted: bool) {}

    /// The receiver emitted an ACK or NAK.
    fn on_ack_sent(&mut self, _bit: SeqBit, _kind: AckKind, _lost: bool) {}

    /// A frame reached the receiver.
    fn on_frame_received(
        &mut self,
        _frame: &Frame,
        _observed: char,
        _corrupted: bool,
        _duplicate: bool,
    ) {
    }

    /// An acknowledgment reached the sender.
    fn on_ack_received(&mut self, _bit: SeqBit, _kind: AckKind) {}

    /// The retransmission timeout fired.
    fn on_timeout(&mut self, _frame: &Frame) {}

    /// Counters changed.
    fn on_stats_changed(&mut self, _stats: &Statistics) {}

    /// The session delivered every frame.
    fn on_session_completed(&mut self, _elapsed: Duration, _frame_count: usize) {}

    /// Session and statistics were cleared.
    fn on_reset(&mut self) {}

    /// A log line was produced.
    fn on_log(&mut self, _message: &str, _severity: Severity) {}
}

impl Observer for () {}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn on_frame_sent(&mut self, frame: &Frame, lost: bool, corrupted: bool) {
        (**self).on_frame_sent(frame, lost, corrupted);
    }

    fn on_ack_sent(&mut self, bit: SeqBit, kind: AckKind, lost: bool) {
        (**self).on_ack_sent(bit, kind, lost);
    }

    fn on_frame_received(&mut self, frame: &Frame, observed: char, corrupted: bool, duplicate: bool) {
        (**self).on_frame_received(frame, observed, corrupted, duplicate);
    }

    fn on_ack_received(&mut self, bit: SeqBit, kind: AckKind) {
        (**self).on_ack_received(bit, kind);
    }

    fn on_timeout(&mut self, frame: &Frame) {
        (**self).on_timeout(frame);
    }

    fn on_stats_changed(&mut self, stats: &Statistics) {
        (**self).on_stats_changed(stats);
    }

    fn on_session_completed(&mut self, elapsed: Duration, frame_count: usize) {
        (**self).on_session_completed(elapsed, frame_count);
    }

    fn on_reset(&mut self) {
        (**self).on_reset();
    }

    fn on_log(&mut self, message: &str, severity: Severity) {
        (**self).on_log(message, severity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        timeouts: usize,
        logs: Vec<(String, Severity)>,
    }

    impl Observer for Counting {
        fn on_timeout(&mut self, _frame: &Frame) {
            self.timeouts += 1;
        }

        fn on_log(&mut self, message: &str, severity: Severity) {
            self.logs.push((message.to_string(), severity));
        }
    }

    #[test]
    fn dispatch_routes_to_matching_callback() {
        let mut observer = Counting::default();
        let frame = Frame::new(0, 'H');

        Notification::Timeout { frame }.dispatch(&mut observer);
        Notification::Log { severity: Severity::Sent, message: "hi".to_string() }
            .dispatch(&mut observer);
        Notification::SessionReset.dispatch(&mut observer);

        assert_eq!(observer.timeouts, 1);
        assert_eq!(observer.logs, vec![("hi".to_string(), Severity::Sent)]);
    }
}
