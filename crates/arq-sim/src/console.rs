//! Console presentation.
//!
//! Renders every observer callback as one ASCII line and emits it through
//! `tracing`, so the fmt subscriber in `main` prints a timestamped log of the
//! session. Error-severity lines go out at `warn`, everything else at `info`.

use std::time::Duration;

use arq_core::{AckKind, Frame, Observer, SeqBit, Severity, Statistics};

/// Tag shown in front of a log line.
pub fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "[ OK ]",
        Severity::Sent => "[SEND]",
        Severity::Received => "[RECV]",
        Severity::Ack => "[ACK ]",
        Severity::Timeout => "[TIME]",
        Severity::Error => "[FAIL]",
    }
}

/// Sender-to-receiver arrow for a frame attempt.
pub fn render_frame_sent(frame: &Frame, lost: bool, corrupted: bool) -> String {
    let fate = if lost {
        " x  lost"
    } else if corrupted {
        " ~> corrupted"
    } else {
        "->"
    };
    format!("sender  ==[{} '{}']=={}", frame.seq, frame.payload, fate)
}

/// Receiver-to-sender arrow for an ACK/NAK.
pub fn render_ack_sent(bit: SeqBit, kind: AckKind, lost: bool) -> String {
    let fate = if lost { " x  lost" } else { "" };
    format!("receiver <=[{kind} {bit}]=={fate}")
}

/// One-line counter summary.
pub fn render_stats(stats: &Statistics) -> String {
    format!(
        "sent={} received={} lost={} corrupted={} acks_lost={} duplicates={} retransmissions={}",
        stats.sent,
        stats.received,
        stats.lost,
        stats.corrupted,
        stats.acks_lost,
        stats.duplicates_discarded,
        stats.retransmissions
    )
}

/// Observer that renders to the tracing log.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    stats: Statistics,
    completed: Option<(Duration, usize)>,
}

impl ConsoleObserver {
    /// Fresh console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last statistics snapshot shown.
    pub fn stats(&self) -> Statistics {
        self.stats
    }

    /// Elapsed time and frame count, once the session completed.
    pub fn completed(&self) -> Option<(Duration, usize)> {
        self.completed
    }
}

impl Observer for ConsoleObserver {
    fn on_frame_sent(&mut self, frame: &Frame, lost: bool, corrupted: bool) {
        tracing::debug!("{}", render_frame_sent(frame, lost, corrupted));
    }

    fn on_ack_sent(&mut self, bit: SeqBit, kind: AckKind, lost: bool) {
        tracing::debug!("{}", render_ack_sent(bit, kind, lost));
    }

    fn on_stats_changed(&mut self, stats: &Statistics) {
        self.stats = *stats;
        tracing::debug!("{}", render_stats(stats));
    }

    fn on_session_completed(&mut self, elapsed: Duration, frame_count: usize) {
        self.completed = Some((elapsed, frame_count));
        tracing::info!(
            "Total time: {:.1}s for {} frames",
            elapsed.as_secs_f64(),
            frame_count
        );
    }

    fn on_reset(&mut self) {
        *self = Self::default();
    }

    fn on_log(&mut self, message: &str, severity: Severity) {
        let tag = severity_tag(severity);
        if severity == Severity::Error {
            tracing::warn!("{tag} {message}");
        } else {
            tracing::info!("{tag} {message}");
        }
    }
}
