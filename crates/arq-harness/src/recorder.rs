//! Observer that records every notification for later assertions.

use std::time::Duration;

use arq_core::{AckKind, Frame, Notification, Observer, SeqBit, Severity, Statistics};

/// Records notifications in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Vec<Notification>,
}

impl RecordingObserver {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification received so far.
    pub fn events(&self) -> &[Notification] {
        &self.events
    }

    /// Log messages, in order.
    pub fn logs(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|n| match n {
                Notification::Log { message, .. } => Some(message.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Log messages of one severity.
    pub fn logs_with(&self, severity: Severity) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|n| match n {
                Notification::Log { severity: s, message } if *s == severity => {
                    Some(message.as_str())
                },
                _ => None,
            })
            .collect()
    }

    /// Frames accepted in order by the receiver.
    pub fn accepted(&self) -> Vec<Frame> {
        self.events
            .iter()
            .filter_map(|n| match n {
                Notification::FrameReceived { frame, corrupted: false, duplicate: false, .. } => {
                    Some(*frame)
                },
                _ => None,
            })
            .collect()
    }

    /// Payload reassembled from the accepted frames.
    pub fn delivered_payload(&self) -> String {
        self.accepted().iter().map(|f| f.payload).collect()
    }

    /// Every ACK/NAK the receiver emitted: bit, kind, and whether it was lost.
    pub fn acks_sent(&self) -> Vec<(SeqBit, AckKind, bool)> {
        self.events
            .iter()
            .filter_map(|n| match n {
                Notification::AckSent { bit, kind, lost } => Some((*bit, *kind, *lost)),
                _ => None,
            })
            .collect()
    }

    /// Frames the retransmission timeout fired for.
    pub fn timeouts(&self) -> Vec<Frame> {
        self.events
            .iter()
            .filter_map(|n| match n {
                Notification::Timeout { frame } => Some(*frame),
                _ => None,
            })
            .collect()
    }

    /// Elapsed time and frame count of the last completed session.
    pub fn completion(&self) -> Option<(Duration, usize)> {
        self.events.iter().rev().find_map(|n| match n {
            Notification::SessionCompleted { elapsed, frame_count } => {
                Some((*elapsed, *frame_count))
            },
            _ => None,
        })
    }

    /// Most recent statistics snapshot.
    pub fn last_stats(&self) -> Option<Statistics> {
        self.events.iter().rev().find_map(|n| match n {
            Notification::StatsChanged(stats) => Some(*stats),
            _ => None,
        })
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Observer for RecordingObserver {
    fn on_frame_sent(&mut self, frame: &Frame, lost: bool, corrupted: bool) {
        self.events.push(Notification::FrameSent { frame: *frame, lost, corrupted });
    }

    fn on_ack_sent(&mut self, bit: SeqBit, kind: AckKind, lost: bool) {
        self.events.push(Notification::AckSent { bit, kind, lost });
    }

    fn on_frame_received(&mut self, frame: &Frame, observed: char, corrupted: bool, duplicate: bool) {
        self.events.push(Notification::FrameReceived { frame: *frame, observed, corrupted, duplicate });
    }

    fn on_ack_received(&mut self, bit: SeqBit, kind: AckKind) {
        self.events.push(Notification::AckReceived { bit, kind });
    }

    fn on_timeout(&mut self, frame: &Frame) {
        self.events.push(Notification::Timeout { frame: *frame });
    }

    fn on_stats_changed(&mut self, stats: &Statistics) {
        self.events.push(Notification::StatsChanged(*stats));
    }

    fn on_session_completed(&mut self, elapsed: Duration, frame_count: usize) {
        self.events.push(Notification::SessionCompleted { elapsed, frame_count });
    }

    fn on_reset(&mut self) {
        self.events.push(Notification::SessionReset);
    }

    fn on_log(&mut self, message: &str, severity: Severity) {
        self.events.push(Notification::Log { severity, message: message.to_string() });
    }
}
