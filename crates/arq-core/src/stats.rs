//! Session statistics.
//!
//! Counters only move forward, and only in response to events recorded by
//! the session state machine. They survive stop/start and are cleared by an
//! explicit reset.

/// Counter-changing protocol events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatEvent {
    /// A data frame was put on the link (first send or retransmission).
    FrameSent,
    /// A frame was accepted in order by the receiver.
    FrameReceived,
    /// A data frame was lost.
    FrameLost,
    /// A data frame arrived corrupted.
    FrameCorrupted,
    /// An ACK or NAK was lost.
    AckLost,
    /// The receiver discarded a frame it had already accepted.
    DuplicateDiscarded,
    /// The sender resent a frame after a timeout or NAK.
    Retransmission,
}

/// Cumulative counters of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    /// Frames transmitted, including retransmissions.
    pub sent: u64,
    /// Frames accepted in order by the receiver.
    pub received: u64,
    /// Frames lost on the forward channel.
    pub lost: u64,
    /// Frames that arrived corrupted.
    pub corrupted: u64,
    /// ACKs and NAKs lost on the reverse channel.
    pub acks_lost: u64,
    /// Duplicate frames discarded by the receiver.
    pub duplicates_discarded: u64,
    /// Retransmissions triggered by a timeout or NAK.
    pub retransmissions: u64,
}

impl Statistics {
    /// Count one event.
    pub fn record(&mut self, event: StatEvent) {
        let counter = match event {
            StatEvent::FrameSent => &mut self.sent,
            StatEvent::FrameReceived => &mut self.received,
            StatEvent::FrameLost => &mut self.lost,
            StatEvent::FrameCorrupted => &mut self.corrupted,
            StatEvent::AckLost => &mut self.acks_lost,
            StatEvent::DuplicateDiscarded => &mut self.duplicates_discarded,
            StatEvent::Retransmission => &mut self.retransmissions,
        };
        *counter = counter.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_touches_only_its_counter() {
        let mut stats = Statistics::default();
        stats.record(StatEvent::AckLost);
        stats.record(StatEvent::AckLost);
        stats.record(StatEvent::Retransmission);

        assert_eq!(
            stats,
            Statistics { acks_lost: 2, retransmissions: 1, ..Statistics::default() }
        );
    }
}
