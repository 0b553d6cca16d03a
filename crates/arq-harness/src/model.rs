//! Reference model for model-based testing.
//!
//! The model replays a fault script against an untimed, obviously-correct
//! rendition of the alternating-bit protocol and predicts the counters and
//! the delivered payload. It serves as the oracle the real session (timeline,
//! timers, generations) is checked against.
//!
//! # Design Principles
//!
//! - Simplicity: one loop, one attempt per iteration
//! - No time: timeouts and pacing only matter for ordering, which the real
//!   system serializes anyway
//! - Same script semantics as [`crate::ScriptedChannel`]: frame fates per
//!   attempt, ACK losses per emitted ACK/NAK, clean link once exhausted

use std::collections::VecDeque;

use arq_core::{FrameFate, SeqBit, Statistics, sequence_frames};

/// Per-attempt fates fed to both the model and the real channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultScript {
    /// Fate of each data-frame attempt, in order.
    pub frames: Vec<FrameFate>,
    /// Whether each emitted ACK/NAK is lost, in order.
    pub acks: Vec<bool>,
}

/// What the model predicts for a completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutcome {
    /// Final counters.
    pub stats: Statistics,
    /// Payload as accepted by the receiver.
    pub delivered: String,
    /// Sequence bits of accepted frames, in order.
    pub accepted_bits: Vec<SeqBit>,
}

/// Untimed alternating-bit link.
#[derive(Debug, Clone)]
pub struct ModelLink {
    payload: String,
}

impl ModelLink {
    /// Model for transmitting `payload` (empty means the default payload).
    pub fn new(payload: &str) -> Self {
        Self { payload: payload.to_string() }
    }

    /// Run the whole session under `script`.
    pub fn run(&self, script: &FaultScript) -> ModelOutcome {
        let frames = sequence_frames(&self.payload);
        let mut frame_fates: VecDeque<FrameFate> = script.frames.iter().copied().collect();
        let mut ack_losses: VecDeque<bool> = script.acks.iter().copied().collect();

        let mut stats = Statistics::default();
        let mut delivered = String::new();
        let mut accepted_bits = Vec::new();
        let mut expected = SeqBit::Zero;
        let mut cursor = 0;

        while let Some(frame) = frames.get(cursor) {
            stats.sent += 1;

            match frame_fates.pop_front().unwrap_or(FrameFate::Delivered) {
                FrameFate::Lost => {
                    stats.lost += 1;
                    // timeout
                    stats.retransmissions += 1;
                },
                FrameFate::Corrupted => {
                    stats.corrupted += 1;
                    if ack_losses.pop_front().unwrap_or(false) {
                        stats.acks_lost += 1;
                    }
                    // NAK or timeout, either way one resend
                    stats.retransmissions += 1;
                },
                FrameFate::Delivered => {
                    if frame.seq == expected {
                        stats.received += 1;
                        delivered.push(frame.payload);
                        accepted_bits.push(frame.seq);
                        expected = expected.flip();
                    } else {
                        stats.duplicates_discarded += 1;
                    }

                    if ack_losses.pop_front().unwrap_or(false) {
                        stats.acks_lost += 1;
                        stats.retransmissions += 1;
                    } else {
                        cursor += 1;
                    }
                },
            }
        }

        ModelOutcome { stats, delivered, accepted_bits }
    }
}
