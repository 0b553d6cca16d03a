//! Frames and acknowledgments exchanged over the simulated link.

use std::fmt;

/// Single-bit sequence number of the alternating-bit protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeqBit {
    /// Bit 0. Every session starts here.
    #[default]
    Zero,
    /// Bit 1.
    One,
}

impl SeqBit {
    /// Sequence bit of the frame at `index` (`index mod 2`).
    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 { Self::Zero } else { Self::One }
    }

    /// The other bit.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Zero => Self::One,
            Self::One => Self::Zero,
        }
    }

    /// Numeric value, 0 or 1.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }
}

impl fmt::Display for SeqBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One character of the payload, tagged with its alternating sequence bit.
///
/// Frames are immutable once sequenced. Retransmissions resend the same
/// `Frame` value, never a re-derived one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Alternating sequence bit, always `SeqBit::from_index(index)`.
    pub seq: SeqBit,
    /// Payload character carried by this frame.
    pub payload: char,
    /// Position of the character in the original payload.
    pub index: usize,
}

impl Frame {
    /// Create the frame for the character at `index`.
    pub fn new(index: usize, payload: char) -> Self {
        Self { seq: SeqBit::from_index(index), payload, index }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame {}: '{}'", self.seq, self.payload)
    }
}

/// Positive or negative acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckKind {
    /// Frame accepted (or re-confirmed after a duplicate).
    Ack,
    /// Frame arrived corrupted and must be resent.
    Nak,
}

impl AckKind {
    /// Whether this is a negative acknowledgment.
    pub fn is_nak(self) -> bool {
        matches!(self, Self::Nak)
    }
}

impl fmt::Display for AckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ack => f.write_str("ACK"),
            Self::Nak => f.write_str("NAK"),
        }
    }
}

/// Acknowledgment travelling from receiver back to sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ack {
    /// Sequence bit being acknowledged.
    pub bit: SeqBit,
    /// ACK or NAK.
    pub kind: AckKind,
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.bit)
    }
}
