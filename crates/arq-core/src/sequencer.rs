//! Frame sequencer.
//!
//! Splits the payload into one frame per character, numbered with the
//! alternating bit. Pure and deterministic; the owning session resets its
//! cursor and expected bit whenever it sequences a new payload.

use crate::frame::Frame;

/// Payload used when the caller supplies an empty one.
pub const DEFAULT_PAYLOAD: &str = "HELLO";

/// Sequence `payload` into frames, substituting [`DEFAULT_PAYLOAD`] when empty.
///
/// Frame `i` carries the `i`-th Unicode scalar of the payload and sequence bit
/// `i mod 2`.
pub fn sequence_frames(payload: &str) -> Vec<Frame> {
    let payload = if payload.is_empty() { DEFAULT_PAYLOAD } else { payload };
    payload.chars().enumerate().map(|(index, ch)| Frame::new(index, ch)).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::frame::SeqBit;

    #[test]
    fn empty_payload_uses_default() {
        let frames = sequence_frames("");
        let text: String = frames.iter().map(|f| f.payload).collect();
        assert_eq!(text, "HELLO");
    }

    #[test]
    fn multibyte_characters_are_single_frames() {
        let frames = sequence_frames("aé✓");
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].payload, '✓');
        assert_eq!(frames[2].seq, SeqBit::Zero);
    }

    proptest! {
        #[test]
        fn one_frame_per_char_with_alternating_bits(payload in "[ -~]{1,40}") {
            let frames = sequence_frames(&payload);

            prop_assert_eq!(frames.len(), payload.chars().count());
            for (i, frame) in frames.iter().enumerate() {
                prop_assert_eq!(frame.index, i);
                prop_assert_eq!(frame.seq.as_u8() as usize, i % 2);
            }
            let rebuilt: String = frames.iter().map(|f| f.payload).collect();
            prop_assert_eq!(rebuilt, payload);
        }
    }
}
