//! Fuzz target for the lenient configuration parser
//!
//! # Invariants
//!
//! - Every probability resolves into `[0, 70]`
//! - Payload is never empty after resolution
//! - Timeout is never zero
//! - NEVER panic on any input text

#![no_main]

use arbitrary::Arbitrary;
use arq_core::{ConfigInput, Probability};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Fields<'a> {
    payload: &'a str,
    loss: &'a str,
    corruption: &'a str,
    ack_loss: &'a str,
    timeout_ms: &'a str,
}

fuzz_target!(|fields: Fields<'_>| {
    let (input, _) = ConfigInput::from_text(
        fields.payload,
        fields.loss,
        fields.corruption,
        fields.ack_loss,
        fields.timeout_ms,
    );
    let (config, _) = input.resolve();

    for p in [config.loss, config.corruption, config.ack_loss] {
        assert!(p <= Probability::MAX, "probability {p} above cap");
    }
    assert!(!config.payload.is_empty());
    assert!(!config.timeout.is_zero());
});
