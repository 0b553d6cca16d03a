//! Session configuration.
//!
//! Presentation-layer input arrives as loosely typed form values. Nothing in
//! it is allowed to fail a session: out-of-range probabilities are clamped,
//! missing or invalid timeouts fall back to the default, and an empty payload
//! is replaced by [`DEFAULT_PAYLOAD`]. Every adjustment is reported as a
//! [`ConfigError`] alongside the resolved [`SessionConfig`].

use std::{fmt, time::Duration};

use thiserror::Error;

use crate::{channel::Probability, sequencer::DEFAULT_PAYLOAD};

/// Retransmission timeout used when none (or an invalid one) is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Fixed simulated delays of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTiming {
    /// Sender to receiver transit time of a data frame.
    pub frame_transit: Duration,
    /// Receiver to sender transit time of an ACK/NAK.
    pub ack_transit: Duration,
    /// Time after emission at which a lost ACK/NAK is declared lost.
    pub ack_loss_point: Duration,
    /// Gap between an acknowledgment arriving and the next transmission.
    pub pacing: Duration,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            frame_transit: Duration::from_millis(2000),
            ack_transit: Duration::from_millis(2000),
            ack_loss_point: Duration::from_millis(1000),
            pacing: Duration::from_millis(1000),
        }
    }
}

/// Validated configuration of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Text to transmit, one frame per character. Never empty.
    pub payload: String,
    /// Probability that a data frame is lost.
    pub loss: Probability,
    /// Probability that a data frame that was not lost arrives corrupted.
    pub corruption: Probability,
    /// Probability that an ACK/NAK is lost.
    pub ack_loss: Probability,
    /// Retransmission timeout.
    pub timeout: Duration,
    /// Simulated link delays.
    pub timing: LinkTiming,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::lossless(DEFAULT_PAYLOAD)
    }
}

impl SessionConfig {
    /// Fault-free configuration for `payload` with default timings.
    pub fn lossless(payload: &str) -> Self {
        let payload = if payload.is_empty() { DEFAULT_PAYLOAD } else { payload };
        Self {
            payload: payload.to_string(),
            loss: Probability::ZERO,
            corruption: Probability::ZERO,
            ack_loss: Probability::ZERO,
            timeout: DEFAULT_TIMEOUT,
            timing: LinkTiming::default(),
        }
    }
}

/// Configuration field an input problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    /// Frame loss probability.
    Loss,
    /// Frame corruption probability.
    Corruption,
    /// ACK/NAK loss probability.
    AckLoss,
    /// Retransmission timeout.
    Timeout,
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loss => f.write_str("loss probability"),
            Self::Corruption => f.write_str("corruption probability"),
            Self::AckLoss => f.write_str("ACK loss probability"),
            Self::Timeout => f.write_str("timeout"),
        }
    }
}

/// Input problems, all of which are recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Non-numeric or out-of-range value; `applied` was used instead.
    #[error("invalid {field}: {input:?}, using {applied}")]
    InvalidConfiguration {
        /// Field the value was given for.
        field: ConfigField,
        /// Value as supplied.
        input: String,
        /// Value used instead.
        applied: String,
    },

    /// Payload was empty; the default payload was used.
    #[error("empty payload, using {:?}", DEFAULT_PAYLOAD)]
    EmptyPayload,
}

/// Raw start parameters as supplied by the presentation layer.
///
/// `None` means the field was left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigInput {
    /// Text to transmit.
    pub payload: String,
    /// Frame loss percentage.
    pub loss_pct: Option<i64>,
    /// Frame corruption percentage.
    pub corruption_pct: Option<i64>,
    /// ACK/NAK loss percentage.
    pub ack_loss_pct: Option<i64>,
    /// Retransmission timeout in milliseconds.
    pub timeout_ms: Option<i64>,
}

impl ConfigInput {
    /// Build input from form-field text.
    ///
    /// Numbers are read the way a lenient form parser reads them: surrounding
    /// whitespace and trailing junk are ignored (`"25%"` is 25). Text with no
    /// leading number is treated as blank and reported.
    pub fn from_text(
        payload: &str,
        loss: &str,
        corruption: &str,
        ack_loss: &str,
        timeout_ms: &str,
    ) -> (Self, Vec<ConfigError>) {
        let mut issues = Vec::new();
        let mut field = |field: ConfigField, text: &str, fallback: &str| {
            let value = parse_leading_int(text);
            if value.is_none() && !text.trim().is_empty() {
                issues.push(ConfigError::InvalidConfiguration {
                    field,
                    input: text.to_string(),
                    applied: fallback.to_string(),
                });
            }
            value
        };

        let default_timeout = format!("{}ms", DEFAULT_TIMEOUT.as_millis());
        let input = Self {
            payload: payload.to_string(),
            loss_pct: field(ConfigField::Loss, loss, "0%"),
            corruption_pct: field(ConfigField::Corruption, corruption, "0%"),
            ack_loss_pct: field(ConfigField::AckLoss, ack_loss, "0%"),
            timeout_ms: field(ConfigField::Timeout, timeout_ms, &default_timeout),
        };

        (input, issues)
    }

    /// Clamp and default every field.
    pub fn resolve(self) -> (SessionConfig, Vec<ConfigError>) {
        let mut issues = Vec::new();

        if self.payload.is_empty() {
            issues.push(ConfigError::EmptyPayload);
        }

        let mut probability = |field: ConfigField, value: Option<i64>| {
            let requested = value.unwrap_or(0);
            let clamped = Probability::clamped(requested);
            if i64::from(clamped.percent()) != requested {
                issues.push(ConfigError::InvalidConfiguration {
                    field,
                    input: requested.to_string(),
                    applied: clamped.to_string(),
                });
            }
            clamped
        };

        let loss = probability(ConfigField::Loss, self.loss_pct);
        let corruption = probability(ConfigField::Corruption, self.corruption_pct);
        let ack_loss = probability(ConfigField::AckLoss, self.ack_loss_pct);

        let timeout = match self.timeout_ms {
            Some(ms) if ms > 0 => Duration::from_millis(ms.unsigned_abs()),
            Some(ms) => {
                issues.push(ConfigError::InvalidConfiguration {
                    field: ConfigField::Timeout,
                    input: ms.to_string(),
                    applied: format!("{}ms", DEFAULT_TIMEOUT.as_millis()),
                });
                DEFAULT_TIMEOUT
            },
            None => DEFAULT_TIMEOUT,
        };

        let config = SessionConfig {
            loss,
            corruption,
            ack_loss,
            timeout,
            ..SessionConfig::lossless(&self.payload)
        };

        (config, issues)
    }
}

/// Leading optionally-signed decimal integer of `text`, saturating on overflow.
fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits: Vec<i64> =
        digits.bytes().take_while(u8::is_ascii_digit).map(|b| i64::from(b - b'0')).collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = digits.iter().fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(*d));
    Some(if negative { -magnitude } else { magnitude })
}
