//! Command line Stop-and-Wait ARQ simulator.
//!
//! Runs one session of the ARQ core against the real clock or in virtual
//! time and renders it as a log.
//!
//! ## Architecture
//!
//! ```text
//! arq-sim
//!   ├─ SystemEnv       (wall clock, OS or seeded RNG)
//!   ├─ ConsoleObserver (presentation rendered through tracing)
//!   └─ Simulator       (arq-core: session + timeline)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod console;
mod error;
mod system_env;

use arq_core::{
    ConfigInput, Observer, ProbabilisticChannel, SessionState, Severity, Simulator, Statistics,
};
pub use console::{ConsoleObserver, render_ack_sent, render_frame_sent, render_stats, severity_tag};
pub use error::SimError;
pub use system_env::SystemEnv;

/// Settings for one command line run, as typed by the user.
///
/// Numeric fields stay text here; they go through the lenient
/// [`ConfigInput`] parser so bad input is reported and replaced rather than
/// rejected.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Characters to transmit
    pub payload: String,
    /// Frame loss percentage
    pub loss: String,
    /// Frame corruption percentage
    pub corruption: String,
    /// ACK/NAK loss percentage
    pub ack_loss: String,
    /// Retransmission timeout in milliseconds
    pub timeout_ms: String,
    /// Seed for reproducible channel draws; OS entropy when absent
    pub seed: Option<u64>,
    /// Pace events on the wall clock instead of virtual time
    pub realtime: bool,
    /// Step budget before the run is abandoned
    pub max_steps: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            payload: arq_core::DEFAULT_PAYLOAD.to_string(),
            loss: "0".to_string(),
            corruption: "0".to_string(),
            ack_loss: "0".to_string(),
            timeout_ms: arq_core::DEFAULT_TIMEOUT.as_millis().to_string(),
            seed: None,
            realtime: false,
            max_steps: 100_000,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Final session state (`Completed`, or `Stopped` on Ctrl-C)
    pub state: SessionState,
    /// Final counters
    pub stats: Statistics,
}

/// Run one session to completion.
///
/// In realtime mode Ctrl-C stops the transmission; the outcome then reports
/// `Stopped`.
///
/// # Errors
///
/// - `Simulation` if the session does not settle within `max_steps`
/// - `Io` if the Ctrl-C handler cannot be installed
pub async fn run(config: RunConfig) -> Result<RunOutcome, SimError> {
    let env = match config.seed {
        Some(seed) => SystemEnv::seeded(seed),
        None => SystemEnv::new(),
    };
    let mut sim = Simulator::new(env, ProbabilisticChannel, ConsoleObserver::new());

    let (input, issues) = ConfigInput::from_text(
        &config.payload,
        &config.loss,
        &config.corruption,
        &config.ack_loss,
        &config.timeout_ms,
    );
    for issue in &issues {
        tracing::warn!(%issue, "configuration adjusted");
        sim.observer_mut().on_log(&issue.to_string(), Severity::Error);
    }
    sim.start(input);

    let state = if config.realtime {
        let interrupted = tokio::select! {
            result = sim.run_paced(config.max_steps) => Ok(result),
            signal = tokio::signal::ctrl_c() => Err(signal),
        };
        match interrupted {
            Ok(result) => result?,
            Err(signal) => {
                signal?;
                sim.stop();
                sim.state()
            },
        }
    } else {
        sim.run_until_idle(config.max_steps)?
    };

    let outcome = RunOutcome { state, stats: sim.stats() };
    tracing::info!(state = ?outcome.state, "{}", render_stats(&outcome.stats));
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn virtual_run_completes() {
        let config = RunConfig { payload: "HI".to_string(), seed: Some(1), ..RunConfig::default() };

        let outcome = run(config).await.expect("run should complete");

        assert_eq!(outcome.state, SessionState::Completed);
        assert_eq!(outcome.stats.received, 2);
    }

    #[tokio::test]
    async fn bad_input_is_recovered() {
        let config = RunConfig {
            payload: String::new(),
            loss: "lots".to_string(),
            timeout_ms: "fast".to_string(),
            seed: Some(2),
            ..RunConfig::default()
        };

        let outcome = run(config).await.expect("run should complete");

        assert_eq!(outcome.state, SessionState::Completed);
        assert_eq!(outcome.stats.received, 5);
        assert_eq!(outcome.stats.lost, 0);
    }

    #[tokio::test]
    async fn seeded_runs_match() {
        let config = RunConfig {
            payload: "ARQ".to_string(),
            loss: "40".to_string(),
            ack_loss: "30".to_string(),
            seed: Some(77),
            ..RunConfig::default()
        };

        let first = run(config.clone()).await.expect("run should complete");
        let second = run(config).await.expect("run should complete");

        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_run_follows_the_clock() {
        let config = RunConfig {
            payload: "A".to_string(),
            seed: Some(3),
            realtime: true,
            ..RunConfig::default()
        };

        let outcome = run(config).await.expect("run should complete");

        assert_eq!(outcome.state, SessionState::Completed);
        assert_eq!(outcome.stats.sent, 1);
    }
}
