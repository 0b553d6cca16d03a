//! Scenario builder with oracle checks.
//!
//! A scenario configures one session (payload, probabilities, seed, optional
//! fault script), runs it to completion in virtual time, then hands the
//! resulting world to each oracle.
//!
//! ```rust,ignore
//! let report = Scenario::new()
//!     .payload("HI")
//!     .loss(30)
//!     .seed(7)
//!     .oracle(Box::new(|world| {
//!         (world.stats.received == 2).then_some(()).ok_or("lost a frame".into())
//!     }))
//!     .run()?;
//! ```

use std::time::Duration;

use arq_core::{
    Probability, SessionConfig, SessionState, Simulator, SimulatorError, Statistics,
};
use thiserror::Error;

use crate::{
    model::FaultScript, recorder::RecordingObserver, scripted_channel::ScriptedChannel,
    sim_env::SimEnv,
};

/// Simulator type every harness scenario runs on.
pub type HarnessSimulator = Simulator<SimEnv, ScriptedChannel, RecordingObserver>;

/// Oracle run against the final world. `Err` carries the violation.
pub type Oracle = Box<dyn Fn(&ScenarioWorld) -> Result<(), String>>;

/// Errors from running a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The simulation did not settle.
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulatorError),

    /// An oracle rejected the final state.
    #[error("oracle failed: {0}")]
    OracleFailed(String),
}

/// Final state of a scenario run.
#[derive(Debug, Clone)]
pub struct ScenarioWorld {
    /// Session state at the end of the run.
    pub state: SessionState,
    /// Final counters.
    pub stats: Statistics,
    /// Final cursor.
    pub cursor: usize,
    /// Number of frames in the session.
    pub frame_count: usize,
    /// Virtual time at the end of the run.
    pub elapsed: Duration,
    /// Everything the presentation layer was told.
    pub recorder: RecordingObserver,
}

/// Builder for a single-session simulation.
pub struct Scenario {
    config: SessionConfig,
    seed: u64,
    script: FaultScript,
    max_steps: usize,
    oracles: Vec<Oracle>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Lossless `"HELLO"` session with seed 0.
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            seed: 0,
            script: FaultScript::default(),
            max_steps: 100_000,
            oracles: Vec::new(),
        }
    }

    /// Payload to transmit.
    #[must_use]
    pub fn payload(mut self, payload: &str) -> Self {
        self.config = SessionConfig { payload: payload.to_string(), ..self.config };
        self
    }

    /// Frame loss percentage (clamped).
    #[must_use]
    pub fn loss(mut self, percent: i64) -> Self {
        self.config.loss = Probability::clamped(percent);
        self
    }

    /// Frame corruption percentage (clamped).
    #[must_use]
    pub fn corruption(mut self, percent: i64) -> Self {
        self.config.corruption = Probability::clamped(percent);
        self
    }

    /// ACK/NAK loss percentage (clamped).
    #[must_use]
    pub fn ack_loss(mut self, percent: i64) -> Self {
        self.config.ack_loss = Probability::clamped(percent);
        self
    }

    /// Retransmission timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// RNG seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Scripted fates applied before the probabilistic channel takes over.
    #[must_use]
    pub fn script(mut self, script: FaultScript) -> Self {
        self.script = script;
        self
    }

    /// Step budget before the run counts as stuck.
    #[must_use]
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Add an oracle.
    #[must_use]
    pub fn oracle(mut self, oracle: Oracle) -> Self {
        self.oracles.push(oracle);
        self
    }

    /// Started simulator for this scenario, for tests that step manually.
    pub fn build(&self) -> HarnessSimulator {
        let channel = ScriptedChannel::new()
            .with_frames(self.script.frames.iter().copied())
            .with_acks(self.script.acks.iter().copied());
        let mut sim =
            Simulator::new(SimEnv::with_seed(self.seed), channel, RecordingObserver::new());
        sim.start_with(self.config.clone());
        sim
    }

    /// Run to completion and check every oracle.
    ///
    /// # Errors
    ///
    /// - `Simulation` if the run exceeds the step budget
    /// - `OracleFailed` with the first violation reported
    pub fn run(self) -> Result<ScenarioWorld, ScenarioError> {
        let mut sim = self.build();
        sim.run_until_idle(self.max_steps)?;

        let world = ScenarioWorld {
            state: sim.state(),
            stats: sim.stats(),
            cursor: sim.session().cursor(),
            frame_count: sim.session().frames().len(),
            elapsed: sim.timeline().now(),
            recorder: sim.into_observer(),
        };

        for oracle in &self.oracles {
            oracle(&world).map_err(ScenarioError::OracleFailed)?;
        }

        Ok(world)
    }
}
