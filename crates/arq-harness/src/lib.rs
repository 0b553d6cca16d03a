//! Deterministic simulation harness for the Stop-and-Wait ARQ core.
//!
//! Seeded implementations of the core's seams for reproducible testing:
//!
//! - [`SimEnv`]: ChaCha8 RNG and a virtual clock
//! - [`ScriptedChannel`]: forces frame and ACK fates, e.g. force-loss mode
//! - [`RecordingObserver`]: captures everything the presentation is told
//!
//! # Model-Based Testing
//!
//! The `model` module provides an untimed reference implementation. A fault
//! script is applied to both the model and the real simulator, and their
//! counters and delivered payloads are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod recorder;
pub mod scenario;
pub mod scripted_channel;
pub mod sim_env;

pub use model::{FaultScript, ModelLink, ModelOutcome};
pub use recorder::RecordingObserver;
pub use scenario::{HarnessSimulator, Oracle, Scenario, ScenarioError, ScenarioWorld};
pub use scripted_channel::ScriptedChannel;
pub use sim_env::SimEnv;
