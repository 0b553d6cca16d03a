//! Simulator driver.
//!
//! Wires a [`Session`] to a [`Timeline`] and an [`Observer`]: commands from
//! the presentation go to the session, the session's actions are executed
//! against the timeline, and notifications are dispatched to the observer.
//! Runs either as fast as possible in virtual time or paced by the
//! environment's clock.

use thiserror::Error;

use crate::{
    channel::Channel,
    config::{ConfigInput, SessionConfig},
    env::Environment,
    observer::{Observer, Severity},
    session::{Session, SessionAction, SessionState},
    stats::Statistics,
    timeline::Timeline,
};

/// Errors from driving a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulatorError {
    /// Events were still pending after the step budget was spent.
    #[error("simulation still running after {max_steps} steps")]
    StepLimitExceeded {
        /// Step budget that was exhausted.
        max_steps: usize,
    },
}

/// One simulation run: session, event timeline and presentation observer.
pub struct Simulator<E: Environment, C: Channel, O: Observer> {
    session: Session<E, C>,
    timeline: Timeline,
    observer: O,
}

impl<E: Environment, C: Channel, O: Observer> Simulator<E, C, O> {
    /// Create an idle simulator.
    pub fn new(env: E, channel: C, observer: O) -> Self {
        Self { session: Session::new(env, channel), timeline: Timeline::new(), observer }
    }

    /// The session state machine.
    pub fn session(&self) -> &Session<E, C> {
        &self.session
    }

    /// The event timeline.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The presentation observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the presentation observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consume the simulator, returning the observer.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Session lifecycle state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Cumulative statistics.
    pub fn stats(&self) -> Statistics {
        self.session.stats()
    }

    /// Start from raw presentation input.
    ///
    /// Input problems are clamped or defaulted and reported to the observer as
    /// error-severity log lines; they never prevent the start.
    pub fn start(&mut self, input: ConfigInput) {
        let (config, issues) = input.resolve();
        for issue in &issues {
            tracing::warn!(%issue, "configuration adjusted");
            self.observer.on_log(&issue.to_string(), Severity::Error);
        }
        self.start_with(config);
    }

    /// Start with an already validated configuration.
    pub fn start_with(&mut self, config: SessionConfig) {
        let actions = self.session.start(self.timeline.now(), config);
        self.apply(actions);
    }

    /// Stop the running transmission, cancelling everything pending.
    pub fn stop(&mut self) {
        let actions = self.session.stop();
        self.apply(actions);
    }

    /// Stop and clear statistics.
    pub fn reset(&mut self) {
        let actions = self.session.reset();
        self.apply(actions);
    }

    /// Fire the next pending event. Returns `false` when nothing is pending.
    pub fn step(&mut self) -> bool {
        let Some(fired) = self.timeline.pop() else {
            return false;
        };
        let actions = self.session.handle(fired.at, fired.generation, fired.event);
        self.apply(actions);
        true
    }

    /// Run in virtual time until no event is pending.
    ///
    /// # Errors
    ///
    /// `StepLimitExceeded` if events remain after `max_steps` steps.
    pub fn run_until_idle(&mut self, max_steps: usize) -> Result<SessionState, SimulatorError> {
        for _ in 0..max_steps {
            if !self.step() {
                return Ok(self.state());
            }
        }
        self.settled(max_steps)
    }

    /// Run until idle, sleeping on the environment's clock before each event.
    ///
    /// Dropping the returned future between events leaves the simulator
    /// consistent; callers use that to honor a stop request mid-run.
    ///
    /// # Errors
    ///
    /// `StepLimitExceeded` if events remain after `max_steps` steps.
    pub async fn run_paced(&mut self, max_steps: usize) -> Result<SessionState, SimulatorError> {
        for _ in 0..max_steps {
            let Some(deadline) = self.timeline.next_deadline() else {
                return Ok(self.state());
            };

            let gap = deadline.saturating_sub(self.timeline.now());
            if !gap.is_zero() {
                let env = self.session.env().clone();
                env.sleep(gap).await;
            }
            self.step();
        }
        self.settled(max_steps)
    }

    fn settled(&self, max_steps: usize) -> Result<SessionState, SimulatorError> {
        if self.timeline.is_empty() {
            Ok(self.state())
        } else {
            Err(SimulatorError::StepLimitExceeded { max_steps })
        }
    }

    fn apply(&mut self, actions: Vec<SessionAction>) {
        for action in actions {
            match action {
                SessionAction::Schedule { generation, delay, event } => {
                    self.timeline.schedule(delay, generation, event);
                },
                SessionAction::ArmTimeout { generation, token, delay } => {
                    self.timeline.arm(token, delay, generation);
                },
                SessionAction::CancelTimeout { token } => {
                    self.timeline.cancel(token);
                },
                SessionAction::CancelAll => self.timeline.clear(),
                SessionAction::Notify(notification) => notification.dispatch(&mut self.observer),
            }
        }
    }
}
