//! Simulator front-end error types.

use std::fmt;

use arq_core::SimulatorError;

/// Errors that can end a command line run.
#[derive(Debug)]
pub enum SimError {
    /// The session did not settle within the step budget
    Simulation(SimulatorError),

    /// Signal handling or other I/O failure
    Io(std::io::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulation(err) => write!(f, "simulation error: {}", err),
            Self::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Simulation(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<SimulatorError> for SimError {
    fn from(err: SimulatorError) -> Self {
        Self::Simulation(err)
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
