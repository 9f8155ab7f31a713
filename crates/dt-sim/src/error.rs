//! Scheduler error type and the §6 exit-code mapping.

use thiserror::Error;

use dt_core::AgentId;
use dt_world::WorldError;

#[derive(Debug, Error)]
pub enum SimError {
    /// Malformed road network, missing required parameter, or contradictory
    /// lane topology — fatal at startup (§7 `ConfigError`).
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch { expected: usize, got: usize, what: &'static str },

    /// An Ego/Scenario blueprint couldn't be placed on the network, or an
    /// Ego/Scenario agent went invalid mid-run (§4.5 point 3, §7).
    #[error("agent {agent} (mandatory): incomplete scenario — {reason}")]
    IncompleteScenario { agent: AgentId, reason: &'static str },

    #[error("world error: {0}")]
    World(#[from] WorldError),

    #[error("runtime error: {0}")]
    Runtime(String),
}

pub type SimResult<T> = Result<T, SimError>;

/// The runner-facing exit code (§6 "the runner reports
/// `{Success, InvalidConfig, IncompleteScenario, RuntimeError}`"). A thin
/// runner binary (out of scope per §1) would match a [`SimResult`] onto
/// this before exiting.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ExitCode {
    Success,
    InvalidConfig,
    IncompleteScenario,
    RuntimeError,
}

impl ExitCode {
    pub fn of(result: &SimResult<()>) -> ExitCode {
        match result {
            Ok(()) => ExitCode::Success,
            Err(SimError::Config(_) | SimError::AgentCountMismatch { .. }) => ExitCode::InvalidConfig,
            Err(SimError::IncompleteScenario { .. }) => ExitCode::IncompleteScenario,
            Err(SimError::World(_) | SimError::Runtime(_)) => ExitCode::RuntimeError,
        }
    }
}
