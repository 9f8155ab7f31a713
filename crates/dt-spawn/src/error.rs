//! Spawn-admission subsystem error type (§4.5, §7).

use thiserror::Error;

/// Errors produced by spawn admission.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// An Ego/Scenario agent (mandatory, bypasses admission) could not be
    /// placed on the road network (§4.5 point 3, §7): the run aborts
    /// immediately rather than continuing without it.
    #[error("mandatory agent spawn at road {road} s={s} is outside the road network; scenario incomplete")]
    IncompleteScenario { road: dt_core::RoadId, s: f64 },
}

pub type SpawnResult<T> = Result<T, SpawnError>;
