//! World-state subsystem error type.

use thiserror::Error;

use dt_core::AgentId;

/// Errors produced by `dt-world`.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("agent {0} not found")]
    UnknownAgent(AgentId),

    #[error("agent {0} already registered")]
    DuplicateId(AgentId),
}

pub type WorldResult<T> = Result<T, WorldError>;
