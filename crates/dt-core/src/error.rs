//! Framework error type.
//!
//! Sub-crates define their own error enums for the failures specific to that
//! component (e.g. `dt_localize::LocalizationError`) and convert into
//! `DtError` via `From` impls at the boundary, or wrap `DtError` as one
//! variant. Both patterns are acceptable; prefer whichever keeps error sites
//! clean.

use thiserror::Error;

use crate::{AgentId, RoadId};

/// The top-level error type for `dt-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum DtError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("road {0} not found")]
    RoadNotFound(RoadId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `dt-*` crates.
pub type DtResult<T> = Result<T, DtError>;
