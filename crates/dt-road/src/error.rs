//! Road-network subsystem error type.

use thiserror::Error;

use dt_core::RoadId;

/// Errors produced by `dt-road`.
#[derive(Debug, Error)]
pub enum RoadError {
    #[error("road {0} not found in network")]
    RoadNotFound(RoadId),

    #[error("lane section at s={0} not found on road {1}")]
    LaneSectionNotFound(f64, RoadId),

    #[error("malformed geometry on road {0}: {1}")]
    MalformedGeometry(RoadId, String),
}

pub type RoadResult<T> = Result<T, RoadError>;
