//! Component-graph subsystem error type (§4.3, §7).

use thiserror::Error;

use dt_core::ComponentId;

use crate::component::PortId;

/// Errors produced while running one cycle of a `ComponentGraph`.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A component received a signal of unexpected payload type (§4.3,
    /// §7). The cycle is marked failed for that agent; the run continues —
    /// whether the agent is invalidated is a caller decision based on its
    /// `AgentCategory`.
    #[error("component {component} port {port}: unexpected signal type {found}, expected {expected}")]
    InvalidSignalType {
        component: ComponentId,
        port: PortId,
        found: &'static str,
        expected: &'static str,
    },

    /// A channel referenced a port id the component doesn't define (§4.3).
    /// Terminates that agent's cycle.
    #[error("component {component} has no port {port}")]
    InvalidLink { component: ComponentId, port: PortId },

    /// A component refused construction (§6 `ConstructionFailed`).
    #[error("component {0} construction failed: {1}")]
    ConstructionFailed(String, String),
}

pub type GraphResult<T> = Result<T, GraphError>;
