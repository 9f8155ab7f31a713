//! The unified observation record written by every output backend (§6).

use dt_core::AgentId;

/// Which facet of an agent's state a record carries. Mirrors §6's
/// observation groups — a trajectory/visualization tool downstream keys its
/// rendering off this tag rather than off distinct table/row types.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ObservationGroup {
    /// Free-form trace points (§6 "Trace") — typically position/heading
    /// history used to reconstruct a trip.
    Trace,
    /// Values meant purely for a visualization tool to render (shapes,
    /// colors, labels) rather than to feed back into analysis.
    Visualization,
    /// The agent's localized road view for this cycle (road/lane id, s/t,
    /// remainders) — `dt_localize`'s output, mirrored verbatim.
    RoadPosition,
    /// Raw vehicle dynamic state (position, velocity, yaw, pedals, lights).
    Vehicle,
}

impl ObservationGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationGroup::Trace => "trace",
            ObservationGroup::Visualization => "visualization",
            ObservationGroup::RoadPosition => "road_position",
            ObservationGroup::Vehicle => "vehicle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "trace" => Some(ObservationGroup::Trace),
            "visualization" => Some(ObservationGroup::Visualization),
            "road_position" => Some(ObservationGroup::RoadPosition),
            "vehicle" => Some(ObservationGroup::Vehicle),
            _ => None,
        }
    }
}

/// One string-encoded `(key, value)` observation about one agent at one
/// cycle (§6's "string-encoded value" wire format) — the generalized
/// record shape every backend persists.
///
/// Encoding numeric values as strings rather than adding a typed `Value`
/// enum keeps every backend's schema fixed regardless of what a component
/// chooses to observe, matching §6's description of the sink as opaque to
/// the meaning of what it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationRecord {
    pub time_ms: u64,
    pub agent_id: AgentId,
    pub group: ObservationGroup,
    pub key: String,
    pub value: String,
}
