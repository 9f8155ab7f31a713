//! Signal catalog and per-agent component-graph execution.
//!
//! A `ComponentGraph` wires together `Component` trait objects — sensors,
//! algorithms, dynamics, actions — with typed `Signal` channels and runs one
//! cycle at a time (§3, §4.3, §6):
//!
//!   1. every due component mints its output signals, in topological order;
//!   2. each minted signal is delivered to its channel's destination input;
//!   3. every component triggers, in ascending-priority order.
//!
//! | module        | contents                                            |
//! |---------------|------------------------------------------------------|
//! | `signal`      | the `Signal` payload catalog                        |
//! | `component`   | the `Component` trait, `PortId`, `Capability`        |
//! | `priority`    | representative scheduling-priority constants         |
//! | `graph`       | `ComponentGraph`, `Channel`, `run_cycle`              |
//! | `error`       | `GraphError`                                          |
//!
//! # Features
//! - `serde`: derives `Serialize`/`Deserialize` on `Signal` and its payloads.

mod component;
mod error;
mod graph;
mod priority;
mod signal;

#[cfg(test)]
mod tests;

pub use component::{Capability, Component, PortId};
pub use error::{GraphError, GraphResult};
pub use graph::{Channel, ComponentGraph, CycleOutcome};
pub use signal::{
    ComponentState, DetectedObject, DynamicsSignal, GearSignal, LongitudinalSignal, Signal,
    SensorDataSignal, SteeringSignal,
};

pub mod priorities {
    pub use crate::priority::*;
}
