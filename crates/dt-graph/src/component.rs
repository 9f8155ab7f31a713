//! The §6 component plug-in contract.
//!
//! `Create`/`Destroy`/`GetVersion` from §6 map onto ordinary Rust
//! construction, `Drop`, and a `const VERSION: &str` rather than extra
//! trait methods — idiomatic Rust doesn't need a virtual destructor or a
//! runtime-queried factory function when construction is just calling a
//! constructor. A concrete `Component` impl's `new(..)` plays the role of
//! `Create`, returning `GraphResult<Self>` when construction can fail
//! (§6 `ConstructionFailed`).

use std::fmt;

use dt_core::Tick;
use dt_world::WorldState;

use crate::error::GraphResult;
use crate::signal::Signal;

/// A component's input/output port identifier, local to that component.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct PortId(pub u16);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port({})", self.0)
    }
}

/// §9's "tagged variant … avoid deep inheritance" — every `Component`
/// carries one of these for introspection/logging. Dispatch is via the
/// trait itself, not this tag.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Capability {
    Sensor,
    Algorithm,
    Dynamics,
    Action,
    Observation,
}

/// The §6 plug-in contract every per-agent component implements.
///
/// `Send` is required so a `ComponentGraph` can be handed to Rayon's pool
/// under `dt-sim`'s `parallel` feature (§5: "partition agents across
/// workers").
pub trait Component: fmt::Debug + Send {
    /// Stable name used as the priority tie-break key (§9: "by ascending
    /// component name, lexicographic").
    fn name(&self) -> &str;

    fn capability(&self) -> Capability;

    /// Scheduling priority — smaller triggers earlier (§4.3).
    fn priority(&self) -> i32;

    /// How often (in scheduler ticks) this component is due.
    fn cycle_time(&self) -> u32;

    /// Tick offset from which `cycle_time` is measured.
    fn offset_time(&self) -> u32;

    /// Whether this component is due at `time`, per §4.4's "`(t −
    /// offsetTime)` is a non-negative multiple of `cycleTime`".
    fn is_due(&self, time: Tick) -> bool {
        let t = time.0;
        let offset = self.offset_time() as u64;
        let cycle = self.cycle_time().max(1) as u64;
        t >= offset && (t - offset) % cycle == 0
    }

    /// Receive a signal delivered on input port `port`. Must not mutate
    /// world state (§4.3 step 2).
    fn update_input(&mut self, port: PortId, signal: Signal, time: Tick) -> GraphResult<()>;

    /// Mint the signal this component produces on output port `port` this
    /// cycle, if any (§4.3 step 1).
    fn update_output(&mut self, port: PortId, time: Tick) -> GraphResult<Option<Signal>>;

    /// Read world state, update internal state, and enqueue deferred world
    /// mutations (§4.3 step 3). `agent` is this component's owning agent.
    fn trigger(&mut self, world: &mut WorldState, agent: dt_core::AgentId, time: Tick) -> GraphResult<()>;
}
