//! `dt-sim` — the cycle-driven scheduler (C4, §4.4) for the rust_dt_pcm
//! core.
//!
//! # The cycle loop
//!
//! ```text
//! t = 0
//! while t < config.max_simulation_time_ms:
//!   ① Spawn admission  — evaluate every pending SpawnBlueprint against the
//!                         current world; admit, hold back, reject, or abort.
//!   ② Due components   — for each live agent, run its ComponentGraph's
//!                         cycle (update outputs → deliver inputs → trigger),
//!                         in ascending AgentId order.
//!   ③ World sync        — world.sync_global_data(): drain deferred updates,
//!                         drain removals, re-localize every agent.
//!   ④ Observation       — dispatch this cycle's records to every observer.
//!   ⑤ t += global_cycle_time_ms
//! ```
//!
//! A scenario-critical failure (an Ego/Scenario spawn that can't be placed,
//! or an Ego/Scenario agent going invalid mid-run) aborts the run with
//! [`SimError::IncompleteScenario`] rather than completing it; every other
//! component-local error is logged and folded into that cycle's bookkeeping
//! (§7: "the scheduler never throws into user component code").
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                       |
//! |------------|---------------------------------------------------------------|
//! | `parallel` | Runs due agents' component-graph cycles on Rayon's pool, with a single-threaded `sync_global_data()` merge at cycle end. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dt_core::SimConfig;
//! use dt_road::RoadNetwork;
//! use dt_sim::{NoopObserver, SimBuilder};
//! use dt_spawn::SpawnBlueprint;
//!
//! let mut sim = SimBuilder::new(config, network)
//!     .agents(vec![blueprint])
//!     .build()?;
//! sim.add_observer(Box::new(NoopObserver));
//! sim.run()?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{ExitCode, SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
