//! Simulation observer trait — the §6 "observation sink" the scheduler
//! pushes read-only world access into at the end of every cycle.

use dt_core::Tick;
use dt_world::WorldState;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// cycle loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about. `dt-output`'s writer is the canonical
/// implementor: `on_cycle_end` is where it turns live agent state into
/// `ObservationRecord`s.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_cycle_end(&mut self, time: Tick, _world: &WorldState) {
///         if time.0 % self.interval == 0 {
///             println!("cycle {time}");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each cycle, before spawn admission.
    fn on_cycle_start(&mut self, _time: Tick) {}

    /// Called once per cycle, after `world.sync_global_data()`. Read-only
    /// access to the post-sync world is exactly what §6's observation sink
    /// describes: "the core pushes per-cycle records … to any subscribed
    /// observer".
    fn on_cycle_end(&mut self, _time: Tick, _world: &WorldState) {}

    /// Whether the run should stop after this cycle (§5 "an observation
    /// indicates end-of-run"). Default: never.
    fn should_stop(&self) -> bool {
        false
    }

    /// Called once after the final cycle completes (including on early
    /// termination).
    fn on_sim_end(&mut self, _final_time: Tick) {}
}

/// A [`SimObserver`] that does nothing. Use when you need to call `run` but
/// don't want any callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
