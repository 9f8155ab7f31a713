//! The `Sim` struct and its cycle loop (§4.4).

use std::collections::HashMap;

use dt_core::{AgentId, SimClock, SimConfig, Tick};
use dt_graph::ComponentGraph;
use dt_spawn::{SpawnAdmission, SpawnBlueprint, SpawnDecision};
use dt_world::{Agent, AgentCategory, WorldState};

use crate::error::{SimError, SimResult};
use crate::observer::SimObserver;

/// Builds a fresh [`ComponentGraph`] for a newly admitted agent. Supplied by
/// [`crate::SimBuilder::graph_factory`]; concrete driver/controller
/// components beyond collision dynamics are out of scope (§1), so callers
/// plug their own sensor/algorithm/action components in here.
pub type GraphFactory = Box<dyn Fn(&Agent) -> ComponentGraph + Send + Sync>;

/// A blueprint awaiting admission, together with the tick at which it is
/// next eligible for (re-)evaluation (§4.5 hold-back).
struct PendingSpawn {
    blueprint: SpawnBlueprint,
    ready_at: Tick,
}

/// The main simulation runner.
///
/// `Sim` owns the canonical [`WorldState`], one [`ComponentGraph`] per live
/// agent, the [`SpawnAdmission`] engine and its queue of pending blueprints,
/// the [`SimClock`], and every subscribed [`SimObserver`]. Create via
/// [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config: SimConfig,
    pub clock: SimClock,
    pub world: WorldState,
    graphs: HashMap<AgentId, ComponentGraph>,
    graph_factory: GraphFactory,
    spawn_admission: SpawnAdmission,
    pending_spawns: Vec<PendingSpawn>,
    next_agent_id: u32,
    observers: Vec<Box<dyn SimObserver>>,
}

impl Sim {
    pub(crate) fn new(
        config: SimConfig,
        world: WorldState,
        graph_factory: GraphFactory,
        spawn_admission: SpawnAdmission,
        pending_spawns: Vec<SpawnBlueprint>,
        next_agent_id: u32,
    ) -> Self {
        let clock = config.make_clock();
        let pending_spawns = pending_spawns
            .into_iter()
            .map(|blueprint| PendingSpawn { blueprint, ready_at: clock.current_tick })
            .collect();
        Self {
            config,
            clock,
            world,
            graphs: HashMap::new(),
            graph_factory,
            spawn_admission,
            pending_spawns,
            next_agent_id,
            observers: Vec::new(),
        }
    }

    /// Subscribe an observer to every subsequent cycle's end-of-cycle event.
    pub fn add_observer(&mut self, observer: Box<dyn SimObserver>) {
        self.observers.push(observer);
    }

    /// Queue an additional blueprint for admission at the next cycle in
    /// which it is evaluated. Lets a caller spawn agents dynamically mid-run
    /// rather than only at build time.
    pub fn queue_spawn(&mut self, blueprint: SpawnBlueprint) {
        self.pending_spawns.push(PendingSpawn { blueprint, ready_at: self.clock.current_tick });
    }

    // ── The cycle loop (§4.4) ────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`,
    /// or until an observer signals end-of-run (§5 cancellation condition
    /// (a)) or a mandatory agent's cycle fails (condition (b)).
    pub fn run(&mut self) -> SimResult<()> {
        loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break;
            }

            for observer in &mut self.observers {
                observer.on_cycle_start(now);
            }

            self.run_cycle(now)?;

            for observer in &mut self.observers {
                observer.on_cycle_end(now, &self.world);
            }
            let stop = self.observers.iter().any(|o| o.should_stop());

            self.clock.advance();
            if stop {
                break;
            }
        }

        let final_time = self.clock.current_tick;
        for observer in &mut self.observers {
            observer.on_sim_end(final_time);
        }
        Ok(())
    }

    /// Run exactly `n` cycles from the current position, ignoring
    /// `config.end_tick()`. Useful for tests and incremental stepping.
    pub fn run_cycles(&mut self, n: u64) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_tick;
            for observer in &mut self.observers {
                observer.on_cycle_start(now);
            }
            self.run_cycle(now)?;
            for observer in &mut self.observers {
                observer.on_cycle_end(now, &self.world);
            }
            self.clock.advance();
        }
        Ok(())
    }

    /// One full §4.4 cycle: spawn admission, due-component execution, world
    /// sync, mandatory-agent liveness check. Does not advance the clock or
    /// dispatch observers — `run`/`run_cycles` wrap this with those.
    fn run_cycle(&mut self, now: Tick) -> SimResult<()> {
        self.run_spawn_admission(now)?;
        self.run_due_components(now);
        self.world.sync_global_data();
        self.abort_if_mandatory_invalid()
    }

    /// §4.4 step (a): evaluate every pending blueprint whose hold-back delay
    /// has elapsed, then admit/hold-back/reject/abort each in blueprint
    /// order. `SpawnAdmission::evaluate` only reads `&WorldState` and the
    /// lane index it consults isn't rebuilt until the next `sync_global_data`,
    /// so every blueprint due this cycle sees the same pre-cycle world
    /// regardless of evaluation order — exactly the batch/snapshot split §5
    /// describes for a parallel re-implementation ("read-copy-update
    /// snapshot of the world for the parallel phase"). With the `parallel`
    /// feature this batch of independent, read-only evaluations runs on
    /// Rayon's pool; admission itself (mutating `world`/`graphs`) stays
    /// sequential.
    fn run_spawn_admission(&mut self, now: Tick) -> SimResult<()> {
        let cycle_time_ms = self.config.global_cycle_time_ms as u64;

        let mut ready = Vec::new();
        let mut still_pending = Vec::new();
        for pending in self.pending_spawns.drain(..) {
            if pending.ready_at <= now {
                ready.push(pending);
            } else {
                still_pending.push(pending);
            }
        }
        self.pending_spawns = still_pending;

        let decisions = self.evaluate_batch(&ready, cycle_time_ms);

        for (pending, decision) in ready.into_iter().zip(decisions) {
            match decision {
                SpawnDecision::Admit { velocity } | SpawnDecision::Mandatory { velocity } => {
                    self.admit(pending.blueprint, velocity);
                }
                SpawnDecision::HoldBack { after_ms } => {
                    let retry_at = now.offset(self.clock.ticks_for_ms(after_ms).max(1));
                    self.pending_spawns.push(PendingSpawn { blueprint: pending.blueprint, ready_at: retry_at });
                }
                SpawnDecision::Reject => {
                    log::warn!(
                        "spawn rejected: {:?} blueprint on road {:?} at s={:.2}",
                        pending.blueprint.category,
                        pending.blueprint.road_id,
                        pending.blueprint.s
                    );
                }
                SpawnDecision::Abort => {
                    return Err(SimError::IncompleteScenario {
                        agent: dt_core::AgentId::INVALID,
                        reason: "mandatory agent blueprint could not be placed on the road network",
                    });
                }
            }
        }
        Ok(())
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_batch(&self, ready: &[PendingSpawn], cycle_time_ms: u64) -> Vec<SpawnDecision> {
        ready.iter().map(|p| self.spawn_admission.evaluate(&p.blueprint, &self.world, cycle_time_ms)).collect()
    }

    #[cfg(feature = "parallel")]
    fn evaluate_batch(&self, ready: &[PendingSpawn], cycle_time_ms: u64) -> Vec<SpawnDecision> {
        use rayon::prelude::*;
        ready.par_iter().map(|p| self.spawn_admission.evaluate(&p.blueprint, &self.world, cycle_time_ms)).collect()
    }

    /// Construct and register the `Agent`, then build its `ComponentGraph`.
    fn admit(&mut self, blueprint: SpawnBlueprint, velocity: f64) {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;

        let mut state = dt_world::DynamicState { velocity, ..dt_world::DynamicState::default() };
        let (point, heading) = self
            .world
            .network()
            .road(blueprint.road_id)
            .map(|road| road.evaluate(blueprint.s))
            .unwrap_or((dt_core::Point2D::new(0.0, 0.0), 0.0));
        state.x = point.x;
        state.y = point.y;
        state.yaw = heading;

        let agent = Agent::new(id, blueprint.category, blueprint.model, state);
        let graph = (self.graph_factory)(&agent);
        if let Err(e) = self.world.add_agent(agent) {
            log::error!("admitted agent {id} failed registration: {e}");
            return;
        }
        self.graphs.insert(id, graph);
    }

    /// §4.4 step (b)/(c): run every live agent's due components, in
    /// ascending `AgentId` order (§5: "unspecified but deterministic").
    /// `ComponentGraph::run_cycle` needs exclusive `&mut WorldState` for its
    /// whole span (minting, delivery, and trigger together), so this stays
    /// sequential — the `parallel` feature's Rayon use is scoped to spawn
    /// admission's independent, read-only evaluations instead (see
    /// `evaluate_batch`).
    fn run_due_components(&mut self, now: Tick) {
        let mut ids: Vec<AgentId> = self.world.agents().map(|a| a.id).collect();
        ids.sort_unstable();
        for id in ids {
            self.run_one(id, now);
        }
    }

    fn run_one(&mut self, id: AgentId, now: Tick) {
        let Some(graph) = self.graphs.get_mut(&id) else { return };
        match graph.run_cycle(&mut self.world, id, now) {
            Ok(_) => {}
            Err(e) => {
                log::error!("agent {id}: component graph error: {e}");
                if let Ok(agent) = self.world.get_agent(id) {
                    if matches!(agent.category, AgentCategory::Ego | AgentCategory::Scenario) {
                        self.world.queue_agent_update(id, dt_world::AgentUpdate::Invalidate);
                    }
                }
            }
        }
    }

    /// §7 `LocalizationFailure`: "fatal if the agent is Ego or Scenario".
    /// `sync_global_data` already marked the agent invalid; this is the
    /// scheduler boundary where that becomes a run-terminating error.
    fn abort_if_mandatory_invalid(&self) -> SimResult<()> {
        for agent in self.world.agents() {
            if !agent.valid && matches!(agent.category, AgentCategory::Ego | AgentCategory::Scenario) {
                return Err(SimError::IncompleteScenario {
                    agent: agent.id,
                    reason: "mandatory agent became invalid (localization failure or left the world)",
                });
            }
        }
        Ok(())
    }
}
