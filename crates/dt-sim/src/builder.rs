//! Fluent builder for constructing a [`Sim`].

use dt_core::SimConfig;
use dt_graph::ComponentGraph;
use dt_road::RoadNetwork;
use dt_spawn::{SpawnAdmission, SpawnAdmissionParams, SpawnBlueprint};
use dt_world::{Agent, WorldState};

use crate::sim::GraphFactory;
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`] — global cycle time, max simulation time, seed.
/// - a [`RoadNetwork`] — the road the agents reconstruct their trip on.
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                                          |
/// |----------------------|----------------------------------------------------|
/// | `.agents(v)`         | No initial blueprints (call `Sim::queue_spawn` later) |
/// | `.spawn_params(p)`   | [`SpawnAdmissionParams::default`] (§4.5 design constants) |
/// | `.graph_factory(f)`  | One [`dt_collision::CollisionComponent`] per agent, matching this crate's in-scope behavior (§1) |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, network)
///     .agents(vec![blueprint])
///     .build()?;
/// sim.run()?;
/// ```
pub struct SimBuilder {
    config: SimConfig,
    network: RoadNetwork,
    blueprints: Vec<SpawnBlueprint>,
    spawn_params: SpawnAdmissionParams,
    graph_factory: Option<GraphFactory>,
}

impl SimBuilder {
    /// Create a builder with the required inputs.
    pub fn new(config: SimConfig, network: RoadNetwork) -> Self {
        Self {
            config,
            network,
            blueprints: Vec::new(),
            spawn_params: SpawnAdmissionParams::default(),
            graph_factory: None,
        }
    }

    /// Supply the blueprints evaluated for admission starting at tick 0.
    ///
    /// Additional blueprints may be queued later via [`Sim::queue_spawn`].
    pub fn agents(mut self, blueprints: Vec<SpawnBlueprint>) -> Self {
        self.blueprints = blueprints;
        self
    }

    /// Override the §4.5 spawn-admission tunables.
    pub fn spawn_params(mut self, params: SpawnAdmissionParams) -> Self {
        self.spawn_params = params;
        self
    }

    /// Supply the factory building a fresh [`ComponentGraph`] for each newly
    /// admitted agent. If not called, every agent gets a graph holding only
    /// the built-in [`dt_collision::CollisionComponent`] — the one concrete
    /// behavior this core implements (§1); sensor/algorithm/action
    /// components are an external collaborator's responsibility to wire in.
    pub fn graph_factory(mut self, factory: GraphFactory) -> Self {
        self.graph_factory = Some(factory);
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        if self.config.global_cycle_time_ms == 0 {
            return Err(SimError::Config("global_cycle_time_ms must be non-zero".to_string()));
        }

        let world = WorldState::new(self.network);
        let cycle_time_ms = self.config.global_cycle_time_ms;
        let graph_factory = self.graph_factory.unwrap_or_else(|| default_graph_factory(cycle_time_ms));
        let spawn_admission = SpawnAdmission::new(self.spawn_params);

        Ok(Sim::new(self.config, world, graph_factory, spawn_admission, self.blueprints, 0))
    }
}

/// One `CollisionComponent`, wired to no channels (it has no inputs and its
/// lone output port isn't consumed by anything in the default graph).
fn default_graph_factory(cycle_time_ms: u32) -> GraphFactory {
    Box::new(move |agent: &Agent| {
        let collision = dt_collision::CollisionComponent::new(agent.id, cycle_time_ms);
        ComponentGraph::new(vec![Box::new(collision)], Vec::new())
    })
}
