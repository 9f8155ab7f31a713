//! `ComponentGraph` (§3, §4.3): a per-agent DAG of components connected by
//! typed signal channels, executed once per scheduler cycle.

use std::collections::{HashMap, HashSet};

use dt_core::{AgentId, ComponentId, Tick};
use dt_world::WorldState;

use crate::component::{Component, PortId};
use crate::error::{GraphError, GraphResult};
use crate::signal::Signal;

/// A directed edge: `src`'s output port feeds `dst`'s input port.
#[derive(Copy, Clone, Debug)]
pub struct Channel {
    pub src: ComponentId,
    pub src_port: PortId,
    pub dst: ComponentId,
    pub dst_port: PortId,
}

/// Outcome of one `run_cycle` call.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CycleOutcome {
    /// Every due component updated/triggered without error.
    Ok,
    /// At least one component received an unexpected signal type; the run
    /// continues but the caller should consider this agent's cycle failed
    /// (§4.3/§7).
    SignalTypeMismatch,
}

/// A per-agent DAG of components connected by typed signal channels.
/// Topology (`components` + `channels`) is static once built (§3); only the
/// components' internal state changes cycle to cycle.
pub struct ComponentGraph {
    components: Vec<Box<dyn Component>>,
    channels: Vec<Channel>,
    /// Precomputed once at construction (§3 "topology is static once
    /// built"): component indices in an order where every producer precedes
    /// its consumers, ties broken by ascending component name (§9).
    topo_order: Vec<usize>,
}

impl ComponentGraph {
    /// Build a graph from its components and channel wiring, computing the
    /// topological order once via Kahn's algorithm.
    pub fn new(components: Vec<Box<dyn Component>>, channels: Vec<Channel>) -> Self {
        let topo_order = topological_order(&components, &channels);
        Self { components, channels, topo_order }
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, id: ComponentId) -> Option<&dyn Component> {
        self.components.get(id.index()).map(|b| b.as_ref())
    }

    /// Execute one cycle (§4.3 steps 1-3) for `agent` at `time`.
    pub fn run_cycle(&mut self, world: &mut WorldState, agent: AgentId, time: Tick) -> GraphResult<CycleOutcome> {
        let mut outcome = CycleOutcome::Ok;

        // Step 1: update outputs, in topological order, for every due component.
        let mut minted: HashMap<(usize, PortId), Signal> = HashMap::new();
        for &idx in &self.topo_order {
            let due = self.components[idx].is_due(time);
            if !due {
                continue;
            }
            // A component may mint on more than one output port; probe the
            // small, fixed set of ports referenced by its outgoing channels.
            let out_ports: Vec<PortId> = self
                .channels
                .iter()
                .filter(|c| c.src.index() == idx)
                .map(|c| c.src_port)
                .collect();
            for port in out_ports {
                if let Some(signal) = self.components[idx].update_output(port, time)? {
                    minted.insert((idx, port), signal);
                }
            }
        }

        // Step 2: deliver each minted signal to its channel's destination.
        for channel in &self.channels {
            let Some(signal) = minted.get(&(channel.src.index(), channel.src_port)).cloned() else {
                continue;
            };
            let dst_idx = channel.dst.index();
            let Some(dst) = self.components.get_mut(dst_idx) else {
                return Err(GraphError::InvalidLink { component: channel.dst, port: channel.dst_port });
            };
            match dst.update_input(channel.dst_port, signal, time) {
                Ok(()) => {}
                Err(GraphError::InvalidLink { component, port }) => {
                    return Err(GraphError::InvalidLink { component, port });
                }
                Err(GraphError::InvalidSignalType { component, port, found, expected }) => {
                    log::error!(
                        "agent {agent}: component {component} port {port}: signal type mismatch (found {found}, expected {expected})"
                    );
                    outcome = CycleOutcome::SignalTypeMismatch;
                }
                Err(other) => return Err(other),
            }
        }

        // Step 3: trigger in ascending priority order, ties by ascending name (§9).
        let mut order: Vec<usize> = (0..self.components.len()).collect();
        order.sort_by(|&a, &b| {
            self.components[a]
                .priority()
                .cmp(&self.components[b].priority())
                .then_with(|| self.components[a].name().cmp(self.components[b].name()))
        });
        for idx in order {
            self.components[idx].trigger(world, agent, time)?;
        }

        Ok(outcome)
    }
}

/// Kahn's algorithm over the channel adjacency; ties among simultaneously
/// ready nodes broken by ascending component name (§9 determinism).
fn topological_order(components: &[Box<dyn Component>], channels: &[Channel]) -> Vec<usize> {
    let n = components.len();
    let mut indegree = vec![0usize; n];
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    for c in channels {
        let (src, dst) = (c.src.index(), c.dst.index());
        if src == dst || src >= n || dst >= n {
            continue;
        }
        adjacency[src].push(dst);
        indegree[dst] += 1;
    }

    let mut ready: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut order = Vec::with_capacity(n);
    let mut visited = HashSet::new();

    while !ready.is_empty() {
        ready.sort_by(|&a, &b| components[a].name().cmp(components[b].name()));
        let idx = ready.remove(0);
        if !visited.insert(idx) {
            continue;
        }
        order.push(idx);
        for &next in &adjacency[idx] {
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.push(next);
            }
        }
    }

    // Any component left out (a cycle in the wiring, which shouldn't occur
    // for a well-formed graph) is appended in index order so `run_cycle`
    // still visits every component exactly once.
    for i in 0..n {
        if !visited.contains(&i) {
            order.push(i);
        }
    }
    order
}
