//! `WorldState` (C1, §4.1): the canonical road network, agent/object
//! registry, deferred update queue, and the spatial query surface every
//! sensor component depends on.

use dt_core::{AgentId, RoadId, TrafficObjectId};
use dt_localize::LocalizationIndex;
use dt_road::RoadNetwork;

use crate::agent::{Agent, BoundaryPoint, Located};
use crate::error::{WorldError, WorldResult};
use crate::object::TrafficObject;
use crate::update::{AgentUpdate, UpdateQueue};

#[cfg(feature = "fx-hash")]
type LaneIndexMap = rustc_hash::FxHashMap<(RoadId, i32), Vec<AgentId>>;
#[cfg(not(feature = "fx-hash"))]
type LaneIndexMap = std::collections::HashMap<(RoadId, i32), Vec<AgentId>>;

/// Localization's `samplingWidth` parameter (§6), applied uniformly to
/// every agent's footprint sampling during `sync_global_data`'s relocation
/// pass. 0.5 m matches the teacher/openPASS default.
const DEFAULT_SAMPLING_WIDTH: f64 = 0.5;

/// The shared mutable world: road network, agents, traffic objects, and the
/// deferred update machinery (§4.1, §9 "arena + stable integer ids").
pub struct WorldState {
    network: RoadNetwork,
    loc_index: LocalizationIndex,
    sampling_width: f64,
    agents: Vec<Option<Agent>>,
    removed_agents: Vec<Agent>,
    objects: Vec<TrafficObject>,
    queue: UpdateQueue,
    /// `(road, lane) -> agent ids`, rebuilt every `sync_global_data` call.
    /// An O(1) membership structure only — never iterated in an order that
    /// affects observable output (§9: unordered collections must not drive
    /// observable iteration order; the per-lane `Vec<AgentId>` inside it is
    /// kept sorted so even a lookup hit is reproducible).
    lane_index: LaneIndexMap,
}

impl WorldState {
    /// Build a world over `network`, indexing its geometry once (§9: the
    /// localization cache "is built once at road load and never
    /// invalidated").
    pub fn new(network: RoadNetwork) -> Self {
        let loc_index = LocalizationIndex::build(&network);
        Self {
            network,
            loc_index,
            sampling_width: DEFAULT_SAMPLING_WIDTH,
            agents: Vec::new(),
            removed_agents: Vec::new(),
            objects: Vec::new(),
            queue: UpdateQueue::new(),
            lane_index: LaneIndexMap::default(),
        }
    }

    /// Override the localization `samplingWidth` parameter (§6).
    pub fn with_sampling_width(mut self, sampling_width: f64) -> Self {
        self.sampling_width = sampling_width;
        self
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    // ── Registry ──────────────────────────────────────────────────────────

    /// Register a new agent. Fails with `DuplicateId` if `id` is already
    /// occupied (§4.1).
    pub fn add_agent(&mut self, agent: Agent) -> WorldResult<()> {
        let idx = agent.id.index();
        if idx >= self.agents.len() {
            self.agents.resize_with(idx + 1, || None);
        }
        if self.agents[idx].is_some() {
            return Err(WorldError::DuplicateId(agent.id));
        }
        self.agents[idx] = Some(agent);
        Ok(())
    }

    pub fn add_object(&mut self, object: TrafficObject) -> TrafficObjectId {
        let id = object.id;
        let idx = id.index();
        if idx >= self.objects.len() {
            // Objects are always appended in id order by the caller; this
            // branch only matters for sparse/out-of-order test setups.
            self.objects.resize_with(idx, || object);
        }
        if idx == self.objects.len() {
            self.objects.push(object);
        } else {
            self.objects[idx] = object;
        }
        id
    }

    pub fn get_agent(&self, id: AgentId) -> WorldResult<&Agent> {
        self.agents
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(WorldError::UnknownAgent(id))
    }

    pub fn get_agent_mut(&mut self, id: AgentId) -> WorldResult<&mut Agent> {
        self.agents
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(WorldError::UnknownAgent(id))
    }

    /// All live agents in ascending `AgentId` order (§9 determinism: `Vec`
    /// iteration is already sorted-key order by construction).
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter_map(Option::as_ref)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_some()).count()
    }

    pub fn removed_agents(&self) -> &[Agent] {
        &self.removed_agents
    }

    pub fn objects(&self) -> &[TrafficObject] {
        &self.objects
    }

    pub fn object(&self, id: TrafficObjectId) -> Option<&TrafficObject> {
        self.objects.get(id.index())
    }

    // ── Deferred mutation ────────────────────────────────────────────────

    pub fn queue_agent_update(&mut self, agent: AgentId, update: AgentUpdate) {
        self.queue.push_update(agent, update);
    }

    pub fn queue_agent_remove(&mut self, agent: AgentId) {
        self.queue.push_removal(agent);
    }

    pub fn pending_update_count(&self) -> usize {
        self.queue.pending_update_count()
    }

    /// §4.1: drain the update queue FIFO, then the remove queue (moving
    /// removed agents into history), then re-localize every remaining
    /// agent. Agents that fail to relocate or leave the road network are
    /// marked invalid and queued for removal on the *next* sync.
    pub fn sync_global_data(&mut self) {
        for (agent_id, update) in self.queue.drain_updates() {
            let idx = agent_id.index();
            let Some(Some(agent)) = self.agents.get_mut(idx) else {
                log::warn!("queued update for unknown or removed agent {agent_id}");
                continue;
            };
            apply_update(agent, update);
        }

        for agent_id in self.queue.drain_removals() {
            let idx = agent_id.index();
            if let Some(slot) = self.agents.get_mut(idx) {
                if let Some(agent) = slot.take() {
                    self.removed_agents.push(agent);
                }
            }
        }

        let mut newly_invalid = Vec::new();
        for slot in self.agents.iter_mut() {
            let Some(agent) = slot else { continue };
            let footprint = agent.oriented_box();
            let reference = agent.reference_point();
            let result = dt_localize::localize(
                &self.loc_index,
                &self.network,
                &footprint,
                reference,
                self.sampling_width,
            );

            if !result.is_localizable || result.is_leaving_world {
                agent.valid = false;
                newly_invalid.push(agent.id);
                continue;
            }

            agent.located = Located {
                road_id: result.main_road_id,
                main_lane_id: result.main_lane_id,
                secondary_covered_lane_ids: result.touched_lane_ids.clone(),
                s: result.global_road_position.map(|p| p.s).unwrap_or(agent.located.s),
                t: result.global_road_position.map(|p| p.t).unwrap_or(agent.located.t),
                hdg: result.global_road_position.map(|p| p.hdg).unwrap_or(agent.located.hdg),
                left_boundary: result
                    .left_boundary
                    .map(|(s, t)| BoundaryPoint { s, t })
                    .unwrap_or_default(),
                right_boundary: result
                    .right_boundary
                    .map(|(s, t)| BoundaryPoint { s, t })
                    .unwrap_or_default(),
                left_remainder: result.left_remainder,
                right_remainder: result.right_remainder,
            };
        }

        for id in newly_invalid {
            self.queue.push_removal(id);
        }

        self.rebuild_lane_index();
    }

    fn rebuild_lane_index(&mut self) {
        self.lane_index.clear();
        for agent in self.agents() {
            let (Some(road_id), Some(lane_id)) = (agent.located.road_id, agent.located.main_lane_id) else {
                continue;
            };
            self.lane_index.entry((road_id, lane_id)).or_default().push(agent.id);
        }
        for ids in self.lane_index.values_mut() {
            ids.sort_unstable();
        }
    }

    // ── Spatial query surface (§4.1) ─────────────────────────────────────

    /// The nearest agent ahead of `from_s` on `(road_id, lane_id)`, or
    /// `None` if there is none (sentinel: empty result, per §4.1's "never
    /// throws").
    pub fn next_object_in_lane(&self, road_id: RoadId, lane_id: i32, from_s: f64) -> Option<&Agent> {
        self.lane_agents(road_id, lane_id)
            .filter(|a| a.located.s > from_s)
            .min_by(|a, b| a.located.s.partial_cmp(&b.located.s).unwrap())
    }

    /// The nearest agent upstream (behind) `from_s` on the given lane.
    pub fn closest_object_upstream(&self, road_id: RoadId, lane_id: i32, from_s: f64) -> Option<&Agent> {
        self.lane_agents(road_id, lane_id)
            .filter(|a| a.located.s < from_s)
            .max_by(|a, b| a.located.s.partial_cmp(&b.located.s).unwrap())
    }

    /// Live agents whose main lane is `(road_id, lane_id)`, via the O(1)
    /// lane index rebuilt each `sync_global_data`.
    fn lane_agents(&self, road_id: RoadId, lane_id: i32) -> impl Iterator<Item = &Agent> {
        self.lane_index
            .get(&(road_id, lane_id))
            .into_iter()
            .flatten()
            .filter_map(move |id| self.get_agent(*id).ok())
            .filter(|a| a.valid)
    }

    /// Remaining distance to the end of the driving lane starting at `s`.
    /// Returns `f64::INFINITY` if the road/lane doesn't exist (§4.1
    /// sentinel policy).
    pub fn distance_to_end_of_driving_lane(&self, road_id: RoadId, s: f64) -> f64 {
        match self.network.road(road_id) {
            Some(road) => (road.length - s).max(0.0),
            None => f64::INFINITY,
        }
    }

    /// Whether a lane exists immediately to the left (`+1`) or right (`-1`)
    /// of `lane_id` at `s`.
    pub fn has_lane(&self, road_id: RoadId, lane_id: i32, s: f64) -> bool {
        let Some(road) = self.network.road(road_id) else { return false };
        let section = road.lane_section_at(s);
        section.lanes.contains_key(&lane_id)
    }

    /// Lane width at `s`; `0.0` if the lane/road doesn't exist.
    pub fn lane_width_at(&self, road_id: RoadId, lane_id: i32, s: f64) -> f64 {
        let Some(road) = self.network.road(road_id) else { return 0.0 };
        let section = road.lane_section_at(s);
        section.lanes.get(&lane_id).map(|lane| lane.width_at(s - section.start_s)).unwrap_or(0.0)
    }

    /// Reference-line curvature at `s`; `0.0` if the road doesn't exist.
    pub fn lane_curvature_at(&self, road_id: RoadId, s: f64) -> f64 {
        self.network.road(road_id).map(|r| r.curvature_at(s)).unwrap_or(0.0)
    }

    /// Road signals within `[s - back, s + front]` that apply to `lane_id`.
    /// Empty if the road doesn't exist (§4.1 sentinel).
    pub fn signals_in_range(
        &self,
        road_id: RoadId,
        lane_id: i32,
        s: f64,
        back: f64,
        front: f64,
    ) -> Vec<&dt_road::RoadSignal> {
        let Some(road) = self.network.road(road_id) else { return Vec::new() };
        road.signals
            .iter()
            .filter(|sig| sig.s >= s - back && sig.s <= s + front && sig.applies_to(lane_id))
            .collect()
    }

    /// Agents in `[s - back, s + front]` on `relative_lane` (signed offset
    /// from `lane_id`, e.g. `-1` = one lane to the right).
    pub fn objects_in_range(
        &self,
        road_id: RoadId,
        lane_id: i32,
        relative_lane: i32,
        s: f64,
        back: f64,
        front: f64,
    ) -> Vec<&Agent> {
        let target_lane = lane_id + relative_lane;
        self.lane_agents(road_id, target_lane)
            .filter(|a| a.located.s >= s - back && a.located.s <= s + front)
            .collect()
    }

    /// Lateral distance between two global road points on the same road
    /// (difference of `t` values; `f64::INFINITY` across different roads).
    pub fn lateral_distance(&self, road_id: RoadId, t_a: f64, other_road: RoadId, t_b: f64) -> f64 {
        if road_id != other_road {
            return f64::INFINITY;
        }
        (t_a - t_b).abs()
    }
}

fn apply_update(agent: &mut Agent, update: AgentUpdate) {
    match update {
        AgentUpdate::SetDynamicState(state) => agent.state = state,
        AgentUpdate::SetLocated(located) => agent.located = located,
        AgentUpdate::AddCollisionPartner(partner) => {
            if !agent.has_collision_partner(partner.agent) {
                agent.collision_partners.push(partner);
            }
        }
        AgentUpdate::SetVelocity(v) => agent.state.velocity = v,
        AgentUpdate::Invalidate => agent.valid = false,
    }
}
