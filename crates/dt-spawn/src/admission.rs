//! Spawn Admission (C5, §4.5): the per-tick decision procedure that turns a
//! proposed [`SpawnBlueprint`] into an [`SpawnDecision`].

use dt_world::{AgentCategory, WorldState};

use crate::blueprint::{SpawnBlueprint, SpawnDecision};
use crate::crash::{corridors_overlap, full_braking_distance, will_crash};
use crate::params::SpawnAdmissionParams;

/// Stateless decision procedure over a [`SpawnAdmissionParams`] parameter
/// bag. One instance is shared by every spawn point (§4.5: the parameters
/// are a fixed tuning surface, not per-agent state).
#[derive(Copy, Clone, Debug, Default)]
pub struct SpawnAdmission {
    params: SpawnAdmissionParams,
}

impl SpawnAdmission {
    pub fn new(params: SpawnAdmissionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SpawnAdmissionParams {
        &self.params
    }

    /// Evaluate one blueprint against the current world. `cycle_time_ms` is
    /// the scheduler's global cycle time, needed for the hold-back search's
    /// step size (§4.5).
    pub fn evaluate(&self, blueprint: &SpawnBlueprint, world: &WorldState, cycle_time_ms: u64) -> SpawnDecision {
        match blueprint.category {
            AgentCategory::Ego | AgentCategory::Scenario => self.evaluate_mandatory(blueprint, world),
            AgentCategory::Common => self.evaluate_common(blueprint, world, cycle_time_ms),
        }
    }

    /// §4.5 point 3: Ego/Scenario agents bypass admission control. The only
    /// failure mode is a placement that doesn't exist on the network at
    /// all, which the caller must treat as an aborted run.
    fn evaluate_mandatory(&self, blueprint: &SpawnBlueprint, world: &WorldState) -> SpawnDecision {
        let on_network = world
            .network()
            .road(blueprint.road_id)
            .is_some_and(|road| (0.0..=road.length).contains(&blueprint.s));
        if on_network {
            SpawnDecision::Mandatory { velocity: blueprint.velocity }
        } else {
            SpawnDecision::Abort
        }
    }

    /// §4.5's full decision procedure for `Common` agents: find the nearest
    /// opponent ahead, check whether it constrains this spawn at all (free
    /// space, driving-corridor overlap), and if it does, try a hold-back
    /// delay before falling back to a reduced spawn velocity. No opponent,
    /// or one the corridor test clears, admits at the requested velocity.
    ///
    /// The upstream decision procedure walks every opponent within a search
    /// window, carrying reductions forward opponent-by-opponent; this
    /// reduces that to the single nearest opponent in the lane, which is
    /// the case the source's own commentary treats as primary (a closer
    /// second opponent can never be the binding constraint once the first
    /// is cleared, since motion is monotonic along `s`).
    fn evaluate_common(&self, blueprint: &SpawnBlueprint, world: &WorldState, cycle_time_ms: u64) -> SpawnDecision {
        let Some(opponent) = world.next_object_in_lane(blueprint.road_id, blueprint.lane_id, blueprint.s) else {
            return self.evaluate_no_opponent(blueprint, world);
        };

        let free_space = opponent.rear_edge_s() - blueprint.leading_edge_s() - self.params.min_spawning_distance_m;
        if free_space <= 0.0 {
            log::warn!(
                "spawn rejected: free space {:.2} m at or below minSpawningDistance on road {:?} lane {}",
                free_space + self.params.min_spawning_distance_m,
                blueprint.road_id,
                blueprint.lane_id
            );
            return SpawnDecision::Reject;
        }

        let v_ego = blueprint.velocity;
        let v_front = opponent.state.velocity;
        let a_ego = self.params.assumed_brake_acceleration_ego;
        let a_front = self.params.assumed_front_deceleration;

        let ego_box = blueprint.oriented_box(world);
        let front_box = opponent.oriented_box();
        let d_brake = full_braking_distance(v_ego, a_ego, self.params.ttb_s);
        let front_advance = (v_front * self.params.ttb_s).max(0.0);
        if !corridors_overlap(&ego_box, d_brake, &front_box, front_advance) {
            return SpawnDecision::Admit { velocity: v_ego };
        }

        if !will_crash(free_space, v_ego, a_ego, v_front, a_front, self.params.ttb_s) {
            return SpawnDecision::Admit { velocity: v_ego };
        }

        if let Some(after_ms) = self.try_holdback(free_space, v_ego, a_ego, v_front, a_front, cycle_time_ms) {
            return SpawnDecision::HoldBack { after_ms };
        }

        let reduced = reduce_until_safe(
            free_space,
            v_ego,
            a_ego,
            v_front,
            a_front,
            self.params.ttb_s,
            self.params.velocity_reduction_step_mps,
        );
        if reduced > 0.0 {
            SpawnDecision::Admit { velocity: reduced }
        } else {
            SpawnDecision::Reject
        }
    }

    /// §4.5 point 1: no opponent found within the search window. Admit at
    /// the requested velocity if the remaining free lane length clears the
    /// full braking distance; otherwise reduce in fixed steps, rejecting if
    /// the free lane length is below `minSpawningDistance`.
    fn evaluate_no_opponent(&self, blueprint: &SpawnBlueprint, world: &WorldState) -> SpawnDecision {
        let free = world.distance_to_end_of_driving_lane(blueprint.road_id, blueprint.s);
        if free <= self.params.min_spawning_distance_m {
            log::warn!(
                "spawn rejected: only {:.2} m of lane remains at or below minSpawningDistance on road {:?} lane {}",
                free,
                blueprint.road_id,
                blueprint.lane_id
            );
            return SpawnDecision::Reject;
        }
        let v_ego = blueprint.velocity;
        let d_brake = full_braking_distance(v_ego, self.params.assumed_brake_acceleration_ego, self.params.ttb_s);
        if free >= d_brake {
            return SpawnDecision::Admit { velocity: v_ego };
        }
        let reduced = reduce_until_safe(
            free,
            v_ego,
            self.params.assumed_brake_acceleration_ego,
            0.0,
            0.0,
            self.params.ttb_s,
            self.params.velocity_reduction_step_mps,
        );
        if reduced > 0.0 {
            SpawnDecision::Admit { velocity: reduced }
        } else {
            SpawnDecision::Reject
        }
    }

    /// §4.5's `CalculateHoldbackTime`: search for a delay (in multiples of
    /// the cycle time, up to `maxHoldbackTime`) after which the lead
    /// vehicle has moved far enough that the spawn no longer predicts a
    /// crash. A stationary lead vehicle (`v_front <= 0`) can never clear by
    /// waiting, so that case is rejected immediately.
    fn try_holdback(
        &self,
        free_space: f64,
        v_ego: f64,
        a_ego: f64,
        v_front: f64,
        a_front: f64,
        cycle_time_ms: u64,
    ) -> Option<u64> {
        if v_front <= 0.0 || cycle_time_ms == 0 {
            return None;
        }
        let mut holdback_ms = cycle_time_ms;
        while holdback_ms <= self.params.max_holdback_time_ms {
            let predicted_free = free_space + (holdback_ms as f64 / 1000.0) * v_front;
            if !will_crash(predicted_free, v_ego, a_ego, v_front, a_front, self.params.ttb_s) {
                return Some(holdback_ms);
            }
            holdback_ms += cycle_time_ms;
        }
        None
    }
}

/// §4.5's velocity-adaptation loop: reduce the spawn velocity in fixed
/// steps until the crash predicate clears or the velocity bottoms out at
/// zero (at which point the spawn point must reject instead).
fn reduce_until_safe(
    free_space: f64,
    mut v_ego: f64,
    a_ego: f64,
    v_front: f64,
    a_front: f64,
    ttb_s: f64,
    step: f64,
) -> f64 {
    while v_ego > 0.0 && will_crash(free_space, v_ego, a_ego, v_front, a_front, ttb_s) {
        v_ego = (v_ego - step).max(0.0);
    }
    v_ego
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use dt_core::{Point2D, RoadId};
    use dt_road::{GeometrySegment, Lane, LaneSection, LaneType, PlacedSegment, RoadNetworkBuilder, WidthPoly};
    use dt_world::{Agent, AgentCategory, DynamicState, VehicleModelParameters, WorldState};

    use super::*;

    fn model() -> VehicleModelParameters {
        VehicleModelParameters {
            length: 4.5,
            width: 1.8,
            height: 1.5,
            wheelbase: 2.7,
            weight: 1500.0,
            moment_of_inertia_yaw: 2500.0,
            max_velocity: 60.0,
            friction_coefficient: 0.9,
            distance_reference_point_to_leading_edge: 3.8,
        }
    }

    fn flat_lane_section(half_width: f64) -> LaneSection {
        let mut lanes = BTreeMap::new();
        lanes.insert(
            -1,
            Lane {
                lane_type: LaneType::Driving,
                width: vec![WidthPoly { s_offset: 0.0, a: half_width, b: 0.0, c: 0.0, d: 0.0 }],
                predecessor: None,
                successor: None,
                road_marks: vec![],
            },
        );
        LaneSection { start_s: 0.0, lanes }
    }

    fn straight_world(length: f64) -> WorldState {
        let mut builder = RoadNetworkBuilder::new();
        let segment = PlacedSegment {
            start_s: 0.0,
            length,
            start_point: Point2D::new(0.0, 0.0),
            start_hdg: 0.0,
            kind: GeometrySegment::Line,
        };
        builder.add_road(vec![segment], vec![flat_lane_section(1.75)], vec![], vec![]);
        WorldState::new(builder.build())
    }

    fn place_agent(world: &mut WorldState, id: u32, s: f64, velocity: f64) {
        let mut agent = Agent::new(dt_core::AgentId(id), AgentCategory::Common, model(), DynamicState {
            x: s,
            velocity,
            ..DynamicState::default()
        });
        agent.located.road_id = Some(RoadId(0));
        agent.located.main_lane_id = Some(-1);
        agent.located.s = s;
        world.add_agent(agent).unwrap();
        world.sync_global_data();
    }

    #[test]
    fn mandatory_agent_off_network_aborts() {
        let world = straight_world(200.0);
        let admission = SpawnAdmission::default();
        let blueprint = SpawnBlueprint {
            category: AgentCategory::Ego,
            road_id: RoadId(0),
            lane_id: -1,
            s: 500.0,
            velocity: 20.0,
            model: model(),
        };
        assert_eq!(admission.evaluate(&blueprint, &world, 100), SpawnDecision::Abort);
    }

    #[test]
    fn no_opponent_admits_at_requested_velocity() {
        let world = straight_world(200.0);
        let admission = SpawnAdmission::default();
        let blueprint = SpawnBlueprint {
            category: AgentCategory::Common,
            road_id: RoadId(0),
            lane_id: -1,
            s: 10.0,
            velocity: 20.0,
            model: model(),
        };
        assert_eq!(admission.evaluate(&blueprint, &world, 100), SpawnDecision::Admit { velocity: 20.0 });
    }

    #[test]
    fn short_remaining_road_reduces_velocity_when_no_opponent() {
        // Road ends 15 m ahead; full braking distance at 20 m/s (~53 m)
        // cannot fit, so admission must reduce velocity rather than admit
        // at the requested 20 m/s.
        let world = straight_world(15.0);
        let admission = SpawnAdmission::default();
        let blueprint = SpawnBlueprint {
            category: AgentCategory::Common,
            road_id: RoadId(0),
            lane_id: -1,
            s: 0.0,
            velocity: 20.0,
            model: model(),
        };
        match admission.evaluate(&blueprint, &world, 100) {
            SpawnDecision::Admit { velocity } => assert!(velocity < 20.0),
            SpawnDecision::Reject => {}
            other => panic!("expected Admit(reduced) or Reject, got {other:?}"),
        }
    }

    #[test]
    fn free_lane_below_min_spawning_distance_rejects() {
        let world = straight_world(0.5);
        let admission = SpawnAdmission::default();
        let blueprint = SpawnBlueprint {
            category: AgentCategory::Common,
            road_id: RoadId(0),
            lane_id: -1,
            s: 0.0,
            velocity: 20.0,
            model: model(),
        };
        assert_eq!(admission.evaluate(&blueprint, &world, 100), SpawnDecision::Reject);
    }

    /// §8 boundary behavior: "Spawn at exactly `freeSpace = minSpawningDistance`
    /// is rejected."
    #[test]
    fn free_lane_exactly_at_min_spawning_distance_rejects() {
        let params = SpawnAdmissionParams::default();
        let world = straight_world(params.min_spawning_distance_m);
        let admission = SpawnAdmission::default();
        let blueprint = SpawnBlueprint {
            category: AgentCategory::Common,
            road_id: RoadId(0),
            lane_id: -1,
            s: 0.0,
            velocity: 20.0,
            model: model(),
        };
        assert_eq!(admission.evaluate(&blueprint, &world, 100), SpawnDecision::Reject);
    }

    /// §8 boundary behavior: "at `minSpawningDistance + ε` is accepted with
    /// possibly reduced velocity" — here the remaining lane is still far
    /// short of the full braking distance, so admission reduces velocity
    /// rather than rejecting outright.
    #[test]
    fn free_lane_just_above_min_spawning_distance_admits_reduced() {
        let params = SpawnAdmissionParams::default();
        let world = straight_world(params.min_spawning_distance_m + 0.5);
        let admission = SpawnAdmission::default();
        let blueprint = SpawnBlueprint {
            category: AgentCategory::Common,
            road_id: RoadId(0),
            lane_id: -1,
            s: 0.0,
            velocity: 20.0,
            model: model(),
        };
        match admission.evaluate(&blueprint, &world, 100) {
            SpawnDecision::Admit { velocity } => assert!(velocity < 20.0),
            other => panic!("expected Admit(reduced), got {other:?}"),
        }
    }

    /// Opponent-branch analogue of the boundary property: a raw gap exactly
    /// equal to `minSpawningDistance` rejects (`spawnControl.cpp`'s
    /// `freeSpace <= minSpawningDistance`).
    #[test]
    fn opponent_gap_exactly_at_min_spawning_distance_rejects() {
        let params = SpawnAdmissionParams::default();
        let mut world = straight_world(200.0);
        // Opponent's rear edge sits exactly `minSpawningDistance` ahead of
        // the blueprint's leading edge.
        let lead_s = 10.0 + model().distance_reference_point_to_leading_edge
            + params.min_spawning_distance_m
            + (model().length - model().distance_reference_point_to_leading_edge);
        place_agent(&mut world, 1, lead_s, 0.0);
        let admission = SpawnAdmission::default();
        let blueprint = SpawnBlueprint {
            category: AgentCategory::Common,
            road_id: RoadId(0),
            lane_id: -1,
            s: 10.0,
            velocity: 20.0,
            model: model(),
        };
        assert_eq!(admission.evaluate(&blueprint, &world, 100), SpawnDecision::Reject);
    }

    #[test]
    fn stopped_lead_vehicle_twenty_metres_ahead_forces_reduction_or_rejection() {
        let mut world = straight_world(200.0);
        place_agent(&mut world, 1, 30.0, 0.0);
        let admission = SpawnAdmission::default();
        let blueprint = SpawnBlueprint {
            category: AgentCategory::Common,
            road_id: RoadId(0),
            lane_id: -1,
            s: 10.0,
            velocity: 20.0,
            model: model(),
        };
        match admission.evaluate(&blueprint, &world, 100) {
            SpawnDecision::Admit { velocity } => assert!(velocity < 20.0),
            SpawnDecision::Reject => {}
            other => panic!("expected Admit(reduced) or Reject, got {other:?}"),
        }
    }

    #[test]
    fn moving_lead_vehicle_far_enough_ahead_holds_back_or_admits() {
        let mut world = straight_world(500.0);
        place_agent(&mut world, 1, 60.0, 15.0);
        let admission = SpawnAdmission::default();
        let blueprint = SpawnBlueprint {
            category: AgentCategory::Common,
            road_id: RoadId(0),
            lane_id: -1,
            s: 10.0,
            velocity: 25.0,
            model: model(),
        };
        // Either outcome is acceptable provided the agent is not silently
        // dropped when the lead vehicle is already pulling away.
        match admission.evaluate(&blueprint, &world, 100) {
            SpawnDecision::Admit { .. } | SpawnDecision::HoldBack { .. } => {}
            other => panic!("expected Admit or HoldBack, got {other:?}"),
        }
    }
}
