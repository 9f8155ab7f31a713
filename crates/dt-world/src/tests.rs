//! Unit tests for dt-world.

use std::collections::BTreeMap;

use dt_core::{AgentId, Point2D, RoadId};
use dt_road::{GeometrySegment, Lane, LaneSection, LaneType, PlacedSegment, RoadNetworkBuilder, WidthPoly};

use crate::agent::{Agent, AgentCategory, DynamicState, VehicleModelParameters};
use crate::update::AgentUpdate;
use crate::world::WorldState;

fn one_lane(width: f64) -> Lane {
    Lane {
        lane_type: LaneType::Driving,
        width: vec![WidthPoly { s_offset: 0.0, a: width, b: 0.0, c: 0.0, d: 0.0 }],
        predecessor: None,
        successor: None,
        road_marks: vec![],
    }
}

fn straight_road(length: f64) -> dt_road::RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let mut lanes = BTreeMap::new();
    lanes.insert(-1, one_lane(3.5));
    b.add_road(
        vec![PlacedSegment {
            start_s: 0.0,
            length,
            start_point: Point2D::new(0.0, 0.0),
            start_hdg: 0.0,
            kind: GeometrySegment::Line,
        }],
        vec![LaneSection { start_s: 0.0, lanes }],
        vec![],
        vec![],
    );
    b.build()
}

fn car_model() -> VehicleModelParameters {
    VehicleModelParameters {
        length: 4.5,
        width: 1.8,
        height: 1.5,
        wheelbase: 2.7,
        weight: 1500.0,
        moment_of_inertia_yaw: 2500.0,
        max_velocity: 50.0,
        friction_coefficient: 0.9,
        distance_reference_point_to_leading_edge: 3.5,
    }
}

fn agent_at(id: u32, x: f64, y: f64) -> Agent {
    let mut state = DynamicState::default();
    state.x = x;
    state.y = y;
    Agent::new(AgentId(id), AgentCategory::Common, car_model(), state)
}

#[test]
fn add_agent_duplicate_id_fails() {
    let mut world = WorldState::new(straight_road(200.0));
    world.add_agent(agent_at(0, 10.0, -1.75)).unwrap();
    let err = world.add_agent(agent_at(0, 20.0, -1.75));
    assert!(err.is_err());
}

#[test]
fn sync_localizes_agents_onto_lane() {
    let mut world = WorldState::new(straight_road(200.0));
    world.add_agent(agent_at(0, 50.0, -1.75)).unwrap();
    world.sync_global_data();

    let agent = world.get_agent(AgentId(0)).unwrap();
    assert!(agent.valid);
    assert_eq!(agent.located.road_id, Some(RoadId(0)));
    assert_eq!(agent.located.main_lane_id, Some(-1));
    assert!((agent.located.s - 50.0).abs() < 1e-6);
}

#[test]
fn agent_leaving_world_is_queued_for_removal_next_sync() {
    let mut world = WorldState::new(straight_road(200.0));
    world.add_agent(agent_at(0, 50.0, -1.75)).unwrap();
    world.sync_global_data();
    assert_eq!(world.agent_count(), 1);

    // Move the agent far outside the network via a deferred update.
    let mut far_state = world.get_agent(AgentId(0)).unwrap().state;
    far_state.x = 100_000.0;
    far_state.y = 100_000.0;
    world.queue_agent_update(AgentId(0), AgentUpdate::SetDynamicState(far_state));
    world.sync_global_data();
    assert!(!world.get_agent(AgentId(0)).unwrap().valid);
    assert_eq!(world.agent_count(), 1, "still present until the following sync drains the removal");

    world.sync_global_data();
    assert_eq!(world.agent_count(), 0);
    assert_eq!(world.removed_agents().len(), 1);
}

#[test]
fn update_queue_drains_fifo_last_writer_wins() {
    let mut world = WorldState::new(straight_road(200.0));
    world.add_agent(agent_at(0, 50.0, -1.75)).unwrap();
    world.sync_global_data();

    world.queue_agent_update(AgentId(0), AgentUpdate::SetVelocity(10.0));
    world.queue_agent_update(AgentId(0), AgentUpdate::SetVelocity(20.0));
    assert_eq!(world.pending_update_count(), 2);
    world.sync_global_data();

    assert_eq!(world.get_agent(AgentId(0)).unwrap().state.velocity, 20.0);
    assert_eq!(world.pending_update_count(), 0);
}

#[test]
fn next_object_in_lane_finds_downstream_agent() {
    let mut world = WorldState::new(straight_road(200.0));
    world.add_agent(agent_at(0, 10.0, -1.75)).unwrap();
    world.add_agent(agent_at(1, 50.0, -1.75)).unwrap();
    world.sync_global_data();

    let found = world.next_object_in_lane(RoadId(0), -1, 10.0).unwrap();
    assert_eq!(found.id, AgentId(1));
    assert!(world.next_object_in_lane(RoadId(0), -1, 60.0).is_none());
}

#[test]
fn distance_to_end_of_driving_lane_sentinel_for_unknown_road() {
    let world = WorldState::new(straight_road(200.0));
    assert_eq!(world.distance_to_end_of_driving_lane(RoadId(99), 0.0), f64::INFINITY);
}

#[test]
fn signals_in_range_empty_for_unknown_road() {
    let world = WorldState::new(straight_road(200.0));
    assert!(world.signals_in_range(RoadId(99), -1, 0.0, 10.0, 10.0).is_empty());
}

#[test]
fn unknown_agent_lookup_errors() {
    let world = WorldState::new(straight_road(200.0));
    assert!(world.get_agent(AgentId(42)).is_err());
}

#[test]
fn sync_is_idempotent_when_queue_empty() {
    let mut world = WorldState::new(straight_road(200.0));
    world.add_agent(agent_at(0, 50.0, -1.75)).unwrap();
    world.sync_global_data();
    let s_before = world.get_agent(AgentId(0)).unwrap().located.s;
    world.sync_global_data();
    let s_after = world.get_agent(AgentId(0)).unwrap().located.s;
    assert_eq!(s_before, s_after);
}
