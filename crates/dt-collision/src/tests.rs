//! Unit tests for dt-collision.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use dt_core::{AgentId, Point2D, Tick};
use dt_road::{GeometrySegment, Lane, LaneSection, LaneType, PlacedSegment, RoadNetworkBuilder, WidthPoly};
use dt_world::{Agent, AgentCategory, CollisionPartner, DynamicState, VehicleModelParameters, WorldState};

use dt_graph::Component;

use super::CollisionComponent;

fn straight_road(length: f64) -> dt_road::RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let mut lanes = BTreeMap::new();
    lanes.insert(
        -1,
        Lane {
            lane_type: LaneType::Driving,
            width: vec![WidthPoly { s_offset: 0.0, a: 3.5, b: 0.0, c: 0.0, d: 0.0 }],
            predecessor: None,
            successor: None,
            road_marks: vec![],
        },
    );
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

fn model(weight: f64) -> VehicleModelParameters {
    VehicleModelParameters {
        length: 4.5,
        width: 1.8,
        height: 1.5,
        wheelbase: 2.7,
        weight,
        moment_of_inertia_yaw: 2500.0,
        max_velocity: 60.0,
        friction_coefficient: 0.9,
        distance_reference_point_to_leading_edge: 3.8,
    }
}

/// Scenario 3: 1500 kg @ 20 m/s vs. 1000 kg @ 10 m/s opposite heading.
#[test]
fn opposing_collision_combines_to_eight_metres_per_second_then_stops_in_point_eight_seconds() {
    let mut world = WorldState::new(straight_road(500.0));

    let mut state = DynamicState::default();
    state.x = 50.0;
    state.velocity = 20.0;
    state.yaw = 0.0;
    let mut agent = Agent::new(AgentId(0), AgentCategory::Ego, model(1500.0), state);
    agent.collision_partners.push(CollisionPartner {
        agent: AgentId(1),
        is_fixed_object: false,
        partner_mass: 1000.0,
        partner_velocity: 10.0,
        partner_heading: PI,
    });
    world.add_agent(agent).unwrap();
    world.sync_global_data();

    // cycle_time_ms = 100 keeps the deceleration math exact integers.
    let mut collision = CollisionComponent::new(AgentId(0), 100);

    collision.trigger(&mut world, AgentId(0), Tick(0)).unwrap();
    let v_after_latch = world.get_agent(AgentId(0)).unwrap().state.velocity;
    assert!((v_after_latch - 7.0).abs() < 1e-9, "expected 8 m/s latch minus one decel step, got {v_after_latch}");

    for t in 1..8 {
        collision.trigger(&mut world, AgentId(0), Tick(t)).unwrap();
    }
    let v_final = world.get_agent(AgentId(0)).unwrap().state.velocity;
    assert!(v_final.abs() < 1e-9, "expected velocity to reach 0, got {v_final}");

    // The agent keeps moving in the pre-collision heading, not re-latching
    // again since the partner count hasn't grown further.
    collision.trigger(&mut world, AgentId(0), Tick(8)).unwrap();
    let v_clamped = world.get_agent(AgentId(0)).unwrap().state.velocity;
    assert_eq!(v_clamped, 0.0);
}

#[test]
fn fixed_object_partner_stops_the_agent_immediately() {
    let mut world = WorldState::new(straight_road(500.0));

    let mut state = DynamicState::default();
    state.x = 50.0;
    state.velocity = 15.0;
    state.yaw = 0.0;
    let mut agent = Agent::new(AgentId(0), AgentCategory::Common, model(1200.0), state);
    agent.collision_partners.push(CollisionPartner {
        agent: AgentId(1),
        is_fixed_object: true,
        partner_mass: 0.0,
        partner_velocity: 0.0,
        partner_heading: 0.0,
    });
    world.add_agent(agent).unwrap();
    world.sync_global_data();

    let mut collision = CollisionComponent::new(AgentId(0), 100);
    collision.trigger(&mut world, AgentId(0), Tick(0)).unwrap();

    let v = world.get_agent(AgentId(0)).unwrap().state.velocity;
    assert_eq!(v, 0.0);
}

#[test]
fn growing_partner_set_triggers_a_fresh_relatch() {
    let mut world = WorldState::new(straight_road(500.0));

    let mut state = DynamicState::default();
    state.x = 50.0;
    state.velocity = 20.0;
    state.yaw = 0.0;
    let mut agent = Agent::new(AgentId(0), AgentCategory::Ego, model(1500.0), state);
    agent.collision_partners.push(CollisionPartner {
        agent: AgentId(1),
        is_fixed_object: false,
        partner_mass: 1000.0,
        partner_velocity: 10.0,
        partner_heading: PI,
    });
    world.add_agent(agent).unwrap();
    world.sync_global_data();

    let mut collision = CollisionComponent::new(AgentId(0), 100);
    collision.trigger(&mut world, AgentId(0), Tick(0)).unwrap();
    let v_after_first = world.get_agent(AgentId(0)).unwrap().state.velocity;

    // A second partner joins — the component must recompute over both,
    // not just the new one.
    let mut updated = world.get_agent(AgentId(0)).unwrap().clone();
    updated.collision_partners.push(CollisionPartner {
        agent: AgentId(2),
        is_fixed_object: false,
        partner_mass: 500.0,
        partner_velocity: 0.0,
        partner_heading: 0.0,
    });
    *world.get_agent_mut(AgentId(0)).unwrap() = updated;

    collision.trigger(&mut world, AgentId(0), Tick(1)).unwrap();
    let v_after_second = world.get_agent(AgentId(0)).unwrap().state.velocity;
    assert_ne!(v_after_first, v_after_second);
}
