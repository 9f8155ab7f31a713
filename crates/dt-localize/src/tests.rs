//! Unit tests for dt-localize.

use std::collections::BTreeMap;

use dt_core::{OrientedBox, Point2D};
use dt_road::{GeometrySegment, Lane, LaneSection, LaneType, PlacedSegment, RoadNetworkBuilder, WidthPoly};

use crate::{localize, LocalizationIndex};

fn line_segment(start_s: f64, length: f64) -> PlacedSegment {
    PlacedSegment {
        start_s,
        length,
        start_point: Point2D::new(start_s, 0.0),
        start_hdg: 0.0,
        kind: GeometrySegment::Line,
    }
}

fn one_lane(width: f64) -> Lane {
    Lane {
        lane_type: LaneType::Driving,
        width: vec![WidthPoly { s_offset: 0.0, a: width, b: 0.0, c: 0.0, d: 0.0 }],
        predecessor: None,
        successor: None,
        road_marks: vec![],
    }
}

fn two_lane_section(start_s: f64, width: f64) -> LaneSection {
    let mut lanes = BTreeMap::new();
    lanes.insert(-1, one_lane(width));
    lanes.insert(1, one_lane(width));
    LaneSection { start_s, lanes }
}

/// A single right lane (`id = -1`) of the given width; it spans
/// `t in [-width, 0]`, as every lane on that side of a road does — there is
/// no road-centered lane in this model, a lane is always one-sided.
fn single_right_lane_section(width: f64) -> LaneSection {
    let mut lanes = BTreeMap::new();
    lanes.insert(-1, one_lane(width));
    LaneSection { start_s: 0.0, lanes }
}

fn agent_box(center: Point2D, heading: f64, length: f64, width: f64) -> OrientedBox {
    OrientedBox::new(center, heading, length / 2.0, length / 2.0, width / 2.0)
}

#[test]
fn straight_line_point_on_reference_line_roundtrips() {
    let mut b = RoadNetworkBuilder::new();
    b.add_road(
        vec![line_segment(0.0, 500.0)],
        vec![two_lane_section(0.0, 1.75)],
        vec![],
        vec![],
    );
    let net = b.build();
    let index = LocalizationIndex::build(&net);

    let point = Point2D::new(123.4, 0.0);
    let boxed = agent_box(point, 0.0, 4.5, 1.8);
    let result = localize(&index, &net, &boxed, point, 0.25);

    assert!(result.is_localizable);
    let pos = result.global_road_position.expect("should localize on reference line");
    assert!((pos.s - 123.4).abs() < 1e-6);
    assert!(pos.t.abs() < 1e-6);
}

#[test]
fn agent_centered_in_lane_has_equal_remainders() {
    let mut b = RoadNetworkBuilder::new();
    b.add_road(
        vec![line_segment(0.0, 200.0)],
        vec![single_right_lane_section(3.0)],
        vec![],
        vec![],
    );
    let net = b.build();
    let index = LocalizationIndex::build(&net);

    // Lane -1 spans t in [-3.0, 0.0]; its centerline is t = -1.5.
    let point = Point2D::new(50.0, -1.5);
    let boxed = agent_box(point, 0.0, 4.5, 1.8);
    let result = localize(&index, &net, &boxed, point, 0.25);

    assert!(result.is_localizable);
    assert!(!result.is_crossing_lanes);
    assert!((result.left_remainder - 0.6).abs() < 1e-6);
    assert!((result.right_remainder - 0.6).abs() < 1e-6);
}

#[test]
fn agent_shifted_left_shrinks_left_remainder() {
    let mut b = RoadNetworkBuilder::new();
    b.add_road(
        vec![line_segment(0.0, 200.0)],
        vec![single_right_lane_section(3.0)],
        vec![],
        vec![],
    );
    let net = b.build();
    let index = LocalizationIndex::build(&net);

    // Shift the reference 0.5 m toward the left edge (t = -1.5 + 0.5).
    let point = Point2D::new(50.0, -1.0);
    let boxed = agent_box(point, 0.0, 4.5, 1.8);
    let result = localize(&index, &net, &boxed, point, 0.25);

    assert!(result.is_localizable);
    assert!(!result.is_crossing_lanes);
    assert!((result.left_remainder - 0.1).abs() < 1e-6);
    assert!((result.right_remainder - 1.1).abs() < 1e-6);
}

#[test]
fn agent_shifted_past_edge_is_crossing_lanes() {
    let mut b = RoadNetworkBuilder::new();
    b.add_road(
        vec![line_segment(0.0, 200.0)],
        vec![single_right_lane_section(3.0)],
        vec![],
        vec![],
    );
    let net = b.build();
    let index = LocalizationIndex::build(&net);

    // Reference still inside the lane (t = -0.8), but the left edge of a
    // 1.8 m-wide box (-0.8 + 0.9 = 0.1) now clears the lane's t=0 edge.
    let point = Point2D::new(50.0, -0.8);
    let boxed = agent_box(point, 0.0, 4.5, 1.8);
    let result = localize(&index, &net, &boxed, point, 0.25);

    assert!(result.is_localizable);
    assert!((result.left_remainder - (-0.1)).abs() < 1e-6);
}

#[test]
fn empty_network_is_not_localizable() {
    let net = dt_road::RoadNetwork::empty();
    let index = LocalizationIndex::build(&net);
    let point = Point2D::new(0.0, 0.0);
    let boxed = agent_box(point, 0.0, 4.5, 1.8);
    let result = localize(&index, &net, &boxed, point, 0.25);
    assert!(!result.is_localizable);
}

#[test]
fn far_from_every_road_is_not_localizable() {
    let mut b = RoadNetworkBuilder::new();
    b.add_road(vec![line_segment(0.0, 100.0)], vec![], vec![], vec![]);
    let net = b.build();
    let index = LocalizationIndex::build(&net);

    let point = Point2D::new(10_000.0, 10_000.0);
    let boxed = agent_box(point, 0.0, 4.5, 1.8);
    let result = localize(&index, &net, &boxed, point, 0.25);
    assert!(!result.is_localizable);
}

#[test]
fn lane_boundary_s_assigns_to_section_starting_there() {
    let mut b = RoadNetworkBuilder::new();
    b.add_road(
        vec![line_segment(0.0, 200.0)],
        vec![two_lane_section(0.0, 1.75), two_lane_section(100.0, 2.0)],
        vec![],
        vec![],
    );
    let net = b.build();
    let index = LocalizationIndex::build(&net);

    let point = Point2D::new(100.0, 0.0);
    let boxed = agent_box(point, 0.0, 4.5, 1.8);
    let result = localize(&index, &net, &boxed, point, 0.25);
    let pos = result.global_road_position.unwrap();
    assert!((pos.s - 100.0).abs() < 1e-6);
}

#[test]
fn arc_segment_projection_preserves_heading_change() {
    let radius = 100.0;
    let curvature = 1.0 / radius;
    let length = 50.0;
    let seg = PlacedSegment {
        start_s: 0.0,
        length,
        start_point: Point2D::new(0.0, 0.0),
        start_hdg: 0.0,
        kind: GeometrySegment::Arc { curvature },
    };
    let mut b = RoadNetworkBuilder::new();
    b.add_road(vec![seg], vec![two_lane_section(0.0, 1.75)], vec![], vec![]);
    let net = b.build();
    let index = LocalizationIndex::build(&net);

    let (on_arc, hdg_expected) = net.road(dt_core::RoadId(0)).unwrap().evaluate(25.0);
    let boxed = agent_box(on_arc, hdg_expected, 4.5, 1.8);
    let result = localize(&index, &net, &boxed, on_arc, 0.25);
    let pos = result.global_road_position.unwrap();
    assert!((pos.s - 25.0).abs() < 1e-6);
    assert!((pos.hdg - hdg_expected).abs() < 1e-6);
}
