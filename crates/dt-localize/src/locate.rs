//! The localization algorithm itself (§4.2).

use dt_core::{OrientedBox, Point2D, PointKind, RoadId};
use dt_road::{GeometrySegment, LaneSection, PlacedSegment, RoadNetwork};

use crate::cache::LocalizationIndex;

/// Road-frame coordinates of one projected point.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadPosition {
    pub road_id: RoadId,
    pub lane_id: i32,
    pub s: f64,
    pub t: f64,
    pub hdg: f64,
}

/// The full result of one `localize` call (§4.2 "Outputs per call").
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalizationResult {
    pub is_localizable: bool,
    pub is_leaving_world: bool,
    pub is_crossing_lanes: bool,
    pub main_road_id: Option<RoadId>,
    pub main_lane_id: Option<i32>,
    pub front_lane_ids: Vec<i32>,
    pub touched_lane_ids: Vec<i32>,
    pub global_road_position: Option<RoadPosition>,
    /// Road coordinates `(s, t)` of the outermost boundary sample on each
    /// side, used to derive `left_remainder`/`right_remainder`.
    pub left_boundary: Option<(f64, f64)>,
    pub right_boundary: Option<(f64, f64)>,
    pub left_remainder: f64,
    pub right_remainder: f64,
}

impl LocalizationResult {
    fn not_localizable() -> Self {
        Self {
            is_localizable: false,
            is_leaving_world: true,
            is_crossing_lanes: false,
            main_road_id: None,
            main_lane_id: None,
            front_lane_ids: Vec::new(),
            touched_lane_ids: Vec::new(),
            global_road_position: None,
            left_boundary: None,
            right_boundary: None,
            left_remainder: 0.0,
            right_remainder: 0.0,
        }
    }
}

/// A point projected onto the nearest road geometry, with its lane
/// membership (`None` if it falls outside every lane in its section).
struct Projected {
    road_id: RoadId,
    s: f64,
    t: f64,
    hdg: f64,
    lane_id: Option<i32>,
}

/// Map an agent footprint to road coordinates and lane membership (§4.2).
///
/// `reference_point` is typically the agent's mid-rear-axle point; it need
/// not be the oriented box's geometric center.
pub fn localize(
    index: &LocalizationIndex,
    network: &RoadNetwork,
    agent_box: &OrientedBox,
    reference_point: Point2D,
    sampling_width: f64,
) -> LocalizationResult {
    if network.is_empty() || index.is_empty() {
        return LocalizationResult::not_localizable();
    }

    let samples = agent_box.sample_perimeter(sampling_width);
    let reference = project_best(index, network, reference_point);
    let projected_samples: Vec<(PointKind, Option<Projected>)> = samples
        .iter()
        .map(|s| (s.kind, project_best(index, network, s.point)))
        .collect();

    let any_lane_hit = reference.as_ref().is_some_and(|p| p.lane_id.is_some())
        || projected_samples
            .iter()
            .any(|(_, p)| p.as_ref().is_some_and(|p| p.lane_id.is_some()));

    if !any_lane_hit {
        return LocalizationResult::not_localizable();
    }

    let mut touched = std::collections::BTreeSet::new();
    let mut front = std::collections::BTreeSet::new();
    for (kind, proj) in &projected_samples {
        if let Some(p) = proj {
            if let Some(lane_id) = p.lane_id {
                touched.insert(lane_id);
                if matches!(kind, PointKind::FrontLeft | PointKind::FrontRight | PointKind::FrontEdge) {
                    front.insert(lane_id);
                }
            }
        }
    }

    let main = reference.as_ref().and_then(|p| p.lane_id.map(|lane_id| (p.road_id, lane_id, p.s, p.t, p.hdg)));
    touched.retain(|id| Some(*id) != main.map(|(_, l, ..)| l));

    let (left_remainder, right_remainder, left_boundary, right_boundary) = match &main {
        Some((road_id, lane_id, s, ..)) => {
            remainders(network, *road_id, *lane_id, *s, &projected_samples)
        }
        None => (0.0, 0.0, None, None),
    };

    let is_crossing_lanes =
        main.is_none() || !touched.is_empty() || left_remainder < 0.0 || right_remainder < 0.0;

    LocalizationResult {
        is_localizable: true,
        is_leaving_world: false,
        is_crossing_lanes,
        main_road_id: main.map(|(r, ..)| r),
        main_lane_id: main.map(|(_, l, ..)| l),
        front_lane_ids: front.into_iter().collect(),
        touched_lane_ids: touched.into_iter().collect(),
        global_road_position: main.map(|(road_id, lane_id, s, t, hdg)| RoadPosition {
            road_id,
            lane_id,
            s,
            t,
            hdg,
        }),
        left_boundary,
        right_boundary,
        left_remainder,
        right_remainder,
    }
}

const BOUNDARY_EPS: f64 = 1e-9;

/// Project `point` against every candidate geometry element near it and
/// return the closest one, with its lane membership resolved.
fn project_best(index: &LocalizationIndex, network: &RoadNetwork, point: Point2D) -> Option<Projected> {
    let margin = 5.0;
    let min = Point2D::new(point.x - margin, point.y - margin);
    let max = Point2D::new(point.x + margin, point.y + margin);
    let candidates = network.query_candidates(min, max);

    let mut best: Option<(f64, Projected)> = None;
    for entry in candidates {
        let Some(seg) = network.segment_for(entry.id) else { continue };
        let hint = index.nearest_sample(entry.id, point);
        let (s, t, hdg) = project_onto_segment(seg, hint, point);
        let (proj_point, _) = seg.evaluate(s);
        let dist_sq = proj_point.distance_sq(point);
        if best.as_ref().is_none_or(|(d, _)| dist_sq < *d) {
            let road = network.road(entry.road).expect("query_candidates returns valid road ids");
            let section = road.lane_section_at(s);
            let lane_id = classify_lane(section, s - section.start_s, t);
            best = Some((
                dist_sq,
                Projected { road_id: entry.road, s, t, hdg, lane_id },
            ));
        }
    }
    best.map(|(_, p)| p)
}

/// Project `point` onto `seg`'s reference line, returning `(s, t, hdg)`
/// where `t` is the signed lateral offset (positive = left of heading).
fn project_onto_segment(seg: &PlacedSegment, hint: Option<(f64, Point2D)>, point: Point2D) -> (f64, f64, f64) {
    match &seg.kind {
        GeometrySegment::Line => project_line(seg, point),
        GeometrySegment::Arc { curvature } if curvature.abs() > 1e-12 => project_arc(seg, *curvature, point),
        _ => project_numeric(seg, hint, point),
    }
}

fn project_line(seg: &PlacedSegment, point: Point2D) -> (f64, f64, f64) {
    let (sin_h, cos_h) = seg.start_hdg.sin_cos();
    let dx = point.x - seg.start_point.x;
    let dy = point.y - seg.start_point.y;
    let forward = dx * cos_h + dy * sin_h;
    let t = -dx * sin_h + dy * cos_h;
    let s = (seg.start_s + forward).clamp(seg.start_s, seg.start_s + seg.length);
    (s, t, seg.start_hdg)
}

fn project_arc(seg: &PlacedSegment, curvature: f64, point: Point2D) -> (f64, f64, f64) {
    let radius = 1.0 / curvature;
    let center = seg.start_point.offset_polar(seg.start_hdg, 0.0, radius);
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    let phi = dy.atan2(dx);
    let hdg_q = phi + std::f64::consts::FRAC_PI_2;
    let mut delta = hdg_q - seg.start_hdg;
    // Normalize to (-pi, pi].
    while delta > std::f64::consts::PI {
        delta -= 2.0 * std::f64::consts::PI;
    }
    while delta <= -std::f64::consts::PI {
        delta += 2.0 * std::f64::consts::PI;
    }
    let s_local = (delta / curvature).clamp(0.0, seg.length);
    let hdg = seg.start_hdg + s_local * curvature;
    let dist = point.distance(center);
    let t = radius - radius.signum() * dist;
    (seg.start_s + s_local, t, hdg)
}

/// Numeric projection for spiral / cubic-poly segments: ternary search for
/// the arc length minimizing distance to `point`, bracketed around the
/// cached nearest sample when available.
fn project_numeric(seg: &PlacedSegment, hint: Option<(f64, Point2D)>, point: Point2D) -> (f64, f64, f64) {
    let s_hint = hint.map(|(s, _)| s).unwrap_or(seg.start_s + seg.length * 0.5);
    let bracket = (2.0_f64).max(seg.length * 0.1);
    let mut lo = (s_hint - bracket).max(seg.start_s);
    let mut hi = (s_hint + bracket).min(seg.start_s + seg.length);
    if hi <= lo {
        lo = seg.start_s;
        hi = seg.start_s + seg.length;
    }

    let dist_at = |s: f64| seg.evaluate(s).0.distance_sq(point);
    for _ in 0..60 {
        let m1 = lo + (hi - lo) / 3.0;
        let m2 = hi - (hi - lo) / 3.0;
        if dist_at(m1) <= dist_at(m2) {
            hi = m2;
        } else {
            lo = m1;
        }
        if hi - lo < 1e-10 {
            break;
        }
    }
    let s = (lo + hi) * 0.5;
    let (proj_point, hdg) = seg.evaluate(s);
    let dx = point.x - proj_point.x;
    let dy = point.y - proj_point.y;
    let (sin_h, cos_h) = hdg.sin_cos();
    let t = -dx * sin_h + dy * cos_h;
    (s, t, hdg)
}

/// Non-center lanes of `section` at `ds` (s relative to the section's
/// start), as `(lane_id, t_min, t_max)` ranges ordered outward from the
/// center lane in both directions.
fn lane_ranges(section: &LaneSection, ds: f64) -> Vec<(i32, f64, f64)> {
    let mut ranges = Vec::new();

    let mut right_ids: Vec<i32> = section.lanes.keys().copied().filter(|&id| id < 0).collect();
    right_ids.sort_unstable_by(|a, b| b.cmp(a)); // -1, -2, -3, ... (outward from center)
    let mut inner = 0.0;
    for id in right_ids {
        let w = section.lanes[&id].width_at(ds);
        let outer = inner - w;
        ranges.push((id, outer, inner));
        inner = outer;
    }

    let mut left_ids: Vec<i32> = section.lanes.keys().copied().filter(|&id| id > 0).collect();
    left_ids.sort_unstable();
    let mut inner = 0.0;
    for id in left_ids {
        let w = section.lanes[&id].width_at(ds);
        let outer = inner + w;
        ranges.push((id, inner, outer));
        inner = outer;
    }

    ranges
}

/// Which lane (if any) contains lateral offset `t`, with the §4.2 tie-break:
/// closer centerline first, then smaller `|lane_id|`.
fn classify_lane(section: &LaneSection, ds: f64, t: f64) -> Option<i32> {
    let ranges = lane_ranges(section, ds);
    let mut candidates: Vec<(i32, f64, f64)> = ranges
        .into_iter()
        .filter(|(_, lo, hi)| t >= lo - BOUNDARY_EPS && t <= hi + BOUNDARY_EPS)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| {
        let ca = (a.1 + a.2) * 0.5;
        let cb = (b.1 + b.2) * 0.5;
        let da = (t - ca).abs();
        let db = (t - cb).abs();
        da.partial_cmp(&db)
            .unwrap()
            .then_with(|| a.0.abs().cmp(&b.0.abs()))
    });
    Some(candidates[0].0)
}

/// Left/right remainder (§4.2 step 5): signed distance from the outermost
/// boundary sample on each side to the main lane's edge at the same `s`,
/// plus the road-coordinate boundary points (§3 "boundary points") those
/// remainders were computed from.
fn remainders(
    network: &RoadNetwork,
    road_id: RoadId,
    lane_id: i32,
    s: f64,
    projected_samples: &[(PointKind, Option<Projected>)],
) -> (f64, f64, Option<(f64, f64)>, Option<(f64, f64)>) {
    let Some(road) = network.road(road_id) else { return (0.0, 0.0, None, None) };
    let section = road.lane_section_at(s);
    let ds = s - section.start_s;
    let (lane_min, lane_max) = lane_ranges(section, ds)
        .into_iter()
        .find(|(id, ..)| *id == lane_id)
        .map(|(_, lo, hi)| (lo, hi))
        .unwrap_or((0.0, 0.0));

    let mut left_point: Option<(f64, f64)> = None;
    let mut right_point: Option<(f64, f64)> = None;
    for (_, proj) in projected_samples {
        if let Some(p) = proj {
            if p.road_id == road_id {
                if left_point.is_none_or(|(_, t)| p.t > t) {
                    left_point = Some((p.s, p.t));
                }
                if right_point.is_none_or(|(_, t)| p.t < t) {
                    right_point = Some((p.s, p.t));
                }
            }
        }
    }
    let (Some((_, max_t)), Some((_, min_t))) = (left_point, right_point) else {
        return (0.0, 0.0, None, None);
    };

    let left_remainder = lane_max - max_t;
    let right_remainder = min_t - lane_min;
    (left_remainder, right_remainder, left_point, right_point)
}
