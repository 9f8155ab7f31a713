//! Road network representation and builder.
//!
//! A `RoadNetwork` is an ordered set of `Road`s, each carrying a piecewise
//! reference-line geometry (line / arc / spiral / cubic polynomial segments),
//! an elevation-independent lane-section layout, and the signals/objects
//! attached to it. Unlike a routing graph, the "edges" here are the
//! predecessor/successor links between roads at junctions, not travel-cost
//! weighted arcs — routing and driver algorithms are external collaborators,
//! not part of this crate.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) indexes the bounding box of every geometry
//! segment and lane section, keyed by `GeometryElementId`. It is built once
//! when the network is constructed and never invalidated afterward — the
//! road network does not change mid-run. `dt-localize` is the only consumer.

use std::collections::BTreeMap;

use rstar::{RTree, RTreeObject, AABB};

use dt_core::{GeometryElementId, Point2D, RoadId};

// ── Geometry segments ─────────────────────────────────────────────────────────

/// One piece of a road's reference line.
#[derive(Clone, Debug)]
pub enum GeometrySegment {
    Line,
    Arc { curvature: f64 },
    Spiral { curv_start: f64, curv_end: f64 },
    CubicPoly { a: f64, b: f64, c: f64, d: f64 },
}

/// A geometry segment plus the placement data needed to evaluate it: where
/// along the road it starts, how long it runs, and the world pose at its
/// start.
#[derive(Clone, Debug)]
pub struct PlacedSegment {
    pub start_s: f64,
    pub length: f64,
    pub start_point: Point2D,
    pub start_hdg: f64,
    pub kind: GeometrySegment,
}

impl PlacedSegment {
    /// World position and heading at absolute arc length `s` (must satisfy
    /// `start_s <= s <= start_s + length`).
    pub fn evaluate(&self, s: f64) -> (Point2D, f64) {
        let ds = (s - self.start_s).clamp(0.0, self.length);
        match &self.kind {
            GeometrySegment::Line => {
                let p = self.start_point.offset_polar(self.start_hdg, ds, 0.0);
                (p, self.start_hdg)
            }
            GeometrySegment::Arc { curvature } => {
                if curvature.abs() < 1e-12 {
                    let p = self.start_point.offset_polar(self.start_hdg, ds, 0.0);
                    return (p, self.start_hdg);
                }
                let radius = 1.0 / curvature;
                let dhdg = ds * curvature;
                // Center of the turn circle, offset perpendicular (left) to heading.
                let center = self.start_point.offset_polar(self.start_hdg, 0.0, radius);
                let hdg = self.start_hdg + dhdg;
                // Position relative to center, rotated forward by dhdg, offset back by -radius laterally.
                let p = center.offset_polar(hdg, 0.0, -radius);
                (p, hdg)
            }
            GeometrySegment::Spiral { curv_start, curv_end } => {
                let a = (curv_end - curv_start) / self.length.max(1e-9);
                if curv_start.abs() < 1e-12 {
                    // Pure clothoid from zero curvature: the closed-form
                    // Fresnel-integral solution applies directly.
                    let (local_p, local_hdg) = dt_core::geo::clothoid_point(a, ds);
                    let world = rotate_translate(local_p, self.start_point, self.start_hdg);
                    return (world, self.start_hdg + local_hdg);
                }
                // General case (nonzero starting curvature): integrate
                // heading(u) = curv_start*u + a*u^2/2 numerically. Road
                // spiral segments are short enough that a modest step count
                // keeps this well within localization tolerance.
                let steps = ((ds / 0.1).ceil() as usize).max(1);
                let step = ds / steps as f64;
                let mut local = Point2D::new(0.0, 0.0);
                let mut hdg = 0.0;
                let mut u = 0.0;
                for _ in 0..steps {
                    let mid_u = u + step * 0.5;
                    let mid_hdg = curv_start * mid_u + 0.5 * a * mid_u * mid_u;
                    local = Point2D::new(
                        local.x + step * mid_hdg.cos(),
                        local.y + step * mid_hdg.sin(),
                    );
                    u += step;
                    hdg = curv_start * u + 0.5 * a * u * u;
                }
                let world = rotate_translate(local, self.start_point, self.start_hdg);
                (world, self.start_hdg + hdg)
            }
            GeometrySegment::CubicPoly { a, b, c, d } => {
                // Walk the polynomial y(x) = a + b*x + c*x^2 + d*x^3 by arc
                // length: advance x by a small increment, rescale the
                // increment by local ds/dx so accumulated arc length
                // converges on `ds`. Exact for the modest segment lengths
                // road geometry segments use in practice.
                let mut x = 0.0;
                let mut traveled = 0.0;
                let mut hdg = 0.0;
                let fine_steps = 200usize;
                let dx_guess = ds / fine_steps as f64;
                while traveled < ds && dx_guess > 0.0 {
                    let slope = b + 2.0 * c * x + 3.0 * d * x * x;
                    let arc_per_dx = (1.0 + slope * slope).sqrt();
                    let dx = ((ds - traveled) / arc_per_dx).min(dx_guess).max(1e-9);
                    x += dx;
                    traveled += dx * arc_per_dx;
                    hdg = (b + 2.0 * c * x + 3.0 * d * x * x).atan();
                }
                let y = a + b * x + c * x * x + d * x * x * x;
                let local = Point2D::new(x, y);
                let world = rotate_translate(local, self.start_point, self.start_hdg);
                (world, self.start_hdg + hdg)
            }
        }
    }

    /// Curvature (1/m) at absolute arc length `s`.
    pub fn curvature_at(&self, s: f64) -> f64 {
        let ds = (s - self.start_s).clamp(0.0, self.length);
        match &self.kind {
            GeometrySegment::Line => 0.0,
            GeometrySegment::Arc { curvature } => *curvature,
            GeometrySegment::Spiral { curv_start, curv_end } => {
                let a = (curv_end - curv_start) / self.length.max(1e-9);
                curv_start + a * ds
            }
            GeometrySegment::CubicPoly { b, c, d, .. } => {
                let slope = b + 2.0 * c * ds + 3.0 * d * ds * ds;
                let second = 2.0 * c + 6.0 * d * ds;
                second / (1.0 + slope * slope).powf(1.5)
            }
        }
    }
}

fn rotate_translate(local: Point2D, origin: Point2D, hdg: f64) -> Point2D {
    let (s, c) = hdg.sin_cos();
    Point2D::new(
        origin.x + local.x * c - local.y * s,
        origin.y + local.x * s + local.y * c,
    )
}

// ── Lanes ─────────────────────────────────────────────────────────────────────

/// Functional type of a lane, per the OpenDRIVE-derived road model this
/// reconstruction framework consumes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LaneType {
    Driving,
    Stop,
    Shoulder,
    Biking,
    Sidewalk,
    Border,
    Restricted,
    Parking,
    Bidirectional,
    Median,
    Entry,
    Exit,
    OnRamp,
    OffRamp,
    Rail,
    Tram,
    Roadworks,
    None,
}

/// Width polynomial valid from `s_offset` (relative to the owning lane
/// section's start) onward: `w(ds) = a + b*ds + c*ds^2 + d*ds^3`.
#[derive(Copy, Clone, Debug)]
pub struct WidthPoly {
    pub s_offset: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl WidthPoly {
    pub fn evaluate(&self, ds: f64) -> f64 {
        let x = ds - self.s_offset;
        self.a + self.b * x + self.c * x * x + self.d * x * x * x
    }
}

/// A lane boundary marking segment, valid from `s_offset` (relative to the
/// owning lane section) onward.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RoadMarkType {
    None,
    Solid,
    Broken,
    SolidSolid,
    BrokenSolid,
}

#[derive(Clone, Debug)]
pub struct RoadMarkSegment {
    pub s_offset: f64,
    pub mark_type: RoadMarkType,
}

/// One lane within a lane section, identified by a signed lane id (negative
/// = right of center, positive = left, 0 = the center lane itself).
#[derive(Clone, Debug)]
pub struct Lane {
    pub lane_type: LaneType,
    pub width: Vec<WidthPoly>,
    pub predecessor: Option<i32>,
    pub successor: Option<i32>,
    pub road_marks: Vec<RoadMarkSegment>,
}

impl Lane {
    /// Width at `ds` (arc length relative to the owning section's start).
    /// Uses the last width polynomial whose `s_offset <= ds`.
    pub fn width_at(&self, ds: f64) -> f64 {
        self.width
            .iter()
            .rev()
            .find(|w| w.s_offset <= ds)
            .map(|w| w.evaluate(ds))
            .unwrap_or(0.0)
    }
}

/// A contiguous span of a road with a fixed lane layout, starting at
/// `start_s` and running until the next section (or the road's end).
#[derive(Clone, Debug)]
pub struct LaneSection {
    pub start_s: f64,
    pub lanes: BTreeMap<i32, Lane>,
}

// ── Signals and objects ───────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub enum LaneValidity {
    All,
    Lanes(Vec<i32>),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SignalKind {
    SpeedLimit,
    StopSign,
    YieldSign,
    TrafficLight,
    Other,
}

#[derive(Clone, Debug)]
pub struct RoadSignal {
    pub kind: SignalKind,
    pub value: f64,
    pub s: f64,
    pub t: f64,
    pub validity: LaneValidity,
}

impl RoadSignal {
    /// Whether this signal governs `lane_id` (§3 "per-lane validity set or
    /// 'all'").
    pub fn applies_to(&self, lane_id: i32) -> bool {
        match &self.validity {
            LaneValidity::All => true,
            LaneValidity::Lanes(ids) => ids.contains(&lane_id),
        }
    }
}

/// A cubic polynomial profile evaluated vs. absolute road `s`: elevation or
/// lane-offset. Carried for data-model completeness (§3); the 2-D
/// localization algorithm in `dt-localize` works in the planar reference
/// frame and does not consume these profiles.
#[derive(Copy, Clone, Debug)]
pub struct CubicProfileSegment {
    pub start_s: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CubicProfileSegment {
    pub fn evaluate(&self, s: f64) -> f64 {
        let x = s - self.start_s;
        self.a + self.b * x + self.c * x * x + self.d * x * x * x
    }
}

/// Evaluate the last profile segment whose `start_s <= s`. Returns `0.0` for
/// an empty profile.
pub fn profile_at(profile: &[CubicProfileSegment], s: f64) -> f64 {
    profile
        .iter()
        .rev()
        .find(|p| p.start_s <= s)
        .map(|p| p.evaluate(s))
        .unwrap_or(0.0)
}

#[derive(Clone, Debug)]
pub struct RoadObject {
    pub s: f64,
    pub t: f64,
    pub length: f64,
    pub width: f64,
    pub heading: f64,
}

// ── Road ──────────────────────────────────────────────────────────────────────

pub struct Road {
    pub id: RoadId,
    pub segments: Vec<PlacedSegment>,
    pub elevation: Vec<CubicProfileSegment>,
    pub lane_offset: Vec<CubicProfileSegment>,
    pub lane_sections: Vec<LaneSection>,
    pub signals: Vec<RoadSignal>,
    pub objects: Vec<RoadObject>,
    pub length: f64,
}

impl Road {
    /// World position and heading at absolute arc length `s`.
    pub fn evaluate(&self, s: f64) -> (Point2D, f64) {
        let seg = self.segment_at(s);
        seg.evaluate(s)
    }

    pub fn curvature_at(&self, s: f64) -> f64 {
        self.segment_at(s).curvature_at(s)
    }

    fn segment_at(&self, s: f64) -> &PlacedSegment {
        self.segments
            .iter()
            .rev()
            .find(|seg| seg.start_s <= s)
            .unwrap_or(&self.segments[0])
    }

    /// The lane section covering arc length `s`. A lane section starting
    /// exactly at `s` is the one returned (boundary belongs to the section
    /// that begins there).
    pub fn lane_section_at(&self, s: f64) -> &LaneSection {
        self.lane_sections
            .iter()
            .rev()
            .find(|sec| sec.start_s <= s)
            .unwrap_or(&self.lane_sections[0])
    }

    pub fn lane_section_index_at(&self, s: f64) -> usize {
        self.lane_sections
            .iter()
            .rposition(|sec| sec.start_s <= s)
            .unwrap_or(0)
    }
}

// ── Spatial index entry ───────────────────────────────────────────────────────

/// An R-tree entry: the bounding box of one geometry segment or lane section,
/// keyed by `GeometryElementId` so `dt-localize` can look up the exact
/// polygon from its own cache.
#[derive(Clone)]
pub struct GeometryEntry {
    pub envelope: [[f64; 2]; 2],
    pub id: GeometryElementId,
    pub road: RoadId,
}

impl RTreeObject for GeometryEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.envelope[0], self.envelope[1])
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// The full set of roads plus junction adjacency and the geometry spatial
/// index. Do not construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    pub roads: Vec<Road>,
    pub predecessors: Vec<Vec<RoadId>>,
    pub successors: Vec<Vec<RoadId>>,
    spatial_idx: RTree<GeometryEntry>,
    /// `GeometryElementId.index()` -> (road, segment index within that road's
    /// `segments`), so a spatial-index hit can be resolved back to the exact
    /// `PlacedSegment` it came from.
    segment_lookup: Vec<(RoadId, usize)>,
}

impl RoadNetwork {
    /// An empty network with no roads. Any localization request against it
    /// reports "not localizable".
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    pub fn road(&self, id: RoadId) -> Option<&Road> {
        self.roads.get(id.index())
    }

    /// Candidate geometry elements whose bounding box intersects the query
    /// box `[min, max]`.
    pub fn query_candidates(&self, min: Point2D, max: Point2D) -> Vec<&GeometryEntry> {
        let envelope = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        self.spatial_idx
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Resolve a spatial-index hit back to its `PlacedSegment`.
    pub fn segment_for(&self, id: GeometryElementId) -> Option<&PlacedSegment> {
        let (road_id, seg_idx) = *self.segment_lookup.get(id.index())?;
        self.road(road_id)?.segments.get(seg_idx)
    }

    /// Which road a `GeometryElementId` belongs to.
    pub fn road_for(&self, id: GeometryElementId) -> Option<RoadId> {
        self.segment_lookup.get(id.index()).map(|(road_id, _)| *road_id)
    }

    /// Total number of geometry elements in the spatial index, i.e. the
    /// exclusive upper bound of valid `GeometryElementId`s.
    pub fn geometry_element_count(&self) -> usize {
        self.segment_lookup.len()
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
pub struct RoadNetworkBuilder {
    roads: Vec<Road>,
    predecessors: Vec<Vec<RoadId>>,
    successors: Vec<Vec<RoadId>>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self {
            roads: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    /// Add a road built from placed geometry segments (already carrying
    /// world-space start poses) and its lane-section layout. Returns the
    /// assigned `RoadId`.
    pub fn add_road(
        &mut self,
        segments: Vec<PlacedSegment>,
        lane_sections: Vec<LaneSection>,
        signals: Vec<RoadSignal>,
        objects: Vec<RoadObject>,
    ) -> RoadId {
        self.add_road_full(segments, Vec::new(), Vec::new(), lane_sections, signals, objects)
    }

    /// Full form of [`add_road`](Self::add_road) additionally carrying the
    /// elevation and lane-offset profiles (§3).
    pub fn add_road_full(
        &mut self,
        segments: Vec<PlacedSegment>,
        elevation: Vec<CubicProfileSegment>,
        lane_offset: Vec<CubicProfileSegment>,
        lane_sections: Vec<LaneSection>,
        signals: Vec<RoadSignal>,
        objects: Vec<RoadObject>,
    ) -> RoadId {
        let id = RoadId(self.roads.len() as u32);
        let length = segments.iter().map(|s| s.start_s + s.length).fold(0.0, f64::max);
        self.roads.push(Road {
            id,
            segments,
            elevation,
            lane_offset,
            lane_sections,
            signals,
            objects,
            length,
        });
        self.predecessors.push(Vec::new());
        self.successors.push(Vec::new());
        id
    }

    /// Record a junction link: traffic may flow from `from` onto `to`.
    pub fn link(&mut self, from: RoadId, to: RoadId) {
        self.successors[from.index()].push(to);
        self.predecessors[to.index()].push(from);
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    /// Consume the builder, producing a [`RoadNetwork`] with the geometry
    /// spatial index bulk-loaded from every segment's axis-aligned bounding
    /// box, sampled along its length.
    pub fn build(self) -> RoadNetwork {
        let mut entries = Vec::new();
        let mut segment_lookup = Vec::new();
        for road in &self.roads {
            for (seg_idx, seg) in road.segments.iter().enumerate() {
                let (min, max) = segment_aabb(seg);
                entries.push(GeometryEntry {
                    envelope: [[min.x, min.y], [max.x, max.y]],
                    id: GeometryElementId(entries.len() as u32),
                    road: road.id,
                });
                segment_lookup.push((road.id, seg_idx));
            }
        }
        let spatial_idx = RTree::bulk_load(entries);

        RoadNetwork {
            roads: self.roads,
            predecessors: self.predecessors,
            successors: self.successors,
            spatial_idx,
            segment_lookup,
        }
    }
}

fn segment_aabb(seg: &PlacedSegment) -> (Point2D, Point2D) {
    let samples = 8;
    let mut min = seg.start_point;
    let mut max = seg.start_point;
    for i in 0..=samples {
        let s = seg.start_s + seg.length * (i as f64 / samples as f64);
        let (p, _) = seg.evaluate(s);
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}
