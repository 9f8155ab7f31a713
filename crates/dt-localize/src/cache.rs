//! The geometry-element sample cache (§9: "geometry localization cache").
//!
//! Built once from a `RoadNetwork`'s spatial index at road load and never
//! invalidated afterward. Each geometry segment is memoized as a polyline of
//! `(s, point)` samples, which gives point-projection a good starting bracket
//! instead of re-walking the segment's parametric equation from scratch on
//! every localization call.

use std::collections::HashMap;

use dt_core::{GeometryElementId, Point2D, RoadId};
use dt_road::RoadNetwork;

/// One geometry element's memoized polyline, plus which road it belongs to.
pub struct CachedSegment {
    pub road: RoadId,
    pub samples: Vec<(f64, Point2D)>,
}

/// Memoization cache over a road network's geometry elements.
pub struct LocalizationIndex {
    segments: HashMap<GeometryElementId, CachedSegment>,
}

impl LocalizationIndex {
    /// Sample every geometry segment in `network` at roughly 1 m spacing.
    /// Zero-length segments are skipped and logged, per §4.2's numerical
    /// degeneracy handling.
    pub fn build(network: &RoadNetwork) -> Self {
        let mut segments = HashMap::new();
        for idx in 0..network.geometry_element_count() {
            let id = GeometryElementId(idx as u32);
            let Some(seg) = network.segment_for(id) else { continue };
            if seg.length <= 1e-9 {
                log::warn!(
                    "road {}: zero-length geometry segment at s={} skipped during localization indexing",
                    network.road_for(id).map(|r| r.0).unwrap_or(u32::MAX),
                    seg.start_s
                );
                continue;
            }
            let step = 1.0_f64.min(seg.length);
            let n = ((seg.length / step).ceil() as usize).max(1);
            let samples = (0..=n)
                .map(|k| {
                    let s = seg.start_s + seg.length * (k as f64 / n as f64);
                    let (p, _) = seg.evaluate(s);
                    (s, p)
                })
                .collect();
            let road = network.road_for(id).expect("segment_for succeeded, road_for must too");
            segments.insert(id, CachedSegment { road, samples });
        }
        Self { segments }
    }

    /// The cached polyline sample nearest to `point`, used to bracket the
    /// exact projection search.
    pub fn nearest_sample(&self, id: GeometryElementId, point: Point2D) -> Option<(f64, Point2D)> {
        let seg = self.segments.get(&id)?;
        seg.samples
            .iter()
            .copied()
            .min_by(|(_, a), (_, b)| {
                a.distance_sq(point)
                    .partial_cmp(&b.distance_sq(point))
                    .unwrap()
            })
    }

    pub fn road_of(&self, id: GeometryElementId) -> Option<RoadId> {
        self.segments.get(&id).map(|seg| seg.road)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
