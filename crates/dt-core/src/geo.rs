//! Planar geometry primitives: points, oriented bounding boxes, and the
//! clothoid (Euler spiral) helpers used to project points onto spiral road
//! geometry.
//!
//! Road reconstruction works in a local Cartesian frame (metres, not
//! lat/lon), so positions are plain `f64` coordinate pairs rather than a
//! geodetic point type — there is no ellipsoid to approximate here.

/// A point in the local planar simulation frame, in metres.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn distance_sq(self, other: Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Translate by `forward`/`lateral` offsets expressed in a frame rotated
    /// by `heading` radians from the world x-axis.
    #[inline]
    pub fn offset_polar(self, heading: f64, forward: f64, lateral: f64) -> Point2D {
        let (s, c) = heading.sin_cos();
        Point2D {
            x: self.x + forward * c - lateral * s,
            y: self.y + forward * s + lateral * c,
        }
    }
}

/// Which corner or edge position a sampled boundary point corresponds to,
/// following the closed five-point loop an oriented rectangle is walked in:
/// rear-right -> rear-left -> front-left -> front-right -> back to rear-right.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PointKind {
    RearRight,
    RearLeft,
    FrontLeft,
    FrontRight,
    /// Interior point of the front edge (front-left to front-right side).
    FrontEdge,
    /// Interior point of one of the other three edges.
    Edge,
}

/// A point sampled from an `OrientedBox`'s perimeter, tagged with which
/// corner (or edge segment) it came from.
#[derive(Copy, Clone, Debug)]
pub struct BoundarySample {
    pub point: Point2D,
    pub kind: PointKind,
}

/// An oriented (rotated) rectangle: an agent or object footprint centered on
/// a reference point with a heading, half-length forward/back, and
/// half-width left/right, all measured from that reference point.
#[derive(Copy, Clone, Debug)]
pub struct OrientedBox {
    pub reference: Point2D,
    pub heading: f64,
    pub dist_ref_to_front: f64,
    pub dist_ref_to_rear: f64,
    pub half_width: f64,
}

impl OrientedBox {
    pub fn new(
        reference: Point2D,
        heading: f64,
        dist_ref_to_front: f64,
        dist_ref_to_rear: f64,
        half_width: f64,
    ) -> Self {
        Self {
            reference,
            heading,
            dist_ref_to_front,
            dist_ref_to_rear,
            half_width,
        }
    }

    /// The four corners, in rear-right, rear-left, front-left, front-right order.
    pub fn corners(&self) -> [Point2D; 4] {
        [
            self.reference
                .offset_polar(self.heading, -self.dist_ref_to_rear, -self.half_width),
            self.reference
                .offset_polar(self.heading, -self.dist_ref_to_rear, self.half_width),
            self.reference
                .offset_polar(self.heading, self.dist_ref_to_front, self.half_width),
            self.reference
                .offset_polar(self.heading, self.dist_ref_to_front, -self.half_width),
        ]
    }

    /// Sample the closed perimeter: all four corners plus edge points spaced
    /// no more than `sampling_width` apart along each side.
    pub fn sample_perimeter(&self, sampling_width: f64) -> Vec<BoundarySample> {
        let corners = self.corners();
        let kinds = [
            PointKind::RearRight,
            PointKind::RearLeft,
            PointKind::FrontLeft,
            PointKind::FrontRight,
        ];

        let mut samples = Vec::new();
        for i in 0..4 {
            samples.push(BoundarySample {
                point: corners[i],
                kind: kinds[i],
            });

            let a = corners[i];
            let b = corners[(i + 1) % 4];
            let edge_len = a.distance(b);
            if edge_len <= sampling_width || sampling_width <= 0.0 {
                continue;
            }
            let n = (edge_len / sampling_width).ceil() as usize;
            // Edge i==2 runs front-left -> front-right: the front edge.
            let kind = if i == 2 { PointKind::FrontEdge } else { PointKind::Edge };
            for k in 1..n {
                let t = k as f64 / n as f64;
                samples.push(BoundarySample {
                    point: Point2D::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t),
                    kind,
                });
            }
        }
        samples
    }

    /// Axis-aligned bounding box of the oriented rectangle: `(min, max)`.
    pub fn aabb(&self) -> (Point2D, Point2D) {
        let corners = self.corners();
        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        (min, max)
    }

    /// Exact separating-axis overlap test between two oriented rectangles.
    pub fn overlaps(&self, other: &OrientedBox) -> bool {
        let axes = [
            (self.heading.cos(), self.heading.sin()),
            (-self.heading.sin(), self.heading.cos()),
            (other.heading.cos(), other.heading.sin()),
            (-other.heading.sin(), other.heading.cos()),
        ];
        let a = self.corners();
        let b = other.corners();
        for (ax, ay) in axes {
            let (amin, amax) = project(&a, ax, ay);
            let (bmin, bmax) = project(&b, ax, ay);
            if amax < bmin || bmax < amin {
                return false;
            }
        }
        true
    }
}

fn project(points: &[Point2D; 4], ax: f64, ay: f64) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for p in points {
        let d = p.x * ax + p.y * ay;
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Fresnel integrals `(C(t), S(t))` via a truncated power series, accurate to
/// about 1e-9 for `|t| <= 4` (comfortably covers clothoid arc lengths used in
/// road-geometry reconstruction). Larger arguments are rare for spiral road
/// segments; callers needing asymptotic tails should rescale first.
pub fn fresnel(t: f64) -> (f64, f64) {
    let t2 = t * t;
    let mut term_c = t;
    let mut term_s = t * t2 / 3.0;
    let mut sum_c = term_c;
    let mut sum_s = term_s;

    for n in 1..40 {
        let n = n as f64;
        term_c *= -t2 * t2 * (4.0 * n - 3.0) / ((4.0 * n + 1.0) * (2.0 * n) * (2.0 * n - 1.0));
        term_s *= -t2 * t2 * (4.0 * n - 1.0) / ((4.0 * n + 3.0) * (2.0 * n + 1.0) * (2.0 * n));
        sum_c += term_c;
        sum_s += term_s;
        if term_c.abs() < 1e-15 && term_s.abs() < 1e-15 {
            break;
        }
    }

    (sum_c, sum_s)
}

/// Point and heading at arc length `s` along a clothoid whose curvature
/// grows linearly from 0 at `s = 0` with rate `a` (curvature per metre),
/// starting at the origin with heading 0. Callers transform into world
/// coordinates by rotating/translating per the segment's start pose.
pub fn clothoid_point(a: f64, s: f64) -> (Point2D, f64) {
    if a.abs() < 1e-12 {
        return (Point2D::new(s, 0.0), 0.0);
    }
    // Standard clothoid normalization: curvature(s) = a * s, heading(s) = a * s^2 / 2.
    let scale = (std::f64::consts::PI / a.abs()).sqrt();
    let t = s / scale;
    let (c, sn) = fresnel(t);
    let sign = a.signum();
    (
        Point2D::new(scale * c, sign * scale * sn),
        sign * t * t * std::f64::consts::FRAC_PI_2,
    )
}
