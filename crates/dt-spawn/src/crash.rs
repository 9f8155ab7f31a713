//! The §4.5 crash predicate and driving-corridor overlap test.
//!
//! `willCrash` is specified as "the minimum gap over `τ ∈ [0, ttb +
//! stop_time]` is ≤ 0, where each vehicle follows `x(τ) = v·τ + ½·a·τ²
//! while `v + a·τ ≥ 0`." Both `x(τ)` branches (ego, front) are piecewise
//! quadratic with a single breakpoint at each vehicle's own stop time, so
//! the minimum of their difference is found analytically at the interval
//! endpoints plus the one interior vertex that can occur while both
//! vehicles are still moving — no fixed-step scan needed.

use dt_core::OrientedBox;

/// Time (s) at which a vehicle moving at `v` under constant deceleration
/// `a < 0` reaches zero speed. `f64::INFINITY` if `a >= 0` (never stops
/// under this model).
fn stop_time(v: f64, a: f64) -> f64 {
    if a < 0.0 {
        (-v / a).max(0.0)
    } else {
        f64::INFINITY
    }
}

/// Position at time `tau`, clamped to the vehicle's own stop time (§4.5:
/// "while `v + a·τ ≥ 0`" — beyond that the vehicle has already stopped and
/// holds position).
fn position_at(v: f64, a: f64, tau: f64) -> f64 {
    let t = tau.min(stop_time(v, a)).max(0.0);
    v * t + 0.5 * a * t * t
}

fn gap_at(free_space: f64, v_ego: f64, a_ego: f64, v_front: f64, a_front: f64, tau: f64) -> f64 {
    free_space + position_at(v_front, a_front, tau) - position_at(v_ego, a_ego, tau)
}

/// Minimum gap between the two vehicles over the evaluation window.
fn min_gap(free_space: f64, v_ego: f64, a_ego: f64, v_front: f64, a_front: f64, ttb_s: f64) -> f64 {
    let stop_ego = stop_time(v_ego, a_ego);
    let stop_front = stop_time(v_front, a_front);
    let bound = match (stop_ego.is_finite(), stop_front.is_finite()) {
        (true, true) => stop_ego.max(stop_front),
        (true, false) => stop_ego,
        (false, true) => stop_front,
        (false, false) => 0.0,
    };
    let t_max = ttb_s + bound;

    let mut candidates = vec![0.0, t_max];
    if stop_ego.is_finite() && stop_ego <= t_max {
        candidates.push(stop_ego);
    }
    if stop_front.is_finite() && stop_front <= t_max {
        candidates.push(stop_front);
    }

    // Within [0, min(stop_ego, stop_front)] both vehicles are still
    // (possibly) accelerating/decelerating under their own `a`; the gap's
    // derivative is linear there, so it may have one interior zero.
    let both_moving_end = stop_ego.min(stop_front).min(t_max);
    if (a_front - a_ego).abs() > 1e-12 {
        let vertex = (v_ego - v_front) / (a_front - a_ego);
        if vertex > 0.0 && vertex < both_moving_end {
            candidates.push(vertex);
        }
    }

    candidates
        .into_iter()
        .map(|tau| gap_at(free_space, v_ego, a_ego, v_front, a_front, tau))
        .fold(f64::INFINITY, f64::min)
}

/// §4.5's crash predicate: true iff the minimum gap over the evaluation
/// window is at or below zero.
pub fn will_crash(free_space_m: f64, v_ego: f64, a_ego: f64, v_front: f64, a_front: f64, ttb_s: f64) -> bool {
    min_gap(free_space_m, v_ego, a_ego, v_front, a_front, ttb_s) <= 0.0
}

/// The §4.5 full-braking-distance formula: `v·ttb + v²/(2·|a|)`.
pub fn full_braking_distance(v: f64, a_brake: f64, ttb_s: f64) -> f64 {
    v * ttb_s + v * v / (2.0 * a_brake.abs())
}

/// The §4.5 driving-corridor overlap test: each vehicle's footprint
/// extended forward by its predicted travel over the evaluation window,
/// rotated by its own heading. Non-intersection means this opponent
/// imposes no admission constraint.
pub fn corridors_overlap(
    ego_box: &OrientedBox,
    ego_d_brake: f64,
    front_box: &OrientedBox,
    front_advance_m: f64,
) -> bool {
    let ego_corridor = OrientedBox::new(
        ego_box.reference,
        ego_box.heading,
        ego_box.dist_ref_to_front + ego_d_brake.max(0.0),
        ego_box.dist_ref_to_rear,
        ego_box.half_width,
    );
    let front_corridor = OrientedBox::new(
        front_box.reference,
        front_box.heading,
        front_box.dist_ref_to_front + front_advance_m.max(0.0),
        front_box.dist_ref_to_rear,
        front_box.half_width,
    );
    ego_corridor.overlaps(&front_corridor)
}
