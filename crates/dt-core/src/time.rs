//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter, one
//! tick per scheduler cycle. The mapping to wall-clock milliseconds is
//! exact integer arithmetic:
//!
//!   wall_time_ms = tick * cycle_time_ms
//!
//! Using an integer tick as the canonical time unit means cycle-time
//! arithmetic (is this component due this cycle?) is exact and O(1), with
//! no floating-point drift across a long run.
//!
//! The default cycle time is 10 ms, matching the scheduler's default global
//! cycle time.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation cycle counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` cycles after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and simulation-time milliseconds.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// How many milliseconds one cycle represents. Default: 10.
    pub cycle_time_ms: u32,
    /// The current tick — advanced by `SimClock::advance()` each cycle.
    pub current_tick: Tick,
}

impl SimClock {
    /// Create a clock with the given cycle-time resolution.
    pub fn new(cycle_time_ms: u32) -> Self {
        Self {
            cycle_time_ms,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulation-time milliseconds since tick 0.
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.current_tick.0 * self.cycle_time_ms as u64
    }

    /// How many ticks span `ms` milliseconds? (rounds up — a component with
    /// a cycle time shorter than `ms` is never scheduled late.)
    #[inline]
    pub fn ticks_for_ms(&self, ms: u64) -> u64 {
        ms.div_ceil(self.cycle_time_ms as u64)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ms)", self.current_tick, self.elapsed_ms())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level scenario/run configuration — the parameters named in the
/// scheduler's external parameter table (global cycle time, maximum
/// simulation time, and the master RNG seed).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Milliseconds per cycle. Default: 10.
    pub global_cycle_time_ms: u32,

    /// Simulation-time milliseconds at which the run stops if no earlier
    /// termination condition fires.
    pub max_simulation_time_ms: u64,

    /// Master RNG seed. The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count passed to Rayon when the `parallel` feature is
    /// enabled. `None` uses all logical cores.
    pub num_threads: Option<usize>,
}

impl SimConfig {
    /// The tick at which the run ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.max_simulation_time_ms / self.global_cycle_time_ms as u64)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.global_cycle_time_ms)
    }
}
