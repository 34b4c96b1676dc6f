//! Tick Clock: the monotonic tick counter and a delta-scheduler for deferred work.
//!
//! Everything in this crate that needs "now" gets it from a [`TickClock`] passed in explicitly —
//! there is no ambient/thread-local clock.

use std::collections::BTreeMap;

/// Whether a tick represents a fixed real-time slice or a logical step that may run faster or
/// slower than wall-clock time (e.g. a server running at a non-standard tick rate).
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TickMode {
    #[default]
    Real,
    Scaled {
        /// Ticks per second the host is actually driving the simulation at. Used to rescale
        /// tick-denominated constants (i-frame windows, swing windows) when it differs from the
        /// vanilla 20.
        ticks_per_second: f32,
    },
}

pub const VANILLA_TICKS_PER_SECOND: f32 = 20.0;

#[derive(Debug, Default)]
pub struct TickClock {
    tick: u64,
    mode: TickMode,
}

impl TickClock {
    #[must_use]
    pub fn new(mode: TickMode) -> Self {
        Self { tick: 0, mode }
    }

    #[must_use]
    pub const fn current(&self) -> u64 {
        self.tick
    }

    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    #[must_use]
    pub const fn mode(&self) -> TickMode {
        self.mode
    }

    /// Rescales a constant expressed in vanilla (20 tps) ticks to this clock's tick rate. A
    /// 10-tick i-frame window at 40 tps becomes 20 ticks so the wall-clock duration is preserved.
    #[must_use]
    pub fn rescale_ticks(&self, vanilla_ticks: u32) -> u32 {
        match self.mode {
            TickMode::Real => vanilla_ticks,
            TickMode::Scaled { ticks_per_second } => {
                let scale = ticks_per_second / VANILLA_TICKS_PER_SECOND;
                ((f64::from(vanilla_ticks) * f64::from(scale)).round() as i64).max(0) as u32
            }
        }
    }
}

/// A generic delta-scheduler: schedule a payload to fire at `current + n` ticks, then pull it
/// back out once the clock reaches that tick. Used for buffered hits, deferred projectile
/// removal, and fire-damage ignition ticks.
#[derive(Debug, Default)]
pub struct Scheduler<T> {
    jobs: BTreeMap<u64, Vec<T>>,
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { jobs: BTreeMap::new() }
    }

    pub fn schedule_at(&mut self, tick: u64, payload: T) {
        self.jobs.entry(tick).or_default().push(payload);
    }

    pub fn schedule_after(&mut self, clock: &TickClock, delay: u64, payload: T) {
        self.schedule_at(clock.current() + delay, payload);
    }

    /// Removes and returns every job due at or before `tick`, in the order they were scheduled
    /// within each tick.
    pub fn drain_due(&mut self, tick: u64) -> Vec<T> {
        let later = self.jobs.split_off(&(tick + 1));
        let due = std::mem::replace(&mut self.jobs, later);
        due.into_values().flatten().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
