//! Event queue with deterministic ordering.
//!
//! Processes are plain values (continuations) stored in the queue together with
//! their wake-up time. Running the scheduler pops them in time order and hands
//! each one to a handler, which may schedule further continuations.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::time::{hours_to_ticks, ticks_to_hours, VirtualClock};
use crate::SimulationError;

/// Key for ordering events in the queue.
///
/// Events are ordered by:
/// 1. Time (earlier first)
/// 2. Sequence number (FIFO for equal times)
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct EventKey {
    /// Wake-up time in ticks.
    pub time: u64,
    /// Submission order, unique per scheduler.
    pub sequence: u64,
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.cmp(&other.time) {
            Ordering::Equal => {}
            ord => return ord,
        }
        self.sequence.cmp(&other.sequence)
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Receipt for a scheduled continuation.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct EventHandle(EventKey);

impl EventHandle {
    /// Wake-up time in hours.
    pub fn wake_time(&self) -> f64 {
        ticks_to_hours(self.0.time)
    }

    pub fn wake_time_ns(&self) -> u64 {
        self.0.time
    }

    pub fn sequence(&self) -> u64 {
        self.0.sequence
    }
}

/// Single-threaded virtual-time scheduler.
pub struct Scheduler<P> {
    queue: BTreeMap<EventKey, P>,
    sequence: u64,
    clock: VirtualClock,
    processed: u64,
}

impl<P> Default for Scheduler<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Scheduler<P> {
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            sequence: 0,
            clock: VirtualClock::default(),
            processed: 0,
        }
    }

    /// Current virtual time in hours.
    #[inline]
    pub fn now(&self) -> f64 {
        self.clock.now_hours()
    }

    #[inline]
    pub fn now_ns(&self) -> u64 {
        self.clock.now_ns()
    }

    /// Number of continuations still waiting.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of continuations handed out so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Submits `process` to wake `delay` hours from now.
    pub fn schedule(&mut self, delay: f64, process: P) -> Result<EventHandle, SimulationError> {
        let ticks = hours_to_ticks(delay)?;
        let key = EventKey {
            time: self.clock.now_ns().saturating_add(ticks),
            sequence: self.sequence,
        };
        self.sequence += 1;
        self.queue.insert(key, process);
        Ok(EventHandle(key))
    }

    /// Pops the earliest continuation if it is due at or before `horizon_ns`,
    /// advancing the clock to its wake-up time.
    pub fn pop_due(&mut self, horizon_ns: u64) -> Option<(EventHandle, P)> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.time > horizon_ns {
            return None;
        }
        let (key, process) = self.queue.pop_first()?;
        self.clock.advance_to(key.time);
        self.processed += 1;
        Some((EventHandle(key), process))
    }

    /// Drains every continuation due at or before `horizon` (hours), in wake-time
    /// order with ties broken by submission order.
    ///
    /// Continuations left past the horizon stay queued. The clock finishes at the
    /// horizon even when the queue ran dry earlier. Returns the number of
    /// continuations handled by this call.
    pub fn run_until<E, F>(&mut self, horizon: f64, mut handler: F) -> Result<u64, E>
    where
        E: From<SimulationError>,
        F: FnMut(&mut Self, P) -> Result<(), E>,
    {
        let horizon_ns = hours_to_ticks(horizon)?;
        trace!(horizon, "Running scheduler");

        let mut handled = 0;
        while let Some((handle, process)) = self.pop_due(horizon_ns) {
            trace!(time = handle.wake_time(), seq = handle.sequence(), "Waking process");
            handler(self, process)?;
            handled += 1;
        }

        if self.clock.now_ns() < horizon_ns {
            self.clock.advance_to(horizon_ns);
        }
        debug!(
            handled,
            remaining = self.queue.len(),
            "Scheduler reached horizon"
        );
        Ok(handled)
    }
}
