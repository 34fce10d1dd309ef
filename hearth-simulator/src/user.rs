//! ## hearth-simulator::user
//! **Users and their daily interaction cycle**

use rand::Rng;
use serde::Serialize;

use hearth_core::distribution::NonNegativeNormal;
use hearth_core::network::Address;
use hearth_core::SimulationError;

/// One completed interaction: when it was issued and how long it took (hours).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaitSample {
    pub issued_at: f64,
    pub wait: f64,
}

/// A manual controller and the device it toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DevicePair {
    pub controller: Address,
    pub device: Address,
}

/// Where a user is in the daily cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UserPhase {
    /// Waiting for the first day to start.
    IdleForDay,
    /// Drawing and scheduling the current day's interactions.
    GeneratingInteractions,
    /// All interactions of the day are scheduled; sleeping until the next day.
    DayComplete,
}

#[derive(Debug, Clone)]
pub struct User {
    id: usize,
    pairs: Vec<DevicePair>,
    daily: NonNegativeNormal,
    waits: Vec<WaitSample>,
    phase: UserPhase,
    days: u64,
}

impl User {
    pub fn new(id: usize, daily: NonNegativeNormal) -> Self {
        Self {
            id,
            pairs: Vec::new(),
            daily,
            waits: Vec::new(),
            phase: UserPhase::IdleForDay,
            days: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn add_pair(&mut self, controller: Address, device: Address) {
        self.pairs.push(DevicePair { controller, device });
    }

    pub fn pairs(&self) -> &[DevicePair] {
        &self.pairs
    }

    /// Completed interactions in completion order.
    pub fn waits(&self) -> &[WaitSample] {
        &self.waits
    }

    pub fn phase(&self) -> UserPhase {
        self.phase
    }

    /// Days started so far.
    pub fn days(&self) -> u64 {
        self.days
    }

    /// Enters a new day and draws how many interactions it holds.
    pub(crate) fn begin_day<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<usize, SimulationError> {
        self.phase = UserPhase::GeneratingInteractions;
        self.days += 1;
        self.daily.sample_count(rng)
    }

    pub(crate) fn end_day(&mut self) {
        self.phase = UserPhase::DayComplete;
    }

    /// Picks one of the user's controllers uniformly.
    pub(crate) fn choose_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<DevicePair> {
        if self.pairs.is_empty() {
            return None;
        }
        Some(self.pairs[rng.random_range(0..self.pairs.len())])
    }

    pub(crate) fn record(&mut self, issued_at: f64, wait: f64) {
        self.waits.push(WaitSample { issued_at, wait });
    }
}
