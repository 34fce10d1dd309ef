//! ## hearth-simulator::report
//! **Run outputs: wait series, load series and summary statistics**

use serde::Serialize;

use hearth_core::network::Address;
use hearth_telemetry::MetricsRecorder;

use crate::node::LoadSample;
use crate::user::WaitSample;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserReport {
    pub id: usize,
    pub devices: usize,
    pub waits: Vec<WaitSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerReport {
    pub address: Address,
    pub capacity: usize,
    pub served: u64,
    pub peak_occupancy: usize,
    pub load: Vec<LoadSample>,
}

/// Aggregate wait statistics (hours). All zero when nothing completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WaitStats {
    pub count: usize,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
}

impl WaitStats {
    pub fn from_waits(waits: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = waits.into_iter().collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        Self {
            count,
            max: sorted[count - 1],
            mean: sorted.iter().sum::<f64>() / count as f64,
            p50: nearest_rank(&sorted, 0.50),
            p95: nearest_rank(&sorted, 0.95),
        }
    }
}

fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub seed: u64,
    pub horizon_hours: f64,
    /// Interactions started.
    pub issued: u64,
    /// Interactions that toggled their device before the horizon.
    pub completed: u64,
    /// Interactions still in flight at the horizon. They leave no wait sample.
    pub truncated_interactions: u64,
    pub events_processed: u64,
    /// Devices left switched on.
    pub devices_on: usize,
    pub stats: WaitStats,
    pub users: Vec<UserReport>,
    pub servers: Vec<ServerReport>,
}

impl SimulationReport {
    /// Largest and mean wait across all users, or `(0, 0)` without samples.
    pub fn max_and_mean_wait(&self) -> (f64, f64) {
        (self.stats.max, self.stats.mean)
    }

    /// Every user's samples in one series, ordered by issue time.
    pub fn merged_waits(&self) -> Vec<WaitSample> {
        let mut merged: Vec<WaitSample> = self
            .users
            .iter()
            .flat_map(|u| u.waits.iter().copied())
            .collect();
        merged.sort_by(|a, b| a.issued_at.total_cmp(&b.issued_at));
        merged
    }

    /// Copies the outcome of the run into `metrics`.
    pub fn record_metrics(&self, metrics: &MetricsRecorder) {
        for sample in self.users.iter().flat_map(|u| &u.waits) {
            metrics.observe_wait(sample.wait);
            metrics.inc_completed();
        }
        metrics.add_truncated(self.truncated_interactions);
        for server in &self.servers {
            metrics.set_peak_occupancy(server.peak_occupancy);
        }
    }
}
