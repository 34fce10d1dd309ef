//! Simulation model configuration.
//!
//! Population, device density, server pool and propagation parameters for one
//! experiment. Times are expressed in hours; one simulated day is 24 hours.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Parameters of one simulation run.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[validate(schema(function = validation::validate_simulation))]
pub struct SimulationConfig {
    /// Seed for the deterministic random stream.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of simulated users.
    #[serde(default = "default_num_users")]
    pub num_users: usize,

    /// Mean number of (controller, device) pairs per user.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_devices_mean")]
    pub devices_per_user_mean: f64,

    /// Standard deviation of pairs per user.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_devices_stdev")]
    pub devices_per_user_stdev: f64,

    /// Mean interactions per user per day.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_interactions_mean")]
    pub daily_interactions_mean: f64,

    /// Standard deviation of interactions per user per day.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_interactions_stdev")]
    pub daily_interactions_stdev: f64,

    /// Concurrent processing slots per server.
    #[validate(range(min = 1))]
    #[serde(default = "default_capacity")]
    pub server_capacity: usize,

    /// Mean server response time (hours).
    #[serde(default = "default_response_mean")]
    pub response_time_mean: f64,

    /// Standard deviation of server response time (hours).
    #[validate(range(min = 0.0))]
    #[serde(default = "default_response_stdev")]
    pub response_time_stdev: f64,

    /// Distance-to-time ratio (hours per distance unit).
    #[validate(range(min = 0.0))]
    #[serde(default = "default_signal_slowness")]
    pub signal_slowness: f64,

    /// Size of the server pool.
    #[validate(range(min = 1))]
    #[serde(default = "default_num_servers")]
    pub num_servers: usize,

    /// Servers each pipeline traverses between controller and device.
    #[validate(range(min = 1))]
    #[serde(default = "default_hops")]
    pub hops: usize,

    /// Area in which homes and servers are placed.
    #[validate(nested)]
    #[serde(default)]
    pub bounds: PlacementBounds,

    /// Simulated time span (hours).
    #[validate(range(min = 0.0))]
    #[serde(default = "default_horizon")]
    pub horizon_hours: f64,

    /// Scale service time by `1 + occupancy / capacity` seen at request time.
    #[serde(default = "default_true")]
    pub congestion_scaling: bool,

    /// Time-of-day activity profile.
    #[validate(nested)]
    #[serde(default)]
    pub activity: ActivityConfig,
}

fn default_seed() -> u64 {
    42
}
fn default_num_users() -> usize {
    1000
}
fn default_devices_mean() -> f64 {
    10.0
}
fn default_devices_stdev() -> f64 {
    2.0
}
fn default_interactions_mean() -> f64 {
    10.0
}
fn default_interactions_stdev() -> f64 {
    2.0
}
fn default_capacity() -> usize {
    4
}
fn default_response_mean() -> f64 {
    0.5 / 3600.0
}
fn default_response_stdev() -> f64 {
    0.1 / 3600.0
}
fn default_signal_slowness() -> f64 {
    // 1 ms per distance unit.
    1.0 / 3_600_000.0
}
fn default_num_servers() -> usize {
    1
}
fn default_hops() -> usize {
    1
}
fn default_horizon() -> f64 {
    5.0 * 24.0
}
fn default_true() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            num_users: default_num_users(),
            devices_per_user_mean: default_devices_mean(),
            devices_per_user_stdev: default_devices_stdev(),
            daily_interactions_mean: default_interactions_mean(),
            daily_interactions_stdev: default_interactions_stdev(),
            server_capacity: default_capacity(),
            response_time_mean: default_response_mean(),
            response_time_stdev: default_response_stdev(),
            signal_slowness: default_signal_slowness(),
            num_servers: default_num_servers(),
            hops: default_hops(),
            bounds: PlacementBounds::default(),
            horizon_hours: default_horizon(),
            congestion_scaling: default_true(),
            activity: ActivityConfig::default(),
        }
    }
}

/// Rectangle in which homes and servers are placed uniformly at random.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
#[validate(schema(function = validation::validate_bounds))]
pub struct PlacementBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for PlacementBounds {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 100.0,
            max_y: 100.0,
        }
    }
}

/// Two-peak daily activity: a morning and an evening Gaussian mixed by weight.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ActivityConfig {
    /// Hour of the morning peak.
    #[validate(range(min = 0.0, max = 24.0))]
    #[serde(default = "default_morning_peak")]
    pub morning_peak: f64,

    #[validate(range(min = 0.0))]
    #[serde(default = "default_morning_spread")]
    pub morning_spread: f64,

    /// Hour of the evening peak.
    #[validate(range(min = 0.0, max = 24.0))]
    #[serde(default = "default_evening_peak")]
    pub evening_peak: f64,

    #[validate(range(min = 0.0))]
    #[serde(default = "default_evening_spread")]
    pub evening_spread: f64,

    /// Unnormalized weight of the morning peak.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_morning_weight")]
    pub morning_weight: f64,

    /// Unnormalized weight of the evening peak.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_evening_weight")]
    pub evening_weight: f64,
}

fn default_morning_peak() -> f64 {
    7.5
}
fn default_morning_spread() -> f64 {
    1.5
}
fn default_evening_peak() -> f64 {
    19.0
}
fn default_evening_spread() -> f64 {
    2.5
}
fn default_morning_weight() -> f64 {
    0.8
}
fn default_evening_weight() -> f64 {
    2.2
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            morning_peak: default_morning_peak(),
            morning_spread: default_morning_spread(),
            evening_peak: default_evening_peak(),
            evening_spread: default_evening_spread(),
            morning_weight: default_morning_weight(),
            evening_weight: default_evening_weight(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_default_simulation_config() {
        SimulationConfig::default()
            .validate()
            .expect("Default config should be valid");
    }

    #[test]
    fn rejects_zero_capacity() {
        let config = SimulationConfig {
            server_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_more_hops_than_servers() {
        let config = SimulationConfig {
            num_servers: 2,
            hops: 3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_degenerate_response_time() {
        let config = SimulationConfig {
            response_time_mean: 0.0,
            response_time_stdev: 0.0,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert!(errors.field_errors()["__all__"]
            .iter()
            .any(|e| e.code == "degenerate_response_time"));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let config = SimulationConfig {
            bounds: PlacementBounds {
                min_x: 10.0,
                max_x: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: SimulationConfig = serde_yaml::from_str("num_users: 3\nhops: 1\n").unwrap();
        assert_eq!(config.num_users, 3);
        assert_eq!(config.server_capacity, default_capacity());
        assert_eq!(config.activity, ActivityConfig::default());
    }
}
