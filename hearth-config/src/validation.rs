// hearth-config/src/validation.rs
//! Custom validation functions for configuration.
//!
//! Cross-field rules that the `validator` attributes cannot express on their own.

use hearth_core::distribution::is_degenerate;
use validator::ValidationError;

use crate::simulation::{PlacementBounds, SimulationConfig};

/// Whole-simulation checks: pipeline length versus pool size and distributions
/// whose rejection sampling could never terminate.
pub fn validate_simulation(config: &SimulationConfig) -> Result<(), ValidationError> {
    if config.hops > config.num_servers {
        return Err(ValidationError::new("hops_exceed_servers"));
    }
    if is_degenerate(
        config.response_time_mean,
        config.response_time_stdev,
        0.0,
        true,
    ) {
        return Err(ValidationError::new("degenerate_response_time"));
    }
    if is_degenerate(
        config.devices_per_user_mean,
        config.devices_per_user_stdev,
        0.0,
        false,
    ) {
        return Err(ValidationError::new("degenerate_devices_per_user"));
    }
    if is_degenerate(
        config.daily_interactions_mean,
        config.daily_interactions_stdev,
        0.0,
        false,
    ) {
        return Err(ValidationError::new("degenerate_daily_interactions"));
    }
    let activity = &config.activity;
    if activity.morning_weight + activity.evening_weight <= 0.0 {
        return Err(ValidationError::new("activity_weights_sum_to_zero"));
    }
    // Each peak must leave some mass inside [0, 24) for truncation to succeed.
    let peak_ok = |peak: f64, spread: f64, weight: f64| {
        weight == 0.0 || spread > 0.0 || (0.0..24.0).contains(&peak)
    };
    if !peak_ok(
        activity.morning_peak,
        activity.morning_spread,
        activity.morning_weight,
    ) || !peak_ok(
        activity.evening_peak,
        activity.evening_spread,
        activity.evening_weight,
    ) {
        return Err(ValidationError::new("activity_peak_outside_day"));
    }
    Ok(())
}

/// Bounds must be finite and describe a non-inverted rectangle.
pub fn validate_bounds(bounds: &PlacementBounds) -> Result<(), ValidationError> {
    let coords = [bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y];
    if coords.iter().any(|c| !c.is_finite()) {
        return Err(ValidationError::new("non_finite_bounds"));
    }
    if bounds.min_x > bounds.max_x || bounds.min_y > bounds.max_y {
        return Err(ValidationError::new("inverted_bounds"));
    }
    Ok(())
}

/// Validate a tracing filter level.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let re = regex::Regex::new("^(?i)(trace|debug|info|warn|error|off)$")
        .map_err(|_| ValidationError::new("invalid_regex"))?;
    if re.is_match(level) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels() {
        assert!(validate_log_level("info").is_ok());
        assert!(validate_log_level("DEBUG").is_ok());
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn degenerate_daily_interactions_rejected() {
        let config = SimulationConfig {
            daily_interactions_mean: -50.0,
            daily_interactions_stdev: 1.0,
            ..Default::default()
        };
        assert_eq!(
            validate_simulation(&config).unwrap_err().code,
            "degenerate_daily_interactions"
        );
    }

    #[test]
    fn zero_interactions_are_fine() {
        let config = SimulationConfig {
            daily_interactions_mean: 0.0,
            daily_interactions_stdev: 0.0,
            ..Default::default()
        };
        assert!(validate_simulation(&config).is_ok());
    }
}
