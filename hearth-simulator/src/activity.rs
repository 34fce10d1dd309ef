//! ## hearth-simulator::activity
//! **Time-of-day weighting of user interactions**
//!
//! Instants are drawn from a mixture of a morning and an evening Gaussian and
//! truncated to the day by bounded rejection.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use hearth_config::ActivityConfig;
use hearth_core::distribution::MAX_RESAMPLES;
use hearth_core::time::HOURS_PER_DAY;
use hearth_core::SimulationError;

#[derive(Debug, Clone, Copy)]
pub struct ActivityProfile {
    morning: Normal<f64>,
    evening: Normal<f64>,
    morning_share: f64,
}

impl ActivityProfile {
    pub fn new(config: &ActivityConfig) -> Result<Self, SimulationError> {
        let total = config.morning_weight + config.evening_weight;
        let negative = config.morning_weight < 0.0 || config.evening_weight < 0.0;
        if negative || total.is_nan() || total <= 0.0 {
            return Err(SimulationError::Config(format!(
                "activity weights must be non-negative with a positive sum, got {} and {}",
                config.morning_weight, config.evening_weight
            )));
        }
        let normal = |peak: f64, spread: f64| {
            Normal::new(peak, spread).map_err(|_| SimulationError::DegenerateDistribution {
                mean: peak,
                stdev: spread,
                attempts: 0,
            })
        };
        Ok(Self {
            morning: normal(config.morning_peak, config.morning_spread)?,
            evening: normal(config.evening_peak, config.evening_spread)?,
            morning_share: config.morning_weight / total,
        })
    }

    /// One instant of the day, in hours within `[0, 24)`.
    pub fn sample_instant<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, SimulationError> {
        let mut peak = &self.evening;
        for _ in 0..MAX_RESAMPLES {
            peak = if rng.random::<f64>() < self.morning_share {
                &self.morning
            } else {
                &self.evening
            };
            let instant = peak.sample(rng);
            if (0.0..HOURS_PER_DAY).contains(&instant) {
                return Ok(instant);
            }
        }
        Err(SimulationError::DegenerateDistribution {
            mean: peak.mean(),
            stdev: peak.std_dev(),
            attempts: MAX_RESAMPLES,
        })
    }

    /// `count` instants of one day, ascending.
    pub fn sample_day<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<f64>, SimulationError> {
        let mut instants = (0..count)
            .map(|_| self.sample_instant(rng))
            .collect::<Result<Vec<_>, _>>()?;
        instants.sort_by(f64::total_cmp);
        Ok(instants)
    }
}
