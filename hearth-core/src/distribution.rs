//! Bounded rejection samplers over normal distributions.
//!
//! Every sampler retries at most [`MAX_RESAMPLES`] times and reports
//! [`SimulationError::DegenerateDistribution`] instead of looping forever.
//! [`is_degenerate`] performs the same judgement up front so configurations can be
//! refused before a run starts.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::SimulationError;

/// Upper bound on rejected draws per sample.
pub const MAX_RESAMPLES: u32 = 10_000;

/// Acceptance is considered hopeless once the lower bound sits this many standard
/// deviations above the mean (acceptance probability below ~0.13%).
pub const DEGENERATE_Z: f64 = 3.0;

/// Whether rejection sampling `Normal(mean, stdev)` against `lower` (exclusive when
/// `strict`) would be hopeless.
pub fn is_degenerate(mean: f64, stdev: f64, lower: f64, strict: bool) -> bool {
    if !mean.is_finite() || !stdev.is_finite() || stdev < 0.0 {
        return true;
    }
    if stdev == 0.0 {
        return if strict { mean <= lower } else { mean < lower };
    }
    (lower - mean) / stdev > DEGENERATE_Z
}

#[derive(Debug, Clone, Copy)]
struct BoundedNormal {
    mean: f64,
    stdev: f64,
    normal: Normal<f64>,
}

impl BoundedNormal {
    fn new(mean: f64, stdev: f64, lower: f64, strict: bool) -> Result<Self, SimulationError> {
        let degenerate = || SimulationError::DegenerateDistribution {
            mean,
            stdev,
            attempts: 0,
        };
        if is_degenerate(mean, stdev, lower, strict) {
            return Err(degenerate());
        }
        let normal = Normal::new(mean, stdev).map_err(|_| degenerate())?;
        Ok(Self {
            mean,
            stdev,
            normal,
        })
    }

    fn sample_above<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        accept: impl Fn(f64) -> bool,
    ) -> Result<f64, SimulationError> {
        for _ in 0..MAX_RESAMPLES {
            let x = self.normal.sample(rng);
            if accept(x) {
                return Ok(x);
            }
        }
        Err(SimulationError::DegenerateDistribution {
            mean: self.mean,
            stdev: self.stdev,
            attempts: MAX_RESAMPLES,
        })
    }
}

/// Normal distribution restricted to strictly positive values. Used for service
/// times, which must advance the clock.
#[derive(Debug, Clone, Copy)]
pub struct PositiveNormal(BoundedNormal);

impl PositiveNormal {
    pub fn new(mean: f64, stdev: f64) -> Result<Self, SimulationError> {
        BoundedNormal::new(mean, stdev, 0.0, true).map(Self)
    }

    pub fn mean(&self) -> f64 {
        self.0.mean
    }

    pub fn stdev(&self) -> f64 {
        self.0.stdev
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, SimulationError> {
        self.0.sample_above(rng, |x| x > 0.0)
    }
}

/// Normal distribution restricted to non-negative values, used for counts.
#[derive(Debug, Clone, Copy)]
pub struct NonNegativeNormal(BoundedNormal);

impl NonNegativeNormal {
    pub fn new(mean: f64, stdev: f64) -> Result<Self, SimulationError> {
        BoundedNormal::new(mean, stdev, 0.0, false).map(Self)
    }

    pub fn mean(&self) -> f64 {
        self.0.mean
    }

    pub fn stdev(&self) -> f64 {
        self.0.stdev
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, SimulationError> {
        self.0.sample_above(rng, |x| x >= 0.0)
    }

    /// Draws a sample and rounds it to the nearest count.
    pub fn sample_count<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize, SimulationError> {
        self.sample(rng).map(|x| x.round() as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn zero_stdev_is_constant() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let dist = PositiveNormal::new(2.5, 0.0).unwrap();
        for _ in 0..10 {
            assert_eq!(dist.sample(&mut rng).unwrap(), 2.5);
        }
    }

    #[test]
    fn positive_samples_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let dist = PositiveNormal::new(0.1, 1.0).unwrap();
        for _ in 0..1_000 {
            assert!(dist.sample(&mut rng).unwrap() > 0.0);
        }
    }

    #[test]
    fn refuses_hopeless_parameters() {
        assert!(matches!(
            PositiveNormal::new(0.0, 0.0),
            Err(SimulationError::DegenerateDistribution { .. })
        ));
        assert!(matches!(
            PositiveNormal::new(-10.0, 1.0),
            Err(SimulationError::DegenerateDistribution { .. })
        ));
        assert!(NonNegativeNormal::new(0.0, 0.0).is_ok());
        assert!(NonNegativeNormal::new(1.0, -1.0).is_err());
    }

    #[test]
    fn degenerate_threshold() {
        assert!(!is_degenerate(1.0, 1.0, 0.0, true));
        assert!(!is_degenerate(-2.9, 1.0, 0.0, true));
        assert!(is_degenerate(-3.1, 1.0, 0.0, true));
        assert!(is_degenerate(f64::NAN, 1.0, 0.0, false));
    }

    #[test]
    fn counts_round_to_nearest() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let dist = NonNegativeNormal::new(4.4, 0.0).unwrap();
        assert_eq!(dist.sample_count(&mut rng).unwrap(), 4);
        let none = NonNegativeNormal::new(0.0, 0.0).unwrap();
        assert_eq!(none.sample_count(&mut rng).unwrap(), 0);
    }
}
