//! ## hearth-telemetry::metrics
//! **Prometheus registry for run outcomes**

use prometheus::{Counter, Histogram, HistogramOpts, IntGauge, Registry};

const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub interactions_completed: Counter,
    pub interactions_truncated: Counter,
    pub wait_seconds: Histogram,
    pub peak_occupancy: IntGauge,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let interactions_completed = Counter::new(
            "hearth_interactions_completed_total",
            "Interactions that reached their device before the horizon",
        )?;
        let interactions_truncated = Counter::new(
            "hearth_interactions_truncated_total",
            "Interactions still in flight when the horizon was reached",
        )?;
        let wait_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "hearth_wait_seconds",
                "Round-trip wait from issue to device toggle",
            )
            .buckets(vec![0.01, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 60.0]),
        )?;
        let peak_occupancy = IntGauge::new(
            "hearth_server_peak_occupancy",
            "Highest slot occupancy observed on any server",
        )?;

        registry.register(Box::new(interactions_completed.clone()))?;
        registry.register(Box::new(interactions_truncated.clone()))?;
        registry.register(Box::new(wait_seconds.clone()))?;
        registry.register(Box::new(peak_occupancy.clone()))?;

        Ok(Self {
            registry,
            interactions_completed,
            interactions_truncated,
            wait_seconds,
            peak_occupancy,
        })
    }

    /// Records one wait, given in hours.
    pub fn observe_wait(&self, hours: f64) {
        self.wait_seconds.observe(hours * SECONDS_PER_HOUR);
    }

    pub fn inc_completed(&self) {
        self.interactions_completed.inc();
    }

    pub fn add_truncated(&self, count: u64) {
        self.interactions_truncated.inc_by(count as f64);
    }

    /// Raises the peak gauge if `occupancy` exceeds it.
    pub fn set_peak_occupancy(&self, occupancy: usize) {
        let occupancy = occupancy as i64;
        if occupancy > self.peak_occupancy.get() {
            self.peak_occupancy.set(occupancy);
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
