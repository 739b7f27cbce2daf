use ::{Result, Tick};

pub const MIN_TIMEOUT: Tick = 100;
pub const MAX_TIMEOUT: Tick = 10_000;

// Jacobson/Karels gains
const ALPHA: f64 = 0.125;
const BETA: f64 = 0.25;
const K: f64 = 4.0;

/// The range every retransmission timeout is clamped to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeoutBounds {
    min_timeout: Tick,
    max_timeout: Tick,
}

impl TimeoutBounds {
    pub fn new(min_timeout: Tick, max_timeout: Tick) -> Result<Self> {
        ensure!(min_timeout > 0, "min_timeout must be positive");
        ensure!(
            min_timeout <= max_timeout,
            "min_timeout {} exceeds max_timeout {}", min_timeout, max_timeout
        );

        Ok(TimeoutBounds{ min_timeout, max_timeout })
    }

    pub fn min_timeout(&self) -> Tick { self.min_timeout }
    pub fn max_timeout(&self) -> Tick { self.max_timeout }

    fn clamp(&self, timeout: f64) -> f64 {
        timeout.max(self.min_timeout as f64).min(self.max_timeout as f64)
    }
}

impl Default for TimeoutBounds {
    fn default() -> Self {
        TimeoutBounds{
            min_timeout: MIN_TIMEOUT,
            max_timeout: MAX_TIMEOUT,
        }
    }
}

/// Smoothed RTT estimator and retransmission timeout (RTO).
///
/// The estimator is unseeded until the first sample arrives; until then the
/// timeout sits at the lower bound.
#[derive(Clone, Debug)]
pub struct TimeoutCalculator {
    bounds: TimeoutBounds,
    mean_rtt: f64,
    rtt_var: f64,
    timeout: f64,
    initialized: bool,
}

impl TimeoutCalculator {
    pub fn new(bounds: TimeoutBounds) -> Self {
        TimeoutCalculator{
            bounds,
            mean_rtt: 0.0,
            rtt_var: 0.0,
            timeout: bounds.min_timeout as f64,
            initialized: false,
        }
    }

    /// Fold one round-trip sample into the estimate.
    pub fn update_timeout(&mut self, rtt_sample: Tick) {
        let rtt_sample = rtt_sample as f64;
        if !self.initialized {
            self.mean_rtt = rtt_sample;
            self.rtt_var = rtt_sample / 2.0;
            self.initialized = true;
        } else {
            // variance uses the mean from before this sample
            self.rtt_var = (1.0 - BETA) * self.rtt_var + BETA * (rtt_sample - self.mean_rtt).abs();
            self.mean_rtt = (1.0 - ALPHA) * self.mean_rtt + ALPHA * rtt_sample;
        }

        self.timeout = self.bounds.clamp(self.mean_rtt + K * self.rtt_var);
    }

    /// Double the timeout, up to the upper bound. The RTT estimate is kept.
    pub fn exp_backoff(&mut self) -> f64 {
        self.timeout = self.bounds.clamp(self.timeout * 2.0);
        self.timeout
    }

    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    /// The timeout rounded up to a whole number of ticks.
    pub fn timeout_ticks(&self) -> Tick {
        self.timeout.ceil() as Tick
    }

    pub fn mean_rtt(&self) -> f64 {
        self.mean_rtt
    }

    pub fn rtt_var(&self) -> f64 {
        self.rtt_var
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn bounds(&self) -> TimeoutBounds {
        self.bounds
    }
}
