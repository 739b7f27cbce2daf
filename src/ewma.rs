//! Exponentially weighted moving average, the smoothing behind the RTT
//! estimator, exposed on its own to show how `alpha` trades responsiveness
//! against noise.

use ::Result;

/// Smooth `samples` starting from `initial`, returning the running mean
/// after each sample.
pub fn smooth(samples: &[f64], alpha: f64, initial: f64) -> Result<Vec<f64>> {
    ensure!(alpha > 0.0 && alpha <= 1.0, "alpha {} not in (0, 1]", alpha);
    Ok(samples
        .iter()
        .scan(initial, |mean, &sample| {
            *mean = (1.0 - alpha) * *mean + alpha * sample;
            Some(*mean)
        })
        .collect())
}

/// RTT samples of 1.0 with a temporary level shift to 2.0 between 70% and
/// 80% of the trace.
pub fn step_trace(len: usize) -> Vec<f64> {
    let shift_start = len * 7 / 10;
    let shift_end = len * 8 / 10;
    (0..len)
        .map(|i| if i >= shift_start && i < shift_end { 2.0 } else { 1.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{smooth, step_trace};

    #[test]
    fn trace_shape() {
        let t = step_trace(100);
        assert_eq!(t.len(), 100);
        assert_eq!(t[69], 1.0);
        assert_eq!(t[70], 2.0);
        assert_eq!(t[79], 2.0);
        assert_eq!(t[80], 1.0);
    }

    #[test]
    fn alpha_one_tracks_samples() {
        let t = step_trace(100);
        assert_eq!(smooth(&t, 1.0, 1.0).unwrap(), t);
    }

    #[test]
    fn small_alpha_lags() {
        let t = step_trace(100);
        let fast = smooth(&t, 0.1, 1.0).unwrap();
        let slow = smooth(&t, 0.01, 1.0).unwrap();
        assert!(fast[75] > slow[75]);
        assert!(fast[75] > 1.0 && fast[75] < 2.0);
        // the fast average starts recovering as soon as the shift ends
        assert!(fast[90] < fast[79]);
    }

    #[test]
    fn bad_alpha() {
        assert!(smooth(&[1.0], 0.0, 1.0).is_err());
        assert!(smooth(&[1.0], 1.5, 1.0).is_err());
    }
}
