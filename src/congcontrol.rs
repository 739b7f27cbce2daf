use std::fmt::Debug;
use super::Tick;

/// Window policy of a windowed host.
///
/// The window is real-valued; a host keeps sending new packets while the
/// number of unacked packets is strictly below `cwnd()`.
pub trait CongAlg: Clone + Debug {
    fn cwnd(&self) -> f64;
    /// A previously unacked packet was acknowledged.
    fn on_packet(&mut self) -> f64;
    /// An unacked packet timed out at `now`.
    fn reduction(&mut self, now: Tick, mean_rtt: f64) -> f64;
}

/// A fixed window that ignores acks and losses.
#[derive(Clone, Debug)]
pub struct ConstCwnd(usize);

impl ConstCwnd {
    pub fn new(window: usize) -> Self {
        ConstCwnd(window)
    }

    pub fn window(&self) -> usize { self.0 }
}

impl CongAlg for ConstCwnd {
    fn cwnd(&self) -> f64 { self.0 as f64 }

    fn on_packet(&mut self) -> f64 {
        self.cwnd()
    }

    fn reduction(&mut self, _: Tick, _: f64) -> f64 {
        self.cwnd()
    }
}

/// Additive increase, multiplicative decrease with slow start.
#[derive(Clone, Debug)]
pub struct Aimd {
    window: f64,
    slow_start: bool,
    next_decrease: f64,
}

impl Aimd {
    pub fn new() -> Self {
        Aimd{
            window: 1.0,
            slow_start: true,
            next_decrease: -1.0,
        }
    }

    pub fn slow_start(&self) -> bool { self.slow_start }

    /// Earliest tick at which the next multiplicative decrease may happen.
    pub fn next_decrease(&self) -> f64 { self.next_decrease }
}

impl CongAlg for Aimd {
    fn cwnd(&self) -> f64 { self.window }

    fn on_packet(&mut self) -> f64 {
        if self.slow_start {
            self.window += 1.0;
        } else {
            self.window += 1.0 / self.window;
        }

        self.window
    }

    fn reduction(&mut self, now: Tick, mean_rtt: f64) -> f64 {
        // at most one decrease per round trip
        if self.next_decrease <= now as f64 {
            self.window = (self.window * 0.5).max(1.0);
        }

        self.next_decrease = now as f64 + mean_rtt;
        self.slow_start = false;
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::{Aimd, CongAlg, ConstCwnd};

    #[test]
    fn const_cwnd() {
        let mut c = ConstCwnd::new(4);
        assert_eq!(c.on_packet(), 4.0);
        assert_eq!(c.reduction(10, 5.0), 4.0);
        assert_eq!(c.window(), 4);
    }

    #[test]
    fn slow_start_then_additive() {
        let mut a = Aimd::new();
        assert_eq!(a.on_packet(), 2.0);
        assert_eq!(a.on_packet(), 3.0);
        assert_eq!(a.on_packet(), 4.0);

        assert_eq!(a.reduction(100, 20.0), 2.0);
        assert!(!a.slow_start());
        assert_eq!(a.next_decrease(), 120.0);

        assert_eq!(a.on_packet(), 2.5);
        assert!((a.on_packet() - 2.9).abs() < 1e-9);
    }

    #[test]
    fn one_decrease_per_rtt() {
        let mut a = Aimd::new();
        for _ in 0..7 {
            a.on_packet();
        }
        assert_eq!(a.cwnd(), 8.0);

        assert_eq!(a.reduction(100, 50.0), 4.0);
        // within mean_rtt of the last decrease: no change, but the cool-down moves
        assert_eq!(a.reduction(120, 50.0), 4.0);
        assert_eq!(a.next_decrease(), 170.0);
        assert_eq!(a.reduction(169, 50.0), 4.0);
        assert_eq!(a.reduction(219, 50.0), 2.0);
    }

    #[test]
    fn window_floor() {
        let mut a = Aimd::new();
        assert_eq!(a.reduction(0, 0.0), 1.0);
        assert_eq!(a.reduction(1, 0.0), 1.0);
        assert!(!a.slow_start());
        assert_eq!(a.on_packet(), 2.0);
    }
}
