use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use slog;

use ::{Result, Seq, Tick};
use host::Host;
use packet::Packet;

/// A single bottleneck path: loss box, drop-tail queue, then a fixed delay line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkConfig {
    /// Probability that a transmitted packet is lost.
    pub loss_ratio: f64,
    /// Queue capacity in packets.
    pub queue_limit: usize,
    /// Ticks from leaving the queue to the acknowledgment reaching the host.
    pub propagation_delay: Tick,
    /// Packets drained from the queue per tick.
    pub service_rate: usize,
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig{
            loss_ratio: 0.0,
            queue_limit: 1_000_000,
            propagation_delay: 10,
            service_rate: 1,
            seed: 1000,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.loss_ratio >= 0.0 && self.loss_ratio <= 1.0,
            "loss ratio {} not in [0, 1]", self.loss_ratio
        );
        ensure!(self.propagation_delay > 0, "propagation delay must be at least one tick");
        ensure!(self.service_rate > 0, "service rate must be positive");
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: Tick,
    pub sent: usize,
    pub retransmitted: usize,
    /// Dropped by the loss box.
    pub lost: usize,
    /// Dropped at the tail of a full queue.
    pub overflowed: usize,
    pub delivered: usize,
    pub in_order_rx_seq: Seq,
}

#[derive(Debug)]
pub struct Network {
    config: NetworkConfig,
    rng: StdRng,
    queue: VecDeque<Packet>,
    // (arrival tick, packet); arrivals are non-decreasing
    in_flight: VecDeque<(Tick, Packet)>,
    stats: RunSummary,
    logger: Option<slog::Logger>,
}

impl Network {
    pub fn new(config: NetworkConfig, logger: impl Into<Option<slog::Logger>>) -> Result<Self> {
        config.validate()?;
        Ok(Network{
            config,
            rng: StdRng::seed_from_u64(config.seed),
            queue: VecDeque::new(),
            in_flight: VecDeque::new(),
            stats: RunSummary::default(),
            logger: logger.into(),
        })
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Advance the path by one tick: the host sends, the queue drains, and
    /// every packet due at `tick` is handed back to the host.
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H, tick: Tick) -> Result<()> {
        for pkt in host.send(tick) {
            self.stats.sent += 1;
            if pkt.num_retx > 0 {
                self.stats.retransmitted += 1;
            }

            if self.rng.gen_bool(self.config.loss_ratio) {
                self.stats.lost += 1;
                if let Some(ref log) = self.logger {
                    debug!(log, "lost";
                        "tick" => tick,
                        "packet" => ?pkt,
                    );
                }
            } else if self.queue.len() >= self.config.queue_limit {
                self.stats.overflowed += 1;
                if let Some(ref log) = self.logger {
                    debug!(log, "dropping";
                        "tick" => tick,
                        "queue" => self.queue.len(),
                        "packet" => ?pkt,
                    );
                }
            } else {
                self.queue.push_back(pkt);
            }
        }

        for _ in 0..self.config.service_rate {
            match self.queue.pop_front() {
                Some(pkt) => self.in_flight.push_back((tick.saturating_add(self.config.propagation_delay), pkt)),
                None => break,
            }
        }

        while self.in_flight.front().map_or(false, |&(arrival, _)| arrival <= tick) {
            if let Some((_, pkt)) = self.in_flight.pop_front() {
                self.stats.delivered += 1;
                host.recv(pkt, tick)?;
            }
        }

        self.stats.ticks = tick.saturating_add(1);
        Ok(())
    }

    /// Run ticks `0..ticks` against `host`.
    pub fn run<H: Host + ?Sized>(&mut self, host: &mut H, ticks: Tick) -> Result<RunSummary> {
        for tick in 0..ticks {
            self.tick(host, tick)?;
        }

        let summary = self.summary(host);
        if let Some(ref log) = self.logger {
            info!(log, "run complete";
                "ticks" => summary.ticks,
                "sent" => summary.sent,
                "retransmitted" => summary.retransmitted,
                "lost" => summary.lost,
                "overflowed" => summary.overflowed,
                "delivered" => summary.delivered,
                "in_order_rx_seq" => summary.in_order_rx_seq,
            );
        }

        Ok(summary)
    }

    pub fn summary<H: Host + ?Sized>(&self, host: &H) -> RunSummary {
        RunSummary{
            in_order_rx_seq: host.in_order_rx_seq(),
            ..self.stats
        }
    }
}

#[cfg(test)]
mod tests {
    use host::{Host, SlidingWindowHost};
    use timeout::TimeoutBounds;
    use super::{Network, NetworkConfig};

    #[test]
    fn rejects_bad_config() {
        let bad = vec![
            NetworkConfig{ loss_ratio: 1.5, ..NetworkConfig::default() },
            NetworkConfig{ loss_ratio: -0.1, ..NetworkConfig::default() },
            NetworkConfig{ propagation_delay: 0, ..NetworkConfig::default() },
            NetworkConfig{ service_rate: 0, ..NetworkConfig::default() },
        ];
        for c in bad {
            assert!(Network::new(c, None).is_err());
        }
    }

    #[test]
    fn delivery_after_delay() {
        let mut h = SlidingWindowHost::new(1, TimeoutBounds::default(), None).unwrap();
        let mut net = Network::new(NetworkConfig{ propagation_delay: 7, ..NetworkConfig::default() }, None).unwrap();
        for tick in 0..7 {
            net.tick(&mut h, tick).unwrap();
            assert_eq!(h.in_order_rx_seq(), -1);
        }

        net.tick(&mut h, 7).unwrap();
        assert_eq!(h.in_order_rx_seq(), 0);
        assert_eq!(h.timeout_calculator().mean_rtt(), 7.0);
    }

    #[test]
    fn queue_serializes_window() {
        let mut h = SlidingWindowHost::new(3, TimeoutBounds::default(), None).unwrap();
        let mut net = Network::new(NetworkConfig::default(), None).unwrap();
        net.tick(&mut h, 0).unwrap();
        // one packet per tick leaves the queue
        assert_eq!(net.queue_len(), 2);
        net.tick(&mut h, 1).unwrap();
        assert_eq!(net.queue_len(), 1);
    }

    #[test]
    fn tail_drop() {
        let mut h = SlidingWindowHost::new(10, TimeoutBounds::default(), None).unwrap();
        let mut net = Network::new(NetworkConfig{ queue_limit: 4, ..NetworkConfig::default() }, None).unwrap();
        net.tick(&mut h, 0).unwrap();
        let s = net.summary(&h);
        assert_eq!(s.sent, 10);
        assert_eq!(s.overflowed, 6);
        assert_eq!(net.queue_len(), 3);
    }

    #[test]
    fn total_loss() {
        let mut h = SlidingWindowHost::new(2, TimeoutBounds::default(), None).unwrap();
        let mut net = Network::new(NetworkConfig{ loss_ratio: 1.0, ..NetworkConfig::default() }, None).unwrap();
        let s = net.run(&mut h, 1_000).unwrap();
        assert_eq!(s.delivered, 0);
        assert_eq!(s.lost, s.sent);
        assert!(s.retransmitted > 0);
        assert_eq!(s.in_order_rx_seq, -1);
    }

    #[test]
    fn late_ticks_do_not_overflow() {
        let mut h = SlidingWindowHost::new(2, TimeoutBounds::default(), None).unwrap();
        let mut net = Network::new(NetworkConfig::default(), None).unwrap();
        let start = u64::max_value() - 50;
        for tick in start..start + 5 {
            net.tick(&mut h, tick).unwrap();
        }
        assert_eq!(net.summary(&h).sent, 2);
        assert!(h.unacked().iter().all(|p| p.timeout_tick == u64::max_value()));
    }

    #[test]
    fn seeded_runs_repeat() {
        let config = NetworkConfig{ loss_ratio: 0.2, seed: 42, ..NetworkConfig::default() };
        let run = || {
            let mut h = SlidingWindowHost::new(5, TimeoutBounds::default(), None).unwrap();
            Network::new(config, None).unwrap().run(&mut h, 3_000).unwrap()
        };
        assert_eq!(run(), run());
    }
}
