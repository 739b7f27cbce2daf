use slog;

use ::{Result, Seq, Tick};
use packet::Packet;
use timeout::{TimeoutBounds, TimeoutCalculator};
use super::{rtt_sample, Host};

/// One packet outstanding at a time.
#[derive(Clone, Debug)]
pub struct StopAndWaitHost {
    in_order_rx_seq: Seq,
    ready_to_send: bool,
    // the copy currently in flight, if any
    outstanding: Option<Packet>,
    timeout_calculator: TimeoutCalculator,
    logger: Option<slog::Logger>,
}

impl StopAndWaitHost {
    pub fn new(bounds: TimeoutBounds, logger: impl Into<Option<slog::Logger>>) -> Self {
        StopAndWaitHost{
            in_order_rx_seq: -1,
            ready_to_send: true,
            outstanding: None,
            timeout_calculator: TimeoutCalculator::new(bounds),
            logger: logger.into(),
        }
    }

    pub fn ready_to_send(&self) -> bool {
        self.ready_to_send
    }

    pub fn packet_sent_tick(&self) -> Option<Tick> {
        self.outstanding.map(|p| p.sent_tick)
    }

    pub fn outstanding(&self) -> Option<&Packet> {
        self.outstanding.as_ref()
    }
}

impl Host for StopAndWaitHost {
    fn send(&mut self, tick: Tick) -> Vec<Packet> {
        if self.ready_to_send {
            let pkt = Packet::new(tick, self.in_order_rx_seq + 1, self.timeout_calculator.timeout_ticks());
            self.ready_to_send = false;
            self.outstanding = Some(pkt);
            if let Some(ref log) = self.logger {
                debug!(log, "sent";
                    "tick" => tick,
                    "seq" => pkt.seq_num,
                );
            }

            return vec![pkt];
        }

        match self.outstanding {
            Some(prev) if (tick.saturating_sub(prev.sent_tick) as f64) >= self.timeout_calculator.timeout() => {
                self.timeout_calculator.exp_backoff();
                let pkt = prev.retransmit(tick, self.timeout_calculator.timeout_ticks());
                self.outstanding = Some(pkt);
                if let Some(ref log) = self.logger {
                    debug!(log, "retx";
                        "tick" => tick,
                        "seq" => pkt.seq_num,
                        "num_retx" => pkt.num_retx,
                        "timeout" => pkt.timeout_duration,
                    );
                }

                vec![pkt]
            }
            _ => vec![],
        }
    }

    fn recv(&mut self, pkt: Packet, tick: Tick) -> Result<()> {
        let rtt = rtt_sample(&pkt, tick)?;
        self.timeout_calculator.update_timeout(rtt);

        if pkt.seq_num == self.in_order_rx_seq + 1 {
            self.in_order_rx_seq += 1;
            self.ready_to_send = true;
            self.outstanding = None;
            if let Some(ref log) = self.logger {
                debug!(log, "rx";
                    "tick" => tick,
                    "seq" => pkt.seq_num,
                    "rtt" => rtt,
                    "timeout" => self.timeout_calculator.timeout(),
                );
            }
        }

        Ok(())
    }

    fn in_order_rx_seq(&self) -> Seq {
        self.in_order_rx_seq
    }

    fn timeout_calculator(&self) -> &TimeoutCalculator {
        &self.timeout_calculator
    }
}

#[cfg(test)]
mod tests {
    use slog;
    use timeout::TimeoutBounds;
    use host::Host;
    use super::StopAndWaitHost;

    fn host() -> StopAndWaitHost {
        StopAndWaitHost::new(TimeoutBounds::default(), slog::Logger::root(slog::Discard, o!()))
    }

    #[test]
    fn one_outstanding() {
        let mut h = host();
        let first = h.send(0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].seq_num, 0);
        assert!(!h.ready_to_send());
        assert_eq!(h.packet_sent_tick(), Some(0));

        for tick in 1..100 {
            assert!(h.send(tick).is_empty());
        }
    }

    #[test]
    fn timeout_retransmits_same_seq() {
        let mut h = host();
        h.send(0);
        let retx = h.send(100);
        assert_eq!(retx.len(), 1);
        assert_eq!(retx[0].seq_num, 0);
        assert_eq!(retx[0].num_retx, 1);
        assert_eq!(retx[0].sent_tick, 100);
        assert_eq!(h.timeout_calculator().timeout(), 200.0);
        assert_eq!(h.packet_sent_tick(), Some(100));

        assert!(h.send(299).is_empty());
        let retx = h.send(300);
        assert_eq!(retx[0].num_retx, 2);
        assert_eq!(h.timeout_calculator().timeout(), 400.0);
    }

    #[test]
    fn in_order_ack_advances() {
        let mut h = host();
        let p = h.send(0)[0];
        h.recv(p, 30).unwrap();
        assert_eq!(h.in_order_rx_seq(), 0);
        assert!(h.ready_to_send());
        assert!(h.outstanding().is_none());

        let p = h.send(31)[0];
        assert_eq!(p.seq_num, 1);
        h.recv(p, 60).unwrap();
        assert_eq!(h.in_order_rx_seq(), 1);
    }

    #[test]
    fn stale_ack_ignored() {
        let mut h = host();
        let first = h.send(0)[0];
        let retx = h.send(100)[0];
        h.recv(first, 110).unwrap();
        assert_eq!(h.in_order_rx_seq(), 0);

        let next = h.send(111)[0];
        assert_eq!(next.seq_num, 1);

        // the late ack for the retransmitted copy of seq 0
        h.recv(retx, 120).unwrap();
        assert_eq!(h.in_order_rx_seq(), 0);
        assert!(!h.ready_to_send());
        assert_eq!(h.outstanding().map(|p| p.seq_num), Some(1));
    }

    #[test]
    fn recv_before_send_rejected() {
        let mut h = host();
        let p = h.send(5)[0];
        assert!(h.recv(p, 5).is_err());
        assert!(h.recv(p, 4).is_err());
        assert_eq!(h.in_order_rx_seq(), -1);
        assert!(!h.timeout_calculator().is_initialized());
    }
}
