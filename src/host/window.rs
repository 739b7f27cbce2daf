use std::mem;

use slog;

use ::{Result, Seq, Tick};
use congcontrol::{Aimd, CongAlg, ConstCwnd};
use packet::Packet;
use timeout::{TimeoutBounds, TimeoutCalculator};
use super::{rtt_sample, Host};

/// A host that keeps up to `cwnd()` packets in flight, retransmitting each
/// one on its own timeout. The window policy is the only thing that differs
/// between the variants.
#[derive(Clone, Debug)]
pub struct WindowHost<CC: CongAlg> {
    // ordered by first transmission; a retransmission keeps its slot
    unacked: Vec<Packet>,
    max_seq: Seq,
    in_order_rx_seq: Seq,
    cong_control: CC,
    timeout_calculator: TimeoutCalculator,
    logger: Option<slog::Logger>,
}

/// Fixed-size sliding window.
pub type SlidingWindowHost = WindowHost<ConstCwnd>;
/// Slow start, then additive increase / multiplicative decrease.
pub type AimdHost = WindowHost<Aimd>;

impl WindowHost<ConstCwnd> {
    pub fn new(window_size: usize, bounds: TimeoutBounds, logger: impl Into<Option<slog::Logger>>) -> Result<Self> {
        ensure!(window_size > 0, "window size must be at least one packet");
        Ok(WindowHost::with_cong_control(ConstCwnd::new(window_size), bounds, logger))
    }
}

impl WindowHost<Aimd> {
    pub fn new(bounds: TimeoutBounds, logger: impl Into<Option<slog::Logger>>) -> Self {
        WindowHost::with_cong_control(Aimd::new(), bounds, logger)
    }
}

impl<CC: CongAlg> WindowHost<CC> {
    pub fn with_cong_control(cong_control: CC, bounds: TimeoutBounds, logger: impl Into<Option<slog::Logger>>) -> Self {
        WindowHost{
            unacked: vec![],
            max_seq: -1,
            in_order_rx_seq: -1,
            cong_control,
            timeout_calculator: TimeoutCalculator::new(bounds),
            logger: logger.into(),
        }
    }

    pub fn window(&self) -> f64 {
        self.cong_control.cwnd()
    }

    pub fn cong_control(&self) -> &CC {
        &self.cong_control
    }

    pub fn unacked(&self) -> &[Packet] {
        &self.unacked
    }

    pub fn max_seq(&self) -> Seq {
        self.max_seq
    }

    fn retransmit(&mut self, pkt: &Packet, tick: Tick) -> Packet {
        self.timeout_calculator.exp_backoff();
        let retx = pkt.retransmit(tick, self.timeout_calculator.timeout_ticks());

        let old_cwnd = self.cong_control.cwnd();
        let cwnd = self.cong_control.reduction(tick, self.timeout_calculator.mean_rtt());
        if let Some(ref log) = self.logger {
            debug!(log, "retx";
                "tick" => tick,
                "seq" => retx.seq_num,
                "num_retx" => retx.num_retx,
                "old_timeout" => pkt.timeout_duration,
                "timeout" => retx.timeout_duration,
            );

            if cwnd < old_cwnd {
                debug!(log, "window decrease";
                    "tick" => tick,
                    "old_cwnd" => old_cwnd,
                    "cwnd" => cwnd,
                );
            }
        }

        retx
    }

    // everything at or below the lowest unacked sequence number's predecessor has arrived
    fn compute_in_order_rx_seq(&self) -> Seq {
        self.unacked
            .iter()
            .map(|p| p.seq_num - 1)
            .fold(self.max_seq, |in_order, s| in_order.min(s))
    }
}

impl<CC: CongAlg> Host for WindowHost<CC> {
    fn send(&mut self, tick: Tick) -> Vec<Packet> {
        let mut pkts = vec![];

        // retransmissions first; build a fresh unacked list rather than patching in place
        let prev = mem::replace(&mut self.unacked, vec![]);
        let mut unacked = Vec::with_capacity(prev.len());
        for pkt in prev {
            if pkt.is_timed_out(tick) {
                let retx = self.retransmit(&pkt, tick);
                pkts.push(retx);
                unacked.push(retx);
            } else {
                unacked.push(pkt);
            }
        }
        self.unacked = unacked;

        // fill the window with new packets
        while (self.unacked.len() as f64) < self.cong_control.cwnd() {
            let pkt = Packet::new(tick, self.max_seq + 1, self.timeout_calculator.timeout_ticks());
            self.max_seq += 1;
            self.unacked.push(pkt);
            pkts.push(pkt);
            if let Some(ref log) = self.logger {
                debug!(log, "sent";
                    "tick" => tick,
                    "seq" => pkt.seq_num,
                    "cwnd" => self.cong_control.cwnd(),
                );
            }
        }

        pkts
    }

    fn recv(&mut self, pkt: Packet, tick: Tick) -> Result<()> {
        let rtt = rtt_sample(&pkt, tick)?;
        self.timeout_calculator.update_timeout(rtt);

        let acked = self.unacked.iter().position(|p| p.seq_num == pkt.seq_num);
        match acked {
            Some(idx) => {
                self.unacked.remove(idx);
                self.in_order_rx_seq = self.compute_in_order_rx_seq();
                self.cong_control.on_packet();
                if let Some(ref log) = self.logger {
                    debug!(log, "rx";
                        "tick" => tick,
                        "seq" => pkt.seq_num,
                        "rtt" => rtt,
                        "in_order_rx_seq" => self.in_order_rx_seq,
                        "cwnd" => self.cong_control.cwnd(),
                    );
                }
            }
            None => {
                if let Some(ref log) = self.logger {
                    debug!(log, "duplicate ack";
                        "tick" => tick,
                        "seq" => pkt.seq_num,
                    );
                }
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
