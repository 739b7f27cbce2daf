use ::{Seq, Tick};

/// One transmission attempt of a sequence number.
///
/// A retransmission is a fresh `Packet` with the same `seq_num`; an existing
/// packet is never modified after it is handed to the network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Packet {
    pub sent_tick: Tick,
    pub seq_num: Seq,
    pub num_retx: u32,
    /// Absolute tick at which this copy is presumed lost.
    pub timeout_tick: Tick,
    /// The RTO in effect when this copy was sent, in whole ticks.
    pub timeout_duration: Tick,
}

impl Packet {
    pub fn new(sent_tick: Tick, seq_num: Seq, timeout_duration: Tick) -> Self {
        Packet{
            sent_tick,
            seq_num,
            num_retx: 0,
            timeout_tick: sent_tick.saturating_add(timeout_duration),
            timeout_duration,
        }
    }

    /// A new copy of this packet, sent at `tick`.
    pub fn retransmit(&self, tick: Tick, timeout_duration: Tick) -> Self {
        Packet{
            num_retx: self.num_retx + 1,
            ..Packet::new(tick, self.seq_num, timeout_duration)
        }
    }

    pub fn is_timed_out(&self, tick: Tick) -> bool {
        self.timeout_tick <= tick
    }
}
