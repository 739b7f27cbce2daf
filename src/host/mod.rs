use std::fmt::Debug;

use super::{Result, Seq, Tick};
use super::packet::Packet;
use super::timeout::TimeoutCalculator;

/// A reliable-delivery endpoint driven one tick at a time.
///
/// Within a tick the driver calls `send` first, then `recv` once for every
/// packet the network delivers on that tick.
pub trait Host: Debug {
    /// Return the packets to transmit at `tick`, retransmissions first.
    fn send(&mut self, tick: Tick) -> Vec<Packet>;
    /// Process the acknowledgment for `pkt`. Fails if `tick <= pkt.sent_tick`.
    fn recv(&mut self, pkt: Packet, tick: Tick) -> Result<()>;
    /// Highest sequence number at or below which everything is delivered.
    fn in_order_rx_seq(&self) -> Seq;
    fn timeout_calculator(&self) -> &TimeoutCalculator;
}

fn rtt_sample(pkt: &Packet, tick: Tick) -> Result<Tick> {
    ensure!(
        tick > pkt.sent_tick,
        "packet {} received at tick {} but sent at tick {}", pkt.seq_num, tick, pkt.sent_tick
    );

    Ok(tick - pkt.sent_tick)
}

pub mod stop_and_wait;
pub mod window;

pub use self::stop_and_wait::StopAndWaitHost;
pub use self::window::{AimdHost, SlidingWindowHost, WindowHost};
