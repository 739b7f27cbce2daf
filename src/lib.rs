#[macro_use]
extern crate failure;
#[macro_use]
extern crate slog;
extern crate rand;

use failure::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Abstract simulated time. Supplied by whoever drives the hosts.
pub type Tick = u64;
/// Sequence numbers are dense and start at 0; -1 means "nothing yet".
pub type Seq = i64;

pub mod packet;
pub mod timeout;
pub mod congcontrol;
pub mod host;
pub mod network;
pub mod ewma;
