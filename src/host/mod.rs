/*!
    host drivers for the link, in a `std` environment.

    The central resource is the [LinkBus] struct which owns the sequencer
    block and keeps it clocked from a background thread.

    unit construction:

    - [LinkBus::watchdog], [LinkBus::receiver] and [LinkBus::transmitter]
      claim a lane each and return the thin driver for it

    FIFO access style:

    - non-blocking operations never suspend and signal back-pressure through
      zero or short return counts, never through an error
    - blocking operations busy-wait with no timeout and no cancellation; a
      stalled counterpart spins the calling thread forever
*/

/// ownership of the sequencer block and its clocking, this is the tricky part of the code
mod bus;
/// the liveness monitor driver
mod watchdog;
/// the receive/transmit drivers
mod link;


pub use bus::LinkBus;
pub use watchdog::Watchdog;
pub use link::{Receiver, Transmitter};

use thiserror::Error;

/// error regarding link setup. everything past construction is signaled
/// through return counts or the error line, never through this type
#[derive(Error, Debug)]
pub enum Error {
    #[error("sequencer refused the configuration: {0}")]
    Config(&'static str),
}
