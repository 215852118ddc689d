//! Transport module - the narrow interfaces to the hardware.
//!
//! The link core only ever sees three things:
//! - [`ByteSource`]: "is a byte available" / "read next byte"
//! - [`Transport`]: one physical send, returning once it is confirmed
//! - [`Clock`]: a wrapping millisecond counter
//!
//! Adapters for a serial stream and for received radio packets live in
//! [`source`]; clocks in [`clock`].

mod clock;
mod source;

pub use clock::{ManualClock, SystemClock};
pub use source::{PacketSource, StreamSource, DEFAULT_MAX_PACKET_LEN};

use crate::error::Result;

/// Input side of a link.
pub trait ByteSource {
    /// Check if a byte can be read without waiting.
    fn available(&self) -> bool;

    /// Read the next byte, or `None` if nothing is available.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Output side of a link.
pub trait Transport {
    /// Send `bytes` as one physical transmission.
    ///
    /// Returns once the transport has accepted the send (for a radio: the
    /// packet has gone out). The wait must be short and bounded.
    fn transmit(&mut self, bytes: &[u8]) -> Result<()>;

    /// Largest transmission the transport accepts; longer sends are
    /// truncated by the link layer.
    fn max_packet_len(&self) -> usize {
        usize::MAX
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn transmit(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).transmit(bytes)
    }

    fn max_packet_len(&self) -> usize {
        (**self).max_packet_len()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transmit(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).transmit(bytes)
    }

    fn max_packet_len(&self) -> usize {
        (**self).max_packet_len()
    }
}

/// Records each transmission as its own entry; handy as a loopback in tests.
impl Transport for Vec<Vec<u8>> {
    fn transmit(&mut self, bytes: &[u8]) -> Result<()> {
        self.push(bytes.to_vec());
        Ok(())
    }
}

/// Monotonic millisecond clock.
///
/// Values wrap at `u32::MAX`; all comparisons use wrapping subtraction.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch.
    fn now_ms(&self) -> u32;
}

impl<K: Clock + ?Sized> Clock for &K {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
