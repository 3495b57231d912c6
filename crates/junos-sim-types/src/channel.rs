//! Interactive channel abstraction.

use crate::error::Result;

/// A bidirectional byte stream carrying one remote shell session.
///
/// Bytes are treated as single-byte characters; no multi-byte decoding
/// happens on either side of this trait.
pub trait Channel: Send {
    /// Block until at least one byte is available. `Ok(0)` means the peer
    /// closed the channel.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Write all of `data` to the peer.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Close the channel. Further sends must not be attempted.
    fn close(&mut self) -> Result<()>;
}
