//! Protocol engine boundary
//!
//! The link layer does not parse frames. An external protocol engine
//! drains received bytes, decides frame boundaries from bus silence, and
//! hands back response frames. These traits define that seam.

use crate::sequencer::TransmitError;

/// The link-layer view handed to the protocol engine
///
/// Implemented by [`Transport`](crate::transport::Transport); a test
/// engine can be driven against a bare mock instead.
pub trait LinkPort {
    /// Current elapsed time in milliseconds (wraps; compare with
    /// [`elapsed_between`](crate::clock::elapsed_between))
    fn now_ms(&self) -> u32;

    /// Inter-frame silence threshold configured at initialization
    fn frame_timeout_ms(&self) -> u32;

    /// Unread received bytes
    fn available(&self) -> usize;

    /// Take the oldest unread received byte
    fn read_byte(&mut self) -> Option<u8>;

    /// Throw away all unread bytes
    ///
    /// Recovery path for a request that timed out mid-frame.
    fn discard_input(&mut self);

    /// Queue a response frame for transmission
    ///
    /// Fails with [`TransmitError::Busy`] while a previous response is
    /// still on the wire.
    fn respond(&mut self, frame: &[u8]) -> Result<(), TransmitError>;

    /// A response is still filling or draining
    fn transmitting(&self) -> bool;
}

/// External protocol engine driven by the link layer
pub trait ProtocolEngine {
    /// One-time setup with this node's bus address
    fn init(&mut self, node_id: u8);

    /// Periodic update from the application loop
    ///
    /// Inspect newly received bytes, and once a complete request plus the
    /// required inter-frame silence is observed, call
    /// [`LinkPort::respond`] with the response.
    fn update<L: LinkPort>(&mut self, link: &mut L);
}
