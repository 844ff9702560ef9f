//! Receive ring buffer
//!
//! Fixed-capacity circular byte queue decoupling interrupt-time byte
//! arrival from application-time consumption. The serial interrupt is the
//! sole producer, the protocol engine the sole consumer.
//!
//! # Overflow policy
//!
//! A push into a full buffer **drops the incoming byte** and increments an
//! overrun counter. Evicting the oldest unread byte instead would corrupt
//! the frame the engine is still assembling; dropping the newest keeps the
//! loss visible at the frame level (a truncated frame fails its check) and
//! countable through [`RxRing::overruns`].

/// A byte arrived while the buffer was full; the byte was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OverrunError;

/// Fixed-capacity byte ring
///
/// `N` is the capacity in bytes, sized at construction for the worst-case
/// frame length the protocol engine expects. An explicit length counter
/// (rather than a sacrificial empty slot) lets a ring of capacity `N`
/// actually hold `N` bytes.
pub struct RxRing<const N: usize> {
    data: [u8; N],
    /// Next write index, always in `[0, N)`
    head: usize,
    /// Next read index, always in `[0, N)`
    tail: usize,
    /// Unread bytes, in `[0, N]`
    len: usize,
    overruns: u32,
}

impl<const N: usize> RxRing<N> {
    /// Create an empty ring
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            head: 0,
            tail: 0,
            len: 0,
            overruns: 0,
        }
    }

    /// Append a received byte (interrupt context, O(1), never blocks)
    ///
    /// On a full buffer the byte is dropped and the overrun counter
    /// advances; see the module docs for the policy rationale.
    pub fn push(&mut self, byte: u8) -> Result<(), OverrunError> {
        if self.len == N {
            self.overruns = self.overruns.wrapping_add(1);
            return Err(OverrunError);
        }
        self.data[self.head] = byte;
        self.head = (self.head + 1) % N;
        self.len += 1;
        Ok(())
    }

    /// Remove and return the oldest unread byte (application context)
    pub fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let byte = self.data[self.tail];
        self.tail = (self.tail + 1) % N;
        self.len -= 1;
        Some(byte)
    }

    /// Number of unread bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// No unread bytes
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Discard all unread bytes
    ///
    /// Used to recover from a timed-out partial frame.
    pub fn clear(&mut self) {
        self.tail = self.head;
        self.len = 0;
    }

    /// Bytes dropped on a full buffer since construction
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}
