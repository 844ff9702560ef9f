//! Free-running timer abstraction
//!
//! The elapsed-time clock is built from a hardware counter that runs
//! continuously and raises an overflow flag each time it wraps. The
//! counter is never stopped or reset while the link is running.

/// Free-running hardware counter with an overflow flag
///
/// Typical binding: a 16-bit timer channel clocked from a 32 kHz slow
/// clock, giving 32 ticks per millisecond and a 2048 ms overflow period.
pub trait TickCounter {
    /// Start the counter running from zero
    fn start(&mut self);

    /// Current counter value
    fn value(&self) -> u32;

    /// Counter ticks per millisecond
    fn ticks_per_ms(&self) -> u32;

    /// Milliseconds spanned by one full counter period
    ///
    /// Must equal the exact counter span divided by the tick rate
    /// (e.g. 65536 / 32 = 2048 ms for a 16-bit counter at 32 kHz).
    fn overflow_period_ms(&self) -> u32;

    /// The overflow flag is set (the counter wrapped since the last clear)
    fn overflow_pending(&self) -> bool;

    /// Clear the overflow flag
    ///
    /// On peripherals where reading the status register clears the flag,
    /// the adapter must latch the flag so an
    /// [`overflow_pending`](Self::overflow_pending) peek does not consume
    /// the event.
    fn clear_overflow(&mut self);
}
