//! Monotonic millisecond clock
//!
//! Built from a free-running hardware counter plus a software accumulator
//! fed by the timer-overflow interrupt. The protocol engine reads it to
//! detect the inter-frame silence that delimits request frames.

use cellnode_hal::TickCounter;

/// Monotonic elapsed-time source
///
/// `elapsed = accumulated_ms + counter_value / ticks_per_ms`, where the
/// overflow interrupt adds exactly one counter period to the accumulator
/// per wrap. The value wraps after ~49 days; compare readings with
/// [`elapsed_between`], never with plain subtraction.
pub struct ElapsedClock<T> {
    counter: T,
    /// Milliseconds accumulated from serviced overflows.
    /// Written only by [`handle_overflow`](Self::handle_overflow).
    accumulated_ms: u32,
}

impl<T: TickCounter> ElapsedClock<T> {
    /// Create the clock and start the counter running
    pub fn new(mut counter: T) -> Self {
        counter.start();
        Self {
            counter,
            accumulated_ms: 0,
        }
    }

    /// Timer-overflow interrupt entry point
    ///
    /// Clears the hardware flag and credits exactly one counter period.
    /// Checking the flag before crediting keeps a spurious interrupt from
    /// double-counting an overflow.
    pub fn handle_overflow(&mut self) {
        if self.counter.overflow_pending() {
            self.counter.clear_overflow();
            self.accumulated_ms = self
                .accumulated_ms
                .wrapping_add(self.counter.overflow_period_ms());
        }
    }

    /// Current elapsed time in milliseconds
    ///
    /// Non-decreasing across overflow interrupts: a wrap the handler has
    /// not serviced yet is credited here from the pending flag, so the
    /// reading never dips while the interrupt is latent.
    pub fn now_ms(&self) -> u32 {
        // The counter can wrap between the flag read and the value read;
        // re-check the flag and retry the value read if it did.
        let mut pending = self.counter.overflow_pending();
        let mut ticks = self.counter.value();
        let pending_after = self.counter.overflow_pending();
        if pending != pending_after {
            pending = pending_after;
            ticks = self.counter.value();
        }

        let base = if pending {
            self.accumulated_ms
                .wrapping_add(self.counter.overflow_period_ms())
        } else {
            self.accumulated_ms
        };
        base.wrapping_add(ticks / self.counter.ticks_per_ms())
    }
}

/// Wrap-safe duration between two [`ElapsedClock::now_ms`] readings
///
/// Valid as long as the real interval is under half the u32 range
/// (~24 days), which covers any frame timeout by a wide margin.
pub fn elapsed_between(now_ms: u32, earlier_ms: u32) -> u32 {
    now_ms.wrapping_sub(earlier_ms)
}
