//! Transceiver direction control
//!
//! The RS-485 driver-enable pin decides whether this node drives the bus
//! or listens to it. Sequencing is strict: the pin goes to Transmit before
//! the first byte is written, and back to Receive only after the last byte
//! has physically left the shift register. Releasing on "ready for next
//! byte" truncates the final byte on the wire.

use cellnode_hal::OutputPin;

/// Bus direction state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusDirection {
    /// Line driver disabled; this node listens
    Receive,
    /// Line driver enabled; this node owns the bus
    Transmit,
}

/// Direction pin wrapper
///
/// Tracks the logical direction alongside the physical pin. Most
/// transceivers enable the driver on a high pin; `new_active_low` covers
/// the inverted wiring.
pub struct DirectionControl<P> {
    pin: P,
    /// If true, Transmit = pin LOW
    inverted: bool,
    direction: BusDirection,
}

impl<P: OutputPin> DirectionControl<P> {
    /// Wrap a driver-enable pin (high = Transmit), starting in Receive
    pub fn new(pin: P) -> Self {
        Self::with_polarity(pin, false)
    }

    /// Wrap an inverted driver-enable pin (low = Transmit)
    pub fn new_active_low(pin: P) -> Self {
        Self::with_polarity(pin, true)
    }

    fn with_polarity(pin: P, inverted: bool) -> Self {
        let mut control = Self {
            pin,
            inverted,
            direction: BusDirection::Transmit,
        };
        // Make sure the driver starts released.
        control.set(BusDirection::Receive);
        control
    }

    /// Drive the pin to the given direction
    pub fn set(&mut self, direction: BusDirection) {
        self.direction = direction;
        let transmit = direction == BusDirection::Transmit;
        self.pin.set_state(transmit != self.inverted);
    }

    /// Current logical direction
    pub fn get(&self) -> BusDirection {
        self.direction
    }
}
