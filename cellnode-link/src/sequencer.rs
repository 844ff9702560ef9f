//! Transmit sequencer
//!
//! Streams a response frame out of the serial peripheral one byte per
//! tx-ready interrupt while holding the bus direction pin asserted, then
//! releases the bus. The drain is two-phase: bytes are written while any
//! remain, then the sequencer waits for the hardware to report the shift
//! register empty before dropping the direction pin. Releasing on
//! holding-register-empty alone would cut off the last byte mid-flight.

use cellnode_hal::{OutputPin, SerialBus};
use heapless::Vec;

use crate::direction::{BusDirection, DirectionControl};

/// Largest response frame the sequencer will accept
///
/// Matches the 256-byte Modbus RTU ADU bound the bus protocol works in.
pub const MAX_RESPONSE_LEN: usize = 256;

/// Transmission rejected at [`TxSequencer::start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError {
    /// A previous transmission has not finished draining
    Busy,
    /// Frame exceeds [`MAX_RESPONSE_LEN`]
    FrameTooLong,
    /// Zero-length frame; nothing to put on the wire
    EmptyFrame,
}

/// Sequencer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxPhase {
    /// No transmission in progress; bus direction is Receive
    Idle,
    /// Bytes remain to be written to the holding register
    Filling,
    /// All bytes written; waiting for the shift register to empty
    Draining,
}

/// Interrupt-driven transmit state machine
///
/// Owns a copy of the in-flight frame, so the caller's buffer is free the
/// moment [`start`](Self::start) returns.
pub struct TxSequencer {
    frame: Vec<u8, MAX_RESPONSE_LEN>,
    cursor: usize,
    phase: TxPhase,
    rejects: u32,
}

impl TxSequencer {
    /// Create an idle sequencer
    pub const fn new() -> Self {
        Self {
            frame: Vec::new(),
            cursor: 0,
            phase: TxPhase::Idle,
            rejects: 0,
        }
    }

    /// Begin transmitting a frame
    ///
    /// Asserts the direction pin, then enables the tx-ready interrupt;
    /// the interrupt path does the actual byte writes. A call while a
    /// previous frame is still filling or draining is rejected and leaves
    /// the in-flight transmission untouched.
    pub fn start<S: SerialBus, P: OutputPin>(
        &mut self,
        frame: &[u8],
        serial: &mut S,
        dir: &mut DirectionControl<P>,
    ) -> Result<(), TransmitError> {
        if self.phase != TxPhase::Idle {
            self.rejects = self.rejects.wrapping_add(1);
            return Err(TransmitError::Busy);
        }
        if frame.is_empty() {
            return Err(TransmitError::EmptyFrame);
        }
        self.frame.clear();
        self.frame
            .extend_from_slice(frame)
            .map_err(|_| TransmitError::FrameTooLong)?;
        self.cursor = 0;
        self.phase = TxPhase::Filling;

        // Claim the bus before the first byte can possibly go out.
        dir.set(BusDirection::Transmit);
        serial.enable_tx_interrupt();
        Ok(())
    }

    /// Tx-ready interrupt entry point
    ///
    /// Filling: write the next byte. Draining: release the bus once the
    /// shift register reports empty, otherwise keep waiting. Idle: a
    /// spurious event, ignored.
    pub fn on_tx_ready<S: SerialBus, P: OutputPin>(
        &mut self,
        serial: &mut S,
        dir: &mut DirectionControl<P>,
    ) {
        match self.phase {
            TxPhase::Idle => {}
            TxPhase::Filling => {
                serial.write_byte(self.frame[self.cursor]);
                self.cursor += 1;
                if self.cursor == self.frame.len() {
                    self.phase = TxPhase::Draining;
                }
            }
            TxPhase::Draining => {
                if serial.tx_idle() {
                    dir.set(BusDirection::Receive);
                    serial.disable_tx_interrupt();
                    self.frame.clear();
                    self.cursor = 0;
                    self.phase = TxPhase::Idle;
                }
            }
        }
    }

    /// Current phase
    pub fn phase(&self) -> TxPhase {
        self.phase
    }

    /// A transmission is in progress (filling or draining)
    pub fn busy(&self) -> bool {
        self.phase != TxPhase::Idle
    }

    /// Count of `start` calls rejected with [`TransmitError::Busy`]
    pub fn rejects(&self) -> u32 {
        self.rejects
    }
}

impl Default for TxSequencer {
    fn default() -> Self {
        Self::new()
    }
}
