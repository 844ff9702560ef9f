//! Serial peripheral abstraction
//!
//! The link layer drives the UART entirely from interrupt context, so this
//! trait exposes the register-level primitives an interrupt handler needs
//! (status flags, single-byte data access, interrupt enables) rather than
//! blocking read/write calls.

/// Interrupt-driven serial peripheral
///
/// Implementations map these directly onto the peripheral's status and
/// control registers. All operations are infallible at this level; fault
/// conditions surface through the status flags.
pub trait SerialBus {
    /// Apply line settings (baud rate, framing) to the peripheral
    fn configure(&mut self, config: &SerialConfig);

    /// A received byte is waiting in the receive holding register
    fn rx_ready(&self) -> bool;

    /// Read the receive holding register, clearing the rx-ready condition
    fn read_byte(&mut self) -> u8;

    /// The transmit holding register can accept another byte
    fn tx_ready(&self) -> bool;

    /// Write one byte to the transmit holding register
    fn write_byte(&mut self, byte: u8);

    /// The transmit holding register *and* the shift register are both
    /// empty: the last bit of the last byte has left the wire.
    ///
    /// This is distinct from [`tx_ready`](Self::tx_ready), which only
    /// indicates room for the next byte while a previous byte may still
    /// be shifting out.
    fn tx_idle(&self) -> bool;

    /// Enable the receive-ready interrupt condition
    fn enable_rx_interrupt(&mut self);

    /// Enable the transmit-ready interrupt condition
    fn enable_tx_interrupt(&mut self);

    /// Disable the transmit-ready interrupt condition
    fn disable_tx_interrupt(&mut self);
}

/// Serial line configuration
#[derive(Debug, Clone, Copy)]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baudrate: 19200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
