//! Transport controller
//!
//! Ties the clock, ring buffer, and transmit sequencer into the single
//! context object the firmware owns. Interrupt dispatch is explicit: the
//! firmware's serial and timer handlers lock this object and call
//! [`Transport::on_serial_event`] / [`Transport::on_timer_overflow`];
//! the application loop calls [`Transport::poll`] with the protocol
//! engine. Nothing here blocks and every handler path is O(1).

use cellnode_hal::{OutputPin, SerialBus, SerialConfig, TickCounter};

use crate::clock::ElapsedClock;
use crate::direction::{BusDirection, DirectionControl};
use crate::engine::{LinkPort, ProtocolEngine};
use crate::ring::RxRing;
use crate::sequencer::{TransmitError, TxPhase, TxSequencer};

/// Link-layer configuration
#[derive(Debug, Clone, Copy)]
pub struct LinkConfig {
    /// This node's bus address, handed to the protocol engine
    pub node_id: u8,
    /// Serial line settings
    pub serial: SerialConfig,
    /// Inter-frame silence threshold for the protocol engine
    pub frame_timeout_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            node_id: 1,
            serial: SerialConfig::default(),
            // ~3.5 character times at 19200 baud, rounded up
            frame_timeout_ms: 10,
        }
    }
}

/// Fault counters for the surrounding system to inspect
///
/// No fault here is fatal; each is recovered locally and tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkFaults {
    /// Received bytes dropped because the ring buffer was full
    pub rx_overruns: u32,
    /// Transmit requests rejected while a response was still on the wire
    pub tx_rejects: u32,
}

/// Half-duplex link transport
///
/// `N` is the receive ring capacity, sized for the worst-case request
/// frame the protocol engine expects.
pub struct Transport<S, P, T, const N: usize> {
    serial: S,
    dir: DirectionControl<P>,
    clock: ElapsedClock<T>,
    rx: RxRing<N>,
    tx: TxSequencer,
    config: LinkConfig,
}

impl<S, P, T, const N: usize> Transport<S, P, T, N>
where
    S: SerialBus,
    P: OutputPin,
    T: TickCounter,
{
    /// Assemble the transport; starts the tick counter and releases the bus
    pub fn new(serial: S, dir: DirectionControl<P>, counter: T, config: LinkConfig) -> Self {
        Self {
            serial,
            dir,
            clock: ElapsedClock::new(counter),
            rx: RxRing::new(),
            tx: TxSequencer::new(),
            config,
        }
    }

    /// One-time setup
    ///
    /// Applies the serial line settings, arms the receive interrupt,
    /// forces the bus direction to Receive, and hands the protocol engine
    /// its node address. Interrupt vector registration and peripheral
    /// clock/pin-mux bring-up belong to the firmware binding.
    pub fn initialize<E: ProtocolEngine>(&mut self, engine: &mut E) {
        self.serial.configure(&self.config.serial);
        self.serial.enable_rx_interrupt();
        self.dir.set(BusDirection::Receive);
        engine.init(self.config.node_id);
    }

    /// Combined serial interrupt entry point
    ///
    /// Receive has priority: a waiting byte is moved into the ring before
    /// any transmit servicing, matching the peripheral's single coalesced
    /// interrupt line.
    pub fn on_serial_event(&mut self) {
        if self.serial.rx_ready() {
            let byte = self.serial.read_byte();
            // Overrun is counted inside the ring; the byte is dropped.
            let _ = self.rx.push(byte);
        } else if self.serial.tx_ready() {
            self.tx.on_tx_ready(&mut self.serial, &mut self.dir);
        }
    }

    /// Timer-overflow interrupt entry point
    pub fn on_timer_overflow(&mut self) {
        self.clock.handle_overflow();
    }

    /// Periodic update from the application loop
    ///
    /// Hands the protocol engine a [`LinkPort`] view of this transport so
    /// it can drain received bytes and queue a response.
    pub fn poll<E: ProtocolEngine>(&mut self, engine: &mut E) {
        engine.update(self);
    }

    /// Queue a response frame for interrupt-driven transmission
    pub fn transmit(&mut self, frame: &[u8]) -> Result<(), TransmitError> {
        self.tx.start(frame, &mut self.serial, &mut self.dir)
    }

    /// Current elapsed time in milliseconds
    pub fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    /// Current transmit phase
    pub fn tx_phase(&self) -> TxPhase {
        self.tx.phase()
    }

    /// Snapshot of the fault counters
    pub fn faults(&self) -> LinkFaults {
        LinkFaults {
            rx_overruns: self.rx.overruns(),
            tx_rejects: self.tx.rejects(),
        }
    }
}

impl<S, P, T, const N: usize> LinkPort for Transport<S, P, T, N>
where
    S: SerialBus,
    P: OutputPin,
    T: TickCounter,
{
    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }

    fn frame_timeout_ms(&self) -> u32 {
        self.config.frame_timeout_ms
    }

    fn available(&self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop()
    }

    fn discard_input(&mut self) {
        self.rx.clear();
    }

    fn respond(&mut self, frame: &[u8]) -> Result<(), TransmitError> {
        self.tx.start(frame, &mut self.serial, &mut self.dir)
    }

    fn transmitting(&self) -> bool {
        self.tx.busy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::elapsed_between;
    use core::cell::Cell;
    use heapless::Vec;
    use std::rc::Rc;

    /// Mock serial peripheral: one-byte receive holding register,
    /// recorded transmit stream, controllable tx-idle status.
    struct MockSerial {
        rx_holding: Option<u8>,
        written: Vec<u8, 64>,
        tx_idle: bool,
        tx_irq_enabled: bool,
        rx_irq_enabled: bool,
        configured_baud: Option<u32>,
    }

    impl MockSerial {
        fn new() -> Self {
            Self {
                rx_holding: None,
                written: Vec::new(),
                tx_idle: false,
                tx_irq_enabled: false,
                rx_irq_enabled: false,
                configured_baud: None,
            }
        }
    }

    impl SerialBus for MockSerial {
        fn configure(&mut self, config: &SerialConfig) {
            self.configured_baud = Some(config.baudrate);
        }

        fn rx_ready(&self) -> bool {
            self.rx_holding.is_some()
        }

        fn read_byte(&mut self) -> u8 {
            self.rx_holding.take().unwrap_or(0)
        }

        fn tx_ready(&self) -> bool {
            self.tx_irq_enabled
        }

        fn write_byte(&mut self, byte: u8) {
            let _ = self.written.push(byte);
            self.tx_idle = false;
        }

        fn tx_idle(&self) -> bool {
            self.tx_idle
        }

        fn enable_rx_interrupt(&mut self) {
            self.rx_irq_enabled = true;
        }

        fn enable_tx_interrupt(&mut self) {
            self.tx_irq_enabled = true;
        }

        fn disable_tx_interrupt(&mut self) {
            self.tx_irq_enabled = false;
        }
    }

    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    /// Shared handle advancing the mock counter from outside the transport
    #[derive(Clone)]
    struct TimeHandle {
        total_ticks: Rc<Cell<u64>>,
        cleared_wraps: Rc<Cell<u64>>,
    }

    impl TimeHandle {
        fn new() -> Self {
            Self {
                total_ticks: Rc::new(Cell::new(0)),
                cleared_wraps: Rc::new(Cell::new(0)),
            }
        }

        /// Advance time; 32 ticks per millisecond
        fn advance_ms(&self, ms: u32) {
            self.total_ticks
                .set(self.total_ticks.get() + u64::from(ms) * 32);
        }
    }

    struct MockCounter {
        time: TimeHandle,
    }

    impl TickCounter for MockCounter {
        fn start(&mut self) {}

        fn value(&self) -> u32 {
            (self.time.total_ticks.get() % 65_536) as u32
        }

        fn ticks_per_ms(&self) -> u32 {
            32
        }

        fn overflow_period_ms(&self) -> u32 {
            2048
        }

        fn overflow_pending(&self) -> bool {
            self.time.total_ticks.get() / 65_536 > self.time.cleared_wraps.get()
        }

        fn clear_overflow(&mut self) {
            self.time.cleared_wraps.set(self.time.cleared_wraps.get() + 1);
        }
    }

    type TestTransport<const N: usize> = Transport<MockSerial, MockPin, MockCounter, N>;

    fn rig<const N: usize>(config: LinkConfig) -> (TestTransport<N>, TimeHandle) {
        let time = TimeHandle::new();
        let transport = Transport::new(
            MockSerial::new(),
            DirectionControl::new(MockPin { high: false }),
            MockCounter { time: time.clone() },
            config,
        );
        (transport, time)
    }

    /// Deliver one byte through the interrupt path
    fn receive_byte<const N: usize>(transport: &mut TestTransport<N>, byte: u8) {
        transport.serial.rx_holding = Some(byte);
        transport.on_serial_event();
    }

    /// Pump tx-ready interrupts until the sequencer goes idle
    fn pump_transmit<const N: usize>(transport: &mut TestTransport<N>) {
        while transport.tx_phase() != TxPhase::Idle {
            if transport.tx_phase() == TxPhase::Draining {
                transport.serial.tx_idle = true;
            }
            transport.on_serial_event();
        }
    }

    /// Minimal engine: echoes a timed-out request back as the response
    struct EchoEngine {
        node_id: Option<u8>,
        request: Vec<u8, 32>,
        last_rx_ms: u32,
        responses: u32,
    }

    impl EchoEngine {
        fn new() -> Self {
            Self {
                node_id: None,
                request: Vec::new(),
                last_rx_ms: 0,
                responses: 0,
            }
        }
    }

    impl ProtocolEngine for EchoEngine {
        fn init(&mut self, node_id: u8) {
            self.node_id = Some(node_id);
        }

        fn update<L: LinkPort>(&mut self, link: &mut L) {
            let now = link.now_ms();
            while let Some(byte) = link.read_byte() {
                let _ = self.request.push(byte);
                self.last_rx_ms = now;
            }
            if !self.request.is_empty()
                && !link.transmitting()
                && elapsed_between(now, self.last_rx_ms) >= link.frame_timeout_ms()
            {
                if link.respond(&self.request).is_ok() {
                    self.responses += 1;
                }
                self.request.clear();
            }
        }
    }

    #[test]
    fn initialize_wires_peripheral_pin_and_engine() {
        let (mut transport, _time) = rig::<16>(LinkConfig {
            node_id: 7,
            ..LinkConfig::default()
        });
        let mut engine = EchoEngine::new();
        transport.initialize(&mut engine);

        assert_eq!(transport.serial.configured_baud, Some(19200));
        assert!(transport.serial.rx_irq_enabled);
        assert!(!transport.serial.tx_irq_enabled);
        assert_eq!(transport.dir.get(), BusDirection::Receive);
        assert_eq!(engine.node_id, Some(7));
    }

    #[test]
    fn interrupt_path_fills_ring_to_capacity() {
        // Capacity 16, bytes 0x01..=0x10: occupancy reads 16, one pop
        // returns 0x01 and occupancy drops to 15.
        let (mut transport, _time) = rig::<16>(LinkConfig::default());

        for byte in 0x01..=0x10u8 {
            receive_byte(&mut transport, byte);
        }
        assert_eq!(transport.available(), 16);
        assert_eq!(transport.read_byte(), Some(0x01));
        assert_eq!(transport.available(), 15);
    }

    #[test]
    fn overruns_are_counted_not_silent() {
        let (mut transport, _time) = rig::<4>(LinkConfig::default());

        for byte in 1..=6u8 {
            receive_byte(&mut transport, byte);
        }
        assert_eq!(transport.faults().rx_overruns, 2);

        // The four oldest bytes survive intact.
        for expected in 1..=4u8 {
            assert_eq!(transport.read_byte(), Some(expected));
        }
    }

    #[test]
    fn request_response_cycle_over_the_wire() {
        let (mut transport, time) = rig::<16>(LinkConfig::default());
        let mut engine = EchoEngine::new();
        transport.initialize(&mut engine);

        for byte in [0x01, 0x03, 0x00, 0x2A] {
            receive_byte(&mut transport, byte);
        }

        // Silence shorter than the frame timeout: no response yet.
        time.advance_ms(2);
        transport.poll(&mut engine);
        assert_eq!(engine.responses, 0);
        assert_eq!(transport.tx_phase(), TxPhase::Idle);

        // Frame timeout elapses; the engine hands back a response and the
        // sequencer claims the bus.
        time.advance_ms(12);
        transport.poll(&mut engine);
        assert_eq!(engine.responses, 1);
        assert_eq!(transport.dir.get(), BusDirection::Transmit);

        pump_transmit(&mut transport);
        assert_eq!(&transport.serial.written[..], &[0x01, 0x03, 0x00, 0x2A]);
        assert_eq!(transport.dir.get(), BusDirection::Receive);
        assert!(!transport.serial.tx_irq_enabled);
    }

    #[test]
    fn transmit_while_busy_is_rejected_and_counted() {
        let (mut transport, _time) = rig::<16>(LinkConfig::default());

        transport.transmit(&[0xAA, 0xBB]).unwrap();
        assert_eq!(transport.transmit(&[0xCC]), Err(TransmitError::Busy));
        assert_eq!(transport.faults().tx_rejects, 1);

        pump_transmit(&mut transport);
        assert_eq!(&transport.serial.written[..], &[0xAA, 0xBB]);
    }

    #[test]
    fn receive_keeps_priority_during_a_transmission() {
        let (mut transport, _time) = rig::<16>(LinkConfig::default());
        transport.transmit(&[0x11, 0x22]).unwrap();

        // A byte lands mid-transmission; the rx branch must service it
        // before any tx work.
        receive_byte(&mut transport, 0x5A);
        assert_eq!(transport.available(), 1);
        assert!(transport.serial.written.is_empty());

        pump_transmit(&mut transport);
        assert_eq!(&transport.serial.written[..], &[0x11, 0x22]);
        assert_eq!(transport.read_byte(), Some(0x5A));
    }

    #[test]
    fn discard_input_recovers_from_partial_frame_timeout() {
        let (mut transport, time) = rig::<16>(LinkConfig::default());

        for byte in [0x01, 0x03] {
            receive_byte(&mut transport, byte);
        }
        time.advance_ms(50);

        // Engine decides the partial frame is dead and discards it.
        transport.discard_input();
        assert_eq!(transport.available(), 0);

        // The link keeps working afterwards.
        receive_byte(&mut transport, 0x99);
        assert_eq!(transport.read_byte(), Some(0x99));
    }

    #[test]
    fn timer_overflow_interrupt_advances_the_clock() {
        let (mut transport, time) = rig::<16>(LinkConfig::default());

        let start = transport.now_ms();
        time.advance_ms(3000); // crosses one counter wrap
        transport.on_timer_overflow();

        let now = transport.now_ms();
        assert_eq!(elapsed_between(now, start), 3000);
    }
}
