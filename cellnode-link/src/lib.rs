//! Half-duplex serial link layer for Cellnode bus nodes
//!
//! Moves bytes between an interrupt-driven serial peripheral and the
//! protocol engine on an RS-485 two-wire bus, arbitrating the transceiver
//! direction pin so a node never drives the bus while it should be
//! listening.
//!
//! # Data flow
//!
//! ```text
//!               rx-ready IRQ                     poll()
//! wire ──────▶ [RxRing] ─────────────────────▶ protocol engine
//!                                                   │ respond()
//!               tx-ready IRQ                        ▼
//! wire ◀────── [TxSequencer + direction pin] ◀── response frame
//! ```
//!
//! Received bytes land in a fixed-capacity ring buffer from the serial
//! interrupt and are drained by the protocol engine during
//! [`Transport::poll`](transport::Transport::poll). The engine detects
//! frame boundaries by pairing ring
//! occupancy with the monotonic [`ElapsedClock`] reading; when it has a
//! complete request it hands back a response frame, which the
//! [`TxSequencer`] streams out under interrupt control, releasing the
//! direction pin only once the last byte has physically left the wire.
//!
//! All hardware access goes through the `cellnode-hal` traits, so every
//! state machine in this crate runs unmodified on the host under test.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod clock;
pub mod direction;
pub mod engine;
pub mod ring;
pub mod sequencer;
pub mod transport;

pub use clock::{elapsed_between, ElapsedClock};
pub use direction::{BusDirection, DirectionControl};
pub use engine::{LinkPort, ProtocolEngine};
pub use ring::{OverrunError, RxRing};
pub use sequencer::{TransmitError, TxPhase, TxSequencer, MAX_RESPONSE_LEN};
pub use transport::{LinkConfig, LinkFaults, Transport};
