//! Cellnode Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the link layer is written
//! against. Chip-specific adapter crates implement them on top of the
//! real peripheral registers; host tests implement them with mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  cellnode-link (transport controller)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  cellnode-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip adapter │       │  host mocks   │
//! │  (firmware)   │       │  (tests)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (transceiver direction pin)
//! - [`serial::SerialBus`] - Interrupt-driven serial peripheral primitives
//! - [`timer::TickCounter`] - Free-running counter with overflow flag

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod serial;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use serial::{SerialBus, SerialConfig};
pub use timer::TickCounter;
