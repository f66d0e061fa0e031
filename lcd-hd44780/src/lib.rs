//! Driver for HD44780-compatible character displays in 4-bit mode.
//!
//! The controller is reached through a [`DataBus`]: either a PCF8574-style
//! I2C GPIO expander carrying data, register-select, enable, and backlight
//! on one 8-bit port, or direct 4-bit parallel GPIO in shield-style
//! wirings. The driver itself only speaks nibbles and timing; the bus
//! implementations own the pin/bit mapping.
//!
//! The driver is write-only. The controller offers no readback we use, so
//! every operation trusts the hardware to have committed — which is also
//! why nibble transfers must never interleave between callers: half a byte
//! from each of two writers desyncs the controller's 4-bit state machine.
//!
//! Text handling (truncate/pad to the column count, word-aware wrapping) is
//! pure and lives in [`layout`], so it is testable without a display.
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod command;
pub mod driver;
pub mod layout;

pub use bus::{DataBus, GpioBus, PcfExpanderBus};
pub use driver::Lcd;
pub use layout::{make_text_block, pad_line, TextAlign, MAX_COLS, MAX_ROWS};
