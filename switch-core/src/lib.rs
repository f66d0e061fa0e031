//! Core model and safety logic for a two-radio, six-antenna RF switch.
//!
//! Everything here is platform-agnostic and free of I/O so the arbitration
//! rules can be tested on the host. The crate is organized into:
//!
//! - [`types`]: radios, antennas, and the closed enumerations describing
//!   bands, decoding methods, and filter banks
//! - [`mask`]: per-antenna band suitability and priority ([`BandMask`])
//! - [`bcd`]: band decode from the 4-bit status lines
//! - [`arbiter`]: suitable-antenna counting and the transmit-inhibit
//!   decision ([`Switchboard`])
//! - [`status`]: display and terminal status text
//! - [`settings`]: the persisted EEPROM layout and load/save operations
//!
//! The one safety-critical rule lives in [`arbiter::decide_state`]: a radio
//! whose current band no antenna can serve must be inhibited from
//! transmitting, because keying into a wrong-band or unterminated antenna
//! can damage the transmitter final.
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod arbiter;
pub mod bcd;
pub mod mask;
pub mod settings;
pub mod status;
pub mod types;

pub use arbiter::{count_suitable, decide_state, select_antenna, Switchboard};
pub use bcd::decode_bcd;
pub use mask::{BandMask, MaskError, MASK_LEN};
pub use settings::Settings;
pub use types::{Antenna, BandDecoder, BpfType, Radio, RadioBand, RadioId, RadioState};
