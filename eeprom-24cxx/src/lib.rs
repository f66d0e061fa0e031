//! Blocking driver for Microchip 24-series I2C EEPROMs (24LC16B .. 24LC512).
//!
//! The chips differ almost exclusively in capacity; the one protocol-level
//! difference is that parts up to 256 bytes per address page take a single
//! address byte on the wire while the larger parts take two (high byte
//! first). [`ChipSize`] captures the capacity and the driver picks the
//! address width from it.
//!
//! On top of raw byte access the driver provides 16-bit integer codecs with
//! a selectable [`ByteOrder`] and a fixed-length string codec used for
//! operator-visible labels.
//!
//! Writes block for a fixed settle delay before returning: the chip NACKs
//! every transaction while it commits a page internally, so pipelining a
//! second write without the delay would fail or corrupt the commit.
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, Operation};

/// Fixed I2C base address; the 3-bit chip-select value is OR'd into it.
pub const BASE_ADDRESS: u8 = 0x50;

/// Default bus clock for these parts.
pub const DEFAULT_CLOCK_HZ: u32 = 100_000;

/// Post-write settle delay. The chip is busy committing the page and NACKs
/// further transactions until done.
pub const WRITE_SETTLE_MS: u32 = 100;

/// Widest string field the driver will write in one call.
pub const MAX_STR_FIELD: usize = 32;

/// Supported chips, identified by their highest valid byte address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipSize {
    /// 24LC16B, single address byte on the wire.
    Lc16b,
    /// 24LC32A
    Lc32a,
    /// 24LC64
    Lc64,
    /// 24LC128
    Lc128,
    /// 24LC256
    Lc256,
    /// 24LC512
    Lc512,
}

impl ChipSize {
    /// Highest valid byte address for this part.
    #[must_use]
    pub const fn max_address(self) -> u16 {
        match self {
            ChipSize::Lc16b => 0x00FF,
            ChipSize::Lc32a => 0x0FFF,
            ChipSize::Lc64 => 0x1FFF,
            ChipSize::Lc128 => 0x3FFF,
            ChipSize::Lc256 => 0x7FFF,
            ChipSize::Lc512 => 0xFFFF,
        }
    }

    /// Parts above 256 bytes take a two-byte address, high byte first.
    const fn two_byte_address(self) -> bool {
        self.max_address() > 0xFF
    }
}

/// Byte order for the 16-bit codecs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOrder {
    /// Low byte at the lower address.
    #[default]
    LittleEndian,
    /// High byte at the lower address.
    BigEndian,
}

/// Error type for EEPROM operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Address (or address + length) beyond the configured capacity.
    /// A programmer or configuration error; never clamped.
    AddressOutOfRange,
    /// Stored bytes are not valid UTF-8 where a string was expected.
    Utf8,
    /// Underlying bus error (NACK, timeout, arbitration loss).
    Bus(E),
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Error::Bus(err)
    }
}

/// Driver for one EEPROM chip on the bus.
///
/// Generic over the bus handle so it works against a raw peripheral, a
/// shared-bus port, or a mock in host tests.
pub struct Eeprom<I2C, D> {
    i2c: I2C,
    delay: D,
    chip: ChipSize,
    address: u8,
    byte_order: ByteOrder,
}

impl<I2C, D, E> Eeprom<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Create a driver for `chip` at chip-select value `select` (A2..A0,
    /// masked to 3 bits).
    #[must_use]
    pub fn new(i2c: I2C, delay: D, chip: ChipSize, select: u8) -> Self {
        Self {
            i2c,
            delay,
            chip,
            address: BASE_ADDRESS | (select & 0x07),
            byte_order: ByteOrder::default(),
        }
    }

    /// Select the byte order used by the 16-bit codecs.
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// The 7-bit device address this driver talks to.
    #[inline]
    #[must_use]
    pub fn device_address(&self) -> u8 {
        self.address
    }

    /// Highest valid byte address of the configured chip.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u16 {
        self.chip.max_address()
    }

    /// Release the bus handle and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn check_range(&self, addr: u16, len: usize) -> Result<(), Error<E>> {
        let end = addr as u32 + len as u32;
        if end > self.chip.max_address() as u32 + 1 {
            return Err(Error::AddressOutOfRange);
        }
        Ok(())
    }

    /// Wire encoding of `addr`: one byte for the small parts, two bytes
    /// high-first for the rest.
    fn address_bytes(&self, addr: u16) -> ([u8; 2], usize) {
        if self.chip.two_byte_address() {
            ([(addr >> 8) as u8, addr as u8], 2)
        } else {
            ([addr as u8, 0], 1)
        }
    }

    /// Read `buf.len()` bytes starting at `addr`.
    pub fn read_bytes(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.check_range(addr, buf.len())?;
        let (abuf, alen) = self.address_bytes(addr);
        self.i2c.write_read(self.address, &abuf[..alen], buf)?;
        Ok(())
    }

    /// Write `data` starting at `addr`, then block for the settle delay.
    ///
    /// The address bytes and payload go out as one uninterrupted bus write.
    pub fn write_bytes(&mut self, addr: u16, data: &[u8]) -> Result<(), Error<E>> {
        self.check_range(addr, data.len())?;
        let (abuf, alen) = self.address_bytes(addr);
        self.i2c.transaction(
            self.address,
            &mut [Operation::Write(&abuf[..alen]), Operation::Write(data)],
        )?;
        self.delay.delay_ms(WRITE_SETTLE_MS);
        Ok(())
    }

    /// Read a single byte.
    pub fn read_byte(&mut self, addr: u16) -> Result<u8, Error<E>> {
        let mut buf = [0u8; 1];
        self.read_bytes(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Write a single byte.
    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Error<E>> {
        self.write_bytes(addr, &[value])
    }

    /// Read a 16-bit unsigned integer honoring the configured byte order.
    pub fn read_u16(&mut self, addr: u16) -> Result<u16, Error<E>> {
        let mut buf = [0u8; 2];
        self.read_bytes(addr, &mut buf)?;
        Ok(match self.byte_order {
            ByteOrder::BigEndian => u16::from_be_bytes(buf),
            ByteOrder::LittleEndian => u16::from_le_bytes(buf),
        })
    }

    /// Write a 16-bit unsigned integer honoring the configured byte order.
    pub fn write_u16(&mut self, addr: u16, value: u16) -> Result<(), Error<E>> {
        let buf = match self.byte_order {
            ByteOrder::BigEndian => value.to_be_bytes(),
            ByteOrder::LittleEndian => value.to_le_bytes(),
        };
        self.write_bytes(addr, &buf)
    }

    /// Read a 16-bit signed integer honoring the configured byte order.
    pub fn read_i16(&mut self, addr: u16) -> Result<i16, Error<E>> {
        Ok(self.read_u16(addr)? as i16)
    }

    /// Write a 16-bit signed integer honoring the configured byte order.
    pub fn write_i16(&mut self, addr: u16, value: i16) -> Result<(), Error<E>> {
        self.write_u16(addr, value as u16)
    }

    /// Read a fixed-length string field into `buf` and return the logical
    /// string: everything up to the first NUL.
    pub fn read_str<'a>(&mut self, addr: u16, buf: &'a mut [u8]) -> Result<&'a str, Error<E>> {
        self.read_bytes(addr, buf)?;
        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        core::str::from_utf8(&buf[..len]).map_err(|_| Error::Utf8)
    }

    /// Write `value` into a `field_len`-byte field at `addr`, truncating a
    /// long value at the field boundary and zero-filling the remainder so a
    /// shorter value never leaves bytes of an older one behind.
    pub fn write_str(&mut self, addr: u16, value: &str, field_len: usize) -> Result<(), Error<E>> {
        self.check_range(addr, field_len)?;
        let field_len = field_len.min(MAX_STR_FIELD);
        let bytes = value.as_bytes();
        let n = bytes.len().min(field_len);
        const ZEROS: [u8; MAX_STR_FIELD] = [0; MAX_STR_FIELD];
        let (abuf, alen) = self.address_bytes(addr);
        self.i2c.transaction(
            self.address,
            &mut [
                Operation::Write(&abuf[..alen]),
                Operation::Write(&bytes[..n]),
                Operation::Write(&ZEROS[..field_len - n]),
            ],
        )?;
        self.delay.delay_ms(WRITE_SETTLE_MS);
        Ok(())
    }
}
