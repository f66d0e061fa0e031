//! Persisted configuration: byte layout and load/save operations.
//!
//! The EEPROM is partitioned by fixed offsets:
//!
//! | Address        | Content                                   |
//! |----------------|-------------------------------------------|
//! | 0              | provisioning sentinel, `0xFF` once set up |
//! | `10·(i+1)`     | radio *i* decoding method, one byte       |
//! | `10·(i+1)+1`   | radio *i* BPF type, one byte              |
//! | `100·(i+1)`    | antenna *i* name, 11-byte field           |
//! | `100·(i+1)+12` | antenna *i* mask, 6 ASCII digits          |
//!
//! Any sentinel value other than `0xFF` means the chip is blank or from a
//! foreign image, and triggers a factory reset. The layout needs
//! addresses up to 612, so the smallest supported chip is the 24LC32A.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use eeprom_24cxx::{Eeprom, Error};

use crate::arbiter::{Switchboard, ANTENNA_COUNT, RADIO_COUNT};
use crate::mask::{BandMask, MASK_LEN};
use crate::types::{Antenna, BandDecoder, BpfType, Radio, NAME_LEN};

/// Provisioning sentinel location and value.
pub const SENTINEL_ADDR: u16 = 0;
pub const PROVISIONED: u8 = 0xFF;

/// Offset of the mask field within an antenna block.
pub const MASK_OFFSET: u16 = 12;

const fn radio_base(index: usize) -> u16 {
    10 * (index as u16 + 1)
}

const fn antenna_base(index: usize) -> u16 {
    100 * (index as u16 + 1)
}

/// The configuration store: the persisted side of a [`Switchboard`].
///
/// Callers keep the live model and the store in sync by saving through
/// this type after every accepted configuration change; a failed save
/// leaves the previously persisted state untouched and must not be
/// reported as committed.
pub struct Settings<I2C, D> {
    eeprom: Eeprom<I2C, D>,
}

impl<I2C, D, E> Settings<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    pub fn new(eeprom: Eeprom<I2C, D>) -> Self {
        Self { eeprom }
    }

    /// Whether the chip carries a configuration written by this firmware.
    pub fn is_provisioned(&mut self) -> Result<bool, Error<E>> {
        Ok(self.eeprom.read_byte(SENTINEL_ADDR)? == PROVISIONED)
    }

    /// Write factory defaults for every antenna and radio, then set the
    /// sentinel. The sentinel goes last so a reset interrupted by power
    /// loss is re-run in full on the next boot.
    pub fn factory_reset(&mut self) -> Result<(), Error<E>> {
        for index in 0..ANTENNA_COUNT {
            self.save_antenna(index, &Antenna::numbered(index))?;
        }
        for index in 0..RADIO_COUNT {
            self.save_radio(index, &Radio::new())?;
        }
        self.eeprom.write_byte(SENTINEL_ADDR, PROVISIONED)
    }

    /// Factory-reset the chip unless it is already provisioned. Returns
    /// whether existing configuration was found.
    pub fn ensure_provisioned(&mut self) -> Result<bool, Error<E>> {
        if self.is_provisioned()? {
            return Ok(true);
        }
        self.factory_reset()?;
        Ok(false)
    }

    pub fn load_antenna(&mut self, index: usize) -> Result<Antenna, Error<E>> {
        let base = antenna_base(index);
        let mut name_buf = [0u8; NAME_LEN];
        let name = match self.eeprom.read_str(base, &mut name_buf) {
            Ok(name) => name.trim_end(),
            // Name cells never written by this firmware; show the port
            // empty rather than refusing to boot.
            Err(Error::Utf8) => "",
            Err(e) => return Err(e),
        };
        let antenna = Antenna::new(name, self.load_mask(base + MASK_OFFSET)?);
        Ok(antenna)
    }

    fn load_mask(&mut self, addr: u16) -> Result<BandMask, Error<E>> {
        let mut digits = [0u8; MASK_LEN];
        self.eeprom.read_bytes(addr, &mut digits)?;
        let mask = core::str::from_utf8(&digits)
            .ok()
            .and_then(|s| BandMask::parse(s).ok())
            // Damaged or blank cells fall back to no-bands-suitable, the
            // safe direction for the inhibit rule.
            .unwrap_or(BandMask::CLEAR);
        Ok(mask)
    }

    pub fn save_antenna(&mut self, index: usize, antenna: &Antenna) -> Result<(), Error<E>> {
        let base = antenna_base(index);
        self.eeprom.write_str(base, antenna.name(), NAME_LEN)?;
        self.eeprom
            .write_bytes(base + MASK_OFFSET, antenna.mask.digits().as_bytes())
    }

    pub fn load_radio(&mut self, index: usize) -> Result<Radio, Error<E>> {
        let base = radio_base(index);
        let mut radio = Radio::new();
        if let Some(decoder) = BandDecoder::from_code(self.eeprom.read_byte(base)?) {
            radio.decoder = decoder;
        }
        if let Some(bpf) = BpfType::from_code(self.eeprom.read_byte(base + 1)?) {
            radio.bpf = bpf;
        }
        Ok(radio)
    }

    /// Persist a radio's operator configuration. Band, state, and antenna
    /// selection are runtime values and are not stored.
    pub fn save_radio(&mut self, index: usize, radio: &Radio) -> Result<(), Error<E>> {
        let base = radio_base(index);
        self.eeprom.write_byte(base, radio.decoder.code())?;
        self.eeprom.write_byte(base + 1, radio.bpf.code())
    }

    /// Load the complete persisted configuration into a fresh model.
    pub fn load_switchboard(&mut self) -> Result<Switchboard, Error<E>> {
        let mut board = Switchboard::new();
        for index in 0..ANTENNA_COUNT {
            *board.antenna_mut(index) = self.load_antenna(index)?;
        }
        for index in 0..RADIO_COUNT {
            *board.radio_mut(index) = self.load_radio(index)?;
        }
        Ok(board)
    }

    /// Release the underlying driver.
    pub fn release(self) -> Eeprom<I2C, D> {
        self.eeprom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eeprom_24cxx::ChipSize;
    use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Nack;

    impl embedded_hal::i2c::Error for Nack {
        fn kind(&self) -> ErrorKind {
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        }
    }

    /// In-memory EEPROM chip with two-byte addressing.
    struct MockChip {
        mem: [u8; 0x8000],
        cursor: usize,
        nack: bool,
    }

    impl MockChip {
        fn new() -> Self {
            Self {
                mem: [0u8; 0x8000],
                cursor: 0,
                nack: false,
            }
        }
    }

    impl ErrorType for MockChip {
        type Error = Nack;
    }

    impl I2c for MockChip {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.nack {
                return Err(Nack);
            }
            let mut addr_seen = 0;
            for op in operations {
                match op {
                    Operation::Write(data) => {
                        for &b in *data {
                            if addr_seen < 2 {
                                if addr_seen == 0 {
                                    self.cursor = 0;
                                }
                                self.cursor = (self.cursor << 8) | b as usize;
                                addr_seen += 1;
                            } else {
                                self.mem[self.cursor] = b;
                                self.cursor += 1;
                            }
                        }
                    }
                    Operation::Read(buf) => {
                        for slot in buf.iter_mut() {
                            *slot = self.mem[self.cursor];
                            self.cursor += 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    fn settings() -> Settings<MockChip, NoDelay> {
        Settings::new(Eeprom::new(MockChip::new(), NoDelay, ChipSize::Lc256, 0))
    }

    #[test]
    fn test_blank_chip_is_unprovisioned() {
        let mut s = settings();
        assert_eq!(s.is_provisioned(), Ok(false));
        assert_eq!(s.ensure_provisioned(), Ok(false));
        assert_eq!(s.is_provisioned(), Ok(true));
        // A second boot finds the existing configuration.
        assert_eq!(s.ensure_provisioned(), Ok(true));
    }

    #[test]
    fn test_factory_defaults_load_back() {
        let mut s = settings();
        s.factory_reset().unwrap();

        let board = s.load_switchboard().unwrap();
        assert_eq!(board.antenna(0).name(), "ANTENNA 1");
        assert_eq!(board.antenna(5).name(), "ANTENNA 6");
        assert_eq!(board.antenna(2).mask, BandMask::CLEAR);
        assert_eq!(*board.radio(0), Radio::new());
        assert_eq!(*board.radio(1), Radio::new());
    }

    #[test]
    fn test_antenna_roundtrip() {
        let mut s = settings();
        let antenna = Antenna::new("STEPPIR 3EL", BandMask::parse("000221").unwrap());
        s.save_antenna(3, &antenna).unwrap();
        assert_eq!(s.load_antenna(3).unwrap(), antenna);
    }

    #[test]
    fn test_radio_roundtrip() {
        let mut s = settings();
        let mut radio = Radio::new();
        radio.decoder = BandDecoder::Civ;
        radio.bpf = BpfType::SeparateBands;
        s.save_radio(1, &radio).unwrap();

        let loaded = s.load_radio(1).unwrap();
        assert_eq!(loaded.decoder, BandDecoder::Civ);
        assert_eq!(loaded.bpf, BpfType::SeparateBands);
        // Runtime fields come back at their defaults.
        assert_eq!(loaded.band, Radio::new().band);
        assert_eq!(loaded.antenna, None);
    }

    #[test]
    fn test_persisted_byte_layout() {
        let mut s = settings();
        let antenna = Antenna::new("DIPOLE", BandMask::parse("012210").unwrap());
        s.save_antenna(0, &antenna).unwrap();
        let mut radio = Radio::new();
        radio.decoder = BandDecoder::Kenwood;
        radio.bpf = BpfType::YaesuBcd;
        s.save_radio(0, &radio).unwrap();
        s.eeprom.write_byte(SENTINEL_ADDR, PROVISIONED).unwrap();

        let chip = s.release().release().0;
        assert_eq!(chip.mem[0], 0xFF);
        assert_eq!(chip.mem[10], 3); // Kenwood
        assert_eq!(chip.mem[11], 1); // Yaesu BCD filter bank
        assert_eq!(&chip.mem[100..106], b"DIPOLE");
        assert_eq!(&chip.mem[106..111], &[0, 0, 0, 0, 0]); // zero-filled name tail
        assert_eq!(&chip.mem[112..118], b"012210");
    }

    #[test]
    fn test_rename_shorter_leaves_no_tail() {
        let mut s = settings();
        let long = Antenna::new("LONGERNAME!", BandMask::CLEAR);
        s.save_antenna(0, &long).unwrap();
        let short = Antenna::new("YAGI", BandMask::CLEAR);
        s.save_antenna(0, &short).unwrap();
        assert_eq!(s.load_antenna(0).unwrap().name(), "YAGI");
    }

    #[test]
    fn test_bus_error_surfaces() {
        // A wedged bus must surface as an error, never read as "blank
        // chip" — that would trigger a factory reset over live settings.
        let mut chip = MockChip::new();
        chip.nack = true;
        let mut s = Settings::new(Eeprom::new(chip, NoDelay, ChipSize::Lc256, 0));
        assert_eq!(s.is_provisioned(), Err(Error::Bus(Nack)));
        assert!(s.load_antenna(0).is_err());
    }
}
