//! Bus implementations carrying nibbles to the controller.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

/// Enable pulse width floor; the controller samples on the falling edge.
const ENABLE_PULSE_US: u32 = 1;

/// Settle time after the falling enable edge before the next transfer.
const NIBBLE_SETTLE_US: u32 = 50;

/// Transport for one 4-bit transfer plus the backlight line.
///
/// `write_nibble` must present the nibble and register-select, then clock
/// the transfer in with a high→low enable pulse, honoring the timing
/// floors above.
pub trait DataBus {
    type Error;

    /// Clock the low 4 bits of `nibble` into the controller.
    /// `data` selects the data register; `false` selects the instruction
    /// register.
    fn write_nibble(
        &mut self,
        nibble: u8,
        data: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), Self::Error>;

    /// Drive the backlight line.
    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error>;
}

/// Expander port bit assignments: data occupies the high nibble, the low
/// nibble carries the control lines.
const RS: u8 = 0x01;
const ENABLE: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

/// PCF8574-style I2C expander bus.
///
/// The expander has a single 8-bit output port, so every write drives data
/// and backlight together; the current backlight bit is OR'd into each
/// pattern or the light would flicker off on every transfer.
pub struct PcfExpanderBus<I2C> {
    i2c: I2C,
    address: u8,
    backlight: u8,
}

impl<I2C: I2c> PcfExpanderBus<I2C> {
    /// Typical expander address with all select pins high.
    pub const DEFAULT_ADDRESS: u8 = 0x27;

    #[must_use]
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            backlight: 0,
        }
    }

    fn write_raw(&mut self, pattern: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[pattern | self.backlight])
    }
}

impl<I2C: I2c> DataBus for PcfExpanderBus<I2C> {
    type Error = I2C::Error;

    fn write_nibble(
        &mut self,
        nibble: u8,
        data: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), Self::Error> {
        let pattern = (nibble << 4) | if data { RS } else { 0 };
        self.write_raw(pattern)?;
        self.write_raw(pattern | ENABLE)?;
        delay.delay_us(ENABLE_PULSE_US);
        self.write_raw(pattern & !ENABLE)?;
        delay.delay_us(NIBBLE_SETTLE_US);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        self.backlight = if on { BACKLIGHT } else { 0 };
        self.write_raw(0)
    }
}

/// Direct 4-bit parallel wiring: RS, E, and D4..D7 as GPIO, with an
/// optional backlight pin. All pins share one `OutputPin` type, which is
/// what HAL output pins degrade to.
pub struct GpioBus<P> {
    rs: P,
    en: P,
    d4: P,
    d5: P,
    d6: P,
    d7: P,
    backlight: Option<P>,
}

impl<P: OutputPin> GpioBus<P> {
    #[must_use]
    pub fn new(rs: P, en: P, d4: P, d5: P, d6: P, d7: P, backlight: Option<P>) -> Self {
        Self {
            rs,
            en,
            d4,
            d5,
            d6,
            d7,
            backlight,
        }
    }

    fn set_data(&mut self, nibble: u8) -> Result<(), P::Error> {
        self.d4.set_state(((nibble & 0x1) != 0).into())?;
        self.d5.set_state(((nibble & 0x2) != 0).into())?;
        self.d6.set_state(((nibble & 0x4) != 0).into())?;
        self.d7.set_state(((nibble & 0x8) != 0).into())?;
        Ok(())
    }
}

impl<P: OutputPin> DataBus for GpioBus<P> {
    type Error = P::Error;

    fn write_nibble(
        &mut self,
        nibble: u8,
        data: bool,
        delay: &mut impl DelayNs,
    ) -> Result<(), Self::Error> {
        self.rs.set_state(data.into())?;
        self.set_data(nibble)?;
        self.en.set_high()?;
        delay.delay_us(ENABLE_PULSE_US);
        self.en.set_low()?;
        delay.delay_us(NIBBLE_SETTLE_US);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Self::Error> {
        if let Some(pin) = self.backlight.as_mut() {
            pin.set_state(on.into())?;
        }
        Ok(())
    }
}
