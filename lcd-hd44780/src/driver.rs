//! Controller protocol: initialization, commands, and line writes.

use embedded_hal::delay::DelayNs;

use crate::bus::DataBus;
use crate::command::{
    BLINK_ON, CLEAR_DISPLAY, CURSOR_ON, DISPLAY_CONTROL, DISPLAY_ON, ENTRY_LEFT, ENTRY_MODE_SET,
    FUNCTION_SET, RETURN_HOME, ROW_OFFSETS, SET_DDRAM_ADDR, TWO_LINE,
};
use crate::layout::{self, TextAlign};

// Timing floors from the controller datasheet initialization procedure.
// The three wake-up nibbles need 4.1 ms, 4.1 ms and 100 us; values below
// these garble the display in a way no amount of software can detect,
// since the interface is write-only.
const POWER_ON_SETTLE_MS: u32 = 50;
const WAKEUP_FIRST_US: u32 = 4_500;
const WAKEUP_SECOND_US: u32 = 4_500;
const WAKEUP_THIRD_US: u32 = 150;

/// Clear and return-home run from the controller's slow oscillator and
/// need at least 1.52 ms.
const SLOW_COMMAND_MS: u32 = 2;

/// An HD44780-compatible display on a [`DataBus`].
pub struct Lcd<B, D> {
    bus: B,
    delay: D,
    cols: u8,
    rows: u8,
    display_control: u8,
}

impl<B: DataBus, D: DelayNs> Lcd<B, D> {
    /// Initialize a `cols` × `rows` display and leave it on, cleared, with
    /// the cursor hidden and left-to-right entry mode.
    pub fn new(bus: B, delay: D, cols: u8, rows: u8) -> Result<Self, B::Error> {
        let mut lcd = Self {
            bus,
            delay,
            cols,
            rows,
            display_control: DISPLAY_ON,
        };
        lcd.init()?;
        Ok(lcd)
    }

    /// Power-on sequence. The controller wakes up in 8-bit mode; three
    /// identical "function set 8-bit" nibbles with decreasing settle times
    /// force it out of any half-synchronized state before the switch to
    /// 4-bit mode. Ordering and delays follow the datasheet and must not
    /// be shortened.
    fn init(&mut self) -> Result<(), B::Error> {
        self.bus.set_backlight(false)?;
        self.delay.delay_ms(POWER_ON_SETTLE_MS);

        self.bus.write_nibble(0x03, false, &mut self.delay)?;
        self.delay.delay_us(WAKEUP_FIRST_US);
        self.bus.write_nibble(0x03, false, &mut self.delay)?;
        self.delay.delay_us(WAKEUP_SECOND_US);
        self.bus.write_nibble(0x03, false, &mut self.delay)?;
        self.delay.delay_us(WAKEUP_THIRD_US);

        // Now in a known state; switch to 4-bit transfers.
        self.bus.write_nibble(0x02, false, &mut self.delay)?;

        let mut function = 0;
        if self.rows > 1 {
            function |= TWO_LINE;
        }
        self.command(FUNCTION_SET | function)?;
        self.command(DISPLAY_CONTROL | self.display_control)?;
        self.clear()?;
        self.command(ENTRY_MODE_SET | ENTRY_LEFT)?;
        self.home()
    }

    fn command(&mut self, value: u8) -> Result<(), B::Error> {
        self.send(value, false)
    }

    fn send(&mut self, value: u8, data: bool) -> Result<(), B::Error> {
        self.bus.write_nibble(value >> 4, data, &mut self.delay)?;
        self.bus.write_nibble(value & 0x0F, data, &mut self.delay)
    }

    /// Display geometry.
    #[inline]
    #[must_use]
    pub fn cols(&self) -> u8 {
        self.cols
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Blank the display and move the cursor to 0,0.
    pub fn clear(&mut self) -> Result<(), B::Error> {
        self.command(CLEAR_DISPLAY)?;
        self.delay.delay_ms(SLOW_COMMAND_MS);
        Ok(())
    }

    /// Move the cursor to 0,0 without blanking.
    pub fn home(&mut self) -> Result<(), B::Error> {
        self.command(RETURN_HOME)?;
        self.delay.delay_ms(SLOW_COMMAND_MS);
        Ok(())
    }

    /// Position the cursor. Out-of-range rows clamp to the last row.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), B::Error> {
        let row = row.min(self.rows.saturating_sub(1)).min(3);
        self.command(SET_DDRAM_ADDR | (col + ROW_OFFSETS[row as usize]))
    }

    /// Write one character cell at the cursor.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), B::Error> {
        self.send(byte, true)
    }

    /// Stream a string from the cursor position.
    pub fn write_str(&mut self, text: &str) -> Result<(), B::Error> {
        for &b in text.as_bytes() {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Write a full line: `text` truncated or padded to the column count
    /// per `align`, so the whole row is always overwritten.
    pub fn write_line(&mut self, row: u8, text: &str, align: TextAlign) -> Result<(), B::Error> {
        let line = layout::pad_line(text, self.cols as usize, align);
        self.set_cursor(0, row)?;
        self.write_str(&line)
    }

    /// Word-wrap `text` across the whole display, blanking unused rows.
    pub fn write_block(&mut self, text: &str, align: TextAlign) -> Result<(), B::Error> {
        let block = layout::make_text_block(text, self.cols as usize, self.rows as usize);
        for (row, line) in block.iter().enumerate() {
            self.write_line(row as u8, line, align)?;
        }
        Ok(())
    }

    /// Switch the backlight.
    pub fn backlight(&mut self, on: bool) -> Result<(), B::Error> {
        self.bus.set_backlight(on)
    }

    /// Switch the display on or off without losing DDRAM contents.
    pub fn display(&mut self, on: bool) -> Result<(), B::Error> {
        self.set_control(DISPLAY_ON, on)
    }

    /// Show or hide the underline cursor.
    pub fn cursor(&mut self, on: bool) -> Result<(), B::Error> {
        self.set_control(CURSOR_ON, on)
    }

    /// Enable or disable cursor-cell blinking.
    pub fn blink(&mut self, on: bool) -> Result<(), B::Error> {
        self.set_control(BLINK_ON, on)
    }

    fn set_control(&mut self, flag: u8, on: bool) -> Result<(), B::Error> {
        if on {
            self.display_control |= flag;
        } else {
            self.display_control &= !flag;
        }
        self.command(DISPLAY_CONTROL | self.display_control)
    }

    /// Release the bus and delay provider.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }
}
