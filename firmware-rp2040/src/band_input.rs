//! Band-data inputs: four status lines per radio.
//!
//! The lines are active low on the connector, so a line reading low means
//! the bit is set. [`read_nibble`](BandInputs::read_nibble) returns the
//! inverted nibble MSB-first, which is the form the BCD decode table
//! consumes.

use embassy_rp::gpio::Input;

/// The four band-data lines of one radio, MSB first.
pub struct BandInputs {
    lines: [Input<'static>; 4],
}

impl BandInputs {
    #[must_use]
    pub fn new(lines: [Input<'static>; 4]) -> Self {
        Self { lines }
    }

    /// Sample the lines into an inverted, MSB-first nibble.
    #[must_use]
    pub fn read_nibble(&self) -> u8 {
        let mut nibble = 0;
        for line in &self.lines {
            nibble = (nibble << 1) | u8::from(line.is_low());
        }
        nibble
    }
}
