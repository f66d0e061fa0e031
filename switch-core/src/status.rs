//! Status text for the character display and the serial terminal.

use core::fmt::Write;

use heapless::String;

use crate::mask::MASK_LEN;
use crate::types::{Antenna, Radio, RadioId};

/// Display line for a radio's state, e.g. `"Radio A : TX INHIBIT"`.
#[must_use]
pub fn radio_state_line(id: RadioId, radio: &Radio) -> String<20> {
    let mut line: String<20> = String::new();
    let _ = write!(line, "Radio {} : {}", id.label(), radio.state.label());
    line
}

/// Display line for a radio's band and selected antenna, e.g.
/// `" 80M - ANTENNA 1"`. A radio with no selection shows dashes.
#[must_use]
pub fn radio_antenna_line(radio: &Radio, antennas: &[Antenna]) -> String<20> {
    let mut line: String<20> = String::new();
    let name = radio
        .antenna
        .map(|i| antennas[i as usize].name())
        .unwrap_or("-----------");
    let _ = write!(line, " {} - {}", radio.band.label(), name);
    line
}

/// One row of the terminal status matrix, e.g.
/// `"1) DIPOLE 160  2   -   -   -   -   -   "`: port number, name padded
/// to the name field width, then one column per band with `-` for an
/// unsuitable band and the digit weight otherwise.
#[must_use]
pub fn antenna_matrix_row(index: usize, antenna: &Antenna) -> String<40> {
    let mut row: String<40> = String::new();
    let _ = write!(row, "{}) {}", index + 1, antenna.name());
    while row.len() < 3 + crate::types::NAME_LEN {
        let _ = row.push(' ');
    }
    let _ = row.push(' ');
    for position in 0..MASK_LEN {
        let weight = antenna.mask.weight(position);
        let _ = row.push(if weight == 0 {
            '-'
        } else {
            (b'0' + weight) as char
        });
        let _ = row.push_str("   ");
    }
    row
}

/// Header row matching [`antenna_matrix_row`]'s columns.
#[must_use]
pub const fn antenna_matrix_header() -> &'static str {
    "ANTENNA NAME   160 80  40  20  15  10 "
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::BandMask;
    use crate::types::{RadioState, RadioBand};

    #[test]
    fn test_radio_state_line() {
        let mut radio = Radio::new();
        radio.state = RadioState::Inhibit;
        assert_eq!(radio_state_line(RadioId::A, &radio), "Radio A : TX INHIBIT");
        radio.state = RadioState::Rx;
        assert_eq!(radio_state_line(RadioId::B, &radio), "Radio B : RX");
    }

    #[test]
    fn test_radio_antenna_line() {
        let antennas = [Antenna::new("DIPOLE 160", BandMask::parse("200000").unwrap())];
        let mut radio = Radio::new();
        radio.band = RadioBand::B160;
        radio.antenna = Some(0);
        assert_eq!(radio_antenna_line(&radio, &antennas), " 160M - DIPOLE 160");

        radio.antenna = None;
        radio.band = RadioBand::B30;
        assert_eq!(radio_antenna_line(&radio, &antennas), " 30M - -----------");
    }

    #[test]
    fn test_antenna_matrix_row() {
        let antenna = Antenna::new("TRIBAND", BandMask::parse("000221").unwrap());
        assert_eq!(
            antenna_matrix_row(0, &antenna),
            "1) TRIBAND     -   -   -   2   2   1   "
        );
    }

    #[test]
    fn test_matrix_row_aligns_with_header() {
        let antenna = Antenna::new("A", BandMask::CLEAR);
        let row = antenna_matrix_row(3, &antenna);
        // The band columns start where the header says they do.
        assert_eq!(antenna_matrix_header().find("160"), Some(15));
        assert_eq!(row.find('-'), Some(15));
    }
}
