//! Antenna arbitration and the transmit-inhibit decision.

use crate::types::{Antenna, Radio, RadioBand, RadioState};

/// Fixed number of antenna ports.
pub const ANTENNA_COUNT: usize = 6;

/// Fixed number of radio positions.
pub const RADIO_COUNT: usize = 2;

/// Count the antennas whose mask marks `band` usable, plain or priority.
///
/// Counting deliberately ignores which antenna is currently connected to
/// which radio: both radios may be offered the same antenna without
/// modeling contention.
#[must_use]
pub fn count_suitable(antennas: &[Antenna], band: RadioBand) -> usize {
    antennas.iter().filter(|a| a.mask.suitable(band)).count()
}

/// The safety rule: a radio with no suitable antenna must not transmit.
///
/// Pure and memoryless — it is recomputed every control cycle, so a count
/// that flaps between 0 and 1 flaps the inhibit output identically each
/// tick. Whether to key up (`Tx`) on a non-inhibited radio is the
/// caller's decision.
#[must_use]
pub const fn decide_state(suitable: usize) -> RadioState {
    if suitable == 0 {
        RadioState::Inhibit
    } else {
        RadioState::Rx
    }
}

/// Pick the antenna port to connect for `band`: a priority antenna if one
/// exists, otherwise the first plain suitable one. Ties go to the lowest
/// port index.
#[must_use]
pub fn select_antenna(antennas: &[Antenna], band: RadioBand) -> Option<u8> {
    let mut fallback = None;
    for (index, antenna) in antennas.iter().enumerate() {
        if antenna.mask.priority(band) {
            return Some(index as u8);
        }
        if fallback.is_none() && antenna.mask.suitable(band) {
            fallback = Some(index as u8);
        }
    }
    fallback
}

/// The switch's complete state: six antennas, two radios.
///
/// Owned by the control loop and passed by reference to anything that
/// needs it; configuration changes from the operator interface and reads
/// from the arbitration tick both go through this one object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Switchboard {
    antennas: [Antenna; ANTENNA_COUNT],
    radios: [Radio; RADIO_COUNT],
}

impl Switchboard {
    /// Factory state: numbered antennas with clear masks, radios at their
    /// defaults. Every radio inhibits until an antenna gets a mask.
    #[must_use]
    pub fn new() -> Self {
        Self {
            antennas: core::array::from_fn(Antenna::numbered),
            radios: [Radio::new(), Radio::new()],
        }
    }

    #[must_use]
    pub fn from_parts(antennas: [Antenna; ANTENNA_COUNT], radios: [Radio; RADIO_COUNT]) -> Self {
        Self { antennas, radios }
    }

    #[inline]
    #[must_use]
    pub fn antennas(&self) -> &[Antenna; ANTENNA_COUNT] {
        &self.antennas
    }

    #[inline]
    #[must_use]
    pub fn antenna(&self, index: usize) -> &Antenna {
        &self.antennas[index]
    }

    pub fn antenna_mut(&mut self, index: usize) -> &mut Antenna {
        &mut self.antennas[index]
    }

    #[inline]
    #[must_use]
    pub fn radio(&self, index: usize) -> &Radio {
        &self.radios[index]
    }

    pub fn radio_mut(&mut self, index: usize) -> &mut Radio {
        &mut self.radios[index]
    }

    /// One arbitration pass.
    ///
    /// `bands` holds each radio's freshly decoded band and `keyed` whether
    /// its PTT line is active. Each radio's state is recomputed from
    /// scratch: inhibit when nothing suits the band, otherwise `Tx` while
    /// keyed, else `Rx`. A keyed radio can never override an inhibit.
    pub fn tick(&mut self, bands: [RadioBand; RADIO_COUNT], keyed: [bool; RADIO_COUNT]) -> [RadioState; RADIO_COUNT] {
        let mut states = [RadioState::Rx; RADIO_COUNT];
        for (index, radio) in self.radios.iter_mut().enumerate() {
            radio.band = bands[index];
            let suitable = count_suitable(&self.antennas, radio.band);
            let mut state = decide_state(suitable);
            if state == RadioState::Rx && keyed[index] {
                state = RadioState::Tx;
            }
            radio.state = state;
            radio.antenna = select_antenna(&self.antennas, radio.band);
            states[index] = state;
        }
        states
    }
}

impl Default for Switchboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::BandMask;

    fn antenna(name: &str, mask: &str) -> Antenna {
        Antenna::new(name, BandMask::parse(mask).unwrap())
    }

    #[test]
    fn test_count_empty_set() {
        assert_eq!(count_suitable(&[], RadioBand::B20), 0);
    }

    #[test]
    fn test_count_plain_and_priority() {
        let antennas = [
            antenna("TRIBAND", "000221"),
            antenna("DIPOLE 160", "200000"),
            antenna("VERTICAL", "011111"),
            antenna("UNUSED", "000000"),
        ];
        assert_eq!(count_suitable(&antennas, RadioBand::B20), 2);
        assert_eq!(count_suitable(&antennas, RadioBand::B160), 1);
        assert_eq!(count_suitable(&antennas, RadioBand::B80), 1);
        assert_eq!(count_suitable(&antennas, RadioBand::B30), 0);
    }

    #[test]
    fn test_count_all_suitable() {
        let antennas: [Antenna; ANTENNA_COUNT] =
            core::array::from_fn(|_| antenna("ANY", "111111"));
        assert_eq!(count_suitable(&antennas, RadioBand::B40), ANTENNA_COUNT);
    }

    #[test]
    fn test_decide_state() {
        assert_eq!(decide_state(0), RadioState::Inhibit);
        assert_eq!(decide_state(1), RadioState::Rx);
        assert_eq!(decide_state(ANTENNA_COUNT), RadioState::Rx);
    }

    #[test]
    fn test_select_prefers_priority() {
        let antennas = [
            antenna("VERTICAL", "011111"),
            antenna("YAGI 10", "000002"),
        ];
        assert_eq!(select_antenna(&antennas, RadioBand::B10), Some(1));
        assert_eq!(select_antenna(&antennas, RadioBand::B40), Some(0));
        assert_eq!(select_antenna(&antennas, RadioBand::B160), None);
    }

    #[test]
    fn test_select_ties_go_to_lowest_index() {
        let antennas = [
            antenna("FIRST", "010000"),
            antenna("SECOND", "010000"),
        ];
        assert_eq!(select_antenna(&antennas, RadioBand::B80), Some(0));
    }

    #[test]
    fn test_tick_inhibits_without_antennas() {
        let mut board = Switchboard::new();
        let states = board.tick([RadioBand::B20, RadioBand::B40], [false, false]);
        assert_eq!(states, [RadioState::Inhibit, RadioState::Inhibit]);
        assert_eq!(board.radio(0).antenna, None);
    }

    #[test]
    fn test_tick_keyed_radio_transmits_unless_inhibited() {
        let mut board = Switchboard::new();
        *board.antenna_mut(0) = antenna("TRIBAND", "000221");

        // Radio A on a covered band and keyed; radio B keyed on a band
        // with no antenna. The inhibit must win over the key.
        let states = board.tick([RadioBand::B20, RadioBand::B160], [true, true]);
        assert_eq!(states, [RadioState::Tx, RadioState::Inhibit]);
    }

    #[test]
    fn test_tick_has_no_hysteresis() {
        let mut board = Switchboard::new();
        *board.antenna_mut(0) = antenna("TRIBAND", "000221");

        // A flapping band flaps the state identically every tick.
        for _ in 0..3 {
            let states = board.tick([RadioBand::B20, RadioBand::B20], [false, false]);
            assert_eq!(states[0], RadioState::Rx);
            let states = board.tick([RadioBand::B160, RadioBand::B20], [false, false]);
            assert_eq!(states[0], RadioState::Inhibit);
        }
    }

    #[test]
    fn test_tick_offers_same_antenna_to_both_radios() {
        let mut board = Switchboard::new();
        *board.antenna_mut(2) = antenna("TRIBAND", "000111");

        board.tick([RadioBand::B20, RadioBand::B20], [false, false]);
        // Contention between the radios is deliberately not modeled.
        assert_eq!(board.radio(0).antenna, Some(2));
        assert_eq!(board.radio(1).antenna, Some(2));
    }

    #[test]
    fn test_tick_unknown_band_inhibits() {
        let mut board = Switchboard::new();
        *board.antenna_mut(0) = antenna("EVERYTHING", "222222");
        let states = board.tick([RadioBand::Unknown, RadioBand::B30], [false, false]);
        // Unknown and WARC bands have no mask position, so nothing suits.
        assert_eq!(states, [RadioState::Inhibit, RadioState::Inhibit]);
    }
}
