//! Radios, antennas, and the closed enumerations they carry.

use heapless::String;

use crate::mask::BandMask;

/// Longest antenna name the operator can store.
pub const NAME_LEN: usize = 11;

/// Amateur HF bands the decoders can report, plus `Unknown` for patterns
/// outside the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioBand {
    B160,
    B80,
    B40,
    B30,
    B20,
    B17,
    B15,
    B12,
    B10,
    B6,
    Unknown,
}

impl RadioBand {
    /// Display label; `"---"` when the band is unknown.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            RadioBand::B160 => "160M",
            RadioBand::B80 => "80M",
            RadioBand::B40 => "40M",
            RadioBand::B30 => "30M",
            RadioBand::B20 => "20M",
            RadioBand::B17 => "17M",
            RadioBand::B15 => "15M",
            RadioBand::B12 => "12M",
            RadioBand::B10 => "10M",
            RadioBand::B6 => "6M",
            RadioBand::Unknown => "---",
        }
    }

    /// Position of this band in a suitability mask. Only the six contest
    /// bands have mask positions; WARC bands and 6 m always count as
    /// unsuitable.
    #[must_use]
    pub const fn mask_position(self) -> Option<usize> {
        match self {
            RadioBand::B160 => Some(0),
            RadioBand::B80 => Some(1),
            RadioBand::B40 => Some(2),
            RadioBand::B20 => Some(3),
            RadioBand::B15 => Some(4),
            RadioBand::B10 => Some(5),
            _ => None,
        }
    }
}

/// Operating state of one radio. `Inhibit` is the safety-critical terminal
/// state: no antenna on the system suits the radio's current band, so its
/// transmitter must be blocked from keying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioState {
    Rx,
    Tx,
    Inhibit,
}

impl RadioState {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            RadioState::Rx => "RX",
            RadioState::Tx => "TX",
            RadioState::Inhibit => "TX INHIBIT",
        }
    }
}

/// How a radio reports its tuned band to the switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BandDecoder {
    YaesuBcd,
    IcomVoltage,
    Civ,
    Kenwood,
}

impl BandDecoder {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            BandDecoder::YaesuBcd => "Yaesu (BCD)",
            BandDecoder::IcomVoltage => "Icom (Voltage)",
            BandDecoder::Civ => "Icom (CI-V)",
            BandDecoder::Kenwood => "Kenwood (CAT)",
        }
    }

    /// Persisted code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            BandDecoder::YaesuBcd => 0,
            BandDecoder::IcomVoltage => 1,
            BandDecoder::Civ => 2,
            BandDecoder::Kenwood => 3,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(BandDecoder::YaesuBcd),
            1 => Some(BandDecoder::IcomVoltage),
            2 => Some(BandDecoder::Civ),
            3 => Some(BandDecoder::Kenwood),
            _ => None,
        }
    }
}

/// How the band-pass filter bank ahead of a radio is driven.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BpfType {
    None,
    YaesuBcd,
    SeparateBands,
}

impl BpfType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            BpfType::None => "None",
            BpfType::YaesuBcd => "Yaesu (BCD)",
            BpfType::SeparateBands => "Separate Bands",
        }
    }

    /// Persisted code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            BpfType::None => 0,
            BpfType::YaesuBcd => 1,
            BpfType::SeparateBands => 2,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(BpfType::None),
            1 => Some(BpfType::YaesuBcd),
            2 => Some(BpfType::SeparateBands),
            _ => None,
        }
    }
}

/// The two radio positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioId {
    A,
    B,
}

impl RadioId {
    pub const ALL: [RadioId; 2] = [RadioId::A, RadioId::B];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            RadioId::A => 0,
            RadioId::B => 1,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            RadioId::A => "A",
            RadioId::B => "B",
        }
    }
}

/// One antenna port: operator-assigned name plus its band suitability.
/// The six antennas exist for the life of the system; they are renamed and
/// re-masked, never destroyed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Antenna {
    name: String<NAME_LEN>,
    pub mask: BandMask,
}

impl Antenna {
    /// Create an antenna, truncating the name at [`NAME_LEN`] characters.
    #[must_use]
    pub fn new(name: &str, mask: BandMask) -> Self {
        let mut antenna = Self {
            name: String::new(),
            mask,
        };
        antenna.set_name(name);
        antenna
    }

    /// Factory-default antenna for port `index`: "ANTENNA n", no bands.
    #[must_use]
    pub fn numbered(index: usize) -> Self {
        let mut name: String<NAME_LEN> = String::new();
        let _ = name.push_str("ANTENNA ");
        let _ = name.push((b'1' + index as u8) as char);
        Self {
            name,
            mask: BandMask::CLEAR,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename, truncating at [`NAME_LEN`] characters.
    pub fn set_name(&mut self, name: &str) {
        self.name.clear();
        for c in name.chars().take(NAME_LEN) {
            let _ = self.name.push(c);
        }
    }
}

/// One radio position and everything the switch knows about it.
///
/// `band` and `state` are refreshed every control-loop tick; `decoder` and
/// `bpf` are operator configuration; `antenna` is the port the arbiter
/// last selected, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Radio {
    pub band: RadioBand,
    pub decoder: BandDecoder,
    pub bpf: BpfType,
    pub state: RadioState,
    pub antenna: Option<u8>,
}

impl Radio {
    /// Factory defaults: 20 m, Yaesu BCD decoding, receiving, no filter
    /// bank.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            band: RadioBand::B20,
            decoder: BandDecoder::YaesuBcd,
            bpf: BpfType::None,
            state: RadioState::Rx,
            antenna: None,
        }
    }
}

impl Default for Radio {
    fn default() -> Self {
        Self::new()
    }
}
