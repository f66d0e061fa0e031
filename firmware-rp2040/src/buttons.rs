//! Front-panel buttons on a resistive ladder.
//!
//! Five buttons share one ADC pin through a resistor divider; the sampled
//! level identifies the button. The sampling task debounces by polling at
//! a fixed interval and reports only edges, pushing presses into a bounded
//! channel that the control loop drains — so only one task ever touches
//! the display or the model.

use defmt::warn;
use embassy_rp::adc::{Adc, Async, Channel as AdcChannel};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Timer;

/// Poll interval; doubles as the debounce time.
const DEBOUNCE_MS: u64 = 50;

/// Ladder thresholds on the 12-bit ADC scale, lowest first.
const LADDER_COMMAND2: u16 = 100;
const LADDER_UP: u16 = 600;
const LADDER_DOWN: u16 = 1500;
const LADDER_COMMAND1: u16 = 2100;
const LADDER_COMMAND3: u16 = 3000;
/// Readings above this are the open ladder: no button.
const LADDER_OPEN: u16 = 4000;

/// A front-panel button press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Button {
    Up,
    Down,
    Command1,
    Command2,
    Command3,
}

/// Bounded press queue from the sampler to the control loop.
pub type ButtonEvents = Channel<CriticalSectionRawMutex, Button, 8>;

/// Classify one ADC reading against the ladder thresholds.
#[must_use]
pub fn decode_ladder(raw: u16) -> Option<Button> {
    if raw > LADDER_OPEN {
        return None;
    }
    if raw < LADDER_COMMAND2 {
        Some(Button::Command2)
    } else if raw < LADDER_UP {
        Some(Button::Up)
    } else if raw < LADDER_DOWN {
        Some(Button::Down)
    } else if raw < LADDER_COMMAND1 {
        Some(Button::Command1)
    } else if raw < LADDER_COMMAND3 {
        Some(Button::Command3)
    } else {
        None
    }
}

/// Sample the ladder and push press edges into `events`.
#[embassy_executor::task]
pub async fn button_task(
    mut adc: Adc<'static, Async>,
    mut pin: AdcChannel<'static>,
    events: &'static ButtonEvents,
) {
    let mut previous = None;
    loop {
        let current = match adc.read(&mut pin).await {
            Ok(raw) => decode_ladder(raw),
            Err(e) => {
                warn!("button ADC read failed: {}", e);
                None
            }
        };

        if current != previous {
            if let Some(button) = current {
                // A full queue means the control loop is behind; dropping
                // the press is better than blocking the sampler.
                let _ = events.try_send(button);
            }
            previous = current;
        }

        Timer::after_millis(DEBOUNCE_MS).await;
    }
}
