#![no_std]
#![no_main]

use defmt::{error, info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{Blocking, Config as I2cConfig, I2c};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;

use antenna_switch_rp2040::band_input::BandInputs;
use antenna_switch_rp2040::buttons::{button_task, Button, ButtonEvents};
use antenna_switch_rp2040::{
    CONTROL_PERIOD_MS, DISPLAY_COLS, DISPLAY_ROWS, EEPROM_SELECT, LCD_ADDRESS,
};
use eeprom_24cxx::{ChipSize, Eeprom};
use lcd_hd44780::{Lcd, PcfExpanderBus, TextAlign};
use shared_i2c::{I2cPort, SharedI2c};
use switch_core::{decode_bcd, status, RadioId, RadioState, Settings, Switchboard};

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    ADC_IRQ_FIFO => embassy_rp::adc::InterruptHandler;
});

type Bus = I2c<'static, Blocking>;
type BusPort = I2cPort<'static, CriticalSectionRawMutex, Bus>;
type Display = Lcd<PcfExpanderBus<BusPort>, Delay>;

/// The one physical I2C peripheral, shared by the EEPROM and the display.
static SHARED_BUS: StaticCell<SharedI2c<CriticalSectionRawMutex, Bus>> = StaticCell::new();

/// Button presses from the ladder sampler to the control loop.
static BUTTON_EVENTS: ButtonEvents = ButtonEvents::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("2x6 antenna switch starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- Shared I2C bus ---
    // Both devices currently run at the default 100 kHz, but each port
    // carries its own configuration so they could diverge.
    let bus = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, I2cConfig::default());
    let shared = SHARED_BUS.init(SharedI2c::new(bus));

    // --- Display ---
    let expander = PcfExpanderBus::new(shared.port(I2cConfig::default()), LCD_ADDRESS);
    let mut display =
        Lcd::new(expander, Delay, DISPLAY_COLS, DISPLAY_ROWS).expect("display init failed");
    let _ = display.backlight(true);

    // --- Persisted configuration ---
    let eeprom = Eeprom::new(
        shared.port(I2cConfig::default()),
        Delay,
        ChipSize::Lc256,
        EEPROM_SELECT,
    );
    let mut settings = Settings::new(eeprom);
    let board = match settings.ensure_provisioned() {
        Ok(true) => match settings.load_switchboard() {
            Ok(board) => board,
            Err(e) => {
                error!("loading configuration failed: {}, using defaults", e);
                Switchboard::new()
            }
        },
        Ok(false) => {
            warn!("blank EEPROM, factory defaults written");
            Switchboard::new()
        }
        Err(e) => {
            error!("EEPROM unreachable: {}, running unconfigured", e);
            Switchboard::new()
        }
    };

    splash(&mut display, &board);

    // --- Band, PTT, and inhibit I/O ---
    let bands_a = BandInputs::new([
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_7, Pull::Up),
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
    ]);
    let bands_b = BandInputs::new([
        Input::new(p.PIN_10, Pull::Up),
        Input::new(p.PIN_11, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
        Input::new(p.PIN_13, Pull::Up),
    ]);
    let ptt = [
        Input::new(p.PIN_14, Pull::Up),
        Input::new(p.PIN_15, Pull::Up),
    ];
    // Both radios stay inhibited until the first arbitration pass clears
    // them.
    let inhibit = [
        Output::new(p.PIN_16, Level::High),
        Output::new(p.PIN_17, Level::High),
    ];

    // --- Buttons ---
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let ladder = AdcChannel::new_pin(p.PIN_26, Pull::None);

    spawner
        .spawn(control_task(
            board, display, bands_a, bands_b, ptt, inhibit, &BUTTON_EVENTS,
        ))
        .unwrap();
    spawner
        .spawn(button_task(adc, ladder, &BUTTON_EVENTS))
        .unwrap();

    info!("2x6 antenna switch running");
}

/// Boot banner, held long enough to read.
fn splash(display: &mut Display, board: &Switchboard) {
    let _ = display.write_line(0, "2 x 6", TextAlign::Centre);
    let _ = display.write_line(1, "ANTENNA SWITCH", TextAlign::Centre);
    let _ = display.write_line(2, board.radio(0).decoder.label(), TextAlign::Centre);
    let _ = display.write_line(3, board.radio(1).decoder.label(), TextAlign::Centre);
}

/// The control loop: decode bands, arbitrate, drive the inhibit outputs,
/// refresh the display. The only task that touches the model or the
/// display.
#[embassy_executor::task]
async fn control_task(
    mut board: Switchboard,
    mut display: Display,
    bands_a: BandInputs,
    bands_b: BandInputs,
    ptt: [Input<'static>; 2],
    mut inhibit: [Output<'static>; 2],
    events: &'static ButtonEvents,
) {
    // Leave the splash up before the first status refresh.
    Timer::after_secs(2).await;
    let _ = display.clear();

    let mut backlight_on = true;
    let mut shown: Option<[(RadioState, switch_core::RadioBand, Option<u8>); 2]> = None;

    loop {
        while let Ok(button) = events.try_receive() {
            if button == Button::Command1 {
                backlight_on = !backlight_on;
                let _ = display.backlight(backlight_on);
            }
        }

        let bands = [
            decode_bcd(bands_a.read_nibble()),
            decode_bcd(bands_b.read_nibble()),
        ];
        let keyed = [ptt[0].is_low(), ptt[1].is_low()];
        let states = board.tick(bands, keyed);

        // The inhibit outputs refresh every pass whether or not anything
        // changed; a stuck output must not survive a tick.
        for (output, state) in inhibit.iter_mut().zip(states) {
            output.set_level(if state == RadioState::Inhibit {
                Level::High
            } else {
                Level::Low
            });
        }

        let current = [
            (states[0], bands[0], board.radio(0).antenna),
            (states[1], bands[1], board.radio(1).antenna),
        ];
        if shown != Some(current) {
            if let Err(e) = refresh_status(&mut display, &board) {
                error!("display refresh failed: {}", e);
            }
            for (id, (state, band, _)) in RadioId::ALL.iter().zip(current) {
                info!("radio {}: {} on {}", id.label(), state, band);
            }
            shown = Some(current);
        }

        Timer::after_millis(CONTROL_PERIOD_MS).await;
    }
}

/// Two display rows per radio: state line, then band and selected antenna.
fn refresh_status(
    display: &mut Display,
    board: &Switchboard,
) -> Result<(), <PcfExpanderBus<BusPort> as lcd_hd44780::DataBus>::Error> {
    for id in RadioId::ALL {
        let radio = board.radio(id.index());
        let row = (id.index() * 2) as u8;
        display.write_line(row, &status::radio_state_line(id, radio), TextAlign::Left)?;
        display.write_line(
            row + 1,
            &status::radio_antenna_line(radio, board.antennas().as_slice()),
            TextAlign::Left,
        )?;
    }
    Ok(())
}
