//! MediBox Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        NetworkAdapter         LogEventSink    │
//! │  (LDR, DHT11, buttons,  (WiFi, HTTP, SNTP)     (EventSink)     │
//! │   LEDs, buzzer, OLED)                                          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  Box FSM · Reminders · Telemetry · Clock · Display     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{error, info};

use medibox::adapters::device_id;
use medibox::adapters::hardware::{AdcLight, HardwareAdapter};
use medibox::adapters::http::HttpAdapter;
use medibox::adapters::log_sink::LogEventSink;
use medibox::adapters::oled::OledDisplay;
use medibox::adapters::time::{SntpTimeSource, SystemClock};
use medibox::adapters::wifi::WifiAdapter;
use medibox::adapters::NetworkAdapter;
use medibox::app::ports::{DisplayPort, MonotonicClock};
use medibox::app::service::{Controller, FIRMWARE_VERSION};
use medibox::config::{BuildOverrides, DeviceConfig};
use medibox::display::notice;
use medibox::drivers::button::PinButtons;
use medibox::drivers::buzzer::PwmBuzzer;
use medibox::drivers::indicators::PinIndicators;
use medibox::pins;
use medibox::sensors::dht11::Dht11;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  MediBox v{}                         ║", FIRMWARE_VERSION);
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let mut config = DeviceConfig::default().with_overrides(&BuildOverrides::from_env());
    let mac = device_id::read_mac();
    config.box_id = device_id::resolve_box_id(&config.box_id, &mac);
    config.validate()?;
    info!("Box ID: {} (device {})", config.box_id, device_id::device_id(&mac));

    // ── 3. Local peripherals ──────────────────────────────────
    let p = Peripherals::take()?;

    // SAFETY: each GPIO number below is claimed exactly once, and none of
    // them is also taken through `p.pins`.
    let (dht_pin, confirm_pin, deny_pin, buzzer_pin, sda, scl, indicator_pins) = unsafe {
        (
            AnyIOPin::new(pins::DHT_GPIO),
            AnyIOPin::new(pins::BUTTON_CONFIRM_GPIO),
            AnyIOPin::new(pins::BUTTON_DENY_GPIO),
            AnyOutputPin::new(pins::BUZZER_GPIO),
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
            pins::INDICATOR_GPIOS.map(|n| AnyOutputPin::new(n)),
        )
    };

    let light = AdcLight::new(p.adc1, p.pins.gpio34)?;

    let mut dht_line = PinDriver::input_output_od(dht_pin)?;
    dht_line.set_pull(Pull::Up)?;
    let climate = Dht11::new(dht_line, Ets);

    let mut confirm = PinDriver::input(confirm_pin)?;
    confirm.set_pull(Pull::Up)?;
    let mut deny = PinDriver::input(deny_pin)?;
    deny.set_pull(Pull::Up)?;

    let mut leds = Vec::with_capacity(indicator_pins.len());
    for pin in indicator_pins {
        leds.push(PinDriver::output(pin)?);
    }

    let timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::new().frequency(Hertz(pins::BUZZER_FREQ_HZ)).resolution(Resolution::Bits10),
    )?;
    let buzzer = LedcDriver::new(p.ledc.channel0, timer, buzzer_pin)?;

    let i2c = I2cDriver::new(p.i2c0, sda, scl, &I2cConfig::new().baudrate(Hertz(400_000)))?;
    let display = OledDisplay::new(i2c)?;

    let mut hw = HardwareAdapter {
        clock: SystemClock::new(),
        light,
        climate,
        buttons: PinButtons::new(confirm, deny),
        indicators: PinIndicators::new(leds),
        buzzer: PwmBuzzer::new(buzzer),
        display,
    };

    // ── 4. Network ────────────────────────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let driver = EspWifi::new(p.modem, sysloop, Some(nvs))?;
    let mut net = NetworkAdapter {
        wifi: WifiAdapter::new(driver, &config.wifi_ssid, &config.wifi_password)
            .context("set MEDIBOX_WIFI_SSID / MEDIBOX_WIFI_PASSWORD at build time")?,
        http: HttpAdapter::default(),
        time: SntpTimeSource::new()?,
    };

    let mut sink = LogEventSink::new();

    // ── 5. Controller ─────────────────────────────────────────
    let mut controller = Controller::new(config, hw.now_ms());
    if let Err(e) = controller.boot(&mut hw, &mut net, &mut sink) {
        error!("Boot display failure: {}", e);
    }

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        if let Err(e) = controller.tick(&mut hw, &mut net, &mut sink) {
            error!("Tick failed: {}", e);
            let _ = hw.show(&notice::error(&e.to_string()));
        }
        hw.delay_ms(controller.yield_ms());
    }
}
