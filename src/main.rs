//! Rover Firmware: Main Entry Point
//!
//! Hexagonal architecture with a fixed-interval polling loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  BleLink          HardwareAdapter          LogEventSink        │
//! │  (LinkPort)       (Drive + PixelStrip)     (EventSink)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              RoverService (pure logic)                 │    │
//! │  │  FSM · Command dispatch · Drive · Animation            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::config::{Config as SpiConfig, DriverConfig};
use esp_idf_hal::spi::{SpiBusDriver, SpiDriver};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use rover::adapters::ble::BleLink;
use rover::adapters::device_id;
use rover::adapters::hardware::HardwareAdapter;
use rover::adapters::log_sink::LogEventSink;
use rover::app::service::RoverService;
use rover::config::RoverConfig;
use rover::drivers::hw_init;
use rover::drivers::watchdog::Watchdog;
use rover::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Rover v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = RoverConfig::default();
    info!("Config: {}", serde_json::to_string(&config)?);

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Motors stay dark; the link and the strip still work.
        warn!("HAL init failed: {}, continuing without drive", e);
    }

    let peripherals = Peripherals::take()?;
    let spi = SpiDriver::new(
        peripherals.spi2,
        peripherals.pins.gpio18,
        peripherals.pins.gpio5,
        Option::<AnyIOPin>::None,
        &DriverConfig::new(),
    )?;
    let spi = SpiBusDriver::new(spi, &SpiConfig::new().baudrate(Hertz(pins::NEOPIXEL_SPI_HZ)))?;
    let mut hw = HardwareAdapter::new(spi);

    // ── 3. Link + sinks ───────────────────────────────────────
    let name = device_id::device_name(&config.device_name_prefix, &device_id::read_mac());
    info!("Device name: {}", name);
    let mut link = BleLink::new(name);
    let mut sink = LogEventSink::new();
    let mut watchdog = Watchdog::default();

    // ── 4. Session core ───────────────────────────────────────
    let poll_interval = Duration::from_millis(u64::from(config.poll_interval_ms));
    let mut service = RoverService::new(config);
    service.start(&mut link, &mut sink);

    info!("System ready. Entering main loop.");

    loop {
        service.poll(&mut link, &mut hw, &mut sink);
        watchdog.feed();
        std::thread::sleep(poll_interval);
    }
}
