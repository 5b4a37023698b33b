use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::prelude::*;
use esp_idf_hal::uart::{config::Config as UartDriverConfig, UartDriver};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};
use povglobe_render_lib::{graticule, Renderer};
use std::sync::mpsc;
use std::time::Duration;

mod config;
mod leds;
mod render_task;
mod serial;
mod thread_util;
mod watchdog;

use config::Config;
use leds::StripDriver;

fn main() -> Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("Starting povglobe firmware {}...", env!("GIT_VERSION"));

    let peripherals = Peripherals::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    config::init_nvs(nvs)?;
    let config = Config::load_or_default();

    // Set for all targets (use "*" for global)
    if let Err(e) = esp_idf_svc::log::set_target_level("*", config.log_level.as_level_filter()) {
        warn!("Failed to set log level: {e}");
    } else {
        info!("Log level set to {:?}", config.log_level);
    }

    let geometry = config.geometry;
    info!(
        "Geometry: {}x{} sectors of {}x{} ({} LEDs), {:?} wiring",
        geometry.x_sectors,
        geometry.y_sectors,
        geometry.sector_width,
        geometry.sector_height,
        geometry.led_count(),
        config.render.wiring
    );

    info!("Initializing LED strips on GPIO {}...", config.led_gpio);
    // SAFETY: We trust the user-configured GPIO pin number is valid for this board
    let led_pin = unsafe { AnyIOPin::new(i32::from(config.led_gpio)) };
    let strips = StripDriver::new(
        led_pin,
        peripherals.rmt.channel0,
        geometry.led_count(),
        config.brightness,
    )?;

    let bitmap = graticule(geometry, config.grid_spacing);
    let renderer = Renderer::new(bitmap, strips, config.render.clone())?;

    info!(
        "Opening command UART (TX GPIO {}, RX GPIO {}, {} baud)",
        config.uart.tx_gpio, config.uart.rx_gpio, config.uart.baud_rate
    );
    // SAFETY: As above, the UART pins come from the user config
    let (tx_pin, rx_pin) = unsafe {
        (
            AnyIOPin::new(i32::from(config.uart.tx_gpio)),
            AnyIOPin::new(i32::from(config.uart.rx_gpio)),
        )
    };
    let uart = UartDriver::new(
        peripherals.uart1,
        tx_pin,
        rx_pin,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartDriverConfig::new().baudrate(Hertz(config.uart.baud_rate)),
    )?;

    let (command_tx, command_rx) = mpsc::channel();
    serial::start_serial_task(uart, command_tx)?;
    render_task::start_render_task(
        renderer,
        command_rx,
        Duration::from_micros(u64::from(config.column_period_us)),
    )?;

    info!("All systems running!");

    // Main loop - keep alive
    loop {
        FreeRtos::delay_ms(1000);
    }
}
