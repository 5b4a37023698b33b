//! WS2812 output for the renderer

use std::thread::sleep;
use std::time::Duration;

use anyhow::{Error, Result};
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripheral::Peripheral;
use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_hal::rmt::{RmtChannel, TxRmtDriver};
use log::{debug, info};
use povglobe_render_lib::{Frame, LedDriver};
use smart_leds::{brightness, gamma, SmartLedsWrite, RGB8};
use ws2812_esp32_rmt_driver::Ws2812Esp32Rmt;

/// Level used while walking each channel during the self-test
const SELF_TEST_LEVEL: u8 = 128;

/// How long every LED stays white at the end of the self-test
const SELF_TEST_WHITE: Duration = Duration::from_secs(1);

/// All strips chained on one RMT channel
pub struct StripDriver {
    driver: Ws2812Esp32Rmt<'static>,
    brightness: u8,
    led_count: usize,
}

impl StripDriver {
    pub fn new<C: RmtChannel, P: OutputPin>(
        pin: impl Peripheral<P = P> + 'static,
        channel: impl Peripheral<P = C> + 'static,
        led_count: usize,
        initial_brightness: u8,
    ) -> Result<Self> {
        debug!("Creating strip driver for {led_count} LEDs, brightness {initial_brightness}");
        // Extra memory blocks keep the RMT fed when other interrupts delay refills.
        // See: https://github.com/cat-in-136/ws2812-esp32-rmt-driver#the-led-is-sp32-flickers-sp32--sp32-s3--sp32-c6--sp32-h2
        let config = TransmitConfig::new().clock_divider(1).mem_block_num(4);
        let tx_driver = TxRmtDriver::new(channel, pin, &config)?;
        let driver = Ws2812Esp32Rmt::new_with_rmt_driver(tx_driver)?;

        Ok(Self {
            driver,
            brightness: initial_brightness,
            led_count,
        })
    }

    fn write_leds(&mut self, leds: impl Iterator<Item = RGB8>) -> Result<()> {
        // Gamma first, then brightness, as recommended by smart-leds
        self.driver.write(brightness(gamma(leds), self.brightness))?;
        Ok(())
    }

    /// Walk red, green and blue across every LED, hold all white, then go dark
    fn self_test(&mut self) -> Result<()> {
        info!("LED self-test on {} LEDs", self.led_count);
        let channels = [
            RGB8::new(SELF_TEST_LEVEL, 0, 0),
            RGB8::new(0, SELF_TEST_LEVEL, 0),
            RGB8::new(0, 0, SELF_TEST_LEVEL),
        ];
        for color in channels {
            for lit in 0..self.led_count {
                let leds = (0..self.led_count).map(|i| if i == lit { color } else { RGB8::default() });
                self.write_leds(leds)?;
            }
        }

        let white = RGB8::new(255, 255, 255);
        self.write_leds(std::iter::repeat(white).take(self.led_count))?;
        sleep(SELF_TEST_WHITE);

        self.write_leds(std::iter::repeat(RGB8::default()).take(self.led_count))
    }
}

impl LedDriver for StripDriver {
    type Error = Error;

    fn initialize(&mut self) -> Result<()> {
        self.self_test()
    }

    fn submit(&mut self, frame: Frame<'_>) -> Result<()> {
        self.write_leds(frame.pixels())
    }
}
