use anyhow::{anyhow, Result};
use esp_idf_svc::nvs::{EspNvs, EspNvsPartition, NvsDefault};
use log::{debug, info, warn, LevelFilter};
use povglobe_render_lib::remap::MAX_LANES;
use povglobe_render_lib::{Geometry, RenderOptions, Wiring};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Configurable log level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    #[must_use]
    pub const fn as_level_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
        }
    }
}

const NVS_NAMESPACE: &str = "povglobe";
const NVS_CONFIG_KEY: &str = "config";

// Global NVS handle - initialized once in main
static NVS: Mutex<Option<EspNvs<NvsDefault>>> = Mutex::new(None);

pub fn init_nvs(nvs_partition: EspNvsPartition<NvsDefault>) -> Result<()> {
    debug!("Initializing NVS namespace: {NVS_NAMESPACE}");
    let nvs = EspNvs::new(nvs_partition, NVS_NAMESPACE, true)?;
    *NVS.lock().map_err(|_| anyhow!("NVS lock poisoned"))? = Some(nvs);
    info!("NVS initialized");
    Ok(())
}

/// Command link to the remote controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UartConfig {
    #[serde(default = "default_uart_tx_gpio")]
    pub tx_gpio: u8,
    #[serde(default = "default_uart_rx_gpio")]
    pub rx_gpio: u8,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

const fn default_uart_tx_gpio() -> u8 {
    17
}

const fn default_uart_rx_gpio() -> u8 {
    16
}

const fn default_baud_rate() -> u32 {
    115_200
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            tx_gpio: default_uart_tx_gpio(),
            rx_gpio: default_uart_rx_gpio(),
            baud_rate: default_baud_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_led_gpio")]
    pub led_gpio: u8,
    #[serde(default)]
    pub uart: UartConfig,
    /// LED brightness (0-255)
    #[serde(default = "default_brightness")]
    pub brightness: u8,
    #[serde(default)]
    pub geometry: Geometry,
    #[serde(default)]
    pub render: RenderOptions,
    /// Minimum time per column slice (µs); one revolution is
    /// `sector_width` slices
    #[serde(default = "default_column_period_us")]
    pub column_period_us: u32,
    /// Grid spacing of the built-in test pattern
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: usize,
}

const fn default_led_gpio() -> u8 {
    18
}

const fn default_brightness() -> u8 {
    255
}

/// Shortest column period; transmitting a chain takes longer than this anyway
pub const MIN_COLUMN_PERIOD_US: u32 = 100;

const fn default_column_period_us() -> u32 {
    4000
}

const fn default_grid_spacing() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            led_gpio: default_led_gpio(),
            uart: UartConfig::default(),
            brightness: default_brightness(),
            geometry: Geometry::default(),
            render: RenderOptions::default(),
            column_period_us: default_column_period_us(),
            grid_spacing: default_grid_spacing(),
        }
    }
}

impl Config {
    /// Clamp values to valid ranges and fix invalid values
    pub fn validate(&mut self) {
        if let Err(e) = self.geometry.validate() {
            warn!("Invalid geometry ({e}), resetting to default");
            self.geometry = Geometry::default();
        }
        if self.render.wiring == Wiring::Parallel && self.geometry.strip_count() > MAX_LANES {
            warn!(
                "{} strips do not fit parallel wiring, falling back to serial",
                self.geometry.strip_count()
            );
            self.render.wiring = Wiring::Serial;
        }
        if self.column_period_us < MIN_COLUMN_PERIOD_US {
            warn!(
                "Clamping column_period_us from {} to {MIN_COLUMN_PERIOD_US}",
                self.column_period_us
            );
            self.column_period_us = MIN_COLUMN_PERIOD_US;
        }
        if self.grid_spacing == 0 {
            warn!("Grid spacing is zero, resetting to default");
            self.grid_spacing = default_grid_spacing();
        }
        if self.uart.baud_rate == 0 {
            warn!("UART baud rate is zero, resetting to default");
            self.uart.baud_rate = default_baud_rate();
        }
    }

    /// Load the stored config, writing defaults on first boot
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(mut config) => {
                info!("Loaded config from NVS");
                config.validate();
                config
            }
            Err(e) => {
                warn!("Failed to load config from NVS: {e}, using defaults");
                let config = Self::default();
                if let Err(e) = config.save() {
                    warn!("Failed to store default config: {e}");
                }
                config
            }
        }
    }

    pub fn load() -> Result<Self> {
        debug!("Loading config from NVS");
        let nvs_guard = NVS.lock().map_err(|_| anyhow!("NVS lock poisoned"))?;
        let nvs = nvs_guard.as_ref().ok_or_else(|| anyhow!("NVS not initialized"))?;

        // Get the blob length first
        let len = nvs.blob_len(NVS_CONFIG_KEY)?;
        if let Some(len) = len {
            debug!("Config blob size: {len} bytes");
            let mut buf = vec![0u8; len];
            nvs.get_blob(NVS_CONFIG_KEY, &mut buf)?;
            let config: Config = serde_json::from_slice(&buf)?;
            debug!(
                "Config parsed: log_level={:?}, led_gpio={}, geometry={:?}, wiring={:?}",
                config.log_level, config.led_gpio, config.geometry, config.render.wiring
            );
            Ok(config)
        } else {
            Err(anyhow!("No config found in NVS"))
        }
    }

    pub fn save(&self) -> Result<()> {
        debug!("Saving config to NVS");
        let mut nvs_guard = NVS.lock().map_err(|_| anyhow!("NVS lock poisoned"))?;
        let nvs = nvs_guard.as_mut().ok_or_else(|| anyhow!("NVS not initialized"))?;

        let json = serde_json::to_vec(self)?;
        debug!("Config JSON size: {} bytes", json.len());
        nvs.set_blob(NVS_CONFIG_KEY, &json)?;
        info!("Config saved to NVS");
        Ok(())
    }
}
