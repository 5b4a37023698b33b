//! UART command reader
//!
//! Bytes from the remote controller are decoded here and forwarded to the
//! render task, which applies them between column slices.

use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use anyhow::Result;
use esp_idf_hal::delay::TickType;
use esp_idf_hal::uart::UartDriver;
use log::{debug, error, info, warn};
use povglobe_protocol_lib::{Command, CommandDecoder};

use crate::thread_util::spawn_named;
use crate::watchdog::WatchdogHandle;

/// Read timeout, keeps the watchdog fed while the link is idle
const READ_TIMEOUT_MS: u64 = 100;

const READ_CHUNK: usize = 64;

pub fn start_serial_task(
    uart: UartDriver<'static>,
    commands: Sender<Command>,
) -> Result<JoinHandle<()>> {
    spawn_named(c"serial_rx", None, move || serial_task(&uart, &commands))
}

fn serial_task(uart: &UartDriver<'static>, commands: &Sender<Command>) {
    let watchdog = match WatchdogHandle::register(c"serial_rx") {
        Ok(watchdog) => watchdog,
        Err(e) => {
            error!("Serial reader not started: {e:#}");
            return;
        }
    };
    info!("Serial command reader started");

    let timeout = TickType::new_millis(READ_TIMEOUT_MS).ticks();
    let mut decoder = CommandDecoder::new();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        watchdog.feed();

        let len = match uart.read(&mut buf, timeout) {
            Ok(len) => len,
            Err(e) => {
                warn!("UART read failed: {e}");
                decoder.reset();
                continue;
            }
        };

        for &byte in &buf[..len] {
            match decoder.feed(byte) {
                Ok(Some(command)) => {
                    debug!("Received {command:?}");
                    if commands.send(command).is_err() {
                        warn!("Render task gone, stopping serial reader");
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("Dropping byte: {e}"),
            }
        }
    }
}
