//! The render loop
//!
//! This task owns the renderer. Every iteration it:
//! - applies queued commands from the serial reader
//! - renders and transmits one column slice
//! - waits out the rest of the column period
//!
//! After `sector_width` slices (one revolution) the animation advances once.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Result;
use esp_idf_hal::cpu::Core;
use esp_idf_hal::delay::Ets;
use log::{error, info, warn};
use povglobe_protocol_lib::Command;
use povglobe_render_lib::Renderer;

use crate::leds::StripDriver;
use crate::thread_util::spawn_named;
use crate::watchdog::WatchdogHandle;

pub fn start_render_task(
    renderer: Renderer<StripDriver>,
    commands: Receiver<Command>,
    column_period: Duration,
) -> Result<JoinHandle<()>> {
    spawn_named(c"render", Some(Core::Core1), move || {
        render_task(renderer, commands, column_period);
    })
}

/// Apply every queued command. Returns `false` once the sender is gone.
fn drain_commands(renderer: &mut Renderer<StripDriver>, commands: &Receiver<Command>) -> bool {
    loop {
        match commands.try_recv() {
            Ok(command) => {
                if let Err(e) = renderer.apply(command) {
                    warn!("{command:?} failed: {e:#}");
                }
            }
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

/// Busy-wait until `deadline`, or resync if the slice overran it
fn wait_until(deadline: &mut Instant, column_period: Duration) {
    let now = Instant::now();
    match deadline.checked_duration_since(now) {
        Some(wait) => {
            // Waits are at most one column period, far below u32::MAX µs
            #[allow(clippy::cast_possible_truncation)]
            Ets::delay_us(wait.as_micros() as u32);
            *deadline += column_period;
        }
        None => *deadline = now + column_period,
    }
}

// Receiver is moved into this task for exclusive ownership
#[allow(clippy::needless_pass_by_value)]
fn render_task(
    mut renderer: Renderer<StripDriver>,
    commands: Receiver<Command>,
    column_period: Duration,
) {
    let watchdog = match WatchdogHandle::register(c"render") {
        Ok(watchdog) => watchdog,
        Err(e) => {
            error!("Render task not started: {e:#}");
            return;
        }
    };

    if let Err(e) = renderer.reset() {
        warn!("LED self-test failed: {e:#}");
    }
    watchdog.feed();

    let sector_width = renderer.geometry().sector_width;
    info!(
        "Render task started: {sector_width} slices per revolution, {}µs per slice",
        column_period.as_micros()
    );

    let mut listening = true;
    let mut deadline = Instant::now() + column_period;

    loop {
        watchdog.feed();

        for slice in 0..sector_width {
            if listening && !drain_commands(&mut renderer, &commands) {
                warn!("Command channel closed, rendering without commands");
                listening = false;
            }
            if let Err(e) = renderer.show(slice) {
                warn!("Column {slice} failed: {e:#}");
            }
            wait_until(&mut deadline, column_period);
        }

        renderer.advance_animation();
    }
}
