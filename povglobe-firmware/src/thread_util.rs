//! Spawning threads with FreeRTOS task names
//!
//! ESP-IDF creates the FreeRTOS task when the pthread is created, so the name
//! (and optional core pinning) has to be set through
//! `ThreadSpawnConfiguration` before spawning.

use anyhow::Result;
use esp_idf_hal::cpu::Core;
use esp_idf_hal::task::thread::ThreadSpawnConfiguration;
use std::ffi::CStr;
use std::thread::JoinHandle;

/// Spawn a thread with a FreeRTOS task name, optionally pinned to `core`.
///
/// Names are limited to 16 bytes including the NUL terminator. The render
/// loop goes on Core 1, away from the system tasks on Core 0.
pub fn spawn_named<F, T>(name: &'static CStr, core: Option<Core>, f: F) -> Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let prev_conf = ThreadSpawnConfiguration::get();

    ThreadSpawnConfiguration {
        name: Some(name.to_bytes_with_nul()),
        pin_to_core: core,
        ..Default::default()
    }
    .set()?;

    let handle = std::thread::spawn(f);

    // Restore the previous config (if any) so later spawns are unaffected
    if let Some(prev) = prev_conf {
        prev.set()?;
    }

    Ok(handle)
}
