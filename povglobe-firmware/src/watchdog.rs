//! Task watchdog users for the long-running render and serial threads

use anyhow::{bail, Result};
use esp_idf_svc::sys::{
    esp_task_wdt_add_user, esp_task_wdt_delete_user, esp_task_wdt_reset_user,
    esp_task_wdt_user_handle_t,
};
use log::{debug, error};
use std::ffi::CStr;

/// A registered watchdog user. Unregisters on drop.
pub struct WatchdogHandle {
    handle: esp_task_wdt_user_handle_t,
    name: &'static CStr,
}

impl WatchdogHandle {
    /// Register a watchdog user, e.g. `c"render"`.
    pub fn register(name: &'static CStr) -> Result<Self> {
        let mut handle: esp_task_wdt_user_handle_t = std::ptr::null_mut();

        // SAFETY: name is a static NUL-terminated string and handle outlives the call
        let result = unsafe { esp_task_wdt_add_user(name.as_ptr(), &mut handle) };
        if result != 0 {
            bail!("watchdog: failed to register user {name:?}: error code {result}");
        }

        debug!("Watchdog: registered user {name:?}");
        Ok(Self { handle, name })
    }

    /// Must be called within the watchdog timeout
    pub fn feed(&self) {
        // SAFETY: handle was returned by a successful esp_task_wdt_add_user
        let result = unsafe { esp_task_wdt_reset_user(self.handle) };
        if result != 0 {
            error!("Watchdog: failed to feed {:?}", self.name);
        }
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        debug!("Watchdog: unregistering user {:?}", self.name);
        // SAFETY: handle is still registered; it is never used after this
        let result = unsafe { esp_task_wdt_delete_user(self.handle) };
        if result != 0 {
            error!(
                "Watchdog: failed to unregister {:?}: error code {result}",
                self.name
            );
        }
    }
}
