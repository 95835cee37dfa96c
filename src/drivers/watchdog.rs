//! Task watchdog for the main loop.
//!
//! Subscribes the calling task to the ESP-IDF TWDT.  The loop feeds it once
//! per iteration; a stalled loop (e.g. a wedged SPI transfer) resets the
//! chip with the motors de-energised by the reset.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Default timeout.  Far above the poll interval, short enough that a
/// runaway rover stops within a few seconds.
pub const DEFAULT_TIMEOUT_MS: u32 = 5_000;

pub struct Watchdog {
    timeout_ms: u32,
    subscribed: bool,
    feeds: u64,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

impl Watchdog {
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        // SAFETY: TWDT configuration calls from the main task at boot.
        let subscribed = unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK as i32 {
                log::warn!("watchdog: reconfigure returned {} (already configured?)", ret);
            }
            esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK as i32
        };

        if subscribed {
            log::info!("watchdog: main task subscribed ({} ms)", timeout_ms);
        } else {
            log::warn!("watchdog: subscribe failed, running unguarded");
        }

        Self { timeout_ms, subscribed, feeds: 0 }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        log::info!("watchdog(sim): {} ms, no-op", timeout_ms);
        Self { timeout_ms, subscribed: false, feeds: 0 }
    }

    /// Reset the countdown.  Call once per loop iteration.
    pub fn feed(&mut self) {
        self.feeds = self.feeds.wrapping_add(1);
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: the calling task was subscribed in `new`.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn feeds(&self) -> u64 {
        self.feeds
    }
}
