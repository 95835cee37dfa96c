//! Device identity derived from the ESP32 factory MAC address.
//!
//! The BLE advertising name is `<prefix>-xxyyzz`: the configured prefix
//! plus the last 3 bytes of the 6-byte MAC in lowercase hex.  Stable across
//! reboots (factory-burned eFuse MAC) and distinct between rovers.

use core::fmt::Write;

/// BLE local name.
pub type DeviceName = heapless::String<24>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: writes exactly 6 bytes into `mac`.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Advertising name for this rover, e.g. `rover-efcafe`.
///
/// An over-long prefix is truncated so the suffix always fits.
pub fn device_name(prefix: &str, mac: &MacAddress) -> DeviceName {
    let mut name = DeviceName::new();
    let room = name.capacity() - "-xxyyzz".len();
    let cut = prefix
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= room)
        .last()
        .unwrap_or(0);
    let _ = name.push_str(&prefix[..cut]);
    let _ = write!(name, "-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    name
}
