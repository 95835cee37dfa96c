//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements      | Connects to                 |
//! |-------------|-----------------|-----------------------------|
//! | `ble`       | LinkPort        | Bluedroid NUS GATT server   |
//! | `hardware`  | DrivePort       | ESP32 LEDC PWM, GPIO        |
//! |             | PixelStripPort  | WS2812 strip over SPI       |
//! | `log_sink`  | EventSink       | Serial log output           |
//! | `device_id` |                 | eFuse MAC → advertising name|

pub mod ble;
pub mod device_id;
pub mod hardware;
pub mod log_sink;
