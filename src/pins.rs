//! GPIO / peripheral pin assignments for the rover main board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Left drive motor, channel A (DRV8871 H-bridge)
// ---------------------------------------------------------------------------

/// LEDC PWM output for motor A speed.
pub const MOTOR_A_PWM_GPIO: i32 = 25;
/// Digital output: HIGH = positive throttle, LOW = negative.
pub const MOTOR_A_DIR_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// Right drive motor, channel B (DRV8871 H-bridge)
// ---------------------------------------------------------------------------

/// LEDC PWM output for motor B speed.
pub const MOTOR_B_PWM_GPIO: i32 = 32;
/// Digital output: HIGH = positive throttle, LOW = negative.
pub const MOTOR_B_DIR_GPIO: i32 = 33;

// ---------------------------------------------------------------------------
// NeoPixel strip (WS2812B, driven through SPI MOSI)
// ---------------------------------------------------------------------------

/// SPI2 MOSI, carries the WS2812 bit patterns.
pub const NEOPIXEL_DATA_GPIO: i32 = 5;
/// SPI2 SCLK.  Not wired to the strip; the bus needs a clock pin.
pub const NEOPIXEL_SCLK_GPIO: i32 = 18;
/// SPI clock: 4 SPI bits per WS2812 bit gives 800 kbit/s on the wire.
pub const NEOPIXEL_SPI_HZ: u32 = 3_200_000;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;
/// LEDC base frequency for the drive motors (20 kHz, inaudible).
pub const MOTOR_PWM_FREQ_HZ: u32 = 20_000;
