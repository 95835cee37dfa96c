//! DC drive motor driver (DRV8871 H-bridge).
//!
//! Signed throttle in `[-1.0, 1.0]`: magnitude becomes LEDC duty, sign
//! becomes the direction pin.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM and GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;

/// Hardware resources behind one motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorChannel {
    pub ledc_channel: u32,
    pub dir_gpio: i32,
}

impl MotorChannel {
    pub const A: Self = Self {
        ledc_channel: hw_init::LEDC_CH_MOTOR_A,
        dir_gpio: pins::MOTOR_A_DIR_GPIO,
    };

    pub const B: Self = Self {
        ledc_channel: hw_init::LEDC_CH_MOTOR_B,
        dir_gpio: pins::MOTOR_B_DIR_GPIO,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

pub struct MotorDriver {
    channel: MotorChannel,
    throttle: f32,
    hw_duty: u8,
}

impl MotorDriver {
    pub fn new(channel: MotorChannel) -> Self {
        Self {
            channel,
            throttle: 0.0,
            hw_duty: 0,
        }
    }

    /// Set a signed throttle.  Out-of-range values are clamped; NaN stops.
    pub fn set_throttle(&mut self, throttle: f32) {
        let throttle = if throttle.is_nan() { 0.0 } else { throttle.clamp(-1.0, 1.0) };
        if throttle == 0.0 {
            self.stop();
            return;
        }

        let dir = if throttle > 0.0 { Direction::Forward } else { Direction::Reverse };
        let duty = (throttle.abs() * 255.0).round() as u8;

        self.set_direction_hw(dir);
        self.set_duty_hw(duty);

        self.throttle = throttle;
        self.hw_duty = duty;
    }

    pub fn stop(&mut self) {
        self.set_duty_hw(0);
        self.set_direction_hw(Direction::Forward);
        self.throttle = 0.0;
        self.hw_duty = 0;
    }

    fn set_direction_hw(&self, dir: Direction) {
        hw_init::gpio_write(self.channel.dir_gpio, matches!(dir, Direction::Forward));
    }

    fn set_duty_hw(&self, duty: u8) {
        hw_init::ledc_set(self.channel.ledc_channel, duty);
    }

    pub fn throttle(&self) -> f32 {
        self.throttle
    }

    pub fn direction(&self) -> Direction {
        if self.throttle < 0.0 { Direction::Reverse } else { Direction::Forward }
    }

    pub fn is_running(&self) -> bool {
        self.hw_duty > 0
    }

    pub fn current_duty(&self) -> u8 {
        self.hw_duty
    }
}
