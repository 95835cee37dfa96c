//! Differential drive controller.
//!
//! Channel A and channel B are mounted mirror-image, so "forward" drives
//! them with opposite signs.  Turns keep one wheel at full magnitude and
//! soften the other by [`TURN_DIVISOR`].

use log::info;

use crate::app::ports::DrivePort;
use crate::config::TURN_DIVISOR;

/// Throttle presets selectable from the numbered buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThrottleLevel {
    Full,
    Third,
    #[default]
    Half,
    Low,
}

impl ThrottleLevel {
    pub fn magnitude(self) -> f32 {
        match self {
            Self::Full => 1.0,
            Self::Third => 0.70,
            Self::Half => 0.5,
            Self::Low => 0.3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Full => "FULL_THROTTLE",
            Self::Third => "THIRD_THROTTLE",
            Self::Half => "HALF_THROTTLE",
            Self::Low => "LOW_THROTTLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveCommand {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Stop,
    SelectThrottle(ThrottleLevel),
}

/// Holds the selected throttle and the last values written to each channel.
pub struct DriveController {
    throttle: ThrottleLevel,
    channel_a: f32,
    channel_b: f32,
}

impl DriveController {
    pub fn new() -> Self {
        Self {
            throttle: ThrottleLevel::default(),
            channel_a: 0.0,
            channel_b: 0.0,
        }
    }

    pub fn apply(&mut self, command: DriveCommand, bank: &mut impl DrivePort) {
        match command {
            DriveCommand::MoveForward => self.forward(bank),
            DriveCommand::MoveBackward => self.backward(bank),
            DriveCommand::MoveLeft => self.turn_left(bank),
            DriveCommand::MoveRight => self.turn_right(bank),
            DriveCommand::Stop => self.stop(bank),
            DriveCommand::SelectThrottle(level) => self.set_throttle(level),
        }
    }

    pub fn forward(&mut self, bank: &mut impl DrivePort) {
        info!("move_forward");
        let m = self.magnitude();
        self.drive(bank, m, -m);
    }

    pub fn backward(&mut self, bank: &mut impl DrivePort) {
        info!("move_backward");
        let m = self.magnitude();
        self.drive(bank, -m, m);
    }

    pub fn turn_left(&mut self, bank: &mut impl DrivePort) {
        info!("move_left");
        let m = self.magnitude();
        self.drive(bank, m, -m / TURN_DIVISOR);
    }

    pub fn turn_right(&mut self, bank: &mut impl DrivePort) {
        info!("move_right");
        let m = self.magnitude();
        self.drive(bank, m / TURN_DIVISOR, -m);
    }

    /// Both channels to zero.  Idempotent.
    pub fn stop(&mut self, bank: &mut impl DrivePort) {
        self.drive(bank, 0.0, 0.0);
    }

    /// Store a new preset.  Motors keep their current speed until the next
    /// movement command.
    pub fn set_throttle(&mut self, level: ThrottleLevel) {
        info!("{}", level.name());
        self.throttle = level;
    }

    pub fn throttle(&self) -> ThrottleLevel {
        self.throttle
    }

    pub fn magnitude(&self) -> f32 {
        self.throttle.magnitude()
    }

    /// Last values written as `(channel_a, channel_b)`.
    pub fn channels(&self) -> (f32, f32) {
        (self.channel_a, self.channel_b)
    }

    fn drive(&mut self, bank: &mut impl DrivePort, a: f32, b: f32) {
        self.channel_a = a;
        self.channel_b = b;
        bank.set_channel_a(a);
        bank.set_channel_b(b);
    }
}

impl Default for DriveController {
    fn default() -> Self {
        Self::new()
    }
}
