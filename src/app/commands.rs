//! Command → action mapping.
//!
//! A decoded [`Command`] fans out into a short, ordered list of domain
//! actions.  Keeping the mapping pure means every button's effect can be
//! asserted without a link or a strip.
//!
//! | Input              | Actions                                              |
//! |--------------------|------------------------------------------------------|
//! | Up pressed         | `MoveForward`, `AdjustSpeed(+1)`, `EnableCycling`    |
//! | Down pressed       | `MoveBackward`, `AdjustSpeed(-1)`, `EnableCycling`   |
//! | Left/Right pressed | `MoveLeft`/`MoveRight`, `EnableCycling`              |
//! | ButtonN pressed    | `SelectThrottle`, `SelectPalette`, `EnableCycling`   |
//! | any released       | `Stop`, `EnableCycling`                              |
//! | Color              | `SolidColor`                                         |

use heapless::Vec;

use crate::color::Rgb8;
use crate::control::drive::{DriveCommand, ThrottleLevel};
use crate::palette::PaletteId;
use crate::protocol::{Button, Command};

/// One domain-level effect of a command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Drive(DriveCommand),
    /// Add to the animation offset increment.
    AdjustSpeed(i32),
    SelectPalette(PaletteId),
    EnableCycling,
    SolidColor(Rgb8),
}

/// At most three actions per command.
pub type ActionList = Vec<Action, 3>;

/// Throttle preset and palette bound to a numbered button.
pub fn preset_for(button: Button) -> Option<(ThrottleLevel, PaletteId)> {
    match button {
        Button::Button1 => Some((ThrottleLevel::Full, PaletteId::Rainbow)),
        Button::Button2 => Some((ThrottleLevel::Third, PaletteId::Gradient)),
        Button::Button3 => Some((ThrottleLevel::Half, PaletteId::Fire)),
        Button::Button4 => Some((ThrottleLevel::Low, PaletteId::Water)),
        _ => None,
    }
}

/// Expand a command into its ordered actions.
///
/// Drive effects come first so the motors react before any animation
/// state changes, matching the order operators see on the bench.
pub fn plan(command: &Command) -> ActionList {
    let mut actions = ActionList::new();
    let mut add = |a: Action| {
        // Capacity covers the longest row of the table above.
        let _ = actions.push(a);
    };

    match *command {
        Command::Color(rgb) => add(Action::SolidColor(rgb)),

        Command::Button { pressed: false, .. } => {
            add(Action::Drive(DriveCommand::Stop));
            add(Action::EnableCycling);
        }

        Command::Button { button, pressed: true } => {
            match button {
                Button::Up => {
                    add(Action::Drive(DriveCommand::MoveForward));
                    add(Action::AdjustSpeed(1));
                }
                Button::Down => {
                    add(Action::Drive(DriveCommand::MoveBackward));
                    add(Action::AdjustSpeed(-1));
                }
                Button::Left => add(Action::Drive(DriveCommand::MoveLeft)),
                Button::Right => add(Action::Drive(DriveCommand::MoveRight)),
                Button::Button1 | Button::Button2 | Button::Button3 | Button::Button4 => {
                    if let Some((level, palette)) = preset_for(button) {
                        add(Action::Drive(DriveCommand::SelectThrottle(level)));
                        add(Action::SelectPalette(palette));
                    }
                }
            }
            add(Action::EnableCycling);
        }
    }

    actions
}
