//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard state handlers read from and write to:
//! the latest link snapshot, the link commands the service applies after
//! each tick, timing, and the session counter.

use crate::config::RoverConfig;

// ---------------------------------------------------------------------------
// Link snapshot (written by the service before each tick)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct LinkSnapshot {
    /// A central is attached.
    pub connected: bool,
}

// ---------------------------------------------------------------------------
// Link commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct LinkCommands {
    /// Desired advertising state.  Level-triggered.
    pub advertise: bool,
    /// One-shot: stop both motors.  Cleared by the consumer.
    pub halt_drive: bool,
    /// One-shot: blank the pixel strip.  Cleared by the consumer.
    pub blank_strip: bool,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    pub total_ticks: u64,

    // -- Link --
    pub link: LinkSnapshot,
    pub commands: LinkCommands,

    /// Connections accepted since boot.
    pub sessions: u32,

    pub config: RoverConfig,
}

impl FsmContext {
    pub fn new(config: RoverConfig) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            link: LinkSnapshot::default(),
            commands: LinkCommands::default(),
            sessions: 0,
            config,
        }
    }

    /// Take and clear the one-shot halt requests as `(drive, strip)`.
    pub fn take_halt_requests(&mut self) -> (bool, bool) {
        let drive = core::mem::take(&mut self.commands.halt_drive);
        let strip = core::mem::take(&mut self.commands.blank_strip);
        (drive, strip)
    }
}
