//! Rover service: the hexagonal core.
//!
//! [`RoverService`] owns the session FSM, the drive controller and the
//! animation engine.  All I/O flows through port traits injected at call
//! sites, making the whole session testable with mock adapters.
//!
//! ```text
//!   LinkPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                │         RoverService        │
//!  DrivePort ◀── │  FSM · Dispatch · Animation │
//! PixelStrip ◀── └─────────────────────────────┘
//! ```

use log::{debug, info};

use crate::color::PackedColor;
use crate::config::RoverConfig;
use crate::control::animation::AnimationEngine;
use crate::control::drive::{DriveCommand, DriveController};
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::protocol::{self, Command};

use super::commands::{self, Action};
use super::events::{SessionEvent, SessionStats};
use super::ports::{DrivePort, EventSink, LinkPort, PixelStripPort};

// ───────────────────────────────────────────────────────────────
// RoverService
// ───────────────────────────────────────────────────────────────

pub struct RoverService {
    fsm: Fsm,
    ctx: FsmContext,
    drive: DriveController,
    animation: AnimationEngine,
    stats: SessionStats,
    /// Advertising state last applied to the link.
    advertising: bool,
}

impl RoverService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: RoverConfig) -> Self {
        let animation = AnimationEngine::new(config.initial_offset_increment);
        let ctx = FsmContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Advertising);

        Self {
            fsm,
            ctx,
            drive: DriveController::new(),
            animation,
            stats: SessionStats::default(),
            advertising: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the initial state and begin advertising.
    pub fn start(&mut self, link: &mut impl LinkPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        self.apply_advertising(link);
        sink.emit(&SessionEvent::Started(self.fsm.current_state()));
        info!("RoverService started in {:?}", self.fsm.current_state());
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one loop iteration: link state → FSM → frames → render.
    ///
    /// The `hw` parameter satisfies **both** [`DrivePort`] and
    /// [`PixelStripPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn poll(
        &mut self,
        link: &mut impl LinkPort,
        hw: &mut (impl DrivePort + PixelStripPort),
        sink: &mut impl EventSink,
    ) {
        // 1. Link snapshot → FSM → advertising, halts, events
        if self.sync_link(link.is_connected(), link, hw, sink) != StateId::Connected {
            return;
        }

        // 2. Drain frames, then render.  Dispatch always lands before the
        //    render tick of the same iteration.  A rejected frame ends the
        //    iteration without rendering.
        for _ in 0..self.ctx.config.max_frames_per_iteration.max(1) {
            match link.read_next_frame() {
                Ok(Some(frame)) => {
                    if !self.handle_frame(&frame, hw, sink) {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("link read: {e}");
                    self.sync_link(false, link, hw, sink);
                    return;
                }
            }
        }

        if self.animation.tick(hw) {
            self.stats.render_ticks = self.stats.render_ticks.wrapping_add(1);
        }
    }

    /// Feed the connection flag to the FSM, apply what the state handlers
    /// asked for and report any transition.  Returns the resulting state.
    fn sync_link(
        &mut self,
        connected: bool,
        link: &mut impl LinkPort,
        hw: &mut (impl DrivePort + PixelStripPort),
        sink: &mut impl EventSink,
    ) -> StateId {
        let prev_state = self.fsm.current_state();

        self.ctx.link.connected = connected;
        self.fsm.tick(&mut self.ctx);

        self.apply_advertising(link);
        self.apply_halts(hw);

        let state = self.fsm.current_state();
        if state != prev_state {
            match state {
                StateId::Connected => sink.emit(&SessionEvent::Connected {
                    session: self.ctx.sessions,
                }),
                StateId::Advertising => {
                    self.stats.sessions_completed = self.stats.sessions_completed.wrapping_add(1);
                    sink.emit(&SessionEvent::Disconnected(self.stats));
                }
            }
        }
        state
    }

    // ── Command handling ──────────────────────────────────────

    /// Decode one raw frame and dispatch it.  Undecodable frames are
    /// counted and dropped; returns whether the frame was dispatched.
    pub fn handle_frame(
        &mut self,
        frame: &[u8],
        hw: &mut (impl DrivePort + PixelStripPort),
        sink: &mut impl EventSink,
    ) -> bool {
        match protocol::decode(frame) {
            Ok(command) => {
                self.stats.frames_decoded = self.stats.frames_decoded.wrapping_add(1);
                self.dispatch(command, hw, sink);
                true
            }
            Err(e) => {
                self.stats.frames_rejected = self.stats.frames_rejected.wrapping_add(1);
                debug!("discarding {}-byte frame: {e}", frame.len());
                sink.emit(&SessionEvent::FrameRejected { len: frame.len() });
                false
            }
        }
    }

    /// Apply a decoded command to the drive and animation state.
    pub fn dispatch(
        &mut self,
        command: Command,
        hw: &mut (impl DrivePort + PixelStripPort),
        sink: &mut impl EventSink,
    ) {
        debug!("dispatch {command:?}");
        for action in commands::plan(&command) {
            self.perform(action, hw, sink);
        }
    }

    fn perform(
        &mut self,
        action: Action,
        hw: &mut (impl DrivePort + PixelStripPort),
        sink: &mut impl EventSink,
    ) {
        match action {
            Action::Drive(cmd) => {
                self.drive.apply(cmd, hw);
                if let DriveCommand::SelectThrottle(level) = cmd {
                    sink.emit(&SessionEvent::ThrottleChanged(level));
                }
            }
            Action::AdjustSpeed(delta) => self.animation.adjust_speed(delta),
            Action::SelectPalette(id) => {
                self.animation.select_palette(id);
                sink.emit(&SessionEvent::PaletteSelected(id));
            }
            Action::EnableCycling => self.animation.enable_cycling(),
            Action::SolidColor(rgb) => {
                self.animation.set_solid(rgb, hw);
                sink.emit(&SessionEvent::SolidColor(rgb));
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Connections accepted since boot.
    pub fn sessions(&self) -> u32 {
        self.ctx.sessions
    }

    pub fn ticks_in_state(&self) -> u64 {
        self.fsm.ticks_in_current_state()
    }

    pub fn drive(&self) -> &DriveController {
        &self.drive
    }

    pub fn animation(&self) -> &AnimationEngine {
        &self.animation
    }

    pub fn config(&self) -> &RoverConfig {
        &self.ctx.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply_advertising(&mut self, link: &mut impl LinkPort) {
        let wanted = self.ctx.commands.advertise;
        if wanted == self.advertising {
            return;
        }
        if wanted {
            link.start_advertising();
        } else {
            link.stop_advertising();
        }
        self.advertising = wanted;
    }

    fn apply_halts(&mut self, hw: &mut (impl DrivePort + PixelStripPort)) {
        let (halt_drive, blank_strip) = self.ctx.take_halt_requests();
        if halt_drive {
            info!("link lost: stopping motors");
            self.drive.stop(hw);
        }
        if blank_strip {
            info!("link lost: blanking strip");
            hw.fill(PackedColor::OFF);
            hw.show();
        }
    }
}
