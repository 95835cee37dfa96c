//! Concrete state handler functions and table builder.
//!
//! ```text
//!  ADVERTISING ──[central attached]──▶ CONNECTED
//!       ▲                                  │
//!       └──────────[central lost]──────────┘
//! ```

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Advertising
        StateDescriptor {
            id: StateId::Advertising,
            name: "Advertising",
            on_enter: Some(advertising_enter),
            on_exit: None,
            on_update: advertising_update,
        },
        // Index 1: Connected
        StateDescriptor {
            id: StateId::Connected,
            name: "Connected",
            on_enter: Some(connected_enter),
            on_exit: Some(connected_exit),
            on_update: connected_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  ADVERTISING state
// ═══════════════════════════════════════════════════════════════════════════

fn advertising_enter(ctx: &mut FsmContext) {
    ctx.commands.advertise = true;
    info!("WAITING...");
}

fn advertising_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.link.connected {
        return Some(StateId::Connected);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTED state: frames are decoded and dispatched by the service
// ═══════════════════════════════════════════════════════════════════════════

fn connected_enter(ctx: &mut FsmContext) {
    ctx.commands.advertise = false;
    ctx.sessions = ctx.sessions.wrapping_add(1);
    info!("CONNECTED (session {})", ctx.sessions);
}

fn connected_exit(ctx: &mut FsmContext) {
    ctx.commands.halt_drive = ctx.config.stop_on_disconnect;
    ctx.commands.blank_strip = ctx.config.blank_on_disconnect;
    info!("DISCONNECTED after {} ticks", ctx.ticks_in_state);
}

fn connected_update(ctx: &mut FsmContext) -> Option<StateId> {
    if !ctx.link.connected {
        return Some(StateId::Advertising);
    }
    None
}
