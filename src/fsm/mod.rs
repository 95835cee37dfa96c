//! Session state machine.
//!
//! A fixed table of [`StateDescriptor`] rows, one per [`StateId`], each
//! holding plain `fn` pointers for enter, exit and update.  The table is
//! built once in [`states::build_state_table`] and never changes.
//!
//! ```text
//!   StateId      on_enter              on_exit            on_update
//!   ───────────  ────────────────────  ─────────────────  ─────────────────
//!   Advertising  advertise on          -                  central? → Connected
//!   Connected    advertise off, n+=1   halt requests      lost? → Advertising
//! ```
//!
//! Handlers never touch I/O.  They read the link snapshot and write link
//! commands on the shared [`FsmContext`]; the service applies those after
//! each [`Fsm::tick`].

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

/// Session states.  The discriminant is the row index in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Advertising = 0,
    Connected = 1,
}

impl StateId {
    pub const COUNT: usize = 2;

    /// Table row for a raw index.  Out-of-range indices map to
    /// `Advertising` (and trip a debug assertion).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Advertising,
            1 => Self::Connected,
            _ => {
                debug_assert!(false, "no state at index {idx}");
                Self::Advertising
            }
        }
    }
}

/// Enter / exit hook.
pub type StateActionFn = fn(&mut FsmContext);

/// Per-tick hook; `Some(next)` requests a transition.
pub type StateUpdateFn = fn(&mut FsmContext) -> Option<StateId>;

/// One row of the state table.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

pub struct Fsm {
    table: [StateDescriptor; StateId::COUNT],
    current: StateId,
    ticks: u64,
    /// Value of `ticks` when `current` was entered.
    entered_at: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, row)| row.id as usize == i),
            "state table rows out of order"
        );
        Self {
            table,
            current: initial,
            ticks: 0,
            entered_at: 0,
        }
    }

    /// Run the initial state's enter hook.  Call once, before any tick.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("session FSM: start in {}", self.current_state_name());
        if let Some(enter) = self.row(self.current).on_enter {
            enter(ctx);
        }
    }

    /// Publish timing to `ctx`, run the current update hook, and follow the
    /// transition it asks for, if any.
    pub fn tick(&mut self, ctx: &mut FsmContext) {
        self.ticks += 1;
        ctx.total_ticks = self.ticks;
        ctx.ticks_in_state = self.ticks_in_current_state();

        let update = self.row(self.current).on_update;
        if let Some(next) = update(ctx) {
            self.enter(next, ctx);
        }
    }

    /// Jump to `next` without consulting the update hook.  A jump to the
    /// current state does nothing.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut FsmContext) {
        if next != self.current {
            self.enter(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn current_state_name(&self) -> &'static str {
        self.row(self.current).name
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.ticks - self.entered_at
    }

    fn row(&self, id: StateId) -> &StateDescriptor {
        &self.table[id as usize]
    }

    /// Exit the current state and enter `next`.
    fn enter(&mut self, next: StateId, ctx: &mut FsmContext) {
        info!(
            "session FSM: {} -> {}",
            self.current_state_name(),
            self.row(next).name
        );

        if let Some(exit) = self.row(self.current).on_exit {
            exit(ctx);
        }

        self.current = next;
        self.entered_at = self.ticks;
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.row(next).on_enter {
            enter(ctx);
        }
    }
}
