//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                    │
//! │  ┌───────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ StateId       │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├───────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle          │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ PotentialFall │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ ImpactWait    │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ Confirmed     │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └───────────────┴───────────┴──────────┴───────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each dispatch the engine calls `on_update` for the current state with
//! the input stored in the context.  If it returns `Some(next_id)`, the
//! engine runs `on_exit` for the current state, then `on_enter` for the
//! next, and updates the current pointer.

use super::context::FallContext;
use log::info;

/// Must stay in sync with [`super::states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    PotentialFall = 1,
    ImpactWait = 2,
    Confirmed = 3,
}

impl StateId {
    pub const COUNT: usize = 4;

    /// Out-of-range indices fall back to `Idle`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::PotentialFall,
            2 => Self::ImpactWait,
            3 => Self::Confirmed,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

/// Runs exactly once per transition.
pub type StateActionFn = fn(&mut FallContext);

/// Returns `Some(next)` to transition, `None` to stay.
pub type StateUpdateFn = fn(&mut FallContext) -> Option<StateId>;

pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

pub struct Fsm {
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter`.  Call once before the first dispatch.
    pub fn start(&mut self, ctx: &mut FallContext) {
        info!("FallFSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Hand the context's current input to the active state.
    pub fn dispatch(&mut self, ctx: &mut FallContext) {
        if let Some(next_id) = (self.table[self.current].on_update)(ctx) {
            self.transition(next_id, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    fn transition(&mut self, next_id: StateId, ctx: &mut FallContext) {
        let next_idx = next_id as usize;

        info!(
            "FallFSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
