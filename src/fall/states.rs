//! Concrete state handler functions and table builder.
//!
//! ```text
//!  IDLE ──[free fall, gravity ok, no cooldown]──▶ POTENTIAL_FALL
//!    ▲                                                │
//!    │◀──────────────[5 s, no impact]─────────────────┤
//!    │                                          [impact]
//!    │                                                ▼
//!    │◀──────────[3 s, still moving]────────────  IMPACT_WAIT
//!    │                                                │
//!    │                                        [3 s, still]
//!    │                                                ▼
//!    └──────────────[immediately]──────────────── CONFIRMED
//!                                              (emit, cooldown)
//! ```

use heapless::Vec;
use log::{info, warn};

use super::FallEvent;
use super::analysis::{mean, variance};
use super::context::{BASELINE_SAMPLES, FallContext, FallTimer, STILLNESS_SAMPLES};
use super::fsm::{StateDescriptor, StateId};

/// Share of the baseline the pre-fall average must exceed.
const GRAVITY_PRESENT_RATIO: f32 = 0.8;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: StateId::PotentialFall,
            name: "PotentialFall",
            on_enter: Some(potential_fall_enter),
            on_exit: Some(potential_fall_exit),
            on_update: potential_fall_update,
        },
        StateDescriptor {
            id: StateId::ImpactWait,
            name: "ImpactWait",
            on_enter: Some(impact_wait_enter),
            on_exit: Some(impact_wait_exit),
            on_update: impact_wait_update,
        },
        StateDescriptor {
            id: StateId::Confirmed,
            name: "Confirmed",
            on_enter: Some(confirmed_enter),
            on_exit: None,
            on_update: confirmed_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FallContext) {
    ctx.cancel_phase_timer();
    ctx.potential_fall_started_ms = None;
    ctx.impact_sample = None;
}

fn idle_update(ctx: &mut FallContext) -> Option<StateId> {
    let sample = ctx.sample()?;
    if ctx.cooling_down() || ctx.window.len() < BASELINE_SAMPLES {
        return None;
    }

    if entry_condition(ctx, sample.magnitude()) {
        return Some(StateId::PotentialFall);
    }
    None
}

/// Below free fall while the recent average still shows gravity.
fn entry_condition(ctx: &FallContext, magnitude: f32) -> bool {
    if magnitude >= ctx.params.free_fall_threshold {
        return false;
    }
    let recent: Vec<f32, BASELINE_SAMPLES> = ctx.last(BASELINE_SAMPLES).collect();
    mean(&recent) > GRAVITY_PRESENT_RATIO * ctx.params.baseline
}

/// Start (or restart) the impact window at the current sample.
fn open_impact_window(ctx: &mut FallContext) {
    ctx.potential_fall_started_ms = Some(ctx.now_ms);
    let timeout = ctx.params.potential_fall_timeout_ms;
    ctx.arm_phase_timer(timeout, FallTimer::PotentialFallTimeout);
}

// ═══════════════════════════════════════════════════════════════════════════
//  POTENTIAL_FALL: waiting for an impact
// ═══════════════════════════════════════════════════════════════════════════

fn potential_fall_enter(ctx: &mut FallContext) {
    open_impact_window(ctx);
}

fn potential_fall_exit(ctx: &mut FallContext) {
    ctx.cancel_phase_timer();
}

fn potential_fall_update(ctx: &mut FallContext) -> Option<StateId> {
    if ctx.timer_fired(FallTimer::PotentialFallTimeout) {
        return Some(StateId::Idle);
    }

    let sample = ctx.sample()?;
    let magnitude = sample.magnitude();
    if magnitude > ctx.params.impact_threshold {
        info!("POTENTIAL_FALL: impact {:.1} m/s² at t={}", magnitude, sample.timestamp_ms);
        ctx.impact_sample = Some(sample);
        return Some(StateId::ImpactWait);
    }

    // Still upright: the timeout counts from the last such sample, so it
    // only runs out once a drop is underway with no impact.
    if entry_condition(ctx, magnitude) {
        open_impact_window(ctx);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  IMPACT_WAIT: stillness check after impact
// ═══════════════════════════════════════════════════════════════════════════

fn impact_wait_enter(ctx: &mut FallContext) {
    let wait = ctx.params.stillness_wait_ms;
    ctx.arm_phase_timer(wait, FallTimer::StillnessCheck);
}

fn impact_wait_exit(ctx: &mut FallContext) {
    ctx.cancel_phase_timer();
}

fn impact_wait_update(ctx: &mut FallContext) -> Option<StateId> {
    if !ctx.timer_fired(FallTimer::StillnessCheck) {
        return None;
    }

    let recent: Vec<f32, STILLNESS_SAMPLES> = ctx.last(STILLNESS_SAMPLES).collect();
    let var = variance(&recent);
    if var < ctx.params.stillness_variance {
        Some(StateId::Confirmed)
    } else {
        info!("IMPACT_WAIT: variance {:.2} after impact, movement resumed", var);
        Some(StateId::Idle)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONFIRMED: emit once, start cooldown, fall through to Idle
// ═══════════════════════════════════════════════════════════════════════════

fn confirmed_enter(ctx: &mut FallContext) {
    let Some(sample) = ctx.impact_sample else {
        return;
    };
    warn!(
        "CONFIRMED: fall at t={} (impact {:.1} m/s²), cooldown {} ms",
        ctx.now_ms,
        sample.magnitude(),
        ctx.params.cooldown_ms
    );
    ctx.emitted = Some(FallEvent {
        sample,
        timestamp_ms: ctx.now_ms,
    });
    ctx.arm_cooldown();
}

fn confirmed_update(_ctx: &mut FallContext) -> Option<StateId> {
    Some(StateId::Idle)
}
