//! Fall detector.
//!
//! A four-state machine fed by accelerometer samples and its own timers.
//! The detector never reads a clock; callers pass the current time with
//! every sample and call [`FallDetector::advance`] between samples so the
//! timeout, stillness and cooldown windows fire on time.
//!
//! Every phase timer is tagged with a generation.  A firing whose handle
//! no longer matches the detector's current timer is counted and dropped.

pub mod analysis;
pub mod context;
pub mod fsm;
pub mod states;

use heapless::Vec;
use log::{debug, info};

use crate::config::MonitorConfig;
use crate::profile::SubjectProfile;
use crate::telemetry::AccelerometerSample;
use analysis::{MovementPattern, sensitivity_multiplier};
use context::{FallContext, FallInput, FallParams, FallTimer, STILLNESS_SAMPLES};
use fsm::{Fsm, StateId};

/// A confirmed fall.  At most one per cooldown window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallEvent {
    /// Sample that crossed the impact threshold.
    pub sample: AccelerometerSample,
    /// Time the stillness check confirmed the fall.
    pub timestamp_ms: u64,
}

pub struct FallDetector {
    fsm: Fsm,
    ctx: FallContext,
    stale_timers: u64,
}

impl FallDetector {
    pub fn new(config: &MonitorConfig, profile: &SubjectProfile) -> Self {
        let params = FallParams::from_config(config, sensitivity_multiplier(profile));
        let mut ctx = FallContext::new(params);
        let mut fsm = Fsm::new(states::build_state_table(), StateId::Idle);
        fsm.start(&mut ctx);
        info!("FallDetector: baseline {:.2} m/s²", params.baseline);
        Self {
            fsm,
            ctx,
            stale_timers: 0,
        }
    }

    /// Recompute thresholds for a new profile.  Window, state and timers
    /// are kept.
    pub fn update_profile(&mut self, config: &MonitorConfig, profile: &SubjectProfile) {
        self.ctx.params = FallParams::from_config(config, sensitivity_multiplier(profile));
        info!("FallDetector: baseline now {:.2} m/s²", self.ctx.params.baseline);
    }

    /// Fire due timers, then feed one sample.
    pub fn on_sample(&mut self, sample: AccelerometerSample, now_ms: u64) -> Option<FallEvent> {
        let fired = self.advance(now_ms);

        let magnitude = sample.magnitude();
        if !magnitude.is_finite() {
            debug!("FallDetector: dropped non-finite sample at t={}", sample.timestamp_ms);
            return fired;
        }
        self.ctx.window.write(magnitude);
        self.ctx.now_ms = now_ms;
        self.ctx.input = FallInput::Sample(sample);
        self.fsm.dispatch(&mut self.ctx);

        fired.or_else(|| self.settle())
    }

    /// Fire every timer due at `now_ms`, in deadline order.
    pub fn advance(&mut self, now_ms: u64) -> Option<FallEvent> {
        let mut emitted = None;
        while let Some((handle, kind)) = self.ctx.timers.pop_expired(now_ms) {
            self.ctx.now_ms = now_ms;
            match kind {
                FallTimer::Cooldown if self.ctx.cooldown_timer == Some(handle) => {
                    self.ctx.cooldown_timer = None;
                    info!("FallDetector: cooldown over at t={}", now_ms);
                }
                FallTimer::PotentialFallTimeout | FallTimer::StillnessCheck
                    if self.ctx.phase_timer == Some(handle) =>
                {
                    self.ctx.phase_timer = None;
                    self.ctx.input = FallInput::Timer(kind);
                    self.fsm.dispatch(&mut self.ctx);
                    if let Some(event) = self.settle() {
                        emitted = Some(event);
                    }
                }
                _ => {
                    self.stale_timers += 1;
                    debug!(
                        "FallDetector: ignored stale {:?} timer (gen {})",
                        kind,
                        handle.generation()
                    );
                }
            }
        }
        emitted
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_cooling_down(&self) -> bool {
        self.ctx.cooling_down()
    }

    pub fn baseline(&self) -> f32 {
        self.ctx.params.baseline
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<u64> {
        self.ctx.timers.next_deadline()
    }

    pub fn fall_risk_score(&self) -> f32 {
        analysis::fall_risk_score(&self.recent())
    }

    pub fn movement_pattern(&self) -> MovementPattern {
        analysis::movement_pattern(&self.recent())
    }

    /// Timer firings dropped by the generation check.
    pub fn stale_timer_count(&self) -> u64 {
        self.stale_timers
    }

    fn recent(&self) -> Vec<f32, STILLNESS_SAMPLES> {
        self.ctx.last(STILLNESS_SAMPLES).collect()
    }

    /// Leave the transient `Confirmed` state and hand out its event.
    fn settle(&mut self) -> Option<FallEvent> {
        if self.fsm.current_state() == StateId::Confirmed {
            self.ctx.input = FallInput::Settle;
            self.fsm.dispatch(&mut self.ctx);
        }
        self.ctx.emitted.take()
    }
}
