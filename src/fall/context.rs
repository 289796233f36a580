//! Shared mutable context threaded through every fall-FSM handler.
//!
//! Holds the current input, the magnitude window, the detector's timers
//! and the outputs handlers write for the detector to collect.

use heapless::HistoryBuffer;

use super::FallEvent;
use crate::config::MonitorConfig;
use crate::telemetry::AccelerometerSample;
use crate::timer::{TimerHandle, TimerQueue};

/// Magnitudes retained for the window checks.
pub const WINDOW_CAPACITY: usize = 20;

/// Samples averaged for the pre-fall gravity check.
pub const BASELINE_SAMPLES: usize = 5;

/// Samples the stillness variance is computed over.
pub const STILLNESS_SAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallTimer {
    PotentialFallTimeout,
    StillnessCheck,
    Cooldown,
}

/// What the current dispatch is reacting to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FallInput {
    Sample(AccelerometerSample),
    /// A phase timer that passed the generation check.
    Timer(FallTimer),
    /// Follow-up dispatch after entering a transient state.
    Settle,
}

/// Resolved per-subject thresholds and windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallParams {
    pub free_fall_threshold: f32,
    pub impact_threshold: f32,
    pub stillness_variance: f32,
    /// Baseline after the sensitivity multiplier.
    pub baseline: f32,
    pub potential_fall_timeout_ms: u64,
    pub stillness_wait_ms: u64,
    pub cooldown_ms: u64,
}

impl FallParams {
    pub fn from_config(config: &MonitorConfig, sensitivity: f32) -> Self {
        Self {
            free_fall_threshold: config.free_fall_threshold,
            impact_threshold: config.impact_threshold,
            stillness_variance: config.stillness_variance,
            baseline: config.baseline_acceleration * sensitivity,
            potential_fall_timeout_ms: config.potential_fall_timeout_ms,
            stillness_wait_ms: config.stillness_wait_ms,
            cooldown_ms: config.fall_cooldown_ms,
        }
    }
}

impl Default for FallParams {
    fn default() -> Self {
        Self::from_config(&MonitorConfig::default(), 1.0)
    }
}

pub struct FallContext {
    // -- Input --
    pub input: FallInput,
    pub now_ms: u64,

    // -- Window --
    pub window: HistoryBuffer<f32, WINDOW_CAPACITY>,

    // -- Configuration --
    pub params: FallParams,

    // -- Timers --
    pub timers: TimerQueue<FallTimer, 4>,
    /// Timeout or stillness timer of the current phase.
    pub phase_timer: Option<TimerHandle>,
    pub cooldown_timer: Option<TimerHandle>,

    // -- Phase data --
    pub potential_fall_started_ms: Option<u64>,
    /// Sample that crossed the impact threshold.
    pub impact_sample: Option<AccelerometerSample>,

    // -- Output --
    pub emitted: Option<FallEvent>,
}

impl FallContext {
    pub fn new(params: FallParams) -> Self {
        Self {
            input: FallInput::Settle,
            now_ms: 0,
            window: HistoryBuffer::new(),
            params,
            timers: TimerQueue::new(),
            phase_timer: None,
            cooldown_timer: None,
            potential_fall_started_ms: None,
            impact_sample: None,
            emitted: None,
        }
    }

    pub fn cooling_down(&self) -> bool {
        self.cooldown_timer.is_some()
    }

    /// Arm the phase timer, replacing any previous one.
    pub fn arm_phase_timer(&mut self, delay_ms: u64, kind: FallTimer) {
        self.cancel_phase_timer();
        self.phase_timer = self.timers.schedule(self.now_ms, delay_ms, kind);
    }

    pub fn cancel_phase_timer(&mut self) {
        if let Some(h) = self.phase_timer.take() {
            self.timers.cancel(h);
        }
    }

    pub fn arm_cooldown(&mut self) {
        if let Some(h) = self.cooldown_timer.take() {
            self.timers.cancel(h);
        }
        let delay = self.params.cooldown_ms;
        self.cooldown_timer = self.timers.schedule(self.now_ms, delay, FallTimer::Cooldown);
    }

    /// The `n` most recent magnitudes, oldest first.
    pub fn last(&self, n: usize) -> impl Iterator<Item = f32> + '_ {
        let skip = self.window.len().saturating_sub(n);
        self.window.oldest_ordered().skip(skip).copied()
    }

    pub fn sample(&self) -> Option<AccelerometerSample> {
        match self.input {
            FallInput::Sample(s) => Some(s),
            _ => None,
        }
    }

    pub fn timer_fired(&self, kind: FallTimer) -> bool {
        self.input == FallInput::Timer(kind)
    }
}
