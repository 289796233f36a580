//! Monitor configuration parameters
//!
//! Every runtime-tunable threshold and timing window.  History capacities
//! are compile-time constants and live next to their buffers.  Values can
//! be overridden from a JSON file (see `adapters::config_file`).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core monitor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // --- Fall detection ---
    /// Magnitude (m/s²) below which a sample counts as free fall
    pub free_fall_threshold: f32,
    /// Magnitude (m/s²) above which a sample counts as an impact
    pub impact_threshold: f32,
    /// Variance of the last 10 magnitudes below which the subject is still
    pub stillness_variance: f32,
    /// Gravity-only magnitude before per-subject sensitivity adjustment
    pub baseline_acceleration: f32,
    /// Time allowed between free fall and impact (ms)
    pub potential_fall_timeout_ms: u64,
    /// Wait after impact before the stillness check (ms)
    pub stillness_wait_ms: u64,
    /// Suppression window after a confirmed fall (ms)
    pub fall_cooldown_ms: u64,

    // --- Escalation ---
    /// Subject's window to respond to the local alarm (ms)
    pub subject_response_timeout_ms: u64,
    /// Wait for a response after each contact notification (ms)
    pub contact_response_timeout_ms: u64,
    /// Terminal alerts kept for late lookups
    pub retained_terminal_alerts: usize,

    // --- Timing ---
    /// Runtime tick interval (ms)
    pub tick_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            // Fall detection
            free_fall_threshold: 15.0,
            impact_threshold: 25.0,
            stillness_variance: 2.0,
            baseline_acceleration: 9.8,
            potential_fall_timeout_ms: 5_000,
            stillness_wait_ms: 3_000,
            fall_cooldown_ms: 30_000,

            // Escalation
            subject_response_timeout_ms: 60_000,
            contact_response_timeout_ms: 60_000,
            retained_terminal_alerts: 32,

            // Timing
            tick_interval_ms: 100, // 10 Hz
        }
    }
}

impl MonitorConfig {
    /// Reject nonsense values.  Never clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.free_fall_threshold,
            self.impact_threshold,
            self.stillness_variance,
            self.baseline_acceleration,
        ];
        if finite.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::ValidationFailed(
                "fall thresholds must be finite and positive",
            ));
        }
        if self.impact_threshold <= self.free_fall_threshold {
            return Err(ConfigError::ValidationFailed(
                "impact_threshold must exceed free_fall_threshold",
            ));
        }
        if self.potential_fall_timeout_ms == 0
            || self.stillness_wait_ms == 0
            || self.fall_cooldown_ms == 0
        {
            return Err(ConfigError::ValidationFailed("fall timers must be non-zero"));
        }
        if self.subject_response_timeout_ms == 0 || self.contact_response_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "escalation timeouts must be non-zero",
            ));
        }
        if self.tick_interval_ms == 0 || self.tick_interval_ms > 1_000 {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms must be within 1..=1000",
            ));
        }
        Ok(())
    }
}
