//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade, one `TAG | k=v` line per event.  A companion-app
//! feed would implement the same trait.

use log::{info, warn};

use crate::app::events::{AppEvent, DropReason};
use crate::app::ports::EventSink;
use crate::risk::AssessmentStatus;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink {
    /// Log normal assessments too (otherwise only non-normal ones).
    verbose: bool,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { subject } => {
                info!("START | subject={}", subject);
            }
            AppEvent::ReadingAccepted(r) => {
                info!(
                    "VITAL | hr={} bp={}/{} T={:.1}\u{00b0}C spo2={}% activity={:?} t={}",
                    r.heart_rate, r.systolic, r.diastolic, r.temperature_c, r.spo2, r.activity, r.timestamp_ms
                );
            }
            AppEvent::ReadingDropped(reason) => match reason {
                DropReason::UnknownCharacteristic(uuid) => {
                    info!("DROP  | unknown_uuid=0x{:04X}", uuid);
                }
                DropReason::Decode(e) => warn!("DROP  | decode={}", e),
                DropReason::OutOfRange => warn!("DROP  | out_of_range"),
            },
            AppEvent::Assessment(a) => {
                if a.is_critical() {
                    warn!(
                        "RISK  | status=critical level={:?} hr={:?} bp={:?} temp={:?} spo2={:?}",
                        a.risk_level, a.metrics.heart_rate, a.metrics.blood_pressure, a.metrics.temperature, a.metrics.spo2
                    );
                } else if self.verbose || a.status != AssessmentStatus::Normal {
                    info!(
                        "RISK  | status={:?} level={:?} conf={:.2} hr_trend={:?} sys_trend={:?}",
                        a.status, a.risk_level, a.confidence, a.heart_rate_trend, a.systolic_trend
                    );
                }
            }
            AppEvent::CriticalVitals { faults } => {
                warn!("SCREEN | tripped faults=0b{:08b}", faults);
            }
            AppEvent::FallDetected(f) => {
                warn!(
                    "FALL  | t={} impact={:.1}m/s\u{00b2}",
                    f.timestamp_ms,
                    f.sample.magnitude()
                );
            }
            AppEvent::AlertTriggered { alert_id, alert_type } => {
                warn!("ALERT | id={} type={} status=active", alert_id, alert_type.as_str());
            }
            AppEvent::TriggerRejected { alert_type, active } => {
                info!("ALERT | rejected type={} active={}", alert_type.as_str(), active);
            }
            AppEvent::ContactNotified {
                alert_id,
                contact,
                delivered,
            } => {
                info!(
                    "NOTIFY | id={} contact={} delivered={}",
                    alert_id, contact, delivered
                );
            }
            AppEvent::AlertClosed {
                alert_id,
                status,
                contacts_notified,
            } => {
                info!(
                    "ALERT | id={} status={} contacts_notified={}",
                    alert_id,
                    status.as_str(),
                    contacts_notified
                );
            }
            AppEvent::ProfileUpdated => info!("PROFILE | updated"),
        }
    }
}
