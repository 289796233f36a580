//! Application service: the hexagonal core.
//!
//! [`MonitorService`] owns the reading assembler, risk classifier, fall
//! detector, critical-vitals screen and escalation orchestrator for one
//! subject.  It exposes a transport-agnostic API; all I/O flows through
//! port traits injected at call sites, so the whole service runs against
//! mock adapters in tests.
//!
//! ```text
//!  characteristic bytes ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  accelerometer        ──▶ │        MonitorService         │
//!  SOS / replies        ──▶ │ Assembler · Risk · Fall · Esc │ ──▶ ServicePorts
//!                           └──────────────────────────────┘
//! ```

use log::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::diagnostics::RuntimeMetrics;
use crate::error::{Error, EscalationError};
use crate::escalation::{
    AlertContext, AlertId, AlertType, EscalationEvent, EscalationOrchestrator, Location, SubjectId,
};
use crate::fall::FallDetector;
use crate::profile::SubjectProfile;
use crate::risk::RiskClassifier;
use crate::safety::CriticalScreen;
use crate::telemetry::{
    AccelerometerSample, Characteristic, VitalAssembler, VitalReading, decode_characteristic,
};

use super::commands::AppCommand;
use super::events::{AppEvent, DropReason};
use super::ports::{Clock, EventSink, PersistenceSink, Record, ServicePorts};

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

pub struct MonitorService<C: Clock> {
    subject: SubjectId,
    config: MonitorConfig,
    profile: SubjectProfile,
    clock: C,
    assembler: VitalAssembler,
    classifier: RiskClassifier,
    fall: FallDetector,
    screen: CriticalScreen,
    escalation: EscalationOrchestrator,
    location: Option<Location>,
    metrics: RuntimeMetrics,
}

impl<C: Clock> MonitorService<C> {
    pub fn new(subject: SubjectId, config: MonitorConfig, profile: SubjectProfile, clock: C) -> Self {
        Self {
            subject,
            classifier: RiskClassifier::new(&profile),
            fall: FallDetector::new(&config, &profile),
            escalation: EscalationOrchestrator::new(&config),
            assembler: VitalAssembler::new(),
            screen: CriticalScreen::new(),
            location: None,
            metrics: RuntimeMetrics::default(),
            config,
            profile,
            clock,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        info!("MonitorService started for {}", self.subject);
        sink.emit(&AppEvent::Started {
            subject: self.subject,
        });
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Fire every fall and escalation timer due by now.
    pub fn tick(&mut self, ports: &mut impl ServicePorts, sink: &mut impl EventSink) {
        let now = self.clock.now_ms();
        let fired = self.fall.advance(now);
        self.metrics.stale_fall_timers = self.fall.stale_timer_count();
        if let Some(event) = fired {
            self.on_fall(event, ports, sink);
        }
        self.escalation.tick(now, ports);
        self.flush_escalation(ports, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process one external command.
    ///
    /// Only requests naming an alert can fail (`UnknownAlert`), and a
    /// manual SOS rejected because another alert is running.  Bad sensor
    /// data is dropped and reported as an event.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        ports: &mut impl ServicePorts,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        let now = self.clock.now_ms();
        match cmd {
            AppCommand::Characteristic { uuid, payload } => {
                self.on_characteristic(uuid, &payload, now, ports, sink);
            }
            AppCommand::Accelerometer(sample) => self.on_sample(sample, now, ports, sink),
            AppCommand::SetActivity { activity } => {
                debug!("Activity set to {:?}", activity);
                self.assembler.set_activity(activity);
            }
            AppCommand::SetLocation(location) => self.location = Some(location),
            AppCommand::ManualSos => {
                self.raise(AlertType::ManualSos, None, now, ports, sink)?;
            }
            AppCommand::Respond {
                alert_id,
                contact,
                reply,
            } => {
                let responder = AppCommand::responder(contact);
                let result = self
                    .escalation
                    .respond(alert_id, responder, reply.into(), now, ports);
                self.flush_escalation(ports, sink);
                result?;
            }
            AppCommand::Cancel { alert_id } => {
                let result = self.escalation.cancel(alert_id, now, ports);
                self.flush_escalation(ports, sink);
                result?;
            }
            AppCommand::UpdateProfile(profile) => {
                self.classifier.update_profile(&profile);
                self.fall.update_profile(&self.config, &profile);
                self.profile = profile;
                info!("Subject profile updated");
                sink.emit(&AppEvent::ProfileUpdated);
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn subject(&self) -> SubjectId {
        self.subject
    }

    pub fn metrics(&self) -> &RuntimeMetrics {
        &self.metrics
    }

    pub fn profile(&self) -> &SubjectProfile {
        &self.profile
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    pub fn fall_detector(&self) -> &FallDetector {
        &self.fall
    }

    pub fn escalation(&self) -> &EscalationOrchestrator {
        &self.escalation
    }

    pub fn active_alert(&self) -> Option<AlertId> {
        self.escalation.active_alert(self.subject)
    }

    /// Last battery percentage reported by the wearable.
    pub fn battery_level(&self) -> Option<u8> {
        self.assembler.battery_level()
    }

    /// Earliest pending timer across fall detection and escalation.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.fall.next_deadline(), self.escalation.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_characteristic(
        &mut self,
        uuid: u16,
        payload: &[u8],
        now: u64,
        ports: &mut impl ServicePorts,
        sink: &mut impl EventSink,
    ) {
        let Some(ch) = Characteristic::from_uuid16(uuid) else {
            debug!("Ignoring characteristic 0x{:04X}", uuid);
            self.metrics.unknown_characteristics += 1;
            sink.emit(&AppEvent::ReadingDropped(DropReason::UnknownCharacteristic(uuid)));
            return;
        };

        match decode_characteristic(ch, payload) {
            Ok(measurement) => {
                if let Some(reading) = self.assembler.apply(measurement, now) {
                    self.on_reading(reading, now, ports, sink);
                }
            }
            Err(e) => {
                warn!("Dropped {:?} payload ({} bytes): {}", ch, payload.len(), e);
                self.metrics.decode_drops += 1;
                sink.emit(&AppEvent::ReadingDropped(DropReason::Decode(e)));
            }
        }
    }

    fn on_reading(
        &mut self,
        reading: VitalReading,
        now: u64,
        ports: &mut impl ServicePorts,
        sink: &mut impl EventSink,
    ) {
        let Some(assessment) = self.classifier.ingest(reading) else {
            warn!(
                "Dropped implausible reading: hr={} bp={}/{} t={:.1} spo2={}",
                reading.heart_rate,
                reading.systolic,
                reading.diastolic,
                reading.temperature_c,
                reading.spo2
            );
            self.metrics.validation_drops += 1;
            sink.emit(&AppEvent::ReadingDropped(DropReason::OutOfRange));
            return;
        };

        self.metrics.readings_accepted += 1;
        sink.emit(&AppEvent::ReadingAccepted(reading));
        self.persist(ports, Record::Reading(reading));

        self.metrics.record_assessment(assessment.status);
        let critical = assessment.is_critical();
        sink.emit(&AppEvent::Assessment(assessment));

        let screen = self.screen.evaluate(&reading);
        if screen.newly_tripped {
            self.metrics.screen_trips += 1;
            sink.emit(&AppEvent::CriticalVitals {
                faults: screen.faults,
            });
        }

        if critical || screen.newly_tripped {
            let _ = self.raise(AlertType::HealthEmergency, Some(reading), now, ports, sink);
        }
    }

    fn on_sample(
        &mut self,
        sample: AccelerometerSample,
        now: u64,
        ports: &mut impl ServicePorts,
        sink: &mut impl EventSink,
    ) {
        self.metrics.samples_processed += 1;
        let fired = self.fall.on_sample(sample, now);
        self.metrics.stale_fall_timers = self.fall.stale_timer_count();
        if let Some(event) = fired {
            self.on_fall(event, ports, sink);
        }
    }

    fn on_fall(
        &mut self,
        event: crate::fall::FallEvent,
        ports: &mut impl ServicePorts,
        sink: &mut impl EventSink,
    ) {
        self.metrics.falls_detected += 1;
        sink.emit(&AppEvent::FallDetected(event));
        let vitals = self.classifier.latest().copied();
        let _ = self.raise(AlertType::FallDetected, vitals, event.timestamp_ms, ports, sink);
    }

    /// Start an escalation, or report why none was started.
    fn raise(
        &mut self,
        alert_type: AlertType,
        vitals: Option<VitalReading>,
        now: u64,
        ports: &mut impl ServicePorts,
        sink: &mut impl EventSink,
    ) -> Result<AlertId, EscalationError> {
        let context = AlertContext {
            subject_name: self.profile.name.clone(),
            location: self.location,
            vitals,
        };
        let result = self
            .escalation
            .trigger(self.subject, alert_type, context, now, ports);
        match result {
            Ok(_) => self.metrics.alerts_triggered += 1,
            Err(EscalationError::AlreadyActive { alert_id }) => {
                self.metrics.alerts_rejected += 1;
                sink.emit(&AppEvent::TriggerRejected {
                    alert_type,
                    active: alert_id,
                });
            }
            Err(e) => {
                error!("{} trigger failed: {}", alert_type.as_str(), e);
                self.metrics.alerts_rejected += 1;
            }
        }
        self.flush_escalation(ports, sink);
        result
    }

    /// Forward orchestrator progress to the sink, metrics and storage.
    fn flush_escalation(&mut self, ports: &mut impl PersistenceSink, sink: &mut impl EventSink) {
        let events: Vec<EscalationEvent> = self.escalation.drain_events().collect();
        for event in events {
            match event {
                EscalationEvent::Triggered(alert) => {
                    sink.emit(&AppEvent::AlertTriggered {
                        alert_id: alert.id,
                        alert_type: alert.alert_type,
                    });
                    self.persist(ports, Record::Alert(alert));
                }
                EscalationEvent::ContactNotified {
                    alert_id,
                    contact,
                    delivered,
                } => {
                    self.metrics.record_notification(delivered);
                    sink.emit(&AppEvent::ContactNotified {
                        alert_id,
                        contact,
                        delivered,
                    });
                }
                EscalationEvent::Closed(alert) => {
                    self.metrics.record_alert_closed(alert.status);
                    sink.emit(&AppEvent::AlertClosed {
                        alert_id: alert.id,
                        status: alert.status,
                        contacts_notified: alert.contacts_notified.len(),
                    });
                    self.persist(ports, Record::Alert(alert));
                }
            }
        }
    }

    fn persist(&mut self, store: &mut impl PersistenceSink, record: Record) {
        if let Err(e) = store.store(&record) {
            warn!("Persistence failed, record dropped: {}", e);
            self.metrics.persistence_failures += 1;
        }
    }
}
