//! Integration tests for the MonitorService → classifier / escalation pipeline.
//!
//! Drive the service only through `AppCommand`s and `tick`, the way the
//! runtime does, and assert on what reaches the mock ports and sink.

use crate::mock_ports::{AlarmCall, ManualClock, MockPorts, RecordingSink};

use vitalguard::app::ports::Clock;
use vitalguard::app::commands::{AppCommand, Reply};
use vitalguard::app::events::{AppEvent, DropReason};
use vitalguard::app::service::MonitorService;
use vitalguard::config::MonitorConfig;
use vitalguard::error::{DecodeError, Error, EscalationError};
use vitalguard::escalation::{AlertId, AlertStatus, AlertType, ContactId, Location, SubjectId};
use vitalguard::profile::{Gender, SubjectProfile};
use vitalguard::risk::AssessmentStatus;
use vitalguard::telemetry::AccelerometerSample;

const SUBJECT: SubjectId = SubjectId(1);
const MIN: u64 = 60_000;

pub struct Harness {
    pub svc: MonitorService<ManualClock>,
    pub clock: ManualClock,
    pub ports: MockPorts,
    pub sink: RecordingSink,
}

impl Harness {
    pub fn new() -> Self {
        let clock = ManualClock::new(0);
        let profile = SubjectProfile::new(Some(30), Gender::Male).with_name("Ada");
        let mut svc = MonitorService::new(SUBJECT, MonitorConfig::default(), profile, clock.clone());
        let mut sink = RecordingSink::new();
        svc.start(&mut sink);
        Self {
            svc,
            clock,
            ports: MockPorts::with_family(SUBJECT),
            sink,
        }
    }

    pub fn send(&mut self, cmd: AppCommand) -> Result<(), Error> {
        self.svc.handle_command(cmd, &mut self.ports, &mut self.sink)
    }

    pub fn characteristic(&mut self, uuid: u16, bytes: &[u8]) {
        let payload = heapless::Vec::from_slice(bytes).unwrap();
        self.send(AppCommand::Characteristic { uuid, payload }).unwrap();
    }

    /// Notify BP, temperature (36.8 °C) and SpO2, then heart rate.
    pub fn vitals(&mut self, hr: u8, systolic: u8, diastolic: u8, spo2: u8) {
        self.characteristic(0x2A35, &[0x00, systolic, 0x00, diastolic, 0x00]);
        self.characteristic(0x2A1C, &[0x00, 0x70, 0x01, 0x00, 0xFF]);
        self.characteristic(0x2A5F, &[0x00, spo2, 0x00]);
        self.characteristic(0x2A37, &[0x00, hr]);
    }

    pub fn normal(&mut self) {
        self.vitals(75, 115, 75, 98);
    }

    /// Advance the clock to `t` and tick once.
    pub fn at(&mut self, t: u64) {
        self.clock.set(t);
        self.svc.tick(&mut self.ports, &mut self.sink);
    }

    pub fn triggered(&self) -> Vec<(AlertId, AlertType)> {
        self.sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::AlertTriggered { alert_id, alert_type } => Some((*alert_id, *alert_type)),
                _ => None,
            })
            .collect()
    }

    pub fn closed(&self) -> Vec<(AlertId, AlertStatus, usize)> {
        self.sink
            .events
            .iter()
            .filter_map(|e| match e {
                AppEvent::AlertClosed {
                    alert_id,
                    status,
                    contacts_notified,
                } => Some((*alert_id, *status, *contacts_notified)),
                _ => None,
            })
            .collect()
    }
}

// ── Telemetry ingestion ───────────────────────────────────────

#[test]
fn normal_reading_is_assessed_and_persisted() {
    let mut h = Harness::new();
    h.clock.set(1_000);
    h.normal();

    let accepted: Vec<_> = h
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::ReadingAccepted(r) => Some(*r),
            _ => None,
        })
        .collect();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].heart_rate, 75);
    assert_eq!((accepted[0].systolic, accepted[0].diastolic), (115, 75));
    assert!((accepted[0].temperature_c - 36.8).abs() < 1e-3);
    assert_eq!(accepted[0].timestamp_ms, 1_000);

    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::Assessment(a) if a.status == AssessmentStatus::Normal)),
        1
    );
    assert_eq!(h.ports.readings_stored(), 1);
    assert!(h.triggered().is_empty());
    assert_eq!(h.svc.metrics().readings_accepted, 1);
}

#[test]
fn heart_rate_alone_produces_no_reading() {
    let mut h = Harness::new();
    h.characteristic(0x2A37, &[0x00, 80]);
    assert_eq!(h.sink.count(|e| matches!(e, AppEvent::ReadingAccepted(_))), 0);
    assert_eq!(h.svc.classifier().history_len(), 0);
}

#[test]
fn unknown_characteristic_is_dropped() {
    let mut h = Harness::new();
    h.characteristic(0x1234, &[1, 2, 3]);
    assert_eq!(
        h.sink.count(|e| *e == AppEvent::ReadingDropped(DropReason::UnknownCharacteristic(0x1234))),
        1
    );
    assert_eq!(h.svc.metrics().unknown_characteristics, 1);
}

#[test]
fn truncated_payload_keeps_previous_value() {
    let mut h = Harness::new();
    h.normal();
    h.characteristic(0x2A35, &[0x00, 0x96]);
    assert_eq!(
        h.sink.count(|e| *e == AppEvent::ReadingDropped(DropReason::Decode(DecodeError::Truncated))),
        1
    );
    h.characteristic(0x2A37, &[0x00, 76]);
    assert_eq!(h.svc.classifier().latest().map(|r| r.systolic), Some(115));
    assert_eq!(h.svc.metrics().decode_drops, 1);
}

#[test]
fn battery_level_is_tracked_without_a_reading() {
    let mut h = Harness::new();
    h.characteristic(0x2A19, &[64]);
    assert_eq!(h.svc.battery_level(), Some(64));
    assert_eq!(h.sink.count(|e| matches!(e, AppEvent::ReadingAccepted(_))), 0);
}

#[test]
fn implausible_reading_is_dropped_before_classification() {
    let mut h = Harness::new();
    h.vitals(250, 115, 75, 98);
    assert_eq!(h.sink.count(|e| *e == AppEvent::ReadingDropped(DropReason::OutOfRange)), 1);
    assert_eq!(h.svc.classifier().history_len(), 0);
    assert!(h.triggered().is_empty());
    assert_eq!(h.ports.readings_stored(), 0);
}

// ── Health emergencies ────────────────────────────────────────

#[test]
fn critical_reading_raises_one_health_alert() {
    let mut h = Harness::new();
    h.vitals(150, 115, 75, 98);

    let triggered = h.triggered();
    assert_eq!(triggered.len(), 1);
    assert_eq!(triggered[0].1, AlertType::HealthEmergency);
    assert!(h.ports.is_sounding());
    assert_eq!(h.sink.count(|e| matches!(e, AppEvent::CriticalVitals { .. })), 1);

    // Still critical: folded into the running alert.
    h.vitals(152, 115, 75, 98);
    assert_eq!(h.triggered().len(), 1);
    assert_eq!(
        h.sink.count(|e| matches!(e, AppEvent::TriggerRejected { active, .. } if *active == triggered[0].0)),
        1
    );
    assert_eq!(h.svc.metrics().alerts_triggered, 1);
    assert_eq!(h.svc.metrics().alerts_rejected, 1);
}

#[test]
fn unanswered_health_alert_walks_contacts_then_escalates() {
    let mut h = Harness::new();
    h.vitals(150, 115, 75, 98);
    let (id, _) = h.triggered()[0];

    h.at(MIN - 1);
    assert!(h.ports.sent.is_empty());
    h.at(MIN);
    assert_eq!(h.ports.sent_to(), vec![ContactId(10)]);
    let msg = &h.ports.sent[0].message;
    assert!(msg.starts_with("CRITICAL HEALTH ALERT for Ada!"));
    assert!(msg.contains("Heart Rate: 150 bpm"));
    assert!(msg.ends_with(&format!("Alert {}. Please check on them immediately!", id)));

    h.at(2 * MIN);
    h.at(3 * MIN);
    assert_eq!(h.ports.sent_to(), vec![ContactId(10), ContactId(20), ContactId(30)]);
    assert_eq!(h.svc.active_alert(), Some(id));

    h.at(4 * MIN);
    assert_eq!(h.closed(), vec![(id, AlertStatus::Escalated, 3)]);
    assert_eq!(h.svc.active_alert(), None);
    assert_eq!(h.ports.alarm.last(), Some(&AlarmCall::Silence(id)));
    assert_eq!(h.svc.metrics().alerts_escalated, 1);
    assert_eq!(h.svc.metrics().notifications_sent, 3);

    let stored = h.ports.alerts_stored();
    assert_eq!(stored.first().map(|a| a.status), Some(AlertStatus::Active));
    assert_eq!(stored.last().map(|a| a.status), Some(AlertStatus::Escalated));
}

// ── Manual SOS and responses ──────────────────────────────────

#[test]
fn subject_ok_resolves_without_notifying() {
    let mut h = Harness::new();
    h.send(AppCommand::ManualSos).unwrap();
    let (id, kind) = h.triggered()[0];
    assert_eq!(kind, AlertType::ManualSos);

    h.clock.set(30_000);
    h.send(AppCommand::Respond {
        alert_id: id,
        contact: None,
        reply: Reply::ImOk,
    })
    .unwrap();
    h.at(10 * MIN);

    assert!(h.ports.sent.is_empty());
    assert_eq!(h.closed(), vec![(id, AlertStatus::Resolved, 0)]);
    let alert = h.svc.escalation().alert(id).unwrap();
    assert_eq!(alert.resolved_at_ms, Some(30_000));
    assert!(alert.response_received);
}

#[test]
fn contact_acknowledgement_stops_escalation() {
    let mut h = Harness::new();
    h.send(AppCommand::ManualSos).unwrap();
    let (id, _) = h.triggered()[0];
    h.at(MIN);
    h.send(AppCommand::Respond {
        alert_id: id,
        contact: Some(ContactId(10)),
        reply: Reply::Acknowledged,
    })
    .unwrap();
    h.at(5 * MIN);

    assert_eq!(h.ports.sent_to(), vec![ContactId(10)]);
    assert_eq!(h.ports.responded, vec![ContactId(10)]);
    assert_eq!(h.closed(), vec![(id, AlertStatus::Resolved, 1)]);
}

#[test]
fn second_sos_while_active_is_rejected() {
    let mut h = Harness::new();
    h.send(AppCommand::ManualSos).unwrap();
    let (id, _) = h.triggered()[0];
    let err = h.send(AppCommand::ManualSos).unwrap_err();
    assert_eq!(err, Error::Escalation(EscalationError::AlreadyActive { alert_id: id }));
}

#[test]
fn cancel_twice_is_a_noop_and_unknown_alert_errors() {
    let mut h = Harness::new();
    h.send(AppCommand::ManualSos).unwrap();
    let (id, _) = h.triggered()[0];
    h.send(AppCommand::Cancel { alert_id: id }).unwrap();
    h.send(AppCommand::Cancel { alert_id: id }).unwrap();
    assert_eq!(h.closed().len(), 1);
    assert_eq!(h.svc.metrics().alerts_cancelled, 1);

    let err = h.send(AppCommand::Cancel { alert_id: AlertId(999) }).unwrap_err();
    assert_eq!(err, Error::Escalation(EscalationError::UnknownAlert));
}

#[test]
fn late_response_after_escalation_changes_nothing() {
    let mut h = Harness::new();
    h.send(AppCommand::ManualSos).unwrap();
    let (id, _) = h.triggered()[0];
    for i in 1..=4 {
        h.at(i * MIN);
    }
    h.send(AppCommand::Respond {
        alert_id: id,
        contact: Some(ContactId(30)),
        reply: Reply::Acknowledged,
    })
    .unwrap();
    assert_eq!(h.svc.escalation().alert(id).unwrap().status, AlertStatus::Escalated);
    assert!(h.ports.responded.is_empty());
    assert_eq!(h.closed().len(), 1);
}

#[test]
fn location_is_attached_to_new_alerts() {
    let mut h = Harness::new();
    h.send(AppCommand::SetLocation(Location {
        latitude: 40.7,
        longitude: -74.0,
    }))
    .unwrap();
    h.send(AppCommand::ManualSos).unwrap();
    h.at(MIN);
    assert!(h.ports.sent[0].message.contains("Location: https://maps.google.com/?q=40.7,-74"));
    assert!(h.ports.alerts_stored()[0].context.location.is_some());
}

// ── Falls ─────────────────────────────────────────────────────

fn run_samples(h: &mut Harness, magnitude: f32, count: usize) {
    for _ in 0..count {
        let t = h.clock.now_ms();
        h.send(AppCommand::Accelerometer(AccelerometerSample::new(0.0, 0.0, magnitude, t)))
            .unwrap();
        h.clock.advance(20);
    }
}

#[test]
fn confirmed_fall_raises_fall_alert_with_latest_vitals() {
    let mut h = Harness::new();
    h.normal();
    run_samples(&mut h, 9.8, 50);
    run_samples(&mut h, 5.0, 10);
    run_samples(&mut h, 30.0, 5);
    run_samples(&mut h, 9.8, 150);

    assert_eq!(h.sink.count(|e| matches!(e, AppEvent::FallDetected(_))), 1);
    let triggered = h.triggered();
    assert_eq!(triggered.len(), 1);
    assert_eq!(triggered[0].1, AlertType::FallDetected);
    let alert = h.svc.escalation().alert(triggered[0].0).unwrap();
    assert_eq!(alert.context.vitals.map(|v| v.heart_rate), Some(75));
    assert_eq!(alert.context.subject_name.as_deref(), Some("Ada"));
    assert_eq!(h.svc.metrics().falls_detected, 1);
}

// ── Ports misbehaving ─────────────────────────────────────────

#[test]
fn storage_failure_never_blocks_alerting() {
    let mut h = Harness::new();
    h.ports.storage_down = true;
    h.vitals(150, 115, 75, 98);
    assert_eq!(h.triggered().len(), 1);
    assert!(h.svc.metrics().persistence_failures >= 2);
    h.at(MIN);
    assert_eq!(h.ports.sent_to(), vec![ContactId(10)]);
}

#[test]
fn unreachable_contact_is_skipped_and_counted() {
    let mut h = Harness::new();
    h.ports.unreachable.push(ContactId(10));
    h.send(AppCommand::ManualSos).unwrap();
    h.at(MIN);
    h.at(2 * MIN);
    assert_eq!(h.ports.sent_to(), vec![ContactId(20)]);
    assert_eq!(h.ports.contacted.iter().map(|(c, _)| *c).collect::<Vec<_>>(), vec![ContactId(10), ContactId(20)]);
    assert_eq!(h.svc.metrics().notification_failures, 1);
    assert!(h.sink.count(|e| matches!(e, AppEvent::ContactNotified { delivered: false, .. })) == 1);
}

// ── Profile ───────────────────────────────────────────────────

#[test]
fn profile_update_is_applied() {
    let mut h = Harness::new();
    let p = SubjectProfile::new(Some(82), Gender::Female);
    h.send(AppCommand::UpdateProfile(p.clone())).unwrap();
    assert_eq!(h.svc.profile(), &p);
    assert_eq!(h.sink.count(|e| *e == AppEvent::ProfileUpdated), 1);
    assert!((h.svc.fall_detector().baseline() - 9.8 * 0.8).abs() < 1e-4);
}
