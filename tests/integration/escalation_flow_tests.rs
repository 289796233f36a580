//! End-to-end escalation flows through the replay driver and the host
//! adapters (contact book, record log).

use crate::mock_ports::{ManualClock, MockPorts, RecordingSink};

use vitalguard::adapters::contact_book::ContactBook;
use vitalguard::adapters::local::LocalPorts;
use vitalguard::adapters::record_log::{RecordLog, read_records};
use vitalguard::app::events::AppEvent;
use vitalguard::app::ports::Record;
use vitalguard::app::service::MonitorService;
use vitalguard::config::MonitorConfig;
use vitalguard::escalation::{AlertStatus, AlertType, ContactId, SubjectId};
use vitalguard::profile::SubjectProfile;
use vitalguard::runtime::replay::{TraceEntry, advance_to, replay};

const SUBJECT: SubjectId = SubjectId(1);

fn parse_trace(lines: &[&str]) -> Vec<TraceEntry> {
    lines.iter().map(|l| serde_json::from_str(l).unwrap()).collect()
}

fn service(clock: &ManualClock) -> MonitorService<ManualClock> {
    MonitorService::new(
        SUBJECT,
        MonitorConfig::default(),
        SubjectProfile::default(),
        clock.clone(),
    )
}

#[test]
fn trace_commands_deserialise() {
    let entries = parse_trace(&[
        r#"{"t_ms": 0, "command": {"cmd": "set_activity", "activity": "light"}}"#,
        r#"{"t_ms": 10, "command": {"cmd": "characteristic", "uuid": 10807, "payload": [0, 72]}}"#,
        r#"{"t_ms": 20, "command": {"cmd": "accelerometer", "x": 0.0, "y": 0.0, "z": 9.8, "timestamp_ms": 20}}"#,
        r#"{"t_ms": 30, "command": {"cmd": "manual_sos"}}"#,
        r#"{"t_ms": 40, "command": {"cmd": "respond", "alert_id": 1, "contact": null, "reply": "im_ok"}}"#,
        r#"{"t_ms": 50, "command": {"cmd": "cancel", "alert_id": 1}}"#,
    ]);
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[3].t_ms, 30);
}

#[test]
fn replayed_sos_escalates_through_every_contact() {
    let clock = ManualClock::new(0);
    let mut svc = service(&clock);
    let mut ports = MockPorts::with_family(SUBJECT);
    let mut sink = RecordingSink::new();

    let entries = parse_trace(&[r#"{"t_ms": 5000, "command": {"cmd": "manual_sos"}}"#]);
    let stats = replay(&mut svc, &clock, entries, 300_000, &mut ports, &mut sink);

    assert_eq!(stats.commands, 1);
    assert_eq!(stats.rejected, 0);
    assert_eq!(stats.end_ms, 305_000);
    assert_eq!(ports.sent_to(), vec![ContactId(10), ContactId(20), ContactId(30)]);
    let times: Vec<u64> = ports.contacted.iter().map(|(_, t)| *t).collect();
    assert_eq!(times, vec![65_000, 125_000, 185_000]);

    let closed: Vec<AlertStatus> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::AlertClosed { status, .. } => Some(*status),
            _ => None,
        })
        .collect();
    assert_eq!(closed, vec![AlertStatus::Escalated]);
}

#[test]
fn replayed_acknowledgement_stops_after_first_contact() {
    let clock = ManualClock::new(0);
    let mut svc = service(&clock);
    let mut ports = MockPorts::with_family(SUBJECT);
    let mut sink = RecordingSink::new();

    let entries = parse_trace(&[
        r#"{"t_ms": 0, "command": {"cmd": "manual_sos"}}"#,
        r#"{"t_ms": 90000, "command": {"cmd": "respond", "alert_id": 1, "contact": 10, "reply": "acknowledged"}}"#,
    ]);
    let stats = replay(&mut svc, &clock, entries, 600_000, &mut ports, &mut sink);

    assert_eq!(stats.rejected, 0);
    assert_eq!(ports.sent_to(), vec![ContactId(10)]);
    assert_eq!(ports.responded, vec![ContactId(10)]);
    assert_eq!(svc.active_alert(), None);
    assert_eq!(svc.metrics().alerts_resolved, 1);
}

#[test]
fn out_of_order_entries_apply_at_current_time() {
    let clock = ManualClock::new(0);
    let mut svc = service(&clock);
    let mut ports = MockPorts::new();
    let mut sink = RecordingSink::new();

    let entries = parse_trace(&[
        r#"{"t_ms": 1000, "command": {"cmd": "set_activity", "activity": "rest"}}"#,
        r#"{"t_ms": 500, "command": {"cmd": "manual_sos"}}"#,
    ]);
    let stats = replay(&mut svc, &clock, entries, 0, &mut ports, &mut sink);

    assert_eq!(stats.out_of_order, 1);
    let id = svc.active_alert().unwrap();
    assert_eq!(svc.escalation().alert(id).unwrap().triggered_at_ms, 1000);
}

#[test]
fn advance_fires_deadlines_in_order() {
    let clock = ManualClock::new(0);
    let mut svc = service(&clock);
    let mut ports = MockPorts::with_family(SUBJECT);
    let mut sink = RecordingSink::new();

    svc.handle_command(vitalguard::app::commands::AppCommand::ManualSos, &mut ports, &mut sink)
        .unwrap();
    assert_eq!(svc.next_deadline(), Some(60_000));
    let ticks = advance_to(&mut svc, &clock, 150_000, &mut ports, &mut sink);
    assert_eq!(ticks, 3);
    assert_eq!(ports.sent_to(), vec![ContactId(10), ContactId(20)]);
    assert_eq!(svc.next_deadline(), Some(180_000));
}

#[test]
fn host_adapters_log_every_alert_transition() {
    let clock = ManualClock::new(0);
    let mut svc = service(&clock);
    let book = ContactBook::from_json(
        r#"[{ "subject": 1, "contacts": [
            { "id": 7, "name": "Dee", "phone": "555 0107", "priority": 1 },
            { "id": 8, "name": "Eli", "phone": "", "priority": 2 }
        ] }]"#,
    )
    .unwrap();
    let mut ports = LocalPorts::new(book, RecordLog::new(Vec::new()));
    let mut sink = RecordingSink::new();

    let entries = parse_trace(&[r#"{"t_ms": 0, "command": {"cmd": "manual_sos"}}"#]);
    replay(&mut svc, &clock, entries, 200_000, &mut ports, &mut sink);

    assert_eq!(ports.notifier.sent(), 1);
    assert_eq!(ports.notifier.failed(), 1);
    assert_eq!(ports.alarm.sounding(), None);
    assert_eq!(ports.contacts.get(ContactId(8)).unwrap().last_contacted_at_ms, Some(120_000));

    let bytes = ports.store.into_inner();
    let records = read_records(bytes.as_slice()).unwrap();
    let statuses: Vec<(AlertType, AlertStatus)> = records
        .iter()
        .filter_map(|r| match r {
            Record::Alert(a) => Some((a.alert_type, a.status)),
            Record::Reading(_) => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            (AlertType::ManualSos, AlertStatus::Active),
            (AlertType::ManualSos, AlertStatus::Escalated),
        ]
    );
}
