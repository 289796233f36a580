//! Mock port adapters for integration tests.
//!
//! Records every outbound call so tests can assert on the full
//! notification and storage history without a network or disk.

use std::collections::HashMap;

use vitalguard::app::events::AppEvent;
use vitalguard::app::ports::{
    AlarmPort, Clock, ContactDirectory, EventSink, NotificationSink, PersistenceSink, Record,
};
use vitalguard::error::{NotifyError, StorageError};
use vitalguard::escalation::{AlertId, ContactId, EmergencyAlert, EmergencyContact, SubjectId};

// ── Call records ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub contact: ContactId,
    pub alert: AlertId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlarmCall {
    Sound(AlertId),
    Silence(AlertId),
}

// ── MockPorts ─────────────────────────────────────────────────

pub struct MockPorts {
    pub contacts: HashMap<SubjectId, Vec<EmergencyContact>>,
    pub sent: Vec<Sent>,
    pub contacted: Vec<(ContactId, u64)>,
    pub responded: Vec<ContactId>,
    pub alarm: Vec<AlarmCall>,
    pub records: Vec<Record>,
    /// Contacts whose sends fail.
    pub unreachable: Vec<ContactId>,
    /// Make every `store` call fail.
    pub storage_down: bool,
}

#[allow(dead_code)]
impl MockPorts {
    pub fn new() -> Self {
        Self {
            contacts: HashMap::new(),
            sent: Vec::new(),
            contacted: Vec::new(),
            responded: Vec::new(),
            alarm: Vec::new(),
            records: Vec::new(),
            unreachable: Vec::new(),
            storage_down: false,
        }
    }

    /// Three contacts for `subject`, priorities 1..=3, ids 10/20/30.
    pub fn with_family(subject: SubjectId) -> Self {
        let mut p = Self::new();
        p.contacts.insert(
            subject,
            vec![
                EmergencyContact::new(20, "Ben", "555-0102", 2),
                EmergencyContact::new(30, "Cat", "555-0103", 3),
                EmergencyContact::new(10, "Ana", "555-0101", 1),
            ],
        );
        p
    }

    pub fn sent_to(&self) -> Vec<ContactId> {
        self.sent.iter().map(|s| s.contact).collect()
    }

    pub fn alerts_stored(&self) -> Vec<&EmergencyAlert> {
        self.records
            .iter()
            .filter_map(|r| match r {
                Record::Alert(a) => Some(a),
                Record::Reading(_) => None,
            })
            .collect()
    }

    pub fn readings_stored(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, Record::Reading(_)))
            .count()
    }

    pub fn is_sounding(&self) -> bool {
        matches!(self.alarm.last(), Some(AlarmCall::Sound(_)))
    }
}

impl Default for MockPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactDirectory for MockPorts {
    fn contacts(&self, subject: SubjectId) -> Vec<EmergencyContact> {
        self.contacts.get(&subject).cloned().unwrap_or_default()
    }

    fn mark_contacted(&mut self, contact: ContactId, at_ms: u64) {
        self.contacted.push((contact, at_ms));
    }

    fn mark_responded(&mut self, contact: ContactId) {
        self.responded.push(contact);
    }
}

impl NotificationSink for MockPorts {
    fn send(
        &mut self,
        contact: &EmergencyContact,
        alert: &EmergencyAlert,
        message: &str,
    ) -> Result<(), NotifyError> {
        if self.unreachable.contains(&contact.id) {
            return Err(NotifyError::Unavailable);
        }
        self.sent.push(Sent {
            contact: contact.id,
            alert: alert.id,
            message: message.to_owned(),
        });
        Ok(())
    }
}

impl AlarmPort for MockPorts {
    fn sound(&mut self, alert: &EmergencyAlert) {
        self.alarm.push(AlarmCall::Sound(alert.id));
    }

    fn silence(&mut self, alert: AlertId) {
        self.alarm.push(AlarmCall::Silence(alert));
    }
}

impl PersistenceSink for MockPorts {
    fn store(&mut self, record: &Record) -> Result<(), StorageError> {
        if self.storage_down {
            return Err(StorageError::Io);
        }
        self.records.push(record.clone());
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub use vitalguard::adapters::time::ManualClock;

#[allow(dead_code)]
pub fn now(clock: &ManualClock) -> u64 {
    clock.now_ms()
}
