//! Host port bundle.
//!
//! [`LocalPorts`] wires one adapter per driven port into the single
//! `&mut` value [`MonitorService`](crate::app::service::MonitorService)
//! expects.

use crate::app::ports::{AlarmPort, ContactDirectory, NotificationSink, PersistenceSink, Record};
use crate::error::{NotifyError, StorageError};
use crate::escalation::{AlertId, ContactId, EmergencyAlert, EmergencyContact, SubjectId};

use super::console::{ConsoleAlarm, ConsoleNotifier};
use super::contact_book::ContactBook;

pub struct LocalPorts<S: PersistenceSink> {
    pub contacts: ContactBook,
    pub notifier: ConsoleNotifier,
    pub alarm: ConsoleAlarm,
    pub store: S,
}

impl<S: PersistenceSink> LocalPorts<S> {
    pub fn new(contacts: ContactBook, store: S) -> Self {
        Self {
            contacts,
            notifier: ConsoleNotifier::new(),
            alarm: ConsoleAlarm::new(),
            store,
        }
    }
}

impl<S: PersistenceSink> ContactDirectory for LocalPorts<S> {
    fn contacts(&self, subject: SubjectId) -> Vec<EmergencyContact> {
        self.contacts.contacts(subject)
    }

    fn mark_contacted(&mut self, contact: ContactId, at_ms: u64) {
        self.contacts.mark_contacted(contact, at_ms);
    }

    fn mark_responded(&mut self, contact: ContactId) {
        self.contacts.mark_responded(contact);
    }
}

impl<S: PersistenceSink> NotificationSink for LocalPorts<S> {
    fn send(
        &mut self,
        contact: &EmergencyContact,
        alert: &EmergencyAlert,
        message: &str,
    ) -> Result<(), NotifyError> {
        self.notifier.send(contact, alert, message)
    }
}

impl<S: PersistenceSink> AlarmPort for LocalPorts<S> {
    fn sound(&mut self, alert: &EmergencyAlert) {
        self.alarm.sound(alert);
    }

    fn silence(&mut self, alert: AlertId) {
        self.alarm.silence(alert);
    }
}

impl<S: PersistenceSink> PersistenceSink for LocalPorts<S> {
    fn store(&mut self, record: &Record) -> Result<(), StorageError> {
        self.store.store(record)
    }
}

/// Discards every record.
#[derive(Default)]
pub struct NullStore;

impl PersistenceSink for NullStore {
    fn store(&mut self, _record: &Record) -> Result<(), StorageError> {
        Ok(())
    }
}
