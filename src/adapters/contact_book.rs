//! In-memory contact directory, optionally seeded from a JSON file.
//!
//! File layout:
//! ```json
//! [
//!   { "subject": 1, "contacts": [
//!       { "id": 10, "name": "Ana", "phone": "555-0100", "priority": 1 }
//!   ] }
//! ]
//! ```
//!
//! Contact ids are unique across subjects; `mark_*` looks them up
//! globally.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::ContactDirectory;
use crate::error::StorageError;
use crate::escalation::{ContactId, EmergencyContact, SubjectId};

#[derive(Debug, Serialize, Deserialize)]
struct SubjectContacts {
    subject: SubjectId,
    contacts: Vec<EmergencyContact>,
}

#[derive(Debug, Default)]
pub struct ContactBook {
    by_subject: HashMap<SubjectId, Vec<EmergencyContact>>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, StorageError> {
        let entries: Vec<SubjectContacts> = serde_json::from_str(text).map_err(|e| {
            warn!("Contacts: invalid JSON: {}", e);
            StorageError::Encoding
        })?;
        let mut book = Self::new();
        for entry in entries {
            for contact in entry.contacts {
                book.add(entry.subject, contact);
            }
        }
        Ok(book)
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            warn!("Contacts: reading {} failed: {}", path.display(), e);
            StorageError::Io
        })?;
        let book = Self::from_json(&text)?;
        info!(
            "Contacts: {} contacts for {} subjects from {}",
            book.len(),
            book.by_subject.len(),
            path.display()
        );
        Ok(book)
    }

    /// Add or replace (by id) a contact for `subject`.
    pub fn add(&mut self, subject: SubjectId, contact: EmergencyContact) {
        let list = self.by_subject.entry(subject).or_default();
        if let Some(existing) = list.iter_mut().find(|c| c.id == contact.id) {
            *existing = contact;
        } else {
            list.push(contact);
        }
    }

    pub fn set_active(&mut self, contact: ContactId, active: bool) -> bool {
        match self.find_mut(contact) {
            Some(c) => {
                c.is_active = active;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, contact: ContactId) -> Option<&EmergencyContact> {
        self.by_subject.values().flatten().find(|c| c.id == contact)
    }

    pub fn len(&self) -> usize {
        self.by_subject.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_mut(&mut self, contact: ContactId) -> Option<&mut EmergencyContact> {
        self.by_subject
            .values_mut()
            .flatten()
            .find(|c| c.id == contact)
    }
}

impl ContactDirectory for ContactBook {
    fn contacts(&self, subject: SubjectId) -> Vec<EmergencyContact> {
        self.by_subject.get(&subject).cloned().unwrap_or_default()
    }

    fn mark_contacted(&mut self, contact: ContactId, at_ms: u64) {
        match self.find_mut(contact) {
            Some(c) => c.last_contacted_at_ms = Some(at_ms),
            None => debug!("Contacts: mark_contacted for unknown {}", contact),
        }
    }

    fn mark_responded(&mut self, contact: ContactId) {
        match self.find_mut(contact) {
            Some(c) => c.response_received = true,
            None => debug!("Contacts: mark_responded for unknown {}", contact),
        }
    }
}
