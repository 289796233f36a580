//! Emergency contacts and escalation order.

use serde::{Deserialize, Serialize};

use super::alert::ContactId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub relationship: String,
    /// 1 is contacted first.
    pub priority: u8,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub last_contacted_at_ms: Option<u64>,
    #[serde(default)]
    pub response_received: bool,
}

fn default_active() -> bool {
    true
}

impl EmergencyContact {
    pub fn new(id: u32, name: &str, phone: &str, priority: u8) -> Self {
        Self {
            id: ContactId(id),
            name: name.to_owned(),
            phone: phone.to_owned(),
            relationship: String::new(),
            priority,
            is_active: true,
            last_contacted_at_ms: None,
            response_received: false,
        }
    }
}

/// Active contacts in ascending `(priority, id)` order.
pub fn escalation_order(contacts: &[EmergencyContact]) -> Vec<ContactId> {
    let mut active: Vec<&EmergencyContact> = contacts.iter().filter(|c| c.is_active).collect();
    active.sort_by_key(|c| (c.priority, c.id));
    active.into_iter().map(|c| c.id).collect()
}

/// Strip spaces and dashes, and assume a `+1` country code when none
/// is given.  Returns `None` for an empty number.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('+') {
        return Some(trimmed.to_owned());
    }
    let digits: String = trimmed.chars().filter(|c| *c != '-' && *c != ' ').collect();
    if digits.is_empty() {
        return None;
    }
    Some(format!("+1{digits}"))
}
