//! Emergency escalation: alerts, contacts, message text and the
//! single-flight notification protocol.

pub mod alert;
pub mod contacts;
pub mod message;
pub mod orchestrator;

pub use alert::{AlertContext, AlertId, AlertStatus, AlertType, ContactId, EmergencyAlert, Location, SubjectId};
pub use contacts::EmergencyContact;
pub use orchestrator::{EscalationEvent, EscalationOrchestrator, Responder, ResponseKind};
