//! Escalation orchestrator.
//!
//! Runs one notification protocol per subject:
//!
//! ```text
//!  trigger ──▶ sound alarm ──[60 s]──▶ contact #1 ──[60 s]──▶ contact #2 ... ──▶ Escalated
//!                  │                       │                      │
//!                  └──── any response or cancel ends the run ─────┘
//! ```
//!
//! The orchestrator owns every alert and every pending wait.  It never
//! sleeps; the runtime calls [`EscalationOrchestrator::tick`] with the
//! current time and expired waits advance the protocol.  Responses and
//! cancels race against those waits: each one checks the alert is still
//! `Active` before writing, and removing a run disarms its timer, so a
//! wait that expires after the run ended finds nothing to act on.

use std::collections::{BTreeMap, HashMap, VecDeque};

use log::{debug, error, info, warn};

use super::alert::{AlertContext, AlertId, AlertStatus, AlertType, ContactId, EmergencyAlert, SubjectId};
use super::contacts::{EmergencyContact, escalation_order};
use super::message::compose;
use crate::app::ports::{AlarmPort, ContactDirectory, NotificationSink};
use crate::config::MonitorConfig;
use crate::error::EscalationError;
use crate::timer::{TimerHandle, TimerQueue};

/// Subjects that may have a protocol running at the same time.
pub const MAX_ACTIVE_ALERTS: usize = 16;

/// Who answered an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Responder {
    Subject,
    Contact(ContactId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    ImOk,
    Acknowledged,
    FalseAlarm,
}

impl ResponseKind {
    fn outcome(self) -> AlertStatus {
        match self {
            Self::ImOk | Self::Acknowledged => AlertStatus::Resolved,
            Self::FalseAlarm => AlertStatus::Cancelled,
        }
    }
}

/// Progress reported to the service, drained after every call.
#[derive(Debug, Clone, PartialEq)]
pub enum EscalationEvent {
    Triggered(EmergencyAlert),
    ContactNotified {
        alert_id: AlertId,
        contact: ContactId,
        delivered: bool,
    },
    /// The alert reached a terminal status.  Carries the final record.
    Closed(EmergencyAlert),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitSubject,
    AwaitContact(ContactId),
}

struct Run {
    alert_id: AlertId,
    phase: Phase,
    /// Snapshot taken when the subject phase expired, in escalation order.
    contacts: Vec<EmergencyContact>,
    next: usize,
    timer: Option<TimerHandle>,
}

pub struct EscalationOrchestrator {
    subject_timeout_ms: u64,
    contact_timeout_ms: u64,
    retained_terminal: usize,
    next_id: u32,
    alerts: BTreeMap<AlertId, EmergencyAlert>,
    runs: HashMap<SubjectId, Run>,
    terminal: VecDeque<AlertId>,
    timers: TimerQueue<SubjectId, MAX_ACTIVE_ALERTS>,
    outbox: Vec<EscalationEvent>,
    notify_failures: u64,
}

impl EscalationOrchestrator {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            subject_timeout_ms: config.subject_response_timeout_ms,
            contact_timeout_ms: config.contact_response_timeout_ms,
            retained_terminal: config.retained_terminal_alerts,
            next_id: 1,
            alerts: BTreeMap::new(),
            runs: HashMap::new(),
            terminal: VecDeque::new(),
            timers: TimerQueue::new(),
            outbox: Vec::new(),
            notify_failures: 0,
        }
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Start a protocol for `subject`.  Rejected while one is running.
    pub fn trigger(
        &mut self,
        subject: SubjectId,
        alert_type: AlertType,
        context: AlertContext,
        now_ms: u64,
        alarm: &mut impl AlarmPort,
    ) -> Result<AlertId, EscalationError> {
        if let Some(run) = self.runs.get(&subject) {
            info!(
                "Escalation: {} trigger for {} folded into running {}",
                alert_type.as_str(),
                subject,
                run.alert_id
            );
            return Err(EscalationError::AlreadyActive {
                alert_id: run.alert_id,
            });
        }
        let timer = self
            .timers
            .schedule(now_ms, self.subject_timeout_ms, subject)
            .ok_or(EscalationError::Capacity)?;

        let id = AlertId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1).max(1);
        let alert = EmergencyAlert::new(id, subject, alert_type, context, now_ms);

        warn!("Escalation: {} {} for {}, waiting on subject", id, alert_type.as_str(), subject);
        alarm.sound(&alert);

        self.outbox.push(EscalationEvent::Triggered(alert.clone()));
        self.alerts.insert(id, alert);
        self.runs.insert(
            subject,
            Run {
                alert_id: id,
                phase: Phase::AwaitSubject,
                contacts: Vec::new(),
                next: 0,
                timer: Some(timer),
            },
        );
        Ok(id)
    }

    /// Apply a response.  `Ok(false)` if the alert was already terminal.
    pub fn respond<P>(
        &mut self,
        alert_id: AlertId,
        responder: Responder,
        kind: ResponseKind,
        now_ms: u64,
        ports: &mut P,
    ) -> Result<bool, EscalationError>
    where
        P: ContactDirectory + AlarmPort,
    {
        let Some(alert) = self.lookup(alert_id)? else {
            debug!("Escalation: late response to retired {} ignored", alert_id);
            return Ok(false);
        };
        if !alert.transition(kind.outcome(), now_ms) {
            debug!("Escalation: late response to {} ignored", alert_id);
            return Ok(false);
        }
        alert.response_received = true;
        let subject = alert.subject;
        info!(
            "Escalation: {} {} by {:?} ({:?})",
            alert_id,
            alert.status.as_str(),
            responder,
            kind
        );

        if let Responder::Contact(contact) = responder {
            ports.mark_responded(contact);
            if let Some(c) = self
                .runs
                .get_mut(&subject)
                .and_then(|r| r.contacts.iter_mut().find(|c| c.id == contact))
            {
                c.response_received = true;
            }
        }
        self.finish(subject, alert_id, ports);
        Ok(true)
    }

    /// Cancel an alert.  `Ok(false)` if it was already terminal.
    pub fn cancel(
        &mut self,
        alert_id: AlertId,
        now_ms: u64,
        alarm: &mut impl AlarmPort,
    ) -> Result<bool, EscalationError> {
        let Some(alert) = self.lookup(alert_id)? else {
            debug!("Escalation: cancel of retired {} is a no-op", alert_id);
            return Ok(false);
        };
        if !alert.transition(AlertStatus::Cancelled, now_ms) {
            debug!("Escalation: cancel of terminal {} is a no-op", alert_id);
            return Ok(false);
        }
        let subject = alert.subject;
        info!("Escalation: {} cancelled", alert_id);
        self.finish(subject, alert_id, alarm);
        Ok(true)
    }

    /// Advance every protocol whose wait has expired by `now_ms`.
    pub fn tick<P>(&mut self, now_ms: u64, ports: &mut P)
    where
        P: ContactDirectory + NotificationSink + AlarmPort,
    {
        while let Some((handle, subject)) = self.timers.pop_expired(now_ms) {
            let current = self.runs.get(&subject).and_then(|r| r.timer);
            if current != Some(handle) {
                debug!("Escalation: stale wait for {} ignored", subject);
                continue;
            }
            self.advance(subject, now_ms, ports);
        }
    }

    /// Take the events produced since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, EscalationEvent> {
        self.outbox.drain(..)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn alert(&self, id: AlertId) -> Option<&EmergencyAlert> {
        self.alerts.get(&id)
    }

    pub fn active_alert(&self, subject: SubjectId) -> Option<AlertId> {
        self.runs.get(&subject).map(|r| r.alert_id)
    }

    pub fn active_count(&self) -> usize {
        self.runs.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn notify_failures(&self) -> u64 {
        self.notify_failures
    }

    // ── Internal ──────────────────────────────────────────────

    /// `Ok(None)` for an issued alert whose record was already evicted.
    /// Evicted alerts were terminal, so callers treat them as such.
    fn lookup(&mut self, id: AlertId) -> Result<Option<&mut EmergencyAlert>, EscalationError> {
        if id.0 == 0 || id.0 >= self.next_id {
            return Err(EscalationError::UnknownAlert);
        }
        Ok(self.alerts.get_mut(&id))
    }

    fn advance<P>(&mut self, subject: SubjectId, now_ms: u64, ports: &mut P)
    where
        P: ContactDirectory + NotificationSink + AlarmPort,
    {
        let Some(run) = self.runs.get_mut(&subject) else {
            return;
        };
        run.timer = None;
        let alert_id = run.alert_id;

        let Some(alert) = self.alerts.get_mut(&alert_id) else {
            error!("Escalation: run for {} lost its alert {}", subject, alert_id);
            self.runs.remove(&subject);
            return;
        };
        if !alert.is_active() {
            return;
        }

        if run.phase == Phase::AwaitSubject {
            let mut contacts = ports.contacts(subject);
            let order = escalation_order(&contacts);
            contacts.retain(|c| c.is_active);
            contacts.sort_by_key(|c| order.iter().position(|id| *id == c.id));
            info!(
                "Escalation: {} unanswered by subject, {} active contact(s)",
                alert_id,
                contacts.len()
            );
            run.contacts = contacts;
        }

        let Some(contact) = run.contacts.get_mut(run.next) else {
            alert.transition(AlertStatus::Escalated, now_ms);
            warn!(
                "Escalation: {} escalated after {} contact(s)",
                alert_id,
                alert.contacts_notified.len()
            );
            self.finish(subject, alert_id, ports);
            return;
        };
        run.next += 1;

        let message = compose(alert);
        let delivered = match ports.send(contact, alert, &message) {
            Ok(()) => {
                info!("Escalation: {} notified {} ({})", alert_id, contact.id, contact.name);
                true
            }
            Err(e) => {
                warn!("Escalation: {} notify {} failed: {}", alert_id, contact.id, e);
                self.notify_failures += 1;
                false
            }
        };
        alert.record_notified(contact.id);
        contact.last_contacted_at_ms = Some(now_ms);
        ports.mark_contacted(contact.id, now_ms);
        run.phase = Phase::AwaitContact(contact.id);
        self.outbox.push(EscalationEvent::ContactNotified {
            alert_id,
            contact: contact.id,
            delivered,
        });

        // The expired wait just freed its slot.
        run.timer = self.timers.schedule(now_ms, self.contact_timeout_ms, subject);
        if run.timer.is_none() {
            error!("Escalation: no timer slot for {}, escalating now", alert_id);
            alert.transition(AlertStatus::Escalated, now_ms);
            self.finish(subject, alert_id, ports);
        }
    }

    /// Tear down the run of a terminal alert and retain its record.
    fn finish(&mut self, subject: SubjectId, alert_id: AlertId, alarm: &mut impl AlarmPort) {
        if let Some(handle) = self.runs.remove(&subject).and_then(|r| r.timer) {
            self.timers.cancel(handle);
        }
        alarm.silence(alert_id);

        if let Some(alert) = self.alerts.get(&alert_id) {
            self.outbox.push(EscalationEvent::Closed(alert.clone()));
        }

        self.terminal.push_back(alert_id);
        while self.terminal.len() > self.retained_terminal {
            if let Some(old) = self.terminal.pop_front() {
                self.alerts.remove(&old);
            }
        }
    }
}
