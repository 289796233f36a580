//! Unified error types for the VitalGuard core.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! service's error handling uniform.  Most variants are `Copy` so they can
//! be passed through the ingestion path without allocation.

use core::fmt;

use crate::escalation::alert::AlertId;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor payload could not be decoded.
    Decode(DecodeError),
    /// The escalation protocol refused a request.
    Escalation(EscalationError),
    /// A notification could not be delivered.
    Notify(NotifyError),
    /// The persistence sink failed.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Escalation(e) => write!(f, "escalation: {e}"),
            Self::Notify(e) => write!(f, "notify: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// Failure to turn a characteristic payload into a value.
///
/// Never fatal: the caller drops the sample and waits for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the flags byte announces.
    Truncated,
    /// Bytes are present but encode an unusable value (NaN, out of range).
    Malformed,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated => write!(f, "payload truncated"),
            Self::Malformed => write!(f, "payload malformed"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Escalation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationError {
    /// The subject already has an active alert.  The running protocol is untouched.
    AlreadyActive { alert_id: AlertId },
    /// No alert with the given id is known.
    UnknownAlert,
    /// Every timer slot is taken by running protocols.
    Capacity,
}

impl fmt::Display for EscalationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyActive { alert_id } => write!(f, "alert {alert_id} already active"),
            Self::UnknownAlert => write!(f, "unknown alert"),
            Self::Capacity => write!(f, "too many concurrent alerts"),
        }
    }
}

impl std::error::Error for EscalationError {}

impl From<EscalationError> for Error {
    fn from(e: EscalationError) -> Self {
        Self::Escalation(e)
    }
}

// ---------------------------------------------------------------------------
// Notification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyError {
    /// The transport rejected the destination (bad number, unknown device).
    InvalidDestination,
    /// The transport is down or timed out.
    Unavailable,
    /// The transport refused the message for policy reasons.
    Rejected,
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDestination => write!(f, "invalid destination"),
            Self::Unavailable => write!(f, "transport unavailable"),
            Self::Rejected => write!(f, "message rejected"),
        }
    }
}

impl std::error::Error for NotifyError {}

impl From<NotifyError> for Error {
    fn from(e: NotifyError) -> Self {
        Self::Notify(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store is full.
    Full,
    /// The record could not be serialised.
    Encoding,
    /// Generic I/O error from the backend.
    Io,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "storage full"),
            Self::Encoding => write!(f, "record encoding failed"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No stored config found (first run).
    NotFound,
    /// Stored config failed deserialisation.
    Corrupted,
    /// A field failed range validation.  The message names the field.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    Io,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
