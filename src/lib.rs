//! VitalGuard monitoring core.
//!
//! Decodes wearable telemetry, classifies vital-sign risk, detects falls
//! from accelerometer data and runs the emergency escalation protocol.
//! Everything is exposed for integration testing; the binary in
//! `main.rs` is a thin replay/live driver around [`app::service`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod escalation;
pub mod fall;
pub mod profile;
pub mod risk;
pub mod runtime;
pub mod safety;
pub mod telemetry;
pub mod timer;
