//! Application core: pure domain orchestration, zero I/O.
//!
//! Wires telemetry decoding, risk classification, fall detection, the
//! critical-vitals screen and emergency escalation for one subject.
//! All interaction with the outside world happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without devices, networks or files.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
