//! Fuzz target: `read_records`
//!
//! Reads an arbitrary byte stream as a persisted record log.  Corrupt
//! frames and undecodable records must be skipped, never panic.
//!
//! cargo fuzz run fuzz_record_log

#![no_main]

use libfuzzer_sys::fuzz_target;
use vitalguard::adapters::record_log::read_records;

fuzz_target!(|data: &[u8]| {
    let _ = read_records(data);
});
