//! Deterministic trace replay.
//!
//! Feeds timestamped commands to a service running on a [`ManualClock`].
//! Between commands the clock jumps straight to each pending timer
//! deadline, so a 60 s escalation window replays instantly but fires in
//! exactly the order it would live.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::adapters::time::ManualClock;
use crate::app::commands::AppCommand;
use crate::app::ports::{Clock, EventSink, ServicePorts};
use crate::app::service::MonitorService;

/// One line of a replay trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Milliseconds since the start of the trace.
    pub t_ms: u64,
    pub command: AppCommand,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayStats {
    pub commands: u64,
    pub rejected: u64,
    pub ticks: u64,
    pub out_of_order: u64,
    pub end_ms: u64,
}

/// Step `clock` to `target_ms`, firing every deadline on the way.
pub fn advance_to(
    service: &mut MonitorService<ManualClock>,
    clock: &ManualClock,
    target_ms: u64,
    ports: &mut impl ServicePorts,
    sink: &mut impl EventSink,
) -> u64 {
    let mut ticks = 0;
    loop {
        let due = match service.next_deadline() {
            Some(d) if d <= target_ms => d,
            _ => break,
        };
        clock.set(due);
        service.tick(ports, sink);
        ticks += 1;
    }
    clock.set(target_ms);
    service.tick(ports, sink);
    ticks + 1
}

/// Replay `entries`, then keep time running for `settle_ms` past the
/// last one so open escalations play out.
pub fn replay<I>(
    service: &mut MonitorService<ManualClock>,
    clock: &ManualClock,
    entries: I,
    settle_ms: u64,
    ports: &mut impl ServicePorts,
    sink: &mut impl EventSink,
) -> ReplayStats
where
    I: IntoIterator<Item = TraceEntry>,
{
    let mut stats = ReplayStats::default();
    service.start(sink);

    for entry in entries {
        if entry.t_ms < clock.now_ms() {
            stats.out_of_order += 1;
            warn!(
                "Replay: entry at {} ms is behind the clock ({} ms), applying now",
                entry.t_ms,
                clock.now_ms()
            );
        } else {
            stats.ticks += advance_to(service, clock, entry.t_ms, ports, sink);
        }

        stats.commands += 1;
        if let Err(e) = service.handle_command(entry.command, ports, sink) {
            debug!("Replay: command at {} ms rejected: {}", entry.t_ms, e);
            stats.rejected += 1;
        }
    }

    let end = clock.now_ms().saturating_add(settle_ms);
    stats.ticks += advance_to(service, clock, end, ports, sink);
    stats.end_ms = clock.now_ms();
    stats
}
