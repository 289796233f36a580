//! Inter-task channels.
//!
//! Uses `embassy-sync` bounded channels to bridge producer threads (the
//! sensor link, stdin reader, button handler) with the runtime loop.
//!
//! ```text
//! ┌──────────────┐  AppCommand  ┌──────────────┐
//! │  Producers   │────────────▶│ Runtime loop │
//! │  (threads)   │   Shutdown   │  (async)     │
//! │              │────────────▶│              │
//! └──────────────┘              └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::warn;

use crate::app::commands::AppCommand;

/// Channel depth for inbound commands.  Sized for one second of 50 Hz
/// accelerometer data plus vitals.
pub const COMMAND_DEPTH: usize = 64;

pub type CommandChannel = Channel<CriticalSectionRawMutex, AppCommand, COMMAND_DEPTH>;
pub type ShutdownSignal = Signal<CriticalSectionRawMutex, ()>;

/// Process-wide inbox used by the binary.
pub static COMMANDS: CommandChannel = Channel::new();

/// Raised once by whoever decides the runtime should stop.
pub static SHUTDOWN: ShutdownSignal = Signal::new();

/// Non-blocking enqueue.  Returns `false` (and logs) when the channel is full.
pub fn submit(channel: &CommandChannel, cmd: AppCommand) -> bool {
    if channel.try_send(cmd).is_err() {
        warn!("Runtime: command channel full, dropping command");
        return false;
    }
    true
}
