//! Runtime drivers around [`MonitorService`](crate::app::service::MonitorService).
//!
//! - [`live`]: async loop fed through [`channels`], wall-clock ticks.
//! - [`replay`]: deterministic, timer-by-timer replay on a manual clock.

pub mod channels;
pub mod live;
pub mod replay;
