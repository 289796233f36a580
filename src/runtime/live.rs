//! Live runtime loop.
//!
//! Runs on the calling thread using `edge-executor` for cooperative
//! scheduling and `async-io-mini` timers (no busy-spinning).  The timers
//! run on the `embassy-time` std driver, which wakes them from its own
//! alarm thread.  Two
//! concurrent futures share the service through a `RefCell`:
//!
//! 1. **Commands**: truly async via `CommandChannel::receive().await`
//! 2. **Tick**: fires fall and escalation timers every `tick_interval_ms`
//!
//! The executor runs until the shutdown signal is raised; commands still
//! queued at that point are processed before returning.

use core::cell::RefCell;
use core::time::Duration;

use log::{info, warn};

use crate::app::ports::{Clock, EventSink, ServicePorts};
use crate::app::service::MonitorService;

use super::channels::{CommandChannel, ShutdownSignal};

/// Everything the runtime loop mutates.
pub struct Runtime<C: Clock, P: ServicePorts, S: EventSink> {
    pub service: MonitorService<C>,
    pub ports: P,
    pub sink: S,
}

impl<C: Clock, P: ServicePorts, S: EventSink> Runtime<C, P, S> {
    pub fn new(service: MonitorService<C>, ports: P, sink: S) -> Self {
        Self {
            service,
            ports,
            sink,
        }
    }

    fn handle(&mut self, cmd: crate::app::commands::AppCommand) {
        let Self {
            service,
            ports,
            sink,
        } = self;
        if let Err(e) = service.handle_command(cmd, ports, sink) {
            warn!("Runtime: command rejected: {}", e);
        }
    }

    fn tick(&mut self) {
        let Self {
            service,
            ports,
            sink,
        } = self;
        service.tick(ports, sink);
    }
}

async fn command_loop<C, P, S>(rt: &RefCell<Runtime<C, P, S>>, inbox: &CommandChannel)
where
    C: Clock,
    P: ServicePorts,
    S: EventSink,
{
    loop {
        let cmd = inbox.receive().await;
        rt.borrow_mut().handle(cmd);
    }
}

async fn tick_loop<C, P, S>(rt: &RefCell<Runtime<C, P, S>>, period: Duration)
where
    C: Clock,
    P: ServicePorts,
    S: EventSink,
{
    loop {
        async_io_mini::Timer::after(period).await;
        rt.borrow_mut().tick();
    }
}

/// Drive `rt` until `shutdown` is signalled.
pub fn run<C, P, S>(rt: &RefCell<Runtime<C, P, S>>, inbox: &CommandChannel, shutdown: &ShutdownSignal)
where
    C: Clock,
    P: ServicePorts,
    S: EventSink,
{
    let period = Duration::from_millis(rt.borrow().service.config().tick_interval_ms);
    {
        let mut guard = rt.borrow_mut();
        let Runtime { service, sink, .. } = &mut *guard;
        service.start(sink);
    }

    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    executor.spawn(command_loop(rt, inbox)).detach();
    executor.spawn(tick_loop(rt, period)).detach();

    info!("Runtime started (tick every {} ms)", period.as_millis());
    futures_lite::future::block_on(executor.run(shutdown.wait()));
    drop(executor);

    let mut drained = 0usize;
    while let Ok(cmd) = inbox.try_receive() {
        rt.borrow_mut().handle(cmd);
        drained += 1;
    }
    rt.borrow_mut().tick();
    info!("Runtime stopped ({} queued commands drained)", drained);
}
