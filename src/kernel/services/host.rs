use std::future::Future;
use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use super::bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
use super::ports::AsyncExecutor;

/// Owns the bus receiver and hands out contexts that background tasks report through.
pub struct KernelServiceHost {
    bus: KernelBusSender,
    rx: KernelBusReceiver,
    executor: Arc<dyn AsyncExecutor>,
}

#[derive(Clone)]
pub struct KernelServiceContext {
    bus: KernelBusSender,
    executor: Arc<dyn AsyncExecutor>,
}

impl KernelServiceHost {
    pub fn new(executor: Arc<dyn AsyncExecutor>) -> Self {
        let (bus, rx) = kernel_bus();
        Self { bus, rx, executor }
    }

    pub fn context(&self) -> KernelServiceContext {
        KernelServiceContext {
            bus: self.bus.clone(),
            executor: Arc::clone(&self.executor),
        }
    }

    pub fn try_recv(&mut self) -> Result<KernelMessage, TryRecvError> {
        self.rx.try_recv()
    }

    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<KernelMessage, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

impl KernelServiceContext {
    pub fn dispatch(&self, action: crate::kernel::Action) {
        if self.bus.send_action(action).is_err() {
            tracing::warn!("kernel bus closed, dropping action");
        }
    }

    pub fn spawn_future<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.executor.spawn(Box::pin(task));
    }
}
