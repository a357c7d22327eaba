//! Tokio-backed executor for the session's asynchronous effects.

use std::future::Future;
use std::io;

use crate::kernel::services::ports::{AsyncExecutor, BoxFuture};

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
}

impl AsyncRuntime {
    pub fn new() -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self { runtime })
    }

    /// Runs blocking work (file writes, archive packing) off the async workers.
    pub fn spawn_blocking<F, R>(&self, work: F, done: impl FnOnce(R) + Send + 'static)
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.runtime.spawn(async move {
            match tokio::task::spawn_blocking(work).await {
                Ok(result) => done(result),
                Err(e) => tracing::error!(error = %e, "blocking task failed"),
            }
        });
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl AsyncExecutor for AsyncRuntime {
    fn spawn(&self, task: BoxFuture) {
        self.runtime.spawn(task);
    }
}
