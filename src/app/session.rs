//! Workspace session: the store plus the runtime that carries out its effects.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::kernel::services::adapters::{export_project, AsyncRuntime};
use crate::kernel::services::ports::{AsyncExecutor, ProjectGenerator};
use crate::kernel::services::{KernelMessage, KernelServiceHost};
use crate::kernel::{Action, Effect, NotifyLevel, Store, WorkspaceState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NotifyLevel,
    pub message: String,
}

pub struct Session {
    store: Store,
    runtime: Arc<AsyncRuntime>,
    services: KernelServiceHost,
    generator: Arc<dyn ProjectGenerator>,
    export_dir: PathBuf,
    notices: Vec<Notice>,
    in_flight: usize,
}

impl Session {
    pub fn new(
        generator: Arc<dyn ProjectGenerator>,
        export_dir: impl Into<PathBuf>,
    ) -> std::io::Result<Self> {
        let runtime = Arc::new(AsyncRuntime::new()?);
        let executor: Arc<dyn AsyncExecutor> = runtime.clone();
        Ok(Self {
            store: Store::new(WorkspaceState::new()),
            runtime,
            services: KernelServiceHost::new(executor),
            generator,
            export_dir: export_dir.into(),
            notices: Vec::new(),
            in_flight: 0,
        })
    }

    pub fn state(&self) -> &WorkspaceState {
        self.store.state()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Number of generation or export tasks whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn dispatch(&mut self, action: Action) -> bool {
        if matches!(
            action,
            Action::GenerationFinished { .. } | Action::ExportFinished { .. }
        ) {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.run_effect(effect);
        }
        result.state_changed
    }

    /// Applies every completion already waiting on the bus.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.services.try_recv() {
                Ok(KernelMessage::Action(action)) => {
                    changed |= self.dispatch(action);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    /// Blocks until no task is in flight or `timeout` elapses. Returns `true` when idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.poll();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                tracing::warn!(in_flight = self.in_flight, "timed out waiting for tasks");
                return false;
            }
            match self.services.recv_timeout(remaining) {
                Ok(KernelMessage::Action(action)) => {
                    self.dispatch(action);
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::StartGeneration { request_id, prompt } => {
                self.in_flight += 1;
                let generator = Arc::clone(&self.generator);
                let ctx = self.services.context();
                let task_ctx = ctx.clone();
                ctx.spawn_future(async move {
                    let result = generator.generate(prompt).await;
                    task_ctx.dispatch(Action::GenerationFinished { request_id, result });
                });
            }
            Effect::ExportArchive {
                files,
                project_name,
            } => {
                self.in_flight += 1;
                let dir = self.export_dir.clone();
                let ctx = self.services.context();
                self.runtime.spawn_blocking(
                    move || export_project(&files, &dir, &project_name),
                    move |result| {
                        ctx.dispatch(Action::ExportFinished {
                            result: result.map_err(|e| e.to_string()),
                        });
                    },
                );
            }
            Effect::Notify { level, message } => {
                match level {
                    NotifyLevel::Error => tracing::warn!(%message, "notice"),
                    NotifyLevel::Info | NotifyLevel::Success => {
                        tracing::info!(%message, "notice")
                    }
                }
                self.notices.push(Notice { level, message });
            }
        }
    }
}
