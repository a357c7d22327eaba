//! Tracing setup: a daily log file plus a line channel the CLI can mirror.
//!
//! Every formatted event goes to the file. The channel receives the same
//! lines tagged with their origin, so a caller that already renders the
//! workspace console can skip the entries mirrored under [`CONSOLE_TARGET`].

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::Metadata;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::kernel::services::adapters::ensure_log_dir;
use crate::kernel::CONSOLE_TARGET;

const LOG_FILE: &str = "promptbench.log";
const FALLBACK_FILTER: &str = "promptbench=info";

/// Where a mirrored line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSource {
    /// A workspace console entry.
    Console,
    /// Everything else the crate traces.
    Internal,
}

impl LineSource {
    fn of(meta: &Metadata<'_>) -> Self {
        if meta.target() == CONSOLE_TARGET {
            Self::Console
        } else {
            Self::Internal
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub source: LineSource,
    pub text: String,
}

pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
    lines: Option<Receiver<LogLine>>,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Hands out the mirrored lines once. Unread lines pile up in the channel,
    /// so only take this when something drains it.
    pub fn take_lines(&mut self) -> Option<Receiver<LogLine>> {
        self.lines.take()
    }
}

/// Buffers one formatted event and sends it line by line when dropped.
struct LineWriter {
    source: LineSource,
    buf: Vec<u8>,
    tx: Sender<LogLine>,
}

impl LineWriter {
    fn new(source: LineSource, tx: Sender<LogLine>) -> Self {
        Self {
            source,
            buf: Vec::with_capacity(256),
            tx,
        }
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf);
        for line in text.lines() {
            let _ = self.tx.send(LogLine {
                source: self.source,
                text: line.to_string(),
            });
        }
    }
}

/// Writes each event to `file` and to the tagged line channel.
#[derive(Clone)]
struct Tee<F> {
    file: F,
    tx: Sender<LogLine>,
}

struct TeeWriter<W> {
    file: W,
    lines: LineWriter,
}

impl<'a, F: MakeWriter<'a>> MakeWriter<'a> for Tee<F> {
    type Writer = TeeWriter<F::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        TeeWriter {
            file: self.file.make_writer(),
            lines: LineWriter::new(LineSource::Internal, self.tx.clone()),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        TeeWriter {
            file: self.file.make_writer_for(meta),
            lines: LineWriter::new(LineSource::of(meta), self.tx.clone()),
        }
    }
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.file.write(buf)?;
        let _ = self.lines.write_all(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.lines.flush()
    }
}

fn resolve_log_dir() -> Option<PathBuf> {
    ensure_log_dir()
        .or_else(|_| -> io::Result<PathBuf> {
            let dir = std::env::temp_dir().join("promptbench").join("logs");
            std::fs::create_dir_all(&dir)?;
            Ok(dir)
        })
        .ok()
}

/// `RUST_LOG` first, then the configured filter, then [`FALLBACK_FILTER`].
fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Installs the global subscriber.
///
/// Returns `None` if no log directory is writable or a subscriber is already set.
pub fn init(default_filter: &str) -> Option<LoggingGuard> {
    let log_dir = resolve_log_dir()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE);
    let (file, guard) = tracing_appender::non_blocking(file_appender);
    let (tx, lines) = mpsc::channel::<LogLine>();

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Tee { file, tx })
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        );

    if subscriber.try_init().is_err() {
        return None;
    }

    std::panic::set_hook(Box::new(|panic_info| {
        tracing::error!(panic = %panic_info, "panic");
    }));

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
        lines: Some(lines),
    })
}
