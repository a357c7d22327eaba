//! promptbench - headless core of a prompt-driven coding workspace
//!
//! Module layout:
//! - models: virtual file tree (FileTree, FileNode, FileMap)
//! - kernel: state/action/effect store, editor tabs, console log, importer, preview synthesis
//! - kernel::services: ports (contracts) and adapters (HTTP generation, ZIP export, settings, runtime)
//! - app: session that runs store effects on the async runtime
//! - logging: tracing subscriber setup

pub mod app;
pub mod kernel;
pub mod logging;
pub mod models;
