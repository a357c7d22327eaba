//! Service adapters: network, filesystem and runtime implementations.

pub mod archive;
pub mod generation;
pub mod project_dir;
pub mod runtime;
pub mod settings;

pub use archive::{archive_file_name, export_project, write_archive, ArchiveError};
pub use generation::{parse_project_payload, HttpGenerator};
pub use project_dir::load_project_dir;
pub use runtime::AsyncRuntime;
pub use settings::{
    ensure_log_dir, ensure_settings_file, get_log_dir, get_settings_path, load_settings,
    SettingsError,
};
