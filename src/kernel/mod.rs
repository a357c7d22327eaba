//! Headless workspace core (state/action/effect).

pub mod action;
pub mod console;
pub mod editor;
pub mod effect;
pub mod import;
pub mod language;
pub mod preview;
pub mod services;
pub mod state;
pub mod store;

pub use action::Action;
pub use console::{ConsoleLog, ConsoleLogEntry, LogCategory, LogEntryId, CONSOLE_TARGET};
pub use editor::{EditorAction, EditorState, EditorTab, TabId};
pub use effect::{Effect, NotifyLevel};
pub use import::{import_project, ImportConflict, ImportOutcome};
pub use language::LanguageId;
pub use preview::{build_preview, PreviewDocument, PreviewKind, PreviewSynthesizer};
pub use state::WorkspaceState;
pub use store::{DispatchResult, Store};
