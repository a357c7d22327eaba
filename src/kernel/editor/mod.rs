//! Editor domain: open tabs, the active tab and per-tab draft buffers.

mod action;
mod reducer;
mod state;

pub use action::EditorAction;
pub use state::{EditorState, EditorTab, SaveRequest, TabId};
