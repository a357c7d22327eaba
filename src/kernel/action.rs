use std::path::PathBuf;

use crate::kernel::console::LogCategory;
use crate::kernel::editor::TabId;
use crate::kernel::services::ports::{GeneratedProject, GenerationError};
use crate::models::{FileMap, NodeKind};

#[derive(Debug, Clone)]
pub enum Action {
    OpenFile {
        path: String,
    },
    CloseTab {
        tab: TabId,
    },
    SetActiveTab {
        tab: TabId,
    },
    UpdateTabContent {
        tab: TabId,
        text: String,
    },
    SaveTab {
        tab: TabId,
    },
    CreateNode {
        parent: String,
        name: String,
        kind: NodeKind,
    },
    DeleteNode {
        path: String,
    },
    AppendLog {
        category: LogCategory,
        message: String,
    },
    ClearLogs,
    RunPrompt {
        prompt: String,
    },
    GenerationFinished {
        request_id: u64,
        result: Result<GeneratedProject, GenerationError>,
    },
    /// Replaces the tree with files read from outside the session.
    LoadProject {
        files: FileMap,
    },
    RefreshPreview,
    Export {
        project_name: String,
    },
    ExportFinished {
        result: Result<PathBuf, String>,
    },
    Reset,
}
