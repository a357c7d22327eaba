use crate::kernel::language::LanguageId;

use super::TabId;

#[derive(Debug, Clone)]
pub enum EditorAction {
    OpenFile {
        path: String,
        name: String,
        content: String,
        language: LanguageId,
    },
    SetActiveTab {
        tab: TabId,
    },
    CloseTab {
        tab: TabId,
    },
    ContentChanged {
        tab: TabId,
        text: String,
    },
    Saved {
        tab: TabId,
        version: u64,
    },
    CloseTabsWithin {
        path: String,
    },
    CloseAll,
}
