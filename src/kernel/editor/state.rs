use ropey::Rope;

use crate::kernel::language::LanguageId;
use crate::models::is_within;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(u64);

impl TabId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub struct EditorTab {
    pub id: TabId,
    pub name: String,
    pub path: String,
    pub language: LanguageId,
    pub dirty: bool,
    pub edit_version: u64,
    buffer: Rope,
}

impl std::fmt::Debug for EditorTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorTab")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("path", &self.path)
            .field("dirty", &self.dirty)
            .field("lines", &self.buffer.len_lines())
            .finish()
    }
}

impl EditorTab {
    pub fn new(
        id: TabId,
        path: impl Into<String>,
        name: impl Into<String>,
        content: &str,
        language: LanguageId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
            language,
            dirty: false,
            edit_version: 0,
            buffer: Rope::from_str(content),
        }
    }

    pub fn buffer(&self) -> &Rope {
        &self.buffer
    }

    pub fn content(&self) -> String {
        self.buffer.to_string()
    }

    pub fn replace_content(&mut self, text: &str) {
        self.buffer = Rope::from_str(text);
        self.dirty = true;
        self.edit_version = self.edit_version.saturating_add(1);
    }

    pub fn display_title(&self) -> String {
        if self.dirty {
            format!("\u{25cf} {}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Snapshot of a tab buffer taken for a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub tab: TabId,
    pub path: String,
    pub name: String,
    pub content: String,
    pub version: u64,
}

#[derive(Debug, Default)]
pub struct EditorState {
    tabs: Vec<EditorTab>,
    active: Option<TabId>,
    next_tab_id: u64,
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active: None,
            next_tab_id: 1,
        }
    }

    pub(super) fn alloc_tab_id(&mut self) -> TabId {
        let id = TabId::new(self.next_tab_id.max(1));
        self.next_tab_id = id.raw().saturating_add(1);
        id
    }

    pub fn tabs(&self) -> &[EditorTab] {
        &self.tabs
    }

    pub fn active(&self) -> Option<TabId> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&EditorTab> {
        self.active.and_then(|id| self.tab(id))
    }

    pub fn tab(&self, id: TabId) -> Option<&EditorTab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub(super) fn tab_mut(&mut self, id: TabId) -> Option<&mut EditorTab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn tab_for_path(&self, path: &str) -> Option<&EditorTab> {
        self.tabs.iter().find(|t| t.path == path)
    }

    fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == id)
    }

    pub fn open(&mut self, path: &str, name: &str, content: &str, language: LanguageId) -> bool {
        if let Some(existing) = self.tab_for_path(path).map(|t| t.id) {
            return self.set_active(existing);
        }

        let id = self.alloc_tab_id();
        self.tabs
            .push(EditorTab::new(id, path, name, content, language));
        self.active = Some(id);
        true
    }

    pub fn set_active(&mut self, id: TabId) -> bool {
        if self.active == Some(id) || self.index_of(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn close(&mut self, id: TabId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.tabs.remove(index);

        if self.active == Some(id) {
            self.active = self
                .tabs
                .get(index.saturating_sub(1))
                .or_else(|| self.tabs.first())
                .map(|t| t.id);
        }
        true
    }

    /// Closes every tab bound to `path` or to a path beneath it.
    pub fn close_within(&mut self, path: &str) -> usize {
        let doomed: Vec<TabId> = self
            .tabs
            .iter()
            .filter(|t| is_within(&t.path, path))
            .map(|t| t.id)
            .collect();
        for id in &doomed {
            self.close(*id);
        }
        doomed.len()
    }

    pub fn clear(&mut self) -> bool {
        if self.tabs.is_empty() && self.active.is_none() {
            return false;
        }
        self.tabs.clear();
        self.active = None;
        true
    }

    pub fn update_content(&mut self, id: TabId, text: &str) -> bool {
        let Some(tab) = self.tab_mut(id) else {
            return false;
        };
        tab.replace_content(text);
        true
    }

    pub fn save_request(&self, id: TabId) -> Option<SaveRequest> {
        let tab = self.tab(id)?;
        Some(SaveRequest {
            tab: tab.id,
            path: tab.path.clone(),
            name: tab.name.clone(),
            content: tab.content(),
            version: tab.edit_version,
        })
    }

    /// Clears the dirty flag unless the buffer changed after the snapshot was taken.
    pub fn mark_saved(&mut self, id: TabId, version: u64) -> bool {
        let Some(tab) = self.tab_mut(id) else {
            return false;
        };
        if tab.edit_version != version || !tab.dirty {
            return false;
        }
        tab.dirty = false;
        true
    }

    pub fn is_dirty(&self, id: TabId) -> bool {
        self.tab(id).is_some_and(|t| t.dirty)
    }
}
