use crate::kernel::Effect;

use super::action::EditorAction;
use super::state::EditorState;

impl EditorState {
    pub fn dispatch_action(&mut self, action: EditorAction) -> (bool, Vec<Effect>) {
        let changed = match action {
            EditorAction::OpenFile {
                path,
                name,
                content,
                language,
            } => self.open(&path, &name, &content, language),
            EditorAction::SetActiveTab { tab } => self.set_active(tab),
            EditorAction::CloseTab { tab } => self.close(tab),
            EditorAction::ContentChanged { tab, text } => self.update_content(tab, &text),
            EditorAction::Saved { tab, version } => self.mark_saved(tab, version),
            EditorAction::CloseTabsWithin { path } => self.close_within(&path) > 0,
            EditorAction::CloseAll => self.clear(),
        };
        (changed, Vec::new())
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/editor/reducer.rs"]
mod tests;
