use crate::kernel::console::LogCategory;
use crate::kernel::editor::{EditorAction, TabId};
use crate::kernel::import::import_project;
use crate::kernel::language::LanguageId;
use crate::kernel::preview::PreviewSynthesizer;
use crate::kernel::services::ports::{ExportSettings, GeneratedProject, GenerationError};
use crate::models::{validate_name, FileMap, NodeKind};

use super::{Action, Effect, NotifyLevel, WorkspaceState};

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn unchanged() -> Self {
        Self {
            effects: Vec::new(),
            state_changed: false,
        }
    }

    fn notify(level: NotifyLevel, message: impl Into<String>) -> Self {
        Self {
            effects: vec![Effect::notify(level, message)],
            state_changed: false,
        }
    }
}

pub struct Store {
    state: WorkspaceState,
    synthesizer: PreviewSynthesizer,
}

impl Store {
    pub fn new(state: WorkspaceState) -> Self {
        Self::with_synthesizer(state, PreviewSynthesizer::default())
    }

    pub fn with_synthesizer(state: WorkspaceState, synthesizer: PreviewSynthesizer) -> Self {
        Self { state, synthesizer }
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::OpenFile { path } => {
                let Some(node) = self.state.tree.lookup(&path).filter(|n| n.is_file()) else {
                    return DispatchResult::unchanged();
                };
                let editor_action = EditorAction::OpenFile {
                    path: node.path().to_string(),
                    name: node.name().to_string(),
                    content: node.content().unwrap_or_default().to_string(),
                    language: node
                        .language()
                        .unwrap_or_else(|| LanguageId::from_path(node.name())),
                };
                self.dispatch_editor(editor_action)
            }
            Action::CloseTab { tab } => self.dispatch_editor(EditorAction::CloseTab { tab }),
            Action::SetActiveTab { tab } => {
                self.dispatch_editor(EditorAction::SetActiveTab { tab })
            }
            Action::UpdateTabContent { tab, text } => {
                self.dispatch_editor(EditorAction::ContentChanged { tab, text })
            }
            Action::SaveTab { tab } => self.save_tab(tab),
            Action::CreateNode { parent, name, kind } => {
                match self.state.tree.insert(&parent, &name, kind) {
                    Ok(path) => {
                        let label = match kind {
                            NodeKind::File => "file",
                            NodeKind::Folder => "folder",
                        };
                        self.state
                            .console
                            .append(LogCategory::Info, format!("Created {label}: {path}"));
                        DispatchResult {
                            effects: Vec::new(),
                            state_changed: true,
                        }
                    }
                    Err(err) => DispatchResult::notify(NotifyLevel::Error, err.to_string()),
                }
            }
            Action::DeleteNode { path } => match self.state.tree.delete(&path) {
                Ok(removed) => {
                    let (closed, _) = self
                        .state
                        .editor
                        .dispatch_action(EditorAction::CloseTabsWithin { path: path.clone() });
                    tracing::debug!(path = %path, removed, closed, "node deleted");
                    self.state
                        .console
                        .append(LogCategory::Info, format!("Deleted: {path}"));
                    DispatchResult {
                        effects: Vec::new(),
                        state_changed: true,
                    }
                }
                Err(err) => DispatchResult::notify(NotifyLevel::Error, err.to_string()),
            },
            Action::AppendLog { category, message } => {
                self.state.console.append(category, message);
                DispatchResult {
                    effects: Vec::new(),
                    state_changed: true,
                }
            }
            Action::ClearLogs => DispatchResult {
                effects: Vec::new(),
                state_changed: self.state.console.clear(),
            },
            Action::RunPrompt { prompt } => self.run_prompt(prompt),
            Action::GenerationFinished { request_id, result } => {
                self.finish_generation(request_id, result)
            }
            Action::LoadProject { files } => {
                self.state.console.append(
                    LogCategory::Info,
                    format!("Loaded {} files", files.len()),
                );
                self.apply_project(&files);
                DispatchResult {
                    effects: Vec::new(),
                    state_changed: true,
                }
            }
            Action::RefreshPreview => {
                let files = self.state.tree.flatten();
                DispatchResult {
                    effects: Vec::new(),
                    state_changed: self.rebuild_preview(&files),
                }
            }
            Action::Export { project_name } => {
                let project_name = project_name.trim();
                let project_name = if project_name.is_empty() {
                    ExportSettings::default().project_name
                } else {
                    project_name.to_string()
                };
                if let Err(err) = validate_name(&project_name) {
                    return DispatchResult::notify(
                        NotifyLevel::Error,
                        format!("Cannot export: {err}"),
                    );
                }
                DispatchResult {
                    effects: vec![Effect::ExportArchive {
                        files: self.state.tree.flatten(),
                        project_name,
                    }],
                    state_changed: false,
                }
            }
            Action::ExportFinished { result } => {
                let effect = match result {
                    Ok(path) => {
                        tracing::info!(path = %path.display(), "archive written");
                        self.state
                            .console
                            .append(LogCategory::Success, "Project exported as ZIP");
                        Effect::notify(NotifyLevel::Success, "Project exported successfully!")
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "archive export failed");
                        self.state.console.append(LogCategory::Error, "Export failed");
                        Effect::notify(NotifyLevel::Error, "Failed to export project")
                    }
                };
                DispatchResult {
                    effects: vec![effect],
                    state_changed: true,
                }
            }
            Action::Reset => {
                self.state = WorkspaceState::after_reset(self.state.request_id);
                DispatchResult {
                    effects: vec![Effect::notify(NotifyLevel::Info, "Workspace reset")],
                    state_changed: true,
                }
            }
        }
    }

    fn dispatch_editor(&mut self, action: EditorAction) -> DispatchResult {
        let (state_changed, effects) = self.state.editor.dispatch_action(action);
        DispatchResult {
            effects,
            state_changed,
        }
    }

    fn save_tab(&mut self, tab: TabId) -> DispatchResult {
        let Some(request) = self.state.editor.save_request(tab) else {
            return DispatchResult::unchanged();
        };

        match self.state.tree.update(&request.path, request.content) {
            Ok(()) => {
                self.state.editor.dispatch_action(EditorAction::Saved {
                    tab,
                    version: request.version,
                });
                self.state
                    .console
                    .append(LogCategory::Success, format!("Saved: {}", request.name));
            }
            Err(err) => {
                self.state.console.append(
                    LogCategory::Error,
                    format!("Save failed: {}: {err}", request.name),
                );
            }
        }
        DispatchResult {
            effects: Vec::new(),
            state_changed: true,
        }
    }

    fn run_prompt(&mut self, prompt: String) -> DispatchResult {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return DispatchResult::notify(NotifyLevel::Error, "Please enter a prompt");
        }
        if self.state.generating {
            return DispatchResult::notify(NotifyLevel::Info, "A generation is already running");
        }

        self.state.generating = true;
        self.state.request_id = self.state.request_id.saturating_add(1);
        self.state.console.append(
            LogCategory::System,
            format!("Starting generation: \"{prompt}\""),
        );
        self.state
            .console
            .append(LogCategory::Info, "Calling AI to generate project...");
        tracing::info!(request_id = self.state.request_id, "generation requested");

        DispatchResult {
            effects: vec![Effect::StartGeneration {
                request_id: self.state.request_id,
                prompt: prompt.to_string(),
            }],
            state_changed: true,
        }
    }

    fn finish_generation(
        &mut self,
        request_id: u64,
        result: Result<GeneratedProject, GenerationError>,
    ) -> DispatchResult {
        if !self.state.generating || request_id != self.state.request_id {
            tracing::debug!(
                request_id,
                current = self.state.request_id,
                "ignoring stale generation result"
            );
            return DispatchResult::unchanged();
        }
        self.state.generating = false;

        match result {
            Ok(project) => {
                tracing::info!(request_id, files = project.file_count(), "generation finished");
                self.state.console.append(
                    LogCategory::Success,
                    format!("Generated {} files", project.file_count()),
                );
                self.apply_project(&project.files);
                DispatchResult {
                    effects: vec![Effect::notify(
                        NotifyLevel::Success,
                        "Project generated successfully!",
                    )],
                    state_changed: true,
                }
            }
            Err(err) => {
                tracing::warn!(request_id, error = %err, "generation failed");
                self.state
                    .console
                    .append(LogCategory::Error, format!("Generation failed: {err}"));
                DispatchResult {
                    effects: vec![Effect::notify(
                        NotifyLevel::Error,
                        "Failed to generate project",
                    )],
                    state_changed: true,
                }
            }
        }
    }

    /// Swaps in a tree built from `files`, drops every tab and rebuilds the preview.
    fn apply_project(&mut self, files: &FileMap) {
        let outcome = import_project(files);
        for conflict in &outcome.conflicts {
            self.state.console.append(
                LogCategory::Warning,
                format!("Skipped {}: {}", conflict.key, conflict.reason),
            );
        }
        self.state.tree = outcome.tree;
        self.state.editor.dispatch_action(EditorAction::CloseAll);

        self.state
            .console
            .append(LogCategory::Info, "Building preview...");
        let imported = self.state.tree.flatten();
        self.rebuild_preview(&imported);
        if self.state.preview.is_some() {
            self.state
                .console
                .append(LogCategory::Success, "Preview ready!");
        }
    }

    fn rebuild_preview(&mut self, files: &FileMap) -> bool {
        let next = self.synthesizer.synthesize(files);
        if next == self.state.preview {
            return false;
        }
        self.state.preview = next;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
