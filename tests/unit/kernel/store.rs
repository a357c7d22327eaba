use super::*;
use crate::kernel::preview::PreviewKind;
use crate::kernel::state::{INIT_MESSAGE, RESET_MESSAGE, WELCOME_README};
use std::path::PathBuf;

fn new_store() -> Store {
    Store::new(WorkspaceState::new())
}

fn files(entries: &[(&str, &str)]) -> FileMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn messages(store: &Store) -> Vec<&str> {
    store
        .state
        .console
        .entries()
        .iter()
        .map(|e| e.message())
        .collect()
}

fn open(store: &mut Store, path: &str) -> TabId {
    store.dispatch(Action::OpenFile {
        path: path.to_string(),
    });
    store.state.editor.tab_for_path(path).unwrap().id
}

fn project() -> GeneratedProject {
    GeneratedProject::new(files(&[
        (
            "src/App.tsx",
            "export default function Home(){ return <div/> }",
        ),
        ("package.json", "{}"),
    ]))
}

#[test]
fn new_workspace_is_seeded() {
    let store = new_store();
    let readme = store.state.tree.lookup("/README.md").unwrap();
    assert_eq!(readme.content(), Some(WELCOME_README));
    assert_eq!(messages(&store), vec![INIT_MESSAGE]);
    assert_eq!(
        store.state.console.entries()[0].category(),
        LogCategory::System
    );
    assert!(store.state.preview.is_none());
    assert!(!store.state.generating);
}

#[test]
fn open_file_mounts_content_and_language() {
    let mut store = new_store();
    let tab = open(&mut store, "/README.md");
    let tab = store.state.editor.tab(tab).unwrap();
    assert_eq!(tab.content(), WELCOME_README);
    assert_eq!(tab.language.as_str(), "markdown");
    assert!(!tab.dirty);
}

#[test]
fn open_folder_or_missing_path_is_noop() {
    let mut store = new_store();
    store.dispatch(Action::CreateNode {
        parent: "/".to_string(),
        name: "src".to_string(),
        kind: NodeKind::Folder,
    });

    let result = store.dispatch(Action::OpenFile {
        path: "/src".to_string(),
    });
    assert!(!result.state_changed);
    let result = store.dispatch(Action::OpenFile {
        path: "/nope.ts".to_string(),
    });
    assert!(!result.state_changed);
    assert!(store.state.editor.tabs().is_empty());
}

#[test]
fn save_writes_buffer_into_tree() {
    let mut store = new_store();
    let tab = open(&mut store, "/README.md");

    store.dispatch(Action::UpdateTabContent {
        tab,
        text: "# Changed".to_string(),
    });
    assert!(store.state.editor.is_dirty(tab));

    let result = store.dispatch(Action::SaveTab { tab });
    assert!(result.state_changed);
    assert!(!store.state.editor.is_dirty(tab));
    assert_eq!(
        store.state.tree.flatten().get("README.md").map(String::as_str),
        Some("# Changed")
    );
    let last = store.state.console.last().unwrap();
    assert_eq!(last.category(), LogCategory::Success);
    assert_eq!(last.message(), "Saved: README.md");
}

#[test]
fn save_to_vanished_path_logs_error_and_stays_dirty() {
    let mut store = new_store();
    let tab = open(&mut store, "/README.md");
    store.dispatch(Action::UpdateTabContent {
        tab,
        text: "draft".to_string(),
    });
    store.state.tree.delete("/README.md").unwrap();

    store.dispatch(Action::SaveTab { tab });
    assert!(store.state.editor.is_dirty(tab));
    let last = store.state.console.last().unwrap();
    assert_eq!(last.category(), LogCategory::Error);
    assert!(last.message().starts_with("Save failed: README.md"));
}

#[test]
fn create_node_logs_and_rejects_duplicates() {
    let mut store = new_store();
    let result = store.dispatch(Action::CreateNode {
        parent: "/".to_string(),
        name: "notes.txt".to_string(),
        kind: NodeKind::File,
    });
    assert!(result.state_changed);
    assert!(store.state.tree.lookup("/notes.txt").unwrap().is_file());
    assert_eq!(
        store.state.console.last().unwrap().message(),
        "Created file: /notes.txt"
    );

    let logged = store.state.console.len();
    let result = store.dispatch(Action::CreateNode {
        parent: "/".to_string(),
        name: "notes.txt".to_string(),
        kind: NodeKind::Folder,
    });
    assert!(!result.state_changed);
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::Notify {
            level: NotifyLevel::Error,
            ..
        }]
    ));
    assert_eq!(store.state.console.len(), logged);
}

#[test]
fn create_node_rejects_bad_names() {
    let mut store = new_store();
    for name in ["", "..", "a/b"] {
        let result = store.dispatch(Action::CreateNode {
            parent: "/".to_string(),
            name: name.to_string(),
            kind: NodeKind::File,
        });
        assert!(matches!(result.effects.as_slice(), [Effect::Notify { .. }]));
    }
    assert_eq!(store.state.tree.len(), 2);
}

#[test]
fn delete_root_is_rejected() {
    let mut store = new_store();
    let result = store.dispatch(Action::DeleteNode {
        path: "/".to_string(),
    });
    assert!(!result.state_changed);
    assert!(matches!(result.effects.as_slice(), [Effect::Notify { .. }]));
    assert!(store.state.tree.lookup("/README.md").is_some());
}

#[test]
fn delete_folder_closes_tabs_beneath_it() {
    let mut store = new_store();
    store.dispatch(Action::LoadProject {
        files: files(&[("src/a.ts", "a"), ("src/lib/b.ts", "b"), ("top.ts", "t")]),
    });
    open(&mut store, "/src/a.ts");
    open(&mut store, "/src/lib/b.ts");
    let top = open(&mut store, "/top.ts");

    store.dispatch(Action::DeleteNode {
        path: "/src".to_string(),
    });
    assert_eq!(store.state.editor.tabs().len(), 1);
    assert_eq!(store.state.editor.active(), Some(top));
    assert!(store.state.tree.lookup("/src/lib/b.ts").is_none());
    assert_eq!(store.state.console.last().unwrap().message(), "Deleted: /src");
}

#[test]
fn run_prompt_starts_generation() {
    let mut store = new_store();
    let result = store.dispatch(Action::RunPrompt {
        prompt: "  todo app ".to_string(),
    });

    assert!(store.state.generating);
    assert_eq!(store.state.request_id, 1);
    match result.effects.as_slice() {
        [Effect::StartGeneration { request_id, prompt }] => {
            assert_eq!(*request_id, 1);
            assert_eq!(prompt, "todo app");
        }
        other => panic!("unexpected effects: {other:?}"),
    }
    let logs = messages(&store);
    assert_eq!(logs[1], "Starting generation: \"todo app\"");
    assert_eq!(logs[2], "Calling AI to generate project...");
}

#[test]
fn empty_prompt_is_rejected_without_logging() {
    let mut store = new_store();
    let result = store.dispatch(Action::RunPrompt {
        prompt: "   ".to_string(),
    });
    assert!(!store.state.generating);
    assert!(matches!(result.effects.as_slice(), [Effect::Notify { .. }]));
    assert_eq!(store.state.console.len(), 1);
}

#[test]
fn second_prompt_while_generating_is_rejected() {
    let mut store = new_store();
    store.dispatch(Action::RunPrompt {
        prompt: "one".to_string(),
    });
    let logged = store.state.console.len();

    let result = store.dispatch(Action::RunPrompt {
        prompt: "two".to_string(),
    });
    assert!(!result.state_changed);
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::Notify {
            level: NotifyLevel::Info,
            ..
        }]
    ));
    assert_eq!(store.state.request_id, 1);
    assert_eq!(store.state.console.len(), logged);
}

#[test]
fn successful_generation_replaces_tree_and_builds_preview() {
    let mut store = new_store();
    open(&mut store, "/README.md");
    store.dispatch(Action::RunPrompt {
        prompt: "app".to_string(),
    });

    let result = store.dispatch(Action::GenerationFinished {
        request_id: 1,
        result: Ok(project()),
    });

    assert!(result.state_changed);
    assert!(!store.state.generating);
    assert!(store.state.tree.lookup("/README.md").is_none());
    assert!(store.state.tree.lookup("/src").unwrap().is_folder());
    assert!(store.state.editor.tabs().is_empty());
    assert_eq!(store.state.editor.active(), None);

    let preview = store.state.preview.as_ref().unwrap();
    assert_eq!(
        preview.kind,
        PreviewKind::Component {
            entry: "src/App.tsx".to_string(),
            component: "Home".to_string(),
        }
    );
    let logs = messages(&store);
    assert!(logs.ends_with(&["Generated 2 files", "Building preview...", "Preview ready!"]));
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::Notify {
            level: NotifyLevel::Success,
            ..
        }]
    ));
}

#[test]
fn failed_generation_leaves_tree_unchanged() {
    let mut store = new_store();
    store.dispatch(Action::RunPrompt {
        prompt: "app".to_string(),
    });
    let before = store.state.tree.flatten();

    let result = store.dispatch(Action::GenerationFinished {
        request_id: 1,
        result: Err(GenerationError::RateLimited),
    });

    assert!(!store.state.generating);
    assert_eq!(store.state.tree.flatten(), before);
    assert!(store.state.preview.is_none());
    let last = store.state.console.last().unwrap();
    assert_eq!(last.category(), LogCategory::Error);
    assert_eq!(
        last.message(),
        "Generation failed: Rate limit exceeded. Please try again later."
    );
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::Notify {
            level: NotifyLevel::Error,
            ..
        }]
    ));
}

#[test]
fn stale_completion_after_reset_is_ignored() {
    let mut store = new_store();
    store.dispatch(Action::RunPrompt {
        prompt: "app".to_string(),
    });
    store.dispatch(Action::Reset);
    assert!(!store.state.generating);
    assert_eq!(messages(&store), vec![RESET_MESSAGE]);

    let result = store.dispatch(Action::GenerationFinished {
        request_id: 1,
        result: Ok(project()),
    });
    assert!(!result.state_changed);
    assert!(store.state.tree.lookup("/README.md").is_some());
    assert!(store.state.preview.is_none());

    store.dispatch(Action::RunPrompt {
        prompt: "again".to_string(),
    });
    assert!(store.state.request_id > 2);
}

#[test]
fn mismatched_request_id_is_ignored_while_generating() {
    let mut store = new_store();
    store.dispatch(Action::RunPrompt {
        prompt: "app".to_string(),
    });
    let result = store.dispatch(Action::GenerationFinished {
        request_id: 7,
        result: Ok(project()),
    });
    assert!(!result.state_changed);
    assert!(store.state.generating);
}

#[test]
fn load_project_reports_conflicts_as_warnings() {
    let mut store = new_store();
    store.dispatch(Action::LoadProject {
        files: files(&[("src", "oops"), ("src/App.tsx", "x"), ("index.html", "<p>hi</p>")]),
    });

    assert!(store.state.tree.lookup("/src").unwrap().is_file());
    assert!(store.state.tree.lookup("/index.html").is_some());
    let warning = store
        .state
        .console
        .entries()
        .iter()
        .find(|e| e.category() == LogCategory::Warning)
        .unwrap();
    assert!(warning.message().starts_with("Skipped src/App.tsx"));
}

#[test]
fn project_without_entry_leaves_preview_idle() {
    let mut store = new_store();
    store.dispatch(Action::LoadProject {
        files: files(&[("index.html", "<html><head></head><body></body></html>")]),
    });
    assert!(store.state.preview.is_some());

    store.dispatch(Action::LoadProject {
        files: files(&[("notes.md", "# notes")]),
    });
    assert!(store.state.preview.is_none());
    assert_ne!(store.state.console.last().unwrap().message(), "Preview ready!");
}

#[test]
fn refresh_preview_picks_up_saved_edits() {
    let mut store = new_store();
    store.dispatch(Action::LoadProject {
        files: files(&[("index.html", "<html><head></head><body>one</body></html>")]),
    });
    let tab = open(&mut store, "/index.html");
    store.dispatch(Action::UpdateTabContent {
        tab,
        text: "<html><head></head><body>two</body></html>".to_string(),
    });
    store.dispatch(Action::SaveTab { tab });

    let result = store.dispatch(Action::RefreshPreview);
    assert!(result.state_changed);
    assert!(store.state.preview.as_ref().unwrap().html.contains("two"));

    let result = store.dispatch(Action::RefreshPreview);
    assert!(!result.state_changed);
}

#[test]
fn export_requests_archive_of_flattened_tree() {
    let mut store = new_store();
    let result = store.dispatch(Action::Export {
        project_name: " ".to_string(),
    });
    match result.effects.as_slice() {
        [Effect::ExportArchive {
            files,
            project_name,
        }] => {
            assert_eq!(project_name, "workspace-project");
            assert_eq!(files.keys().collect::<Vec<_>>(), vec!["README.md"]);
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn export_rejects_names_that_leave_the_export_dir() {
    let mut store = new_store();
    for name in ["../escaped", "a/b", "..", "a\\b"] {
        let result = store.dispatch(Action::Export {
            project_name: name.to_string(),
        });
        assert!(!result.state_changed);
        assert!(
            matches!(
                result.effects.as_slice(),
                [Effect::Notify {
                    level: NotifyLevel::Error,
                    ..
                }]
            ),
            "{name}"
        );
    }
    assert_eq!(store.state.console.len(), 1);
}

#[test]
fn export_results_are_logged() {
    let mut store = new_store();
    store.dispatch(Action::ExportFinished {
        result: Ok(PathBuf::from("/tmp/p.zip")),
    });
    assert_eq!(
        store.state.console.last().unwrap().message(),
        "Project exported as ZIP"
    );

    let result = store.dispatch(Action::ExportFinished {
        result: Err("disk full".to_string()),
    });
    assert_eq!(store.state.console.last().unwrap().message(), "Export failed");
    assert!(matches!(
        result.effects.as_slice(),
        [Effect::Notify {
            level: NotifyLevel::Error,
            ..
        }]
    ));
}

#[test]
fn append_and_clear_logs() {
    let mut store = new_store();
    store.dispatch(Action::AppendLog {
        category: LogCategory::Warning,
        message: "careful".to_string(),
    });
    assert_eq!(store.state.console.len(), 2);

    assert!(store.dispatch(Action::ClearLogs).state_changed);
    assert!(store.state.console.is_empty());
    assert!(!store.dispatch(Action::ClearLogs).state_changed);
}

struct MarkerShim;

impl crate::kernel::preview::ComponentShim for MarkerShim {
    fn version(&self) -> &str {
        "test"
    }

    fn provides(&self) -> &[&'static str] {
        &[]
    }

    fn install_script(&self) -> String {
        "window.__markerShim = true;".to_string()
    }

    fn bind_import(&self, _package: &str, _name: &str) -> Option<String> {
        None
    }
}

#[test]
fn test_custom_shim_is_used_for_component_previews() {
    let synthesizer = PreviewSynthesizer::new(Box::new(MarkerShim));
    let mut store = Store::with_synthesizer(WorkspaceState::new(), synthesizer);
    store.dispatch(Action::LoadProject {
        files: project().files,
    });
    let preview = store.state.preview.as_ref().unwrap();
    assert!(matches!(preview.kind, PreviewKind::Component { .. }));
    assert!(preview.html.contains("window.__markerShim = true;"));
}
