use super::*;
use crate::kernel::editor::TabId;
use crate::kernel::language::LanguageId;

fn open(editor: &mut EditorState, path: &str) -> TabId {
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    let (changed, effects) = editor.dispatch_action(EditorAction::OpenFile {
        path: path.to_string(),
        name,
        content: format!("// {path}"),
        language: LanguageId::from_path(path),
    });
    assert!(effects.is_empty());
    assert!(changed || editor.tab_for_path(path).is_some());
    editor.tab_for_path(path).unwrap().id
}

#[test]
fn opening_same_path_twice_yields_one_tab() {
    let mut editor = EditorState::new();
    let first = open(&mut editor, "/src/App.tsx");
    let other = open(&mut editor, "/README.md");
    assert_eq!(editor.active(), Some(other));

    let again = open(&mut editor, "/src/App.tsx");
    assert_eq!(first, again);
    assert_eq!(editor.tabs().len(), 2);
    assert_eq!(editor.active(), Some(first));
}

#[test]
fn reopening_active_tab_reports_no_change() {
    let mut editor = EditorState::new();
    open(&mut editor, "/a.ts");
    let (changed, _) = editor.dispatch_action(EditorAction::OpenFile {
        path: "/a.ts".to_string(),
        name: "a.ts".to_string(),
        content: String::new(),
        language: LanguageId::TypeScript,
    });
    assert!(!changed);
}

#[test]
fn closing_active_middle_tab_activates_left_neighbor() {
    let mut editor = EditorState::new();
    let a = open(&mut editor, "/a.ts");
    let b = open(&mut editor, "/b.ts");
    let _c = open(&mut editor, "/c.ts");
    editor.dispatch_action(EditorAction::SetActiveTab { tab: b });

    let (changed, _) = editor.dispatch_action(EditorAction::CloseTab { tab: b });
    assert!(changed);
    assert_eq!(editor.active(), Some(a));
    assert_eq!(editor.tabs().len(), 2);
}

#[test]
fn closing_active_first_tab_activates_new_first() {
    let mut editor = EditorState::new();
    let a = open(&mut editor, "/a.ts");
    let b = open(&mut editor, "/b.ts");
    editor.dispatch_action(EditorAction::SetActiveTab { tab: a });

    editor.dispatch_action(EditorAction::CloseTab { tab: a });
    assert_eq!(editor.active(), Some(b));
}

#[test]
fn closing_inactive_tab_keeps_active() {
    let mut editor = EditorState::new();
    let a = open(&mut editor, "/a.ts");
    let b = open(&mut editor, "/b.ts");

    editor.dispatch_action(EditorAction::CloseTab { tab: a });
    assert_eq!(editor.active(), Some(b));
}

#[test]
fn closing_only_tab_leaves_nothing_active() {
    let mut editor = EditorState::new();
    let a = open(&mut editor, "/a.ts");

    editor.dispatch_action(EditorAction::CloseTab { tab: a });
    assert_eq!(editor.active(), None);
    assert!(editor.tabs().is_empty());

    let (changed, _) = editor.dispatch_action(EditorAction::CloseTab { tab: a });
    assert!(!changed);
}

#[test]
fn content_change_marks_dirty_and_save_ack_clears_it() {
    let mut editor = EditorState::new();
    let a = open(&mut editor, "/a.ts");
    assert!(!editor.is_dirty(a));

    editor.dispatch_action(EditorAction::ContentChanged {
        tab: a,
        text: "let x = 1;".to_string(),
    });
    assert!(editor.is_dirty(a));
    assert_eq!(editor.tab(a).unwrap().content(), "let x = 1;");
    assert!(editor.tab(a).unwrap().display_title().starts_with('\u{25cf}'));

    let request = editor.save_request(a).unwrap();
    assert_eq!(request.content, "let x = 1;");
    editor.dispatch_action(EditorAction::Saved {
        tab: a,
        version: request.version,
    });
    assert!(!editor.is_dirty(a));
}

#[test]
fn stale_save_ack_keeps_dirty() {
    let mut editor = EditorState::new();
    let a = open(&mut editor, "/a.ts");
    editor.dispatch_action(EditorAction::ContentChanged {
        tab: a,
        text: "one".to_string(),
    });
    let request = editor.save_request(a).unwrap();
    editor.dispatch_action(EditorAction::ContentChanged {
        tab: a,
        text: "two".to_string(),
    });

    let (changed, _) = editor.dispatch_action(EditorAction::Saved {
        tab: a,
        version: request.version,
    });
    assert!(!changed);
    assert!(editor.is_dirty(a));
}

#[test]
fn close_within_drops_tabs_under_folder_only() {
    let mut editor = EditorState::new();
    open(&mut editor, "/src/App.tsx");
    open(&mut editor, "/src/components/Header.tsx");
    let keep = open(&mut editor, "/srcfile.ts");

    let (changed, _) = editor.dispatch_action(EditorAction::CloseTabsWithin {
        path: "/src".to_string(),
    });
    assert!(changed);
    assert_eq!(editor.tabs().len(), 1);
    assert_eq!(editor.active(), Some(keep));
}

#[test]
fn close_all_resets_active() {
    let mut editor = EditorState::new();
    open(&mut editor, "/a.ts");
    open(&mut editor, "/b.ts");

    let (changed, _) = editor.dispatch_action(EditorAction::CloseAll);
    assert!(changed);
    assert!(editor.tabs().is_empty());
    assert_eq!(editor.active(), None);
}
