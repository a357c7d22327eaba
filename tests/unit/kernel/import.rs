use super::*;
use crate::kernel::language::LanguageId;

fn map(entries: &[(&str, &str)]) -> FileMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_import_creates_intermediate_folders() {
    let files = map(&[
        ("src/components/Header.tsx", "header"),
        ("src/App.tsx", "app"),
        ("package.json", "{}"),
    ]);

    let outcome = import_project(&files);
    assert!(outcome.conflicts.is_empty());
    assert_eq!(outcome.imported, 3);

    let tree = outcome.tree;
    assert!(tree.lookup("/src").unwrap().is_folder());
    assert!(tree.lookup("/src/components").unwrap().is_folder());
    let header = tree.lookup("/src/components/Header.tsx").unwrap();
    assert_eq!(header.content(), Some("header"));
    assert_eq!(header.language(), Some(LanguageId::TypeScript));
    assert_eq!(
        tree.lookup("/package.json").unwrap().language(),
        Some(LanguageId::Json)
    );
}

#[test]
fn test_flatten_after_import_round_trips() {
    let files = map(&[
        ("index.html", "<html></html>"),
        ("src/App.tsx", "export default function App(){}"),
        ("src/lib/utils.ts", ""),
        ("styles/a.css", "body{}"),
    ]);

    let outcome = import_project(&files);
    assert_eq!(outcome.tree.flatten(), files);
}

#[test]
fn test_import_is_idempotent_up_to_identifiers() {
    let files = map(&[("a/b/c.txt", "x"), ("a/d.txt", "y")]);
    let first = import_project(&files).tree.flatten();
    let second = import_project(&first).tree.flatten();
    assert_eq!(first, second);
}

#[test]
fn test_empty_segments_are_dropped() {
    let files = map(&[("/src//App.tsx", "app"), ("///", "nothing")]);

    let outcome = import_project(&files);
    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].key, "///");
    assert_eq!(
        outcome.tree.lookup("/src/App.tsx").unwrap().content(),
        Some("app")
    );
}

#[test]
fn test_file_blocking_folder_is_reported_not_fatal() {
    let files = map(&[("src", "i am a file"), ("src/App.tsx", "app"), ("z.md", "z")]);

    let outcome = import_project(&files);
    assert_eq!(outcome.imported, 2);
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].key, "src/App.tsx");
    assert_eq!(outcome.tree.lookup("/src").unwrap().content(), Some("i am a file"));
    assert!(outcome.tree.lookup("/z.md").is_some());
}

#[test]
fn test_keys_normalizing_to_same_path_keep_first() {
    let files = map(&[("a/b.txt", "first"), ("a/b.txt/", "second")]);

    let outcome = import_project(&files);
    assert_eq!(outcome.imported, 1);
    assert_eq!(
        outcome.conflicts[0].reason,
        FileTreeError::DuplicatePath("/a/b.txt".to_string())
    );
    assert_eq!(outcome.tree.lookup("/a/b.txt").unwrap().content(), Some("first"));
}

#[test]
fn test_empty_mapping_yields_bare_root() {
    let outcome = import_project(&FileMap::new());
    assert!(outcome.tree.is_empty());
    assert_eq!(outcome.imported, 0);
}
