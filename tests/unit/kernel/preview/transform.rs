use super::*;

#[test]
fn test_default_function_export_names_component() {
    let module = transform_module("export default function Home(){ return <div/> }");
    assert_eq!(module.component, "Home");
    assert_eq!(module.default_export.as_deref(), Some("Home"));
    assert!(module.is_renderable());
    assert!(!module.source.contains("export"));
    assert!(module.source.contains("function Home()"));
}

#[test]
fn test_imports_are_removed_and_recorded() {
    let src = "import React, { useState, useEffect as useMount } from 'react';\n\
               import { Sun, Moon } from \"lucide-react\";\n\
               import * as Icons from 'react-icons/fa';\n\
               import type { Todo } from './types';\n\
               import './index.css';\n\
               import {\n  Button,\n  Card\n} from '@/components/ui/button';\n\
               \n\
               export default function App() { return <main/>; }\n";
    let module = transform_module(src);

    assert!(!module.source.contains("import"));
    assert!(module.source.contains("function App()"));

    let react: Vec<(&ImportedItem, &str)> = module
        .imports_from("react")
        .map(|i| (&i.item, i.local.as_str()))
        .collect();
    assert_eq!(
        react,
        vec![
            (&ImportedItem::Default, "React"),
            (&ImportedItem::Named("useState".to_string()), "useState"),
            (&ImportedItem::Named("useEffect".to_string()), "useMount"),
        ]
    );

    let icons: Vec<&str> = module
        .imports_from("lucide-react")
        .map(|i| i.local.as_str())
        .collect();
    assert_eq!(icons, vec!["Sun", "Moon"]);

    let namespace = module.imports_from("react-icons/fa").next().unwrap();
    assert_eq!(namespace.item, ImportedItem::Namespace);
    assert_eq!(namespace.local, "Icons");

    assert_eq!(module.imports_from("./types").count(), 0);
    let ui: Vec<&str> = module
        .imports_from("@/components/ui/button")
        .map(ImportedName::source_name)
        .collect();
    assert_eq!(ui, vec!["Button", "Card"]);
}

#[test]
fn test_named_exports_are_unwrapped() {
    let src = "export const formatDate = (d) => d;\n\
               export function Header() { return <h1/>; }\n\
               const helper = 1;\n\
               export { helper as util };\n\
               export type { Props } from './types';\n";
    let module = transform_module(src);

    assert!(!module.source.contains("export"));
    assert!(module.source.contains("const formatDate = (d) => d;"));
    assert!(module.source.contains("function Header()"));

    let exported: Vec<(&str, &str)> = module
        .exports
        .iter()
        .map(|e| (e.local.as_str(), e.exported.as_str()))
        .collect();
    assert_eq!(
        exported,
        vec![
            ("formatDate", "formatDate"),
            ("Header", "Header"),
            ("helper", "util")
        ]
    );
    assert_eq!(module.default_export, None);
    assert_eq!(module.component, "Header");
}

#[test]
fn test_trailing_default_export_comes_first() {
    let src = "export const Item = () => <li/>;\nconst TodoList = () => <ul/>;\nexport default TodoList;\n";
    let module = transform_module(src);

    assert_eq!(module.component, "TodoList");
    assert_eq!(module.exports[0].exported, "TodoList");
    assert_eq!(module.exports[1].exported, "Item");
    assert!(!module.source.contains("export default"));
}

#[test]
fn test_expression_default_export_gets_a_name() {
    let module = transform_module("const App = () => <div/>;\nexport default memo(App);\n");
    assert_eq!(module.component, DEFAULT_EXPORT_NAME);
    assert!(module
        .source
        .contains("const DefaultExport = memo(App);"));
}

#[test]
fn test_component_falls_back_to_first_capitalized_declaration() {
    let src = "const API_URL = '/api';\nfunction useThing() {}\nfunction Dashboard() { return <section/>; }\n";
    let module = transform_module(src);
    assert_eq!(module.component, "Dashboard");
}

#[test]
fn test_component_falls_back_to_any_declaration_then_app() {
    let module = transform_module("const render = () => <p/>;\n");
    assert_eq!(module.component, "render");
    assert!(module.is_renderable());

    let module = transform_module("<div>plain</div>\n");
    assert_eq!(module.component, FALLBACK_COMPONENT);
}

#[test]
fn test_types_are_stripped_from_typescript_entry() {
    let src = "import React, { useState } from 'react';\n\
               \n\
               interface Todo {\n  id: number;\n  text: string;\n}\n\
               \n\
               export default function App(): JSX.Element {\n\
               \x20 const [todos, setTodos] = useState<Todo[]>([]);\n\
               \x20 const add = (text: string): void => setTodos([...todos, { id: Date.now(), text }]);\n\
               \x20 return <div onClick={() => add('x')}>{todos.length}</div>;\n\
               }\n";
    let module = transform_module(src);

    assert!(!module.source.contains("interface"));
    assert!(!module.source.contains("JSX.Element"));
    assert!(!module.source.contains("Todo[]"));
    assert!(!module.source.contains(": string"));
    assert!(module.source.contains("function App() {"));
    assert!(module.source.contains("useState([])"));
    assert!(module.source.contains("const add = (text) => setTodos"));
    assert!(module.source.contains("<div onClick={() => add('x')}>"));
    assert_eq!(module.component, "App");
}

#[test]
fn test_blank_and_type_only_modules_are_not_renderable() {
    assert!(!transform_module("   \n").is_renderable());

    let module = transform_module("export interface User {\n  name: string;\n}\nexport type Id = string;\n");
    assert!(module.is_blank());
    assert!(!module.is_renderable());
}

#[test]
fn test_plain_script_without_components_is_not_renderable() {
    let module = transform_module("console.log('hi');\n");
    assert!(!module.is_renderable());
}
