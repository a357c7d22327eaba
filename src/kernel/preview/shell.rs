//! Assembles transformed modules into one self-contained HTML document.

use lazy_static::lazy_static;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::fmt::Write as _;

use super::shim::ComponentShim;
use super::transform::{ImportedItem, ImportedName, TransformedModule};
use crate::models::FileMap;

pub const REACT_URL: &str = "https://unpkg.com/react@18/umd/react.development.js";
pub const REACT_DOM_URL: &str = "https://unpkg.com/react-dom@18/umd/react-dom.development.js";
pub const BABEL_URL: &str = "https://unpkg.com/@babel/standalone/babel.min.js";
pub const TAILWIND_URL: &str = "https://cdn.tailwindcss.com";

/// React exports exposed as page globals ahead of every module.
pub const REACT_GLOBALS: &[&str] = &[
    "useState",
    "useEffect",
    "useRef",
    "useMemo",
    "useCallback",
    "useContext",
    "useReducer",
    "useLayoutEffect",
    "useId",
    "useTransition",
    "useDeferredValue",
    "createContext",
    "forwardRef",
    "memo",
    "Fragment",
];

lazy_static! {
    static ref TAILWIND_DIRECTIVE_RE: Regex =
        Regex::new(r"(?m)^[ \t]*@(?:tailwind|config|plugin)\b[^;\n]*;?[ \t]*\r?\n?")
            .expect("tailwind directive pattern");
    static ref APPLY_RE: Regex = Regex::new(r"@apply\b[^;}\n]*;?").expect("apply pattern");
    static ref TAILWIND_IMPORT_RE: Regex = Regex::new(
        r#"(?m)^[ \t]*@import[ \t]+(?:url\()?["']tailwindcss[^"']*["']\)?[^;\n]*;?[ \t]*\r?\n?"#
    )
    .expect("tailwind import pattern");
    static ref SCRIPT_CLOSE_RE: Regex = Regex::new(r"(?i)</script").expect("script close pattern");
    static ref STYLE_CLOSE_RE: Regex = Regex::new(r"(?i)</style").expect("style close pattern");
}

pub struct ShellModule<'a> {
    pub path: &'a str,
    pub module: &'a TransformedModule,
}

/// Removes Tailwind build-time directives the CDN runtime does not understand.
pub fn clean_css(css: &str) -> String {
    let css = TAILWIND_DIRECTIVE_RE.replace_all(css, "");
    let css = TAILWIND_IMPORT_RE.replace_all(&css, "");
    APPLY_RE.replace_all(&css, "").into_owned()
}

pub fn escape_script(code: &str) -> String {
    SCRIPT_CLOSE_RE.replace_all(code, "<\\/script").into_owned()
}

fn is_local_package(package: &str) -> bool {
    package.starts_with('.')
        || package.starts_with('/')
        || package.starts_with("@/")
        || package.starts_with("~/")
        || package.starts_with("src/")
}

pub fn render_shell(
    entry: ShellModule<'_>,
    modules: &[ShellModule<'_>],
    files: &FileMap,
    shim: &dyn ComponentShim,
) -> String {
    let mut bound: FxHashSet<String> = REACT_GLOBALS.iter().map(|s| s.to_string()).collect();
    bound.insert("React".to_string());
    bound.insert("ReactDOM".to_string());

    // The mounted component must keep its name, so the entry binds first.
    let mut entry_names: Vec<String> = entry
        .module
        .exports
        .iter()
        .map(|e| e.exported.clone())
        .collect();
    if !entry_names.contains(&entry.module.component) {
        entry_names.push(entry.module.component.clone());
    }
    entry_names.retain(|name| bound.insert(name.clone()));

    let mut module_names: Vec<Vec<String>> = Vec::with_capacity(modules.len());
    for module in modules {
        let names = module
            .module
            .exports
            .iter()
            .filter(|e| bound.insert(e.exported.clone()))
            .map(|e| e.exported.clone())
            .collect();
        module_names.push(names);
    }

    let mut import_bindings = String::new();
    for import in modules
        .iter()
        .chain(std::iter::once(&entry))
        .flat_map(|m| m.module.imports.iter())
    {
        if bound.contains(&import.local) {
            continue;
        }
        if let Some(expr) = import_binding(import, shim) {
            bound.insert(import.local.clone());
            let _ = writeln!(import_bindings, "const {} = {};", import.local, expr);
        }
    }

    let mut script = String::new();
    let _ = writeln!(script, "const {{ {} }} = React;", REACT_GLOBALS.join(", "));
    script.push_str(&import_bindings);
    for (module, names) in modules.iter().zip(&module_names) {
        script.push('\n');
        script.push_str(&wrap_module(module, names));
    }
    script.push('\n');
    script.push_str(&wrap_module(&entry, &entry_names));
    let _ = write!(
        script,
        "\nReactDOM.createRoot(document.getElementById(\"root\")).render(React.createElement({}));\n",
        entry.module.component
    );

    let css: String = files
        .iter()
        .filter(|(path, _)| path.ends_with(".css"))
        .map(|(_, css)| clean_css(css))
        .collect::<Vec<_>>()
        .join("\n");
    let css = STYLE_CLOSE_RE.replace_all(&css, "<\\/style");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Preview</title>
  <script src="{TAILWIND_URL}"></script>
  <script crossorigin src="{REACT_URL}"></script>
  <script crossorigin src="{REACT_DOM_URL}"></script>
  <script src="{BABEL_URL}"></script>
  <style>
    body {{ margin: 0; font-family: system-ui, sans-serif; }}
{css}
  </style>
</head>
<body>
  <div id="root"></div>
  <script>
window.addEventListener("error", function (event) {{
  var root = document.getElementById("root");
  if (!root || root.hasChildNodes()) return;
  var pre = document.createElement("pre");
  pre.style.cssText = "color:#b91c1c;padding:1rem;white-space:pre-wrap;font-family:ui-monospace,monospace";
  pre.textContent = "Preview error: " + event.message;
  root.appendChild(pre);
}});
{shim}
  </script>
  <script type="text/babel" data-presets="react">
{script}
  </script>
</body>
</html>
"#,
        css = css,
        shim = shim.install_script(),
        script = escape_script(&script),
    )
}

fn import_binding(import: &ImportedName, shim: &dyn ComponentShim) -> Option<String> {
    let package = import.package.as_str();
    if package == "react" {
        return match &import.item {
            ImportedItem::Named(name) => Some(format!("React.{name}")),
            ImportedItem::Default | ImportedItem::Namespace => Some("React".to_string()),
        };
    }
    if package.starts_with("react-dom") {
        return match &import.item {
            ImportedItem::Named(name) => Some(format!("ReactDOM.{name}")),
            ImportedItem::Default | ImportedItem::Namespace => Some("ReactDOM".to_string()),
        };
    }
    if is_local_package(package) && !package.contains("components/ui") {
        return None;
    }
    shim.bind_import(package, import.source_name())
}

/// Wraps a module in an IIFE so its locals stay private, binding `names` at top level.
fn wrap_module(module: &ShellModule<'_>, names: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// {}", module.path);

    let locals: Vec<(&str, &str)> = names
        .iter()
        .map(|exported| {
            let local = module
                .module
                .exports
                .iter()
                .find(|e| e.exported == *exported)
                .map_or(exported.as_str(), |e| e.local.as_str());
            (exported.as_str(), local)
        })
        .collect();

    if locals.is_empty() {
        out.push_str("(() => {\n");
    } else {
        let list: Vec<&str> = locals.iter().map(|(exported, _)| *exported).collect();
        let _ = writeln!(out, "const {{ {} }} = (() => {{", list.join(", "));
    }

    out.push_str(module.module.source.trim_end());
    out.push('\n');

    if !locals.is_empty() {
        let fields: Vec<String> = locals
            .iter()
            .map(|(exported, local)| {
                format!("{exported}: typeof {local} === \"undefined\" ? undefined : {local}")
            })
            .collect();
        let _ = writeln!(out, "return {{ {} }};", fields.join(", "));
    }
    out.push_str("})();\n");
    out
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/preview/shell.rs"]
mod tests;
