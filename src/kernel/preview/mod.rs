//! Preview synthesis: turns a generated project into one HTML document that can
//! be rendered in a sandboxed frame without a build step.

mod informational;
mod shell;
mod shim;
mod static_html;
mod transform;
mod typestrip;

pub use informational::{escape_html, informational_page};
pub use shell::{clean_css, escape_script, REACT_GLOBALS};
pub use shim::{BuiltinShim, ComponentShim, SHIM_GLOBAL};
pub use static_html::{inject_assets, is_build_shell, INDEX_CANDIDATES};
pub use transform::{
    transform_module, ExportedName, ImportedItem, ImportedName, TransformedModule,
    DEFAULT_EXPORT_NAME, FALLBACK_COMPONENT,
};
pub use typestrip::strip_types;

use std::path::Path;

use crate::models::FileMap;
use shell::ShellModule;

/// Component entry points, in priority order.
pub const COMPONENT_ENTRIES: [&str; 6] = [
    "src/App.tsx",
    "src/App.jsx",
    "App.tsx",
    "App.jsx",
    "src/app.tsx",
    "src/App.js",
];

const MODULE_EXTENSIONS: [&str; 4] = ["tsx", "jsx", "ts", "js"];
const LIBRARY_DIRS: [&str; 6] = ["lib", "utils", "hooks", "types", "data", "context"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewKind {
    StaticHtml { entry: String },
    Component { entry: String, component: String },
    Informational { entry: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    pub html: String,
    pub kind: PreviewKind,
}

impl PreviewDocument {
    pub fn entry(&self) -> &str {
        match &self.kind {
            PreviewKind::StaticHtml { entry }
            | PreviewKind::Component { entry, .. }
            | PreviewKind::Informational { entry } => entry,
        }
    }

    pub fn is_live(&self) -> bool {
        !matches!(self.kind, PreviewKind::Informational { .. })
    }
}

pub struct PreviewSynthesizer {
    shim: Box<dyn ComponentShim>,
}

impl std::fmt::Debug for PreviewSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSynthesizer")
            .field("shim_version", &self.shim.version())
            .finish()
    }
}

impl Default for PreviewSynthesizer {
    fn default() -> Self {
        Self::new(Box::new(BuiltinShim))
    }
}

impl PreviewSynthesizer {
    pub fn new(shim: Box<dyn ComponentShim>) -> Self {
        Self { shim }
    }

    /// `None` when the project has neither a usable `index.html` nor a component entry.
    pub fn synthesize(&self, files: &FileMap) -> Option<PreviewDocument> {
        let entry = component_entry(files);

        if let Some((path, html)) = static_html::find_index(files) {
            if entry.is_none() || !static_html::is_build_shell(html) {
                tracing::debug!(entry = path, "static html preview");
                return Some(PreviewDocument {
                    html: static_html::inject_assets(html, files),
                    kind: PreviewKind::StaticHtml {
                        entry: path.to_string(),
                    },
                });
            }
        }

        let (entry_path, source) = entry?;
        let transformed = transform_module(source);
        if !transformed.is_renderable() {
            tracing::debug!(entry = entry_path, "entry not renderable, informational page");
            return Some(PreviewDocument {
                html: informational_page(files, entry_path),
                kind: PreviewKind::Informational {
                    entry: entry_path.to_string(),
                },
            });
        }

        let modules = component_modules(files, entry_path);
        let shell_modules: Vec<ShellModule<'_>> = modules
            .iter()
            .map(|(path, module)| ShellModule { path, module })
            .collect();
        let html = shell::render_shell(
            ShellModule {
                path: entry_path,
                module: &transformed,
            },
            &shell_modules,
            files,
            self.shim.as_ref(),
        );

        tracing::debug!(
            entry = entry_path,
            component = %transformed.component,
            modules = modules.len(),
            shim = self.shim.version(),
            "component preview"
        );
        Some(PreviewDocument {
            html,
            kind: PreviewKind::Component {
                entry: entry_path.to_string(),
                component: transformed.component,
            },
        })
    }
}

/// Synthesizes a preview with the built-in shim.
pub fn build_preview(files: &FileMap) -> Option<PreviewDocument> {
    PreviewSynthesizer::default().synthesize(files)
}

pub fn component_entry(files: &FileMap) -> Option<(&'static str, &str)> {
    COMPONENT_ENTRIES
        .iter()
        .find_map(|path| files.get(*path).map(|src| (*path, src.as_str())))
}

/// Transformed sibling modules of `entry`, in binding order.
fn component_modules<'a>(files: &'a FileMap, entry: &str) -> Vec<(&'a str, TransformedModule)> {
    let root = match entry.rfind('/') {
        Some(idx) => &entry[..=idx],
        None => "",
    };

    let mut modules: Vec<(u8, &'a str, TransformedModule)> = files
        .iter()
        .filter(|(path, _)| path.as_str() != entry && path.starts_with(root))
        .filter(|(path, _)| is_component_module(path))
        .map(|(path, src)| (module_rank(path), path.as_str(), transform_module(src)))
        .filter(|(_, _, module)| !module.is_blank())
        .collect();
    modules.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    modules
        .into_iter()
        .map(|(_, path, module)| (path, module))
        .collect()
}

fn is_component_module(path: &str) -> bool {
    let p = Path::new(path);
    let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !MODULE_EXTENSIONS.contains(&ext) {
        return false;
    }

    let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = name.split('.').next().unwrap_or("");
    let lower = name.to_ascii_lowercase();
    let bootstrap = stem == "main" || stem == "index";
    let config = lower.contains("config");
    let declaration = lower.ends_with(".d.ts");
    let test = lower.contains(".test.") || lower.contains(".spec.") || lower.starts_with("setuptests");
    let excluded_dir = path.split('/').any(|seg| seg == "node_modules" || seg == "__tests__")
        || path.contains("components/ui/");

    !(bootstrap || config || declaration || test || excluded_dir)
}

fn module_rank(path: &str) -> u8 {
    let dirs: Vec<&str> = path.split('/').collect();
    let dirs = &dirs[..dirs.len().saturating_sub(1)];
    if dirs.iter().any(|d| LIBRARY_DIRS.contains(d)) {
        0
    } else if dirs.contains(&"components") {
        1
    } else {
        2
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/preview/mod.rs"]
mod tests;
