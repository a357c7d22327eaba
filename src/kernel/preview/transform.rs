//! Per-module source rewrite: import elision, export unwrapping, type stripping
//! and component detection. JSX is left for the in-browser transpiler.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use rustc_hash::FxHashSet;

use super::typestrip::strip_types;

/// Name bound to an anonymous or expression default export.
pub const DEFAULT_EXPORT_NAME: &str = "DefaultExport";
/// Component mounted when nothing better is found.
pub const FALLBACK_COMPONENT: &str = "App";

lazy_static! {
    static ref SIDE_EFFECT_IMPORT_RE: Regex =
        Regex::new(r#"(?m)^[ \t]*import[ \t]+['"][^'"\n]+['"][ \t]*;?[ \t]*\r?\n?"#)
            .expect("side-effect import pattern");
    static ref IMPORT_RE: Regex = Regex::new(
        r#"(?m)^[ \t]*import[ \t]+([^;'"]+?)[ \t\r\n]+from[ \t]*['"]([^'"\n]+)['"][ \t]*;?[ \t]*\r?\n?"#
    )
    .expect("import pattern");
    static ref EXPORT_DEFAULT_FN_RE: Regex = Regex::new(
        r"(?m)^([ \t]*)export[ \t]+default[ \t]+(async[ \t]+)?function[ \t]*(\*?)[ \t]*([A-Za-z_$][\w$]*)"
    )
    .expect("export default function pattern");
    static ref EXPORT_DEFAULT_ANON_FN_RE: Regex =
        Regex::new(r"(?m)^([ \t]*)export[ \t]+default[ \t]+(async[ \t]+)?function[ \t]*\(")
            .expect("anonymous default function pattern");
    static ref EXPORT_DEFAULT_CLASS_RE: Regex =
        Regex::new(r"(?m)^([ \t]*)export[ \t]+default[ \t]+class[ \t]+([A-Za-z_$][\w$]*)")
            .expect("export default class pattern");
    static ref EXPORT_DEFAULT_NAME_RE: Regex =
        Regex::new(r"(?m)^[ \t]*export[ \t]+default[ \t]+([A-Za-z_$][\w$]*)[ \t]*;?[ \t\r]*$")
            .expect("export default name pattern");
    static ref EXPORT_DEFAULT_EXPR_RE: Regex =
        Regex::new(r"(?m)^([ \t]*)export[ \t]+default[ \t]+").expect("export default pattern");
    static ref EXPORT_DECL_RE: Regex = Regex::new(
        r"(?m)^([ \t]*)export[ \t]+((?:async[ \t]+)?function\*?|const|let|var|class)[ \t]+([A-Za-z_$][\w$]*)"
    )
    .expect("export declaration pattern");
    static ref EXPORT_LIST_RE: Regex = Regex::new(
        r#"(?m)^[ \t]*export[ \t]*(type[ \t]*)?\{([^}]*)\}[ \t]*(from[ \t]*['"][^'"\n]*['"])?[ \t]*;?[ \t]*\r?\n?"#
    )
    .expect("export list pattern");
    static ref EXPORT_STAR_RE: Regex =
        Regex::new(r"(?m)^[ \t]*export[ \t]*\*[^;\n]*;?[ \t]*\r?\n?").expect("export star pattern");
    static ref EXPORT_REST_RE: Regex =
        Regex::new(r"(?m)^([ \t]*)export[ \t]+(const|let|var|enum|abstract|declare|interface|type)\b")
            .expect("export qualifier pattern");
    static ref CAPITALIZED_DECL_RE: Regex =
        Regex::new(r"\b(?:function[ \t]*\*?[ \t]*|(?:const|let|var)[ \t]+)([A-Z][A-Za-z0-9]*[a-z][A-Za-z0-9]*)\b")
            .expect("capitalized declaration pattern");
    static ref ANY_DECL_RE: Regex =
        Regex::new(r"\b(?:function[ \t]*\*?[ \t]*|(?:const|let|var)[ \t]+)([A-Za-z_$][\w$]*)")
            .expect("declaration pattern");
    static ref JSX_RE: Regex =
        Regex::new(r"<(?:[A-Za-z][\w.:-]*[\s/>]|>)").expect("jsx pattern");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedItem {
    Default,
    Namespace,
    Named(String),
}

/// One local binding introduced by an elided import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    pub package: String,
    pub item: ImportedItem,
    pub local: String,
}

impl ImportedName {
    /// The name the binding has inside `package`.
    pub fn source_name(&self) -> &str {
        match &self.item {
            ImportedItem::Named(name) => name,
            ImportedItem::Default | ImportedItem::Namespace => &self.local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedName {
    pub local: String,
    pub exported: String,
}

impl ExportedName {
    fn same(name: &str) -> Self {
        Self {
            local: name.to_string(),
            exported: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedModule {
    pub source: String,
    pub component: String,
    /// Default export first, then declaration order.
    pub exports: Vec<ExportedName>,
    pub imports: Vec<ImportedName>,
    pub default_export: Option<String>,
    has_component_decl: bool,
    has_jsx: bool,
}

impl TransformedModule {
    pub fn is_blank(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Whether the module can be mounted as a component.
    pub fn is_renderable(&self) -> bool {
        !self.is_blank() && (self.has_component_decl || self.has_jsx)
    }

    pub fn imports_from<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a ImportedName> {
        self.imports.iter().filter(move |i| i.package == package)
    }
}

/// Rewrites one module so it can run inside a `text/babel` script.
pub fn transform_module(source: &str) -> TransformedModule {
    let (without_imports, imports) = strip_imports(source);
    let (without_exports, default_export, mut exports) = strip_exports(&without_imports);
    let stripped = strip_types(&without_exports);

    if let Some(name) = &default_export {
        exports.retain(|e| e.exported != *name);
        exports.insert(0, ExportedName::same(name));
    }

    let declared = CAPITALIZED_DECL_RE
        .captures(&stripped)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    let has_component_decl = default_export.is_some() || declared.is_some();
    let component = default_export
        .clone()
        .or(declared)
        .or_else(|| {
            ANY_DECL_RE
                .captures(&stripped)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
        .unwrap_or_else(|| FALLBACK_COMPONENT.to_string());
    let has_jsx = JSX_RE.is_match(&stripped);

    TransformedModule {
        source: stripped,
        component,
        exports,
        imports,
        default_export,
        has_component_decl,
        has_jsx,
    }
}

/// Removes every import declaration and records the names it bound.
pub fn strip_imports(source: &str) -> (String, Vec<ImportedName>) {
    let without_side_effects = SIDE_EFFECT_IMPORT_RE.replace_all(source, "");

    let mut imports = Vec::new();
    let stripped = IMPORT_RE.replace_all(&without_side_effects, |caps: &Captures| {
        let clause = caps.get(1).map_or("", |m| m.as_str());
        let package = caps.get(2).map_or("", |m| m.as_str());
        imports.extend(parse_import_clause(clause, package));
        String::new()
    });

    (stripped.into_owned(), imports)
}

fn parse_import_clause(clause: &str, package: &str) -> Vec<ImportedName> {
    let clause = clause.trim();
    if clause.starts_with("type ") || clause.starts_with("type{") {
        return Vec::new();
    }

    let mut names = Vec::new();
    let (outside, braced) = match (clause.find('{'), clause.rfind('}')) {
        (Some(open), Some(close)) if open < close => (
            format!("{}{}", &clause[..open], &clause[close + 1..]),
            Some(&clause[open + 1..close]),
        ),
        _ => (clause.to_string(), None),
    };

    for part in outside.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(alias) = part.strip_prefix('*') {
            let local = alias.trim().trim_start_matches("as").trim();
            if !local.is_empty() {
                names.push(ImportedName {
                    package: package.to_string(),
                    item: ImportedItem::Namespace,
                    local: local.to_string(),
                });
            }
        } else {
            names.push(ImportedName {
                package: package.to_string(),
                item: ImportedItem::Default,
                local: part.to_string(),
            });
        }
    }

    for part in braced
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.starts_with("type "))
    {
        let (imported, local) = match part.split_once(" as ") {
            Some((imported, local)) => (imported.trim(), local.trim()),
            None => (part, part),
        };
        names.push(ImportedName {
            package: package.to_string(),
            item: ImportedItem::Named(imported.to_string()),
            local: local.to_string(),
        });
    }

    names
}

/// Removes export qualifiers. Returns the rewritten source, the default export
/// name and the named exports.
pub fn strip_exports(source: &str) -> (String, Option<String>, Vec<ExportedName>) {
    let mut default_export: Option<String> = None;
    let mut exports: Vec<ExportedName> = Vec::new();

    let src = EXPORT_DEFAULT_FN_RE.replace_all(source, |caps: &Captures| {
        let name = &caps[4];
        default_export.get_or_insert_with(|| name.to_string());
        format!(
            "{}{}function{} {}",
            &caps[1],
            caps.get(2).map_or("", |m| m.as_str()),
            &caps[3],
            name
        )
    });
    let src = EXPORT_DEFAULT_ANON_FN_RE.replace_all(&src, |caps: &Captures| {
        default_export.get_or_insert_with(|| DEFAULT_EXPORT_NAME.to_string());
        format!(
            "{}{}function {}(",
            &caps[1],
            caps.get(2).map_or("", |m| m.as_str()),
            DEFAULT_EXPORT_NAME
        )
    });
    let src = EXPORT_DEFAULT_CLASS_RE.replace_all(&src, |caps: &Captures| {
        default_export.get_or_insert_with(|| caps[2].to_string());
        format!("{}class {}", &caps[1], &caps[2])
    });
    let src = EXPORT_DEFAULT_NAME_RE.replace_all(&src, |caps: &Captures| {
        default_export.get_or_insert_with(|| caps[1].to_string());
        String::new()
    });
    let src = EXPORT_DEFAULT_EXPR_RE.replace_all(&src, |caps: &Captures| {
        default_export.get_or_insert_with(|| DEFAULT_EXPORT_NAME.to_string());
        format!("{}const {} = ", &caps[1], DEFAULT_EXPORT_NAME)
    });

    let src = EXPORT_DECL_RE.replace_all(&src, |caps: &Captures| {
        exports.push(ExportedName::same(&caps[3]));
        format!("{}{} {}", &caps[1], &caps[2], &caps[3])
    });
    let src = EXPORT_LIST_RE.replace_all(&src, |caps: &Captures| {
        let type_only = caps.get(1).is_some();
        let re_export = caps.get(3).is_some();
        if !type_only && !re_export {
            exports.extend(parse_export_list(&caps[2]));
        }
        String::new()
    });
    let src = EXPORT_STAR_RE.replace_all(&src, "");
    let src = EXPORT_REST_RE.replace_all(&src, "$1$2");

    let mut seen = FxHashSet::default();
    exports.retain(|e| seen.insert(e.exported.clone()));

    (src.into_owned(), default_export, exports)
}

fn parse_export_list(list: &str) -> Vec<ExportedName> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.starts_with("type "))
        .map(|part| match part.split_once(" as ") {
            Some((local, exported)) => ExportedName {
                local: local.trim().to_string(),
                exported: exported.trim().to_string(),
            },
            None => ExportedName::same(part),
        })
        .collect()
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/preview/transform.rs"]
mod tests;
