use std::path::Path;

/// Language tag handed to the editor widget when a file is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    TypeScript,
    JavaScript,
    Json,
    Html,
    Css,
    Scss,
    Markdown,
    Python,
    Sql,
    Yaml,
    Toml,
    PlainText,
}

impl LanguageId {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let Some(ext) = path.as_ref().extension().and_then(|s| s.to_str()) else {
            return Self::PlainText;
        };
        match ext.to_ascii_lowercase().as_str() {
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "json" => Self::Json,
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "scss" => Self::Scss,
            "md" => Self::Markdown,
            "py" => Self::Python,
            "sql" => Self::Sql,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            _ => Self::PlainText,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Json => "json",
            Self::Html => "html",
            Self::Css => "css",
            Self::Scss => "scss",
            Self::Markdown => "markdown",
            Self::Python => "python",
            Self::Sql => "sql",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::PlainText => "plaintext",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::TypeScript => "TypeScript",
            Self::JavaScript => "JavaScript",
            Self::Json => "JSON",
            Self::Html => "HTML",
            Self::Css => "CSS",
            Self::Scss => "SCSS",
            Self::Markdown => "Markdown",
            Self::Python => "Python",
            Self::Sql => "SQL",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::PlainText => "Plain Text",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/language.rs"]
mod tests;
