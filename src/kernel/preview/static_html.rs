use lazy_static::lazy_static;
use regex::Regex;

use crate::models::FileMap;

pub const INDEX_CANDIDATES: [&str; 2] = ["index.html", "public/index.html"];

lazy_static! {
    static ref MODULE_SCRIPT_RE: Regex =
        Regex::new(r#"(?i)<script\b[^>]*\bsrc\s*=\s*["'][^"']+\.(?:tsx?|jsx)["']"#)
            .expect("module script pattern");
}

/// First non-blank index document.
pub fn find_index(files: &FileMap) -> Option<(&'static str, &str)> {
    INDEX_CANDIDATES.iter().find_map(|path| {
        files
            .get(*path)
            .filter(|html| !html.trim().is_empty())
            .map(|html| (*path, html.as_str()))
    })
}

/// A bundler shell that loads TypeScript/JSX sources the browser cannot run.
pub fn is_build_shell(html: &str) -> bool {
    MODULE_SCRIPT_RE.is_match(html)
}

/// Injects every stylesheet before `</head>` and every non-config script before `</body>`.
pub fn inject_assets(html: &str, files: &FileMap) -> String {
    let mut out = html.to_string();

    for (_, css) in files.iter().filter(|(path, _)| path.ends_with(".css")) {
        out = out.replacen("</head>", &format!("<style>{css}</style></head>"), 1);
    }
    for (_, js) in files
        .iter()
        .filter(|(path, _)| path.ends_with(".js") && !path.contains("config"))
    {
        out = out.replacen("</body>", &format!("<script>{js}</script></body>"), 1);
    }

    out
}
