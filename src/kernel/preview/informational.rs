use crate::models::FileMap;

/// Deterministic page shown when a component entry exists but cannot be mounted.
pub fn informational_page(files: &FileMap, entry: &str) -> String {
    let mut list = String::new();
    for path in files.keys() {
        list.push_str("        <li><code>");
        list.push_str(&escape_html(path));
        list.push_str("</code></li>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Preview</title>
  <style>
    body {{ margin: 0; font-family: system-ui, sans-serif; background: #f8fafc; }}
    .card {{ max-width: 480px; margin: 3rem auto; padding: 2rem; background: #fff; border-radius: 12px; box-shadow: 0 1px 3px rgba(15, 23, 42, 0.1); }}
    h2 {{ color: #3b82f6; margin: 0 0 1rem; text-align: center; }}
    p, li {{ color: #475569; }}
    ul {{ font-size: 0.875rem; }}
  </style>
</head>
<body>
  <div id="root">
    <div class="card">
      <h2>Project Generated</h2>
      <p>The entry <code>{entry}</code> could not be rendered live. To run the full app:</p>
      <ol>
        <li>Export the project as ZIP</li>
        <li>Extract and run <code>npm install</code></li>
        <li>Run <code>npm run dev</code></li>
      </ol>
      <p>Files ({count}):</p>
      <ul>
{list}      </ul>
    </div>
  </div>
</body>
</html>
"#,
        entry = escape_html(entry),
        count = files.len(),
        list = list,
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
