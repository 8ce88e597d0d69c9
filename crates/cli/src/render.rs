use std::fmt::Write as _;
use zoomer_annotations::{AnnotationKey, AnnotationStore};
use zoomer_config::{FieldKind, ProjectConfig};
use zoomer_indexer::{IndexedFile, ProjectIndex};

const STYLE: &str = r#"
* { box-sizing: border-box; }
body { background: #16213e; color: #e4e4e4; font-family: -apple-system, 'Segoe UI', sans-serif; line-height: 1.6; margin: 0; padding: 20px; }
.container { max-width: 1400px; margin: 0 auto; }
header { background: rgba(255,255,255,0.05); border-radius: 12px; padding: 24px 32px; margin-bottom: 30px; }
header span { color: #a0a0a0; font-family: monospace; }
h4 { text-align: center; margin: 40px 0 25px 0; padding: 15px; background: rgba(255,255,255,0.05); border-left: 4px solid #667eea; border-radius: 8px; }
.mark { scroll-margin-top: 100px; }
pre { background: #1e1e1e; padding: 20px; border-radius: 8px; overflow-x: auto; margin: 0 0 20px 0; }
code { font-family: 'Fira Code', Consolas, monospace; font-size: 0.95em; }
.fields { background: rgba(102,126,234,0.1); border: 1px solid rgba(102,126,234,0.3); border-radius: 8px; padding: 20px; margin-bottom: 20px; }
.fields > .segment { color: #4ade80; font-family: monospace; font-weight: 600; margin-bottom: 15px; word-break: break-all; }
.field { margin-bottom: 15px; }
.field textarea { display: block; width: 100%; min-height: 80px; background: #1e1e1e; color: #e4e4e4; border: 1px solid rgba(255,255,255,0.2); border-radius: 6px; padding: 12px; }
.float-right { position: fixed; bottom: 30px; right: 30px; display: flex; flex-direction: column; gap: 12px; }
.float-right select, .go-top { background: #667eea; color: white; border: none; padding: 12px 16px; border-radius: 8px; text-decoration: none; text-align: center; }
"#;

const SCRIPT: &str = r#"
hljs.highlightAll();

function saveChange(el) {
    var value = el.type === "checkbox" ? (el.checked ? "1" : "0") : el.value;
    fetch("/save", {
        method: "POST",
        headers: { "Content-Type": "application/x-www-form-urlencoded" },
        body: new URLSearchParams({ name: el.name, value: value })
    }).then(function (res) {
        if (!res.ok) { console.error("save failed", res.status, el.name); }
    });
}
"#;

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Anchor id for a file section; path separators become dots.
pub(crate) fn file_anchor(path: &str) -> String {
    path.replace('/', ".")
}

/// Render the whole review page: every indexed file, each segment's code
/// followed by its field controls prefilled from the store.
pub(crate) fn render_page(
    config: &ProjectConfig,
    root_display: &str,
    index: &ProjectIndex,
    store: &AnnotationStore,
) -> String {
    let title = escape_html(&config.project_name);
    let mut html = String::with_capacity(16 * 1024);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html data-theme="dark">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>{STYLE}</style>
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.8.0/styles/github-dark.min.css">
<script src="https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.8.0/highlight.min.js"></script>
</head>
<body>
<div class="container">
<header><h1 id="top">{title}</h1><span>{root}</span></header>
"#,
        root = escape_html(root_display),
    );

    html.push_str(r#"<div class="float-right"><select onchange="location = this.value;">"#);
    for path in index.list_files() {
        let _ = write!(
            html,
            r##"<option value="#{anchor}">{label}</option>"##,
            anchor = escape_html(&file_anchor(path)),
            label = escape_html(path),
        );
    }
    html.push_str(r##"</select><a href="#top" class="go-top">Top</a></div>"##);

    html.push_str(r#"<div class="content"><h3>Project Files</h3>"#);
    for file in index.iter() {
        render_file(&mut html, config, file, store);
    }
    html.push_str("</div></div>");

    let _ = write!(html, "<script>{SCRIPT}</script>\n</body>\n</html>\n");
    html
}

fn render_file(html: &mut String, config: &ProjectConfig, file: &IndexedFile, store: &AnnotationStore) {
    let _ = write!(
        html,
        r#"<div id="{anchor}" class="mark"></div><h4>{path}</h4><div class="codes">"#,
        anchor = escape_html(&file_anchor(file.path())),
        path = escape_html(file.path()),
    );

    for span in file.spans() {
        let code = file.span_lines(&span).join("\n");
        if config.lang_highlight.is_empty() {
            html.push_str("<pre><code>");
        } else {
            let _ = write!(
                html,
                r#"<pre><code class="{}">"#,
                escape_html(&config.lang_highlight)
            );
        }
        html.push_str(&escape_html(&code));
        html.push_str("</code></pre>");

        if let Some(label) = span.label {
            render_fields(html, config, file.path(), label, store);
        }
    }

    html.push_str("</div>");
}

/// Field controls for one segment. Identities the store would reject (an
/// empty label, or `<>` in the path or label) are shown read-only.
fn render_fields(
    html: &mut String,
    config: &ProjectConfig,
    path: &str,
    segment: &str,
    store: &AnnotationStore,
) {
    if config.user_fields.is_empty() {
        return;
    }

    let keys: Vec<_> = match config
        .user_fields
        .iter()
        .map(|field| AnnotationKey::new(path, segment, &field.name).map(|key| (field, key)))
        .collect::<Result<_, _>>()
    {
        Ok(keys) => keys,
        Err(err) => {
            log::debug!("No review fields for segment '{segment}' of {path}: {err}");
            return;
        }
    };

    let _ = write!(
        html,
        r#"<div class="fields"><div class="segment">{}</div>"#,
        escape_html(segment)
    );
    for (field, key) in keys {
        let name = escape_html(&key.compose());
        let label = escape_html(&field.name);
        let value = store.get_key(&key);

        html.push_str(r#"<div class="field">"#);
        match field.kind {
            FieldKind::Boolean => {
                let checked = if value == "1" { " checked" } else { "" };
                let _ = write!(
                    html,
                    r#"<label><input type="checkbox" name="{name}" value="1"{checked} onchange="saveChange(this)"> {label}</label>"#,
                );
            }
            FieldKind::Text => {
                let _ = write!(
                    html,
                    r#"<label>{label}<br/><textarea name="{name}" onchange="saveChange(this)">{value}</textarea></label>"#,
                    value = escape_html(&value),
                );
            }
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
}
