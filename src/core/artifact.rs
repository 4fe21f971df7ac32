pub const HTML_MIME: &str = "text/html";
pub const ARTIFACT_EXTENSION: &str = "html";
const FALLBACK_STEM: &str = "mindmap";
const TRANSFORM_CALL: &str = "transformer.transform(";

const D3_URL: &str = "https://cdn.jsdelivr.net/npm/d3@7";
const MARKMAP_LIB_URL: &str = "https://cdn.jsdelivr.net/npm/markmap-lib";
const MARKMAP_VIEW_URL: &str = "https://cdn.jsdelivr.net/npm/markmap-view";

/// A rendered mind map ready to be offered for download.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub file_name: String,
    pub mime: &'static str,
    pub html: String,
}

impl Artifact {
    pub fn new(topic: &str, markdown: &str) -> Self {
        Self {
            file_name: artifact_file_name(topic),
            mime: HTML_MIME,
            html: build_html(topic, markdown),
        }
    }
}

/// Encode `markdown` as a JSON string literal that is also safe inside an
/// inline `<script>` element.
pub fn script_literal(markdown: &str) -> String {
    // Serializing a str cannot fail; fall back to an empty literal regardless.
    let json = serde_json::to_string(markdown).unwrap_or_else(|_| "\"\"".to_string());

    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn build_html(topic: &str, markdown: &str) -> String {
    let title = html_escape::encode_text(topic);
    let literal = script_literal(markdown);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Markmap: {title}</title>
<style>
* {{ margin: 0; padding: 0; }}
#mindmap {{ display: block; height: 100vh; width: 100vw; }}
</style>
<script src="{D3_URL}"></script>
<script src="{MARKMAP_LIB_URL}"></script>
<script src="{MARKMAP_VIEW_URL}"></script>
</head>
<body>
<svg id="mindmap"></svg>
<script>
((markmap) => {{
  const {{ Transformer, Markmap, loadCSS, loadJS }} = markmap;
  const transformer = new Transformer();
  const {{ root, features }} = transformer.transform({literal});
  const {{ styles, scripts }} = transformer.getUsedAssets(features);
  if (styles) loadCSS(styles);
  if (scripts) loadJS(scripts, {{ getMarkmap: () => markmap }});
  Markmap.create('#mindmap', undefined, root);
}})(window.markmap);
</script>
</body>
</html>
"#
    )
}

/// Recover the Markdown embedded in a document produced by [`build_html`].
pub fn embedded_markdown(html: &str) -> Option<String> {
    let start = html.find(TRANSFORM_CALL)? + TRANSFORM_CALL.len();
    let end = start + html[start..].find(");\n")?;
    serde_json::from_str(&html[start..end]).ok()
}

/// Collapse every run of non-alphanumeric characters in `topic` to a single
/// `_`, lower-case it and add the `.html` extension.
pub fn artifact_file_name(topic: &str) -> String {
    let mut stem = String::with_capacity(topic.len());
    let mut in_gap = false;

    for c in topic.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
            in_gap = false;
        } else if !in_gap {
            stem.push('_');
            in_gap = true;
        }
    }

    if stem.is_empty() {
        stem.push_str(FALLBACK_STEM);
    }

    format!("{stem}.{ARTIFACT_EXTENSION}")
}
