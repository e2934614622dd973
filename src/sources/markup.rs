//! Wikitext handling.
//!
//! This is not a wikitext parser: it only knows enough of the syntax to list
//! internal links and to produce a readable plain text where mentions can be
//! matched.
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINK_TARGET: Regex = Regex::new(r"\[\[([^\[\]|\n]+)").unwrap();
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref REF_EMPTY: Regex = Regex::new(r"(?i)<ref[^>]*/>").unwrap();
    static ref REF: Regex = Regex::new(r"(?is)<ref[^>]*>.*?</ref\s*>").unwrap();
    static ref EXTERNAL_LINK: Regex =
        Regex::new(r"\[(?:https?:)?//[^\s\]]+\s*([^\]]*)\]").unwrap();
    static ref EMPHASIS: Regex = Regex::new(r"'{2,}").unwrap();
    static ref HEADING: Regex = Regex::new(r"(?m)^=+[ \t]*(.*?)[ \t]*=+[ \t]*$").unwrap();
    static ref LIST_MARKER: Regex = Regex::new(r"(?m)^[*#:;]+[ \t]*").unwrap();
    static ref HTML_TAG: Regex = Regex::new(r"</?[a-zA-Z][^>]*>").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Link namespaces that are not rendered as text.
const HIDDEN_LINK_NAMESPACES: [&str; 4] = ["file", "image", "category", "media"];

const ENTITIES: [(&str, &str); 7] = [
    ("&nbsp;", " "),
    ("&ndash;", "–"),
    ("&mdash;", "—"),
    ("&quot;", "\""),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
];

/// Normalize a link target: strips anchors, leading colons and underscores.
fn clean_target(raw: &str) -> Option<String> {
    let target = raw.split('#').next().unwrap_or_default();
    let target = target.trim().trim_start_matches(':').replace('_', " ");
    let target = target.trim();
    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}

/// List the targets of every internal link, in order of appearance.
///
/// Duplicates are kept. Same-page anchors (`[[#History]]`) are skipped.
pub fn links(markup: &str) -> Vec<String> {
    LINK_TARGET
        .captures_iter(markup)
        .filter_map(|cap| cap.get(1).and_then(|m| clean_target(m.as_str())))
        .collect()
}

/// Remove every `open ... close` block, supporting nesting.
///
/// Unbalanced closing delimiters are kept as is.
fn strip_nested(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut rest = text;

    while !rest.is_empty() {
        if rest.starts_with(open) {
            depth += 1;
            rest = &rest[open.len()..];
        } else if depth > 0 && rest.starts_with(close) {
            depth -= 1;
            rest = &rest[close.len()..];
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                if depth == 0 {
                    out.push(c);
                }
            }
            rest = chars.as_str();
        }
    }

    out
}

/// Is the link prefix a namespace or interwiki prefix that hides the link?
fn is_hidden_link(inner: &str) -> bool {
    if inner.starts_with(':') {
        // [[:Category:Foo]] is a visible link
        return false;
    }
    match inner.split_once(':') {
        Some((prefix, _)) => {
            let prefix = prefix.trim();
            // interlanguage links are written with a lowercase language code
            let interwiki = prefix.len() >= 2
                && prefix.len() <= 12
                && prefix.chars().all(|c| c.is_ascii_lowercase() || c == '-');
            interwiki || HIDDEN_LINK_NAMESPACES.contains(&prefix.to_lowercase().as_str())
        }
        None => false,
    }
}

/// Find the index of the `]]` closing the link whose content starts at `text`.
fn closing_brackets(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'[', b'[') => {
                depth += 1;
                i += 2;
            }
            (b']', b']') => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
                i += 2;
            }
            _ => i += 1,
        }
    }
    None
}

/// Replace internal links by their label.
fn render_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("[[") {
        out.push_str(&rest[..start]);
        let inner_start = &rest[start + 2..];
        match closing_brackets(inner_start) {
            Some(end) => {
                let inner = &inner_start[..end];
                if !is_hidden_link(inner) {
                    let label = match inner.split_once('|') {
                        Some((_, label)) => label,
                        None => inner.trim_start_matches(':'),
                    };
                    out.push_str(&render_links(label));
                }
                rest = &inner_start[end + 2..];
            }
            None => {
                // unbalanced, keep the rest verbatim
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    out
}

/// Convert wikitext into plain text.
pub fn plain_text(markup: &str) -> String {
    let text = COMMENT.replace_all(markup, "");
    let text = REF_EMPTY.replace_all(&text, "");
    let text = REF.replace_all(&text, "");
    let text = strip_nested(&text, "{{", "}}");
    let text = strip_nested(&text, "{|", "|}");
    let text = render_links(&text);
    let text = EXTERNAL_LINK.replace_all(&text, "$1");
    let text = EMPHASIS.replace_all(&text, "");
    let text = HEADING.replace_all(&text, "$1");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = HTML_TAG.replace_all(&text, "");

    let mut text = text.into_owned();
    for (entity, replacement) in ENTITIES.iter() {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }

    BLANK_LINES.replace_all(text.trim(), "\n\n").into_owned()
}
