//! Helpers for assembling the HTML preview fragments.
//!
//! Field values are escaped before they are embedded, and `**emphasis**` markup is rendered as
//! `<strong>` so the preview shows the same emphasis the print layout does.

use std::fmt::Write as _;

use crate::richtext::parse_emphasis;

/// Escapes the characters that are significant in HTML text and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escapes `text` and renders its emphasis markup as `<strong>` elements.
pub fn rich(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    for span in parse_emphasis(text) {
        if span.is_bold() {
            let _ = write!(html, "<strong>{}</strong>", escape(span.text()));
        } else {
            html.push_str(&escape(span.text()));
        }
    }
    html
}

/// A `<div>` per line, each prefixed by `marker(index)`.
pub fn line_blocks<F>(lines: &[&str], class: &str, marker: F) -> String
where
    F: Fn(usize) -> String,
{
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            format!(
                r#"<div class="{}">{}{}</div>"#,
                class,
                marker(index),
                rich(line)
            )
        })
        .collect()
}

/// A `<div>` per line, numbered 1, 2, 3… in order.
pub fn numbered_blocks(lines: &[&str], class: &str) -> String {
    line_blocks(lines, class, |index| format!("{}. ", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape(r#"<script>alert("x & 'y'")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; &#39;y&#39;&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn rich_renders_emphasis_and_escapes() {
        assert_eq!(rich("a **<b>** c"), "a <strong>&lt;b&gt;</strong> c");
        assert_eq!(rich("**open"), "**open");
    }

    #[test]
    fn numbered_blocks_count_from_one() {
        assert_eq!(
            numbered_blocks(&["x", "y"], "mb-2"),
            r#"<div class="mb-2">1. x</div><div class="mb-2">2. y</div>"#
        );
    }
}
