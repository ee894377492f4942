//! Utilities for working with styled text fragments.
//!
//! Free-text fields accept a single inline convention: a span wrapped in double asterisks
//! (`**like this**`) is emphasized.  [`parse_emphasis`] turns such a string into a list of
//! [`Span`]s, which is the representation carried by the layout tree in [`crate::model`] and
//! eventually converted into [`genpdf`][genpdf] styled strings by the renderer.
//!
//! [genpdf]: https://docs.rs/genpdf/

use genpdf::style::{Style, StyledString};
use serde::{Deserialize, Serialize};

/// Marker that opens and closes an emphasized span.
pub const EMPHASIS_MARKER: &str = "**";

/// A slice of text together with its emphasis flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    bold: bool,
}

impl Span {
    /// Creates a new plain span with the provided text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    /// Returns the raw text contained in this span.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns whether the span should be rendered in bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Sets the bold flag and returns the updated span.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Convenience shorthand that marks the span as bold.
    pub fn bold(self) -> Self {
        self.with_bold(true)
    }

    fn to_style(&self) -> Style {
        let mut style = Style::new();
        if self.bold {
            style.set_bold();
        }
        style
    }

    /// Converts the span to a [`StyledString`].
    pub fn to_styled_string(&self) -> StyledString {
        StyledString::new(self.text.clone(), self.to_style())
    }
}

impl From<&Span> for StyledString {
    fn from(span: &Span) -> Self {
        span.to_styled_string()
    }
}

impl From<Span> for StyledString {
    fn from(span: Span) -> Self {
        span.to_styled_string()
    }
}

impl From<&str> for Span {
    fn from(text: &str) -> Self {
        Span::new(text)
    }
}

impl From<String> for Span {
    fn from(text: String) -> Self {
        Span::new(text)
    }
}

/// A styled span ready to be consumed by `genpdf` elements together with the underline flag.
#[derive(Clone, Debug)]
pub struct StyledSpan {
    /// The styled text fragment.
    pub string: StyledString,
    /// Whether the fragment should be rendered with an underline.
    pub underline: bool,
}

impl StyledSpan {
    /// Creates a new styled span.
    pub fn new(string: StyledString, underline: bool) -> Self {
        Self { string, underline }
    }
}

/// Converts spans into styled strings, applying `base` underneath each span's own style.
pub fn spans_to_styled_strings<'a, I>(spans: I, base: Style, underline: bool) -> Vec<StyledSpan>
where
    I: IntoIterator<Item = &'a Span>,
{
    spans
        .into_iter()
        .map(|span| {
            let mut string = span.to_styled_string();
            string.style = base.and(string.style);
            StyledSpan::new(string, underline)
        })
        .collect()
}

/// Joins the text of `spans` back together without any markup.
pub fn plain_text(spans: &[Span]) -> String {
    spans.iter().map(Span::text).collect()
}

/// Parses `**emphasis**` markup into a list of [`Span`]s.
///
/// An opening marker is matched with the next marker on the same line.  A marker without a
/// partner is kept as literal text inside the surrounding plain span, so the function never
/// fails.  Empty input yields no spans, and `****` yields no emphasized span.
pub fn parse_emphasis(input: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut buffer = String::new();
    let mut index = 0;

    while index < input.len() {
        let rest = &input[index..];
        if rest.starts_with(EMPHASIS_MARKER) {
            if let Some(inner) = closed_emphasis(&rest[EMPHASIS_MARKER.len()..]) {
                flush_buffer(&mut buffer, &mut spans);
                if !inner.is_empty() {
                    spans.push(Span::new(inner).bold());
                }
                index += inner.len() + 2 * EMPHASIS_MARKER.len();
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        buffer.push(ch);
        index += ch.len_utf8();
    }

    flush_buffer(&mut buffer, &mut spans);
    spans
}

/// Characters an emphasis span may not cross.
const LINE_TERMINATORS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

/// Returns the text up to the next closing marker, provided no line terminator comes first.
fn closed_emphasis(after_open: &str) -> Option<&str> {
    let end = after_open.find(EMPHASIS_MARKER)?;
    let inner = &after_open[..end];
    if inner.contains(&LINE_TERMINATORS[..]) {
        None
    } else {
        Some(inner)
    }
}

fn flush_buffer(buffer: &mut String, spans: &mut Vec<Span>) {
    if buffer.is_empty() {
        return;
    }
    spans.push(Span::new(std::mem::take(buffer)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(input: &str) -> Vec<(String, bool)> {
        parse_emphasis(input)
            .into_iter()
            .map(|span| (span.text().to_owned(), span.is_bold()))
            .collect()
    }

    #[test]
    fn span_to_style_reflects_bold_flag() {
        let styled = Span::new("Hello").bold().to_styled_string();
        assert_eq!(styled.s, "Hello");
        assert!(styled.style.is_bold());
        assert!(!Span::new("plain").to_styled_string().style.is_bold());
    }

    #[test]
    fn parse_plain_text() {
        assert_eq!(runs("Hello world"), vec![("Hello world".to_owned(), false)]);
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_emphasis("").is_empty());
    }

    #[test]
    fn parse_emphasis_in_the_middle() {
        assert_eq!(
            runs("a **b** c"),
            vec![
                ("a ".to_owned(), false),
                ("b".to_owned(), true),
                (" c".to_owned(), false),
            ]
        );
    }

    #[test]
    fn unterminated_marker_is_literal() {
        assert_eq!(
            runs("**unterminated"),
            vec![("**unterminated".to_owned(), false)]
        );
        assert_eq!(
            runs("x **y** and **z"),
            vec![
                ("x ".to_owned(), false),
                ("y".to_owned(), true),
                (" and **z".to_owned(), false),
            ]
        );
    }

    #[test]
    fn emphasis_does_not_cross_lines() {
        assert_eq!(
            runs("**first\nsecond**"),
            vec![("**first\nsecond**".to_owned(), false)]
        );
        assert_eq!(
            runs("**one**\n**two**"),
            vec![
                ("one".to_owned(), true),
                ("\n".to_owned(), false),
                ("two".to_owned(), true),
            ]
        );
    }

    #[test]
    fn emphasis_does_not_cross_any_line_terminator() {
        for input in ["**a\rb**", "**a\u{2028}b**", "**a\u{2029}b**"] {
            assert_eq!(runs(input), vec![(input.to_owned(), false)], "{input:?}");
        }
    }

    #[test]
    fn empty_emphasis_is_dropped() {
        assert_eq!(runs("a****b"), vec![("a".to_owned(), false), ("b".to_owned(), false)]);
    }

    #[test]
    fn multibyte_text_is_preserved() {
        assert_eq!(
            runs("Досвід: **5 років**"),
            vec![
                ("Досвід: ".to_owned(), false),
                ("5 років".to_owned(), true),
            ]
        );
    }

    #[test]
    fn plain_text_strips_markup() {
        assert_eq!(plain_text(&parse_emphasis("a **b** c")), "a b c");
    }
}
