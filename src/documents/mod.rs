//! The three document variants and the capability set they share.
//!
//! Every variant owns one [`FieldValues`] snapshot and derives both of its outputs from it: an
//! HTML preview fragment and a [`LayoutDocument`] for printing.  [`Document`] is the tagged union
//! handed out by [`crate::registry`]; it forwards each call to the wrapped variant.

mod letter;
mod protocol;
mod resume;

pub use letter::Letter;
pub use protocol::Protocol;
pub use resume::Resume;

use crate::clock::{format_input_date, Clock, SystemClock};
use crate::fields::FieldValues;
use crate::model::{LayoutDocument, Margin, Node, NodeStyle, Rgb};
use crate::registry::DocumentKind;
use crate::richtext::Span;

/// Placeholder printed for optional fields that were left empty.
pub const NOT_SPECIFIED: &str = "Не вказано";

/// Full width of a section rule, in points.
pub(crate) const RULE_WIDTH: f32 = 520.0;

pub(crate) const HEADING_COLOR: Rgb = Rgb::hex(0x1a202c);
pub(crate) const MUTED_COLOR: Rgb = Rgb::hex(0x4a5568);
pub(crate) const RULE_COLOR: Rgb = Rgb::hex(0xd1d5db);
pub(crate) const SIGNATURE_COLOR: Rgb = Rgb::hex(0xa0aec0);

/// Operations every document variant supports.
pub trait DocumentVariant {
    /// The registry entry that builds this variant.
    fn kind(&self) -> DocumentKind;

    /// The field snapshot the variant was built from.
    fn fields(&self) -> &FieldValues;

    /// Fields that must be filled in for [`DocumentVariant::validate`] to pass.
    fn required_fields(&self) -> &'static [&'static str];

    /// Renders the preview fragment using `clock` for any embedded date.
    fn render_html(&self, clock: &dyn Clock) -> String;

    /// Produces the print layout using `clock` for any embedded date.
    fn print_layout(&self, clock: &dyn Clock) -> LayoutDocument;

    /// Name of the PDF file the document is exported to.
    fn export_file_name(&self) -> String;

    /// Whether every required field is present.
    ///
    /// The check is advisory: rendering an invalid document still succeeds.
    fn validate(&self) -> bool {
        self.fields().contains_all(self.required_fields())
    }

    /// Required fields that are missing, in declaration order.
    fn missing_fields(&self) -> Vec<&'static str> {
        self.required_fields()
            .iter()
            .copied()
            .filter(|name| !self.fields().contains(name))
            .collect()
    }

    /// [`DocumentVariant::render_html`] with today's date from the system clock.
    fn render_html_now(&self) -> String {
        self.render_html(&SystemClock)
    }

    /// [`DocumentVariant::print_layout`] with today's date from the system clock.
    fn print_layout_now(&self) -> LayoutDocument {
        self.print_layout(&SystemClock)
    }
}

/// A document of any supported type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Document {
    Resume(Resume),
    Letter(Letter),
    Protocol(Protocol),
}

macro_rules! dispatch {
    ($document:expr, $variant:ident => $call:expr) => {
        match $document {
            Document::Resume($variant) => $call,
            Document::Letter($variant) => $call,
            Document::Protocol($variant) => $call,
        }
    };
}

impl DocumentVariant for Document {
    fn kind(&self) -> DocumentKind {
        dispatch!(self, document => document.kind())
    }

    fn fields(&self) -> &FieldValues {
        dispatch!(self, document => document.fields())
    }

    fn required_fields(&self) -> &'static [&'static str] {
        dispatch!(self, document => document.required_fields())
    }

    fn render_html(&self, clock: &dyn Clock) -> String {
        dispatch!(self, document => document.render_html(clock))
    }

    fn print_layout(&self, clock: &dyn Clock) -> LayoutDocument {
        dispatch!(self, document => document.print_layout(clock))
    }

    fn export_file_name(&self) -> String {
        dispatch!(self, document => document.export_file_name())
    }
}

impl From<Resume> for Document {
    fn from(document: Resume) -> Self {
        Document::Resume(document)
    }
}

impl From<Letter> for Document {
    fn from(document: Letter) -> Self {
        Document::Letter(document)
    }
}

impl From<Protocol> for Document {
    fn from(document: Protocol) -> Self {
        Document::Protocol(document)
    }
}

/// A bold label followed by its value, e.g. `Тема: Співпраця`.
pub(crate) fn labelled(label: &str, value: &str) -> Vec<Span> {
    vec![Span::new(label).bold(), Span::new(format!(" {}", value))]
}

/// The thin full-width rule drawn under headers and between blocks.
pub(crate) fn section_rule(bottom: f32) -> Node {
    Node::rule(RULE_WIDTH, RULE_COLOR, NodeStyle::new().margin(Margin::bottom(bottom)))
}

/// Builds `<prefix>_<part>…[_<date>].pdf` with every whitespace run collapsed to `_`.
pub(crate) fn export_file_name(prefix: &str, parts: &[&str], date: Option<&str>) -> String {
    let mut name = String::from(prefix);
    for part in parts {
        name.push('_');
        name.push_str(part.trim());
    }
    if let Some(date) = date {
        name.push('_');
        name.push_str(&format_input_date(date));
    }
    name.push_str(".pdf");

    let mut collapsed = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                collapsed.push('_');
            }
            in_whitespace = true;
        } else {
            collapsed.push(ch);
            in_whitespace = false;
        }
    }
    collapsed
}
