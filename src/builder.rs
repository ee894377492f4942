//! Renders a [`LayoutDocument`] to PDF with `genpdf`.
//!
//! Lengths in the layout tree are typographic points; they are converted to millimetres here.
//! Text nodes are split on `\n` into one paragraph per line, underlined text becomes an
//! [`UnderlinedText`] line, columns become a [`TableLayout`] row, and rules, placeholder boxes
//! and lists map onto the custom elements in [`crate::elements`] and the `genpdf` list types.

use std::fs;
use std::io;
use std::path::Path;

use genpdf::elements::{Break, LinearLayout, OrderedList, Paragraph, TableLayout, UnorderedList};
use genpdf::style::{Style, StyledString};
use genpdf::{Element, Margins, PaperSize, SimplePageDecorator, Size};
use log::debug;
use thiserror::Error;

use crate::elements::{pt, BoxedElement, DashedBox, HorizontalRule, UnderlinedText};
use crate::fonts;
use crate::model::{
    ColumnWidth, ColumnsNode, DefaultStyle, LayoutDocument, ListNode, Node, NodeStyle,
    PlaceholderBox, RuleNode, TextNode,
};
use crate::richtext::{plain_text, spans_to_styled_strings, Span};

/// Page margin applied on every side unless configured otherwise, in points.
pub const DEFAULT_PAGE_MARGIN: f32 = 40.0;

/// Errors raised while turning a layout into PDF bytes.
#[derive(Debug, Error)]
pub enum PdfBuildError {
    /// No usable Times New Roman font family was found.
    #[error("failed to load fonts: {0}")]
    FontLoad(genpdf::error::Error),

    /// `genpdf` rejected the layout.
    #[error("failed to render PDF: {0}")]
    Render(genpdf::error::Error),

    /// The rendered PDF could not be written.
    #[error("failed to write PDF: {0}")]
    Io(#[from] io::Error),
}

/// A rendered PDF document.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
}

impl RenderedPdf {
    /// Writes the PDF to `path`, replacing any existing file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), PdfBuildError> {
        fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Renders layout trees with a fixed page setup.
#[derive(Clone, Debug)]
pub struct PdfBuilder {
    paper_size: Size,
    margins: Margins,
    title: Option<String>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        let margin = pt(DEFAULT_PAGE_MARGIN);
        Self {
            paper_size: PaperSize::A4.into(),
            margins: Margins::trbl(margin, margin, margin, margin),
            title: None,
        }
    }
}

impl PdfBuilder {
    /// Creates a builder for A4 pages with 40 pt margins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the paper size.
    pub fn with_paper_size(mut self, paper_size: impl Into<Size>) -> Self {
        self.paper_size = paper_size.into();
        self
    }

    /// Sets the page margins applied through the page decorator.
    pub fn with_margins(mut self, margins: impl Into<Margins>) -> Self {
        self.margins = margins.into();
        self
    }

    /// Sets the PDF document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Renders `layout` into memory.
    pub fn render(&self, layout: &LayoutDocument) -> Result<RenderedPdf, PdfBuildError> {
        let font_family = fonts::default_font_family().map_err(PdfBuildError::FontLoad)?;
        let mut document = genpdf::Document::new(font_family);
        document.set_paper_size(self.paper_size);
        if let Some(title) = &self.title {
            document.set_title(title.clone());
        }
        apply_default_style(&mut document, &layout.default_style);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(self.margins);
        document.set_page_decorator(decorator);

        let inherited = NodeStyle::new()
            .font_size(layout.default_style.font_size)
            .aligned(layout.default_style.alignment);
        for node in &layout.content {
            document.push(build_node(layout, node, &inherited)?);
        }

        let mut bytes = Vec::new();
        document.render(&mut bytes).map_err(PdfBuildError::Render)?;
        debug!(
            "Rendered {} top-level node(s) into {} bytes",
            layout.content.len(),
            bytes.len()
        );
        Ok(RenderedPdf { bytes })
    }

    /// Renders `layout` and writes it to `path`.
    pub fn render_to_file(
        &self,
        layout: &LayoutDocument,
        path: impl AsRef<Path>,
    ) -> Result<RenderedPdf, PdfBuildError> {
        let pdf = self.render(layout)?;
        pdf.write_to(path)?;
        Ok(pdf)
    }
}

fn apply_default_style(document: &mut genpdf::Document, default_style: &DefaultStyle) {
    document.set_font_size(font_size(default_style.font_size));
}

fn font_size(size: f32) -> u8 {
    size.round().clamp(1.0, f32::from(u8::MAX)) as u8
}

/// The `genpdf` text style carried by a resolved node style.
fn text_style(style: &NodeStyle) -> Style {
    let mut text = Style::new();
    if let Some(size) = style.font_size {
        text.set_font_size(font_size(size));
    }
    if style.bold == Some(true) {
        text.set_bold();
    }
    if let Some(color) = style.color {
        text.set_color(color.into());
    }
    if let Some(line_height) = style.line_height {
        text.set_line_spacing(f64::from(line_height));
    }
    text
}

fn padded<E: Element + 'static>(element: E, style: &NodeStyle) -> BoxedElement {
    match style.margin {
        Some(margin) => BoxedElement::new(element.padded(Margins::trbl(
            pt(margin.top),
            pt(margin.right),
            pt(margin.bottom),
            pt(margin.left),
        ))),
        None => BoxedElement::new(element),
    }
}

fn build_node(
    layout: &LayoutDocument,
    node: &Node,
    inherited: &NodeStyle,
) -> Result<BoxedElement, PdfBuildError> {
    let style = layout.resolve(node.style()).or(inherited);
    let element = match node {
        Node::Text(text) => build_text(text, &style),
        Node::Stack(stack) => {
            let mut group = LinearLayout::vertical();
            for child in &stack.children {
                group.push(build_node(layout, child, &style.inheritable())?);
            }
            BoxedElement::new(group)
        }
        Node::Columns(columns) => build_columns(layout, columns, &style)?,
        Node::Rule(rule) => build_rule(rule),
        Node::PlaceholderBox(placeholder) => build_placeholder(layout, placeholder, &style),
        Node::OrderedList(list) => {
            let mut items = OrderedList::new();
            for item in list_paragraphs(list, &style) {
                items.push(item);
            }
            BoxedElement::new(items.styled(text_style(&style)))
        }
        Node::UnorderedList(list) => {
            let mut items = UnorderedList::new();
            for item in list_paragraphs(list, &style) {
                items.push(item);
            }
            BoxedElement::new(items.styled(text_style(&style)))
        }
    };
    Ok(padded(element, &style))
}

/// Splits spans into lines at every `\n`, keeping each fragment's emphasis.
fn split_lines(spans: &[Span]) -> Vec<Vec<Span>> {
    let mut lines = vec![Vec::new()];
    for span in spans {
        for (index, part) in span.text().split('\n').enumerate() {
            if index > 0 {
                lines.push(Vec::new());
            }
            if !part.is_empty() {
                if let Some(line) = lines.last_mut() {
                    line.push(Span::new(part).with_bold(span.is_bold()));
                }
            }
        }
    }
    lines
}

fn paragraph(spans: &[Span], style: &NodeStyle) -> Paragraph {
    let mut paragraph = Paragraph::default();
    for span in spans_to_styled_strings(spans, text_style(style), false) {
        paragraph.push(span.string);
    }
    paragraph.set_alignment(style.alignment.unwrap_or_default().into());
    paragraph
}

fn build_text(text: &TextNode, style: &NodeStyle) -> BoxedElement {
    let lines = split_lines(&text.spans);
    let mut group = LinearLayout::vertical();
    for line in &lines {
        if line.is_empty() {
            group.push(Break::new(1));
        } else if let Some(color) = style.underline {
            let spans = spans_to_styled_strings(line, text_style(style), true);
            group.push(
                UnderlinedText::new(spans)
                    .with_alignment(style.alignment.unwrap_or_default().into())
                    .with_underline_color(color),
            );
        } else {
            group.push(paragraph(line, style));
        }
    }
    BoxedElement::new(group)
}

fn list_paragraphs(list: &ListNode, style: &NodeStyle) -> Vec<Paragraph> {
    list.items
        .iter()
        .map(|item| paragraph(item, style))
        .collect()
}

/// Relative weights of the columns, with `auto` and `fill` sharing what percentages leave.
fn column_weights(widths: &[ColumnWidth]) -> Vec<usize> {
    let fixed: f32 = widths
        .iter()
        .filter_map(|width| match width {
            ColumnWidth::Percent(percent) => Some(percent.max(0.0)),
            _ => None,
        })
        .sum();
    let flexible = widths
        .iter()
        .filter(|width| !matches!(width, ColumnWidth::Percent(_)))
        .count();
    let share = if flexible == 0 {
        0.0
    } else {
        (100.0 - fixed).max(0.0) / flexible as f32
    };

    widths
        .iter()
        .map(|width| match width {
            ColumnWidth::Percent(percent) => percent.round().max(1.0) as usize,
            ColumnWidth::Auto | ColumnWidth::Fill => share.round().max(1.0) as usize,
        })
        .collect()
}

fn build_columns(
    layout: &LayoutDocument,
    columns: &ColumnsNode,
    style: &NodeStyle,
) -> Result<BoxedElement, PdfBuildError> {
    let widths: Vec<ColumnWidth> = columns.columns.iter().map(|column| column.width).collect();
    let mut table = TableLayout::new(column_weights(&widths));
    let mut row = table.row();
    let half_gap = pt(columns.gap / 2.0);
    let last = columns.columns.len().saturating_sub(1);

    for (index, column) in columns.columns.iter().enumerate() {
        let mut cell = LinearLayout::vertical();
        for child in &column.content {
            cell.push(build_node(layout, child, &style.inheritable())?);
        }
        let left = if index == 0 { pt(0.0) } else { half_gap };
        let right = if index == last { pt(0.0) } else { half_gap };
        row.push_element(cell.padded(Margins::trbl(pt(0.0), right, pt(0.0), left)));
    }
    row.push().map_err(PdfBuildError::Render)?;

    Ok(BoxedElement::new(table))
}

fn build_rule(rule: &RuleNode) -> BoxedElement {
    BoxedElement::new(
        HorizontalRule::new(pt(rule.length), pt(rule.thickness)).with_color(rule.color),
    )
}

fn build_placeholder(
    layout: &LayoutDocument,
    placeholder: &PlaceholderBox,
    style: &NodeStyle,
) -> BoxedElement {
    let label_style = layout
        .resolve(&placeholder.label.style)
        .or(&style.inheritable());
    let mut outline = DashedBox::new(Size::new(pt(placeholder.width), pt(placeholder.height)))
        .with_color(placeholder.color)
        .with_label(StyledString::new(
            plain_text(&placeholder.label.spans),
            text_style(&label_style),
        ));
    if let Some(dash) = placeholder.dash {
        outline = outline.with_dash(pt(dash.length), pt(dash.space));
    }
    BoxedElement::new(outline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_keeps_emphasis() {
        let spans = vec![Span::new("one\ntwo "), Span::new("bold").bold()];
        let lines = split_lines(&spans);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], vec![Span::new("one")]);
        assert_eq!(lines[1], vec![Span::new("two "), Span::new("bold").bold()]);
    }

    #[test]
    fn split_lines_preserves_blank_lines() {
        let lines = split_lines(&[Span::new("a\n\nb")]);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].is_empty());
    }

    #[test]
    fn percentages_become_weights() {
        assert_eq!(
            column_weights(&[ColumnWidth::Percent(30.0), ColumnWidth::Percent(70.0)]),
            vec![30, 70]
        );
    }

    #[test]
    fn flexible_columns_share_the_rest() {
        assert_eq!(
            column_weights(&[
                ColumnWidth::Percent(50.0),
                ColumnWidth::Auto,
                ColumnWidth::Fill
            ]),
            vec![50, 25, 25]
        );
        assert_eq!(column_weights(&[ColumnWidth::Fill, ColumnWidth::Fill]), vec![50, 50]);
    }

    #[test]
    fn font_sizes_are_clamped() {
        assert_eq!(font_size(10.4), 10);
        assert_eq!(font_size(0.0), 1);
        assert_eq!(font_size(900.0), 255);
    }

    #[test]
    fn text_style_carries_resolved_attributes() {
        let style = text_style(&NodeStyle::new().font_size(18.0).bold());
        assert_eq!(style.font_size(), 18);
        assert!(style.is_bold());
    }
}
