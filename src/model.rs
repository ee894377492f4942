//! Data structures describing the print layout of a document.
//!
//! A [`LayoutDocument`] is a tree of [`Node`]s annotated with [`NodeStyle`]s.  The vocabulary is
//! shared by every document type and deliberately avoids referencing the rendering crate, so a
//! layout can be serialized to JSON and handed to any PDF engine.  [`crate::builder`] renders it
//! with `genpdf`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::richtext::{plain_text, Span};

/// Font family every document is typeset in.
pub const DEFAULT_FONT_FAMILY: &str = "TimesNewRoman";

/// Base font size, in points.
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// An RGB colour, serialized as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Builds a colour from a `0xRRGGBB` literal.
    pub const fn hex(value: u32) -> Self {
        Self(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        )
    }

    /// Parses `#rrggbb` notation.
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self::hex)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse(&value).ok_or_else(|| format!("invalid colour '{}', expected #rrggbb", value))
    }
}

impl From<Rgb> for genpdf::style::Color {
    fn from(color: Rgb) -> Self {
        genpdf::style::Color::Rgb(color.0, color.1, color.2)
    }
}

/// Horizontal alignment of text and blocks.
///
/// `Justify` has no direct `genpdf` counterpart and renders left aligned there; other engines
/// reading the serialized layout can honour it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
    /// Fully justified paragraphs.
    Justify,
}

impl From<HorizontalAlignment> for genpdf::Alignment {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left | HorizontalAlignment::Justify => genpdf::Alignment::Left,
            HorizontalAlignment::Center => genpdf::Alignment::Center,
            HorizontalAlignment::Right => genpdf::Alignment::Right,
        }
    }
}

/// Outer spacing of a node in points, in `left, top, right, bottom` order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Margin {
    /// Spacing on each side, in pdfmake's `[left, top, right, bottom]` order.
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Spacing above the node only.
    pub const fn top(top: f32) -> Self {
        Self::new(0.0, top, 0.0, 0.0)
    }

    /// Spacing below the node only.
    pub const fn bottom(bottom: f32) -> Self {
        Self::new(0.0, 0.0, 0.0, bottom)
    }

    /// Spacing above and below the node.
    pub const fn vertical(top: f32, bottom: f32) -> Self {
        Self::new(0.0, top, 0.0, bottom)
    }
}

/// Presentation attributes attached to a node.
///
/// Unset attributes inherit from the named style (if any), then from the enclosing node, and
/// finally from the document's [`DefaultStyle`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    /// Name of an entry in [`LayoutDocument::styles`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<HorizontalAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    /// Colour of an underline decoration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<Rgb>,
}

impl NodeStyle {
    /// Creates a style with every attribute unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// References a named style.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            style: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the font size in points.
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Marks the text bold.
    pub fn bold(mut self) -> Self {
        self.bold = Some(true);
        self
    }

    /// Clears an inherited bold flag.
    pub fn not_bold(mut self) -> Self {
        self.bold = Some(false);
        self
    }

    /// Sets the text colour.
    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the horizontal alignment.
    pub fn aligned(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    /// Sets the outer margin of the node.
    pub fn margin(mut self, margin: Margin) -> Self {
        self.margin = Some(margin);
        self
    }

    /// Sets the line height as a multiple of the font size.
    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = Some(line_height);
        self
    }

    /// Underlines the text in `color`.
    pub fn underlined(mut self, color: Rgb) -> Self {
        self.underline = Some(color);
        self
    }

    /// Whether no attribute is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns a copy of `self` where unset attributes are taken from `base`.
    pub fn or(&self, base: &NodeStyle) -> NodeStyle {
        NodeStyle {
            style: self.style.clone().or_else(|| base.style.clone()),
            font_size: self.font_size.or(base.font_size),
            bold: self.bold.or(base.bold),
            color: self.color.or(base.color),
            alignment: self.alignment.or(base.alignment),
            margin: self.margin.or(base.margin),
            line_height: self.line_height.or(base.line_height),
            underline: self.underline.or(base.underline),
        }
    }

    /// The attributes children inherit from this style.
    ///
    /// Margins and underlines belong to the node they are declared on.
    pub fn inheritable(&self) -> NodeStyle {
        NodeStyle {
            style: None,
            margin: None,
            underline: None,
            ..self.clone()
        }
    }
}

/// A paragraph of styled runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TextNode {
    pub spans: Vec<Span>,
    #[serde(skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
}

/// Nodes laid out top to bottom.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StackNode {
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
}

/// Width of a column inside a [`ColumnsNode`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnWidth {
    /// Share of the available width, in percent.
    Percent(f32),
    /// As wide as the content.
    Auto,
    /// Whatever space remains.
    Fill,
}

/// One column of a [`ColumnsNode`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    pub width: ColumnWidth,
    pub content: Vec<Node>,
}

impl Column {
    /// Creates a column of the given width.
    pub fn new(width: ColumnWidth, content: impl Into<Vec<Node>>) -> Self {
        Self {
            width,
            content: content.into(),
        }
    }
}

/// Columns laid out left to right.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ColumnsNode {
    pub columns: Vec<Column>,
    /// Horizontal gap between columns, in points.
    pub gap: f32,
    #[serde(skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
}

/// A horizontal line decoration.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleNode {
    /// Length of the line, in points.
    pub length: f32,
    pub thickness: f32,
    pub color: Rgb,
    #[serde(skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
}

/// Dash pattern of a stroked outline, in points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Dash {
    pub length: f32,
    pub space: f32,
}

/// A dashed rectangle with a label, marking space reserved for something applied by hand.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlaceholderBox {
    /// Outline size, in points.
    pub width: f32,
    pub height: f32,
    pub color: Rgb,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<Dash>,
    pub label: TextNode,
    #[serde(skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
}

/// Items of an ordered or unordered list.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ListNode {
    pub items: Vec<Vec<Span>>,
    #[serde(skip_serializing_if = "NodeStyle::is_empty")]
    pub style: NodeStyle,
}

/// Individual nodes of the layout tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Text(TextNode),
    Stack(StackNode),
    Columns(ColumnsNode),
    Rule(RuleNode),
    PlaceholderBox(PlaceholderBox),
    /// Items numbered 1, 2, 3… in order.
    OrderedList(ListNode),
    /// Bulleted items.
    UnorderedList(ListNode),
}

impl Node {
    /// A text node made of the given spans.
    pub fn text(spans: impl Into<Vec<Span>>, style: NodeStyle) -> Self {
        Self::Text(TextNode {
            spans: spans.into(),
            style,
        })
    }

    /// A text node holding a single plain run.
    pub fn plain(text: impl Into<String>, style: NodeStyle) -> Self {
        Self::text(vec![Span::new(text)], style)
    }

    /// Children laid out top to bottom.
    pub fn stack(children: impl Into<Vec<Node>>, style: NodeStyle) -> Self {
        Self::Stack(StackNode {
            children: children.into(),
            style,
        })
    }

    /// Columns laid out left to right, `gap` points apart.
    pub fn columns(columns: impl Into<Vec<Column>>, gap: f32, style: NodeStyle) -> Self {
        Self::Columns(ColumnsNode {
            columns: columns.into(),
            gap,
            style,
        })
    }

    /// A 1 pt horizontal rule `length` points long.
    pub fn rule(length: f32, color: Rgb, style: NodeStyle) -> Self {
        Self::Rule(RuleNode {
            length,
            thickness: 1.0,
            color,
            style,
        })
    }

    /// A numbered list, one item per entry of `items`.
    pub fn ordered_list(items: Vec<Vec<Span>>, style: NodeStyle) -> Self {
        Self::OrderedList(ListNode { items, style })
    }

    /// A bulleted list, one item per entry of `items`.
    pub fn unordered_list(items: Vec<Vec<Span>>, style: NodeStyle) -> Self {
        Self::UnorderedList(ListNode { items, style })
    }

    /// The node's own style attributes.
    pub fn style(&self) -> &NodeStyle {
        match self {
            Node::Text(node) => &node.style,
            Node::Stack(node) => &node.style,
            Node::Columns(node) => &node.style,
            Node::Rule(node) => &node.style,
            Node::PlaceholderBox(node) => &node.style,
            Node::OrderedList(node) | Node::UnorderedList(node) => &node.style,
        }
    }

    /// Direct children, in layout order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Stack(node) => node.children.iter().collect(),
            Node::Columns(node) => node
                .columns
                .iter()
                .flat_map(|column| column.content.iter())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Text fragments carried by this node itself, one per paragraph or list item.
    pub fn own_text(&self) -> Vec<String> {
        match self {
            Node::Text(node) => vec![plain_text(&node.spans)],
            Node::PlaceholderBox(node) => vec![plain_text(&node.label.spans)],
            Node::OrderedList(node) | Node::UnorderedList(node) => {
                node.items.iter().map(|item| plain_text(item)).collect()
            }
            _ => Vec::new(),
        }
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Node>) {
        out.push(self);
        for child in self.children() {
            child.collect(out);
        }
    }
}

/// Document-wide defaults handed to the renderer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultStyle {
    pub font: String,
    pub font_size: f32,
    pub alignment: HorizontalAlignment,
}

impl Default for DefaultStyle {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT_FAMILY.to_owned(),
            font_size: DEFAULT_FONT_SIZE,
            alignment: HorizontalAlignment::Left,
        }
    }
}

/// The complete print layout of one document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub content: Vec<Node>,
    pub default_style: DefaultStyle,
    pub styles: BTreeMap<String, NodeStyle>,
}

impl LayoutDocument {
    /// Creates a layout with the default style and no named styles.
    pub fn new(content: impl Into<Vec<Node>>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Registers a named style and returns the updated layout.
    pub fn with_style(mut self, name: impl Into<String>, style: NodeStyle) -> Self {
        self.styles.insert(name.into(), style);
        self
    }

    /// Replaces the default style and returns the updated layout.
    pub fn with_default_style(mut self, default_style: DefaultStyle) -> Self {
        self.default_style = default_style;
        self
    }

    /// Looks up a named style.
    pub fn style(&self, name: &str) -> Option<&NodeStyle> {
        self.styles.get(name)
    }

    /// Resolves a node style against its named style, if it references one.
    pub fn resolve(&self, style: &NodeStyle) -> NodeStyle {
        match style.style.as_deref().and_then(|name| self.style(name)) {
            Some(named) => style.or(named),
            None => style.clone(),
        }
    }

    /// Every node of the tree in depth-first order.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        for node in &self.content {
            node.collect(&mut out);
        }
        out
    }

    /// All text carried by the tree, in layout order.
    pub fn text_fragments(&self) -> Vec<String> {
        self.nodes().into_iter().flat_map(Node::own_text).collect()
    }

    /// Whether any node satisfies `predicate`.
    pub fn any(&self, predicate: impl Fn(&Node) -> bool) -> bool {
        self.nodes().into_iter().any(predicate)
    }

    /// Serializes the layout for an external engine.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_round_trips_through_hex() {
        let color = Rgb::hex(0x1a202c);
        assert_eq!(color, Rgb(0x1a, 0x20, 0x2c));
        assert_eq!(color.to_string(), "#1a202c");
        assert_eq!(Rgb::parse("#1A202C"), Some(color));
        assert_eq!(Rgb::parse("1a202c"), None);
        assert_eq!(Rgb::parse("#12fg34"), None);
    }

    #[test]
    fn named_style_fills_unset_attributes() {
        let layout = LayoutDocument::new(Vec::new())
            .with_style("header", NodeStyle::new().font_size(18.0).bold());
        let resolved = layout.resolve(&NodeStyle::named("header").font_size(20.0));
        assert_eq!(resolved.font_size, Some(20.0));
        assert_eq!(resolved.bold, Some(true));
    }

    #[test]
    fn children_do_not_inherit_margins() {
        let style = NodeStyle::named("bodyText")
            .font_size(12.0)
            .margin(Margin::bottom(10.0))
            .underlined(Rgb::hex(0x000000));
        let inherited = style.inheritable();
        assert_eq!(inherited.font_size, Some(12.0));
        assert_eq!(inherited.margin, None);
        assert_eq!(inherited.underline, None);
        assert_eq!(inherited.style, None);
    }

    #[test]
    fn nodes_walks_nested_groups() {
        let layout = LayoutDocument::new(vec![Node::columns(
            vec![
                Column::new(
                    ColumnWidth::Percent(50.0),
                    vec![Node::plain("left", NodeStyle::new())],
                ),
                Column::new(
                    ColumnWidth::Fill,
                    vec![Node::stack(
                        vec![Node::ordered_list(
                            vec![vec![Span::new("one")], vec![Span::new("two")]],
                            NodeStyle::new(),
                        )],
                        NodeStyle::new(),
                    )],
                ),
            ],
            20.0,
            NodeStyle::new(),
        )]);

        assert_eq!(layout.nodes().len(), 4);
        assert_eq!(layout.text_fragments(), vec!["left", "one", "two"]);
    }

    #[test]
    fn serializes_with_type_tags() {
        let layout = LayoutDocument::new(vec![Node::rule(
            520.0,
            Rgb::hex(0xd1d5db),
            NodeStyle::new(),
        )]);
        let json: serde_json::Value =
            serde_json::from_str(&layout.to_json().expect("serializable")).expect("valid json");
        assert_eq!(json["content"][0]["type"], "rule");
        assert_eq!(json["content"][0]["color"], "#d1d5db");
        assert_eq!(json["defaultStyle"]["font"], DEFAULT_FONT_FAMILY);
        assert_eq!(json["defaultStyle"]["alignment"], "left");
    }
}
