//! Formal letter laid out after the Ukrainian office-correspondence standard.

use crate::clock::{format_date, Clock};
use crate::fields::FieldValues;
use crate::html::{escape, rich};
use crate::model::{
    Column, ColumnWidth, Dash, HorizontalAlignment, LayoutDocument, Margin, Node, NodeStyle,
    PlaceholderBox, Rgb, TextNode,
};
use crate::registry::DocumentKind;
use crate::richtext::{parse_emphasis, Span};

use super::{
    export_file_name, section_rule, DocumentVariant, HEADING_COLOR, MUTED_COLOR,
    RULE_COLOR, SIGNATURE_COLOR,
};

const REQUIRED: &[&str] = &["recipientName", "subject", "content"];

/// Checkbox that reserves room for a physical seal.
pub const STAMP_FIELD: &str = "addStamp";

/// Label printed inside the seal placeholder.
pub const STAMP_LABEL: &str = "Місце для печатки";

const STAMP_WIDTH: f32 = 120.0;
const STAMP_HEIGHT: f32 = 60.0;
const STAMP_LABEL_COLOR: Rgb = Rgb::hex(0xaaaaaa);

/// An official letter from an organisation to a named recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Letter {
    fields: FieldValues,
}

impl Letter {
    /// Wraps the submitted letter fields.
    pub fn new(fields: FieldValues) -> Self {
        Self { fields }
    }

    /// Whether the stamp placeholder is requested.
    pub fn has_stamp(&self) -> bool {
        self.fields.is_checked(STAMP_FIELD)
    }

    fn organization_name(&self) -> &str {
        self.fields.or("organizationName", "НАЗВА ОРГАНІЗАЦІЇ")
    }

    fn organization_address(&self) -> &str {
        self.fields.or("organizationAddress", "Адреса організації")
    }

    fn organization_contacts(&self) -> String {
        format!(
            "Тел.: {}, Email: {}",
            self.fields.or("organizationPhone", "+38 (0__) ___-__-__"),
            self.fields.or("organizationEmail", "email@organization.ua")
        )
    }

    fn outgoing_number(&self) -> String {
        format!("№ {}", self.fields.or("outgoingNumber", "___"))
    }

    fn recipient_lines(&self) -> [&str; 4] {
        [
            self.fields.or("recipientPosition", "Посада"),
            self.fields.text("recipientName"),
            self.fields.or("recipientOrganization", "Назва організації"),
            self.fields.or("recipientAddress", "Адреса отримувача"),
        ]
    }

    fn greeting(&self) -> String {
        format!(
            "{} {}!",
            self.fields.or("greeting", "Шановний(а)"),
            self.fields.text("recipientName")
        )
    }

    fn closing(&self) -> &str {
        self.fields.or("closing", "З повагою,")
    }

    fn sender_position(&self) -> &str {
        self.fields.or("senderPosition", "Посада відправника")
    }

    fn stamp_box(&self) -> Node {
        let top = if self.fields.contains("attachments") {
            5.0
        } else {
            20.0
        };
        Node::PlaceholderBox(PlaceholderBox {
            width: STAMP_WIDTH,
            height: STAMP_HEIGHT,
            color: RULE_COLOR,
            dash: Some(Dash {
                length: 2.0,
                space: 4.0,
            }),
            label: TextNode {
                spans: vec![Span::new(STAMP_LABEL)],
                style: NodeStyle::new()
                    .font_size(10.0)
                    .color(STAMP_LABEL_COLOR)
                    .not_bold(),
            },
            style: NodeStyle::new()
                .aligned(HorizontalAlignment::Left)
                .margin(Margin::top(top)),
        })
    }
}

impl DocumentVariant for Letter {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Letter
    }

    fn fields(&self) -> &FieldValues {
        &self.fields
    }

    fn required_fields(&self) -> &'static [&'static str] {
        REQUIRED
    }

    fn render_html(&self, clock: &dyn Clock) -> String {
        let [position, name, organization, address] = self.recipient_lines();

        let sender_name = match self.fields.get("senderName") {
            Some(name) => escape(name),
            None => "&nbsp;".to_owned(),
        };

        let attachments = self
            .fields
            .get("attachments")
            .map(|value| {
                format!(
                    r#"<div class="mt-8 text-sm"><div><strong>Додатки:</strong></div><div class="whitespace-pre-line">{}</div></div>"#,
                    rich(value)
                )
            })
            .unwrap_or_default();

        let stamp = if self.has_stamp() {
            format!(
                r#"<div class="mt-8 flex items-center"><div class="w-40 h-20 border-2 border-dashed border-gray-400 flex items-center justify-center text-xs text-gray-400">{}</div></div>"#,
                STAMP_LABEL
            )
        } else {
            String::new()
        };

        format!(
            concat!(
                r#"<div class="max-w-4xl mx-auto bg-white p-8 font-['Times_New_Roman']">"#,
                r#"<div class="text-center mb-8 border-b-2 border-gray-400 pb-4">"#,
                r#"<div class="text-lg font-bold">{org_name}</div>"#,
                r#"<div class="text-sm text-gray-700 mt-1">{org_address}</div>"#,
                r#"<div class="text-sm text-gray-700">{org_contacts}</div>"#,
                r#"</div>"#,
                r#"<div class="flex justify-between mb-8">"#,
                r#"<div class="text-sm">{number}</div>"#,
                r#"<div class="text-sm text-right">{date}</div>"#,
                r#"</div>"#,
                r#"<div class="mb-8 text-sm leading-relaxed">"#,
                r#"<div><strong>{position}</strong></div>"#,
                r#"<div><strong>{name}</strong></div>"#,
                r#"<div>{organization}</div>"#,
                r#"<div class="mt-2">{address}</div>"#,
                r#"</div>"#,
                r#"<div class="mb-6 text-sm"><strong>Тема:</strong> {subject}</div>"#,
                r#"<div class="mb-4 text-sm">{greeting}</div>"#,
                r#"<div class="mb-8 text-sm leading-relaxed whitespace-pre-line text-justify">{content}</div>"#,
                r#"<div class="mb-8 text-sm">{closing}</div>"#,
                r#"<div class="text-sm">"#,
                r#"<div>{sender_position}</div>"#,
                r#"<div class="mt-8 w-48 border-b border-gray-400 pb-1">{sender_name}</div>"#,
                r#"</div>"#,
                r#"{attachments}{stamp}"#,
                r#"</div>"#,
            ),
            org_name = escape(self.organization_name()),
            org_address = escape(self.organization_address()),
            org_contacts = escape(&self.organization_contacts()),
            number = escape(&self.outgoing_number()),
            date = format_date(clock.today()),
            position = escape(position),
            name = escape(name),
            organization = escape(organization),
            address = escape(address),
            subject = rich(self.fields.text("subject")),
            greeting = escape(&self.greeting()),
            content = rich(self.fields.text("content")),
            closing = escape(self.closing()),
            sender_position = escape(self.sender_position()),
            sender_name = sender_name,
            attachments = attachments,
            stamp = stamp,
        )
    }

    fn print_layout(&self, clock: &dyn Clock) -> LayoutDocument {
        log::debug!(
            "Building letter layout for recipient '{}' (stamp: {})",
            self.fields.text("recipientName"),
            self.has_stamp()
        );

        let [position, name, organization, address] = self.recipient_lines();
        let body = NodeStyle::new().font_size(10.0);

        let mut content = vec![
            Node::stack(
                vec![
                    Node::plain(self.organization_name(), NodeStyle::named("orgHeader")),
                    Node::plain(self.organization_address(), NodeStyle::named("orgDetail")),
                    Node::plain(self.organization_contacts(), NodeStyle::named("orgDetail")),
                ],
                NodeStyle::new()
                    .aligned(HorizontalAlignment::Center)
                    .margin(Margin::bottom(15.0)),
            ),
            section_rule(20.0),
            Node::columns(
                vec![
                    Column::new(
                        ColumnWidth::Fill,
                        vec![Node::plain(self.outgoing_number(), body.clone())],
                    ),
                    Column::new(
                        ColumnWidth::Fill,
                        vec![Node::plain(
                            format_date(clock.today()),
                            body.clone().aligned(HorizontalAlignment::Right),
                        )],
                    ),
                ],
                0.0,
                NodeStyle::new().margin(Margin::bottom(20.0)),
            ),
            Node::stack(
                vec![
                    Node::plain(position, body.clone().bold()),
                    Node::plain(name, body.clone().bold()),
                    Node::plain(organization, body.clone()),
                    Node::plain(address, body.clone().margin(Margin::top(5.0))),
                ],
                NodeStyle::new().margin(Margin::bottom(20.0)),
            ),
            Node::text(
                {
                    let mut spans = vec![Span::new("Тема:").bold(), Span::new(" ")];
                    spans.extend(parse_emphasis(self.fields.text("subject")));
                    spans
                },
                body.clone().margin(Margin::bottom(15.0)),
            ),
            Node::plain(self.greeting(), body.clone().margin(Margin::bottom(10.0))),
            Node::text(
                parse_emphasis(self.fields.text("content")),
                body.clone()
                    .aligned(HorizontalAlignment::Justify)
                    .margin(Margin::bottom(20.0)),
            ),
            Node::plain(self.closing(), body.clone()),
            Node::stack(
                vec![
                    Node::plain(self.sender_position(), body.clone()),
                    Node::plain(
                        self.fields.text("senderName"),
                        NodeStyle::new().underlined(SIGNATURE_COLOR),
                    ),
                ],
                NodeStyle::new(),
            ),
        ];

        if let Some(attachments) = self.fields.get("attachments") {
            content.push(Node::stack(
                vec![
                    Node::text(vec![Span::new("Додатки:").bold()], body.clone()),
                    Node::text(
                        parse_emphasis(attachments),
                        body.clone().margin(Margin::top(5.0)),
                    ),
                ],
                NodeStyle::new()
                    .aligned(HorizontalAlignment::Left)
                    .margin(Margin::top(15.0)),
            ));
        }

        if self.has_stamp() {
            content.push(self.stamp_box());
        }

        LayoutDocument::new(content)
            .with_style(
                "orgHeader",
                NodeStyle::new()
                    .font_size(14.0)
                    .bold()
                    .color(HEADING_COLOR),
            )
            .with_style(
                "orgDetail",
                NodeStyle::new().font_size(10.0).color(MUTED_COLOR),
            )
    }

    fn export_file_name(&self) -> String {
        export_file_name(
            "Лист",
            &[self.fields.text("recipientName")],
            self.fields.get("date"),
        )
    }
}
